//! System prompts for the two turn modes.

use toolgate_domain::policy::FALLBACK_TEXT;
use toolgate_domain::turn::entities::TurnMode;

/// System prompt for the backend, selected by turn mode.
///
/// Both prompts instruct the model to decline with the exact fallback
/// sentence instead of inventing an answer; the grounded variant further
/// forbids answering from model knowledge at all.
pub fn system_prompt(mode: TurnMode) -> String {
    match mode {
        TurnMode::Open => format!(
            "You are a helpful assistant. You may answer from your own knowledge, \
             and you should call the provided tools whenever they are relevant to \
             the question. Answer in plain prose; never show raw tool output or \
             JSON to the user. If you cannot answer, reply with exactly: {FALLBACK_TEXT}"
        ),
        TurnMode::ToolRequired => format!(
            "You are a helpful assistant that answers ONLY from the provided tools. \
             Do not answer from your own knowledge. If no provided tool can supply \
             the information the question needs, reply with exactly: {FALLBACK_TEXT} \
             Answer in plain prose; never show raw tool output or JSON to the user."
        ),
    }
}
