//! Response policy — output screening for the caller-facing stream
//!
//! A pure filter applied to generated text before it reaches the caller.
//! Whenever internal detail must not leak (raw structured payloads, tool
//! names, provider error detail), the whole output is replaced by the
//! single fixed [`FALLBACK_TEXT`]. The caller never learns which rule
//! fired.
//!
//! The policy is idempotent: `apply(apply(x)) == apply(x)` for all `x`,
//! because the fallback itself always passes [`ResponsePolicy::is_clean`].

use std::borrow::Cow;

/// The single fixed user-visible message used whenever internal detail
/// must not leak.
pub const FALLBACK_TEXT: &str = "I don't have that information right now.";

/// Screens assembled natural-language text for structured payloads and
/// internal identifiers.
///
/// Internal terms (tool names for the turn's snapshot) are registered at
/// turn start. Terms that happen to occur in [`FALLBACK_TEXT`] are
/// rejected at registration, which is what keeps `apply` idempotent
/// structurally rather than by luck.
#[derive(Debug, Clone, Default)]
pub struct ResponsePolicy {
    internal_terms: Vec<String>,
}

impl ResponsePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register internal identifiers that must never reach the caller.
    ///
    /// Empty terms and terms contained in the fallback text are skipped.
    pub fn with_internal_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for term in terms {
            let term = term.into();
            if !term.is_empty() && !FALLBACK_TEXT.contains(&term) {
                self.internal_terms.push(term);
            }
        }
        self
    }

    /// Whether the text is safe to forward verbatim.
    ///
    /// Text is dirty if it is a raw structured payload (parses as a JSON
    /// object or array), contains an inline JSON-object marker, or
    /// mentions any registered internal term.
    pub fn is_clean(&self, text: &str) -> bool {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return true;
        }

        if (trimmed.starts_with('{') || trimmed.starts_with('['))
            && serde_json::from_str::<serde_json::Value>(trimmed).is_ok()
        {
            return false;
        }

        // Inline key/value fragments resembling a tool call payload
        if text.contains("{\"") {
            return false;
        }

        !self.internal_terms.iter().any(|term| text.contains(term))
    }

    /// Apply the policy: clean text passes through unchanged, anything
    /// else is replaced wholesale by [`FALLBACK_TEXT`].
    pub fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if self.is_clean(text) {
            Cow::Borrowed(text)
        } else {
            Cow::Borrowed(FALLBACK_TEXT)
        }
    }
}
