//! Run Turn use case — the gateway's turn state machine.
//!
//! Drives one user turn through explicit states:
//!
//! ```text
//! Received → Generating → (ToolPending → ToolResolved)* → Finalizing → Done
//!                                  │
//!                                  └────────── Failed (from any state)
//! ```
//!
//! Suspension points are states, not hidden control flow: the one place a
//! turn stops forwarding output is `ToolPending`, while a provider call is
//! in flight. Everything the caller sees goes through the
//! [`ResponsePolicy`]; every fault collapses to the fixed fallback text.
//!
//! # Streaming and the no-tool-no-answer rule
//!
//! In [`TurnMode::Open`] clean text chunks are forwarded as they arrive,
//! with the policy screening every emitted prefix. In
//! [`TurnMode::ToolRequired`] text is withheld until the first successful
//! tool round; a turn that completes without one emits exactly the
//! fallback string. Withholding is what makes that rule enforceable for a
//! stream — there is no unsending a chunk.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use toolgate_domain::policy::{FALLBACK_TEXT, ResponsePolicy};
use toolgate_domain::tool::{entities::ToolCall, snapshot::CatalogSnapshot};
use toolgate_domain::turn::{
    entities::{TurnInput, TurnMode},
    stream::GenerationEvent,
    transcript::Transcript,
};

use crate::config::ExecutionParams;
use crate::ports::generation::GenerationGateway;
use crate::ports::turn_logger::{NoTurnLogger, TurnEvent, TurnLogger};
use crate::use_cases::invoker::ToolInvoker;

/// Explicit state of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    Received,
    Generating,
    ToolPending,
    ToolResolved,
    Finalizing,
    Done,
    Failed,
}

impl TurnPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnPhase::Received => "received",
            TurnPhase::Generating => "generating",
            TurnPhase::ToolPending => "tool_pending",
            TurnPhase::ToolResolved => "tool_resolved",
            TurnPhase::Finalizing => "finalizing",
            TurnPhase::Done => "done",
            TurnPhase::Failed => "failed",
        }
    }
}

impl std::fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Handle for receiving the caller-facing chunk stream of one turn.
///
/// The stream is a sequence of UTF-8 text chunks terminated by channel
/// close. Dropping the handle disconnects the caller; the turn observes
/// the closed channel and tears itself down.
pub struct TurnHandle {
    receiver: mpsc::Receiver<String>,
}

impl TurnHandle {
    pub fn new(receiver: mpsc::Receiver<String>) -> Self {
        Self { receiver }
    }

    /// Receive the next chunk, or `None` once the turn is over.
    pub async fn recv(&mut self) -> Option<String> {
        self.receiver.recv().await
    }

    /// Consume the stream and concatenate all chunks.
    pub async fn collect_text(mut self) -> String {
        let mut full_text = String::new();
        while let Some(chunk) = self.receiver.recv().await {
            full_text.push_str(&chunk);
        }
        full_text
    }
}

/// Use case for running one chat turn.
///
/// Holds the injected generation gateway and the loop parameters; each
/// [`execute`](Self::execute) spawns an independent turn task, so turns
/// are isolated units of concurrent work sharing only the catalog.
pub struct RunTurnUseCase {
    generation: Arc<dyn GenerationGateway>,
    params: ExecutionParams,
    turn_logger: Arc<dyn TurnLogger>,
}

impl RunTurnUseCase {
    pub fn new(generation: Arc<dyn GenerationGateway>, params: ExecutionParams) -> Self {
        Self {
            generation,
            params,
            turn_logger: Arc::new(NoTurnLogger),
        }
    }

    /// Create with a turn logger.
    pub fn with_turn_logger(mut self, logger: Arc<dyn TurnLogger>) -> Self {
        self.turn_logger = logger;
        self
    }

    /// Start a turn against the given catalog snapshot.
    ///
    /// The snapshot is owned by the turn for its whole duration; a
    /// concurrent catalog refresh has no effect on it. Cancelling the
    /// token tears the turn down from whatever state it is in.
    pub fn execute(
        &self,
        input: TurnInput,
        snapshot: Arc<CatalogSnapshot>,
        cancel: CancellationToken,
    ) -> TurnHandle {
        let (tx, rx) = mpsc::channel(32);
        let driver = TurnDriver {
            generation: self.generation.clone(),
            params: self.params.clone(),
            turn_logger: self.turn_logger.clone(),
        };
        tokio::spawn(async move {
            driver.run(input, snapshot, cancel, tx).await;
        });
        TurnHandle::new(rx)
    }
}

/// Owns the state of one running turn.
struct TurnDriver {
    generation: Arc<dyn GenerationGateway>,
    params: ExecutionParams,
    turn_logger: Arc<dyn TurnLogger>,
}

impl TurnDriver {
    async fn run(
        self,
        input: TurnInput,
        snapshot: Arc<CatalogSnapshot>,
        cancel: CancellationToken,
        tx: mpsc::Sender<String>,
    ) {
        let mut phase = TurnPhase::Received;
        info!(
            mode = %input.mode,
            snapshot_generation = snapshot.generation(),
            tools = snapshot.len(),
            "Turn received"
        );
        self.turn_logger.log(TurnEvent::new(
            "turn_started",
            serde_json::json!({
                "mode": input.mode.as_str(),
                "snapshot_generation": snapshot.generation(),
                "user_bytes": input.user_text.len(),
            }),
        ));

        let policy = ResponsePolicy::new()
            .with_internal_terms(snapshot.names().iter().map(|s| s.to_string()));
        let invoker = ToolInvoker::new(self.params.tool_timeout);
        let descriptors = snapshot.descriptors();

        let mut transcript = Transcript::from_user_text(&input.user_text);
        let mut rounds = 0usize;
        let mut tool_satisfied = false;
        // Text already forwarded to the caller; every prefix of it passed
        // the policy screen.
        let mut answer = String::new();

        loop {
            self.transition(&mut phase, TurnPhase::Generating);
            let mut stream = match self
                .generation
                .generate(&transcript, &descriptors, input.mode)
                .await
            {
                Ok(stream) => stream,
                Err(e) => {
                    warn!(error = %e, "Generation backend failed");
                    self.fail(&mut phase, &tx, "generation").await;
                    return;
                }
            };

            let mut round_text = String::new();
            let mut pending: Option<ToolCall> = None;

            loop {
                let event = tokio::select! {
                    _ = cancel.cancelled() => {
                        self.cancelled(&mut phase);
                        return;
                    }
                    event = stream.recv() => event,
                };
                let Some(event) = event else { break };

                match event {
                    GenerationEvent::Chunk(chunk) => {
                        round_text.push_str(&chunk);
                        let forwarding = input.mode == TurnMode::Open || tool_satisfied;
                        if forwarding {
                            answer.push_str(&chunk);
                            if policy.is_clean(&answer) {
                                if tx.send(chunk).await.is_err() {
                                    self.cancelled(&mut phase);
                                    return;
                                }
                            } else {
                                warn!("Policy violation in generated text");
                                self.finalize_fallback(&mut phase, &tx, "policy_violation")
                                    .await;
                                return;
                            }
                        }
                    }
                    GenerationEvent::ToolCall(call) => {
                        pending = Some(call);
                        break;
                    }
                    GenerationEvent::Completed => break,
                    GenerationEvent::Error(e) => {
                        warn!(error = %e, "Generation stream error");
                        self.fail(&mut phase, &tx, "generation_stream").await;
                        return;
                    }
                }
            }

            let Some(call) = pending else {
                // Generation round finished without requesting a tool:
                // the turn is over.
                break;
            };

            if rounds >= self.params.max_tool_rounds {
                warn!(
                    max_tool_rounds = self.params.max_tool_rounds,
                    "Tool round limit reached"
                );
                self.finalize_fallback(&mut phase, &tx, "round_limit").await;
                return;
            }
            rounds += 1;

            self.transition(&mut phase, TurnPhase::ToolPending);
            self.turn_logger.log(TurnEvent::new(
                "tool_call",
                serde_json::json!({
                    "tool": call.tool_name,
                    "round": rounds,
                }),
            ));
            transcript.push_assistant(std::mem::take(&mut round_text));

            // The one explicit suspension point: forwarding pauses until
            // the tool result is available, the timeout fires, or the turn
            // is cancelled.
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    self.cancelled(&mut phase);
                    return;
                }
                result = invoker.invoke(&snapshot, &call) => result,
            };

            match result {
                Ok(payload) => {
                    self.transition(&mut phase, TurnPhase::ToolResolved);
                    self.turn_logger.log(TurnEvent::new(
                        "tool_result",
                        serde_json::json!({
                            "tool": call.tool_name,
                            "ok": true,
                        }),
                    ));
                    tool_satisfied = true;
                    transcript.push_tool_exchange(call, payload);
                }
                Err(err) => {
                    warn!(tool = %call.tool_name, kind = err.kind(), "Tool invocation failed");
                    self.turn_logger.log(TurnEvent::new(
                        "tool_result",
                        serde_json::json!({
                            "tool": call.tool_name,
                            "ok": false,
                            "kind": err.kind(),
                        }),
                    ));
                    self.finalize_fallback(&mut phase, &tx, err.kind()).await;
                    return;
                }
            }
        }

        self.transition(&mut phase, TurnPhase::Finalizing);

        if input.mode.requires_tool() && !tool_satisfied {
            // No-tool-no-answer rule: nothing was forwarded, so the caller
            // sees exactly the fallback string.
            self.finalize_fallback(&mut phase, &tx, "no_tool_used").await;
            return;
        }

        if answer.trim().is_empty() {
            self.finalize_fallback(&mut phase, &tx, "empty_answer").await;
            return;
        }

        // Final policy pass over the assembled text. Every forwarded
        // prefix already passed is_clean, so this is the same verdict the
        // caller observed chunk by chunk.
        if !policy.is_clean(&answer) {
            self.finalize_fallback(&mut phase, &tx, "policy_violation").await;
            return;
        }

        self.transition(&mut phase, TurnPhase::Done);
        info!(rounds, bytes = answer.len(), "Turn completed");
        self.turn_logger.log(TurnEvent::new(
            "turn_completed",
            serde_json::json!({
                "rounds": rounds,
                "bytes": answer.len(),
                "fallback": false,
            }),
        ));
    }

    fn transition(&self, phase: &mut TurnPhase, next: TurnPhase) {
        debug!(from = %phase, to = %next, "Turn transition");
        *phase = next;
    }

    /// Route to `Finalizing → Done` with the fallback text as the entire
    /// remaining output.
    async fn finalize_fallback(
        &self,
        phase: &mut TurnPhase,
        tx: &mpsc::Sender<String>,
        reason: &'static str,
    ) {
        self.transition(phase, TurnPhase::Finalizing);
        let _ = tx.send(FALLBACK_TEXT.to_string()).await;
        self.transition(phase, TurnPhase::Done);
        self.turn_logger.log(TurnEvent::new(
            "turn_completed",
            serde_json::json!({
                "fallback": true,
                "reason": reason,
            }),
        ));
    }

    /// Route to `Failed`: emit the fallback and terminate the stream. The
    /// underlying error never propagates upstream.
    async fn fail(&self, phase: &mut TurnPhase, tx: &mpsc::Sender<String>, stage: &'static str) {
        self.transition(phase, TurnPhase::Failed);
        let _ = tx.send(FALLBACK_TEXT.to_string()).await;
        self.turn_logger.log(TurnEvent::new(
            "turn_failed",
            serde_json::json!({ "stage": stage }),
        ));
    }

    fn cancelled(&self, phase: &mut TurnPhase) {
        info!("Turn cancelled");
        self.transition(phase, TurnPhase::Failed);
        self.turn_logger
            .log(TurnEvent::new("turn_cancelled", serde_json::json!({})));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::generation::{GenerationError, GenerationStream};
    use async_trait::async_trait;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use toolgate_domain::tool::{
        entities::ToolDescriptor,
        provider::{ProviderError, ToolProvider},
        snapshot::CatalogEntry,
    };

    // ==================== Test Mocks ====================

    /// Plays back one scripted event sequence per generation round.
    struct ScriptedGateway {
        rounds: Mutex<VecDeque<Vec<GenerationEvent>>>,
        calls: AtomicUsize,
    }

    impl ScriptedGateway {
        fn new(rounds: Vec<Vec<GenerationEvent>>) -> Self {
            Self {
                rounds: Mutex::new(VecDeque::from(rounds)),
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerationGateway for ScriptedGateway {
        async fn generate(
            &self,
            _transcript: &Transcript,
            _tools: &[ToolDescriptor],
            _mode: TurnMode,
        ) -> Result<GenerationStream, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let script = self
                .rounds
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| GenerationError::RequestFailed("script exhausted".to_string()))?;
            Ok(GenerationStream::from_events(script))
        }
    }

    struct FailingGateway;

    #[async_trait]
    impl GenerationGateway for FailingGateway {
        async fn generate(
            &self,
            _transcript: &Transcript,
            _tools: &[ToolDescriptor],
            _mode: TurnMode,
        ) -> Result<GenerationStream, GenerationError> {
            Err(GenerationError::ConnectionError("backend down".to_string()))
        }
    }

    /// Counts invocations and returns a fixed weather payload.
    struct WeatherProvider {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ToolProvider for WeatherProvider {
        fn id(&self) -> &str {
            "local"
        }

        fn display_name(&self) -> &str {
            "Local Tools"
        }

        async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ProviderError> {
            Ok(vec![])
        }

        async fn invoke(&self, _call: &ToolCall) -> Result<serde_json::Value, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(serde_json::json!({
                "fahrenheit": "20 F",
                "celsius": "-6.67 C",
                "condition": "Sunny",
            }))
        }
    }

    struct HangingProvider;

    #[async_trait]
    impl ToolProvider for HangingProvider {
        fn id(&self) -> &str {
            "hanging"
        }

        fn display_name(&self) -> &str {
            "Hanging"
        }

        async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ProviderError> {
            Ok(vec![])
        }

        async fn invoke(&self, _call: &ToolCall) -> Result<serde_json::Value, ProviderError> {
            tokio::time::sleep(Duration::from_secs(600)).await;
            Ok(serde_json::Value::Null)
        }
    }

    fn snapshot_with(provider: Arc<dyn ToolProvider>, names: &[&str]) -> Arc<CatalogSnapshot> {
        let entries: HashMap<String, CatalogEntry> = names
            .iter()
            .map(|n| {
                (
                    n.to_string(),
                    CatalogEntry {
                        descriptor: ToolDescriptor::new(*n, format!("tool {}", n)),
                        provider: provider.clone(),
                    },
                )
            })
            .collect();
        Arc::new(CatalogSnapshot::new(1, entries))
    }

    fn use_case(gateway: Arc<dyn GenerationGateway>) -> RunTurnUseCase {
        RunTurnUseCase::new(
            gateway,
            ExecutionParams::default().with_tool_timeout(Duration::from_millis(200)),
        )
    }

    // ==================== Tests ====================

    #[tokio::test]
    async fn open_mode_streams_chunks_as_they_arrive() {
        let gateway = Arc::new(ScriptedGateway::new(vec![vec![
            GenerationEvent::Chunk("Hel".to_string()),
            GenerationEvent::Chunk("lo!".to_string()),
            GenerationEvent::Completed,
        ]]));

        let mut handle = use_case(gateway).execute(
            TurnInput::open("hi"),
            Arc::new(CatalogSnapshot::empty()),
            CancellationToken::new(),
        );

        assert_eq!(handle.recv().await.unwrap(), "Hel");
        assert_eq!(handle.recv().await.unwrap(), "lo!");
        assert!(handle.recv().await.is_none());
    }

    #[tokio::test]
    async fn tool_required_without_tool_call_yields_exact_fallback() {
        let gateway = Arc::new(ScriptedGateway::new(vec![vec![
            GenerationEvent::Chunk("Paris is the capital of France.".to_string()),
            GenerationEvent::Completed,
        ]]));

        let handle = use_case(gateway).execute(
            TurnInput::tool_required("capital of France?"),
            Arc::new(CatalogSnapshot::empty()),
            CancellationToken::new(),
        );

        assert_eq!(handle.collect_text().await, FALLBACK_TEXT);
    }

    #[tokio::test]
    async fn empty_catalog_tool_required_joke_yields_exact_fallback() {
        let gateway = Arc::new(ScriptedGateway::new(vec![vec![
            GenerationEvent::Chunk("Why did the chicken cross the road?".to_string()),
            GenerationEvent::Completed,
        ]]));

        let handle = use_case(gateway).execute(
            TurnInput::tool_required("tell me a joke"),
            Arc::new(CatalogSnapshot::empty()),
            CancellationToken::new(),
        );

        assert_eq!(handle.collect_text().await, FALLBACK_TEXT);
    }

    #[tokio::test]
    async fn weather_scenario_invokes_tool_once_and_streams_answer() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = Arc::new(WeatherProvider {
            calls: calls.clone(),
        });
        let snapshot = snapshot_with(provider, &["local_weather"]);

        let gateway = Arc::new(ScriptedGateway::new(vec![
            vec![GenerationEvent::ToolCall(ToolCall::new("local_weather"))],
            vec![
                GenerationEvent::Chunk("It's sunny and around 20 F right now.".to_string()),
                GenerationEvent::Completed,
            ],
        ]));

        let handle = use_case(gateway).execute(
            TurnInput::tool_required("what's the weather?"),
            snapshot,
            CancellationToken::new(),
        );

        let answer = handle.collect_text().await;
        assert_eq!(answer, "It's sunny and around 20 F right now.");
        assert_ne!(answer, FALLBACK_TEXT);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn pre_tool_text_is_withheld_in_tool_required_mode() {
        let provider = Arc::new(WeatherProvider {
            calls: Arc::new(AtomicUsize::new(0)),
        });
        let snapshot = snapshot_with(provider, &["local_weather"]);

        let gateway = Arc::new(ScriptedGateway::new(vec![
            vec![
                GenerationEvent::Chunk("Let me call local_weather for that.".to_string()),
                GenerationEvent::ToolCall(ToolCall::new("local_weather")),
            ],
            vec![
                GenerationEvent::Chunk("Sunny!".to_string()),
                GenerationEvent::Completed,
            ],
        ]));

        let handle = use_case(gateway).execute(
            TurnInput::tool_required("weather?"),
            snapshot,
            CancellationToken::new(),
        );

        // The tool-name-dropping preamble never reaches the caller.
        assert_eq!(handle.collect_text().await, "Sunny!");
    }

    #[tokio::test]
    async fn tool_round_limit_forces_fallback() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = Arc::new(WeatherProvider {
            calls: calls.clone(),
        });
        let snapshot = snapshot_with(provider, &["local_weather"]);

        // A backend that requests another tool call on every round.
        let rounds = (0..10)
            .map(|_| vec![GenerationEvent::ToolCall(ToolCall::new("local_weather"))])
            .collect();
        let gateway = Arc::new(ScriptedGateway::new(rounds));

        let handle = use_case(gateway.clone()).execute(
            TurnInput::open("loop forever"),
            snapshot,
            CancellationToken::new(),
        );

        assert_eq!(handle.collect_text().await, FALLBACK_TEXT);
        // max_tool_rounds invocations, then the next request trips the bound
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(gateway.calls(), 4);
    }

    #[tokio::test]
    async fn unknown_tool_request_maps_to_fallback() {
        let gateway = Arc::new(ScriptedGateway::new(vec![vec![GenerationEvent::ToolCall(
            ToolCall::new("nonexistent_tool"),
        )]]));

        let handle = use_case(gateway).execute(
            TurnInput::open("anything"),
            Arc::new(CatalogSnapshot::empty()),
            CancellationToken::new(),
        );

        assert_eq!(handle.collect_text().await, FALLBACK_TEXT);
    }

    #[tokio::test]
    async fn gateway_error_maps_to_fallback() {
        let handle = use_case(Arc::new(FailingGateway)).execute(
            TurnInput::open("hello"),
            Arc::new(CatalogSnapshot::empty()),
            CancellationToken::new(),
        );

        let answer = handle.collect_text().await;
        assert_eq!(answer, FALLBACK_TEXT);
        assert!(!answer.contains("backend down"));
    }

    #[tokio::test]
    async fn stream_error_event_maps_to_fallback() {
        let gateway = Arc::new(ScriptedGateway::new(vec![vec![GenerationEvent::Error(
            "boom".to_string(),
        )]]));

        let handle = use_case(gateway).execute(
            TurnInput::open("hello"),
            Arc::new(CatalogSnapshot::empty()),
            CancellationToken::new(),
        );

        let answer = handle.collect_text().await;
        assert_eq!(answer, FALLBACK_TEXT);
        assert!(!answer.contains("boom"));
    }

    #[tokio::test]
    async fn structured_payload_output_is_replaced_by_fallback() {
        let gateway = Arc::new(ScriptedGateway::new(vec![vec![
            GenerationEvent::Chunk(r#"{"weather": "20 F", "condition": "Sunny"}"#.to_string()),
            GenerationEvent::Completed,
        ]]));

        let handle = use_case(gateway).execute(
            TurnInput::open("weather?"),
            Arc::new(CatalogSnapshot::empty()),
            CancellationToken::new(),
        );

        assert_eq!(handle.collect_text().await, FALLBACK_TEXT);
    }

    #[tokio::test]
    async fn empty_generation_yields_fallback() {
        let gateway = Arc::new(ScriptedGateway::new(vec![vec![GenerationEvent::Completed]]));

        let handle = use_case(gateway).execute(
            TurnInput::open("hello"),
            Arc::new(CatalogSnapshot::empty()),
            CancellationToken::new(),
        );

        assert_eq!(handle.collect_text().await, FALLBACK_TEXT);
    }

    #[tokio::test]
    async fn cancellation_tears_down_pending_invocation() {
        let snapshot = snapshot_with(Arc::new(HangingProvider), &["slow_tool"]);
        let gateway = Arc::new(ScriptedGateway::new(vec![vec![GenerationEvent::ToolCall(
            ToolCall::new("slow_tool"),
        )]]));

        // Long tool timeout so only cancellation can end the invocation.
        let use_case = RunTurnUseCase::new(
            gateway,
            ExecutionParams::default().with_tool_timeout(Duration::from_secs(600)),
        );

        let cancel = CancellationToken::new();
        let handle = use_case.execute(TurnInput::open("slow"), snapshot, cancel.clone());

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            cancel.cancel();
        });

        let start = std::time::Instant::now();
        let answer = handle.collect_text().await;
        assert!(answer.is_empty());
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
