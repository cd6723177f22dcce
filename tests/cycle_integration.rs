//! End-to-end cycle tests over the public API: scripted upstream,
//! in-memory store, recording connection sink.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chat_relay::adapters::generation::{ScriptedGenerationService, ScriptedResponse};
use chat_relay::adapters::relay::DuplexRelay;
use chat_relay::adapters::store::{InMemoryKeyValueStore, KvSessionStore};
use chat_relay::application::{CycleStatus, InboundMessage, SessionEngine};
use chat_relay::config::{GenerationConfig, UpstreamVariant};
use chat_relay::domain::Role;
use chat_relay::ports::{
    ConnectionSink, ConnectionTarget, DeltaEvent, DeliveryError, GenerationError, SessionStore,
};

/// Records every delivered frame; can be switched to refuse delivery.
#[derive(Default)]
struct RecordingSink {
    payloads: Mutex<Vec<String>>,
    refuse: AtomicBool,
}

impl RecordingSink {
    fn refuse_delivery(&self) {
        self.refuse.store(true, Ordering::SeqCst);
    }

    fn frames(&self) -> Vec<serde_json::Value> {
        self.payloads
            .lock()
            .unwrap()
            .iter()
            .map(|p| serde_json::from_str(p).unwrap())
            .collect()
    }
}

#[async_trait]
impl ConnectionSink for RecordingSink {
    async fn post(&self, _target: &ConnectionTarget, payload: &str) -> Result<(), DeliveryError> {
        if self.refuse.load(Ordering::SeqCst) {
            return Err(DeliveryError::PeerGone);
        }
        self.payloads.lock().unwrap().push(payload.to_string());
        Ok(())
    }
}

struct Harness {
    engine: SessionEngine<
        ScriptedGenerationService,
        KvSessionStore<InMemoryKeyValueStore>,
        RecordingSink,
    >,
    sink: Arc<RecordingSink>,
    kv: Arc<InMemoryKeyValueStore>,
    store: Arc<KvSessionStore<InMemoryKeyValueStore>>,
}

fn harness(service: ScriptedGenerationService, variant: UpstreamVariant) -> Harness {
    let kv = Arc::new(InMemoryKeyValueStore::new());
    let store = Arc::new(KvSessionStore::new(Arc::clone(&kv), "chat-sessions"));
    let sink = Arc::new(RecordingSink::default());
    let config = GenerationConfig {
        variant,
        ..GenerationConfig::default()
    };
    let engine = SessionEngine::new(
        Arc::new(service),
        Arc::clone(&store),
        DuplexRelay::new(Arc::clone(&sink)),
        config,
    )
    .expect("default template is valid");
    Harness {
        engine,
        sink,
        kv,
        store,
    }
}

fn message(input: &str) -> InboundMessage {
    InboundMessage::new("session-1", "wss://example/prod", "conn-1", input)
}

/// Asserts the wire-protocol closing invariant: exactly one `end` frame,
/// and it is the last frame delivered.
fn assert_single_trailing_end(frames: &[serde_json::Value]) {
    let end_count = frames.iter().filter(|f| f["kind"] == "end").count();
    assert_eq!(end_count, 1, "expected exactly one end frame: {frames:?}");
    assert_eq!(frames.last().unwrap()["kind"], "end");
}

fn token_text(frames: &[serde_json::Value]) -> String {
    frames
        .iter()
        .filter(|f| f["kind"] == "token")
        .map(|f| f["chunk"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn first_message_streams_reply_and_persists_both_turns() {
    let service = ScriptedGenerationService::new().with_delta_text(["Hel", "lo"]);
    let h = harness(service, UpstreamVariant::Delta);

    let result = h.engine.handle(message("hi")).await;

    assert_eq!(result.status, CycleStatus::Done);
    assert!(result.persisted);

    let frames = h.sink.frames();
    assert!(frames.iter().any(|f| f["kind"] == "token"));
    assert_single_trailing_end(&frames);
    assert_eq!(token_text(&frames), "Hello\n");

    let transcript = h.store.load("session-1").await;
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript.turns()[0].role, Role::Human);
    assert_eq!(transcript.turns()[0].content, "hi");
    assert_eq!(transcript.reply_text(), Some("Hello\n"));
}

#[tokio::test]
async fn batch_outputs_become_ordered_token_frames() {
    let service = ScriptedGenerationService::new().with_batch(["alpha", "beta"]);
    let h = harness(service, UpstreamVariant::Batch);

    let result = h.engine.handle(message("hi")).await;

    assert_eq!(result.status, CycleStatus::Done);
    let frames = h.sink.frames();
    assert_eq!(frames.len(), 3);
    assert_eq!(frames[0], serde_json::json!({"kind": "token", "chunk": "alpha"}));
    assert_eq!(frames[1], serde_json::json!({"kind": "token", "chunk": "beta"}));
    assert_single_trailing_end(&frames);
}

#[tokio::test]
async fn zero_output_batch_closes_with_bare_end() {
    let service = ScriptedGenerationService::new().with_batch(Vec::<String>::new());
    let h = harness(service, UpstreamVariant::Batch);

    let result = h.engine.handle(message("hi")).await;

    assert_eq!(result.status, CycleStatus::Done);
    let frames = h.sink.frames();
    assert_eq!(frames.len(), 1);
    assert_single_trailing_end(&frames);

    // The empty assistant turn is still recorded.
    let transcript = h.store.load("session-1").await;
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript.reply_text(), Some(""));
}

#[tokio::test]
async fn legacy_fragments_relay_one_to_one() {
    let service = ScriptedGenerationService::new().with_legacy_text(["one", "", " two"]);
    let h = harness(service, UpstreamVariant::Legacy);

    h.engine.handle(message("hi")).await;

    let frames = h.sink.frames();
    let chunks: Vec<_> = frames
        .iter()
        .filter(|f| f["kind"] == "token")
        .map(|f| f["chunk"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(chunks, vec!["one", "", " two"]);
    assert_single_trailing_end(&frames);
}

#[tokio::test]
async fn dropped_client_still_accumulates_full_transcript() {
    let service = ScriptedGenerationService::new().with_delta_text(["full", " reply"]);
    let h = harness(service, UpstreamVariant::Delta);
    h.sink.refuse_delivery();

    let result = h.engine.handle(message("hi")).await;

    assert_eq!(result.status, CycleStatus::Done);
    assert_eq!(result.delivered_event_count, 0);
    assert!(result.persisted);

    let transcript = h.store.load("session-1").await;
    assert_eq!(transcript.reply_text(), Some("full reply\n"));
}

#[tokio::test]
async fn mid_stream_fault_persists_partial_reply_and_signals_error() {
    let service = ScriptedGenerationService::new().with_response(ScriptedResponse::Delta(vec![
        Ok(DeltaEvent::text("partial")),
        Err(GenerationError::transport("connection reset")),
    ]));
    let h = harness(service, UpstreamVariant::Delta);

    let result = h.engine.handle(message("hi")).await;

    assert_eq!(result.status, CycleStatus::Failed);
    assert!(result.persisted);

    let frames = h.sink.frames();
    assert_eq!(frames[0], serde_json::json!({"kind": "token", "chunk": "partial"}));
    assert_eq!(frames[1], serde_json::json!({"kind": "error"}));
    assert_single_trailing_end(&frames);

    let transcript = h.store.load("session-1").await;
    assert_eq!(transcript.reply_text(), Some("partial"));
}

#[tokio::test]
async fn invoke_failure_yields_error_then_end_and_empty_reply() {
    let service = ScriptedGenerationService::new()
        .with_invoke_error(GenerationError::transport("unreachable"));
    let h = harness(service, UpstreamVariant::Delta);

    let result = h.engine.handle(message("hi")).await;

    assert_eq!(result.status, CycleStatus::Failed);
    let frames = h.sink.frames();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0]["kind"], "error");
    assert_single_trailing_end(&frames);
}

#[tokio::test]
async fn save_failure_reports_unpersisted_cycle_but_client_sees_reply() {
    let service = ScriptedGenerationService::new().with_delta_text(["hello"]);
    let h = harness(service, UpstreamVariant::Delta);
    h.kv.set_fail_writes(true);

    let result = h.engine.handle(message("hi")).await;

    assert_eq!(result.status, CycleStatus::Failed);
    assert!(!result.persisted);
    let frames = h.sink.frames();
    assert!(frames.iter().any(|f| f["kind"] == "token"));
    assert_single_trailing_end(&frames);
}

#[tokio::test]
async fn shape_mismatch_fails_the_cycle_with_error_frame() {
    // Configured for delta events, upstream answers with a batch.
    let service = ScriptedGenerationService::new().with_batch(["surprise"]);
    let h = harness(service, UpstreamVariant::Delta);

    let result = h.engine.handle(message("hi")).await;

    assert_eq!(result.status, CycleStatus::Failed);
    let frames = h.sink.frames();
    assert_eq!(frames[0]["kind"], "error");
    assert_single_trailing_end(&frames);
}

#[tokio::test]
async fn history_accumulates_across_cycles() {
    let service = ScriptedGenerationService::new()
        .with_batch(["first answer"])
        .with_batch(["second answer"]);
    let h = harness(service.clone(), UpstreamVariant::Batch);

    h.engine.handle(message("first question")).await;
    h.engine.handle(message("second question")).await;

    let transcript = h.store.load("session-1").await;
    assert_eq!(transcript.len(), 4);
    let contents: Vec<_> = transcript.turns().iter().map(|t| t.content.as_str()).collect();
    assert_eq!(
        contents,
        vec![
            "first question",
            "first answer",
            "second question",
            "second answer",
        ]
    );

    // The second prompt carries the first exchange as rendered history.
    let second_prompt = &service.calls()[1].prompt;
    assert!(second_prompt.contains("Human: first question"));
    assert!(second_prompt.contains("Assistant: first answer"));
    assert_eq!(second_prompt.matches("second question").count(), 1);
}

#[tokio::test]
async fn sessions_are_isolated_by_identifier() {
    let service = ScriptedGenerationService::new()
        .with_batch(["for a"])
        .with_batch(["for b"]);
    let h = harness(service, UpstreamVariant::Batch);

    h.engine.handle(message("hi from a")).await;
    h.engine
        .handle(InboundMessage::new(
            "session-2",
            "wss://example/prod",
            "conn-2",
            "hi from b",
        ))
        .await;

    let a = h.store.load("session-1").await;
    let b = h.store.load("session-2").await;
    assert_eq!(a.reply_text(), Some("for a"));
    assert_eq!(b.reply_text(), Some("for b"));
}
