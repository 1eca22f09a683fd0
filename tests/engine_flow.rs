//! End-to-end engine tests with a scripted provider and recording sink.
//!
//! These drive the real wizard/demo flow: merge-and-accumulate across turns,
//! the handoff into demo mode, the quota gate, and the degrade paths.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use leadbot::config::EngineConfig;
use leadbot::engine::Engine;
use leadbot::error::{EngineError, ProviderError, SinkError};
use leadbot::llm::{CompletionRequest, CompletionResponse, LlmProvider, Role};
use leadbot::session::{LeadRecord, SessionMode};
use leadbot::sink::LeadSink;
use leadbot::wizard::{ALREADY_ACTIVE_REPLY, WizardStage};

/// Scripted LLM provider: pops one canned reply per call, errors when the
/// script runs dry (so a test fails loudly if the engine calls unexpectedly).
/// Every request is captured so tests can inspect what the engine sent.
struct ScriptedLlm {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<CompletionRequest>>,
    calls: AtomicUsize,
}

impl ScriptedLlm {
    fn new(replies: Vec<String>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        match self.replies.lock().unwrap().pop_front() {
            Some(content) => Ok(CompletionResponse { content }),
            None => Err(ProviderError::RequestFailed {
                provider: "scripted".to_string(),
                reason: "script exhausted".to_string(),
            }),
        }
    }
}

/// In-memory sink that records every append.
#[derive(Default)]
struct RecordingSink {
    leads: Mutex<Vec<(String, LeadRecord)>>,
}

impl RecordingSink {
    fn leads(&self) -> Vec<(String, LeadRecord)> {
        self.leads.lock().unwrap().clone()
    }
}

#[async_trait]
impl LeadSink for RecordingSink {
    async fn append(&self, session_id: &str, record: &LeadRecord) -> Result<(), SinkError> {
        self.leads
            .lock()
            .unwrap()
            .push((session_id.to_string(), record.clone()));
        Ok(())
    }
}

/// Sink that always fails, for the best-effort persistence path.
struct FailingSink;

#[async_trait]
impl LeadSink for FailingSink {
    async fn append(&self, _session_id: &str, _record: &LeadRecord) -> Result<(), SinkError> {
        Err(SinkError::Query("disk on fire".to_string()))
    }
}

fn wizard_json(reply: &str, extracted: serde_json::Value, ready: bool) -> String {
    serde_json::json!({
        "reply": reply,
        "extracted_data": extracted,
        "ready_for_demo": ready,
    })
    .to_string()
}

/// A turn that extracts every field and signals readiness.
fn ready_turn() -> String {
    wizard_json(
        "All set!",
        serde_json::json!({
            "customer_name": "Ana",
            "email": "a@b.com",
            "business_name": "Flores Ana",
            "industry": "retail",
            "channel": "whatsapp",
            "problem": "missed orders after hours",
            "bot_name": "FloraBot",
        }),
        true,
    )
}

fn engine_with(
    llm: Arc<ScriptedLlm>,
    sink: Arc<dyn LeadSink>,
    demo_limit: u32,
) -> Engine {
    let config = EngineConfig {
        demo_message_limit: demo_limit,
        ..Default::default()
    };
    Engine::new(llm, sink, config)
}

// ── Wizard flow ─────────────────────────────────────────────────────

#[tokio::test]
async fn two_turn_wizard_merges_with_first_write_wins() {
    let llm = ScriptedLlm::new(vec![
        wizard_json(
            "Nice to meet you, Ana! What's your email?",
            serde_json::json!({ "customer_name": "Ana" }),
            false,
        ),
        wizard_json(
            "Great, got everything!",
            serde_json::json!({
                "customer_name": "Ignored",
                "email": "a@b.com",
                "business_name": "Flores Ana",
                "industry": "retail",
                "channel": "whatsapp",
                "problem": "missed orders after hours",
                "bot_name": "FloraBot",
            }),
            true,
        ),
    ]);
    let sink = Arc::new(RecordingSink::default());
    let engine = engine_with(Arc::clone(&llm), sink.clone(), 10);

    let turn1 = engine.advance_wizard("s-1", "Hi, I'm Ana").await.unwrap();
    assert!(!turn1.ready_for_demo);
    assert!(turn1.reply.contains("Ana"));

    let turn2 = engine
        .advance_wizard("s-1", "a@b.com — it's for my flower shop")
        .await
        .unwrap();
    assert!(turn2.ready_for_demo);

    // The handoff reply is rendered by the engine from the record, not by
    // the model: first-written name survives, email is the new value.
    assert!(turn2.reply.contains("Ana"));
    assert!(turn2.reply.contains("a@b.com"));
    assert!(turn2.reply.contains("FloraBot"));
    assert!(!turn2.reply.contains("Ignored"));

    let leads = sink.leads();
    assert_eq!(leads.len(), 1);
    let (session_id, record) = &leads[0];
    assert_eq!(session_id, "s-1");
    assert_eq!(record.customer_name.as_deref(), Some("Ana"));
    assert_eq!(record.email.as_deref(), Some("a@b.com"));

    let status = engine.session_status("s-1").await.unwrap();
    assert_eq!(status.mode, SessionMode::Demo);
    assert_eq!(status.stage, WizardStage::HandedOff);
}

#[tokio::test]
async fn malformed_output_degrades_and_keeps_collecting() {
    let llm = ScriptedLlm::new(vec!["Sure! What's the name of your business?".to_string()]);
    let sink = Arc::new(RecordingSink::default());
    let engine = engine_with(Arc::clone(&llm), sink.clone(), 10);

    let turn = engine.advance_wizard("s-1", "hello").await.unwrap();
    assert_eq!(turn.reply, "Sure! What's the name of your business?");
    assert!(!turn.ready_for_demo);
    assert!(turn.extracted_data.is_none());

    let status = engine.session_status("s-1").await.unwrap();
    assert_eq!(status.mode, SessionMode::Wizard);
    assert_eq!(status.stage, WizardStage::Collecting);
    assert!(sink.leads().is_empty());
}

#[tokio::test]
async fn handoff_renders_placeholders_for_absent_fields() {
    // Model claims readiness while fields are still missing; the committed
    // summary must show placeholders instead of fabricated values.
    let llm = ScriptedLlm::new(vec![wizard_json(
        "Done!",
        serde_json::json!({ "customer_name": "Ana", "bot_name": "FloraBot" }),
        true,
    )]);
    let sink = Arc::new(RecordingSink::default());
    let engine = engine_with(Arc::clone(&llm), sink.clone(), 10);

    let turn = engine.advance_wizard("s-1", "just make it").await.unwrap();
    assert!(turn.ready_for_demo);
    assert!(turn.reply.contains("Ana"));
    assert!(turn.reply.contains("(not provided)"));

    let leads = sink.leads();
    assert_eq!(leads.len(), 1);
    assert!(leads[0].1.email.is_none());
}

#[tokio::test]
async fn wizard_after_handoff_short_circuits_without_provider_call() {
    let llm = ScriptedLlm::new(vec![ready_turn()]);
    let sink = Arc::new(RecordingSink::default());
    let engine = engine_with(Arc::clone(&llm), sink.clone(), 10);

    engine.advance_wizard("s-1", "everything").await.unwrap();
    let calls_after_handoff = llm.calls();

    let turn = engine.advance_wizard("s-1", "hello again").await.unwrap();
    assert_eq!(turn.reply, ALREADY_ACTIVE_REPLY);
    assert!(turn.ready_for_demo);
    assert_eq!(llm.calls(), calls_after_handoff);

    // And the lead was persisted exactly once.
    assert_eq!(sink.leads().len(), 1);
}

#[tokio::test]
async fn sink_failure_does_not_block_handoff() {
    let llm = ScriptedLlm::new(vec![ready_turn()]);
    let engine = engine_with(Arc::clone(&llm), Arc::new(FailingSink), 10);

    let turn = engine.advance_wizard("s-1", "everything").await.unwrap();
    assert!(turn.ready_for_demo);
    assert!(turn.reply.contains("FloraBot"));

    let status = engine.session_status("s-1").await.unwrap();
    assert_eq!(status.mode, SessionMode::Demo);
}

#[tokio::test]
async fn provider_failure_surfaces_as_engine_error() {
    let llm = ScriptedLlm::new(Vec::new());
    let engine = engine_with(Arc::clone(&llm), Arc::new(RecordingSink::default()), 10);

    let result = engine.advance_wizard("s-1", "hello").await;
    assert!(matches!(result, Err(EngineError::Provider(_))));
}

// ── Demo gate ───────────────────────────────────────────────────────

#[tokio::test]
async fn demo_before_handoff_is_a_precondition_violation() {
    let llm = ScriptedLlm::new(Vec::new());
    let engine = engine_with(Arc::clone(&llm), Arc::new(RecordingSink::default()), 10);

    let result = engine.advance_demo("s-1", "hi bot").await;
    match result {
        Err(EngineError::DemoNotReady { session_id }) => assert_eq!(session_id, "s-1"),
        other => panic!("expected DemoNotReady, got {other:?}"),
    }
    // No provider call happened.
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn demo_quota_counts_down_and_locks() {
    let llm = ScriptedLlm::new(vec![
        ready_turn(),
        "Hello! How can I help?".to_string(),
        "We open at 9am.".to_string(),
        "You're welcome!".to_string(),
    ]);
    let engine = engine_with(Arc::clone(&llm), Arc::new(RecordingSink::default()), 3);

    engine.advance_wizard("s-1", "everything").await.unwrap();

    let turn1 = engine.advance_demo("s-1", "hi").await.unwrap();
    assert_eq!(turn1.messages_left, 2);
    assert!(!turn1.locked);

    let turn2 = engine.advance_demo("s-1", "when do you open?").await.unwrap();
    assert_eq!(turn2.messages_left, 1);
    assert!(!turn2.locked);

    let turn3 = engine.advance_demo("s-1", "thanks").await.unwrap();
    assert_eq!(turn3.messages_left, 0);
    assert!(turn3.locked);
    assert_eq!(turn3.reply, "You're welcome!");

    // Fourth call: locked terminal response, no provider call, no quota burn.
    let calls_before = llm.calls();
    let turn4 = engine.advance_demo("s-1", "one more?").await.unwrap();
    assert!(turn4.locked);
    assert_eq!(turn4.messages_left, 0);
    assert_eq!(llm.calls(), calls_before);

    // And it stays locked.
    let turn5 = engine.advance_demo("s-1", "please?").await.unwrap();
    assert!(turn5.locked);

    let status = engine.session_status("s-1").await.unwrap();
    assert!(status.locked);
    assert_eq!(status.demo_messages_left, 0);
}

#[tokio::test]
async fn demo_prompt_forwards_only_the_trailing_window() {
    let mut script = vec![ready_turn()];
    script.extend((0..8).map(|i| format!("demo reply {i}")));
    let llm = ScriptedLlm::new(script);
    let engine = engine_with(Arc::clone(&llm), Arc::new(RecordingSink::default()), 20);

    engine.advance_wizard("s-1", "everything").await.unwrap();
    for i in 0..8 {
        engine.advance_demo("s-1", &format!("msg {i}")).await.unwrap();
    }

    // The transcript holds 15 turns by the last call, but the provider sees
    // the persona directive plus only the trailing window.
    let request = llm.last_request().unwrap();
    assert_eq!(request.messages[0].role, Role::System);
    assert!(request.messages[0].content.contains("FloraBot"));

    let turns = &request.messages[1..];
    assert_eq!(turns.len(), 6);
    assert_eq!(turns.last().unwrap().role, Role::User);
    assert_eq!(turns.last().unwrap().content, "msg 7");
}

#[tokio::test]
async fn demo_provider_failure_surfaces_as_engine_error() {
    let llm = ScriptedLlm::new(vec![ready_turn()]);
    let engine = engine_with(Arc::clone(&llm), Arc::new(RecordingSink::default()), 3);

    engine.advance_wizard("s-1", "everything").await.unwrap();
    let result = engine.advance_demo("s-1", "hi").await;
    assert!(matches!(result, Err(EngineError::Provider(_))));
}

// ── Store behavior through the engine ───────────────────────────────

#[tokio::test]
async fn sessions_are_independent() {
    let llm = ScriptedLlm::new(vec![
        "plain reply for session a".to_string(),
        "plain reply for session b".to_string(),
    ]);
    let engine = engine_with(Arc::clone(&llm), Arc::new(RecordingSink::default()), 10);

    engine.advance_wizard("a", "hi").await.unwrap();
    engine.advance_wizard("b", "hi").await.unwrap();

    assert_eq!(engine.session_count().await, 2);
    assert!(engine.session_status("c").await.is_none());
}
