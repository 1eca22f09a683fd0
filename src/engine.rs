//! Engine — ties the session store, wizard controller, and demo gate
//! together behind the two inbound operations.

use std::sync::Arc;

use serde::Serialize;

use crate::config::EngineConfig;
use crate::demo::{DemoAssistant, DemoTurnResult};
use crate::error::EngineError;
use crate::llm::LlmProvider;
use crate::session::model::SessionMode;
use crate::session::record::LeadRecord;
use crate::session::store::SessionStore;
use crate::sink::LeadSink;
use crate::wizard::stage::WizardStage;
use crate::wizard::{WizardController, WizardTurnResult};

/// Snapshot of one session for the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub session_id: String,
    pub mode: SessionMode,
    pub stage: WizardStage,
    pub record: LeadRecord,
    pub demo_messages_left: u32,
    pub locked: bool,
}

/// The conversational lead-qualification engine.
///
/// Each inbound call resolves its session and holds that session's lock for
/// the whole turn, so transcript appends, record merges, the mode flip, and
/// the quota increment never interleave across concurrent messages on the
/// same identifier. The provider call happens under that per-session lock;
/// unrelated sessions are unaffected.
pub struct Engine {
    store: SessionStore,
    wizard: WizardController,
    demo: DemoAssistant,
    config: EngineConfig,
}

impl Engine {
    pub fn new(llm: Arc<dyn LlmProvider>, sink: Arc<dyn LeadSink>, config: EngineConfig) -> Self {
        Self {
            store: SessionStore::new(),
            wizard: WizardController::new(Arc::clone(&llm), sink),
            demo: DemoAssistant::new(llm, config.clone()),
            config,
        }
    }

    /// Advance the qualification dialogue by one user message.
    pub async fn advance_wizard(
        &self,
        session_id: &str,
        message: &str,
    ) -> Result<WizardTurnResult, EngineError> {
        let handle = self.store.get_or_create(session_id).await;
        let mut session = handle.lock().await;
        self.wizard.advance(&mut session, message).await
    }

    /// Advance the demo dialogue by one user message.
    pub async fn advance_demo(
        &self,
        session_id: &str,
        message: &str,
    ) -> Result<DemoTurnResult, EngineError> {
        let handle = self.store.get_or_create(session_id).await;
        let mut session = handle.lock().await;
        self.demo.advance(&mut session, message).await
    }

    /// Snapshot an existing session, if any.
    pub async fn session_status(&self, session_id: &str) -> Option<SessionStatus> {
        let handle = self.store.get(session_id).await?;
        let session = handle.lock().await;
        let demo_messages_left = session.demo_messages_left(self.config.demo_message_limit);
        Some(SessionStatus {
            session_id: session.id.clone(),
            mode: session.mode,
            stage: session.stage,
            record: session.record.clone(),
            demo_messages_left,
            locked: session.is_demo() && demo_messages_left == 0,
        })
    }

    /// Number of sessions seen by this process.
    pub async fn session_count(&self) -> usize {
        self.store.len().await
    }
}
