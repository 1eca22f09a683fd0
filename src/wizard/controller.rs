//! Wizard stage controller — drives qualification turn by turn.

use std::sync::Arc;

use serde::Serialize;

use crate::error::EngineError;
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};
use crate::session::model::{Session, SessionMode, Turn};
use crate::session::record::ExtractedFields;
use crate::sink::LeadSink;
use crate::wizard::prompts::{
    ALREADY_ACTIVE_REPLY, handoff_message, parse_wizard_reply, wizard_system_prompt,
};
use crate::wizard::stage::WizardStage;

const WIZARD_MAX_TOKENS: u32 = 1024;
const WIZARD_TEMPERATURE: f32 = 0.3;

/// Result of one wizard turn, as returned to the inbound API.
#[derive(Debug, Clone, Serialize)]
pub struct WizardTurnResult {
    pub reply: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_data: Option<ExtractedFields>,
    pub ready_for_demo: bool,
}

/// Coordinates the qualification flow: provider calls, record accumulation,
/// and the one-way handoff into demo mode.
pub struct WizardController {
    llm: Arc<dyn LlmProvider>,
    sink: Arc<dyn LeadSink>,
}

impl WizardController {
    pub fn new(llm: Arc<dyn LlmProvider>, sink: Arc<dyn LeadSink>) -> Self {
        Self { llm, sink }
    }

    /// Process one inbound wizard message.
    ///
    /// 1. Short-circuit if the session already handed off.
    /// 2. Append the user turn; ask the provider for a structured reply over
    ///    the full wizard transcript.
    /// 3. Parse (or degrade) the output and merge `extracted_data`.
    /// 4. On `ready_for_demo`: render the deterministic handoff summary,
    ///    persist the lead, and flip the session into demo mode.
    pub async fn advance(
        &self,
        session: &mut Session,
        message: &str,
    ) -> Result<WizardTurnResult, EngineError> {
        if session.stage.is_terminal() {
            return Ok(WizardTurnResult {
                reply: ALREADY_ACTIVE_REPLY.to_string(),
                extracted_data: None,
                ready_for_demo: true,
            });
        }

        session.push_wizard_turn(Turn::user(message));

        let mut messages = vec![ChatMessage::system(wizard_system_prompt())];
        messages.extend(session.wizard_transcript.iter().map(ChatMessage::from));

        let request = CompletionRequest::new(messages)
            .with_max_tokens(WIZARD_MAX_TOKENS)
            .with_temperature(WIZARD_TEMPERATURE)
            .structured();
        let response = self.llm.complete(request).await?;

        let parsed = parse_wizard_reply(&response.content);
        if parsed.degraded {
            tracing::warn!(
                session_id = %session.id,
                "provider output was not parseable; degrading to plain-text turn"
            );
        }

        session.record.merge(&parsed.extracted);

        let reply = if parsed.ready_for_demo {
            self.hand_off(session).await
        } else {
            parsed.reply
        };

        session.push_wizard_turn(Turn::assistant(&reply));

        Ok(WizardTurnResult {
            reply,
            extracted_data: (!parsed.degraded).then(|| parsed.extracted.clone()),
            ready_for_demo: parsed.ready_for_demo,
        })
    }

    /// Finalize qualification: persist the lead and flip into demo mode.
    ///
    /// Sink failures are logged and swallowed — lead capture is best-effort
    /// and must never block the handoff or the reply.
    async fn hand_off(&self, session: &mut Session) -> String {
        session.advance_stage(WizardStage::Ready);
        tracing::info!(
            session_id = %session.id,
            missing = session.record.missing_fields().len(),
            "qualification complete"
        );

        let reply = handoff_message(&session.record);

        match self.sink.append(&session.id, &session.record).await {
            Ok(()) => tracing::info!(session_id = %session.id, "lead persisted"),
            Err(e) => tracing::warn!(
                session_id = %session.id,
                error = %e,
                "failed to persist lead; continuing handoff"
            ),
        }

        session.mode = SessionMode::Demo;
        session.advance_stage(WizardStage::HandedOff);
        tracing::info!(session_id = %session.id, "handed off to demo mode");

        reply
    }
}

// Tests for the controller need a scripted LlmProvider and a recording
// LeadSink; they live in tests/engine_flow.rs alongside the other
// end-to-end engine tests.
