//! Demo assistant + quota gate — the post-handoff conversation.

use std::sync::Arc;

use serde::Serialize;

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};
use crate::session::model::{Session, Turn};
use crate::wizard::prompts::{DEMO_LOCKED_REPLY, demo_system_prompt};

const DEMO_MAX_TOKENS: u32 = 512;
const DEMO_TEMPERATURE: f32 = 0.7;

/// Result of one demo turn, as returned to the inbound API.
#[derive(Debug, Clone, Serialize)]
pub struct DemoTurnResult {
    pub reply: String,
    pub messages_left: u32,
    pub locked: bool,
}

/// Persona assistant parameterized by the qualified record, metered by a
/// fixed per-session message budget.
pub struct DemoAssistant {
    llm: Arc<dyn LlmProvider>,
    config: EngineConfig,
}

impl DemoAssistant {
    pub fn new(llm: Arc<dyn LlmProvider>, config: EngineConfig) -> Self {
        Self { llm, config }
    }

    /// Process one inbound demo message.
    ///
    /// A session still in wizard mode is a precondition violation. An
    /// exhausted quota returns the terminal locked response without
    /// consuming quota or touching the provider. Otherwise the turn is
    /// accepted: the counter increments, and the provider sees the persona
    /// directive plus only the trailing window of the demo transcript.
    pub async fn advance(
        &self,
        session: &mut Session,
        message: &str,
    ) -> Result<DemoTurnResult, EngineError> {
        if !session.is_demo() {
            return Err(EngineError::DemoNotReady {
                session_id: session.id.clone(),
            });
        }

        let limit = self.config.demo_message_limit;
        if session.demo_message_count >= limit {
            return Ok(DemoTurnResult {
                reply: DEMO_LOCKED_REPLY.to_string(),
                messages_left: 0,
                locked: true,
            });
        }

        session.demo_message_count += 1;
        session.push_demo_turn(Turn::user(message));

        let mut messages = vec![ChatMessage::system(demo_system_prompt(&session.record))];
        let window_start = session
            .demo_transcript
            .len()
            .saturating_sub(self.config.demo_context_turns);
        messages.extend(
            session.demo_transcript[window_start..]
                .iter()
                .map(ChatMessage::from),
        );

        let request = CompletionRequest::new(messages)
            .with_max_tokens(DEMO_MAX_TOKENS)
            .with_temperature(DEMO_TEMPERATURE);
        let response = self.llm.complete(request).await?;

        session.push_demo_turn(Turn::assistant(&response.content));

        let messages_left = session.demo_messages_left(limit);
        if messages_left == 0 {
            tracing::info!(session_id = %session.id, limit, "demo quota exhausted");
        }

        Ok(DemoTurnResult {
            reply: response.content,
            messages_left,
            locked: messages_left == 0,
        })
    }
}

// End-to-end gate behavior (quota countdown, lock, precondition) is covered
// in tests/engine_flow.rs with a scripted provider.
