//! Session state — one per conversation identifier.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::llm::ChatMessage;
use crate::session::record::LeadRecord;
use crate::wizard::stage::WizardStage;

/// Which assistant currently owns the conversation.
///
/// Flips once, irreversibly, `Wizard → Demo`, when qualification completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    Wizard,
    Demo,
}

impl std::fmt::Display for SessionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Wizard => write!(f, "wizard"),
            Self::Demo => write!(f, "demo"),
        }
    }
}

/// Role of one transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    User,
    Assistant,
}

/// One turn in a transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
    pub at: DateTime<Utc>,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
            at: Utc::now(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            text: text.into(),
            at: Utc::now(),
        }
    }
}

impl From<&Turn> for ChatMessage {
    fn from(turn: &Turn) -> Self {
        match turn.role {
            TurnRole::User => ChatMessage::user(&turn.text),
            TurnRole::Assistant => ChatMessage::assistant(&turn.text),
        }
    }
}

/// The durable state of one end-to-end conversation.
///
/// Owned exclusively by the `SessionStore`; collaborators only ever see
/// read-only snapshots (transcript slices, the finalized record).
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub mode: SessionMode,
    pub stage: WizardStage,
    /// Qualification dialogue. Append-only, never pruned.
    pub wizard_transcript: Vec<Turn>,
    /// Post-handoff dialogue. Append-only; only a trailing window is
    /// forwarded to the provider, but the full transcript is retained.
    pub demo_transcript: Vec<Turn>,
    pub record: LeadRecord,
    /// Accepted demo turns so far. Monotone, never decremented.
    pub demo_message_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            mode: SessionMode::Wizard,
            stage: WizardStage::default(),
            wizard_transcript: Vec::new(),
            demo_transcript: Vec::new(),
            record: LeadRecord::default(),
            demo_message_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn push_wizard_turn(&mut self, turn: Turn) {
        self.wizard_transcript.push(turn);
        self.updated_at = Utc::now();
    }

    pub fn push_demo_turn(&mut self, turn: Turn) {
        self.demo_transcript.push(turn);
        self.updated_at = Utc::now();
    }

    pub fn is_demo(&self) -> bool {
        self.mode == SessionMode::Demo
    }

    /// Advance the wizard stage, refusing anything but the linear
    /// progression. Returns whether the transition was applied.
    pub fn advance_stage(&mut self, next: WizardStage) -> bool {
        if !self.stage.can_transition_to(next) {
            return false;
        }
        self.stage = next;
        self.updated_at = Utc::now();
        true
    }

    /// Remaining demo quota under the given limit.
    pub fn demo_messages_left(&self, limit: u32) -> u32 {
        limit.saturating_sub(self.demo_message_count)
    }
}
