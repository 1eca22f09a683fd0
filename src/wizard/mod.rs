//! Qualification wizard — the pre-handoff conversation.
//!
//! The wizard drives a guided dialogue that fills a `LeadRecord` from
//! free-text replies. The provider proposes field values and signals
//! readiness; the engine owns the merge, the committed summary text, and the
//! one-way flip into demo mode.

pub mod controller;
pub mod prompts;
pub mod stage;

pub use controller::{WizardController, WizardTurnResult};
pub use prompts::{ALREADY_ACTIVE_REPLY, DEMO_LOCKED_REPLY, MISSING_PLACEHOLDER};
pub use stage::WizardStage;
