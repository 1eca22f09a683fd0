//! Post-handoff demo assistant and its message-quota gate.

pub mod assistant;

pub use assistant::{DemoAssistant, DemoTurnResult};
