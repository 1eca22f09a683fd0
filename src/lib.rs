//! Leadbot — conversational lead-qualification engine.
//!
//! A scripted wizard qualifies a prospect over a multi-turn dialogue,
//! accumulating a structured lead record from free-text replies. Once the
//! record is judged complete, the lead is persisted and the session hands
//! off to a personalized demo assistant metered by a message quota.

pub mod config;
pub mod demo;
pub mod engine;
pub mod error;
pub mod llm;
pub mod routes;
pub mod session;
pub mod sink;
pub mod wizard;
