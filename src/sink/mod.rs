//! Lead persistence — append-only sink for finalized records.

pub mod libsql_backend;

pub use libsql_backend::LibSqlLeadSink;

use async_trait::async_trait;

use crate::error::SinkError;
use crate::session::record::LeadRecord;

/// Append-only destination for finalized lead records.
///
/// Called exactly once per session at the handoff instant. Failures are
/// non-fatal to the conversation: callers log and continue, accepting
/// best-effort lead capture.
#[async_trait]
pub trait LeadSink: Send + Sync {
    /// Durably append one finalized record.
    async fn append(&self, session_id: &str, record: &LeadRecord) -> Result<(), SinkError>;
}
