//! libSQL lead sink — async append-only persistence for qualified leads.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::SinkError;
use crate::session::record::LeadRecord;
use crate::sink::LeadSink;

/// libSQL-backed lead sink.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlLeadSink {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlLeadSink {
    /// Open (or create) a local database file and ensure the schema.
    pub async fn new_local(path: &Path) -> Result<Self, SinkError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SinkError::Open(format!("failed to create sink directory: {e}")))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| SinkError::Open(format!("failed to open libSQL database: {e}")))?;
        let sink = Self::from_db(db).await?;
        info!(path = %path.display(), "lead sink opened");
        Ok(sink)
    }

    /// Create an in-memory sink (for tests).
    pub async fn new_memory() -> Result<Self, SinkError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| SinkError::Open(format!("failed to create in-memory database: {e}")))?;
        Self::from_db(db).await
    }

    async fn from_db(db: LibSqlDatabase) -> Result<Self, SinkError> {
        let conn = db
            .connect()
            .map_err(|e| SinkError::Open(format!("failed to create connection: {e}")))?;

        let sink = Self {
            db: Arc::new(db),
            conn,
        };
        sink.init_schema().await?;
        Ok(sink)
    }

    async fn init_schema(&self) -> Result<(), SinkError> {
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS leads (
                    id TEXT PRIMARY KEY,
                    session_id TEXT NOT NULL,
                    customer_name TEXT,
                    email TEXT,
                    business_name TEXT,
                    industry TEXT,
                    channel TEXT,
                    problem TEXT,
                    bot_name TEXT,
                    captured_at TEXT NOT NULL
                )",
                (),
            )
            .await
            .map_err(|e| SinkError::Open(format!("create leads table: {e}")))?;

        self.conn
            .execute(
                "CREATE INDEX IF NOT EXISTS idx_leads_session ON leads(session_id)",
                (),
            )
            .await
            .map_err(|e| SinkError::Open(format!("create leads index: {e}")))?;

        Ok(())
    }

    /// Total number of persisted leads.
    pub async fn lead_count(&self) -> Result<u64, SinkError> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM leads", ())
            .await
            .map_err(|e| SinkError::Query(format!("lead_count: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => {
                let count: i64 = row
                    .get(0)
                    .map_err(|e| SinkError::Query(format!("lead_count row parse: {e}")))?;
                Ok(count as u64)
            }
            Ok(None) => Ok(0),
            Err(e) => Err(SinkError::Query(format!("lead_count: {e}"))),
        }
    }
}

fn opt_text(value: &Option<String>) -> libsql::Value {
    match value {
        Some(text) => libsql::Value::Text(text.clone()),
        None => libsql::Value::Null,
    }
}

#[async_trait]
impl LeadSink for LibSqlLeadSink {
    async fn append(&self, session_id: &str, record: &LeadRecord) -> Result<(), SinkError> {
        let id = Uuid::new_v4();
        self.conn
            .execute(
                "INSERT INTO leads (id, session_id, customer_name, email, business_name, industry, channel, problem, bot_name, captured_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    id.to_string(),
                    session_id.to_string(),
                    opt_text(&record.customer_name),
                    opt_text(&record.email),
                    opt_text(&record.business_name),
                    opt_text(&record.industry),
                    opt_text(&record.channel),
                    opt_text(&record.problem),
                    opt_text(&record.bot_name),
                    Utc::now().to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| SinkError::Query(format!("append lead: {e}")))?;

        debug!(lead_id = %id, session_id, "lead appended");
        Ok(())
    }
}
