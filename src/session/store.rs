//! Process-wide session registry with per-session serialization.
//!
//! The registry maps opaque caller-supplied identifiers to sessions. Each
//! entry is an `Arc<Mutex<Session>>`: the outer `RwLock` only guards map
//! membership, while the per-entry mutex makes every mutation of one session
//! (transcript append, record merge, mode flip, counter increment) a critical
//! section that cannot interleave with a concurrent message on the same
//! identifier. Unrelated sessions proceed in parallel.
//!
//! There is no eviction: the map grows with the number of distinct
//! identifiers seen over the process lifetime. Sessions carry the timestamps
//! a TTL sweep would need, should one be added.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::session::model::Session;

/// Shared handle to one session's state.
pub type SessionHandle = Arc<Mutex<Session>>;

/// In-memory session registry.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Return the session for `session_id`, creating it on first sight.
    ///
    /// Two concurrent first-messages for the same identifier resolve to the
    /// same entry; the write lock makes insertion atomic.
    pub async fn get_or_create(&self, session_id: &str) -> SessionHandle {
        {
            let sessions = self.sessions.read().await;
            if let Some(handle) = sessions.get(session_id) {
                return Arc::clone(handle);
            }
        }

        let mut sessions = self.sessions.write().await;
        let handle = sessions.entry(session_id.to_string()).or_insert_with(|| {
            tracing::debug!(session_id, "session created");
            Arc::new(Mutex::new(Session::new(session_id)))
        });
        Arc::clone(handle)
    }

    /// Look up an existing session without creating one.
    pub async fn get(&self, session_id: &str) -> Option<SessionHandle> {
        self.sessions.read().await.get(session_id).map(Arc::clone)
    }

    /// Number of sessions ever created in this process.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
