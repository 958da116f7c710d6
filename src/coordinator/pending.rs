// ABOUTME: PendingStore - staged sub-agent results keyed by outer tool-call
// ABOUTME: id. Enforces the session-first lifecycle with wholesale updates.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::{CoordinationError, SessionError};
use crate::message::ToolResultBlock;

/// The staged state of one suspended outer tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingContext {
    /// The outer tool-use block's id through which the sub-agent tool was
    /// called.
    pub outer_call_id: String,

    /// Session id of the suspended sub-agent run.
    pub session_id: String,

    /// Results staged for injection on resume, in submission order.
    pub pending_results: Vec<ToolResultBlock>,
}

impl PendingContext {
    /// Create a context with no staged results.
    pub fn new(outer_call_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            outer_call_id: outer_call_id.into(),
            session_id: session_id.into(),
            pending_results: Vec::new(),
        }
    }
}

/// Thread-safe store of pending contexts, keyed by outer tool-call id.
///
/// A session id must be registered for an outer call before results can be
/// staged for it, and removing the entry drops both together, so no staged
/// result can outlive its session registration. Updates replace the entry
/// wholesale; a reader holding an earlier snapshot keeps a consistent,
/// now-stale view.
#[derive(Default)]
pub struct PendingStore {
    entries: RwLock<HashMap<String, PendingContext>>,
}

impl PendingStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the session id for an outer call.
    ///
    /// Replacing an entry discards any staged results; the lifecycle
    /// restarts from an empty list.
    pub async fn set_session_id(
        &self,
        outer_call_id: &str,
        session_id: &str,
    ) -> Result<(), CoordinationError> {
        if outer_call_id.trim().is_empty() {
            return Err(CoordinationError::InvalidArgument(
                "outer call id cannot be empty".into(),
            ));
        }
        if session_id.trim().is_empty() {
            return Err(CoordinationError::InvalidArgument(
                "session id cannot be empty".into(),
            ));
        }

        let mut entries = self.entries.write().await;
        entries.insert(
            outer_call_id.to_string(),
            PendingContext::new(outer_call_id, session_id),
        );
        Ok(())
    }

    /// Stage a single result for an outer call.
    pub async fn add_result(
        &self,
        outer_call_id: &str,
        result: ToolResultBlock,
    ) -> Result<(), CoordinationError> {
        self.add_results(outer_call_id, vec![result]).await
    }

    /// Stage multiple results for an outer call, preserving order.
    pub async fn add_results(
        &self,
        outer_call_id: &str,
        results: Vec<ToolResultBlock>,
    ) -> Result<(), CoordinationError> {
        if outer_call_id.trim().is_empty() {
            return Err(CoordinationError::InvalidArgument(
                "outer call id cannot be empty".into(),
            ));
        }
        if results.is_empty() {
            return Err(CoordinationError::InvalidArgument(
                "results cannot be empty".into(),
            ));
        }

        let mut entries = self.entries.write().await;
        let existing = entries
            .get(outer_call_id)
            .ok_or_else(|| CoordinationError::MissingSession(outer_call_id.to_string()))?;

        let mut updated = existing.clone();
        updated.pending_results.extend(results);
        entries.insert(outer_call_id.to_string(), updated);
        Ok(())
    }

    /// Get the session id registered for an outer call.
    pub async fn session_id(&self, outer_call_id: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries.get(outer_call_id).map(|c| c.session_id.clone())
    }

    /// Get a copy of the staged results for an outer call.
    ///
    /// Returns an empty list when no entry exists. Mutating the returned
    /// list never affects the store.
    pub async fn pending_results(&self, outer_call_id: &str) -> Vec<ToolResultBlock> {
        let entries = self.entries.read().await;
        entries
            .get(outer_call_id)
            .map(|c| c.pending_results.clone())
            .unwrap_or_default()
    }

    /// Whether an outer call has a registered session.
    pub async fn contains(&self, outer_call_id: &str) -> bool {
        let entries = self.entries.read().await;
        entries.contains_key(outer_call_id)
    }

    /// Whether an outer call has any staged results.
    pub async fn has_pending_results(&self, outer_call_id: &str) -> bool {
        let entries = self.entries.read().await;
        entries
            .get(outer_call_id)
            .is_some_and(|c| !c.pending_results.is_empty())
    }

    /// Whether the store holds no entries at all.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Atomically remove and return the entry for an outer call.
    pub async fn remove(&self, outer_call_id: &str) -> Option<PendingContext> {
        let mut entries = self.entries.write().await;
        entries.remove(outer_call_id)
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Serialize the full store contents.
    pub async fn snapshot(&self) -> Result<Value, SessionError> {
        let entries = self.entries.read().await;
        Ok(serde_json::to_value(&*entries)?)
    }

    /// Replace the full store contents from a snapshot.
    pub async fn restore(&self, snapshot: Value) -> Result<(), SessionError> {
        let restored: HashMap<String, PendingContext> = serde_json::from_value(snapshot)?;
        *self.entries.write().await = restored;
        Ok(())
    }
}
