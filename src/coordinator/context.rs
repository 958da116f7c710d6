// ABOUTME: CoordinatorContext - facade over the pending store with
// ABOUTME: result-classification helpers and session persistence.

use async_trait::async_trait;
use serde_json::Value;

use super::{PendingContext, PendingStore};
use crate::error::{CoordinationError, SessionError};
use crate::message::{TerminationReason, ToolResultBlock};
use crate::session::{SessionStore, StateUnit};

/// Metadata key marking a result as suspended.
pub const METADATA_SUSPENDED: &str = "suspended";

/// Metadata key carrying the sub-agent session id.
pub const METADATA_SUBAGENT_SESSION_ID: &str = "subagent_session_id";

/// Metadata key carrying the sub-agent's termination reason.
pub const METADATA_GENERATE_REASON: &str = "subagent_generate_reason";

/// Metadata key under which staged results ride on a rewritten tool-use.
pub const METADATA_PREVIOUS_TOOL_RESULT: &str = "previous_tool_result";

/// Input key carrying the session id on a tool-use block.
pub const INPUT_SESSION_ID: &str = "session_id";

/// Logical name the coordinator's state is stored under in a session.
const STATE_NAME: &str = "subagent_context";

/// Facade over one [`PendingStore`] for coordinating suspended sub-agent
/// tool calls.
///
/// Each sub-agent coordinator owns its context; callers that want sharing
/// pass an explicit `Arc<CoordinatorContext>`. The classification helpers
/// are associated functions so parent loops and UIs can inspect results
/// without holding a context reference.
#[derive(Default)]
pub struct CoordinatorContext {
    store: PendingStore,
}

impl CoordinatorContext {
    /// Create a context with an empty pending store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Access the underlying store.
    ///
    /// Direct modifications bypass the submit-side validation; prefer the
    /// context methods.
    pub fn pending_store(&self) -> &PendingStore {
        &self.store
    }

    /// Register the session id for an outer call.
    ///
    /// Re-registering the same session id keeps any staged results; a
    /// different session id restarts the lifecycle with an empty list.
    pub async fn set_session_id(
        &self,
        outer_call_id: &str,
        session_id: &str,
    ) -> Result<(), CoordinationError> {
        if self.store.session_id(outer_call_id).await.as_deref() == Some(session_id) {
            return Ok(());
        }
        self.store.set_session_id(outer_call_id, session_id).await
    }

    /// Get the session id registered for an outer call.
    pub async fn session_id(&self, outer_call_id: &str) -> Option<String> {
        self.store.session_id(outer_call_id).await
    }

    /// Submit one sub-agent result for a suspended outer call.
    pub async fn submit_result(
        &self,
        outer_call_id: &str,
        result: ToolResultBlock,
    ) -> Result<(), CoordinationError> {
        self.submit_results(outer_call_id, vec![result]).await
    }

    /// Submit sub-agent results for a suspended outer call.
    ///
    /// The outer call must have a registered session id.
    pub async fn submit_results(
        &self,
        outer_call_id: &str,
        results: Vec<ToolResultBlock>,
    ) -> Result<(), CoordinationError> {
        if results.is_empty() {
            return Err(CoordinationError::InvalidArgument(
                "results cannot be empty".into(),
            ));
        }
        if !self.store.contains(outer_call_id).await {
            return Err(CoordinationError::UnknownOuterCall(
                outer_call_id.to_string(),
            ));
        }
        self.store.add_results(outer_call_id, results).await
    }

    /// Atomically consume the pending context for an outer call.
    ///
    /// Returns the full context (session id plus ordered results) and
    /// removes it from the store.
    pub async fn consume_pending(&self, outer_call_id: &str) -> Option<PendingContext> {
        self.store.remove(outer_call_id).await
    }

    /// Drop the pending context for an outer call, if any.
    pub async fn clear_call(&self, outer_call_id: &str) {
        self.store.remove(outer_call_id).await;
    }

    /// Whether an outer call has staged results waiting for injection.
    pub async fn has_pending(&self, outer_call_id: &str) -> bool {
        self.store.has_pending_results(outer_call_id).await
    }

    /// Drop all pending contexts.
    pub async fn clear(&self) {
        self.store.clear().await;
    }

    /// Extract the sub-agent session id from a tool result.
    pub fn extract_session_id(result: &ToolResultBlock) -> Option<String> {
        result
            .metadata
            .get(METADATA_SUBAGENT_SESSION_ID)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }

    /// Whether a tool result originates from a sub-agent.
    pub fn is_subagent_result(result: &ToolResultBlock) -> bool {
        Self::extract_session_id(result).is_some()
    }

    /// Whether a tool result represents a suspended sub-agent.
    pub fn is_suspended(result: &ToolResultBlock) -> bool {
        result
            .metadata
            .get(METADATA_SUSPENDED)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// The termination reason recorded on a tool result, defaulting to
    /// `ModelStop` when absent or malformed.
    pub fn termination_reason(result: &ToolResultBlock) -> TerminationReason {
        result
            .metadata
            .get(METADATA_GENERATE_REASON)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_default()
    }
}

#[async_trait]
impl StateUnit for CoordinatorContext {
    async fn save_to(&self, store: &dyn SessionStore, key: &str) -> Result<(), SessionError> {
        let snapshot = self.store.snapshot().await?;
        store.save(key, STATE_NAME, snapshot).await
    }

    async fn load_from(
        &mut self,
        store: &dyn SessionStore,
        key: &str,
    ) -> Result<(), SessionError> {
        if let Some(snapshot) = store.get(key, STATE_NAME).await? {
            self.store.restore(snapshot).await?;
        }
        Ok(())
    }
}
