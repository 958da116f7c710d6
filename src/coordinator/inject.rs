// ABOUTME: ResultInjectionHook - rewrites an outer tool-use before dispatch
// ABOUTME: so staged sub-agent results ride along with the resume call.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::{CoordinatorContext, INPUT_SESSION_ID, METADATA_PREVIOUS_TOOL_RESULT};
use crate::hook::{Hook, HookAction, HookEvent};

/// Pre-acting hook that injects staged sub-agent results.
///
/// When the parent loop is about to dispatch a tool-use whose id has a
/// pending context, the hook atomically consumes that context and replaces
/// the block with a copy carrying the staged results in its metadata and
/// the session id in its input. The original block is never mutated.
pub struct ResultInjectionHook {
    context: Arc<CoordinatorContext>,
}

impl ResultInjectionHook {
    /// Create a hook over the given coordinator context.
    pub fn new(context: Arc<CoordinatorContext>) -> Self {
        Self { context }
    }

    /// The context this hook consumes from.
    pub fn context(&self) -> &Arc<CoordinatorContext> {
        &self.context
    }
}

#[async_trait]
impl Hook for ResultInjectionHook {
    fn accepts(&self, event: &HookEvent) -> bool {
        matches!(event, HookEvent::PreActing { .. })
    }

    // Ahead of default-priority hooks so the rewrite is visible to the tool.
    fn priority(&self) -> i32 {
        10
    }

    async fn on_event(&self, event: &HookEvent) -> Result<HookAction, anyhow::Error> {
        let HookEvent::PreActing { tool_use } = event else {
            return Ok(HookAction::Continue);
        };

        if tool_use.id.is_empty() {
            return Ok(HookAction::Continue);
        }

        let Some(pending) = self.context.consume_pending(&tool_use.id).await else {
            return Ok(HookAction::Continue);
        };

        let staged = serde_json::to_value(&pending.pending_results)?;

        let mut rewritten = tool_use.clone();
        rewritten
            .metadata
            .insert(METADATA_PREVIOUS_TOOL_RESULT.to_string(), staged);
        rewritten.input.insert(
            INPUT_SESSION_ID.to_string(),
            Value::String(pending.session_id.clone()),
        );

        debug!(
            outer_call_id = %tool_use.id,
            session_id = %pending.session_id,
            results = pending.pending_results.len(),
            "injected staged sub-agent results"
        );

        Ok(HookAction::Transform(rewritten))
    }
}
