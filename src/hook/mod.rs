// ABOUTME: Hook system for intercepting the acting phase of an agent loop.
// ABOUTME: Provides events, actions, and a priority-ordered registry.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::message::{ToolResultBlock, ToolUseBlock};

/// Events that can trigger hooks.
#[derive(Debug, Clone)]
pub enum HookEvent {
    /// Fired before a tool-use block is dispatched to its tool.
    PreActing { tool_use: ToolUseBlock },

    /// Fired after a tool execution completes.
    PostActing {
        tool_use: ToolUseBlock,
        result: ToolResultBlock,
    },
}

impl HookEvent {
    fn kind(&self) -> &'static str {
        match self {
            HookEvent::PreActing { .. } => "PreActing",
            HookEvent::PostActing { .. } => "PostActing",
        }
    }
}

/// Actions a hook can return to control execution flow.
#[derive(Debug, Clone)]
pub enum HookAction {
    /// Continue with normal execution.
    Continue,

    /// Block the action with a message (only valid for PreActing).
    Block(String),

    /// Replace the tool-use block about to be dispatched (only valid for
    /// PreActing).
    Transform(ToolUseBlock),
}

impl Default for HookAction {
    fn default() -> Self {
        Self::Continue
    }
}

/// Trait for implementing hooks.
#[async_trait]
pub trait Hook: Send + Sync {
    /// Called when an event occurs.
    ///
    /// Return `Ok(HookAction::Continue)` to proceed normally.
    /// Return `Ok(HookAction::Block(msg))` to block PreActing events.
    /// Return `Ok(HookAction::Transform(block))` to replace the PreActing
    /// tool-use.
    /// Return `Err` to signal a hook failure (treated as Block).
    async fn on_event(&self, event: &HookEvent) -> Result<HookAction, anyhow::Error>;

    /// Optional: Filter which events this hook cares about.
    /// Default returns true for all events.
    fn accepts(&self, event: &HookEvent) -> bool {
        let _ = event;
        true
    }

    /// Hooks with higher priority fire earlier. Default is 0.
    fn priority(&self) -> i32 {
        0
    }
}

/// Registry for managing and firing hooks.
pub struct HookRegistry {
    hooks: RwLock<Vec<Arc<dyn Hook>>>,
}

impl HookRegistry {
    /// Create a new empty hook registry.
    pub fn new() -> Self {
        Self {
            hooks: RwLock::new(Vec::new()),
        }
    }

    /// Register a hook.
    pub async fn register(&self, hook: impl Hook + 'static) {
        self.hooks.write().await.push(Arc::new(hook));
    }

    /// Register a hook wrapped in Arc.
    pub async fn register_arc(&self, hook: Arc<dyn Hook>) {
        self.hooks.write().await.push(hook);
    }

    /// Fire an event to all registered hooks in priority order.
    ///
    /// Returns the final action after all hooks have processed.
    /// If any hook blocks, returns Block immediately.
    /// If any hook transforms, the transformed tool-use is visible to
    /// subsequent hooks and returned as the final action.
    pub async fn fire(&self, event: &HookEvent) -> Result<HookAction, anyhow::Error> {
        let mut hooks = self.hooks.read().await.clone();
        // Stable sort keeps registration order within a priority level.
        hooks.sort_by_key(|h| std::cmp::Reverse(h.priority()));

        let mut current_event = event.clone();
        let mut final_action = HookAction::Continue;

        for hook in hooks.iter() {
            if !hook.accepts(&current_event) {
                continue;
            }

            match hook.on_event(&current_event).await? {
                HookAction::Continue => {}
                HookAction::Block(msg) => {
                    return Ok(HookAction::Block(msg));
                }
                HookAction::Transform(block) => match &current_event {
                    HookEvent::PreActing { .. } => {
                        current_event = HookEvent::PreActing {
                            tool_use: block.clone(),
                        };
                        final_action = HookAction::Transform(block);
                    }
                    other => {
                        return Err(anyhow::anyhow!(
                            "HookAction::Transform is only valid for PreActing events, got {}",
                            other.kind()
                        ));
                    }
                },
            }
        }

        Ok(final_action)
    }

    /// Get the number of registered hooks.
    pub async fn len(&self) -> usize {
        self.hooks.read().await.len()
    }

    /// Check if the registry is empty.
    pub async fn is_empty(&self) -> bool {
        self.hooks.read().await.is_empty()
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::new()
    }
}
