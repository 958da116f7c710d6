// ABOUTME: Implements the Registry - the parent loop's tool table and its
// ABOUTME: hook-mediated dispatch path for acting on tool-use blocks.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::warn;

use super::{Tool, ToolDefinition, ToolEmitter, ToolInvocation};
use crate::hook::{HookAction, HookEvent, HookRegistry};
use crate::message::{ToolResultBlock, ToolUseBlock};

/// A thread-safe registry of tools, including sub-agent tools.
///
/// Besides lookup, the registry is the acting seam of a parent loop:
/// [`dispatch`](Self::dispatch) runs the pre-acting hooks over a tool-use
/// block before execution, so a result-injection rewrite (or a veto) is
/// visible to the tool it reaches.
#[derive(Default)]
pub struct Registry {
    tools: Arc<RwLock<HashMap<String, Arc<dyn Tool>>>>,
}

impl Registry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under its own name.
    pub async fn register<T: Tool + 'static>(&self, tool: T) {
        self.register_arc(Arc::new(tool)).await;
    }

    /// Register a tool from an Arc.
    pub async fn register_arc(&self, tool: Arc<dyn Tool>) {
        let mut tools = self.tools.write().await;
        tools.insert(tool.name().to_string(), tool);
    }

    /// Unregister a tool by name.
    pub async fn unregister(&self, name: &str) {
        let mut tools = self.tools.write().await;
        tools.remove(name);
    }

    /// Get a tool by name.
    pub async fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let tools = self.tools.read().await;
        tools.get(name).cloned()
    }

    /// List all tool names, sorted alphabetically.
    pub async fn list(&self) -> Vec<String> {
        let tools = self.tools.read().await;
        let mut names: Vec<_> = tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get the number of registered tools.
    pub async fn count(&self) -> usize {
        let tools = self.tools.read().await;
        tools.len()
    }

    /// Convert all tools to model-facing tool definitions.
    pub async fn to_definitions(&self) -> Vec<ToolDefinition> {
        let tools = self.tools.read().await;
        tools
            .values()
            .map(|t| ToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                input_schema: t.schema(),
            })
            .collect()
    }

    /// Dispatch a tool-use block through the hook registry to its tool.
    ///
    /// Fires the pre-acting hooks first: a transform (such as the
    /// result-injection rewrite on a resumed sub-agent call) replaces the
    /// block that reaches the tool, and a block verdict short-circuits into
    /// an error result. A hook failure is treated as a block.
    ///
    /// Tools leave the outer call id and name unset on their results; this
    /// layer fills them in from the dispatched block. Errors from the tool
    /// itself fold into an error result so the parent loop keeps going.
    pub async fn dispatch(
        &self,
        tool_use: ToolUseBlock,
        hooks: &HookRegistry,
        emitter: Option<Arc<dyn ToolEmitter>>,
    ) -> ToolResultBlock {
        let id = tool_use.id.clone();
        let name = tool_use.name.clone();
        let finish = |result: ToolResultBlock| {
            let mut result = result;
            result.id.get_or_insert(id.clone());
            result.name.get_or_insert(name.clone());
            result
        };

        let event = HookEvent::PreActing {
            tool_use: tool_use.clone(),
        };
        let tool_use = match hooks.fire(&event).await {
            Ok(HookAction::Continue) => tool_use,
            Ok(HookAction::Transform(rewritten)) => rewritten,
            Ok(HookAction::Block(reason)) => {
                return finish(ToolResultBlock::error(reason));
            }
            Err(e) => {
                return finish(ToolResultBlock::error(format!("Hook error: {e}")));
            }
        };

        let Some(tool) = self.get(&tool_use.name).await else {
            return finish(ToolResultBlock::error(format!(
                "Tool not found: {}",
                tool_use.name
            )));
        };

        let acted_block = tool_use.clone();
        let mut invocation = ToolInvocation::from_tool_use(tool_use);
        if let Some(emitter) = emitter {
            invocation = invocation.with_emitter(emitter);
        }

        let result = match tool.invoke(invocation).await {
            Ok(result) => finish(result),
            Err(e) => finish(ToolResultBlock::error(format!("Execution failed: {e}"))),
        };

        if let Err(e) = hooks
            .fire(&HookEvent::PostActing {
                tool_use: acted_block,
                result: result.clone(),
            })
            .await
        {
            warn!(tool = %name, error = %e, "post-acting hook failed");
        }

        result
    }
}

impl Clone for Registry {
    fn clone(&self) -> Self {
        Self {
            tools: Arc::clone(&self.tools),
        }
    }
}
