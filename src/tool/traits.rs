// ABOUTME: Defines the Tool trait - the seam through which a parent agent
// ABOUTME: dispatches tool-use blocks - and the invocation parameter bundle.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ToolEmitter;
use crate::message::{ToolResultBlock, ToolUseBlock};

/// Definition of a tool as advertised to the calling model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Everything a tool receives for one call.
#[derive(Clone)]
pub struct ToolInvocation {
    /// Parsed input map from the tool-use block.
    pub input: Map<String, Value>,

    /// The full tool-use block, including any metadata hooks added to it.
    pub tool_use: ToolUseBlock,

    /// Optional out-of-band sink for intermediate result chunks.
    pub emitter: Option<Arc<dyn ToolEmitter>>,
}

impl ToolInvocation {
    /// Build an invocation from a tool-use block, taking the input from it.
    pub fn from_tool_use(tool_use: ToolUseBlock) -> Self {
        Self {
            input: tool_use.input.clone(),
            tool_use,
            emitter: None,
        }
    }

    /// Attach an emitter for event forwarding.
    pub fn with_emitter(mut self, emitter: Arc<dyn ToolEmitter>) -> Self {
        self.emitter = Some(emitter);
        self
    }
}

/// A tool that can be executed by an agent.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the unique name of this tool.
    fn name(&self) -> &str;

    /// Returns a human-readable description for the LLM.
    fn description(&self) -> &str;

    /// Returns the JSON Schema for the tool's input parameters.
    fn schema(&self) -> Value;

    /// Execute the tool for the given invocation.
    async fn invoke(&self, invocation: ToolInvocation) -> Result<ToolResultBlock, anyhow::Error>;
}
