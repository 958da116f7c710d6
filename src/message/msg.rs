// ABOUTME: Conversation message types - roles, termination reasons, builders.
// ABOUTME: Assistant replies carry the reason generation stopped.

use serde::{Deserialize, Serialize};

use super::{ContentBlock, ToolResultBlock, ToolUseBlock};

/// Role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    Tool,
}

/// Why an agent reply stopped generating.
///
/// Every reason other than `ModelStop` pauses execution rather than
/// finishing it; the coordinator turns such replies into suspended results
/// when HITL is enabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    #[default]
    ModelStop,
    ToolSuspended,
    ReasoningStopRequested,
    ActingStopRequested,
}

impl TerminationReason {
    /// True for every reason that pauses execution instead of completing it.
    pub fn is_suspending(&self) -> bool {
        !matches!(self, TerminationReason::ModelStop)
    }
}

/// A conversation message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,

    /// Meaningful on assistant replies; `ModelStop` everywhere else.
    #[serde(default)]
    pub reason: TerminationReason,
}

impl Message {
    /// Create a message with the given role and content blocks.
    pub fn new(role: Role, content: Vec<ContentBlock>) -> Self {
        Self {
            role,
            content,
            reason: TerminationReason::ModelStop,
        }
    }

    /// Create a user message with text content.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, vec![ContentBlock::text(text)])
    }

    /// Create an assistant message with text content.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, vec![ContentBlock::text(text)])
    }

    /// Create a tool message carrying a single tool result.
    pub fn tool(result: ToolResultBlock) -> Self {
        Self::new(Role::Tool, vec![ContentBlock::ToolResult(result)])
    }

    /// Set the termination reason.
    pub fn with_reason(mut self, reason: TerminationReason) -> Self {
        self.reason = reason;
        self
    }

    /// Extract concatenated text content.
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .filter_map(|b| match b {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Clone out all text blocks, in order.
    pub fn text_blocks(&self) -> Vec<ContentBlock> {
        self.content
            .iter()
            .filter(|b| matches!(b, ContentBlock::Text { .. }))
            .cloned()
            .collect()
    }

    /// Clone out all tool use blocks, in order.
    pub fn tool_uses(&self) -> Vec<ToolUseBlock> {
        self.content
            .iter()
            .filter_map(|b| match b {
                ContentBlock::ToolUse(tool_use) => Some(tool_use.clone()),
                _ => None,
            })
            .collect()
    }
}
