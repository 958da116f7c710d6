// ABOUTME: Content block types - text, tool use, and tool results.
// ABOUTME: Tool blocks carry the metadata maps the coordinator marks up.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A block of content within a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    ToolUse(ToolUseBlock),
    ToolResult(ToolResultBlock),
}

impl ContentBlock {
    /// Create a text content block.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// A request by an agent to invoke a tool.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolUseBlock {
    /// Identifier of this tool call, assigned by the caller.
    pub id: String,

    /// Name of the tool being invoked.
    pub name: String,

    /// Input arguments for the tool.
    #[serde(default)]
    pub input: Map<String, Value>,

    /// Nested content attached to the call, if any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<ContentBlock>,

    /// Out-of-band annotations; hooks may add entries here.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, Value>,
}

impl ToolUseBlock {
    /// Create a tool use block with the given id and tool name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Add an input argument.
    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.input.insert(key.into(), value.into());
        self
    }

    /// Add a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.metadata.insert(key.into(), v);
        }
        self
    }
}

/// Result of a tool execution.
///
/// The output is a list of content blocks rather than bare text so a
/// suspended sub-agent can surface its pending tool-use blocks through the
/// same channel as an ordinary reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolResultBlock {
    /// Identifier of the tool call this result answers. Left unset by the
    /// producer when an outer wrapper fills it in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Name of the tool that produced this result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// The output content.
    #[serde(default)]
    pub output: Vec<ContentBlock>,

    /// Whether this result represents an error.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_error: bool,

    /// Optional metadata about the execution.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, Value>,
}

fn is_false(val: &bool) -> bool {
    !*val
}

impl ToolResultBlock {
    /// Create a result with the given output blocks.
    pub fn new(output: Vec<ContentBlock>) -> Self {
        Self {
            output,
            ..Default::default()
        }
    }

    /// Create a successful text result.
    pub fn text(content: impl Into<String>) -> Self {
        Self::new(vec![ContentBlock::text(content)])
    }

    /// Create an error result.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            output: vec![ContentBlock::text(message)],
            is_error: true,
            ..Default::default()
        }
    }

    /// Set the tool call id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the tool name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Add metadata to the result.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        if let Ok(v) = serde_json::to_value(value) {
            self.metadata.insert(key.into(), v);
        }
        self
    }

    /// Extract concatenated text from the output blocks.
    pub fn text_content(&self) -> String {
        self.output
            .iter()
            .filter_map(|b| match b {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }
}
