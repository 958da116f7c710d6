// ABOUTME: Sub-agent module - wraps a conversational agent as a callable
// ABOUTME: tool with session continuity and HITL suspend/resume.

mod config;
mod tool;

pub use config::SubAgentConfig;
pub use tool::{SubAgentTool, PARAM_MESSAGE, PARAM_SESSION_ID};
