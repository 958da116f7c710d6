// ABOUTME: Prelude module - convenient imports for common use cases.
// ABOUTME: Use `use relay::prelude::*;` to get started quickly.

pub use crate::agent::{
    Agent, AgentEvent, AgentProvider, Capabilities, EventKind, EventStream, StreamOptions,
};
pub use crate::coordinator::{
    CoordinatorContext, PendingContext, PendingStore, ResultInjectionHook,
};
pub use crate::error::{
    AgentError, CoordinationError, RelayError, SessionError, ToolError,
};
pub use crate::hook::{Hook, HookAction, HookEvent, HookRegistry};
pub use crate::message::{
    ContentBlock, Message, Role, TerminationReason, ToolResultBlock, ToolUseBlock,
};
pub use crate::session::{MemorySessionStore, SessionStore, StateUnit};
pub use crate::subagent::{SubAgentConfig, SubAgentTool};
pub use crate::tool::{
    NoopEmitter, Registry, Tool, ToolDefinition, ToolEmitter, ToolInvocation,
};
