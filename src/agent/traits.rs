// ABOUTME: Defines the Agent trait - call and stream entry points - plus the
// ABOUTME: capability flags and the per-invocation provider factory.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use super::{AgentEvent, StreamOptions};
use crate::error::AgentError;
use crate::message::Message;
use crate::session::StateUnit;

/// What a wrapped agent supports, expressed as flags rather than a type
/// hierarchy so callers never need downcasts or parent lookups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// The agent can pause mid-run and report a suspending termination
    /// reason on its reply.
    pub can_suspend: bool,

    /// The agent exposes a state unit for session persistence.
    pub participates_in_state: bool,

    /// The agent resumes suspended sub-agent tools it hosts.
    pub resumes_subagents: bool,
}

/// A stream of events produced by a streaming agent run.
pub type EventStream<'a> =
    Pin<Box<dyn Stream<Item = Result<AgentEvent, AgentError>> + Send + 'a>>;

/// The wrapped conversational agent.
///
/// Implementations are created fresh for every tool invocation by an
/// [`AgentProvider`]; continuity across invocations comes from the session
/// store, not from the instance.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Display name, used to derive the tool name.
    fn name(&self) -> &str;

    /// Human-readable description for the calling model.
    fn description(&self) -> &str {
        ""
    }

    /// Unique identifier of this instance.
    fn agent_id(&self) -> &str;

    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    /// Run to completion on the given messages and return the final reply.
    ///
    /// An empty message list continues from persisted state without new
    /// input.
    async fn call(&mut self, messages: Vec<Message>) -> Result<Message, AgentError>;

    /// Run with streaming, yielding intermediate events. The event marked
    /// `is_last` carries the final reply.
    fn stream(&mut self, messages: Vec<Message>, options: StreamOptions) -> EventStream<'_>;

    /// State participation, when the agent supports it.
    fn state_unit(&mut self) -> Option<&mut dyn StateUnit> {
        None
    }
}

/// Factory for per-invocation agent instances.
pub trait AgentProvider: Send + Sync {
    /// Create a fresh agent instance. Called once per tool invocation.
    fn provide(&self) -> Box<dyn Agent>;

    /// Capabilities of the agent hosting the tool, when known up front.
    ///
    /// Used only for a non-fatal compatibility warning at construction;
    /// there is no runtime lookup from sub-agent to parent.
    fn parent_capabilities(&self) -> Option<Capabilities> {
        None
    }
}
