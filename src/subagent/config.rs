// ABOUTME: SubAgentConfig - per-tool configuration for wrapping an agent.
// ABOUTME: Controls naming, event forwarding, session backing, and HITL.

use std::sync::Arc;

use crate::agent::StreamOptions;
use crate::session::{MemorySessionStore, SessionStore};

/// Configuration for a [`SubAgentTool`](super::SubAgentTool).
#[derive(Clone)]
pub struct SubAgentConfig {
    /// Override for the tool name. When unset, the name is derived from the
    /// wrapped agent's display name.
    pub tool_name: Option<String>,

    /// Override for the tool description.
    pub description: Option<String>,

    /// Drive the agent through its streaming entry point and forward
    /// events to the emitter.
    pub forward_events: bool,

    /// Per-call stream event filters; defaults when unset.
    pub stream_options: Option<StreamOptions>,

    /// Backing store for agent state across invocations.
    pub session: Arc<dyn SessionStore>,

    /// Enable the suspension/resumption protocol.
    pub enable_hitl: bool,
}

impl Default for SubAgentConfig {
    fn default() -> Self {
        Self {
            tool_name: None,
            description: None,
            forward_events: true,
            stream_options: None,
            session: Arc::new(MemorySessionStore::new()),
            enable_hitl: false,
        }
    }
}

impl SubAgentConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the tool name.
    pub fn tool_name(mut self, name: impl Into<String>) -> Self {
        self.tool_name = Some(name.into());
        self
    }

    /// Override the tool description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Enable or disable streaming with event forwarding.
    pub fn forward_events(mut self, forward: bool) -> Self {
        self.forward_events = forward;
        self
    }

    /// Set per-call stream event filters.
    pub fn stream_options(mut self, options: StreamOptions) -> Self {
        self.stream_options = Some(options);
        self
    }

    /// Set the backing session store.
    pub fn session(mut self, session: Arc<dyn SessionStore>) -> Self {
        self.session = session;
        self
    }

    /// Enable or disable HITL suspend/resume.
    pub fn enable_hitl(mut self, enable: bool) -> Self {
        self.enable_hitl = enable;
        self
    }
}
