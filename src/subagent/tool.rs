// ABOUTME: SubAgentTool - exposes a wrapped agent as a callable tool with
// ABOUTME: session continuity and HITL suspend/resume support.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{json, Value};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::agent::{Agent, AgentEvent, AgentProvider};
use crate::coordinator::{
    INPUT_SESSION_ID, METADATA_GENERATE_REASON, METADATA_PREVIOUS_TOOL_RESULT,
    METADATA_SUBAGENT_SESSION_ID, METADATA_SUSPENDED,
};
use crate::error::{AgentError, ToolError};
use crate::message::{ContentBlock, Message, ToolResultBlock, ToolUseBlock};
use crate::tool::{Tool, ToolEmitter, ToolInvocation};

use super::SubAgentConfig;

/// Parameter name for the session id.
pub const PARAM_SESSION_ID: &str = INPUT_SESSION_ID;

/// Parameter name for the message.
pub const PARAM_MESSAGE: &str = "message";

/// Metadata key for the forwarded event payload.
const METADATA_EVENT: &str = "subagent_event";

/// Metadata key for the wrapped agent's display name.
const METADATA_AGENT_NAME: &str = "subagent_name";

/// Metadata key for the wrapped agent's instance id.
const METADATA_AGENT_ID: &str = "subagent_id";

/// A tool that wraps a sub-agent for multi-turn conversation.
///
/// Each invocation provisions a fresh agent instance from the provider and
/// reconstructs its prior state from the session store, so a conversation
/// survives across calls while no instance is ever shared.
///
/// With HITL enabled, a reply whose termination reason is suspending is
/// returned as a specially marked result carrying the sub-agent's pending
/// tool-use blocks; the parent stages confirmation results through a
/// [`CoordinatorContext`](crate::coordinator::CoordinatorContext) and the
/// injection hook routes them back in on the next call.
pub struct SubAgentTool {
    name: String,
    description: String,
    provider: Arc<dyn AgentProvider>,
    config: SubAgentConfig,
}

impl std::fmt::Debug for SubAgentTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubAgentTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl SubAgentTool {
    /// Create a new sub-agent tool.
    ///
    /// Samples one agent instance to resolve the tool name and description.
    /// Fails with [`ToolError::IncompatibleHitl`] when HITL is enabled over
    /// an agent that cannot suspend.
    pub fn new(
        provider: Arc<dyn AgentProvider>,
        config: SubAgentConfig,
    ) -> Result<Self, ToolError> {
        let sample = provider.provide();
        let name = resolve_tool_name(sample.as_ref(), &config);
        let description = resolve_description(sample.as_ref(), &config);

        if config.enable_hitl {
            if !sample.capabilities().can_suspend {
                return Err(ToolError::IncompatibleHitl(format!(
                    "agent '{}' cannot suspend mid-run",
                    sample.name()
                )));
            }
            if let Some(parent) = provider.parent_capabilities() {
                if !parent.resumes_subagents {
                    warn!(
                        tool = %name,
                        "HITL is enabled but the hosting agent does not resume \
                         suspended sub-agents; a suspension could never be resumed"
                    );
                }
            }
        }

        debug!(tool = %name, "created sub-agent tool");

        Ok(Self {
            name,
            description,
            provider,
            config,
        })
    }

    /// Create a sub-agent tool with the default configuration.
    pub fn with_defaults(provider: Arc<dyn AgentProvider>) -> Result<Self, ToolError> {
        Self::new(provider, SubAgentConfig::default())
    }

    async fn execute_conversation(&self, invocation: ToolInvocation) -> ToolResultBlock {
        let provided = invocation
            .input
            .get(PARAM_SESSION_ID)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let is_new_session = provided.is_none();
        let session_id = provided
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        // The injection hook stages results on the block; their presence
        // selects the resume path.
        if self.config.enable_hitl
            && invocation
                .tool_use
                .metadata
                .contains_key(METADATA_PREVIOUS_TOOL_RESULT)
        {
            let injected = extract_injected_results(&invocation.tool_use);
            return self.resume(&session_id, injected, invocation.emitter).await;
        }

        let message = invocation
            .input
            .get(PARAM_MESSAGE)
            .and_then(Value::as_str)
            .unwrap_or("");
        if message.trim().is_empty() {
            return ToolResultBlock::error("Message is required");
        }

        let mut agent = self.provider.provide();

        if !is_new_session {
            self.load_agent_state(&session_id, agent.as_mut()).await;
        }

        debug!(
            session_id = %session_id,
            new = is_new_session,
            agent = agent.name(),
            "driving sub-agent"
        );

        let messages = vec![Message::user(message)];
        self.drive(agent, messages, &session_id, invocation.emitter)
            .await
    }

    /// Resume a suspended run with injected results.
    ///
    /// Hook-triggered pauses carry no results; the agent then continues
    /// from its persisted state with an empty message list.
    async fn resume(
        &self,
        session_id: &str,
        injected: Vec<ToolResultBlock>,
        emitter: Option<Arc<dyn ToolEmitter>>,
    ) -> ToolResultBlock {
        debug!(
            session_id = %session_id,
            results = injected.len(),
            "resuming sub-agent with injected results"
        );

        let mut agent = self.provider.provide();
        self.load_agent_state(session_id, agent.as_mut()).await;

        let messages = injected.into_iter().map(Message::tool).collect();
        self.drive(agent, messages, session_id, emitter).await
    }

    async fn drive(
        &self,
        mut agent: Box<dyn Agent>,
        messages: Vec<Message>,
        session_id: &str,
        emitter: Option<Arc<dyn ToolEmitter>>,
    ) -> ToolResultBlock {
        let outcome = if self.config.forward_events {
            self.drive_streaming(agent.as_mut(), messages, session_id, emitter)
                .await
        } else {
            agent.call(messages).await
        };

        match outcome {
            Ok(response) => {
                let result = self.build_result(&response, session_id);
                self.save_agent_state(session_id, agent.as_mut()).await;
                result
            }
            Err(e) => {
                error!(session_id = %session_id, error = %e, "sub-agent execution failed");
                ToolResultBlock::error(format!("Execution error: {e}"))
            }
        }
    }

    async fn drive_streaming(
        &self,
        agent: &mut dyn Agent,
        messages: Vec<Message>,
        session_id: &str,
        emitter: Option<Arc<dyn ToolEmitter>>,
    ) -> Result<Message, AgentError> {
        let options = self.config.stream_options.unwrap_or_default();
        let agent_name = agent.name().to_string();
        let agent_id = agent.agent_id().to_string();

        let mut last: Option<Message> = None;
        {
            let mut stream = agent.stream(messages, options);
            while let Some(event) = stream.next().await {
                let event = event?;
                if let Some(emitter) = emitter.as_deref() {
                    forward_event(&event, emitter, &agent_name, &agent_id, session_id);
                }
                if event.is_last {
                    last = Some(event.message);
                }
            }
        }

        last.ok_or(AgentError::StreamClosed)
    }

    /// Build the final tool result with session context.
    ///
    /// With HITL disabled a suspending reply is downgraded to a normal text
    /// response so the conversation continues without interruption.
    fn build_result(&self, response: &Message, session_id: &str) -> ToolResultBlock {
        if self.config.enable_hitl && response.reason.is_suspending() {
            return build_suspended_result(response, session_id);
        }

        let text = response.text_content();
        let text = if text.is_empty() {
            "(No response)"
        } else {
            text.as_str()
        };
        ToolResultBlock::text(format!("session_id: {session_id}\n\n{text}"))
    }

    async fn load_agent_state(&self, session_id: &str, agent: &mut dyn Agent) {
        let Some(state) = agent.state_unit() else {
            return;
        };
        match state.load_from(self.config.session.as_ref(), session_id).await {
            Ok(()) => debug!(session_id = %session_id, "loaded sub-agent state"),
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "failed to load sub-agent state")
            }
        }
    }

    async fn save_agent_state(&self, session_id: &str, agent: &mut dyn Agent) {
        let Some(state) = agent.state_unit() else {
            return;
        };
        match state.save_to(self.config.session.as_ref(), session_id).await {
            Ok(()) => debug!(session_id = %session_id, "saved sub-agent state"),
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "failed to save sub-agent state")
            }
        }
    }
}

#[async_trait]
impl Tool for SubAgentTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "session_id": {
                    "type": "string",
                    "description": "Session ID for multi-turn dialogue. Omit to start a NEW \
                                    session. To CONTINUE an existing session and retain memory, \
                                    you MUST extract the session_id from the previous response \
                                    and pass it here."
                },
                "message": {
                    "type": "string",
                    "description": "Message to send to the agent"
                }
            },
            "required": ["message"]
        })
    }

    async fn invoke(&self, invocation: ToolInvocation) -> Result<ToolResultBlock, anyhow::Error> {
        Ok(self.execute_conversation(invocation).await)
    }
}

/// Build a suspended tool result from a paused sub-agent reply.
///
/// Output carries the reply's text blocks followed by its pending tool-use
/// blocks. The result's id and name are left unset; the outer wrapper
/// layer fills them in.
fn build_suspended_result(response: &Message, session_id: &str) -> ToolResultBlock {
    let mut output: Vec<ContentBlock> = response.text_blocks();
    output.extend(response.tool_uses().into_iter().map(ContentBlock::ToolUse));

    ToolResultBlock::new(output)
        .with_metadata(METADATA_SUSPENDED, true)
        .with_metadata(METADATA_SUBAGENT_SESSION_ID, session_id)
        .with_metadata(METADATA_GENERATE_REASON, response.reason)
}

/// Forward one agent event through the emitter as a JSON-shaped chunk.
///
/// Serialization failures are logged and swallowed; the stream continues.
fn forward_event(
    event: &AgentEvent,
    emitter: &dyn ToolEmitter,
    agent_name: &str,
    agent_id: &str,
    session_id: &str,
) {
    let payload = match serde_json::to_value(event) {
        Ok(v) => v,
        Err(e) => {
            warn!(session_id = %session_id, error = %e, "failed to serialize sub-agent event");
            return;
        }
    };

    let chunk = ToolResultBlock::text(payload.to_string())
        .with_metadata(METADATA_EVENT, &payload)
        .with_metadata(METADATA_AGENT_NAME, agent_name)
        .with_metadata(METADATA_AGENT_ID, agent_id)
        .with_metadata(METADATA_SUBAGENT_SESSION_ID, session_id);

    emitter.emit(chunk);
}

/// Collect injected results from a rewritten tool-use block.
///
/// Entries that do not parse as tool results are skipped.
fn extract_injected_results(tool_use: &ToolUseBlock) -> Vec<ToolResultBlock> {
    let Some(Value::Array(entries)) = tool_use.metadata.get(METADATA_PREVIOUS_TOOL_RESULT) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
        .collect()
}

/// Resolve the tool name from config or derive it from the agent.
///
/// Derivation lowercases the agent's display name and replaces every
/// non-alphanumeric character with `_`, prefixed with `call_`
/// (e.g. "Research Agent" becomes "call_research_agent").
fn resolve_tool_name(agent: &dyn Agent, config: &SubAgentConfig) -> String {
    if let Some(name) = config.tool_name.as_deref().filter(|n| !n.is_empty()) {
        return name.to_string();
    }

    let agent_name = agent.name();
    if agent_name.is_empty() {
        return "call_agent".to_string();
    }

    let derived: String = agent_name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("call_{derived}")
}

/// Resolve the tool description from config, the agent, or the default.
fn resolve_description(agent: &dyn Agent, config: &SubAgentConfig) -> String {
    if let Some(description) = config.description.as_deref().filter(|d| !d.is_empty()) {
        return description.to_string();
    }

    let agent_description = agent.description();
    if !agent_description.is_empty() {
        return agent_description.to_string();
    }

    format!("Call {} to complete tasks", agent.name())
}
