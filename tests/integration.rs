// ABOUTME: Integration tests verifying modules work together.
// ABOUTME: Drives full suspend/resume cycles without external dependencies.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures::stream;
use relay::prelude::*;
use serde_json::json;

/// A scripted agent whose replies come from a shared queue and whose state
/// is its conversation history.
struct ScriptedAgent {
    name: String,
    agent_id: String,
    capabilities: Capabilities,
    script: Arc<Mutex<VecDeque<Message>>>,
    received: Arc<Mutex<Vec<Vec<Message>>>>,
    history: Vec<Message>,
}

impl ScriptedAgent {
    fn next_reply(&mut self, messages: Vec<Message>) -> Message {
        self.received.lock().unwrap().push(messages.clone());
        self.history.extend(messages);
        let reply = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Message::assistant("(no script)"));
        self.history.push(reply.clone());
        reply
    }
}

#[async_trait::async_trait]
impl Agent for ScriptedAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn agent_id(&self) -> &str {
        &self.agent_id
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    async fn call(&mut self, messages: Vec<Message>) -> Result<Message, AgentError> {
        Ok(self.next_reply(messages))
    }

    fn stream(&mut self, messages: Vec<Message>, options: StreamOptions) -> EventStream<'_> {
        let reply = self.next_reply(messages);
        let mut events = Vec::new();
        if options.allows(EventKind::Acting) {
            events.push(Ok(AgentEvent::intermediate(
                EventKind::Acting,
                Message::assistant("thinking"),
            )));
        }
        events.push(Ok(AgentEvent::terminal(reply)));
        Box::pin(stream::iter(events))
    }

    fn state_unit(&mut self) -> Option<&mut dyn StateUnit> {
        if self.capabilities.participates_in_state {
            Some(self)
        } else {
            None
        }
    }
}

#[async_trait::async_trait]
impl StateUnit for ScriptedAgent {
    async fn save_to(&self, store: &dyn SessionStore, key: &str) -> Result<(), SessionError> {
        store
            .save(key, "agent_state", serde_json::to_value(&self.history)?)
            .await
    }

    async fn load_from(&mut self, store: &dyn SessionStore, key: &str) -> Result<(), SessionError> {
        if let Some(value) = store.get(key, "agent_state").await? {
            self.history = serde_json::from_value(value)?;
        }
        Ok(())
    }
}

struct ScriptedProvider {
    name: String,
    capabilities: Capabilities,
    script: Arc<Mutex<VecDeque<Message>>>,
    received: Arc<Mutex<Vec<Vec<Message>>>>,
    created: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    fn new(name: impl Into<String>, capabilities: Capabilities) -> Self {
        Self {
            name: name.into(),
            capabilities,
            script: Arc::new(Mutex::new(VecDeque::new())),
            received: Arc::new(Mutex::new(Vec::new())),
            created: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn push_reply(&self, reply: Message) {
        self.script.lock().unwrap().push_back(reply);
    }
}

impl AgentProvider for ScriptedProvider {
    fn provide(&self) -> Box<dyn Agent> {
        let n = self.created.fetch_add(1, Ordering::SeqCst) + 1;
        Box::new(ScriptedAgent {
            name: self.name.clone(),
            agent_id: format!("agent-{n}"),
            capabilities: self.capabilities,
            script: self.script.clone(),
            received: self.received.clone(),
            history: Vec::new(),
        })
    }
}

fn hitl_capabilities() -> Capabilities {
    Capabilities {
        can_suspend: true,
        participates_in_state: true,
        resumes_subagents: true,
    }
}

fn suspended_reply() -> Message {
    Message::new(
        Role::Assistant,
        vec![
            ContentBlock::text("Calling external API..."),
            ContentBlock::ToolUse(ToolUseBlock::new("inner-1", "external_api")),
        ],
    )
    .with_reason(TerminationReason::ToolSuspended)
}

fn session_id_of(result: &ToolResultBlock) -> String {
    let text = result.text_content();
    text.lines()
        .next()
        .and_then(|line| line.strip_prefix("session_id: "))
        .expect("result should start with a session line")
        .to_string()
}

#[tokio::test]
async fn test_fresh_session_normal_completion() {
    let provider = Arc::new(ScriptedProvider::new("Helper", Capabilities::default()));
    provider.push_reply(Message::assistant("Hello from the helper"));

    let tool = SubAgentTool::with_defaults(provider.clone()).unwrap();

    let invocation = ToolInvocation::from_tool_use(
        ToolUseBlock::new("outer-1", tool.name()).with_input("message", "Hello"),
    );
    let result = tool.invoke(invocation).await.unwrap();

    assert!(!result.is_error);
    assert!(!result.metadata.contains_key("suspended"));
    let session_id = session_id_of(&result);
    assert!(!session_id.is_empty());
    assert!(result.text_content().contains("Hello from the helper"));

    // Construction samples once, the invocation creates one.
    assert_eq!(provider.created.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_continuation_reuses_session_id() {
    let session = MemorySessionStore::shared();
    let provider = Arc::new(ScriptedProvider::new(
        "Helper",
        Capabilities {
            participates_in_state: true,
            ..Capabilities::default()
        },
    ));
    provider.push_reply(Message::assistant("First"));
    provider.push_reply(Message::assistant("Second"));

    let tool = SubAgentTool::new(
        provider.clone(),
        SubAgentConfig::new().session(session.clone()),
    )
    .unwrap();

    let first = tool
        .invoke(ToolInvocation::from_tool_use(
            ToolUseBlock::new("outer-1", tool.name()).with_input("message", "Hello"),
        ))
        .await
        .unwrap();
    let session_id = session_id_of(&first);

    let second = tool
        .invoke(ToolInvocation::from_tool_use(
            ToolUseBlock::new("outer-2", tool.name())
                .with_input("message", "How are you?")
                .with_input("session_id", session_id.clone()),
        ))
        .await
        .unwrap();

    assert_eq!(session_id_of(&second), session_id);

    // A fresh instance per call, continuity only through the store.
    assert_eq!(provider.created.load(Ordering::SeqCst), 3);

    // The second instance saw the first turn through restored state.
    let saved = session.get(&session_id, "agent_state").await.unwrap().unwrap();
    let history: Vec<Message> = serde_json::from_value(saved).unwrap();
    assert_eq!(history.len(), 4);
    assert_eq!(history[0].text_content(), "Hello");
    assert_eq!(history[3].text_content(), "Second");
}

#[tokio::test]
async fn test_suspension_surfaces_inner_tool_uses() {
    let provider = Arc::new(ScriptedProvider::new("Helper", hitl_capabilities()));
    provider.push_reply(suspended_reply());

    let tool = SubAgentTool::new(provider, SubAgentConfig::new().enable_hitl(true)).unwrap();

    let result = tool
        .invoke(ToolInvocation::from_tool_use(
            ToolUseBlock::new("outer-1", tool.name()).with_input("message", "Fetch the data"),
        ))
        .await
        .unwrap();

    assert_eq!(result.metadata.get("suspended"), Some(&json!(true)));
    assert!(CoordinatorContext::is_suspended(&result));
    assert!(CoordinatorContext::is_subagent_result(&result));
    assert_eq!(
        CoordinatorContext::termination_reason(&result),
        TerminationReason::ToolSuspended
    );

    assert_eq!(result.output.len(), 2);
    assert!(matches!(&result.output[0], ContentBlock::Text { .. }));
    match &result.output[1] {
        ContentBlock::ToolUse(tool_use) => assert_eq!(tool_use.name, "external_api"),
        other => panic!("Expected a pending tool use, got {:?}", other),
    }
}

#[tokio::test]
async fn test_suspend_then_resume_with_injected_results() {
    let session = MemorySessionStore::shared();
    let provider = Arc::new(ScriptedProvider::new("Helper", hitl_capabilities()));
    provider.push_reply(suspended_reply());
    provider.push_reply(Message::assistant("Processed the API result"));

    let tool = SubAgentTool::new(
        provider.clone(),
        SubAgentConfig::new()
            .enable_hitl(true)
            .session(session.clone()),
    )
    .unwrap();

    // First call: the sub-agent suspends.
    let suspended = tool
        .invoke(ToolInvocation::from_tool_use(
            ToolUseBlock::new("outer-1", tool.name()).with_input("message", "Fetch the data"),
        ))
        .await
        .unwrap();

    let session_id = CoordinatorContext::extract_session_id(&suspended).unwrap();

    // The parent stages the human-approved result.
    let context = Arc::new(CoordinatorContext::new());
    context.set_session_id("outer-1", &session_id).await.unwrap();
    context
        .submit_results(
            "outer-1",
            vec![ToolResultBlock::text("api says 42").with_id("inner-1")],
        )
        .await
        .unwrap();

    // The injection hook rewrites the outer tool-use on the next dispatch.
    let registry = HookRegistry::new();
    registry
        .register(ResultInjectionHook::new(context.clone()))
        .await;

    let retry = ToolUseBlock::new("outer-1", tool.name());
    let action = registry
        .fire(&HookEvent::PreActing {
            tool_use: retry.clone(),
        })
        .await
        .unwrap();

    let HookAction::Transform(rewritten) = action else {
        panic!("Expected the injection hook to rewrite the tool use");
    };
    assert_eq!(
        rewritten.input.get("session_id"),
        Some(&json!(session_id.clone()))
    );
    assert!(rewritten.metadata.contains_key("previous_tool_result"));

    // Second call: the tool resumes with the injected results.
    let resumed = tool
        .invoke(ToolInvocation::from_tool_use(rewritten))
        .await
        .unwrap();

    assert!(!resumed.is_error);
    assert!(!CoordinatorContext::is_suspended(&resumed));
    assert_eq!(
        CoordinatorContext::termination_reason(&resumed),
        TerminationReason::ModelStop
    );
    assert_eq!(session_id_of(&resumed), session_id);

    // Nothing left behind for the outer call.
    assert!(context.consume_pending("outer-1").await.is_none());

    // The resumed agent received the staged result as a tool message.
    let received = provider.received.lock().unwrap();
    let resume_batch = received.last().unwrap();
    assert_eq!(resume_batch.len(), 1);
    assert_eq!(resume_batch[0].role, Role::Tool);
}

#[tokio::test]
async fn test_hitl_disabled_downgrades_suspension() {
    let provider = Arc::new(ScriptedProvider::new("Helper", hitl_capabilities()));
    provider.push_reply(suspended_reply());

    let tool = SubAgentTool::with_defaults(provider).unwrap();

    let result = tool
        .invoke(ToolInvocation::from_tool_use(
            ToolUseBlock::new("outer-1", tool.name()).with_input("message", "Fetch the data"),
        ))
        .await
        .unwrap();

    assert!(!result.metadata.contains_key("suspended"));
    assert!(result.text_content().starts_with("session_id: "));
}

#[tokio::test]
async fn test_injection_hook_no_op_without_pending_entry() {
    let context = Arc::new(CoordinatorContext::new());
    let registry = HookRegistry::new();
    registry.register(ResultInjectionHook::new(context)).await;

    let tool_use = ToolUseBlock::new("outer-9", "call_helper")
        .with_input("message", "hello")
        .with_metadata("trace", "t9");

    let action = registry
        .fire(&HookEvent::PreActing {
            tool_use: tool_use.clone(),
        })
        .await
        .unwrap();

    // Continue leaves the structurally identical block in place.
    assert!(matches!(action, HookAction::Continue));
}

#[tokio::test]
async fn test_multiple_suspend_resume_cycles_keep_session() {
    let session = MemorySessionStore::shared();
    let provider = Arc::new(ScriptedProvider::new("Helper", hitl_capabilities()));
    provider.push_reply(suspended_reply());
    provider.push_reply(
        Message::new(
            Role::Assistant,
            vec![
                ContentBlock::text("One more check..."),
                ContentBlock::ToolUse(ToolUseBlock::new("inner-2", "verify_api")),
            ],
        )
        .with_reason(TerminationReason::ToolSuspended),
    );
    provider.push_reply(Message::assistant("All done"));

    let tool = SubAgentTool::new(
        provider,
        SubAgentConfig::new()
            .enable_hitl(true)
            .session(session.clone()),
    )
    .unwrap();

    let context = Arc::new(CoordinatorContext::new());
    let registry = HookRegistry::new();
    registry
        .register(ResultInjectionHook::new(context.clone()))
        .await;

    let first = tool
        .invoke(ToolInvocation::from_tool_use(
            ToolUseBlock::new("outer-1", tool.name()).with_input("message", "Go"),
        ))
        .await
        .unwrap();
    let session_id = CoordinatorContext::extract_session_id(&first).unwrap();

    // Two rounds, each with a fresh outer call id.
    let mut current = first;
    for (outer_id, reply_text) in [("outer-2", "42"), ("outer-3", "confirmed")] {
        assert!(CoordinatorContext::is_suspended(&current));
        let sess = CoordinatorContext::extract_session_id(&current).unwrap();
        assert_eq!(sess, session_id);

        context.set_session_id(outer_id, &sess).await.unwrap();
        context
            .submit_result(outer_id, ToolResultBlock::text(reply_text))
            .await
            .unwrap();

        let action = registry
            .fire(&HookEvent::PreActing {
                tool_use: ToolUseBlock::new(outer_id, tool.name()),
            })
            .await
            .unwrap();
        let HookAction::Transform(rewritten) = action else {
            panic!("Expected injection for {outer_id}");
        };

        current = tool
            .invoke(ToolInvocation::from_tool_use(rewritten))
            .await
            .unwrap();
    }

    assert!(!CoordinatorContext::is_suspended(&current));
    assert_eq!(session_id_of(&current), session_id);
    assert!(current.text_content().contains("All done"));
}
