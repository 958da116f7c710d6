// ABOUTME: Tests for ResultInjectionHook - rewrite on pending entries,
// ABOUTME: pass-through otherwise, and registry integration.

use std::sync::Arc;

use serde_json::json;

use super::{
    CoordinatorContext, ResultInjectionHook, INPUT_SESSION_ID, METADATA_PREVIOUS_TOOL_RESULT,
};
use crate::hook::{Hook, HookAction, HookEvent, HookRegistry};
use crate::message::{ToolResultBlock, ToolUseBlock};

fn pre_acting(tool_use: ToolUseBlock) -> HookEvent {
    HookEvent::PreActing { tool_use }
}

#[tokio::test]
async fn test_injects_pending_results() {
    let context = Arc::new(CoordinatorContext::new());
    context.set_session_id("call-1", "sess-1").await.unwrap();
    context
        .submit_result("call-1", ToolResultBlock::text("api says 42").with_id("inner-1"))
        .await
        .unwrap();

    let hook = ResultInjectionHook::new(context.clone());
    let original = ToolUseBlock::new("call-1", "call_helper").with_input("message", "hi");

    let action = hook.on_event(&pre_acting(original.clone())).await.unwrap();

    let HookAction::Transform(rewritten) = action else {
        panic!("Expected Transform action");
    };

    assert_eq!(rewritten.id, original.id);
    assert_eq!(rewritten.name, original.name);
    assert_eq!(rewritten.input.get("message"), Some(&json!("hi")));
    assert_eq!(
        rewritten.input.get(INPUT_SESSION_ID),
        Some(&json!("sess-1"))
    );

    let staged = rewritten
        .metadata
        .get(METADATA_PREVIOUS_TOOL_RESULT)
        .and_then(|v| v.as_array())
        .expect("staged results present");
    assert_eq!(staged.len(), 1);

    let parsed: ToolResultBlock = serde_json::from_value(staged[0].clone()).unwrap();
    assert_eq!(parsed.text_content(), "api says 42");
    assert_eq!(parsed.id.as_deref(), Some("inner-1"));

    // The original block is untouched.
    assert!(original.metadata.is_empty());
    assert!(!original.input.contains_key(INPUT_SESSION_ID));

    // The store was drained atomically.
    assert!(context.consume_pending("call-1").await.is_none());
}

#[tokio::test]
async fn test_no_op_without_pending_entry() {
    let context = Arc::new(CoordinatorContext::new());
    let hook = ResultInjectionHook::new(context);

    let tool_use = ToolUseBlock::new("call-1", "call_helper")
        .with_input("message", "hi")
        .with_metadata("trace", "t1");

    let action = hook.on_event(&pre_acting(tool_use)).await.unwrap();
    assert!(matches!(action, HookAction::Continue));
}

#[tokio::test]
async fn test_no_op_on_blank_id() {
    let context = Arc::new(CoordinatorContext::new());
    context.set_session_id("call-1", "sess-1").await.unwrap();
    let hook = ResultInjectionHook::new(context.clone());

    let tool_use = ToolUseBlock::new("", "call_helper");
    let action = hook.on_event(&pre_acting(tool_use)).await.unwrap();
    assert!(matches!(action, HookAction::Continue));

    // Nothing was consumed.
    assert!(context.session_id("call-1").await.is_some());
}

#[tokio::test]
async fn test_registry_fire_yields_structurally_equal_block_when_not_pending() {
    let context = Arc::new(CoordinatorContext::new());
    let registry = HookRegistry::new();
    registry.register(ResultInjectionHook::new(context)).await;

    let tool_use = ToolUseBlock::new("call-9", "call_helper")
        .with_input("message", "hello")
        .with_metadata("trace", "t9");

    let action = registry.fire(&pre_acting(tool_use.clone())).await.unwrap();

    // Continue means the dispatcher keeps the original, structurally equal
    // block: same id, name, input, metadata, content.
    assert!(matches!(action, HookAction::Continue));
}

#[tokio::test]
async fn test_registry_fire_injects_ahead_of_other_hooks() {
    let context = Arc::new(CoordinatorContext::new());
    context.set_session_id("call-1", "sess-1").await.unwrap();
    context
        .submit_result("call-1", ToolResultBlock::text("staged"))
        .await
        .unwrap();

    // A default-priority hook that asserts it sees the rewritten block.
    struct SeesInjection;

    #[async_trait::async_trait]
    impl Hook for SeesInjection {
        async fn on_event(&self, event: &HookEvent) -> Result<HookAction, anyhow::Error> {
            if let HookEvent::PreActing { tool_use } = event {
                assert!(tool_use.metadata.contains_key(METADATA_PREVIOUS_TOOL_RESULT));
            }
            Ok(HookAction::Continue)
        }
    }

    let registry = HookRegistry::new();
    registry.register(SeesInjection).await;
    registry.register(ResultInjectionHook::new(context)).await;

    let action = registry
        .fire(&pre_acting(ToolUseBlock::new("call-1", "call_helper")))
        .await
        .unwrap();

    let HookAction::Transform(rewritten) = action else {
        panic!("Expected Transform action");
    };
    assert_eq!(
        rewritten.input.get(INPUT_SESSION_ID),
        Some(&json!("sess-1"))
    );
}
