// ABOUTME: Coordinator module - pending-result staging, the context facade,
// ABOUTME: and the pre-acting injection hook for suspend/resume.

mod context;
mod inject;
mod pending;

pub use context::{
    CoordinatorContext, INPUT_SESSION_ID, METADATA_GENERATE_REASON,
    METADATA_PREVIOUS_TOOL_RESULT, METADATA_SUBAGENT_SESSION_ID, METADATA_SUSPENDED,
};
pub use inject::ResultInjectionHook;
pub use pending::{PendingContext, PendingStore};

#[cfg(test)]
mod inject_test;
