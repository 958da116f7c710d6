// ABOUTME: ToolEmitter - out-of-band sink for intermediate tool result
// ABOUTME: chunks produced while a tool call is still in flight.

use crate::message::ToolResultBlock;

/// Receives intermediate result chunks during a tool call.
///
/// `emit` is invoked synchronously on the producing stream's task, so the
/// emission order matches the event order. Implementations must not block
/// on downstream work.
pub trait ToolEmitter: Send + Sync {
    /// Deliver one intermediate chunk.
    fn emit(&self, chunk: ToolResultBlock);
}

/// An emitter that drops every chunk.
pub struct NoopEmitter;

impl ToolEmitter for NoopEmitter {
    fn emit(&self, _chunk: ToolResultBlock) {}
}
