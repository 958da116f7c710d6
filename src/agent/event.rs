// ABOUTME: Streaming events emitted during an agent run and per-call filters.
// ABOUTME: Events are serialized to JSON when forwarded through an emitter.

use serde::{Deserialize, Serialize};

use crate::message::Message;

/// Which phase of a step produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Reasoning,
    Acting,
}

/// A single event from a streaming agent run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentEvent {
    pub kind: EventKind,

    pub message: Message,

    /// True on the terminal event; its message is the final reply.
    #[serde(default)]
    pub is_last: bool,
}

impl AgentEvent {
    /// Create an intermediate event.
    pub fn intermediate(kind: EventKind, message: Message) -> Self {
        Self {
            kind,
            message,
            is_last: false,
        }
    }

    /// Create the terminal event carrying the final reply.
    pub fn terminal(message: Message) -> Self {
        Self {
            kind: EventKind::Reasoning,
            message,
            is_last: true,
        }
    }
}

/// Per-call filters for which intermediate events a streaming run emits.
///
/// The terminal event is always emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamOptions {
    pub reasoning: bool,
    pub acting: bool,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            reasoning: true,
            acting: true,
        }
    }
}

impl StreamOptions {
    /// Whether events of the given kind should be emitted.
    pub fn allows(&self, kind: EventKind) -> bool {
        match kind {
            EventKind::Reasoning => self.reasoning,
            EventKind::Acting => self.acting,
        }
    }
}
