// ABOUTME: Tool module - defines tools, the invocation bundle, emitters,
// ABOUTME: and the registry. Core abstraction for agent capabilities.

mod emitter;
mod registry;
mod traits;

pub use emitter::*;
pub use registry::*;
pub use traits::*;
