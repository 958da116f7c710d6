// ABOUTME: StateUnit trait - save/load participation in the session layer.
// ABOUTME: Feature-detected by the coordinator before state operations run.

use async_trait::async_trait;

use super::SessionStore;
use crate::error::SessionError;

/// A component whose state can be persisted to and restored from a session
/// store.
///
/// Loading replaces the unit's state wholesale; it never merges.
#[async_trait]
pub trait StateUnit: Send + Sync {
    /// Persist the unit's state under the given session key.
    async fn save_to(&self, store: &dyn SessionStore, key: &str) -> Result<(), SessionError>;

    /// Restore the unit's state from the given session key, if present.
    async fn load_from(&mut self, store: &dyn SessionStore, key: &str)
        -> Result<(), SessionError>;
}
