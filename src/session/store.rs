// ABOUTME: Session storage for agent and coordinator state.
// ABOUTME: Values are keyed by session id and a logical name within it.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::SessionError;

/// Trait for storing and retrieving session state.
///
/// Implement this trait to provide custom storage backends (file system,
/// database, etc.). Implementations must be safe to share across
/// coordinators and invocations.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Save a value under a session key and logical name.
    async fn save(&self, key: &str, name: &str, value: Value) -> Result<(), SessionError>;

    /// Load a value by session key and logical name.
    /// Returns None if nothing was saved under that pair.
    async fn get(&self, key: &str, name: &str) -> Result<Option<Value>, SessionError>;

    /// Delete everything stored under a session key.
    async fn delete(&self, key: &str) -> Result<(), SessionError>;

    /// List all session keys.
    async fn keys(&self) -> Result<Vec<String>, SessionError>;
}

/// In-memory session store.
///
/// Useful for testing and short-lived sessions where persistence is not
/// required. This is the default backend for sub-agent tools.
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, HashMap<String, Value>>>,
}

impl MemorySessionStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Create a new store wrapped in Arc for sharing.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, key: &str, name: &str, value: Value) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(key.to_string())
            .or_default()
            .insert(name.to_string(), value);
        Ok(())
    }

    async fn get(&self, key: &str, name: &str) -> Result<Option<Value>, SessionError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(key).and_then(|s| s.get(name)).cloned())
    }

    async fn delete(&self, key: &str) -> Result<(), SessionError> {
        self.sessions.write().await.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, SessionError> {
        let sessions = self.sessions.read().await;
        let mut keys: Vec<_> = sessions.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
