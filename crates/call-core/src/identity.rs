//! Party identity state and local profile persistence
//!
//! Two identifiers key everything: the caller's (the document the initiator
//! owns) and the receiver's (the document of the call being joined - on the
//! responding device this holds the *initiator's* number). Both survive app
//! restarts through the [`ProfileStore`] seam.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;

/// The two fixed roles of the two-party handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyRole {
    /// Initiates the call with an offer
    Caller,
    /// Responds with an answer
    Receiver,
}

impl PartyRole {
    /// Fixed key under which this role's identifier persists locally
    pub fn storage_key(&self) -> &'static str {
        match self {
            PartyRole::Caller => "caller",
            PartyRole::Receiver => "receiver",
        }
    }

    /// The other role
    pub fn counterpart(&self) -> PartyRole {
        match self {
            PartyRole::Caller => PartyRole::Receiver,
            PartyRole::Receiver => PartyRole::Caller,
        }
    }
}

impl std::fmt::Display for PartyRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.storage_key())
    }
}

/// The two identifiers currently held by a device
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartyIdentity {
    /// Identifier of the call initiator's document
    pub caller: Option<String>,
    /// Identifier of the document being joined as responder
    pub receiver: Option<String>,
}

impl PartyIdentity {
    /// The identifier held for the given role
    pub fn get(&self, role: PartyRole) -> Option<&str> {
        match role {
            PartyRole::Caller => self.caller.as_deref(),
            PartyRole::Receiver => self.receiver.as_deref(),
        }
    }

    /// Replace the identifier held for the given role
    pub fn set(&mut self, role: PartyRole, value: impl Into<String>) {
        let value = Some(value.into());
        match role {
            PartyRole::Caller => self.caller = value,
            PartyRole::Receiver => self.receiver = value,
        }
    }
}

/// Result type for profile store operations
pub type ProfileResult<T> = Result<T, ProfileError>;

/// Errors reported by the local profile store
#[derive(Debug, Error, Clone)]
pub enum ProfileError {
    /// The backing key-value storage failed
    #[error("Profile storage error: {reason}")]
    Backend { reason: String },
}

impl ProfileError {
    /// Create a backend error
    pub fn backend(reason: impl Into<String>) -> Self {
        Self::Backend {
            reason: reason.into(),
        }
    }
}

/// On-device key-value persistence of the two identifiers
///
/// Read at startup, written after each successful
/// [`store_party`](crate::SignalingCoordinator::store_party). Values are
/// plain strings keyed by [`PartyRole::storage_key`].
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Load the persisted identifier for a role, if any
    async fn load(&self, role: PartyRole) -> ProfileResult<Option<String>>;

    /// Persist the identifier for a role
    async fn save(&self, role: PartyRole, value: &str) -> ProfileResult<()>;
}

/// In-memory [`ProfileStore`] used by tests
pub struct MemoryProfileStore {
    values: Mutex<HashMap<&'static str, String>>,
}

impl MemoryProfileStore {
    /// Create an empty profile store
    pub fn new() -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for MemoryProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn load(&self, role: PartyRole) -> ProfileResult<Option<String>> {
        Ok(self.values.lock().await.get(role.storage_key()).cloned())
    }

    async fn save(&self, role: PartyRole, value: &str) -> ProfileResult<()> {
        self.values
            .lock()
            .await
            .insert(role.storage_key(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_keys_are_the_fixed_names() {
        assert_eq!(PartyRole::Caller.storage_key(), "caller");
        assert_eq!(PartyRole::Receiver.storage_key(), "receiver");
    }

    #[test]
    fn identity_set_and_get_by_role() {
        let mut identity = PartyIdentity::default();
        identity.set(PartyRole::Caller, "111");
        assert_eq!(identity.get(PartyRole::Caller), Some("111"));
        assert_eq!(identity.get(PartyRole::Receiver), None);
    }

    #[tokio::test]
    async fn memory_profile_store_roundtrip() {
        let store = MemoryProfileStore::new();
        assert_eq!(store.load(PartyRole::Caller).await.unwrap(), None);
        store.save(PartyRole::Caller, "111").await.unwrap();
        store.save(PartyRole::Receiver, "222").await.unwrap();
        assert_eq!(
            store.load(PartyRole::Caller).await.unwrap(),
            Some("111".to_string())
        );
        assert_eq!(
            store.load(PartyRole::Receiver).await.unwrap(),
            Some("222".to_string())
        );
    }
}
