//! Shared handle to the process's current client.
//!
//! Owned by whatever assembles the application and passed to the code that
//! needs "the" client. Nothing inside this crate reads it.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::client::StreamClient;

/// Optional current client, cheap to clone.
#[derive(Clone, Default)]
pub struct ClientSlot {
    inner: Arc<RwLock<Option<StreamClient>>>,
}

impl ClientSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `client` as current and return the one it replaced.
    ///
    /// The replaced client keeps running; closing it is up to the caller.
    pub async fn replace(&self, client: StreamClient) -> Option<StreamClient> {
        let previous = self.inner.write().await.replace(client);
        info!("current stream client replaced: {}", previous.is_some());
        previous
    }

    /// The current client, if one is installed.
    pub async fn current(&self) -> Option<StreamClient> {
        self.inner.read().await.clone()
    }

    /// Remove and return the current client.
    pub async fn clear(&self) -> Option<StreamClient> {
        self.inner.write().await.take()
    }

    pub async fn is_set(&self) -> bool {
        self.inner.read().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ClientOptions;

    #[tokio::test]
    async fn test_slot_starts_empty() {
        let slot = ClientSlot::new();
        assert!(!slot.is_set().await);
        assert!(slot.current().await.is_none());
        assert!(slot.clear().await.is_none());
    }

    #[tokio::test]
    async fn test_replace_returns_previous() {
        let slot = ClientSlot::new();
        let first = StreamClient::new(ClientOptions::new("first"));
        let second = StreamClient::new(ClientOptions::new("second"));

        assert!(slot.replace(first).await.is_none());
        let previous = slot.replace(second).await.unwrap();
        assert_eq!(previous.options().token, "first");

        // Clones see the same slot
        let shared = slot.clone();
        assert_eq!(shared.current().await.unwrap().options().token, "second");

        assert!(slot.clear().await.is_some());
        assert!(!shared.is_set().await);
    }
}
