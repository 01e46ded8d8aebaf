//! The channel registry: a linearizable name → [`Channel`] map.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::channel::{Channel, ChannelName};

/// Owns every live [`Channel`], keyed by name. `get_or_create` is
/// linearizable: two concurrent calls for the same name are guaranteed to
/// observe (and return) the same `Arc<Channel>`.
#[derive(Default)]
pub struct ChannelRegistry {
    channels: RwLock<HashMap<ChannelName, Arc<Channel>>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Return the channel for `name`, creating it if absent. Uses
    /// double-checked locking: a cheap read-lock fast path for the common
    /// case, falling back to a write lock only on first access, re-checking
    /// under that lock so a second racer doesn't create a duplicate.
    pub async fn get_or_create(&self, name: ChannelName) -> Arc<Channel> {
        if let Some(existing) = self.channels.read().await.get(&name) {
            return existing.clone();
        }

        let mut guard = self.channels.write().await;
        if let Some(existing) = guard.get(&name) {
            return existing.clone();
        }

        info!(channel = %name, "creating channel");
        let channel = Arc::new(Channel::new(name.clone()));
        guard.insert(name, channel.clone());
        channel
    }

    /// Look up an existing channel without creating one.
    pub async fn get(&self, name: &ChannelName) -> Option<Arc<Channel>> {
        self.channels.read().await.get(name).cloned()
    }

    /// Detach `name` from the registry and close it, evicting every current
    /// subscriber. A later `get_or_create` for the same name starts a fresh
    /// channel with a new id.
    pub async fn remove(&self, name: &ChannelName) -> bool {
        let removed = self.channels.write().await.remove(name);
        match removed {
            Some(channel) => {
                info!(channel = %name, "closing channel");
                channel.close().await;
                true
            }
            None => false,
        }
    }

    /// Detach and close every channel.
    pub async fn close_all(&self) {
        let drained: Vec<Arc<Channel>> = self.channels.write().await.drain().map(|(_, c)| c).collect();
        for channel in drained {
            channel.close().await;
        }
    }

    /// Snapshot of currently registered channel names.
    pub async fn names(&self) -> Vec<ChannelName> {
        self.channels.read().await.keys().cloned().collect()
    }

    /// Number of currently registered channels.
    pub async fn channel_count(&self) -> usize {
        self.channels.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> ChannelName {
        ChannelName::parse(s).unwrap()
    }

    #[tokio::test]
    async fn get_or_create_returns_same_instance_for_same_name() {
        let registry = ChannelRegistry::new();
        let a = registry.get_or_create(name("chat")).await;
        let b = registry.get_or_create(name("chat")).await;
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.channel_count().await, 1);
    }

    #[tokio::test]
    async fn concurrent_get_or_create_is_linearizable() {
        let registry = Arc::new(ChannelRegistry::new());
        let mut handles = Vec::new();
        for _ in 0..32 {
            let registry = registry.clone();
            handles.push(tokio::spawn(async move { registry.get_or_create(name("hot")).await }));
        }
        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }
        let first = &results[0];
        assert!(results.iter().all(|c| Arc::ptr_eq(c, first)));
        assert_eq!(registry.channel_count().await, 1);
    }

    #[tokio::test]
    async fn remove_closes_channel_and_next_get_or_create_makes_new_incarnation() {
        let registry = ChannelRegistry::new();
        let first = registry.get_or_create(name("room")).await;

        assert!(registry.remove(&name("room")).await);
        assert!(!first.is_active());
        assert_eq!(registry.channel_count().await, 0);

        let second = registry.get_or_create(name("room")).await;
        assert_ne!(first.id(), second.id());
    }

    #[tokio::test]
    async fn remove_unknown_channel_returns_false() {
        let registry = ChannelRegistry::new();
        assert!(!registry.remove(&name("ghost")).await);
    }

    #[tokio::test]
    async fn close_all_empties_the_registry_and_closes_every_channel() {
        let registry = ChannelRegistry::new();
        let a = registry.get_or_create(name("a")).await;
        let b = registry.get_or_create(name("b")).await;

        registry.close_all().await;

        assert!(!a.is_active());
        assert!(!b.is_active());
        assert_eq!(registry.channel_count().await, 0);
    }
}
