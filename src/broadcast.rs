//! The broadcast service: the façade the HTTP layer and any in-process
//! publisher use instead of touching the registry directly.

use std::sync::Arc;

use uuid::Uuid;

use crate::channel::{validate_payload, ChannelName, Event, EventSource, ListenerFn};
use crate::error::Result;
use crate::registry::ChannelRegistry;

/// Publishes events into, and reports on, the channels held by a
/// [`ChannelRegistry`]. Cloneable handle shared across the admin routes and
/// the subscriber endpoint.
pub struct BroadcastService {
    registry: Arc<ChannelRegistry>,
}

impl BroadcastService {
    pub fn new(registry: Arc<ChannelRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ChannelRegistry> {
        &self.registry
    }

    /// Validate `payload` and fan it out to every current subscriber of
    /// `name`. A channel with no subscribers is never allocated: if `name`
    /// isn't already registered, this is a silent no-op.
    pub async fn broadcast(&self, name: ChannelName, payload: impl Into<String>) -> Result<()> {
        let payload = payload.into();
        validate_payload(&payload)?;

        let Some(channel) = self.registry.get(&name).await else {
            return Ok(());
        };
        let event = Event {
            channel_id: channel.id(),
            source: EventSource::Publisher,
            payload,
        };
        channel.fire(event).await;
        Ok(())
    }

    /// Validate `name` and return its channel, creating it if absent.
    pub async fn lookup_by_channel_name(&self, name: ChannelName) -> Arc<crate::channel::Channel> {
        self.registry.get_or_create(name).await
    }

    /// Register `listener` on `name`, creating the channel if absent.
    /// Returns the channel so the caller can race its `await_close()`.
    pub async fn subscribe(&self, name: ChannelName, listener: ListenerFn) -> Arc<crate::channel::Channel> {
        let channel = self.lookup_by_channel_name(name).await;
        channel.subscribe(listener).await;
        channel
    }

    /// Deliver a heartbeat comment-line event. Heartbeats are sourced
    /// per-connection by the subscriber endpoint, not broadcast through this
    /// service, but the helper lives here so both share one `Event`
    /// construction path.
    pub fn heartbeat_event(channel_id: Uuid) -> Event {
        Event {
            channel_id,
            source: EventSource::Heartbeat,
            payload: String::new(),
        }
    }

    /// Current subscriber count for `name`, or 0 if the channel doesn't
    /// exist.
    pub async fn get_client_count(&self, name: &ChannelName) -> usize {
        match self.registry.get(name).await {
            Some(channel) => channel.listener_count().await,
            None => 0,
        }
    }

    /// Names of every channel currently registered (active or not yet
    /// reaped).
    pub async fn get_active_channels(&self) -> Vec<ChannelName> {
        self.registry.names().await
    }

    /// Total listeners across every registered channel, for `/api/health`.
    pub async fn total_connections(&self) -> usize {
        let mut total = 0;
        for name in self.registry.names().await {
            total += self.get_client_count(&name).await;
        }
        total
    }

    /// Close one channel by name, evicting its subscribers immediately.
    pub async fn close_channel(&self, name: &ChannelName) -> bool {
        self.registry.remove(name).await
    }

    /// Close every channel, evicting every subscriber across the hub.
    pub async fn close_all_channels(&self) {
        self.registry.close_all().await;
    }
}
