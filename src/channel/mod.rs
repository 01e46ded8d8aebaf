//! The channel and fan-out engine.
//!
//! A [`Channel`] holds the listener set for one channel name and implements
//! subscribe/fire/close. Listeners are
//! plain callbacks, not `tokio::sync::broadcast` receivers: a subscriber is
//! evicted the instant its callback returns `false` or panics, which is what
//! lets `fire` guarantee "each listener present at the snapshot receives the
//! event exactly once before `fire` returns" without a lagging ring buffer.

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::OnceLock;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use regex::Regex;
use tokio::sync::{Notify, RwLock};
use tracing::warn;
use uuid::Uuid;

use crate::error::{Error, Result};

/// Maximum payload size, in bytes.
pub const MAX_PAYLOAD_BYTES: usize = 65_536;

const NAME_RESERVED_PREFIX: &str = "_system";

fn name_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._:-]{1,100}$").expect("channel name pattern is a valid regex")
    })
}

/// A validated channel name: non-empty, 1..100 bytes, `[A-Za-z0-9._:-]`,
/// and never starting with the reserved `_system` prefix.
///
/// `regex` has no lookaround support, so the `_system` prefix exclusion is
/// checked separately from the character-class/length match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelName(String);

impl ChannelName {
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.starts_with(NAME_RESERVED_PREFIX) {
            return Err(Error::InvalidChannelName(raw.to_string()));
        }
        if !name_pattern().is_match(raw) {
            return Err(Error::InvalidChannelName(raw.to_string()));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validates a payload against the hub's size bound. Payloads are opaque;
/// the hub never otherwise inspects them.
pub fn validate_payload(payload: &str) -> Result<()> {
    if payload.len() > MAX_PAYLOAD_BYTES {
        return Err(Error::PayloadTooLarge(payload.len()));
    }
    Ok(())
}

/// Where an [`Event`] originated. Carried for diagnostics only — never
/// written to the SSE wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSource {
    Publisher,
    Heartbeat,
}

/// A broadcast event. Only `payload` is observable on the wire.
#[derive(Debug, Clone)]
pub struct Event {
    pub channel_id: Uuid,
    pub source: EventSource,
    pub payload: String,
}

/// A listener callback: `(event) -> keep_subscribed`. Returning `false`, or
/// panicking, requests eviction.
pub type ListenerFn = std::sync::Arc<dyn Fn(Event) -> BoxFuture<'static, bool> + Send + Sync>;

#[derive(Clone)]
struct ListenerEntry {
    id: u64,
    callback: ListenerFn,
}

/// A named topic: the unit of subscription and fan-out.
pub struct Channel {
    id: Uuid,
    name: ChannelName,
    listeners: RwLock<Vec<ListenerEntry>>,
    next_listener_id: AtomicU64,
    active: AtomicBool,
    closed: Notify,
}

impl Channel {
    pub fn new(name: ChannelName) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            listeners: RwLock::new(Vec::new()),
            next_listener_id: AtomicU64::new(0),
            active: AtomicBool::new(true),
            closed: Notify::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &ChannelName {
        &self.name
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Append `listener` to the listener set, unless the channel is closed.
    /// A listener registered twice (even the same closure) is tracked as two
    /// independent subscriptions.
    pub async fn subscribe(&self, listener: ListenerFn) {
        if !self.is_active() {
            return;
        }
        let id = self.next_listener_id.fetch_add(1, Ordering::SeqCst);
        let mut guard = self.listeners.write().await;
        // Re-check under the lock: close() may have raced with us.
        if self.is_active() {
            guard.push(ListenerEntry { id, callback: listener });
        }
    }

    /// Broadcast `event` to every listener attached at the instant this call
    /// takes its snapshot, in insertion order, at most once each, before
    /// returning. A listener that returns `false` or panics is evicted;
    /// eviction is visible to any later `fire`.
    pub async fn fire(&self, event: Event) {
        if !self.is_active() {
            return;
        }
        let snapshot: Vec<ListenerEntry> = self.listeners.read().await.clone();
        if snapshot.is_empty() {
            return;
        }

        let mut evicted = Vec::new();
        for entry in &snapshot {
            let fut = (entry.callback)(event.clone());
            let keep = match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(keep) => keep,
                Err(_) => {
                    warn!(channel = %self.name, listener_id = entry.id, "listener panicked; evicting");
                    false
                }
            };
            if !keep {
                evicted.push(entry.id);
            }
        }

        if !evicted.is_empty() {
            let mut guard = self.listeners.write().await;
            guard.retain(|entry| !evicted.contains(&entry.id));
        }
    }

    /// Clear the listener set, mark the channel inactive, and wake any
    /// `await_close` waiters. Idempotent.
    pub async fn close(&self) {
        let was_active = self.active.swap(false, Ordering::SeqCst);
        if was_active {
            self.listeners.write().await.clear();
        }
        self.closed.notify_waiters();
    }

    /// Resolves once `close()` has been called on this instance. `active`
    /// only ever transitions `true -> false` once, so a single
    /// register-then-check avoids the Notify missed-wakeup race.
    pub async fn await_close(&self) {
        if !self.is_active() {
            return;
        }
        let notified = self.closed.notified();
        if !self.is_active() {
            return;
        }
        notified.await;
    }

    /// Best-effort listener cardinality.
    pub async fn listener_count(&self) -> usize {
        self.listeners.read().await.len()
    }
}
