// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process event bus: glob-pattern subscription per client, broadcast
//! fan-out. Events are transient and never persisted — `emit` delivers to
//! whoever is currently subscribed and nothing more.
//!
//! Delivery order for one `emit`: in-process listeners in registration
//! order, then connections in connection-id order. No ordering is
//! guaranteed across concurrently emitted events.

use atlas_core::{ConnectionId, Event, SubscriptionPattern, SubscriptionSet};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;

type Listener = Arc<dyn Fn(&Event) + Send + Sync>;

struct Client {
    patterns: SubscriptionSet,
    sender: mpsc::Sender<Event>,
}

struct BusState {
    clients: BTreeMap<ConnectionId, Client>,
    listeners: Vec<Listener>,
}

/// Shared handle; cheap to clone, all state lives behind the inner mutex.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<Mutex<BusState>>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(BusState {
                clients: BTreeMap::new(),
                listeners: Vec::new(),
            })),
        }
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection's outgoing channel. Delivery starts from this
    /// point; events emitted strictly before are not buffered.
    pub fn register(&self, id: ConnectionId, sender: mpsc::Sender<Event>) {
        self.inner.lock().clients.insert(
            id,
            Client {
                patterns: SubscriptionSet::default(),
                sender,
            },
        );
    }

    /// Remove a connection and all of its subscription patterns atomically
    /// relative to subsequent broadcasts.
    pub fn unregister(&self, id: &ConnectionId) {
        self.inner.lock().clients.remove(id);
    }

    /// Union new patterns into a connection's subscription set.
    pub fn subscribe(&self, id: &ConnectionId, patterns: impl IntoIterator<Item = SubscriptionPattern>) {
        if let Some(client) = self.inner.lock().clients.get_mut(id) {
            client.patterns.union(patterns);
        }
    }

    /// Remove the exact pattern strings provided.
    pub fn unsubscribe(&self, id: &ConnectionId, patterns: &[SubscriptionPattern]) {
        if let Some(client) = self.inner.lock().clients.get_mut(id) {
            for pattern in patterns {
                client.patterns.remove(pattern);
            }
        }
    }

    /// Register an in-process listener (used by same-process tasks and
    /// tests); listener panics are never allowed to propagate into `emit`.
    pub fn add_listener(&self, listener: Listener) {
        self.inner.lock().listeners.push(listener);
    }

    /// Publish an event: run in-process listeners, then fan out to every
    /// subscribed client whose patterns match `event.event_type`.
    pub fn emit(&self, event: Event) {
        // Snapshot under the lock so broadcast I/O (channel sends) never
        // holds the lock, and so concurrent connect/disconnect during
        // delivery is tolerated.
        let (listeners, targets) = {
            let state = self.inner.lock();
            let listeners = state.listeners.clone();
            let targets: Vec<(ConnectionId, mpsc::Sender<Event>)> = state
                .clients
                .iter()
                .filter(|(_, client)| client.patterns.matches(&event.event_type))
                .map(|(id, client)| (id.clone(), client.sender.clone()))
                .collect();
            (listeners, targets)
        };

        for listener in &listeners {
            listener(&event);
        }

        for (id, sender) in targets {
            if sender.try_send(event.clone()).is_err() {
                warn!(connection_id = %id, "dropping event: client channel full or closed");
            }
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().clients.len()
    }
}

#[cfg(test)]
#[path = "event_bus_tests.rs"]
mod tests;
