//! Live notification fan-out.
//!
//! A registry of per-user subscriber connections. Every connection owns a
//! bounded FIFO queue; publishing never blocks and never fails the
//! caller. A queue that is full drops the event for that connection only,
//! and a connection whose receiver is gone is pruned on the next publish.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, trace, warn};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::domain::Notification;
use crate::foundation::{ConnectionId, UserId};

type RegistryMap = HashMap<UserId, HashMap<ConnectionId, mpsc::Sender<Notification>>>;
type Registry = Mutex<RegistryMap>;

/// Fan-out hub for live subscriber connections.
pub struct Broadcaster {
    connections: Arc<Registry>,
    queue_capacity: usize,
}

impl Broadcaster {
    /// `queue_capacity` bounds each per-connection queue; a slow consumer
    /// loses events once its queue is full.
    pub fn new(queue_capacity: usize) -> Self {
        Broadcaster {
            connections: Arc::new(Mutex::new(HashMap::new())),
            queue_capacity: queue_capacity.max(1),
        }
    }

    // A poisoned registry lock only means some publisher panicked; the map
    // itself is still coherent, so recover it rather than propagate.
    fn lock_registry(&self) -> MutexGuard<'_, RegistryMap> {
        self.connections.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a live connection for `user_id`.
    ///
    /// The returned [`Subscription`] unregisters itself synchronously when
    /// dropped, so a disconnecting client frees its slot immediately.
    pub fn subscribe(&self, user_id: UserId) -> Subscription {
        let connection_id = ConnectionId::random();
        let (sender, receiver) = mpsc::channel(self.queue_capacity);
        {
            let mut registry = self.lock_registry();
            registry
                .entry(user_id.clone())
                .or_default()
                .insert(connection_id.clone(), sender);
        }
        debug!(
            "subscriber added user_id={} connection_id={} connections={}",
            user_id,
            connection_id,
            self.connection_count()
        );
        Subscription {
            guard: SubscriptionGuard {
                connections: self.connections.clone(),
                user_id,
                connection_id,
            },
            receiver,
        }
    }

    /// Queues `notification` on every live connection of `user_id` and
    /// returns how many connections accepted it. A user with no live
    /// connections is a no-op.
    pub fn publish(&self, user_id: &UserId, notification: &Notification) -> usize {
        let senders: Vec<(ConnectionId, mpsc::Sender<Notification>)> = {
            let registry = self.lock_registry();
            match registry.get(user_id) {
                Some(connections) => {
                    connections.iter().map(|(id, tx)| (id.clone(), tx.clone())).collect()
                }
                None => Vec::new(),
            }
        };
        if senders.is_empty() {
            trace!("no live connections user_id={}", user_id);
            return 0;
        }

        let mut delivered = 0usize;
        let mut closed: Vec<ConnectionId> = Vec::new();
        for (connection_id, sender) in senders {
            match sender.try_send(notification.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(
                        "subscriber queue full, dropping notification user_id={} connection_id={}",
                        user_id, connection_id
                    );
                }
                Err(TrySendError::Closed(_)) => closed.push(connection_id),
            }
        }

        if !closed.is_empty() {
            let mut registry = self.lock_registry();
            if let Some(connections) = registry.get_mut(user_id) {
                for connection_id in &closed {
                    connections.remove(connection_id);
                }
                if connections.is_empty() {
                    registry.remove(user_id);
                }
            }
            debug!("pruned closed connections user_id={} count={}", user_id, closed.len());
        }

        delivered
    }

    /// Queues `notification` for every connected user and returns the
    /// total number of connections that accepted it.
    pub fn broadcast(&self, notification: &Notification) -> usize {
        let users: Vec<UserId> = self.lock_registry().keys().cloned().collect();
        users.iter().map(|user_id| self.publish(user_id, notification)).sum()
    }

    pub fn connection_count(&self) -> usize {
        self.lock_registry().values().map(HashMap::len).sum()
    }

    pub fn user_count(&self) -> usize {
        self.lock_registry().len()
    }

    pub fn connections_for(&self, user_id: &UserId) -> usize {
        self.lock_registry().get(user_id).map_or(0, HashMap::len)
    }

    /// Drops every registered sender, ending all subscriber streams.
    /// Used on shutdown so SSE clients see their stream close.
    pub fn drain(&self) {
        let mut registry = self.lock_registry();
        let connections: usize = registry.values().map(HashMap::len).sum();
        registry.clear();
        debug!("broadcaster drained connections={}", connections);
    }
}

/// A live subscriber connection handle.
///
/// Holds the receiving end of the connection queue together with the
/// registry guard. Dropping it removes the connection from the
/// [`Broadcaster`] synchronously.
pub struct Subscription {
    guard: SubscriptionGuard,
    receiver: mpsc::Receiver<Notification>,
}

impl Subscription {
    pub fn user_id(&self) -> &UserId {
        &self.guard.user_id
    }

    pub fn connection_id(&self) -> &ConnectionId {
        &self.guard.connection_id
    }

    /// Next queued notification, or `None` once the broadcaster has been
    /// drained.
    pub async fn recv(&mut self) -> Option<Notification> {
        self.receiver.recv().await
    }

    /// Splits the handle for consumers that turn the receiver into a
    /// stream. The guard must stay alive as long as the stream does.
    pub fn into_parts(self) -> (SubscriptionGuard, mpsc::Receiver<Notification>) {
        (self.guard, self.receiver)
    }
}

/// Removes a connection from the registry on drop.
pub struct SubscriptionGuard {
    connections: Arc<Registry>,
    user_id: UserId,
    connection_id: ConnectionId,
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        let mut registry = match self.connections.lock() {
            Ok(registry) => registry,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(connections) = registry.get_mut(&self.user_id) {
            connections.remove(&self.connection_id);
            if connections.is_empty() {
                registry.remove(&self.user_id);
            }
        }
        trace!(
            "subscriber removed user_id={} connection_id={}",
            self.user_id,
            self.connection_id
        );
    }
}
