//! Per-instance publish/subscribe.
//!
//! Every agent and every manager owns its own `EventBus`; there is no
//! process-wide bus. Handlers are keyed by event name and invoked in the
//! order they subscribed.

use ak_protocol::{AgentEvent, ManagerEvent};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// An event that can be routed by name.
pub trait BusEvent: Send + Sync + 'static {
    fn name(&self) -> &'static str;
}

impl BusEvent for AgentEvent {
    fn name(&self) -> &'static str {
        AgentEvent::name(self)
    }
}

impl BusEvent for ManagerEvent {
    fn name(&self) -> &'static str {
        ManagerEvent::name(self)
    }
}

/// Token returned by [`EventBus::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// A subscribed event handler.
pub type Handler<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Subscription<E> {
    id: SubscriptionId,
    handler: Handler<E>,
}

pub struct EventBus<E> {
    subscriptions: Mutex<HashMap<String, Vec<Subscription<E>>>>,
    next_id: AtomicU64,
}

impl<E: BusEvent> EventBus<E> {
    pub fn new() -> Self {
        Self {
            subscriptions: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register `handler` for events named `event_name`.
    pub fn subscribe<F>(&self, event_name: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscriptions
            .lock()
            .entry(event_name.to_string())
            .or_default()
            .push(Subscription {
                id,
                handler: Arc::new(handler),
            });
        id
    }

    /// Remove a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.subscriptions.lock();
        let mut removed = false;

        subscriptions.retain(|_, subs| {
            let before = subs.len();
            subs.retain(|s| s.id != id);
            removed |= subs.len() != before;
            !subs.is_empty()
        });

        removed
    }

    /// Deliver `event` to every handler subscribed under its name.
    ///
    /// Handlers run after the internal lock is released, so a handler may
    /// subscribe or unsubscribe. Returns the number of handlers invoked.
    pub fn publish(&self, event: &E) -> usize {
        let handlers: Vec<Handler<E>> = self
            .subscriptions
            .lock()
            .get(event.name())
            .map(|subs| subs.iter().map(|s| Arc::clone(&s.handler)).collect())
            .unwrap_or_default();

        for handler in &handlers {
            handler(event);
        }

        handlers.len()
    }

    /// Drop every subscription.
    pub fn clear(&self) {
        self.subscriptions.lock().clear();
    }

    /// Drop every subscription except those registered under `event_name`.
    pub fn clear_except(&self, event_name: &str) {
        self.subscriptions
            .lock()
            .retain(|name, _| name == event_name);
    }

    pub fn handler_count(&self, event_name: &str) -> usize {
        self.subscriptions
            .lock()
            .get(event_name)
            .map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.lock().is_empty()
    }
}

impl<E: BusEvent> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subscriptions = self.subscriptions.lock();
        let mut map = f.debug_map();
        for (name, subs) in subscriptions.iter() {
            map.entry(name, &subs.len());
        }
        map.finish()
    }
}
