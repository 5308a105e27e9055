//! World signal bus with move-only subscription handles.
//!
//! A [`Subscription`] can only be released by handing it back to
//! [`SignalBus::unsubscribe`], which consumes it. Signals published while no
//! one is subscribed to their kind are dropped.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::journey::Location;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    EnterLocation,
    Encounter,
    SessionLoaded,
    NewSession,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorldSignal {
    EnteredLocation(Location),
    Encounter,
    SessionLoaded,
    NewSession,
}

impl WorldSignal {
    #[must_use]
    pub const fn kind(&self) -> SignalKind {
        match self {
            Self::EnteredLocation(_) => SignalKind::EnterLocation,
            Self::Encounter => SignalKind::Encounter,
            Self::SessionLoaded => SignalKind::SessionLoaded,
            Self::NewSession => SignalKind::NewSession,
        }
    }
}

/// Proof of an active subscription. Not `Clone`: exactly one unsubscribe.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "dropping a subscription without unsubscribing leaks it"]
pub struct Subscription {
    bus: u64,
    id: u64,
    kind: SignalKind,
}

impl Subscription {
    #[must_use]
    pub const fn kind(&self) -> SignalKind {
        self.kind
    }
}

static NEXT_BUS_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
pub struct SignalBus {
    id: u64,
    next_subscription: u64,
    active: BTreeMap<u64, SignalKind>,
    queue: VecDeque<WorldSignal>,
}

impl SignalBus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: NEXT_BUS_ID.fetch_add(1, Ordering::Relaxed),
            next_subscription: 0,
            active: BTreeMap::new(),
            queue: VecDeque::new(),
        }
    }

    pub fn subscribe(&mut self, kind: SignalKind) -> Subscription {
        self.next_subscription = self.next_subscription.wrapping_add(1);
        self.active.insert(self.next_subscription, kind);
        Subscription {
            bus: self.id,
            id: self.next_subscription,
            kind,
        }
    }

    /// Release a subscription. Returns false if it belongs to another bus.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        subscription.bus == self.id && self.active.remove(&subscription.id).is_some()
    }

    #[must_use]
    pub fn subscriber_count(&self, kind: SignalKind) -> usize {
        self.active.values().filter(|&&active| active == kind).count()
    }

    #[must_use]
    pub fn is_subscribed(&self, kind: SignalKind) -> bool {
        self.active.values().any(|&active| active == kind)
    }

    /// Queue a signal for delivery. Returns false when it was dropped.
    pub fn publish(&mut self, signal: WorldSignal) -> bool {
        if !self.is_subscribed(signal.kind()) {
            return false;
        }
        self.queue.push_back(signal);
        true
    }

    pub fn next_signal(&mut self) -> Option<WorldSignal> {
        self.queue.pop_front()
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new()
    }
}
