//! In-process change notification for committed ledger mutations.
//!
//! # Invariants
//! - `emit` is called only after a transaction commits.
//! - Subscribers are invoked in subscription order, outside the registry lock.
//! - A disconnected channel subscriber is dropped on the next emit.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex, MutexGuard};

/// Which mutation produced a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    EntryInserted,
    EntriesDeleted,
    Imported,
}

impl ChangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EntryInserted => "entry_inserted",
            Self::EntriesDeleted => "entries_deleted",
            Self::Imported => "imported",
        }
    }
}

/// One committed mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerChange {
    pub kind: ChangeKind,
    /// Entries created.
    pub inserted: usize,
    /// Entries removed.
    pub deleted: usize,
}

/// Handle returned by [`ChangeNotifier::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Callback = Arc<dyn Fn(&LedgerChange) -> bool + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    subscribers: BTreeMap<SubscriptionId, Callback>,
}

/// Observer registry shared by the service and its readers.
#[derive(Default, Clone)]
pub struct ChangeNotifier {
    inner: Arc<Mutex<Registry>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a callback invoked once per committed mutation.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: Fn(&LedgerChange) + Send + Sync + 'static,
    {
        self.register(Arc::new(move |change| {
            callback(change);
            true
        }))
    }

    /// Removes a subscriber. Returns `false` for unknown ids.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.registry().subscribers.remove(&id).is_some()
    }

    /// Subscribes through a channel; dropping the receiver unsubscribes.
    pub fn subscribe_channel(&self) -> Receiver<LedgerChange> {
        let (sender, receiver) = mpsc::channel();
        let sender = Mutex::new(sender);
        self.register(Arc::new(move |change| match sender.lock() {
            Ok(sender) => sender.send(*change).is_ok(),
            Err(_) => false,
        }));
        receiver
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry().subscribers.len()
    }

    /// Delivers `change` to every subscriber.
    pub fn emit(&self, change: LedgerChange) {
        let snapshot = self
            .registry()
            .subscribers
            .iter()
            .map(|(id, callback)| (*id, Arc::clone(callback)))
            .collect::<Vec<_>>();

        let disconnected = snapshot
            .into_iter()
            .filter(|(_, callback)| !callback(&change))
            .map(|(id, _)| id)
            .collect::<Vec<_>>();

        if !disconnected.is_empty() {
            let mut registry = self.registry();
            for id in &disconnected {
                registry.subscribers.remove(id);
            }
        }

        debug!(
            "event=ledger_change module=notify status=ok kind={} inserted={} deleted={} dropped={}",
            change.kind.as_str(),
            change.inserted,
            change.deleted,
            disconnected.len()
        );
    }

    fn register(&self, callback: Callback) -> SubscriptionId {
        let mut registry = self.registry();
        registry.next_id += 1;
        let id = SubscriptionId(registry.next_id);
        registry.subscribers.insert(id, callback);
        id
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        // Registry updates are single-step, so a poisoned lock still holds valid data.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
