use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use equipment_core::{EquipmentRecord, RecordId};

/// Callback type for store change notifications.
pub type ChangeHandler = Arc<dyn Fn(&RecordSnapshot) + Send + Sync>;

/// Unique handle for a subscription, returned by [`DataStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// An immutable view of the record list at one revision.
///
/// Clone is an Arc clone. Derefs to `[EquipmentRecord]`.
#[derive(Debug, Clone)]
pub struct RecordSnapshot {
    revision: u64,
    records: Arc<Vec<EquipmentRecord>>,
}

impl RecordSnapshot {
    fn empty() -> Self {
        Self {
            revision: 0,
            records: Arc::new(Vec::new()),
        }
    }

    /// Store revision this snapshot was taken at. 0 is the initial empty list.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn records(&self) -> &[EquipmentRecord] {
        &self.records
    }

    pub fn find(&self, id: &RecordId) -> Option<&EquipmentRecord> {
        self.records.iter().find(|r| r.has_id(id))
    }

    /// Number of strong references to the underlying list.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.records)
    }
}

impl Deref for RecordSnapshot {
    type Target = [EquipmentRecord];

    fn deref(&self) -> &[EquipmentRecord] {
        &self.records
    }
}

/// Client-held copy of the last fetched record collection.
///
/// - `replace(records)` swaps in a whole new list and notifies subscribers.
/// - `snapshot()` reads the current list (Arc clone, cheap).
/// - `subscribe(handler)` registers a change handler.
///
/// The list is stored exactly as given: no reordering, filtering or
/// deduplication. Readers never see a partially replaced list.
pub struct DataStore {
    current: RwLock<RecordSnapshot>,
    handlers: RwLock<Vec<HandlerEntry>>,
    next_revision: AtomicU64,
    next_id: AtomicU64,
}

#[derive(Clone)]
struct HandlerEntry {
    id: SubscriptionId,
    handler: ChangeHandler,
}

impl DataStore {
    /// Create an empty store at revision 0.
    pub fn new() -> Self {
        Self {
            current: RwLock::new(RecordSnapshot::empty()),
            handlers: RwLock::new(Vec::new()),
            next_revision: AtomicU64::new(1),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn snapshot(&self) -> RecordSnapshot {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the whole list and notify subscribers. Returns the new revision.
    ///
    /// Handlers run synchronously on the calling thread, after the write lock
    /// is released. Under concurrent replaces a handler may see revisions out
    /// of order; compare [`RecordSnapshot::revision`] to discard stale ones.
    pub fn replace(&self, records: Vec<EquipmentRecord>) -> u64 {
        let snapshot = {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            let revision = self.next_revision.fetch_add(1, Ordering::SeqCst);
            *current = RecordSnapshot {
                revision,
                records: Arc::new(records),
            };
            current.clone()
        };

        let handlers: Vec<HandlerEntry> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for entry in handlers {
            (entry.handler)(&snapshot);
        }
        snapshot.revision
    }

    pub fn find(&self, id: &RecordId) -> Option<EquipmentRecord> {
        self.snapshot().find(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn revision(&self) -> u64 {
        self.snapshot().revision
    }

    /// Subscribe to list replacements.
    ///
    /// The handler must not call `replace` on the same store.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&RecordSnapshot) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(HandlerEntry {
                id,
                handler: Arc::new(handler),
            });
        id
    }

    /// Remove a handler. Returns false if the id was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        let before = handlers.len();
        handlers.retain(|e| e.id != id);
        handlers.len() < before
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}
