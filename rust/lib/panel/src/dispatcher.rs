//! Mutations against the remote API, each followed by a full refetch.

use std::sync::Arc;

use equipment_client::EquipmentApi;
use equipment_core::{EquipmentFields, RecordId};
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::error::PanelError;
use crate::store::DataStore;

/// Runs create/update/delete/refresh and keeps the [`DataStore`] in sync.
///
/// Every successful mutation triggers a full `refresh`; the store is never
/// patched locally. On failure the error is logged and returned, and the
/// store is left as it was.
pub struct ActionDispatcher {
    api: Arc<dyn EquipmentApi>,
    store: Arc<DataStore>,
    /// Present when mutations are serialized.
    queue: Option<Mutex<()>>,
}

impl ActionDispatcher {
    pub fn new(api: Arc<dyn EquipmentApi>, store: Arc<DataStore>, serialize: bool) -> Self {
        Self {
            api,
            store,
            queue: serialize.then(|| Mutex::new(())),
        }
    }

    /// Fetch the full list and replace the store. Returns the record count.
    pub async fn refresh(&self) -> Result<usize, PanelError> {
        let _turn = match &self.queue {
            Some(q) => Some(q.lock().await),
            None => None,
        };
        self.fetch_and_replace().await
    }

    pub async fn create(&self, fields: &EquipmentFields) -> Result<(), PanelError> {
        let _turn = match &self.queue {
            Some(q) => Some(q.lock().await),
            None => None,
        };
        if let Err(e) = self.api.create(fields).await {
            error!("create equipment failed: {e}");
            return Err(e.into());
        }
        info!("equipment created");
        self.refresh_after("create").await;
        Ok(())
    }

    pub async fn update(&self, id: &RecordId, fields: &EquipmentFields) -> Result<(), PanelError> {
        let _turn = match &self.queue {
            Some(q) => Some(q.lock().await),
            None => None,
        };
        if let Err(e) = self.api.update(id, fields).await {
            error!("update equipment {id} failed: {e}");
            return Err(e.into());
        }
        info!("equipment {id} updated");
        self.refresh_after("update").await;
        Ok(())
    }

    pub async fn delete(&self, id: &RecordId) -> Result<(), PanelError> {
        let _turn = match &self.queue {
            Some(q) => Some(q.lock().await),
            None => None,
        };
        if let Err(e) = self.api.delete(id).await {
            error!("delete equipment {id} failed: {e}");
            return Err(e.into());
        }
        info!("equipment {id} deleted");
        self.refresh_after("delete").await;
        Ok(())
    }

    pub fn is_serialized(&self) -> bool {
        self.queue.is_some()
    }

    async fn fetch_and_replace(&self) -> Result<usize, PanelError> {
        match self.api.list_all().await {
            Ok(records) => {
                let count = records.len();
                let revision = self.store.replace(records);
                info!("equipment list refreshed ({count} records, revision {revision})");
                Ok(count)
            }
            Err(e) => {
                error!("fetch equipment list failed: {e}");
                Err(e.into())
            }
        }
    }

    /// The mutation already succeeded; a failed refetch only leaves the
    /// store stale.
    async fn refresh_after(&self, action: &str) {
        if self.fetch_and_replace().await.is_err() {
            error!("store not refreshed after {action}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryApi;

    fn fields(t: f64, p: f64) -> EquipmentFields {
        EquipmentFields::new(t, p, "2024-01-01T00:00:00Z")
    }

    fn setup(serialize: bool) -> (Arc<MemoryApi>, Arc<DataStore>, ActionDispatcher) {
        let api = Arc::new(MemoryApi::default());
        let store = Arc::new(DataStore::new());
        let dispatcher = ActionDispatcher::new(api.clone(), store.clone(), serialize);
        (api, store, dispatcher)
    }

    // ========================================================================
    // Refresh
    // ========================================================================

    #[tokio::test]
    async fn refresh_replaces_store() {
        let (api, store, d) = setup(false);
        api.seed(fields(1.0, 1.0));
        api.seed(fields(2.0, 2.0));

        assert_eq!(d.refresh().await.unwrap(), 2);
        assert_eq!(store.len(), 2);
        assert_eq!(store.revision(), 1);
    }

    #[tokio::test]
    async fn failed_refresh_leaves_store() {
        let (api, store, d) = setup(false);
        api.seed(fields(1.0, 1.0));
        d.refresh().await.unwrap();

        api.seed(fields(2.0, 2.0));
        api.set_failing(true);
        assert!(matches!(d.refresh().await, Err(PanelError::Transport(_))));
        assert_eq!(store.len(), 1);
        assert_eq!(store.revision(), 1);
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    #[tokio::test]
    async fn create_then_refetch() {
        let (api, store, d) = setup(false);
        d.create(&fields(72.0, 110.0)).await.unwrap();

        assert_eq!(api.calls(), vec!["create", "list_all"]);
        let snap = store.snapshot();
        assert_eq!(snap.len(), 1);
        assert!(fields(72.0, 110.0).matches(&snap[0]));
        assert!(snap[0].id.is_some());
    }

    #[tokio::test]
    async fn failed_create_skips_refetch() {
        let (api, store, d) = setup(false);
        api.set_failing(true);

        assert!(d.create(&fields(72.0, 110.0)).await.is_err());
        assert_eq!(api.calls(), vec!["create"]);
        assert_eq!(store.revision(), 0);
    }

    #[tokio::test]
    async fn update_then_refetch() {
        let (api, store, d) = setup(false);
        let id = api.seed(fields(1.0, 1.0));
        d.refresh().await.unwrap();

        d.update(&id, &fields(9.0, 9.0)).await.unwrap();
        assert_eq!(store.find(&id).unwrap().temperature, 9.0);
        assert_eq!(api.calls(), vec!["list_all", "update", "list_all"]);
    }

    #[tokio::test]
    async fn delete_then_refetch() {
        let (api, store, d) = setup(false);
        let id = api.seed(fields(1.0, 1.0));
        api.seed(fields(2.0, 2.0));
        d.refresh().await.unwrap();

        d.delete(&id).await.unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.find(&id).is_none());
    }

    #[tokio::test]
    async fn mutation_succeeds_even_if_refetch_fails() {
        let (api, store, d) = setup(false);
        api.fail_list(true);

        d.create(&fields(1.0, 1.0)).await.unwrap();
        assert_eq!(api.records().len(), 1);
        assert_eq!(store.revision(), 0);
    }

    // ========================================================================
    // Serialization
    // ========================================================================

    #[tokio::test]
    async fn serialized_mutations_run_one_at_a_time() {
        let (api, store, d) = setup(true);
        assert!(d.is_serialized());
        let a = api.seed(fields(1.0, 1.0));
        let b = api.seed(fields(2.0, 2.0));
        d.refresh().await.unwrap();

        let upd = fields(5.0, 5.0);
        let (r1, r2) = tokio::join!(d.delete(&a), d.update(&b, &upd));
        r1.unwrap();
        r2.unwrap();

        // Each mutation is immediately followed by its own refetch.
        let calls = api.calls();
        assert_eq!(calls.len(), 5);
        assert_eq!(calls[2], "list_all");
        assert_eq!(calls[4], "list_all");
        assert_ne!(calls[1], "list_all");
        assert_ne!(calls[3], "list_all");

        let snap = store.snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].temperature, 5.0);
    }
}
