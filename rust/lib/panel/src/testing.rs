//! Test doubles: an in-memory `EquipmentApi` and a recording alert sink.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use equipment_client::{ApiError, EquipmentApi};
use equipment_core::{EquipmentFields, EquipmentRecord, RecordId};

use crate::alert::AlertSink;

pub struct MemoryApi {
    records: Mutex<Vec<EquipmentRecord>>,
    next_id: AtomicU64,
    failing: AtomicBool,
    list_failing: AtomicBool,
    calls: Mutex<Vec<&'static str>>,
}

impl Default for MemoryApi {
    fn default() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            failing: AtomicBool::new(false),
            list_failing: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl MemoryApi {
    pub fn seed(&self, fields: EquipmentFields) -> RecordId {
        let id = RecordId::from(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.records
            .lock()
            .unwrap()
            .push(EquipmentRecord::stored(id.clone(), fields));
        id
    }

    pub fn records(&self) -> Vec<EquipmentRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Fail every call.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Fail only `list_all`.
    pub fn fail_list(&self, failing: bool) {
        self.list_failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    /// Record the call and give other tasks a chance to run.
    async fn enter(&self, call: &'static str) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        tokio::task::yield_now().await;
        if self.failing.load(Ordering::SeqCst) {
            return Err(ApiError::Server {
                status: 503,
                message: "service unavailable".into(),
            });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl EquipmentApi for MemoryApi {
    async fn list_all(&self) -> Result<Vec<EquipmentRecord>, ApiError> {
        self.enter("list_all").await?;
        if self.list_failing.load(Ordering::SeqCst) {
            return Err(ApiError::Decode("record list: truncated".into()));
        }
        Ok(self.records())
    }

    async fn create(&self, fields: &EquipmentFields) -> Result<(), ApiError> {
        self.enter("create").await?;
        self.seed(fields.clone());
        Ok(())
    }

    async fn update(&self, id: &RecordId, fields: &EquipmentFields) -> Result<(), ApiError> {
        self.enter("update").await?;
        let mut records = self.records.lock().unwrap();
        match records.iter_mut().find(|r| r.has_id(id)) {
            Some(r) => {
                *r = EquipmentRecord::stored(id.clone(), fields.clone());
                Ok(())
            }
            None => Err(ApiError::Server { status: 404, message: format!("equipment {id} not found") }),
        }
    }

    async fn delete(&self, id: &RecordId) -> Result<(), ApiError> {
        self.enter("delete").await?;
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| !r.has_id(id));
        if records.len() == before {
            return Err(ApiError::Server { status: 404, message: format!("equipment {id} not found") });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingAlerts {
    messages: Mutex<Vec<String>>,
}

impl RecordingAlerts {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }
}

impl AlertSink for RecordingAlerts {
    fn alert(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}
