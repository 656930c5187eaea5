//! In-process fake of the equipment API for tests.
//!
//! Starts an axum server on `127.0.0.1:0` serving the four equipment routes
//! over an in-memory list. Ids are assigned from a counter, like the real
//! backend's auto-increment key.
//!
//! ```ignore
//! let server = FakeServer::start().await;
//! let api = HttpEquipmentApi::new(server.base_url());
//! server.set_failing(true); // every route now answers 503
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use equipment_core::{EquipmentFields, EquipmentRecord, RecordId};
use tokio::task::JoinHandle;
use tracing::debug;

struct FakeState {
    records: Mutex<Vec<EquipmentRecord>>,
    next_id: AtomicU64,
    failing: AtomicBool,
    requests: AtomicUsize,
}

impl FakeState {
    /// Count the request; answer 503 when the failure switch is on.
    fn begin(&self) -> Option<Response> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Some((StatusCode::SERVICE_UNAVAILABLE, "service unavailable").into_response());
        }
        None
    }

    fn insert(&self, fields: EquipmentFields) -> EquipmentRecord {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let record = EquipmentRecord::stored(id, fields);
        self.records.lock().unwrap().push(record.clone());
        record
    }
}

type S = Arc<FakeState>;

/// A running fake server. Dropping it stops the server task.
pub struct FakeServer {
    base_url: String,
    state: S,
    task: JoinHandle<()>,
}

impl FakeServer {
    pub async fn start() -> Self {
        let state = Arc::new(FakeState {
            records: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            failing: AtomicBool::new(false),
            requests: AtomicUsize::new(0),
        });

        let app = Router::new()
            .route("/api/equipment/all", get(list_all))
            .route("/api/equipment/adddata", post(create))
            .route("/api/equipment/update/{id}", put(update))
            .route("/api/equipment/delete/{id}", delete(remove))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);
        debug!(%base_url, "fake equipment server listening");

        let task = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        FakeServer { base_url, state, task }
    }

    /// Start with records already stored, ids 1..=n in order.
    pub async fn with_records(seed: Vec<EquipmentFields>) -> Self {
        let server = Self::start().await;
        for fields in seed {
            server.seed(fields);
        }
        server
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Store a record directly, bypassing HTTP.
    pub fn seed(&self, fields: EquipmentFields) -> RecordId {
        let record = self.state.insert(fields);
        record.id.unwrap_or_else(|| RecordId::from(""))
    }

    /// Current server-side records.
    pub fn records(&self) -> Vec<EquipmentRecord> {
        self.state.records.lock().unwrap().clone()
    }

    /// When on, every route answers `503 Service Unavailable`.
    pub fn set_failing(&self, failing: bool) {
        self.state.failing.store(failing, Ordering::SeqCst);
    }

    /// Requests received so far, failed ones included.
    pub fn request_count(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }
}

impl Drop for FakeServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

// ── Handlers ────────────────────────────────────────────────────────

async fn list_all(State(state): State<S>) -> Response {
    if let Some(resp) = state.begin() {
        return resp;
    }
    let records = state.records.lock().unwrap().clone();
    Json(records).into_response()
}

async fn create(State(state): State<S>, Json(fields): Json<EquipmentFields>) -> Response {
    if let Some(resp) = state.begin() {
        return resp;
    }
    let record = state.insert(fields);
    (StatusCode::OK, Json(record)).into_response()
}

async fn update(
    State(state): State<S>,
    Path(id): Path<String>,
    Json(fields): Json<EquipmentFields>,
) -> Response {
    if let Some(resp) = state.begin() {
        return resp;
    }
    let id = RecordId::from(id);
    let mut records = state.records.lock().unwrap();
    match records.iter_mut().find(|r| r.has_id(&id)) {
        Some(r) => {
            *r = EquipmentRecord::stored(id, fields);
            (StatusCode::OK, Json(r.clone())).into_response()
        }
        None => (StatusCode::NOT_FOUND, format!("equipment {} not found", id)).into_response(),
    }
}

async fn remove(State(state): State<S>, Path(id): Path<String>) -> Response {
    if let Some(resp) = state.begin() {
        return resp;
    }
    let id = RecordId::from(id);
    let mut records = state.records.lock().unwrap();
    let before = records.len();
    records.retain(|r| !r.has_id(&id));
    if records.len() == before {
        return (StatusCode::NOT_FOUND, format!("equipment {} not found", id)).into_response();
    }
    StatusCode::OK.into_response()
}
