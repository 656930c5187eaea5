//! HTTP client for the equipment telemetry API.
//!
//! The panel talks to the server only through the [`EquipmentApi`] trait;
//! [`HttpEquipmentApi`] is the reqwest-backed implementation.
//!
//! # Usage
//!
//! ```ignore
//! use equipment_client::{EquipmentApi, HttpEquipmentApi};
//!
//! let api = HttpEquipmentApi::new("http://localhost:8080");
//! let records = api.list_all().await?;
//! ```

use std::time::Duration;

use equipment_core::{EquipmentFields, EquipmentRecord, RecordId};
use tracing::debug;

/// Default server address.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// REST paths, relative to the base URL.
pub mod paths {
    pub const LIST_ALL: &str = "/api/equipment/all";
    pub const CREATE: &str = "/api/equipment/adddata";
    pub const UPDATE: &str = "/api/equipment/update";
    pub const DELETE: &str = "/api/equipment/delete";
}

// ── Error ───────────────────────────────────────────────────────────

/// Transport-level failure for any of the API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },

    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    #[error("decode: {0}")]
    Decode(String),
}

// ── EquipmentApi ────────────────────────────────────────────────────

/// The remote record collection.
///
/// Mutations report success only; callers refetch with `list_all` to see
/// the result.
#[async_trait::async_trait]
pub trait EquipmentApi: Send + Sync + 'static {
    /// `GET /api/equipment/all`
    async fn list_all(&self) -> Result<Vec<EquipmentRecord>, ApiError>;

    /// `POST /api/equipment/adddata`
    async fn create(&self, fields: &EquipmentFields) -> Result<(), ApiError>;

    /// `PUT /api/equipment/update/{id}`
    async fn update(&self, id: &RecordId, fields: &EquipmentFields) -> Result<(), ApiError>;

    /// `DELETE /api/equipment/delete/{id}`
    async fn delete(&self, id: &RecordId) -> Result<(), ApiError>;
}

// ── HttpEquipmentApi ────────────────────────────────────────────────

pub struct HttpEquipmentApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpEquipmentApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    /// Build with a per-request timeout. The panel itself defines none.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, http))
    }

    pub fn with_client(base_url: impl Into<String>, http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn item_url(&self, path: &str, id: &RecordId) -> String {
        format!("{}{}/{}", self.base_url, path, id)
    }

    /// Map a non-2xx response to `ApiError::Server`.
    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = resp.status();
        if !status.is_success() {
            let code = status.as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Server { status: code, message: body });
        }
        Ok(resp)
    }
}

#[async_trait::async_trait]
impl EquipmentApi for HttpEquipmentApi {
    async fn list_all(&self) -> Result<Vec<EquipmentRecord>, ApiError> {
        let url = self.url(paths::LIST_ALL);
        debug!(%url, "fetching equipment records");
        let resp = Self::check(self.http.get(&url).send().await?).await?;
        resp.json::<Vec<EquipmentRecord>>()
            .await
            .map_err(|e| ApiError::Decode(format!("record list: {}", e)))
    }

    async fn create(&self, fields: &EquipmentFields) -> Result<(), ApiError> {
        let url = self.url(paths::CREATE);
        debug!(%url, "creating equipment record");
        Self::check(self.http.post(&url).json(fields).send().await?).await?;
        Ok(())
    }

    async fn update(&self, id: &RecordId, fields: &EquipmentFields) -> Result<(), ApiError> {
        let url = self.item_url(paths::UPDATE, id);
        debug!(%url, "updating equipment record");
        Self::check(self.http.put(&url).json(fields).send().await?).await?;
        Ok(())
    }

    async fn delete(&self, id: &RecordId) -> Result<(), ApiError> {
        let url = self.item_url(paths::DELETE, id);
        debug!(%url, "deleting equipment record");
        Self::check(self.http.delete(&url).send().await?).await?;
        Ok(())
    }
}
