use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use crate::time::now_iso8601;

/// Opaque record identifier assigned by the remote system.
///
/// The API may send it as a JSON number or a JSON string. Either way it is
/// kept as text and only ever used to build request paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for RecordId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => RecordId(s),
            Raw::Signed(n) => RecordId(n.to_string()),
            Raw::Unsigned(n) => RecordId(n.to_string()),
        })
    }
}

/// One equipment telemetry sample as returned by `GET /api/equipment/all`.
///
/// `timestamp` is the canonical ISO 8601 string from the server. Display code
/// derives labels from it but never rewrites it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub temperature: f64,
    pub pressure: f64,
    pub timestamp: String,
}

impl EquipmentRecord {
    /// A record that already has a server-assigned id.
    pub fn stored(id: impl Into<RecordId>, fields: EquipmentFields) -> Self {
        Self {
            id: Some(id.into()),
            temperature: fields.temperature,
            pressure: fields.pressure,
            timestamp: fields.timestamp,
        }
    }

    /// The editable part of this record.
    pub fn fields(&self) -> EquipmentFields {
        EquipmentFields {
            temperature: self.temperature,
            pressure: self.pressure,
            timestamp: self.timestamp.clone(),
        }
    }

    pub fn has_id(&self, id: &RecordId) -> bool {
        self.id.as_ref() == Some(id)
    }
}

/// Request body for create and update: `{temperature, pressure, timestamp}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentFields {
    pub temperature: f64,
    pub pressure: f64,
    pub timestamp: String,
}

impl EquipmentFields {
    pub fn new(temperature: f64, pressure: f64, timestamp: impl Into<String>) -> Self {
        Self {
            temperature,
            pressure,
            timestamp: timestamp.into(),
        }
    }

    /// Defaults for a fresh create form: zero readings stamped with the
    /// current time.
    pub fn blank() -> Self {
        Self::new(0.0, 0.0, now_iso8601())
    }

    /// True if `record` carries exactly these field values.
    pub fn matches(&self, record: &EquipmentRecord) -> bool {
        record.temperature == self.temperature
            && record.pressure == self.pressure
            && record.timestamp == self.timestamp
    }
}
