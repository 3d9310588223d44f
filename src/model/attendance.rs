use chrono::{DateTime, NaiveDate, Utc};
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use strum_macros::EnumString;
use utoipa::ToSchema;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ToSchema,
    EnumString,
    strum::Display,
)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

/// A `YYYY-MM-DD` day key. The engines treat it as opaque; only the HTTP
/// surface checks the format through [`AttendanceDate::parse`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, Display, From)]
#[serde(transparent)]
#[schema(value_type = String, example = "2024-01-01")]
pub struct AttendanceDate(String);

#[derive(Debug, thiserror::Error)]
#[error("invalid date `{0}`, expected YYYY-MM-DD")]
pub struct InvalidDate(pub String);

impl AttendanceDate {
    pub fn parse(raw: &str) -> Result<Self, InvalidDate> {
        let raw = raw.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(|_| Self(raw.to_string()))
            .map_err(|_| InvalidDate(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AttendanceDate {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Server-confirmed attendance for one employee on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = "EMP-001")]
    pub employee_id: String,
    pub status: AttendanceStatus,
    #[serde(default)]
    #[schema(example = "2024-01-01T09:00:00Z", format = "date-time", value_type = Option<String>)]
    pub marked_at: Option<DateTime<Utc>>,
}

/// Body of the collaborator's `PUT attendance` upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertAttendance {
    pub employee_id: String,
    pub date: AttendanceDate,
    pub status: AttendanceStatus,
}

/// Local view of one `(employee, date)` key.
///
/// Absence of an entry means Unset. A `Dirty` entry remembers the last
/// confirmed server value so the view can still show when it was marked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttendanceEntry {
    Clean(AttendanceRecord),
    Dirty {
        status: AttendanceStatus,
        confirmed: Option<AttendanceRecord>,
    },
}

impl AttendanceEntry {
    /// Local edit on top of whatever the key held before.
    pub fn edited(previous: Option<AttendanceEntry>, status: AttendanceStatus) -> Self {
        let confirmed = match previous {
            Some(AttendanceEntry::Clean(record)) => Some(record),
            Some(AttendanceEntry::Dirty { confirmed, .. }) => confirmed,
            None => None,
        };
        AttendanceEntry::Dirty { status, confirmed }
    }

    pub fn status(&self) -> AttendanceStatus {
        match self {
            AttendanceEntry::Clean(record) => record.status,
            AttendanceEntry::Dirty { status, .. } => *status,
        }
    }

    pub fn is_dirty(&self) -> bool {
        matches!(self, AttendanceEntry::Dirty { .. })
    }

    pub fn marked_at(&self) -> Option<DateTime<Utc>> {
        match self {
            AttendanceEntry::Clean(record) => record.marked_at,
            AttendanceEntry::Dirty { confirmed, .. } => {
                confirmed.as_ref().and_then(|r| r.marked_at)
            }
        }
    }
}
