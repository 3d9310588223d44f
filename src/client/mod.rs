//! The remote API the dashboard engines reconcile against.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::attendance::{AttendanceDate, AttendanceRecord, UpsertAttendance};
use crate::model::employee::Employee;
use crate::model::notification::Notification;

pub mod http;
pub mod memory;

pub use http::HttpSyncClient;
pub use memory::InMemorySyncClient;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// 4xx from the collaborator, carrying its own message
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("not found: {0}")]
    NotFound(String),
}

impl SyncError {
    /// The collaborator refused the request as invalid rather than failing.
    pub fn is_rejection(&self) -> bool {
        matches!(self, SyncError::Rejected { .. } | SyncError::NotFound(_))
    }
}

/// Collaborator surface consumed by the attendance board and the
/// notification center. Implementations perform no retries.
#[async_trait]
pub trait SyncClient: Send + Sync {
    async fn roster(&self) -> Result<Vec<Employee>, SyncError>;

    async fn attendance_for(
        &self,
        date: &AttendanceDate,
    ) -> Result<Vec<AttendanceRecord>, SyncError>;

    /// Create-or-update one `(employee, date)` entry; the server stamps `marked_at`.
    async fn upsert_attendance(
        &self,
        upsert: &UpsertAttendance,
    ) -> Result<AttendanceRecord, SyncError>;

    async fn notifications(&self) -> Result<Vec<Notification>, SyncError>;

    async fn mark_notification_read(&self, id: &str) -> Result<(), SyncError>;

    async fn mark_all_notifications_read(&self) -> Result<(), SyncError>;

    async fn unread_count(&self) -> Result<usize, SyncError>;
}
