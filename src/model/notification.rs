use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": "65a0c1",
        "title": "Attendance saved",
        "message": "12 records were updated",
        "type": "success",
        "created_at": "2024-01-01T09:00:00Z",
        "is_read": false
    })
)]
pub struct Notification {
    #[serde(alias = "_id")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: NotificationKind,
    #[schema(format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
    /// `false -> true` only; a read notification never becomes unread again
    #[serde(default)]
    pub is_read: bool,
}

/// Unread count derived from a notification list.
pub fn unread_count(notifications: &[Notification]) -> usize {
    notifications.iter().filter(|n| !n.is_read).count()
}

/// What the detail observer gets when it opens.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NotificationFeed {
    pub notifications: Vec<Notification>,
    #[schema(example = 2)]
    pub unread_count: usize,
}

/// Body of the collaborator's `GET notifications/unread-count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UnreadCount {
    #[schema(example = 3)]
    pub count: usize,
}
