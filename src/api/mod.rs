pub mod attendance;
pub mod notifications;
pub mod profile;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;

use crate::client::SyncError;
use crate::engine::{BoardError, NotificationError};

fn sync_status(e: &SyncError) -> StatusCode {
    match e {
        SyncError::NotFound(_) => StatusCode::NOT_FOUND,
        SyncError::Rejected { .. } => StatusCode::BAD_REQUEST,
        SyncError::Http(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
        SyncError::Http(_) | SyncError::Api { .. } => StatusCode::BAD_GATEWAY,
    }
}

/// Collaborator rejections keep their own message; other upstream failures don't leak.
fn sync_message(e: &SyncError) -> String {
    match e {
        SyncError::Rejected { message, .. } | SyncError::NotFound(message) => message.clone(),
        _ => "Upstream HR service unavailable".to_string(),
    }
}

impl ResponseError for BoardError {
    fn status_code(&self) -> StatusCode {
        match self {
            BoardError::NoDayLoaded | BoardError::SaveInProgress => StatusCode::CONFLICT,
            BoardError::UnknownEmployee(_) => StatusCode::NOT_FOUND,
            BoardError::SaveFailed { .. } => StatusCode::BAD_GATEWAY,
            BoardError::Sync(e) => sync_status(e),
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            BoardError::SaveFailed {
                date,
                attempted,
                failed,
                ..
            } => json!({
                "message": "Failed to save some attendance records",
                "date": date,
                "attempted": attempted,
                "failed": failed,
            }),
            BoardError::Sync(e) => json!({ "message": sync_message(e) }),
            other => json!({ "message": other.to_string() }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

impl ResponseError for NotificationError {
    fn status_code(&self) -> StatusCode {
        match self {
            NotificationError::UnknownNotification(_) => StatusCode::NOT_FOUND,
            NotificationError::Sync(e) => sync_status(e),
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            NotificationError::Sync(e) => sync_message(e),
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}
