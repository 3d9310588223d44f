use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::debug;

use super::{SyncClient, SyncError};
use crate::model::attendance::{AttendanceDate, AttendanceRecord, UpsertAttendance};
use crate::model::employee::Employee;
use crate::model::notification::{Notification, UnreadCount};

/// reqwest-backed [`SyncClient`]. Every request carries the client-wide timeout.
pub struct HttpSyncClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpSyncClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SyncError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, SyncError> {
        let url = self.url(path);
        debug!(%url, "GET");
        let response = self.http.get(&url).query(query).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    async fn send_json<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, SyncError> {
        let url = self.url(path);
        debug!(%url, %method, "sending");
        let response = self.http.request(method, &url).json(body).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// POST whose response body is an acknowledgement we don't need.
    async fn post_ack(&self, path: &str) -> Result<(), SyncError> {
        let url = self.url(path);
        debug!(%url, "POST");
        let response = self.http.post(&url).send().await?;
        check_status(response).await?;
        Ok(())
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SyncError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = error_message(&body);

    if status == StatusCode::NOT_FOUND {
        return Err(SyncError::NotFound(message));
    }
    if status.is_client_error() {
        return Err(SyncError::Rejected {
            status: status.as_u16(),
            message,
        });
    }
    Err(SyncError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Pull the human message out of an error body. Backends answer with
/// `{"message"}`, `{"detail"}` or `{"error"}`; anything else is passed through.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["message", "detail", "error"]
                .iter()
                .find_map(|key| v.get(key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait]
impl SyncClient for HttpSyncClient {
    async fn roster(&self) -> Result<Vec<Employee>, SyncError> {
        self.get("/employees", &[]).await
    }

    async fn attendance_for(
        &self,
        date: &AttendanceDate,
    ) -> Result<Vec<AttendanceRecord>, SyncError> {
        self.get("/attendance", &[("date", date.as_str())]).await
    }

    async fn upsert_attendance(
        &self,
        upsert: &UpsertAttendance,
    ) -> Result<AttendanceRecord, SyncError> {
        self.send_json(Method::PUT, "/attendance", upsert).await
    }

    async fn notifications(&self) -> Result<Vec<Notification>, SyncError> {
        self.get("/notifications", &[]).await
    }

    async fn mark_notification_read(&self, id: &str) -> Result<(), SyncError> {
        self.post_ack(&format!("/notifications/{id}/read")).await
    }

    async fn mark_all_notifications_read(&self) -> Result<(), SyncError> {
        self.post_ack("/notifications/read-all").await
    }

    async fn unread_count(&self) -> Result<usize, SyncError> {
        let body: UnreadCount = self.get("/notifications/unread-count", &[]).await?;
        Ok(body.count)
    }
}
