//! In-memory [`SyncClient`] for tests and local demos.
//!
//! Behaves like the remote API (server-stamped `marked_at`, last write wins)
//! and adds knobs to inject failures and to hold writes in flight.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use super::{SyncClient, SyncError};
use crate::model::attendance::{
    AttendanceDate, AttendanceRecord, AttendanceStatus, UpsertAttendance,
};
use crate::model::employee::Employee;
use crate::model::notification::{Notification, unread_count};

#[derive(Default)]
struct MemoryState {
    roster: Vec<Employee>,
    attendance: HashMap<(AttendanceDate, String), AttendanceRecord>,
    notifications: Vec<Notification>,
    failing_upserts: HashSet<String>,
    fail_notification_writes: bool,
    fail_reads: bool,
}

#[derive(Default)]
pub struct InMemorySyncClient {
    state: Mutex<MemoryState>,
    write_gate: Mutex<Option<Arc<Semaphore>>>,
    held_days: Mutex<HashMap<AttendanceDate, Arc<Semaphore>>>,
    notification_gate: Mutex<Option<Arc<Semaphore>>>,
    upsert_calls: AtomicUsize,
    notification_writes: AtomicUsize,
    attendance_calls: AtomicUsize,
    unread_calls: AtomicUsize,
}

/// Keeps the held calls pending until released.
pub struct Gate {
    semaphore: Arc<Semaphore>,
}

impl Gate {
    pub fn release(self) {
        self.semaphore.add_permits(Semaphore::MAX_PERMITS / 2);
    }
}

async fn pass(gate: Option<Arc<Semaphore>>) -> Result<(), SyncError> {
    if let Some(gate) = gate {
        let _permit = gate.acquire().await.map_err(|_| unavailable("gate"))?;
    }
    Ok(())
}

fn unavailable(what: &str) -> SyncError {
    SyncError::Api {
        status: 503,
        message: format!("{what} unavailable"),
    }
}

impl InMemorySyncClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_roster(self, roster: Vec<Employee>) -> Self {
        self.state.lock().roster = roster;
        self
    }

    pub fn with_attendance(self, date: &str, marks: &[(&str, AttendanceStatus)]) -> Self {
        {
            let mut state = self.state.lock();
            let date = AttendanceDate::from(date);
            for (employee_id, status) in marks {
                state.attendance.insert(
                    (date.clone(), employee_id.to_string()),
                    AttendanceRecord {
                        employee_id: employee_id.to_string(),
                        status: *status,
                        marked_at: Some(Utc::now()),
                    },
                );
            }
        }
        self
    }

    pub fn with_notifications(self, notifications: Vec<Notification>) -> Self {
        self.state.lock().notifications = notifications;
        self
    }

    pub fn push_notification(&self, notification: Notification) {
        self.state.lock().notifications.push(notification);
    }

    /// Upserts for this employee fail with a 503 until cleared.
    pub fn fail_upserts_for(&self, employee_id: &str) {
        self.state
            .lock()
            .failing_upserts
            .insert(employee_id.to_string());
    }

    pub fn clear_failures(&self) {
        let mut state = self.state.lock();
        state.failing_upserts.clear();
        state.fail_notification_writes = false;
        state.fail_reads = false;
    }

    pub fn fail_notification_writes(&self, fail: bool) {
        self.state.lock().fail_notification_writes = fail;
    }

    pub fn fail_reads(&self, fail: bool) {
        self.state.lock().fail_reads = fail;
    }

    /// Every upsert waits until the gate is released.
    pub fn hold_writes(&self) -> Gate {
        let semaphore = Arc::new(Semaphore::new(0));
        *self.write_gate.lock() = Some(semaphore.clone());
        Gate { semaphore }
    }

    /// Read confirms (single and all) wait until the gate is released.
    pub fn hold_notification_writes(&self) -> Gate {
        let semaphore = Arc::new(Semaphore::new(0));
        *self.notification_gate.lock() = Some(semaphore.clone());
        Gate { semaphore }
    }

    /// Attendance reads for `date` wait until the gate is released.
    pub fn hold_attendance_for(&self, date: &str) -> Gate {
        let semaphore = Arc::new(Semaphore::new(0));
        self.held_days
            .lock()
            .insert(AttendanceDate::from(date), semaphore.clone());
        Gate { semaphore }
    }

    pub fn record(&self, date: &str, employee_id: &str) -> Option<AttendanceRecord> {
        self.state
            .lock()
            .attendance
            .get(&(AttendanceDate::from(date), employee_id.to_string()))
            .cloned()
    }

    pub fn stored_notifications(&self) -> Vec<Notification> {
        self.state.lock().notifications.clone()
    }

    pub fn upsert_calls(&self) -> usize {
        self.upsert_calls.load(Ordering::SeqCst)
    }

    pub fn attendance_calls(&self) -> usize {
        self.attendance_calls.load(Ordering::SeqCst)
    }

    pub fn notification_writes(&self) -> usize {
        self.notification_writes.load(Ordering::SeqCst)
    }

    pub fn unread_calls(&self) -> usize {
        self.unread_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SyncClient for InMemorySyncClient {
    async fn roster(&self) -> Result<Vec<Employee>, SyncError> {
        let state = self.state.lock();
        if state.fail_reads {
            return Err(unavailable("roster"));
        }
        Ok(state.roster.clone())
    }

    async fn attendance_for(
        &self,
        date: &AttendanceDate,
    ) -> Result<Vec<AttendanceRecord>, SyncError> {
        self.attendance_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.held_days.lock().get(date).cloned();
        pass(gate).await?;

        let state = self.state.lock();
        if state.fail_reads {
            return Err(unavailable("attendance"));
        }
        Ok(state
            .attendance
            .iter()
            .filter(|((day, _), _)| day == date)
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn upsert_attendance(
        &self,
        upsert: &UpsertAttendance,
    ) -> Result<AttendanceRecord, SyncError> {
        self.upsert_calls.fetch_add(1, Ordering::SeqCst);

        let gate = self.write_gate.lock().clone();
        pass(gate).await?;

        let mut state = self.state.lock();
        if state.failing_upserts.contains(&upsert.employee_id) {
            return Err(unavailable("attendance write"));
        }
        if !state
            .roster
            .iter()
            .any(|e| e.employee_id == upsert.employee_id)
        {
            return Err(SyncError::Rejected {
                status: 400,
                message: format!("Employee {} not found", upsert.employee_id),
            });
        }

        let record = AttendanceRecord {
            employee_id: upsert.employee_id.clone(),
            status: upsert.status,
            marked_at: Some(Utc::now()),
        };
        state.attendance.insert(
            (upsert.date.clone(), upsert.employee_id.clone()),
            record.clone(),
        );
        Ok(record)
    }

    async fn notifications(&self) -> Result<Vec<Notification>, SyncError> {
        let state = self.state.lock();
        if state.fail_reads {
            return Err(unavailable("notifications"));
        }
        Ok(state.notifications.clone())
    }

    async fn mark_notification_read(&self, id: &str) -> Result<(), SyncError> {
        self.notification_writes.fetch_add(1, Ordering::SeqCst);
        let gate = self.notification_gate.lock().clone();
        pass(gate).await?;

        let mut state = self.state.lock();
        if state.fail_notification_writes {
            return Err(unavailable("notifications"));
        }
        let notification = state
            .notifications
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| SyncError::NotFound(format!("Notification {id} not found")))?;
        notification.is_read = true;
        Ok(())
    }

    async fn mark_all_notifications_read(&self) -> Result<(), SyncError> {
        self.notification_writes.fetch_add(1, Ordering::SeqCst);
        let gate = self.notification_gate.lock().clone();
        pass(gate).await?;

        let mut state = self.state.lock();
        if state.fail_notification_writes {
            return Err(unavailable("notifications"));
        }
        state.notifications.iter_mut().for_each(|n| n.is_read = true);
        Ok(())
    }

    async fn unread_count(&self) -> Result<usize, SyncError> {
        self.unread_calls.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock();
        if state.fail_reads {
            return Err(unavailable("unread count"));
        }
        Ok(unread_count(&state.notifications))
    }
}
