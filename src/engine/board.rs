//! One day's roster and attendance, with local edits tracked until saved.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use futures::future::join_all;
use parking_lot::RwLock;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

use crate::client::{SyncClient, SyncError};
use crate::model::attendance::{
    AttendanceDate, AttendanceEntry, AttendanceRecord, AttendanceStatus, UpsertAttendance,
};
use crate::model::employee::Employee;

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("no day is loaded")]
    NoDayLoaded,

    #[error("employee {0} is not on the loaded roster")]
    UnknownEmployee(String),

    #[error("a save is already in progress")]
    SaveInProgress,

    #[error("{failed} of {attempted} attendance writes failed: {first_error}")]
    SaveFailed {
        date: AttendanceDate,
        attempted: usize,
        failed: usize,
        first_error: SyncError,
    },

    #[error(transparent)]
    Sync(#[from] SyncError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A later `load_day` was issued while this one was in flight.
    Superseded,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SaveReport {
    #[schema(value_type = String, example = "2024-01-01")]
    pub date: AttendanceDate,
    /// Number of upserts issued and confirmed
    pub saved: usize,
    pub confirmed: Vec<AttendanceRecord>,
    /// Whether the board was refreshed from the server after the save.
    /// `false` after a failed reload: the writes still stand, and the saved
    /// entries stay pending locally until the next successful load.
    pub reloaded: bool,
}

/// One roster row as the view renders it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BoardRow {
    pub employee: Employee,
    /// `None` means not marked for this day
    pub status: Option<AttendanceStatus>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub marked_at: Option<DateTime<Utc>>,
    pub dirty: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct BoardSummary {
    pub total: usize,
    pub present: usize,
    pub absent: usize,
    pub unmarked: usize,
    pub pending: usize,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BoardView {
    #[schema(value_type = String, example = "2024-01-01")]
    pub date: AttendanceDate,
    pub rows: Vec<BoardRow>,
    pub summary: BoardSummary,
    pub saving: bool,
}

struct DayView {
    date: AttendanceDate,
    roster: Vec<Employee>,
    entries: HashMap<String, AttendanceEntry>,
}

impl DayView {
    fn row(&self, employee: &Employee) -> BoardRow {
        let entry = self.entries.get(&employee.employee_id);
        BoardRow {
            employee: employee.clone(),
            status: entry.map(AttendanceEntry::status),
            marked_at: entry.and_then(AttendanceEntry::marked_at),
            dirty: entry.is_some_and(AttendanceEntry::is_dirty),
        }
    }

    /// Rows in roster order; `query` filters on name or employee id.
    fn rows(&self, query: Option<&str>) -> Vec<BoardRow> {
        let query = query.map(str::trim).filter(|q| !q.is_empty());
        self.roster
            .iter()
            .filter(|e| query.is_none_or(|q| e.matches(q)))
            .map(|e| self.row(e))
            .collect()
    }

    fn set(&mut self, employee_id: &str, status: AttendanceStatus) {
        let previous = self.entries.remove(employee_id);
        self.entries.insert(
            employee_id.to_string(),
            AttendanceEntry::edited(previous, status),
        );
    }
}

/// Clears the busy flag when the save that set it finishes or is dropped.
struct SavingGuard<'a>(&'a AtomicBool);

impl<'a> SavingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SavingGuard(flag))
    }
}

impl Drop for SavingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct AttendanceBoard {
    client: Arc<dyn SyncClient>,
    view: RwLock<Option<DayView>>,
    saving: AtomicBool,
    load_seq: AtomicU64,
}

impl AttendanceBoard {
    pub fn new(client: Arc<dyn SyncClient>) -> Self {
        Self {
            client,
            view: RwLock::new(None),
            saving: AtomicBool::new(false),
            load_seq: AtomicU64::new(0),
        }
    }

    /// Fetch roster and attendance for `date` and replace the whole view.
    /// Unsaved edits are discarded. On failure the previous view stays.
    #[instrument(skip(self, date), fields(date = %date))]
    pub async fn load_day(&self, date: AttendanceDate) -> Result<LoadOutcome, BoardError> {
        let seq = self.load_seq.fetch_add(1, Ordering::AcqRel) + 1;

        let (roster, records) = futures::try_join!(
            self.client.roster(),
            self.client.attendance_for(&date)
        )
        .map_err(|e| {
            error!(error = %e, "Failed to load attendance day");
            e
        })?;

        if self.load_seq.load(Ordering::Acquire) != seq {
            debug!("Newer load issued, dropping this result");
            return Ok(LoadOutcome::Superseded);
        }

        let mut entries = HashMap::with_capacity(records.len());
        for record in records {
            if !roster.iter().any(|e| e.employee_id == record.employee_id) {
                debug!(employee_id = %record.employee_id, "Skipping attendance for employee not on roster");
                continue;
            }
            entries.insert(record.employee_id.clone(), AttendanceEntry::Clean(record));
        }

        let mut view = self.view.write();
        if self.load_seq.load(Ordering::Acquire) != seq {
            return Ok(LoadOutcome::Superseded);
        }
        let discarded = view
            .as_ref()
            .map_or(0, |v| v.entries.values().filter(|e| e.is_dirty()).count());
        if discarded > 0 {
            warn!(discarded, "Discarding unsaved attendance edits");
        }
        info!(employees = roster.len(), marked = entries.len(), "Attendance day loaded");
        *view = Some(DayView {
            date,
            roster,
            entries,
        });
        Ok(LoadOutcome::Applied)
    }

    /// Local edit, no network. The last call for a key wins.
    pub fn set_status(&self, employee_id: &str, status: AttendanceStatus) -> Result<(), BoardError> {
        let mut guard = self.view.write();
        let view = guard.as_mut().ok_or(BoardError::NoDayLoaded)?;
        if !view.roster.iter().any(|e| e.employee_id == employee_id) {
            return Err(BoardError::UnknownEmployee(employee_id.to_string()));
        }
        view.set(employee_id, status);
        debug!(employee_id, %status, "Attendance marked locally");
        Ok(())
    }

    /// Mark every employee on the loaded roster, regardless of any view filter.
    pub fn bulk_set_status(&self, status: AttendanceStatus) -> Result<usize, BoardError> {
        let mut guard = self.view.write();
        let view = guard.as_mut().ok_or(BoardError::NoDayLoaded)?;
        let ids: Vec<String> = view.roster.iter().map(|e| e.employee_id.clone()).collect();
        for id in &ids {
            view.set(id, status);
        }
        info!(count = ids.len(), %status, "Marked whole roster");
        Ok(ids.len())
    }

    /// Upsert every dirty entry concurrently and wait for all of them.
    ///
    /// Nothing local changes here: on success the caller reloads the day to
    /// pick up server timestamps; on any failure every entry stays dirty,
    /// including the ones whose write went through. A call made while
    /// another save is running is rejected with [`BoardError::SaveInProgress`].
    #[instrument(skip(self))]
    pub async fn save_all(&self) -> Result<SaveReport, BoardError> {
        let _guard = SavingGuard::acquire(&self.saving).ok_or(BoardError::SaveInProgress)?;

        let (date, pending) = {
            let guard = self.view.read();
            let view = guard.as_ref().ok_or(BoardError::NoDayLoaded)?;
            let pending: Vec<UpsertAttendance> = view
                .entries
                .iter()
                .filter(|(_, entry)| entry.is_dirty())
                .map(|(employee_id, entry)| UpsertAttendance {
                    employee_id: employee_id.clone(),
                    date: view.date.clone(),
                    status: entry.status(),
                })
                .collect();
            (view.date.clone(), pending)
        };

        if pending.is_empty() {
            info!(%date, "No attendance changes to save");
            return Ok(SaveReport {
                date,
                saved: 0,
                confirmed: Vec::new(),
                reloaded: false,
            });
        }

        let attempted = pending.len();
        let results = join_all(pending.iter().map(|u| self.client.upsert_attendance(u))).await;

        let mut confirmed = Vec::with_capacity(attempted);
        let mut failures = Vec::new();
        for (upsert, result) in pending.iter().zip(results) {
            match result {
                Ok(record) => confirmed.push(record),
                Err(e) => {
                    error!(error = %e, employee_id = %upsert.employee_id, "Attendance write failed");
                    failures.push(e);
                }
            }
        }

        if let Some(first_error) = failures.into_iter().next() {
            let failed = attempted - confirmed.len();
            return Err(BoardError::SaveFailed {
                date,
                attempted,
                failed,
                first_error,
            });
        }

        info!(%date, saved = attempted, "Attendance saved");
        Ok(SaveReport {
            date,
            saved: attempted,
            confirmed,
            reloaded: false,
        })
    }

    /// [`save_all`](Self::save_all) followed by a reload of the saved day.
    /// The reload is skipped if the board has moved to another day meanwhile.
    /// A failed reload does not fail the call; see [`SaveReport::reloaded`].
    pub async fn save_and_reload(&self) -> Result<SaveReport, BoardError> {
        let mut report = self.save_all().await?;
        if report.saved == 0 || self.date().as_ref() != Some(&report.date) {
            return Ok(report);
        }
        match self.load_day(report.date.clone()).await {
            Ok(outcome) => report.reloaded = outcome == LoadOutcome::Applied,
            Err(e) => warn!(error = %e, date = %report.date, "Attendance saved but reload failed"),
        }
        Ok(report)
    }

    pub fn date(&self) -> Option<AttendanceDate> {
        self.view.read().as_ref().map(|v| v.date.clone())
    }

    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::Acquire)
    }

    pub fn entry(&self, employee_id: &str) -> Option<AttendanceEntry> {
        self.view
            .read()
            .as_ref()
            .and_then(|v| v.entries.get(employee_id).cloned())
    }

    pub fn dirty_count(&self) -> usize {
        self.view
            .read()
            .as_ref()
            .map_or(0, |v| v.entries.values().filter(|e| e.is_dirty()).count())
    }

    pub fn rows(&self) -> Vec<BoardRow> {
        self.view
            .read()
            .as_ref()
            .map(|v| v.rows(None))
            .unwrap_or_default()
    }

    /// Rows whose name or employee id contains `query`. Display filter only.
    pub fn search(&self, query: &str) -> Vec<BoardRow> {
        self.view
            .read()
            .as_ref()
            .map(|v| v.rows(Some(query)))
            .unwrap_or_default()
    }

    pub fn summary(&self) -> BoardSummary {
        summarize(&self.rows())
    }

    /// Date, rows and summary taken from one read of the view, so a load
    /// landing meanwhile can't mix two days.
    pub fn snapshot(&self, query: Option<&str>) -> Result<BoardView, BoardError> {
        let guard = self.view.read();
        let view = guard.as_ref().ok_or(BoardError::NoDayLoaded)?;
        let all = view.rows(None);
        let summary = summarize(&all);
        let rows = match query {
            Some(q) => view.rows(Some(q)),
            None => all,
        };
        Ok(BoardView {
            date: view.date.clone(),
            rows,
            summary,
            saving: self.is_saving(),
        })
    }
}

fn summarize(rows: &[BoardRow]) -> BoardSummary {
    rows.iter().fold(
        BoardSummary {
            total: rows.len(),
            ..BoardSummary::default()
        },
        |mut acc, row| {
            match row.status {
                Some(AttendanceStatus::Present) => acc.present += 1,
                Some(AttendanceStatus::Absent) => acc.absent += 1,
                None => acc.unmarked += 1,
            }
            if row.dirty {
                acc.pending += 1;
            }
            acc
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::InMemorySyncClient;

    fn employee(id: &str, name: &str) -> Employee {
        Employee {
            employee_id: id.into(),
            full_name: name.into(),
            department: "Ops".into(),
            email: format!("{}@company.com", id.to_lowercase()),
        }
    }

    fn board_with(client: InMemorySyncClient) -> (Arc<InMemorySyncClient>, AttendanceBoard) {
        let client = Arc::new(client);
        let board = AttendanceBoard::new(client.clone());
        (client, board)
    }

    #[test]
    fn edits_before_any_load_are_rejected() {
        let (_, board) = board_with(InMemorySyncClient::new());
        assert!(matches!(
            board.set_status("A", AttendanceStatus::Present),
            Err(BoardError::NoDayLoaded)
        ));
        assert!(matches!(
            board.bulk_set_status(AttendanceStatus::Absent),
            Err(BoardError::NoDayLoaded)
        ));
        assert!(board.rows().is_empty());
    }

    #[tokio::test]
    async fn unknown_employee_is_rejected() {
        let (_, board) = board_with(
            InMemorySyncClient::new().with_roster(vec![employee("A", "Ann Lee")]),
        );
        board.load_day("2024-01-01".into()).await.unwrap();
        assert!(matches!(
            board.set_status("Z", AttendanceStatus::Present),
            Err(BoardError::UnknownEmployee(id)) if id == "Z"
        ));
        assert_eq!(board.dirty_count(), 0);
    }

    #[tokio::test]
    async fn search_filters_rows_but_bulk_marks_everyone() {
        let (_, board) = board_with(InMemorySyncClient::new().with_roster(vec![
            employee("E1", "Ann Lee"),
            employee("E2", "Bob Stone"),
            employee("E3", "Annie Park"),
        ]));
        board.load_day("2024-01-01".into()).await.unwrap();

        let hits = board.search("ann");
        assert_eq!(hits.len(), 2);
        assert_eq!(board.search("e2")[0].employee.full_name, "Bob Stone");
        assert_eq!(board.search("   ").len(), 3);

        assert_eq!(board.bulk_set_status(AttendanceStatus::Present).unwrap(), 3);
        assert_eq!(board.dirty_count(), 3);
    }

    #[tokio::test]
    async fn summary_counts_marks_and_pending() {
        let (_, board) = board_with(
            InMemorySyncClient::new()
                .with_roster(vec![
                    employee("A", "Ann"),
                    employee("B", "Bob"),
                    employee("C", "Cid"),
                ])
                .with_attendance("2024-01-01", &[("A", AttendanceStatus::Present)]),
        );
        board.load_day("2024-01-01".into()).await.unwrap();
        board.set_status("B", AttendanceStatus::Absent).unwrap();

        assert_eq!(
            board.summary(),
            BoardSummary {
                total: 3,
                present: 1,
                absent: 1,
                unmarked: 1,
                pending: 1,
            }
        );
    }

    #[tokio::test]
    async fn failed_load_keeps_previous_view() {
        let (client, board) = board_with(
            InMemorySyncClient::new().with_roster(vec![employee("A", "Ann")]),
        );
        board.load_day("2024-01-01".into()).await.unwrap();
        board.set_status("A", AttendanceStatus::Present).unwrap();

        client.fail_reads(true);
        let err = board.load_day("2024-01-02".into()).await.unwrap_err();
        assert!(matches!(err, BoardError::Sync(_)));

        assert_eq!(board.date(), Some("2024-01-01".into()));
        assert_eq!(board.dirty_count(), 1);
    }

    #[tokio::test]
    async fn attendance_for_employees_off_roster_is_ignored() {
        let (_, board) = board_with(
            InMemorySyncClient::new()
                .with_roster(vec![employee("A", "Ann")])
                .with_attendance(
                    "2024-01-01",
                    &[("A", AttendanceStatus::Present), ("GONE", AttendanceStatus::Absent)],
                ),
        );
        board.load_day("2024-01-01".into()).await.unwrap();
        assert!(board.entry("GONE").is_none());
        assert_eq!(board.rows().len(), 1);
    }

    #[tokio::test]
    async fn saving_nothing_issues_no_writes() {
        let (client, board) = board_with(
            InMemorySyncClient::new().with_roster(vec![employee("A", "Ann")]),
        );
        board.load_day("2024-01-01".into()).await.unwrap();
        let report = board.save_all().await.unwrap();
        assert_eq!(report.saved, 0);
        assert_eq!(client.upsert_calls(), 0);
        assert!(!board.is_saving());
    }

    #[tokio::test]
    async fn snapshot_filters_rows_but_summarizes_the_whole_day() {
        let (_, board) = board_with(
            InMemorySyncClient::new()
                .with_roster(vec![employee("E1", "Ann Lee"), employee("E2", "Bob Stone")])
                .with_attendance("2024-01-01", &[("E2", AttendanceStatus::Absent)]),
        );
        board.load_day("2024-01-01".into()).await.unwrap();

        let view = board.snapshot(Some("ann")).unwrap();

        assert_eq!(view.date, AttendanceDate::from("2024-01-01"));
        assert_eq!(view.rows.len(), 1);
        assert_eq!(view.rows[0].employee.employee_id, "E1");
        assert_eq!(view.summary.total, 2);
        assert_eq!(view.summary.absent, 1);
        assert!(!view.saving);
    }

    #[test]
    fn snapshot_needs_a_loaded_day() {
        let (_, board) = board_with(InMemorySyncClient::new());
        assert!(matches!(board.snapshot(None), Err(BoardError::NoDayLoaded)));
    }
}
