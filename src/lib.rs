//! Attendance and notification synchronization for the HR admin dashboard.
//!
//! [`engine::AttendanceBoard`] keeps one day's roster and attendance with
//! local edits until a bulk save; [`engine::NotificationCenter`],
//! [`engine::UnreadCounter`] and [`engine::BadgePoller`] keep the unread
//! badge and the notification list in step. Both sides talk to the HR data
//! service through [`client::SyncClient`].

pub mod api;
pub mod client;
pub mod config;
pub mod docs;
pub mod engine;
pub mod model;
pub mod routes;
