pub mod board;
pub mod notifications;
pub mod poller;
pub mod profile;
pub mod unread;

pub use board::{AttendanceBoard, BoardError, LoadOutcome, SaveReport};
pub use notifications::{NotificationCenter, NotificationError};
pub use poller::BadgePoller;
pub use profile::ProfileStore;
pub use unread::UnreadCounter;
