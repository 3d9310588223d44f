use crate::api::attendance::{LoadDayReq, StatusReq};
use crate::engine::board::{BoardRow, BoardSummary, BoardView, SaveReport};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::employee::Employee;
use crate::model::notification::{Notification, NotificationFeed, NotificationKind, UnreadCount};
use crate::model::profile::AdminProfile;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Sync API",
        version = "0.1.0",
        description = r#"
## HR attendance dashboard backend

Keeps the dashboard's working state between the view and the HR data service.

### Key Features
- **Attendance board**
  - Load a day, mark employees one by one or all at once, save every pending mark together
  - Pending marks stay local until a save succeeds completely
- **Notifications**
  - Badge count refreshed by polling and by every change made from the list
  - Optimistic read marks, reverted when the HR service does not confirm
- **Admin profile**
  - Read and update the profile shown in the header

### Response Format
- JSON bodies; errors carry a `message`
"#,
    ),
    paths(
        crate::api::attendance::load_day,
        crate::api::attendance::get_board,
        crate::api::attendance::set_status,
        crate::api::attendance::bulk_set_status,
        crate::api::attendance::save_all,

        crate::api::notifications::list_notifications,
        crate::api::notifications::mark_read,
        crate::api::notifications::mark_all_read,
        crate::api::notifications::unread_count,

        crate::api::profile::get_profile,
        crate::api::profile::update_profile
    ),
    components(
        schemas(
            LoadDayReq,
            StatusReq,
            AttendanceStatus,
            AttendanceRecord,
            Employee,
            BoardRow,
            BoardSummary,
            BoardView,
            SaveReport,
            Notification,
            NotificationKind,
            NotificationFeed,
            UnreadCount,
            AdminProfile
        )
    ),
    tags(
        (name = "Attendance", description = "Daily attendance board"),
        (name = "Notifications", description = "Notification list and unread badge"),
        (name = "Profile", description = "Admin profile"),
    )
)]
pub struct ApiDoc;
