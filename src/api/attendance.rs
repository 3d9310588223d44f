use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use utoipa::{IntoParams, ToSchema};

use crate::engine::{AttendanceBoard, LoadOutcome};
use crate::model::attendance::{AttendanceDate, AttendanceStatus};
#[allow(unused_imports)]
use crate::engine::board::{BoardView, SaveReport};

#[derive(Deserialize, ToSchema)]
pub struct LoadDayReq {
    #[schema(example = "2024-01-01", format = "date", value_type = String)]
    pub date: String,
}

#[derive(Deserialize, IntoParams)]
pub struct BoardQuery {
    /// Filter rows by name or employee id
    pub search: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct StatusReq {
    #[schema(example = "Present")]
    pub status: AttendanceStatus,
}

/// Load a day, discarding unsaved edits
#[utoipa::path(
    post,
    path = "/api/attendance/board/load",
    request_body = LoadDayReq,
    responses(
        (status = 200, description = "Day loaded", body = BoardView),
        (status = 400, description = "Malformed date", body = Object, example = json!({
            "message": "invalid date `01/01/2024`, expected YYYY-MM-DD"
        })),
        (status = 502, description = "HR service unavailable")
    ),
    tag = "Attendance"
)]
pub async fn load_day(
    board: web::Data<AttendanceBoard>,
    payload: web::Json<LoadDayReq>,
) -> actix_web::Result<impl Responder> {
    let date = match AttendanceDate::parse(&payload.date) {
        Ok(d) => d,
        Err(e) => {
            return Ok(HttpResponse::BadRequest().json(json!({ "message": e.to_string() })));
        }
    };

    if board.load_day(date).await? == LoadOutcome::Superseded {
        info!("Load superseded by a newer one, returning current view");
    }

    Ok(HttpResponse::Ok().json(board.snapshot(None)?))
}

/// Current board, optionally filtered
#[utoipa::path(
    get,
    path = "/api/attendance/board",
    params(BoardQuery),
    responses(
        (status = 200, description = "Loaded day", body = BoardView),
        (status = 409, description = "No day loaded yet")
    ),
    tag = "Attendance"
)]
pub async fn get_board(
    board: web::Data<AttendanceBoard>,
    query: web::Query<BoardQuery>,
) -> actix_web::Result<impl Responder> {
    Ok(HttpResponse::Ok().json(board.snapshot(query.search.as_deref())?))
}

/// Mark one employee locally
#[utoipa::path(
    put,
    path = "/api/attendance/board/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee business id")
    ),
    request_body = StatusReq,
    responses(
        (status = 200, description = "Marked, pending save", body = BoardView),
        (status = 404, description = "Employee not on the loaded roster"),
        (status = 409, description = "No day loaded yet")
    ),
    tag = "Attendance"
)]
pub async fn set_status(
    board: web::Data<AttendanceBoard>,
    path: web::Path<String>,
    payload: web::Json<StatusReq>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    board.set_status(&employee_id, payload.status)?;
    Ok(HttpResponse::Ok().json(board.snapshot(None)?))
}

/// Mark the whole roster locally
#[utoipa::path(
    post,
    path = "/api/attendance/board/bulk",
    request_body = StatusReq,
    responses(
        (status = 200, description = "Whole roster marked, pending save", body = BoardView),
        (status = 409, description = "No day loaded yet")
    ),
    tag = "Attendance"
)]
pub async fn bulk_set_status(
    board: web::Data<AttendanceBoard>,
    payload: web::Json<StatusReq>,
) -> actix_web::Result<impl Responder> {
    board.bulk_set_status(payload.status)?;
    Ok(HttpResponse::Ok().json(board.snapshot(None)?))
}

/// Save every pending mark, then reload the day
#[utoipa::path(
    post,
    path = "/api/attendance/board/save",
    responses(
        (status = 200, description = "All marks saved; `reloaded` is false when the follow-up reload failed", body = SaveReport),
        (status = 409, description = "A save is already running", body = Object, example = json!({
            "message": "a save is already in progress"
        })),
        (status = 502, description = "Some writes failed; nothing was cleared", body = Object, example = json!({
            "message": "Failed to save some attendance records",
            "date": "2024-01-01",
            "attempted": 3,
            "failed": 1
        }))
    ),
    tag = "Attendance"
)]
pub async fn save_all(board: web::Data<AttendanceBoard>) -> actix_web::Result<impl Responder> {
    let report = board.save_and_reload().await?;
    Ok(HttpResponse::Ok().json(report))
}
