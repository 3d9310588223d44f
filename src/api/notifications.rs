use actix_web::{HttpResponse, Responder, web};
use serde_json::json;

use crate::engine::{NotificationCenter, UnreadCounter};
#[allow(unused_imports)]
use crate::model::notification::NotificationFeed;
use crate::model::notification::UnreadCount;

/// Open the notification list; refreshes the shared unread count
#[utoipa::path(
    get,
    path = "/api/notifications",
    responses(
        (status = 200, description = "Full list with its unread count", body = NotificationFeed),
        (status = 502, description = "HR service unavailable")
    ),
    tag = "Notifications"
)]
pub async fn list_notifications(
    center: web::Data<NotificationCenter>,
) -> actix_web::Result<impl Responder> {
    Ok(HttpResponse::Ok().json(center.fetch_all().await?))
}

/// Mark one notification read
#[utoipa::path(
    post,
    path = "/api/notifications/{id}/read",
    params(
        ("id", Path, description = "Notification id")
    ),
    responses(
        (status = 200, description = "Marked read", body = Object, example = json!({
            "unread_count": 1
        })),
        (status = 404, description = "Notification not in the open list"),
        (status = 502, description = "Not confirmed; the mark was reverted")
    ),
    tag = "Notifications"
)]
pub async fn mark_read(
    center: web::Data<NotificationCenter>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();
    let unread_count = center.mark_one(&id).await?;
    Ok(HttpResponse::Ok().json(json!({ "unread_count": unread_count })))
}

/// Mark every notification read
#[utoipa::path(
    post,
    path = "/api/notifications/read-all",
    responses(
        (status = 200, description = "All marked read", body = Object, example = json!({
            "unread_count": 0
        })),
        (status = 502, description = "Not confirmed; the marks were reverted")
    ),
    tag = "Notifications"
)]
pub async fn mark_all_read(
    center: web::Data<NotificationCenter>,
) -> actix_web::Result<impl Responder> {
    let unread_count = center.mark_all().await?;
    Ok(HttpResponse::Ok().json(json!({ "unread_count": unread_count })))
}

/// Badge count, as last published by the poller or the list
#[utoipa::path(
    get,
    path = "/api/notifications/unread-count",
    responses(
        (status = 200, description = "Current unread count", body = UnreadCount)
    ),
    tag = "Notifications"
)]
pub async fn unread_count(counter: web::Data<UnreadCounter>) -> impl Responder {
    HttpResponse::Ok().json(UnreadCount {
        count: counter.get(),
    })
}
