// HTTP surface tests: the real route table over the in-memory HR service.
//
// Run with: cargo test --test api_routes

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use actix_web::http::StatusCode;
use actix_web::web::Data;
use actix_web::{App, test};
use chrono::Utc;
use serde_json::{Value, json};

use hrm_sync::client::{InMemorySyncClient, SyncClient};
use hrm_sync::config::Config;
use hrm_sync::engine::{AttendanceBoard, NotificationCenter, ProfileStore, UnreadCounter};
use hrm_sync::model::attendance::AttendanceStatus::Present;
use hrm_sync::model::employee::Employee;
use hrm_sync::model::notification::{Notification, NotificationKind};
use hrm_sync::model::profile::AdminProfile;
use hrm_sync::routes;

fn config() -> Config {
    Config {
        server_addr: "127.0.0.1:0".into(),
        sync_api_url: "http://hr.invalid".into(),
        api_prefix: "/api".into(),
        unread_poll_interval: Duration::from_secs(5),
        request_timeout: Duration::from_secs(1),
        rate_per_min: 6000,
        log_dir: "logs".into(),
        profile_path: "unused.json".into(),
    }
}

fn peer() -> SocketAddr {
    "127.0.0.1:12345".parse().unwrap()
}

fn employee(id: &str, name: &str) -> Employee {
    Employee {
        employee_id: id.into(),
        full_name: name.into(),
        department: "Engineering".into(),
        email: format!("{}@company.com", id.to_lowercase()),
    }
}

fn note(id: &str) -> Notification {
    Notification {
        id: id.into(),
        title: "Leave approved".into(),
        message: String::new(),
        kind: NotificationKind::Success,
        created_at: Utc::now(),
        is_read: false,
    }
}

struct Harness {
    client: Arc<InMemorySyncClient>,
    board: Data<AttendanceBoard>,
    center: Data<NotificationCenter>,
    counter: Data<UnreadCounter>,
    profile: Data<ProfileStore>,
}

fn harness() -> Harness {
    let client = Arc::new(
        InMemorySyncClient::new()
            .with_roster(vec![
                employee("A", "Ann Lee"),
                employee("B", "Bob Stone"),
                employee("C", "Cid Park"),
            ])
            .with_attendance("2024-01-01", &[("A", Present)])
            .with_notifications(vec![note("n1"), note("n2")]),
    );
    let shared: Arc<dyn SyncClient> = client.clone();
    let counter = UnreadCounter::new();
    Harness {
        client,
        board: Data::new(AttendanceBoard::new(shared.clone())),
        center: Data::new(NotificationCenter::new(shared, counter.clone())),
        counter: Data::new(counter),
        profile: Data::new(ProfileStore::ephemeral(AdminProfile::default())),
    }
}

macro_rules! app {
    ($h:expr) => {{
        let config = config();
        test::init_service(
            App::new()
                .app_data($h.board.clone())
                .app_data($h.center.clone())
                .app_data($h.counter.clone())
                .app_data($h.profile.clone())
                .configure(|cfg| routes::configure(cfg, &config)),
        )
        .await
    }};
}

#[actix_web::test]
async fn board_is_conflict_before_any_load() {
    let h = harness();
    let app = app!(h);

    let req = test::TestRequest::get()
        .uri("/api/attendance/board")
        .peer_addr(peer())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "no day is loaded");
}

#[actix_web::test]
async fn malformed_date_is_bad_request() {
    let h = harness();
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/api/attendance/board/load")
        .peer_addr(peer())
        .set_json(json!({ "date": "01/01/2024" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn load_mark_bulk_and_save_round_trip() {
    let h = harness();
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/api/attendance/board/load")
        .peer_addr(peer())
        .set_json(json!({ "date": "2024-01-01" }))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["date"], "2024-01-01");
    assert_eq!(view["summary"]["present"], 1);
    assert_eq!(view["summary"]["unmarked"], 2);

    let req = test::TestRequest::put()
        .uri("/api/attendance/board/C")
        .peer_addr(peer())
        .set_json(json!({ "status": "Absent" }))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["summary"]["pending"], 1);
    assert_eq!(view["rows"][2]["status"], "Absent");
    assert_eq!(view["rows"][2]["dirty"], true);

    let req = test::TestRequest::post()
        .uri("/api/attendance/board/bulk")
        .peer_addr(peer())
        .set_json(json!({ "status": "Present" }))
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["summary"]["pending"], 3);

    let req = test::TestRequest::post()
        .uri("/api/attendance/board/save")
        .peer_addr(peer())
        .to_request();
    let report: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(report["saved"], 3);
    assert_eq!(report["reloaded"], true);
    assert_eq!(h.client.upsert_calls(), 3);

    let req = test::TestRequest::get()
        .uri("/api/attendance/board?search=bob")
        .peer_addr(peer())
        .to_request();
    let view: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(view["rows"].as_array().unwrap().len(), 1);
    assert_eq!(view["rows"][0]["status"], "Present");
    assert_eq!(view["rows"][0]["dirty"], false);
    assert_eq!(view["summary"]["present"], 3);
}

#[actix_web::test]
async fn unknown_employee_is_not_found() {
    let h = harness();
    h.board.load_day("2024-01-01".into()).await.unwrap();
    let app = app!(h);

    let req = test::TestRequest::put()
        .uri("/api/attendance/board/ZZZ")
        .peer_addr(peer())
        .set_json(json!({ "status": "Present" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn failed_save_reports_counts_and_keeps_pending() {
    let h = harness();
    h.board.load_day("2024-01-01".into()).await.unwrap();
    h.board.set_status("B", Present).unwrap();
    h.board.set_status("C", Present).unwrap();
    h.client.fail_upserts_for("C");
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/api/attendance/board/save")
        .peer_addr(peer())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["attempted"], 2);
    assert_eq!(body["failed"], 1);
    assert_eq!(h.board.dirty_count(), 2);
}

#[actix_web::test]
async fn notification_routes_drive_the_shared_count() {
    let h = harness();
    let app = app!(h);

    let req = test::TestRequest::get()
        .uri("/api/notifications")
        .peer_addr(peer())
        .to_request();
    let feed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(feed["unread_count"], 2);
    assert_eq!(feed["notifications"][0]["type"], "success");

    let req = test::TestRequest::post()
        .uri("/api/notifications/n1/read")
        .peer_addr(peer())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["unread_count"], 1);

    let req = test::TestRequest::get()
        .uri("/api/notifications/unread-count")
        .peer_addr(peer())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 1);

    let req = test::TestRequest::post()
        .uri("/api/notifications/read-all")
        .peer_addr(peer())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["unread_count"], 0);
    assert_eq!(h.counter.get(), 0);
}

#[actix_web::test]
async fn unconfirmed_read_mark_is_bad_gateway_and_reverted() {
    let h = harness();
    h.center.fetch_all().await.unwrap();
    h.client.fail_notification_writes(true);
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/api/notifications/n2/read")
        .peer_addr(peer())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Upstream HR service unavailable");
    assert_eq!(h.counter.get(), 2);
}

#[actix_web::test]
async fn profile_can_be_read_and_updated() {
    let h = harness();
    let mut header = h.profile.subscribe();
    let app = app!(h);

    let req = test::TestRequest::get()
        .uri("/api/profile")
        .peer_addr(peer())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["name"], "Admin User");

    let req = test::TestRequest::put()
        .uri("/api/profile")
        .peer_addr(peer())
        .set_json(json!({ "name": "Grace Hopper", "email": "grace@company.com" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["name"], "Grace Hopper");
    assert_eq!(body["role"], "Super Admin");
    assert!(header.has_changed().unwrap());
    assert_eq!(header.borrow_and_update().initials(), "GH");

    let req = test::TestRequest::put()
        .uri("/api/profile")
        .peer_addr(peer())
        .set_json(json!({ "name": "", "email": "x@company.com" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(h.profile.read().name, "Grace Hopper");
}

#[actix_web::test]
async fn save_with_failed_reload_is_still_ok() {
    let h = harness();
    h.board.load_day("2024-01-01".into()).await.unwrap();
    h.board.set_status("B", Present).unwrap();
    h.client.fail_reads(true);
    let app = app!(h);

    let req = test::TestRequest::post()
        .uri("/api/attendance/board/save")
        .peer_addr(peer())
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let report: Value = test::read_body_json(resp).await;
    assert_eq!(report["saved"], 1);
    assert_eq!(report["reloaded"], false);
    assert_eq!(h.client.record("2024-01-01", "B").unwrap().status, Present);
}
