use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use dotenvy::dotenv;

use hrm_sync::client::{HttpSyncClient, SyncClient};
use hrm_sync::config::Config;
use hrm_sync::docs::ApiDoc;
use hrm_sync::engine::{
    AttendanceBoard, BadgePoller, NotificationCenter, ProfileStore, UnreadCounter,
};
use hrm_sync::model::attendance::AttendanceDate;
use hrm_sync::routes;

use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "HRM sync is running"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(upstream = %config.sync_api_url, "Server starting...");

    let client: Arc<dyn SyncClient> = Arc::new(HttpSyncClient::new(
        &config.sync_api_url,
        config.request_timeout,
    )?);

    let counter = UnreadCounter::new();
    let board = Data::new(AttendanceBoard::new(client.clone()));
    let center = Data::new(NotificationCenter::new(client.clone(), counter.clone()));
    let profile = Data::new(ProfileStore::open(&config.profile_path)?);
    let poller = BadgePoller::spawn(client.clone(), counter.clone(), config.unread_poll_interval);
    let counter = Data::new(counter);

    // the attendance page opens on today
    let board_for_warmup = board.clone();
    actix_web::rt::spawn(async move {
        let today = AttendanceDate::from(chrono::Local::now().format("%Y-%m-%d").to_string());
        if let Err(e) = board_for_warmup.load_day(today).await {
            warn!(error = %e, "Initial attendance load failed");
        }
    });

    let server_addr = config.server_addr.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                // the tail wildcard serves the UI's static assets
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(board.clone())
            .app_data(center.clone())
            .app_data(counter.clone())
            .app_data(profile.clone())
            .service(index)
            .configure(|cfg| routes::configure(cfg, &config))
    })
    .bind(server_addr)?
    .run()
    .await?;

    info!("Server stopped, shutting down badge poller");
    poller.stop().await;
    Ok(())
}
