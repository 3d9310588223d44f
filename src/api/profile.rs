use actix_web::{HttpResponse, Responder, web};
use serde_json::json;
use tracing::error;

use crate::engine::ProfileStore;
use crate::model::profile::AdminProfile;

/// Current admin profile
#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Admin profile", body = AdminProfile)
    ),
    tag = "Profile"
)]
pub async fn get_profile(store: web::Data<ProfileStore>) -> impl Responder {
    HttpResponse::Ok().json(store.read())
}

/// Replace the admin profile
#[utoipa::path(
    put,
    path = "/api/profile",
    request_body = AdminProfile,
    responses(
        (status = 200, description = "Saved profile", body = AdminProfile),
        (status = 400, description = "Missing name or email", body = Object, example = json!({
            "message": "name must not be empty"
        })),
        (status = 500, description = "Profile could not be persisted")
    ),
    tag = "Profile"
)]
pub async fn update_profile(
    store: web::Data<ProfileStore>,
    payload: web::Json<AdminProfile>,
) -> impl Responder {
    let profile = match payload.into_inner().validated() {
        Ok(p) => p,
        Err(e) => return HttpResponse::BadRequest().json(json!({ "message": e.to_string() })),
    };

    match store.write(profile) {
        Ok(saved) => HttpResponse::Ok().json(saved),
        Err(e) => {
            error!(error = %e, "Failed to persist admin profile");
            HttpResponse::InternalServerError().json(json!({
                "message": "Something went wrong, Contact with system admin"
            }))
        }
    }
}
