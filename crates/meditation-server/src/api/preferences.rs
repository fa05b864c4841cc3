//! Per-user preferences handlers. All routes require a bearer token.

use actix_web::{get, post, put, web, HttpRequest, HttpResponse};
use chrono::Utc;
use meditation_types::{MessageResponse, PreferencesUpdate, UserPreferences};

use crate::auth::authenticate;
use crate::error::ApiError;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/preferences",
    responses(
        (status = 200, description = "Stored or default preferences", body = UserPreferences),
        (status = 401, description = "Missing or invalid token", body = MessageResponse)
    ),
    security(("bearer" = []))
)]
#[get("/api/preferences")]
/// Read the caller's preferences, creating defaults on first access.
pub async fn get_preferences(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user = authenticate(&state, &req)?;
    let prefs = state.store.preferences_for_user(&user.id, Utc::now())?;
    Ok(HttpResponse::Ok().json(prefs))
}

#[utoipa::path(
    put,
    path = "/api/preferences",
    request_body = PreferencesUpdate,
    responses(
        (status = 200, description = "Updated preferences", body = UserPreferences),
        (status = 400, description = "Invalid field value", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
        (status = 500, description = "Store failure", body = MessageResponse)
    ),
    security(("bearer" = []))
)]
#[put("/api/preferences")]
/// Apply a partial update; omitted fields keep their stored values.
pub async fn update_preferences(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<PreferencesUpdate>,
) -> Result<HttpResponse, ApiError> {
    let user = authenticate(&state, &req)?;
    let prefs = state
        .store
        .update_preferences(&user.id, &body, Utc::now())?;
    tracing::info!(user_id = %user.id, "preferences updated");
    Ok(HttpResponse::Ok().json(prefs))
}

#[utoipa::path(
    post,
    path = "/api/preferences/reset",
    responses(
        (status = 200, description = "Preferences reset", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = MessageResponse),
        (status = 500, description = "Store failure", body = MessageResponse)
    ),
    security(("bearer" = []))
)]
#[post("/api/preferences/reset")]
/// Restore default preferences.
pub async fn reset_preferences(
    state: web::Data<AppState>,
    req: HttpRequest,
) -> Result<HttpResponse, ApiError> {
    let user = authenticate(&state, &req)?;
    state.store.reset_preferences(&user.id, Utc::now())?;
    tracing::info!(user_id = %user.id, "preferences reset");
    Ok(HttpResponse::Ok().json(MessageResponse::new("Preferences reset to default")))
}
