//! Catalog API handlers.

use actix_web::{get, web, HttpResponse};
use meditation_types::MeditationItem;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::catalog::{normalize_category, parse_duration_filter, DurationFilter};
use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for catalog listing.
#[derive(Deserialize, IntoParams)]
pub struct MeditationQuery {
    /// Exact category label to keep.
    pub category: Option<String>,
    /// Exact duration in minutes to keep.
    pub duration: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/meditation",
    params(MeditationQuery),
    responses(
        (status = 200, description = "Catalog items in server order", body = Vec<MeditationItem>)
    )
)]
#[get("/api/meditation")]
/// List catalog items, optionally filtered by category and duration.
pub async fn list_meditations(
    state: web::Data<AppState>,
    query: web::Query<MeditationQuery>,
) -> Result<HttpResponse, ApiError> {
    let category = normalize_category(query.category.as_deref());
    let duration = match parse_duration_filter(query.duration.as_deref()) {
        DurationFilter::Any => None,
        DurationFilter::Minutes(minutes) => Some(minutes),
        DurationFilter::Unmatchable => {
            return Ok(HttpResponse::Ok().json(Vec::<MeditationItem>::new()));
        }
    };
    let items = state.store.list_meditations(category, duration)?;
    Ok(HttpResponse::Ok().json(items))
}

#[utoipa::path(
    get,
    path = "/api/meditation/{id}",
    params(
        ("id" = String, Path, description = "Catalog id")
    ),
    responses(
        (status = 200, description = "Catalog item", body = MeditationItem),
        (status = 404, description = "Meditation not found", body = meditation_types::MessageResponse)
    )
)]
#[get("/api/meditation/{id}")]
/// Fetch a single catalog item.
pub async fn get_meditation(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let Ok(id) = path.trim().parse::<i64>() else {
        return Err(ApiError::NotFound("Meditation not found"));
    };
    match state.store.meditation_by_id(id)? {
        Some(item) => Ok(HttpResponse::Ok().json(item)),
        None => Err(ApiError::NotFound("Meditation not found")),
    }
}
