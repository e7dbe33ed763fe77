//! Hirer and device preference endpoints

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};

use super::dto::{LocationBody, UpdatePreferencesRequest};
use crate::AppState;
use crate::error::AppError;
use crate::service::Preferences;

/// GET /api/hirer/location
async fn get_location(State(state): State<AppState>) -> Result<Json<LocationBody>, AppError> {
    let location = state.hirer.get_hirer_location().await?;
    Ok(Json(LocationBody { location }))
}

/// PUT /api/hirer/location
async fn save_location(
    State(state): State<AppState>,
    Json(body): Json<LocationBody>,
) -> Result<Json<LocationBody>, AppError> {
    let location = state
        .hirer
        .save_hirer_location(body.location.as_deref().unwrap_or_default())
        .await?;
    Ok(Json(LocationBody {
        location: Some(location),
    }))
}

/// DELETE /api/hirer/location
async fn clear_location(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.hirer.clear_hirer_location().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/preferences
async fn get_preferences(State(state): State<AppState>) -> Json<Preferences> {
    Json(state.preferences.snapshot().await)
}

/// PUT /api/preferences
async fn update_preferences(
    State(state): State<AppState>,
    Json(request): Json<UpdatePreferencesRequest>,
) -> Result<Json<Preferences>, AppError> {
    if let Some(language) = request.language {
        state.preferences.set_language(&language).await?;
    }
    if let Some(role) = request.role {
        state.preferences.set_role(role).await?;
    }
    Ok(Json(state.preferences.snapshot().await))
}

/// Create hirer and preference routes
pub fn hirer_router() -> Router<AppState> {
    Router::new()
        .route(
            "/hirer/location",
            get(get_location).put(save_location).delete(clear_location),
        )
        .route("/preferences", get(get_preferences).put(update_preferences))
}
