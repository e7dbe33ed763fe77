//! Worker endpoints

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
};

use super::dto::*;
use crate::AppState;
use crate::data::{NewWorker, Skill, Worker, WorkerAvailability};
use crate::error::AppError;

/// POST /api/workers
async fn register_worker(
    State(state): State<AppState>,
    Json(input): Json<NewWorker>,
) -> Result<(StatusCode, Json<Worker>), AppError> {
    let worker = state.workers.register_worker(input).await?;
    Ok((StatusCode::CREATED, Json(worker)))
}

/// GET /api/workers
async fn list_workers(
    State(state): State<AppState>,
    Query(params): Query<ListWorkersParams>,
) -> Result<Json<Vec<Worker>>, AppError> {
    let (query, near_hirer) = params.into_query();
    let workers = if near_hirer {
        state.workers.fetch_workers_near_hirer(query).await?
    } else {
        state.workers.fetch_workers(query).await?
    };
    Ok(Json(workers))
}

/// GET /api/workers/me
async fn get_profile(
    State(state): State<AppState>,
    Query(params): Query<PhoneParams>,
) -> Result<Json<Worker>, AppError> {
    state
        .workers
        .get_worker_profile(params.phone.as_deref())
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// DELETE /api/workers/me
async fn sign_out(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.workers.sign_out().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/workers/me/sync
async fn sync_profile(
    State(state): State<AppState>,
    Json(request): Json<PhoneRequest>,
) -> Result<Json<SyncResponse>, AppError> {
    let outcome = state.workers.sync_profile(&request.phone).await?;
    Ok(Json(outcome.into()))
}

/// GET /api/workers/me/availability
async fn get_availability(
    State(state): State<AppState>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let record = state.workers.availability().await?;
    let waiting_since = state.workers.waiting_since().await?;

    Ok(Json(AvailabilityResponse {
        available: record.as_ref().is_some_and(|r| r.is_available),
        available_since: record.and_then(|r| r.available_since),
        waiting_since,
    }))
}

/// POST /api/workers/me/availability
async fn become_available(
    State(state): State<AppState>,
    Json(request): Json<PhoneRequest>,
) -> Result<Json<WorkerAvailability>, AppError> {
    let record = state.workers.set_worker_available(&request.phone).await?;
    Ok(Json(record))
}

/// DELETE /api/workers/me/availability
async fn become_unavailable(
    State(state): State<AppState>,
    Query(params): Query<PhoneParams>,
) -> Result<StatusCode, AppError> {
    let phone = params
        .phone
        .ok_or_else(|| AppError::Validation("phone is required".to_string()))?;
    state.workers.set_worker_unavailable(&phone).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/skills
async fn list_skills(State(state): State<AppState>) -> Result<Json<Vec<Skill>>, AppError> {
    Ok(Json(state.workers.fetch_skills().await?))
}

/// Create worker and skill routes
pub fn worker_router() -> Router<AppState> {
    Router::new()
        .route("/workers", post(register_worker).get(list_workers))
        .route("/workers/me", get(get_profile).delete(sign_out))
        .route("/workers/me/sync", post(sync_profile))
        .route(
            "/workers/me/availability",
            get(get_availability)
                .post(become_available)
                .delete(become_unavailable),
        )
        .route("/skills", get(list_skills))
}
