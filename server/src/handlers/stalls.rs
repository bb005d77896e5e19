//! Stall inventory endpoints (admin surface).

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bookfair_core_rs::{Stall, StallSize, StallStatus};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StallRequest {
    pub stall_code: String,
    pub stall_size: StallSize,
    pub price: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StallStatusRequest {
    pub status: StallStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StallListQuery {
    pub size: Option<StallSize>,
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<StallRequest>,
) -> Result<(StatusCode, Json<Stall>), ApiError> {
    let stall = state
        .engine
        .create_stall(&body.stall_code, body.stall_size, body.price)?;
    Ok((StatusCode::CREATED, Json(stall)))
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<StallListQuery>,
) -> Json<Vec<Stall>> {
    let stalls = match query.size {
        Some(size) => state.engine.stalls_by_size(size),
        None => state.engine.list_stalls(),
    };
    Json(stalls)
}

pub async fn list_available(State(state): State<AppState>) -> Json<Vec<Stall>> {
    Json(state.engine.list_available_stalls())
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Stall>, ApiError> {
    Ok(Json(state.engine.get_stall(&id)?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<StallRequest>,
) -> Result<Json<Stall>, ApiError> {
    let stall = state
        .engine
        .update_stall(&id, &body.stall_code, body.stall_size, body.price)?;
    Ok(Json(stall))
}

pub async fn set_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<StallStatusRequest>,
) -> Result<Json<Stall>, ApiError> {
    Ok(Json(state.engine.set_stall_status(&id, body.status)?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.engine.delete_stall(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
