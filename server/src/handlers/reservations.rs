//! Reservation endpoints.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use bookfair_core_rs::ReservationView;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    pub vendor_email: String,
    pub stall_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReservationStatusRequest {
    pub status: String,
}

pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateReservationRequest>,
) -> Result<(StatusCode, Json<ReservationView>), ApiError> {
    let view = state
        .engine
        .create_reservation(&body.vendor_email, &body.stall_ids)?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn list(State(state): State<AppState>) -> Json<Vec<ReservationView>> {
    Json(state.engine.list_reservations())
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReservationView>, ApiError> {
    Ok(Json(state.engine.get_reservation(&id)?))
}

pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ReservationView>, ApiError> {
    Ok(Json(state.engine.cancel_reservation(&id)?))
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateReservationStatusRequest>,
) -> Result<Json<ReservationView>, ApiError> {
    Ok(Json(state.engine.update_reservation_status(&id, &body.status)?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.engine.delete_reservation(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// On-demand pass image for a confirmed reservation (operator resend path).
pub async fn pass_image(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let image = state.engine.pass_image(&id)?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/octet-stream")],
        image,
    ))
}
