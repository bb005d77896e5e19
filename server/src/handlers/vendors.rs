//! Vendor directory endpoints.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use bookfair_core_rs::{Payment, ReservationView, Vendor};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterVendorRequest {
    pub email: String,
    pub business_name: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterVendorRequest>,
) -> Result<(StatusCode, Json<Vendor>), ApiError> {
    let vendor = state
        .engine
        .register_vendor(&body.email, &body.business_name)?;
    Ok((StatusCode::CREATED, Json(vendor)))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vendor>, ApiError> {
    Ok(Json(state.engine.get_vendor(&id)?))
}

pub async fn reservations(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Vec<ReservationView>> {
    Json(state.engine.reservations_by_vendor(&id))
}

pub async fn payments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Vec<Payment>> {
    Json(state.engine.payments_by_vendor(&id))
}
