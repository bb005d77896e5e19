//! Payment endpoints.
//!
//! The two operations that can reach the external gateway run under
//! `spawn_blocking`: the engine is synchronous and a provider round-trip
//! must not stall the async runtime.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use bookfair_core_rs::{InitiateOutcome, Payment, PaymentMethod, PaymentUpdate};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessPaymentRequest {
    pub reservation_id: String,
    pub method: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmPaymentRequest {
    pub reference_id: String,
    pub method: String,
    pub reservation_id: String,
}

fn parse_method(raw: &str) -> Result<PaymentMethod, ApiError> {
    raw.parse::<PaymentMethod>()
        .map_err(|e| ApiError::validation(e.to_string()))
}

pub async fn process(
    State(state): State<AppState>,
    Json(body): Json<ProcessPaymentRequest>,
) -> Result<Json<InitiateOutcome>, ApiError> {
    let method = parse_method(&body.method)?;
    let engine = state.engine.clone();

    let outcome = tokio::task::spawn_blocking(move || {
        engine.process_payment(&body.reservation_id, method)
    })
    .await
    .map_err(|e| ApiError::internal(e.to_string()))??;

    Ok(Json(outcome))
}

pub async fn confirm_cash(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Payment>, ApiError> {
    Ok(Json(state.engine.confirm_cash_payment(&id)?))
}

pub async fn confirm(
    State(state): State<AppState>,
    Json(body): Json<ConfirmPaymentRequest>,
) -> Result<Json<Payment>, ApiError> {
    let method = parse_method(&body.method)?;
    let engine = state.engine.clone();

    let payment = tokio::task::spawn_blocking(move || {
        engine.confirm_gateway_payment(&body.reference_id, method, &body.reservation_id)
    })
    .await
    .map_err(|e| ApiError::internal(e.to_string()))??;

    Ok(Json(payment))
}

pub async fn list(State(state): State<AppState>) -> Json<Vec<Payment>> {
    Json(state.engine.list_payments())
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Payment>, ApiError> {
    Ok(Json(state.engine.get_payment(&id)?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<PaymentUpdate>,
) -> Result<Json<Payment>, ApiError> {
    Ok(Json(state.engine.update_payment(&id, &body)?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.engine.delete_payment(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
