//! Gate verification endpoint.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::Json;
use bookfair_core_rs::ReservationSummary;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub token: String,
}

pub async fn verify(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> Result<Json<ReservationSummary>, ApiError> {
    Ok(Json(state.engine.verify_pass(&query.token)?))
}
