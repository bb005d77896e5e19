//! Route table.

use crate::handlers::{payments, qr, reservations, stalls, vendors};
use crate::state::AppState;
use axum::routing::{get, post, put};
use axum::Router;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        // Stalls
        .route("/stalls", post(stalls::create).get(stalls::list))
        .route("/stalls/available", get(stalls::list_available))
        .route(
            "/stalls/:id",
            get(stalls::get).put(stalls::update).delete(stalls::delete),
        )
        .route("/stalls/:id/status", put(stalls::set_status))
        // Vendors
        .route("/vendors", post(vendors::register))
        .route("/vendors/:id", get(vendors::get))
        .route("/vendors/:id/reservations", get(vendors::reservations))
        .route("/vendors/:id/payments", get(vendors::payments))
        // Reservations
        .route(
            "/reservations",
            post(reservations::create).get(reservations::list),
        )
        .route(
            "/reservations/:id",
            get(reservations::get).delete(reservations::delete),
        )
        .route("/reservations/:id/cancel", put(reservations::cancel))
        .route("/reservations/:id/status", put(reservations::update_status))
        .route("/reservations/:id/pass-image", get(reservations::pass_image))
        // Payments
        .route("/payments", get(payments::list))
        .route("/payments/process", post(payments::process))
        .route("/payments/confirm", post(payments::confirm))
        .route(
            "/payments/:id",
            get(payments::get)
                .put(payments::update)
                .delete(payments::delete),
        )
        .route("/payments/:id/confirm-cash", put(payments::confirm_cash))
        // Gate verification
        .route("/qr/verify", get(qr::verify))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
