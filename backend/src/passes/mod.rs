//! Pass Issuance
//!
//! Mints a single-use-issuance entry pass the instant a reservation's
//! payment reaches Success, and verifies tokens presented at the gate.
//!
//! # Critical Invariants
//!
//! - **At most one pass per reservation**: `issue` is a no-op (not an
//!   error) when a pass already exists, so a retried confirmation cannot
//!   mint twice
//! - **Verification is repeatable**: presenting the same token again
//!   succeeds; tokens are not burned at the gate
//! - **Delivery is best-effort**: rendering/notification faults are logged
//!   and swallowed by [`delivery::deliver`]; they never roll back the
//!   payment confirmation that triggered issuance

pub mod delivery;

use crate::models::pass::EntryPass;
use crate::models::reservation::{Reservation, ReservationStatus};
use crate::models::state::FairState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use delivery::{
    deliver, LoggingNotifier, NotifyError, PassNotifier, PassRenderer, PlainTextRenderer,
    RenderError,
};

/// Errors that can occur during pass operations
#[derive(Debug, Error, PartialEq)]
pub enum PassError {
    #[error("invalid token")]
    InvalidToken,

    #[error("reservation not found: {0}")]
    ReservationNotFound(String),

    #[error("reservation {reservation_id} is {status:?}; passes exist only for confirmed reservations")]
    NotConfirmed {
        reservation_id: String,
        status: ReservationStatus,
    },

    #[error("no pass has been issued for reservation {reservation_id}")]
    NotIssued { reservation_id: String },

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Read-only projection returned at the verification gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationSummary {
    pub reservation_id: String,
    pub vendor_id: String,
    pub stall_codes: Vec<String>,
    pub reservation_date: DateTime<Utc>,
    pub status: ReservationStatus,
}

/// A freshly minted pass together with everything delivery needs.
#[derive(Debug, Clone)]
pub struct IssuedPass {
    pub pass: EntryPass,
    pub recipient: String,
    pub vendor_name: String,
    pub summary: ReservationSummary,
}

/// Mint a pass for a reservation, at most once.
///
/// Returns `Ok(None)` when a pass already exists: the guard that keeps a
/// retried payment confirmation from producing a second pass or a second
/// notification.
pub fn issue(
    state: &mut FairState,
    reservation_id: &str,
) -> Result<Option<IssuedPass>, PassError> {
    let reservation = state
        .get_reservation(reservation_id)
        .ok_or_else(|| PassError::ReservationNotFound(reservation_id.to_string()))?;

    if state.pass_for_reservation(reservation_id).is_some() {
        tracing::info!(reservation_id, "pass already issued; skipping");
        return Ok(None);
    }

    let summary = summarize(state, reservation);
    // Vendors are never removed from the directory, so the owning record
    // must still be present.
    let vendor = state
        .get_vendor(reservation.vendor_id())
        .expect("vendor record missing for reservation");
    let recipient = vendor.email().to_string();
    let vendor_name = vendor.business_name().to_string();

    let pass = EntryPass::new(reservation_id.to_string());
    let issued = IssuedPass {
        pass: pass.clone(),
        recipient,
        vendor_name,
        summary,
    };
    state.add_pass(pass);

    tracing::info!(reservation_id, pass_id = issued.pass.id(), "entry pass issued");
    Ok(Some(issued))
}

/// Verify a token presented at the gate.
///
/// Side-effect-free and repeatable; re-scanning the same token succeeds.
pub fn verify(state: &FairState, token: &str) -> Result<ReservationSummary, PassError> {
    let pass = state.pass_by_token(token).ok_or(PassError::InvalidToken)?;

    let reservation = state
        .get_reservation(pass.reservation_id())
        .ok_or(PassError::InvalidToken)?;

    Ok(summarize(state, reservation))
}

/// Fetch the renderable token payload for a confirmed reservation.
///
/// The out-of-band resend path: operators can re-render a pass image
/// without re-issuing or re-notifying.
pub fn pass_payload(state: &FairState, reservation_id: &str) -> Result<String, PassError> {
    let reservation = state
        .get_reservation(reservation_id)
        .ok_or_else(|| PassError::ReservationNotFound(reservation_id.to_string()))?;

    if reservation.status() != ReservationStatus::Confirmed {
        return Err(PassError::NotConfirmed {
            reservation_id: reservation_id.to_string(),
            status: reservation.status(),
        });
    }

    let pass = state
        .pass_for_reservation(reservation_id)
        .ok_or_else(|| PassError::NotIssued {
            reservation_id: reservation_id.to_string(),
        })?;

    Ok(pass.token().to_string())
}

fn summarize(state: &FairState, reservation: &Reservation) -> ReservationSummary {
    let stall_codes = reservation
        .stall_ids()
        .iter()
        .filter_map(|id| state.get_stall(id))
        .map(|s| s.code().to_string())
        .collect();

    ReservationSummary {
        reservation_id: reservation.id().to_string(),
        vendor_id: reservation.vendor_id().to_string(),
        stall_codes,
        reservation_date: reservation.created_at(),
        status: reservation.status(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booking::{self, BookingLimits};
    use crate::ledger;
    use crate::models::stall::StallSize;

    fn confirmed_reservation() -> (FairState, String) {
        let mut state = FairState::new();
        let vendor = booking::register_vendor(
            &mut state,
            "vendor@fair.test".to_string(),
            "Vendor Books".to_string(),
        )
        .unwrap();
        let vendor_id = vendor.id().to_string();
        let stall = ledger::create_stall(&mut state, "A-01".to_string(), StallSize::Small, 100)
            .unwrap();
        let view = booking::create_reservation(
            &mut state,
            &vendor_id,
            &[stall.id().to_string()],
            &BookingLimits::default(),
        )
        .unwrap();
        booking::update_status(&mut state, &view.reservation_id, "confirmed").unwrap();
        (state, view.reservation_id)
    }

    #[test]
    fn test_issue_then_verify_round_trip() {
        let (mut state, reservation_id) = confirmed_reservation();

        let issued = issue(&mut state, &reservation_id).unwrap().unwrap();
        assert_eq!(issued.recipient, "vendor@fair.test");
        assert_eq!(issued.summary.status, ReservationStatus::Confirmed);

        let summary = verify(&state, issued.pass.token()).unwrap();
        assert_eq!(summary.reservation_id, reservation_id);
        assert_eq!(summary.stall_codes, vec!["A-01"]);

        // Repeatable: a re-scan succeeds
        assert!(verify(&state, issued.pass.token()).is_ok());
    }

    #[test]
    fn test_issue_is_at_most_once() {
        let (mut state, reservation_id) = confirmed_reservation();

        assert!(issue(&mut state, &reservation_id).unwrap().is_some());
        assert!(issue(&mut state, &reservation_id).unwrap().is_none());
        assert_eq!(state.num_passes(), 1);
    }

    #[test]
    fn test_verify_unknown_token() {
        let state = FairState::new();
        assert_eq!(verify(&state, "nope"), Err(PassError::InvalidToken));
    }

    #[test]
    fn test_pass_payload_requires_confirmed_and_issued() {
        let (mut state, reservation_id) = confirmed_reservation();

        // Issued yet? No -> NotIssued
        assert!(matches!(
            pass_payload(&state, &reservation_id),
            Err(PassError::NotIssued { .. })
        ));

        let issued = issue(&mut state, &reservation_id).unwrap().unwrap();
        assert_eq!(
            pass_payload(&state, &reservation_id).unwrap(),
            issued.pass.token()
        );

        // A pending reservation has no pass image
        booking::update_status(&mut state, &reservation_id, "pending").unwrap();
        assert!(matches!(
            pass_payload(&state, &reservation_id),
            Err(PassError::NotConfirmed { .. })
        ));
    }
}
