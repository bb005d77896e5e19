//! Reservation Engine
//!
//! Creates and manages vendor reservations against the stall ledger under
//! the allocation protocol:
//!
//! 1. A reservation holds 1-3 stalls
//! 2. A vendor's stall total across non-Cancelled reservations is bounded
//!    by the configured quota
//! 3. Allocation is all-or-nothing (`ledger::reserve_atomically`)
//! 4. The total amount is the sum of constituent stall prices, computed
//!    once at creation
//!
//! The quota check and the allocation must be evaluated under the same
//! `&mut FairState` borrow; the engine facade guarantees that borrow is one
//! write-lock scope, so two concurrent requests from the same vendor cannot
//! both pass the gate.

use crate::ledger::{self, LedgerError};
use crate::models::reservation::{ParseStatusError, Reservation, ReservationStatus};
use crate::models::state::FairState;
use crate::models::vendor::Vendor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during reservation operations
#[derive(Debug, Error, PartialEq)]
pub enum BookingError {
    #[error("a reservation must hold between 1 and {max} stalls")]
    InvalidStallCount { max: usize },

    #[error("vendor not found: {0}")]
    VendorNotFound(String),

    #[error("vendor email already registered: {0}")]
    EmailAlreadyRegistered(String),

    #[error("reservation not found: {0}")]
    ReservationNotFound(String),

    #[error("vendor {vendor} would hold {requested} stalls; the limit is {quota}")]
    QuotaExceeded {
        vendor: String,
        requested: usize,
        quota: usize,
    },

    #[error(transparent)]
    UnknownStatus(#[from] ParseStatusError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Allocation bounds enforced by the engine
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BookingLimits {
    /// Maximum stalls per single reservation
    pub per_reservation: usize,

    /// Maximum stalls a vendor may hold across non-Cancelled reservations
    pub per_vendor: usize,
}

impl Default for BookingLimits {
    fn default() -> Self {
        Self {
            per_reservation: 3,
            per_vendor: 3,
        }
    }
}

/// Fully-hydrated reservation projection.
///
/// Read operations resolve stall codes eagerly so callers never see a
/// partially-hydrated reservation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationView {
    pub reservation_id: String,
    pub vendor_id: String,
    pub stall_codes: Vec<String>,
    pub total_amount: i64,
    pub reservation_date: DateTime<Utc>,
    pub status: ReservationStatus,
}

impl ReservationView {
    fn project(state: &FairState, reservation: &Reservation) -> Self {
        let stall_codes = reservation
            .stall_ids()
            .iter()
            .filter_map(|id| state.get_stall(id))
            .map(|s| s.code().to_string())
            .collect();

        Self {
            reservation_id: reservation.id().to_string(),
            vendor_id: reservation.vendor_id().to_string(),
            stall_codes,
            total_amount: reservation.total_amount(),
            reservation_date: reservation.created_at(),
            status: reservation.status(),
        }
    }
}

/// Register a vendor in the directory.
pub fn register_vendor(
    state: &mut FairState,
    email: String,
    business_name: String,
) -> Result<Vendor, BookingError> {
    if state.vendor_by_email(&email).is_some() {
        return Err(BookingError::EmailAlreadyRegistered(email));
    }

    let vendor = Vendor::new(email, business_name);
    let snapshot = vendor.clone();
    state.add_vendor(vendor);
    Ok(snapshot)
}

/// Create a reservation for a vendor over a set of stalls.
///
/// Validates the stall count, gates on the vendor quota, then allocates
/// through [`ledger::reserve_atomically`]; ledger failures propagate
/// unchanged. The whole sequence runs under one `&mut FairState` borrow.
pub fn create_reservation(
    state: &mut FairState,
    vendor_id: &str,
    stall_ids: &[String],
    limits: &BookingLimits,
) -> Result<ReservationView, BookingError> {
    // Duplicate ids in the request collapse to a set.
    let mut requested: Vec<String> = Vec::with_capacity(stall_ids.len());
    for id in stall_ids {
        if !requested.contains(id) {
            requested.push(id.clone());
        }
    }

    if requested.is_empty() || requested.len() > limits.per_reservation {
        return Err(BookingError::InvalidStallCount {
            max: limits.per_reservation,
        });
    }

    let vendor = state
        .get_vendor(vendor_id)
        .ok_or_else(|| BookingError::VendorNotFound(vendor_id.to_string()))?;
    let vendor_email = vendor.email().to_string();

    let active = state.vendor_active_stall_count(vendor_id);
    if active + requested.len() > limits.per_vendor {
        return Err(BookingError::QuotaExceeded {
            vendor: vendor_email,
            requested: active + requested.len(),
            quota: limits.per_vendor,
        });
    }

    // Mint the id first so the ledger can bind stalls to it.
    let reservation_id = uuid::Uuid::new_v4().to_string();
    let stalls = ledger::reserve_atomically(state, &requested, &reservation_id)?;
    let total_amount: i64 = stalls.iter().map(|s| s.price()).sum();

    let reservation = Reservation::new(
        reservation_id,
        vendor_id.to_string(),
        requested,
        total_amount,
    );
    let view = ReservationView::project(state, &reservation);
    state.add_reservation(reservation);
    Ok(view)
}

/// Cancel a reservation, releasing its stalls in the same transaction.
///
/// Idempotent: cancelling an already-Cancelled reservation is a no-op that
/// returns the current state.
pub fn cancel_reservation(
    state: &mut FairState,
    reservation_id: &str,
) -> Result<ReservationView, BookingError> {
    let reservation = state
        .get_reservation(reservation_id)
        .ok_or_else(|| BookingError::ReservationNotFound(reservation_id.to_string()))?;

    if reservation.status() == ReservationStatus::Cancelled {
        return Ok(ReservationView::project(state, reservation));
    }

    let stall_ids: Vec<String> = reservation.stall_ids().to_vec();
    ledger::release(state, &stall_ids);

    let reservation = state
        .get_reservation_mut(reservation_id)
        .expect("reservation disappeared during cancel");
    reservation.set_status(ReservationStatus::Cancelled);

    let reservation = state
        .get_reservation(reservation_id)
        .expect("reservation disappeared during cancel");
    Ok(ReservationView::project(state, reservation))
}

/// Admin override: set a reservation's status by name.
///
/// `Cancelled` delegates to [`cancel_reservation`]. `Rejected` releases the
/// stall set as well: an admin rejection forfeits the hold, and leaving
/// stalls Reserved under a Rejected reservation would break the ledger
/// invariant. `Pending`/`Confirmed` set the status directly without
/// touching stall bindings; confirmation normally flows through settlement.
pub fn update_status(
    state: &mut FairState,
    reservation_id: &str,
    target: &str,
) -> Result<ReservationView, BookingError> {
    let target: ReservationStatus = target.parse()?;

    if state.get_reservation(reservation_id).is_none() {
        return Err(BookingError::ReservationNotFound(
            reservation_id.to_string(),
        ));
    }

    match target {
        ReservationStatus::Cancelled => cancel_reservation(state, reservation_id),
        ReservationStatus::Rejected => {
            let stall_ids: Vec<String> = state
                .get_reservation(reservation_id)
                .map(|r| r.stall_ids().to_vec())
                .unwrap_or_default();
            ledger::release(state, &stall_ids);

            let reservation = state
                .get_reservation_mut(reservation_id)
                .expect("reservation disappeared during status update");
            reservation.set_status(ReservationStatus::Rejected);

            let reservation = state
                .get_reservation(reservation_id)
                .expect("reservation disappeared during status update");
            Ok(ReservationView::project(state, reservation))
        }
        status => {
            let reservation = state
                .get_reservation_mut(reservation_id)
                .expect("reservation disappeared during status update");
            reservation.set_status(status);

            let reservation = state
                .get_reservation(reservation_id)
                .expect("reservation disappeared during status update");
            Ok(ReservationView::project(state, reservation))
        }
    }
}

/// Destructive admin removal: releases stalls regardless of status, drops
/// the pass, removes the record. Payment rows are retained for audit.
pub fn delete_reservation(
    state: &mut FairState,
    reservation_id: &str,
) -> Result<(), BookingError> {
    let reservation = state
        .get_reservation(reservation_id)
        .ok_or_else(|| BookingError::ReservationNotFound(reservation_id.to_string()))?;

    let stall_ids: Vec<String> = reservation.stall_ids().to_vec();
    ledger::release(state, &stall_ids);
    state.remove_pass_for_reservation(reservation_id);
    state.remove_reservation(reservation_id);
    Ok(())
}

/// Look up a single reservation, fully hydrated.
pub fn get_reservation(
    state: &FairState,
    reservation_id: &str,
) -> Result<ReservationView, BookingError> {
    state
        .get_reservation(reservation_id)
        .map(|r| ReservationView::project(state, r))
        .ok_or_else(|| BookingError::ReservationNotFound(reservation_id.to_string()))
}

/// All reservations, newest first.
pub fn list_reservations(state: &FairState) -> Vec<ReservationView> {
    let mut views: Vec<ReservationView> = state
        .reservations()
        .values()
        .map(|r| ReservationView::project(state, r))
        .collect();
    views.sort_by(|a, b| b.reservation_date.cmp(&a.reservation_date));
    views
}

/// A vendor's reservations, newest first.
pub fn list_by_vendor(state: &FairState, vendor_id: &str) -> Vec<ReservationView> {
    let mut views: Vec<ReservationView> = state
        .vendor_reservations(vendor_id)
        .into_iter()
        .map(|r| ReservationView::project(state, r))
        .collect();
    views.sort_by(|a, b| b.reservation_date.cmp(&a.reservation_date));
    views
}
