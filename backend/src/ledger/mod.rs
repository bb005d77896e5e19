//! Stall Ledger
//!
//! The single source of truth for stall availability. Every stall status
//! transition in the system goes through this module, so there is exactly
//! one auditable, lockable path from "is this stall free" to "this stall is
//! now held".
//!
//! # Allocation Flow
//!
//! ```text
//! Vendor request ──> Reservation Engine ──> reserve_atomically
//!                                               │
//!                                    check ALL stalls exist
//!                                    check ALL stalls available
//!                                    then flip ALL to Reserved
//! ```
//!
//! # Critical Invariants
//!
//! - **Atomicity**: `reserve_atomically` validates every stall before
//!   mutating any; no partial reservation is ever observable
//! - **Single writer**: only this module writes stall status
//! - **Idempotent release**: releasing an available stall is a no-op
//! - **Lifecycle ownership**: `Reserved` is entered and left only through
//!   the reservation lifecycle, never by the operator path

use crate::models::stall::{Stall, StallError, StallSize, StallStatus};
use crate::models::state::FairState;
use thiserror::Error;

/// Errors that can occur during ledger operations
#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("stall not found: {id}")]
    StallNotFound { id: String },

    #[error("stall code already exists: {code}")]
    CodeAlreadyExists { code: String },

    #[error("stall error: {0}")]
    Stall(#[from] StallError),

    #[error("stall {code} is held by a live reservation; release it through the reservation lifecycle")]
    HeldByLiveReservation { code: String },

    #[error("stall {code} cannot be set to {to:?} by hand; that status is managed by the reservation lifecycle")]
    ManualReserve { code: String, to: StallStatus },

    #[error("stall {code} is part of a confirmed reservation and cannot be deleted")]
    ConfirmedReservation { code: String },
}

/// Create a stall with a unique code. New stalls start `Available`.
pub fn create_stall(
    state: &mut FairState,
    code: String,
    size: StallSize,
    price: i64,
) -> Result<Stall, LedgerError> {
    if state.stall_by_code(&code).is_some() {
        return Err(LedgerError::CodeAlreadyExists { code });
    }

    let stall = Stall::new(code, size, price);
    let snapshot = stall.clone();
    state.add_stall(stall);
    Ok(snapshot)
}

/// Atomically reserve a set of stalls for a reservation.
///
/// As a single unit this either binds **all** requested stalls to
/// `reservation_id` or binds none of them:
///
/// 1. Fails with `StallNotFound` if any id does not exist
/// 2. Fails with `StallError::NotAvailable` naming the first
///    non-available stall encountered
/// 3. Otherwise transitions all stalls to `Reserved` and returns them
///
/// This is the anti-double-booking primitive: the availability check and
/// the status write happen under the same `&mut FairState` borrow, so no
/// other caller can observe a half-applied allocation.
pub fn reserve_atomically(
    state: &mut FairState,
    stall_ids: &[String],
    reservation_id: &str,
) -> Result<Vec<Stall>, LedgerError> {
    // Validate everything up front; no mutation happens past this loop
    // unless every stall is allocatable.
    for id in stall_ids {
        let stall = state
            .get_stall(id)
            .ok_or_else(|| LedgerError::StallNotFound { id: id.clone() })?;

        if !stall.is_available() {
            return Err(StallError::NotAvailable {
                code: stall.code().to_string(),
                status: stall.status(),
            }
            .into());
        }
    }

    let mut reserved = Vec::with_capacity(stall_ids.len());
    for id in stall_ids {
        // Existence and availability were checked above under the same
        // borrow, so these lookups cannot fail.
        let stall = state
            .get_stall_mut(id)
            .ok_or_else(|| LedgerError::StallNotFound { id: id.clone() })?;
        stall.mark_reserved(reservation_id)?;
        reserved.push(stall.clone());
    }

    Ok(reserved)
}

/// Release stalls back to `Available` and clear their bindings.
///
/// Idempotent: already-available or no-longer-existing stalls are skipped.
pub fn release(state: &mut FairState, stall_ids: &[String]) {
    for id in stall_ids {
        if let Some(stall) = state.get_stall_mut(id) {
            stall.release();
        }
    }
}

/// Operator path: set a stall's status by hand.
///
/// A stall held by a live (Pending/Confirmed) reservation cannot be
/// overwritten; the booking must be released through the reservation
/// lifecycle first. Setting `Reserved` by hand is never allowed; with no
/// owning reservation it would break the `Reserved ⇔ live reservation`
/// invariant.
pub fn set_status(
    state: &mut FairState,
    stall_id: &str,
    new_status: StallStatus,
) -> Result<Stall, LedgerError> {
    let live = stall_live_reservation(state, stall_id)?;
    let stall = state
        .get_stall_mut(stall_id)
        .ok_or_else(|| LedgerError::StallNotFound {
            id: stall_id.to_string(),
        })?;

    if live {
        if new_status == StallStatus::Reserved {
            // Re-asserting the current truth is a no-op, not an error.
            return Ok(stall.clone());
        }
        return Err(LedgerError::HeldByLiveReservation {
            code: stall.code().to_string(),
        });
    }

    if new_status == StallStatus::Reserved {
        return Err(LedgerError::ManualReserve {
            code: stall.code().to_string(),
            to: new_status,
        });
    }

    stall.set_status(new_status);
    Ok(stall.clone())
}

/// Update a stall's code, size and price (status is handled by
/// [`set_status`]).
pub fn update_stall(
    state: &mut FairState,
    stall_id: &str,
    code: String,
    size: StallSize,
    price: i64,
) -> Result<Stall, LedgerError> {
    let stall = state
        .get_stall(stall_id)
        .ok_or_else(|| LedgerError::StallNotFound {
            id: stall_id.to_string(),
        })?;

    if stall.code() != code && state.stall_by_code(&code).is_some() {
        return Err(LedgerError::CodeAlreadyExists { code });
    }

    state.update_stall_attributes(stall_id, code, size, price);
    Ok(state
        .get_stall(stall_id)
        .expect("stall disappeared during update")
        .clone())
}

/// Delete a stall.
///
/// Fails when the stall belongs to a confirmed reservation (paid bookings
/// are protected from silent removal). A stall under a merely Pending
/// reservation may be force-deleted; it is detached from the reservation's
/// stall set so read projections stay fully hydrated.
pub fn delete_stall(state: &mut FairState, stall_id: &str) -> Result<(), LedgerError> {
    let stall = state
        .get_stall(stall_id)
        .ok_or_else(|| LedgerError::StallNotFound {
            id: stall_id.to_string(),
        })?;
    let code = stall.code().to_string();
    let bound_reservation = stall.reservation_id().map(str::to_string);

    if let Some(reservation_id) = bound_reservation {
        if let Some(reservation) = state.get_reservation(&reservation_id) {
            use crate::models::reservation::ReservationStatus;
            if reservation.status() == ReservationStatus::Confirmed {
                return Err(LedgerError::ConfirmedReservation { code });
            }
        }
        if let Some(reservation) = state.get_reservation_mut(&reservation_id) {
            reservation.detach_stall(stall_id);
        }
    }

    state.remove_stall(stall_id);
    Ok(())
}

/// Look up a single stall.
pub fn get_stall(state: &FairState, stall_id: &str) -> Result<Stall, LedgerError> {
    state
        .get_stall(stall_id)
        .cloned()
        .ok_or_else(|| LedgerError::StallNotFound {
            id: stall_id.to_string(),
        })
}

/// All stalls, ordered by code for stable listings.
pub fn list_stalls(state: &FairState) -> Vec<Stall> {
    let mut stalls: Vec<Stall> = state.stalls().values().cloned().collect();
    stalls.sort_by(|a, b| a.code().cmp(b.code()));
    stalls
}

/// Stalls currently open for allocation.
pub fn list_available(state: &FairState) -> Vec<Stall> {
    let mut stalls: Vec<Stall> = state
        .stalls()
        .values()
        .filter(|s| s.is_available())
        .cloned()
        .collect();
    stalls.sort_by(|a, b| a.code().cmp(b.code()));
    stalls
}

/// Stalls of a given size category.
pub fn list_by_size(state: &FairState, size: StallSize) -> Vec<Stall> {
    let mut stalls: Vec<Stall> = state
        .stalls()
        .values()
        .filter(|s| s.size() == size)
        .cloned()
        .collect();
    stalls.sort_by(|a, b| a.code().cmp(b.code()));
    stalls
}

/// Is the stall bound to a Pending/Confirmed reservation?
fn stall_live_reservation(state: &FairState, stall_id: &str) -> Result<bool, LedgerError> {
    let stall = state
        .get_stall(stall_id)
        .ok_or_else(|| LedgerError::StallNotFound {
            id: stall_id.to_string(),
        })?;

    Ok(stall
        .reservation_id()
        .and_then(|id| state.get_reservation(id))
        .map(|r| r.is_live())
        .unwrap_or(false))
}
