//! Payment Settlement
//!
//! Tracks exactly one payment per reservation, dispatches to a
//! payment-method strategy (cash vs. external gateway) and reconciles the
//! reservation/stall state with the payment outcome.
//!
//! # Settlement Flow
//!
//! ```text
//! Vendor ──> initiate ──┬─ CASH ───> Payment (Pending) ──> confirm_cash
//! (res.)                └─ GATEWAY > provider.initiate ──> redirect payload
//!                                        │
//!                       vendor completes the external handshake
//!                                        │
//!                        provider.capture (no state lock held)
//!                                        │
//!                            apply_gateway_capture
//!                          ┌─ Captured: Payment Success, reservation
//!                          │            Confirmed, pass issued
//!                          └─ Declined: Payment Failed, reservation stays
//!                                       Pending, stalls stay Reserved
//! ```
//!
//! # Critical Invariants
//!
//! - **One payment per reservation**: a second `initiate` is a conflict
//! - **Idempotent confirmation**: re-confirming a Success payment is a
//!   no-op; no double pass, no double notification
//! - **Failure is not forfeiture**: a declined charge leaves the
//!   reservation Pending and its stalls Reserved so the vendor can retry
//! - **Gateway faults are distinguishable**: an unreachable provider
//!   surfaces as [`GatewayError`], never as a Failed payment row

pub mod provider;
pub mod sandbox;

// Re-export public API
pub use provider::{CaptureOutcome, GatewayError, GatewayOrder, PaymentProvider, ProviderRegistry};
pub use sandbox::{SandboxMode, SandboxProvider};

use crate::models::payment::{Payment, PaymentMethod, PaymentStatus, PaymentUpdate};
use crate::models::reservation::ReservationStatus;
use crate::models::state::FairState;
use crate::passes::{self, IssuedPass, PassError};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur during settlement operations
#[derive(Debug, Error, PartialEq)]
pub enum SettlementError {
    #[error("reservation not found: {0}")]
    ReservationNotFound(String),

    #[error("payment not found: {0}")]
    PaymentNotFound(String),

    #[error("reservation {reservation_id} already has a payment")]
    PaymentAlreadyExists { reservation_id: String },

    #[error("reservation {reservation_id} is {status:?} and cannot take a payment")]
    ReservationNotPayable {
        reservation_id: String,
        status: ReservationStatus,
    },

    #[error("payment {payment_id} was not made in cash; use the gateway confirmation path")]
    NotACashPayment { payment_id: String },

    #[error("cash payments are confirmed through the cash confirmation path")]
    CashViaGateway,

    #[error("no payment provider registered for {method:?}")]
    UnsupportedMethod { method: PaymentMethod },

    #[error("payment {payment_id} is {status:?}; only failed payments may be purged")]
    AuditRetention {
        payment_id: String,
        status: PaymentStatus,
    },

    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("pass error: {0}")]
    Pass(#[from] PassError),
}

/// What `initiate` hands back to the caller.
///
/// Cash produces a pending payment row immediately; the gateway produces a
/// redirect payload for the external handshake and no payment row until
/// confirmation (abandoned gateway sessions leave nothing behind).
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum InitiateOutcome {
    Payment(Payment),
    Redirect(GatewayOrder),
}

/// Pre-capture disposition for a gateway confirmation.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayConfirmCheck {
    /// The reservation already settled; skip the capture entirely.
    AlreadySettled(Payment),

    /// Proceed with capture for this amount.
    Proceed { amount: i64 },
}

/// Record a cash payment for a reservation.
///
/// The payment starts Pending; the reservation stays Pending until an
/// operator physically confirms the cash through [`confirm_cash`].
pub fn initiate_cash(
    state: &mut FairState,
    reservation_id: &str,
) -> Result<Payment, SettlementError> {
    let amount = payable_amount(state, reservation_id)?;

    let payment = Payment::new_cash(reservation_id.to_string(), amount);
    let snapshot = payment.clone();
    state.add_payment(payment);

    tracing::info!(
        reservation_id,
        payment_id = snapshot.id(),
        amount,
        "cash payment recorded, awaiting confirmation"
    );
    Ok(snapshot)
}

/// Validate a gateway initiation and quote the amount to charge.
///
/// Read-only: the provider's `initiate` runs with no state lock held, so
/// the caller fetches the amount here first and performs the network call
/// afterwards. No payment row is created until confirmation.
pub fn prepare_gateway(
    state: &FairState,
    reservation_id: &str,
) -> Result<i64, SettlementError> {
    payable_amount(state, reservation_id)
}

/// Confirm a cash payment: payment Success, reservation Confirmed, pass
/// issued exactly once.
///
/// Idempotent under retry: confirming an already-Success payment returns
/// it unchanged with no pass re-issue.
pub fn confirm_cash(
    state: &mut FairState,
    payment_id: &str,
) -> Result<(Payment, Option<IssuedPass>), SettlementError> {
    let payment = state
        .get_payment(payment_id)
        .ok_or_else(|| SettlementError::PaymentNotFound(payment_id.to_string()))?;

    if payment.method() != PaymentMethod::Cash {
        return Err(SettlementError::NotACashPayment {
            payment_id: payment_id.to_string(),
        });
    }

    if payment.status() == PaymentStatus::Success {
        // Retried confirmation: safe no-op.
        return Ok((payment.clone(), None));
    }

    let reservation_id = payment.reservation_id().to_string();
    let reservation = state
        .get_reservation(&reservation_id)
        .ok_or_else(|| SettlementError::ReservationNotFound(reservation_id.clone()))?;

    if !reservation.is_live() {
        return Err(SettlementError::ReservationNotPayable {
            reservation_id: reservation_id.clone(),
            status: reservation.status(),
        });
    }

    state
        .get_payment_mut(payment_id)
        .expect("payment disappeared during confirmation")
        .mark_success();
    state
        .get_reservation_mut(&reservation_id)
        .expect("reservation disappeared during confirmation")
        .set_status(ReservationStatus::Confirmed);

    let issued = passes::issue(state, &reservation_id)?;
    let payment = state
        .get_payment(payment_id)
        .expect("payment disappeared during confirmation")
        .clone();

    tracing::info!(reservation_id, payment_id, "cash payment confirmed");
    Ok((payment, issued))
}

/// Pre-capture check for a gateway confirmation.
///
/// Runs read-only before the capture network call: an already-Success
/// payment short-circuits (no second charge attempt), a Pending cash
/// payment conflicts, a Failed row or no row proceeds.
pub fn check_gateway_confirm(
    state: &FairState,
    reservation_id: &str,
) -> Result<GatewayConfirmCheck, SettlementError> {
    let reservation = state
        .get_reservation(reservation_id)
        .ok_or_else(|| SettlementError::ReservationNotFound(reservation_id.to_string()))?;

    match state.payment_for_reservation(reservation_id) {
        Some(p) if p.status() == PaymentStatus::Success => {
            return Ok(GatewayConfirmCheck::AlreadySettled(p.clone()));
        }
        Some(p) if p.status() == PaymentStatus::Pending => {
            return Err(SettlementError::PaymentAlreadyExists {
                reservation_id: reservation_id.to_string(),
            });
        }
        _ => {}
    }

    if !reservation.is_live() {
        return Err(SettlementError::ReservationNotPayable {
            reservation_id: reservation_id.to_string(),
            status: reservation.status(),
        });
    }

    Ok(GatewayConfirmCheck::Proceed {
        amount: reservation.total_amount(),
    })
}

/// Apply a gateway capture outcome to the reservation.
///
/// Re-validates inside the caller's write-lock scope (state may have moved
/// while the capture ran): an already-Success payment is a no-op, a Failed
/// row from an earlier attempt is overwritten by this one, and a Pending
/// cash row conflicts. On `Captured` the payment is recorded Success, the
/// reservation confirmed and the pass issued; on `Declined` the payment is
/// recorded Failed and the reservation keeps its Pending hold.
pub fn apply_gateway_capture(
    state: &mut FairState,
    reservation_id: &str,
    external_ref: &str,
    outcome: CaptureOutcome,
) -> Result<(Payment, Option<IssuedPass>), SettlementError> {
    let amount = match check_gateway_confirm(state, reservation_id)? {
        GatewayConfirmCheck::AlreadySettled(payment) => return Ok((payment, None)),
        GatewayConfirmCheck::Proceed { amount } => amount,
    };

    // A Failed attempt is superseded by this one; 1:1 stays intact.
    if let Some(stale) = state
        .payment_for_reservation(reservation_id)
        .map(|p| p.id().to_string())
    {
        state.remove_payment(&stale);
    }

    match outcome {
        CaptureOutcome::Captured => {
            let payment = Payment::new_gateway(
                reservation_id.to_string(),
                amount,
                external_ref.to_string(),
                PaymentStatus::Success,
            );
            let snapshot = payment.clone();
            state.add_payment(payment);
            state
                .get_reservation_mut(reservation_id)
                .expect("reservation disappeared during capture")
                .set_status(ReservationStatus::Confirmed);

            let issued = passes::issue(state, reservation_id)?;
            tracing::info!(
                reservation_id,
                external_ref,
                amount,
                "gateway payment captured"
            );
            Ok((snapshot, issued))
        }
        CaptureOutcome::Declined { reason } => {
            let payment = Payment::new_gateway(
                reservation_id.to_string(),
                amount,
                external_ref.to_string(),
                PaymentStatus::Failed,
            );
            let snapshot = payment.clone();
            state.add_payment(payment);

            // The hold is not forfeited: reservation stays Pending,
            // stalls stay Reserved, the vendor may retry or pay cash.
            tracing::warn!(reservation_id, external_ref, reason, "gateway declined charge");
            Ok((snapshot, None))
        }
    }
}

/// Admin audit path: partial update of a payment row.
pub fn update_payment(
    state: &mut FairState,
    payment_id: &str,
    update: &PaymentUpdate,
) -> Result<Payment, SettlementError> {
    let payment = state
        .get_payment_mut(payment_id)
        .ok_or_else(|| SettlementError::PaymentNotFound(payment_id.to_string()))?;

    payment.apply_update(update);
    Ok(payment.clone())
}

/// Admin audit path: purge a payment row. Only Failed rows may go.
pub fn delete_payment(state: &mut FairState, payment_id: &str) -> Result<(), SettlementError> {
    let payment = state
        .get_payment(payment_id)
        .ok_or_else(|| SettlementError::PaymentNotFound(payment_id.to_string()))?;

    if !payment.is_purgeable() {
        return Err(SettlementError::AuditRetention {
            payment_id: payment_id.to_string(),
            status: payment.status(),
        });
    }

    state.remove_payment(payment_id);
    Ok(())
}

/// Look up a single payment.
pub fn get_payment(state: &FairState, payment_id: &str) -> Result<Payment, SettlementError> {
    state
        .get_payment(payment_id)
        .cloned()
        .ok_or_else(|| SettlementError::PaymentNotFound(payment_id.to_string()))
}

/// All payments, newest first.
pub fn list_payments(state: &FairState) -> Vec<Payment> {
    let mut payments: Vec<Payment> = state.payments().values().cloned().collect();
    payments.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    payments
}

/// A vendor's payments across all their reservations, newest first.
pub fn list_by_vendor(state: &FairState, vendor_id: &str) -> Vec<Payment> {
    let mut payments: Vec<Payment> = state
        .payments()
        .values()
        .filter(|p| {
            state
                .get_reservation(p.reservation_id())
                .map(|r| r.vendor_id() == vendor_id)
                .unwrap_or(false)
        })
        .cloned()
        .collect();
    payments.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    payments
}

/// Shared initiation guards: reservation exists, is payable, has no
/// payment yet. Returns the amount to charge.
fn payable_amount(state: &FairState, reservation_id: &str) -> Result<i64, SettlementError> {
    let reservation = state
        .get_reservation(reservation_id)
        .ok_or_else(|| SettlementError::ReservationNotFound(reservation_id.to_string()))?;

    if reservation.status() != ReservationStatus::Pending {
        return Err(SettlementError::ReservationNotPayable {
            reservation_id: reservation_id.to_string(),
            status: reservation.status(),
        });
    }

    if state.payment_for_reservation(reservation_id).is_some() {
        return Err(SettlementError::PaymentAlreadyExists {
            reservation_id: reservation_id.to_string(),
        });
    }

    Ok(reservation.total_amount())
}
