//! Reservation model
//!
//! A vendor's claim on 1-3 stalls, tracked through a payment-gated
//! lifecycle:
//!
//! ```text
//! PENDING ──> CONFIRMED ──> CANCELLED
//!    │
//!    ├──────> CANCELLED
//!    └──────> REJECTED
//! ```
//!
//! The reservation exclusively owns its stall set while Pending or
//! Confirmed; ownership returns to the ledger on Cancelled/Rejected or
//! deletion. `total_amount` is computed once at creation from the
//! constituent stall prices and never changes afterwards.
//!
//! CRITICAL: All money values are i64 (cents)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Reservation lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationStatus {
    /// Created, awaiting payment settlement
    Pending,

    /// Payment settled successfully
    Confirmed,

    /// Released by the vendor or an operator; stalls returned to the pool
    Cancelled,

    /// Declined by an operator; stalls returned to the pool
    Rejected,
}

/// Error for parsing a status name supplied by a caller
#[derive(Debug, Error, PartialEq)]
#[error("unrecognized reservation status: {0}")]
pub struct ParseStatusError(pub String);

impl FromStr for ReservationStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "CONFIRMED" => Ok(Self::Confirmed),
            "CANCELLED" => Ok(Self::Cancelled),
            "REJECTED" => Ok(Self::Rejected),
            other => Err(ParseStatusError(other.to_string())),
        }
    }
}

/// A vendor's claim on a set of stalls
///
/// # Example
/// ```
/// use bookfair_core_rs::models::{Reservation, ReservationStatus};
///
/// let reservation = Reservation::new(
///     "res-1".to_string(),
///     "vendor-1".to_string(),
///     vec!["stall-a".to_string(), "stall-b".to_string()],
///     25_000,
/// );
///
/// assert_eq!(reservation.status(), ReservationStatus::Pending);
/// assert_eq!(reservation.total_amount(), 25_000);
/// assert_eq!(reservation.stall_count(), 2);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    /// Unique reservation identifier (UUID)
    id: String,

    /// Owning vendor
    vendor_id: String,

    /// Stalls held by this reservation (1-3)
    stall_ids: Vec<String>,

    /// Sum of constituent stall prices at creation time (i64 cents)
    total_amount: i64,

    /// Creation timestamp
    created_at: DateTime<Utc>,

    /// Current lifecycle status
    status: ReservationStatus,
}

impl Reservation {
    /// Create a new reservation in `Pending` state.
    ///
    /// The id is minted by the caller so the ledger can bind stalls to it
    /// before the record is persisted.
    pub fn new(id: String, vendor_id: String, stall_ids: Vec<String>, total_amount: i64) -> Self {
        Self {
            id,
            vendor_id,
            stall_ids,
            total_amount,
            created_at: Utc::now(),
            status: ReservationStatus::Pending,
        }
    }

    /// Get reservation ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get owning vendor ID
    pub fn vendor_id(&self) -> &str {
        &self.vendor_id
    }

    /// Get the held stall ids
    pub fn stall_ids(&self) -> &[String] {
        &self.stall_ids
    }

    /// Number of stalls held
    pub fn stall_count(&self) -> usize {
        self.stall_ids.len()
    }

    /// Get total amount (i64 cents)
    pub fn total_amount(&self) -> i64 {
        self.total_amount
    }

    /// Get creation timestamp
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Get current status
    pub fn status(&self) -> ReservationStatus {
        self.status
    }

    /// Counts against the vendor quota: every status except Cancelled.
    pub fn is_active(&self) -> bool {
        self.status != ReservationStatus::Cancelled
    }

    /// Holds its stalls: Pending or Confirmed.
    pub fn is_live(&self) -> bool {
        matches!(
            self.status,
            ReservationStatus::Pending | ReservationStatus::Confirmed
        )
    }

    /// Set the lifecycle status (guards live in booking/settlement).
    pub(crate) fn set_status(&mut self, status: ReservationStatus) {
        self.status = status;
    }

    /// Remove a stall from the held set (stall force-deleted by an admin).
    pub(crate) fn detach_stall(&mut self, stall_id: &str) {
        self.stall_ids.retain(|id| id != stall_id);
    }
}
