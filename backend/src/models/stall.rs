//! Stall model
//!
//! Represents a physical exhibition booth at the fair.
//! Each stall has:
//! - A unique human-readable code (e.g. "A-01")
//! - A size category and a price
//! - An availability status
//! - A weak back-reference to the reservation currently holding it
//!
//! CRITICAL: All money values are i64 (cents)

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Stall size category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StallSize {
    Small,
    Medium,
    Large,
}

/// Stall availability status
///
/// `Reserved` is owned by the reservation lifecycle: a stall is `Reserved`
/// exactly when it belongs to a reservation that is Pending or Confirmed.
/// `Maintenance` and `Blocked` are operator-set states that keep a stall out
/// of the allocatable pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StallStatus {
    /// Free to be allocated
    Available,

    /// Held by a live (Pending or Confirmed) reservation
    Reserved,

    /// Taken out of the pool for upkeep
    Maintenance,

    /// Administratively withheld
    Blocked,
}

/// Errors that can occur during stall-level operations
#[derive(Debug, Error, PartialEq)]
pub enum StallError {
    #[error("stall {code} is not available (status {status:?})")]
    NotAvailable { code: String, status: StallStatus },
}

/// A physical booth inventory unit
///
/// # Example
/// ```
/// use bookfair_core_rs::models::{Stall, StallSize, StallStatus};
///
/// let stall = Stall::new("A-01".to_string(), StallSize::Medium, 15_000);
/// assert_eq!(stall.code(), "A-01");
/// assert_eq!(stall.status(), StallStatus::Available);
/// assert!(stall.is_available());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stall {
    /// Unique stall identifier (UUID)
    id: String,

    /// Unique human-readable code
    code: String,

    /// Size category
    size: StallSize,

    /// Price for the fair duration (i64 cents)
    price: i64,

    /// Current availability status
    status: StallStatus,

    /// Reservation currently holding this stall, if any
    ///
    /// Weak reference: the reservation owns the relationship; this field
    /// only supports stall-to-reservation lookup and is maintained by the
    /// ledger alongside `status`.
    reservation_id: Option<String>,
}

impl Stall {
    /// Create a new stall. New stalls start `Available` and unbound.
    pub fn new(code: String, size: StallSize, price: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            code,
            size,
            price,
            status: StallStatus::Available,
            reservation_id: None,
        }
    }

    /// Get stall ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get stall code
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Get size category
    pub fn size(&self) -> StallSize {
        self.size
    }

    /// Get price (i64 cents)
    pub fn price(&self) -> i64 {
        self.price
    }

    /// Get current status
    pub fn status(&self) -> StallStatus {
        self.status
    }

    /// Get the reservation currently holding this stall, if any
    pub fn reservation_id(&self) -> Option<&str> {
        self.reservation_id.as_deref()
    }

    /// Check if the stall can be allocated
    pub fn is_available(&self) -> bool {
        self.status == StallStatus::Available
    }

    /// Transition to `Reserved`, binding the holding reservation.
    ///
    /// Fails if the stall is not `Available`; no state changes occur on the
    /// error path.
    pub(crate) fn mark_reserved(&mut self, reservation_id: &str) -> Result<(), StallError> {
        if self.status != StallStatus::Available {
            return Err(StallError::NotAvailable {
                code: self.code.clone(),
                status: self.status,
            });
        }

        self.status = StallStatus::Reserved;
        self.reservation_id = Some(reservation_id.to_string());
        Ok(())
    }

    /// Return the stall to `Available` and clear its binding.
    ///
    /// Idempotent: releasing an already-available stall is a no-op.
    pub(crate) fn release(&mut self) {
        self.status = StallStatus::Available;
        self.reservation_id = None;
    }

    /// Set the status directly (operator path; guards live in the ledger).
    pub(crate) fn set_status(&mut self, status: StallStatus) {
        self.status = status;
    }

    /// Overwrite code/size/price attributes (uniqueness checked by the ledger).
    pub(crate) fn set_attributes(&mut self, code: String, size: StallSize, price: i64) {
        self.code = code;
        self.size = size;
        self.price = price;
    }
}
