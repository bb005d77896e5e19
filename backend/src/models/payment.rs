//! Payment model
//!
//! Exactly one payment may exist per reservation (enforced by the state
//! index). The amount is copied from the reservation at creation and never
//! independently mutated. Status transitions flow only through settlement;
//! a payment is never deleted while Pending or Success (audit retention).
//!
//! CRITICAL: All money values are i64 (cents)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// How the vendor pays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Settled in person; confirmed by an operator once cash is received
    Cash,

    /// Settled through the external payment gateway
    Gateway,
}

/// Error for parsing a method name supplied by a caller
#[derive(Debug, Error, PartialEq)]
#[error("unrecognized payment method: {0}")]
pub struct ParseMethodError(pub String);

impl FromStr for PaymentMethod {
    type Err = ParseMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CASH" => Ok(Self::Cash),
            "GATEWAY" => Ok(Self::Gateway),
            other => Err(ParseMethodError(other.to_string())),
        }
    }
}

/// Payment outcome status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// Recorded but not yet settled (cash awaiting physical confirmation)
    Pending,

    /// Money received; the reservation is confirmable
    Success,

    /// The gateway declined the charge; the reservation stays Pending
    Failed,
}

/// Partial update applied by the admin audit path.
///
/// Only supplied fields are applied; unspecified fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentUpdate {
    pub amount: Option<i64>,
    pub method: Option<PaymentMethod>,
    pub status: Option<PaymentStatus>,
}

/// A payment attached to a reservation
///
/// # Example
/// ```
/// use bookfair_core_rs::models::{Payment, PaymentMethod, PaymentStatus};
///
/// let payment = Payment::new_cash("res-1".to_string(), 25_000);
/// assert_eq!(payment.method(), PaymentMethod::Cash);
/// assert_eq!(payment.status(), PaymentStatus::Pending);
/// assert_eq!(payment.transaction_ref(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Unique payment identifier (UUID)
    id: String,

    /// Owning reservation (1:1)
    reservation_id: String,

    /// Amount copied from the reservation at creation (i64 cents)
    amount: i64,

    /// Payment method
    method: PaymentMethod,

    /// External gateway transaction reference (None for cash)
    transaction_ref: Option<String>,

    /// Current status
    status: PaymentStatus,

    /// Creation timestamp
    created_at: DateTime<Utc>,
}

impl Payment {
    /// Create a cash payment awaiting physical confirmation.
    pub fn new_cash(reservation_id: String, amount: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            reservation_id,
            amount,
            method: PaymentMethod::Cash,
            transaction_ref: None,
            status: PaymentStatus::Pending,
            created_at: Utc::now(),
        }
    }

    /// Create a gateway payment from a capture outcome.
    ///
    /// Gateway payments are only persisted at confirmation time, so they are
    /// born with their terminal capture status (Success or Failed).
    pub fn new_gateway(
        reservation_id: String,
        amount: i64,
        transaction_ref: String,
        status: PaymentStatus,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            reservation_id,
            amount,
            method: PaymentMethod::Gateway,
            transaction_ref: Some(transaction_ref),
            status,
            created_at: Utc::now(),
        }
    }

    /// Get payment ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get owning reservation ID
    pub fn reservation_id(&self) -> &str {
        &self.reservation_id
    }

    /// Get amount (i64 cents)
    pub fn amount(&self) -> i64 {
        self.amount
    }

    /// Get payment method
    pub fn method(&self) -> PaymentMethod {
        self.method
    }

    /// Get external transaction reference, if any
    pub fn transaction_ref(&self) -> Option<&str> {
        self.transaction_ref.as_deref()
    }

    /// Get current status
    pub fn status(&self) -> PaymentStatus {
        self.status
    }

    /// Get creation timestamp
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Only Failed payments may be purged from the audit trail.
    pub fn is_purgeable(&self) -> bool {
        self.status == PaymentStatus::Failed
    }

    /// Mark the payment settled.
    pub(crate) fn mark_success(&mut self) {
        self.status = PaymentStatus::Success;
    }

    /// Apply a partial admin update; untouched fields keep their values.
    pub(crate) fn apply_update(&mut self, update: &PaymentUpdate) {
        if let Some(amount) = update.amount {
            self.amount = amount;
        }
        if let Some(method) = update.method {
            self.method = method;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
    }
}
