//! Domain event logging for auditing.
//!
//! Every state change the engine commits appends an event here, so an
//! operator can reconstruct what happened to any stall, reservation or
//! payment and when. The log is append-only and in memory; it is not a
//! replay mechanism, just the audit trail behind admin tooling.

use chrono::{DateTime, Utc};

/// A recorded state change.
///
/// All events carry their commit timestamp for temporal ordering.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A stall entered the inventory
    StallCreated {
        at: DateTime<Utc>,
        stall_id: String,
        code: String,
    },

    /// Operator changed a stall's status by hand
    StallStatusSet {
        at: DateTime<Utc>,
        stall_id: String,
        status: String,
    },

    /// A stall left the inventory
    StallDeleted {
        at: DateTime<Utc>,
        stall_id: String,
    },

    /// A vendor registered
    VendorRegistered {
        at: DateTime<Utc>,
        vendor_id: String,
    },

    /// A reservation was created and its stalls bound
    ReservationCreated {
        at: DateTime<Utc>,
        reservation_id: String,
        vendor_id: String,
        stall_count: usize,
        total_amount: i64,
    },

    /// A reservation changed status (cancel, reject, admin override)
    ReservationStatusChanged {
        at: DateTime<Utc>,
        reservation_id: String,
        status: String,
    },

    /// A reservation was force-deleted
    ReservationDeleted {
        at: DateTime<Utc>,
        reservation_id: String,
    },

    /// A payment row was created (cash initiation or gateway capture)
    PaymentRecorded {
        at: DateTime<Utc>,
        payment_id: String,
        reservation_id: String,
        amount: i64,
        status: String,
    },

    /// A payment reached Success and the reservation confirmed
    PaymentConfirmed {
        at: DateTime<Utc>,
        payment_id: String,
        reservation_id: String,
    },

    /// A payment row was purged by the audit path
    PaymentDeleted {
        at: DateTime<Utc>,
        payment_id: String,
    },

    /// An entry pass was minted
    PassIssued {
        at: DateTime<Utc>,
        pass_id: String,
        reservation_id: String,
    },
}

impl Event {
    /// Commit timestamp of the event
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::StallCreated { at, .. }
            | Event::StallStatusSet { at, .. }
            | Event::StallDeleted { at, .. }
            | Event::VendorRegistered { at, .. }
            | Event::ReservationCreated { at, .. }
            | Event::ReservationStatusChanged { at, .. }
            | Event::ReservationDeleted { at, .. }
            | Event::PaymentRecorded { at, .. }
            | Event::PaymentConfirmed { at, .. }
            | Event::PaymentDeleted { at, .. }
            | Event::PassIssued { at, .. } => *at,
        }
    }
}

/// Append-only audit log
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event
    pub fn record(&mut self, event: Event) {
        self.events.push(event);
    }

    /// All recorded events, oldest first
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
