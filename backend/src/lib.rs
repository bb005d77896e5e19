//! Bookfair Core - Stall Allocation & Payment Settlement Engine
//!
//! The engine behind a book-fair stall reservation system: vendors reserve
//! physical stalls, pay by cash or through an external gateway, and receive
//! a verifiable entry pass.
//!
//! # Architecture
//!
//! - **models**: Domain types (Stall, Reservation, Payment, EntryPass,
//!   Vendor) and the `FairState` system-of-record
//! - **ledger**: Stall availability; the single choke-point for stall
//!   status transitions
//! - **booking**: Reservation lifecycle and the vendor quota gate
//! - **settlement**: Payment lifecycle and method-strategy dispatch
//! - **passes**: Entry pass issuance and gate verification
//! - **events**: Append-only audit log of domain events
//! - **engine**: The facade owning the state lock and collaborators
//!
//! # Critical Invariants
//!
//! 1. All money values are i64 (cents)
//! 2. A stall is never held by two live reservations
//! 3. At most one payment and one pass per reservation
//! 4. No lock is held across an external gateway call

// Module declarations
pub mod booking;
pub mod engine;
pub mod events;
pub mod ledger;
pub mod models;
pub mod passes;
pub mod settlement;

// Re-exports for convenience
pub use booking::{BookingError, BookingLimits, ReservationView};
pub use engine::{Engine, EngineConfig};
pub use events::{Event, EventLog};
pub use ledger::LedgerError;
pub use models::{
    pass::EntryPass,
    payment::{Payment, PaymentMethod, PaymentStatus, PaymentUpdate},
    reservation::{Reservation, ReservationStatus},
    stall::{Stall, StallError, StallSize, StallStatus},
    state::FairState,
    vendor::Vendor,
};
pub use passes::{PassError, PassNotifier, PassRenderer, ReservationSummary};
pub use settlement::{
    CaptureOutcome, GatewayError, GatewayOrder, InitiateOutcome, PaymentProvider,
    ProviderRegistry, SandboxMode, SandboxProvider, SettlementError,
};
