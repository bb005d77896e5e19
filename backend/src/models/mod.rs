//! Domain models for the book fair

pub mod pass;
pub mod payment;
pub mod reservation;
pub mod stall;
pub mod state;
pub mod vendor;

// Re-exports
pub use pass::EntryPass;
pub use payment::{ParseMethodError, Payment, PaymentMethod, PaymentStatus, PaymentUpdate};
pub use reservation::{ParseStatusError, Reservation, ReservationStatus};
pub use stall::{Stall, StallError, StallSize, StallStatus};
pub use state::FairState;
pub use vendor::Vendor;
