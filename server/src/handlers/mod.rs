//! HTTP handlers, grouped by resource. Thin by design: parse, delegate to
//! the engine, map the result.

pub mod payments;
pub mod qr;
pub mod reservations;
pub mod stalls;
pub mod vendors;
