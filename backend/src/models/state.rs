//! Fair state
//!
//! The complete in-memory state of one book fair: vendors, stalls,
//! reservations, payments and entry passes, plus the uniqueness indexes
//! that back the storage-layer constraints (stall code, vendor email, pass
//! token, one payment per reservation).
//!
//! All mutation flows through the component modules (`ledger`, `booking`,
//! `settlement`, `passes`); this struct only offers mechanical accessors
//! and keeps its indexes consistent. Uniqueness violations are checked by
//! the components first and return typed errors there; the `assert!`s here
//! guard against programming errors, not user input.
//!
//! # Critical Invariants
//!
//! 1. **No double booking**: a stall is `Reserved` iff exactly one live
//!    (Pending/Confirmed) reservation holds it
//! 2. **Quota**: a vendor's stall total across non-Cancelled reservations
//!    never exceeds the configured quota
//! 3. **Payment uniqueness**: at most one payment per reservation
//! 4. **Index validity**: every index entry points at an existing record

use crate::models::pass::EntryPass;
use crate::models::payment::Payment;
use crate::models::reservation::Reservation;
use crate::models::stall::{Stall, StallSize, StallStatus};
use crate::models::vendor::Vendor;
use std::collections::HashMap;

/// Complete state of the fair
#[derive(Debug, Clone, Default)]
pub struct FairState {
    /// Registered vendors, indexed by ID
    vendors: HashMap<String, Vendor>,

    /// Vendor email -> vendor ID
    vendor_email_index: HashMap<String, String>,

    /// All stalls, indexed by ID
    stalls: HashMap<String, Stall>,

    /// Stall code -> stall ID
    stall_code_index: HashMap<String, String>,

    /// All reservations, indexed by ID
    reservations: HashMap<String, Reservation>,

    /// All payments, indexed by ID
    payments: HashMap<String, Payment>,

    /// Reservation ID -> payment ID (enforces the 1:1 payment invariant)
    payment_by_reservation: HashMap<String, String>,

    /// All entry passes, indexed by ID
    passes: HashMap<String, EntryPass>,

    /// Pass token -> pass ID
    pass_token_index: HashMap<String, String>,

    /// Reservation ID -> pass ID (enforces at-most-one pass)
    pass_by_reservation: HashMap<String, String>,
}

impl FairState {
    /// Create an empty fair
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Vendors
    // ------------------------------------------------------------------

    /// Add a vendor
    ///
    /// # Panics
    /// Panics if the vendor ID or email is already present (components
    /// check email uniqueness first).
    pub fn add_vendor(&mut self, vendor: Vendor) {
        assert!(
            !self.vendors.contains_key(vendor.id()),
            "vendor ID {} already exists",
            vendor.id()
        );
        assert!(
            !self.vendor_email_index.contains_key(vendor.email()),
            "vendor email {} already registered",
            vendor.email()
        );
        self.vendor_email_index
            .insert(vendor.email().to_string(), vendor.id().to_string());
        self.vendors.insert(vendor.id().to_string(), vendor);
    }

    pub fn get_vendor(&self, id: &str) -> Option<&Vendor> {
        self.vendors.get(id)
    }

    pub fn vendor_by_email(&self, email: &str) -> Option<&Vendor> {
        self.vendor_email_index
            .get(email)
            .and_then(|id| self.vendors.get(id))
    }

    pub fn num_vendors(&self) -> usize {
        self.vendors.len()
    }

    // ------------------------------------------------------------------
    // Stalls
    // ------------------------------------------------------------------

    /// Add a stall
    ///
    /// # Panics
    /// Panics if the stall ID or code is already present (the ledger checks
    /// code uniqueness first).
    pub fn add_stall(&mut self, stall: Stall) {
        assert!(
            !self.stalls.contains_key(stall.id()),
            "stall ID {} already exists",
            stall.id()
        );
        assert!(
            !self.stall_code_index.contains_key(stall.code()),
            "stall code {} already exists",
            stall.code()
        );
        self.stall_code_index
            .insert(stall.code().to_string(), stall.id().to_string());
        self.stalls.insert(stall.id().to_string(), stall);
    }

    pub fn get_stall(&self, id: &str) -> Option<&Stall> {
        self.stalls.get(id)
    }

    pub fn get_stall_mut(&mut self, id: &str) -> Option<&mut Stall> {
        self.stalls.get_mut(id)
    }

    pub fn stall_by_code(&self, code: &str) -> Option<&Stall> {
        self.stall_code_index
            .get(code)
            .and_then(|id| self.stalls.get(id))
    }

    pub fn stalls(&self) -> &HashMap<String, Stall> {
        &self.stalls
    }

    pub fn num_stalls(&self) -> usize {
        self.stalls.len()
    }

    /// Overwrite a stall's attributes, keeping the code index in step.
    ///
    /// # Panics
    /// Panics if the stall does not exist or the new code belongs to a
    /// different stall (the ledger checks both first).
    pub(crate) fn update_stall_attributes(
        &mut self,
        stall_id: &str,
        code: String,
        size: StallSize,
        price: i64,
    ) {
        if let Some(owner) = self.stall_code_index.get(&code) {
            assert!(owner == stall_id, "stall code {} already exists", code);
        }
        let stall = self
            .stalls
            .get_mut(stall_id)
            .unwrap_or_else(|| panic!("stall {} does not exist", stall_id));
        self.stall_code_index.remove(stall.code());
        self.stall_code_index
            .insert(code.clone(), stall_id.to_string());
        stall.set_attributes(code, size, price);
    }

    /// Remove a stall, returning it if present.
    pub(crate) fn remove_stall(&mut self, id: &str) -> Option<Stall> {
        let stall = self.stalls.remove(id)?;
        self.stall_code_index.remove(stall.code());
        Some(stall)
    }

    // ------------------------------------------------------------------
    // Reservations
    // ------------------------------------------------------------------

    /// Add a reservation
    ///
    /// # Panics
    /// Panics if the reservation ID already exists.
    pub fn add_reservation(&mut self, reservation: Reservation) {
        assert!(
            !self.reservations.contains_key(reservation.id()),
            "reservation ID {} already exists",
            reservation.id()
        );
        self.reservations
            .insert(reservation.id().to_string(), reservation);
    }

    pub fn get_reservation(&self, id: &str) -> Option<&Reservation> {
        self.reservations.get(id)
    }

    pub fn get_reservation_mut(&mut self, id: &str) -> Option<&mut Reservation> {
        self.reservations.get_mut(id)
    }

    pub fn reservations(&self) -> &HashMap<String, Reservation> {
        &self.reservations
    }

    pub fn num_reservations(&self) -> usize {
        self.reservations.len()
    }

    pub(crate) fn remove_reservation(&mut self, id: &str) -> Option<Reservation> {
        self.reservations.remove(id)
    }

    /// A vendor's reservations, unordered.
    pub fn vendor_reservations(&self, vendor_id: &str) -> Vec<&Reservation> {
        self.reservations
            .values()
            .filter(|r| r.vendor_id() == vendor_id)
            .collect()
    }

    /// Stall total across the vendor's non-Cancelled reservations.
    ///
    /// This is the quantity the quota gate bounds.
    pub fn vendor_active_stall_count(&self, vendor_id: &str) -> usize {
        self.reservations
            .values()
            .filter(|r| r.vendor_id() == vendor_id && r.is_active())
            .map(Reservation::stall_count)
            .sum()
    }

    // ------------------------------------------------------------------
    // Payments
    // ------------------------------------------------------------------

    /// Add a payment
    ///
    /// # Panics
    /// Panics if the payment ID exists or the reservation already has a
    /// payment (settlement checks the 1:1 guard first).
    pub fn add_payment(&mut self, payment: Payment) {
        assert!(
            !self.payments.contains_key(payment.id()),
            "payment ID {} already exists",
            payment.id()
        );
        assert!(
            !self
                .payment_by_reservation
                .contains_key(payment.reservation_id()),
            "reservation {} already has a payment",
            payment.reservation_id()
        );
        self.payment_by_reservation.insert(
            payment.reservation_id().to_string(),
            payment.id().to_string(),
        );
        self.payments.insert(payment.id().to_string(), payment);
    }

    pub fn get_payment(&self, id: &str) -> Option<&Payment> {
        self.payments.get(id)
    }

    pub fn get_payment_mut(&mut self, id: &str) -> Option<&mut Payment> {
        self.payments.get_mut(id)
    }

    pub fn payment_for_reservation(&self, reservation_id: &str) -> Option<&Payment> {
        self.payment_by_reservation
            .get(reservation_id)
            .and_then(|id| self.payments.get(id))
    }

    pub fn payments(&self) -> &HashMap<String, Payment> {
        &self.payments
    }

    pub fn num_payments(&self) -> usize {
        self.payments.len()
    }

    pub(crate) fn remove_payment(&mut self, id: &str) -> Option<Payment> {
        let payment = self.payments.remove(id)?;
        self.payment_by_reservation
            .remove(payment.reservation_id());
        Some(payment)
    }

    // ------------------------------------------------------------------
    // Entry passes
    // ------------------------------------------------------------------

    /// Add a pass
    ///
    /// # Panics
    /// Panics if the pass ID, token or reservation binding already exists
    /// (issuance checks the at-most-one guard first).
    pub fn add_pass(&mut self, pass: EntryPass) {
        assert!(
            !self.passes.contains_key(pass.id()),
            "pass ID {} already exists",
            pass.id()
        );
        assert!(
            !self.pass_token_index.contains_key(pass.token()),
            "pass token collision"
        );
        assert!(
            !self.pass_by_reservation.contains_key(pass.reservation_id()),
            "reservation {} already has a pass",
            pass.reservation_id()
        );
        self.pass_token_index
            .insert(pass.token().to_string(), pass.id().to_string());
        self.pass_by_reservation
            .insert(pass.reservation_id().to_string(), pass.id().to_string());
        self.passes.insert(pass.id().to_string(), pass);
    }

    pub fn pass_by_token(&self, token: &str) -> Option<&EntryPass> {
        self.pass_token_index
            .get(token)
            .and_then(|id| self.passes.get(id))
    }

    pub fn pass_for_reservation(&self, reservation_id: &str) -> Option<&EntryPass> {
        self.pass_by_reservation
            .get(reservation_id)
            .and_then(|id| self.passes.get(id))
    }

    pub fn num_passes(&self) -> usize {
        self.passes.len()
    }

    pub(crate) fn remove_pass_for_reservation(
        &mut self,
        reservation_id: &str,
    ) -> Option<EntryPass> {
        let pass_id = self.pass_by_reservation.remove(reservation_id)?;
        let pass = self.passes.remove(&pass_id)?;
        self.pass_token_index.remove(pass.token());
        Some(pass)
    }

    // ------------------------------------------------------------------
    // Invariant auditing (used by tests and the property sweep)
    // ------------------------------------------------------------------

    /// Check the cross-entity invariants, returning a description of every
    /// violation found. An empty vector means the state is consistent.
    pub fn invariant_violations(&self, vendor_quota: usize) -> Vec<String> {
        let mut violations = Vec::new();

        // Stall side: Reserved iff bound to exactly one live reservation.
        for stall in self.stalls.values() {
            match (stall.status(), stall.reservation_id()) {
                (StallStatus::Reserved, Some(reservation_id)) => {
                    match self.reservations.get(reservation_id) {
                        Some(r) if r.is_live() => {}
                        Some(r) => violations.push(format!(
                            "stall {} reserved by non-live reservation {} ({:?})",
                            stall.code(),
                            reservation_id,
                            r.status()
                        )),
                        None => violations.push(format!(
                            "stall {} bound to missing reservation {}",
                            stall.code(),
                            reservation_id
                        )),
                    }
                }
                (StallStatus::Reserved, None) => {
                    violations.push(format!("stall {} reserved but unbound", stall.code()));
                }
                (_, Some(reservation_id)) => violations.push(format!(
                    "stall {} bound to {} while {:?}",
                    stall.code(),
                    reservation_id,
                    stall.status()
                )),
                (_, None) => {}
            }
        }

        // Reservation side: at most one live holder per stall.
        let mut live_holders: HashMap<&str, usize> = HashMap::new();
        for reservation in self.reservations.values().filter(|r| r.is_live()) {
            for stall_id in reservation.stall_ids() {
                *live_holders.entry(stall_id.as_str()).or_default() += 1;
            }
        }
        for (stall_id, holders) in live_holders {
            if holders > 1 {
                violations.push(format!(
                    "stall {} held by {} live reservations",
                    stall_id, holders
                ));
            }
        }

        // Vendor quota.
        for vendor in self.vendors.values() {
            let held = self.vendor_active_stall_count(vendor.id());
            if held > vendor_quota {
                violations.push(format!(
                    "vendor {} holds {} stalls (quota {})",
                    vendor.email(),
                    held,
                    vendor_quota
                ));
            }
        }

        violations
    }
}
