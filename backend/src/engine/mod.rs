//! Engine facade
//!
//! Owns the fair state and every collaborator handle, and exposes the
//! public operation set the HTTP adapter (or any other surface) calls.
//!
//! # Transaction discipline
//!
//! The state lives behind one `RwLock`; **one public operation is one lock
//! scope**. Checking and writing inside the same write-lock scope is what
//! makes the allocation protocol safe: the quota gate and the atomic stall
//! reservation observe the same snapshot, and two racing requests
//! serialize so exactly one wins.
//!
//! No lock is ever held across a provider network call:
//!
//! - gateway initiation quotes the amount under a read lock, drops it,
//!   then calls the provider
//! - gateway confirmation captures first and re-validates the state in a
//!   short write-lock commit step afterwards
//! - pass delivery (render + mail) runs after the write lock is released
//!   and is best-effort

use crate::booking::{self, BookingError, BookingLimits, ReservationView};
use crate::events::{Event, EventLog};
use crate::ledger::{self, LedgerError};
use crate::models::payment::{Payment, PaymentMethod, PaymentUpdate};
use crate::models::stall::{Stall, StallSize, StallStatus};
use crate::models::state::FairState;
use crate::models::vendor::Vendor;
use crate::passes::{self, delivery, PassError, PassNotifier, PassRenderer, ReservationSummary};
use crate::settlement::{
    self, GatewayConfirmCheck, InitiateOutcome, ProviderRegistry, SandboxMode, SandboxProvider,
    SettlementError,
};
use chrono::Utc;
use std::sync::{Arc, Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Complete engine configuration
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Allocation bounds (stalls per reservation, stalls per vendor)
    pub limits: BookingLimits,
}

/// The stall-allocation and payment-settlement engine.
///
/// # Example
///
/// ```
/// use bookfair_core_rs::engine::Engine;
/// use bookfair_core_rs::models::StallSize;
///
/// let engine = Engine::with_defaults();
/// engine
///     .register_vendor("vendor@fair.test", "Vendor Books")
///     .unwrap();
/// let stall = engine
///     .create_stall("A-01", StallSize::Medium, 15_000)
///     .unwrap();
/// let reservation = engine
///     .create_reservation("vendor@fair.test", &[stall.id().to_string()])
///     .unwrap();
/// assert_eq!(reservation.total_amount, 15_000);
/// ```
pub struct Engine {
    config: EngineConfig,
    state: RwLock<FairState>,
    providers: ProviderRegistry,
    renderer: Arc<dyn PassRenderer>,
    notifier: Arc<dyn PassNotifier>,
    events: Mutex<EventLog>,
}

impl Engine {
    /// Create an engine with explicit collaborators.
    pub fn new(
        config: EngineConfig,
        providers: ProviderRegistry,
        renderer: Arc<dyn PassRenderer>,
        notifier: Arc<dyn PassNotifier>,
    ) -> Self {
        Self {
            config,
            state: RwLock::new(FairState::new()),
            providers,
            renderer,
            notifier,
            events: Mutex::new(EventLog::new()),
        }
    }

    /// Development wiring: approving sandbox gateway, plain-text renderer,
    /// logging notifier.
    pub fn with_defaults() -> Self {
        let mut providers = ProviderRegistry::new();
        providers.register(Arc::new(SandboxProvider::new(SandboxMode::Approve)));
        Self::new(
            EngineConfig::default(),
            providers,
            Arc::new(passes::PlainTextRenderer),
            Arc::new(passes::LoggingNotifier),
        )
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Vendors
    // ------------------------------------------------------------------

    pub fn register_vendor(
        &self,
        email: &str,
        business_name: &str,
    ) -> Result<Vendor, BookingError> {
        let mut state = self.write_state();
        let vendor =
            booking::register_vendor(&mut state, email.to_string(), business_name.to_string())?;
        drop(state);

        self.record(Event::VendorRegistered {
            at: Utc::now(),
            vendor_id: vendor.id().to_string(),
        });
        Ok(vendor)
    }

    pub fn get_vendor(&self, vendor_id: &str) -> Result<Vendor, BookingError> {
        self.read_state()
            .get_vendor(vendor_id)
            .cloned()
            .ok_or_else(|| BookingError::VendorNotFound(vendor_id.to_string()))
    }

    // ------------------------------------------------------------------
    // Stalls (ledger surface)
    // ------------------------------------------------------------------

    pub fn create_stall(
        &self,
        code: &str,
        size: StallSize,
        price: i64,
    ) -> Result<Stall, LedgerError> {
        let mut state = self.write_state();
        let stall = ledger::create_stall(&mut state, code.to_string(), size, price)?;
        drop(state);

        self.record(Event::StallCreated {
            at: Utc::now(),
            stall_id: stall.id().to_string(),
            code: stall.code().to_string(),
        });
        Ok(stall)
    }

    pub fn get_stall(&self, stall_id: &str) -> Result<Stall, LedgerError> {
        ledger::get_stall(&self.read_state(), stall_id)
    }

    pub fn list_stalls(&self) -> Vec<Stall> {
        ledger::list_stalls(&self.read_state())
    }

    pub fn list_available_stalls(&self) -> Vec<Stall> {
        ledger::list_available(&self.read_state())
    }

    pub fn stalls_by_size(&self, size: StallSize) -> Vec<Stall> {
        ledger::list_by_size(&self.read_state(), size)
    }

    pub fn update_stall(
        &self,
        stall_id: &str,
        code: &str,
        size: StallSize,
        price: i64,
    ) -> Result<Stall, LedgerError> {
        let mut state = self.write_state();
        ledger::update_stall(&mut state, stall_id, code.to_string(), size, price)
    }

    pub fn set_stall_status(
        &self,
        stall_id: &str,
        status: StallStatus,
    ) -> Result<Stall, LedgerError> {
        let mut state = self.write_state();
        let stall = ledger::set_status(&mut state, stall_id, status)?;
        drop(state);

        self.record(Event::StallStatusSet {
            at: Utc::now(),
            stall_id: stall.id().to_string(),
            status: format!("{:?}", stall.status()),
        });
        Ok(stall)
    }

    pub fn delete_stall(&self, stall_id: &str) -> Result<(), LedgerError> {
        let mut state = self.write_state();
        ledger::delete_stall(&mut state, stall_id)?;
        drop(state);

        self.record(Event::StallDeleted {
            at: Utc::now(),
            stall_id: stall_id.to_string(),
        });
        Ok(())
    }

    // ------------------------------------------------------------------
    // Reservations
    // ------------------------------------------------------------------

    /// Create a reservation for the vendor identified by email.
    ///
    /// The email resolution, quota gate and atomic allocation all run
    /// inside one write-lock scope.
    pub fn create_reservation(
        &self,
        vendor_email: &str,
        stall_ids: &[String],
    ) -> Result<ReservationView, BookingError> {
        let mut state = self.write_state();
        let vendor_id = state
            .vendor_by_email(vendor_email)
            .map(|v| v.id().to_string())
            .ok_or_else(|| BookingError::VendorNotFound(vendor_email.to_string()))?;

        let view =
            booking::create_reservation(&mut state, &vendor_id, stall_ids, &self.config.limits)?;
        drop(state);

        self.record(Event::ReservationCreated {
            at: Utc::now(),
            reservation_id: view.reservation_id.clone(),
            vendor_id,
            stall_count: view.stall_codes.len(),
            total_amount: view.total_amount,
        });
        Ok(view)
    }

    /// Cancel a reservation, releasing its stalls synchronously.
    ///
    /// Idempotent: cancelling an already-Cancelled reservation returns the
    /// current state.
    pub fn cancel_reservation(&self, reservation_id: &str) -> Result<ReservationView, BookingError> {
        let mut state = self.write_state();
        let view = booking::cancel_reservation(&mut state, reservation_id)?;
        drop(state);

        self.record(Event::ReservationStatusChanged {
            at: Utc::now(),
            reservation_id: reservation_id.to_string(),
            status: format!("{:?}", view.status),
        });
        Ok(view)
    }

    pub fn update_reservation_status(
        &self,
        reservation_id: &str,
        target: &str,
    ) -> Result<ReservationView, BookingError> {
        let mut state = self.write_state();
        let view = booking::update_status(&mut state, reservation_id, target)?;
        drop(state);

        self.record(Event::ReservationStatusChanged {
            at: Utc::now(),
            reservation_id: reservation_id.to_string(),
            status: format!("{:?}", view.status),
        });
        Ok(view)
    }

    pub fn delete_reservation(&self, reservation_id: &str) -> Result<(), BookingError> {
        let mut state = self.write_state();
        booking::delete_reservation(&mut state, reservation_id)?;
        drop(state);

        self.record(Event::ReservationDeleted {
            at: Utc::now(),
            reservation_id: reservation_id.to_string(),
        });
        Ok(())
    }

    pub fn get_reservation(&self, reservation_id: &str) -> Result<ReservationView, BookingError> {
        booking::get_reservation(&self.read_state(), reservation_id)
    }

    pub fn list_reservations(&self) -> Vec<ReservationView> {
        booking::list_reservations(&self.read_state())
    }

    pub fn reservations_by_vendor(&self, vendor_id: &str) -> Vec<ReservationView> {
        booking::list_by_vendor(&self.read_state(), vendor_id)
    }

    // ------------------------------------------------------------------
    // Payments (settlement surface)
    // ------------------------------------------------------------------

    /// Initiate payment for a reservation.
    ///
    /// Cash records a Pending payment immediately. Gateway quotes the
    /// amount under a read lock, releases it, then asks the provider for
    /// an order; the redirect payload goes back to the caller and no
    /// payment row exists until confirmation.
    pub fn process_payment(
        &self,
        reservation_id: &str,
        method: PaymentMethod,
    ) -> Result<InitiateOutcome, SettlementError> {
        match method {
            PaymentMethod::Cash => {
                let mut state = self.write_state();
                let payment = settlement::initiate_cash(&mut state, reservation_id)?;
                drop(state);

                self.record(Event::PaymentRecorded {
                    at: Utc::now(),
                    payment_id: payment.id().to_string(),
                    reservation_id: reservation_id.to_string(),
                    amount: payment.amount(),
                    status: format!("{:?}", payment.status()),
                });
                Ok(InitiateOutcome::Payment(payment))
            }
            method => {
                let amount = settlement::prepare_gateway(&self.read_state(), reservation_id)?;

                let provider = self
                    .providers
                    .get(method)
                    .ok_or(SettlementError::UnsupportedMethod { method })?;
                // Network call with no lock held.
                let order = provider.initiate(amount)?;
                Ok(InitiateOutcome::Redirect(order))
            }
        }
    }

    /// Confirm a cash payment. Idempotent under retry.
    pub fn confirm_cash_payment(&self, payment_id: &str) -> Result<Payment, SettlementError> {
        let mut state = self.write_state();
        let (payment, issued) = settlement::confirm_cash(&mut state, payment_id)?;
        drop(state);

        if let Some(issued) = &issued {
            self.record(Event::PaymentConfirmed {
                at: Utc::now(),
                payment_id: payment.id().to_string(),
                reservation_id: payment.reservation_id().to_string(),
            });
            self.record(Event::PassIssued {
                at: Utc::now(),
                pass_id: issued.pass.id().to_string(),
                reservation_id: payment.reservation_id().to_string(),
            });
            delivery::deliver(self.renderer.as_ref(), self.notifier.as_ref(), issued);
        }
        Ok(payment)
    }

    /// Confirm a gateway payment given the external order reference.
    ///
    /// The capture round-trip happens before the write lock is taken; the
    /// commit step re-validates, so a retried webhook is a safe no-op.
    pub fn confirm_gateway_payment(
        &self,
        external_ref: &str,
        method: PaymentMethod,
        reservation_id: &str,
    ) -> Result<Payment, SettlementError> {
        if method == PaymentMethod::Cash {
            return Err(SettlementError::CashViaGateway);
        }

        // Pre-capture check: an already-settled reservation never reaches
        // the provider a second time.
        match settlement::check_gateway_confirm(&self.read_state(), reservation_id)? {
            GatewayConfirmCheck::AlreadySettled(payment) => return Ok(payment),
            GatewayConfirmCheck::Proceed { .. } => {}
        }

        let provider = self
            .providers
            .get(method)
            .ok_or(SettlementError::UnsupportedMethod { method })?;
        // Network call with no lock held; provider faults propagate as
        // GatewayError and leave no payment row behind.
        let outcome = provider.capture(external_ref)?;

        let mut state = self.write_state();
        let (payment, issued) =
            settlement::apply_gateway_capture(&mut state, reservation_id, external_ref, outcome)?;
        drop(state);

        self.record(Event::PaymentRecorded {
            at: Utc::now(),
            payment_id: payment.id().to_string(),
            reservation_id: reservation_id.to_string(),
            amount: payment.amount(),
            status: format!("{:?}", payment.status()),
        });
        if let Some(issued) = &issued {
            self.record(Event::PaymentConfirmed {
                at: Utc::now(),
                payment_id: payment.id().to_string(),
                reservation_id: reservation_id.to_string(),
            });
            self.record(Event::PassIssued {
                at: Utc::now(),
                pass_id: issued.pass.id().to_string(),
                reservation_id: reservation_id.to_string(),
            });
            delivery::deliver(self.renderer.as_ref(), self.notifier.as_ref(), issued);
        }
        Ok(payment)
    }

    pub fn update_payment(
        &self,
        payment_id: &str,
        update: &PaymentUpdate,
    ) -> Result<Payment, SettlementError> {
        let mut state = self.write_state();
        settlement::update_payment(&mut state, payment_id, update)
    }

    pub fn delete_payment(&self, payment_id: &str) -> Result<(), SettlementError> {
        let mut state = self.write_state();
        settlement::delete_payment(&mut state, payment_id)?;
        drop(state);

        self.record(Event::PaymentDeleted {
            at: Utc::now(),
            payment_id: payment_id.to_string(),
        });
        Ok(())
    }

    pub fn get_payment(&self, payment_id: &str) -> Result<Payment, SettlementError> {
        settlement::get_payment(&self.read_state(), payment_id)
    }

    pub fn list_payments(&self) -> Vec<Payment> {
        settlement::list_payments(&self.read_state())
    }

    pub fn payments_by_vendor(&self, vendor_id: &str) -> Vec<Payment> {
        settlement::list_by_vendor(&self.read_state(), vendor_id)
    }

    // ------------------------------------------------------------------
    // Passes
    // ------------------------------------------------------------------

    /// Verify a token presented at the gate. Repeatable, side-effect-free.
    pub fn verify_pass(&self, token: &str) -> Result<ReservationSummary, PassError> {
        passes::verify(&self.read_state(), token)
    }

    /// Re-render the pass image for a confirmed reservation (out-of-band
    /// resend path).
    pub fn pass_image(&self, reservation_id: &str) -> Result<Vec<u8>, PassError> {
        let payload = passes::pass_payload(&self.read_state(), reservation_id)?;
        // Rendering happens with no lock held.
        Ok(self.renderer.render(&payload)?)
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Number of audit events recorded so far.
    pub fn event_count(&self) -> usize {
        self.events.lock().expect("event log lock poisoned").len()
    }

    /// Snapshot of the audit log.
    pub fn events_snapshot(&self) -> Vec<Event> {
        self.events
            .lock()
            .expect("event log lock poisoned")
            .events()
            .to_vec()
    }

    /// Audit the cross-entity invariants (used by tests).
    pub fn invariant_violations(&self) -> Vec<String> {
        self.read_state()
            .invariant_violations(self.config.limits.per_vendor)
    }

    fn read_state(&self) -> RwLockReadGuard<'_, FairState> {
        self.state.read().expect("state lock poisoned")
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, FairState> {
        self.state.write().expect("state lock poisoned")
    }

    fn record(&self, event: Event) {
        self.events
            .lock()
            .expect("event log lock poisoned")
            .record(event);
    }
}
