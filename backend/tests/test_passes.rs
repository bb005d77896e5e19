//! Pass issuance and gate verification tests.

use bookfair_core_rs::passes::{
    NotifyError, PassNotifier, PlainTextRenderer, RenderError, ReservationSummary,
};
use bookfair_core_rs::{
    Engine, EngineConfig, InitiateOutcome, PassError, PassRenderer, PaymentMethod,
    PaymentStatus, ProviderRegistry, ReservationStatus, SandboxMode, SandboxProvider, StallSize,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct CountingNotifier {
    sent: AtomicUsize,
}

impl PassNotifier for CountingNotifier {
    fn send(
        &self,
        _recipient: &str,
        _image: &[u8],
        _summary: &ReservationSummary,
    ) -> Result<(), NotifyError> {
        self.sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Renderer that always fails, for the best-effort delivery path.
struct BrokenRenderer;

impl PassRenderer for BrokenRenderer {
    fn render(&self, _payload: &str) -> Result<Vec<u8>, RenderError> {
        Err(RenderError("encoder offline".to_string()))
    }
}

fn engine_with_renderer(
    renderer: Arc<dyn PassRenderer>,
) -> (Engine, Arc<CountingNotifier>) {
    let notifier = Arc::new(CountingNotifier::default());
    let mut providers = ProviderRegistry::new();
    providers.register(Arc::new(SandboxProvider::new(SandboxMode::Approve)));
    let engine = Engine::new(
        EngineConfig::default(),
        providers,
        renderer,
        notifier.clone(),
    );
    (engine, notifier)
}

fn confirmed_reservation(engine: &Engine) -> String {
    engine
        .register_vendor("vendor@fair.test", "Vendor Books")
        .unwrap();
    let stall = engine
        .create_stall("A-01", StallSize::Small, 100)
        .unwrap();
    let reservation = engine
        .create_reservation("vendor@fair.test", &[stall.id().to_string()])
        .unwrap();
    let payment = match engine
        .process_payment(&reservation.reservation_id, PaymentMethod::Cash)
        .unwrap()
    {
        InitiateOutcome::Payment(p) => p,
        InitiateOutcome::Redirect(_) => panic!("cash must not redirect"),
    };
    let confirmed = engine.confirm_cash_payment(payment.id()).unwrap();
    assert_eq!(confirmed.status(), PaymentStatus::Success);
    reservation.reservation_id
}

#[test]
fn test_verification_is_repeatable() {
    let (engine, _) = engine_with_renderer(Arc::new(PlainTextRenderer));
    let reservation_id = confirmed_reservation(&engine);
    let token = String::from_utf8(engine.pass_image(&reservation_id).unwrap()).unwrap();

    // Re-scanning at the gate succeeds every time
    for _ in 0..3 {
        let summary = engine.verify_pass(&token).unwrap();
        assert_eq!(summary.reservation_id, reservation_id);
        assert_eq!(summary.stall_codes, vec!["A-01"]);
        assert_eq!(summary.status, ReservationStatus::Confirmed);
    }
}

#[test]
fn test_invalid_token_is_not_found() {
    let (engine, _) = engine_with_renderer(Arc::new(PlainTextRenderer));

    assert_eq!(
        engine.verify_pass("bogus-token"),
        Err(PassError::InvalidToken)
    );
}

#[test]
fn test_render_failure_does_not_roll_back_confirmation() {
    let (engine, notifier) = engine_with_renderer(Arc::new(BrokenRenderer));
    let reservation_id = confirmed_reservation(&engine);

    // Delivery failed silently: nothing was sent, but the reservation is
    // confirmed and the pass row exists.
    assert_eq!(notifier.sent.load(Ordering::SeqCst), 0);
    assert_eq!(
        engine.get_reservation(&reservation_id).unwrap().status,
        ReservationStatus::Confirmed
    );

    // The on-demand image path reports the render fault to the operator
    assert!(matches!(
        engine.pass_image(&reservation_id),
        Err(PassError::Render(_))
    ));
}

#[test]
fn test_pass_image_requires_confirmed_reservation() {
    let (engine, _) = engine_with_renderer(Arc::new(PlainTextRenderer));
    engine
        .register_vendor("vendor@fair.test", "Vendor Books")
        .unwrap();
    let stall = engine.create_stall("A-01", StallSize::Small, 100).unwrap();
    let reservation = engine
        .create_reservation("vendor@fair.test", &[stall.id().to_string()])
        .unwrap();

    assert!(matches!(
        engine.pass_image(&reservation.reservation_id),
        Err(PassError::NotConfirmed { .. })
    ));
}

#[test]
fn test_deleted_reservation_invalidates_its_token() {
    let (engine, _) = engine_with_renderer(Arc::new(PlainTextRenderer));
    let reservation_id = confirmed_reservation(&engine);
    let token = String::from_utf8(engine.pass_image(&reservation_id).unwrap()).unwrap();
    assert!(engine.verify_pass(&token).is_ok());

    engine.delete_reservation(&reservation_id).unwrap();

    assert_eq!(engine.verify_pass(&token), Err(PassError::InvalidToken));
}

#[test]
fn test_notification_carries_summary() {
    let (engine, notifier) = engine_with_renderer(Arc::new(PlainTextRenderer));
    confirmed_reservation(&engine);

    assert_eq!(notifier.sent.load(Ordering::SeqCst), 1);
}
