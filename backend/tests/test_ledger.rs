//! Ledger-facing engine tests: stall inventory, status guards, deletion
//! protection.

use bookfair_core_rs::{
    Engine, InitiateOutcome, LedgerError, PaymentMethod, StallSize, StallStatus,
};

fn engine_with_vendor() -> Engine {
    let engine = Engine::with_defaults();
    engine
        .register_vendor("vendor@fair.test", "Vendor Books")
        .unwrap();
    engine
}

#[test]
fn test_duplicate_stall_code_conflicts() {
    let engine = engine_with_vendor();
    engine.create_stall("A-01", StallSize::Small, 10_000).unwrap();

    let result = engine.create_stall("A-01", StallSize::Large, 20_000);

    assert!(matches!(
        result,
        Err(LedgerError::CodeAlreadyExists { .. })
    ));
}

#[test]
fn test_operator_cannot_overwrite_live_booking() {
    let engine = engine_with_vendor();
    let stall = engine.create_stall("A-01", StallSize::Small, 10_000).unwrap();
    engine
        .create_reservation("vendor@fair.test", &[stall.id().to_string()])
        .unwrap();

    let result = engine.set_stall_status(stall.id(), StallStatus::Blocked);

    assert!(matches!(
        result,
        Err(LedgerError::HeldByLiveReservation { .. })
    ));
    assert_eq!(
        engine.get_stall(stall.id()).unwrap().status(),
        StallStatus::Reserved
    );
}

#[test]
fn test_operator_states_work_on_free_stalls() {
    let engine = engine_with_vendor();
    let stall = engine.create_stall("A-01", StallSize::Small, 10_000).unwrap();

    engine
        .set_stall_status(stall.id(), StallStatus::Maintenance)
        .unwrap();
    assert_eq!(
        engine.get_stall(stall.id()).unwrap().status(),
        StallStatus::Maintenance
    );

    // A stall under maintenance is not allocatable
    let result = engine.create_reservation("vendor@fair.test", &[stall.id().to_string()]);
    assert!(result.is_err());

    engine
        .set_stall_status(stall.id(), StallStatus::Available)
        .unwrap();
    assert!(engine
        .create_reservation("vendor@fair.test", &[stall.id().to_string()])
        .is_ok());
}

#[test]
fn test_delete_protects_confirmed_reservation() {
    let engine = engine_with_vendor();
    let stall = engine.create_stall("A-01", StallSize::Small, 10_000).unwrap();
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
    engine.confirm_cash_payment(payment.id()).unwrap();

    let result = engine.delete_stall(stall.id());

    assert!(matches!(
        result,
        Err(LedgerError::ConfirmedReservation { .. })
    ));
    assert!(engine.get_stall(stall.id()).is_ok());
}

#[test]
fn test_delete_under_pending_reservation_keeps_views_hydrated() {
    let engine = engine_with_vendor();
    let a = engine.create_stall("A-01", StallSize::Small, 10_000).unwrap();
    let b = engine.create_stall("A-02", StallSize::Small, 12_000).unwrap();
    let reservation = engine
        .create_reservation(
            "vendor@fair.test",
            &[a.id().to_string(), b.id().to_string()],
        )
        .unwrap();

    engine.delete_stall(a.id()).unwrap();

    let view = engine.get_reservation(&reservation.reservation_id).unwrap();
    assert_eq!(view.stall_codes, vec!["A-02"]);
    // Totals are immutable after creation
    assert_eq!(view.total_amount, 22_000);
}

#[test]
fn test_update_stall_attributes() {
    let engine = engine_with_vendor();
    let stall = engine.create_stall("A-01", StallSize::Small, 10_000).unwrap();

    let updated = engine
        .update_stall(stall.id(), "B-09", StallSize::Large, 30_000)
        .unwrap();

    assert_eq!(updated.code(), "B-09");
    assert_eq!(updated.size(), StallSize::Large);
    assert_eq!(updated.price(), 30_000);

    // The old code is free again
    assert!(engine.create_stall("A-01", StallSize::Small, 5_000).is_ok());
}

#[test]
fn test_available_listing_tracks_allocation() {
    let engine = engine_with_vendor();
    let a = engine.create_stall("A-01", StallSize::Small, 10_000).unwrap();
    engine.create_stall("A-02", StallSize::Medium, 12_000).unwrap();

    assert_eq!(engine.list_available_stalls().len(), 2);

    let reservation = engine
        .create_reservation("vendor@fair.test", &[a.id().to_string()])
        .unwrap();
    assert_eq!(engine.list_available_stalls().len(), 1);

    engine.cancel_reservation(&reservation.reservation_id).unwrap();
    assert_eq!(engine.list_available_stalls().len(), 2);

    assert_eq!(engine.stalls_by_size(StallSize::Medium).len(), 1);
}
