//! Reservation engine tests: quota gate, lifecycle, release correctness.

use bookfair_core_rs::{
    BookingError, Engine, LedgerError, ReservationStatus, StallSize, StallStatus,
};

fn seeded_engine(stall_count: usize) -> (Engine, Vec<String>) {
    let engine = Engine::with_defaults();
    engine
        .register_vendor("vendor@fair.test", "Vendor Books")
        .unwrap();
    let stall_ids = (0..stall_count)
        .map(|i| {
            engine
                .create_stall(&format!("S-{:02}", i + 1), StallSize::Medium, 10_000)
                .unwrap()
                .id()
                .to_string()
        })
        .collect();
    (engine, stall_ids)
}

#[test]
fn test_vendor_with_three_stalls_cannot_take_a_fourth() {
    let (engine, stall_ids) = seeded_engine(4);

    engine
        .create_reservation("vendor@fair.test", &stall_ids[..3])
        .unwrap();

    let result = engine.create_reservation("vendor@fair.test", &stall_ids[3..]);

    assert!(matches!(result, Err(BookingError::QuotaExceeded { .. })));
}

#[test]
fn test_quota_spans_multiple_reservations() {
    let (engine, stall_ids) = seeded_engine(4);

    engine
        .create_reservation("vendor@fair.test", &stall_ids[..2])
        .unwrap();
    engine
        .create_reservation("vendor@fair.test", &stall_ids[2..3])
        .unwrap();

    // 2 + 1 already held; one more would make 4
    let result = engine.create_reservation("vendor@fair.test", &stall_ids[3..]);
    assert!(matches!(result, Err(BookingError::QuotaExceeded { .. })));
}

#[test]
fn test_release_correctness_after_cancel() {
    let (engine, stall_ids) = seeded_engine(2);

    let reservation = engine
        .create_reservation("vendor@fair.test", &stall_ids)
        .unwrap();
    for id in &stall_ids {
        assert_eq!(
            engine.get_stall(id).unwrap().status(),
            StallStatus::Reserved
        );
    }

    engine.cancel_reservation(&reservation.reservation_id).unwrap();

    for id in &stall_ids {
        assert_eq!(
            engine.get_stall(id).unwrap().status(),
            StallStatus::Available
        );
    }

    // A subsequent create referencing a released stall succeeds
    let second = engine
        .create_reservation("vendor@fair.test", &stall_ids[..1])
        .unwrap();
    assert_eq!(second.status, ReservationStatus::Pending);
}

#[test]
fn test_unknown_vendor_email_is_not_found() {
    let (engine, stall_ids) = seeded_engine(1);

    let result = engine.create_reservation("stranger@fair.test", &stall_ids);

    assert!(matches!(result, Err(BookingError::VendorNotFound(_))));
}

#[test]
fn test_reserving_a_missing_stall_is_not_found() {
    let (engine, _) = seeded_engine(1);

    let result =
        engine.create_reservation("vendor@fair.test", &["no-such-stall".to_string()]);

    assert!(matches!(
        result,
        Err(BookingError::Ledger(LedgerError::StallNotFound { .. }))
    ));
}

#[test]
fn test_double_cancel_is_a_noop() {
    let (engine, stall_ids) = seeded_engine(1);
    let reservation = engine
        .create_reservation("vendor@fair.test", &stall_ids)
        .unwrap();

    let first = engine.cancel_reservation(&reservation.reservation_id).unwrap();
    let second = engine.cancel_reservation(&reservation.reservation_id).unwrap();

    assert_eq!(first.status, ReservationStatus::Cancelled);
    assert_eq!(second.status, ReservationStatus::Cancelled);
}

#[test]
fn test_admin_status_update_paths() {
    let (engine, stall_ids) = seeded_engine(2);
    let reservation = engine
        .create_reservation("vendor@fair.test", &stall_ids)
        .unwrap();

    // Unknown names are a validation failure
    assert!(matches!(
        engine.update_reservation_status(&reservation.reservation_id, "refunded"),
        Err(BookingError::UnknownStatus(_))
    ));

    // Rejection releases the stalls
    let rejected = engine
        .update_reservation_status(&reservation.reservation_id, "rejected")
        .unwrap();
    assert_eq!(rejected.status, ReservationStatus::Rejected);
    for id in &stall_ids {
        assert_eq!(
            engine.get_stall(id).unwrap().status(),
            StallStatus::Available
        );
    }

    // A rejected reservation still consumes quota until cancelled
    engine
        .create_reservation("vendor@fair.test", &stall_ids[..1])
        .unwrap();
    let over = engine.create_reservation("vendor@fair.test", &stall_ids[1..]);
    assert!(matches!(over, Err(BookingError::QuotaExceeded { .. })));

    // Cancelling the rejected reservation frees the quota
    engine.cancel_reservation(&reservation.reservation_id).unwrap();
    assert!(engine
        .create_reservation("vendor@fair.test", &stall_ids[1..])
        .is_ok());
}

#[test]
fn test_delete_reservation_always_releases() {
    let (engine, stall_ids) = seeded_engine(1);
    let reservation = engine
        .create_reservation("vendor@fair.test", &stall_ids)
        .unwrap();
    engine
        .update_reservation_status(&reservation.reservation_id, "confirmed")
        .unwrap();

    engine.delete_reservation(&reservation.reservation_id).unwrap();

    assert!(matches!(
        engine.get_reservation(&reservation.reservation_id),
        Err(BookingError::ReservationNotFound(_))
    ));
    assert_eq!(
        engine.get_stall(&stall_ids[0]).unwrap().status(),
        StallStatus::Available
    );
}

#[test]
fn test_vendor_listing_is_hydrated() {
    let (engine, stall_ids) = seeded_engine(2);
    let vendor = engine
        .create_reservation("vendor@fair.test", &stall_ids)
        .map(|v| v.vendor_id.clone())
        .unwrap();

    let mine = engine.reservations_by_vendor(&vendor);

    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].stall_codes.len(), 2);
    assert!(mine[0].stall_codes.iter().all(|c| c.starts_with("S-")));
}
