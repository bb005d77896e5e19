//! Property-based invariant sweep.
//!
//! Drives the engine through arbitrary operation sequences and asserts the
//! cross-entity invariants after every step: no stall ever held by two
//! live reservations, `Reserved` always means a live holder exists, and no
//! vendor ever exceeds the stall quota.

use bookfair_core_rs::{Engine, InitiateOutcome, PaymentMethod, StallSize};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Create { vendor: usize, stalls: Vec<usize> },
    Cancel(usize),
    PayAndConfirmCash(usize),
    Reject(usize),
    Delete(usize),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..3usize, prop::collection::vec(0..6usize, 1..4))
            .prop_map(|(vendor, stalls)| Op::Create { vendor, stalls }),
        (0..16usize).prop_map(Op::Cancel),
        (0..16usize).prop_map(Op::PayAndConfirmCash),
        (0..16usize).prop_map(Op::Reject),
        (0..16usize).prop_map(Op::Delete),
    ]
}

fn seeded_engine() -> (Engine, Vec<String>, Vec<String>) {
    let engine = Engine::with_defaults();
    let emails: Vec<String> = (0..3)
        .map(|i| {
            let email = format!("v{i}@fair.test");
            engine
                .register_vendor(&email, &format!("V{i} Books"))
                .unwrap();
            email
        })
        .collect();
    let stall_ids: Vec<String> = (0..6)
        .map(|i| {
            engine
                .create_stall(&format!("S-{:02}", i + 1), StallSize::Small, 100 * (i as i64 + 1))
                .unwrap()
                .id()
                .to_string()
        })
        .collect();
    (engine, emails, stall_ids)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn invariants_hold_under_any_operation_sequence(
        ops in prop::collection::vec(op_strategy(), 1..40)
    ) {
        let (engine, emails, stall_ids) = seeded_engine();
        let mut reservations: Vec<String> = Vec::new();

        for op in ops {
            match op {
                Op::Create { vendor, stalls } => {
                    let request: Vec<String> = stalls
                        .iter()
                        .map(|i| stall_ids[i % stall_ids.len()].clone())
                        .collect();
                    if let Ok(view) =
                        engine.create_reservation(&emails[vendor % emails.len()], &request)
                    {
                        reservations.push(view.reservation_id);
                    }
                }
                Op::Cancel(i) => {
                    if let Some(id) = pick(&reservations, i) {
                        let _ = engine.cancel_reservation(&id);
                    }
                }
                Op::PayAndConfirmCash(i) => {
                    if let Some(id) = pick(&reservations, i) {
                        if let Ok(InitiateOutcome::Payment(payment)) =
                            engine.process_payment(&id, PaymentMethod::Cash)
                        {
                            let _ = engine.confirm_cash_payment(payment.id());
                        }
                    }
                }
                Op::Reject(i) => {
                    if let Some(id) = pick(&reservations, i) {
                        let _ = engine.update_reservation_status(&id, "rejected");
                    }
                }
                Op::Delete(i) => {
                    if let Some(id) = pick(&reservations, i) {
                        let _ = engine.delete_reservation(&id);
                    }
                }
            }

            let violations = engine.invariant_violations();
            prop_assert!(violations.is_empty(), "violations: {:?}", violations);
        }
    }
}

fn pick(reservations: &[String], i: usize) -> Option<String> {
    if reservations.is_empty() {
        None
    } else {
        Some(reservations[i % reservations.len()].clone())
    }
}

/// Deterministic long scenario exercising the full lifecycle mix.
#[test]
fn test_mixed_lifecycle_scenario_stays_consistent() {
    let (engine, emails, stall_ids) = seeded_engine();

    let r1 = engine
        .create_reservation(&emails[0], &stall_ids[0..2])
        .unwrap();
    let r2 = engine
        .create_reservation(&emails[1], &stall_ids[2..5])
        .unwrap();

    // Vendor 0 pays cash and confirms
    if let InitiateOutcome::Payment(p) = engine
        .process_payment(&r1.reservation_id, PaymentMethod::Cash)
        .unwrap()
    {
        engine.confirm_cash_payment(p.id()).unwrap();
    }

    // Vendor 1's reservation is rejected by an admin; stalls free up
    engine
        .update_reservation_status(&r2.reservation_id, "rejected")
        .unwrap();

    // Vendor 2 takes the freed stalls
    let r3 = engine
        .create_reservation(&emails[2], &stall_ids[2..5])
        .unwrap();

    // Vendor 1 clears the rejected quota and books the last stall
    engine.cancel_reservation(&r2.reservation_id).unwrap();
    let r4 = engine
        .create_reservation(&emails[1], &stall_ids[5..6])
        .unwrap();

    // Tear part of it down again
    engine.delete_reservation(&r3.reservation_id).unwrap();
    engine.cancel_reservation(&r4.reservation_id).unwrap();

    assert!(engine.invariant_violations().is_empty());
    assert_eq!(engine.list_available_stalls().len(), 4);
}
