// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::*;
use crate::{Persistence, PersistenceError, RescheduleOutcome};
use ferry_book::{BookingState, CoreError};
use ferry_book_domain::{
    BankDetails, BookingStatus, CheckInRecord, DomainError, PaymentStatus, RefundPolicyRule,
    RefundQuote, RefundStatus, ResourceCounts, TicketStatus,
};
use time::macros::date;

fn check_in_record() -> CheckInRecord {
    CheckInRecord {
        operator_id: String::from("op-1"),
        location: Some(String::from("Gate 2")),
        signature_ref: None,
    }
}

/// 100% from three days out, 50% up to departure.
fn seed_policy(persistence: &mut Persistence) {
    for (days, percentage) in [(3, 100), (0, 50)] {
        persistence
            .create_policy_rule(
                &RefundPolicyRule::new(days, percentage),
                &create_test_admin(),
                &create_test_cause(),
                NOW,
            )
            .unwrap();
    }
}

#[test]
fn test_last_check_in_completes_booking() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let network: Network = seed_network(&mut persistence, roomy());
    let state: BookingState =
        create_confirmed_booking(&mut persistence, network, &["Ayu", "Budi"], 0);
    let first_code: String = state.tickets[0].ticket_code.clone();
    let second_code: String = state.tickets[1].ticket_code.clone();

    let after_first = persistence
        .check_in(
            &first_code,
            &check_in_record(),
            &create_test_operator(),
            DEPARTURE,
            NOW,
        )
        .unwrap();
    assert_eq!(after_first.booking.status, BookingStatus::Confirmed);
    assert!(after_first.tickets[0].checked_in);
    assert_eq!(
        after_first.tickets[0]
            .check_in
            .as_ref()
            .and_then(|c| c.location.as_deref()),
        Some("Gate 2")
    );

    let after_second = persistence
        .check_in(
            &second_code,
            &check_in_record(),
            &create_test_operator(),
            DEPARTURE,
            NOW,
        )
        .unwrap();
    assert_eq!(after_second.booking.status, BookingStatus::Completed);
    assert!(
        after_second
            .tickets
            .iter()
            .all(|t| t.checked_in && t.status == TicketStatus::Active)
    );

    // Boarding does not hand capacity back.
    let ledger = persistence
        .find_ledger(network.schedule_id, DEPARTURE, NOW)
        .unwrap()
        .unwrap();
    assert_eq!(ledger.usage.passengers, 2);

    let log = persistence
        .booking_log(state.booking.booking_id.unwrap())
        .unwrap();
    assert_eq!(log.len(), 4);
    assert_eq!(log[2].new_status, BookingStatus::Confirmed);
    assert_eq!(log[3].new_status, BookingStatus::Completed);
}

#[test]
fn test_check_in_twice_is_rejected() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let network: Network = seed_network(&mut persistence, roomy());
    let state = create_confirmed_booking(&mut persistence, network, &["Ayu", "Budi"], 0);
    let code: String = state.tickets[0].ticket_code.clone();

    persistence
        .check_in(&code, &check_in_record(), &create_test_operator(), DEPARTURE, NOW)
        .unwrap();
    let again = persistence.check_in(
        &code,
        &check_in_record(),
        &create_test_operator(),
        DEPARTURE,
        NOW,
    );

    assert!(matches!(
        again,
        Err(PersistenceError::Rejected(CoreError::DomainViolation(
            DomainError::AlreadyCheckedIn { .. }
        )))
    ));
}

#[test]
fn test_check_in_outside_window_is_rejected() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let network: Network = seed_network(&mut persistence, roomy());
    let state = create_confirmed_booking(&mut persistence, network, &["Ayu"], 0);

    let early = persistence.check_in(
        &state.tickets[0].ticket_code,
        &check_in_record(),
        &create_test_operator(),
        date!(2026 - 02 - 27),
        NOW,
    );

    assert!(matches!(
        early,
        Err(PersistenceError::Rejected(CoreError::DomainViolation(
            DomainError::OutOfWindow { .. }
        )))
    ));
    let reloaded = persistence
        .get_booking(state.booking.booking_id.unwrap())
        .unwrap();
    assert!(!reloaded.tickets[0].checked_in);
}

#[test]
fn test_check_in_unknown_ticket_is_not_found() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    let result = persistence.check_in(
        "BK-20260301-000001-P01",
        &check_in_record(),
        &create_test_operator(),
        DEPARTURE,
        NOW,
    );

    assert!(matches!(result, Err(PersistenceError::NotFound(_))));
}

#[test]
fn test_quote_uses_settled_payment_and_active_tier() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let network: Network = seed_network(&mut persistence, roomy());
    seed_policy(&mut persistence);
    let state = create_confirmed_booking(&mut persistence, network, &["Ayu", "Budi"], 0);

    let quote: RefundQuote = persistence
        .quote_refund(state.booking.booking_id.unwrap(), &utc(), NOW)
        .unwrap();

    assert!(quote.eligible);
    assert_eq!(quote.days_before, 1);
    assert_eq!(quote.percentage, 50);
    assert_eq!(quote.amount, 50_000);
}

#[test]
fn test_refund_flow_ends_refunded() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let network: Network = seed_network(&mut persistence, roomy());
    seed_policy(&mut persistence);
    let state = create_confirmed_booking(&mut persistence, network, &["Ayu"], 1);
    let booking_id: i64 = state.booking.booking_id.unwrap();

    let requested = persistence
        .request_refund(
            booking_id,
            "Family emergency",
            Some(String::from("bank_transfer")),
            Some(BankDetails {
                bank_name: String::from("BCA"),
                account_number: String::from("1234567890"),
                account_holder: String::from("Ayu"),
            }),
            &create_test_actor(),
            &utc(),
            NOW,
        )
        .unwrap();

    assert_eq!(requested.booking.status, BookingStatus::Cancelled);
    let refund = requested.refund.as_ref().unwrap();
    assert_eq!(refund.status, RefundStatus::Pending);
    assert_eq!(refund.amount, (50_000 + 300_000) / 2);
    assert_eq!(
        refund.bank_details.as_ref().map(|b| b.bank_name.as_str()),
        Some("BCA")
    );

    let ledger = persistence
        .find_ledger(network.schedule_id, DEPARTURE, NOW)
        .unwrap()
        .unwrap();
    assert!(ledger.usage.is_zero());

    let duplicate = persistence.request_refund(
        booking_id,
        "again",
        None,
        None,
        &create_test_actor(),
        &utc(),
        NOW,
    );
    assert!(matches!(
        duplicate,
        Err(PersistenceError::Rejected(CoreError::DomainViolation(
            DomainError::RefundAlreadyRequested { .. }
        )))
    ));

    let approved = persistence
        .approve_refund(
            booking_id,
            Some(String::from("verified")),
            &create_test_admin(),
            NOW,
        )
        .unwrap();
    assert_eq!(approved.refund.as_ref().unwrap().status, RefundStatus::Approved);
    assert_eq!(approved.booking.status, BookingStatus::Cancelled);

    let completed = persistence
        .complete_refund(booking_id, "RF-77", &create_test_admin(), NOW)
        .unwrap();
    assert_eq!(completed.booking.status, BookingStatus::Refunded);
    assert_eq!(completed.payments[0].status, PaymentStatus::Refunded);
    let refund = completed.refund.as_ref().unwrap();
    assert_eq!(refund.status, RefundStatus::Completed);
    assert_eq!(refund.transaction_id.as_deref(), Some("RF-77"));

    let statuses: Vec<BookingStatus> = persistence
        .booking_log(booking_id)
        .unwrap()
        .iter()
        .map(|entry| entry.new_status)
        .collect();
    assert_eq!(
        statuses,
        vec![
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
            BookingStatus::Cancelled,
            BookingStatus::Refunded,
        ]
    );
}

#[test]
fn test_rejected_refund_cannot_complete() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let network: Network = seed_network(&mut persistence, roomy());
    seed_policy(&mut persistence);
    let state = create_confirmed_booking(&mut persistence, network, &["Ayu"], 0);
    let booking_id: i64 = state.booking.booking_id.unwrap();

    persistence
        .request_refund(
            booking_id,
            "no longer travelling",
            None,
            None,
            &create_test_actor(),
            &utc(),
            NOW,
        )
        .unwrap();
    let rejected = persistence
        .reject_refund(booking_id, None, &create_test_admin(), NOW)
        .unwrap();
    assert_eq!(rejected.refund.as_ref().unwrap().status, RefundStatus::Rejected);

    let result = persistence.complete_refund(booking_id, "RF-1", &create_test_admin(), NOW);
    assert!(matches!(
        result,
        Err(PersistenceError::Rejected(CoreError::DomainViolation(
            DomainError::IllegalTransition { .. }
        )))
    ));
    let reloaded = persistence.get_booking(booking_id).unwrap();
    assert_eq!(reloaded.booking.status, BookingStatus::Cancelled);
    assert_eq!(reloaded.payments[0].status, PaymentStatus::Success);
}

#[test]
fn test_refund_after_departure_is_not_eligible() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let network: Network = seed_network(&mut persistence, roomy());
    seed_policy(&mut persistence);
    let state = create_confirmed_booking(&mut persistence, network, &["Ayu"], 0);
    let booking_id: i64 = state.booking.booking_id.unwrap();

    let late = NOW + time::Duration::days(2);
    let result = persistence.request_refund(
        booking_id,
        "missed it",
        None,
        None,
        &create_test_actor(),
        &utc(),
        late,
    );

    assert!(matches!(
        result,
        Err(PersistenceError::Rejected(CoreError::DomainViolation(
            DomainError::RefundNotEligible { .. }
        )))
    ));
    let reloaded = persistence.get_booking(booking_id).unwrap();
    assert_eq!(reloaded.booking.status, BookingStatus::Confirmed);
    assert!(reloaded.refund.is_none());
}

#[test]
fn test_reschedule_moves_capacity_to_new_date() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let network: Network = seed_network(&mut persistence, roomy());
    let state = create_confirmed_booking(&mut persistence, network, &["Ayu", "Budi"], 1);
    let booking_id: i64 = state.booking.booking_id.unwrap();
    // Wednesday
    let new_date = date!(2026 - 03 - 04);

    let outcome: RescheduleOutcome = persistence
        .reschedule_booking(
            booking_id,
            network.schedule_id,
            new_date,
            &create_test_actor(),
            &utc(),
            NOW,
        )
        .unwrap();

    assert_eq!(outcome.original.booking.status, BookingStatus::Rescheduled);
    assert!(
        outcome
            .original
            .tickets
            .iter()
            .all(|t| t.status == TicketStatus::Cancelled)
    );

    let replacement = &outcome.replacement.booking;
    assert_eq!(replacement.status, BookingStatus::Confirmed);
    assert_eq!(replacement.departure_date, new_date);
    assert_eq!(replacement.rescheduled_from, Some(booking_id));
    assert_eq!(replacement.total_amount, state.booking.total_amount);
    assert_eq!(replacement.booking_code, "BK-20260301-000002");

    let old_ledger = persistence
        .find_ledger(network.schedule_id, DEPARTURE, NOW)
        .unwrap()
        .unwrap();
    let new_ledger = persistence
        .find_ledger(network.schedule_id, new_date, NOW)
        .unwrap()
        .unwrap();
    assert!(old_ledger.usage.is_zero());
    assert_eq!(new_ledger.usage, ResourceCounts::new(2, 0, 1, 0, 0));
}

#[test]
fn test_reschedule_within_full_sailing_succeeds() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let network: Network = seed_network(&mut persistence, ResourceCounts::new(2, 0, 0, 0, 0));
    let state = create_confirmed_booking(&mut persistence, network, &["Ayu", "Budi"], 0);

    let outcome = persistence
        .reschedule_booking(
            state.booking.booking_id.unwrap(),
            network.schedule_id,
            DEPARTURE,
            &create_test_actor(),
            &utc(),
            NOW,
        )
        .unwrap();

    assert_eq!(outcome.replacement.booking.schedule_id, network.schedule_id);
    let ledger = persistence
        .find_ledger(network.schedule_id, DEPARTURE, NOW)
        .unwrap()
        .unwrap();
    assert_eq!(ledger.usage.passengers, 2);
    assert_eq!(ledger.status, ferry_book_domain::LedgerStatus::Full);
}

#[test]
fn test_failed_reschedule_leaves_original_untouched() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let network: Network = seed_network(&mut persistence, roomy());
    let other: Network = seed_network(&mut persistence, roomy());
    let state = create_confirmed_booking(&mut persistence, network, &["Ayu"], 0);
    let booking_id: i64 = state.booking.booking_id.unwrap();

    let result = persistence.reschedule_booking(
        booking_id,
        other.schedule_id,
        DEPARTURE,
        &create_test_actor(),
        &utc(),
        NOW,
    );

    assert!(matches!(
        result,
        Err(PersistenceError::Rejected(CoreError::DomainViolation(
            DomainError::RouteMismatch { .. }
        )))
    ));
    let reloaded = persistence.get_booking(booking_id).unwrap();
    assert_eq!(reloaded.booking.status, BookingStatus::Confirmed);
    let ledger = persistence
        .find_ledger(network.schedule_id, DEPARTURE, NOW)
        .unwrap()
        .unwrap();
    assert_eq!(ledger.usage.passengers, 1);
    assert_eq!(persistence.booking_log(booking_id).unwrap().len(), 2);
}

#[test]
fn test_reschedule_to_departed_sailing_is_rejected() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let network: Network = seed_network(&mut persistence, roomy());
    let state = create_confirmed_booking(&mut persistence, network, &["Ayu"], 0);
    let booking_id: i64 = state.booking.booking_id.unwrap();

    let result = persistence.reschedule_booking(
        booking_id,
        network.schedule_id,
        date!(2026 - 02 - 27), // Friday, already sailed
        &create_test_actor(),
        &utc(),
        NOW,
    );

    assert!(matches!(
        result,
        Err(PersistenceError::Rejected(CoreError::DomainViolation(
            DomainError::SailingDeparted { .. }
        )))
    ));
    let reloaded = persistence.get_booking(booking_id).unwrap();
    assert_eq!(reloaded.booking.status, BookingStatus::Confirmed);
    assert_eq!(persistence.booking_log(booking_id).unwrap().len(), 2);
}

#[test]
fn test_policy_rules_are_listed_and_audited() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    seed_policy(&mut persistence);

    let rules = persistence.list_policy_rules(true).unwrap();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0].days_before_departure, 3);

    let mut deactivated: RefundPolicyRule = rules[1].clone();
    deactivated.active = false;
    persistence
        .update_policy_rule(
            rules[1].rule_id.unwrap(),
            &deactivated,
            &create_test_admin(),
            &create_test_cause(),
            NOW,
        )
        .unwrap();

    assert_eq!(persistence.list_policy_rules(true).unwrap().len(), 1);
    assert_eq!(persistence.list_policy_rules(false).unwrap().len(), 2);

    let events = persistence
        .list_audit_events(Some("refund_policy"), rules[1].rule_id)
        .unwrap();
    assert_eq!(events.len(), 2);
}

#[test]
fn test_invalid_policy_rule_is_rejected() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    let result = persistence.create_policy_rule(
        &RefundPolicyRule::new(1, 150),
        &create_test_admin(),
        &create_test_cause(),
        NOW,
    );

    assert!(matches!(
        result,
        Err(PersistenceError::Rejected(CoreError::DomainViolation(
            DomainError::InvalidRefundPolicy { .. }
        )))
    ));
    assert!(persistence.list_policy_rules(false).unwrap().is_empty());
}
