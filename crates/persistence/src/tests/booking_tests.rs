// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::*;
use crate::{Persistence, PersistenceError, ReconcileOutcome};
use ferry_book::{BookingRequest, BookingState, CoreError};
use ferry_book_domain::{
    BookingStatus, DomainError, LedgerEntry, LedgerStatus, OperatingZone, PaymentStatus,
    ProviderStatus, ResourceClass, ResourceCounts, TicketStatus,
};
use time::macros::{date, datetime};

#[test]
fn test_create_booking_reserves_capacity_and_logs() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let network: Network = seed_network(&mut persistence, roomy());

    let state: BookingState = persistence
        .create_booking(
            &create_test_request(network, &["Ayu", "Budi"], 1),
            &create_test_actor(),
            &utc(),
            NOW,
        )
        .unwrap();

    assert_eq!(state.booking.booking_code, "BK-20260301-000001");
    assert_eq!(state.booking.status, BookingStatus::Pending);
    assert_eq!(state.booking.total_amount, 2 * 50_000 + 300_000);
    assert!(state.booking.booking_id.is_some());
    assert!(state.tickets.iter().all(|t| t.ticket_id.is_some()));
    assert_eq!(state.payments[0].status, PaymentStatus::Pending);

    let reloaded: BookingState = persistence
        .get_booking(state.booking.booking_id.unwrap())
        .unwrap();
    assert_eq!(reloaded, state);

    let ledger: LedgerEntry = persistence
        .find_ledger(network.schedule_id, DEPARTURE, NOW)
        .unwrap()
        .unwrap();
    assert_eq!(ledger.usage, ResourceCounts::new(2, 0, 1, 0, 0));
    assert_eq!(ledger.capacity, roomy());

    let log = persistence
        .booking_log(state.booking.booking_id.unwrap())
        .unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].previous_status, None);
    assert_eq!(log[0].new_status, BookingStatus::Pending);
}

#[test]
fn test_booking_codes_are_sequential_per_day() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let network: Network = seed_network(&mut persistence, roomy());
    let request: BookingRequest = create_test_request(network, &["Ayu"], 0);

    let first = persistence
        .create_booking(&request, &create_test_actor(), &utc(), NOW)
        .unwrap();
    let second = persistence
        .create_booking(&request, &create_test_actor(), &utc(), NOW)
        .unwrap();
    let next_day = persistence
        .create_booking(
            &request,
            &create_test_actor(),
            &utc(),
            NOW + time::Duration::hours(20),
        )
        .unwrap();

    assert_eq!(first.booking.booking_code, "BK-20260301-000001");
    assert_eq!(second.booking.booking_code, "BK-20260301-000002");
    assert_eq!(next_day.booking.booking_code, "BK-20260302-000001");
    assert_eq!(
        second.tickets[0].ticket_code,
        "BK-20260301-000002-P01"
    );
}

#[test]
fn test_rejected_reservation_writes_nothing() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let network: Network = seed_network(&mut persistence, ResourceCounts::new(10, 0, 1, 0, 0));

    persistence
        .create_booking(
            &create_test_request(network, &["Ayu"], 1),
            &create_test_actor(),
            &utc(),
            NOW,
        )
        .unwrap();

    let result = persistence.create_booking(
        &create_test_request(network, &["Budi", "Citra"], 1),
        &create_test_actor(),
        &utc(),
        NOW,
    );

    assert!(matches!(
        result,
        Err(PersistenceError::Rejected(CoreError::DomainViolation(
            DomainError::InsufficientCapacity {
                class: ResourceClass::Car,
                ..
            }
        )))
    ));

    let ledger = persistence
        .find_ledger(network.schedule_id, DEPARTURE, NOW)
        .unwrap()
        .unwrap();
    assert_eq!(ledger.usage, ResourceCounts::new(1, 0, 1, 0, 0));
    assert!(persistence.get_booking_by_code("BK-20260301-000002").is_err());
    assert!(persistence.find_tickets("Budi", None).unwrap().is_empty());
}

#[test]
fn test_unserved_day_creates_no_ledger_entry() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let network: Network = seed_network(&mut persistence, roomy());

    let mut request: BookingRequest = create_test_request(network, &["Ayu"], 0);
    // Tuesday
    request.departure_date = date!(2026 - 03 - 03);

    let result = persistence.create_booking(&request, &create_test_actor(), &utc(), NOW);

    assert!(matches!(
        result,
        Err(PersistenceError::Rejected(CoreError::DomainViolation(
            DomainError::DayNotServed { .. }
        )))
    ));
    assert!(
        persistence
            .find_ledger(network.schedule_id, date!(2026 - 03 - 03), NOW)
            .unwrap()
            .is_none()
    );
}

#[test]
fn test_departed_sailing_is_rejected() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let network: Network = seed_network(&mut persistence, roomy());

    let mut request: BookingRequest = create_test_request(network, &["Ayu"], 0);
    // the Monday before NOW
    request.departure_date = date!(2026 - 02 - 23);

    let result = persistence.create_booking(&request, &create_test_actor(), &utc(), NOW);

    assert!(matches!(
        result,
        Err(PersistenceError::Rejected(CoreError::DomainViolation(
            DomainError::SailingDeparted { .. }
        )))
    ));
    assert!(
        persistence
            .find_ledger(network.schedule_id, date!(2026 - 02 - 23), NOW)
            .unwrap()
            .is_none()
    );
}

#[test]
fn test_departure_cutoff_follows_operating_zone() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let network: Network = seed_network(&mut persistence, roomy());
    let request: BookingRequest = create_test_request(network, &["Ayu"], 0);
    let jakarta = OperatingZone::parse("Asia/Jakarta").unwrap();
    // 08:00 in Jakarta is 01:00 UTC on the same Monday
    let monday_0130 = datetime!(2026-03-02 01:30 UTC);

    let departed =
        persistence.create_booking(&request, &create_test_actor(), &jakarta, monday_0130);
    assert!(matches!(
        departed,
        Err(PersistenceError::Rejected(CoreError::DomainViolation(
            DomainError::SailingDeparted { .. }
        )))
    ));

    let accepted =
        persistence.create_booking(&request, &create_test_actor(), &utc(), monday_0130);
    assert!(accepted.is_ok());
}

#[test]
fn test_last_seat_marks_ledger_full() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let network: Network = seed_network(&mut persistence, ResourceCounts::new(2, 0, 0, 0, 0));

    persistence
        .create_booking(
            &create_test_request(network, &["Ayu", "Budi"], 0),
            &create_test_actor(),
            &utc(),
            NOW,
        )
        .unwrap();

    let ledger = persistence
        .find_ledger(network.schedule_id, DEPARTURE, NOW)
        .unwrap()
        .unwrap();
    assert_eq!(ledger.status, LedgerStatus::Full);
}

#[test]
fn test_successful_callback_confirms_once() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let network: Network = seed_network(&mut persistence, roomy());
    let pending: BookingState = persistence
        .create_booking(
            &create_test_request(network, &["Ayu"], 0),
            &create_test_actor(),
            &utc(),
            NOW,
        )
        .unwrap();
    let code: &str = &pending.booking.booking_code;

    let first: ReconcileOutcome = persistence
        .apply_payment_callback(
            code,
            ProviderStatus::Success,
            Some(String::from("TX-9")),
            Some(String::from("qris")),
            NOW,
        )
        .unwrap();
    let second: ReconcileOutcome = persistence
        .apply_payment_callback(
            code,
            ProviderStatus::Success,
            Some(String::from("TX-9")),
            Some(String::from("qris")),
            NOW,
        )
        .unwrap();

    assert!(first.applied);
    assert!(!second.applied);
    assert_eq!(first.state.booking.status, BookingStatus::Confirmed);
    assert_eq!(second.state, first.state);
    assert_eq!(first.state.payments[0].status, PaymentStatus::Success);
    assert_eq!(
        first.state.payments[0].transaction_id.as_deref(),
        Some("TX-9")
    );

    let log = persistence
        .booking_log(pending.booking.booking_id.unwrap())
        .unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log[1].new_status, BookingStatus::Confirmed);
}

#[test]
fn test_failed_callback_cancels_and_releases() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let network: Network = seed_network(&mut persistence, roomy());
    let pending: BookingState = persistence
        .create_booking(
            &create_test_request(network, &["Ayu", "Budi"], 1),
            &create_test_actor(),
            &utc(),
            NOW,
        )
        .unwrap();

    let outcome = persistence
        .apply_payment_callback(
            &pending.booking.booking_code,
            ProviderStatus::Failure,
            None,
            None,
            NOW,
        )
        .unwrap();

    assert!(outcome.applied);
    assert_eq!(outcome.state.booking.status, BookingStatus::Cancelled);
    assert!(
        outcome
            .state
            .tickets
            .iter()
            .all(|t| t.status == TicketStatus::Cancelled)
    );

    let ledger = persistence
        .find_ledger(network.schedule_id, DEPARTURE, NOW)
        .unwrap()
        .unwrap();
    assert!(ledger.usage.is_zero());
}

#[test]
fn test_callback_for_unknown_code_is_not_found() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    let result = persistence.apply_payment_callback(
        "BK-20260301-999999",
        ProviderStatus::Success,
        None,
        None,
        NOW,
    );

    assert!(matches!(result, Err(PersistenceError::NotFound(_))));
}

#[test]
fn test_cancel_releases_capacity_and_is_terminal() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let network: Network = seed_network(&mut persistence, roomy());
    let confirmed = create_confirmed_booking(&mut persistence, network, &["Ayu"], 1);
    let booking_id: i64 = confirmed.booking.booking_id.unwrap();

    let cancelled = persistence
        .transition_booking(
            booking_id,
            BookingStatus::Cancelled,
            Some(String::from("change of plans")),
            &create_test_operator(),
            NOW,
        )
        .unwrap();
    assert_eq!(cancelled.booking.status, BookingStatus::Cancelled);

    let again = persistence.transition_booking(
        booking_id,
        BookingStatus::Confirmed,
        None,
        &create_test_operator(),
        NOW,
    );
    assert!(matches!(
        again,
        Err(PersistenceError::Rejected(CoreError::DomainViolation(
            DomainError::IllegalTransition { .. }
        )))
    ));

    let ledger = persistence
        .find_ledger(network.schedule_id, DEPARTURE, NOW)
        .unwrap()
        .unwrap();
    assert!(ledger.usage.is_zero());
    assert_eq!(persistence.booking_log(booking_id).unwrap().len(), 3);
}

#[test]
fn test_find_tickets_matches_code_id_and_name() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let network: Network = seed_network(&mut persistence, roomy());
    let state = create_confirmed_booking(&mut persistence, network, &["Ayu Lestari", "Budi"], 0);

    let by_code = persistence
        .find_tickets(&state.tickets[1].ticket_code, None)
        .unwrap();
    assert_eq!(by_code.len(), 1);
    assert_eq!(by_code[0].ticket.passenger_name, "Budi");
    assert_eq!(by_code[0].booking.booking_code, state.booking.booking_code);

    let by_id = persistence.find_tickets("ID-Budi", None).unwrap();
    assert_eq!(by_id.len(), 1);

    let by_name = persistence.find_tickets("ayu lestari", None).unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].ticket.passenger_name, "Ayu Lestari");

    let other_route = persistence
        .find_tickets("Budi", Some(&[network.route_id + 1]))
        .unwrap();
    assert!(other_route.is_empty());

    let permitted = persistence
        .find_tickets("Budi", Some(&[network.route_id]))
        .unwrap();
    assert_eq!(permitted.len(), 1);
}
