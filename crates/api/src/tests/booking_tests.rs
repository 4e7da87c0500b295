// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::*;
use crate::{
    ApiError, CapacityInfo, PaymentCallbackRequest, RescheduleRequest, TransitionBookingRequest,
    create_booking, get_booking, get_booking_by_code, get_booking_log, payment_callback,
    reschedule_booking, transition_booking,
};

fn settle(fixture: &mut Fixture, booking_code: &str, word: &str) -> crate::PaymentCallbackResponse {
    payment_callback(
        &mut fixture.persistence,
        &fixture.context,
        &PaymentCallbackRequest {
            booking_code: booking_code.to_string(),
            provider_status: word.to_string(),
            transaction_id: Some(String::from("TX-42")),
            payment_method: None,
        },
    )
    .unwrap()
}

#[test]
fn test_user_books_for_themselves() {
    let mut fixture: Fixture = seed(roomy());

    let response = create_booking(
        &mut fixture.persistence,
        &fixture.context,
        &booking_request(fixture.schedule_id, &["Ayu", "Budi"], 1),
        &create_test_user(),
    )
    .unwrap();

    assert_eq!(response.booking.user_id, "user-1");
    assert_eq!(response.booking.status, "PENDING");
    assert_eq!(response.booking.departure_date, DEPARTURE);
    assert_eq!(response.booking.total_amount, 2 * 50_000 + 300_000);
    assert_eq!(response.tickets.len(), 2);
    assert_eq!(response.vehicles[0].class, "car");
    assert_eq!(
        response.vehicles[0].driver_ticket_code.as_deref(),
        Some(response.tickets[0].ticket_code.as_str())
    );
    assert_eq!(response.payments[0].status, "PENDING");
}

#[test]
fn test_user_cannot_book_for_someone_else() {
    let mut fixture: Fixture = seed(roomy());
    let mut request = booking_request(fixture.schedule_id, &["Ayu"], 0);
    request.user_id = Some(String::from("user-2"));

    let result = create_booking(
        &mut fixture.persistence,
        &fixture.context,
        &request,
        &create_test_user(),
    );

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_staff_must_name_the_traveller() {
    let mut fixture: Fixture = seed(roomy());
    let request = booking_request(fixture.schedule_id, &["Ayu"], 0);

    let result = create_booking(
        &mut fixture.persistence,
        &fixture.context,
        &request,
        &create_test_admin(),
    );

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "user_id"
    ));

    let mut named = request;
    named.user_id = Some(String::from("walk-in-9"));
    let booked = create_booking(
        &mut fixture.persistence,
        &fixture.context,
        &named,
        &create_test_operator(vec![fixture.route_id]),
    )
    .unwrap();
    assert_eq!(booked.booking.user_id, "walk-in-9");
}

#[test]
fn test_operator_cannot_book_outside_assigned_routes() {
    let mut fixture: Fixture = seed(roomy());
    let mut request = booking_request(fixture.schedule_id, &["Ayu"], 0);
    request.user_id = Some(String::from("walk-in-9"));

    let result = create_booking(
        &mut fixture.persistence,
        &fixture.context,
        &request,
        &create_test_operator(vec![fixture.route_id + 1]),
    );

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
}

#[test]
fn test_malformed_input_is_rejected() {
    let mut fixture: Fixture = seed(roomy());

    let mut bad_date = booking_request(fixture.schedule_id, &["Ayu"], 0);
    bad_date.departure_date = String::from("02/03/2026");
    assert!(matches!(
        create_booking(
            &mut fixture.persistence,
            &fixture.context,
            &bad_date,
            &create_test_user(),
        ),
        Err(ApiError::InvalidInput { ref field, .. }) if field == "departure_date"
    ));

    let mut bad_class = booking_request(fixture.schedule_id, &["Ayu"], 1);
    bad_class.vehicles[0].class = String::from("tank");
    assert!(matches!(
        create_booking(
            &mut fixture.persistence,
            &fixture.context,
            &bad_class,
            &create_test_user(),
        ),
        Err(ApiError::InvalidInput { ref field, .. }) if field == "vehicle_class"
    ));
}

#[test]
fn test_sold_out_class_is_a_rule_violation() {
    let mut fixture: Fixture = seed(CapacityInfo {
        passengers: 10,
        cars: 1,
        ..CapacityInfo::default()
    });
    create_booking(
        &mut fixture.persistence,
        &fixture.context,
        &booking_request(fixture.schedule_id, &["Ayu"], 1),
        &create_test_user(),
    )
    .unwrap();

    let result = create_booking(
        &mut fixture.persistence,
        &fixture.context,
        &booking_request(fixture.schedule_id, &["Budi"], 1),
        &create_test_user(),
    );

    assert!(matches!(
        result,
        Err(ApiError::DomainRuleViolation { ref rule, .. }) if rule == "insufficient_capacity"
    ));
}

#[test]
fn test_unserved_day_is_a_rule_violation() {
    let mut fixture: Fixture = seed(roomy());
    let mut request = booking_request(fixture.schedule_id, &["Ayu"], 0);
    request.departure_date = String::from("2026-03-03");

    let result = create_booking(
        &mut fixture.persistence,
        &fixture.context,
        &request,
        &create_test_user(),
    );

    assert!(matches!(
        result,
        Err(ApiError::DomainRuleViolation { ref rule, .. }) if rule == "day_not_served"
    ));
}

#[test]
fn test_departed_sailing_is_a_rule_violation() {
    let mut fixture: Fixture = seed(roomy());
    let mut request = booking_request(fixture.schedule_id, &["Ayu"], 0);
    request.departure_date = String::from("2026-02-23");

    let result = create_booking(
        &mut fixture.persistence,
        &fixture.context,
        &request,
        &create_test_user(),
    );

    assert!(matches!(
        result,
        Err(ApiError::DomainRuleViolation { ref rule, .. }) if rule == "sailing_departed"
    ));
}

#[test]
fn test_callback_confirms_once() {
    let mut fixture: Fixture = seed(roomy());
    let pending = create_booking(
        &mut fixture.persistence,
        &fixture.context,
        &booking_request(fixture.schedule_id, &["Ayu"], 0),
        &create_test_user(),
    )
    .unwrap();

    let first = settle(&mut fixture, &pending.booking.booking_code, "settlement");
    let second = settle(&mut fixture, &pending.booking.booking_code, "capture");

    assert!(first.applied);
    assert!(!second.applied);
    assert_eq!(first.booking_status, "CONFIRMED");
    assert_eq!(first.payment_status.as_deref(), Some("SUCCESS"));

    let log = get_booking_log(
        &mut fixture.persistence,
        pending.booking.booking_id,
        &create_test_user(),
    )
    .unwrap();
    assert_eq!(log.entries.len(), 2);
    assert_eq!(log.entries[1].previous_status.as_deref(), Some("PENDING"));
    assert_eq!(log.entries[1].actor_type, "SYSTEM");
}

#[test]
fn test_expired_callback_cancels_pending_booking() {
    let mut fixture: Fixture = seed(roomy());
    let pending = create_booking(
        &mut fixture.persistence,
        &fixture.context,
        &booking_request(fixture.schedule_id, &["Ayu"], 0),
        &create_test_user(),
    )
    .unwrap();

    let outcome = settle(&mut fixture, &pending.booking.booking_code, "expire");

    assert!(outcome.applied);
    assert_eq!(outcome.booking_status, "CANCELLED");
}

#[test]
fn test_unknown_provider_word_is_invalid_input() {
    let mut fixture: Fixture = seed(roomy());

    let result = payment_callback(
        &mut fixture.persistence,
        &fixture.context,
        &PaymentCallbackRequest {
            booking_code: String::from("BK-20260301-000001"),
            provider_status: String::from("chargeback"),
            transaction_id: None,
            payment_method: None,
        },
    );

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref field, .. }) if field == "provider_status"
    ));
}

#[test]
fn test_bookings_are_private_to_their_owner() {
    let mut fixture: Fixture = seed(roomy());
    let booking = confirmed_booking(&mut fixture, &["Ayu"]);

    assert!(
        get_booking(
            &mut fixture.persistence,
            booking.booking.booking_id,
            &create_test_user()
        )
        .is_ok()
    );
    assert!(matches!(
        get_booking_by_code(
            &mut fixture.persistence,
            &booking.booking.booking_code,
            &create_other_user()
        ),
        Err(ApiError::Unauthorized { .. })
    ));
    assert!(matches!(
        get_booking(&mut fixture.persistence, 9_999, &create_test_admin()),
        Err(ApiError::ResourceNotFound { .. })
    ));
}

#[test]
fn test_users_may_cancel_but_not_complete() {
    let mut fixture: Fixture = seed(roomy());
    let booking = confirmed_booking(&mut fixture, &["Ayu"]);
    let booking_id: i64 = booking.booking.booking_id;

    let complete = transition_booking(
        &mut fixture.persistence,
        &fixture.context,
        booking_id,
        &TransitionBookingRequest {
            target_status: String::from("COMPLETED"),
            note: None,
        },
        &create_test_user(),
    );
    assert!(matches!(complete, Err(ApiError::Unauthorized { .. })));

    let cancelled = transition_booking(
        &mut fixture.persistence,
        &fixture.context,
        booking_id,
        &TransitionBookingRequest {
            target_status: String::from("cancelled"),
            note: Some(String::from("plans changed")),
        },
        &create_test_user(),
    )
    .unwrap();
    assert_eq!(cancelled.booking.status, "CANCELLED");
    assert!(cancelled.tickets.iter().all(|t| t.status == "CANCELLED"));

    let reopen = transition_booking(
        &mut fixture.persistence,
        &fixture.context,
        booking_id,
        &TransitionBookingRequest {
            target_status: String::from("CONFIRMED"),
            note: None,
        },
        &create_test_admin(),
    );
    assert!(matches!(
        reopen,
        Err(ApiError::DomainRuleViolation { ref rule, .. }) if rule == "illegal_transition"
    ));
}

#[test]
fn test_pending_cannot_jump_to_completed() {
    let mut fixture: Fixture = seed(roomy());
    let pending = create_booking(
        &mut fixture.persistence,
        &fixture.context,
        &booking_request(fixture.schedule_id, &["Ayu"], 0),
        &create_test_user(),
    )
    .unwrap();

    let result = transition_booking(
        &mut fixture.persistence,
        &fixture.context,
        pending.booking.booking_id,
        &TransitionBookingRequest {
            target_status: String::from("COMPLETED"),
            note: None,
        },
        &create_test_admin(),
    );

    assert!(matches!(
        result,
        Err(ApiError::DomainRuleViolation { ref rule, .. }) if rule == "illegal_transition"
    ));
}

#[test]
fn test_reschedule_to_another_sailing() {
    let mut fixture: Fixture = seed(roomy());
    let booking = confirmed_booking(&mut fixture, &["Ayu", "Budi"]);

    let outcome = reschedule_booking(
        &mut fixture.persistence,
        &fixture.context,
        booking.booking.booking_id,
        &RescheduleRequest {
            schedule_id: fixture.schedule_id,
            departure_date: String::from("2026-03-04"),
        },
        &create_test_user(),
    )
    .unwrap();

    assert_eq!(outcome.original.booking.status, "RESCHEDULED");
    assert_eq!(outcome.replacement.booking.status, "CONFIRMED");
    assert_eq!(outcome.replacement.booking.departure_date, "2026-03-04");
    assert_eq!(
        outcome.replacement.booking.rescheduled_from,
        Some(booking.booking.booking_id)
    );
    assert_eq!(
        outcome.replacement.booking.total_amount,
        booking.booking.total_amount
    );
    assert_eq!(
        outcome.replacement.payments[0].payment_method.as_deref(),
        Some("reschedule")
    );
}
