// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::*;
use crate::{CoreError, plan_booking, resolve_ledger};
use ferry_book_domain::{
    BookingStatus, DomainError, LedgerStatus, PaymentStatus, ResourceClass, ResourceCounts,
    RouteStatus, ScheduleStatus, StatusHold, StatusSource, TicketStatus,
};
use time::Duration;
use time::macros::{date, datetime};

#[test]
fn test_plan_creates_pending_booking_with_tickets_and_payment() {
    let request = create_test_request(&["Ayu", "Budi"], 1);
    let ledger = create_test_ledger(ResourceCounts::new(10, 2, 2, 1, 1));

    let plan = plan_booking(
        &request,
        &create_test_route(),
        &create_test_schedule(),
        &ledger,
        DEPARTS_AT,
        "BK-20260301-000007",
        create_test_actor(),
        NOW,
    )
    .unwrap();

    let booking = &plan.state.booking;
    assert_eq!(booking.status, BookingStatus::Pending);
    assert_eq!(booking.passenger_count, 2);
    assert_eq!(booking.vehicle_count, 1);
    assert_eq!(booking.total_amount, 2 * 50_000 + 300_000);
    assert_eq!(booking.route_id, 1);

    assert_eq!(plan.state.tickets.len(), 2);
    assert!(
        plan.state
            .tickets
            .iter()
            .all(|t| t.status == TicketStatus::Active && !t.checked_in)
    );
    assert_eq!(plan.state.tickets[1].ticket_code, "BK-20260301-000007-P02");
    assert_eq!(
        plan.state.vehicles[0].driver_ticket_code.as_deref(),
        Some("BK-20260301-000007-P01")
    );

    assert_eq!(plan.state.payments.len(), 1);
    assert_eq!(plan.state.payments[0].status, PaymentStatus::Pending);
    assert_eq!(plan.state.payments[0].amount, booking.total_amount);

    assert_eq!(plan.ledger.usage, ResourceCounts::new(2, 0, 1, 0, 0));
    assert_eq!(plan.log_entry.previous_status, None);
    assert_eq!(plan.log_entry.new_status, BookingStatus::Pending);
}

#[test]
fn test_capacity_failure_on_one_class_builds_nothing() {
    let ledger = create_test_ledger(ResourceCounts::new(10, 0, 1, 0, 0));

    let result = plan_booking(
        &create_test_request(&["Ayu", "Budi"], 2),
        &create_test_route(),
        &create_test_schedule(),
        &ledger,
        DEPARTS_AT,
        "BK-20260301-000001",
        create_test_actor(),
        NOW,
    );

    assert_eq!(
        result,
        Err(CoreError::DomainViolation(DomainError::InsufficientCapacity {
            class: ResourceClass::Car,
            requested: 2,
            available: 1,
        }))
    );
    // The caller's entry is untouched.
    assert_eq!(ledger.usage, ResourceCounts::default());
}

#[test]
fn test_unserved_weekday_rejected() {
    let mut request = create_test_request(&["Ayu"], 0);
    request.departure_date = date!(2026 - 03 - 03); // Tuesday

    let result = plan_booking(
        &request,
        &create_test_route(),
        &create_test_schedule(),
        &create_test_ledger(ResourceCounts::new(10, 0, 0, 0, 0)),
        DEPARTS_AT,
        "BK-20260301-000001",
        create_test_actor(),
        NOW,
    );

    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::DayNotServed { .. }))
    ));
}

#[test]
fn test_resolve_ledger_fails_fast_on_unserved_day() {
    let result = resolve_ledger(
        &create_test_schedule(),
        date!(2026 - 03 - 08),
        None,
        ResourceCounts::new(10, 0, 0, 0, 0),
        NOW,
    );
    assert!(matches!(result, Err(DomainError::DayNotServed { .. })));
}

#[test]
fn test_resolve_ledger_opens_with_ferry_capacity() {
    let entry = resolve_ledger(
        &create_test_schedule(),
        DEPARTURE,
        None,
        ResourceCounts::new(300, 40, 20, 4, 6),
        NOW,
    )
    .unwrap();
    assert_eq!(entry.capacity, ResourceCounts::new(300, 40, 20, 4, 6));
    assert_eq!(entry.status, LedgerStatus::Active);
    assert!(!entry.capacity_overridden);
}

#[test]
fn test_resolve_ledger_opens_closed_under_inactive_schedule() {
    let mut schedule = create_test_schedule();
    schedule.status = ScheduleStatus::Inactive;
    schedule.hold = StatusHold::new(Some(String::from("dry dock")), None);

    let entry = resolve_ledger(
        &schedule,
        DEPARTURE,
        None,
        ResourceCounts::new(300, 40, 20, 4, 6),
        NOW,
    )
    .unwrap();
    assert_eq!(entry.status, LedgerStatus::Inactive);
    assert_eq!(entry.status_source, StatusSource::Schedule);
    assert_eq!(entry.hold, schedule.hold);
}

#[test]
fn test_closed_ledger_rejected_until_hold_lapses() {
    let mut ledger = create_test_ledger(ResourceCounts::new(10, 0, 0, 0, 0));
    ledger.set_status(
        LedgerStatus::WeatherIssue,
        StatusHold::new(Some(String::from("storm")), Some(NOW + Duration::hours(2))),
        StatusSource::Direct,
    );

    let attempt = |now| {
        plan_booking(
            &create_test_request(&["Ayu"], 0),
            &create_test_route(),
            &create_test_schedule(),
            &ledger,
            DEPARTS_AT,
            "BK-20260301-000001",
            create_test_actor(),
            now,
        )
    };

    assert!(matches!(
        attempt(NOW),
        Err(CoreError::DomainViolation(DomainError::ScheduleClosed {
            scope: "ledger",
            ..
        }))
    ));

    let plan = attempt(NOW + Duration::hours(3)).unwrap();
    assert_eq!(plan.ledger.status, LedgerStatus::Active);
    assert_eq!(plan.ledger.hold, StatusHold::default());
}

#[test]
fn test_closed_route_or_schedule_rejected() {
    let mut route = create_test_route();
    route.status = RouteStatus::WeatherIssue;
    let result = plan_booking(
        &create_test_request(&["Ayu"], 0),
        &route,
        &create_test_schedule(),
        &create_test_ledger(ResourceCounts::new(10, 0, 0, 0, 0)),
        DEPARTS_AT,
        "BK-20260301-000001",
        create_test_actor(),
        NOW,
    );
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::ScheduleClosed {
            scope: "route",
            ..
        }))
    ));

    let mut schedule = create_test_schedule();
    schedule.status = ScheduleStatus::Inactive;
    let result = plan_booking(
        &create_test_request(&["Ayu"], 0),
        &create_test_route(),
        &schedule,
        &create_test_ledger(ResourceCounts::new(10, 0, 0, 0, 0)),
        DEPARTS_AT,
        "BK-20260301-000001",
        create_test_actor(),
        NOW,
    );
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::ScheduleClosed {
            scope: "schedule",
            ..
        }))
    ));
}

#[test]
fn test_empty_manifest_rejected() {
    let result = plan_booking(
        &create_test_request(&[], 0),
        &create_test_route(),
        &create_test_schedule(),
        &create_test_ledger(ResourceCounts::new(10, 0, 0, 0, 0)),
        DEPARTS_AT,
        "BK-20260301-000001",
        create_test_actor(),
        NOW,
    );
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::InvalidManifest { .. }))
    ));
}

#[test]
fn test_departed_sailing_rejected() {
    let mut request = create_test_request(&["Ayu"], 0);
    request.departure_date = date!(2026 - 02 - 23); // the Monday before NOW

    let result = plan_booking(
        &request,
        &create_test_route(),
        &create_test_schedule(),
        &create_test_ledger(ResourceCounts::new(10, 0, 0, 0, 0)),
        datetime!(2026-02-23 08:00 UTC),
        "BK-20260301-000001",
        create_test_actor(),
        NOW,
    );

    assert_eq!(
        result,
        Err(CoreError::DomainViolation(DomainError::SailingDeparted {
            departure_date: date!(2026 - 02 - 23),
        }))
    );
}

#[test]
fn test_same_day_sailing_closes_at_departure_time() {
    let attempt = |now| {
        plan_booking(
            &create_test_request(&["Ayu"], 0),
            &create_test_route(),
            &create_test_schedule(),
            &create_test_ledger(ResourceCounts::new(10, 0, 0, 0, 0)),
            DEPARTS_AT,
            "BK-20260302-000001",
            create_test_actor(),
            now,
        )
    };

    assert!(attempt(DEPARTS_AT - Duration::minutes(1)).is_ok());
    assert!(matches!(
        attempt(DEPARTS_AT),
        Err(CoreError::DomainViolation(DomainError::SailingDeparted { .. }))
    ));
}
