// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::*;
use crate::{Command, CoreError, apply, plan_rescheduled_booking};
use ferry_book_domain::{
    BookingStatus, DomainError, LedgerEntry, PaymentStatus, ResourceCounts, TicketStatus,
};
use time::macros::{date, datetime};

const NEW_DATE: time::Date = date!(2026 - 03 - 04); // Wednesday
const NEW_DEPARTS_AT: time::OffsetDateTime = datetime!(2026-03-04 08:00 UTC);

fn new_ledger() -> LedgerEntry {
    LedgerEntry::open(10, NEW_DATE, ResourceCounts::new(50, 5, 5, 1, 1), None)
}

#[test]
fn test_reschedule_moves_capacity_and_settles_new_booking() {
    let original = create_confirmed_booking(&["Ayu", "Budi"], 1);

    let retired = apply(
        &original,
        Command::Reschedule {
            new_booking_code: String::from("BK-20260301-000002"),
        },
        create_test_actor(),
        NOW,
    )
    .unwrap();

    assert_eq!(retired.new_state.booking.status, BookingStatus::Rescheduled);
    assert!(
        retired
            .new_state
            .tickets
            .iter()
            .all(|t| t.status == TicketStatus::Cancelled)
    );
    assert_eq!(
        retired.capacity_release,
        Some(ResourceCounts::new(2, 0, 1, 0, 0))
    );
    assert_eq!(retired.log_entry.new_status, BookingStatus::Rescheduled);

    let plan = plan_rescheduled_booking(
        &original,
        &create_test_schedule(),
        &create_test_route(),
        NEW_DATE,
        &new_ledger(),
        NEW_DEPARTS_AT,
        "BK-20260301-000002",
        create_test_actor(),
        NOW,
    )
    .unwrap();

    let booking = &plan.state.booking;
    assert_eq!(booking.status, BookingStatus::Confirmed);
    assert_eq!(booking.departure_date, NEW_DATE);
    assert_eq!(booking.rescheduled_from, Some(1));
    assert_eq!(booking.total_amount, original.booking.total_amount);
    assert_eq!(plan.state.tickets.len(), 2);
    assert_eq!(
        plan.state.vehicles[0].driver_ticket_code.as_deref(),
        Some("BK-20260301-000002-P01")
    );

    let payment = &plan.state.payments[0];
    assert_eq!(payment.status, PaymentStatus::Success);
    assert_eq!(payment.payment_method.as_deref(), Some("reschedule"));
    assert_eq!(payment.transaction_id.as_deref(), Some("TX-1"));
    assert_eq!(plan.ledger.usage, ResourceCounts::new(2, 0, 1, 0, 0));
    assert_eq!(plan.log_entry.new_status, BookingStatus::Confirmed);
}

#[test]
fn test_pending_booking_cannot_reschedule() {
    let pending = create_pending_booking(&["Ayu"], 0);
    let result = apply(
        &pending,
        Command::Reschedule {
            new_booking_code: String::from("BK-X"),
        },
        create_test_actor(),
        NOW,
    );
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::IllegalTransition { .. }))
    ));
}

#[test]
fn test_other_route_rejected() {
    let original = create_confirmed_booking(&["Ayu"], 0);
    let mut schedule = create_test_schedule();
    schedule.route_id = 2;

    let result = plan_rescheduled_booking(
        &original,
        &schedule,
        &create_test_route(),
        NEW_DATE,
        &new_ledger(),
        NEW_DEPARTS_AT,
        "BK-X",
        create_test_actor(),
        NOW,
    );

    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::RouteMismatch { .. }))
    ));
}

#[test]
fn test_departed_sailing_rejected_as_target() {
    let original = create_confirmed_booking(&["Ayu"], 0);
    let past = date!(2026 - 02 - 25); // Wednesday

    let result = plan_rescheduled_booking(
        &original,
        &create_test_schedule(),
        &create_test_route(),
        past,
        &LedgerEntry::open(10, past, ResourceCounts::new(50, 5, 5, 1, 1), None),
        datetime!(2026-02-25 08:00 UTC),
        "BK-X",
        create_test_actor(),
        NOW,
    );

    assert_eq!(
        result,
        Err(CoreError::DomainViolation(DomainError::SailingDeparted {
            departure_date: past,
        }))
    );
}
