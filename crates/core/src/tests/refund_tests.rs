// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::*;
use crate::{BookingState, Command, CoreError, apply};
use ferry_book_domain::{
    BookingStatus, DomainError, PaymentStatus, RefundQuote, RefundStatus, ResourceCounts,
    TicketStatus,
};

fn quote(eligible: bool, amount: i64) -> RefundQuote {
    RefundQuote {
        eligible,
        days_before: 10,
        percentage: if eligible { 80 } else { 0 },
        amount,
        rule_id: Some(1),
    }
}

fn request(state: &BookingState, eligible: bool) -> Result<crate::TransitionResult, CoreError> {
    apply(
        state,
        Command::RequestRefund {
            quote: quote(eligible, 40_000),
            reason: String::from("cannot travel"),
            refund_method: Some(String::from("bank_transfer")),
            bank_details: None,
        },
        create_test_actor(),
        NOW,
    )
}

#[test]
fn test_request_on_confirmed_cancels_and_creates_pending_refund() {
    let state = create_confirmed_booking(&["Ayu"], 0);

    let result = request(&state, true).unwrap();

    let new_state = &result.new_state;
    assert_eq!(new_state.booking.status, BookingStatus::Cancelled);
    assert!(
        new_state
            .tickets
            .iter()
            .all(|t| t.status == TicketStatus::Cancelled)
    );
    assert_eq!(
        result.capacity_release,
        Some(ResourceCounts::new(1, 0, 0, 0, 0))
    );

    let refund = new_state.refund.as_ref().unwrap();
    assert_eq!(refund.status, RefundStatus::Pending);
    assert_eq!(refund.amount, 40_000);
    assert_eq!(refund.payment_id, Some(1));
    assert_eq!(result.log_entry.new_status, BookingStatus::Cancelled);
}

#[test]
fn test_request_on_already_cancelled_does_not_release_twice() {
    let state = create_confirmed_booking(&["Ayu"], 0);
    let cancelled = apply(
        &state,
        Command::Transition {
            target: BookingStatus::Cancelled,
            note: None,
        },
        create_test_admin(),
        NOW,
    )
    .unwrap()
    .new_state;

    let result = request(&cancelled, true).unwrap();

    assert_eq!(result.capacity_release, None);
    assert!(result.new_state.refund.is_some());
}

#[test]
fn test_unpaid_booking_cannot_request_refund() {
    let state = create_pending_booking(&["Ayu"], 0);
    assert!(matches!(
        request(&state, true),
        Err(CoreError::DomainViolation(DomainError::IllegalTransition { .. }))
    ));
}

#[test]
fn test_ineligible_quote_rejected() {
    let state = create_confirmed_booking(&["Ayu"], 0);
    assert!(matches!(
        request(&state, false),
        Err(CoreError::DomainViolation(DomainError::RefundNotEligible { .. }))
    ));
}

#[test]
fn test_second_request_rejected() {
    let state = create_confirmed_booking(&["Ayu"], 0);
    let once = request(&state, true).unwrap().new_state;
    assert!(matches!(
        request(&once, true),
        Err(CoreError::DomainViolation(DomainError::RefundAlreadyRequested { .. }))
    ));
}

#[test]
fn test_approve_then_complete_marks_payment_and_booking_refunded() {
    let state = create_confirmed_booking(&["Ayu"], 0);
    let requested = request(&state, true).unwrap().new_state;

    let approved = apply(
        &requested,
        Command::ApproveRefund {
            note: Some(String::from("ok")),
        },
        create_test_admin(),
        NOW,
    )
    .unwrap();
    let refund = approved.new_state.refund.as_ref().unwrap();
    assert_eq!(refund.status, RefundStatus::Approved);
    assert_eq!(refund.decided_by.as_deref(), Some("admin-1"));
    assert_eq!(approved.log_entry.previous_status, Some(BookingStatus::Cancelled));
    assert_eq!(approved.log_entry.new_status, BookingStatus::Cancelled);

    let completed = apply(
        &approved.new_state,
        Command::CompleteRefund {
            transaction_id: String::from("RF-1"),
        },
        create_test_admin(),
        NOW,
    )
    .unwrap();

    let new_state = &completed.new_state;
    assert_eq!(new_state.booking.status, BookingStatus::Refunded);
    assert_eq!(new_state.payments[0].status, PaymentStatus::Refunded);
    let refund = new_state.refund.as_ref().unwrap();
    assert_eq!(refund.status, RefundStatus::Completed);
    assert_eq!(refund.transaction_id.as_deref(), Some("RF-1"));
    assert_eq!(completed.log_entry.new_status, BookingStatus::Refunded);
}

#[test]
fn test_complete_requires_approval() {
    let state = create_confirmed_booking(&["Ayu"], 0);
    let requested = request(&state, true).unwrap().new_state;

    let result = apply(
        &requested,
        Command::CompleteRefund {
            transaction_id: String::from("RF-1"),
        },
        create_test_admin(),
        NOW,
    );

    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::IllegalTransition {
            entity: "refund",
            ..
        }))
    ));
}

#[test]
fn test_rejected_refund_is_final() {
    let state = create_confirmed_booking(&["Ayu"], 0);
    let requested = request(&state, true).unwrap().new_state;
    let rejected = apply(
        &requested,
        Command::RejectRefund { note: None },
        create_test_admin(),
        NOW,
    )
    .unwrap()
    .new_state;

    assert!(
        apply(
            &rejected,
            Command::ApproveRefund { note: None },
            create_test_admin(),
            NOW
        )
        .is_err()
    );
    assert_eq!(rejected.booking.status, BookingStatus::Cancelled);
}

#[test]
fn test_decision_without_refund_not_found() {
    let state = create_confirmed_booking(&["Ayu"], 0);
    assert!(matches!(
        apply(
            &state,
            Command::ApproveRefund { note: None },
            create_test_admin(),
            NOW
        ),
        Err(CoreError::NotFound {
            resource: "refund",
            ..
        })
    ));
}
