// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::Command;
use crate::error::CoreError;
use crate::state::{BookingState, TransitionResult};
use ferry_book_audit::{Actor, BookingLogEntry};
use ferry_book_domain::{
    BankDetails, BookingStatus, CheckInRecord, DomainError, PaymentStatus, Refund, RefundQuote,
    RefundStatus, TicketStatus, validate_check_in_window, validate_ticket_for_check_in,
};
use time::OffsetDateTime;

/// Applies a command to a booking, producing the new aggregate, any
/// capacity to release, and exactly one log entry.
///
/// # Arguments
///
/// * `state` - The current booking aggregate (immutable)
/// * `command` - The command to apply
/// * `actor` - The actor performing this action
/// * `now` - The current instant
///
/// # Errors
///
/// Returns an error if:
/// - The command violates the booking, ticket, payment or refund lifecycle
/// - A referenced ticket or refund does not exist
pub fn apply(
    state: &BookingState,
    command: Command,
    actor: Actor,
    now: OffsetDateTime,
) -> Result<TransitionResult, CoreError> {
    match command {
        Command::Transition { target, note } => transition(state, target, note, actor, now),
        Command::CheckIn {
            ticket_code,
            record,
            today,
        } => check_in(state, &ticket_code, record, today, actor, now),
        Command::RequestRefund {
            quote,
            reason,
            refund_method,
            bank_details,
        } => request_refund(state, &quote, reason, refund_method, bank_details, actor, now),
        Command::ApproveRefund { note } => {
            decide_refund(state, RefundStatus::Approved, note, actor, now)
        }
        Command::RejectRefund { note } => {
            decide_refund(state, RefundStatus::Rejected, note, actor, now)
        }
        Command::CompleteRefund { transaction_id } => {
            complete_refund(state, transaction_id, actor, now)
        }
        Command::Reschedule { new_booking_code } => {
            retire_for_reschedule(state, &new_booking_code, actor, now)
        }
    }
}

fn transition(
    state: &BookingState,
    target: BookingStatus,
    note: Option<String>,
    actor: Actor,
    now: OffsetDateTime,
) -> Result<TransitionResult, CoreError> {
    let previous = state.booking.status;
    previous.validate_transition(target)?;

    let mut new_state = state.clone();
    new_state.booking.status = target;
    new_state.booking.updated_at = now;
    let mut capacity_release = None;

    match target {
        BookingStatus::Cancelled => {
            cancel_in_place(&mut new_state, note.clone());
            capacity_release = Some(state.demand());
        }
        BookingStatus::Completed => {
            for ticket in &mut new_state.tickets {
                if ticket.status == TicketStatus::Active {
                    ticket.status = TicketStatus::Used;
                }
            }
        }
        BookingStatus::Confirmed => {
            if let Some(payment) = new_state.pending_payment_mut() {
                payment.status = PaymentStatus::Success;
                payment.payment_date = Some(now);
            }
        }
        BookingStatus::Pending | BookingStatus::Refunded | BookingStatus::Rescheduled => {}
    }

    Ok(TransitionResult {
        new_state,
        capacity_release,
        log_entry: BookingLogEntry::new(Some(previous), target, actor, note, now),
    })
}

/// Cancels tickets and an unpaid attempt. A settled payment is left for
/// the refund flow.
fn cancel_in_place(state: &mut BookingState, reason: Option<String>) {
    state.booking.status = BookingStatus::Cancelled;
    state.booking.cancellation_reason = reason;
    for ticket in &mut state.tickets {
        ticket.status = TicketStatus::Cancelled;
    }
    if let Some(payment) = state.pending_payment_mut() {
        payment.status = PaymentStatus::Failed;
    }
}

fn check_in(
    state: &BookingState,
    ticket_code: &str,
    record: CheckInRecord,
    today: time::Date,
    actor: Actor,
    now: OffsetDateTime,
) -> Result<TransitionResult, CoreError> {
    let ticket = state
        .tickets
        .iter()
        .find(|t| t.ticket_code == ticket_code)
        .ok_or_else(|| CoreError::NotFound {
            resource: "ticket",
            id: ticket_code.to_string(),
        })?;

    validate_ticket_for_check_in(
        &ticket.ticket_code,
        ticket.status,
        ticket.checked_in,
        state.booking.status,
    )?;
    validate_check_in_window(state.booking.departure_date, today)?;

    let mut new_state = state.clone();
    for ticket in &mut new_state.tickets {
        if ticket.ticket_code == ticket_code {
            ticket.checked_in = true;
            ticket.boarding_time = Some(now);
            ticket.check_in = Some(record.clone());
        }
    }

    // Completion is keyed on `checked_in`; ticket status stays ACTIVE.
    let all_boarded = new_state.tickets.iter().all(|t| t.checked_in);
    let previous = state.booking.status;
    let (target, note) = if all_boarded {
        new_state.booking.status = BookingStatus::Completed;
        (
            BookingStatus::Completed,
            format!("Ticket {ticket_code} checked in; all passengers boarded"),
        )
    } else {
        (previous, format!("Ticket {ticket_code} checked in"))
    };
    new_state.booking.updated_at = now;

    Ok(TransitionResult {
        new_state,
        capacity_release: None,
        log_entry: BookingLogEntry::new(Some(previous), target, actor, Some(note), now),
    })
}

fn request_refund(
    state: &BookingState,
    quote: &RefundQuote,
    reason: String,
    refund_method: Option<String>,
    bank_details: Option<BankDetails>,
    actor: Actor,
    now: OffsetDateTime,
) -> Result<TransitionResult, CoreError> {
    let booking_id = state.booking.booking_id.unwrap_or_default();
    if state.refund.is_some() {
        return Err(DomainError::RefundAlreadyRequested { booking_id }.into());
    }

    let previous = state.booking.status;
    if !matches!(previous, BookingStatus::Confirmed | BookingStatus::Cancelled) {
        return Err(DomainError::IllegalTransition {
            entity: "booking",
            from: previous.as_str().to_string(),
            to: BookingStatus::Cancelled.as_str().to_string(),
        }
        .into());
    }

    let payment = state
        .settled_payment()
        .ok_or_else(|| DomainError::PaymentNotSettled {
            status: state
                .payments
                .last()
                .map_or("none", |p| p.status.as_str())
                .to_string(),
        })?;

    if !quote.eligible {
        return Err(DomainError::RefundNotEligible {
            days_before: quote.days_before,
        }
        .into());
    }

    let mut new_state = state.clone();
    let mut capacity_release = None;
    if previous == BookingStatus::Confirmed {
        cancel_in_place(&mut new_state, Some(reason.clone()));
        capacity_release = Some(state.demand());
    }
    new_state.booking.updated_at = now;
    new_state.refund = Some(Refund {
        refund_id: None,
        payment_id: payment.payment_id,
        amount: quote.amount,
        reason: reason.clone(),
        refund_method,
        bank_details,
        status: RefundStatus::Pending,
        transaction_id: None,
        decided_by: None,
        decision_note: None,
        created_at: now,
        updated_at: now,
    });

    let note = format!(
        "Refund requested: {} ({}% with {} day(s) to departure): {reason}",
        quote.amount, quote.percentage, quote.days_before
    );

    Ok(TransitionResult {
        new_state,
        capacity_release,
        log_entry: BookingLogEntry::new(
            Some(previous),
            BookingStatus::Cancelled,
            actor,
            Some(note),
            now,
        ),
    })
}

fn decide_refund(
    state: &BookingState,
    decision: RefundStatus,
    note: Option<String>,
    actor: Actor,
    now: OffsetDateTime,
) -> Result<TransitionResult, CoreError> {
    let refund = existing_refund(state)?;
    refund.status.validate_transition(decision)?;

    let mut new_state = state.clone();
    if let Some(refund) = new_state.refund.as_mut() {
        refund.status = decision;
        refund.decided_by = Some(actor.id.clone());
        refund.decision_note.clone_from(&note);
        refund.updated_at = now;
    }

    let status = state.booking.status;
    let summary = match &note {
        Some(note) => format!("Refund {}: {note}", decision.as_str()),
        None => format!("Refund {}", decision.as_str()),
    };

    Ok(TransitionResult {
        new_state,
        capacity_release: None,
        log_entry: BookingLogEntry::new(Some(status), status, actor, Some(summary), now),
    })
}

fn complete_refund(
    state: &BookingState,
    transaction_id: String,
    actor: Actor,
    now: OffsetDateTime,
) -> Result<TransitionResult, CoreError> {
    let refund = existing_refund(state)?;
    refund.status.validate_transition(RefundStatus::Completed)?;

    let previous = state.booking.status;
    if previous != BookingStatus::Cancelled {
        return Err(DomainError::IllegalTransition {
            entity: "booking",
            from: previous.as_str().to_string(),
            to: BookingStatus::Refunded.as_str().to_string(),
        }
        .into());
    }

    let mut new_state = state.clone();
    let payment = new_state
        .settled_payment_mut()
        .ok_or_else(|| DomainError::PaymentNotSettled {
            status: String::from("none"),
        })?;
    payment.status.validate_transition(PaymentStatus::Refunded)?;
    payment.status = PaymentStatus::Refunded;

    if let Some(refund) = new_state.refund.as_mut() {
        refund.status = RefundStatus::Completed;
        refund.transaction_id = Some(transaction_id.clone());
        refund.updated_at = now;
    }
    new_state.booking.status = BookingStatus::Refunded;
    new_state.booking.updated_at = now;

    Ok(TransitionResult {
        new_state,
        capacity_release: None,
        log_entry: BookingLogEntry::new(
            Some(previous),
            BookingStatus::Refunded,
            actor,
            Some(format!("Refund completed: {transaction_id}")),
            now,
        ),
    })
}

fn retire_for_reschedule(
    state: &BookingState,
    new_booking_code: &str,
    actor: Actor,
    now: OffsetDateTime,
) -> Result<TransitionResult, CoreError> {
    let previous = state.booking.status;
    if previous != BookingStatus::Confirmed {
        return Err(DomainError::IllegalTransition {
            entity: "booking",
            from: previous.as_str().to_string(),
            to: BookingStatus::Rescheduled.as_str().to_string(),
        }
        .into());
    }

    let mut new_state = state.clone();
    new_state.booking.status = BookingStatus::Rescheduled;
    new_state.booking.updated_at = now;
    for ticket in &mut new_state.tickets {
        ticket.status = TicketStatus::Cancelled;
    }

    Ok(TransitionResult {
        new_state,
        capacity_release: Some(state.demand()),
        log_entry: BookingLogEntry::new(
            Some(previous),
            BookingStatus::Rescheduled,
            actor,
            Some(format!("Rescheduled to {new_booking_code}")),
            now,
        ),
    })
}

fn existing_refund(state: &BookingState) -> Result<&Refund, CoreError> {
    state.refund.as_ref().ok_or_else(|| CoreError::NotFound {
        resource: "refund",
        id: state.booking.booking_code.clone(),
    })
}
