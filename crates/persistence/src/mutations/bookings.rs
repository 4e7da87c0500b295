// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking aggregate writes and the booking log.
//!
//! The aggregate is always written as a whole: whatever a transition
//! changed on tickets, payments or the refund lands together with the
//! booking row, inside the caller's transaction.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use ferry_book::BookingState;
use ferry_book_audit::BookingLogEntry;
use ferry_book_domain::{Payment, Refund, Ticket, Vehicle};

use crate::connection::InsertedRowId;
use crate::codec::{encode_date, encode_flag, encode_instant, encode_optional_instant};
use crate::diesel_schema::{booking_logs, bookings, payments, refunds, tickets, vehicles};
use crate::error::PersistenceError;

fn require_id(id: Option<i64>, what: &str) -> Result<i64, PersistenceError> {
    id.ok_or_else(|| PersistenceError::NotFound(format!("unsaved {what}")))
}

/// Inserts a new booking with its tickets, vehicles and payments.
///
/// # Returns
///
/// The aggregate with every database ID filled in.
///
/// # Errors
///
/// Returns an error if any insert fails.
pub fn insert_booking_state(
    conn: &mut SqliteConnection,
    state: &BookingState,
) -> Result<BookingState, PersistenceError> {
    let booking = &state.booking;

    diesel::insert_into(bookings::table)
        .values((
            bookings::booking_code.eq(&booking.booking_code),
            bookings::user_id.eq(&booking.user_id),
            bookings::schedule_id.eq(booking.schedule_id),
            bookings::route_id.eq(booking.route_id),
            bookings::departure_date.eq(encode_date(booking.departure_date)?),
            bookings::passenger_count.eq(i64::from(booking.passenger_count)),
            bookings::vehicle_count.eq(i64::from(booking.vehicle_count)),
            bookings::total_amount.eq(booking.total_amount),
            bookings::status.eq(booking.status.as_str()),
            bookings::cancellation_reason.eq(&booking.cancellation_reason),
            bookings::rescheduled_from.eq(booking.rescheduled_from),
            bookings::created_at.eq(encode_instant(booking.created_at)?),
            bookings::updated_at.eq(encode_instant(booking.updated_at)?),
        ))
        .execute(conn)?;

    let booking_id: i64 = conn.last_row_id()?;

    let mut saved: BookingState = state.clone();
    saved.booking.booking_id = Some(booking_id);

    for ticket in &mut saved.tickets {
        ticket.ticket_id = Some(insert_ticket(conn, booking_id, ticket)?);
    }
    for vehicle in &mut saved.vehicles {
        vehicle.vehicle_id = Some(insert_vehicle(conn, booking_id, vehicle)?);
    }
    for payment in &mut saved.payments {
        payment.payment_id = Some(insert_payment(conn, booking_id, payment)?);
    }
    if let Some(refund) = &mut saved.refund {
        refund.refund_id = Some(insert_refund(conn, booking_id, refund)?);
    }

    debug!(
        booking_id,
        booking_code = %booking.booking_code,
        tickets = saved.tickets.len(),
        vehicles = saved.vehicles.len(),
        "Inserted booking"
    );

    Ok(saved)
}

/// Writes back a transitioned aggregate.
///
/// Payments or a refund without an ID are inserted; everything else is
/// updated in place.
///
/// # Returns
///
/// The aggregate with any newly assigned IDs filled in.
///
/// # Errors
///
/// Returns an error if any write fails.
pub fn update_booking_state(
    conn: &mut SqliteConnection,
    state: &BookingState,
) -> Result<BookingState, PersistenceError> {
    let booking = &state.booking;
    let booking_id: i64 = require_id(booking.booking_id, "booking")?;

    diesel::update(bookings::table.filter(bookings::booking_id.eq(booking_id)))
        .set((
            bookings::status.eq(booking.status.as_str()),
            bookings::cancellation_reason.eq(&booking.cancellation_reason),
            bookings::updated_at.eq(encode_instant(booking.updated_at)?),
        ))
        .execute(conn)?;

    let mut saved: BookingState = state.clone();

    for ticket in &saved.tickets {
        update_ticket(conn, ticket)?;
    }

    for payment in &mut saved.payments {
        match payment.payment_id {
            Some(payment_id) => update_payment(conn, payment_id, payment)?,
            None => payment.payment_id = Some(insert_payment(conn, booking_id, payment)?),
        }
    }

    if let Some(refund) = &mut saved.refund {
        match refund.refund_id {
            Some(refund_id) => update_refund(conn, refund_id, refund)?,
            None => refund.refund_id = Some(insert_refund(conn, booking_id, refund)?),
        }
    }

    debug!(booking_id, status = booking.status.as_str(), "Updated booking");
    Ok(saved)
}

/// Appends one row to the booking log.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_booking_log(
    conn: &mut SqliteConnection,
    booking_id: i64,
    entry: &BookingLogEntry,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(booking_logs::table)
        .values((
            booking_logs::booking_id.eq(booking_id),
            booking_logs::previous_status.eq(entry.previous_status.map(|s| s.as_str())),
            booking_logs::new_status.eq(entry.new_status.as_str()),
            booking_logs::actor_type.eq(entry.actor.actor_type.as_str()),
            booking_logs::actor_id.eq(&entry.actor.id),
            booking_logs::note.eq(&entry.note),
            booking_logs::ip_address.eq(&entry.ip_address),
            booking_logs::recorded_at.eq(encode_instant(entry.recorded_at)?),
        ))
        .execute(conn)?;

    let log_id: i64 = conn.last_row_id()?;
    debug!(
        log_id,
        booking_id,
        new_status = entry.new_status.as_str(),
        "Appended booking log"
    );
    Ok(log_id)
}

fn insert_ticket(
    conn: &mut SqliteConnection,
    booking_id: i64,
    ticket: &Ticket,
) -> Result<i64, PersistenceError> {
    let check_in = ticket.check_in.as_ref();
    diesel::insert_into(tickets::table)
        .values((
            tickets::booking_id.eq(booking_id),
            tickets::ticket_code.eq(&ticket.ticket_code),
            tickets::passenger_name.eq(&ticket.passenger_name),
            tickets::passenger_id_number.eq(&ticket.passenger_id_number),
            tickets::status.eq(ticket.status.as_str()),
            tickets::checked_in.eq(encode_flag(ticket.checked_in)),
            tickets::boarding_time.eq(encode_optional_instant(ticket.boarding_time)?),
            tickets::checked_in_by.eq(check_in.map(|c| c.operator_id.clone())),
            tickets::check_in_location.eq(check_in.and_then(|c| c.location.clone())),
            tickets::signature_ref.eq(check_in.and_then(|c| c.signature_ref.clone())),
        ))
        .execute(conn)?;
    conn.last_row_id()
}

fn update_ticket(conn: &mut SqliteConnection, ticket: &Ticket) -> Result<(), PersistenceError> {
    let ticket_id: i64 = require_id(ticket.ticket_id, "ticket")?;
    let check_in = ticket.check_in.as_ref();
    diesel::update(tickets::table.filter(tickets::ticket_id.eq(ticket_id)))
        .set((
            tickets::status.eq(ticket.status.as_str()),
            tickets::checked_in.eq(encode_flag(ticket.checked_in)),
            tickets::boarding_time.eq(encode_optional_instant(ticket.boarding_time)?),
            tickets::checked_in_by.eq(check_in.map(|c| c.operator_id.clone())),
            tickets::check_in_location.eq(check_in.and_then(|c| c.location.clone())),
            tickets::signature_ref.eq(check_in.and_then(|c| c.signature_ref.clone())),
        ))
        .execute(conn)?;
    Ok(())
}

fn insert_vehicle(
    conn: &mut SqliteConnection,
    booking_id: i64,
    vehicle: &Vehicle,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(vehicles::table)
        .values((
            vehicles::booking_id.eq(booking_id),
            vehicles::vehicle_class.eq(vehicle.class.as_str()),
            vehicles::license_plate.eq(&vehicle.license_plate),
            vehicles::driver_ticket_code.eq(&vehicle.driver_ticket_code),
        ))
        .execute(conn)?;
    conn.last_row_id()
}

fn insert_payment(
    conn: &mut SqliteConnection,
    booking_id: i64,
    payment: &Payment,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(payments::table)
        .values((
            payments::booking_id.eq(booking_id),
            payments::amount.eq(payment.amount),
            payments::status.eq(payment.status.as_str()),
            payments::payment_method.eq(&payment.payment_method),
            payments::transaction_id.eq(&payment.transaction_id),
            payments::payment_date.eq(encode_optional_instant(payment.payment_date)?),
            payments::created_at.eq(encode_instant(payment.created_at)?),
        ))
        .execute(conn)?;
    conn.last_row_id()
}

fn update_payment(
    conn: &mut SqliteConnection,
    payment_id: i64,
    payment: &Payment,
) -> Result<(), PersistenceError> {
    diesel::update(payments::table.filter(payments::payment_id.eq(payment_id)))
        .set((
            payments::status.eq(payment.status.as_str()),
            payments::payment_method.eq(&payment.payment_method),
            payments::transaction_id.eq(&payment.transaction_id),
            payments::payment_date.eq(encode_optional_instant(payment.payment_date)?),
        ))
        .execute(conn)?;
    Ok(())
}

fn insert_refund(
    conn: &mut SqliteConnection,
    booking_id: i64,
    refund: &Refund,
) -> Result<i64, PersistenceError> {
    let bank = refund.bank_details.as_ref();
    diesel::insert_into(refunds::table)
        .values((
            refunds::booking_id.eq(booking_id),
            refunds::payment_id.eq(refund.payment_id),
            refunds::amount.eq(refund.amount),
            refunds::reason.eq(&refund.reason),
            refunds::refund_method.eq(&refund.refund_method),
            refunds::bank_name.eq(bank.map(|b| b.bank_name.clone())),
            refunds::account_number.eq(bank.map(|b| b.account_number.clone())),
            refunds::account_holder.eq(bank.map(|b| b.account_holder.clone())),
            refunds::status.eq(refund.status.as_str()),
            refunds::transaction_id.eq(&refund.transaction_id),
            refunds::decided_by.eq(&refund.decided_by),
            refunds::decision_note.eq(&refund.decision_note),
            refunds::created_at.eq(encode_instant(refund.created_at)?),
            refunds::updated_at.eq(encode_instant(refund.updated_at)?),
        ))
        .execute(conn)?;
    conn.last_row_id()
}

fn update_refund(
    conn: &mut SqliteConnection,
    refund_id: i64,
    refund: &Refund,
) -> Result<(), PersistenceError> {
    diesel::update(refunds::table.filter(refunds::refund_id.eq(refund_id)))
        .set((
            refunds::status.eq(refund.status.as_str()),
            refunds::transaction_id.eq(&refund.transaction_id),
            refunds::decided_by.eq(&refund.decided_by),
            refunds::decision_note.eq(&refund.decision_note),
            refunds::updated_at.eq(encode_instant(refund.updated_at)?),
        ))
        .execute(conn)?;
    Ok(())
}
