// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking aggregate, log and ticket lookups.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use ferry_book::BookingState;
use ferry_book_audit::BookingLogEntry;
use ferry_book_domain::{Booking, Payment, Refund, Ticket, Vehicle};

use crate::data_models::{
    BookingLogRow, BookingRow, PaymentRow, RefundRow, TicketRow, VehicleRow,
};
use crate::diesel_schema::{booking_logs, bookings, payments, refunds, tickets, vehicles};
use crate::error::PersistenceError;

/// A ticket found by check-in search, with the booking context an operator
/// needs to decide on boarding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketMatch {
    pub ticket: Ticket,
    pub booking: Booking,
}

/// Loads a booking together with its tickets, vehicles, payments and
/// refund.
///
/// # Errors
///
/// Returns `NotFound` if the booking does not exist.
pub fn load_booking_state(
    conn: &mut SqliteConnection,
    booking_id: i64,
) -> Result<BookingState, PersistenceError> {
    debug!(booking_id, "Loading booking aggregate");

    let booking_row: BookingRow = bookings::table
        .filter(bookings::booking_id.eq(booking_id))
        .select(BookingRow::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::NotFound(format!("booking {booking_id}")))?;

    let ticket_list: Vec<Ticket> = tickets::table
        .filter(tickets::booking_id.eq(booking_id))
        .order(tickets::ticket_id.asc())
        .select(TicketRow::as_select())
        .load(conn)?
        .into_iter()
        .map(Ticket::try_from)
        .collect::<Result<_, _>>()?;

    let vehicle_list: Vec<Vehicle> = vehicles::table
        .filter(vehicles::booking_id.eq(booking_id))
        .order(vehicles::vehicle_id.asc())
        .select(VehicleRow::as_select())
        .load(conn)?
        .into_iter()
        .map(Vehicle::try_from)
        .collect::<Result<_, _>>()?;

    let payment_list: Vec<Payment> = payments::table
        .filter(payments::booking_id.eq(booking_id))
        .order(payments::payment_id.asc())
        .select(PaymentRow::as_select())
        .load(conn)?
        .into_iter()
        .map(Payment::try_from)
        .collect::<Result<_, _>>()?;

    let refund: Option<Refund> = refunds::table
        .filter(refunds::booking_id.eq(booking_id))
        .select(RefundRow::as_select())
        .first(conn)
        .optional()?
        .map(Refund::try_from)
        .transpose()?;

    Ok(BookingState {
        booking: Booking::try_from(booking_row)?,
        tickets: ticket_list,
        vehicles: vehicle_list,
        payments: payment_list,
        refund,
    })
}

/// Resolves a booking code to its ID.
///
/// # Errors
///
/// Returns `NotFound` if no booking carries the code.
pub fn find_booking_id_by_code(
    conn: &mut SqliteConnection,
    booking_code: &str,
) -> Result<i64, PersistenceError> {
    bookings::table
        .filter(bookings::booking_code.eq(booking_code))
        .select(bookings::booking_id)
        .first(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::NotFound(format!("booking {booking_code}")))
}

/// Resolves a ticket code to the ID of its booking.
///
/// # Errors
///
/// Returns `NotFound` if no ticket carries the code.
pub fn find_booking_id_by_ticket(
    conn: &mut SqliteConnection,
    ticket_code: &str,
) -> Result<i64, PersistenceError> {
    tickets::table
        .filter(tickets::ticket_code.eq(ticket_code))
        .select(tickets::booking_id)
        .first(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::NotFound(format!("ticket {ticket_code}")))
}

/// Number of bookings whose code starts with `prefix`.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count_bookings_with_prefix(
    conn: &mut SqliteConnection,
    prefix: &str,
) -> Result<i64, PersistenceError> {
    Ok(bookings::table
        .filter(bookings::booking_code.like(format!("{prefix}%")))
        .count()
        .get_result(conn)?)
}

/// The log timeline of a booking, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn booking_log(
    conn: &mut SqliteConnection,
    booking_id: i64,
) -> Result<Vec<BookingLogEntry>, PersistenceError> {
    booking_logs::table
        .filter(booking_logs::booking_id.eq(booking_id))
        .order(booking_logs::log_id.asc())
        .select(BookingLogRow::as_select())
        .load(conn)?
        .into_iter()
        .map(BookingLogEntry::try_from)
        .collect()
}

/// Searches tickets by ticket code, passenger ID number or passenger name.
///
/// Name matching ignores ASCII case. When `permitted_routes` is given, only
/// tickets whose booking is on one of those routes are returned.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn find_tickets(
    conn: &mut SqliteConnection,
    identifier: &str,
    permitted_routes: Option<&[i64]>,
) -> Result<Vec<TicketMatch>, PersistenceError> {
    let identifier: String = identifier.trim().to_string();
    let name_pattern: String = identifier.replace('%', "").replace('_', "");

    let mut query = tickets::table
        .inner_join(bookings::table)
        .filter(
            tickets::ticket_code
                .eq(identifier.clone())
                .or(tickets::passenger_id_number.eq(identifier.clone()))
                .or(tickets::passenger_name.like(name_pattern)),
        )
        .order(tickets::ticket_id.asc())
        .select((TicketRow::as_select(), BookingRow::as_select()))
        .into_boxed();

    if let Some(routes) = permitted_routes {
        query = query.filter(bookings::route_id.eq_any(routes.to_vec()));
    }

    query
        .load::<(TicketRow, BookingRow)>(conn)?
        .into_iter()
        .map(|(ticket, booking)| {
            Ok(TicketMatch {
                ticket: Ticket::try_from(ticket)?,
                booking: Booking::try_from(booking)?,
            })
        })
        .collect()
}
