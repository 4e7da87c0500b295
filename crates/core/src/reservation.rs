// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking creation.
//!
//! Planning a booking checks the manifest, the recurrence rule, that the
//! sailing has not left, route and schedule status, and reserves capacity on
//! a copy of the ledger entry.
//! Nothing is built unless the reservation succeeds, so a failed plan
//! leaves no trace.

use crate::command::BookingRequest;
use crate::error::CoreError;
use crate::state::{BookingPlan, BookingState};
use ferry_book_audit::{Actor, BookingLogEntry};
use ferry_book_domain::{
    Booking, BookingStatus, DomainError, LedgerEntry, Manifest, Payment, PaymentStatus, Route,
    Schedule, Ticket, TicketStatus, Vehicle, ticket_code,
};
use time::OffsetDateTime;

/// Plans a new PENDING booking with one ticket per passenger and a
/// pending payment for the full fare.
///
/// `departs_at` is the sailing's departure instant in UTC, resolved through
/// the operating timezone.
///
/// # Errors
///
/// - `InvalidManifest` for a malformed manifest
/// - `DayNotServed` if the schedule does not run on that weekday
/// - `SailingDeparted` if `departs_at` is not after `now`
/// - `ScheduleClosed` if the route, schedule or ledger entry is closed
/// - `InsufficientCapacity` if any resource class lacks room
#[allow(clippy::too_many_arguments)]
pub fn plan_booking(
    request: &BookingRequest,
    route: &Route,
    schedule: &Schedule,
    ledger: &LedgerEntry,
    departs_at: OffsetDateTime,
    booking_code: &str,
    actor: Actor,
    now: OffsetDateTime,
) -> Result<BookingPlan, CoreError> {
    let (ledger, total_amount) = reserve(request, route, schedule, ledger, departs_at, now)?;

    let state = build_state(
        request,
        route,
        booking_code,
        total_amount,
        BookingStatus::Pending,
        None,
        Payment {
            payment_id: None,
            amount: total_amount,
            status: PaymentStatus::Pending,
            payment_method: None,
            transaction_id: None,
            payment_date: None,
            created_at: now,
        },
        now,
    );

    Ok(BookingPlan {
        state,
        ledger,
        log_entry: BookingLogEntry::new(
            None,
            BookingStatus::Pending,
            actor,
            Some(String::from("Booking created")),
            now,
        ),
    })
}

/// Plans the CONFIRMED replacement for a rescheduled booking.
///
/// The replacement keeps the original manifest and amount, and carries a
/// settled payment referencing the original transaction. The original is
/// retired separately with [`crate::Command::Reschedule`].
///
/// # Errors
///
/// - `IllegalTransition` unless the original is CONFIRMED
/// - `RouteMismatch` if the new schedule is on another route
/// - any reservation error from [`plan_booking`]
#[allow(clippy::too_many_arguments)]
pub fn plan_rescheduled_booking(
    original: &BookingState,
    schedule: &Schedule,
    route: &Route,
    departure_date: time::Date,
    ledger: &LedgerEntry,
    departs_at: OffsetDateTime,
    booking_code: &str,
    actor: Actor,
    now: OffsetDateTime,
) -> Result<BookingPlan, CoreError> {
    let previous = original.booking.status;
    if previous != BookingStatus::Confirmed {
        return Err(DomainError::IllegalTransition {
            entity: "booking",
            from: previous.as_str().to_string(),
            to: BookingStatus::Rescheduled.as_str().to_string(),
        }
        .into());
    }
    if schedule.route_id != original.booking.route_id {
        return Err(DomainError::RouteMismatch {
            from_route: original.booking.route_id,
            to_route: schedule.route_id,
        }
        .into());
    }

    let request = BookingRequest {
        user_id: original.booking.user_id.clone(),
        schedule_id: schedule.schedule_id.unwrap_or_default(),
        departure_date,
        manifest: original.manifest(),
    };
    let (ledger, _) = reserve(&request, route, schedule, ledger, departs_at, now)?;

    let amount = original.booking.total_amount;
    let transaction_id = original
        .settled_payment()
        .and_then(|p| p.transaction_id.clone());

    let state = build_state(
        &request,
        route,
        booking_code,
        amount,
        BookingStatus::Confirmed,
        original.booking.booking_id,
        Payment {
            payment_id: None,
            amount,
            status: PaymentStatus::Success,
            payment_method: Some(String::from("reschedule")),
            transaction_id,
            payment_date: Some(now),
            created_at: now,
        },
        now,
    );

    Ok(BookingPlan {
        state,
        ledger,
        log_entry: BookingLogEntry::new(
            None,
            BookingStatus::Confirmed,
            actor,
            Some(format!(
                "Rescheduled from {}",
                original.booking.booking_code
            )),
            now,
        ),
    })
}

/// Runs every pre-check and reserves on a copy of the ledger entry.
fn reserve(
    request: &BookingRequest,
    route: &Route,
    schedule: &Schedule,
    ledger: &LedgerEntry,
    departs_at: OffsetDateTime,
    now: OffsetDateTime,
) -> Result<(LedgerEntry, i64), CoreError> {
    request.manifest.validate()?;
    schedule
        .operating_days
        .ensure_serves(request.departure_date)?;
    if departs_at <= now {
        return Err(DomainError::SailingDeparted {
            departure_date: request.departure_date,
        }
        .into());
    }
    route.ensure_open(now)?;
    schedule.ensure_open(now)?;

    let demand = request.manifest.demand();
    let total_amount = route.fares.total(&demand)?;

    let mut ledger = ledger.clone();
    ledger.apply_expiry(now);
    ledger.try_reserve(&demand)?;

    Ok((ledger, total_amount))
}

#[allow(clippy::too_many_arguments)]
fn build_state(
    request: &BookingRequest,
    route: &Route,
    booking_code: &str,
    total_amount: i64,
    status: BookingStatus,
    rescheduled_from: Option<i64>,
    payment: Payment,
    now: OffsetDateTime,
) -> BookingState {
    let manifest: &Manifest = &request.manifest;

    let tickets: Vec<Ticket> = manifest
        .passengers
        .iter()
        .enumerate()
        .map(|(index, passenger)| Ticket {
            ticket_id: None,
            ticket_code: ticket_code(booking_code, index),
            passenger_name: passenger.name.trim().to_string(),
            passenger_id_number: passenger.id_number.clone(),
            status: TicketStatus::Active,
            checked_in: false,
            boarding_time: None,
            check_in: None,
        })
        .collect();

    let vehicles: Vec<Vehicle> = manifest
        .vehicles
        .iter()
        .map(|spec| Vehicle {
            vehicle_id: None,
            class: spec.class,
            license_plate: spec.license_plate.trim().to_string(),
            driver_ticket_code: spec
                .driver
                .and_then(|index| tickets.get(index))
                .map(|t| t.ticket_code.clone()),
        })
        .collect();

    let demand = manifest.demand();

    BookingState {
        booking: Booking {
            booking_id: None,
            booking_code: booking_code.to_string(),
            user_id: request.user_id.clone(),
            schedule_id: request.schedule_id,
            route_id: route.route_id.unwrap_or_default(),
            departure_date: request.departure_date,
            passenger_count: demand.passengers,
            vehicle_count: demand.vehicle_total(),
            total_amount,
            status,
            cancellation_reason: None,
            rescheduled_from,
            created_at: now,
            updated_at: now,
        },
        tickets,
        vehicles,
        payments: vec![payment],
        refund: None,
    }
}
