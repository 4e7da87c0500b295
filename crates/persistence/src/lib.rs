// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the ferry booking engine.
//!
//! This crate stores reference data, the capacity ledger, booking
//! aggregates, refund policy and both audit trails in `SQLite` through
//! Diesel, and runs every state-changing operation as one unit of work.
//!
//! ## Units of Work
//!
//! Each public mutating method on [`Persistence`] opens exactly one
//! `BEGIN IMMEDIATE` transaction, reads what it needs, hands it to the pure
//! transition functions of the `ferry_book` core crate, and writes the
//! result back together with its log or audit row. A rejected transition
//! rolls the transaction back, so nothing is half-written.
//!
//! `BEGIN IMMEDIATE` takes the database write lock up front. Two writers
//! can therefore never both read the same ledger counters and both decide
//! there is room: the second one waits (up to the busy timeout) and then
//! sees the first one's commit. Lock contention that outlasts the timeout
//! is retried a bounded number of times and then reported as
//! [`PersistenceError::ConcurrencyConflict`].
//!
//! ## Backends
//!
//! - In-memory shared-cache databases for tests (`new_in_memory`)
//! - File databases in WAL mode for the server (`new_with_file`)
//!
//! ## Testing Philosophy
//!
//! - Standard tests (`cargo test`) run against in-memory `SQLite`
//! - Multi-connection concurrency tests use temporary database files
//! - Migrations are embedded and applied on every open

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use time::OffsetDateTime;
use tracing::{debug, error, info, warn};

use ferry_book::{
    BookingRequest, BookingState, Command, LedgerCommand, TransitionResult, apply,
    apply_ledger_command, apply_route_status, apply_schedule_status, plan_booking,
    plan_rescheduled_booking, reconcile_payment, resolve_ledger, sweep_ledger, sweep_route,
    sweep_schedule,
};
use ferry_book_audit::{Actor, BookingLogEntry, Cause};
use ferry_book_domain::{
    BankDetails, BookingStatus, CheckInRecord, Ferry, LedgerEntry, LedgerStatus, OperatingZone,
    ProviderStatus, RefundPolicyRule, RefundQuote, ResourceCounts, Route, RouteStatus, Schedule,
    ScheduleStatus, StatusHold, booking_code, booking_code_prefix, evaluate_refund,
};

mod connection;
mod codec;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use error::PersistenceError;
pub use queries::{StoredAuditEvent, TicketMatch};

use connection::Storage;

/// Names the next in-memory database.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// How many times a unit of work is attempted when the database stays
/// locked past the busy timeout.
const MAX_WRITE_ATTEMPTS: u32 = 3;

/// Base pause between attempts; grows linearly with the attempt number.
const RETRY_BACKOFF: Duration = Duration::from_millis(25);

/// Outcome of delivering a payment provider report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// The booking after the report was handled.
    pub state: BookingState,
    /// False when the report was a duplicate or a no-op.
    pub applied: bool,
}

/// Both sides of a reschedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RescheduleOutcome {
    /// The retired booking, now RESCHEDULED.
    pub original: BookingState,
    /// The CONFIRMED replacement.
    pub replacement: BookingState,
}

/// A schedule status change and the ledger entries it cascaded to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleUpdate {
    pub schedule: Schedule,
    pub affected_entries: Vec<LedgerEntry>,
}

/// What one expiry sweep reactivated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub routes: usize,
    pub schedules: usize,
    pub ledger_entries: usize,
}

impl SweepReport {
    /// True if the sweep changed nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.routes == 0 && self.schedules == 0 && self.ledger_entries == 0
    }
}

/// Persistence adapter for the booking engine.
///
/// Owns one `SQLite` connection. Callers that need parallelism open one
/// adapter per worker against the same database file.
pub struct Persistence {
    conn: SqliteConnection,
}

impl Persistence {
    /// Opens a fresh shared in-memory database.
    ///
    /// Every call gets its own database, so tests never see each other's rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let url = format!("file:ferry_book_{db_id}?mode=memory&cache=shared");
        let conn: SqliteConnection = connection::open(&url, Storage::Memory)?;
        Ok(Self { conn })
    }

    /// Opens (creating if needed) the database file at `path` in WAL mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not UTF-8 or the database cannot be
    /// opened or migrated.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let url: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;
        let conn: SqliteConnection = connection::open(url, Storage::File)?;
        Ok(Self { conn })
    }

    /// Checks that the connection still enforces foreign keys.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        connection::ensure_foreign_keys(&mut self.conn)
    }

    /// Runs `work` as one `BEGIN IMMEDIATE` transaction.
    ///
    /// Any error rolls the whole unit back. Lock contention is retried up
    /// to [`MAX_WRITE_ATTEMPTS`] times.
    fn write<T, F>(&mut self, operation: &'static str, mut work: F) -> Result<T, PersistenceError>
    where
        F: FnMut(&mut SqliteConnection) -> Result<T, PersistenceError>,
    {
        let mut attempt: u32 = 1;
        loop {
            let result: Result<T, PersistenceError> =
                self.conn.immediate_transaction(&mut work);

            match result {
                Err(err) if err.is_retryable() && attempt < MAX_WRITE_ATTEMPTS => {
                    warn!(operation, attempt, error = %err, "Database locked, retrying");
                    std::thread::sleep(RETRY_BACKOFF * attempt);
                    attempt += 1;
                }
                Err(err) if err.is_retryable() => {
                    error!(operation, attempt, error = %err, "Giving up on locked database");
                    return Err(PersistenceError::ConcurrencyConflict(format!(
                        "{operation}: {err}"
                    )));
                }
                Err(err @ (PersistenceError::Rejected(_) | PersistenceError::NotFound(_))) => {
                    debug!(operation, error = %err, "Unit of work rolled back");
                    return Err(err);
                }
                Err(err) => {
                    error!(operation, error = %err, "Unit of work failed");
                    return Err(err);
                }
                Ok(value) => return Ok(value),
            }
        }
    }

    // ========================================================================
    // Reference Data
    // ========================================================================

    /// Stores a new route.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_route(&mut self, route: &Route) -> Result<Route, PersistenceError> {
        let created: Route = self.write("create_route", |conn| {
            let route_id: i64 = mutations::insert_route(conn, route)?;
            queries::get_route(conn, route_id)
        })?;
        info!(route_id = ?created.route_id, "Created route");
        Ok(created)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the route does not exist.
    pub fn get_route(&mut self, route_id: i64) -> Result<Route, PersistenceError> {
        queries::get_route(&mut self.conn, route_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_routes(&mut self) -> Result<Vec<Route>, PersistenceError> {
        queries::list_routes(&mut self.conn)
    }

    /// Stores a new ferry.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub fn create_ferry(&mut self, ferry: &Ferry) -> Result<Ferry, PersistenceError> {
        let created: Ferry = self.write("create_ferry", |conn| {
            let ferry_id: i64 = mutations::insert_ferry(conn, ferry)?;
            queries::get_ferry(conn, ferry_id)
        })?;
        info!(ferry_id = ?created.ferry_id, "Created ferry");
        Ok(created)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the ferry does not exist.
    pub fn get_ferry(&mut self, ferry_id: i64) -> Result<Ferry, PersistenceError> {
        queries::get_ferry(&mut self.conn, ferry_id)
    }

    /// Stores a new schedule.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the route or ferry does not exist.
    pub fn create_schedule(&mut self, schedule: &Schedule) -> Result<Schedule, PersistenceError> {
        let created: Schedule = self.write("create_schedule", |conn| {
            queries::get_route(conn, schedule.route_id)?;
            queries::get_ferry(conn, schedule.ferry_id)?;
            let schedule_id: i64 = mutations::insert_schedule(conn, schedule)?;
            queries::get_schedule(conn, schedule_id)
        })?;
        info!(schedule_id = ?created.schedule_id, route_id = created.route_id, "Created schedule");
        Ok(created)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the schedule does not exist.
    pub fn get_schedule(&mut self, schedule_id: i64) -> Result<Schedule, PersistenceError> {
        queries::get_schedule(&mut self.conn, schedule_id)
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_schedules_for_route(
        &mut self,
        route_id: i64,
    ) -> Result<Vec<Schedule>, PersistenceError> {
        queries::list_schedules_for_route(&mut self.conn, route_id)
    }

    /// Forces a route's status, recording an audit event.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the route does not exist.
    pub fn set_route_status(
        &mut self,
        route_id: i64,
        status: RouteStatus,
        hold: StatusHold,
        actor: &Actor,
        cause: &Cause,
        now: OffsetDateTime,
    ) -> Result<Route, PersistenceError> {
        let route: Route = self.write("set_route_status", |conn| {
            let route: Route = queries::get_route(conn, route_id)?;
            let transition =
                apply_route_status(&route, status, hold.clone(), actor.clone(), cause.clone());
            mutations::update_route_status(conn, route_id, &transition.new_route)?;
            mutations::persist_audit_event(conn, &transition.audit_event, now)?;
            Ok(transition.new_route)
        })?;
        info!(route_id, status = status.as_str(), "Route status changed");
        Ok(route)
    }

    /// Forces a schedule's status and cascades it to the schedule's ledger
    /// entries, recording one audit event.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the schedule does not exist.
    pub fn set_schedule_status(
        &mut self,
        schedule_id: i64,
        status: ScheduleStatus,
        hold: StatusHold,
        actor: &Actor,
        cause: &Cause,
        now: OffsetDateTime,
    ) -> Result<ScheduleUpdate, PersistenceError> {
        let update: ScheduleUpdate = self.write("set_schedule_status", |conn| {
            let schedule: Schedule = queries::get_schedule(conn, schedule_id)?;
            let entries: Vec<LedgerEntry> = queries::list_ledger_for_schedule(conn, schedule_id)?;
            let transition = apply_schedule_status(
                &schedule,
                &entries,
                status,
                hold.clone(),
                actor.clone(),
                cause.clone(),
            );
            mutations::update_schedule_status(conn, schedule_id, &transition.new_schedule)?;
            for entry in &transition.changed_entries {
                mutations::update_ledger(conn, entry)?;
            }
            mutations::persist_audit_event(conn, &transition.audit_event, now)?;
            Ok(ScheduleUpdate {
                schedule: transition.new_schedule,
                affected_entries: transition.changed_entries,
            })
        })?;
        info!(
            schedule_id,
            status = status.as_str(),
            affected = update.affected_entries.len(),
            "Schedule status changed"
        );
        Ok(update)
    }

    // ========================================================================
    // Capacity Ledger
    // ========================================================================

    /// Returns the ledger entry for a schedule on a date, opening it with
    /// the ferry's capacities if this is the first time the date is used.
    ///
    /// # Errors
    ///
    /// - `Rejected(DayNotServed)` if the schedule does not run that weekday
    /// - `NotFound` if the schedule does not exist
    pub fn get_or_create_ledger(
        &mut self,
        schedule_id: i64,
        departure_date: time::Date,
        now: OffsetDateTime,
    ) -> Result<LedgerEntry, PersistenceError> {
        self.write("get_or_create_ledger", |conn| {
            let schedule: Schedule = refresh_schedule(conn, schedule_id, now)?;
            open_ledger(conn, &schedule, departure_date, now)
        })
    }

    /// Reads the ledger entry for a schedule on a date without creating it.
    ///
    /// A lapsed hold is shown as already reverted; the sweep persists it.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_ledger(
        &mut self,
        schedule_id: i64,
        departure_date: time::Date,
        now: OffsetDateTime,
    ) -> Result<Option<LedgerEntry>, PersistenceError> {
        Ok(queries::find_ledger(&mut self.conn, schedule_id, departure_date)?.map(|mut entry| {
            entry.apply_expiry(now);
            entry
        }))
    }

    /// Forces a ledger entry's status, recording an audit event.
    ///
    /// # Errors
    ///
    /// - `Rejected(InvalidStatus)` when FULL is requested
    /// - `Rejected(DayNotServed)` if the schedule does not run that weekday
    #[allow(clippy::too_many_arguments)]
    pub fn set_ledger_status(
        &mut self,
        schedule_id: i64,
        departure_date: time::Date,
        status: LedgerStatus,
        hold: StatusHold,
        actor: &Actor,
        cause: &Cause,
        now: OffsetDateTime,
    ) -> Result<LedgerEntry, PersistenceError> {
        let entry: LedgerEntry = self.write("set_ledger_status", |conn| {
            let command = LedgerCommand::SetStatus {
                status,
                hold: hold.clone(),
            };
            apply_to_ledger(conn, schedule_id, departure_date, command, actor, cause, now)
        })?;
        info!(
            schedule_id,
            departure_date = %departure_date,
            status = entry.status.as_str(),
            "Ledger status changed"
        );
        Ok(entry)
    }

    /// Replaces the ceilings of a ledger entry, recording an audit event.
    ///
    /// # Errors
    ///
    /// Returns `Rejected(CapacityBelowUsage)` if any class would drop below
    /// what is already booked.
    #[allow(clippy::too_many_arguments)]
    pub fn override_ledger_capacity(
        &mut self,
        schedule_id: i64,
        departure_date: time::Date,
        capacity: ResourceCounts,
        actor: &Actor,
        cause: &Cause,
        now: OffsetDateTime,
    ) -> Result<LedgerEntry, PersistenceError> {
        let entry: LedgerEntry = self.write("override_ledger_capacity", |conn| {
            let command = LedgerCommand::OverrideCapacity { capacity };
            apply_to_ledger(conn, schedule_id, departure_date, command, actor, cause, now)
        })?;
        info!(schedule_id, departure_date = %departure_date, "Ledger capacity overridden");
        Ok(entry)
    }

    // ========================================================================
    // Bookings
    // ========================================================================

    /// Creates a PENDING booking, reserving its capacity in the same unit.
    ///
    /// Either the booking, its tickets, vehicles, pending payment, log row
    /// and the ledger increment all commit, or none of them do.
    ///
    /// # Errors
    ///
    /// - `Rejected(InsufficientCapacity | ScheduleClosed | DayNotServed |
    ///   SailingDeparted | InvalidManifest)` when the reservation is refused
    /// - `NotFound` if the schedule does not exist
    pub fn create_booking(
        &mut self,
        request: &BookingRequest,
        actor: &Actor,
        zone: &OperatingZone,
        now: OffsetDateTime,
    ) -> Result<BookingState, PersistenceError> {
        let state: BookingState = self.write("create_booking", |conn| {
            let schedule: Schedule = refresh_schedule(conn, request.schedule_id, now)?;
            let route: Route = queries::get_route(conn, schedule.route_id)?;
            let ledger: LedgerEntry = open_ledger(conn, &schedule, request.departure_date, now)?;
            let departs_at: OffsetDateTime =
                zone.departure_instant(request.departure_date, schedule.departure_time)?;
            let code: String = next_booking_code(conn, now)?;

            let plan = plan_booking(
                request,
                &route,
                &schedule,
                &ledger,
                departs_at,
                &code,
                actor.clone(),
                now,
            )?;

            mutations::update_ledger(conn, &plan.ledger)?;
            let saved: BookingState = mutations::insert_booking_state(conn, &plan.state)?;
            let booking_id: i64 = saved.booking.booking_id.unwrap_or_default();
            mutations::insert_booking_log(conn, booking_id, &plan.log_entry)?;
            Ok(saved)
        })?;
        info!(
            booking_id = ?state.booking.booking_id,
            booking_code = %state.booking.booking_code,
            passengers = state.booking.passenger_count,
            vehicles = state.booking.vehicle_count,
            "Booking created"
        );
        Ok(state)
    }

    /// Moves a booking along the status table.
    ///
    /// # Errors
    ///
    /// Returns `Rejected(IllegalTransition)` for a transition outside the
    /// table, or `NotFound` if the booking does not exist.
    pub fn transition_booking(
        &mut self,
        booking_id: i64,
        target: BookingStatus,
        note: Option<String>,
        actor: &Actor,
        now: OffsetDateTime,
    ) -> Result<BookingState, PersistenceError> {
        self.run_command(
            "transition_booking",
            booking_id,
            || Command::Transition {
                target,
                note: note.clone(),
            },
            actor,
            now,
        )
    }

    /// Applies a payment provider report to the booking with `booking_code`.
    ///
    /// Delivering the same report twice changes nothing the second time.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no booking carries the code.
    pub fn apply_payment_callback(
        &mut self,
        booking_code: &str,
        provider_status: ProviderStatus,
        transaction_id: Option<String>,
        payment_method: Option<String>,
        now: OffsetDateTime,
    ) -> Result<ReconcileOutcome, PersistenceError> {
        let outcome: ReconcileOutcome = self.write("apply_payment_callback", |conn| {
            let booking_id: i64 = queries::find_booking_id_by_code(conn, booking_code)?;
            let state: BookingState = queries::load_booking_state(conn, booking_id)?;
            match reconcile_payment(
                &state,
                provider_status,
                transaction_id.clone(),
                payment_method.clone(),
                now,
            )? {
                Some(result) => Ok(ReconcileOutcome {
                    state: commit_transition(conn, result)?,
                    applied: true,
                }),
                None => Ok(ReconcileOutcome {
                    state,
                    applied: false,
                }),
            }
        })?;

        if outcome.applied {
            info!(
                booking_code,
                status = outcome.state.booking.status.as_str(),
                "Payment report applied"
            );
        } else {
            warn!(
                booking_code,
                status = outcome.state.booking.status.as_str(),
                provider_status = ?provider_status,
                "Payment report ignored"
            );
        }
        Ok(outcome)
    }

    /// Boards one passenger. The booking completes when its last ticket is
    /// checked in.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the ticket does not exist
    /// - `Rejected(AlreadyCheckedIn | TicketInactive | BookingNotConfirmed |
    ///   OutOfWindow)` when boarding is refused
    pub fn check_in(
        &mut self,
        ticket_code: &str,
        record: &CheckInRecord,
        actor: &Actor,
        today: time::Date,
        now: OffsetDateTime,
    ) -> Result<BookingState, PersistenceError> {
        let state: BookingState = self.write("check_in", |conn| {
            let booking_id: i64 = queries::find_booking_id_by_ticket(conn, ticket_code)?;
            let state: BookingState = queries::load_booking_state(conn, booking_id)?;
            let result: TransitionResult = apply(
                &state,
                Command::CheckIn {
                    ticket_code: ticket_code.to_string(),
                    record: record.clone(),
                    today,
                },
                actor.clone(),
                now,
            )?;
            commit_transition(conn, result)
        })?;
        info!(
            ticket_code,
            booking_status = state.booking.status.as_str(),
            "Ticket checked in"
        );
        Ok(state)
    }

    /// Quotes the refund a booking would get right now.
    ///
    /// The base amount is the settled payment, falling back to the booking
    /// total when nothing has settled yet.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the booking does not exist.
    pub fn quote_refund(
        &mut self,
        booking_id: i64,
        zone: &OperatingZone,
        now: OffsetDateTime,
    ) -> Result<RefundQuote, PersistenceError> {
        let state: BookingState = queries::load_booking_state(&mut self.conn, booking_id)?;
        quote_for(&mut self.conn, &state, zone, now)
    }

    /// Requests a refund of the settled payment, cancelling a CONFIRMED
    /// booking in the same unit.
    ///
    /// # Errors
    ///
    /// - `Rejected(RefundNotEligible)` when no tier applies
    /// - `Rejected(RefundAlreadyRequested | PaymentNotSettled |
    ///   IllegalTransition)` when the booking cannot be refunded
    #[allow(clippy::too_many_arguments)]
    pub fn request_refund(
        &mut self,
        booking_id: i64,
        reason: &str,
        refund_method: Option<String>,
        bank_details: Option<BankDetails>,
        actor: &Actor,
        zone: &OperatingZone,
        now: OffsetDateTime,
    ) -> Result<BookingState, PersistenceError> {
        let state: BookingState = self.write("request_refund", |conn| {
            let state: BookingState = queries::load_booking_state(conn, booking_id)?;
            let quote: RefundQuote = quote_for(conn, &state, zone, now)?;
            let result: TransitionResult = apply(
                &state,
                Command::RequestRefund {
                    quote,
                    reason: reason.to_string(),
                    refund_method: refund_method.clone(),
                    bank_details: bank_details.clone(),
                },
                actor.clone(),
                now,
            )?;
            commit_transition(conn, result)
        })?;
        info!(booking_id, "Refund requested");
        Ok(state)
    }

    /// Approves the pending refund.
    ///
    /// # Errors
    ///
    /// Returns `Rejected(IllegalTransition)` unless the refund is PENDING.
    pub fn approve_refund(
        &mut self,
        booking_id: i64,
        note: Option<String>,
        actor: &Actor,
        now: OffsetDateTime,
    ) -> Result<BookingState, PersistenceError> {
        self.run_command(
            "approve_refund",
            booking_id,
            || Command::ApproveRefund { note: note.clone() },
            actor,
            now,
        )
    }

    /// Rejects the pending refund.
    ///
    /// # Errors
    ///
    /// Returns `Rejected(IllegalTransition)` unless the refund is PENDING.
    pub fn reject_refund(
        &mut self,
        booking_id: i64,
        note: Option<String>,
        actor: &Actor,
        now: OffsetDateTime,
    ) -> Result<BookingState, PersistenceError> {
        self.run_command(
            "reject_refund",
            booking_id,
            || Command::RejectRefund { note: note.clone() },
            actor,
            now,
        )
    }

    /// Records the provider payout of an approved refund. The payment and
    /// the booking both become REFUNDED.
    ///
    /// # Errors
    ///
    /// Returns `Rejected(IllegalTransition)` unless the refund is APPROVED.
    pub fn complete_refund(
        &mut self,
        booking_id: i64,
        transaction_id: &str,
        actor: &Actor,
        now: OffsetDateTime,
    ) -> Result<BookingState, PersistenceError> {
        self.run_command(
            "complete_refund",
            booking_id,
            || Command::CompleteRefund {
                transaction_id: transaction_id.to_string(),
            },
            actor,
            now,
        )
    }

    /// Moves a CONFIRMED booking to another schedule or date on the same
    /// route.
    ///
    /// The original is retired (RESCHEDULED, tickets cancelled, capacity
    /// released) before the replacement reserves, so moving within the same
    /// sailing never needs room for both at once.
    ///
    /// # Errors
    ///
    /// - `Rejected(IllegalTransition)` unless the booking is CONFIRMED
    /// - `Rejected(RouteMismatch)` if the new schedule is on another route
    /// - any reservation error from [`Self::create_booking`]
    pub fn reschedule_booking(
        &mut self,
        booking_id: i64,
        new_schedule_id: i64,
        new_departure_date: time::Date,
        actor: &Actor,
        zone: &OperatingZone,
        now: OffsetDateTime,
    ) -> Result<RescheduleOutcome, PersistenceError> {
        let outcome: RescheduleOutcome = self.write("reschedule_booking", |conn| {
            let original: BookingState = queries::load_booking_state(conn, booking_id)?;
            let code: String = next_booking_code(conn, now)?;

            let retired: TransitionResult = apply(
                &original,
                Command::Reschedule {
                    new_booking_code: code.clone(),
                },
                actor.clone(),
                now,
            )?;
            let retired_state: BookingState = commit_transition(conn, retired)?;

            let schedule: Schedule = refresh_schedule(conn, new_schedule_id, now)?;
            let route: Route = queries::get_route(conn, schedule.route_id)?;
            let ledger: LedgerEntry = open_ledger(conn, &schedule, new_departure_date, now)?;
            let departs_at: OffsetDateTime =
                zone.departure_instant(new_departure_date, schedule.departure_time)?;

            let plan = plan_rescheduled_booking(
                &original,
                &schedule,
                &route,
                new_departure_date,
                &ledger,
                departs_at,
                &code,
                actor.clone(),
                now,
            )?;

            mutations::update_ledger(conn, &plan.ledger)?;
            let replacement: BookingState = mutations::insert_booking_state(conn, &plan.state)?;
            let replacement_id: i64 = replacement.booking.booking_id.unwrap_or_default();
            mutations::insert_booking_log(conn, replacement_id, &plan.log_entry)?;

            Ok(RescheduleOutcome {
                original: retired_state,
                replacement,
            })
        })?;
        info!(
            booking_id,
            replacement = %outcome.replacement.booking.booking_code,
            "Booking rescheduled"
        );
        Ok(outcome)
    }

    fn run_command<F>(
        &mut self,
        operation: &'static str,
        booking_id: i64,
        command: F,
        actor: &Actor,
        now: OffsetDateTime,
    ) -> Result<BookingState, PersistenceError>
    where
        F: Fn() -> Command,
    {
        let state: BookingState = self.write(operation, |conn| {
            let state: BookingState = queries::load_booking_state(conn, booking_id)?;
            let result: TransitionResult = apply(&state, command(), actor.clone(), now)?;
            commit_transition(conn, result)
        })?;
        info!(
            operation,
            booking_id,
            status = state.booking.status.as_str(),
            "Booking updated"
        );
        Ok(state)
    }

    // ========================================================================
    // Refund Policy
    // ========================================================================

    /// Adds a refund tier.
    ///
    /// # Errors
    ///
    /// Returns `Rejected(InvalidRefundPolicy)` if the rule is malformed.
    pub fn create_policy_rule(
        &mut self,
        rule: &RefundPolicyRule,
        actor: &Actor,
        cause: &Cause,
        now: OffsetDateTime,
    ) -> Result<RefundPolicyRule, PersistenceError> {
        self.write("create_policy_rule", |conn| {
            let mut transition =
                ferry_book::create_policy_rule(rule.clone(), actor.clone(), cause.clone())?;
            let rule_id: i64 = mutations::insert_policy_rule(conn, &transition.rule)?;
            transition.rule.rule_id = Some(rule_id);
            transition.audit_event.scope.entity_id = Some(rule_id);
            mutations::persist_audit_event(conn, &transition.audit_event, now)?;
            Ok(transition.rule)
        })
    }

    /// Edits or deactivates a refund tier.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the rule does not exist
    /// - `Rejected(InvalidRefundPolicy)` if the edited rule is malformed
    pub fn update_policy_rule(
        &mut self,
        rule_id: i64,
        rule: &RefundPolicyRule,
        actor: &Actor,
        cause: &Cause,
        now: OffsetDateTime,
    ) -> Result<RefundPolicyRule, PersistenceError> {
        self.write("update_policy_rule", |conn| {
            let existing: RefundPolicyRule = queries::get_policy_rule(conn, rule_id)?;
            let transition = ferry_book::update_policy_rule(
                &existing,
                rule.clone(),
                actor.clone(),
                cause.clone(),
            )?;
            mutations::update_policy_rule(conn, rule_id, &transition.rule)?;
            mutations::persist_audit_event(conn, &transition.audit_event, now)?;
            Ok(transition.rule)
        })
    }

    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_policy_rules(
        &mut self,
        active_only: bool,
    ) -> Result<Vec<RefundPolicyRule>, PersistenceError> {
        queries::list_policy_rules(&mut self.conn, active_only)
    }

    // ========================================================================
    // Expiry Sweep
    // ========================================================================

    /// Reactivates every route, schedule and ledger entry whose hold has
    /// lapsed. Running it again with nothing expired changes nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if any write fails; the whole sweep is rolled back.
    pub fn sweep_expired_statuses(
        &mut self,
        now: OffsetDateTime,
    ) -> Result<SweepReport, PersistenceError> {
        let report: SweepReport = self.write("sweep_expired_statuses", |conn| {
            let mut report = SweepReport::default();

            for route in queries::list_held_routes(conn)? {
                if let Some(transition) = sweep_route(&route, now) {
                    let route_id: i64 = route.route_id.unwrap_or_default();
                    mutations::update_route_status(conn, route_id, &transition.new_route)?;
                    mutations::persist_audit_event(conn, &transition.audit_event, now)?;
                    report.routes += 1;
                }
            }

            for schedule in queries::list_held_schedules(conn)? {
                let schedule_id: i64 = schedule.schedule_id.unwrap_or_default();
                let entries: Vec<LedgerEntry> =
                    queries::list_ledger_for_schedule(conn, schedule_id)?;
                if let Some(transition) = sweep_schedule(&schedule, &entries, now) {
                    persist_schedule_sweep(conn, schedule_id, &transition, now)?;
                    report.schedules += 1;
                }
            }

            // Read after the schedule cascade so reopened entries are not
            // counted twice.
            for entry in queries::list_held_ledger_entries(conn)? {
                if let Some(transition) = sweep_ledger(&entry, now) {
                    mutations::update_ledger(conn, &transition.new_entry)?;
                    mutations::persist_audit_event(conn, &transition.audit_event, now)?;
                    report.ledger_entries += 1;
                }
            }

            Ok(report)
        })?;

        if report.is_empty() {
            debug!("Expiry sweep found nothing to reactivate");
        } else {
            info!(
                routes = report.routes,
                schedules = report.schedules,
                ledger_entries = report.ledger_entries,
                "Expiry sweep reactivated holds"
            );
        }
        Ok(report)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// # Errors
    ///
    /// Returns `NotFound` if the booking does not exist.
    pub fn get_booking(&mut self, booking_id: i64) -> Result<BookingState, PersistenceError> {
        queries::load_booking_state(&mut self.conn, booking_id)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if no booking carries the code.
    pub fn get_booking_by_code(
        &mut self,
        booking_code: &str,
    ) -> Result<BookingState, PersistenceError> {
        let booking_id: i64 = queries::find_booking_id_by_code(&mut self.conn, booking_code)?;
        queries::load_booking_state(&mut self.conn, booking_id)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if no ticket carries the code.
    pub fn get_booking_by_ticket(
        &mut self,
        ticket_code: &str,
    ) -> Result<BookingState, PersistenceError> {
        let booking_id: i64 = queries::find_booking_id_by_ticket(&mut self.conn, ticket_code)?;
        queries::load_booking_state(&mut self.conn, booking_id)
    }

    /// The booking's log timeline, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn booking_log(
        &mut self,
        booking_id: i64,
    ) -> Result<Vec<BookingLogEntry>, PersistenceError> {
        queries::booking_log(&mut self.conn, booking_id)
    }

    /// Searches tickets by code, passenger ID number or passenger name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_tickets(
        &mut self,
        identifier: &str,
        permitted_routes: Option<&[i64]>,
    ) -> Result<Vec<TicketMatch>, PersistenceError> {
        queries::find_tickets(&mut self.conn, identifier, permitted_routes)
    }

    /// Lists general audit events, optionally for one entity.
    ///
    /// # Errors
    ///
    /// Returns an error if events cannot be read.
    pub fn list_audit_events(
        &mut self,
        entity_type: Option<&str>,
        entity_id: Option<i64>,
    ) -> Result<Vec<StoredAuditEvent>, PersistenceError> {
        queries::list_audit_events(&mut self.conn, entity_type, entity_id)
    }
}

/// Loads a schedule after persisting any lapsed route or schedule hold, so
/// a reservation never trips over a hold that should already be gone.
fn refresh_schedule(
    conn: &mut SqliteConnection,
    schedule_id: i64,
    now: OffsetDateTime,
) -> Result<Schedule, PersistenceError> {
    let schedule: Schedule = queries::get_schedule(conn, schedule_id)?;

    let route: Route = queries::get_route(conn, schedule.route_id)?;
    if let Some(transition) = sweep_route(&route, now) {
        mutations::update_route_status(conn, schedule.route_id, &transition.new_route)?;
        mutations::persist_audit_event(conn, &transition.audit_event, now)?;
    }

    let entries: Vec<LedgerEntry> = queries::list_ledger_for_schedule(conn, schedule_id)?;
    match sweep_schedule(&schedule, &entries, now) {
        Some(transition) => {
            persist_schedule_sweep(conn, schedule_id, &transition, now)?;
            Ok(transition.new_schedule)
        }
        None => Ok(schedule),
    }
}

fn persist_schedule_sweep(
    conn: &mut SqliteConnection,
    schedule_id: i64,
    transition: &ferry_book::ScheduleTransition,
    now: OffsetDateTime,
) -> Result<(), PersistenceError> {
    mutations::update_schedule_status(conn, schedule_id, &transition.new_schedule)?;
    for entry in &transition.changed_entries {
        mutations::update_ledger(conn, entry)?;
    }
    mutations::persist_audit_event(conn, &transition.audit_event, now)?;
    Ok(())
}

/// Finds or opens the ledger entry for `schedule` on `departure_date`,
/// persisting a lapsed hold's reversal.
///
/// Fails with `DayNotServed` before anything is written.
fn open_ledger(
    conn: &mut SqliteConnection,
    schedule: &Schedule,
    departure_date: time::Date,
    now: OffsetDateTime,
) -> Result<LedgerEntry, PersistenceError> {
    let schedule_id: i64 = schedule.schedule_id.unwrap_or_default();
    let existing: Option<LedgerEntry> = queries::find_ledger(conn, schedule_id, departure_date)?;

    if let Some(entry) = &existing {
        if let Some(transition) = sweep_ledger(entry, now) {
            schedule.operating_days.ensure_serves(departure_date)?;
            mutations::update_ledger(conn, &transition.new_entry)?;
            mutations::persist_audit_event(conn, &transition.audit_event, now)?;
            return Ok(transition.new_entry);
        }
    }

    let is_new: bool = existing.is_none();
    let ferry: Ferry = queries::get_ferry(conn, schedule.ferry_id)?;
    let mut entry: LedgerEntry =
        resolve_ledger(schedule, departure_date, existing, ferry.capacity, now)?;

    if is_new {
        entry.ledger_id = Some(mutations::insert_ledger(conn, &entry)?);
    }
    Ok(entry)
}

#[allow(clippy::too_many_arguments)]
fn apply_to_ledger(
    conn: &mut SqliteConnection,
    schedule_id: i64,
    departure_date: time::Date,
    command: LedgerCommand,
    actor: &Actor,
    cause: &Cause,
    now: OffsetDateTime,
) -> Result<LedgerEntry, PersistenceError> {
    let schedule: Schedule = refresh_schedule(conn, schedule_id, now)?;
    let entry: LedgerEntry = open_ledger(conn, &schedule, departure_date, now)?;
    let transition = apply_ledger_command(&entry, command, actor.clone(), cause.clone())?;
    mutations::update_ledger(conn, &transition.new_entry)?;
    mutations::persist_audit_event(conn, &transition.audit_event, now)?;
    Ok(transition.new_entry)
}

/// Writes a booking transition: the aggregate, the capacity it hands back
/// and its single log row.
fn commit_transition(
    conn: &mut SqliteConnection,
    result: TransitionResult,
) -> Result<BookingState, PersistenceError> {
    let saved: BookingState = mutations::update_booking_state(conn, &result.new_state)?;
    let booking = &saved.booking;
    let booking_id: i64 = booking.booking_id.unwrap_or_default();

    if let Some(release) = result.capacity_release.filter(|r| !r.is_zero()) {
        let mut ledger: LedgerEntry =
            queries::get_ledger(conn, booking.schedule_id, booking.departure_date)?;
        ledger.release(&release)?;
        mutations::update_ledger(conn, &ledger)?;
        debug!(
            booking_id,
            passengers = release.passengers,
            vehicles = release.vehicle_total(),
            "Released capacity"
        );
    }

    mutations::insert_booking_log(conn, booking_id, &result.log_entry)?;
    Ok(saved)
}

/// Allocates the next booking code for the day `now` falls on.
///
/// Runs inside the write transaction, so the count cannot race.
fn next_booking_code(
    conn: &mut SqliteConnection,
    now: OffsetDateTime,
) -> Result<String, PersistenceError> {
    let prefix: String = booking_code_prefix(now.date());
    let issued: i64 = queries::count_bookings_with_prefix(conn, &prefix)?;
    Ok(booking_code(now.date(), issued + 1))
}

fn quote_for(
    conn: &mut SqliteConnection,
    state: &BookingState,
    zone: &OperatingZone,
    now: OffsetDateTime,
) -> Result<RefundQuote, PersistenceError> {
    let schedule: Schedule = queries::get_schedule(conn, state.booking.schedule_id)?;
    let departure: OffsetDateTime =
        zone.departure_instant(state.booking.departure_date, schedule.departure_time)?;
    let rules: Vec<RefundPolicyRule> = queries::list_policy_rules(conn, true)?;
    let base_amount: i64 = state
        .settled_payment()
        .map_or(state.booking.total_amount, |p| p.amount);
    Ok(evaluate_refund(&rules, departure, now, base_amount)?)
}
