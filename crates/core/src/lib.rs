// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

mod apply;
mod clock;
mod command;
mod error;
mod operations;
mod policy;
mod reconcile;
mod reservation;
mod state;

#[cfg(test)]
mod tests;

use ferry_book_domain::{DomainError, LedgerEntry, ResourceCounts, Schedule, ScheduleStatus};

// Re-export public types and functions
pub use apply::apply;
pub use clock::{Clock, FixedClock, SystemClock};
pub use command::{BookingRequest, Command, LedgerCommand};
pub use error::CoreError;
pub use operations::{
    apply_ledger_command, apply_route_status, apply_schedule_status, sweep_ledger, sweep_route,
    sweep_schedule,
};
pub use policy::{create_policy_rule, update_policy_rule};
pub use reconcile::reconcile_payment;
pub use reservation::{plan_booking, plan_rescheduled_booking};
pub use state::{
    BookingPlan, BookingState, LedgerTransition, PolicyTransition, RouteTransition,
    ScheduleTransition, TransitionResult,
};

/// Resolves the ledger entry for a schedule on a date.
///
/// Fails fast with `DayNotServed` before anything is created. When no
/// entry exists yet a fresh one is opened with the ferry's capacities,
/// already closed with the schedule's hold if the schedule is INACTIVE.
/// An existing entry has any lapsed hold applied.
///
/// # Errors
///
/// Returns `DomainError::DayNotServed` if the schedule does not run on
/// that weekday.
pub fn resolve_ledger(
    schedule: &Schedule,
    date: time::Date,
    existing: Option<LedgerEntry>,
    ferry_capacity: ResourceCounts,
    now: time::OffsetDateTime,
) -> Result<LedgerEntry, DomainError> {
    schedule.operating_days.ensure_serves(date)?;
    Ok(match existing {
        Some(mut entry) => {
            entry.apply_expiry(now);
            entry
        }
        None => {
            let mut entry = LedgerEntry::open(
                schedule.schedule_id.unwrap_or_default(),
                date,
                ferry_capacity,
                None,
            );
            if schedule.status == ScheduleStatus::Inactive {
                entry.close_for_schedule(&schedule.hold);
            }
            entry
        }
    })
}
