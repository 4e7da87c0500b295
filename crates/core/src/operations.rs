// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Operator changes to ledger entries, schedules and routes, and the
//! expiry sweep that undoes lapsed holds.
//!
//! None of these touch a booking, so each produces an [`AuditEvent`]
//! rather than a booking log entry.

use crate::command::LedgerCommand;
use crate::error::CoreError;
use crate::state::{LedgerTransition, RouteTransition, ScheduleTransition};
use ferry_book_audit::{Action, Actor, AuditEvent, AuditScope, Cause, StateSnapshot};
use ferry_book_domain::{
    DomainError, LedgerEntry, LedgerStatus, Route, RouteStatus, Schedule, ScheduleStatus,
    StatusHold, StatusSource,
};
use time::OffsetDateTime;

fn ledger_snapshot(entry: &LedgerEntry) -> StateSnapshot {
    StateSnapshot::new(format!(
        "schedule={},date={},status={},source={},reason={},usage={}/{}/{}/{}/{},capacity={}/{}/{}/{}/{}",
        entry.schedule_id,
        entry.departure_date,
        entry.status.as_str(),
        entry.status_source.as_str(),
        entry.hold.reason.as_deref().unwrap_or("-"),
        entry.usage.passengers,
        entry.usage.motorcycles,
        entry.usage.cars,
        entry.usage.buses,
        entry.usage.trucks,
        entry.capacity.passengers,
        entry.capacity.motorcycles,
        entry.capacity.cars,
        entry.capacity.buses,
        entry.capacity.trucks,
    ))
}

fn schedule_snapshot(schedule: &Schedule) -> StateSnapshot {
    StateSnapshot::new(format!(
        "route={},days={},status={},reason={}",
        schedule.route_id,
        schedule.operating_days.to_storage_string(),
        schedule.status.as_str(),
        schedule.hold.reason.as_deref().unwrap_or("-"),
    ))
}

fn route_snapshot(route: &Route) -> StateSnapshot {
    StateSnapshot::new(format!(
        "route={}->{},status={},reason={}",
        route.origin,
        route.destination,
        route.status.as_str(),
        route.hold.reason.as_deref().unwrap_or("-"),
    ))
}

/// Applies an operator command to a ledger entry.
///
/// # Errors
///
/// - `InvalidStatus` when FULL is forced directly; it is engine-managed
/// - `CapacityBelowUsage` when an override drops below current usage
pub fn apply_ledger_command(
    entry: &LedgerEntry,
    command: LedgerCommand,
    actor: Actor,
    cause: Cause,
) -> Result<LedgerTransition, CoreError> {
    let mut new_entry = entry.clone();

    let action = match command {
        LedgerCommand::SetStatus { status, hold } => {
            if status == LedgerStatus::Full {
                return Err(DomainError::InvalidStatus {
                    entity: "ledger",
                    value: status.as_str().to_string(),
                }
                .into());
            }
            let details = format!(
                "{} on {} ({})",
                status.as_str(),
                entry.departure_date,
                hold.reason.as_deref().unwrap_or("no reason given")
            );
            new_entry.set_status(status, hold, StatusSource::Direct);
            Action::new(String::from("SetLedgerStatus"), Some(details))
        }
        LedgerCommand::OverrideCapacity { capacity } => {
            new_entry.override_capacity(capacity)?;
            Action::new(
                String::from("OverrideLedgerCapacity"),
                Some(format!("Manual capacity for {}", entry.departure_date)),
            )
        }
    };

    let audit_event = AuditEvent::new(
        actor,
        cause,
        action,
        ledger_snapshot(entry),
        ledger_snapshot(&new_entry),
        AuditScope::new("ledger", entry.ledger_id),
    );

    Ok(LedgerTransition {
        new_entry,
        audit_event,
    })
}

/// Changes a schedule's status and cascades it to the schedule's ledger
/// entries.
///
/// Deactivating closes every open entry with schedule provenance.
/// Reactivating reopens only entries with schedule provenance; entries an
/// operator closed directly are left alone.
#[must_use]
pub fn apply_schedule_status(
    schedule: &Schedule,
    entries: &[LedgerEntry],
    status: ScheduleStatus,
    hold: StatusHold,
    actor: Actor,
    cause: Cause,
) -> ScheduleTransition {
    let mut new_schedule = schedule.clone();
    new_schedule.status = status;
    new_schedule.hold = match status {
        ScheduleStatus::Active => StatusHold::default(),
        ScheduleStatus::Inactive => hold,
    };

    let changed_entries = cascade(&new_schedule, entries);

    let audit_event = AuditEvent::new(
        actor,
        cause,
        Action::new(
            String::from("SetScheduleStatus"),
            Some(format!(
                "{} ({} ledger entr{} affected)",
                status.as_str(),
                changed_entries.len(),
                if changed_entries.len() == 1 { "y" } else { "ies" }
            )),
        ),
        schedule_snapshot(schedule),
        schedule_snapshot(&new_schedule),
        AuditScope::new("schedule", schedule.schedule_id),
    );

    ScheduleTransition {
        new_schedule,
        changed_entries,
        audit_event,
    }
}

fn cascade(schedule: &Schedule, entries: &[LedgerEntry]) -> Vec<LedgerEntry> {
    entries
        .iter()
        .filter_map(|entry| {
            let mut entry = entry.clone();
            let changed = match schedule.status {
                ScheduleStatus::Inactive => entry.close_for_schedule(&schedule.hold),
                ScheduleStatus::Active => entry.reopen_for_schedule(),
            };
            changed.then_some(entry)
        })
        .collect()
}

/// Changes a route's status.
#[must_use]
pub fn apply_route_status(
    route: &Route,
    status: RouteStatus,
    hold: StatusHold,
    actor: Actor,
    cause: Cause,
) -> RouteTransition {
    let mut new_route = route.clone();
    new_route.status = status;
    new_route.hold = if status == RouteStatus::Active {
        StatusHold::default()
    } else {
        hold
    };

    let audit_event = AuditEvent::new(
        actor,
        cause,
        Action::new(
            String::from("SetRouteStatus"),
            Some(status.as_str().to_string()),
        ),
        route_snapshot(route),
        route_snapshot(&new_route),
        AuditScope::new("route", route.route_id),
    );

    RouteTransition {
        new_route,
        audit_event,
    }
}

fn sweep_cause(now: OffsetDateTime) -> Cause {
    Cause::new(
        format!("sweep-{}", now.unix_timestamp()),
        String::from("Status hold expired"),
    )
}

/// Reactivates a route whose hold has lapsed. `None` if nothing expired.
#[must_use]
pub fn sweep_route(route: &Route, now: OffsetDateTime) -> Option<RouteTransition> {
    let mut new_route = route.clone();
    if !new_route.apply_expiry(now) {
        return None;
    }
    Some(RouteTransition {
        audit_event: AuditEvent::new(
            Actor::system(),
            sweep_cause(now),
            Action::new(String::from("ExpireRouteStatus"), None),
            route_snapshot(route),
            route_snapshot(&new_route),
            AuditScope::new("route", route.route_id),
        ),
        new_route,
    })
}

/// Reactivates a schedule whose hold has lapsed, reopening the ledger
/// entries it had closed. `None` if nothing expired.
#[must_use]
pub fn sweep_schedule(
    schedule: &Schedule,
    entries: &[LedgerEntry],
    now: OffsetDateTime,
) -> Option<ScheduleTransition> {
    let mut new_schedule = schedule.clone();
    if !new_schedule.apply_expiry(now) {
        return None;
    }
    let changed_entries = cascade(&new_schedule, entries);
    Some(ScheduleTransition {
        audit_event: AuditEvent::new(
            Actor::system(),
            sweep_cause(now),
            Action::new(
                String::from("ExpireScheduleStatus"),
                Some(format!("{} ledger entries reopened", changed_entries.len())),
            ),
            schedule_snapshot(schedule),
            schedule_snapshot(&new_schedule),
            AuditScope::new("schedule", schedule.schedule_id),
        ),
        new_schedule,
        changed_entries,
    })
}

/// Reactivates a ledger entry whose hold has lapsed. `None` if nothing
/// expired.
#[must_use]
pub fn sweep_ledger(entry: &LedgerEntry, now: OffsetDateTime) -> Option<LedgerTransition> {
    let mut new_entry = entry.clone();
    if !new_entry.apply_expiry(now) {
        return None;
    }
    Some(LedgerTransition {
        audit_event: AuditEvent::new(
            Actor::system(),
            sweep_cause(now),
            Action::new(String::from("ExpireLedgerStatus"), None),
            ledger_snapshot(entry),
            ledger_snapshot(&new_entry),
            AuditScope::new("ledger", entry.ledger_id),
        ),
        new_entry,
    })
}
