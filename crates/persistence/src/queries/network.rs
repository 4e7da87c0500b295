// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Route, ferry and schedule lookups.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use ferry_book_domain::{Ferry, Route, RouteStatus, Schedule, ScheduleStatus};

use crate::data_models::{FerryRow, RouteRow, ScheduleRow};
use crate::diesel_schema::{ferries, routes, schedules};
use crate::error::PersistenceError;

/// Retrieves a route by ID.
///
/// # Errors
///
/// Returns `NotFound` if the route does not exist.
pub fn get_route(conn: &mut SqliteConnection, route_id: i64) -> Result<Route, PersistenceError> {
    debug!(route_id, "Looking up route");
    let row: RouteRow = routes::table
        .filter(routes::route_id.eq(route_id))
        .select(RouteRow::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::NotFound(format!("route {route_id}")))?;
    Route::try_from(row)
}

/// Lists all routes in creation order.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_routes(conn: &mut SqliteConnection) -> Result<Vec<Route>, PersistenceError> {
    routes::table
        .order(routes::route_id.asc())
        .select(RouteRow::as_select())
        .load(conn)?
        .into_iter()
        .map(Route::try_from)
        .collect()
}

/// Routes that are not ACTIVE and carry an expiry.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_held_routes(conn: &mut SqliteConnection) -> Result<Vec<Route>, PersistenceError> {
    routes::table
        .filter(routes::status.ne(RouteStatus::Active.as_str()))
        .filter(routes::status_expires_at.is_not_null())
        .select(RouteRow::as_select())
        .load(conn)?
        .into_iter()
        .map(Route::try_from)
        .collect()
}

/// Retrieves a ferry by ID.
///
/// # Errors
///
/// Returns `NotFound` if the ferry does not exist.
pub fn get_ferry(conn: &mut SqliteConnection, ferry_id: i64) -> Result<Ferry, PersistenceError> {
    let row: FerryRow = ferries::table
        .filter(ferries::ferry_id.eq(ferry_id))
        .select(FerryRow::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::NotFound(format!("ferry {ferry_id}")))?;
    Ferry::try_from(row)
}

/// Retrieves a schedule by ID.
///
/// # Errors
///
/// Returns `NotFound` if the schedule does not exist.
pub fn get_schedule(
    conn: &mut SqliteConnection,
    schedule_id: i64,
) -> Result<Schedule, PersistenceError> {
    debug!(schedule_id, "Looking up schedule");
    let row: ScheduleRow = schedules::table
        .filter(schedules::schedule_id.eq(schedule_id))
        .select(ScheduleRow::as_select())
        .first(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::NotFound(format!("schedule {schedule_id}")))?;
    Schedule::try_from(row)
}

/// Lists the schedules of a route.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_schedules_for_route(
    conn: &mut SqliteConnection,
    route_id: i64,
) -> Result<Vec<Schedule>, PersistenceError> {
    schedules::table
        .filter(schedules::route_id.eq(route_id))
        .order(schedules::departure_time.asc())
        .select(ScheduleRow::as_select())
        .load(conn)?
        .into_iter()
        .map(Schedule::try_from)
        .collect()
}

/// Schedules that are INACTIVE with an expiry.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_held_schedules(
    conn: &mut SqliteConnection,
) -> Result<Vec<Schedule>, PersistenceError> {
    schedules::table
        .filter(schedules::status.ne(ScheduleStatus::Active.as_str()))
        .filter(schedules::status_expires_at.is_not_null())
        .select(ScheduleRow::as_select())
        .load(conn)?
        .into_iter()
        .map(Schedule::try_from)
        .collect()
}
