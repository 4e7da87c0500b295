// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Route, ferry and schedule writes.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use ferry_book_domain::{Ferry, Route, Schedule};

use crate::connection::InsertedRowId;
use crate::codec::{encode_optional_instant, encode_time};
use crate::diesel_schema::{ferries, routes, schedules};
use crate::error::PersistenceError;

/// Inserts a route and returns its ID.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_route(conn: &mut SqliteConnection, route: &Route) -> Result<i64, PersistenceError> {
    diesel::insert_into(routes::table)
        .values((
            routes::origin.eq(&route.origin),
            routes::destination.eq(&route.destination),
            routes::passenger_fare.eq(route.fares.passenger),
            routes::motorcycle_fare.eq(route.fares.motorcycle),
            routes::car_fare.eq(route.fares.car),
            routes::bus_fare.eq(route.fares.bus),
            routes::truck_fare.eq(route.fares.truck),
            routes::status.eq(route.status.as_str()),
            routes::status_reason.eq(&route.hold.reason),
            routes::status_expires_at.eq(encode_optional_instant(route.hold.expires_at)?),
        ))
        .execute(conn)?;

    let route_id: i64 = conn.last_row_id()?;
    debug!(route_id, origin = %route.origin, destination = %route.destination, "Inserted route");
    Ok(route_id)
}

/// Writes a route's status and hold.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn update_route_status(
    conn: &mut SqliteConnection,
    route_id: i64,
    route: &Route,
) -> Result<(), PersistenceError> {
    diesel::update(routes::table.filter(routes::route_id.eq(route_id)))
        .set((
            routes::status.eq(route.status.as_str()),
            routes::status_reason.eq(&route.hold.reason),
            routes::status_expires_at.eq(encode_optional_instant(route.hold.expires_at)?),
        ))
        .execute(conn)?;
    Ok(())
}

/// Inserts a ferry and returns its ID.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_ferry(conn: &mut SqliteConnection, ferry: &Ferry) -> Result<i64, PersistenceError> {
    diesel::insert_into(ferries::table)
        .values((
            ferries::name.eq(&ferry.name),
            ferries::passenger_capacity.eq(i64::from(ferry.capacity.passengers)),
            ferries::motorcycle_capacity.eq(i64::from(ferry.capacity.motorcycles)),
            ferries::car_capacity.eq(i64::from(ferry.capacity.cars)),
            ferries::bus_capacity.eq(i64::from(ferry.capacity.buses)),
            ferries::truck_capacity.eq(i64::from(ferry.capacity.trucks)),
        ))
        .execute(conn)?;

    let ferry_id: i64 = conn.last_row_id()?;
    debug!(ferry_id, name = %ferry.name, "Inserted ferry");
    Ok(ferry_id)
}

/// Inserts a schedule and returns its ID.
///
/// The route and ferry must exist; foreign keys reject the insert otherwise.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn insert_schedule(
    conn: &mut SqliteConnection,
    schedule: &Schedule,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(schedules::table)
        .values((
            schedules::route_id.eq(schedule.route_id),
            schedules::ferry_id.eq(schedule.ferry_id),
            schedules::departure_time.eq(encode_time(schedule.departure_time)?),
            schedules::arrival_time.eq(encode_time(schedule.arrival_time)?),
            schedules::operating_days.eq(schedule.operating_days.to_storage_string()),
            schedules::status.eq(schedule.status.as_str()),
            schedules::status_reason.eq(&schedule.hold.reason),
            schedules::status_expires_at.eq(encode_optional_instant(schedule.hold.expires_at)?),
        ))
        .execute(conn)?;

    let schedule_id: i64 = conn.last_row_id()?;
    debug!(schedule_id, route_id = schedule.route_id, "Inserted schedule");
    Ok(schedule_id)
}

/// Writes a schedule's status and hold.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn update_schedule_status(
    conn: &mut SqliteConnection,
    schedule_id: i64,
    schedule: &Schedule,
) -> Result<(), PersistenceError> {
    diesel::update(schedules::table.filter(schedules::schedule_id.eq(schedule_id)))
        .set((
            schedules::status.eq(schedule.status.as_str()),
            schedules::status_reason.eq(&schedule.hold.reason),
            schedules::status_expires_at.eq(encode_optional_instant(schedule.hold.expires_at)?),
        ))
        .execute(conn)?;
    Ok(())
}
