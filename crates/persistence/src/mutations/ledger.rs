// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Capacity ledger writes.
//!
//! Counters are only ever written back from a [`LedgerEntry`] that went
//! through `try_reserve`, `release` or `override_capacity`, inside the
//! transaction that read it. The table's CHECK constraints hold the
//! `0 <= usage <= capacity` invariant a second time.

use diesel::SqliteConnection;
use diesel::prelude::*;
use tracing::debug;

use ferry_book_domain::LedgerEntry;

use crate::connection::InsertedRowId;
use crate::codec::{encode_date, encode_flag, encode_optional_instant};
use crate::diesel_schema::schedule_dates;
use crate::error::PersistenceError;

/// Inserts a freshly opened ledger entry and returns its ID.
///
/// # Errors
///
/// Returns an error if the insert fails, including when another entry
/// already exists for the same schedule and date.
pub fn insert_ledger(
    conn: &mut SqliteConnection,
    entry: &LedgerEntry,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(schedule_dates::table)
        .values((
            schedule_dates::schedule_id.eq(entry.schedule_id),
            schedule_dates::departure_date.eq(encode_date(entry.departure_date)?),
            schedule_dates::status.eq(entry.status.as_str()),
            schedule_dates::status_reason.eq(&entry.hold.reason),
            schedule_dates::status_expires_at.eq(encode_optional_instant(entry.hold.expires_at)?),
            schedule_dates::status_source.eq(entry.status_source.as_str()),
            schedule_dates::passenger_usage.eq(i64::from(entry.usage.passengers)),
            schedule_dates::motorcycle_usage.eq(i64::from(entry.usage.motorcycles)),
            schedule_dates::car_usage.eq(i64::from(entry.usage.cars)),
            schedule_dates::bus_usage.eq(i64::from(entry.usage.buses)),
            schedule_dates::truck_usage.eq(i64::from(entry.usage.trucks)),
            schedule_dates::passenger_capacity.eq(i64::from(entry.capacity.passengers)),
            schedule_dates::motorcycle_capacity.eq(i64::from(entry.capacity.motorcycles)),
            schedule_dates::car_capacity.eq(i64::from(entry.capacity.cars)),
            schedule_dates::bus_capacity.eq(i64::from(entry.capacity.buses)),
            schedule_dates::truck_capacity.eq(i64::from(entry.capacity.trucks)),
            schedule_dates::capacity_overridden.eq(encode_flag(entry.capacity_overridden)),
        ))
        .execute(conn)?;

    let ledger_id: i64 = conn.last_row_id()?;
    debug!(
        ledger_id,
        schedule_id = entry.schedule_id,
        departure_date = %entry.departure_date,
        "Opened ledger entry"
    );
    Ok(ledger_id)
}

/// Writes back status, counters and ceilings of an existing entry.
///
/// # Errors
///
/// Returns `NotFound` if the entry has no ID or no longer exists.
pub fn update_ledger(
    conn: &mut SqliteConnection,
    entry: &LedgerEntry,
) -> Result<(), PersistenceError> {
    let ledger_id: i64 = entry
        .ledger_id
        .ok_or_else(|| PersistenceError::NotFound(String::from("unsaved ledger entry")))?;

    let updated: usize = diesel::update(
        schedule_dates::table.filter(schedule_dates::ledger_id.eq(ledger_id)),
    )
    .set((
        schedule_dates::status.eq(entry.status.as_str()),
        schedule_dates::status_reason.eq(&entry.hold.reason),
        schedule_dates::status_expires_at.eq(encode_optional_instant(entry.hold.expires_at)?),
        schedule_dates::status_source.eq(entry.status_source.as_str()),
        schedule_dates::passenger_usage.eq(i64::from(entry.usage.passengers)),
        schedule_dates::motorcycle_usage.eq(i64::from(entry.usage.motorcycles)),
        schedule_dates::car_usage.eq(i64::from(entry.usage.cars)),
        schedule_dates::bus_usage.eq(i64::from(entry.usage.buses)),
        schedule_dates::truck_usage.eq(i64::from(entry.usage.trucks)),
        schedule_dates::passenger_capacity.eq(i64::from(entry.capacity.passengers)),
        schedule_dates::motorcycle_capacity.eq(i64::from(entry.capacity.motorcycles)),
        schedule_dates::car_capacity.eq(i64::from(entry.capacity.cars)),
        schedule_dates::bus_capacity.eq(i64::from(entry.capacity.buses)),
        schedule_dates::truck_capacity.eq(i64::from(entry.capacity.trucks)),
        schedule_dates::capacity_overridden.eq(encode_flag(entry.capacity_overridden)),
    ))
    .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!(
            "ledger entry {ledger_id}"
        )));
    }

    debug!(
        ledger_id,
        status = entry.status.as_str(),
        passengers = entry.usage.passengers,
        "Updated ledger entry"
    );
    Ok(())
}
