// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Capacity ledger lookups.

use diesel::SqliteConnection;
use diesel::prelude::*;

use ferry_book_domain::{LedgerEntry, LedgerStatus};

use crate::codec::encode_date;
use crate::data_models::LedgerRow;
use crate::diesel_schema::schedule_dates;
use crate::error::PersistenceError;

/// Finds the ledger entry for a schedule on a date, if one was opened.
///
/// # Errors
///
/// Returns an error if the query fails or the row is corrupt.
pub fn find_ledger(
    conn: &mut SqliteConnection,
    schedule_id: i64,
    departure_date: time::Date,
) -> Result<Option<LedgerEntry>, PersistenceError> {
    let date: String = encode_date(departure_date)?;
    schedule_dates::table
        .filter(schedule_dates::schedule_id.eq(schedule_id))
        .filter(schedule_dates::departure_date.eq(&date))
        .select(LedgerRow::as_select())
        .first(conn)
        .optional()?
        .map(LedgerEntry::try_from)
        .transpose()
}

/// Finds the ledger entry for a schedule on a date.
///
/// # Errors
///
/// Returns `NotFound` if the entry was never opened.
pub fn get_ledger(
    conn: &mut SqliteConnection,
    schedule_id: i64,
    departure_date: time::Date,
) -> Result<LedgerEntry, PersistenceError> {
    find_ledger(conn, schedule_id, departure_date)?.ok_or_else(|| {
        PersistenceError::NotFound(format!(
            "ledger entry for schedule {schedule_id} on {departure_date}"
        ))
    })
}

/// All ledger entries of a schedule, oldest date first.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_ledger_for_schedule(
    conn: &mut SqliteConnection,
    schedule_id: i64,
) -> Result<Vec<LedgerEntry>, PersistenceError> {
    schedule_dates::table
        .filter(schedule_dates::schedule_id.eq(schedule_id))
        .order(schedule_dates::departure_date.asc())
        .select(LedgerRow::as_select())
        .load(conn)?
        .into_iter()
        .map(LedgerEntry::try_from)
        .collect()
}

/// Entries closed with an expiry, candidates for the sweep.
///
/// # Errors
///
/// Returns an error if the query fails or a row is corrupt.
pub fn list_held_ledger_entries(
    conn: &mut SqliteConnection,
) -> Result<Vec<LedgerEntry>, PersistenceError> {
    schedule_dates::table
        .filter(schedule_dates::status.ne(LedgerStatus::Active.as_str()))
        .filter(schedule_dates::status.ne(LedgerStatus::Full.as_str()))
        .filter(schedule_dates::status_expires_at.is_not_null())
        .select(LedgerRow::as_select())
        .load(conn)?
        .into_iter()
        .map(LedgerEntry::try_from)
        .collect()
}
