// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Text encodings for temporal columns and counters.
//!
//! Dates are stored as `YYYY-MM-DD`, times of day as `HH:MM` and instants
//! as RFC 3339. Counters are stored as `BIGINT` and narrowed on the way
//! out.

use num_traits::ToPrimitive;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, Time};

use crate::error::PersistenceError;

const DATE_FORMAT: &[time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");
const TIME_FORMAT: &[time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[hour]:[minute]");

/// Formats a calendar date for storage.
///
/// # Errors
///
/// Returns an error if the date cannot be formatted.
pub fn encode_date(date: Date) -> Result<String, PersistenceError> {
    date.format(DATE_FORMAT)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

/// Parses a stored calendar date.
///
/// # Errors
///
/// Returns `CorruptRow` if the text is not a valid date.
pub fn decode_date(table: &'static str, value: &str) -> Result<Date, PersistenceError> {
    Date::parse(value, DATE_FORMAT)
        .map_err(|e| PersistenceError::corrupt(table, format!("bad date '{value}': {e}")))
}

/// Formats a time of day for storage.
///
/// # Errors
///
/// Returns an error if the time cannot be formatted.
pub fn encode_time(value: Time) -> Result<String, PersistenceError> {
    value
        .format(TIME_FORMAT)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

/// Parses a stored time of day.
///
/// # Errors
///
/// Returns `CorruptRow` if the text is not a valid time.
pub fn decode_time(table: &'static str, value: &str) -> Result<Time, PersistenceError> {
    Time::parse(value, TIME_FORMAT)
        .map_err(|e| PersistenceError::corrupt(table, format!("bad time '{value}': {e}")))
}

/// Formats an instant for storage.
///
/// # Errors
///
/// Returns an error if the instant cannot be formatted.
pub fn encode_instant(value: OffsetDateTime) -> Result<String, PersistenceError> {
    value
        .format(&Rfc3339)
        .map_err(|e| PersistenceError::SerializationError(e.to_string()))
}

/// Formats an optional instant for storage.
///
/// # Errors
///
/// Returns an error if the instant cannot be formatted.
pub fn encode_optional_instant(
    value: Option<OffsetDateTime>,
) -> Result<Option<String>, PersistenceError> {
    value.map(encode_instant).transpose()
}

/// Parses a stored instant.
///
/// # Errors
///
/// Returns `CorruptRow` if the text is not RFC 3339.
pub fn decode_instant(table: &'static str, value: &str) -> Result<OffsetDateTime, PersistenceError> {
    OffsetDateTime::parse(value, &Rfc3339)
        .map_err(|e| PersistenceError::corrupt(table, format!("bad timestamp '{value}': {e}")))
}

/// Parses an optional stored instant.
///
/// # Errors
///
/// Returns `CorruptRow` if the text is not RFC 3339.
pub fn decode_optional_instant(
    table: &'static str,
    value: Option<&str>,
) -> Result<Option<OffsetDateTime>, PersistenceError> {
    value.map(|v| decode_instant(table, v)).transpose()
}

/// Narrows a stored counter.
///
/// # Errors
///
/// Returns `CorruptRow` if the value is negative or too large.
pub fn decode_count(table: &'static str, value: i64) -> Result<u32, PersistenceError> {
    value
        .to_u32()
        .ok_or_else(|| PersistenceError::corrupt(table, format!("count out of range: {value}")))
}

/// Converts an integer flag column.
pub const fn decode_flag(value: i32) -> bool {
    value != 0
}

/// Produces an integer flag column.
pub const fn encode_flag(value: bool) -> i32 {
    if value { 1 } else { 0 }
}
