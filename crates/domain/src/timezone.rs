// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Operating timezone.
//!
//! Departure dates and times are wall-clock values at the port. The engine
//! itself works in UTC instants, so "today" and the departure instant are
//! both derived through the operating timezone.

use crate::error::DomainError;
use chrono::{Datelike, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use time::OffsetDateTime;

/// The IANA timezone the ferry operation runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatingZone {
    tz: Tz,
}

impl OperatingZone {
    /// Parses an IANA timezone name.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidTimezone` for unknown names.
    pub fn parse(name: &str) -> Result<Self, DomainError> {
        let tz: Tz = name
            .parse()
            .map_err(|_| DomainError::InvalidTimezone(name.to_string()))?;
        Ok(Self { tz })
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.tz.name()
    }

    /// The local calendar date at `now`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidDateTime` if the instant is out of range.
    pub fn local_date(&self, now: OffsetDateTime) -> Result<time::Date, DomainError> {
        let instant = chrono::DateTime::from_timestamp(now.unix_timestamp(), now.nanosecond())
            .ok_or_else(|| DomainError::InvalidDateTime {
                reason: format!("instant {now} is out of range"),
            })?;
        let local = instant.with_timezone(&self.tz).date_naive();

        let month = u8::try_from(local.month())
            .ok()
            .and_then(|m| time::Month::try_from(m).ok())
            .ok_or_else(|| DomainError::InvalidDateTime {
                reason: format!("invalid month in {local}"),
            })?;
        let day = u8::try_from(local.day()).map_err(|_| DomainError::InvalidDateTime {
            reason: format!("invalid day in {local}"),
        })?;

        time::Date::from_calendar_date(local.year(), month, day).map_err(|e| {
            DomainError::InvalidDateTime {
                reason: e.to_string(),
            }
        })
    }

    /// The UTC instant of a local departure date and time.
    ///
    /// A wall-clock time repeated by a DST fall-back resolves to its first
    /// occurrence.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidDateTime` if the local time falls in a
    /// DST spring-forward gap.
    pub fn departure_instant(
        &self,
        date: time::Date,
        departure_time: time::Time,
    ) -> Result<OffsetDateTime, DomainError> {
        let naive_date = NaiveDate::from_ymd_opt(
            date.year(),
            date.month() as u32,
            u32::from(date.day()),
        )
        .ok_or_else(|| DomainError::InvalidDateTime {
            reason: format!("invalid departure date: {date}"),
        })?;

        let naive_time = NaiveTime::from_hms_opt(
            u32::from(departure_time.hour()),
            u32::from(departure_time.minute()),
            u32::from(departure_time.second()),
        )
        .ok_or_else(|| DomainError::InvalidDateTime {
            reason: format!("invalid departure time: {departure_time}"),
        })?;

        let local = self
            .tz
            .from_local_datetime(&naive_date.and_time(naive_time))
            .earliest()
            .ok_or_else(|| DomainError::InvalidDateTime {
                reason: format!(
                    "{date} {departure_time} does not exist in {} (DST gap)",
                    self.tz.name()
                ),
            })?;

        OffsetDateTime::from_unix_timestamp(local.with_timezone(&chrono::Utc).timestamp()).map_err(
            |e| DomainError::InvalidDateTime {
                reason: e.to_string(),
            },
        )
    }
}
