// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Weekly recurrence of a schedule.
//!
//! Days are ISO weekday numbers: 1 = Monday through 7 = Sunday.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};

/// The set of weekdays a schedule operates on.
///
/// Stored as a bitmask; bit `n - 1` is set when ISO day `n` is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct OperatingDays(u8);

impl OperatingDays {
    /// Builds the set from ISO day numbers. Duplicates are tolerated.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidOperatingDays` if the list is empty or
    /// contains a value outside 1..=7.
    pub fn new(days: &[u8]) -> Result<Self, DomainError> {
        if days.is_empty() {
            return Err(DomainError::InvalidOperatingDays {
                reason: String::from("at least one day is required"),
            });
        }

        let mut mask = 0u8;
        for &day in days {
            if !(1..=7).contains(&day) {
                return Err(DomainError::InvalidOperatingDays {
                    reason: format!("day {day} is outside 1..=7"),
                });
            }
            mask |= 1 << (day - 1);
        }

        Ok(Self(mask))
    }

    /// Parses the comma-separated storage form, e.g. `"1,3,5"`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidOperatingDays` on malformed input.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let days = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<u8>()
                    .map_err(|_| DomainError::InvalidOperatingDays {
                        reason: format!("'{part}' is not a day number"),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(&days)
    }

    #[must_use]
    pub const fn contains(&self, iso_day: u8) -> bool {
        iso_day >= 1 && iso_day <= 7 && self.0 & (1 << (iso_day - 1)) != 0
    }

    /// Returns true iff the date's weekday is in the set.
    #[must_use]
    pub const fn serves_date(&self, date: time::Date) -> bool {
        self.contains(date.weekday().number_from_monday())
    }

    /// Fails fast with `DayNotServed` when the date is not served.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::DayNotServed` for an unserved weekday.
    pub fn ensure_serves(&self, date: time::Date) -> Result<(), DomainError> {
        if self.serves_date(date) {
            Ok(())
        } else {
            Err(DomainError::DayNotServed {
                date,
                weekday: date.weekday(),
            })
        }
    }

    /// ISO day numbers in ascending order.
    #[must_use]
    pub fn days(&self) -> Vec<u8> {
        (1..=7).filter(|day| self.contains(*day)).collect()
    }

    /// The comma-separated storage form.
    #[must_use]
    pub fn to_storage_string(&self) -> String {
        self.days()
            .iter()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl TryFrom<Vec<u8>> for OperatingDays {
    type Error = DomainError;

    fn try_from(days: Vec<u8>) -> Result<Self, Self::Error> {
        Self::new(&days)
    }
}

impl From<OperatingDays> for Vec<u8> {
    fn from(days: OperatingDays) -> Self {
        days.days()
    }
}
