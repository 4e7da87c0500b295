// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Operational status for routes, schedules and ledger entries.
//!
//! Each of these can be held closed by an operator with an optional reason
//! and expiry. Once the expiry has passed the hold lapses and the record is
//! ACTIVE again; [`StatusHold::is_expired`] is the single place that decides.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

/// Status of a capacity ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerStatus {
    Active,
    Inactive,
    /// Passenger capacity exhausted
    Full,
    Cancelled,
    WeatherIssue,
}

impl LedgerStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::Full => "FULL",
            Self::Cancelled => "CANCELLED",
            Self::WeatherIssue => "WEATHER_ISSUE",
        }
    }

    /// Returns true if a reservation may proceed to the capacity check.
    ///
    /// FULL entries are answered by the capacity check itself.
    #[must_use]
    pub const fn accepts_reservations(&self) -> bool {
        matches!(self, Self::Active | Self::Full)
    }
}

impl FromStr for LedgerStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(Self::Active),
            "INACTIVE" => Ok(Self::Inactive),
            "FULL" => Ok(Self::Full),
            "CANCELLED" => Ok(Self::Cancelled),
            "WEATHER_ISSUE" => Ok(Self::WeatherIssue),
            _ => Err(DomainError::InvalidStatus {
                entity: "ledger",
                value: s.to_string(),
            }),
        }
    }
}

/// Who put a ledger entry into its current status.
///
/// Only entries closed with `Schedule` provenance are reopened when their
/// schedule is reactivated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusSource {
    /// Set by an operator on the entry itself
    Direct,
    /// Cascaded from the schedule's own status
    Schedule,
    /// Set by the engine (FULL tracking)
    System,
}

impl StatusSource {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Schedule => "schedule",
            Self::System => "system",
        }
    }
}

impl FromStr for StatusSource {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "direct" => Ok(Self::Direct),
            "schedule" => Ok(Self::Schedule),
            "system" => Ok(Self::System),
            _ => Err(DomainError::InvalidStatus {
                entity: "status source",
                value: s.to_string(),
            }),
        }
    }
}

/// Status of a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScheduleStatus {
    Active,
    Inactive,
}

impl ScheduleStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
        }
    }
}

impl FromStr for ScheduleStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(Self::Active),
            "INACTIVE" => Ok(Self::Inactive),
            _ => Err(DomainError::InvalidStatus {
                entity: "schedule",
                value: s.to_string(),
            }),
        }
    }
}

/// Status of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteStatus {
    Active,
    Inactive,
    WeatherIssue,
}

impl RouteStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::WeatherIssue => "WEATHER_ISSUE",
        }
    }
}

impl FromStr for RouteStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(Self::Active),
            "INACTIVE" => Ok(Self::Inactive),
            "WEATHER_ISSUE" => Ok(Self::WeatherIssue),
            _ => Err(DomainError::InvalidStatus {
                entity: "route",
                value: s.to_string(),
            }),
        }
    }
}

/// Reason and optional expiry attached to a non-active status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusHold {
    pub reason: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub expires_at: Option<OffsetDateTime>,
}

impl StatusHold {
    #[must_use]
    pub const fn new(reason: Option<String>, expires_at: Option<OffsetDateTime>) -> Self {
        Self { reason, expires_at }
    }

    /// Returns true once the expiry instant has been reached.
    ///
    /// A hold without an expiry never lapses on its own.
    #[must_use]
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}
