// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Routes, ferries and schedules.
//!
//! These are reference data maintained by administrators. The booking
//! engine only reads them, applying lapsed status holds as it goes.

use crate::capacity::ResourceCounts;
use crate::error::DomainError;
use crate::manifest::FareTable;
use crate::operational_status::{RouteStatus, ScheduleStatus, StatusHold};
use crate::recurrence::OperatingDays;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// A crossing between two ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub route_id: Option<i64>,
    pub origin: String,
    pub destination: String,
    pub fares: FareTable,
    pub status: RouteStatus,
    pub hold: StatusHold,
}

impl Route {
    /// Creates an ACTIVE route.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::EmptyField` if a port name is blank.
    pub fn new(origin: &str, destination: &str, fares: FareTable) -> Result<Self, DomainError> {
        if origin.trim().is_empty() {
            return Err(DomainError::EmptyField("origin"));
        }
        if destination.trim().is_empty() {
            return Err(DomainError::EmptyField("destination"));
        }
        Ok(Self {
            route_id: None,
            origin: origin.trim().to_string(),
            destination: destination.trim().to_string(),
            fares,
            status: RouteStatus::Active,
            hold: StatusHold::default(),
        })
    }

    /// Reverts an expired hold. Returns true if anything changed.
    pub fn apply_expiry(&mut self, now: OffsetDateTime) -> bool {
        if self.status == RouteStatus::Active || !self.hold.is_expired(now) {
            return false;
        }
        self.status = RouteStatus::Active;
        self.hold = StatusHold::default();
        true
    }

    /// # Errors
    ///
    /// Returns `DomainError::ScheduleClosed` unless the route is ACTIVE at `now`.
    pub fn ensure_open(&self, now: OffsetDateTime) -> Result<(), DomainError> {
        if self.status == RouteStatus::Active || self.hold.is_expired(now) {
            Ok(())
        } else {
            Err(DomainError::ScheduleClosed {
                scope: "route",
                status: self.status.as_str().to_string(),
                reason: self.hold.reason.clone(),
            })
        }
    }
}

/// A vessel and its class capacities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ferry {
    pub ferry_id: Option<i64>,
    pub name: String,
    pub capacity: ResourceCounts,
}

/// A recurring weekly sailing on a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub schedule_id: Option<i64>,
    pub route_id: i64,
    pub ferry_id: i64,
    pub departure_time: time::Time,
    pub arrival_time: time::Time,
    pub operating_days: OperatingDays,
    pub status: ScheduleStatus,
    pub hold: StatusHold,
}

impl Schedule {
    /// Reverts an expired INACTIVE hold. Returns true if anything changed.
    pub fn apply_expiry(&mut self, now: OffsetDateTime) -> bool {
        if self.status == ScheduleStatus::Active || !self.hold.is_expired(now) {
            return false;
        }
        self.status = ScheduleStatus::Active;
        self.hold = StatusHold::default();
        true
    }

    /// # Errors
    ///
    /// Returns `DomainError::ScheduleClosed` unless the schedule is ACTIVE at `now`.
    pub fn ensure_open(&self, now: OffsetDateTime) -> Result<(), DomainError> {
        if self.status == ScheduleStatus::Active || self.hold.is_expired(now) {
            Ok(())
        } else {
            Err(DomainError::ScheduleClosed {
                scope: "schedule",
                status: self.status.as_str().to_string(),
                reason: self.hold.reason.clone(),
            })
        }
    }
}
