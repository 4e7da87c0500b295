// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Capacity ledger arithmetic.
//!
//! A [`LedgerEntry`] tracks usage for one schedule on one calendar date
//! across five independent resource classes. Its ceilings are resolved
//! once, when the entry is created, from either an operator override or
//! the ferry's class capacities. After that every check reads the stored
//! ceiling; nothing re-derives it.
//!
//! Invariant: `0 <= usage <= capacity` for every class, always.
//! [`LedgerEntry::try_reserve`] and [`LedgerEntry::release`] are the only
//! operations that touch usage and both are all-or-nothing.

use crate::error::DomainError;
use crate::operational_status::{LedgerStatus, StatusHold, StatusSource};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// One of the five independently-counted resource pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceClass {
    Passenger,
    Motorcycle,
    Car,
    Bus,
    Truck,
}

impl ResourceClass {
    pub const ALL: [Self; 5] = [
        Self::Passenger,
        Self::Motorcycle,
        Self::Car,
        Self::Bus,
        Self::Truck,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Passenger => "passenger",
            Self::Motorcycle => "motorcycle",
            Self::Car => "car",
            Self::Bus => "bus",
            Self::Truck => "truck",
        }
    }
}

/// A count per resource class.
///
/// Used for usage, ceilings and reservation deltas alike.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceCounts {
    pub passengers: u32,
    pub motorcycles: u32,
    pub cars: u32,
    pub buses: u32,
    pub trucks: u32,
}

impl ResourceCounts {
    #[must_use]
    pub const fn new(passengers: u32, motorcycles: u32, cars: u32, buses: u32, trucks: u32) -> Self {
        Self {
            passengers,
            motorcycles,
            cars,
            buses,
            trucks,
        }
    }

    #[must_use]
    pub const fn get(&self, class: ResourceClass) -> u32 {
        match class {
            ResourceClass::Passenger => self.passengers,
            ResourceClass::Motorcycle => self.motorcycles,
            ResourceClass::Car => self.cars,
            ResourceClass::Bus => self.buses,
            ResourceClass::Truck => self.trucks,
        }
    }

    const fn slot_mut(&mut self, class: ResourceClass) -> &mut u32 {
        match class {
            ResourceClass::Passenger => &mut self.passengers,
            ResourceClass::Motorcycle => &mut self.motorcycles,
            ResourceClass::Car => &mut self.cars,
            ResourceClass::Bus => &mut self.buses,
            ResourceClass::Truck => &mut self.trucks,
        }
    }

    /// Adds one unit to a class, saturating.
    pub const fn increment(&mut self, class: ResourceClass) {
        let slot = self.slot_mut(class);
        *slot = slot.saturating_add(1);
    }

    /// Total vehicles across the four vehicle classes.
    #[must_use]
    pub const fn vehicle_total(&self) -> u32 {
        self.motorcycles
            .saturating_add(self.cars)
            .saturating_add(self.buses)
            .saturating_add(self.trucks)
    }

    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.passengers == 0 && self.vehicle_total() == 0
    }
}

/// The capacity and status record for one schedule on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Database identifier, `None` before first persistence.
    pub ledger_id: Option<i64>,
    pub schedule_id: i64,
    pub departure_date: time::Date,
    pub status: LedgerStatus,
    pub hold: StatusHold,
    pub status_source: StatusSource,
    pub usage: ResourceCounts,
    pub capacity: ResourceCounts,
    /// True when `capacity` came from an operator override.
    pub capacity_overridden: bool,
}

impl LedgerEntry {
    /// Creates a fresh ACTIVE entry with zero usage.
    ///
    /// `capacity` is resolved by the caller exactly once: the override if
    /// one was supplied, else the ferry's class capacities.
    #[must_use]
    pub fn open(
        schedule_id: i64,
        departure_date: time::Date,
        ferry_capacity: ResourceCounts,
        capacity_override: Option<ResourceCounts>,
    ) -> Self {
        Self {
            ledger_id: None,
            schedule_id,
            departure_date,
            status: LedgerStatus::Active,
            hold: StatusHold::default(),
            status_source: StatusSource::Direct,
            usage: ResourceCounts::default(),
            capacity: capacity_override.unwrap_or(ferry_capacity),
            capacity_overridden: capacity_override.is_some(),
        }
    }

    /// Units still available for a class.
    #[must_use]
    pub const fn available(&self, class: ResourceClass) -> u32 {
        self.capacity
            .get(class)
            .saturating_sub(self.usage.get(class))
    }

    /// Checks the delta against every class without mutating anything.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InsufficientCapacity` naming the first class
    /// that does not fit.
    pub fn check_fits(&self, delta: &ResourceCounts) -> Result<(), DomainError> {
        for class in ResourceClass::ALL {
            let requested = delta.get(class);
            let available = self.available(class);
            if requested > available {
                return Err(DomainError::InsufficientCapacity {
                    class,
                    requested,
                    available,
                });
            }
        }
        Ok(())
    }

    /// Reserves `delta` across all classes, or nothing at all.
    ///
    /// # Errors
    ///
    /// - `ScheduleClosed` when the entry does not accept reservations
    /// - `InsufficientCapacity` when any class would exceed its ceiling
    pub fn try_reserve(&mut self, delta: &ResourceCounts) -> Result<(), DomainError> {
        if !self.status.accepts_reservations() {
            return Err(DomainError::ScheduleClosed {
                scope: "ledger",
                status: self.status.as_str().to_string(),
                reason: self.hold.reason.clone(),
            });
        }

        self.check_fits(delta)?;

        for class in ResourceClass::ALL {
            let slot = self.usage.slot_mut(class);
            *slot += delta.get(class);
        }

        self.sync_full_status();
        Ok(())
    }

    /// Returns `delta` to the pool, or nothing at all.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ReleaseExceedsUsage` if any class would go
    /// below zero.
    pub fn release(&mut self, delta: &ResourceCounts) -> Result<(), DomainError> {
        for class in ResourceClass::ALL {
            let release = delta.get(class);
            let usage = self.usage.get(class);
            if release > usage {
                return Err(DomainError::ReleaseExceedsUsage {
                    class,
                    release,
                    usage,
                });
            }
        }

        for class in ResourceClass::ALL {
            let slot = self.usage.slot_mut(class);
            *slot -= delta.get(class);
        }

        self.sync_full_status();
        Ok(())
    }

    /// Replaces the ceilings with an operator override.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CapacityBelowUsage` if any class would end up
    /// below what is already booked.
    pub fn override_capacity(&mut self, capacity: ResourceCounts) -> Result<(), DomainError> {
        for class in ResourceClass::ALL {
            if capacity.get(class) < self.usage.get(class) {
                return Err(DomainError::CapacityBelowUsage {
                    class,
                    capacity: capacity.get(class),
                    usage: self.usage.get(class),
                });
            }
        }

        self.capacity = capacity;
        self.capacity_overridden = true;
        self.sync_full_status();
        Ok(())
    }

    /// Forces a status. Setting ACTIVE clears any hold.
    pub fn set_status(&mut self, status: LedgerStatus, hold: StatusHold, source: StatusSource) {
        self.status = status;
        self.status_source = source;
        self.hold = if status == LedgerStatus::Active {
            StatusHold::default()
        } else {
            hold
        };
        self.sync_full_status();
    }

    /// Reverts an expired hold to ACTIVE. Returns true if anything changed.
    ///
    /// Entries closed by their schedule never expire on their own; they
    /// reopen when the schedule does.
    pub fn apply_expiry(&mut self, now: OffsetDateTime) -> bool {
        if matches!(self.status, LedgerStatus::Active | LedgerStatus::Full)
            || self.status_source == StatusSource::Schedule
            || !self.hold.is_expired(now)
        {
            return false;
        }

        self.set_status(LedgerStatus::Active, StatusHold::default(), StatusSource::Direct);
        true
    }

    /// Closes the entry because its schedule was deactivated.
    ///
    /// ACTIVE or FULL entries follow the schedule, and entries the schedule
    /// already closed take its latest hold. An entry an operator closed
    /// directly keeps its own status and provenance. Returns true if the
    /// entry changed.
    pub fn close_for_schedule(&mut self, hold: &StatusHold) -> bool {
        match (self.status, self.status_source) {
            (LedgerStatus::Active | LedgerStatus::Full, _) => {
                self.set_status(LedgerStatus::Inactive, hold.clone(), StatusSource::Schedule);
                true
            }
            (LedgerStatus::Inactive, StatusSource::Schedule) if self.hold != *hold => {
                self.hold = hold.clone();
                true
            }
            _ => false,
        }
    }

    /// Reopens the entry if it was closed by its schedule. Returns true if
    /// the entry changed.
    pub fn reopen_for_schedule(&mut self) -> bool {
        if self.status != LedgerStatus::Inactive || self.status_source != StatusSource::Schedule {
            return false;
        }
        self.set_status(LedgerStatus::Active, StatusHold::default(), StatusSource::Direct);
        true
    }

    const fn passengers_exhausted(&self) -> bool {
        self.capacity.passengers > 0 && self.usage.passengers >= self.capacity.passengers
    }

    fn sync_full_status(&mut self) {
        match self.status {
            LedgerStatus::Active if self.passengers_exhausted() => {
                self.status = LedgerStatus::Full;
                self.status_source = StatusSource::System;
            }
            LedgerStatus::Full if !self.passengers_exhausted() => {
                self.status = LedgerStatus::Active;
                self.status_source = StatusSource::Direct;
            }
            _ => {}
        }
    }
}
