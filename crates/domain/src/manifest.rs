// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking manifests and fare computation.

use crate::capacity::{ResourceClass, ResourceCounts};
use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The four vehicle classes a ferry carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleClass {
    Motorcycle,
    Car,
    Bus,
    Truck,
}

impl VehicleClass {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        self.resource_class().as_str()
    }

    #[must_use]
    pub const fn resource_class(&self) -> ResourceClass {
        match self {
            Self::Motorcycle => ResourceClass::Motorcycle,
            Self::Car => ResourceClass::Car,
            Self::Bus => ResourceClass::Bus,
            Self::Truck => ResourceClass::Truck,
        }
    }
}

impl FromStr for VehicleClass {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "motorcycle" => Ok(Self::Motorcycle),
            "car" => Ok(Self::Car),
            "bus" => Ok(Self::Bus),
            "truck" => Ok(Self::Truck),
            _ => Err(DomainError::InvalidVehicleClass(s.to_string())),
        }
    }
}

/// A passenger on a booking request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passenger {
    pub name: String,
    /// National ID or passport number.
    pub id_number: Option<String>,
}

/// A vehicle on a booking request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleSpec {
    pub class: VehicleClass,
    pub license_plate: String,
    /// Index into the manifest's passengers of the driver, if declared.
    pub driver: Option<usize>,
}

/// The passenger/vehicle composition of a single booking request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub passengers: Vec<Passenger>,
    #[serde(default)]
    pub vehicles: Vec<VehicleSpec>,
}

impl Manifest {
    /// Validates the manifest's internal consistency.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidManifest` when there are no passengers,
    /// a name or plate is blank, or a driver reference is out of range or
    /// assigned to more than one vehicle.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.passengers.is_empty() {
            return Err(DomainError::InvalidManifest {
                reason: String::from("at least one passenger is required"),
            });
        }

        if self.passengers.iter().any(|p| p.name.trim().is_empty()) {
            return Err(DomainError::InvalidManifest {
                reason: String::from("passenger name must not be empty"),
            });
        }

        let mut drivers = Vec::new();
        for vehicle in &self.vehicles {
            if vehicle.license_plate.trim().is_empty() {
                return Err(DomainError::InvalidManifest {
                    reason: String::from("license plate must not be empty"),
                });
            }
            if let Some(driver) = vehicle.driver {
                if driver >= self.passengers.len() {
                    return Err(DomainError::InvalidManifest {
                        reason: format!("driver index {driver} has no matching passenger"),
                    });
                }
                if drivers.contains(&driver) {
                    return Err(DomainError::InvalidManifest {
                        reason: format!("passenger {driver} drives more than one vehicle"),
                    });
                }
                drivers.push(driver);
            }
        }

        Ok(())
    }

    /// Units requested from each resource class.
    #[must_use]
    pub fn demand(&self) -> ResourceCounts {
        let mut demand = ResourceCounts {
            passengers: u32::try_from(self.passengers.len()).unwrap_or(u32::MAX),
            ..ResourceCounts::default()
        };
        for vehicle in &self.vehicles {
            demand.increment(vehicle.class.resource_class());
        }
        demand
    }
}

/// Per-unit fares charged on a route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FareTable {
    pub passenger: i64,
    pub motorcycle: i64,
    pub car: i64,
    pub bus: i64,
    pub truck: i64,
}

impl FareTable {
    #[must_use]
    pub const fn fare(&self, class: ResourceClass) -> i64 {
        match class {
            ResourceClass::Passenger => self.passenger,
            ResourceClass::Motorcycle => self.motorcycle,
            ResourceClass::Car => self.car,
            ResourceClass::Bus => self.bus,
            ResourceClass::Truck => self.truck,
        }
    }

    /// Total fare for a demand: units times fare, summed over all classes.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AmountOverflow` on overflow.
    pub fn total(&self, demand: &ResourceCounts) -> Result<i64, DomainError> {
        ResourceClass::ALL.iter().try_fold(0i64, |total, class| {
            self.fare(*class)
                .checked_mul(i64::from(demand.get(*class)))
                .and_then(|line| total.checked_add(line))
                .ok_or(DomainError::AmountOverflow)
        })
    }
}
