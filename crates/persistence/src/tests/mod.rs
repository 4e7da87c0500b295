// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod booking_tests;
mod concurrency_tests;
mod initialization_tests;
mod lifecycle_tests;

use crate::Persistence;
use ferry_book::{BookingRequest, BookingState};
use ferry_book_audit::{Actor, ActorType, Cause};
use ferry_book_domain::{
    FareTable, Ferry, Manifest, OperatingDays, OperatingZone, Passenger, ProviderStatus,
    ResourceCounts, Route, Schedule, ScheduleStatus, StatusHold, VehicleClass, VehicleSpec,
};
use time::OffsetDateTime;
use time::macros::{date, datetime, time};

/// Sunday 2026-03-01 08:00 UTC.
pub const NOW: OffsetDateTime = datetime!(2026-03-01 08:00 UTC);
/// Monday; the test schedule sails at 08:00.
pub const DEPARTURE: time::Date = date!(2026 - 03 - 02);

/// Operating zone for every test sailing.
pub fn utc() -> OperatingZone {
    OperatingZone::parse("UTC").unwrap()
}

pub fn create_test_actor() -> Actor {
    Actor::new(String::from("user-1"), ActorType::User)
}

pub fn create_test_operator() -> Actor {
    Actor::new(String::from("op-1"), ActorType::Operator)
}

pub fn create_test_admin() -> Actor {
    Actor::new(String::from("admin-1"), ActorType::Admin)
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Operator request"))
}

/// IDs of a seeded route, ferry and schedule.
#[derive(Debug, Clone, Copy)]
pub struct Network {
    pub route_id: i64,
    pub ferry_id: i64,
    pub schedule_id: i64,
}

/// Seeds one route with one ferry of `capacity`, sailing Monday,
/// Wednesday and Friday at 08:00.
pub fn seed_network(persistence: &mut Persistence, capacity: ResourceCounts) -> Network {
    let route: Route = persistence
        .create_route(
            &Route::new(
                "Merak",
                "Bakauheni",
                FareTable {
                    passenger: 50_000,
                    motorcycle: 75_000,
                    car: 300_000,
                    bus: 900_000,
                    truck: 1_200_000,
                },
            )
            .unwrap(),
        )
        .unwrap();
    let route_id: i64 = route.route_id.unwrap();

    let ferry: Ferry = persistence
        .create_ferry(&Ferry {
            ferry_id: None,
            name: String::from("KMP Portlink"),
            capacity,
        })
        .unwrap();
    let ferry_id: i64 = ferry.ferry_id.unwrap();

    let schedule_id: i64 = add_schedule(persistence, route_id, ferry_id);

    Network {
        route_id,
        ferry_id,
        schedule_id,
    }
}

pub fn add_schedule(persistence: &mut Persistence, route_id: i64, ferry_id: i64) -> i64 {
    persistence
        .create_schedule(&Schedule {
            schedule_id: None,
            route_id,
            ferry_id,
            departure_time: time!(08:00),
            arrival_time: time!(10:30),
            operating_days: OperatingDays::new(&[1, 3, 5]).unwrap(),
            status: ScheduleStatus::Active,
            hold: StatusHold::default(),
        })
        .unwrap()
        .schedule_id
        .unwrap()
}

pub fn manifest(names: &[&str], cars: usize) -> Manifest {
    Manifest {
        passengers: names
            .iter()
            .map(|name| Passenger {
                name: (*name).to_string(),
                id_number: Some(format!("ID-{name}")),
            })
            .collect(),
        vehicles: (0..cars)
            .map(|i| VehicleSpec {
                class: VehicleClass::Car,
                license_plate: format!("B {i} XY"),
                driver: (i < names.len()).then_some(i),
            })
            .collect(),
    }
}

pub fn create_test_request(network: Network, names: &[&str], cars: usize) -> BookingRequest {
    BookingRequest {
        user_id: String::from("user-1"),
        schedule_id: network.schedule_id,
        departure_date: DEPARTURE,
        manifest: manifest(names, cars),
    }
}

/// Creates a booking and settles its payment.
pub fn create_confirmed_booking(
    persistence: &mut Persistence,
    network: Network,
    names: &[&str],
    cars: usize,
) -> BookingState {
    let pending: BookingState = persistence
        .create_booking(
            &create_test_request(network, names, cars),
            &create_test_actor(),
            &utc(),
            NOW,
        )
        .unwrap();
    persistence
        .apply_payment_callback(
            &pending.booking.booking_code,
            ProviderStatus::Success,
            Some(String::from("TX-1")),
            Some(String::from("bank_transfer")),
            NOW,
        )
        .unwrap()
        .state
}

/// A large ferry that no single test fills by accident.
pub const fn roomy() -> ResourceCounts {
    ResourceCounts::new(100, 10, 10, 5, 5)
}
