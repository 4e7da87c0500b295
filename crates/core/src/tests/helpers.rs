// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{BookingPlan, BookingRequest, BookingState, plan_booking};
use ferry_book_audit::{Actor, ActorType, Cause};
use ferry_book_domain::{
    FareTable, LedgerEntry, Manifest, OperatingDays, Passenger, ResourceCounts, Route, Schedule,
    ScheduleStatus, StatusHold, VehicleClass, VehicleSpec,
};
use time::OffsetDateTime;
use time::macros::{date, datetime, time};

/// Sunday 2026-03-01 08:00 UTC.
pub const NOW: OffsetDateTime = datetime!(2026-03-01 08:00 UTC);
/// Monday.
pub const DEPARTURE: time::Date = date!(2026 - 03 - 02);
/// The 08:00 sailing on [`DEPARTURE`], in a UTC operating zone.
pub const DEPARTS_AT: OffsetDateTime = datetime!(2026-03-02 08:00 UTC);

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

pub fn create_test_route() -> Route {
    let mut route = Route::new(
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
    .unwrap();
    route.route_id = Some(1);
    route
}

/// Runs Monday, Wednesday and Friday.
pub fn create_test_schedule() -> Schedule {
    Schedule {
        schedule_id: Some(10),
        route_id: 1,
        ferry_id: 100,
        departure_time: time!(08:00),
        arrival_time: time!(10:30),
        operating_days: OperatingDays::new(&[1, 3, 5]).unwrap(),
        status: ScheduleStatus::Active,
        hold: StatusHold::default(),
    }
}

pub fn create_test_ledger(capacity: ResourceCounts) -> LedgerEntry {
    LedgerEntry::open(10, DEPARTURE, capacity, None)
}

pub fn passengers(names: &[&str]) -> Vec<Passenger> {
    names
        .iter()
        .map(|name| Passenger {
            name: (*name).to_string(),
            id_number: Some(format!("ID-{name}")),
        })
        .collect()
}

pub fn manifest(names: &[&str], cars: usize) -> Manifest {
    Manifest {
        passengers: passengers(names),
        vehicles: (0..cars)
            .map(|i| VehicleSpec {
                class: VehicleClass::Car,
                license_plate: format!("B {i} XY"),
                driver: (i < names.len()).then_some(i),
            })
            .collect(),
    }
}

pub fn create_test_request(names: &[&str], cars: usize) -> BookingRequest {
    BookingRequest {
        user_id: String::from("user-1"),
        schedule_id: 10,
        departure_date: DEPARTURE,
        manifest: manifest(names, cars),
    }
}

/// A freshly created PENDING booking with persisted-looking ids.
pub fn create_pending_booking(names: &[&str], cars: usize) -> BookingState {
    let plan: BookingPlan = plan_booking(
        &create_test_request(names, cars),
        &create_test_route(),
        &create_test_schedule(),
        &create_test_ledger(ResourceCounts::new(100, 10, 10, 5, 5)),
        DEPARTS_AT,
        "BK-20260301-000001",
        create_test_actor(),
        NOW,
    )
    .unwrap();

    let mut state = plan.state;
    state.booking.booking_id = Some(1);
    for (i, ticket) in state.tickets.iter_mut().enumerate() {
        ticket.ticket_id = Some(i64::try_from(i).unwrap() + 1);
    }
    for (i, vehicle) in state.vehicles.iter_mut().enumerate() {
        vehicle.vehicle_id = Some(i64::try_from(i).unwrap() + 1);
    }
    state.payments[0].payment_id = Some(1);
    state
}

/// A CONFIRMED booking with a settled payment.
pub fn create_confirmed_booking(names: &[&str], cars: usize) -> BookingState {
    let pending = create_pending_booking(names, cars);
    crate::reconcile_payment(
        &pending,
        ferry_book_domain::ProviderStatus::Success,
        Some(String::from("TX-1")),
        Some(String::from("bank_transfer")),
        NOW,
    )
    .unwrap()
    .unwrap()
    .new_state
}
