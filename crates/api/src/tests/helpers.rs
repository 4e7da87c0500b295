// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use std::sync::Arc;

use ferry_book::FixedClock;
use ferry_book_audit::Cause;
use ferry_book_domain::OperatingZone;
use ferry_book_persistence::Persistence;
use time::OffsetDateTime;
use time::macros::datetime;

use crate::{
    ApiContext, AuthenticatedActor, BookingResponse, CapacityInfo, CreateBookingRequest,
    CreateFerryRequest, CreateRouteRequest, CreateScheduleRequest, FareInfo, PassengerInput,
    PaymentCallbackRequest, PolicyRuleRequest, Role, VehicleInput, create_booking, create_ferry,
    create_policy_rule, create_route, create_schedule, payment_callback,
};

/// Sunday 2026-03-01 08:00 UTC.
pub const NOW: OffsetDateTime = datetime!(2026-03-01 08:00 UTC);
/// Monday; the seeded schedule sails Monday, Wednesday and Friday.
pub const DEPARTURE: &str = "2026-03-02";

pub fn create_test_admin() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("admin-123"), Role::Admin)
}

pub fn create_test_operator(routes: Vec<i64>) -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("operator-7"), Role::Operator).with_routes(routes)
}

pub fn create_test_user() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("user-1"), Role::User)
}

pub fn create_other_user() -> AuthenticatedActor {
    AuthenticatedActor::new(String::from("user-2"), Role::User)
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("api-req-456"), String::from("API request"))
}

pub fn context_at(now: OffsetDateTime, zone: &str) -> ApiContext {
    ApiContext::new(
        Arc::new(FixedClock(now)),
        OperatingZone::parse(zone).unwrap(),
    )
}

pub fn test_context() -> ApiContext {
    context_at(NOW, "UTC")
}

/// A seeded route and schedule.
pub struct Fixture {
    pub persistence: Persistence,
    pub context: ApiContext,
    pub route_id: i64,
    pub schedule_id: i64,
}

/// Seeds Merak to Bakauheni with one ferry of `capacity`, sailing at 08:00
/// on Monday, Wednesday and Friday.
pub fn seed(capacity: CapacityInfo) -> Fixture {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let admin = create_test_admin();

    let route = create_route(
        &mut persistence,
        &CreateRouteRequest {
            origin: String::from("Merak"),
            destination: String::from("Bakauheni"),
            fares: FareInfo {
                passenger: 50_000,
                motorcycle: 75_000,
                car: 300_000,
                bus: 900_000,
                truck: 1_200_000,
            },
        },
        &admin,
    )
    .unwrap();

    let ferry = create_ferry(
        &mut persistence,
        &CreateFerryRequest {
            name: String::from("KMP Portlink"),
            capacity,
        },
        &admin,
    )
    .unwrap();

    let schedule = create_schedule(
        &mut persistence,
        &CreateScheduleRequest {
            route_id: route.route_id,
            ferry_id: ferry.ferry_id,
            departure_time: String::from("08:00"),
            arrival_time: String::from("10:30"),
            operating_days: vec![1, 3, 5],
        },
        &admin,
    )
    .unwrap();

    Fixture {
        persistence,
        context: test_context(),
        route_id: route.route_id,
        schedule_id: schedule.schedule_id,
    }
}

pub const fn roomy() -> CapacityInfo {
    CapacityInfo {
        passengers: 100,
        motorcycles: 10,
        cars: 10,
        buses: 5,
        trucks: 5,
    }
}

pub fn booking_request(schedule_id: i64, names: &[&str], cars: usize) -> CreateBookingRequest {
    CreateBookingRequest {
        user_id: None,
        schedule_id,
        departure_date: String::from(DEPARTURE),
        passengers: names
            .iter()
            .map(|name| PassengerInput {
                name: (*name).to_string(),
                id_number: Some(format!("ID-{name}")),
            })
            .collect(),
        vehicles: (0..cars)
            .map(|i| VehicleInput {
                class: String::from("car"),
                license_plate: format!("B {i} XY"),
                driver_index: Some(0),
            })
            .collect(),
    }
}

/// Books as the test user and settles the payment.
pub fn confirmed_booking(fixture: &mut Fixture, names: &[&str]) -> BookingResponse {
    let pending = create_booking(
        &mut fixture.persistence,
        &fixture.context,
        &booking_request(fixture.schedule_id, names, 0),
        &create_test_user(),
    )
    .unwrap();
    payment_callback(
        &mut fixture.persistence,
        &fixture.context,
        &PaymentCallbackRequest {
            booking_code: pending.booking.booking_code.clone(),
            provider_status: String::from("settlement"),
            transaction_id: Some(String::from("TX-1")),
            payment_method: Some(String::from("qris")),
        },
    )
    .unwrap();
    crate::get_booking(
        &mut fixture.persistence,
        pending.booking.booking_id,
        &create_test_user(),
    )
    .unwrap()
}

/// 100% from three days out, 50% up to departure.
pub fn seed_policy(fixture: &mut Fixture) {
    for (days, percentage) in [(3, 100), (0, 50)] {
        create_policy_rule(
            &mut fixture.persistence,
            &fixture.context,
            &PolicyRuleRequest {
                days_before_departure: days,
                refund_percentage: percentage,
                min_fee: None,
                max_fee: None,
                active: true,
            },
            &create_test_admin(),
            &create_test_cause(),
        )
        .unwrap();
    }
}
