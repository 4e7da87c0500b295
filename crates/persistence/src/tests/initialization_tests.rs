// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::*;
use crate::{Persistence, PersistenceError};
use ferry_book_domain::{OperatingDays, ScheduleStatus};
use time::macros::time;

#[test]
fn test_in_memory_database_initializes() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    assert!(persistence.verify_foreign_key_enforcement().is_ok());
    assert!(persistence.list_routes().unwrap().is_empty());
}

#[test]
fn test_in_memory_databases_are_isolated() {
    let mut first: Persistence = Persistence::new_in_memory().unwrap();
    let mut second: Persistence = Persistence::new_in_memory().unwrap();

    seed_network(&mut first, roomy());

    assert_eq!(first.list_routes().unwrap().len(), 1);
    assert!(second.list_routes().unwrap().is_empty());
}

#[test]
fn test_reference_data_round_trips() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let network: Network = seed_network(&mut persistence, roomy());

    let route = persistence.get_route(network.route_id).unwrap();
    assert_eq!(route.origin, "Merak");
    assert_eq!(route.fares.car, 300_000);

    let ferry = persistence.get_ferry(network.ferry_id).unwrap();
    assert_eq!(ferry.capacity, roomy());

    let schedule = persistence.get_schedule(network.schedule_id).unwrap();
    assert_eq!(schedule.departure_time, time!(08:00));
    assert_eq!(schedule.operating_days.days(), vec![1, 3, 5]);
    assert_eq!(schedule.status, ScheduleStatus::Active);

    let schedules = persistence
        .list_schedules_for_route(network.route_id)
        .unwrap();
    assert_eq!(schedules.len(), 1);
}

#[test]
fn test_schedule_for_unknown_ferry_is_rejected() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let network: Network = seed_network(&mut persistence, roomy());

    let result = persistence.create_schedule(&ferry_book_domain::Schedule {
        schedule_id: None,
        route_id: network.route_id,
        ferry_id: 9_999,
        departure_time: time!(14:00),
        arrival_time: time!(16:30),
        operating_days: OperatingDays::new(&[2]).unwrap(),
        status: ScheduleStatus::Active,
        hold: ferry_book_domain::StatusHold::default(),
    });

    assert!(matches!(result, Err(PersistenceError::NotFound(_))));
    assert_eq!(
        persistence
            .list_schedules_for_route(network.route_id)
            .unwrap()
            .len(),
        1
    );
}

#[test]
fn test_missing_booking_is_not_found() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    assert!(matches!(
        persistence.get_booking(42),
        Err(PersistenceError::NotFound(_))
    ));
    assert!(matches!(
        persistence.get_booking_by_code("BK-20260301-000001"),
        Err(PersistenceError::NotFound(_))
    ));
}

#[test]
fn test_file_database_survives_reopen() {
    let path = std::env::temp_dir().join(format!(
        "ferry_book_reopen_{}.db",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);

    {
        let mut persistence: Persistence = Persistence::new_with_file(&path).unwrap();
        seed_network(&mut persistence, roomy());
    }

    let mut reopened: Persistence = Persistence::new_with_file(&path).unwrap();
    assert_eq!(reopened.list_routes().unwrap().len(), 1);

    drop(reopened);
    super::concurrency_tests::remove_database(&path);
}
