// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::*;
use crate::{Persistence, PersistenceError};
use ferry_book::{BookingState, CoreError};
use ferry_book_domain::{BookingStatus, DomainError, LedgerStatus, ResourceClass, ResourceCounts};
use proptest::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

static FILE_COUNTER: AtomicU64 = AtomicU64::new(0);

fn temp_database(label: &str) -> PathBuf {
    let id = FILE_COUNTER.fetch_add(1, Ordering::SeqCst);
    let path = std::env::temp_dir().join(format!(
        "ferry_book_{label}_{}_{id}.db",
        std::process::id()
    ));
    remove_database(&path);
    path
}

/// Deletes a database file together with its WAL side files.
pub fn remove_database(path: &Path) {
    let _ = std::fs::remove_file(path);
    for suffix in ["-wal", "-shm"] {
        let mut side = path.as_os_str().to_owned();
        side.push(suffix);
        let _ = std::fs::remove_file(PathBuf::from(side));
    }
}

#[test]
fn test_last_seat_goes_to_exactly_one_of_two_writers() {
    let path = temp_database("last_seat");
    let network: Network = {
        // Migrations run here, before any worker opens the file.
        let mut setup: Persistence = Persistence::new_with_file(&path).unwrap();
        seed_network(&mut setup, ResourceCounts::new(1, 0, 0, 0, 0))
    };

    let barrier = Arc::new(Barrier::new(2));
    let workers: Vec<_> = ["Ayu", "Budi"]
        .into_iter()
        .map(|name| {
            let path = path.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let mut persistence: Persistence = Persistence::new_with_file(&path).unwrap();
                barrier.wait();
                persistence.create_booking(
                    &create_test_request(network, &[name], 0),
                    &create_test_actor(),
                    &utc(),
                    NOW,
                )
            })
        })
        .collect();

    let results: Vec<Result<BookingState, PersistenceError>> = workers
        .into_iter()
        .map(|worker| worker.join().unwrap())
        .collect();

    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    assert!(results.iter().any(|r| matches!(
        r,
        Err(PersistenceError::Rejected(CoreError::DomainViolation(
            DomainError::InsufficientCapacity { .. }
        )))
    )));

    let mut check: Persistence = Persistence::new_with_file(&path).unwrap();
    let ledger = check
        .find_ledger(network.schedule_id, DEPARTURE, NOW)
        .unwrap()
        .unwrap();
    assert_eq!(ledger.usage.passengers, 1);
    assert_eq!(ledger.status, LedgerStatus::Full);

    drop(check);
    remove_database(&path);
}

#[test]
fn test_last_car_slot_goes_to_exactly_one_of_two_writers() {
    let path = temp_database("last_car");
    let network: Network = {
        let mut setup: Persistence = Persistence::new_with_file(&path).unwrap();
        seed_network(&mut setup, ResourceCounts::new(10, 0, 1, 0, 0))
    };

    let barrier = Arc::new(Barrier::new(2));
    let workers: Vec<_> = ["Ayu", "Budi"]
        .into_iter()
        .map(|name| {
            let path = path.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let mut persistence: Persistence = Persistence::new_with_file(&path).unwrap();
                barrier.wait();
                persistence.create_booking(
                    &create_test_request(network, &[name], 1),
                    &create_test_actor(),
                    &utc(),
                    NOW,
                )
            })
        })
        .collect();

    let results: Vec<Result<BookingState, PersistenceError>> = workers
        .into_iter()
        .map(|worker| worker.join().unwrap())
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().any(|r| matches!(
        r,
        Err(PersistenceError::Rejected(CoreError::DomainViolation(
            DomainError::InsufficientCapacity {
                class: ResourceClass::Car,
                requested: 1,
                available: 0,
            }
        )))
    )));

    let mut check: Persistence = Persistence::new_with_file(&path).unwrap();
    let ledger = check
        .find_ledger(network.schedule_id, DEPARTURE, NOW)
        .unwrap()
        .unwrap();
    assert_eq!(ledger.usage, ResourceCounts::new(1, 0, 1, 0, 0));
    assert_eq!(ledger.status, LedgerStatus::Active);

    drop(check);
    remove_database(&path);
}

#[test]
fn test_parallel_bookings_never_oversell() {
    let path = temp_database("oversell");
    let network: Network = {
        let mut setup: Persistence = Persistence::new_with_file(&path).unwrap();
        seed_network(&mut setup, ResourceCounts::new(5, 0, 0, 0, 0))
    };

    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let path = path.clone();
            thread::spawn(move || {
                let mut persistence: Persistence = Persistence::new_with_file(&path).unwrap();
                (0..3)
                    .filter(|attempt| {
                        let name = format!("W{worker}-{attempt}");
                        persistence
                            .create_booking(
                                &create_test_request(network, &[name.as_str()], 0),
                                &create_test_actor(),
                                &utc(),
                                NOW,
                            )
                            .is_ok()
                    })
                    .count()
            })
        })
        .collect();

    let booked: usize = workers
        .into_iter()
        .map(|worker| worker.join().unwrap())
        .sum();
    assert_eq!(booked, 5);

    let mut check: Persistence = Persistence::new_with_file(&path).unwrap();
    let ledger = check
        .find_ledger(network.schedule_id, DEPARTURE, NOW)
        .unwrap()
        .unwrap();
    assert_eq!(ledger.usage.passengers, 5);

    drop(check);
    remove_database(&path);
}

#[derive(Debug, Clone)]
enum Step {
    Book { passengers: usize, cars: usize },
    Cancel(usize),
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => (1usize..=4, 0usize..=2)
            .prop_map(|(passengers, cars)| Step::Book { passengers, cars }),
        1 => (0usize..8).prop_map(Step::Cancel),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_ledger_matches_live_bookings(steps in prop::collection::vec(step_strategy(), 1..12)) {
        let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
        let capacity = ResourceCounts::new(8, 0, 3, 0, 0);
        let network: Network = seed_network(&mut persistence, capacity);
        let names = ["A", "B", "C", "D"];
        let mut booking_ids: Vec<i64> = Vec::new();

        for step in steps {
            match step {
                Step::Book { passengers, cars } => {
                    let request = create_test_request(network, &names[..passengers], cars);
                    let created =
                        persistence.create_booking(&request, &create_test_actor(), &utc(), NOW);
                    if let Ok(state) = created {
                        booking_ids.push(state.booking.booking_id.unwrap());
                    }
                }
                Step::Cancel(index) => {
                    if let Some(booking_id) = booking_ids.get(index) {
                        let _ = persistence.transition_booking(
                            *booking_id,
                            BookingStatus::Cancelled,
                            None,
                            &create_test_operator(),
                            NOW,
                        );
                    }
                }
            }
        }

        let mut live = ResourceCounts::default();
        for booking_id in &booking_ids {
            let state = persistence.get_booking(*booking_id).unwrap();
            if state.booking.status == BookingStatus::Pending {
                let demand = state.demand();
                live.passengers += demand.passengers;
                live.cars += demand.cars;
            }
        }

        match persistence.find_ledger(network.schedule_id, DEPARTURE, NOW).unwrap() {
            Some(ledger) => {
                prop_assert_eq!(ledger.usage, live);
                prop_assert!(ledger.usage.passengers <= ledger.capacity.passengers);
                prop_assert!(ledger.usage.cars <= ledger.capacity.cars);
            }
            None => {
                prop_assert!(live.is_zero());
            }
        }
    }
}
