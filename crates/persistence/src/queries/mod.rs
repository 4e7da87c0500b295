// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-side database operations.
//!
//! Every query here uses Diesel DSL and converts rows into domain types
//! through `data_models`. Queries run either on their own or inside the
//! write transaction of a mutation, which is how read-check-write units
//! see a consistent snapshot.

pub mod audit;
pub mod bookings;
pub mod ledger;
pub mod network;
pub mod policy;

pub use audit::{StoredAuditEvent, list_audit_events};
pub use bookings::{
    TicketMatch, booking_log, count_bookings_with_prefix, find_booking_id_by_code,
    find_booking_id_by_ticket, find_tickets, load_booking_state,
};
pub use ledger::{find_ledger, get_ledger, list_held_ledger_entries, list_ledger_for_schedule};
pub use network::{
    get_ferry, get_route, get_schedule, list_held_routes, list_held_schedules, list_routes,
    list_schedules_for_route,
};
pub use policy::{get_policy_rule, list_policy_rules};
