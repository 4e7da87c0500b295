// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Write-side database operations.
//!
//! ## Module Organization
//!
//! - `audit`: General audit trail rows
//! - `bookings`: Booking aggregates and the booking log
//! - `ledger`: Capacity ledger entries
//! - `network`: Routes, ferries and schedules
//! - `policy`: Refund policy tiers
//!
//! None of these open a transaction. The `Persistence` methods wrap each
//! unit of work in one `BEGIN IMMEDIATE` transaction and call in here.
//!
//! New row ids come from `connection::InsertedRowId`. Everything else is
//! Diesel DSL.

pub mod audit;
pub mod bookings;
pub mod ledger;
pub mod network;
pub mod policy;

pub use audit::persist_audit_event;
pub use bookings::{insert_booking_log, insert_booking_state, update_booking_state};
pub use ledger::{insert_ledger, update_ledger};
pub use network::{
    insert_ferry, insert_route, insert_schedule, update_route_status, update_schedule_status,
};
pub use policy::{insert_policy_rule, update_policy_rule};
