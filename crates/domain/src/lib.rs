// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod booking;
mod booking_status;
mod capacity;
mod checkin;
mod error;
mod manifest;
mod network;
mod operational_status;
mod payment;
mod recurrence;
mod refund;
mod timezone;

#[cfg(test)]
mod tests;

pub use booking::{
    BankDetails, Booking, CheckInRecord, Payment, Refund, Ticket, Vehicle, booking_code,
    booking_code_prefix, ticket_code,
};
pub use booking_status::{BookingStatus, TicketStatus};
pub use capacity::{LedgerEntry, ResourceClass, ResourceCounts};
pub use checkin::{validate_check_in_window, validate_ticket_for_check_in};
pub use error::DomainError;
pub use manifest::{FareTable, Manifest, Passenger, VehicleClass, VehicleSpec};
pub use network::{Ferry, Route, Schedule};
pub use operational_status::{
    LedgerStatus, RouteStatus, ScheduleStatus, StatusHold, StatusSource,
};
pub use payment::{PaymentStatus, ProviderStatus};
pub use recurrence::OperatingDays;
pub use refund::{
    RefundPolicyRule, RefundQuote, RefundStatus, days_before_departure, evaluate_refund,
};
pub use timezone::OperatingZone;
