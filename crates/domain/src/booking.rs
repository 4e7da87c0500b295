// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking, ticket, vehicle, payment and refund records.
//!
//! Child records carry no parent identifier; they are always handled as
//! part of a booking aggregate and the persistence layer supplies the
//! foreign key.

use crate::booking_status::{BookingStatus, TicketStatus};
use crate::manifest::VehicleClass;
use crate::payment::PaymentStatus;
use crate::refund::RefundStatus;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// The date part shared by every booking code issued on `created_on`:
/// `BK-YYYYMMDD-`.
#[must_use]
pub fn booking_code_prefix(created_on: time::Date) -> String {
    format!(
        "BK-{:04}{:02}{:02}-",
        created_on.year(),
        u8::from(created_on.month()),
        created_on.day()
    )
}

/// Formats a booking code: `BK-YYYYMMDD-NNNNNN`.
#[must_use]
pub fn booking_code(created_on: time::Date, sequence: i64) -> String {
    format!("{}{sequence:06}", booking_code_prefix(created_on))
}

/// Formats the code of the `index`-th ticket (0-based) of a booking.
#[must_use]
pub fn ticket_code(booking_code: &str, index: usize) -> String {
    format!("{booking_code}-P{:02}", index + 1)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub booking_id: Option<i64>,
    pub booking_code: String,
    pub user_id: String,
    pub schedule_id: i64,
    pub route_id: i64,
    pub departure_date: time::Date,
    pub passenger_count: u32,
    pub vehicle_count: u32,
    pub total_amount: i64,
    pub status: BookingStatus,
    pub cancellation_reason: Option<String>,
    /// The booking this one replaced, for reschedules.
    pub rescheduled_from: Option<i64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Operator-side details captured at boarding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInRecord {
    pub operator_id: String,
    pub location: Option<String>,
    /// Opaque reference to a stored signature image.
    pub signature_ref: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_id: Option<i64>,
    pub ticket_code: String,
    pub passenger_name: String,
    pub passenger_id_number: Option<String>,
    pub status: TicketStatus,
    pub checked_in: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub boarding_time: Option<OffsetDateTime>,
    pub check_in: Option<CheckInRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub vehicle_id: Option<i64>,
    pub class: VehicleClass,
    pub license_plate: String,
    /// Ticket code of the driver, if declared.
    pub driver_ticket_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub payment_id: Option<i64>,
    pub amount: i64,
    pub status: PaymentStatus,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub payment_date: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Bank account a refund is paid to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankDetails {
    pub bank_name: String,
    pub account_number: String,
    pub account_holder: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Refund {
    pub refund_id: Option<i64>,
    pub payment_id: Option<i64>,
    pub amount: i64,
    pub reason: String,
    pub refund_method: Option<String>,
    pub bank_details: Option<BankDetails>,
    pub status: RefundStatus,
    pub transaction_id: Option<String>,
    /// Operator who approved or rejected the refund.
    pub decided_by: Option<String>,
    pub decision_note: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}
