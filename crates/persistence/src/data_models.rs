// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Row types and their conversion into domain values.
//!
//! Each `*Row` mirrors one table in `diesel_schema`. Conversions never
//! trust stored text: unknown statuses or malformed dates surface as
//! `PersistenceError::CorruptRow`.

use diesel::prelude::*;
use std::str::FromStr;

use ferry_book_audit::{ActorType, BookingLogEntry};
use ferry_book_domain::{
    BankDetails, Booking, BookingStatus, CheckInRecord, FareTable, Ferry, LedgerEntry,
    LedgerStatus, OperatingDays, Payment, PaymentStatus, Refund, RefundPolicyRule, RefundStatus,
    ResourceCounts, Route, RouteStatus, Schedule, ScheduleStatus, StatusHold, StatusSource,
    Ticket, TicketStatus, Vehicle, VehicleClass,
};

use crate::codec::{
    decode_count, decode_date, decode_flag, decode_instant, decode_optional_instant, decode_time,
};
use crate::diesel_schema::{
    booking_logs, bookings, ferries, payments, refund_policies, refunds, routes, schedule_dates,
    schedules, tickets, vehicles,
};
use crate::error::PersistenceError;

fn parse_column<T: FromStr>(table: &'static str, value: &str) -> Result<T, PersistenceError> {
    T::from_str(value)
        .map_err(|_| PersistenceError::corrupt(table, format!("unknown value '{value}'")))
}

fn hold(
    table: &'static str,
    reason: Option<String>,
    expires_at: Option<&str>,
) -> Result<StatusHold, PersistenceError> {
    Ok(StatusHold::new(
        reason,
        decode_optional_instant(table, expires_at)?,
    ))
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = routes)]
pub struct RouteRow {
    pub route_id: i64,
    pub origin: String,
    pub destination: String,
    pub passenger_fare: i64,
    pub motorcycle_fare: i64,
    pub car_fare: i64,
    pub bus_fare: i64,
    pub truck_fare: i64,
    pub status: String,
    pub status_reason: Option<String>,
    pub status_expires_at: Option<String>,
}

impl TryFrom<RouteRow> for Route {
    type Error = PersistenceError;

    fn try_from(row: RouteRow) -> Result<Self, Self::Error> {
        Ok(Self {
            route_id: Some(row.route_id),
            origin: row.origin,
            destination: row.destination,
            fares: FareTable {
                passenger: row.passenger_fare,
                motorcycle: row.motorcycle_fare,
                car: row.car_fare,
                bus: row.bus_fare,
                truck: row.truck_fare,
            },
            status: parse_column::<RouteStatus>("routes", &row.status)?,
            hold: hold(
                "routes",
                row.status_reason,
                row.status_expires_at.as_deref(),
            )?,
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = ferries)]
pub struct FerryRow {
    pub ferry_id: i64,
    pub name: String,
    pub passenger_capacity: i64,
    pub motorcycle_capacity: i64,
    pub car_capacity: i64,
    pub bus_capacity: i64,
    pub truck_capacity: i64,
}

impl TryFrom<FerryRow> for Ferry {
    type Error = PersistenceError;

    fn try_from(row: FerryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            ferry_id: Some(row.ferry_id),
            name: row.name,
            capacity: ResourceCounts::new(
                decode_count("ferries", row.passenger_capacity)?,
                decode_count("ferries", row.motorcycle_capacity)?,
                decode_count("ferries", row.car_capacity)?,
                decode_count("ferries", row.bus_capacity)?,
                decode_count("ferries", row.truck_capacity)?,
            ),
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = schedules)]
pub struct ScheduleRow {
    pub schedule_id: i64,
    pub route_id: i64,
    pub ferry_id: i64,
    pub departure_time: String,
    pub arrival_time: String,
    pub operating_days: String,
    pub status: String,
    pub status_reason: Option<String>,
    pub status_expires_at: Option<String>,
}

impl TryFrom<ScheduleRow> for Schedule {
    type Error = PersistenceError;

    fn try_from(row: ScheduleRow) -> Result<Self, Self::Error> {
        Ok(Self {
            schedule_id: Some(row.schedule_id),
            route_id: row.route_id,
            ferry_id: row.ferry_id,
            departure_time: decode_time("schedules", &row.departure_time)?,
            arrival_time: decode_time("schedules", &row.arrival_time)?,
            operating_days: OperatingDays::parse(&row.operating_days)
                .map_err(|e| PersistenceError::corrupt("schedules", e.to_string()))?,
            status: parse_column::<ScheduleStatus>("schedules", &row.status)?,
            hold: hold(
                "schedules",
                row.status_reason,
                row.status_expires_at.as_deref(),
            )?,
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = schedule_dates)]
pub struct LedgerRow {
    pub ledger_id: i64,
    pub schedule_id: i64,
    pub departure_date: String,
    pub status: String,
    pub status_reason: Option<String>,
    pub status_expires_at: Option<String>,
    pub status_source: String,
    pub passenger_usage: i64,
    pub motorcycle_usage: i64,
    pub car_usage: i64,
    pub bus_usage: i64,
    pub truck_usage: i64,
    pub passenger_capacity: i64,
    pub motorcycle_capacity: i64,
    pub car_capacity: i64,
    pub bus_capacity: i64,
    pub truck_capacity: i64,
    pub capacity_overridden: i32,
}

impl TryFrom<LedgerRow> for LedgerEntry {
    type Error = PersistenceError;

    fn try_from(row: LedgerRow) -> Result<Self, Self::Error> {
        const T: &str = "schedule_dates";
        Ok(Self {
            ledger_id: Some(row.ledger_id),
            schedule_id: row.schedule_id,
            departure_date: decode_date(T, &row.departure_date)?,
            status: parse_column::<LedgerStatus>(T, &row.status)?,
            hold: hold(T, row.status_reason, row.status_expires_at.as_deref())?,
            status_source: parse_column::<StatusSource>(T, &row.status_source)?,
            usage: ResourceCounts::new(
                decode_count(T, row.passenger_usage)?,
                decode_count(T, row.motorcycle_usage)?,
                decode_count(T, row.car_usage)?,
                decode_count(T, row.bus_usage)?,
                decode_count(T, row.truck_usage)?,
            ),
            capacity: ResourceCounts::new(
                decode_count(T, row.passenger_capacity)?,
                decode_count(T, row.motorcycle_capacity)?,
                decode_count(T, row.car_capacity)?,
                decode_count(T, row.bus_capacity)?,
                decode_count(T, row.truck_capacity)?,
            ),
            capacity_overridden: decode_flag(row.capacity_overridden),
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = bookings)]
pub struct BookingRow {
    pub booking_id: i64,
    pub booking_code: String,
    pub user_id: String,
    pub schedule_id: i64,
    pub route_id: i64,
    pub departure_date: String,
    pub passenger_count: i64,
    pub vehicle_count: i64,
    pub total_amount: i64,
    pub status: String,
    pub cancellation_reason: Option<String>,
    pub rescheduled_from: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<BookingRow> for Booking {
    type Error = PersistenceError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            booking_id: Some(row.booking_id),
            booking_code: row.booking_code,
            user_id: row.user_id,
            schedule_id: row.schedule_id,
            route_id: row.route_id,
            departure_date: decode_date("bookings", &row.departure_date)?,
            passenger_count: decode_count("bookings", row.passenger_count)?,
            vehicle_count: decode_count("bookings", row.vehicle_count)?,
            total_amount: row.total_amount,
            status: parse_column::<BookingStatus>("bookings", &row.status)?,
            cancellation_reason: row.cancellation_reason,
            rescheduled_from: row.rescheduled_from,
            created_at: decode_instant("bookings", &row.created_at)?,
            updated_at: decode_instant("bookings", &row.updated_at)?,
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = tickets)]
pub struct TicketRow {
    pub ticket_id: i64,
    pub booking_id: i64,
    pub ticket_code: String,
    pub passenger_name: String,
    pub passenger_id_number: Option<String>,
    pub status: String,
    pub checked_in: i32,
    pub boarding_time: Option<String>,
    pub checked_in_by: Option<String>,
    pub check_in_location: Option<String>,
    pub signature_ref: Option<String>,
}

impl TryFrom<TicketRow> for Ticket {
    type Error = PersistenceError;

    fn try_from(row: TicketRow) -> Result<Self, Self::Error> {
        let check_in = row.checked_in_by.map(|operator_id| CheckInRecord {
            operator_id,
            location: row.check_in_location,
            signature_ref: row.signature_ref,
        });
        Ok(Self {
            ticket_id: Some(row.ticket_id),
            ticket_code: row.ticket_code,
            passenger_name: row.passenger_name,
            passenger_id_number: row.passenger_id_number,
            status: parse_column::<TicketStatus>("tickets", &row.status)?,
            checked_in: decode_flag(row.checked_in),
            boarding_time: decode_optional_instant("tickets", row.boarding_time.as_deref())?,
            check_in,
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = vehicles)]
pub struct VehicleRow {
    pub vehicle_id: i64,
    pub booking_id: i64,
    pub vehicle_class: String,
    pub license_plate: String,
    pub driver_ticket_code: Option<String>,
}

impl TryFrom<VehicleRow> for Vehicle {
    type Error = PersistenceError;

    fn try_from(row: VehicleRow) -> Result<Self, Self::Error> {
        Ok(Self {
            vehicle_id: Some(row.vehicle_id),
            class: parse_column::<VehicleClass>("vehicles", &row.vehicle_class)?,
            license_plate: row.license_plate,
            driver_ticket_code: row.driver_ticket_code,
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = payments)]
pub struct PaymentRow {
    pub payment_id: i64,
    pub booking_id: i64,
    pub amount: i64,
    pub status: String,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
    pub payment_date: Option<String>,
    pub created_at: String,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = PersistenceError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            payment_id: Some(row.payment_id),
            amount: row.amount,
            status: parse_column::<PaymentStatus>("payments", &row.status)?,
            payment_method: row.payment_method,
            transaction_id: row.transaction_id,
            payment_date: decode_optional_instant("payments", row.payment_date.as_deref())?,
            created_at: decode_instant("payments", &row.created_at)?,
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = refunds)]
pub struct RefundRow {
    pub refund_id: i64,
    pub booking_id: i64,
    pub payment_id: Option<i64>,
    pub amount: i64,
    pub reason: String,
    pub refund_method: Option<String>,
    pub bank_name: Option<String>,
    pub account_number: Option<String>,
    pub account_holder: Option<String>,
    pub status: String,
    pub transaction_id: Option<String>,
    pub decided_by: Option<String>,
    pub decision_note: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<RefundRow> for Refund {
    type Error = PersistenceError;

    fn try_from(row: RefundRow) -> Result<Self, Self::Error> {
        let bank_details = match (row.bank_name, row.account_number, row.account_holder) {
            (Some(bank_name), Some(account_number), Some(account_holder)) => Some(BankDetails {
                bank_name,
                account_number,
                account_holder,
            }),
            _ => None,
        };
        Ok(Self {
            refund_id: Some(row.refund_id),
            payment_id: row.payment_id,
            amount: row.amount,
            reason: row.reason,
            refund_method: row.refund_method,
            bank_details,
            status: parse_column::<RefundStatus>("refunds", &row.status)?,
            transaction_id: row.transaction_id,
            decided_by: row.decided_by,
            decision_note: row.decision_note,
            created_at: decode_instant("refunds", &row.created_at)?,
            updated_at: decode_instant("refunds", &row.updated_at)?,
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = refund_policies)]
pub struct RefundPolicyRow {
    pub rule_id: i64,
    pub days_before_departure: i64,
    pub refund_percentage: i32,
    pub min_fee: Option<i64>,
    pub max_fee: Option<i64>,
    pub is_active: i32,
}

impl TryFrom<RefundPolicyRow> for RefundPolicyRule {
    type Error = PersistenceError;

    fn try_from(row: RefundPolicyRow) -> Result<Self, Self::Error> {
        use num_traits::ToPrimitive;
        Ok(Self {
            rule_id: Some(row.rule_id),
            days_before_departure: decode_count("refund_policies", row.days_before_departure)?,
            refund_percentage: row.refund_percentage.to_u8().ok_or_else(|| {
                PersistenceError::corrupt(
                    "refund_policies",
                    format!("percentage out of range: {}", row.refund_percentage),
                )
            })?,
            min_fee: row.min_fee,
            max_fee: row.max_fee,
            active: decode_flag(row.is_active),
        })
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = booking_logs)]
pub struct BookingLogRow {
    pub log_id: i64,
    pub booking_id: i64,
    pub previous_status: Option<String>,
    pub new_status: String,
    pub actor_type: String,
    pub actor_id: String,
    pub note: Option<String>,
    pub ip_address: Option<String>,
    pub recorded_at: String,
}

impl TryFrom<BookingLogRow> for BookingLogEntry {
    type Error = PersistenceError;

    fn try_from(row: BookingLogRow) -> Result<Self, Self::Error> {
        const T: &str = "booking_logs";
        let previous_status = row
            .previous_status
            .as_deref()
            .map(|s| parse_column::<BookingStatus>(T, s))
            .transpose()?;
        let actor = ferry_book_audit::Actor::new(
            row.actor_id,
            parse_column::<ActorType>(T, &row.actor_type)?,
        );
        Ok(Self::new(
            previous_status,
            parse_column::<BookingStatus>(T, &row.new_status)?,
            actor,
            row.note,
            decode_instant(T, &row.recorded_at)?,
        )
        .with_ip(row.ip_address))
    }
}
