// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.
//!
//! Dates travel as `YYYY-MM-DD`, times of day as `HH:MM` and instants as
//! RFC 3339 strings. Statuses use their upper-case wire names.

use ferry_book::BookingState;
use ferry_book_audit::BookingLogEntry;
use ferry_book_domain::{
    Booking, FareTable, Ferry, LedgerEntry, Payment, Refund, RefundPolicyRule, RefundQuote,
    ResourceCounts, Route, Schedule, Ticket, Vehicle,
};
use ferry_book_persistence::{StoredAuditEvent, SweepReport};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

pub(crate) fn format_instant(instant: OffsetDateTime) -> String {
    instant
        .format(&Rfc3339)
        .unwrap_or_else(|_| instant.to_string())
}

fn format_time(time: time::Time) -> String {
    time.format(format_description!("[hour]:[minute]"))
        .unwrap_or_else(|_| time.to_string())
}

// ============================================================================
// Shared value objects
// ============================================================================

/// Counts per resource class. Used for both capacity and usage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CapacityInfo {
    /// Passenger seats.
    pub passengers: u32,
    /// Motorcycle slots.
    pub motorcycles: u32,
    /// Car slots.
    pub cars: u32,
    /// Bus slots.
    pub buses: u32,
    /// Truck slots.
    pub trucks: u32,
}

impl From<ResourceCounts> for CapacityInfo {
    fn from(counts: ResourceCounts) -> Self {
        Self {
            passengers: counts.passengers,
            motorcycles: counts.motorcycles,
            cars: counts.cars,
            buses: counts.buses,
            trucks: counts.trucks,
        }
    }
}

impl From<CapacityInfo> for ResourceCounts {
    fn from(info: CapacityInfo) -> Self {
        Self::new(
            info.passengers,
            info.motorcycles,
            info.cars,
            info.buses,
            info.trucks,
        )
    }
}

/// Fares per passenger and vehicle class, in the smallest currency unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FareInfo {
    pub passenger: i64,
    pub motorcycle: i64,
    pub car: i64,
    pub bus: i64,
    pub truck: i64,
}

impl From<FareTable> for FareInfo {
    fn from(fares: FareTable) -> Self {
        Self {
            passenger: fares.passenger,
            motorcycle: fares.motorcycle,
            car: fares.car,
            bus: fares.bus,
            truck: fares.truck,
        }
    }
}

impl From<FareInfo> for FareTable {
    fn from(info: FareInfo) -> Self {
        Self {
            passenger: info.passenger,
            motorcycle: info.motorcycle,
            car: info.car,
            bus: info.bus,
            truck: info.truck,
        }
    }
}

// ============================================================================
// Bookings
// ============================================================================

/// One passenger on a booking request.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PassengerInput {
    /// Full name as printed on the ticket.
    pub name: String,
    /// Identity document number, if collected.
    #[serde(default)]
    pub id_number: Option<String>,
}

/// One vehicle on a booking request.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VehicleInput {
    /// Vehicle class (`motorcycle`, `car`, `bus` or `truck`).
    pub class: String,
    /// License plate.
    pub license_plate: String,
    /// Index into the passenger list of the driver, if any.
    #[serde(default)]
    pub driver_index: Option<usize>,
}

/// API request to create a booking.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreateBookingRequest {
    /// The traveller the booking is for. Users always book for themselves;
    /// staff must name the traveller.
    #[serde(default)]
    pub user_id: Option<String>,
    /// The schedule to travel on.
    pub schedule_id: i64,
    /// The departure date (`YYYY-MM-DD`).
    pub departure_date: String,
    /// Passengers, at least one.
    pub passengers: Vec<PassengerInput>,
    /// Vehicles, possibly none.
    #[serde(default)]
    pub vehicles: Vec<VehicleInput>,
}

/// API request to move a booking to another status.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TransitionBookingRequest {
    /// The requested status (`CONFIRMED`, `CANCELLED` or `COMPLETED`).
    pub target_status: String,
    /// Free-text note for the booking log.
    #[serde(default)]
    pub note: Option<String>,
}

/// API request to reschedule a booking.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RescheduleRequest {
    /// The new schedule, on the same route.
    pub schedule_id: i64,
    /// The new departure date (`YYYY-MM-DD`).
    pub departure_date: String,
}

/// Booking header.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BookingInfo {
    pub booking_id: i64,
    pub booking_code: String,
    pub user_id: String,
    pub schedule_id: i64,
    pub route_id: i64,
    pub departure_date: String,
    pub passenger_count: u32,
    pub vehicle_count: u32,
    pub total_amount: i64,
    pub status: String,
    pub cancellation_reason: Option<String>,
    /// The booking this one replaced, for rescheduled bookings.
    pub rescheduled_from: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Booking> for BookingInfo {
    fn from(booking: &Booking) -> Self {
        Self {
            booking_id: booking.booking_id.unwrap_or_default(),
            booking_code: booking.booking_code.clone(),
            user_id: booking.user_id.clone(),
            schedule_id: booking.schedule_id,
            route_id: booking.route_id,
            departure_date: booking.departure_date.to_string(),
            passenger_count: booking.passenger_count,
            vehicle_count: booking.vehicle_count,
            total_amount: booking.total_amount,
            status: booking.status.as_str().to_string(),
            cancellation_reason: booking.cancellation_reason.clone(),
            rescheduled_from: booking.rescheduled_from,
            created_at: format_instant(booking.created_at),
            updated_at: format_instant(booking.updated_at),
        }
    }
}

/// Ticket details.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TicketInfo {
    pub ticket_code: String,
    pub passenger_name: String,
    pub passenger_id_number: Option<String>,
    pub status: String,
    pub checked_in: bool,
    pub boarding_time: Option<String>,
    /// The operator who performed check-in.
    pub checked_in_by: Option<String>,
}

impl From<&Ticket> for TicketInfo {
    fn from(ticket: &Ticket) -> Self {
        Self {
            ticket_code: ticket.ticket_code.clone(),
            passenger_name: ticket.passenger_name.clone(),
            passenger_id_number: ticket.passenger_id_number.clone(),
            status: ticket.status.as_str().to_string(),
            checked_in: ticket.checked_in,
            boarding_time: ticket.boarding_time.map(format_instant),
            checked_in_by: ticket.check_in.as_ref().map(|r| r.operator_id.clone()),
        }
    }
}

/// Vehicle details.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VehicleInfo {
    pub class: String,
    pub license_plate: String,
    pub driver_ticket_code: Option<String>,
}

impl From<&Vehicle> for VehicleInfo {
    fn from(vehicle: &Vehicle) -> Self {
        Self {
            class: vehicle.class.as_str().to_string(),
            license_plate: vehicle.license_plate.clone(),
            driver_ticket_code: vehicle.driver_ticket_code.clone(),
        }
    }
}

/// Payment details.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PaymentInfo {
    pub payment_id: i64,
    pub amount: i64,
    pub status: String,
    pub payment_method: Option<String>,
    pub transaction_id: Option<String>,
    pub payment_date: Option<String>,
}

impl From<&Payment> for PaymentInfo {
    fn from(payment: &Payment) -> Self {
        Self {
            payment_id: payment.payment_id.unwrap_or_default(),
            amount: payment.amount,
            status: payment.status.as_str().to_string(),
            payment_method: payment.payment_method.clone(),
            transaction_id: payment.transaction_id.clone(),
            payment_date: payment.payment_date.map(format_instant),
        }
    }
}

/// Refund details.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RefundInfo {
    pub refund_id: i64,
    pub amount: i64,
    pub reason: String,
    pub status: String,
    pub refund_method: Option<String>,
    pub transaction_id: Option<String>,
    pub decided_by: Option<String>,
    pub decision_note: Option<String>,
}

impl From<&Refund> for RefundInfo {
    fn from(refund: &Refund) -> Self {
        Self {
            refund_id: refund.refund_id.unwrap_or_default(),
            amount: refund.amount,
            reason: refund.reason.clone(),
            status: refund.status.as_str().to_string(),
            refund_method: refund.refund_method.clone(),
            transaction_id: refund.transaction_id.clone(),
            decided_by: refund.decided_by.clone(),
            decision_note: refund.decision_note.clone(),
        }
    }
}

/// A booking with everything attached to it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BookingResponse {
    pub booking: BookingInfo,
    pub tickets: Vec<TicketInfo>,
    pub vehicles: Vec<VehicleInfo>,
    pub payments: Vec<PaymentInfo>,
    pub refund: Option<RefundInfo>,
}

impl From<&BookingState> for BookingResponse {
    fn from(state: &BookingState) -> Self {
        Self {
            booking: BookingInfo::from(&state.booking),
            tickets: state.tickets.iter().map(TicketInfo::from).collect(),
            vehicles: state.vehicles.iter().map(VehicleInfo::from).collect(),
            payments: state.payments.iter().map(PaymentInfo::from).collect(),
            refund: state.refund.as_ref().map(RefundInfo::from),
        }
    }
}

/// API response for a reschedule.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RescheduleResponse {
    /// The original booking, now RESCHEDULED.
    pub original: BookingResponse,
    /// The replacement booking, CONFIRMED.
    pub replacement: BookingResponse,
}

/// One row of a booking's log.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BookingLogInfo {
    pub previous_status: Option<String>,
    pub new_status: String,
    pub actor_id: String,
    pub actor_type: String,
    pub note: Option<String>,
    pub ip_address: Option<String>,
    pub recorded_at: String,
}

impl From<&BookingLogEntry> for BookingLogInfo {
    fn from(entry: &BookingLogEntry) -> Self {
        Self {
            previous_status: entry.previous_status.map(|s| s.as_str().to_string()),
            new_status: entry.new_status.as_str().to_string(),
            actor_id: entry.actor.id.clone(),
            actor_type: entry.actor.actor_type.as_str().to_string(),
            note: entry.note.clone(),
            ip_address: entry.ip_address.clone(),
            recorded_at: format_instant(entry.recorded_at),
        }
    }
}

/// API response for a booking's log timeline.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BookingLogResponse {
    pub booking_id: i64,
    /// Oldest first.
    pub entries: Vec<BookingLogInfo>,
}

// ============================================================================
// Payments
// ============================================================================

/// A payment provider callback.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PaymentCallbackRequest {
    pub booking_code: String,
    /// The provider's status word (`settlement`, `pending`, `deny`, `expire`, ...).
    pub provider_status: String,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

/// API response for a callback or a manual status check.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PaymentCallbackResponse {
    pub booking_code: String,
    pub booking_status: String,
    pub payment_status: Option<String>,
    /// False when the callback repeated an already-applied outcome.
    pub applied: bool,
}

// ============================================================================
// Check-in
// ============================================================================

/// API request to look up tickets for check-in.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ValidateTicketRequest {
    /// Ticket code, passenger ID number or passenger name.
    pub identifier: String,
}

/// One candidate ticket with its check-in eligibility.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TicketValidationInfo {
    pub ticket: TicketInfo,
    pub booking_code: String,
    pub booking_status: String,
    pub route_id: i64,
    pub departure_date: String,
    /// True when the ticket can be checked in right now.
    pub eligible: bool,
    /// Why the ticket cannot be checked in.
    pub reason: Option<String>,
}

/// API response for a ticket lookup.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ValidateTicketResponse {
    pub matches: Vec<TicketValidationInfo>,
}

/// API request to check in one ticket.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CheckInRequest {
    pub ticket_code: String,
    /// Where check-in took place (gate, counter).
    #[serde(default)]
    pub location: Option<String>,
    /// Reference to a captured signature.
    #[serde(default)]
    pub signature_ref: Option<String>,
}

// ============================================================================
// Refunds
// ============================================================================

/// Bank account for a transfer refund.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BankDetailsInput {
    pub bank_name: String,
    pub account_number: String,
    pub account_holder: String,
}

/// API request to refund a booking.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RequestRefundRequest {
    pub reason: String,
    #[serde(default)]
    pub refund_method: Option<String>,
    #[serde(default)]
    pub bank_details: Option<BankDetailsInput>,
}

/// API request to approve or reject a refund.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RefundDecisionRequest {
    #[serde(default)]
    pub note: Option<String>,
}

/// API request to record a paid-out refund.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CompleteRefundRequest {
    /// The provider's refund transaction identifier.
    pub transaction_id: String,
}

/// API response for a refund quote.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RefundQuoteResponse {
    pub booking_id: i64,
    pub eligible: bool,
    /// Whole days before departure; negative once departed.
    pub days_before: i64,
    pub percentage: u8,
    pub amount: i64,
    /// The policy tier that applied.
    pub rule_id: Option<i64>,
}

impl RefundQuoteResponse {
    pub(crate) fn new(booking_id: i64, quote: &RefundQuote) -> Self {
        Self {
            booking_id,
            eligible: quote.eligible,
            days_before: quote.days_before,
            percentage: quote.percentage,
            amount: quote.amount,
            rule_id: quote.rule_id,
        }
    }
}

/// API request to create or replace a refund policy tier.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PolicyRuleRequest {
    /// Minimum whole days before departure for this tier.
    pub days_before_departure: u32,
    /// Refund percentage, 0 to 100.
    pub refund_percentage: u8,
    #[serde(default)]
    pub min_fee: Option<i64>,
    #[serde(default)]
    pub max_fee: Option<i64>,
    #[serde(default = "default_active")]
    pub active: bool,
}

const fn default_active() -> bool {
    true
}

impl From<&PolicyRuleRequest> for RefundPolicyRule {
    fn from(request: &PolicyRuleRequest) -> Self {
        let mut rule = Self::new(request.days_before_departure, request.refund_percentage)
            .with_bounds(request.min_fee, request.max_fee);
        rule.active = request.active;
        rule
    }
}

/// One refund policy tier.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PolicyRuleInfo {
    pub rule_id: i64,
    pub days_before_departure: u32,
    pub refund_percentage: u8,
    pub min_fee: Option<i64>,
    pub max_fee: Option<i64>,
    pub active: bool,
}

impl From<&RefundPolicyRule> for PolicyRuleInfo {
    fn from(rule: &RefundPolicyRule) -> Self {
        Self {
            rule_id: rule.rule_id.unwrap_or_default(),
            days_before_departure: rule.days_before_departure,
            refund_percentage: rule.refund_percentage,
            min_fee: rule.min_fee,
            max_fee: rule.max_fee,
            active: rule.active,
        }
    }
}

/// API response for listing the refund policy.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ListPolicyRulesResponse {
    pub rules: Vec<PolicyRuleInfo>,
}

// ============================================================================
// Operational status and capacity
// ============================================================================

/// API request to force the status of a route, schedule or ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SetStatusRequest {
    /// The new status (`ACTIVE`, `INACTIVE`, `WEATHER_ISSUE`, ...).
    pub status: String,
    #[serde(default)]
    pub reason: Option<String>,
    /// When the status lapses back to ACTIVE (RFC 3339).
    #[serde(default)]
    pub expires_at: Option<String>,
}

/// API request to override a ledger entry's capacity.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OverrideCapacityRequest {
    pub capacity: CapacityInfo,
}

/// Capacity and status of one schedule on one date.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LedgerInfo {
    pub ledger_id: i64,
    pub schedule_id: i64,
    pub departure_date: String,
    pub status: String,
    /// What set the status (`direct`, `schedule` or `system`).
    pub status_source: String,
    pub reason: Option<String>,
    pub expires_at: Option<String>,
    pub usage: CapacityInfo,
    pub capacity: CapacityInfo,
    pub capacity_overridden: bool,
}

impl From<&LedgerEntry> for LedgerInfo {
    fn from(entry: &LedgerEntry) -> Self {
        Self {
            ledger_id: entry.ledger_id.unwrap_or_default(),
            schedule_id: entry.schedule_id,
            departure_date: entry.departure_date.to_string(),
            status: entry.status.as_str().to_string(),
            status_source: entry.status_source.as_str().to_string(),
            reason: entry.hold.reason.clone(),
            expires_at: entry.hold.expires_at.map(format_instant),
            usage: entry.usage.into(),
            capacity: entry.capacity.into(),
            capacity_overridden: entry.capacity_overridden,
        }
    }
}

/// API response for a sweep run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SweepResponse {
    pub routes: usize,
    pub schedules: usize,
    pub ledger_entries: usize,
}

impl From<SweepReport> for SweepResponse {
    fn from(report: SweepReport) -> Self {
        Self {
            routes: report.routes,
            schedules: report.schedules,
            ledger_entries: report.ledger_entries,
        }
    }
}

// ============================================================================
// Reference data
// ============================================================================

/// API request to create a route.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreateRouteRequest {
    pub origin: String,
    pub destination: String,
    pub fares: FareInfo,
}

/// Route details.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RouteInfo {
    pub route_id: i64,
    pub origin: String,
    pub destination: String,
    pub fares: FareInfo,
    pub status: String,
    pub reason: Option<String>,
    pub expires_at: Option<String>,
}

impl From<&Route> for RouteInfo {
    fn from(route: &Route) -> Self {
        Self {
            route_id: route.route_id.unwrap_or_default(),
            origin: route.origin.clone(),
            destination: route.destination.clone(),
            fares: route.fares.into(),
            status: route.status.as_str().to_string(),
            reason: route.hold.reason.clone(),
            expires_at: route.hold.expires_at.map(format_instant),
        }
    }
}

/// API response for listing routes.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ListRoutesResponse {
    pub routes: Vec<RouteInfo>,
}

/// API request to register a ferry.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreateFerryRequest {
    pub name: String,
    pub capacity: CapacityInfo,
}

/// Ferry details.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FerryInfo {
    pub ferry_id: i64,
    pub name: String,
    pub capacity: CapacityInfo,
}

impl From<&Ferry> for FerryInfo {
    fn from(ferry: &Ferry) -> Self {
        Self {
            ferry_id: ferry.ferry_id.unwrap_or_default(),
            name: ferry.name.clone(),
            capacity: ferry.capacity.into(),
        }
    }
}

/// API request to create a schedule.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CreateScheduleRequest {
    pub route_id: i64,
    pub ferry_id: i64,
    /// Local departure time (`HH:MM`).
    pub departure_time: String,
    /// Local arrival time (`HH:MM`).
    pub arrival_time: String,
    /// ISO weekdays, 1 = Monday through 7 = Sunday.
    pub operating_days: Vec<u8>,
}

/// Schedule details.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScheduleInfo {
    pub schedule_id: i64,
    pub route_id: i64,
    pub ferry_id: i64,
    pub departure_time: String,
    pub arrival_time: String,
    pub operating_days: Vec<u8>,
    pub status: String,
    pub reason: Option<String>,
    pub expires_at: Option<String>,
}

impl From<&Schedule> for ScheduleInfo {
    fn from(schedule: &Schedule) -> Self {
        Self {
            schedule_id: schedule.schedule_id.unwrap_or_default(),
            route_id: schedule.route_id,
            ferry_id: schedule.ferry_id,
            departure_time: format_time(schedule.departure_time),
            arrival_time: format_time(schedule.arrival_time),
            operating_days: schedule.operating_days.days(),
            status: schedule.status.as_str().to_string(),
            reason: schedule.hold.reason.clone(),
            expires_at: schedule.hold.expires_at.map(format_instant),
        }
    }
}

/// API response for a schedule status change.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScheduleStatusResponse {
    pub schedule: ScheduleInfo,
    /// Ledger entries the change cascaded to.
    pub affected_entries: Vec<LedgerInfo>,
}

// ============================================================================
// Audit
// ============================================================================

/// One general audit event.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AuditEventInfo {
    pub event_id: i64,
    pub recorded_at: String,
    pub actor_id: String,
    pub actor_type: String,
    pub cause_id: String,
    pub cause_description: String,
    pub action: String,
    pub details: Option<String>,
    pub entity_type: String,
    pub entity_id: Option<i64>,
    pub before: String,
    pub after: String,
}

impl From<&StoredAuditEvent> for AuditEventInfo {
    fn from(stored: &StoredAuditEvent) -> Self {
        let event = &stored.event;
        Self {
            event_id: stored.event_id,
            recorded_at: format_instant(stored.recorded_at),
            actor_id: event.actor.id.clone(),
            actor_type: event.actor.actor_type.as_str().to_string(),
            cause_id: event.cause.id.clone(),
            cause_description: event.cause.description.clone(),
            action: event.action.name.clone(),
            details: event.action.details.clone(),
            entity_type: event.scope.entity_type.clone(),
            entity_id: event.scope.entity_id,
            before: event.before.data.clone(),
            after: event.after.data.clone(),
        }
    }
}

/// API response for listing audit events.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ListAuditEventsResponse {
    pub events: Vec<AuditEventInfo>,
}
