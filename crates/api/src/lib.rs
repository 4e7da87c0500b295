// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary for the ferry booking engine.
//!
//! Handlers in this crate sit between a transport (the HTTP server) and
//! persistence. They:
//!
//! - authorize the caller by role and, for operators, by route
//! - parse wire values (dates, statuses, provider vocabulary)
//! - take `now` from an injected [`Clock`](ferry_book::Clock) and "today"
//!   from the operating timezone
//! - translate every lower-layer failure into an [`ApiError`]
//!
//! No rule is decided here; capacity, status tables, the refund policy and
//! the check-in window all live in the domain and core crates.

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
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod error;
mod handlers;
mod payment_provider;
mod request_response;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthorizationService, Role, authenticate_stub};
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error,
    translate_persistence_error,
};
pub use handlers::{
    ApiContext, approve_refund, check_in, complete_refund, create_booking, create_ferry,
    create_policy_rule, create_route, create_schedule, get_booking, get_booking_by_code,
    get_booking_log, get_ledger, get_route, get_schedule, list_audit_events, list_policy_rules,
    list_routes, manual_status_check, override_ledger_capacity, payment_callback, quote_refund,
    reject_refund, request_refund, reschedule_booking, set_ledger_status, set_route_status,
    set_schedule_status, sweep_expired_statuses, transition_booking, update_policy_rule,
    validate_ticket,
};
pub use payment_provider::{PaymentProvider, PaymentProviderError, ProviderReport};
pub use request_response::{
    AuditEventInfo, BankDetailsInput, BookingInfo, BookingLogInfo, BookingLogResponse,
    BookingResponse, CapacityInfo, CheckInRequest, CompleteRefundRequest, CreateBookingRequest,
    CreateFerryRequest, CreateRouteRequest, CreateScheduleRequest, FareInfo, FerryInfo,
    LedgerInfo, ListAuditEventsResponse, ListPolicyRulesResponse, ListRoutesResponse,
    OverrideCapacityRequest, PassengerInput, PaymentCallbackRequest, PaymentCallbackResponse,
    PaymentInfo, PolicyRuleInfo, PolicyRuleRequest, RefundDecisionRequest, RefundInfo,
    RefundQuoteResponse, RequestRefundRequest, RescheduleRequest, RescheduleResponse, RouteInfo,
    ScheduleInfo, ScheduleStatusResponse, SetStatusRequest, SweepResponse, TicketInfo,
    TicketValidationInfo, TransitionBookingRequest, ValidateTicketRequest,
    ValidateTicketResponse, VehicleInfo, VehicleInput,
};
