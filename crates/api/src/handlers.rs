// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.
//!
//! Every handler authorizes first, then parses, then calls persistence
//! exactly once for a state change. Handlers never hold state of their own.

use std::str::FromStr;
use std::sync::Arc;

use ferry_book::{BookingRequest, BookingState, Clock};
use ferry_book_audit::Cause;
use ferry_book_domain::{
    BankDetails, BookingStatus, CheckInRecord, DomainError, Ferry, LedgerEntry, LedgerStatus,
    Manifest, OperatingDays, OperatingZone, Passenger, RefundPolicyRule, Route, RouteStatus,
    Schedule, ScheduleStatus, StatusHold, VehicleClass, VehicleSpec, validate_check_in_window,
    validate_ticket_for_check_in,
};
use ferry_book_persistence::{Persistence, ReconcileOutcome, TicketMatch};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};
use tracing::info;

use crate::auth::{AuthenticatedActor, AuthorizationService, Role};
use crate::error::{ApiError, translate_domain_error, translate_persistence_error};
use crate::payment_provider::{PaymentProvider, PaymentProviderError, ProviderReport};
use crate::request_response::{
    AuditEventInfo, BookingLogInfo, BookingLogResponse, BookingResponse, CheckInRequest,
    CompleteRefundRequest, CreateBookingRequest, CreateFerryRequest, CreateRouteRequest,
    CreateScheduleRequest, FerryInfo, LedgerInfo, ListAuditEventsResponse,
    ListPolicyRulesResponse, ListRoutesResponse, OverrideCapacityRequest,
    PaymentCallbackRequest, PaymentCallbackResponse, PolicyRuleInfo, PolicyRuleRequest,
    RefundDecisionRequest, RefundQuoteResponse, RequestRefundRequest, RescheduleRequest,
    RescheduleResponse, RouteInfo, ScheduleInfo, ScheduleStatusResponse, SetStatusRequest,
    SweepResponse, TicketInfo, TicketValidationInfo, TransitionBookingRequest,
    ValidateTicketRequest, ValidateTicketResponse,
};

const STAFF: &[Role] = &[Role::Operator, Role::Admin];

/// Time, place and provider a handler runs against.
///
/// The clock supplies `now` for every temporal rule; the operating zone
/// turns `now` into the local "today" used by check-in.
#[derive(Clone)]
pub struct ApiContext {
    clock: Arc<dyn Clock>,
    zone: OperatingZone,
    provider: Option<Arc<dyn PaymentProvider>>,
}

impl ApiContext {
    /// Creates a context with no payment provider.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, zone: OperatingZone) -> Self {
        Self {
            clock,
            zone,
            provider: None,
        }
    }

    /// Attaches the payment provider used for manual status checks.
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn PaymentProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// The current instant.
    #[must_use]
    pub fn now(&self) -> OffsetDateTime {
        self.clock.now()
    }

    /// The operating timezone.
    #[must_use]
    pub const fn zone(&self) -> &OperatingZone {
        &self.zone
    }

    /// Today's date in the operating timezone.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the local date cannot be resolved.
    pub fn today(&self) -> Result<Date, ApiError> {
        self.zone
            .local_date(self.now())
            .map_err(translate_domain_error)
    }
}

// ============================================================================
// Parsing helpers
// ============================================================================

fn parse_date(field: &str, value: &str) -> Result<Date, ApiError> {
    Date::parse(value.trim(), format_description!("[year]-[month]-[day]")).map_err(|e| {
        ApiError::InvalidInput {
            field: field.to_string(),
            message: format!("expected YYYY-MM-DD: {e}"),
        }
    })
}

fn parse_time(field: &str, value: &str) -> Result<time::Time, ApiError> {
    time::Time::parse(value.trim(), format_description!("[hour]:[minute]")).map_err(|e| {
        ApiError::InvalidInput {
            field: field.to_string(),
            message: format!("expected HH:MM: {e}"),
        }
    })
}

fn parse_instant(field: &str, value: &str) -> Result<OffsetDateTime, ApiError> {
    OffsetDateTime::parse(value.trim(), &Rfc3339).map_err(|e| ApiError::InvalidInput {
        field: field.to_string(),
        message: format!("expected an RFC 3339 timestamp: {e}"),
    })
}

fn parse_status<T>(value: &str) -> Result<T, ApiError>
where
    T: FromStr<Err = DomainError>,
{
    T::from_str(&value.trim().to_ascii_uppercase()).map_err(translate_domain_error)
}

fn parse_hold(request: &SetStatusRequest) -> Result<StatusHold, ApiError> {
    let expires_at: Option<OffsetDateTime> = request
        .expires_at
        .as_deref()
        .map(|value| parse_instant("expires_at", value))
        .transpose()?;
    Ok(StatusHold::new(request.reason.clone(), expires_at))
}

fn require_text(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::InvalidInput {
            field: field.to_string(),
            message: String::from("must not be empty"),
        });
    }
    Ok(())
}

fn build_manifest(request: &CreateBookingRequest) -> Result<Manifest, ApiError> {
    let passengers: Vec<Passenger> = request
        .passengers
        .iter()
        .map(|p| Passenger {
            name: p.name.trim().to_string(),
            id_number: p.id_number.clone(),
        })
        .collect();

    let vehicles: Vec<VehicleSpec> = request
        .vehicles
        .iter()
        .map(|v| {
            let class: VehicleClass = VehicleClass::from_str(&v.class.trim().to_ascii_lowercase())
                .map_err(translate_domain_error)?;
            Ok(VehicleSpec {
                class,
                license_plate: v.license_plate.trim().to_string(),
                driver: v.driver_index,
            })
        })
        .collect::<Result<_, ApiError>>()?;

    Ok(Manifest {
        passengers,
        vehicles,
    })
}

fn load_authorized_booking(
    persistence: &mut Persistence,
    booking_id: i64,
    action: &str,
    authenticated_actor: &AuthenticatedActor,
) -> Result<BookingState, ApiError> {
    let state: BookingState = persistence
        .get_booking(booking_id)
        .map_err(translate_persistence_error)?;
    AuthorizationService::authorize_booking(authenticated_actor, action, &state.booking)?;
    Ok(state)
}

fn callback_response(outcome: &ReconcileOutcome) -> PaymentCallbackResponse {
    PaymentCallbackResponse {
        booking_code: outcome.state.booking.booking_code.clone(),
        booking_status: outcome.state.booking.status.as_str().to_string(),
        payment_status: outcome
            .state
            .payments
            .last()
            .map(|p| p.status.as_str().to_string()),
        applied: outcome.applied,
    }
}

// ============================================================================
// Bookings
// ============================================================================

/// Creates a PENDING booking and reserves its capacity.
///
/// Users always book for themselves. Staff book on behalf of a named
/// traveller, and operators only on routes they are assigned to.
///
/// # Errors
///
/// Returns an error if:
/// - the actor may not book for the named traveller or route
/// - the date or a vehicle class is malformed
/// - the schedule does not run that day, or the route, schedule or
///   sailing is closed
/// - any resource class lacks room
pub fn create_booking(
    persistence: &mut Persistence,
    context: &ApiContext,
    request: &CreateBookingRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<BookingResponse, ApiError> {
    let user_id: String = match authenticated_actor.role {
        Role::User => {
            if request
                .user_id
                .as_ref()
                .is_some_and(|id| id != &authenticated_actor.id)
            {
                return Err(ApiError::Unauthorized {
                    action: String::from("create_booking"),
                    required_role: String::from("Operator or Admin"),
                });
            }
            authenticated_actor.id.clone()
        }
        Role::Operator | Role::Admin => request
            .user_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ApiError::InvalidInput {
                field: String::from("user_id"),
                message: String::from("staff bookings must name the traveller"),
            })?,
    };

    let departure_date: Date = parse_date("departure_date", &request.departure_date)?;

    if authenticated_actor.role == Role::Operator {
        let schedule: Schedule = persistence
            .get_schedule(request.schedule_id)
            .map_err(translate_persistence_error)?;
        AuthorizationService::authorize_route(
            authenticated_actor,
            "create_booking",
            schedule.route_id,
        )?;
    }

    let booking_request = BookingRequest {
        user_id,
        schedule_id: request.schedule_id,
        departure_date,
        manifest: build_manifest(request)?,
    };

    let state: BookingState = persistence
        .create_booking(
            &booking_request,
            &authenticated_actor.to_audit_actor(),
            context.zone(),
            context.now(),
        )
        .map_err(translate_persistence_error)?;

    Ok(BookingResponse::from(&state))
}

/// Returns a booking with its tickets, vehicles, payments and refund.
///
/// # Errors
///
/// Returns an error if the booking does not exist or the actor may not
/// see it.
pub fn get_booking(
    persistence: &mut Persistence,
    booking_id: i64,
    authenticated_actor: &AuthenticatedActor,
) -> Result<BookingResponse, ApiError> {
    let state: BookingState =
        load_authorized_booking(persistence, booking_id, "get_booking", authenticated_actor)?;
    Ok(BookingResponse::from(&state))
}

/// Returns a booking looked up by its code.
///
/// # Errors
///
/// Returns an error if no booking carries the code or the actor may not
/// see it.
pub fn get_booking_by_code(
    persistence: &mut Persistence,
    booking_code: &str,
    authenticated_actor: &AuthenticatedActor,
) -> Result<BookingResponse, ApiError> {
    let state: BookingState = persistence
        .get_booking_by_code(booking_code.trim())
        .map_err(translate_persistence_error)?;
    AuthorizationService::authorize_booking(authenticated_actor, "get_booking", &state.booking)?;
    Ok(BookingResponse::from(&state))
}

/// Returns the booking's log timeline, oldest first.
///
/// # Errors
///
/// Returns an error if the booking does not exist or the actor may not
/// see it.
pub fn get_booking_log(
    persistence: &mut Persistence,
    booking_id: i64,
    authenticated_actor: &AuthenticatedActor,
) -> Result<BookingLogResponse, ApiError> {
    load_authorized_booking(
        persistence,
        booking_id,
        "get_booking_log",
        authenticated_actor,
    )?;
    let entries = persistence
        .booking_log(booking_id)
        .map_err(translate_persistence_error)?;
    Ok(BookingLogResponse {
        booking_id,
        entries: entries.iter().map(BookingLogInfo::from).collect(),
    })
}

/// Moves a booking along its status table.
///
/// Users may only cancel their own bookings; confirming and completing
/// are staff actions.
///
/// # Errors
///
/// Returns an error if the status is unknown, the actor may not request
/// it, or the booking's status table forbids it.
pub fn transition_booking(
    persistence: &mut Persistence,
    context: &ApiContext,
    booking_id: i64,
    request: &TransitionBookingRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<BookingResponse, ApiError> {
    let target: BookingStatus = parse_status(&request.target_status)?;
    if target != BookingStatus::Cancelled {
        AuthorizationService::require_role(authenticated_actor, "transition_booking", STAFF)?;
    }
    load_authorized_booking(
        persistence,
        booking_id,
        "transition_booking",
        authenticated_actor,
    )?;

    let state: BookingState = persistence
        .transition_booking(
            booking_id,
            target,
            request.note.clone(),
            &authenticated_actor.to_audit_actor(),
            context.now(),
        )
        .map_err(translate_persistence_error)?;
    Ok(BookingResponse::from(&state))
}

/// Moves a CONFIRMED booking to another sailing on the same route.
///
/// # Errors
///
/// Returns an error if the actor may not act on the booking, the booking
/// is not CONFIRMED, the new schedule is on another route, or the new
/// sailing is closed or full.
pub fn reschedule_booking(
    persistence: &mut Persistence,
    context: &ApiContext,
    booking_id: i64,
    request: &RescheduleRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<RescheduleResponse, ApiError> {
    load_authorized_booking(
        persistence,
        booking_id,
        "reschedule_booking",
        authenticated_actor,
    )?;
    let departure_date: Date = parse_date("departure_date", &request.departure_date)?;

    let outcome = persistence
        .reschedule_booking(
            booking_id,
            request.schedule_id,
            departure_date,
            &authenticated_actor.to_audit_actor(),
            context.zone(),
            context.now(),
        )
        .map_err(translate_persistence_error)?;

    Ok(RescheduleResponse {
        original: BookingResponse::from(&outcome.original),
        replacement: BookingResponse::from(&outcome.replacement),
    })
}

// ============================================================================
// Payments
// ============================================================================

/// Applies a payment provider callback.
///
/// The provider authenticates out of band, so there is no actor here;
/// the booking log records the system actor. Repeated callbacks for an
/// outcome already applied answer `applied: false`.
///
/// # Errors
///
/// Returns an error if the status word is unknown or the booking code
/// does not exist.
pub fn payment_callback(
    persistence: &mut Persistence,
    context: &ApiContext,
    request: &PaymentCallbackRequest,
) -> Result<PaymentCallbackResponse, ApiError> {
    let report: ProviderReport = ProviderReport::from_raw(
        &request.provider_status,
        request.transaction_id.clone(),
        request.payment_method.clone(),
    )
    .map_err(|_| ApiError::InvalidInput {
        field: String::from("provider_status"),
        message: format!("unknown provider status '{}'", request.provider_status),
    })?;

    let outcome: ReconcileOutcome = persistence
        .apply_payment_callback(
            request.booking_code.trim(),
            report.status,
            report.transaction_id,
            report.payment_method,
            context.now(),
        )
        .map_err(translate_persistence_error)?;
    Ok(callback_response(&outcome))
}

/// Asks the payment provider for a booking's status and applies the answer
/// exactly as a callback would.
///
/// # Errors
///
/// Returns `ProviderUnavailable` when no provider is configured or it
/// cannot answer, plus any error a callback could produce.
pub fn manual_status_check(
    persistence: &mut Persistence,
    context: &ApiContext,
    booking_id: i64,
    authenticated_actor: &AuthenticatedActor,
) -> Result<PaymentCallbackResponse, ApiError> {
    AuthorizationService::require_role(authenticated_actor, "manual_status_check", STAFF)?;
    let state: BookingState = load_authorized_booking(
        persistence,
        booking_id,
        "manual_status_check",
        authenticated_actor,
    )?;

    let provider = context
        .provider
        .as_ref()
        .ok_or(PaymentProviderError::NotConfigured)?;
    let report: ProviderReport = provider.query_status(&state.booking.booking_code)?;
    info!(
        booking_code = %state.booking.booking_code,
        provider_status = report.status.as_str(),
        "Provider answered manual status check"
    );

    let outcome: ReconcileOutcome = persistence
        .apply_payment_callback(
            &state.booking.booking_code,
            report.status,
            report.transaction_id,
            report.payment_method,
            context.now(),
        )
        .map_err(translate_persistence_error)?;
    Ok(callback_response(&outcome))
}

// ============================================================================
// Check-in
// ============================================================================

fn validation_info(found: &TicketMatch, today: Date) -> TicketValidationInfo {
    let eligibility: Result<(), DomainError> = validate_ticket_for_check_in(
        &found.ticket.ticket_code,
        found.ticket.status,
        found.ticket.checked_in,
        found.booking.status,
    )
    .and_then(|()| validate_check_in_window(found.booking.departure_date, today));

    TicketValidationInfo {
        ticket: TicketInfo::from(&found.ticket),
        booking_code: found.booking.booking_code.clone(),
        booking_status: found.booking.status.as_str().to_string(),
        route_id: found.booking.route_id,
        departure_date: found.booking.departure_date.to_string(),
        eligible: eligibility.is_ok(),
        reason: eligibility.err().map(|e| e.to_string()),
    }
}

/// Finds tickets by code, passenger ID number or name and reports whether
/// each could be checked in now.
///
/// Operators only see tickets on their assigned routes.
///
/// # Errors
///
/// Returns an error if the actor is not staff or the identifier is blank.
pub fn validate_ticket(
    persistence: &mut Persistence,
    context: &ApiContext,
    request: &ValidateTicketRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<ValidateTicketResponse, ApiError> {
    AuthorizationService::require_role(authenticated_actor, "validate_ticket", STAFF)?;
    require_text("identifier", &request.identifier)?;
    let today: Date = context.today()?;

    let found: Vec<TicketMatch> = persistence
        .find_tickets(request.identifier.trim(), authenticated_actor.route_filter())
        .map_err(translate_persistence_error)?;

    Ok(ValidateTicketResponse {
        matches: found.iter().map(|m| validation_info(m, today)).collect(),
    })
}

/// Checks in one ticket.
///
/// The booking completes when its last ticket is checked in.
///
/// # Errors
///
/// Returns an error if the actor is not staff on the ticket's route, the
/// ticket does not exist, was already checked in or is inactive, the
/// booking is not CONFIRMED, or today is outside the check-in window.
pub fn check_in(
    persistence: &mut Persistence,
    context: &ApiContext,
    request: &CheckInRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<BookingResponse, ApiError> {
    AuthorizationService::require_role(authenticated_actor, "check_in", STAFF)?;
    let ticket_code: &str = request.ticket_code.trim();
    let owner: BookingState = persistence
        .get_booking_by_ticket(ticket_code)
        .map_err(translate_persistence_error)?;
    AuthorizationService::authorize_route(authenticated_actor, "check_in", owner.booking.route_id)?;

    let record = CheckInRecord {
        operator_id: authenticated_actor.id.clone(),
        location: request.location.clone(),
        signature_ref: request.signature_ref.clone(),
    };
    let state: BookingState = persistence
        .check_in(
            ticket_code,
            &record,
            &authenticated_actor.to_audit_actor(),
            context.today()?,
            context.now(),
        )
        .map_err(translate_persistence_error)?;
    Ok(BookingResponse::from(&state))
}

// ============================================================================
// Refunds
// ============================================================================

/// Quotes the refund the booking would receive now.
///
/// # Errors
///
/// Returns an error if the booking does not exist or the actor may not
/// see it.
pub fn quote_refund(
    persistence: &mut Persistence,
    context: &ApiContext,
    booking_id: i64,
    authenticated_actor: &AuthenticatedActor,
) -> Result<RefundQuoteResponse, ApiError> {
    load_authorized_booking(persistence, booking_id, "quote_refund", authenticated_actor)?;
    let quote = persistence
        .quote_refund(booking_id, context.zone(), context.now())
        .map_err(translate_persistence_error)?;
    Ok(RefundQuoteResponse::new(booking_id, &quote))
}

/// Requests a refund, cancelling a CONFIRMED booking in the same step.
///
/// # Errors
///
/// Returns an error if the actor may not act on the booking, the reason
/// is blank, no policy tier applies, the payment is not settled, or a
/// refund already exists.
pub fn request_refund(
    persistence: &mut Persistence,
    context: &ApiContext,
    booking_id: i64,
    request: &RequestRefundRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<BookingResponse, ApiError> {
    load_authorized_booking(
        persistence,
        booking_id,
        "request_refund",
        authenticated_actor,
    )?;
    require_text("reason", &request.reason)?;

    let bank_details: Option<BankDetails> = request.bank_details.as_ref().map(|b| BankDetails {
        bank_name: b.bank_name.clone(),
        account_number: b.account_number.clone(),
        account_holder: b.account_holder.clone(),
    });

    let state: BookingState = persistence
        .request_refund(
            booking_id,
            request.reason.trim(),
            request.refund_method.clone(),
            bank_details,
            &authenticated_actor.to_audit_actor(),
            context.zone(),
            context.now(),
        )
        .map_err(translate_persistence_error)?;
    Ok(BookingResponse::from(&state))
}

/// Approves a pending refund. Admin only.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the refund is not
/// PENDING.
pub fn approve_refund(
    persistence: &mut Persistence,
    context: &ApiContext,
    booking_id: i64,
    request: &RefundDecisionRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<BookingResponse, ApiError> {
    AuthorizationService::authorize_admin(authenticated_actor, "approve_refund")?;
    let state: BookingState = persistence
        .approve_refund(
            booking_id,
            request.note.clone(),
            &authenticated_actor.to_audit_actor(),
            context.now(),
        )
        .map_err(translate_persistence_error)?;
    Ok(BookingResponse::from(&state))
}

/// Rejects a pending refund. Admin only.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the refund is not
/// PENDING.
pub fn reject_refund(
    persistence: &mut Persistence,
    context: &ApiContext,
    booking_id: i64,
    request: &RefundDecisionRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<BookingResponse, ApiError> {
    AuthorizationService::authorize_admin(authenticated_actor, "reject_refund")?;
    let state: BookingState = persistence
        .reject_refund(
            booking_id,
            request.note.clone(),
            &authenticated_actor.to_audit_actor(),
            context.now(),
        )
        .map_err(translate_persistence_error)?;
    Ok(BookingResponse::from(&state))
}

/// Records that an approved refund was paid out. Admin only.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the transaction id is
/// blank, or the refund is not APPROVED.
pub fn complete_refund(
    persistence: &mut Persistence,
    context: &ApiContext,
    booking_id: i64,
    request: &CompleteRefundRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<BookingResponse, ApiError> {
    AuthorizationService::authorize_admin(authenticated_actor, "complete_refund")?;
    require_text("transaction_id", &request.transaction_id)?;
    let state: BookingState = persistence
        .complete_refund(
            booking_id,
            request.transaction_id.trim(),
            &authenticated_actor.to_audit_actor(),
            context.now(),
        )
        .map_err(translate_persistence_error)?;
    Ok(BookingResponse::from(&state))
}

/// Adds a refund policy tier. Admin only.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the tier is malformed.
pub fn create_policy_rule(
    persistence: &mut Persistence,
    context: &ApiContext,
    request: &PolicyRuleRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: &Cause,
) -> Result<PolicyRuleInfo, ApiError> {
    AuthorizationService::authorize_admin(authenticated_actor, "create_policy_rule")?;
    let rule: RefundPolicyRule = persistence
        .create_policy_rule(
            &RefundPolicyRule::from(request),
            &authenticated_actor.to_audit_actor(),
            cause,
            context.now(),
        )
        .map_err(translate_persistence_error)?;
    Ok(PolicyRuleInfo::from(&rule))
}

/// Replaces a refund policy tier. Deactivation is an update with
/// `active: false`. Admin only.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, the tier does not exist
/// or the replacement is malformed.
pub fn update_policy_rule(
    persistence: &mut Persistence,
    context: &ApiContext,
    rule_id: i64,
    request: &PolicyRuleRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: &Cause,
) -> Result<PolicyRuleInfo, ApiError> {
    AuthorizationService::authorize_admin(authenticated_actor, "update_policy_rule")?;
    let rule: RefundPolicyRule = persistence
        .update_policy_rule(
            rule_id,
            &RefundPolicyRule::from(request),
            &authenticated_actor.to_audit_actor(),
            cause,
            context.now(),
        )
        .map_err(translate_persistence_error)?;
    Ok(PolicyRuleInfo::from(&rule))
}

/// Lists the refund policy tiers. The policy is public.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_policy_rules(
    persistence: &mut Persistence,
    active_only: bool,
) -> Result<ListPolicyRulesResponse, ApiError> {
    let rules: Vec<RefundPolicyRule> = persistence
        .list_policy_rules(active_only)
        .map_err(translate_persistence_error)?;
    Ok(ListPolicyRulesResponse {
        rules: rules.iter().map(PolicyRuleInfo::from).collect(),
    })
}

// ============================================================================
// Ledger
// ============================================================================

fn authorize_schedule(
    persistence: &mut Persistence,
    schedule_id: i64,
    action: &str,
    authenticated_actor: &AuthenticatedActor,
) -> Result<Schedule, ApiError> {
    let schedule: Schedule = persistence
        .get_schedule(schedule_id)
        .map_err(translate_persistence_error)?;
    AuthorizationService::authorize_route(authenticated_actor, action, schedule.route_id)?;
    Ok(schedule)
}

/// Returns the ledger entry for a sailing, opening it on first use.
///
/// # Errors
///
/// Returns an error if the actor is not staff on the route, the date is
/// malformed, or the schedule does not run that day.
pub fn get_ledger(
    persistence: &mut Persistence,
    context: &ApiContext,
    schedule_id: i64,
    departure_date: &str,
    authenticated_actor: &AuthenticatedActor,
) -> Result<LedgerInfo, ApiError> {
    authorize_schedule(persistence, schedule_id, "get_ledger", authenticated_actor)?;
    let date: Date = parse_date("departure_date", departure_date)?;
    let entry: LedgerEntry = persistence
        .get_or_create_ledger(schedule_id, date, context.now())
        .map_err(translate_persistence_error)?;
    Ok(LedgerInfo::from(&entry))
}

/// Forces the status of one sailing.
///
/// # Errors
///
/// Returns an error if the actor is not staff on the route, the status is
/// unknown or engine-managed (`FULL`), or the schedule does not run that day.
pub fn set_ledger_status(
    persistence: &mut Persistence,
    context: &ApiContext,
    schedule_id: i64,
    departure_date: &str,
    request: &SetStatusRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: &Cause,
) -> Result<LedgerInfo, ApiError> {
    authorize_schedule(
        persistence,
        schedule_id,
        "set_ledger_status",
        authenticated_actor,
    )?;
    let date: Date = parse_date("departure_date", departure_date)?;
    let status: LedgerStatus = parse_status(&request.status)?;
    let entry: LedgerEntry = persistence
        .set_ledger_status(
            schedule_id,
            date,
            status,
            parse_hold(request)?,
            &authenticated_actor.to_audit_actor(),
            cause,
            context.now(),
        )
        .map_err(translate_persistence_error)?;
    Ok(LedgerInfo::from(&entry))
}

/// Overrides the capacity of one sailing. Admin only.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or any class would drop
/// below what is already booked.
pub fn override_ledger_capacity(
    persistence: &mut Persistence,
    context: &ApiContext,
    schedule_id: i64,
    departure_date: &str,
    request: &OverrideCapacityRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: &Cause,
) -> Result<LedgerInfo, ApiError> {
    AuthorizationService::authorize_admin(authenticated_actor, "override_ledger_capacity")?;
    let date: Date = parse_date("departure_date", departure_date)?;
    let entry: LedgerEntry = persistence
        .override_ledger_capacity(
            schedule_id,
            date,
            request.capacity.into(),
            &authenticated_actor.to_audit_actor(),
            cause,
            context.now(),
        )
        .map_err(translate_persistence_error)?;
    Ok(LedgerInfo::from(&entry))
}

/// Reactivates every route, schedule and sailing whose hold has lapsed.
/// Admin only; the server also runs this on a timer.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the sweep fails.
pub fn sweep_expired_statuses(
    persistence: &mut Persistence,
    context: &ApiContext,
    authenticated_actor: &AuthenticatedActor,
) -> Result<SweepResponse, ApiError> {
    AuthorizationService::authorize_admin(authenticated_actor, "sweep_expired_statuses")?;
    let report = persistence
        .sweep_expired_statuses(context.now())
        .map_err(translate_persistence_error)?;
    Ok(SweepResponse::from(report))
}

// ============================================================================
// Reference data
// ============================================================================

/// Creates a route. Admin only.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or a field is blank.
pub fn create_route(
    persistence: &mut Persistence,
    request: &CreateRouteRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<RouteInfo, ApiError> {
    AuthorizationService::authorize_admin(authenticated_actor, "create_route")?;
    let route: Route = Route::new(&request.origin, &request.destination, request.fares.into())
        .map_err(translate_domain_error)?;
    let created: Route = persistence
        .create_route(&route)
        .map_err(translate_persistence_error)?;
    Ok(RouteInfo::from(&created))
}

/// # Errors
///
/// Returns an error if the route does not exist.
pub fn get_route(persistence: &mut Persistence, route_id: i64) -> Result<RouteInfo, ApiError> {
    let route: Route = persistence
        .get_route(route_id)
        .map_err(translate_persistence_error)?;
    Ok(RouteInfo::from(&route))
}

/// # Errors
///
/// Returns an error if the query fails.
pub fn list_routes(persistence: &mut Persistence) -> Result<ListRoutesResponse, ApiError> {
    let routes: Vec<Route> = persistence
        .list_routes()
        .map_err(translate_persistence_error)?;
    Ok(ListRoutesResponse {
        routes: routes.iter().map(RouteInfo::from).collect(),
    })
}

/// Forces a route's status.
///
/// # Errors
///
/// Returns an error if the actor is not staff on the route or the status
/// is unknown.
pub fn set_route_status(
    persistence: &mut Persistence,
    context: &ApiContext,
    route_id: i64,
    request: &SetStatusRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: &Cause,
) -> Result<RouteInfo, ApiError> {
    AuthorizationService::authorize_route(authenticated_actor, "set_route_status", route_id)?;
    let status: RouteStatus = parse_status(&request.status)?;
    let route: Route = persistence
        .set_route_status(
            route_id,
            status,
            parse_hold(request)?,
            &authenticated_actor.to_audit_actor(),
            cause,
            context.now(),
        )
        .map_err(translate_persistence_error)?;
    Ok(RouteInfo::from(&route))
}

/// Registers a ferry. Admin only.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the name is blank.
pub fn create_ferry(
    persistence: &mut Persistence,
    request: &CreateFerryRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<FerryInfo, ApiError> {
    AuthorizationService::authorize_admin(authenticated_actor, "create_ferry")?;
    require_text("name", &request.name)?;
    let ferry = Ferry {
        ferry_id: None,
        name: request.name.trim().to_string(),
        capacity: request.capacity.into(),
    };
    let created: Ferry = persistence
        .create_ferry(&ferry)
        .map_err(translate_persistence_error)?;
    Ok(FerryInfo::from(&created))
}

/// Creates an ACTIVE schedule. Admin only.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin, a time or the operating
/// days are malformed, or the route or ferry does not exist.
pub fn create_schedule(
    persistence: &mut Persistence,
    request: &CreateScheduleRequest,
    authenticated_actor: &AuthenticatedActor,
) -> Result<ScheduleInfo, ApiError> {
    AuthorizationService::authorize_admin(authenticated_actor, "create_schedule")?;
    let schedule = Schedule {
        schedule_id: None,
        route_id: request.route_id,
        ferry_id: request.ferry_id,
        departure_time: parse_time("departure_time", &request.departure_time)?,
        arrival_time: parse_time("arrival_time", &request.arrival_time)?,
        operating_days: OperatingDays::new(&request.operating_days)
            .map_err(translate_domain_error)?,
        status: ScheduleStatus::Active,
        hold: StatusHold::default(),
    };
    let created: Schedule = persistence
        .create_schedule(&schedule)
        .map_err(translate_persistence_error)?;
    Ok(ScheduleInfo::from(&created))
}

/// # Errors
///
/// Returns an error if the schedule does not exist.
pub fn get_schedule(
    persistence: &mut Persistence,
    schedule_id: i64,
) -> Result<ScheduleInfo, ApiError> {
    let schedule: Schedule = persistence
        .get_schedule(schedule_id)
        .map_err(translate_persistence_error)?;
    Ok(ScheduleInfo::from(&schedule))
}

/// Forces a schedule's status, cascading to its sailings.
///
/// # Errors
///
/// Returns an error if the actor is not staff on the schedule's route or
/// the status is unknown.
pub fn set_schedule_status(
    persistence: &mut Persistence,
    context: &ApiContext,
    schedule_id: i64,
    request: &SetStatusRequest,
    authenticated_actor: &AuthenticatedActor,
    cause: &Cause,
) -> Result<ScheduleStatusResponse, ApiError> {
    authorize_schedule(
        persistence,
        schedule_id,
        "set_schedule_status",
        authenticated_actor,
    )?;
    let status: ScheduleStatus = parse_status(&request.status)?;
    let update = persistence
        .set_schedule_status(
            schedule_id,
            status,
            parse_hold(request)?,
            &authenticated_actor.to_audit_actor(),
            cause,
            context.now(),
        )
        .map_err(translate_persistence_error)?;
    Ok(ScheduleStatusResponse {
        schedule: ScheduleInfo::from(&update.schedule),
        affected_entries: update.affected_entries.iter().map(LedgerInfo::from).collect(),
    })
}

/// Lists general audit events, optionally for one entity. Admin only.
///
/// # Errors
///
/// Returns an error if the actor is not an Admin or the query fails.
pub fn list_audit_events(
    persistence: &mut Persistence,
    entity_type: Option<&str>,
    entity_id: Option<i64>,
    authenticated_actor: &AuthenticatedActor,
) -> Result<ListAuditEventsResponse, ApiError> {
    AuthorizationService::authorize_admin(authenticated_actor, "list_audit_events")?;
    let events = persistence
        .list_audit_events(entity_type, entity_id)
        .map_err(translate_persistence_error)?;
    Ok(ListAuditEventsResponse {
        events: events.iter().map(AuditEventInfo::from).collect(),
    })
}
