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
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod session;

use axum::{
    Json, Router,
    extract::{Path, Query, State as AxumState},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use clap::Parser;
use ferry_book::SystemClock;
use ferry_book_api::{
    ApiContext, ApiError, BookingLogResponse, BookingResponse, CheckInRequest,
    CompleteRefundRequest, CreateBookingRequest, CreateFerryRequest, CreateRouteRequest,
    CreateScheduleRequest, FerryInfo, LedgerInfo, ListAuditEventsResponse,
    ListPolicyRulesResponse, ListRoutesResponse, OverrideCapacityRequest, PaymentCallbackRequest,
    PaymentCallbackResponse, PolicyRuleInfo, PolicyRuleRequest, RefundDecisionRequest,
    RefundQuoteResponse, RequestRefundRequest, RescheduleRequest, RescheduleResponse, RouteInfo,
    ScheduleInfo, ScheduleStatusResponse, SetStatusRequest, SweepResponse,
    TransitionBookingRequest, ValidateTicketRequest, ValidateTicketResponse,
};
use ferry_book_domain::OperatingZone;
use ferry_book_persistence::{Persistence, SweepReport};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info};

use session::{RequestCause, SessionActor};

/// Ferry Book Server - HTTP server for the ferry booking engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Address to bind the server to
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// IANA timezone the ferries operate in. Check-in windows and refund
    /// deadlines are computed in this zone.
    #[arg(short, long, default_value = "Asia/Jakarta")]
    timezone: String,

    /// Seconds between sweeps that reactivate lapsed route, schedule and
    /// sailing closures
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    sweep_interval_secs: u64,
}

/// Application state shared across handlers.
///
/// The persistence layer is wrapped in a Mutex; every write already runs
/// in its own immediate transaction, so the lock only serialises use of
/// the single connection.
#[derive(Clone)]
struct AppState {
    /// The persistence layer.
    persistence: Arc<Mutex<Persistence>>,
    /// Clock, operating timezone and payment provider.
    context: ApiContext,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::DomainRuleViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::ConcurrencyConflict { .. } => StatusCode::CONFLICT,
            ApiError::ProviderUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct ListPolicyRulesQuery {
    /// Only return tiers that are currently applied.
    #[serde(default)]
    active_only: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct ListAuditEventsQuery {
    /// Restrict to one entity type, e.g. "route" or "ledger".
    entity_type: Option<String>,
    /// Restrict to one entity id.
    entity_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct HealthResponse {
    status: String,
    timezone: String,
}

// ============================================================================
// Bookings
// ============================================================================

/// Handler for POST `/bookings`.
async fn handle_create_booking(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Json(req): Json<CreateBookingRequest>,
) -> Result<Json<BookingResponse>, HttpError> {
    info!(
        actor_id = %actor.id,
        schedule_id = req.schedule_id,
        departure_date = %req.departure_date,
        passengers = req.passengers.len(),
        vehicles = req.vehicles.len(),
        "Handling create_booking request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: BookingResponse =
        ferry_book_api::create_booking(&mut persistence, &app_state.context, &req, &actor)?;
    drop(persistence);

    info!(
        booking_code = %response.booking.booking_code,
        total_amount = response.booking.total_amount,
        "Created booking"
    );
    Ok(Json(response))
}

/// Handler for GET `/bookings/{booking_id}`.
async fn handle_get_booking(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(booking_id): Path<i64>,
) -> Result<Json<BookingResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response = ferry_book_api::get_booking(&mut persistence, booking_id, &actor)?;
    Ok(Json(response))
}

/// Handler for GET `/bookings/code/{booking_code}`.
async fn handle_get_booking_by_code(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(booking_code): Path<String>,
) -> Result<Json<BookingResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response = ferry_book_api::get_booking_by_code(&mut persistence, &booking_code, &actor)?;
    Ok(Json(response))
}

/// Handler for GET `/bookings/{booking_id}/log`.
async fn handle_get_booking_log(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(booking_id): Path<i64>,
) -> Result<Json<BookingLogResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response = ferry_book_api::get_booking_log(&mut persistence, booking_id, &actor)?;
    Ok(Json(response))
}

/// Handler for POST `/bookings/{booking_id}/transition`.
async fn handle_transition_booking(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(booking_id): Path<i64>,
    Json(req): Json<TransitionBookingRequest>,
) -> Result<Json<BookingResponse>, HttpError> {
    info!(
        actor_id = %actor.id,
        booking_id,
        target_status = %req.target_status,
        "Handling transition_booking request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response = ferry_book_api::transition_booking(
        &mut persistence,
        &app_state.context,
        booking_id,
        &req,
        &actor,
    )?;
    Ok(Json(response))
}

/// Handler for POST `/bookings/{booking_id}/reschedule`.
async fn handle_reschedule_booking(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(booking_id): Path<i64>,
    Json(req): Json<RescheduleRequest>,
) -> Result<Json<RescheduleResponse>, HttpError> {
    info!(
        actor_id = %actor.id,
        booking_id,
        schedule_id = req.schedule_id,
        departure_date = %req.departure_date,
        "Handling reschedule_booking request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response = ferry_book_api::reschedule_booking(
        &mut persistence,
        &app_state.context,
        booking_id,
        &req,
        &actor,
    )?;
    Ok(Json(response))
}

// ============================================================================
// Payments
// ============================================================================

/// Handler for POST `/payments/callback`.
///
/// Called by the payment provider, which carries no actor identity.
async fn handle_payment_callback(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<PaymentCallbackRequest>,
) -> Result<Json<PaymentCallbackResponse>, HttpError> {
    info!(
        booking_code = %req.booking_code,
        provider_status = %req.provider_status,
        "Handling payment callback"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response = ferry_book_api::payment_callback(&mut persistence, &app_state.context, &req)?;
    Ok(Json(response))
}

/// Handler for POST `/bookings/{booking_id}/payment-check`.
async fn handle_manual_status_check(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(booking_id): Path<i64>,
) -> Result<Json<PaymentCallbackResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response = ferry_book_api::manual_status_check(
        &mut persistence,
        &app_state.context,
        booking_id,
        &actor,
    )?;
    Ok(Json(response))
}

// ============================================================================
// Check-in
// ============================================================================

/// Handler for POST `/tickets/validate`.
async fn handle_validate_ticket(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Json(req): Json<ValidateTicketRequest>,
) -> Result<Json<ValidateTicketResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response =
        ferry_book_api::validate_ticket(&mut persistence, &app_state.context, &req, &actor)?;
    Ok(Json(response))
}

/// Handler for POST `/tickets/check-in`.
async fn handle_check_in(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Json(req): Json<CheckInRequest>,
) -> Result<Json<BookingResponse>, HttpError> {
    info!(
        actor_id = %actor.id,
        ticket_code = %req.ticket_code,
        "Handling check_in request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response = ferry_book_api::check_in(&mut persistence, &app_state.context, &req, &actor)?;
    Ok(Json(response))
}

// ============================================================================
// Refunds
// ============================================================================

/// Handler for GET `/bookings/{booking_id}/refund/quote`.
async fn handle_quote_refund(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(booking_id): Path<i64>,
) -> Result<Json<RefundQuoteResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response =
        ferry_book_api::quote_refund(&mut persistence, &app_state.context, booking_id, &actor)?;
    Ok(Json(response))
}

/// Handler for POST `/bookings/{booking_id}/refund`.
async fn handle_request_refund(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(booking_id): Path<i64>,
    Json(req): Json<RequestRefundRequest>,
) -> Result<Json<BookingResponse>, HttpError> {
    info!(actor_id = %actor.id, booking_id, "Handling request_refund request");

    let mut persistence = app_state.persistence.lock().await;
    let response = ferry_book_api::request_refund(
        &mut persistence,
        &app_state.context,
        booking_id,
        &req,
        &actor,
    )?;
    Ok(Json(response))
}

/// Handler for POST `/bookings/{booking_id}/refund/approve`.
async fn handle_approve_refund(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(booking_id): Path<i64>,
    Json(req): Json<RefundDecisionRequest>,
) -> Result<Json<BookingResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response = ferry_book_api::approve_refund(
        &mut persistence,
        &app_state.context,
        booking_id,
        &req,
        &actor,
    )?;
    Ok(Json(response))
}

/// Handler for POST `/bookings/{booking_id}/refund/reject`.
async fn handle_reject_refund(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(booking_id): Path<i64>,
    Json(req): Json<RefundDecisionRequest>,
) -> Result<Json<BookingResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response = ferry_book_api::reject_refund(
        &mut persistence,
        &app_state.context,
        booking_id,
        &req,
        &actor,
    )?;
    Ok(Json(response))
}

/// Handler for POST `/bookings/{booking_id}/refund/complete`.
async fn handle_complete_refund(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path(booking_id): Path<i64>,
    Json(req): Json<CompleteRefundRequest>,
) -> Result<Json<BookingResponse>, HttpError> {
    info!(
        actor_id = %actor.id,
        booking_id,
        transaction_id = %req.transaction_id,
        "Handling complete_refund request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response = ferry_book_api::complete_refund(
        &mut persistence,
        &app_state.context,
        booking_id,
        &req,
        &actor,
    )?;
    Ok(Json(response))
}

/// Handler for GET `/refund-policies`.
async fn handle_list_policy_rules(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<ListPolicyRulesQuery>,
) -> Result<Json<ListPolicyRulesResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response = ferry_book_api::list_policy_rules(&mut persistence, query.active_only)?;
    Ok(Json(response))
}

/// Handler for POST `/refund-policies`.
async fn handle_create_policy_rule(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    RequestCause(cause): RequestCause,
    Json(req): Json<PolicyRuleRequest>,
) -> Result<Json<PolicyRuleInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response = ferry_book_api::create_policy_rule(
        &mut persistence,
        &app_state.context,
        &req,
        &actor,
        &cause,
    )?;
    Ok(Json(response))
}

/// Handler for PUT `/refund-policies/{rule_id}`.
async fn handle_update_policy_rule(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    RequestCause(cause): RequestCause,
    Path(rule_id): Path<i64>,
    Json(req): Json<PolicyRuleRequest>,
) -> Result<Json<PolicyRuleInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response = ferry_book_api::update_policy_rule(
        &mut persistence,
        &app_state.context,
        rule_id,
        &req,
        &actor,
        &cause,
    )?;
    Ok(Json(response))
}

// ============================================================================
// Ledger
// ============================================================================

/// Handler for GET `/schedules/{schedule_id}/ledger/{departure_date}`.
async fn handle_get_ledger(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Path((schedule_id, departure_date)): Path<(i64, String)>,
) -> Result<Json<LedgerInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response = ferry_book_api::get_ledger(
        &mut persistence,
        &app_state.context,
        schedule_id,
        &departure_date,
        &actor,
    )?;
    Ok(Json(response))
}

/// Handler for POST `/schedules/{schedule_id}/ledger/{departure_date}/status`.
async fn handle_set_ledger_status(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    RequestCause(cause): RequestCause,
    Path((schedule_id, departure_date)): Path<(i64, String)>,
    Json(req): Json<SetStatusRequest>,
) -> Result<Json<LedgerInfo>, HttpError> {
    info!(
        actor_id = %actor.id,
        schedule_id,
        departure_date = %departure_date,
        status = %req.status,
        "Handling set_ledger_status request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response = ferry_book_api::set_ledger_status(
        &mut persistence,
        &app_state.context,
        schedule_id,
        &departure_date,
        &req,
        &actor,
        &cause,
    )?;
    Ok(Json(response))
}

/// Handler for POST `/schedules/{schedule_id}/ledger/{departure_date}/capacity`.
async fn handle_override_ledger_capacity(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    RequestCause(cause): RequestCause,
    Path((schedule_id, departure_date)): Path<(i64, String)>,
    Json(req): Json<OverrideCapacityRequest>,
) -> Result<Json<LedgerInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response = ferry_book_api::override_ledger_capacity(
        &mut persistence,
        &app_state.context,
        schedule_id,
        &departure_date,
        &req,
        &actor,
        &cause,
    )?;
    Ok(Json(response))
}

/// Handler for POST `/admin/sweep`.
async fn handle_sweep(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
) -> Result<Json<SweepResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response =
        ferry_book_api::sweep_expired_statuses(&mut persistence, &app_state.context, &actor)?;
    Ok(Json(response))
}

// ============================================================================
// Reference data
// ============================================================================

/// Handler for GET `/routes`.
async fn handle_list_routes(
    AxumState(app_state): AxumState<AppState>,
) -> Result<Json<ListRoutesResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response = ferry_book_api::list_routes(&mut persistence)?;
    Ok(Json(response))
}

/// Handler for POST `/routes`.
async fn handle_create_route(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Json(req): Json<CreateRouteRequest>,
) -> Result<Json<RouteInfo>, HttpError> {
    info!(
        actor_id = %actor.id,
        origin = %req.origin,
        destination = %req.destination,
        "Handling create_route request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response = ferry_book_api::create_route(&mut persistence, &req, &actor)?;
    Ok(Json(response))
}

/// Handler for GET `/routes/{route_id}`.
async fn handle_get_route(
    AxumState(app_state): AxumState<AppState>,
    Path(route_id): Path<i64>,
) -> Result<Json<RouteInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response = ferry_book_api::get_route(&mut persistence, route_id)?;
    Ok(Json(response))
}

/// Handler for POST `/routes/{route_id}/status`.
async fn handle_set_route_status(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    RequestCause(cause): RequestCause,
    Path(route_id): Path<i64>,
    Json(req): Json<SetStatusRequest>,
) -> Result<Json<RouteInfo>, HttpError> {
    info!(
        actor_id = %actor.id,
        route_id,
        status = %req.status,
        "Handling set_route_status request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response = ferry_book_api::set_route_status(
        &mut persistence,
        &app_state.context,
        route_id,
        &req,
        &actor,
        &cause,
    )?;
    Ok(Json(response))
}

/// Handler for POST `/ferries`.
async fn handle_create_ferry(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Json(req): Json<CreateFerryRequest>,
) -> Result<Json<FerryInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response = ferry_book_api::create_ferry(&mut persistence, &req, &actor)?;
    Ok(Json(response))
}

/// Handler for POST `/schedules`.
async fn handle_create_schedule(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Json(req): Json<CreateScheduleRequest>,
) -> Result<Json<ScheduleInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response = ferry_book_api::create_schedule(&mut persistence, &req, &actor)?;
    Ok(Json(response))
}

/// Handler for GET `/schedules/{schedule_id}`.
async fn handle_get_schedule(
    AxumState(app_state): AxumState<AppState>,
    Path(schedule_id): Path<i64>,
) -> Result<Json<ScheduleInfo>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response = ferry_book_api::get_schedule(&mut persistence, schedule_id)?;
    Ok(Json(response))
}

/// Handler for POST `/schedules/{schedule_id}/status`.
async fn handle_set_schedule_status(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    RequestCause(cause): RequestCause,
    Path(schedule_id): Path<i64>,
    Json(req): Json<SetStatusRequest>,
) -> Result<Json<ScheduleStatusResponse>, HttpError> {
    info!(
        actor_id = %actor.id,
        schedule_id,
        status = %req.status,
        "Handling set_schedule_status request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response = ferry_book_api::set_schedule_status(
        &mut persistence,
        &app_state.context,
        schedule_id,
        &req,
        &actor,
        &cause,
    )?;
    Ok(Json(response))
}

/// Handler for GET `/audit/events`.
async fn handle_list_audit_events(
    AxumState(app_state): AxumState<AppState>,
    SessionActor(actor): SessionActor,
    Query(query): Query<ListAuditEventsQuery>,
) -> Result<Json<ListAuditEventsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response = ferry_book_api::list_audit_events(
        &mut persistence,
        query.entity_type.as_deref(),
        query.entity_id,
        &actor,
    )?;
    Ok(Json(response))
}

/// Handler for GET `/health`.
async fn handle_health(AxumState(app_state): AxumState<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: String::from("ok"),
        timezone: app_state.context.zone().name().to_string(),
    })
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/bookings", post(handle_create_booking))
        .route("/bookings/{booking_id}", get(handle_get_booking))
        .route("/bookings/code/{booking_code}", get(handle_get_booking_by_code))
        .route("/bookings/{booking_id}/log", get(handle_get_booking_log))
        .route(
            "/bookings/{booking_id}/transition",
            post(handle_transition_booking),
        )
        .route(
            "/bookings/{booking_id}/reschedule",
            post(handle_reschedule_booking),
        )
        .route(
            "/bookings/{booking_id}/payment-check",
            post(handle_manual_status_check),
        )
        .route("/bookings/{booking_id}/refund", post(handle_request_refund))
        .route(
            "/bookings/{booking_id}/refund/quote",
            get(handle_quote_refund),
        )
        .route(
            "/bookings/{booking_id}/refund/approve",
            post(handle_approve_refund),
        )
        .route(
            "/bookings/{booking_id}/refund/reject",
            post(handle_reject_refund),
        )
        .route(
            "/bookings/{booking_id}/refund/complete",
            post(handle_complete_refund),
        )
        .route("/payments/callback", post(handle_payment_callback))
        .route("/tickets/validate", post(handle_validate_ticket))
        .route("/tickets/check-in", post(handle_check_in))
        .route(
            "/refund-policies",
            get(handle_list_policy_rules).post(handle_create_policy_rule),
        )
        .route("/refund-policies/{rule_id}", put(handle_update_policy_rule))
        .route(
            "/schedules/{schedule_id}/ledger/{departure_date}",
            get(handle_get_ledger),
        )
        .route(
            "/schedules/{schedule_id}/ledger/{departure_date}/status",
            post(handle_set_ledger_status),
        )
        .route(
            "/schedules/{schedule_id}/ledger/{departure_date}/capacity",
            post(handle_override_ledger_capacity),
        )
        .route("/admin/sweep", post(handle_sweep))
        .route("/routes", get(handle_list_routes).post(handle_create_route))
        .route("/routes/{route_id}", get(handle_get_route))
        .route("/routes/{route_id}/status", post(handle_set_route_status))
        .route("/ferries", post(handle_create_ferry))
        .route("/schedules", post(handle_create_schedule))
        .route("/schedules/{schedule_id}", get(handle_get_schedule))
        .route(
            "/schedules/{schedule_id}/status",
            post(handle_set_schedule_status),
        )
        .route("/audit/events", get(handle_list_audit_events))
        .with_state(app_state)
}

/// Periodically reactivates closures whose expiry has passed.
///
/// Reads apply expiry lazily as well; this keeps stored statuses current
/// for sailings nobody is looking at.
async fn run_expiry_sweep(app_state: AppState, every: Duration) {
    let mut interval = tokio::time::interval(every);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        let mut persistence = app_state.persistence.lock().await;
        match persistence.sweep_expired_statuses(app_state.context.now()) {
            Ok(report) if report.is_empty() => {}
            Ok(report) => log_sweep(report),
            Err(e) => error!(error = %e, "Expiry sweep failed"),
        }
    }
}

fn log_sweep(report: SweepReport) {
    info!(
        routes = report.routes,
        schedules = report.schedules,
        ledger_entries = report.ledger_entries,
        "Reactivated expired closures"
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Ferry Book Server");

    let zone: OperatingZone = OperatingZone::parse(&args.timezone)?;
    info!(timezone = zone.name(), "Operating timezone");

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        context: ApiContext::new(Arc::new(SystemClock), zone),
    };

    tokio::spawn(run_expiry_sweep(
        app_state.clone(),
        Duration::from_secs(args.sweep_interval_secs),
    ));

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
