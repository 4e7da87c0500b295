// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API error contract and the translation of lower-layer errors into it.

use ferry_book::CoreError;
use ferry_book_domain::DomainError;
use ferry_book_persistence::PersistenceError;
use thiserror::Error;

use crate::payment_provider::PaymentProviderError;

/// Why an actor was turned away before reaching the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },
    /// The actor is known but lacks the role (or route) for `action`.
    #[error("Unauthorized: '{action}' requires {required_role}")]
    Unauthorized {
        action: String,
        required_role: String,
    },
}

/// Errors returned by every operation of the API layer.
///
/// The server maps each variant onto one HTTP status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed { reason: String },
    #[error("Unauthorized: '{action}' requires {required_role}")]
    Unauthorized {
        action: String,
        required_role: String,
    },
    /// A booking, capacity or refund rule refused the request. `rule` is a
    /// stable snake_case name clients can match on.
    #[error("Domain rule violation ({rule}): {message}")]
    DomainRuleViolation { rule: String, message: String },
    /// `field` names the offending request field.
    #[error("Invalid input for field '{field}': {message}")]
    InvalidInput { field: String, message: String },
    #[error("{resource_type} not found: {message}")]
    ResourceNotFound {
        resource_type: String,
        message: String,
    },
    /// Another writer kept the database busy through every retry.
    #[error("Concurrent update conflict: {message}")]
    ConcurrencyConflict { message: String },
    /// No provider is configured, or the configured one did not answer.
    #[error("Payment provider unavailable: {message}")]
    ProviderUnavailable { message: String },
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

impl From<PaymentProviderError> for ApiError {
    fn from(err: PaymentProviderError) -> Self {
        match err {
            PaymentProviderError::UnknownStatus(status) => Self::DomainRuleViolation {
                rule: String::from("provider_status"),
                message: format!("Provider reported an unknown status: {status}"),
            },
            other => Self::ProviderUnavailable {
                message: other.to_string(),
            },
        }
    }
}

fn violation(rule: &str, err: &DomainError) -> ApiError {
    ApiError::DomainRuleViolation {
        rule: rule.to_string(),
        message: err.to_string(),
    }
}

fn invalid(field: &str, err: &DomainError) -> ApiError {
    ApiError::InvalidInput {
        field: field.to_string(),
        message: err.to_string(),
    }
}

/// Translates a domain error into an API error.
///
/// Malformed values become `InvalidInput`; everything the rules refused
/// becomes a `DomainRuleViolation` named after the rule.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match &err {
        DomainError::InsufficientCapacity { .. } => violation("insufficient_capacity", &err),
        DomainError::ScheduleClosed { .. } => violation("schedule_closed", &err),
        DomainError::DayNotServed { .. } => violation("day_not_served", &err),
        DomainError::SailingDeparted { .. } => violation("sailing_departed", &err),
        DomainError::IllegalTransition { .. } => violation("illegal_transition", &err),
        DomainError::OutOfWindow { .. } => violation("check_in_window", &err),
        DomainError::AlreadyCheckedIn { .. } => violation("already_checked_in", &err),
        DomainError::BookingNotConfirmed { .. } => violation("booking_not_confirmed", &err),
        DomainError::TicketInactive { .. } => violation("ticket_inactive", &err),
        DomainError::RefundNotEligible { .. } => violation("refund_not_eligible", &err),
        DomainError::RefundAlreadyRequested { .. } => violation("single_refund", &err),
        DomainError::PaymentNotSettled { .. } => violation("payment_not_settled", &err),
        DomainError::CapacityBelowUsage { .. } => violation("capacity_below_usage", &err),
        DomainError::ReleaseExceedsUsage { .. } => violation("release_exceeds_usage", &err),
        DomainError::RouteMismatch { .. } => violation("same_route_reschedule", &err),
        DomainError::AmountOverflow => violation("amount_overflow", &err),
        DomainError::InvalidStatus { .. } => invalid("status", &err),
        DomainError::InvalidOperatingDays { .. } => invalid("operating_days", &err),
        DomainError::InvalidManifest { .. } => invalid("manifest", &err),
        DomainError::InvalidVehicleClass(_) => invalid("vehicle_class", &err),
        DomainError::InvalidRefundPolicy { .. } => invalid("refund_policy", &err),
        DomainError::InvalidProviderStatus(_) => invalid("provider_status", &err),
        DomainError::InvalidTimezone(_) => invalid("timezone", &err),
        DomainError::InvalidDateTime { .. } => invalid("date_time", &err),
        DomainError::EmptyField(field) => invalid(field, &err),
    }
}

/// Translates a core error into an API error.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::NotFound { resource, id } => ApiError::ResourceNotFound {
            resource_type: resource.to_string(),
            message: format!("{resource} '{id}' does not exist"),
        },
    }
}

/// Translates a persistence error into an API error.
///
/// Storage failures are reported as `Internal` without leaking SQL.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::Rejected(core_err) => translate_core_error(core_err),
        PersistenceError::NotFound(message) => ApiError::ResourceNotFound {
            resource_type: String::from("Record"),
            message,
        },
        PersistenceError::ConcurrencyConflict(message) => ApiError::ConcurrencyConflict { message },
        other => ApiError::Internal {
            message: match other {
                PersistenceError::CorruptRow { table, .. } => {
                    format!("stored {table} data could not be read")
                }
                _ => String::from("storage failure"),
            },
        },
    }
}
