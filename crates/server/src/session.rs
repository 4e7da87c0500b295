// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Actor and cause extraction at the server boundary.
//!
//! Identity is established upstream (gateway or identity provider). The
//! gateway forwards it in request headers, and these extractors turn the
//! headers into the API layer's `AuthenticatedActor` and audit `Cause`.
//!
//! | Header | Meaning |
//! |---|---|
//! | `x-actor-id` | The caller's identifier |
//! | `x-actor-role` | `user`, `operator` or `admin` |
//! | `x-actor-routes` | Comma-separated route ids an operator may act on |
//! | `x-cause-id` | Identifier of the reason for an administrative change |
//! | `x-cause-description` | Free-text description of that reason |

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use ferry_book_api::{AuthenticatedActor, Role, authenticate_stub};
use ferry_book_audit::Cause;
use tracing::{debug, warn};

use crate::AppState;

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";
pub const ACTOR_ROUTES_HEADER: &str = "x-actor-routes";
pub const CAUSE_ID_HEADER: &str = "x-cause-id";
pub const CAUSE_DESCRIPTION_HEADER: &str = "x-cause-description";

/// Extractor for the authenticated caller.
///
/// # Errors
///
/// Rejects with HTTP 401 if the identity headers are missing, not valid
/// UTF-8, name an unknown role, or carry malformed route ids.
pub struct SessionActor(pub AuthenticatedActor);

impl FromRequestParts<AppState> for SessionActor {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let actor_id: &str = required_header(parts, ACTOR_ID_HEADER)?;
        let role: Role = parse_role(required_header(parts, ACTOR_ROLE_HEADER)?)?;
        let routes: Vec<i64> = match optional_header(parts, ACTOR_ROUTES_HEADER)? {
            Some(value) => parse_routes(value)?,
            None => Vec::new(),
        };

        let actor: AuthenticatedActor = authenticate_stub(actor_id.to_string(), role)
            .map_err(|e| {
                warn!(error = %e, "Actor authentication failed");
                SessionError::AuthenticationFailed(e.to_string())
            })?
            .with_routes(routes);

        debug!(actor_id = %actor.id, role = actor.role.as_str(), "Actor identified");
        Ok(Self(actor))
    }
}

/// Extractor for the cause attached to an administrative change.
///
/// # Errors
///
/// Rejects with HTTP 400 if either cause header is missing or blank.
pub struct RequestCause(pub Cause);

impl FromRequestParts<AppState> for RequestCause {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let id: &str = required_cause(parts, CAUSE_ID_HEADER)?;
        let description: &str = required_cause(parts, CAUSE_DESCRIPTION_HEADER)?;
        Ok(Self(Cause::new(id.to_string(), description.to_string())))
    }
}

fn optional_header<'a>(
    parts: &'a Parts,
    name: &'static str,
) -> Result<Option<&'a str>, SessionError> {
    parts
        .headers
        .get(name)
        .map(|value| {
            value.to_str().map_err(|_| {
                warn!(header = name, "Header is not valid UTF-8");
                SessionError::InvalidHeader(name)
            })
        })
        .transpose()
}

fn required_header<'a>(parts: &'a Parts, name: &'static str) -> Result<&'a str, SessionError> {
    optional_header(parts, name)?.ok_or_else(|| {
        debug!(header = name, "Missing identity header");
        SessionError::MissingHeader(name)
    })
}

fn required_cause<'a>(parts: &'a Parts, name: &'static str) -> Result<&'a str, SessionError> {
    match optional_header(parts, name)? {
        Some(value) if !value.trim().is_empty() => Ok(value.trim()),
        _ => Err(SessionError::MissingCause(name)),
    }
}

fn parse_role(value: &str) -> Result<Role, SessionError> {
    match value.trim().to_lowercase().as_str() {
        "user" => Ok(Role::User),
        "operator" => Ok(Role::Operator),
        "admin" => Ok(Role::Admin),
        _ => Err(SessionError::InvalidRole(value.to_string())),
    }
}

fn parse_routes(value: &str) -> Result<Vec<i64>, SessionError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>()
                .map_err(|_| SessionError::InvalidHeader(ACTOR_ROUTES_HEADER))
        })
        .collect()
}

/// Extraction errors, converted to HTTP responses automatically.
#[derive(Debug)]
pub enum SessionError {
    /// An identity header is missing.
    MissingHeader(&'static str),
    /// A header is present but unreadable.
    InvalidHeader(&'static str),
    /// The role header names no known role.
    InvalidRole(String),
    /// The identity was rejected.
    AuthenticationFailed(String),
    /// A cause header is missing or blank.
    MissingCause(&'static str),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::MissingHeader(name) => (StatusCode::UNAUTHORIZED, format!("Missing {name} header")),
            Self::InvalidHeader(name) => (StatusCode::UNAUTHORIZED, format!("Invalid {name} header")),
            Self::InvalidRole(role) => (
                StatusCode::UNAUTHORIZED,
                format!("Invalid role: '{role}'. Must be 'user', 'operator' or 'admin'"),
            ),
            Self::AuthenticationFailed(reason) => (StatusCode::UNAUTHORIZED, reason),
            Self::MissingCause(name) => (
                StatusCode::BAD_REQUEST,
                format!("Administrative changes require the {name} header"),
            ),
        };

        crate::HttpError { status, message }.into_response()
    }
}
