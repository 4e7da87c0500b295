// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication and authorization types and services.
//!
//! Identity is supplied by an outside collaborator. This module only
//! decides whether an already-identified actor may perform an action.

use ferry_book_audit::{Actor, ActorType};
use ferry_book_domain::Booking;

use crate::error::AuthError;

/// Actor roles for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// A traveller. May create bookings for themselves and act on their
    /// own bookings only.
    User,
    /// Port staff. May validate and check in tickets, manage ledger
    /// statuses and act on bookings for the routes they are assigned to.
    Operator,
    /// Administrators with structural and corrective authority over every
    /// route, the refund policy and reference data.
    Admin,
}

impl Role {
    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Operator => "Operator",
            Self::Admin => "Admin",
        }
    }

    const fn actor_type(self) -> ActorType {
        match self {
            Self::User => ActorType::User,
            Self::Operator => ActorType::Operator,
            Self::Admin => ActorType::Admin,
        }
    }
}

/// An authenticated actor with an associated role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The role assigned to this actor.
    pub role: Role,
    /// Routes an operator may act on. Ignored for other roles.
    pub permitted_routes: Vec<i64>,
}

impl AuthenticatedActor {
    /// Creates a new authenticated actor with no route assignments.
    #[must_use]
    pub const fn new(id: String, role: Role) -> Self {
        Self {
            id,
            role,
            permitted_routes: Vec::new(),
        }
    }

    /// Assigns the routes an operator may act on.
    #[must_use]
    pub fn with_routes(mut self, routes: Vec<i64>) -> Self {
        self.permitted_routes = routes;
        self
    }

    /// Converts this authenticated actor into an audit actor.
    #[must_use]
    pub fn to_audit_actor(&self) -> Actor {
        Actor::new(self.id.clone(), self.role.actor_type())
    }

    /// The route filter to apply to searches.
    ///
    /// `None` means unrestricted. Users never search tickets, so only the
    /// operator case narrows anything.
    #[must_use]
    pub fn route_filter(&self) -> Option<&[i64]> {
        match self.role {
            Role::Operator => Some(&self.permitted_routes),
            Role::User | Role::Admin => None,
        }
    }
}

/// Stub authentication for callers that already carry a trusted identity.
///
/// # Errors
///
/// Returns `AuthError::AuthenticationFailed` if the identifier is blank.
pub fn authenticate_stub(actor_id: String, role: Role) -> Result<AuthenticatedActor, AuthError> {
    if actor_id.trim().is_empty() {
        return Err(AuthError::AuthenticationFailed {
            reason: String::from("Actor ID cannot be empty"),
        });
    }
    Ok(AuthenticatedActor::new(actor_id, role))
}

/// Authorization service for enforcing role- and route-based access control.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks that the actor holds one of `allowed`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthorized` naming the accepted roles.
    pub fn require_role(
        actor: &AuthenticatedActor,
        action: &str,
        allowed: &[Role],
    ) -> Result<(), AuthError> {
        if allowed.contains(&actor.role) {
            return Ok(());
        }
        let required_role: String = allowed
            .iter()
            .map(Role::as_str)
            .collect::<Vec<_>>()
            .join(" or ");
        Err(AuthError::Unauthorized {
            action: action.to_string(),
            required_role,
        })
    }

    /// Only Admin actors may pass.
    ///
    /// # Errors
    ///
    /// Returns an error if the actor is not an Admin.
    pub fn authorize_admin(actor: &AuthenticatedActor, action: &str) -> Result<(), AuthError> {
        Self::require_role(actor, action, &[Role::Admin])
    }

    /// Checks that the actor may act on a route.
    ///
    /// Admins may act on every route, operators on their assigned routes,
    /// users on none.
    ///
    /// # Errors
    ///
    /// Returns an error if the route is outside the actor's reach.
    pub fn authorize_route(
        actor: &AuthenticatedActor,
        action: &str,
        route_id: i64,
    ) -> Result<(), AuthError> {
        match actor.role {
            Role::Admin => Ok(()),
            Role::Operator if actor.permitted_routes.contains(&route_id) => Ok(()),
            Role::Operator => Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: format!("Operator assigned to route {route_id}"),
            }),
            Role::User => Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("Operator or Admin"),
            }),
        }
    }

    /// Checks that the actor may act on a booking.
    ///
    /// Users may only act on bookings they own.
    ///
    /// # Errors
    ///
    /// Returns an error if the booking belongs to someone else or lies on
    /// a route the operator is not assigned to.
    pub fn authorize_booking(
        actor: &AuthenticatedActor,
        action: &str,
        booking: &Booking,
    ) -> Result<(), AuthError> {
        match actor.role {
            Role::User if booking.user_id == actor.id => Ok(()),
            Role::User => Err(AuthError::Unauthorized {
                action: action.to_string(),
                required_role: String::from("booking owner"),
            }),
            Role::Operator | Role::Admin => Self::authorize_route(actor, action, booking.route_id),
        }
    }
}
