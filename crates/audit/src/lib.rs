// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Who changed what, and why.
//!
//! Booking changes are recorded as [`BookingLogEntry`] rows on the
//! booking's own timeline. Changes to routes, schedules, ferries, ledger
//! entries and refund policy are recorded as [`AuditEvent`]s. Both carry
//! an [`Actor`]; administrative events also carry a [`Cause`].

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use ferry_book_domain::{BookingStatus, DomainError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

/// The role an actor acted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActorType {
    /// A passenger acting on their own booking
    User,
    /// Port staff, limited to their permitted routes
    Operator,
    Admin,
    /// The engine itself (payment callbacks, expiry sweep)
    System,
}

impl ActorType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Operator => "OPERATOR",
            Self::Admin => "ADMIN",
            Self::System => "SYSTEM",
        }
    }
}

impl FromStr for ActorType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Self::User),
            "OPERATOR" => Ok(Self::Operator),
            "ADMIN" => Ok(Self::Admin),
            "SYSTEM" => Ok(Self::System),
            _ => Err(DomainError::InvalidStatus {
                entity: "actor type",
                value: s.to_string(),
            }),
        }
    }
}

/// The identity a change is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub actor_type: ActorType,
}

impl Actor {
    #[must_use]
    pub const fn new(id: String, actor_type: ActorType) -> Self {
        Self { id, actor_type }
    }

    /// The engine's own identity.
    #[must_use]
    pub fn system() -> Self {
        Self::new(String::from("system"), ActorType::System)
    }
}

/// The reason given for an administrative change, such as a weather
/// bulletin or a maintenance ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cause {
    /// Reference of the triggering request or bulletin.
    pub id: String,
    pub description: String,
}

impl Cause {
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// The operation that was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Operation name, e.g. "`SetLedgerStatus`".
    pub name: String,
    pub details: Option<String>,
}

impl Action {
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// A snapshot of the affected record, before or after a change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Comma-separated `key=value` pairs, or `none` when the record is absent.
    pub data: String,
}

impl StateSnapshot {
    #[must_use]
    pub const fn new(data: String) -> Self {
        Self { data }
    }
}

/// The record an audit event is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditScope {
    /// "ledger", "schedule", "route", "ferry" or "refund_policy".
    pub entity_type: String,
    pub entity_id: Option<i64>,
}

impl AuditScope {
    #[must_use]
    pub fn new(entity_type: &str, entity_id: Option<i64>) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            entity_id,
        }
    }
}

/// One immutable row of the general audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub actor: Actor,
    pub cause: Cause,
    pub action: Action,
    pub before: StateSnapshot,
    pub after: StateSnapshot,
    pub scope: AuditScope,
}

impl AuditEvent {
    #[must_use]
    pub const fn new(
        actor: Actor,
        cause: Cause,
        action: Action,
        before: StateSnapshot,
        after: StateSnapshot,
        scope: AuditScope,
    ) -> Self {
        Self {
            actor,
            cause,
            action,
            before,
            after,
            scope,
        }
    }
}

/// One append-only row of a booking's timeline.
///
/// Every operation that affects a booking produces exactly one entry, in
/// the same unit of work as the change itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingLogEntry {
    /// `None` only for the creation entry.
    pub previous_status: Option<BookingStatus>,
    pub new_status: BookingStatus,
    pub actor: Actor,
    pub note: Option<String>,
    pub ip_address: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub recorded_at: OffsetDateTime,
}

impl BookingLogEntry {
    #[must_use]
    pub const fn new(
        previous_status: Option<BookingStatus>,
        new_status: BookingStatus,
        actor: Actor,
        note: Option<String>,
        recorded_at: OffsetDateTime,
    ) -> Self {
        Self {
            previous_status,
            new_status,
            actor,
            note,
            ip_address: None,
            recorded_at,
        }
    }

    /// Attaches the caller's IP address.
    #[must_use]
    pub fn with_ip(mut self, ip_address: Option<String>) -> Self {
        self.ip_address = ip_address;
        self
    }
}
