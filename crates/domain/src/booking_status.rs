// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Booking and ticket status lifecycles.
//!
//! The booking table is intentionally small:
//!
//! ```text
//! PENDING   -> CONFIRMED | CANCELLED
//! CONFIRMED -> COMPLETED | CANCELLED
//! ```
//!
//! `REFUNDED` and `RESCHEDULED` are markers reached only through the refund
//! and reschedule operations, never through [`BookingStatus::validate_transition`].

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle status of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    /// Created, capacity held, awaiting payment
    Pending,
    /// Paid
    Confirmed,
    /// Cancelled; capacity released
    Cancelled,
    /// Travelled (all tickets boarded or completed administratively)
    Completed,
    /// Cancelled and refunded
    Refunded,
    /// Moved to another booking
    Rescheduled,
}

impl BookingStatus {
    /// Returns the string representation of the status.
    ///
    /// This is used for persistence and API serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Cancelled => "CANCELLED",
            Self::Completed => "COMPLETED",
            Self::Refunded => "REFUNDED",
            Self::Rescheduled => "RESCHEDULED",
        }
    }

    fn parse_str(s: &str) -> Result<Self, DomainError> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "CONFIRMED" => Ok(Self::Confirmed),
            "CANCELLED" => Ok(Self::Cancelled),
            "COMPLETED" => Ok(Self::Completed),
            "REFUNDED" => Ok(Self::Refunded),
            "RESCHEDULED" => Ok(Self::Rescheduled),
            _ => Err(DomainError::InvalidStatus {
                entity: "booking",
                value: s.to_string(),
            }),
        }
    }

    /// Returns true while the booking still holds ledger capacity.
    #[must_use]
    pub const fn holds_capacity(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    /// Validates a transition against the booking table.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::IllegalTransition` for any pair outside the table.
    pub fn validate_transition(&self, target: Self) -> Result<(), DomainError> {
        let valid = matches!(
            (self, target),
            (Self::Pending, Self::Confirmed | Self::Cancelled)
                | (Self::Confirmed, Self::Completed | Self::Cancelled)
        );

        if valid {
            Ok(())
        } else {
            Err(DomainError::IllegalTransition {
                entity: "booking",
                from: self.as_str().to_string(),
                to: target.as_str().to_string(),
            })
        }
    }
}

impl FromStr for BookingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a single passenger ticket.
///
/// `checked_in` on the ticket record is tracked separately: a booking
/// completed by check-in leaves its tickets ACTIVE with `checked_in = true`,
/// while administrative completion marks them USED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TicketStatus {
    Active,
    Used,
    Cancelled,
}

impl TicketStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Used => "USED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl FromStr for TicketStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(Self::Active),
            "USED" => Ok(Self::Used),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(DomainError::InvalidStatus {
                entity: "ticket",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
