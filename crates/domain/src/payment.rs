// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Payment status and the provider's status vocabulary.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Status of a payment attempt.
///
/// ```text
/// PENDING -> SUCCESS | FAILED
/// SUCCESS -> REFUNDED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
    Refunded,
}

impl PaymentStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
            Self::Refunded => "REFUNDED",
        }
    }

    /// Validates a payment status change.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::IllegalTransition` outside the payment table.
    pub fn validate_transition(&self, target: Self) -> Result<(), DomainError> {
        if matches!(
            (self, target),
            (Self::Pending, Self::Success | Self::Failed) | (Self::Success, Self::Refunded)
        ) {
            Ok(())
        } else {
            Err(DomainError::IllegalTransition {
                entity: "payment",
                from: self.as_str().to_string(),
                to: target.as_str().to_string(),
            })
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "SUCCESS" => Ok(Self::Success),
            "FAILED" => Ok(Self::Failed),
            "REFUNDED" => Ok(Self::Refunded),
            _ => Err(DomainError::InvalidStatus {
                entity: "payment",
                value: s.to_string(),
            }),
        }
    }
}

/// A payment provider's report about a booking's payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderStatus {
    Success,
    Pending,
    Failure,
    Expired,
}

impl ProviderStatus {
    /// Parses the provider's vocabulary, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidProviderStatus` for unknown words.
    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "settlement" | "capture" | "success" => Ok(Self::Success),
            "pending" => Ok(Self::Pending),
            "deny" | "cancel" | "failure" | "failed" => Ok(Self::Failure),
            "expire" | "expired" => Ok(Self::Expired),
            _ => Err(DomainError::InvalidProviderStatus(s.to_string())),
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Pending => "pending",
            Self::Failure => "failure",
            Self::Expired => "expired",
        }
    }
}
