// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Refund policy evaluation and refund lifecycle.
//!
//! The policy is a table of tiers keyed by minimum whole days before
//! departure. The applicable tier is the active one with the largest
//! threshold that is still `<=` the days remaining. Its percentage is
//! applied to the base amount and the result is clamped to the tier's
//! optional fee bounds.
//!
//! Evaluation only quotes an amount. Approval is a separate step on the
//! [`RefundStatus`] lifecycle.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use time::OffsetDateTime;

const SECONDS_PER_DAY: i64 = 86_400;

/// One tier of the refund policy table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundPolicyRule {
    /// Database identifier, `None` before first persistence.
    pub rule_id: Option<i64>,
    pub days_before_departure: u32,
    /// 0..=100
    pub refund_percentage: u8,
    pub min_fee: Option<i64>,
    pub max_fee: Option<i64>,
    pub active: bool,
}

impl RefundPolicyRule {
    /// Creates an active rule without fee bounds.
    #[must_use]
    pub const fn new(days_before_departure: u32, refund_percentage: u8) -> Self {
        Self {
            rule_id: None,
            days_before_departure,
            refund_percentage,
            min_fee: None,
            max_fee: None,
            active: true,
        }
    }

    #[must_use]
    pub const fn with_bounds(mut self, min_fee: Option<i64>, max_fee: Option<i64>) -> Self {
        self.min_fee = min_fee;
        self.max_fee = max_fee;
        self
    }

    /// Validates percentage and fee bounds.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidRefundPolicy` describing the first problem.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.refund_percentage > 100 {
            return Err(DomainError::InvalidRefundPolicy {
                reason: format!(
                    "refund percentage {} exceeds 100",
                    self.refund_percentage
                ),
            });
        }
        if self.min_fee.is_some_and(|fee| fee < 0) || self.max_fee.is_some_and(|fee| fee < 0) {
            return Err(DomainError::InvalidRefundPolicy {
                reason: String::from("fee bounds must not be negative"),
            });
        }
        if let (Some(min), Some(max)) = (self.min_fee, self.max_fee)
            && min > max
        {
            return Err(DomainError::InvalidRefundPolicy {
                reason: format!("min fee {min} exceeds max fee {max}"),
            });
        }
        Ok(())
    }

    /// Applies the tier to a base amount.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AmountOverflow` if the multiplication overflows.
    pub fn amount_for(&self, base_amount: i64) -> Result<i64, DomainError> {
        let raw = base_amount
            .checked_mul(i64::from(self.refund_percentage))
            .ok_or(DomainError::AmountOverflow)?
            / 100;

        let capped = self.max_fee.map_or(raw, |max| raw.min(max));
        Ok(self.min_fee.map_or(capped, |min| capped.max(min)))
    }
}

/// The evaluator's answer for one booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundQuote {
    pub eligible: bool,
    pub days_before: i64,
    pub percentage: u8,
    pub amount: i64,
    /// The tier that applied, if any.
    pub rule_id: Option<i64>,
}

impl RefundQuote {
    const fn ineligible(days_before: i64) -> Self {
        Self {
            eligible: false,
            days_before,
            percentage: 0,
            amount: 0,
            rule_id: None,
        }
    }
}

/// Whole days from `now` until `departure`, floored.
///
/// Negative once departure has passed.
#[must_use]
pub const fn days_before_departure(departure: OffsetDateTime, now: OffsetDateTime) -> i64 {
    let seconds = departure.unix_timestamp() - now.unix_timestamp();
    seconds.div_euclid(SECONDS_PER_DAY)
}

/// Quotes the refundable amount for a departure.
///
/// # Errors
///
/// Returns `DomainError::AmountOverflow` if tier arithmetic overflows.
pub fn evaluate_refund(
    rules: &[RefundPolicyRule],
    departure: OffsetDateTime,
    now: OffsetDateTime,
    base_amount: i64,
) -> Result<RefundQuote, DomainError> {
    let days_before = days_before_departure(departure, now);

    let tier = rules
        .iter()
        .filter(|rule| rule.active && i64::from(rule.days_before_departure) <= days_before)
        .max_by_key(|rule| rule.days_before_departure);

    let Some(tier) = tier else {
        return Ok(RefundQuote::ineligible(days_before));
    };

    Ok(RefundQuote {
        eligible: true,
        days_before,
        percentage: tier.refund_percentage,
        amount: tier.amount_for(base_amount)?,
        rule_id: tier.rule_id,
    })
}

/// Lifecycle status of a refund.
///
/// ```text
/// PENDING  -> APPROVED | REJECTED
/// APPROVED -> COMPLETED
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefundStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
}

impl RefundStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Completed => "COMPLETED",
        }
    }

    /// Validates a refund status change.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::IllegalTransition` outside the refund table.
    pub fn validate_transition(&self, target: Self) -> Result<(), DomainError> {
        if matches!(
            (self, target),
            (Self::Pending, Self::Approved | Self::Rejected) | (Self::Approved, Self::Completed)
        ) {
            Ok(())
        } else {
            Err(DomainError::IllegalTransition {
                entity: "refund",
                from: self.as_str().to_string(),
                to: target.as_str().to_string(),
            })
        }
    }
}

impl FromStr for RefundStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            "COMPLETED" => Ok(Self::Completed),
            _ => Err(DomainError::InvalidStatus {
                entity: "refund",
                value: s.to_string(),
            }),
        }
    }
}
