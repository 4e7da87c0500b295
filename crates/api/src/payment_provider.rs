// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Seam to the external payment provider.
//!
//! The provider pushes callbacks on its own; this trait covers the other
//! direction, where staff ask the provider for a booking's current status.

use ferry_book_domain::ProviderStatus;
use thiserror::Error;

/// Payment provider errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaymentProviderError {
    /// No provider is configured for this deployment.
    #[error("No payment provider is configured")]
    NotConfigured,

    /// The provider could not be reached or answered with an error.
    #[error("Payment provider request failed: {reason}")]
    Unavailable { reason: String },

    /// The provider has no transaction for the booking code.
    #[error("Payment provider has no transaction for {booking_code}")]
    UnknownBooking { booking_code: String },

    /// The provider answered with a status outside its documented vocabulary.
    #[error("Unrecognised provider status: {0}")]
    UnknownStatus(String),
}

/// What the provider reports for one booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderReport {
    /// The provider status, already mapped from provider vocabulary.
    pub status: ProviderStatus,
    /// The provider's transaction identifier, if one exists.
    pub transaction_id: Option<String>,
    /// The payment method the traveller chose, if known.
    pub payment_method: Option<String>,
}

impl ProviderReport {
    /// Builds a report from the provider's raw status word.
    ///
    /// # Errors
    ///
    /// Returns `PaymentProviderError::UnknownStatus` for unmapped words.
    pub fn from_raw(
        raw_status: &str,
        transaction_id: Option<String>,
        payment_method: Option<String>,
    ) -> Result<Self, PaymentProviderError> {
        let status: ProviderStatus = ProviderStatus::parse(raw_status)
            .map_err(|_| PaymentProviderError::UnknownStatus(raw_status.to_string()))?;
        Ok(Self {
            status,
            transaction_id,
            payment_method,
        })
    }
}

/// Queries a payment provider for the status of a booking's payment.
pub trait PaymentProvider: Send + Sync {
    /// Looks up the payment attached to `booking_code`.
    ///
    /// # Errors
    ///
    /// Returns a `PaymentProviderError` if the provider cannot answer.
    fn query_status(&self, booking_code: &str) -> Result<ProviderReport, PaymentProviderError>;
}
