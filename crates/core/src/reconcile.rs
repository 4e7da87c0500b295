// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::apply::apply;
use crate::command::Command;
use crate::error::CoreError;
use crate::state::{BookingState, TransitionResult};
use ferry_book_audit::Actor;
use ferry_book_domain::{BookingStatus, ProviderStatus};
use time::OffsetDateTime;

/// Maps a provider report onto the booking.
///
/// Only a PENDING booking reacts. A report for a booking that has already
/// left PENDING returns `Ok(None)` so at-least-once delivery never applies
/// a change twice. A provider `pending` report is also a no-op.
///
/// # Errors
///
/// Returns an error only if the resulting transition is rejected.
pub fn reconcile_payment(
    state: &BookingState,
    provider_status: ProviderStatus,
    transaction_id: Option<String>,
    payment_method: Option<String>,
    now: OffsetDateTime,
) -> Result<Option<TransitionResult>, CoreError> {
    if state.booking.status != BookingStatus::Pending {
        return Ok(None);
    }

    let (target, note) = match provider_status {
        ProviderStatus::Pending => return Ok(None),
        ProviderStatus::Success => (
            BookingStatus::Confirmed,
            match &transaction_id {
                Some(tx) => format!("Payment settled ({tx})"),
                None => String::from("Payment settled"),
            },
        ),
        ProviderStatus::Failure => (BookingStatus::Cancelled, String::from("payment failed")),
        ProviderStatus::Expired => (BookingStatus::Cancelled, String::from("payment expired")),
    };

    let mut result = apply(
        state,
        Command::Transition {
            target,
            note: Some(note),
        },
        Actor::system(),
        now,
    )?;

    // The attempt just settled or failed is the last one; record the
    // provider's reference on it.
    if let Some(payment) = result.new_state.payments.last_mut() {
        if transaction_id.is_some() {
            payment.transaction_id = transaction_id;
        }
        if payment_method.is_some() {
            payment.payment_method = payment_method;
        }
    }

    Ok(Some(result))
}
