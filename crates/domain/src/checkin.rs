// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Check-in eligibility rules.
//!
//! A ticket can be checked in on the day before departure or the day of
//! departure, measured in the operating timezone.

use crate::booking_status::{BookingStatus, TicketStatus};
use crate::error::DomainError;

/// Rejects check-in unless `departure_date` is today or tomorrow.
///
/// # Errors
///
/// Returns `DomainError::OutOfWindow` outside the window.
pub fn validate_check_in_window(
    departure_date: time::Date,
    today: time::Date,
) -> Result<(), DomainError> {
    let in_window = departure_date == today || today.next_day() == Some(departure_date);

    if in_window {
        Ok(())
    } else {
        Err(DomainError::OutOfWindow {
            departure_date,
            today,
        })
    }
}

/// Checks ticket and booking state ahead of check-in.
///
/// # Errors
///
/// - `AlreadyCheckedIn` if the ticket was already boarded
/// - `TicketInactive` if the ticket is not ACTIVE
/// - `BookingNotConfirmed` if the parent booking is not CONFIRMED
pub fn validate_ticket_for_check_in(
    ticket_code: &str,
    ticket_status: TicketStatus,
    checked_in: bool,
    booking_status: BookingStatus,
) -> Result<(), DomainError> {
    if checked_in {
        return Err(DomainError::AlreadyCheckedIn {
            ticket_code: ticket_code.to_string(),
        });
    }
    if ticket_status != TicketStatus::Active {
        return Err(DomainError::TicketInactive {
            ticket_code: ticket_code.to_string(),
            status: ticket_status.as_str().to_string(),
        });
    }
    if booking_status != BookingStatus::Confirmed {
        return Err(DomainError::BookingNotConfirmed {
            status: booking_status.as_str().to_string(),
        });
    }
    Ok(())
}
