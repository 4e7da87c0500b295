// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use ferry_book_domain::{
    BankDetails, BookingStatus, CheckInRecord, LedgerStatus, Manifest, RefundQuote,
    ResourceCounts, StatusHold,
};

/// A request to create a booking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub user_id: String,
    pub schedule_id: i64,
    pub departure_date: time::Date,
    pub manifest: Manifest,
}

/// A command against an existing booking, as data only.
///
/// Commands are the only way to request booking state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Move the booking along the status table.
    Transition {
        /// The requested status.
        target: BookingStatus,
        /// Cancellation reason or free-text note.
        note: Option<String>,
    },
    /// Board one passenger.
    CheckIn {
        /// The ticket being checked in.
        ticket_code: String,
        /// Operator-side details.
        record: CheckInRecord,
        /// The current date in the operating timezone.
        today: time::Date,
    },
    /// Ask for a refund of the settled payment.
    ///
    /// The quote is computed by the caller from the active policy table and
    /// the departure instant.
    RequestRefund {
        quote: RefundQuote,
        reason: String,
        refund_method: Option<String>,
        bank_details: Option<BankDetails>,
    },
    /// Approve the pending refund.
    ApproveRefund { note: Option<String> },
    /// Reject the pending refund.
    RejectRefund { note: Option<String> },
    /// Record that the provider paid out the approved refund.
    CompleteRefund { transaction_id: String },
    /// Retire this booking in favour of a replacement.
    ///
    /// The replacement itself is planned with
    /// [`crate::plan_rescheduled_booking`].
    Reschedule {
        /// Code of the replacement booking.
        new_booking_code: String,
    },
}

impl Command {
    /// Short name used in log notes and tracing.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Transition { .. } => "Transition",
            Self::CheckIn { .. } => "CheckIn",
            Self::RequestRefund { .. } => "RequestRefund",
            Self::ApproveRefund { .. } => "ApproveRefund",
            Self::RejectRefund { .. } => "RejectRefund",
            Self::CompleteRefund { .. } => "CompleteRefund",
            Self::Reschedule { .. } => "Reschedule",
        }
    }
}

/// An operator change to a ledger entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerCommand {
    /// Force a status, with optional reason and expiry.
    SetStatus {
        status: LedgerStatus,
        hold: StatusHold,
    },
    /// Replace the ceilings for this date.
    OverrideCapacity { capacity: ResourceCounts },
}
