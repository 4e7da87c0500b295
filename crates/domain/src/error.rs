// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::capacity::ResourceClass;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// One resource class does not have room for the requested amount.
    InsufficientCapacity {
        /// The first class that failed the check.
        class: ResourceClass,
        /// Units requested for that class.
        requested: u32,
        /// Units still available for that class.
        available: u32,
    },
    /// The ledger entry, schedule or route is not open for reservations.
    ScheduleClosed {
        /// Which record is closed ("ledger", "schedule" or "route").
        scope: &'static str,
        /// The blocking status.
        status: String,
        /// The operator-supplied reason, if any.
        reason: Option<String>,
    },
    /// The schedule does not operate on the requested weekday.
    DayNotServed {
        /// The requested departure date.
        date: time::Date,
        /// The weekday of that date.
        weekday: time::Weekday,
    },
    /// The sailing has already left.
    SailingDeparted {
        /// The requested departure date.
        departure_date: time::Date,
    },
    /// A status change not present in the entity's transition table.
    IllegalTransition {
        /// The entity kind ("booking", "payment", "refund", "ticket").
        entity: &'static str,
        /// Current status.
        from: String,
        /// Requested status.
        to: String,
    },
    /// Check-in attempted outside the day-before/day-of window.
    OutOfWindow {
        /// Departure date of the ticket's booking.
        departure_date: time::Date,
        /// The current operating-timezone date.
        today: time::Date,
    },
    /// The ticket has already been checked in.
    AlreadyCheckedIn {
        /// The ticket code.
        ticket_code: String,
    },
    /// The parent booking is not in CONFIRMED status.
    BookingNotConfirmed {
        /// The booking's actual status.
        status: String,
    },
    /// The ticket is not ACTIVE.
    TicketInactive {
        /// The ticket code.
        ticket_code: String,
        /// The ticket's actual status.
        status: String,
    },
    /// An unknown status string for the given entity.
    InvalidStatus {
        /// The entity kind.
        entity: &'static str,
        /// The rejected value.
        value: String,
    },
    /// Operating days are empty or outside 1..=7.
    InvalidOperatingDays {
        /// Description of the problem.
        reason: String,
    },
    /// The passenger/vehicle manifest is malformed.
    InvalidManifest {
        /// Description of the problem.
        reason: String,
    },
    /// Unknown vehicle class name.
    InvalidVehicleClass(String),
    /// A refund policy rule is malformed.
    InvalidRefundPolicy {
        /// Description of the problem.
        reason: String,
    },
    /// No active refund tier applies.
    RefundNotEligible {
        /// Whole days remaining before departure (negative once departed).
        days_before: i64,
    },
    /// A refund already exists for the booking.
    RefundAlreadyRequested {
        /// The booking identifier.
        booking_id: i64,
    },
    /// The booking has no settled payment to refund.
    PaymentNotSettled {
        /// The payment's actual status, or "none".
        status: String,
    },
    /// A capacity override would drop below what is already booked.
    CapacityBelowUsage {
        /// The offending class.
        class: ResourceClass,
        /// The proposed ceiling.
        capacity: u32,
        /// Units already in use.
        usage: u32,
    },
    /// A release would drive usage below zero.
    ReleaseExceedsUsage {
        /// The offending class.
        class: ResourceClass,
        /// Units being released.
        release: u32,
        /// Units currently in use.
        usage: u32,
    },
    /// Reschedule target is on a different route.
    RouteMismatch {
        /// Route of the original booking.
        from_route: i64,
        /// Route of the requested schedule.
        to_route: i64,
    },
    /// Unknown provider status vocabulary.
    InvalidProviderStatus(String),
    /// Unknown IANA timezone name.
    InvalidTimezone(String),
    /// A local date/time could not be resolved.
    InvalidDateTime {
        /// Description of the problem.
        reason: String,
    },
    /// Fare or refund arithmetic overflowed.
    AmountOverflow,
    /// A required text field is empty.
    EmptyField(&'static str),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InsufficientCapacity {
                class,
                requested,
                available,
            } => {
                write!(
                    f,
                    "Insufficient {} capacity: requested {requested}, available {available}",
                    class.as_str()
                )
            }
            Self::ScheduleClosed {
                scope,
                status,
                reason,
            } => match reason {
                Some(reason) => write!(f, "The {scope} is {status}: {reason}"),
                None => write!(f, "The {scope} is {status}"),
            },
            Self::DayNotServed { date, weekday } => {
                write!(f, "The schedule does not operate on {weekday} ({date})")
            }
            Self::SailingDeparted { departure_date } => {
                write!(f, "The sailing on {departure_date} has already departed")
            }
            Self::IllegalTransition { entity, from, to } => {
                write!(f, "Illegal {entity} transition from {from} to {to}")
            }
            Self::OutOfWindow {
                departure_date,
                today,
            } => {
                write!(
                    f,
                    "Check-in for departure on {departure_date} is not open on {today}"
                )
            }
            Self::AlreadyCheckedIn { ticket_code } => {
                write!(f, "Ticket {ticket_code} is already checked in")
            }
            Self::BookingNotConfirmed { status } => {
                write!(f, "Booking is {status}, not CONFIRMED")
            }
            Self::TicketInactive {
                ticket_code,
                status,
            } => {
                write!(f, "Ticket {ticket_code} is {status}, not ACTIVE")
            }
            Self::InvalidStatus { entity, value } => {
                write!(f, "Invalid {entity} status: {value}")
            }
            Self::InvalidOperatingDays { reason } => {
                write!(f, "Invalid operating days: {reason}")
            }
            Self::InvalidManifest { reason } => write!(f, "Invalid manifest: {reason}"),
            Self::InvalidVehicleClass(value) => write!(f, "Invalid vehicle class: {value}"),
            Self::InvalidRefundPolicy { reason } => {
                write!(f, "Invalid refund policy: {reason}")
            }
            Self::RefundNotEligible { days_before } => {
                write!(
                    f,
                    "No refund tier applies with {days_before} day(s) before departure"
                )
            }
            Self::RefundAlreadyRequested { booking_id } => {
                write!(f, "A refund already exists for booking {booking_id}")
            }
            Self::PaymentNotSettled { status } => {
                write!(f, "Booking has no settled payment (payment status: {status})")
            }
            Self::CapacityBelowUsage {
                class,
                capacity,
                usage,
            } => {
                write!(
                    f,
                    "Cannot set {} capacity to {capacity}: {usage} already booked",
                    class.as_str()
                )
            }
            Self::ReleaseExceedsUsage {
                class,
                release,
                usage,
            } => {
                write!(
                    f,
                    "Cannot release {release} {} unit(s): only {usage} in use",
                    class.as_str()
                )
            }
            Self::RouteMismatch {
                from_route,
                to_route,
            } => {
                write!(
                    f,
                    "Cannot reschedule from route {from_route} to route {to_route}"
                )
            }
            Self::InvalidProviderStatus(value) => {
                write!(f, "Unrecognized payment provider status: {value}")
            }
            Self::InvalidTimezone(tz) => write!(f, "Invalid timezone: {tz}"),
            Self::InvalidDateTime { reason } => write!(f, "Invalid date/time: {reason}"),
            Self::AmountOverflow => write!(f, "Amount arithmetic overflowed"),
            Self::EmptyField(field) => write!(f, "Field '{field}' must not be empty"),
        }
    }
}

impl std::error::Error for DomainError {}
