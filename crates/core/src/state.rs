// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use ferry_book_audit::{AuditEvent, BookingLogEntry};
use ferry_book_domain::{
    Booking, LedgerEntry, Manifest, Passenger, Payment, PaymentStatus, Refund, RefundPolicyRule,
    ResourceCounts, Route, Schedule, Ticket, Vehicle, VehicleSpec,
};

/// A booking together with everything it owns.
///
/// Transitions operate on the whole aggregate so ticket, payment and
/// refund changes always move together with the booking status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingState {
    pub booking: Booking,
    pub tickets: Vec<Ticket>,
    pub vehicles: Vec<Vehicle>,
    /// Payment attempts, oldest first.
    pub payments: Vec<Payment>,
    pub refund: Option<Refund>,
}

impl BookingState {
    /// Capacity held by this booking, counted from its own tickets and
    /// vehicles.
    #[must_use]
    pub fn demand(&self) -> ResourceCounts {
        let mut demand = ResourceCounts {
            passengers: u32::try_from(self.tickets.len()).unwrap_or(u32::MAX),
            ..ResourceCounts::default()
        };
        for vehicle in &self.vehicles {
            demand.increment(vehicle.class.resource_class());
        }
        demand
    }

    /// The payment attempt still awaiting the provider, if any.
    pub fn pending_payment_mut(&mut self) -> Option<&mut Payment> {
        self.payments
            .iter_mut()
            .rev()
            .find(|p| p.status == PaymentStatus::Pending)
    }

    /// The most recent settled payment, if any.
    #[must_use]
    pub fn settled_payment(&self) -> Option<&Payment> {
        self.payments
            .iter()
            .rev()
            .find(|p| p.status == PaymentStatus::Success)
    }

    pub fn settled_payment_mut(&mut self) -> Option<&mut Payment> {
        self.payments
            .iter_mut()
            .rev()
            .find(|p| p.status == PaymentStatus::Success)
    }

    /// Rebuilds the manifest the booking was made with.
    #[must_use]
    pub fn manifest(&self) -> Manifest {
        let passengers = self
            .tickets
            .iter()
            .map(|t| Passenger {
                name: t.passenger_name.clone(),
                id_number: t.passenger_id_number.clone(),
            })
            .collect();

        let vehicles = self
            .vehicles
            .iter()
            .map(|v| VehicleSpec {
                class: v.class,
                license_plate: v.license_plate.clone(),
                driver: v.driver_ticket_code.as_ref().and_then(|code| {
                    self.tickets.iter().position(|t| &t.ticket_code == code)
                }),
            })
            .collect();

        Manifest {
            passengers,
            vehicles,
        }
    }
}

/// The result of a successful booking transition.
///
/// Transitions are atomic: the persistence layer writes the new state,
/// applies `capacity_release` to the ledger and appends `log_entry` in one
/// unit of work, or none of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The aggregate after the transition.
    pub new_state: BookingState,
    /// Capacity to hand back to the booking's ledger entry.
    pub capacity_release: Option<ResourceCounts>,
    /// The single log row for this transition.
    pub log_entry: BookingLogEntry,
}

/// A new booking, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingPlan {
    /// The aggregate to insert.
    pub state: BookingState,
    /// The ledger entry with the reservation applied.
    pub ledger: LedgerEntry,
    /// The creation log row.
    pub log_entry: BookingLogEntry,
}

/// A ledger entry change recorded in the general audit trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerTransition {
    pub new_entry: LedgerEntry,
    pub audit_event: AuditEvent,
}

/// A schedule status change and the ledger entries it cascaded to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleTransition {
    pub new_schedule: Schedule,
    /// Only the entries that actually changed.
    pub changed_entries: Vec<LedgerEntry>,
    pub audit_event: AuditEvent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTransition {
    pub new_route: Route,
    pub audit_event: AuditEvent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyTransition {
    pub rule: RefundPolicyRule,
    pub audit_event: AuditEvent,
}
