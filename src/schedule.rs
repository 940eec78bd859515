//! Client-side views over appointment lists.
//!
//! The backend returns a doctor's appointments as one flat list; the
//! management screen splits it around the current instant and lets the
//! user narrow the past portion with optional filters. Both operations
//! are pure and keep the input order.

use chrono::{DateTime, FixedOffset, NaiveDate};
use tracing::warn;

use crate::dates::{self, parse_backend_date};
use crate::models::{Appointment, AppointmentStatus};

/// Result of splitting an appointment list around an instant.
///
/// Relative order of the input is preserved inside each bucket. Records
/// whose `fecha` does not parse land in `unparseable` (with a logged
/// warning) instead of being misfiled as past.
#[derive(Debug, Clone, Default)]
pub struct PartitionedAppointments {
    /// Strictly after the reference instant.
    pub upcoming: Vec<Appointment>,
    /// At or before the reference instant.
    pub past: Vec<Appointment>,
    pub unparseable: Vec<Appointment>,
}

impl PartitionedAppointments {
    pub fn total(&self) -> usize {
        self.upcoming.len() + self.past.len() + self.unparseable.len()
    }
}

/// Splits `appointments` into upcoming and past relative to `now`.
pub fn partition_by_date(
    appointments: Vec<Appointment>,
    now: DateTime<FixedOffset>,
) -> PartitionedAppointments {
    let mut partitioned = PartitionedAppointments::default();

    for appointment in appointments {
        match parse_backend_date(&appointment.date) {
            Ok(instant) if instant > now => partitioned.upcoming.push(appointment),
            Ok(_) => partitioned.past.push(appointment),
            Err(error) => {
                warn!(
                    appointment_id = appointment.id,
                    date = %appointment.date,
                    %error,
                    "skipping appointment with unparseable date"
                );
                partitioned.unparseable.push(appointment);
            }
        }
    }

    partitioned
}

/// Optional constraints for the appointment history view.
///
/// Absent fields impose no constraint; present fields are ANDed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub status: Option<AppointmentStatus>,
    pub specialty_id: Option<i64>,
}

impl HistoryFilter {
    pub fn is_empty(&self) -> bool {
        self.from.is_none()
            && self.to.is_none()
            && self.status.is_none()
            && self.specialty_id.is_none()
    }

    /// Whether `appointment` satisfies every present constraint.
    ///
    /// `from` binds at 00:00:00 and `to` at 23:59:59 local time, end of
    /// day inclusive. An appointment whose date cannot be parsed cannot
    /// satisfy a date bound.
    pub fn matches(&self, appointment: &Appointment) -> bool {
        if let Some(status) = self.status {
            if appointment.status != status {
                return false;
            }
        }
        if let Some(specialty_id) = self.specialty_id {
            if appointment.specialty_id() != Some(specialty_id) {
                return false;
            }
        }
        if self.from.is_some() || self.to.is_some() {
            let instant = match parse_backend_date(&appointment.date) {
                Ok(instant) => instant,
                Err(_) => return false,
            };
            if let Some(from) = self.from {
                if instant < dates::start_of_day(from) {
                    return false;
                }
            }
            if let Some(to) = self.to {
                if instant > dates::end_of_day(to) {
                    return false;
                }
            }
        }
        true
    }

    /// The subsequence of `appointments` satisfying the filter, in the
    /// original order. The input is left untouched.
    pub fn apply(&self, appointments: &[Appointment]) -> Vec<Appointment> {
        appointments
            .iter()
            .filter(|appointment| self.matches(appointment))
            .cloned()
            .collect()
    }
}
