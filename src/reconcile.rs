//! Linked update of an appointment's status and its slot's availability.
//!
//! The backend exposes the two writes as separate operations. Denying an
//! appointment must release its slot; confirming or re-pending it must
//! hold the slot. This module keeps the two requests in one agreed order
//! and surfaces partial failure instead of hiding it — the pair is not a
//! transaction, and a failure after the first write leaves the records
//! inconsistent until retried.

use thiserror::Error;
use tracing::debug;

use crate::api::ApiError;
use crate::models::AppointmentStatus;

/// The two backend writes the reconciliation needs.
///
/// `ApiClient` implements this against the live service; tests substitute
/// a recording mock.
pub trait StatusBackend {
    fn set_appointment_status(
        &self,
        appointment_id: i64,
        status: AppointmentStatus,
    ) -> Result<(), ApiError>;

    fn set_slot_availability(&self, slot_id: i64, available: bool) -> Result<(), ApiError>;
}

#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The status write failed; nothing was changed.
    #[error("could not update appointment {appointment_id}: {source}")]
    StatusUpdate {
        appointment_id: i64,
        #[source]
        source: ApiError,
    },
    /// The status write succeeded but the slot write failed: the
    /// appointment already carries `status` while the slot still shows
    /// the old availability. Re-running the same change repairs it.
    #[error(
        "appointment {appointment_id} is now '{status}' but slot {slot_id} could not be updated: {source}"
    )]
    SlotUpdate {
        appointment_id: i64,
        status: AppointmentStatus,
        slot_id: i64,
        #[source]
        source: ApiError,
    },
}

/// Availability the linked slot must carry for an appointment in `status`.
///
/// `negada` releases the slot; `pendiente` and `confirmada` hold it.
pub fn slot_availability_for(status: AppointmentStatus) -> bool {
    matches!(status, AppointmentStatus::Denied)
}

/// Applies a status change and reconciles the linked slot.
///
/// Updates the appointment first, then patches the slot when a slot id is
/// present. Both writes set absolute state, so re-applying the same
/// change is a no-op.
pub fn apply_status_change(
    backend: &impl StatusBackend,
    appointment_id: i64,
    status: AppointmentStatus,
    slot_id: Option<i64>,
) -> Result<(), ReconcileError> {
    backend
        .set_appointment_status(appointment_id, status)
        .map_err(|source| ReconcileError::StatusUpdate {
            appointment_id,
            source,
        })?;

    if let Some(slot_id) = slot_id {
        let available = slot_availability_for(status);
        backend
            .set_slot_availability(slot_id, available)
            .map_err(|source| ReconcileError::SlotUpdate {
                appointment_id,
                status,
                slot_id,
                source,
            })?;
        debug!(appointment_id, slot_id, available, "slot availability reconciled");
    }

    Ok(())
}
