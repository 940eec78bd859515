//! Data models for the appointment client.
//!
//! These types mirror the JSON exchanged with the AppMedica backend.
//! The wire format uses Spanish field names (`fecha`, `estado`,
//! `disponible`, ...); serde renames keep the Rust side readable while
//! the payloads stay bit-compatible.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lifecycle state of an appointment.
///
/// The backend recognizes exactly these three values. An appointment is
/// created `pendiente` by the patient and only moves to `confirmada` or
/// `negada` through doctor or administrator action; cancellation is a
/// deletion, not a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppointmentStatus {
    #[serde(rename = "pendiente")]
    Pending,
    #[serde(rename = "confirmada")]
    Confirmed,
    #[serde(rename = "negada")]
    Denied,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 3] = [
        AppointmentStatus::Pending,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Denied,
    ];

    /// The exact string the backend stores for this state.
    pub fn as_wire(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pendiente",
            AppointmentStatus::Confirmed => "confirmada",
            AppointmentStatus::Denied => "negada",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid appointment status '{0}'; must be one of: pendiente, confirmada, negada")]
pub struct ParseStatusError(String);

impl FromStr for AppointmentStatus {
    type Err = ParseStatusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "pendiente" => Ok(AppointmentStatus::Pending),
            "confirmada" => Ok(AppointmentStatus::Confirmed),
            "negada" => Ok(AppointmentStatus::Denied),
            _ => Err(ParseStatusError(value.to_string())),
        }
    }
}

/// A medical specialty offered by the clinic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specialty {
    pub id: i64,
    #[serde(rename = "nombreEspecialidad")]
    pub name: String,
}

/// A registered user: patient, doctor or administrator.
///
/// The backend returns the same denormalized shape for all three roles;
/// fields that a given role does not carry come back absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    /// Identity-provider subject, assigned at sign-in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cedula: Option<String>,
    #[serde(rename = "telefono", default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "direccion", default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(rename = "genero", default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(rename = "rol", default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(rename = "especialidad", default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<Specialty>,
}

/// Payload for registering a signed-in user with the backend.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub uid: String,
    #[serde(rename = "nombre")]
    pub name: String,
    pub email: String,
}

/// A bookable slot in a doctor's schedule (horario).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: i64,
    /// Raw backend timestamp; parse with [`crate::dates::parse_backend_date`].
    #[serde(rename = "fecha")]
    pub date: String,
    #[serde(rename = "disponible")]
    pub available: bool,
}

/// An appointment (cita) linking a patient, doctor, specialty and slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    /// Raw backend timestamp; parse with [`crate::dates::parse_backend_date`].
    #[serde(rename = "fecha")]
    pub date: String,
    #[serde(rename = "estado")]
    pub status: AppointmentStatus,
    #[serde(rename = "horario", default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<TimeSlot>,
    #[serde(rename = "paciente", default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<User>,
    #[serde(rename = "medico", default, skip_serializing_if = "Option::is_none")]
    pub doctor: Option<User>,
    #[serde(rename = "especialidad", default, skip_serializing_if = "Option::is_none")]
    pub specialty: Option<Specialty>,
}

impl Appointment {
    /// Id of the linked schedule slot, when the backend sent one.
    pub fn slot_id(&self) -> Option<i64> {
        self.slot.as_ref().map(|slot| slot.id)
    }

    pub fn specialty_id(&self) -> Option<i64> {
        self.specialty.as_ref().map(|specialty| specialty.id)
    }

    /// Only appointments that have not been denied can be cancelled.
    pub fn can_cancel(&self) -> bool {
        matches!(
            self.status,
            AppointmentStatus::Pending | AppointmentStatus::Confirmed
        )
    }
}

/// Creation payload for a new appointment.
///
/// Matches what the patient screen submits: the slot's own timestamp as
/// the appointment date, state `pendiente`, and the denormalized slot,
/// patient, doctor and specialty objects.
#[derive(Debug, Clone, Serialize)]
pub struct NewAppointment {
    #[serde(rename = "fecha")]
    pub date: String,
    #[serde(rename = "estado")]
    pub status: AppointmentStatus,
    #[serde(rename = "horario")]
    pub slot: TimeSlot,
    #[serde(rename = "paciente")]
    pub patient: User,
    #[serde(rename = "medico")]
    pub doctor: User,
    #[serde(rename = "especialidad")]
    pub specialty: Specialty,
}

impl NewAppointment {
    /// Builds the request for booking `slot`, pending by construction.
    pub fn for_slot(slot: TimeSlot, patient: User, doctor: User, specialty: Specialty) -> Self {
        NewAppointment {
            date: slot.date.clone(),
            status: AppointmentStatus::Pending,
            slot,
            patient,
            doctor,
            specialty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_wire_names() {
        for status in AppointmentStatus::ALL {
            let parsed: AppointmentStatus = status.as_wire().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn status_parse_is_case_and_whitespace_tolerant() {
        assert_eq!(
            " Confirmada ".parse::<AppointmentStatus>().unwrap(),
            AppointmentStatus::Confirmed
        );
    }

    #[test]
    fn status_parse_rejects_unknown_values() {
        assert!("cancelada".parse::<AppointmentStatus>().is_err());
        assert!("".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn status_serializes_to_wire_value() {
        let json = serde_json::to_string(&AppointmentStatus::Denied).unwrap();
        assert_eq!(json, r#""negada""#);
    }

    #[test]
    fn appointment_deserializes_backend_shape() {
        let json = r#"{
            "id": 12,
            "fecha": "2025-07-20T14:30:00-05:00[America/Guayaquil]",
            "estado": "pendiente",
            "horario": { "id": 5, "fecha": "2025-07-20T14:30:00-05:00[America/Guayaquil]", "disponible": false },
            "paciente": { "id": 3, "nombre": "Ana Pérez", "cedula": "1710034065" },
            "medico": { "id": 7, "nombre": "Dr. Salas" },
            "especialidad": { "id": 2, "nombreEspecialidad": "Pediatría" }
        }"#;

        let appointment: Appointment = serde_json::from_str(json).unwrap();
        assert_eq!(appointment.status, AppointmentStatus::Pending);
        assert_eq!(appointment.slot_id(), Some(5));
        assert_eq!(appointment.specialty_id(), Some(2));
        assert_eq!(appointment.patient.unwrap().cedula.as_deref(), Some("1710034065"));
    }

    #[test]
    fn appointment_tolerates_missing_references() {
        let json = r#"{ "id": 1, "fecha": "2025-01-01T08:00", "estado": "negada" }"#;
        let appointment: Appointment = serde_json::from_str(json).unwrap();
        assert_eq!(appointment.slot_id(), None);
        assert!(!appointment.can_cancel());
    }

    #[test]
    fn new_appointment_takes_date_from_slot() {
        let slot = TimeSlot {
            id: 9,
            date: "2025-08-01T09:00:00-05:00".into(),
            available: true,
        };
        let specialty = Specialty { id: 1, name: "Cardiología".into() };
        let patient = User { name: "Paciente".into(), ..User::default() };
        let doctor = User { name: "Médico".into(), ..User::default() };

        let request = NewAppointment::for_slot(slot, patient, doctor, specialty);
        assert_eq!(request.date, "2025-08-01T09:00:00-05:00");
        assert_eq!(request.status, AppointmentStatus::Pending);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["estado"], "pendiente");
        assert_eq!(json["horario"]["disponible"], true);
        assert_eq!(json["especialidad"]["nombreEspecialidad"], "Cardiología");
    }

    #[test]
    fn user_serializes_without_absent_fields() {
        let user = User { name: "Solo Nombre".into(), ..User::default() };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json, serde_json::json!({ "nombre": "Solo Nombre" }));
    }
}
