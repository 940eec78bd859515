//! Blocking HTTP client for the AppMedica REST backend.
//!
//! Every request carries the bearer credential obtained at sign-in. The
//! client reports transport and status failures as [`ApiError`] values;
//! it never applies local state changes on the caller's behalf.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::models::{
    Appointment, AppointmentStatus, NewAppointment, Registration, Specialty, TimeSlot, User,
};
use crate::reconcile::StatusBackend;
use crate::report::{ReportQuery, ReportRow};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("cannot reach the backend at {0}")]
    Connection(String),
    #[error("request timed out after {0}s")]
    Timeout(u64),
    #[error("HTTP client error: {0}")]
    Http(String),
    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed backend response: {0}")]
    Parse(String),
}

pub struct ApiClient {
    base_url: String,
    token: String,
    client: Client,
    timeout_secs: u64,
}

impl ApiClient {
    /// Creates a client for the backend at `base_url` using `token` as
    /// the bearer credential.
    pub fn new(base_url: &str, token: &str, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .expect("failed to create HTTP client");

        ApiClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            client,
            timeout_secs,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn request_error(&self, error: reqwest::Error) -> ApiError {
        if error.is_connect() {
            ApiError::Connection(self.base_url.clone())
        } else if error.is_timeout() {
            ApiError::Timeout(self.timeout_secs)
        } else {
            ApiError::Http(error.to_string())
        }
    }

    /// Sends `request` with the bearer credential and turns any
    /// non-success status into [`ApiError::Status`].
    fn execute(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request
            .bearer_auth(&self.token)
            .send()
            .map_err(|error| self.request_error(error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        debug!(path, "GET");
        self.execute(self.client.get(self.url(path)))?
            .json()
            .map_err(|error| ApiError::Parse(error.to_string()))
    }

    // ── Users ────────────────────────────────────────────────────────────

    /// Looks up a user by email. The backend wraps the result in an array
    /// with zero or one elements.
    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let users: Vec<User> = self.get_json(&format!("usuarios/correo/{email}"))?;
        Ok(users.into_iter().next())
    }

    /// Registers a signed-in user and returns the role the backend
    /// assigned.
    pub fn register_user(&self, registration: &Registration) -> Result<String, ApiError> {
        debug!(uid = %registration.uid, "POST usuarios");
        let body: serde_json::Value = self
            .execute(self.client.post(self.url("usuarios")).json(registration))?
            .json()
            .map_err(|error| ApiError::Parse(error.to_string()))?;
        body.get("rol")
            .and_then(|role| role.as_str())
            .map(str::to_string)
            .ok_or_else(|| ApiError::Parse("missing 'rol' in registration response".to_string()))
    }

    /// Updates the signed-in user's own profile.
    pub fn update_profile(&self, user: &User) -> Result<(), ApiError> {
        debug!(name = %user.name, "PUT usuarios");
        self.execute(self.client.put(self.url("usuarios")).json(user))?;
        Ok(())
    }

    pub fn list_specialties(&self) -> Result<Vec<Specialty>, ApiError> {
        self.get_json("especialidades")
    }

    pub fn doctors_by_specialty(&self, specialty_id: i64) -> Result<Vec<User>, ApiError> {
        self.get_json(&format!("usuarios/medicoespecialidad/{specialty_id}"))
    }

    // ── Schedule slots ───────────────────────────────────────────────────

    /// Every slot the doctor has published, booked or not.
    pub fn slots_by_doctor(&self, doctor_id: i64) -> Result<Vec<TimeSlot>, ApiError> {
        self.get_json(&format!("horarios/idmedico/{doctor_id}"))
    }

    /// Slots still open for booking. The endpoint returns all slots; the
    /// availability cut happens here, client-side.
    pub fn available_slots_by_doctor(&self, doctor_id: i64) -> Result<Vec<TimeSlot>, ApiError> {
        let slots = self.slots_by_doctor(doctor_id)?;
        Ok(slots.into_iter().filter(|slot| slot.available).collect())
    }

    /// Publishes a new attention slot at `wall_clock`
    /// (`YYYY-MM-DDTHH:MM`, doctor local time).
    pub fn publish_slot(&self, wall_clock: &str) -> Result<(), ApiError> {
        debug!(wall_clock, "POST horarios");
        self.execute(
            self.client
                .post(self.url("horarios"))
                .json(&json!({ "fechaHora": wall_clock })),
        )?;
        Ok(())
    }

    // ── Appointments ─────────────────────────────────────────────────────

    pub fn create_appointment(&self, appointment: &NewAppointment) -> Result<(), ApiError> {
        debug!(slot_id = appointment.slot.id, "POST citas");
        self.execute(self.client.post(self.url("citas")).json(appointment))?;
        Ok(())
    }

    /// Cancels an appointment. Cancellation is a deletion, not a state.
    pub fn delete_appointment(&self, appointment_id: i64) -> Result<(), ApiError> {
        debug!(appointment_id, "DELETE citas");
        self.execute(self.client.delete(self.url(&format!("citas/{appointment_id}"))))?;
        Ok(())
    }

    pub fn appointments_by_patient(&self, uid: &str) -> Result<Vec<Appointment>, ApiError> {
        self.get_json(&format!("citas/paciente/{uid}"))
    }

    /// Full appointment history for a doctor, future and past mixed; see
    /// [`crate::schedule::partition_by_date`].
    pub fn appointment_history(&self, doctor_id: i64) -> Result<Vec<Appointment>, ApiError> {
        debug!(doctor_id, "GET citas/historial");
        self.execute(
            self.client
                .get(self.url("citas/historial"))
                .query(&[("medicoId", doctor_id)]),
        )?
        .json()
        .map_err(|error| ApiError::Parse(error.to_string()))
    }

    // ── Reports ──────────────────────────────────────────────────────────

    pub fn report_preview(&self, query: &ReportQuery) -> Result<Vec<ReportRow>, ApiError> {
        debug!(doctor = %query.doctor_name, "GET reportes/citas/preview");
        self.execute(
            self.client
                .get(self.url("reportes/citas/preview"))
                .query(&query.to_params()),
        )?
        .json()
        .map_err(|error| ApiError::Parse(error.to_string()))
    }

    /// The same filtered set as [`Self::report_preview`], rendered by the
    /// backend as a PDF document.
    pub fn report_pdf(&self, query: &ReportQuery) -> Result<Vec<u8>, ApiError> {
        debug!(doctor = %query.doctor_name, "GET reportes/citas/pdf");
        let bytes = self
            .execute(
                self.client
                    .get(self.url("reportes/citas/pdf"))
                    .query(&query.to_params()),
            )?
            .bytes()
            .map_err(|error| ApiError::Parse(error.to_string()))?;
        Ok(bytes.to_vec())
    }
}

impl StatusBackend for ApiClient {
    fn set_appointment_status(
        &self,
        appointment_id: i64,
        status: AppointmentStatus,
    ) -> Result<(), ApiError> {
        debug!(appointment_id, %status, "PUT citas");
        self.execute(
            self.client
                .put(self.url(&format!("citas/{appointment_id}")))
                .json(&json!({ "estado": status })),
        )?;
        Ok(())
    }

    fn set_slot_availability(&self, slot_id: i64, available: bool) -> Result<(), ApiError> {
        debug!(slot_id, available, "PATCH horarios");
        self.execute(
            self.client
                .patch(self.url(&format!("horarios/{slot_id}")))
                .json(&json!({ "disponible": available })),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_normalizes_the_base_url() {
        let client = ApiClient::new("http://localhost:8080/appMedica/rest/", "tok", 30);
        assert_eq!(client.base_url(), "http://localhost:8080/appMedica/rest");
        assert_eq!(client.url("especialidades"), "http://localhost:8080/appMedica/rest/especialidades");
    }

    #[test]
    fn status_error_reports_code_and_body() {
        let error = ApiError::Status {
            status: 404,
            body: "no encontrado".to_string(),
        };
        assert_eq!(error.to_string(), "backend returned status 404: no encontrado");
    }
}
