//! Interactive terminal client for the AppMedica backend.
//!
//! Sign in with an email the backend knows (the bearer credential comes
//! from the identity provider, out of band), then manage a profile,
//! request and cancel appointments, drive appointment states and pull
//! occupancy reports.

use std::io::{self, Write};
use std::path::Path;

use chrono::NaiveDate;
use tracing_subscriber::EnvFilter;

use appmedica::api::{ApiClient, ApiError};
use appmedica::config;
use appmedica::dates;
use appmedica::models::{AppointmentStatus, NewAppointment, Registration, User};
use appmedica::reconcile::{self, ReconcileError};
use appmedica::report::{ReportQuery, ReportSummary};
use appmedica::schedule::{partition_by_date, HistoryFilter};
use appmedica::validation::{validate_cedula, validate_phone};

struct ClinicCli {
    client: ApiClient,
    user: Option<User>,
    running: bool,
}

impl ClinicCli {
    fn new(client: ApiClient) -> Self {
        ClinicCli {
            client,
            user: None,
            running: true,
        }
    }

    fn print_header(&self) {
        println!("\n{}", "=".repeat(60));
        println!("       CLINICA SAN SEBASTIAN - APPOINTMENTS");
        println!("{}", "=".repeat(60));
    }

    fn print_menu(&self) {
        println!("\n--- Main Menu ---");
        println!("1. Sign in / switch user");
        println!("2. View or update profile");
        println!("3. Request an appointment");
        println!("4. My appointments / cancel");
        println!("5. Manage appointment states (doctor)");
        println!("6. Appointment history with filters (doctor)");
        println!("7. Publish a schedule slot");
        println!("8. Occupancy report");
        println!("9. Exit");
        println!("{}", "-".repeat(20));
    }

    fn get_input(&self, prompt: &str, default: Option<&str>) -> String {
        if let Some(default) = default {
            print!("{prompt} [{default}]: ");
        } else {
            print!("{prompt}: ");
        }
        io::stdout().flush().unwrap();

        let mut input = String::new();
        io::stdin().read_line(&mut input).unwrap();
        let input = input.trim();

        if input.is_empty() {
            default.unwrap_or("").to_string()
        } else {
            input.to_string()
        }
    }

    fn get_int_input(&self, prompt: &str, default: Option<i64>) -> i64 {
        loop {
            let default_str = default.map(|value| value.to_string());
            let input = self.get_input(prompt, default_str.as_deref());
            if let Ok(value) = input.parse::<i64>() {
                return value;
            }
            println!("Please enter a valid number");
        }
    }

    /// Turns a 1-based menu choice into an index into a list of `len`
    /// items; out-of-range and non-positive choices are `None`.
    fn choose_index(choice: i64, len: usize) -> Option<usize> {
        usize::try_from(choice.checked_sub(1)?)
            .ok()
            .filter(|&index| index < len)
    }

    /// Optional `YYYY-MM-DD` input; empty means no bound.
    fn get_date_input(&self, prompt: &str) -> Option<NaiveDate> {
        loop {
            let input = self.get_input(prompt, Some(""));
            if input.is_empty() {
                return None;
            }
            match NaiveDate::parse_from_str(&input, "%Y-%m-%d") {
                Ok(date) => return Some(date),
                Err(_) => println!("Please enter a date as YYYY-MM-DD"),
            }
        }
    }

    fn report_error(&self, context: &str, error: &ApiError) {
        println!("\n{context}: {error}");
    }

    fn signed_in_user(&self) -> Option<&User> {
        if self.user.is_none() {
            println!("\nPlease sign in first (option 1)");
        }
        self.user.as_ref()
    }

    fn sign_in(&mut self) {
        println!("\n--- Sign In ---");
        let email = self.get_input("Email", None);
        if email.is_empty() {
            println!("Email is required");
            return;
        }

        match self.client.find_user_by_email(&email) {
            Ok(Some(user)) => {
                println!("\nWelcome, {}", user.name);
                if let Some(role) = &user.role {
                    println!("Role: {role}");
                }
                self.user = Some(user);
            }
            Ok(None) => {
                println!("\nNo account found for {email}");
                let answer = self.get_input("Register this email? (y/n)", Some("n"));
                if answer.to_lowercase() == "y" {
                    self.register(email);
                }
            }
            Err(error) => self.report_error("Could not sign in", &error),
        }
    }

    fn register(&mut self, email: String) {
        let name = self.get_input("Full name", None);
        let uid = self.get_input("Identity provider uid", None);
        let registration = Registration {
            uid,
            name,
            email: email.clone(),
        };

        match self.client.register_user(&registration) {
            Ok(role) => {
                println!("\nRegistered with role: {role}");
                match self.client.find_user_by_email(&email) {
                    Ok(Some(user)) => self.user = Some(user),
                    Ok(None) => println!("Account created; sign in again to load it"),
                    Err(error) => self.report_error("Could not load the new account", &error),
                }
            }
            Err(error) => self.report_error("Could not register", &error),
        }
    }

    fn update_profile(&mut self) {
        let Some(user) = self.signed_in_user().cloned() else {
            return;
        };

        println!("\n--- Profile ---");
        let name = self.get_input("Name", Some(&user.name));
        let cedula = self.get_input("Cedula", user.cedula.as_deref());
        let phone = self.get_input("Phone", user.phone.as_deref());
        let address = self.get_input("Address", user.address.as_deref());
        let gender = self.get_input("Gender", user.gender.as_deref());

        // Local validation blocks the request entirely; the backend is
        // never contacted with a bad document or phone.
        if !validate_cedula(&cedula) {
            println!("\nCedula is not valid; profile not saved");
            return;
        }
        if !validate_phone(&phone) {
            println!("\nPhone must be exactly 10 digits; profile not saved");
            return;
        }

        let updated = User {
            name,
            cedula: Some(cedula),
            phone: Some(phone),
            address: Some(address).filter(|value| !value.is_empty()),
            gender: Some(gender).filter(|value| !value.is_empty()),
            ..user
        };

        match self.client.update_profile(&updated) {
            Ok(()) => {
                println!("\nProfile updated");
                self.user = Some(updated);
            }
            Err(error) => self.report_error("Could not update the profile", &error),
        }
    }

    fn request_appointment(&mut self) {
        let Some(user) = self.signed_in_user().cloned() else {
            return;
        };

        println!("\n--- Request an Appointment ---");
        let specialties = match self.client.list_specialties() {
            Ok(specialties) => specialties,
            Err(error) => return self.report_error("Could not load specialties", &error),
        };
        if specialties.is_empty() {
            println!("No specialties available");
            return;
        }
        for (i, specialty) in specialties.iter().enumerate() {
            println!("  {}. {}", i + 1, specialty.name);
        }
        let choice = self.get_int_input("Specialty", Some(1));
        let Some(specialty) = Self::choose_index(choice, specialties.len())
            .map(|index| specialties[index].clone())
        else {
            println!("Invalid choice");
            return;
        };

        let doctors = match self.client.doctors_by_specialty(specialty.id) {
            Ok(doctors) => doctors,
            Err(error) => return self.report_error("Could not load doctors", &error),
        };
        if doctors.is_empty() {
            println!("No doctors for {}", specialty.name);
            return;
        }
        for (i, doctor) in doctors.iter().enumerate() {
            println!("  {}. {}", i + 1, doctor.name);
        }
        let choice = self.get_int_input("Doctor", Some(1));
        let Some(doctor) = Self::choose_index(choice, doctors.len()).map(|index| doctors[index].clone())
        else {
            println!("Invalid choice");
            return;
        };

        let Some(doctor_id) = doctor.id else {
            println!("Doctor record has no id; cannot list slots");
            return;
        };
        let slots = match self.client.available_slots_by_doctor(doctor_id) {
            Ok(slots) => slots,
            Err(error) => return self.report_error("Could not load schedule slots", &error),
        };
        if slots.is_empty() {
            println!("No available slots for {}", doctor.name);
            return;
        }
        for (i, slot) in slots.iter().enumerate() {
            println!("  {}. {}", i + 1, dates::display_date(&slot.date));
        }
        let choice = self.get_int_input("Slot", Some(1));
        let Some(slot) = Self::choose_index(choice, slots.len()).map(|index| slots[index].clone())
        else {
            println!("Invalid choice");
            return;
        };

        let request = NewAppointment::for_slot(slot, user, doctor, specialty);
        match self.client.create_appointment(&request) {
            Ok(()) => println!("\nAppointment requested (pending confirmation)"),
            Err(error) => self.report_error("Could not create the appointment", &error),
        }
    }

    fn my_appointments(&mut self) {
        let Some(user) = self.signed_in_user() else {
            return;
        };
        let Some(uid) = user.uid.clone() else {
            println!("Account has no identity-provider uid");
            return;
        };

        let appointments = match self.client.appointments_by_patient(&uid) {
            Ok(appointments) => appointments,
            Err(error) => return self.report_error("Could not load appointments", &error),
        };
        if appointments.is_empty() {
            println!("\nYou have no appointments");
            return;
        }

        println!("\n--- My Appointments ({}) ---", appointments.len());
        for (i, appointment) in appointments.iter().enumerate() {
            let specialty = appointment
                .specialty
                .as_ref()
                .map(|specialty| specialty.name.as_str())
                .unwrap_or("Sin especialidad");
            let doctor = appointment
                .doctor
                .as_ref()
                .map(|doctor| doctor.name.as_str())
                .unwrap_or("Sin médico");
            println!(
                "  {}. {} - {} - {} [{}]",
                i + 1,
                dates::display_date(&appointment.date),
                specialty,
                doctor,
                appointment.status
            );
        }

        let choice = self.get_int_input("Cancel which appointment? (0 to go back)", Some(0));
        if choice == 0 {
            return;
        }
        let Some(appointment) = Self::choose_index(choice, appointments.len())
            .map(|index| &appointments[index])
        else {
            println!("Invalid choice");
            return;
        };
        if !appointment.can_cancel() {
            println!("Denied appointments cannot be cancelled");
            return;
        }

        let answer = self.get_input("Are you sure? (y/n)", Some("n"));
        if answer.to_lowercase() != "y" {
            return;
        }
        match self.client.delete_appointment(appointment.id) {
            Ok(()) => println!("\nAppointment cancelled"),
            Err(error) => self.report_error("Could not cancel the appointment", &error),
        }
    }

    fn doctor_id(&self) -> Option<i64> {
        let user = self.signed_in_user()?;
        match user.id {
            Some(id) => Some(id),
            None => {
                println!("Account has no backend id");
                None
            }
        }
    }

    fn manage_appointments(&mut self) {
        let Some(doctor_id) = self.doctor_id() else {
            return;
        };

        let appointments = match self.client.appointment_history(doctor_id) {
            Ok(appointments) => appointments,
            Err(error) => return self.report_error("Could not load appointments", &error),
        };

        let parts = partition_by_date(appointments, dates::now_local());
        if !parts.unparseable.is_empty() {
            println!("({} records skipped: invalid date)", parts.unparseable.len());
        }
        if parts.upcoming.is_empty() {
            println!("\nNo upcoming appointments");
            return;
        }

        println!("\n--- Upcoming Appointments ({}) ---", parts.upcoming.len());
        for (i, appointment) in parts.upcoming.iter().enumerate() {
            let patient = appointment
                .patient
                .as_ref()
                .map(|patient| patient.name.as_str())
                .unwrap_or("Sin nombre");
            println!(
                "  {}. {} - {} [{}]",
                i + 1,
                patient,
                dates::display_date(&appointment.date),
                appointment.status
            );
        }

        let choice = self.get_int_input("Change which appointment? (0 to go back)", Some(0));
        if choice == 0 {
            return;
        }
        let Some(appointment) = Self::choose_index(choice, parts.upcoming.len())
            .map(|index| &parts.upcoming[index])
        else {
            println!("Invalid choice");
            return;
        };

        println!("\nNew state:");
        for (i, status) in AppointmentStatus::ALL.iter().enumerate() {
            println!("  {}. {}", i + 1, status);
        }
        let choice = self.get_int_input("State", Some(1));
        let Some(status) = Self::choose_index(choice, AppointmentStatus::ALL.len())
            .map(|index| AppointmentStatus::ALL[index])
        else {
            println!("Invalid choice");
            return;
        };

        match reconcile::apply_status_change(
            &self.client,
            appointment.id,
            status,
            appointment.slot_id(),
        ) {
            Ok(()) => println!("\nAppointment is now '{status}'"),
            Err(error @ ReconcileError::SlotUpdate { .. }) => {
                // The status write already landed; tell the user exactly
                // what is left inconsistent.
                println!("\nPartial update: {error}");
                println!("Re-apply the same state to finish the slot update.");
            }
            Err(error) => println!("\n{error}"),
        }
    }

    fn appointment_history(&mut self) {
        let Some(doctor_id) = self.doctor_id() else {
            return;
        };

        let appointments = match self.client.appointment_history(doctor_id) {
            Ok(appointments) => appointments,
            Err(error) => return self.report_error("Could not load appointments", &error),
        };
        let parts = partition_by_date(appointments, dates::now_local());

        println!("\n--- History Filters (empty = no filter) ---");
        let from = self.get_date_input("From (YYYY-MM-DD)");
        let to = self.get_date_input("To (YYYY-MM-DD)");
        let status = loop {
            let input = self.get_input("State (pendiente/confirmada/negada)", Some(""));
            if input.is_empty() {
                break None;
            }
            match input.parse::<AppointmentStatus>() {
                Ok(status) => break Some(status),
                Err(error) => println!("{error}"),
            }
        };
        let specialty_id = match self.get_int_input("Specialty id (0 = any)", Some(0)) {
            0 => None,
            id => Some(id),
        };

        let filter = HistoryFilter {
            from,
            to,
            status,
            specialty_id,
        };
        let history = filter.apply(&parts.past);

        println!("\n--- Past Appointments ({}) ---", history.len());
        for appointment in &history {
            let patient = appointment
                .patient
                .as_ref()
                .map(|patient| patient.name.as_str())
                .unwrap_or("Sin nombre");
            println!(
                "  {} - {} [{}]",
                patient,
                dates::display_date(&appointment.date),
                appointment.status
            );
        }
    }

    fn publish_slot(&mut self) {
        if self.signed_in_user().is_none() {
            return;
        }

        println!("\n--- Publish a Schedule Slot ---");
        let wall_clock = loop {
            let input = self.get_input("Date and time (YYYY-MM-DDTHH:MM)", None);
            if dates::parse_backend_date(&input).is_ok() {
                break input;
            }
            println!("Please enter a valid date-time, e.g. 2025-08-12T09:30");
        };

        match self.client.publish_slot(&wall_clock) {
            Ok(()) => println!("\nSlot published"),
            Err(error) => self.report_error("Could not publish the slot", &error),
        }
    }

    fn occupancy_report(&mut self) {
        if self.signed_in_user().is_none() {
            return;
        }

        println!("\n--- Occupancy Report ---");
        let doctor_name = self.get_input("Doctor name", None);
        let specialty_name = self.get_input("Specialty name", None);
        let Some(from) = self.get_date_input("From (YYYY-MM-DD)") else {
            println!("All four filters are required");
            return;
        };
        let Some(to) = self.get_date_input("To (YYYY-MM-DD)") else {
            println!("All four filters are required");
            return;
        };
        if doctor_name.is_empty() || specialty_name.is_empty() {
            println!("All four filters are required");
            return;
        }

        let query = ReportQuery {
            doctor_name,
            specialty_name,
            from,
            to,
        };
        let rows = match self.client.report_preview(&query) {
            Ok(rows) => rows,
            Err(error) => return self.report_error("Could not load the report", &error),
        };
        if rows.is_empty() {
            println!("\nNo data for those filters");
            return;
        }

        println!("\n{:<25} {:<18} {:>6} {:>9} {:>12}", "Doctor", "Specialty", "Citas", "Horarios", "Ocupación");
        for row in &rows {
            println!(
                "{:<25} {:<18} {:>6} {:>9} {:>10.1}% ({})",
                row.doctor,
                row.specialty,
                row.total_appointments,
                row.total_slots,
                row.occupancy_pct,
                row.band().label()
            );
        }

        let summary = ReportSummary::from_rows(&rows);
        println!(
            "\nTotals: {} citas, {} horarios, {}% mean occupancy",
            summary.total_appointments, summary.total_slots, summary.mean_occupancy_pct
        );

        let answer = self.get_input("Download PDF? (y/n)", Some("n"));
        if answer.to_lowercase() != "y" {
            return;
        }
        match self.client.report_pdf(&query) {
            Ok(bytes) => match query.save_pdf(&bytes, Path::new(".")) {
                Ok(path) => println!("\nSaved {}", path.display()),
                Err(error) => println!("\nCould not write the PDF: {error}"),
            },
            Err(error) => self.report_error("Could not download the PDF", &error),
        }
    }

    fn run(&mut self) {
        self.print_header();

        while self.running {
            self.print_menu();
            let choice = self.get_int_input("Enter choice", Some(1));

            match choice {
                1 => self.sign_in(),
                2 => self.update_profile(),
                3 => self.request_appointment(),
                4 => self.my_appointments(),
                5 => self.manage_appointments(),
                6 => self.appointment_history(),
                7 => self.publish_slot(),
                8 => self.occupancy_report(),
                9 => {
                    self.running = false;
                    println!("\nGoodbye!");
                }
                _ => println!("Invalid choice"),
            }
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let base_url = config::api_url();
    let token = match config::session_token() {
        Some(token) => token,
        None => {
            println!("No {} in the environment.", config::ENV_TOKEN);
            print!("Bearer token: ");
            io::stdout().flush().unwrap();
            let mut input = String::new();
            io::stdin().read_line(&mut input).unwrap();
            input.trim().to_string()
        }
    };

    let client = ApiClient::new(&base_url, &token, config::DEFAULT_TIMEOUT_SECS);
    let mut cli = ClinicCli::new(client);
    cli.run();
}
