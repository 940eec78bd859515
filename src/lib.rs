//! Clinic appointment management client for the AppMedica REST backend.
//!
//! Patients request appointments, doctors and administrators manage
//! schedules and appointment states, and reports summarize occupancy.
//! This crate holds the domain logic: identity-document validation,
//! backend timestamp handling, future/past partitioning with history
//! filters, and the linked status/availability update. The `appmedica`
//! binary wires it all to an interactive terminal client.

pub mod api;
pub mod config;
pub mod dates;
pub mod models;
pub mod reconcile;
pub mod report;
pub mod schedule;
pub mod validation;
