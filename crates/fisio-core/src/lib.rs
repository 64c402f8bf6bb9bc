//! fisio-core
//!
//! Pure domain types, the calendar/recurrence engine, and REST path
//! conventions. No HTTP dependency; this is the shared vocabulary of the
//! FisioManager client.

pub mod api_paths;
pub mod calendar;
pub mod error;
pub mod models;
pub mod recurrence;
