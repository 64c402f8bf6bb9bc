//! REST path conventions.
//!
//! Pure string functions with no HTTP dependency. These define the canonical
//! layout of the endpoints the client talks to.

use jiff::civil::Date;

pub const LOGIN: &str = "/auth/login";

pub const PATIENTS: &str = "/api/patients";

pub const APPOINTMENTS: &str = "/api/appointments";

pub fn patient(id: i64) -> String {
    format!("{PATIENTS}/{id}")
}

pub fn patient_assessment(id: i64) -> String {
    format!("{PATIENTS}/{id}/assessment")
}

pub fn patient_evolutions(id: i64) -> String {
    format!("{PATIENTS}/{id}/evolutions")
}

pub fn appointment(id: i64) -> String {
    format!("{APPOINTMENTS}/{id}")
}

/// Inclusive date range query. Both bounds are ISO dates, so no escaping
/// is needed.
pub fn appointments_range(start: Date, end: Date) -> String {
    format!("{APPOINTMENTS}?startDate={start}&endDate={end}")
}
