//! In-memory stand-in for the API, used only when the server cannot be
//! reached. Process-lifetime, unauthenticated and single-user: it keeps the
//! client usable offline and makes no durability promises.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use jiff::civil::{Date, date};
use tokio::sync::Mutex;

use fisio_core::models::appointment::{Appointment, NewAppointment, sort_chronologically};
use fisio_core::models::assessment::Assessment;
use fisio_core::models::evolution::Evolution;
use fisio_core::models::patient::{NewPatient, Patient, PatientPatch, PatientStatus};
use fisio_core::models::user::{LoginResponse, User};

use crate::error::ClientError;

pub const DEMO_TOKEN: &str = "mock-token-123";

#[derive(Debug, Default)]
struct MockData {
    patients: Vec<Patient>,
    appointments: Vec<Appointment>,
    assessments: HashMap<i64, Assessment>,
    evolutions: HashMap<i64, Vec<Evolution>>,
}

#[derive(Debug)]
pub struct MockStore {
    data: Mutex<MockData>,
    user: User,
    next_id: AtomicI64,
    latency: Duration,
}

impl Default for MockStore {
    fn default() -> Self {
        Self::seeded()
    }
}

impl MockStore {
    /// A store with no patients or appointments.
    pub fn empty() -> Self {
        Self::from_data(MockData::default())
    }

    /// A store pre-filled with three demo patients, one of them archived.
    pub fn seeded() -> Self {
        Self::with_patients(demo_patients())
    }

    pub fn with_patients(patients: Vec<Patient>) -> Self {
        Self::from_data(MockData {
            patients,
            ..MockData::default()
        })
    }

    fn from_data(data: MockData) -> Self {
        Self {
            data: Mutex::new(data),
            user: demo_user(),
            next_id: AtomicI64::new(jiff::Timestamp::now().as_millisecond()),
            latency: Duration::ZERO,
        }
    }

    /// Delay every operation, so the offline mode feels like a network.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    pub async fn login(&self) -> LoginResponse {
        self.simulate_latency().await;
        LoginResponse {
            token: DEMO_TOKEN.to_string(),
            user: self.user.clone(),
        }
    }

    pub async fn patients(&self) -> Vec<Patient> {
        self.simulate_latency().await;
        self.data.lock().await.patients.clone()
    }

    pub async fn create_patient(&self, new: NewPatient) -> Patient {
        self.simulate_latency().await;
        let patient = new.into_patient(self.next_id());
        self.data.lock().await.patients.push(patient.clone());
        patient
    }

    pub async fn update_patient(&self, id: i64, patch: PatientPatch) -> Result<Patient, ClientError> {
        self.simulate_latency().await;
        let mut data = self.data.lock().await;
        let patient = data
            .patients
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| ClientError::application(format!("patient {id} not found in offline store")))?;
        patient.apply(patch);
        Ok(patient.clone())
    }

    pub async fn assessment(&self, patient_id: i64) -> Option<Assessment> {
        self.simulate_latency().await;
        self.data.lock().await.assessments.get(&patient_id).cloned()
    }

    /// Upsert: replaces any previous assessment of the patient.
    pub async fn save_assessment(&self, patient_id: i64, assessment: Assessment) -> Assessment {
        self.simulate_latency().await;
        let saved = Assessment {
            id: Some(self.next_id()),
            patient_id,
            created_at: assessment.created_at.or_else(|| Some(jiff::Timestamp::now())),
            ..assessment
        };
        self.data
            .lock()
            .await
            .assessments
            .insert(patient_id, saved.clone());
        saved
    }

    /// Newest first.
    pub async fn evolutions(&self, patient_id: i64) -> Vec<Evolution> {
        self.simulate_latency().await;
        self.data
            .lock()
            .await
            .evolutions
            .get(&patient_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn create_evolution(&self, patient_id: i64, evolution: Evolution) -> Evolution {
        self.simulate_latency().await;
        let saved = Evolution {
            id: Some(self.next_id()),
            patient_id,
            ..evolution
        };
        self.data
            .lock()
            .await
            .evolutions
            .entry(patient_id)
            .or_default()
            .insert(0, saved.clone());
        saved
    }

    /// Appointments with `start <= date <= end`, by date then time.
    pub async fn appointments_between(&self, start: Date, end: Date) -> Vec<Appointment> {
        self.simulate_latency().await;
        let mut found: Vec<Appointment> = self
            .data
            .lock()
            .await
            .appointments
            .iter()
            .filter(|a| a.date >= start && a.date <= end)
            .cloned()
            .collect();
        sort_chronologically(&mut found);
        found
    }

    pub async fn create_appointment(&self, new: NewAppointment) -> Appointment {
        self.simulate_latency().await;
        let appointment = new.into_appointment(self.next_id());
        self.data.lock().await.appointments.push(appointment.clone());
        appointment
    }

    /// Removing an id that is not present is a no-op.
    pub async fn delete_appointment(&self, id: i64) {
        self.simulate_latency().await;
        self.data.lock().await.appointments.retain(|a| a.id != id);
    }
}

fn demo_user() -> User {
    User {
        id: 1,
        name: "Admin Demo".to_string(),
        email: "admin@demo.com".to_string(),
        role: Some("admin".to_string()),
        crefito: None,
    }
}

fn demo_patients() -> Vec<Patient> {
    vec![
        Patient {
            id: 1,
            name: "Maria Silva (Demo)".to_string(),
            cpf: Some("123.456.789-00".to_string()),
            phone: "(11) 99999-9999".to_string(),
            birth_date: Some(date(1985, 5, 20)),
            status: PatientStatus::Active,
            email: None,
            address: None,
        },
        Patient {
            id: 2,
            name: "João Santos (Demo)".to_string(),
            cpf: Some("987.654.321-11".to_string()),
            phone: "(21) 98888-8888".to_string(),
            birth_date: Some(date(1990, 10, 10)),
            status: PatientStatus::Active,
            email: None,
            address: None,
        },
        Patient {
            id: 3,
            name: "Ana Costa (Alta)".to_string(),
            cpf: Some("456.789.123-22".to_string()),
            phone: "(31) 97777-7777".to_string(),
            birth_date: Some(date(1980, 1, 15)),
            status: PatientStatus::Archived,
            email: None,
            address: None,
        },
    ]
}
