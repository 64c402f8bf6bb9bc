use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::future::join_all;
use jiff::civil::Date;
use serde::de::DeserializeOwned;
use tracing::{info, warn};

use fisio_core::api_paths;
use fisio_core::models::appointment::{Appointment, NewAppointment, sort_chronologically};
use fisio_core::models::assessment::Assessment;
use fisio_core::models::evolution::{Evolution, SoapNote};
use fisio_core::models::patient::{NewPatient, Patient, PatientPatch};
use fisio_core::models::user::{Credentials, LoginResponse, User};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::mock::MockStore;
use crate::resilient::{self, Source};
use crate::session::SessionStore;
use crate::transport::{HttpRequest, HttpResponse, Transport, UreqTransport};

/// Every API operation, each routed through the offline fallback.
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    store: Arc<MockStore>,
    session: Arc<SessionStore>,
    offline: AtomicBool,
}

impl ApiClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: Arc<MockStore>,
        session: Arc<SessionStore>,
    ) -> Self {
        Self {
            transport,
            store,
            session,
            offline: AtomicBool::new(false),
        }
    }

    /// HTTP transport and a seeded offline store, both built from config.
    pub fn from_config(config: &ClientConfig, session: Arc<SessionStore>) -> Self {
        let transport = UreqTransport::new(config.api_url.clone(), config.request_timeout());
        let store = MockStore::seeded().with_latency(config.offline_latency());
        Self::new(Arc::new(transport), Arc::new(store), session)
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Whether the most recently *completed* call was served by the offline
    /// store. Concurrent calls (a recurring batch) race on this flag, so it
    /// reflects whichever finished last, not the batch as a whole.
    pub fn is_offline(&self) -> bool {
        self.offline.load(Ordering::Relaxed)
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        let token = self.session.token().await;
        self.transport.send(request.with_bearer(token)).await
    }

    async fn fetch_json<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T, ClientError> {
        self.send(request).await?.error_for_status()?.into_json()
    }

    /// Run one operation through the fallback layer. A rejected credential
    /// ends the session here, before the error reaches the caller.
    async fn resilient<T, P, F, Fut>(
        &self,
        operation: &'static str,
        primary: P,
        fallback: F,
    ) -> Result<T, ClientError>
    where
        P: Future<Output = Result<T, ClientError>>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        match resilient::with_fallback(operation, primary, fallback).await {
            Ok((value, source)) => {
                self.offline.store(source == Source::Offline, Ordering::Relaxed);
                Ok(value)
            }
            Err(err) => {
                if err.requires_login() {
                    warn!(operation, "credential rejected, clearing session");
                    if let Err(e) = self.session.clear().await {
                        tracing::error!(error = %e, "failed to clear session");
                    }
                }
                Err(err)
            }
        }
    }

    pub async fn login(&self, identifier: &str, password: &str) -> Result<User, ClientError> {
        if identifier.trim().is_empty() || password.is_empty() {
            return Err(ClientError::Validation(
                "identifier and password are required".to_string(),
            ));
        }

        let credentials = Credentials {
            identifier: identifier.trim().to_string(),
            password: password.to_string(),
        };
        let request = HttpRequest::post(api_paths::LOGIN, &credentials)?;

        let primary = async {
            let resp = self.transport.send(request).await?;
            let result: Result<LoginResponse, ClientError> = match resp.error_for_status() {
                // At the login screen a 401 means bad credentials, not an
                // expired session.
                Err(ClientError::Unauthorized { status }) => Err(ClientError::Application {
                    status: Some(status),
                    message: "invalid credentials".to_string(),
                }),
                other => other.and_then(HttpResponse::into_json),
            };
            result
        };
        let login = self
            .resilient("login", primary, || async { Ok(self.store.login().await) })
            .await?;

        self.session.save(&login).await?;
        info!(user_id = login.user.id, offline = self.is_offline(), "logged in");
        Ok(login.user)
    }

    pub async fn logout(&self) -> Result<(), ClientError> {
        self.session.clear().await
    }

    pub async fn get_patients(&self) -> Result<Vec<Patient>, ClientError> {
        self.resilient(
            "get_patients",
            self.fetch_json(HttpRequest::get(api_paths::PATIENTS)),
            || async { Ok(self.store.patients().await) },
        )
        .await
    }

    pub async fn create_patient(&self, patient: NewPatient) -> Result<Patient, ClientError> {
        if patient.name.trim().is_empty() {
            return Err(ClientError::Validation("patient name is required".to_string()));
        }
        let request = HttpRequest::post(api_paths::PATIENTS, &patient)?;
        let created = self
            .resilient("create_patient", self.fetch_json(request), || async {
                Ok(self.store.create_patient(patient).await)
            })
            .await?;
        info!(patient_id = created.id, "patient created");
        Ok(created)
    }

    pub async fn update_patient(&self, id: i64, patch: PatientPatch) -> Result<Patient, ClientError> {
        let request = HttpRequest::patch(api_paths::patient(id), &patch)?;
        self.resilient("update_patient", self.fetch_json(request), || {
            self.store.update_patient(id, patch)
        })
        .await
    }

    /// Flip `active ↔ archived`.
    pub async fn toggle_patient_status(&self, patient: &Patient) -> Result<Patient, ClientError> {
        let status = patient.status.toggled();
        let updated = self
            .update_patient(patient.id, PatientPatch::status(status))
            .await?;
        info!(patient_id = patient.id, status = ?updated.status, "patient status changed");
        Ok(updated)
    }

    /// `None` when the patient has not been assessed yet.
    pub async fn get_assessment(&self, patient_id: i64) -> Result<Option<Assessment>, ClientError> {
        let primary = async {
            let resp = self
                .send(HttpRequest::get(api_paths::patient_assessment(patient_id)))
                .await?;
            if resp.status == 404 {
                return Ok(None);
            }
            resp.error_for_status()?.into_json().map(Some)
        };
        self.resilient("get_assessment", primary, || async {
            Ok(self.store.assessment(patient_id).await)
        })
        .await
    }

    /// Upsert the patient's assessment.
    pub async fn save_assessment(
        &self,
        patient_id: i64,
        assessment: Assessment,
    ) -> Result<Assessment, ClientError> {
        let assessment = Assessment {
            patient_id,
            ..assessment
        };
        assessment.validate()?;

        let request = HttpRequest::post(api_paths::patient_assessment(patient_id), &assessment)?;
        self.resilient("save_assessment", self.fetch_json(request), || async {
            Ok(self.store.save_assessment(patient_id, assessment).await)
        })
        .await
    }

    pub async fn get_evolutions(&self, patient_id: i64) -> Result<Vec<Evolution>, ClientError> {
        self.resilient(
            "get_evolutions",
            self.fetch_json(HttpRequest::get(api_paths::patient_evolutions(patient_id))),
            || async { Ok(self.store.evolutions(patient_id).await) },
        )
        .await
    }

    pub async fn create_evolution(
        &self,
        patient_id: i64,
        note: SoapNote,
    ) -> Result<Evolution, ClientError> {
        let evolution = note.into_evolution(patient_id)?;
        let request = HttpRequest::post(api_paths::patient_evolutions(patient_id), &evolution)?;
        self.resilient("create_evolution", self.fetch_json(request), || async {
            Ok(self.store.create_evolution(patient_id, evolution).await)
        })
        .await
    }

    /// Appointments with `start <= date <= end`, by date then time.
    pub async fn get_appointments_range(
        &self,
        start: Date,
        end: Date,
    ) -> Result<Vec<Appointment>, ClientError> {
        let primary = async {
            let value: serde_json::Value = self
                .fetch_json(HttpRequest::get(api_paths::appointments_range(start, end)))
                .await?;
            if !value.is_array() {
                return Ok(Vec::new());
            }
            let mut appointments: Vec<Appointment> = serde_json::from_value(value)?;
            sort_chronologically(&mut appointments);
            Ok::<_, ClientError>(appointments)
        };
        self.resilient("get_appointments_range", primary, || async {
            Ok(self.store.appointments_between(start, end).await)
        })
        .await
    }

    pub async fn create_appointment(
        &self,
        appointment: NewAppointment,
    ) -> Result<Appointment, ClientError> {
        let request = HttpRequest::post(api_paths::APPOINTMENTS, &appointment)?;
        self.resilient("create_appointment", self.fetch_json(request), || async {
            Ok(self.store.create_appointment(appointment).await)
        })
        .await
    }

    /// Issue every creation concurrently and wait for all of them. A failure
    /// does not cancel its siblings and nothing is rolled back.
    pub async fn create_appointments(
        &self,
        batch: Vec<NewAppointment>,
    ) -> Vec<Result<Appointment, ClientError>> {
        join_all(batch.into_iter().map(|a| self.create_appointment(a))).await
    }

    pub async fn delete_appointment(&self, id: i64) -> Result<(), ClientError> {
        let primary = async {
            self.send(HttpRequest::delete(api_paths::appointment(id)))
                .await?
                .error_for_status()?;
            Ok::<_, ClientError>(())
        };
        self.resilient("delete_appointment", primary, || async {
            self.store.delete_appointment(id).await;
            Ok(())
        })
        .await?;
        info!(appointment_id = id, "appointment deleted");
        Ok(())
    }
}
