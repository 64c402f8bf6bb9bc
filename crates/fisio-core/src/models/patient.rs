use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Patient {
    pub id: i64,
    pub name: String,
    /// National ID (CPF).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    #[serde(default)]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<jiff::civil::Date>,
    #[serde(default)]
    pub status: PatientStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PatientStatus {
    #[default]
    Active,
    Archived,
}

impl PatientStatus {
    pub fn toggled(self) -> Self {
        match self {
            Self::Active => Self::Archived,
            Self::Archived => Self::Active,
        }
    }
}

/// Creation payload. The server (or the offline store) assigns the id and
/// starts every patient as active.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewPatient {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<jiff::civil::Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl NewPatient {
    pub fn into_patient(self, id: i64) -> Patient {
        Patient {
            id,
            name: self.name,
            cpf: self.cpf,
            phone: self.phone,
            birth_date: self.birth_date,
            status: PatientStatus::Active,
            email: self.email,
            address: self.address,
        }
    }
}

/// Partial update sent with `PATCH`. Only the fields that are `Some` go on
/// the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PatientPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<jiff::civil::Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PatientStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl PatientPatch {
    pub fn status(status: PatientStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

impl Patient {
    pub fn is_archived(&self) -> bool {
        self.status == PatientStatus::Archived
    }

    /// Merge a partial update into this record.
    pub fn apply(&mut self, patch: PatientPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(cpf) = patch.cpf {
            self.cpf = Some(cpf);
        }
        if let Some(phone) = patch.phone {
            self.phone = phone;
        }
        if let Some(birth_date) = patch.birth_date {
            self.birth_date = Some(birth_date);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(email) = patch.email {
            self.email = Some(email);
        }
        if let Some(address) = patch.address {
            self.address = Some(address);
        }
    }

    /// Search match used by the patient list: case-insensitive on the name,
    /// plain substring on the national ID and phone. An empty term matches
    /// everyone.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim();
        if term.is_empty() {
            return true;
        }
        self.name.to_lowercase().contains(&term.to_lowercase())
            || self.cpf.as_deref().is_some_and(|cpf| cpf.contains(term))
            || self.phone.contains(term)
    }
}

pub fn search<'a>(patients: &'a [Patient], term: &str) -> Vec<&'a Patient> {
    patients.iter().filter(|p| p.matches(term)).collect()
}

/// Patients that can be scheduled (archived ones are discharged).
pub fn active(patients: &[Patient]) -> impl Iterator<Item = &Patient> {
    patients.iter().filter(|p| !p.is_archived())
}
