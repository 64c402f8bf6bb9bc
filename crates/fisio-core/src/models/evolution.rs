use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

/// A session record in SOAP form (Subjective, Objective, Assessment, Plan).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Evolution {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub patient_id: i64,
    pub date: jiff::Timestamp,
    pub subjective: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
    pub assessment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
}

/// What the clinician fills in. The session timestamp defaults to now.
#[derive(Debug, Clone, Default)]
pub struct SoapNote {
    pub date: Option<jiff::Timestamp>,
    pub subjective: String,
    pub objective: Option<String>,
    pub assessment: String,
    pub plan: Option<String>,
}

impl SoapNote {
    pub fn into_evolution(self, patient_id: i64) -> Result<Evolution, CoreError> {
        if self.subjective.trim().is_empty() {
            return Err(CoreError::MissingField("subjective".to_string()));
        }
        if self.assessment.trim().is_empty() {
            return Err(CoreError::MissingField("assessment".to_string()));
        }
        Ok(Evolution {
            id: None,
            patient_id,
            date: self.date.unwrap_or_else(jiff::Timestamp::now),
            subjective: self.subjective,
            objective: self.objective.filter(|s| !s.trim().is_empty()),
            assessment: self.assessment,
            plan: self.plan.filter(|s| !s.trim().is_empty()),
        })
    }
}
