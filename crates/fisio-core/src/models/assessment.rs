use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

pub const PAIN_SCALE_MAX: u8 = 10;

/// Initial physiotherapy evaluation. One per patient; saving replaces the
/// previous one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Assessment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub patient_id: i64,
    /// Chief complaint.
    pub complaint: String,
    /// History of present illness.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hda: Option<String>,
    /// Past medical history.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hpp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pain_level: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vitals: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub respiratory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub neurological: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub functional_tests: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspection: Option<String>,
    /// Range of motion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rom: Option<String>,
    pub diagnosis: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ambulation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tonus: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tonus_other: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment_goal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treatment_conduct: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<jiff::Timestamp>,
}

impl Assessment {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.complaint.trim().is_empty() {
            return Err(CoreError::MissingField("complaint".to_string()));
        }
        if self.diagnosis.trim().is_empty() {
            return Err(CoreError::MissingField("diagnosis".to_string()));
        }
        if let Some(level) = self.pain_level
            && level > PAIN_SCALE_MAX
        {
            return Err(CoreError::OutOfRange {
                field: "painLevel".to_string(),
                value: i64::from(level),
                min: 0,
                max: i64::from(PAIN_SCALE_MAX),
            });
        }
        Ok(())
    }
}
