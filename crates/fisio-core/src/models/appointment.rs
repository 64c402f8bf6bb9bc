use std::fmt;
use std::str::FromStr;

use jiff::civil::{Date, Time};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use ts_rs::TS;

use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Appointment {
    pub id: i64,
    pub patient_id: i64,
    pub patient_name: String,
    pub date: Date,
    #[ts(type = "string")]
    pub time: TimeOfDay,
    /// Category label, e.g. "Sessão", "Avaliação", "Retorno".
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_recurring: Option<bool>,
}

/// Creation payload: an appointment without an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewAppointment {
    pub patient_id: i64,
    pub patient_name: String,
    pub date: Date,
    #[ts(type = "string")]
    pub time: TimeOfDay,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_recurring: Option<bool>,
}

impl NewAppointment {
    pub fn into_appointment(self, id: i64) -> Appointment {
        Appointment {
            id,
            patient_id: self.patient_id,
            patient_name: self.patient_name,
            date: self.date,
            time: self.time,
            kind: self.kind,
            notes: self.notes,
            status: None,
            is_recurring: self.is_recurring,
        }
    }
}

impl Appointment {
    pub fn is_recurring(&self) -> bool {
        self.is_recurring.unwrap_or(false)
    }
}

/// Order used by every appointment listing: date, then time of day.
pub fn sort_chronologically(appointments: &mut [Appointment]) {
    appointments.sort_by(|a, b| a.date.cmp(&b.date).then(a.time.cmp(&b.time)));
}

/// Wall-clock time of an appointment. Travels as `HH:mm` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(Time);

impl TimeOfDay {
    pub fn new(hour: i8, minute: i8) -> Result<Self, CoreError> {
        Time::new(hour, minute, 0, 0)
            .map(Self)
            .map_err(|e| CoreError::InvalidTime(e.to_string()))
    }

    pub fn hour(&self) -> i8 {
        self.0.hour()
    }

    pub fn minute(&self) -> i8 {
        self.0.minute()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0.hour(), self.0.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = CoreError;

    /// Accepts `HH:mm`, or `HH:mm:ss` as some servers echo back (the
    /// seconds are dropped). Every part is exactly two ASCII digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoreError::InvalidTime(s.to_string());
        let parts = s
            .trim()
            .split(':')
            .map(two_digits)
            .collect::<Option<Vec<i8>>>()
            .ok_or_else(invalid)?;

        match parts[..] {
            [hour, minute] => Self::new(hour, minute).map_err(|_| invalid()),
            [hour, minute, second] if second < 60 => Self::new(hour, minute).map_err(|_| invalid()),
            _ => Err(invalid()),
        }
    }
}

fn two_digits(part: &str) -> Option<i8> {
    if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
