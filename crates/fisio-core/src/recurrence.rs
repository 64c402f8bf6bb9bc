//! Weekly recurrence expansion.

use std::num::IntErrorKind;

use jiff::ToSpan;
use jiff::civil::Date;

use crate::error::CoreError;
use crate::models::appointment::NewAppointment;

pub const MIN_WEEKS: u8 = 2;
pub const MAX_WEEKS: u8 = 12;
pub const DEFAULT_WEEKS: u8 = 4;

/// How many weekly occurrences to create, always within
/// [`MIN_WEEKS`]..=[`MAX_WEEKS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct WeekCount(u8);

impl WeekCount {
    /// Clamp any user-entered count into range. Zero and negative inputs
    /// become [`MIN_WEEKS`].
    pub fn clamped(weeks: i64) -> Self {
        Self(weeks.clamp(i64::from(MIN_WEEKS), i64::from(MAX_WEEKS)) as u8)
    }

    /// Parse the raw form value. Blank or non-numeric input falls back to
    /// [`DEFAULT_WEEKS`]; numbers too large for `i64` still clamp.
    pub fn from_input(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::default();
        };
        match raw.parse::<i64>() {
            Ok(weeks) => Self::clamped(weeks),
            Err(e) => match e.kind() {
                IntErrorKind::PosOverflow => Self(MAX_WEEKS),
                IntErrorKind::NegOverflow => Self(MIN_WEEKS),
                _ => Self::default(),
            },
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for WeekCount {
    fn default() -> Self {
        Self(DEFAULT_WEEKS)
    }
}

/// The dates `start, start + 7, …, start + 7·(weeks − 1)`, using calendar
/// day arithmetic so month and year boundaries come out right.
pub fn weekly_dates(start: Date, weeks: WeekCount) -> Result<Vec<Date>, CoreError> {
    (0..i64::from(weeks.get()))
        .map(|i| {
            start
                .checked_add((7 * i).days())
                .map_err(|_| CoreError::DateOverflow(start))
        })
        .collect()
}

/// A "repeat weekly" request: one base payload, fanned out over N weeks.
#[derive(Debug, Clone)]
pub struct RecurrenceRequest {
    pub base: NewAppointment,
    pub start: Date,
    pub weeks: WeekCount,
}

impl RecurrenceRequest {
    /// One creation payload per week. Every field except the date is copied
    /// from the base, and every occurrence is flagged as recurring.
    pub fn expand(&self) -> Result<Vec<NewAppointment>, CoreError> {
        let dates = weekly_dates(self.start, self.weeks)?;
        Ok(dates
            .into_iter()
            .map(|date| NewAppointment {
                date,
                is_recurring: Some(true),
                ..self.base.clone()
            })
            .collect())
    }
}
