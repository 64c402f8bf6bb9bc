//! Month grids and the date → appointments index behind the agenda view.
//!
//! Weekday indexing is fixed at 0 = Sunday. Months are addressed zero-based
//! at the edges (`0` = January) and roll over into adjacent years, so
//! navigating back from January or forward from December needs no special
//! casing by the caller.

use std::collections::BTreeMap;
use std::fmt;

use jiff::ToSpan;
use jiff::civil::Date;

use crate::error::CoreError;
use crate::models::appointment::Appointment;

/// A calendar month, held as its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth(Date);

impl YearMonth {
    /// Build from a year and a zero-based month. Months outside `0..12`
    /// roll over (`-1` is December of the previous year, `12` is January of
    /// the next).
    pub fn from_zero_based(year: i32, month0: i32) -> Result<Self, CoreError> {
        let total = i64::from(year) * 12 + i64::from(month0);
        let rolled_year = total.div_euclid(12);
        let rolled_month = total.rem_euclid(12) + 1;

        let year = i16::try_from(rolled_year)
            .map_err(|_| CoreError::InvalidDate(format!("year {rolled_year} out of range")))?;
        // rem_euclid(12) + 1 is always within 1..=12
        let month = rolled_month as i8;

        Date::new(year, month, 1)
            .map(Self)
            .map_err(|e| CoreError::InvalidDate(e.to_string()))
    }

    /// The month containing `date`.
    pub fn of(date: Date) -> Self {
        Self(date.first_of_month())
    }

    pub fn year(&self) -> i16 {
        self.0.year()
    }

    /// One-based month number.
    pub fn month(&self) -> i8 {
        self.0.month()
    }

    pub fn month0(&self) -> i8 {
        self.0.month() - 1
    }

    pub fn first_day(&self) -> Date {
        self.0
    }

    pub fn last_day(&self) -> Date {
        self.0.last_of_month()
    }

    pub fn days_in_month(&self) -> i8 {
        self.0.days_in_month()
    }

    /// Number of empty slots before the 1st in a Sunday-first week.
    pub fn leading_blanks(&self) -> usize {
        self.0.weekday().to_sunday_zero_offset() as usize
    }

    pub fn contains(&self, date: Date) -> bool {
        date.year() == self.0.year() && date.month() == self.0.month()
    }

    /// Shift by whole months.
    pub fn offset(&self, delta: i32) -> Result<Self, CoreError> {
        Self::from_zero_based(i32::from(self.year()), i32::from(self.month0()) + delta)
    }

    /// Inclusive range used for the appointments query.
    pub fn range(&self) -> (Date, Date) {
        (self.first_day(), self.last_day())
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.0.year(), self.0.month())
    }
}

/// Leading blanks followed by one slot per day of the month.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    month: YearMonth,
    cells: Vec<Option<Date>>,
}

impl MonthGrid {
    pub fn new(month: YearMonth) -> Self {
        let blanks = month.leading_blanks();
        let days = month.days_in_month() as usize;

        let mut cells = Vec::with_capacity(blanks + days);
        cells.resize(blanks, None);
        cells.extend(month.first_day().series(1.day()).take(days).map(Some));

        Self { month, cells }
    }

    pub fn for_month(year: i32, month0: i32) -> Result<Self, CoreError> {
        Ok(Self::new(YearMonth::from_zero_based(year, month0)?))
    }

    pub fn month(&self) -> YearMonth {
        self.month
    }

    pub fn cells(&self) -> &[Option<Date>] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn leading_blanks(&self) -> usize {
        self.cells.iter().take_while(|c| c.is_none()).count()
    }

    pub fn dates(&self) -> impl Iterator<Item = Date> + '_ {
        self.cells.iter().flatten().copied()
    }

    /// Pair every slot with the appointments of its date.
    pub fn annotate<'a>(&self, index: &'a DayIndex) -> Vec<GridCell<'a>> {
        self.cells
            .iter()
            .map(|cell| match cell {
                Some(date) => GridCell {
                    date: Some(*date),
                    appointments: index.on(*date),
                },
                None => GridCell {
                    date: None,
                    appointments: &[],
                },
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct GridCell<'a> {
    pub date: Option<Date>,
    pub appointments: &'a [Appointment],
}

/// Appointments grouped by date. Within a date the source order is kept,
/// so a list already sorted by time stays sorted.
///
/// Always rebuilt from the full collection; there is no incremental
/// insert or remove.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DayIndex {
    by_date: BTreeMap<Date, Vec<Appointment>>,
}

impl DayIndex {
    pub fn build(appointments: &[Appointment]) -> Self {
        let mut by_date: BTreeMap<Date, Vec<Appointment>> = BTreeMap::new();
        for appointment in appointments {
            by_date
                .entry(appointment.date)
                .or_default()
                .push(appointment.clone());
        }
        Self { by_date }
    }

    pub fn on(&self, date: Date) -> &[Appointment] {
        self.by_date.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn dates(&self) -> impl Iterator<Item = Date> + '_ {
        self.by_date.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Date, &[Appointment])> + '_ {
        self.by_date.iter().map(|(d, apps)| (*d, apps.as_slice()))
    }

    /// Total number of appointments across all dates.
    pub fn len(&self) -> usize {
        self.by_date.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }
}

pub fn group_by_date(appointments: &[Appointment]) -> DayIndex {
    DayIndex::build(appointments)
}
