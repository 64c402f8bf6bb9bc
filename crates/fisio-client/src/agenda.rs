//! Agenda controller: the month on screen, its appointments, and the
//! scheduling flow (validation, recurrence fan-out, reload).

use std::sync::Arc;

use jiff::civil::Date;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use fisio_core::calendar::{DayIndex, GridCell, MonthGrid, YearMonth};
use fisio_core::error::CoreError;
use fisio_core::models::appointment::{Appointment, NewAppointment, TimeOfDay};
use fisio_core::models::patient::Patient;
use fisio_core::recurrence::{RecurrenceRequest, WeekCount};

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::scope::RequestScope;

pub const DEFAULT_KIND: &str = "Sessão";

/// What the scheduling form submits.
#[derive(Debug, Clone, Default)]
pub struct ScheduleForm {
    pub patient_id: Option<i64>,
    pub time: String,
    pub kind: String,
    pub notes: Option<String>,
    /// `Some` repeats weekly for that many weeks.
    pub repeat: Option<WeekCount>,
}

#[derive(Debug)]
pub enum ScheduleOutcome {
    Single(Appointment),
    Recurring(Vec<Appointment>),
}

impl ScheduleOutcome {
    pub fn created(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Recurring(apps) => apps.len(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    /// Rejected locally; nothing was sent.
    #[error("{0}")]
    Validation(String),

    /// Some occurrences of a recurring request were not saved. The ones that
    /// were saved stay in place.
    #[error("failed to save {failed} of {total} appointments: {cause}")]
    PartialBatch {
        failed: usize,
        total: usize,
        cause: ClientError,
    },

    #[error(transparent)]
    Client(#[from] ClientError),
}

impl ScheduleError {
    pub fn requires_login(&self) -> bool {
        match self {
            Self::Validation(_) => false,
            Self::PartialBatch { cause, .. } => cause.requires_login(),
            Self::Client(e) => e.requires_login(),
        }
    }
}

impl From<CoreError> for ScheduleError {
    fn from(e: CoreError) -> Self {
        Self::Validation(e.to_string())
    }
}

/// A pending fetch of one month. Detached from the [`Agenda`] so the caller
/// can await it while the user keeps navigating.
pub struct MonthLoad {
    api: Arc<ApiClient>,
    month: YearMonth,
    scope: RequestScope,
}

pub struct LoadedMonth {
    month: YearMonth,
    scope_id: Uuid,
    appointments: Vec<Appointment>,
}

impl MonthLoad {
    pub fn month(&self) -> YearMonth {
        self.month
    }

    pub fn scope(&self) -> &RequestScope {
        &self.scope
    }

    pub async fn fetch(self) -> Result<LoadedMonth, ClientError> {
        let (start, end) = self.month.range();
        let appointments = self
            .scope
            .run(self.api.get_appointments_range(start, end))
            .await?;
        Ok(LoadedMonth {
            month: self.month,
            scope_id: self.scope.id(),
            appointments,
        })
    }
}

pub struct Agenda {
    api: Arc<ApiClient>,
    month: YearMonth,
    selected: Date,
    appointments: Vec<Appointment>,
    index: DayIndex,
    load_scope: Option<RequestScope>,
}

impl Agenda {
    /// Opens on the month containing `today`, with `today` selected.
    pub fn new(api: Arc<ApiClient>, today: Date) -> Self {
        Self {
            api,
            month: YearMonth::of(today),
            selected: today,
            appointments: Vec::new(),
            index: DayIndex::default(),
            load_scope: None,
        }
    }

    pub fn month(&self) -> YearMonth {
        self.month
    }

    pub fn selected(&self) -> Date {
        self.selected
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn index(&self) -> &DayIndex {
        &self.index
    }

    pub fn grid(&self) -> MonthGrid {
        MonthGrid::new(self.month)
    }

    /// The grid with each day's appointments attached.
    pub fn cells(&self) -> Vec<GridCell<'_>> {
        self.grid().annotate(&self.index)
    }

    pub fn select(&mut self, date: Date) {
        self.selected = date;
    }

    pub fn selected_appointments(&self) -> &[Appointment] {
        self.index.on(self.selected)
    }

    /// Start loading the current month, cancelling any load still in flight.
    pub fn begin_load(&mut self) -> MonthLoad {
        if let Some(previous) = self.load_scope.take() {
            previous.cancel();
        }
        let scope = RequestScope::new();
        self.load_scope = Some(scope.clone());
        MonthLoad {
            api: Arc::clone(&self.api),
            month: self.month,
            scope,
        }
    }

    /// Move by whole months and start loading the new one.
    pub fn navigate(&mut self, delta: i32) -> Result<MonthLoad, CoreError> {
        self.month = self.month.offset(delta)?;
        Ok(self.begin_load())
    }

    /// Install a finished load. Returns `false` (and changes nothing) when
    /// the load was superseded by a later one.
    pub fn apply(&mut self, loaded: LoadedMonth) -> bool {
        let current = self.load_scope.as_ref().map(RequestScope::id);
        if current != Some(loaded.scope_id) || loaded.month != self.month {
            info!(month = %loaded.month, "discarding stale month load");
            return false;
        }
        self.load_scope = None;
        self.replace_appointments(loaded.appointments);
        true
    }

    /// Load the current month and install it.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let loaded = self.begin_load().fetch().await?;
        self.apply(loaded);
        Ok(())
    }

    fn replace_appointments(&mut self, appointments: Vec<Appointment>) {
        let month = self.month;
        self.appointments = appointments
            .into_iter()
            .filter(|a| month.contains(a.date))
            .collect();
        self.index = DayIndex::build(&self.appointments);
    }

    /// Validate the form against the known patients, then create one
    /// appointment on the selected date or a weekly series starting there.
    ///
    /// Validation failures never reach the network.
    pub async fn schedule(
        &mut self,
        form: ScheduleForm,
        patients: &[Patient],
    ) -> Result<ScheduleOutcome, ScheduleError> {
        let repeat = form.repeat;
        let base = self.validate(form, patients)?;

        let outcome = match repeat {
            None => {
                let created = self.api.create_appointment(base).await?;
                info!(appointment_id = created.id, date = %created.date, "appointment created");
                ScheduleOutcome::Single(created)
            }
            Some(weeks) => {
                let request = RecurrenceRequest {
                    start: self.selected,
                    weeks,
                    base,
                };
                let batch = request.expand()?;
                let total = batch.len();

                let mut created = Vec::with_capacity(total);
                let mut failures = Vec::new();
                for result in self.api.create_appointments(batch).await {
                    match result {
                        Ok(app) => created.push(app),
                        Err(e) => failures.push(e),
                    }
                }

                if let Some(cause) = failures.into_iter().next() {
                    let failed = total - created.len();
                    error!(failed, total, error = %cause, "recurring batch partially failed");
                    self.reload_after_write().await;
                    return Err(ScheduleError::PartialBatch {
                        failed,
                        total,
                        cause,
                    });
                }

                info!(count = total, start = %self.selected, "recurring appointments created");
                ScheduleOutcome::Recurring(created)
            }
        };

        self.reload_after_write().await;
        Ok(outcome)
    }

    fn validate(&self, form: ScheduleForm, patients: &[Patient]) -> Result<NewAppointment, ScheduleError> {
        let patient_id = form
            .patient_id
            .filter(|id| *id > 0)
            .ok_or_else(|| ScheduleError::Validation("no patient selected".to_string()))?;

        let patient = patients
            .iter()
            .find(|p| p.id == patient_id)
            .ok_or_else(|| ScheduleError::Validation(format!("unknown patient {patient_id}")))?;

        if patient.is_archived() {
            return Err(ScheduleError::Validation(format!(
                "{} is archived and cannot be scheduled",
                patient.name
            )));
        }

        let time: TimeOfDay = form
            .time
            .parse()
            .map_err(|_| ScheduleError::Validation(format!("invalid time: {:?}", form.time)))?;

        let kind = if form.kind.trim().is_empty() {
            DEFAULT_KIND.to_string()
        } else {
            form.kind
        };

        Ok(NewAppointment {
            patient_id,
            patient_name: patient.name.clone(),
            date: self.selected,
            time,
            kind,
            notes: form.notes.filter(|n| !n.trim().is_empty()),
            is_recurring: None,
        })
    }

    async fn reload_after_write(&mut self) {
        if let Err(e) = self.refresh().await {
            warn!(error = %e, "failed to reload agenda after write");
        }
    }

    /// Delete one appointment; on success it disappears from the view and
    /// every other appointment stays put.
    pub async fn cancel_appointment(&mut self, id: i64) -> Result<(), ClientError> {
        self.api.delete_appointment(id).await?;
        let remaining: Vec<Appointment> = std::mem::take(&mut self.appointments)
            .into_iter()
            .filter(|a| a.id != id)
            .collect();
        self.replace_appointments(remaining);
        Ok(())
    }
}
