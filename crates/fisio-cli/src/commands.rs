use std::sync::Arc;

use eyre::{Result, WrapErr, bail};
use tracing::warn;

use fisio_cli::render;
use fisio_client::agenda::{Agenda, ScheduleError, ScheduleForm, ScheduleOutcome};
use fisio_client::api::ApiClient;
use fisio_client::config;
use fisio_client::error::ClientError;
use fisio_client::session::SessionStore;
use fisio_core::calendar::YearMonth;
use fisio_core::models::assessment::Assessment;
use fisio_core::models::evolution::SoapNote;
use fisio_core::models::patient::{self, NewPatient};
use fisio_core::recurrence::WeekCount;

use crate::{AgendaCommand, AssessmentCommand, NotesCommand, PatientsCommand};

pub struct Context {
    api: Arc<ApiClient>,
}

/// Whether `err` came from a rejected credential somewhere down the chain.
pub fn requires_login(err: &eyre::Report) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<ClientError>()
            .is_some_and(ClientError::requires_login)
            || cause
                .downcast_ref::<ScheduleError>()
                .is_some_and(ScheduleError::requires_login)
    })
}

impl Context {
    pub fn open(api_url: Option<String>) -> Result<Self> {
        let mut config = config::load_config().wrap_err("failed to load config")?;
        if let Some(url) = api_url {
            config.api_url = url;
        }
        let session = SessionStore::persistent(SessionStore::default_path()?);
        let api = ApiClient::from_config(&config, Arc::new(session));
        Ok(Self { api: Arc::new(api) })
    }

    async fn ensure_logged_in(&self) -> Result<()> {
        if !self.api.session().is_authenticated().await {
            bail!("not logged in, run `fisio login` first");
        }
        Ok(())
    }

    fn note_offline(&self) {
        if self.api.is_offline() {
            warn!("API unreachable, showing offline data");
        }
    }

    pub async fn login(&self, identifier: &str, password: &str) -> Result<()> {
        let user = self.api.login(identifier, password).await?;
        println!("Bem-vindo(a), {}", user.name);
        self.note_offline();
        Ok(())
    }

    pub async fn logout(&self) -> Result<()> {
        self.api.logout().await?;
        println!("Sessão encerrada");
        Ok(())
    }

    pub async fn profile(
        &self,
        name: Option<String>,
        email: Option<String>,
        crefito: Option<String>,
    ) -> Result<()> {
        self.ensure_logged_in().await?;
        let session = self.api.session();
        let Some(current) = session.user().await else {
            bail!("not logged in");
        };

        let user = if name.is_none() && email.is_none() && crefito.is_none() {
            current
        } else {
            session
                .update_profile(
                    name.unwrap_or(current.name),
                    email.unwrap_or(current.email),
                    crefito.or(current.crefito),
                )
                .await?
        };
        println!("{}", render::profile(&user));
        Ok(())
    }

    pub async fn patients(&self, command: PatientsCommand) -> Result<()> {
        self.ensure_logged_in().await?;
        match command {
            PatientsCommand::List { search, active } => {
                let all = self.api.get_patients().await?;
                self.note_offline();
                let term = search.unwrap_or_default();
                for p in patient::search(&all, &term) {
                    if active && p.is_archived() {
                        continue;
                    }
                    println!("{}", render::patient_line(p));
                }
            }
            PatientsCommand::Add {
                name,
                phone,
                cpf,
                birth_date,
                email,
                address,
            } => {
                let created = self
                    .api
                    .create_patient(NewPatient {
                        name,
                        cpf,
                        phone,
                        birth_date,
                        email,
                        address,
                    })
                    .await?;
                println!("{}", render::patient_line(&created));
            }
            PatientsCommand::Toggle { id } => {
                let all = self.api.get_patients().await?;
                let Some(found) = all.iter().find(|p| p.id == id) else {
                    bail!("patient {id} not found");
                };
                let updated = self.api.toggle_patient_status(found).await?;
                println!("{}", render::patient_line(&updated));
            }
        }
        Ok(())
    }

    pub async fn assessment(&self, command: AssessmentCommand) -> Result<()> {
        self.ensure_logged_in().await?;
        match command {
            AssessmentCommand::Show { patient } => match self.api.get_assessment(patient).await? {
                Some(a) => print!("{}", render::assessment(&a)),
                None => println!("Paciente {patient} ainda não foi avaliado"),
            },
            AssessmentCommand::Save {
                patient,
                complaint,
                diagnosis,
                pain,
                hda,
                hpp,
                goal,
                conduct,
                plan,
            } => {
                let saved = self
                    .api
                    .save_assessment(
                        patient,
                        Assessment {
                            complaint,
                            diagnosis,
                            pain_level: pain,
                            hda,
                            hpp,
                            treatment_goal: goal,
                            treatment_conduct: conduct,
                            plan,
                            ..Assessment::default()
                        },
                    )
                    .await?;
                print!("{}", render::assessment(&saved));
            }
        }
        self.note_offline();
        Ok(())
    }

    pub async fn notes(&self, command: NotesCommand) -> Result<()> {
        self.ensure_logged_in().await?;
        match command {
            NotesCommand::List { patient } => {
                let notes = self.api.get_evolutions(patient).await?;
                self.note_offline();
                if notes.is_empty() {
                    println!("Nenhuma evolução registrada");
                }
                for note in &notes {
                    print!("{}", render::evolution(note));
                }
            }
            NotesCommand::Add {
                patient,
                subjective,
                objective,
                assessment,
                plan,
            } => {
                let note = SoapNote {
                    date: None,
                    subjective,
                    objective,
                    assessment,
                    plan,
                };
                let saved = self.api.create_evolution(patient, note).await?;
                print!("{}", render::evolution(&saved));
            }
        }
        Ok(())
    }

    pub async fn agenda(&self, command: AgendaCommand) -> Result<()> {
        self.ensure_logged_in().await?;
        let today = jiff::Zoned::now().date();

        match command {
            AgendaCommand::Show { year, month } => {
                let shown = match (year, month) {
                    (None, None) => today,
                    (year, month) => {
                        let year = year.unwrap_or(i32::from(today.year()));
                        let month0 = month.map_or(i32::from(today.month()) - 1, |m| m - 1);
                        YearMonth::from_zero_based(year, month0)?.first_day()
                    }
                };
                let mut agenda = Agenda::new(Arc::clone(&self.api), shown);
                agenda.refresh().await?;
                self.note_offline();

                print!("{}", render::month_grid(agenda.month(), &agenda.cells()));
                println!();
                for a in agenda.appointments() {
                    println!("{}", render::appointment_line(a));
                }
            }
            AgendaCommand::Day { date } => {
                let mut agenda = Agenda::new(Arc::clone(&self.api), date);
                agenda.refresh().await?;
                self.note_offline();

                let day = agenda.selected_appointments();
                if day.is_empty() {
                    println!("Nenhum agendamento em {date}");
                }
                for a in day {
                    println!("{}", render::appointment_line(a));
                }
            }
            AgendaCommand::Schedule {
                date,
                time,
                patient,
                kind,
                notes,
                weeks,
            } => {
                let patients = self.api.get_patients().await?;
                let mut agenda = Agenda::new(Arc::clone(&self.api), date);
                let form = ScheduleForm {
                    patient_id: Some(patient),
                    time,
                    kind,
                    notes,
                    repeat: weeks.as_deref().map(|w| WeekCount::from_input(Some(w))),
                };

                match agenda.schedule(form, &patients).await? {
                    ScheduleOutcome::Single(a) => {
                        println!("{}", render::appointment_line(&a));
                    }
                    ScheduleOutcome::Recurring(created) => {
                        println!("{} agendamentos criados", created.len());
                        for a in &created {
                            println!("{}", render::appointment_line(a));
                        }
                    }
                }
                self.note_offline();
            }
            AgendaCommand::Cancel { id } => {
                self.api.delete_appointment(id).await?;
                println!("Agendamento #{id} cancelado");
            }
        }
        Ok(())
    }
}
