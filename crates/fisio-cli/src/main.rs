use clap::{Parser, Subcommand};
use eyre::Result;

mod commands;

/// FisioManager: patients, assessments, session notes and agenda
#[derive(Parser, Debug)]
#[command(name = "fisio")]
#[command(version, about, long_about = None)]
struct Args {
    /// API base URL (overrides config file and FISIO_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the session
    Login {
        /// Email or username
        identifier: String,
        #[arg(short, long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show or edit the signed-in profile
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Professional registration number
        #[arg(long)]
        crefito: Option<String>,
    },
    /// Patient records
    Patients {
        #[command(subcommand)]
        command: PatientsCommand,
    },
    /// Clinical assessment of a patient
    Assessment {
        #[command(subcommand)]
        command: AssessmentCommand,
    },
    /// Session notes (SOAP)
    Notes {
        #[command(subcommand)]
        command: NotesCommand,
    },
    /// Calendar and scheduling
    Agenda {
        #[command(subcommand)]
        command: AgendaCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum PatientsCommand {
    /// List patients
    List {
        /// Filter by name, CPF or phone
        #[arg(short, long)]
        search: Option<String>,
        /// Hide discharged patients
        #[arg(long)]
        active: bool,
    },
    /// Register a new patient
    Add {
        name: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long)]
        cpf: Option<String>,
        /// YYYY-MM-DD
        #[arg(long)]
        birth_date: Option<jiff::civil::Date>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        address: Option<String>,
    },
    /// Switch a patient between active and discharged
    Toggle { id: i64 },
}

#[derive(Subcommand, Debug)]
pub enum AssessmentCommand {
    /// Print the patient's assessment
    Show { patient: i64 },
    /// Create or replace the patient's assessment
    Save {
        patient: i64,
        #[arg(long)]
        complaint: String,
        #[arg(long)]
        diagnosis: String,
        /// 0 to 10
        #[arg(long)]
        pain: Option<u8>,
        #[arg(long)]
        hda: Option<String>,
        #[arg(long)]
        hpp: Option<String>,
        #[arg(long)]
        goal: Option<String>,
        #[arg(long)]
        conduct: Option<String>,
        #[arg(long)]
        plan: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum NotesCommand {
    /// List a patient's session notes, newest first
    List { patient: i64 },
    /// Record a session note
    Add {
        patient: i64,
        #[arg(short, long)]
        subjective: String,
        #[arg(short, long)]
        objective: Option<String>,
        #[arg(short, long)]
        assessment: String,
        #[arg(short, long)]
        plan: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum AgendaCommand {
    /// Month view (defaults to the current month)
    Show {
        #[arg(long)]
        year: Option<i32>,
        /// 1 to 12
        #[arg(long)]
        month: Option<i32>,
    },
    /// Appointments of one day
    Day { date: jiff::civil::Date },
    /// Book an appointment, optionally repeating weekly
    Schedule {
        date: jiff::civil::Date,
        /// HH:mm
        time: String,
        #[arg(short, long)]
        patient: i64,
        /// Appointment type
        #[arg(short, long, default_value = "")]
        kind: String,
        #[arg(short, long)]
        notes: Option<String>,
        /// Repeat weekly for N weeks (2 to 12)
        #[arg(short, long)]
        weeks: Option<String>,
    },
    /// Cancel an appointment
    Cancel { id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let ctx = commands::Context::open(args.api_url)?;

    let result = match args.command {
        Command::Login {
            identifier,
            password,
        } => ctx.login(&identifier, &password).await,
        Command::Logout => ctx.logout().await,
        Command::Profile {
            name,
            email,
            crefito,
        } => ctx.profile(name, email, crefito).await,
        Command::Patients { command } => ctx.patients(command).await,
        Command::Assessment { command } => ctx.assessment(command).await,
        Command::Notes { command } => ctx.notes(command).await,
        Command::Agenda { command } => ctx.agenda(command).await,
    };

    if let Err(e) = &result
        && commands::requires_login(e)
    {
        eyre::bail!("session expired, run `fisio login` again");
    }
    result
}
