use std::fmt::Write;

use fisio_core::calendar::{GridCell, YearMonth};
use fisio_core::models::appointment::Appointment;
use fisio_core::models::assessment::Assessment;
use fisio_core::models::evolution::Evolution;
use fisio_core::models::patient::{Patient, PatientStatus};
use fisio_core::models::user::User;

const WEEKDAYS: [&str; 7] = ["Dom", "Seg", "Ter", "Qua", "Qui", "Sex", "Sáb"];
const CELL_WIDTH: usize = 5;

/// Sunday-first month grid. Days with appointments carry their count,
/// e.g. ` 12·2`.
pub fn month_grid(month: YearMonth, cells: &[GridCell<'_>]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{month}");
    for name in WEEKDAYS {
        let _ = write!(out, "{name:<CELL_WIDTH$}");
    }
    out.push('\n');

    for week in cells.chunks(7) {
        let mut line = String::new();
        for cell in week {
            let text = match cell.date {
                None => String::new(),
                Some(date) if cell.appointments.is_empty() => format!("{:>3}", date.day()),
                Some(date) => format!("{:>3}·{}", date.day(), cell.appointments.len()),
            };
            let _ = write!(line, "{text:<CELL_WIDTH$}");
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

pub fn appointment_line(a: &Appointment) -> String {
    let mut line = format!("#{:<6} {} {}  {}  ({})", a.id, a.date, a.time, a.patient_name, a.kind);
    if a.is_recurring() {
        line.push_str("  [semanal]");
    }
    if let Some(notes) = &a.notes {
        let _ = write!(line, "  {notes}");
    }
    line
}

pub fn patient_line(p: &Patient) -> String {
    let status = match p.status {
        PatientStatus::Active => "ativo",
        PatientStatus::Archived => "alta",
    };
    format!(
        "#{:<4} {:<30} {:<16} {:<15} {status}",
        p.id,
        p.name,
        p.phone,
        p.cpf.as_deref().unwrap_or("-"),
    )
}

pub fn profile(user: &User) -> String {
    let mut out = format!("{} <{}>", user.name, user.email);
    if let Some(role) = &user.role {
        let _ = write!(out, "\nrole: {role}");
    }
    if let Some(crefito) = &user.crefito {
        let _ = write!(out, "\nCREFITO: {crefito}");
    }
    out
}

pub fn assessment(a: &Assessment) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Queixa principal: {}", a.complaint);
    let _ = writeln!(out, "Diagnóstico: {}", a.diagnosis);
    if let Some(pain) = a.pain_level {
        let _ = writeln!(out, "Dor (EVA): {pain}/10");
    }
    let optional = [
        ("HDA", &a.hda),
        ("HPP", &a.hpp),
        ("Sinais vitais", &a.vitals),
        ("Respiratório", &a.respiratory),
        ("Neurológico", &a.neurological),
        ("Testes funcionais", &a.functional_tests),
        ("Inspeção", &a.inspection),
        ("ADM", &a.rom),
        ("Deambulação", &a.ambulation),
        ("Tônus", &a.tonus),
        ("Objetivo", &a.treatment_goal),
        ("Conduta", &a.treatment_conduct),
        ("Plano", &a.plan),
    ];
    for (label, value) in optional {
        if let Some(value) = value {
            let _ = writeln!(out, "{label}: {value}");
        }
    }
    out
}

pub fn evolution(e: &Evolution) -> String {
    let mut out = format!("{}\n  S: {}\n", e.date.strftime("%Y-%m-%d %H:%M"), e.subjective);
    if let Some(o) = &e.objective {
        let _ = writeln!(out, "  O: {o}");
    }
    let _ = writeln!(out, "  A: {}", e.assessment);
    if let Some(p) = &e.plan {
        let _ = writeln!(out, "  P: {p}");
    }
    out
}
