use jiff::civil::date;

use fisio_cli::render;
use fisio_core::calendar::{DayIndex, MonthGrid, YearMonth};
use fisio_core::models::appointment::{Appointment, TimeOfDay};
use fisio_core::models::patient::{Patient, PatientStatus};

fn appointment(id: i64, day: i8) -> Appointment {
    Appointment {
        id,
        patient_id: 1,
        patient_name: "Maria Silva".to_string(),
        date: date(2024, 2, day),
        time: TimeOfDay::new(9, 30).unwrap(),
        kind: "Sessão".to_string(),
        notes: None,
        status: None,
        is_recurring: Some(true),
    }
}

#[test]
fn month_grid_starts_on_sunday() {
    // February 2024 starts on a Thursday.
    let month = YearMonth::of(date(2024, 2, 1));
    let apps = vec![appointment(1, 14), appointment(2, 14)];
    let index = DayIndex::build(&apps);
    let cells = MonthGrid::new(month).annotate(&index);

    let text = render::month_grid(month, &cells);
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines[0], "2024-02");
    assert!(lines[1].starts_with("Dom"));
    // Header, title, then five weeks.
    assert_eq!(lines.len(), 2 + 5);
    assert_eq!(lines[2].trim_start(), "1    2    3");
    assert!(lines[4].contains("14·2"));
    assert!(lines[6].trim_end().ends_with("29"));
}

#[test]
fn appointment_line_shows_time_and_recurrence() {
    let line = render::appointment_line(&appointment(42, 5));
    assert!(line.starts_with("#42"));
    assert!(line.contains("2024-02-05 09:30"));
    assert!(line.contains("Maria Silva"));
    assert!(line.contains("[semanal]"));
}

#[test]
fn patient_line_marks_discharged() {
    let p = Patient {
        id: 3,
        name: "Ana Costa".to_string(),
        cpf: None,
        phone: "(31) 97777-7777".to_string(),
        birth_date: None,
        status: PatientStatus::Archived,
        email: None,
        address: None,
    };
    let line = render::patient_line(&p);
    assert!(line.contains("Ana Costa"));
    assert!(line.ends_with("alta"));
}
