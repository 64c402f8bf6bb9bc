mod common;

use std::sync::Arc;
use std::sync::atomic::AtomicI64;

use jiff::civil::date;
use serde_json::json;

use common::{FakeTransport, Reply, client, echo_created};
use fisio_client::agenda::{Agenda, DEFAULT_KIND, ScheduleError, ScheduleForm, ScheduleOutcome};
use fisio_client::error::ClientError;
use fisio_client::mock::MockStore;
use fisio_client::transport::{HttpResponse, Method};
use fisio_core::models::patient::Patient;
use fisio_core::recurrence::WeekCount;

async fn demo_patients() -> Vec<Patient> {
    MockStore::seeded().patients().await
}

fn form(patient_id: Option<i64>, time: &str) -> ScheduleForm {
    ScheduleForm {
        patient_id,
        time: time.to_string(),
        kind: String::new(),
        notes: None,
        repeat: None,
    }
}

fn offline_agenda() -> (Agenda, Arc<FakeTransport>) {
    let transport = FakeTransport::unreachable();
    let api = Arc::new(client(transport.clone()));
    (Agenda::new(api, date(2024, 1, 29)), transport)
}

#[tokio::test]
async fn missing_patient_is_rejected_without_network() {
    let (mut agenda, transport) = offline_agenda();
    let patients = demo_patients().await;

    let err = agenda.schedule(form(None, "09:00"), &patients).await.unwrap_err();
    assert!(matches!(err, ScheduleError::Validation(_)));
    let err = agenda.schedule(form(Some(99), "09:00"), &patients).await.unwrap_err();
    assert!(matches!(err, ScheduleError::Validation(_)));
    assert_eq!(transport.count(), 0);
}

#[tokio::test]
async fn archived_patient_cannot_be_scheduled() {
    let (mut agenda, transport) = offline_agenda();
    let patients = demo_patients().await;

    let err = agenda.schedule(form(Some(3), "09:00"), &patients).await.unwrap_err();
    assert!(matches!(err, ScheduleError::Validation(_)));
    assert!(!err.requires_login());
    assert_eq!(transport.count(), 0);
}

#[tokio::test]
async fn empty_or_malformed_time_is_rejected() {
    let (mut agenda, transport) = offline_agenda();
    let patients = demo_patients().await;

    for bad in ["", "25:00", "nine"] {
        let err = agenda.schedule(form(Some(1), bad), &patients).await.unwrap_err();
        assert!(matches!(err, ScheduleError::Validation(_)), "accepted {bad:?}");
    }
    assert_eq!(transport.count(), 0);
}

#[tokio::test]
async fn single_appointment_lands_on_selected_day() {
    let (mut agenda, _) = offline_agenda();
    let patients = demo_patients().await;
    agenda.select(date(2024, 1, 15));

    let outcome = agenda.schedule(form(Some(1), "14:30"), &patients).await.unwrap();
    let ScheduleOutcome::Single(created) = outcome else {
        panic!("expected a single appointment");
    };
    assert_eq!(created.date, date(2024, 1, 15));
    assert_eq!(created.kind, DEFAULT_KIND);
    assert_eq!(created.patient_name, "Maria Silva (Demo)");
    assert!(!created.is_recurring());

    // The agenda reloaded after the write.
    let today = agenda.selected_appointments();
    assert_eq!(today.len(), 1);
    assert_eq!(today[0].id, created.id);
}

#[tokio::test]
async fn weekly_repeat_creates_one_per_week() {
    let (mut agenda, transport) = offline_agenda();
    let patients = demo_patients().await;
    let request = ScheduleForm {
        repeat: Some(WeekCount::clamped(4)),
        kind: "Avaliação".to_string(),
        ..form(Some(2), "08:00")
    };

    let outcome = agenda.schedule(request, &patients).await.unwrap();
    assert_eq!(outcome.created(), 4);
    assert_eq!(transport.count_of(Method::Post), 4);

    // Only the first occurrence falls inside January.
    assert_eq!(agenda.appointments().len(), 1);

    agenda.navigate(1).unwrap();
    agenda.refresh().await.unwrap();
    let dates: Vec<_> = agenda.appointments().iter().map(|a| a.date).collect();
    assert_eq!(dates, vec![date(2024, 2, 5), date(2024, 2, 12), date(2024, 2, 19)]);
    assert!(agenda.appointments().iter().all(|a| a.is_recurring()));
    assert!(agenda.appointments().iter().all(|a| a.kind == "Avaliação"));
}

#[tokio::test]
async fn partial_batch_reports_aggregate_failure() {
    let ids = AtomicI64::new(500);
    let transport = FakeTransport::new(move |req| {
        if req.method == Method::Get {
            return Reply::Respond(Ok(HttpResponse::json(200, &json!([]))));
        }
        let body: serde_json::Value = serde_json::from_slice(req.body.as_deref().unwrap()).unwrap();
        if body["date"] == "2024-02-12" {
            Reply::Respond(Ok(HttpResponse::json(500, &json!({ "error": "conflict" }))))
        } else {
            echo_created(req, &ids)
        }
    });
    let api = Arc::new(client(transport.clone()));
    let mut agenda = Agenda::new(api, date(2024, 1, 29));
    let patients = demo_patients().await;

    let request = ScheduleForm {
        repeat: Some(WeekCount::clamped(4)),
        ..form(Some(1), "10:00")
    };
    let err = agenda.schedule(request, &patients).await.unwrap_err();

    match err {
        ScheduleError::PartialBatch { failed, total, cause } => {
            assert_eq!(failed, 1);
            assert_eq!(total, 4);
            assert_eq!(cause.to_string(), "conflict");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(transport.count_of(Method::Post), 4);
    // Reload still happens after a partial failure.
    assert_eq!(transport.count_of(Method::Get), 1);
}

#[tokio::test]
async fn expired_session_during_schedule_requires_login() {
    let api = Arc::new(client(FakeTransport::always(401, json!({}))));
    let mut agenda = Agenda::new(api, date(2024, 1, 29));
    let patients = demo_patients().await;

    let err = agenda.schedule(form(Some(1), "09:00"), &patients).await.unwrap_err();
    assert!(err.requires_login());
}

#[tokio::test]
async fn cancelling_removes_only_that_appointment() {
    let (mut agenda, _) = offline_agenda();
    let patients = demo_patients().await;

    for time in ["08:00", "09:00", "10:00"] {
        agenda.schedule(form(Some(1), time), &patients).await.unwrap();
    }
    let before: Vec<i64> = agenda.appointments().iter().map(|a| a.id).collect();
    assert_eq!(before.len(), 3);

    agenda.cancel_appointment(before[1]).await.unwrap();

    let after: Vec<i64> = agenda.appointments().iter().map(|a| a.id).collect();
    assert_eq!(after, vec![before[0], before[2]]);
    assert_eq!(agenda.selected_appointments().len(), 2);
}

#[tokio::test]
async fn grid_cells_carry_the_day_appointments() {
    let (mut agenda, _) = offline_agenda();
    let patients = demo_patients().await;
    agenda.schedule(form(Some(1), "09:00"), &patients).await.unwrap();

    let cells = agenda.cells();
    // January 2024 starts on a Monday.
    assert_eq!(cells.len(), 1 + 31);
    assert!(cells[0].date.is_none());
    let busy: Vec<_> = cells.iter().filter(|c| !c.appointments.is_empty()).collect();
    assert_eq!(busy.len(), 1);
    assert_eq!(busy[0].date, Some(date(2024, 1, 29)));
}

#[tokio::test]
async fn navigation_cancels_the_superseded_load() {
    let transport = FakeTransport::new(|req| {
        if req.path.contains("startDate=2024-01-01") {
            Reply::Stall
        } else {
            Reply::Respond(Ok(HttpResponse::json(200, &json!([]))))
        }
    });
    let api = Arc::new(client(transport.clone()));
    let mut agenda = Agenda::new(api, date(2024, 1, 29));

    let january = agenda.begin_load();
    let january_scope = january.scope().clone();

    let (stale, fresh) = tokio::join!(january.fetch(), async {
        tokio::task::yield_now().await;
        let february = agenda.navigate(1).unwrap();
        february.fetch().await
    });

    assert!(january_scope.is_cancelled());
    assert!(matches!(stale, Err(ClientError::Cancelled)));
    assert!(agenda.apply(fresh.unwrap()));
    assert_eq!(agenda.month().month(), 2);
}

#[tokio::test]
async fn late_result_for_an_old_month_is_discarded() {
    let (mut agenda, _) = offline_agenda();

    let january = agenda.begin_load().fetch().await.unwrap();
    let march = agenda.navigate(2).unwrap().fetch().await.unwrap();

    assert!(!agenda.apply(january));
    assert!(agenda.apply(march));
    assert_eq!(agenda.month().month(), 3);
}
