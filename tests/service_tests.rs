use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;
use shift_rota::error::RotaError;
use shift_rota::holiday::NoHolidays;
use shift_rota::persistence::{EmployeeStore, MemoryStore};
use shift_rota::phase::PhaseRule;
use shift_rota::service::{LoadStatus, RotaService};

fn payload() -> serde_json::Value {
    json!([
        {
            "name": "Alice",
            "startDate": "2024-01-08",
            "weeks": {
                "A": {
                    "Tuesday": [
                        {"start": "09:00", "end": "12:00"},
                        {"start": "13:00", "end": "17:45"}
                    ],
                    "Wednesday": [
                        {"start": "09:00", "end": "12:00"},
                        {"start": "13:00", "end": "18:45"}
                    ]
                },
                "B": {
                    "Monday": [{"start": "08:00", "end": "12:00"}]
                }
            }
        },
        {
            "name": "Bob",
            "startDate": "2024-01-15",
            "weeks": {
                "A": {"Saturday": [{"start": "22:00", "end": "02:00"}]}
            }
        }
    ])
}

fn service() -> (Arc<MemoryStore>, RotaService) {
    let store = Arc::new(MemoryStore::new());
    let service = RotaService::new(store.clone(), Arc::new(NoHolidays));
    (store, service)
}

#[test]
fn load_then_identical_payload_is_unchanged() {
    let (store, service) = service();
    let first = service.load_payload(&payload().to_string()).unwrap();
    assert_eq!(first.status, LoadStatus::Loaded);
    assert_eq!(first.slot_counts.get("Alice"), Some(&5));
    assert_eq!(first.slot_counts.get("Bob"), Some(&1));
    assert_eq!(first.digest.len(), 64);
    assert_eq!(store.list_employees().unwrap().len(), 2);

    // Same content, different whitespace.
    let pretty = serde_json::to_string_pretty(&payload()).unwrap();
    let second = service.load_payload(&pretty).unwrap();
    assert_eq!(second.status, LoadStatus::Unchanged);
    assert_eq!(second.digest, first.digest);
}

#[test]
fn invalid_slot_rejects_the_whole_batch() {
    let (store, service) = service();
    let mut request = payload();
    request[1]["weeks"]["A"]["Saturday"][0]["start"] = json!("25:00");

    let err = service.load_payload(&request.to_string()).unwrap_err();
    match err {
        RotaError::Validation(err) => {
            assert!(err.message().contains("employee 'Bob'"), "{err}");
            assert!(err.message().contains("25:00"), "{err}");
        }
        other => panic!("expected a validation error, got {other}"),
    }
    assert!(store.list_employees().unwrap().is_empty());
    assert_eq!(store.load_digest().unwrap(), None);
}

#[test]
fn malformed_request_is_a_validation_error() {
    let (_, service) = service();
    assert!(matches!(
        service.load_payload("{\"name\": \"Alice\"}"),
        Err(RotaError::Validation(_))
    ));
    assert!(matches!(
        service.load_payload("not json"),
        Err(RotaError::Validation(_))
    ));
}

#[test]
fn reload_replaces_entries_and_keeps_anchor() {
    let (store, service) = service();
    service.load_payload(&payload().to_string()).unwrap();
    let alice = service.employee_id_by_name("Alice").unwrap();

    let update = json!([{
        "name": "Alice",
        "startDate": "2024-02-05",
        "weeks": {"B": {"Friday": [{"start": "10:00", "end": "14:00"}]}}
    }]);
    let summary = service.load_payload(&update.to_string()).unwrap();
    assert_eq!(summary.status, LoadStatus::Loaded);
    assert_eq!(summary.warnings.len(), 1);
    assert!(summary.warnings[0].contains("2024-01-08"));

    assert_eq!(
        store.employee_anchor(alice).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 8).unwrap()
    );
    let entries = store.schedule_entries(alice, None).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(store.list_employees().unwrap().len(), 2);
}

#[test]
fn monthly_hours_follow_the_rota() {
    let (_, service) = service();
    service.load_payload(&payload().to_string()).unwrap();
    let alice = service.employee_id_by_name("Alice").unwrap();

    // Two A weeks at 16.5h plus two B Mondays at 4h.
    let (projection, hours) = service.monthly_hours(alice, "March", 2024).unwrap();
    assert_eq!(projection.days.len(), 31);
    assert_eq!(hours, 41.0);
}

#[test]
fn continuous_rule_is_configurable() {
    let store = Arc::new(MemoryStore::new());
    let service = RotaService::new(store, Arc::new(NoHolidays)).with_phase_rule(PhaseRule::Continuous);
    assert_eq!(service.phase_rule(), PhaseRule::Continuous);
    service.load_payload(&payload().to_string()).unwrap();
    let alice = service.employee_id_by_name("Alice").unwrap();
    let (_, hours) = service.monthly_hours(alice, "March", 2024).unwrap();
    assert_eq!(hours, 41.0);
}

#[test]
fn weeks_ab_returns_both_canonical_weeks() {
    let (_, service) = service();
    service.load_payload(&payload().to_string()).unwrap();
    let bob = service.employee_id_by_name("Bob").unwrap();

    let weeks = service.weeks_ab(bob).unwrap();
    assert_eq!(weeks[0].days[5].day_name, "Saturday");
    assert_eq!(weeks[0].days[5].time_slots[0].start, "22:00");
    assert!(weeks[1].days.iter().all(|day| day.time_slots.is_empty()));

    assert!(matches!(service.weeks_ab(999), Err(RotaError::NotFound(_))));
}

#[test]
fn month_report_covers_every_employee() {
    let (_, service) = service();
    service.load_payload(&payload().to_string()).unwrap();

    let report = service.month_report("March", 2024).unwrap();
    assert_eq!(report.len(), 2);
    let alice = report.iter().find(|r| r.name == "Alice").unwrap();
    assert_eq!(alice.total_hours, 41.0);
    let bob = report.iter().find(|r| r.name == "Bob").unwrap();
    assert!(bob.total_hours > 0.0);

    assert!(matches!(
        service.month_report("Brumaire", 2024),
        Err(RotaError::InvalidMonth(_))
    ));
}

#[test]
fn delete_and_reset() {
    let (_, service) = service();
    service.load_payload(&payload().to_string()).unwrap();
    let bob = service.employee_id_by_name("Bob").unwrap();

    assert!(service.delete_employee(bob).unwrap());
    assert!(!service.delete_employee(bob).unwrap());
    assert!(matches!(
        service.employee_id_by_name("Bob"),
        Err(RotaError::NotFound(_))
    ));

    // Deleting invalidates the digest, so the same payload restores Bob.
    let summary = service.load_payload(&payload().to_string()).unwrap();
    assert_eq!(summary.status, LoadStatus::Loaded);
    assert!(service.employee_id_by_name("Bob").is_ok());

    service.reset().unwrap();
    assert!(service.employees().unwrap().is_empty());
    // The digest is gone too, so the same payload loads again.
    let summary = service.load_payload(&payload().to_string()).unwrap();
    assert_eq!(summary.status, LoadStatus::Loaded);
}
