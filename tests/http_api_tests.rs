#![cfg(feature = "http_api")]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use serde_json::{Value, json};
use shift_rota::holiday::NoHolidays;
use shift_rota::http_api;
use shift_rota::persistence::MemoryStore;
use shift_rota::service::RotaService;
use tower::util::ServiceExt;

fn new_router() -> axum::Router {
    let service = RotaService::new(Arc::new(MemoryStore::new()), Arc::new(NoHolidays));
    http_api::router(http_api::AppState::new(service))
}

fn load_request() -> Value {
    json!([{
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
            "B": {"Monday": [{"start": "08:00", "end": "12:00"}]}
        }
    }])
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            request = request.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&value).unwrap())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn health_reports_ok() {
    let app = new_router();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn load_and_read_back_schedule() {
    let app = new_router();

    let (status, summary) = send(&app, "POST", "/api/employees/load", Some(load_request())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["status"], json!("loaded"));
    assert_eq!(summary["slotCounts"]["Alice"], json!(5));

    let (status, again) = send(&app, "POST", "/api/employees/load", Some(load_request())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["status"], json!("unchanged"));

    let (status, employees) = send(&app, "GET", "/api/employees", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(employees[0]["name"], json!("Alice"));
    assert_eq!(employees[0]["startDate"], json!("2024-01-08"));
    let id = employees[0]["id"].as_i64().unwrap();

    let (status, month) = send(
        &app,
        "GET",
        &format!("/api/employees/{id}/schedule?month=March&year=2024"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(month["totalHours"], json!(41.0));
    assert_eq!(month["holidaysAvailable"], json!(true));
    let days = month["days"].as_array().unwrap();
    assert_eq!(days.len(), 31);
    assert_eq!(days[4]["date"], json!("2024-03-05"));
    assert_eq!(days[4]["dayName"], json!("Tuesday"));
    assert_eq!(days[4]["timeSlots"][1], json!({"start": "13:00", "end": "17:45"}));
    assert_eq!(days[11]["timeSlots"], json!([]));

    let (status, weeks) = send(&app, "GET", &format!("/api/employees/{id}/weeks"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(weeks[0]["weekType"], json!("A"));
    assert_eq!(weeks[1]["days"][0]["timeSlots"][0]["start"], json!("08:00"));

    let (status, report) = send(&app, "GET", "/api/report?month=March&year=2024", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report[0]["totalHours"], json!(41.0));
}

#[tokio::test]
async fn invalid_load_is_a_bad_request() {
    let app = new_router();
    let mut request = load_request();
    request[0]["weeks"]["A"]["Tuesday"][0]["start"] = json!("25:00");

    let (status, body) = send(&app, "POST", "/api/employees/load", Some(request)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("invalid_request"));
    assert!(body["message"].as_str().unwrap().contains("25:00"));

    let (_, employees) = send(&app, "GET", "/api/employees", None).await;
    assert_eq!(employees, json!([]));
}

#[tokio::test]
async fn unknown_month_and_employee_map_to_errors() {
    let app = new_router();
    send(&app, "POST", "/api/employees/load", Some(load_request())).await;

    let (status, body) = send(&app, "GET", "/api/employees/1/schedule?month=Foo&year=2024", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("invalid_request"));

    let (status, body) = send(&app, "GET", "/api/employees/77/weeks", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("not_found"));
}

#[tokio::test]
async fn delete_and_reset() {
    let app = new_router();
    send(&app, "POST", "/api/employees/load", Some(load_request())).await;

    let (status, _) = send(&app, "DELETE", "/api/employees/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, body) = send(&app, "DELETE", "/api/employees/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("not_found"));

    let (status, _) = send(&app, "POST", "/api/db/reset", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, employees) = send(&app, "GET", "/api/employees", None).await;
    assert_eq!(employees, json!([]));
}

#[tokio::test]
async fn malformed_query_and_path_get_json_errors() {
    let app = new_router();
    send(&app, "POST", "/api/employees/load", Some(load_request())).await;

    let (status, body) = send(&app, "GET", "/api/employees/1/schedule?month=March", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("invalid_request"));
    assert!(body["message"].as_str().unwrap().contains("year"));

    let (status, body) = send(&app, "GET", "/api/report?month=March&year=soon", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("invalid_request"));

    let (status, body) = send(&app, "GET", "/api/employees/alice/weeks", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("invalid_request"));

    let (status, body) = send(&app, "DELETE", "/api/employees/alice", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("invalid_request"));
}
