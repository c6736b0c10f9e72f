use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::calendar::{DayProjection, HolidayStatus};
use crate::employee::{Employee, EmployeeId};
use crate::error::{RotaError, RotaResult};
use crate::service::{LoadSummary, MonthlyHours, RotaService};
use crate::template::WeekView;

#[derive(Clone)]
pub struct AppState {
    service: Arc<RotaService>,
}

impl AppState {
    pub fn new(service: RotaService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    pub fn with_shared(service: Arc<RotaService>) -> Self {
        Self { service }
    }

    /// Runs a blocking service call off the async worker threads.
    async fn run<T, F>(&self, call: F) -> Result<T, ApiError>
    where
        F: FnOnce(&RotaService) -> RotaResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let service = self.service.clone();
        tokio::task::spawn_blocking(move || call(service.as_ref()))
            .await
            .map_err(|err| ApiError::internal(format!("service task failed: {err}")))?
            .map_err(ApiError::from)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }
}

impl From<RotaError> for ApiError {
    fn from(value: RotaError) -> Self {
        match value {
            RotaError::Validation(err) => ApiError::Invalid(err.to_string()),
            err @ RotaError::InvalidMonth(_) => ApiError::Invalid(err.to_string()),
            RotaError::NotFound(what) => ApiError::NotFound(format!("{what} not found")),
            err @ (RotaError::Read(_) | RotaError::Write(_)) => {
                error!(error = %err, "storage failure");
                ApiError::Internal(err.to_string())
            }
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Invalid(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::Invalid(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    month: String,
    year: i32,
}

#[derive(Debug, Serialize)]
struct MonthScheduleBody {
    #[serde(rename = "employeeId")]
    employee_id: EmployeeId,
    year: i32,
    month: u32,
    days: Vec<DayProjection>,
    #[serde(rename = "totalHours")]
    total_hours: f64,
    #[serde(rename = "holidaysAvailable")]
    holidays_available: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/employees", get(list_employees))
        .route("/api/employees/load", post(load_employees))
        .route("/api/employees/:id", delete(delete_employee))
        .route("/api/employees/:id/schedule", get(month_schedule))
        .route("/api/employees/:id/weeks", get(weeks_ab))
        .route("/api/report", get(month_report))
        .route("/api/db/reset", post(reset))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, service: RotaService) -> std::io::Result<()> {
    let app = router(AppState::new(service));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "rota HTTP API listening");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_employees(State(state): State<AppState>) -> Result<Json<Vec<Employee>>, ApiError> {
    let employees = state.run(|service| service.employees()).await?;
    Ok(Json(employees))
}

/// Takes the raw body so the digest covers exactly what the client sent.
async fn load_employees(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<LoadSummary>, ApiError> {
    let summary = state
        .run(move |service| service.load_payload(&body))
        .await?;
    Ok(Json(summary))
}

async fn delete_employee(
    State(state): State<AppState>,
    employee_id: Result<Path<EmployeeId>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(employee_id) = employee_id?;
    let removed = state
        .run(move |service| service.delete_employee(employee_id))
        .await?;
    if !removed {
        return Err(ApiError::not_found(format!("employee {employee_id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn month_schedule(
    State(state): State<AppState>,
    employee_id: Result<Path<EmployeeId>, PathRejection>,
    query: Result<Query<MonthQuery>, QueryRejection>,
) -> Result<Json<MonthScheduleBody>, ApiError> {
    let Path(employee_id) = employee_id?;
    let Query(query) = query?;
    let (projection, total_hours) = state
        .run(move |service| service.monthly_hours(employee_id, &query.month, query.year))
        .await?;
    Ok(Json(MonthScheduleBody {
        employee_id,
        year: projection.year,
        month: projection.month,
        holidays_available: projection.holidays == HolidayStatus::Applied,
        days: projection.days,
        total_hours,
    }))
}

async fn weeks_ab(
    State(state): State<AppState>,
    employee_id: Result<Path<EmployeeId>, PathRejection>,
) -> Result<Json<[WeekView; 2]>, ApiError> {
    let Path(employee_id) = employee_id?;
    let weeks = state
        .run(move |service| service.weeks_ab(employee_id))
        .await?;
    Ok(Json(weeks))
}

async fn month_report(
    State(state): State<AppState>,
    query: Result<Query<MonthQuery>, QueryRejection>,
) -> Result<Json<Vec<MonthlyHours>>, ApiError> {
    let Query(query) = query?;
    let report = state
        .run(move |service| service.month_report(&query.month, query.year))
        .await?;
    Ok(Json(report))
}

async fn reset(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    state.run(|service| service.reset()).await?;
    Ok(StatusCode::NO_CONTENT)
}
