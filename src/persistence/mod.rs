use crate::employee::{Employee, EmployeeId, ScheduleEntry};
use crate::holiday::Holiday;
use crate::phase::PhaseTag;
use crate::template::TemplateSlot;
use chrono::NaiveDate;
use serde_json::Error as SerdeJsonError;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] SerdeJsonError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("{0} not found")]
    NotFound(String),
}

impl PersistenceError {
    pub fn employee_not_found(id: EmployeeId) -> Self {
        PersistenceError::NotFound(format!("employee {id}"))
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Storage of employees and their weekly template rows.
pub trait EmployeeStore {
    fn create_employee(&self, name: &str, start_date: NaiveDate) -> PersistenceResult<Employee>;
    fn find_employee(&self, id: EmployeeId) -> PersistenceResult<Option<Employee>>;
    fn find_employee_by_name(&self, name: &str) -> PersistenceResult<Option<Employee>>;
    fn list_employees(&self) -> PersistenceResult<Vec<Employee>>;

    /// Entries of one employee, in insertion order. `None` returns both weeks.
    fn schedule_entries(
        &self,
        id: EmployeeId,
        phase: Option<PhaseTag>,
    ) -> PersistenceResult<Vec<ScheduleEntry>>;

    /// Replaces every entry of the employee with `entries` in one step.
    fn replace_schedule_entries(
        &self,
        id: EmployeeId,
        entries: &[ScheduleEntry],
    ) -> PersistenceResult<()>;

    /// Looks the employee up by name, creating it with `start_date` if absent,
    /// and replaces its entries with `slots`. Either all of it is stored or
    /// nothing is. An existing employee keeps its stored start date.
    fn upsert_employee_with_entries(
        &self,
        name: &str,
        start_date: NaiveDate,
        slots: &[TemplateSlot],
    ) -> PersistenceResult<Employee>;

    /// Removes the employee and its entries, and forgets the load digest.
    /// Returns `false` if unknown.
    fn delete_employee(&self, id: EmployeeId) -> PersistenceResult<bool>;

    /// Removes all employees, entries, holidays and the load digest.
    fn clear(&self) -> PersistenceResult<()>;

    fn load_digest(&self) -> PersistenceResult<Option<String>>;
    fn record_load_digest(&self, digest: &str) -> PersistenceResult<()>;

    fn employee_anchor(&self, id: EmployeeId) -> PersistenceResult<NaiveDate> {
        self.find_employee(id)?
            .map(|employee| employee.start_date)
            .ok_or_else(|| PersistenceError::employee_not_found(id))
    }
}

/// Local cache of holiday rows.
pub trait HolidayStore {
    fn holidays_in_month(&self, year: i32, month: u32) -> PersistenceResult<Vec<Holiday>>;
    /// Inserts or renames the holiday on that date.
    fn insert_holiday(&self, holiday: &Holiday) -> PersistenceResult<()>;
    fn list_holidays(&self) -> PersistenceResult<Vec<Holiday>>;
}

/// First and last day of a month, or `None` for an impossible year/month.
pub(crate) fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next.pred_opt()?))
}

pub mod file;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    load_projection_from_json, read_load_payload, save_projection_to_csv,
    save_projection_to_json,
};
pub use memory::MemoryStore;
