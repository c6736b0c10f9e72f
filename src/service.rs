//! Application service tying the store, the holiday source and the rota
//! calculations together. This is the layer that logs.

use crate::calculations::hours::total_hours_for_days;
use crate::calendar::{HolidayStatus, MonthProjection, parse_month_name, project_month};
use crate::employee::{Employee, EmployeeId};
use crate::error::{RotaError, RotaResult, ValidationError};
use crate::hashing::hash_payload;
use crate::holiday::HolidaySource;
use crate::persistence::EmployeeStore;
use crate::phase::{PhaseRule, PhaseTag};
use crate::template::{EmployeeInput, WeekView, canonical_weeks, count_slots, normalize_batch};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub type SharedStore = Arc<dyn EmployeeStore + Send + Sync>;
pub type SharedHolidays = Arc<dyn HolidaySource + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    Loaded,
    /// The payload hashed to the digest of the previous load; nothing written.
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadSummary {
    pub status: LoadStatus,
    pub digest: String,
    #[serde(rename = "slotCounts")]
    pub slot_counts: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyHours {
    #[serde(rename = "employeeId")]
    pub employee_id: EmployeeId,
    pub name: String,
    #[serde(rename = "totalHours")]
    pub total_hours: f64,
}

#[derive(Clone)]
pub struct RotaService {
    store: SharedStore,
    holidays: SharedHolidays,
    phase_rule: PhaseRule,
}

impl RotaService {
    pub fn new(store: SharedStore, holidays: SharedHolidays) -> Self {
        Self {
            store,
            holidays,
            phase_rule: PhaseRule::default(),
        }
    }

    pub fn with_phase_rule(mut self, phase_rule: PhaseRule) -> Self {
        self.phase_rule = phase_rule;
        self
    }

    pub fn phase_rule(&self) -> PhaseRule {
        self.phase_rule
    }

    /// Loads a raw JSON load request unless it is identical (up to object key
    /// order) to the last one loaded.
    pub fn load_payload(&self, json: &str) -> RotaResult<LoadSummary> {
        let value: Value = serde_json::from_str(json)
            .map_err(|err| ValidationError::new(format!("load request is not JSON: {err}")))?;
        let digest = hash_payload(&value);
        let inputs: Vec<EmployeeInput> = serde_json::from_value(value)
            .map_err(|err| ValidationError::new(format!("malformed load request: {err}")))?;
        let slot_counts = count_slots(&inputs);

        let previous = self.store.load_digest().map_err(RotaError::read)?;
        if previous.as_deref() == Some(digest.as_str()) {
            info!(%digest, "load request unchanged, skipping");
            return Ok(LoadSummary {
                status: LoadStatus::Unchanged,
                digest,
                slot_counts,
                warnings: Vec::new(),
            });
        }

        let warnings = self.load_employees(&inputs)?;
        self.store
            .record_load_digest(&digest)
            .map_err(RotaError::write)?;
        Ok(LoadSummary {
            status: LoadStatus::Loaded,
            digest,
            slot_counts,
            warnings,
        })
    }

    /// Validates the whole batch, then replaces each employee's template.
    /// Existing employees are matched by name and keep their start date.
    /// Returns warnings for ignored start dates.
    pub fn load_employees(&self, inputs: &[EmployeeInput]) -> RotaResult<Vec<String>> {
        let batch = normalize_batch(inputs)?;
        let mut warnings = Vec::new();

        for employee in &batch {
            let record = self
                .store
                .upsert_employee_with_entries(&employee.name, employee.start_date, &employee.slots)
                .map_err(RotaError::write)?;
            if record.start_date != employee.start_date {
                let message = format!(
                    "employee '{}' keeps start date {} (load request had {})",
                    record.name, record.start_date, employee.start_date
                );
                warn!(employee = %record.name, "{message}");
                warnings.push(message);
            }
            info!(
                employee = %record.name,
                id = record.id,
                slots = employee.slots.len(),
                "weekly template loaded"
            );
        }
        Ok(warnings)
    }

    pub fn fetch_month(
        &self,
        employee_id: EmployeeId,
        month: &str,
        year: i32,
    ) -> RotaResult<MonthProjection> {
        let projection = project_month(
            self.store.as_ref(),
            self.holidays.as_ref(),
            employee_id,
            month,
            year,
            self.phase_rule,
        )?;
        if let HolidayStatus::Unavailable(reason) = &projection.holidays {
            warn!(
                year,
                month = projection.month,
                %reason,
                "could not fetch holidays, projecting without them"
            );
        }
        debug!(employee_id, year, month = projection.month, "month projected");
        Ok(projection)
    }

    /// Projection of the month together with its worked hours.
    pub fn monthly_hours(
        &self,
        employee_id: EmployeeId,
        month: &str,
        year: i32,
    ) -> RotaResult<(MonthProjection, f64)> {
        let projection = self.fetch_month(employee_id, month, year)?;
        let hours = total_hours_for_days(&projection.days)?;
        Ok((projection, hours))
    }

    /// Worked hours of every employee for one month, projected in parallel.
    pub fn month_report(&self, month: &str, year: i32) -> RotaResult<Vec<MonthlyHours>> {
        parse_month_name(month)?;
        let employees = self.employees()?;
        employees
            .par_iter()
            .map(|employee| -> RotaResult<MonthlyHours> {
                let (_, total_hours) = self.monthly_hours(employee.id, month, year)?;
                Ok(MonthlyHours {
                    employee_id: employee.id,
                    name: employee.name.clone(),
                    total_hours,
                })
            })
            .collect()
    }

    pub fn weeks_ab(&self, employee_id: EmployeeId) -> RotaResult<[WeekView; 2]> {
        let mut entries = Vec::new();
        for phase in PhaseTag::ALL {
            entries.extend(
                self.store
                    .schedule_entries(employee_id, Some(phase))
                    .map_err(RotaError::read)?,
            );
        }
        Ok(canonical_weeks(&entries))
    }

    pub fn employees(&self) -> RotaResult<Vec<Employee>> {
        self.store.list_employees().map_err(RotaError::read)
    }

    pub fn employee_id_by_name(&self, name: &str) -> RotaResult<EmployeeId> {
        self.store
            .find_employee_by_name(name)
            .map_err(RotaError::read)?
            .map(|employee| employee.id)
            .ok_or_else(|| RotaError::NotFound(format!("employee '{name}'")))
    }

    pub fn delete_employee(&self, employee_id: EmployeeId) -> RotaResult<bool> {
        let removed = self
            .store
            .delete_employee(employee_id)
            .map_err(RotaError::write)?;
        if removed {
            info!(employee_id, "employee deleted");
        }
        Ok(removed)
    }

    pub fn reset(&self) -> RotaResult<()> {
        self.store.clear().map_err(RotaError::write)?;
        warn!("all employees, schedules and cached holidays removed");
        Ok(())
    }
}

#[cfg(feature = "sqlite")]
pub use setup::open_sqlite;

#[cfg(feature = "sqlite")]
mod setup {
    use super::{RotaService, SharedHolidays};
    use crate::config::{HolidayMode, RotaConfig};
    use crate::holiday::NoHolidays;
    use crate::persistence::PersistenceResult;
    use crate::persistence::sqlite::SqliteStore;
    use std::sync::Arc;
    use tracing::info;

    /// Service over the SQLite database named in `config`.
    pub fn open_sqlite(config: &RotaConfig) -> PersistenceResult<RotaService> {
        let store = Arc::new(SqliteStore::new(&config.database_path)?);
        let holidays: SharedHolidays = match config.holidays {
            HolidayMode::Off => Arc::new(NoHolidays),
            HolidayMode::Remote => remote_holidays(config, store.clone()),
        };
        info!(
            database = %config.database_path.display(),
            holidays = ?config.holidays,
            phase_rule = config.phase_rule.as_str(),
            "rota store opened"
        );
        Ok(RotaService::new(store, holidays).with_phase_rule(config.phase_rule))
    }

    #[cfg(feature = "remote_holidays")]
    fn remote_holidays(config: &RotaConfig, store: Arc<SqliteStore>) -> SharedHolidays {
        use crate::holiday::{CachedHolidays, HttpHolidayProvider};

        let provider =
            HttpHolidayProvider::new(config.holiday_url.clone()).with_timeout(config.holiday_timeout);
        Arc::new(CachedHolidays::new(store, Arc::new(provider)))
    }

    #[cfg(not(feature = "remote_holidays"))]
    fn remote_holidays(_config: &RotaConfig, _store: Arc<SqliteStore>) -> SharedHolidays {
        tracing::warn!("built without `remote_holidays`; holiday names are disabled");
        Arc::new(NoHolidays)
    }
}
