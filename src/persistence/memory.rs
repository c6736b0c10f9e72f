use super::{EmployeeStore, HolidayStore, PersistenceError, PersistenceResult};
use crate::employee::{Employee, EmployeeId, ScheduleEntry};
use crate::holiday::Holiday;
use crate::phase::PhaseTag;
use crate::template::TemplateSlot;
use chrono::{Datelike, NaiveDate};
use parking_lot::RwLock;
use std::collections::BTreeMap;

#[derive(Debug, Default)]
struct MemoryState {
    next_id: EmployeeId,
    employees: BTreeMap<EmployeeId, Employee>,
    entries: BTreeMap<EmployeeId, Vec<ScheduleEntry>>,
    holidays: BTreeMap<NaiveDate, String>,
    load_digest: Option<String>,
}

/// Process-local store, used by tests and when no database is configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EmployeeStore for MemoryStore {
    fn create_employee(&self, name: &str, start_date: NaiveDate) -> PersistenceResult<Employee> {
        let mut state = self.state.write();
        if state.employees.values().any(|e| e.name == name) {
            return Err(PersistenceError::InvalidData(format!(
                "employee '{name}' already exists"
            )));
        }
        state.next_id += 1;
        let employee = Employee {
            id: state.next_id,
            name: name.to_string(),
            start_date,
        };
        state.employees.insert(employee.id, employee.clone());
        Ok(employee)
    }

    fn find_employee(&self, id: EmployeeId) -> PersistenceResult<Option<Employee>> {
        Ok(self.state.read().employees.get(&id).cloned())
    }

    fn find_employee_by_name(&self, name: &str) -> PersistenceResult<Option<Employee>> {
        Ok(self
            .state
            .read()
            .employees
            .values()
            .find(|e| e.name == name)
            .cloned())
    }

    fn list_employees(&self) -> PersistenceResult<Vec<Employee>> {
        Ok(self.state.read().employees.values().cloned().collect())
    }

    fn schedule_entries(
        &self,
        id: EmployeeId,
        phase: Option<PhaseTag>,
    ) -> PersistenceResult<Vec<ScheduleEntry>> {
        let state = self.state.read();
        if !state.employees.contains_key(&id) {
            return Err(PersistenceError::employee_not_found(id));
        }
        Ok(state
            .entries
            .get(&id)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|e| phase.is_none_or(|p| e.phase == p))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn replace_schedule_entries(
        &self,
        id: EmployeeId,
        entries: &[ScheduleEntry],
    ) -> PersistenceResult<()> {
        let mut state = self.state.write();
        if !state.employees.contains_key(&id) {
            return Err(PersistenceError::employee_not_found(id));
        }
        if let Some(foreign) = entries.iter().find(|e| e.employee_id != id) {
            return Err(PersistenceError::InvalidData(format!(
                "entry for employee {} submitted under employee {id}",
                foreign.employee_id
            )));
        }
        state.entries.insert(id, entries.to_vec());
        Ok(())
    }

    fn upsert_employee_with_entries(
        &self,
        name: &str,
        start_date: NaiveDate,
        slots: &[TemplateSlot],
    ) -> PersistenceResult<Employee> {
        let mut state = self.state.write();
        let existing = state.employees.values().find(|e| e.name == name).cloned();
        let employee = match existing {
            Some(employee) => employee,
            None => {
                state.next_id += 1;
                let employee = Employee {
                    id: state.next_id,
                    name: name.to_string(),
                    start_date,
                };
                state.employees.insert(employee.id, employee.clone());
                employee
            }
        };
        let entries = slots
            .iter()
            .map(|s| ScheduleEntry::new(employee.id, s.phase, s.weekday, s.slot))
            .collect();
        state.entries.insert(employee.id, entries);
        Ok(employee)
    }

    fn delete_employee(&self, id: EmployeeId) -> PersistenceResult<bool> {
        let mut state = self.state.write();
        state.entries.remove(&id);
        let removed = state.employees.remove(&id).is_some();
        if removed {
            state.load_digest = None;
        }
        Ok(removed)
    }

    fn clear(&self) -> PersistenceResult<()> {
        let mut state = self.state.write();
        state.employees.clear();
        state.entries.clear();
        state.holidays.clear();
        state.load_digest = None;
        Ok(())
    }

    fn load_digest(&self) -> PersistenceResult<Option<String>> {
        Ok(self.state.read().load_digest.clone())
    }

    fn record_load_digest(&self, digest: &str) -> PersistenceResult<()> {
        self.state.write().load_digest = Some(digest.to_string());
        Ok(())
    }
}

impl HolidayStore for MemoryStore {
    fn holidays_in_month(&self, year: i32, month: u32) -> PersistenceResult<Vec<Holiday>> {
        Ok(self
            .state
            .read()
            .holidays
            .iter()
            .filter(|(date, _)| date.year() == year && date.month() == month)
            .map(|(date, name)| Holiday::new(*date, name.clone()))
            .collect())
    }

    fn insert_holiday(&self, holiday: &Holiday) -> PersistenceResult<()> {
        self.state
            .write()
            .holidays
            .insert(holiday.date, holiday.name.clone());
        Ok(())
    }

    fn list_holidays(&self) -> PersistenceResult<Vec<Holiday>> {
        Ok(self
            .state
            .read()
            .holidays
            .iter()
            .map(|(date, name)| Holiday::new(*date, name.clone()))
            .collect())
    }
}
