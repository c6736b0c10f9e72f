use super::{EmployeeStore, HolidayStore, PersistenceError, PersistenceResult, month_bounds};
use crate::employee::{Employee, EmployeeId, ScheduleEntry, parse_weekday_name, weekday_name};
use crate::holiday::Holiday;
use crate::phase::PhaseTag;
use crate::template::TemplateSlot;
use crate::time_of_day::{TimeSlot, format_stored_time, parse_stored_time};
use chrono::{NaiveDate, Weekday};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::str::FromStr;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct SqliteStore {
    connection: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> PersistenceResult<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(connection: Connection) -> PersistenceResult<Self> {
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS employees (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                start_date TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS schedules (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                employee_id INTEGER NOT NULL REFERENCES employees(id) ON DELETE CASCADE,
                week_type TEXT NOT NULL CHECK (week_type IN ('A', 'B')),
                day_name TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS schedules_employee ON schedules (employee_id, week_type);
            CREATE TABLE IF NOT EXISTS holidays (
                holiday_date TEXT PRIMARY KEY,
                holiday_name TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS load_digest (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                digest TEXT NOT NULL
            );
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    fn employee_exists(connection: &Connection, id: EmployeeId) -> PersistenceResult<bool> {
        let found: Option<i64> = connection
            .query_row("SELECT id FROM employees WHERE id = ?1", params![id], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(found.is_some())
    }

    fn insert_entries<I>(connection: &Connection, id: EmployeeId, rows: I) -> PersistenceResult<()>
    where
        I: IntoIterator<Item = (PhaseTag, Weekday, TimeSlot)>,
    {
        let mut stmt = connection.prepare(
            "INSERT INTO schedules (employee_id, week_type, day_name, start_time, end_time)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )?;
        for (phase, weekday, slot) in rows {
            stmt.execute(params![
                id,
                phase.as_str(),
                weekday_name(weekday),
                format_stored_time(slot.start),
                format_stored_time(slot.end),
            ])?;
        }
        Ok(())
    }
}

struct EmployeeRow {
    id: EmployeeId,
    name: String,
    start_date: String,
}

impl EmployeeRow {
    const COLUMNS: &'static str = "id, name, start_date";

    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            start_date: row.get(2)?,
        })
    }

    fn into_employee(self) -> PersistenceResult<Employee> {
        let start_date = parse_date(&self.start_date)?;
        Ok(Employee {
            id: self.id,
            name: self.name,
            start_date,
        })
    }
}

struct ScheduleRow {
    employee_id: EmployeeId,
    week_type: String,
    day_name: String,
    start_time: String,
    end_time: String,
}

impl ScheduleRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            employee_id: row.get(0)?,
            week_type: row.get(1)?,
            day_name: row.get(2)?,
            start_time: row.get(3)?,
            end_time: row.get(4)?,
        })
    }

    fn into_entry(self) -> PersistenceResult<ScheduleEntry> {
        let invalid = |err: crate::error::ValidationError| {
            PersistenceError::InvalidData(format!("schedule row: {err}"))
        };
        let phase = PhaseTag::from_str(&self.week_type).map_err(invalid)?;
        let weekday = parse_weekday_name(&self.day_name).map_err(invalid)?;
        let start = parse_stored_time(&self.start_time).map_err(invalid)?;
        let end = parse_stored_time(&self.end_time).map_err(invalid)?;
        Ok(ScheduleEntry::new(
            self.employee_id,
            phase,
            weekday,
            TimeSlot::new(start, end),
        ))
    }
}

impl EmployeeStore for SqliteStore {
    fn create_employee(&self, name: &str, start_date: NaiveDate) -> PersistenceResult<Employee> {
        let conn = self.connection.lock();
        let existing: Option<i64> = conn
            .query_row("SELECT id FROM employees WHERE name = ?1", params![name], |row| {
                row.get(0)
            })
            .optional()?;
        if existing.is_some() {
            return Err(PersistenceError::InvalidData(format!(
                "employee '{name}' already exists"
            )));
        }
        conn.execute(
            "INSERT INTO employees (name, start_date) VALUES (?1, ?2)",
            params![name, start_date.format(DATE_FORMAT).to_string()],
        )?;
        Ok(Employee {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
            start_date,
        })
    }

    fn find_employee(&self, id: EmployeeId) -> PersistenceResult<Option<Employee>> {
        let conn = self.connection.lock();
        let sql = format!("SELECT {} FROM employees WHERE id = ?1", EmployeeRow::COLUMNS);
        conn.query_row(&sql, params![id], EmployeeRow::read)
            .optional()?
            .map(EmployeeRow::into_employee)
            .transpose()
    }

    fn find_employee_by_name(&self, name: &str) -> PersistenceResult<Option<Employee>> {
        let conn = self.connection.lock();
        let sql = format!("SELECT {} FROM employees WHERE name = ?1", EmployeeRow::COLUMNS);
        conn.query_row(&sql, params![name], EmployeeRow::read)
            .optional()?
            .map(EmployeeRow::into_employee)
            .transpose()
    }

    fn list_employees(&self) -> PersistenceResult<Vec<Employee>> {
        let conn = self.connection.lock();
        let sql = format!("SELECT {} FROM employees ORDER BY id ASC", EmployeeRow::COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map([], EmployeeRow::read)?;
        let mut employees = Vec::new();
        for row in rows {
            employees.push(row?.into_employee()?);
        }
        Ok(employees)
    }

    fn schedule_entries(
        &self,
        id: EmployeeId,
        phase: Option<PhaseTag>,
    ) -> PersistenceResult<Vec<ScheduleEntry>> {
        let conn = self.connection.lock();
        if !Self::employee_exists(&conn, id)? {
            return Err(PersistenceError::employee_not_found(id));
        }
        let mut stmt = conn.prepare(
            "SELECT employee_id, week_type, day_name, start_time, end_time FROM schedules
             WHERE employee_id = ?1 AND (?2 IS NULL OR week_type = ?2)
             ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![id, phase.map(|p| p.as_str())], ScheduleRow::read)?;
        let mut entries = Vec::new();
        for row in rows {
            entries.push(row?.into_entry()?);
        }
        Ok(entries)
    }

    fn replace_schedule_entries(
        &self,
        id: EmployeeId,
        entries: &[ScheduleEntry],
    ) -> PersistenceResult<()> {
        if let Some(foreign) = entries.iter().find(|e| e.employee_id != id) {
            return Err(PersistenceError::InvalidData(format!(
                "entry for employee {} submitted under employee {id}",
                foreign.employee_id
            )));
        }
        let mut conn = self.connection.lock();
        let tx = conn.transaction()?;
        if !Self::employee_exists(&tx, id)? {
            return Err(PersistenceError::employee_not_found(id));
        }
        tx.execute("DELETE FROM schedules WHERE employee_id = ?1", params![id])?;
        Self::insert_entries(
            &tx,
            id,
            entries.iter().map(|e| (e.phase, e.weekday, e.slot)),
        )?;
        tx.commit()?;
        Ok(())
    }

    fn upsert_employee_with_entries(
        &self,
        name: &str,
        start_date: NaiveDate,
        slots: &[TemplateSlot],
    ) -> PersistenceResult<Employee> {
        let mut conn = self.connection.lock();
        let tx = conn.transaction()?;
        let sql = format!("SELECT {} FROM employees WHERE name = ?1", EmployeeRow::COLUMNS);
        let existing = tx
            .query_row(&sql, params![name], EmployeeRow::read)
            .optional()?;
        let employee = match existing {
            Some(row) => row.into_employee()?,
            None => {
                tx.execute(
                    "INSERT INTO employees (name, start_date) VALUES (?1, ?2)",
                    params![name, start_date.format(DATE_FORMAT).to_string()],
                )?;
                Employee {
                    id: tx.last_insert_rowid(),
                    name: name.to_string(),
                    start_date,
                }
            }
        };
        tx.execute(
            "DELETE FROM schedules WHERE employee_id = ?1",
            params![employee.id],
        )?;
        Self::insert_entries(
            &tx,
            employee.id,
            slots.iter().map(|s| (s.phase, s.weekday, s.slot)),
        )?;
        tx.commit()?;
        Ok(employee)
    }

    fn delete_employee(&self, id: EmployeeId) -> PersistenceResult<bool> {
        let mut conn = self.connection.lock();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM schedules WHERE employee_id = ?1", params![id])?;
        let removed = tx.execute("DELETE FROM employees WHERE id = ?1", params![id])?;
        if removed > 0 {
            tx.execute("DELETE FROM load_digest", [])?;
        }
        tx.commit()?;
        Ok(removed > 0)
    }

    fn clear(&self) -> PersistenceResult<()> {
        let mut conn = self.connection.lock();
        let tx = conn.transaction()?;
        tx.execute_batch(
            "DELETE FROM schedules;
             DELETE FROM employees;
             DELETE FROM holidays;
             DELETE FROM load_digest;",
        )?;
        tx.commit()?;
        Ok(())
    }

    fn load_digest(&self) -> PersistenceResult<Option<String>> {
        let conn = self.connection.lock();
        let digest = conn
            .query_row("SELECT digest FROM load_digest WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(digest)
    }

    fn record_load_digest(&self, digest: &str) -> PersistenceResult<()> {
        let conn = self.connection.lock();
        conn.execute(
            "INSERT INTO load_digest (id, digest) VALUES (1, ?1)
             ON CONFLICT(id) DO UPDATE SET digest = excluded.digest",
            params![digest],
        )?;
        Ok(())
    }
}

impl HolidayStore for SqliteStore {
    fn holidays_in_month(&self, year: i32, month: u32) -> PersistenceResult<Vec<Holiday>> {
        let (first, last) = month_bounds(year, month).ok_or_else(|| {
            PersistenceError::InvalidData(format!("invalid month {year}-{month:02}"))
        })?;
        let conn = self.connection.lock();
        let mut stmt = conn.prepare(
            "SELECT holiday_date, holiday_name FROM holidays
             WHERE holiday_date BETWEEN ?1 AND ?2
             ORDER BY holiday_date ASC",
        )?;
        let rows = stmt.query_map(
            params![
                first.format(DATE_FORMAT).to_string(),
                last.format(DATE_FORMAT).to_string()
            ],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
        )?;
        collect_holidays(rows)
    }

    fn insert_holiday(&self, holiday: &Holiday) -> PersistenceResult<()> {
        let conn = self.connection.lock();
        conn.execute(
            "INSERT INTO holidays (holiday_date, holiday_name) VALUES (?1, ?2)
             ON CONFLICT(holiday_date) DO UPDATE SET holiday_name = excluded.holiday_name",
            params![holiday.date.format(DATE_FORMAT).to_string(), holiday.name],
        )?;
        Ok(())
    }

    fn list_holidays(&self) -> PersistenceResult<Vec<Holiday>> {
        let conn = self.connection.lock();
        let mut stmt = conn.prepare(
            "SELECT holiday_date, holiday_name FROM holidays ORDER BY holiday_date ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        collect_holidays(rows)
    }
}

fn collect_holidays<I>(rows: I) -> PersistenceResult<Vec<Holiday>>
where
    I: Iterator<Item = rusqlite::Result<(String, String)>>,
{
    let mut holidays = Vec::new();
    for row in rows {
        let (date, name) = row?;
        holidays.push(Holiday::new(parse_date(&date)?, name));
    }
    Ok(holidays)
}

fn parse_date(input: &str) -> PersistenceResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid date '{input}': {e}")))
}
