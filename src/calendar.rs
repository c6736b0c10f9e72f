//! Month projection of an employee's A/B rota onto the calendar.

use crate::employee::{EmployeeId, ScheduleEntry, weekday_name};
use crate::error::{RotaError, RotaResult, ValidationError};
use crate::holiday::HolidaySource;
use crate::persistence::{EmployeeStore, month_bounds};
use crate::phase::PhaseRule;
use crate::time_of_day::SlotText;
use chrono::{Datelike, Month, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// The rota as it applies to one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayProjection {
    pub date: NaiveDate,
    #[serde(rename = "dayName")]
    pub day_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holiday_name: Option<String>,
    #[serde(rename = "timeSlots", default)]
    pub time_slots: Vec<SlotText>,
}

impl DayProjection {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            day_name: weekday_name(date.weekday()).to_string(),
            holiday_name: None,
            time_slots: Vec::new(),
        }
    }
}

/// Whether holiday names could be attached to a projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HolidayStatus {
    Applied,
    /// The holiday lookup failed; the days carry no holiday names.
    Unavailable(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthProjection {
    pub employee_id: EmployeeId,
    pub year: i32,
    pub month: u32,
    pub days: Vec<DayProjection>,
    pub holidays: HolidayStatus,
}

/// Maps an English month name ("March", "mar", "MARCH") to 1..=12.
pub fn parse_month_name(name: &str) -> RotaResult<u32> {
    Month::from_str(name.trim())
        .map(|month| month.number_from_month())
        .map_err(|_| RotaError::InvalidMonth(name.to_string()))
}

/// Projects stored entries onto every day of `year`-`month`, in date order.
pub fn project_days(
    anchor: NaiveDate,
    entries: &[ScheduleEntry],
    year: i32,
    month: u32,
    holidays: &BTreeMap<NaiveDate, String>,
    rule: PhaseRule,
) -> Result<Vec<DayProjection>, ValidationError> {
    let (first, last) = month_bounds(year, month)
        .ok_or_else(|| ValidationError::new(format!("invalid month {year}-{month:02}")))?;

    let days = first
        .iter_days()
        .take_while(|date| *date <= last)
        .map(|date| {
            let phase = rule.resolve(anchor, date);
            let weekday = date.weekday();
            let mut day = DayProjection::new(date);
            day.time_slots = entries
                .iter()
                .filter(|entry| entry.phase == phase && entry.weekday == weekday)
                .map(|entry| entry.slot.to_text())
                .collect();
            day.holiday_name = holidays.get(&date).cloned();
            day
        })
        .collect();
    Ok(days)
}

/// Loads an employee's anchor and entries and projects one month.
///
/// Store failures abort the projection. A failing holiday lookup does not:
/// the days are returned without holiday names and
/// [`HolidayStatus::Unavailable`] records why.
pub fn project_month<S, H>(
    store: &S,
    holidays: &H,
    employee_id: EmployeeId,
    month_name: &str,
    year: i32,
    rule: PhaseRule,
) -> RotaResult<MonthProjection>
where
    S: EmployeeStore + ?Sized,
    H: HolidaySource + ?Sized,
{
    let month = parse_month_name(month_name)?;
    if month_bounds(year, month).is_none() {
        return Err(ValidationError::new(format!("year {year} is out of range")).into());
    }

    let anchor = store.employee_anchor(employee_id).map_err(RotaError::read)?;
    let entries = store
        .schedule_entries(employee_id, None)
        .map_err(RotaError::read)?;

    let (holiday_map, status) = match holidays.holidays_for_month(year, month) {
        Ok(found) => (
            found.into_iter().map(|h| (h.date, h.name)).collect(),
            HolidayStatus::Applied,
        ),
        Err(err) => (BTreeMap::new(), HolidayStatus::Unavailable(err.to_string())),
    };

    let days = project_days(anchor, &entries, year, month, &holiday_map, rule)?;
    Ok(MonthProjection {
        employee_id,
        year,
        month,
        days,
        holidays: status,
    })
}

/// Describes the first difference in dates, day names or slots between two
/// projections. Holiday names are not compared.
pub fn compare_projections(a: &[DayProjection], b: &[DayProjection]) -> Option<String> {
    if a.len() != b.len() {
        return Some(format!("length mismatch: {} vs {} days", a.len(), b.len()));
    }
    a.iter().zip(b).enumerate().find_map(|(idx, (left, right))| {
        if left.date != right.date || left.day_name != right.day_name {
            Some(format!(
                "day #{idx}: {} {} vs {} {}",
                left.date, left.day_name, right.date, right.day_name
            ))
        } else if left.time_slots != right.time_slots {
            Some(format!("day #{idx} ({}): time slots differ", left.date))
        } else {
            None
        }
    })
}
