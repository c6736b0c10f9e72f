//! Weekly A/B templates: validation of client input and the canonical
//! two-week view of stored entries.

use crate::employee::{EmployeeId, ScheduleEntry, WEEKDAYS, weekday_name};
use crate::error::ValidationError;
use crate::phase::PhaseTag;
use crate::time_of_day::{SlotText, TimeSlot};
use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;

/// One week of slots as submitted by a client. Missing days are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WeeklyScheduleInput {
    #[serde(default)]
    pub monday: Vec<SlotText>,
    #[serde(default)]
    pub tuesday: Vec<SlotText>,
    #[serde(default)]
    pub wednesday: Vec<SlotText>,
    #[serde(default)]
    pub thursday: Vec<SlotText>,
    #[serde(default)]
    pub friday: Vec<SlotText>,
    #[serde(default)]
    pub saturday: Vec<SlotText>,
    #[serde(default)]
    pub sunday: Vec<SlotText>,
}

impl WeeklyScheduleInput {
    pub fn day(&self, weekday: Weekday) -> &[SlotText] {
        match weekday {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }

    pub fn slot_count(&self) -> usize {
        WEEKDAYS.iter().map(|day| self.day(*day).len()).sum()
    }
}

/// An employee record of a bulk load request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeInput {
    pub name: String,
    #[serde(rename = "startDate")]
    pub start_date: String,
    /// Keyed by week type, `"A"` or `"B"`.
    #[serde(default)]
    pub weeks: BTreeMap<String, WeeklyScheduleInput>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateSlot {
    pub phase: PhaseTag,
    pub weekday: Weekday,
    pub slot: TimeSlot,
}

/// A validated [`EmployeeInput`], ready to be written to a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEmployee {
    pub name: String,
    pub start_date: NaiveDate,
    pub slots: Vec<TemplateSlot>,
}

impl NormalizedEmployee {
    pub fn entries_for(&self, employee_id: EmployeeId) -> Vec<ScheduleEntry> {
        self.slots
            .iter()
            .map(|s| ScheduleEntry::new(employee_id, s.phase, s.weekday, s.slot))
            .collect()
    }
}

pub fn normalize_employee(input: &EmployeeInput) -> Result<NormalizedEmployee, ValidationError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(ValidationError::new("employee name must not be empty"));
    }
    let start_date = NaiveDate::parse_from_str(input.start_date.trim(), "%Y-%m-%d").map_err(|_| {
        ValidationError::new(format!(
            "employee '{name}': invalid startDate '{}' (expected YYYY-MM-DD)",
            input.start_date
        ))
    })?;

    let mut slots = Vec::new();
    for (week_type, week) in &input.weeks {
        let phase = PhaseTag::from_str(week_type)
            .map_err(|err| err.within(format!("employee '{name}'")))?;
        for weekday in WEEKDAYS {
            for (idx, text) in week.day(weekday).iter().enumerate() {
                let slot = text.parse().map_err(|err| {
                    err.within(format!(
                        "employee '{name}' week {phase} {} slot #{idx}",
                        weekday_name(weekday)
                    ))
                })?;
                slots.push(TemplateSlot {
                    phase,
                    weekday,
                    slot,
                });
            }
        }
    }

    Ok(NormalizedEmployee {
        name: name.to_string(),
        start_date,
        slots,
    })
}

/// Validates a whole load request. Any invalid record rejects the batch.
pub fn normalize_batch(inputs: &[EmployeeInput]) -> Result<Vec<NormalizedEmployee>, ValidationError> {
    let mut seen = HashSet::with_capacity(inputs.len());
    let mut normalized = Vec::with_capacity(inputs.len());
    for input in inputs {
        let employee = normalize_employee(input)?;
        if !seen.insert(employee.name.clone()) {
            return Err(ValidationError::new(format!(
                "duplicate employee '{}' in load request",
                employee.name
            )));
        }
        normalized.push(employee);
    }
    Ok(normalized)
}

/// Number of submitted slots per employee name, across both weeks. Names are
/// trimmed the way they are stored.
pub fn count_slots(inputs: &[EmployeeInput]) -> BTreeMap<String, usize> {
    inputs
        .iter()
        .map(|input| {
            let count = input.weeks.values().map(WeeklyScheduleInput::slot_count).sum();
            (input.name.trim().to_string(), count)
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayView {
    #[serde(rename = "dayName")]
    pub day_name: String,
    #[serde(rename = "timeSlots")]
    pub time_slots: Vec<SlotText>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekView {
    #[serde(rename = "weekType")]
    pub week_type: PhaseTag,
    pub days: Vec<DayView>,
}

impl WeekView {
    fn empty(week_type: PhaseTag) -> Self {
        let days = WEEKDAYS
            .iter()
            .map(|day| DayView {
                day_name: weekday_name(*day).to_string(),
                time_slots: Vec::new(),
            })
            .collect();
        Self { week_type, days }
    }

    pub fn day(&self, weekday: Weekday) -> &DayView {
        &self.days[weekday.num_days_from_monday() as usize]
    }
}

/// Week A then week B, each with all seven days Monday first. Slots keep the
/// order in which `entries` lists them.
pub fn canonical_weeks(entries: &[ScheduleEntry]) -> [WeekView; 2] {
    let mut weeks = [WeekView::empty(PhaseTag::A), WeekView::empty(PhaseTag::B)];
    for entry in entries {
        let week = match entry.phase {
            PhaseTag::A => &mut weeks[0],
            PhaseTag::B => &mut weeks[1],
        };
        week.days[entry.weekday.num_days_from_monday() as usize]
            .time_slots
            .push(entry.slot.to_text());
    }
    weeks
}
