use crate::error::ValidationError;
use crate::phase::PhaseTag;
use crate::time_of_day::TimeSlot;
use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

pub type EmployeeId = i64;

/// Monday-first week order used wherever weekdays are enumerated.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub fn parse_weekday_name(name: &str) -> Result<Weekday, ValidationError> {
    WEEKDAYS
        .iter()
        .copied()
        .find(|day| weekday_name(*day) == name)
        .ok_or_else(|| ValidationError::new(format!("unknown day name '{name}'")))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    /// Anchor date of the rota. Week A is the ISO week containing it.
    #[serde(rename = "startDate")]
    pub start_date: NaiveDate,
}

/// One stored slot of an employee's weekly template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    #[serde(rename = "employeeId")]
    pub employee_id: EmployeeId,
    #[serde(rename = "weekType")]
    pub phase: PhaseTag,
    #[serde(rename = "dayName", with = "weekday_text")]
    pub weekday: Weekday,
    pub slot: TimeSlot,
}

impl ScheduleEntry {
    pub fn new(employee_id: EmployeeId, phase: PhaseTag, weekday: Weekday, slot: TimeSlot) -> Self {
        Self {
            employee_id,
            phase,
            weekday,
            slot,
        }
    }
}

mod weekday_text {
    use super::{parse_weekday_name, weekday_name};
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(weekday_name(*day))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Weekday, D::Error> {
        let name = String::deserialize(deserializer)?;
        parse_weekday_name(&name).map_err(D::Error::custom)
    }
}
