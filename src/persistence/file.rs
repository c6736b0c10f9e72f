use super::{PersistenceError, PersistenceResult};
use crate::calculations::hours::total_hours;
use crate::calendar::DayProjection;
use chrono::NaiveDate;
use serde::Serialize;
use std::fs::{self, File};
use std::path::Path;

/// Reads a bulk load request as raw text so it can be hashed before parsing.
pub fn read_load_payload<P: AsRef<Path>>(path: P) -> PersistenceResult<String> {
    Ok(fs::read_to_string(path)?)
}

pub fn save_projection_to_json<P: AsRef<Path>>(
    days: &[DayProjection],
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, days)?;
    Ok(())
}

pub fn load_projection_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<DayProjection>> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(file)?)
}

#[derive(Debug, Default, Serialize)]
struct DayCsvRecord {
    date: String,
    day_name: String,
    holiday_name: String,
    time_slots: String,
    hours: f64,
}

impl DayCsvRecord {
    fn from_day(day: &DayProjection) -> PersistenceResult<Self> {
        let hours = total_hours(&day.time_slots).map_err(|err| {
            PersistenceError::InvalidData(format!("{}: {err}", format_date(day.date)))
        })?;
        Ok(Self {
            date: format_date(day.date),
            day_name: day.day_name.clone(),
            holiday_name: day.holiday_name.clone().unwrap_or_default(),
            time_slots: day
                .time_slots
                .iter()
                .map(|slot| format!("{}-{}", slot.start, slot.end))
                .collect::<Vec<_>>()
                .join(";"),
            hours,
        })
    }
}

/// Writes one row per day: date, day name, holiday, `start-end;...` slots and
/// the day's hours.
pub fn save_projection_to_csv<P: AsRef<Path>>(
    days: &[DayProjection],
    path: P,
) -> PersistenceResult<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for day in days {
        writer.serialize(DayCsvRecord::from_day(day)?)?;
    }
    writer.flush()?;
    Ok(())
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
