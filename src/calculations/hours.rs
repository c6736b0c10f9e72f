//! Worked-hours totals over "HH:MM" slots.

use crate::calendar::DayProjection;
use crate::error::ValidationError;
use crate::time_of_day::{SlotText, TimeSlot};

fn hours(slot: &TimeSlot) -> f64 {
    slot.duration().num_minutes() as f64 / 60.0
}

/// Hours between two "HH:MM" times. An end before the start is read as the
/// next day.
pub fn slot_hours(start: &str, end: &str) -> Result<f64, ValidationError> {
    Ok(hours(&TimeSlot::parse(start, end)?))
}

/// Sum over all slots. A single malformed slot fails the whole sum.
pub fn total_hours(slots: &[SlotText]) -> Result<f64, ValidationError> {
    let mut total = 0.0;
    for slot in slots {
        total += slot_hours(&slot.start, &slot.end)?;
    }
    Ok(total)
}

pub fn total_hours_for_days(days: &[DayProjection]) -> Result<f64, ValidationError> {
    let mut total = 0.0;
    for day in days {
        total += total_hours(&day.time_slots).map_err(|err| err.within(day.date.to_string()))?;
    }
    Ok(total)
}
