use crate::error::ValidationError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Correction applied when the target's ISO week number is lower than the
/// anchor's, i.e. the target sits in a later ISO year.
const WEEKS_PER_YEAR: i64 = 52;

/// One of the two alternating weekly variants of an employee's rota.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PhaseTag {
    A,
    B,
}

impl PhaseTag {
    pub const ALL: [PhaseTag; 2] = [PhaseTag::A, PhaseTag::B];

    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseTag::A => "A",
            PhaseTag::B => "B",
        }
    }

    pub fn other(&self) -> PhaseTag {
        match self {
            PhaseTag::A => PhaseTag::B,
            PhaseTag::B => PhaseTag::A,
        }
    }

    fn from_parity(weeks: i64) -> PhaseTag {
        if weeks.rem_euclid(2) == 0 {
            PhaseTag::A
        } else {
            PhaseTag::B
        }
    }
}

impl fmt::Display for PhaseTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PhaseTag {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" => Ok(PhaseTag::A),
            "B" => Ok(PhaseTag::B),
            other => Err(ValidationError::new(format!(
                "week type must be either 'A' or 'B', got '{other}'"
            ))),
        }
    }
}

/// How week parity is counted from the anchor date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseRule {
    /// Difference of ISO week numbers, with a fixed 52-week correction when
    /// the target's week number is lower than the anchor's. Approximate for
    /// 53-week years and spans longer than a year.
    #[default]
    IsoWeek,
    /// Whole weeks between the Mondays of the anchor's and target's weeks.
    Continuous,
}

impl PhaseRule {
    pub fn resolve(self, anchor: NaiveDate, target: NaiveDate) -> PhaseTag {
        match self {
            PhaseRule::IsoWeek => {
                let mut delta =
                    i64::from(target.iso_week().week()) - i64::from(anchor.iso_week().week());
                if delta < 0 {
                    delta += WEEKS_PER_YEAR;
                }
                PhaseTag::from_parity(delta)
            }
            PhaseRule::Continuous => {
                let weeks = (week_start_day(target) - week_start_day(anchor)) / 7;
                PhaseTag::from_parity(weeks)
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseRule::IsoWeek => "iso-week",
            PhaseRule::Continuous => "continuous",
        }
    }
}

impl FromStr for PhaseRule {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "iso-week" | "iso_week" | "iso" => Ok(PhaseRule::IsoWeek),
            "continuous" => Ok(PhaseRule::Continuous),
            other => Err(ValidationError::new(format!(
                "unknown phase rule '{other}' (expected iso-week or continuous)"
            ))),
        }
    }
}

/// Phase active on `target` for a rota anchored at `anchor`, using the ISO
/// week rule.
pub fn resolve_phase(anchor: NaiveDate, target: NaiveDate) -> PhaseTag {
    PhaseRule::IsoWeek.resolve(anchor, target)
}

/// Day number (from the common era) of the Monday starting `date`'s week.
/// Plain integers, so dates at the edge of the calendar range cannot overflow.
fn week_start_day(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce()) - i64::from(date.weekday().num_days_from_monday())
}
