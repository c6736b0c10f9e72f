pub mod calculations;
pub mod calendar;
pub mod config;
pub mod employee;
pub mod error;
pub mod hashing;
pub mod holiday;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod logging;
pub mod persistence;
pub mod phase;
pub mod service;
pub mod template;
pub mod time_of_day;

pub use calendar::{DayProjection, HolidayStatus, MonthProjection, project_month};
pub use config::RotaConfig;
pub use employee::{Employee, EmployeeId, ScheduleEntry};
pub use error::{RotaError, RotaResult, ValidationError};
pub use hashing::hash_payload;
pub use holiday::{Holiday, HolidaySource};
pub use phase::{PhaseRule, PhaseTag, resolve_phase};
pub use service::{LoadStatus, LoadSummary, RotaService};
pub use template::{EmployeeInput, WeekView};
pub use time_of_day::{SlotText, TimeSlot};
