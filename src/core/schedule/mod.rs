pub mod refresh_schedule;

pub use refresh_schedule::{ScheduleError, WeeklySchedule};
