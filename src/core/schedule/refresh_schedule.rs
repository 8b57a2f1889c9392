use chrono::{DateTime, Datelike, Duration, NaiveTime, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::Tz;

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("Unknown weekday '{0}'")]
    Weekday(String),
    #[error("Invalid time '{0}', expected HH:MM")]
    Time(String),
    #[error("Unknown timezone '{0}'")]
    Timezone(String),
}

/// A fixed weekly slot, e.g. every Monday at 13:10 in Asia/Kolkata.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeeklySchedule {
    pub weekday: Weekday,
    pub hour: u32,
    pub minute: u32,
    pub tz: Tz,
}

impl Default for WeeklySchedule {
    fn default() -> Self {
        Self {
            weekday: Weekday::Mon,
            hour: 13,
            minute: 10,
            tz: chrono_tz::Asia::Kolkata,
        }
    }
}

impl WeeklySchedule {
    /// Parses `("monday", "13:10", "Asia/Kolkata")`-style settings.
    pub fn parse(weekday: &str, time: &str, tz: &str) -> Result<Self, ScheduleError> {
        let weekday: Weekday = weekday
            .trim()
            .parse()
            .map_err(|_| ScheduleError::Weekday(weekday.to_string()))?;
        let time = NaiveTime::parse_from_str(time.trim(), "%H:%M")
            .map_err(|_| ScheduleError::Time(time.to_string()))?;
        let tz: Tz = tz
            .trim()
            .parse()
            .map_err(|_| ScheduleError::Timezone(tz.to_string()))?;

        Ok(Self {
            weekday,
            hour: time.hour(),
            minute: time.minute(),
            tz,
        })
    }

    /// First slot strictly after `now`.
    pub fn next_run_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.with_timezone(&self.tz).date_naive();

        // Eight days always reach the weekday again; the extra week covers a
        // slot that falls into a DST gap.
        for offset in 0..15 {
            let date = today + Duration::days(offset);
            if date.weekday() != self.weekday {
                continue;
            }
            let Some(naive) = date.and_hms_opt(self.hour, self.minute, 0) else {
                continue;
            };
            if let Some(local) = self.tz.from_local_datetime(&naive).earliest() {
                let at = local.with_timezone(&Utc);
                if at > now {
                    return at;
                }
            }
        }

        now + Duration::weeks(1)
    }
}

impl std::fmt::Display for WeeklySchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "every {} at {:02}:{:02} {}",
            self.weekday,
            self.hour,
            self.minute,
            self.tz.name()
        )
    }
}
