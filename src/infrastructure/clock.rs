use crate::domain::time::TimeOfDay;
use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;

pub trait Clock: Send + Sync {
    fn now(&self) -> TimeOfDay;
}

/// Wall-clock time of day in the configured IANA timezone.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    timezone: Tz,
}

impl SystemClock {
    pub fn new(timezone: Option<&str>) -> Self {
        let timezone = match timezone.map(str::parse::<Tz>) {
            Some(Ok(timezone)) => timezone,
            Some(Err(error)) => {
                log::warn!("unknown timezone, falling back to UTC: {error}");
                Tz::UTC
            }
            None => Tz::UTC,
        };
        Self { timezone }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn time_of_day_at(&self, instant: DateTime<Utc>) -> TimeOfDay {
        let local = instant.with_timezone(&self.timezone);
        TimeOfDay::new(local.hour(), local.minute()).expect("chrono hour and minute are in range")
    }
}

impl Clock for SystemClock {
    fn now(&self) -> TimeOfDay {
        self.time_of_day_at(Utc::now())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub TimeOfDay);

impl Clock for FixedClock {
    fn now(&self) -> TimeOfDay {
        self.0
    }
}
