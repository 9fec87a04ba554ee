use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("time must be HH:MM, got '{value}'")]
pub struct FormatError {
    pub value: String,
}

impl FormatError {
    fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
        }
    }
}

/// Largest hour accepted from text or `new`; keeps `to_minutes` far from overflow.
pub const MAX_HOUR: u32 = 99;

/// Wall-clock time of day with minute resolution and no date.
///
/// `add_minutes` carries past 23 instead of wrapping, so `23:30 + 45` is
/// `24:15`. Parsed values are limited to hours `0..=99`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    hour: u32,
    minute: u32,
}

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        if hour > MAX_HOUR || minute > 59 {
            return None;
        }
        Some(Self { hour, minute })
    }

    pub fn parse(value: &str) -> Result<Self, FormatError> {
        let mut split = value.split(':');
        let (Some(hour_str), Some(minute_str), None) = (split.next(), split.next(), split.next())
        else {
            return Err(FormatError::new(value));
        };
        if !is_digits(hour_str) || !is_digits(minute_str) {
            return Err(FormatError::new(value));
        }

        let hour = hour_str
            .parse::<u32>()
            .map_err(|_| FormatError::new(value))?;
        let minute = minute_str
            .parse::<u32>()
            .map_err(|_| FormatError::new(value))?;
        Self::new(hour, minute).ok_or_else(|| FormatError::new(value))
    }

    pub fn hour(self) -> u32 {
        self.hour
    }

    pub fn minute(self) -> u32 {
        self.minute
    }

    pub fn to_minutes(self) -> u32 {
        self.hour * 60 + self.minute
    }

    pub fn add_minutes(self, minutes: u32) -> Self {
        let total = self.to_minutes().saturating_add(minutes);
        Self {
            hour: total / 60,
            minute: total % 60,
        }
    }

    /// Minutes from `earlier` to `self`, zero when `earlier` is later.
    pub fn minutes_since(self, earlier: TimeOfDay) -> u32 {
        self.to_minutes().saturating_sub(earlier.to_minutes())
    }

    pub fn format(self) -> String {
        self.to_string()
    }
}

fn is_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|byte| byte.is_ascii_digit())
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = FormatError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
