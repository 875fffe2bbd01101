use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, Months, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Calendar unit vocabulary shared by intervals, urgency thresholds and snapping.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

impl TimeUnit {
    /// Length in seconds for units of fixed length. Months have none.
    pub fn fixed_seconds(self) -> Option<i64> {
        match self {
            TimeUnit::Second => Some(1),
            TimeUnit::Minute => Some(60),
            TimeUnit::Hour => Some(60 * 60),
            TimeUnit::Day => Some(24 * 60 * 60),
            TimeUnit::Week => Some(7 * 24 * 60 * 60),
            TimeUnit::Month => None,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            TimeUnit::Second => "s",
            TimeUnit::Minute => "min",
            TimeUnit::Hour => "h",
            TimeUnit::Day => "d",
            TimeUnit::Week => "w",
            TimeUnit::Month => "mo",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimeUnit::Second => "second",
            TimeUnit::Minute => "minute",
            TimeUnit::Hour => "hour",
            TimeUnit::Day => "day",
            TimeUnit::Week => "week",
            TimeUnit::Month => "month",
        };
        f.write_str(name)
    }
}

impl FromStr for TimeUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "s" | "sec" | "second" | "seconds" => Ok(TimeUnit::Second),
            "m" | "min" | "minute" | "minutes" => Ok(TimeUnit::Minute),
            "h" | "hr" | "hour" | "hours" => Ok(TimeUnit::Hour),
            "d" | "day" | "days" => Ok(TimeUnit::Day),
            "w" | "week" | "weeks" => Ok(TimeUnit::Week),
            "mo" | "month" | "months" => Ok(TimeUnit::Month),
            other => Err(Error::invalid(format!(
                "unknown time unit '{}'. Supported: second, minute, hour, day, week, month",
                other
            ))),
        }
    }
}

/// A positive amount of some [`TimeUnit`], e.g. "every 3 days".
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(try_from = "RawInterval")]
pub struct Interval {
    magnitude: u32,
    unit: TimeUnit,
}

#[derive(Deserialize)]
struct RawInterval {
    magnitude: u32,
    unit: TimeUnit,
}

impl TryFrom<RawInterval> for Interval {
    type Error = Error;

    fn try_from(raw: RawInterval) -> Result<Self> {
        Interval::new(raw.magnitude, raw.unit)
    }
}

impl Interval {
    /// Fails with `InvalidConfiguration` when `magnitude` is zero.
    pub fn new(magnitude: u32, unit: TimeUnit) -> Result<Self> {
        let interval = Interval { magnitude, unit };
        interval.validate()?;
        Ok(interval)
    }

    pub fn magnitude(&self) -> u32 {
        self.magnitude
    }

    pub fn unit(&self) -> TimeUnit {
        self.unit
    }

    pub fn validate(&self) -> Result<()> {
        if self.magnitude == 0 {
            return Err(Error::invalid("interval magnitude must be greater than zero"));
        }
        Ok(())
    }

    /// `instant + self`, calendar aware. Month addition clamps to the last
    /// day of shorter months (Jan 31 + 1 month = Feb 28/29).
    pub fn add_to(&self, instant: NaiveDateTime) -> Option<NaiveDateTime> {
        self.add_times(instant, 1)
    }

    /// `instant + times * self`, computed in one step from `instant`.
    pub fn add_times(&self, instant: NaiveDateTime, times: u64) -> Option<NaiveDateTime> {
        let total = u64::from(self.magnitude).checked_mul(times)?;
        match self.unit.fixed_seconds() {
            Some(secs) => {
                let secs = i64::try_from(total).ok()?.checked_mul(secs)?;
                instant.checked_add_signed(Duration::try_seconds(secs)?)
            }
            None => {
                let months = u32::try_from(total).ok()?;
                instant.checked_add_months(Months::new(months))
            }
        }
    }

    /// Number of whole intervals `k` such that `from + k * self <= to`.
    /// Zero when `to` is before `from`. Computed without stepping.
    pub fn whole_periods_between(&self, from: NaiveDateTime, to: NaiveDateTime) -> u64 {
        if to <= from {
            return 0;
        }
        match self.unit.fixed_seconds() {
            Some(secs) => {
                let elapsed = (to - from).num_seconds();
                let len = i64::from(self.magnitude) * secs;
                (elapsed / len) as u64
            }
            None => {
                let months = (i64::from(to.year()) * 12 + i64::from(to.month0()))
                    - (i64::from(from.year()) * 12 + i64::from(from.month0()));
                let mut k = (months.max(0) as u64) / u64::from(self.magnitude);
                if k > 0 && self.add_times(from, k).map_or(true, |t| t > to) {
                    k -= 1;
                }
                k
            }
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.magnitude, self.unit.suffix())
    }
}

/// Parses the compact form used on the command line: `3d`, `2h`, `1mo`, `90 min`.
impl FromStr for Interval {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let (digits, unit) = s.split_at(split);
        if digits.is_empty() {
            return Err(Error::invalid(format!(
                "interval '{}' must start with a number, e.g. 3d",
                s
            )));
        }
        let magnitude: u32 = digits
            .parse()
            .map_err(|_| Error::invalid(format!("interval magnitude '{}' is too large", digits)))?;
        let unit = if unit.trim().is_empty() {
            TimeUnit::Day
        } else {
            unit.parse()?
        };
        Interval::new(magnitude, unit)
    }
}
