use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::interval::{Interval, TimeUnit};

/// How a task repeats. Immutable: every builder method returns a new value.
///
/// Optional features are plain `Option`s so a feature can never be "enabled"
/// without its parameter.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurrenceSpec {
    /// How often the task repeats.
    interval: Interval,
    /// If true, the countdown to the next due date starts only once the task is
    /// marked done. If false, the task recurs on a fixed cadence.
    #[serde(default = "default_true")]
    only_repeats_once_done: bool,
    /// Round computed due instants forward to the start of this unit.
    #[serde(default)]
    snap: Option<TimeUnit>,
    /// How long a due task may stay undone before it becomes urgent.
    #[serde(default)]
    urgency: Option<Interval>,
    #[serde(default = "default_true")]
    create_notification: bool,
    #[serde(default)]
    audio_alarm: bool,
}

fn default_true() -> bool {
    true
}

impl RecurrenceSpec {
    pub fn new(interval: Interval) -> Self {
        RecurrenceSpec {
            interval,
            only_repeats_once_done: true,
            snap: None,
            urgency: None,
            create_notification: true,
            audio_alarm: false,
        }
    }

    /// Shorthand for `new(Interval::new(magnitude, unit)?)`.
    pub fn every(magnitude: u32, unit: TimeUnit) -> Result<Self> {
        Ok(Self::new(Interval::new(magnitude, unit)?))
    }

    pub fn interval(&self) -> Interval {
        self.interval
    }

    pub fn is_only_repeats_once_done(&self) -> bool {
        self.only_repeats_once_done
    }

    pub fn snap(&self) -> Option<TimeUnit> {
        self.snap
    }

    pub fn urgency(&self) -> Option<Interval> {
        self.urgency
    }

    pub fn should_create_notification(&self) -> bool {
        self.create_notification
    }

    pub fn should_play_audio_alarm(&self) -> bool {
        self.audio_alarm
    }

    pub fn with_interval(self, interval: Interval) -> Self {
        RecurrenceSpec { interval, ..self }
    }

    pub fn only_repeats_once_done(self, only_repeats_once_done: bool) -> Self {
        RecurrenceSpec {
            only_repeats_once_done,
            ..self
        }
    }

    /// Snap due instants to the start of `unit`. Leaves every other field alone.
    pub fn snap_to(self, unit: TimeUnit) -> Self {
        RecurrenceSpec {
            snap: Some(unit),
            ..self
        }
    }

    pub fn do_not_snap(self) -> Self {
        RecurrenceSpec { snap: None, ..self }
    }

    pub fn urgent_after(self, threshold: Interval) -> Self {
        RecurrenceSpec {
            urgency: Some(threshold),
            ..self
        }
    }

    pub fn without_urgency(self) -> Self {
        RecurrenceSpec {
            urgency: None,
            ..self
        }
    }

    pub fn create_notification(self, create_notification: bool) -> Self {
        RecurrenceSpec {
            create_notification,
            ..self
        }
    }

    pub fn audio_alarm(self, audio_alarm: bool) -> Self {
        RecurrenceSpec {
            audio_alarm,
            ..self
        }
    }

    /// Re-checks every invariant. Called at each mutation boundary.
    pub fn validate(&self) -> Result<()> {
        self.interval.validate()?;
        if let Some(urgency) = &self.urgency {
            urgency
                .validate()
                .map_err(|_| Error::invalid("urgency threshold must be greater than zero"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_reminder_conventions() {
        let spec = RecurrenceSpec::every(1, TimeUnit::Day).unwrap();
        assert!(spec.is_only_repeats_once_done());
        assert!(spec.should_create_notification());
        assert!(!spec.should_play_audio_alarm());
        assert_eq!(spec.snap(), None);
        assert_eq!(spec.urgency(), None);
    }

    #[test]
    fn snapping_leaves_other_fields_alone() {
        let two_hours = Interval::new(2, TimeUnit::Hour).unwrap();
        let spec = RecurrenceSpec::every(1, TimeUnit::Week)
            .unwrap()
            .only_repeats_once_done(false)
            .urgent_after(two_hours)
            .audio_alarm(true);

        let snapped = spec.snap_to(TimeUnit::Day);
        assert_eq!(snapped.snap(), Some(TimeUnit::Day));
        assert_eq!(snapped.urgency(), Some(two_hours));
        assert!(!snapped.is_only_repeats_once_done());
        assert!(snapped.should_play_audio_alarm());

        assert_eq!(snapped.do_not_snap(), spec);
    }

    #[test]
    fn every_rejects_zero() {
        assert!(RecurrenceSpec::every(0, TimeUnit::Month).is_err());
    }

    #[test]
    fn missing_optional_fields_deserialize_to_defaults() {
        let spec: RecurrenceSpec =
            serde_json::from_str(r#"{"interval":{"magnitude":3,"unit":"day"}}"#).unwrap();
        assert_eq!(spec, RecurrenceSpec::every(3, TimeUnit::Day).unwrap());
    }
}
