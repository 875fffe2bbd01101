use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::interval::{Interval, TimeUnit};
use crate::recurrence::RecurrenceSpec;

/// A single recurring reminder and the state of its current cycle.
///
/// There is no default or zero-value construction path: a task always has a
/// name and an interval.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(try_from = "RawTask")]
pub struct Task {
    /// The task's short name. Never empty.
    name: String,
    /// Optional longer description.
    description: String,
    /// Recurrence configuration.
    spec: RecurrenceSpec,
    /// The due instant most recently established for this task.
    /// Seeded with the creation time.
    last_due: NaiveDateTime,
    /// Whether the current cycle has been completed.
    done: bool,
}

#[derive(Deserialize)]
struct RawTask {
    name: String,
    #[serde(default)]
    description: String,
    spec: RecurrenceSpec,
    last_due: NaiveDateTime,
    #[serde(default)]
    done: bool,
}

impl TryFrom<RawTask> for Task {
    type Error = Error;

    fn try_from(raw: RawTask) -> Result<Self> {
        Task::from_parts(raw.name, raw.description, raw.spec, raw.last_due, raw.done)
    }
}

fn check_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::invalid("task name must not be empty"));
    }
    Ok(())
}

impl Task {
    /// Creates a task repeating every `magnitude` `unit`s, first due at `now`.
    pub fn new(name: impl Into<String>, magnitude: u32, unit: TimeUnit, now: NaiveDateTime) -> Result<Self> {
        let spec = RecurrenceSpec::every(magnitude, unit)?;
        Task::with_spec(name, spec, now)
    }

    pub fn with_spec(name: impl Into<String>, spec: RecurrenceSpec, now: NaiveDateTime) -> Result<Self> {
        Task::from_parts(name.into(), String::new(), spec, now, false)
    }

    /// Copies the template's recurrence settings and done flag under a new
    /// name. The schedule restarts at `now`; the template's position in its
    /// own schedule is not inherited.
    pub fn from_template(name: impl Into<String>, template: &Task, now: NaiveDateTime) -> Result<Self> {
        Task::from_parts(name.into(), String::new(), template.spec, now, template.done)
    }

    /// Rebuilds a task from stored fields, re-validating all of them.
    pub fn from_parts(
        name: String,
        description: String,
        spec: RecurrenceSpec,
        last_due: NaiveDateTime,
        done: bool,
    ) -> Result<Self> {
        check_name(&name)?;
        spec.validate()?;
        Ok(Task {
            name,
            description,
            spec,
            last_due,
            done,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        check_name(&name)?;
        self.name = name;
        Ok(())
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn spec(&self) -> &RecurrenceSpec {
        &self.spec
    }

    /// Replaces the whole recurrence configuration after validating it.
    pub fn set_spec(&mut self, spec: RecurrenceSpec) -> Result<()> {
        spec.validate()?;
        if spec.is_only_repeats_once_done() && !self.spec.is_only_repeats_once_done() {
            self.done = false;
        }
        self.spec = spec;
        Ok(())
    }

    pub fn last_due(&self) -> NaiveDateTime {
        self.last_due
    }

    pub fn is_currently_done(&self) -> bool {
        self.done
    }

    pub fn interval(&self) -> Interval {
        self.spec.interval()
    }

    pub fn set_interval(&mut self, magnitude: u32, unit: TimeUnit) -> Result<()> {
        let interval = Interval::new(magnitude, unit)?;
        self.spec = self.spec.with_interval(interval);
        Ok(())
    }

    pub fn is_only_repeats_once_done(&self) -> bool {
        self.spec.is_only_repeats_once_done()
    }

    /// Switching into once-done mode clears a done flag left over from a
    /// fixed cadence.
    pub fn set_only_repeats_once_done(&mut self, only_repeats_once_done: bool) {
        if only_repeats_once_done && !self.spec.is_only_repeats_once_done() {
            self.done = false;
        }
        self.spec = self.spec.only_repeats_once_done(only_repeats_once_done);
    }

    pub fn should_create_notification(&self) -> bool {
        self.spec.should_create_notification()
    }

    pub fn set_create_notification(&mut self, create_notification: bool) {
        self.spec = self.spec.create_notification(create_notification);
    }

    pub fn should_play_audio_alarm(&self) -> bool {
        self.spec.should_play_audio_alarm()
    }

    pub fn set_audio_alarm(&mut self, audio_alarm: bool) {
        self.spec = self.spec.audio_alarm(audio_alarm);
    }

    pub fn snap_unit(&self) -> Option<TimeUnit> {
        self.spec.snap()
    }

    pub fn snap_to(&mut self, unit: TimeUnit) {
        self.spec = self.spec.snap_to(unit);
    }

    pub fn do_not_snap(&mut self) {
        self.spec = self.spec.do_not_snap();
    }

    pub fn urgency(&self) -> Option<Interval> {
        self.spec.urgency()
    }

    pub fn set_urgency(&mut self, magnitude: u32, unit: TimeUnit) -> Result<()> {
        let threshold = Interval::new(magnitude, unit)
            .map_err(|_| Error::invalid("urgency threshold must be greater than zero"))?;
        self.spec = self.spec.urgent_after(threshold);
        Ok(())
    }

    pub fn clear_urgency(&mut self) {
        self.spec = self.spec.without_urgency();
    }

    pub(crate) fn set_last_due(&mut self, last_due: NaiveDateTime) {
        // never rewinds
        if last_due > self.last_due {
            self.last_due = last_due;
        }
    }

    pub(crate) fn set_done(&mut self, done: bool) {
        self.done = done;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn new_requires_name_and_positive_interval() {
        assert!(Task::new("Water plants", 0, TimeUnit::Day, at(1, 9)).is_err());
        assert!(Task::new("   ", 1, TimeUnit::Day, at(1, 9)).is_err());

        let task = Task::new("Water plants", 3, TimeUnit::Day, at(1, 9)).unwrap();
        assert_eq!(task.name(), "Water plants");
        assert_eq!(task.description(), "");
        assert_eq!(task.last_due(), at(1, 9));
        assert!(!task.is_currently_done());
    }

    #[test]
    fn setters_validate_their_own_invariant() {
        let mut task = Task::new("Backup", 1, TimeUnit::Week, at(1, 9)).unwrap();
        assert!(matches!(task.set_urgency(0, TimeUnit::Hour), Err(Error::InvalidConfiguration(_))));
        assert_eq!(task.urgency(), None);
        assert!(task.set_interval(0, TimeUnit::Day).is_err());
        assert_eq!(task.interval(), Interval::new(1, TimeUnit::Week).unwrap());
        assert!(task.set_name("").is_err());
        assert_eq!(task.name(), "Backup");
    }

    #[test]
    fn template_copies_settings_but_not_schedule() {
        let mut template = Task::new("A", 2, TimeUnit::Day, at(1, 9)).unwrap();
        template.snap_to(TimeUnit::Day);
        template.set_urgency(2, TimeUnit::Hour).unwrap();
        template.set_audio_alarm(true);
        template.set_description("template notes");

        let clone = Task::from_template("B", &template, at(5, 12)).unwrap();
        assert_eq!(clone.name(), "B");
        assert_eq!(clone.spec(), template.spec());
        assert_eq!(clone.is_currently_done(), template.is_currently_done());
        assert_eq!(clone.last_due(), at(5, 12));
        assert_eq!(clone.description(), "");
    }

    #[test]
    fn last_due_never_rewinds() {
        let mut task = Task::new("A", 1, TimeUnit::Day, at(3, 0)).unwrap();
        task.set_last_due(at(2, 0));
        assert_eq!(task.last_due(), at(3, 0));
    }

    #[test]
    fn switching_to_once_done_clears_stale_done_flag() {
        let mut task = Task::new("Standup", 1, TimeUnit::Day, at(1, 9)).unwrap();
        task.set_only_repeats_once_done(false);
        task.set_done(true);

        task.set_only_repeats_once_done(true);
        assert!(!task.is_currently_done());
        assert_eq!(task.last_due(), at(1, 9));
        assert!(crate::urgency::is_due(&task, at(28, 9)));

        // staying in fixed mode keeps the flag
        task.set_only_repeats_once_done(false);
        task.set_done(true);
        task.set_only_repeats_once_done(false);
        assert!(task.is_currently_done());
    }

    #[test]
    fn deserialization_revalidates() {
        let json = r#"{"name":"","spec":{"interval":{"magnitude":1,"unit":"day"}},"last_due":"2024-01-01T00:00:00"}"#;
        assert!(serde_json::from_str::<Task>(json).is_err());
    }
}
