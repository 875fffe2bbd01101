use chrono::NaiveDateTime;
use tracing::warn;

use crate::error::{Error, Result};
use crate::models::Task;
use crate::snap::snap_forward;

/// Where a task stands at a given instant, from the notifier's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Not due yet.
    Upcoming,
    /// Due and not done.
    Due,
    /// Due, not done, and past its urgency threshold.
    Urgent,
    /// The current cycle has been completed.
    Done,
}

/// Raw (unsnapped) due instant of the task's current cycle.
///
/// Fixed-cadence tasks are due one interval after the last established due
/// instant. Tasks that only repeat once done stay due at `last_due` until
/// they are marked done.
pub fn unsnapped_due_instant(task: &Task) -> Result<NaiveDateTime> {
    if task.is_only_repeats_once_done() {
        Ok(task.last_due())
    } else {
        task.interval().add_to(task.last_due()).ok_or(Error::OutOfRange)
    }
}

/// The instant the task's current cycle becomes due, after snapping.
///
/// Pure: depends only on the task's state and never mutates it.
pub fn compute_due_instant(task: &Task) -> Result<NaiveDateTime> {
    let base = unsnapped_due_instant(task)?;
    match task.snap_unit() {
        Some(unit) => snap_forward(base, unit).ok_or(Error::OutOfRange),
        None => Ok(base),
    }
}

/// The instant an undone task becomes urgent, if it has a threshold.
pub fn urgent_instant(task: &Task) -> Result<Option<NaiveDateTime>> {
    let Some(threshold) = task.urgency() else {
        return Ok(None);
    };
    let due = compute_due_instant(task)?;
    threshold.add_to(due).map(Some).ok_or(Error::OutOfRange)
}

/// True when `now` has reached the due instant and the cycle is not done.
/// An instant before the task's last due instant is never due.
pub fn is_due(task: &Task, now: NaiveDateTime) -> bool {
    if task.is_currently_done() || now < task.last_due() {
        return false;
    }
    match compute_due_instant(task) {
        Ok(due) => now >= due,
        Err(e) => {
            warn!(task = task.name(), error = %e, "due instant not computable");
            false
        }
    }
}

/// True when the task is due and has stayed undone past its urgency
/// threshold. Always false without a threshold.
pub fn is_urgent(task: &Task, now: NaiveDateTime) -> bool {
    if task.urgency().is_none() || !is_due(task, now) {
        return false;
    }
    match urgent_instant(task) {
        Ok(Some(urgent_at)) => now >= urgent_at,
        Ok(None) => false,
        Err(e) => {
            warn!(task = task.name(), error = %e, "urgent instant not computable");
            false
        }
    }
}

pub fn status(task: &Task, now: NaiveDateTime) -> TaskStatus {
    if task.is_currently_done() {
        TaskStatus::Done
    } else if is_urgent(task, now) {
        TaskStatus::Urgent
    } else if is_due(task, now) {
        TaskStatus::Due
    } else {
        TaskStatus::Upcoming
    }
}

/// Whether a notifier should raise a notification for this task right now.
pub fn should_create_notification(task: &Task, now: NaiveDateTime) -> bool {
    task.should_create_notification() && is_due(task, now)
}

/// Whether a notifier should play the audio alarm for this task right now.
pub fn should_play_audio_alarm(task: &Task, now: NaiveDateTime) -> bool {
    task.should_play_audio_alarm() && is_due(task, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::TimeUnit;
    use chrono::NaiveDate;

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn fixed_cadence_is_due_one_interval_after_anchor() {
        let mut task = Task::new("Stretch", 6, TimeUnit::Hour, at(1, 8, 0)).unwrap();
        task.set_only_repeats_once_done(false);
        assert_eq!(compute_due_instant(&task).unwrap(), at(1, 14, 0));
        assert!(!is_due(&task, at(1, 13, 59)));
        assert!(is_due(&task, at(1, 14, 0)));
    }

    #[test]
    fn status_orders_done_over_urgent_over_due() {
        let mut task = Task::new("Meds", 1, TimeUnit::Day, at(1, 8, 0)).unwrap();
        task.set_urgency(30, TimeUnit::Minute).unwrap();
        assert_eq!(status(&task, at(1, 7, 0)), TaskStatus::Upcoming);
        assert_eq!(status(&task, at(1, 8, 10)), TaskStatus::Due);
        assert_eq!(status(&task, at(1, 8, 30)), TaskStatus::Urgent);
        task.set_done(true);
        assert_eq!(status(&task, at(1, 8, 30)), TaskStatus::Done);
    }

    #[test]
    fn notifier_flags_only_fire_when_due() {
        let mut task = Task::new("Call home", 1, TimeUnit::Week, at(2, 18, 0)).unwrap();
        task.set_audio_alarm(true);
        assert!(!should_create_notification(&task, at(2, 17, 0)));
        assert!(should_create_notification(&task, at(2, 18, 0)));
        assert!(should_play_audio_alarm(&task, at(2, 18, 0)));
        task.set_create_notification(false);
        assert!(!should_create_notification(&task, at(2, 18, 0)));
    }
}
