use chrono::{NaiveDate, NaiveDateTime};
use repete::{compute_due_instant, is_due, is_urgent, Interval, RecurrenceSpec, Task, TimeUnit};

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

/// Daily task, snapped to the start of the day, created 2024-01-01 15:00.
fn daily_snapped() -> Task {
    let mut task = Task::new("Water plants", 1, TimeUnit::Day, at(2024, 1, 1, 15, 0)).unwrap();
    task.snap_to(TimeUnit::Day);
    task
}

#[test]
fn test_snapped_task_is_due_at_next_midnight() {
    let task = daily_snapped();
    assert!(task.is_only_repeats_once_done());
    assert_eq!(compute_due_instant(&task).unwrap(), at(2024, 1, 2, 0, 0));
    assert!(!is_due(&task, at(2024, 1, 1, 23, 59)));
    assert!(is_due(&task, at(2024, 1, 2, 0, 0)));
}

#[test]
fn test_urgency_threshold() {
    let mut task = daily_snapped();
    task.set_urgency(2, TimeUnit::Hour).unwrap();
    assert!(!is_urgent(&task, at(2024, 1, 2, 1, 59)));
    assert!(is_urgent(&task, at(2024, 1, 2, 2, 0)));
}

#[test]
fn test_mark_done_stamps_next_snapped_cycle() {
    let mut task = daily_snapped();
    task.set_urgency(2, TimeUnit::Hour).unwrap();
    assert!(is_urgent(&task, at(2024, 1, 2, 5, 0)));

    task.mark_done(at(2024, 1, 2, 5, 0)).unwrap();
    assert_eq!(task.last_due(), at(2024, 1, 3, 0, 0));
    assert!(!task.is_currently_done());
    assert!(!is_due(&task, at(2024, 1, 2, 23, 0)));
    assert!(!is_urgent(&task, at(2024, 1, 2, 23, 0)));
    assert!(is_due(&task, at(2024, 1, 3, 0, 0)));
}

#[test]
fn test_template_clone_restarts_schedule() {
    let mut template = daily_snapped();
    template.set_urgency(2, TimeUnit::Hour).unwrap();
    template.mark_done(at(2024, 1, 2, 5, 0)).unwrap();

    let created = at(2024, 3, 10, 8, 30);
    let clone = Task::from_template("B", &template, created).unwrap();
    assert_eq!(clone.name(), "B");
    assert_eq!(clone.spec(), template.spec());
    assert_eq!(clone.last_due(), created);
    assert_ne!(clone.last_due(), template.last_due());
}

#[test]
fn test_urgency_never_fires_without_threshold() {
    let task = Task::new("Stretch", 1, TimeUnit::Hour, at(2024, 1, 1, 0, 0)).unwrap();
    for days in 0..400 {
        let now = at(2024, 1, 1, 0, 0) + chrono::Duration::days(days);
        assert!(!is_urgent(&task, now));
    }
}

#[test]
fn test_not_due_before_last_due_even_when_backdated_clock() {
    let mut task = Task::new("Pay rent", 1, TimeUnit::Month, at(2024, 5, 1, 9, 0)).unwrap();
    task.set_only_repeats_once_done(false);
    assert!(!is_due(&task, at(2024, 4, 30, 9, 0)));
    assert!(!is_due(&task, at(1970, 1, 1, 0, 0)));
    assert!(!is_urgent(&task, at(2024, 4, 30, 9, 0)));
}

#[test]
fn test_mark_done_advances_exactly_one_interval() {
    let starts = [at(2024, 1, 31, 10, 15), at(2023, 12, 31, 23, 59), at(2024, 2, 29, 0, 0)];
    let intervals = [
        Interval::new(45, TimeUnit::Minute).unwrap(),
        Interval::new(3, TimeUnit::Day).unwrap(),
        Interval::new(2, TimeUnit::Week).unwrap(),
        Interval::new(1, TimeUnit::Month).unwrap(),
    ];
    let snaps = [None, Some(TimeUnit::Hour), Some(TimeUnit::Day), Some(TimeUnit::Month)];

    for start in starts {
        for interval in intervals {
            for snap in snaps {
                let mut spec = RecurrenceSpec::new(interval);
                if let Some(unit) = snap {
                    spec = spec.snap_to(unit);
                }
                let mut task = Task::with_spec("t", spec, start).unwrap();
                let due = compute_due_instant(&task).unwrap();
                task.mark_done(due).unwrap();
                assert_eq!(task.last_due(), interval.add_to(due).unwrap());
                assert!(!task.is_currently_done());
                assert!(task.last_due() > start);
            }
        }
    }
}

#[test]
fn test_fixed_cadence_mark_done_keeps_anchor_and_silences_urgency() {
    let mut task = Task::new("Standup", 1, TimeUnit::Day, at(2024, 1, 1, 9, 0)).unwrap();
    task.set_only_repeats_once_done(false);
    task.set_urgency(15, TimeUnit::Minute).unwrap();
    let anchor = task.last_due();

    assert!(is_urgent(&task, at(2024, 1, 2, 9, 20)));
    for now in [at(2024, 1, 2, 9, 20), at(2024, 1, 9, 9, 20), at(2025, 1, 1, 0, 0)] {
        let mut copy = task.clone();
        copy.mark_done(now).unwrap();
        assert_eq!(copy.last_due(), anchor);
        assert!(copy.is_currently_done());
        assert!(!is_due(&copy, now));
        assert!(!is_urgent(&copy, now));
    }
}

#[test]
fn test_fixed_cadence_uses_unsnapped_anchor() {
    let mut task = Task::new("Report", 1, TimeUnit::Week, at(2024, 1, 3, 14, 0)).unwrap();
    task.set_only_repeats_once_done(false);
    task.snap_to(TimeUnit::Day);
    // raw due Wed 10th 14:00, displayed at Thu 11th 00:00
    assert_eq!(compute_due_instant(&task).unwrap(), at(2024, 1, 11, 0, 0));

    assert!(task.roll_forward(at(2024, 1, 17, 14, 0)).unwrap());
    assert_eq!(task.last_due(), at(2024, 1, 10, 14, 0));
    assert_eq!(compute_due_instant(&task).unwrap(), at(2024, 1, 18, 0, 0));
}

#[test]
fn test_zero_interval_is_invalid_configuration() {
    let err = Task::new("Never", 0, TimeUnit::Hour, at(2024, 1, 1, 0, 0)).unwrap_err();
    assert!(matches!(err, repete::Error::InvalidConfiguration(_)));
}
