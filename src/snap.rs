use chrono::{Datelike, Days, NaiveDateTime, NaiveTime, Timelike};

use crate::interval::{Interval, TimeUnit};

/// Start of the `unit` period containing `instant`. Weeks start on Monday.
pub fn start_of(instant: NaiveDateTime, unit: TimeUnit) -> Option<NaiveDateTime> {
    let date = instant.date();
    match unit {
        TimeUnit::Second => instant.with_nanosecond(0),
        TimeUnit::Minute => Some(date.and_time(NaiveTime::from_hms_opt(instant.hour(), instant.minute(), 0)?)),
        TimeUnit::Hour => Some(date.and_time(NaiveTime::from_hms_opt(instant.hour(), 0, 0)?)),
        TimeUnit::Day => Some(date.and_time(NaiveTime::MIN)),
        TimeUnit::Week => {
            let back = u64::from(date.weekday().num_days_from_monday());
            Some(date.checked_sub_days(Days::new(back))?.and_time(NaiveTime::MIN))
        }
        TimeUnit::Month => Some(date.with_day(1)?.and_time(NaiveTime::MIN)),
    }
}

/// Rounds `instant` forward to the next boundary of `unit`.
///
/// Instants already on a boundary are returned unchanged, so snapping is
/// idempotent and never moves backward. Month lengths come from the
/// calendar, not from a fixed approximation.
pub fn snap_forward(instant: NaiveDateTime, unit: TimeUnit) -> Option<NaiveDateTime> {
    let floor = start_of(instant, unit)?;
    if floor == instant {
        return Some(instant);
    }
    // magnitude 1 is always valid
    let one = Interval::new(1, unit).ok()?;
    one.add_to(floor)
}
