//! # Repete
//!
//! Recurring reminders that know when they are due.
//!
//! A [`Task`] carries a [`RecurrenceSpec`] (how often it repeats, whether the
//! countdown only restarts once it is marked done, optional snapping of due
//! times to calendar boundaries and an optional urgency threshold). The
//! engine in [`urgency`] answers "is this due / urgent now?" for a given
//! instant, and [`Task::mark_done`] moves the task into its next cycle.
//!
//! Instants are `chrono::NaiveDateTime` values the caller has already
//! normalized to one clock; the core never reads the wall clock itself.
//!
//! ```
//! use chrono::NaiveDate;
//! use repete::{is_due, Task, TimeUnit};
//!
//! let created = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(15, 0, 0).unwrap();
//! let mut task = Task::new("Water plants", 1, TimeUnit::Day, created).unwrap();
//! task.snap_to(TimeUnit::Day);
//!
//! let midnight = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! assert!(!is_due(&task, created));
//! assert!(is_due(&task, midnight));
//! ```

pub mod commands;
pub mod completion;
pub mod error;
pub mod interval;
pub mod models;
pub mod recurrence;
pub mod snap;
pub mod storage;
pub mod urgency;

pub use error::{Error, Result};
pub use interval::{Interval, TimeUnit};
pub use models::Task;
pub use recurrence::RecurrenceSpec;
pub use urgency::{compute_due_instant, is_due, is_urgent, status, TaskStatus};
