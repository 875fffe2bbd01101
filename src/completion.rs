use chrono::NaiveDateTime;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::Task;
use crate::urgency::compute_due_instant;

impl Task {
    /// Marks the current cycle as done.
    ///
    /// For tasks that only repeat once done, the next cycle is stamped in
    /// immediately: `last_due` becomes the current (snapped) due instant plus
    /// one interval and the task returns to not done. Fixed-cadence tasks
    /// keep their `last_due`; only the done flag changes, which silences
    /// due/urgent for the rest of the cycle.
    pub fn mark_done(&mut self, now: NaiveDateTime) -> Result<()> {
        self.spec().validate()?;
        if !self.is_only_repeats_once_done() {
            self.set_done(true);
            debug!(task = self.name(), %now, "cycle marked done");
            return Ok(());
        }

        // computed up front so a failure leaves the task untouched
        let due = compute_due_instant(self)?;
        let next = self.interval().add_to(due).ok_or(Error::OutOfRange)?;
        self.set_last_due(next);
        self.set_done(false);
        debug!(task = self.name(), %now, %due, %next, "completed; next cycle stamped");
        Ok(())
    }

    /// Clears the done flag. Does not rewind `last_due`.
    pub fn mark_not_done(&mut self) -> Result<()> {
        self.spec().validate()?;
        self.set_done(false);
        debug!(task = self.name(), "marked not done");
        Ok(())
    }

    /// Advances a fixed-cadence task to the cycle `now` falls in.
    ///
    /// Once the cadence point after the current due instant has passed,
    /// `last_due` jumps to the latest cadence point `p` with
    /// `p + interval <= now` and the done flag resets. Missed cycles collapse
    /// into the newest one. Returns whether a new cycle began. A no-op for
    /// tasks that only repeat once done.
    pub fn roll_forward(&mut self, now: NaiveDateTime) -> Result<bool> {
        self.spec().validate()?;
        if self.is_only_repeats_once_done() {
            return Ok(false);
        }

        let interval = self.interval();
        let elapsed = interval.whole_periods_between(self.last_due(), now);
        if elapsed < 2 {
            return Ok(false);
        }
        let anchor = interval
            .add_times(self.last_due(), elapsed - 1)
            .ok_or(Error::OutOfRange)?;
        debug!(task = self.name(), from = %self.last_due(), to = %anchor, skipped = elapsed - 2, "cadence rolled forward");
        self.set_last_due(anchor);
        self.set_done(false);
        Ok(true)
    }
}
