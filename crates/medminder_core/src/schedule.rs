//! crates/medminder_core/src/schedule.rs
//!
//! Pure time-matching logic for the reminder pipeline: the time-window
//! matcher, the per-minute dedup gate, and the active-window filter.
//! None of this touches the clock; callers pass the timestamp in.

use crate::domain::{DueReminder, Period};
use chrono::{NaiveDate, NaiveDateTime, Timelike};

//=========================================================================================
// Time-Window Matcher
//=========================================================================================

/// The canonical key for one wall-clock minute: the date, the zero-padded
/// 24-hour "HH:MM" time, and the AM/PM discriminator stored reminders use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    pub date_key: NaiveDate,
    pub time_key: String,
    pub period: Period,
}

impl TimeWindow {
    /// Computes the window for the given local wall-clock timestamp.
    /// Pure function of the input; no timezone conversion happens here.
    pub fn at(now: NaiveDateTime) -> Self {
        let hour = now.hour();
        let period = if hour >= 12 { Period::Pm } else { Period::Am };
        Self {
            date_key: now.date(),
            time_key: format!("{:02}:{:02}", hour, now.minute()),
            period,
        }
    }

    /// The checkpoint candidate for this window.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            date_key: self.date_key,
            time_key: self.time_key.clone(),
            period: self.period,
        }
    }
}

//=========================================================================================
// Dedup Gate
//=========================================================================================

/// The last date+time+period key the gate admitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    pub date_key: NaiveDate,
    pub time_key: String,
    pub period: Period,
}

/// Admits each per-minute window at most once.
///
/// This is a single-consumer in-memory guard: the read and the write happen
/// inside one synchronous call, so it is correct under the polling model
/// where one tick runs at a time. It does not protect against concurrent
/// pollers in separate processes (a documented limitation of the design).
/// The checkpoint resets on process restart and is deliberately kept across
/// sign-out/sign-in transitions.
#[derive(Debug, Default)]
pub struct DedupGate {
    last_processed: Option<Checkpoint>,
}

impl DedupGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` and records the window as processed if it differs from
    /// the stored checkpoint; returns `false` without touching state when the
    /// same minute is offered again.
    pub fn admit(&mut self, window: &TimeWindow) -> bool {
        let candidate = window.checkpoint();
        if self.last_processed.as_ref() == Some(&candidate) {
            return false;
        }
        self.last_processed = Some(candidate);
        true
    }

    /// The last admitted key, if any tick has been processed yet.
    pub fn last_processed(&self) -> Option<&Checkpoint> {
        self.last_processed.as_ref()
    }
}

//=========================================================================================
// Active-Window Filter
//=========================================================================================

/// Whether the reminder's medication is inside its inclusive
/// `[start_date, end_date]` range on the given date.
///
/// This re-validates what the fetch already filtered on `is_active`; it
/// guards against stale active flags on expired medications, so failing
/// reminders are skipped silently rather than treated as errors.
pub fn within_active_window(due: &DueReminder, date_key: NaiveDate) -> bool {
    due.medication.start_date <= date_key && date_key <= due.medication.end_date
}
