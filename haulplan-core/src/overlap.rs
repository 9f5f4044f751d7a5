//! Conflict detector: time-range overlap between schedule-like records.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

use crate::schedule::{Schedule, ScheduleDraft};
use crate::time::{end_of_day, start_of_day};

/// Anything with an (optionally incomplete) date/time window.
pub trait TimeWindow {
    fn window_id(&self) -> Option<&str>;
    fn window_start_date(&self) -> Option<NaiveDate>;
    fn window_end_date(&self) -> Option<NaiveDate>;
    fn window_start_time(&self) -> Option<NaiveTime>;
    fn window_end_time(&self) -> Option<NaiveTime>;

    /// `[start, end)` with missing times defaulting to 00:00 / 23:59.
    /// `None` when either date is missing.
    fn bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let start_date = self.window_start_date()?;
        let end_date = self.window_end_date()?;
        let start = start_date.and_time(self.window_start_time().unwrap_or_else(start_of_day));
        let end = end_date.and_time(self.window_end_time().unwrap_or_else(end_of_day));
        Some((start, end))
    }
}

impl TimeWindow for Schedule {
    fn window_id(&self) -> Option<&str> {
        Some(&self.id)
    }
    fn window_start_date(&self) -> Option<NaiveDate> {
        Some(self.start_date)
    }
    fn window_end_date(&self) -> Option<NaiveDate> {
        Some(self.end_date)
    }
    fn window_start_time(&self) -> Option<NaiveTime> {
        Some(self.start_time)
    }
    fn window_end_time(&self) -> Option<NaiveTime> {
        Some(self.end_time)
    }
}

impl TimeWindow for ScheduleDraft {
    fn window_id(&self) -> Option<&str> {
        self.id.as_deref()
    }
    fn window_start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }
    fn window_end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }
    fn window_start_time(&self) -> Option<NaiveTime> {
        self.start_time
    }
    fn window_end_time(&self) -> Option<NaiveTime> {
        self.end_time
    }
}

/// True when the two windows intersect: `start1 < end2 && end1 > start2`.
///
/// A record missing either date never overlaps anything.
pub fn is_time_overlap(a: &impl TimeWindow, b: &impl TimeWindow) -> bool {
    let (Some((start1, end1)), Some((start2, end2))) = (a.bounds(), b.bounds()) else {
        debug!(
            a = a.window_id().unwrap_or("<draft>"),
            b = b.window_id().unwrap_or("<draft>"),
            "overlap check skipped: record without dates"
        );
        return false;
    };
    start1 < end2 && end1 > start2
}

/// Stored schedules that would collide with `candidate` on the same resource.
///
/// Skips cancelled schedules and the candidate's own id.
pub fn colliding<'a, W: TimeWindow>(
    candidate: &'a W,
    others: &'a [Schedule],
    holds_resource: impl Fn(&Schedule) -> bool + 'a,
) -> impl Iterator<Item = &'a Schedule> + 'a {
    let own_id = candidate.window_id();
    others.iter().filter(move |s| {
        holds_resource(s)
            && !s.is_cancelled()
            && Some(s.id.as_str()) != own_id
            && is_time_overlap(*s, candidate)
    })
}

/// Index pairs `(i, j)`, `i < j`, of overlapping records.
pub fn overlapping_pairs<W: TimeWindow>(items: &[&W]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for i in 0..items.len() {
        for j in (i + 1)..items.len() {
            if is_time_overlap(items[i], items[j]) {
                pairs.push((i, j));
            }
        }
    }
    pairs
}
