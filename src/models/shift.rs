//! Shift and time window models.
//!
//! A shift is a wall-clock window that may span midnight. Scheduling
//! arithmetic happens in ms relative to the shift start on the schedule
//! date; [`ShiftWindow`] converts between the two.
//!
//! # Breaks
//! Break windows are carried on the shift and reduce its productive
//! capacity, but equipment availability is not interrupted by them.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// A time interval [start, end) in ms relative to the shift start.
///
/// Half-open interval: includes start, excludes end.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeWindow {
    /// Interval start (ms, inclusive).
    pub start_ms: i64,
    /// Interval end (ms, exclusive).
    pub end_ms: i64,
}

impl TimeWindow {
    /// Creates a new time window.
    pub fn new(start_ms: i64, end_ms: i64) -> Self {
        Self { start_ms, end_ms }
    }

    /// Duration of this window (ms).
    #[inline]
    pub fn duration_ms(&self) -> i64 {
        self.end_ms - self.start_ms
    }

    /// Whether a timestamp falls within this window.
    #[inline]
    pub fn contains(&self, time_ms: i64) -> bool {
        time_ms >= self.start_ms && time_ms < self.end_ms
    }

    /// Whether two windows overlap.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start_ms < other.end_ms && other.start_ms < self.end_ms
    }

    /// Length of the intersection with `other` (0 when disjoint).
    pub fn overlap_ms(&self, other: &Self) -> i64 {
        let start = self.start_ms.max(other.start_ms);
        let end = self.end_ms.min(other.end_ms);
        (end - start).max(0)
    }
}

/// A named break inside a shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShiftBreak {
    /// Break label (e.g., "lunch").
    pub name: String,
    /// Wall-clock start.
    pub start: NaiveTime,
    /// Wall-clock end.
    pub end: NaiveTime,
}

/// A production shift.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shift {
    /// Shift name (e.g., "day", "night").
    pub name: String,
    /// Wall-clock start.
    pub start: NaiveTime,
    /// Wall-clock end. At or before `start` means the shift ends the next day.
    pub end: NaiveTime,
    /// Breaks within the shift.
    pub breaks: Vec<ShiftBreak>,
}

/// A shift anchored to a calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftWindow {
    /// Shift start on the schedule date.
    pub start: NaiveDateTime,
    /// Shift end (possibly the following day).
    pub end: NaiveDateTime,
}

impl ShiftWindow {
    /// Window length (ms).
    pub fn duration_ms(&self) -> i64 {
        (self.end - self.start).num_milliseconds()
    }

    /// Offset of `time` from the shift start (ms). Negative before the shift.
    pub fn offset_ms(&self, time: NaiveDateTime) -> i64 {
        (time - self.start).num_milliseconds()
    }

    /// Wall-clock time `offset_ms` after the shift start.
    ///
    /// `None` when the result falls outside the calendar range.
    pub fn at(&self, offset_ms: i64) -> Option<NaiveDateTime> {
        Duration::try_milliseconds(offset_ms).and_then(|d| self.start.checked_add_signed(d))
    }

    /// The window as a relative [`TimeWindow`].
    pub fn as_time_window(&self) -> TimeWindow {
        TimeWindow::new(0, self.duration_ms())
    }
}

impl Shift {
    /// Creates a shift without breaks.
    pub fn new(name: impl Into<String>, start: NaiveTime, end: NaiveTime) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            breaks: Vec::new(),
        }
    }

    /// Adds a break.
    pub fn with_break(mut self, name: impl Into<String>, start: NaiveTime, end: NaiveTime) -> Self {
        self.breaks.push(ShiftBreak {
            name: name.into(),
            start,
            end,
        });
        self
    }

    /// Whether the shift ends on the day after it starts.
    #[inline]
    pub fn spans_midnight(&self) -> bool {
        self.end <= self.start
    }

    /// Anchors the shift to `date`.
    pub fn window(&self, date: NaiveDate) -> ShiftWindow {
        let start = date.and_time(self.start);
        let mut end = date.and_time(self.end);
        if self.spans_midnight() {
            end += Duration::days(1);
        }
        ShiftWindow { start, end }
    }

    /// Shift length (ms).
    pub fn duration_ms(&self) -> i64 {
        let raw = (self.end - self.start).num_milliseconds();
        if self.spans_midnight() {
            raw + Duration::days(1).num_milliseconds()
        } else {
            raw
        }
    }

    /// Break windows relative to the shift start, clipped to the shift.
    pub fn break_windows(&self) -> Vec<TimeWindow> {
        let shift = TimeWindow::new(0, self.duration_ms());
        let day_ms = Duration::days(1).num_milliseconds();
        self.breaks
            .iter()
            .filter_map(|b| {
                let mut start = (b.start - self.start).num_milliseconds();
                if start < 0 {
                    start += day_ms;
                }
                let mut len = (b.end - b.start).num_milliseconds();
                if len <= 0 {
                    len += day_ms;
                }
                let w = TimeWindow::new(start, start + len);
                let clipped = TimeWindow::new(w.start_ms.max(0), w.end_ms.min(shift.end_ms));
                (clipped.duration_ms() > 0).then_some(clipped)
            })
            .collect()
    }

    /// Total break time inside the shift (ms).
    pub fn break_ms(&self) -> i64 {
        self.break_windows().iter().map(TimeWindow::duration_ms).sum()
    }

    /// Shift length minus breaks (ms).
    pub fn productive_ms(&self) -> i64 {
        (self.duration_ms() - self.break_ms()).max(0)
    }
}
