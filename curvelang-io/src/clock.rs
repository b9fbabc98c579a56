//! Monotonic clock for the stopwatch opcodes and local broken-down time for
//! the date/time opcode.

use std::time::Instant;

/// A monotonic baseline `curvelang-core` measures the stopwatch against;
/// resetting the stopwatch (`T`) is done by the interpreter re-reading
/// [`crate::SystemHost::now_seconds`] and remembering the new baseline
/// itself, so this type only ever counts forward from process start.
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

/// `[year, month, day, hour, minute, second]` in local time.
pub fn local_datetime() -> [i64; 6] {
    let now = chrono::Local::now();
    use chrono::{Datelike, Timelike};
    [
        now.year() as i64,
        now.month() as i64,
        now.day() as i64,
        now.hour() as i64,
        now.minute() as i64,
        now.second() as i64,
    ]
}
