//! The seam between the pure interpreter core and every effectful
//! primitive an opcode can invoke: printing, line/character input, random
//! numbers, the clock, and regex. `curvelang-core` never touches a
//! terminal, the filesystem, or a regex engine directly — it only calls
//! through this trait, so the interpreter is testable with a mock `Host`.

use crate::error::{CodeException, HostError};

/// A single raw character read, or the end-of-input/interrupt outcomes the
/// `,` opcode must distinguish.
pub enum GetchResult {
    /// A character was read (already translated: `\r` becomes an empty
    /// string by the *caller*, so this is the raw character here).
    Char(char),
    /// End of input.
    Eof,
}

pub trait Host {
    /// Prints text without a trailing newline.
    fn print(&mut self, s: &str);

    /// Prints a newline.
    fn newline(&mut self);

    /// Flushes buffered output, if the "flush every write" option is set.
    fn flush(&mut self);

    /// Reads one line from standard input, with the trailing newline
    /// already stripped. `Ok(None)` on end-of-input.
    fn read_line(&mut self) -> Result<Option<String>, HostError>;

    /// Reads a single character, putting a tty into raw mode for the
    /// duration of the read. `^C` surfaces as [`HostError::Interrupt`];
    /// `^Z` self-suspends the process and then resumes the read.
    fn getch(&mut self) -> Result<GetchResult, HostError>;

    /// Uniform float in `[0, 1)`.
    fn random_float(&mut self) -> f64;

    /// Uniform choice among the four direction characters.
    fn random_direction(&mut self) -> char;

    /// Fisher-Yates shuffle callback: given a slice length, returns a
    /// uniformly chosen index in `[0, len)`.
    fn random_index(&mut self, len: usize) -> usize;

    /// Seconds elapsed on a monotonic-enough clock, used for the stopwatch.
    fn now_seconds(&mut self) -> f64;

    /// Local broken-down time as `[year, month, day, hour, minute, second]`.
    fn local_datetime(&mut self) -> [i64; 6];

    /// `regex_sub(pattern, replacement, text)`, used by `%` on strings.
    fn regex_sub(&mut self, pattern: &str, replacement: &str, text: &str)
        -> Result<String, CodeException>;

    /// `regex_findall(pattern, text)` in input order, used by `/` and `a`
    /// on strings.
    fn regex_findall(&mut self, pattern: &str, text: &str) -> Result<Vec<String>, CodeException>;
}
