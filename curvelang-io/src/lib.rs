//! The concrete [`curvelang_core::Host`] implementation: a terminal in raw
//! mode for single-character reads, `regex` for find/sub, `rand` for
//! randomness, the system clock for the stopwatch and local time, and
//! `encoding_rs`-decoded file loading onto the Hilbert grid.

mod clock;
mod loader;
mod rng;
mod terminal;
mod text;

pub use loader::{load_hilbert, load_linear, LoadError};
pub use text::Encoding;

use curvelang_core::error::{CodeException, HostError};
use curvelang_core::host::GetchResult;
use curvelang_core::Host;
use rand::rngs::ThreadRng;

/// The production [`Host`]: real terminal, real clock, real randomness.
pub struct SystemHost {
    flush_every_write: bool,
    rng: ThreadRng,
    stopwatch: clock::Stopwatch,
}

impl SystemHost {
    pub fn new(flush_every_write: bool) -> Self {
        Self {
            flush_every_write,
            rng: rand::thread_rng(),
            stopwatch: clock::Stopwatch::new(),
        }
    }
}

impl Default for SystemHost {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Host for SystemHost {
    fn print(&mut self, s: &str) {
        use std::io::Write;
        print!("{s}");
        if self.flush_every_write {
            let _ = std::io::stdout().flush();
        }
    }

    fn newline(&mut self) {
        use std::io::Write;
        println!();
        if self.flush_every_write {
            let _ = std::io::stdout().flush();
        }
    }

    fn flush(&mut self) {
        use std::io::Write;
        let _ = std::io::stdout().flush();
    }

    fn read_line(&mut self) -> Result<Option<String>, HostError> {
        use std::io::BufRead;
        let mut line = String::new();
        let n = std::io::stdin().lock().read_line(&mut line)?;
        if n == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }

    fn getch(&mut self) -> Result<GetchResult, HostError> {
        terminal::getch()
    }

    fn random_float(&mut self) -> f64 {
        rng::random_float(&mut self.rng)
    }

    fn random_direction(&mut self) -> char {
        rng::random_direction(&mut self.rng)
    }

    fn random_index(&mut self, len: usize) -> usize {
        rng::random_index(&mut self.rng, len)
    }

    fn now_seconds(&mut self) -> f64 {
        self.stopwatch.elapsed()
    }

    fn local_datetime(&mut self) -> [i64; 6] {
        clock::local_datetime()
    }

    fn regex_sub(
        &mut self,
        pattern: &str,
        replacement: &str,
        text: &str,
    ) -> Result<String, CodeException> {
        let re = compile(pattern)?;
        Ok(re.replace_all(text, replacement).into_owned())
    }

    fn regex_findall(&mut self, pattern: &str, text: &str) -> Result<Vec<String>, CodeException> {
        let re = compile(pattern)?;
        Ok(re.find_iter(text).map(|m| m.as_str().to_string()).collect())
    }
}

fn compile(pattern: &str) -> Result<regex::Regex, CodeException> {
    regex::Regex::new(pattern).map_err(|e| CodeException::BadRegex {
        pattern: pattern.to_string(),
        detail: e.to_string(),
    })
}
