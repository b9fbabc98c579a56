//! The execution state machine: program counter, direction, lexical mode,
//! and the single-step/run loop that drives the opcode dispatch table.

use crate::error::{CodeException, HostError};
use crate::grid::Grid;
use crate::hilbert::{coord_of, dist_of};
use crate::host::Host;
use crate::ops;
use crate::stacks::StackFamily;
use crate::value::Value;

/// The lexical mode deciding how the current cell is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Command,
    String,
    StringEscape,
    Char,
    CharEscape,
    Escape,
}

/// Either a program-level [`CodeException`] (recoverable at a catch mark)
/// or a [`HostError`] (never recoverable in-language).
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error(transparent)]
    Code(#[from] CodeException),
    #[error(transparent)]
    Host(#[from] HostError),
}

/// What a step or an individual opcode did to the program counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Motion {
    /// The opcode didn't touch the position; advance along the curve.
    Advance,
    /// The opcode already repositioned the program counter (a direction
    /// key, a mirror, a jump, a restart); take no further action.
    Stay,
    /// The program halted (`X`, or a step off the edge of the grid).
    Halt,
}

/// Runtime options that don't change language semantics.
#[derive(Debug, Clone, Copy, Default)]
pub struct Config {
    /// Flush output after every write.
    pub flush: bool,
    /// Disable catch marks: every `CodeException` is fatal.
    pub all_errors_fatal: bool,
}

/// Outcome of a bounded run, used by tests that need to cap a program that
/// would otherwise spin forever on a catch-mark loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Halted,
    StepBudgetExceeded,
}

/// The interpreter's full mutable state for one program.
pub struct Interpreter {
    pub(crate) grid: Grid,
    pub(crate) stacks: StackFamily,
    pub(crate) x: u64,
    pub(crate) y: u64,
    pub(crate) dir: i64,
    pub(crate) mode: Mode,
    pub(crate) buf: String,
    pub(crate) prev: char,
    pub(crate) mark: Option<(u64, u64)>,
    pub(crate) quick: Value,
    pub(crate) t0: f64,
    pub(crate) halted: bool,
    pub config: Config,
}

impl Interpreter {
    /// Builds a fresh interpreter over `grid`, with the program counter at
    /// `(0,0)`, direction `+1`, and mode `Command`.
    pub fn new(grid: Grid, config: Config, now: f64) -> Self {
        Self {
            grid,
            stacks: StackFamily::new(),
            x: 0,
            y: 0,
            dir: 1,
            mode: Mode::Command,
            buf: String::new(),
            prev: ' ',
            mark: None,
            quick: Value::Str(String::new()),
            t0: now,
            halted: false,
            config,
        }
    }

    pub fn order(&self) -> u32 {
        self.grid.order()
    }

    pub fn position(&self) -> (u64, u64) {
        (self.x, self.y)
    }

    pub fn direction(&self) -> i64 {
        self.dir
    }

    fn side(&self) -> u64 {
        self.grid.side()
    }

    fn distance(&self) -> u64 {
        dist_of(self.x, self.y, self.order())
    }

    /// The program counter's current position expressed as a curve index,
    /// used by `j` to compute a relative jump.
    pub(crate) fn current_distance(&self) -> u64 {
        self.distance()
    }

    /// Curve length, `4^p`.
    fn curve_len(&self) -> u64 {
        self.side() * self.side()
    }

    /// Steps the program counter to the Hilbert successor (or predecessor
    /// when `dir == -1`); halts when that would move off either end of the
    /// curve.
    pub(crate) fn advance_curve(&mut self) -> Motion {
        let d = self.distance() as i64;
        let nd = d + self.dir;
        if nd < 0 || nd as u64 >= self.curve_len() {
            Motion::Halt
        } else {
            let (x, y) = coord_of(nd as u64, self.order());
            self.x = x;
            self.y = y;
            Motion::Advance
        }
    }

    /// Jumps directly to a curve distance; out-of-range distances wrap
    /// modulo the curve length rather than halting, since only ordinary
    /// successor/predecessor stepping is defined to halt at the ends
    /// (invariant I2 in the specification covers stepping, not explicit
    /// jumps).
    pub(crate) fn goto_distance(&mut self, d: i64) {
        let len = self.curve_len() as i64;
        let wrapped = d.rem_euclid(len) as u64;
        let (x, y) = coord_of(wrapped, self.order());
        self.x = x;
        self.y = y;
    }

    pub(crate) fn goto_wrapped(&mut self, x: i64, y: i64) {
        let side = self.side() as i64;
        self.x = x.rem_euclid(side) as u64;
        self.y = y.rem_euclid(side) as u64;
    }

    pub(crate) fn mirror_h_target(&self) -> (u64, u64) {
        (self.x, self.side() - 1 - self.y)
    }

    pub(crate) fn mirror_v_target(&self) -> (u64, u64) {
        (self.side() - 1 - self.x, self.y)
    }

    pub(crate) fn mirror_both_target(&self) -> (u64, u64) {
        (self.side() - 1 - self.x, self.side() - 1 - self.y)
    }

    pub(crate) fn set_position(&mut self, pos: (u64, u64)) {
        self.x = pos.0;
        self.y = pos.1;
    }

    fn current_char(&self) -> char {
        self.grid.get(self.x, self.y)
    }

    /// Executes a single step: reads the cell under the program counter and
    /// dispatches it according to the current lexical mode.
    fn step(&mut self, host: &mut dyn Host) -> Result<Motion, StepError> {
        let cmd = self.current_char();
        if cmd != ' ' {
            log::trace!("({}, {}) {:?} {cmd:?}", self.x, self.y, self.mode);
        }
        match self.mode {
            Mode::Command => self.step_command(host, cmd),
            Mode::String | Mode::StringEscape => Ok(self.step_string(cmd)),
            Mode::Char | Mode::CharEscape => Ok(self.step_char(cmd)),
            Mode::Escape => Ok(self.step_escape()),
        }
    }

    fn step_command(&mut self, host: &mut dyn Host, cmd: char) -> Result<Motion, StepError> {
        let motion = if cmd == '.' {
            ops::dispatch(self, host, self.prev)?
        } else {
            let m = ops::dispatch(self, host, cmd)?;
            self.prev = cmd;
            m
        };
        Ok(match motion {
            Motion::Advance => self.advance_curve(),
            other => other,
        })
    }

    fn step_string(&mut self, cmd: char) -> Motion {
        match (self.mode, cmd) {
            (Mode::String, '"') => {
                self.stacks.push(Value::Str(std::mem::take(&mut self.buf)));
                self.mode = Mode::Command;
            }
            (Mode::String, '\\') => self.mode = Mode::StringEscape,
            (Mode::StringEscape, 'n') => {
                self.buf.push('\n');
                self.mode = Mode::String;
            }
            (Mode::StringEscape, 't') => {
                self.buf.push('\t');
                self.mode = Mode::String;
            }
            (Mode::StringEscape, other) => {
                self.buf.push(other);
                self.mode = Mode::String;
            }
            (_, other) => {
                self.buf.push(other);
                self.mode = Mode::String;
            }
        }
        self.advance_curve()
    }

    fn step_char(&mut self, cmd: char) -> Motion {
        match (self.mode, cmd) {
            (Mode::Char, '\\') => self.mode = Mode::CharEscape,
            (Mode::CharEscape, 'n') => {
                self.stacks.push(Value::Str('\n'.to_string()));
                self.mode = Mode::Command;
            }
            (Mode::CharEscape, 't') => {
                self.stacks.push(Value::Str('\t'.to_string()));
                self.mode = Mode::Command;
            }
            (Mode::CharEscape, other) => {
                self.stacks.push(Value::Str(other.to_string()));
                self.mode = Mode::Command;
            }
            (_, other) => {
                self.stacks.push(Value::Str(other.to_string()));
                self.mode = Mode::Command;
            }
        }
        self.advance_curve()
    }

    fn step_escape(&mut self) -> Motion {
        self.mode = Mode::Command;
        self.advance_curve()
    }

    /// Runs until the program halts or an unrecoverable error propagates.
    pub fn run(&mut self, host: &mut dyn Host) -> Result<(), StepError> {
        loop {
            match self.run_one_recovering(host)? {
                Motion::Halt => return Ok(()),
                _ => continue,
            }
        }
    }

    /// Runs for at most `limit` steps; used by tests so a catch-mark loop
    /// (scenario 5 in the specification) terminates deterministically
    /// instead of spinning forever.
    pub fn run_with_limit(
        &mut self,
        host: &mut dyn Host,
        limit: u64,
    ) -> Result<RunOutcome, StepError> {
        for _ in 0..limit {
            if self.run_one_recovering(host)? == Motion::Halt {
                return Ok(RunOutcome::Halted);
            }
        }
        Ok(RunOutcome::StepBudgetExceeded)
    }

    fn run_one_recovering(&mut self, host: &mut dyn Host) -> Result<Motion, StepError> {
        match self.step(host) {
            Ok(motion) => Ok(motion),
            Err(StepError::Code(e)) => {
                if let Some(mark) = self.mark {
                    if !self.config.all_errors_fatal {
                        log::warn!("caught: {e}");
                        self.set_position(mark);
                        return Ok(Motion::Advance);
                    }
                }
                Err(StepError::Code(e))
            }
            Err(e @ StepError::Host(_)) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{GetchResult, Host};

    struct NullHost {
        out: String,
    }

    impl NullHost {
        fn new() -> Self {
            Self { out: String::new() }
        }
    }

    impl Host for NullHost {
        fn print(&mut self, s: &str) {
            self.out.push_str(s);
        }
        fn newline(&mut self) {
            self.out.push('\n');
        }
        fn flush(&mut self) {}
        fn read_line(&mut self) -> Result<Option<String>, HostError> {
            Ok(None)
        }
        fn getch(&mut self) -> Result<GetchResult, HostError> {
            Ok(GetchResult::Eof)
        }
        fn random_float(&mut self) -> f64 {
            0.5
        }
        fn random_direction(&mut self) -> char {
            '>'
        }
        fn random_index(&mut self, len: usize) -> usize {
            len.saturating_sub(1)
        }
        fn now_seconds(&mut self) -> f64 {
            0.0
        }
        fn local_datetime(&mut self) -> [i64; 6] {
            [2024, 1, 1, 0, 0, 0]
        }
        fn regex_sub(
            &mut self,
            _pattern: &str,
            _replacement: &str,
            text: &str,
        ) -> Result<String, CodeException> {
            Ok(text.to_string())
        }
        fn regex_findall(
            &mut self,
            _pattern: &str,
            _text: &str,
        ) -> Result<Vec<String>, CodeException> {
            Ok(vec![])
        }
    }

    /// Builds an interpreter from a compact program string, laid onto the
    /// grid in Hilbert curve order ("linear mode") the way the
    /// specification's end-to-end scenarios are written.
    fn interp_linear(source: &str) -> Interpreter {
        let chars: Vec<char> = source.chars().collect();
        let grid = Grid::from_linear(&chars);
        Interpreter::new(grid, Config::default(), 0.0)
    }

    fn interp_lines(lines: &[&str]) -> Interpreter {
        let owned: Vec<String> = lines.iter().map(|s| s.to_string()).collect();
        let grid = Grid::from_lines(&owned);
        Interpreter::new(grid, Config::default(), 0.0)
    }

    #[test]
    fn addition_and_print() {
        let mut vm = interp_linear("23+p");
        let mut host = NullHost::new();
        vm.run(&mut host).unwrap();
        assert_eq!(host.out, "5");
    }

    #[test]
    fn duplicate_and_multiply() {
        let mut vm = interp_linear("5d*p");
        let mut host = NullHost::new();
        vm.run(&mut host).unwrap();
        assert_eq!(host.out, "25");
    }

    #[test]
    fn two_line_string_literal() {
        let mut vm = interp_lines(&["Xp  ", "\"hi\""]);
        let mut host = NullHost::new();
        vm.run(&mut host).unwrap();
        assert_eq!(host.out, "hi");
    }

    #[test]
    fn range_down_prints_in_order() {
        let mut vm = interp_linear("5Zppppp");
        let mut host = NullHost::new();
        vm.run(&mut host).unwrap();
        assert_eq!(host.out, "12345");
    }

    #[test]
    fn catch_mark_loops_until_budget() {
        let mut vm = interp_linear("@&");
        let mut host = NullHost::new();
        let outcome = vm.run_with_limit(&mut host, 1000).unwrap();
        assert_eq!(outcome, RunOutcome::StepBudgetExceeded);
    }

    #[test]
    fn catch_mark_disabled_is_fatal() {
        let mut vm = interp_linear("@&");
        vm.config.all_errors_fatal = true;
        let mut host = NullHost::new();
        let err = vm.run_with_limit(&mut host, 1000).unwrap_err();
        assert!(matches!(err, StepError::Code(CodeException::Raised)));
    }
}
