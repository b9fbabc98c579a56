//! Single-character raw-mode read, mirroring the original interpreter's
//! `termios`/`tty.setraw` dance: `^C` becomes a host interrupt, `^Z`
//! self-suspends the process via `SIGTSTP` and resumes the read afterwards.
//! Non-tty input (a pipe or redirected file) just reads the next byte.

use crossterm::terminal as ct;
use curvelang_core::error::HostError;
use curvelang_core::host::GetchResult;
use std::io::{IsTerminal, Read};

const CTRL_C: char = '\u{3}';
const CTRL_Z: char = '\u{1a}';

/// Restores cooked mode on every exit path, including a raised error.
struct RawGuard;

impl RawGuard {
    fn enter() -> Result<Self, HostError> {
        ct::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawGuard {
    fn drop(&mut self) {
        let _ = ct::disable_raw_mode();
    }
}

pub fn getch() -> Result<GetchResult, HostError> {
    if !std::io::stdin().is_terminal() {
        return read_one_byte();
    }
    read_raw()
}

fn read_one_byte() -> Result<GetchResult, HostError> {
    let mut buf = [0u8; 1];
    let n = std::io::stdin().read(&mut buf)?;
    if n == 0 {
        return Ok(GetchResult::Eof);
    }
    Ok(GetchResult::Char(buf[0] as char))
}

fn read_raw() -> Result<GetchResult, HostError> {
    let _guard = RawGuard::enter()?;
    let mut buf = [0u8; 1];
    let n = std::io::stdin().read(&mut buf)?;
    if n == 0 {
        return Ok(GetchResult::Eof);
    }
    let ch = buf[0] as char;
    if ch == CTRL_C {
        return Err(HostError::Interrupt);
    }
    if ch == CTRL_Z {
        suspend();
    }
    Ok(GetchResult::Char(ch))
}

#[cfg(unix)]
fn suspend() {
    unsafe {
        libc::kill(libc::getpid(), libc::SIGTSTP);
    }
}

#[cfg(not(unix))]
fn suspend() {}
