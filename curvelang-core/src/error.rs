//! The error taxonomy described in the specification's error-handling design:
//! program-level [`CodeException`]s are recoverable at a catch mark, while
//! [`HostError`]s surface straight out of `run()`.

use thiserror::Error;

/// Raised by the program under execution. Recoverable at a catch mark
/// (opcode `@`) unless the "all errors fatal" flag is set.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CodeException {
    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("zero division")]
    DivisionByZero,

    #[error("can't cast {value:?} to {target}")]
    BadCast { value: String, target: &'static str },

    #[error("index out of range")]
    IndexOutOfRange,

    #[error("a$$ertion failed")]
    Assertion,

    #[error("raised an &rror")]
    Raised,

    #[error("invalid regex {pattern:?}: {detail}")]
    BadRegex { pattern: String, detail: String },

    #[error("can only construct a range from a non-zero integer")]
    BadRange,

    #[error("don't know how to invert {0:?}")]
    Invert(String),
}

/// A host-level failure: I/O, encoding, or an interrupt outside the program.
/// Not catchable by the in-language catch mark.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported or invalid text encoding: {0}")]
    Encoding(String),

    #[error("interrupted")]
    Interrupt,
}
