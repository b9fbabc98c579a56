//! The pure interpreter core: Hilbert index mapping, the dynamically typed
//! value model, the sparse stack family, the mutable character grid, the
//! execution state machine, and the opcode dispatch table. Every effectful
//! primitive (I/O, randomness, the clock, regex) is reached only through the
//! [`host::Host`] trait, so this crate never touches a terminal, the
//! filesystem, or a regex engine directly.

pub mod error;
pub mod exec;
pub mod grid;
pub mod hilbert;
pub mod host;
mod ops;
pub mod stacks;
pub mod value;

pub use error::{CodeException, HostError};
pub use exec::{Config, Interpreter, Mode, RunOutcome, StepError};
pub use grid::Grid;
pub use host::{GetchResult, Host};
pub use ops::{op_for_char, Op};
pub use stacks::StackFamily;
pub use value::Value;
