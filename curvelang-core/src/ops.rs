//! The single-character opcode dispatch table.
//!
//! Every printable non-space character is either a recognized opcode or a
//! nop. [`Op`] names the operation; [`op_for_char`] is the static
//! character-to-operation mapping (several characters can share one `Op`,
//! e.g. `v`/`S` both mean "move down", `£`/`¥` both mean "implode stack").
//! [`dispatch`] looks up and runs the operation for a character.

use crate::error::CodeException;
use crate::exec::{Interpreter, Mode, Motion, StepError};
use crate::host::{GetchResult, Host};
use crate::value::Value;

/// An opcode, independent of which character(s) invoke it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Nop,
    Push(char),
    Left,
    Right,
    Down,
    Up,
    Plus,
    Minus,
    Times,
    Mod,
    Div,
    FDiv,
    Pow,
    Equals,
    Print,
    PrintQuick,
    Newline,
    StickyOn,
    StickyOff,
    ReadLine,
    Swap,
    CastInt,
    CastBool,
    CastStr,
    CastFloat,
    Chr,
    Ord,
    Increment,
    Decrement,
    Duplicate,
    Head,
    NextStack,
    PrevStack,
    MoveNextStack,
    MovePrevStack,
    MoveGoNextStack,
    MoveGoPrevStack,
    Negate,
    Die,
    MirrorH,
    MirrorV,
    MirrorBoth,
    ReverseDir,
    ReverseStack,
    StringLiteral,
    CharLiteral,
    Escape,
    CondEscape,
    RandomDirection,
    RandomFloat,
    Pi,
    Euler,
    Invert,
    BitwiseNot,
    Restart,
    Finalize,
    Getch,
    Repeat,
    ClearStack,
    Jump,
    Goto,
    Join,
    CatchMark,
    Raise,
    Assert,
    Stopwatch,
    SetStopwatch,
    DateTime,
    Drop,
    Contains,
    Length,
    Queue,
    Unqueue,
    MemorizeQuick,
    LoadQuick,
    More,
    LessOrEqual,
    BitAnd,
    BitOr,
    BitXor,
    RangeDown,
    RangeUp,
    OrderUp,
    OrderDown,
    Shuffle,
    Sign,
    ShiftLeft,
    ShiftRight,
    MultiplyStack,
    Abs,
    ExplodeString,
    ImplodeString,
}

/// Human-readable name for the opcode table the CLI prints with no files.
impl Op {
    pub fn name(self) -> &'static str {
        match self {
            Op::Nop => "nop",
            Op::Push(_) => "push digit literal",
            Op::Left => "move left",
            Op::Right => "move right",
            Op::Down => "move down",
            Op::Up => "move up",
            Op::Plus => "add",
            Op::Minus => "subtract / split on whitespace",
            Op::Times => "multiply",
            Op::Mod => "modulo / regex replace",
            Op::Div => "integer divide / regex find count",
            Op::FDiv => "float divide / split on substring",
            Op::Pow => "power / index string",
            Op::Equals => "equals",
            Op::Print => "print",
            Op::PrintQuick => "print quick register",
            Op::Newline => "print newline",
            Op::StickyOn => "sticky mode on",
            Op::StickyOff => "sticky mode off",
            Op::ReadLine => "read line",
            Op::Swap => "swap",
            Op::CastInt => "cast to int",
            Op::CastBool => "cast to bool",
            Op::CastStr => "cast to string",
            Op::CastFloat => "cast to float",
            Op::Chr => "cast int to char",
            Op::Ord => "cast char to int",
            Op::Increment => "increment",
            Op::Decrement => "decrement",
            Op::Duplicate => "duplicate",
            Op::Head => "keep only top",
            Op::NextStack => "next stack",
            Op::PrevStack => "previous stack",
            Op::MoveNextStack => "move value to next stack",
            Op::MovePrevStack => "move value to previous stack",
            Op::MoveGoNextStack => "move value to next stack and follow",
            Op::MoveGoPrevStack => "move value to previous stack and follow",
            Op::Negate => "logical negate",
            Op::Die => "terminate",
            Op::MirrorH => "mirror horizontally",
            Op::MirrorV => "mirror vertically",
            Op::MirrorBoth => "mirror both axes",
            Op::ReverseDir => "reverse direction",
            Op::ReverseStack => "reverse stack",
            Op::StringLiteral => "begin string literal",
            Op::CharLiteral => "begin char literal",
            Op::Escape => "escape next character",
            Op::CondEscape => "conditional escape",
            Op::RandomDirection => "random direction",
            Op::RandomFloat => "random float",
            Op::Pi => "push pi",
            Op::Euler => "push e",
            Op::Invert => "invert",
            Op::BitwiseNot => "bitwise not / regex find all",
            Op::Restart => "restart",
            Op::Finalize => "finalize",
            Op::Getch => "read character",
            Op::Repeat => "repeat previous command",
            Op::ClearStack => "clear stack",
            Op::Jump => "relative curve jump",
            Op::Goto => "absolute curve jump",
            Op::Join => "join strings",
            Op::CatchMark => "set catch mark",
            Op::Raise => "raise error",
            Op::Assert => "assert",
            Op::Stopwatch => "read stopwatch",
            Op::SetStopwatch => "reset stopwatch",
            Op::DateTime => "push local date/time",
            Op::Drop => "drop",
            Op::Contains => "stack contains",
            Op::Length => "stack length",
            Op::Queue => "rotate top to bottom",
            Op::Unqueue => "rotate bottom to top",
            Op::MemorizeQuick => "store quick register",
            Op::LoadQuick => "load quick register",
            Op::More => "greater than",
            Op::LessOrEqual => "less or equal",
            Op::BitAnd => "bitwise and",
            Op::BitOr => "bitwise or",
            Op::BitXor => "bitwise xor",
            Op::RangeDown => "descending range",
            Op::RangeUp => "ascending range",
            Op::OrderUp => "sort ascending pair",
            Op::OrderDown => "sort descending pair",
            Op::Shuffle => "shuffle stack",
            Op::Sign => "sign",
            Op::ShiftLeft => "bitwise shift left",
            Op::ShiftRight => "bitwise shift right",
            Op::MultiplyStack => "repeat stack",
            Op::Abs => "absolute value",
            Op::ExplodeString => "explode string onto stack",
            Op::ImplodeString => "implode stack into string",
        }
    }
}

/// The static character-to-operation mapping.
pub fn op_for_char(c: char) -> Op {
    match c {
        ' ' => Op::Nop,
        '0'..='9' => Op::Push(c),
        '<' | 'W' => Op::Left,
        '>' | 'E' => Op::Right,
        'v' | 'S' => Op::Down,
        '^' | 'N' => Op::Up,
        '+' => Op::Plus,
        '-' => Op::Minus,
        '*' => Op::Times,
        '%' => Op::Mod,
        '/' => Op::Div,
        ':' => Op::FDiv,
        'F' => Op::Pow,
        '=' => Op::Equals,
        'p' => Op::Print,
        'B' => Op::PrintQuick,
        'n' => Op::Newline,
        'k' => Op::StickyOn,
        'K' => Op::StickyOff,
        'r' => Op::ReadLine,
        's' => Op::Swap,
        'i' => Op::CastInt,
        'b' => Op::CastBool,
        '∑' => Op::CastStr,
        'f' => Op::CastFloat,
        'c' => Op::Chr,
        'o' => Op::Ord,
        'I' => Op::Increment,
        'D' => Op::Decrement,
        'd' => Op::Duplicate,
        'h' => Op::Head,
        ')' => Op::NextStack,
        '(' => Op::PrevStack,
        '}' => Op::MoveNextStack,
        '{' => Op::MovePrevStack,
        ']' => Op::MoveGoNextStack,
        '[' => Op::MoveGoPrevStack,
        '!' => Op::Negate,
        'X' => Op::Die,
        '|' => Op::MirrorH,
        '_' => Op::MirrorV,
        '#' => Op::MirrorBoth,
        'u' => Op::ReverseDir,
        'U' => Op::ReverseStack,
        '"' => Op::StringLiteral,
        '\'' => Op::CharLiteral,
        '\\' => Op::Escape,
        '`' => Op::CondEscape,
        '?' => Op::RandomDirection,
        'R' => Op::RandomFloat,
        'P' => Op::Pi,
        'e' => Op::Euler,
        '~' => Op::Invert,
        'a' => Op::BitwiseNot,
        'O' => Op::Restart,
        ';' => Op::Finalize,
        ',' => Op::Getch,
        '.' => Op::Repeat,
        'ø' => Op::ClearStack,
        'j' => Op::Jump,
        '§' => Op::Goto,
        'J' => Op::Join,
        '@' => Op::CatchMark,
        '&' => Op::Raise,
        '$' => Op::Assert,
        't' => Op::Stopwatch,
        'T' => Op::SetStopwatch,
        '™' | 'τ' => Op::DateTime,
        'x' => Op::Drop,
        'C' => Op::Contains,
        'l' => Op::Length,
        'q' => Op::Queue,
        'Q' => Op::Unqueue,
        'M' => Op::MemorizeQuick,
        'L' => Op::LoadQuick,
        'm' => Op::More,
        'w' => Op::LessOrEqual,
        'A' => Op::BitAnd,
        'V' => Op::BitOr,
        'H' => Op::BitXor,
        'z' => Op::RangeDown,
        'Z' => Op::RangeUp,
        'G' => Op::OrderUp,
        'g' => Op::OrderDown,
        'Y' => Op::Shuffle,
        'y' => Op::Sign,
        '«' => Op::ShiftLeft,
        '»' => Op::ShiftRight,
        '×' => Op::MultiplyStack,
        '±' => Op::Abs,
        '€' => Op::ExplodeString,
        '£' | '¥' => Op::ImplodeString,
        _ => Op::Nop,
    }
}

/// Looks up and runs the operation for `cmd`, returning how it affected the
/// program counter.
pub fn dispatch(
    vm: &mut Interpreter,
    host: &mut dyn Host,
    cmd: char,
) -> Result<Motion, StepError> {
    let op = op_for_char(cmd);
    apply(vm, host, op, cmd)
}

fn pop2(vm: &mut Interpreter) -> (Value, Value) {
    let x = vm.stacks.pop();
    let y = vm.stacks.pop();
    (x, y)
}

fn apply(
    vm: &mut Interpreter,
    host: &mut dyn Host,
    op: Op,
    cmd: char,
) -> Result<Motion, StepError> {
    match op {
        Op::Nop => Ok(Motion::Advance),

        Op::Push(c) => {
            vm.stacks.push(Value::Int(c.to_digit(10).unwrap() as i64));
            Ok(Motion::Advance)
        }

        Op::Left => Ok(direction(vm, cmd, 'W', 'N', 0, -1)),
        Op::Right => Ok(direction(vm, cmd, 'E', 'S', 0, 1)),
        Op::Down => Ok(direction(vm, cmd, 'S', 'W', -1, 0)),
        Op::Up => Ok(direction(vm, cmd, 'N', 'E', 1, 0)),

        Op::Plus => {
            let (x, y) = pop2(vm);
            vm.stacks.push(Value::add(y, x)?);
            Ok(Motion::Advance)
        }
        Op::Minus => {
            let x = vm.stacks.pop();
            if x.is_numeric() {
                let y = vm.stacks.pop();
                vm.stacks.push(Value::sub_numeric(y, x)?);
            } else {
                let s = x.as_str().unwrap();
                for part in s.split_whitespace().collect::<Vec<_>>().into_iter().rev() {
                    vm.stacks.push(Value::Str(part.to_string()));
                }
            }
            Ok(Motion::Advance)
        }
        Op::Times => {
            let (x, y) = pop2(vm);
            vm.stacks.push(Value::mul(y, x)?);
            Ok(Motion::Advance)
        }
        Op::Mod => {
            let x = vm.stacks.pop();
            if x.is_numeric() {
                let y = vm.stacks.pop();
                vm.stacks.push(Value::modulo(y, x)?);
            } else {
                let y = vm.stacks.pop();
                let z = vm.stacks.pop();
                let (pattern, text, replacement) = (
                    y.as_str()
                        .ok_or_else(|| CodeException::TypeMismatch("expected string pattern".into()))?
                        .to_string(),
                    x.as_str().unwrap().to_string(),
                    z.as_str()
                        .ok_or_else(|| CodeException::TypeMismatch("expected string replacement".into()))?
                        .to_string(),
                );
                let result = host.regex_sub(&pattern, &replacement, &text)?;
                vm.stacks.push(Value::Str(result));
            }
            Ok(Motion::Advance)
        }
        Op::Div => {
            let x = vm.stacks.pop();
            if x.is_numeric() {
                let y = vm.stacks.pop();
                vm.stacks.push(Value::idiv(y, x)?);
            } else {
                let y = vm.stacks.pop();
                let pattern = y
                    .as_str()
                    .ok_or_else(|| CodeException::TypeMismatch("expected string pattern".into()))?;
                let text = x.as_str().unwrap();
                let matches = host.regex_findall(pattern, text)?;
                vm.stacks.push(Value::Int(matches.len() as i64));
            }
            Ok(Motion::Advance)
        }
        Op::FDiv => {
            let x = vm.stacks.pop();
            if x.is_numeric() {
                let y = vm.stacks.pop();
                vm.stacks.push(Value::fdiv(y, x)?);
            } else {
                let y = vm.stacks.pop();
                let sep = x.as_str().unwrap();
                let text = y
                    .as_str()
                    .ok_or_else(|| CodeException::TypeMismatch("expected string to split".into()))?;
                for part in text.split(sep).collect::<Vec<_>>().into_iter().rev() {
                    vm.stacks.push(Value::Str(part.to_string()));
                }
            }
            Ok(Motion::Advance)
        }
        Op::Pow => {
            let (x, y) = pop2(vm);
            if y.is_numeric() {
                vm.stacks.push(Value::pow(y, x)?);
            } else {
                let s = y.as_str().unwrap();
                let idx = x
                    .as_i64()
                    .ok_or_else(|| CodeException::TypeMismatch("expected integer index".into()))?;
                let chars: Vec<char> = s.chars().collect();
                let idx = normalize_index(idx, chars.len())?;
                vm.stacks.push(Value::Str(chars[idx].to_string()));
            }
            Ok(Motion::Advance)
        }

        Op::Equals => {
            let (x, y) = pop2(vm);
            vm.stacks.push(Value::Bool(Value::values_equal(&y, &x)));
            Ok(Motion::Advance)
        }

        Op::Print => {
            let v = vm.stacks.pop();
            host.print(&v.display_string());
            if vm.config.flush {
                host.flush();
            }
            Ok(Motion::Advance)
        }
        Op::PrintQuick => {
            host.print(&vm.quick.display_string());
            if vm.config.flush {
                host.flush();
            }
            Ok(Motion::Advance)
        }
        Op::Newline => {
            host.newline();
            if vm.config.flush {
                host.flush();
            }
            Ok(Motion::Advance)
        }

        Op::StickyOn => {
            vm.stacks.set_sticky(true);
            Ok(Motion::Advance)
        }
        Op::StickyOff => {
            vm.stacks.set_sticky(false);
            Ok(Motion::Advance)
        }

        Op::ReadLine => {
            let line = host.read_line()?.unwrap_or_default();
            vm.stacks.push(Value::Str(line));
            Ok(Motion::Advance)
        }

        Op::Swap => {
            let (x, y) = pop2(vm);
            vm.stacks.push(x);
            vm.stacks.push(y);
            Ok(Motion::Advance)
        }

        Op::CastInt => {
            let v = vm.stacks.pop();
            vm.stacks.push(cast_int(v)?);
            Ok(Motion::Advance)
        }
        Op::CastBool => {
            let v = vm.stacks.pop();
            vm.stacks.push(Value::Bool(v.is_truthy()));
            Ok(Motion::Advance)
        }
        Op::CastStr => {
            let v = vm.stacks.pop();
            vm.stacks.push(Value::Str(v.display_string()));
            Ok(Motion::Advance)
        }
        Op::CastFloat => {
            let v = vm.stacks.pop();
            vm.stacks.push(cast_float(v));
            Ok(Motion::Advance)
        }
        Op::Chr => {
            let v = vm.stacks.pop();
            let c = v
                .as_i64()
                .and_then(|n| u32::try_from(n).ok())
                .and_then(char::from_u32)
                .unwrap_or('\u{fffd}');
            vm.stacks.push(Value::Str(c.to_string()));
            Ok(Motion::Advance)
        }
        Op::Ord => {
            let v = vm.stacks.pop();
            let n = match &v {
                Value::Str(s) if s.chars().count() == 1 => s.chars().next().unwrap() as i64,
                _ => 0,
            };
            vm.stacks.push(Value::Int(n));
            Ok(Motion::Advance)
        }

        Op::Increment => {
            let v = vm.stacks.pop();
            vm.stacks.push(step_by_one(v, 1));
            Ok(Motion::Advance)
        }
        Op::Decrement => {
            let v = vm.stacks.pop();
            vm.stacks.push(step_by_one(v, -1));
            Ok(Motion::Advance)
        }

        Op::Duplicate => {
            let v = vm.stacks.pop();
            vm.stacks.push(v.clone());
            vm.stacks.push(v);
            Ok(Motion::Advance)
        }
        Op::Head => {
            vm.stacks.head();
            Ok(Motion::Advance)
        }

        Op::NextStack => {
            vm.stacks.next_stack();
            Ok(Motion::Advance)
        }
        Op::PrevStack => {
            vm.stacks.prev_stack();
            Ok(Motion::Advance)
        }
        Op::MoveNextStack => {
            let v = vm.stacks.pop();
            vm.stacks.next_stack();
            vm.stacks.push(v);
            vm.stacks.prev_stack();
            Ok(Motion::Advance)
        }
        Op::MovePrevStack => {
            let v = vm.stacks.pop();
            vm.stacks.prev_stack();
            vm.stacks.push(v);
            vm.stacks.next_stack();
            Ok(Motion::Advance)
        }
        Op::MoveGoNextStack => {
            let v = vm.stacks.pop();
            vm.stacks.next_stack();
            vm.stacks.push(v);
            Ok(Motion::Advance)
        }
        Op::MoveGoPrevStack => {
            let v = vm.stacks.pop();
            vm.stacks.prev_stack();
            vm.stacks.push(v);
            Ok(Motion::Advance)
        }

        Op::Negate => {
            let v = vm.stacks.pop();
            vm.stacks.push(Value::Bool(!v.is_truthy()));
            Ok(Motion::Advance)
        }

        Op::Die => Ok(Motion::Halt),

        Op::MirrorH => Ok(mirror(vm, Interpreter::mirror_h_target)),
        Op::MirrorV => Ok(mirror(vm, Interpreter::mirror_v_target)),
        Op::MirrorBoth => Ok(mirror(vm, Interpreter::mirror_both_target)),

        Op::ReverseDir => {
            vm.dir = -vm.dir;
            Ok(Motion::Advance)
        }
        Op::ReverseStack => {
            vm.stacks.reverse_current();
            Ok(Motion::Advance)
        }

        Op::StringLiteral => {
            vm.mode = Mode::String;
            Ok(Motion::Advance)
        }
        Op::CharLiteral => {
            vm.mode = Mode::Char;
            Ok(Motion::Advance)
        }
        Op::Escape => {
            vm.mode = Mode::Escape;
            Ok(Motion::Advance)
        }
        Op::CondEscape => {
            let v = vm.stacks.pop();
            if !v.is_truthy() {
                vm.mode = Mode::Escape;
            }
            Ok(Motion::Advance)
        }

        Op::RandomDirection => {
            let c = host.random_direction();
            apply(vm, host, op_for_char(c), c)
        }
        Op::RandomFloat => {
            let f = host.random_float();
            vm.stacks.push(Value::Float(f));
            Ok(Motion::Advance)
        }
        Op::Pi => {
            vm.stacks.push(Value::Float(std::f64::consts::PI));
            Ok(Motion::Advance)
        }
        Op::Euler => {
            vm.stacks.push(Value::Float(std::f64::consts::E));
            Ok(Motion::Advance)
        }

        Op::Invert => {
            let v = vm.stacks.pop();
            let inverted = match v {
                Value::Bool(b) => Value::Bool(!b),
                Value::Int(n) => Value::Int(-n),
                Value::Float(f) => Value::Float(-f),
                Value::Str(s) => Value::Str(s.chars().rev().collect()),
            };
            vm.stacks.push(inverted);
            Ok(Motion::Advance)
        }
        Op::BitwiseNot => {
            let v = vm.stacks.pop();
            if v.is_numeric() {
                let n = v
                    .as_bitwise_int()
                    .map_err(|_| CodeException::Invert(format!("{v:?}")))?;
                vm.stacks.push(Value::Int(!n));
            } else {
                let pattern = vm.stacks.pop();
                let text = v.as_str().unwrap();
                let pattern = pattern
                    .as_str()
                    .ok_or_else(|| CodeException::TypeMismatch("expected string pattern".into()))?;
                let matches = host.regex_findall(pattern, text)?;
                for m in matches.into_iter().rev() {
                    vm.stacks.push(Value::Str(m));
                }
            }
            Ok(Motion::Advance)
        }

        Op::Restart => {
            let side = vm.grid.side();
            vm.set_position(if vm.dir == 1 { (0, 0) } else { (0, side - 1) });
            Ok(Motion::Stay)
        }
        Op::Finalize => {
            let side = vm.grid.side();
            vm.set_position(if vm.dir == -1 { (0, 0) } else { (0, side - 1) });
            Ok(Motion::Stay)
        }

        Op::Getch => {
            match host.getch()? {
                GetchResult::Char('\r') => vm.stacks.push(Value::Str(String::new())),
                GetchResult::Char(c) => vm.stacks.push(Value::Str(c.to_string())),
                GetchResult::Eof => vm.stacks.push(Value::Str(String::new())),
            }
            Ok(Motion::Advance)
        }

        Op::Repeat => unreachable!("`.` is resolved before dispatch reaches Op::Repeat"),

        Op::ClearStack => {
            vm.stacks.clear_current();
            Ok(Motion::Advance)
        }

        Op::Jump => {
            let steps = vm.stacks.pop();
            let n = steps
                .as_i64()
                .ok_or_else(|| CodeException::TypeMismatch("expected integer step count".into()))?;
            let d = vm.current_distance() as i64 + vm.dir * n;
            vm.goto_distance(d);
            Ok(Motion::Stay)
        }
        Op::Goto => {
            let d = vm.stacks.pop();
            let d = d
                .as_i64()
                .ok_or_else(|| CodeException::TypeMismatch("expected integer curve index".into()))?;
            vm.goto_distance(d);
            Ok(Motion::Stay)
        }

        Op::Join => {
            let (x, y) = pop2(vm);
            vm.stacks
                .push(Value::Str(format!("{}{}", y.display_string(), x.display_string())));
            Ok(Motion::Advance)
        }

        Op::CatchMark => {
            vm.mark = Some((vm.x, vm.y));
            Ok(Motion::Advance)
        }
        Op::Raise => Err(CodeException::Raised.into()),
        Op::Assert => {
            let v = vm.stacks.pop();
            if v.is_truthy() {
                Err(CodeException::Assertion.into())
            } else {
                Ok(Motion::Advance)
            }
        }

        Op::Stopwatch => {
            let now = host.now_seconds();
            vm.stacks.push(Value::Float(now - vm.t0));
            Ok(Motion::Advance)
        }
        Op::SetStopwatch => {
            vm.t0 = host.now_seconds();
            Ok(Motion::Advance)
        }
        Op::DateTime => {
            // Pushed in reverse ([second, minute, ..., year]) so that after
            // all six pushes the top of the stack is the year.
            for v in host.local_datetime().iter().rev() {
                vm.stacks.push(Value::Int(*v));
            }
            Ok(Motion::Advance)
        }

        Op::Drop => {
            vm.stacks.pop();
            Ok(Motion::Advance)
        }
        Op::Contains => {
            let v = vm.stacks.pop();
            let found = vm
                .stacks
                .current()
                .iter()
                .any(|item| Value::values_equal(item, &v));
            vm.stacks.push(Value::Bool(found));
            Ok(Motion::Advance)
        }
        Op::Length => {
            let len = vm.stacks.len_current();
            vm.stacks.push(Value::Int(len));
            Ok(Motion::Advance)
        }
        Op::Queue => {
            vm.stacks.rotate_to_bottom();
            Ok(Motion::Advance)
        }
        Op::Unqueue => {
            vm.stacks.rotate_to_top();
            Ok(Motion::Advance)
        }

        Op::MemorizeQuick => {
            vm.quick = vm.stacks.pop();
            Ok(Motion::Advance)
        }
        Op::LoadQuick => {
            vm.stacks.push(vm.quick.clone());
            Ok(Motion::Advance)
        }

        Op::More => {
            let (x, y) = pop2(vm);
            vm.stacks
                .push(Value::Bool(Value::compare(&y, &x)? == std::cmp::Ordering::Greater));
            Ok(Motion::Advance)
        }
        Op::LessOrEqual => {
            let (x, y) = pop2(vm);
            vm.stacks
                .push(Value::Bool(Value::compare(&y, &x)? != std::cmp::Ordering::Greater));
            Ok(Motion::Advance)
        }

        Op::BitAnd => bitwise(vm, |a, b| a & b),
        Op::BitOr => bitwise(vm, |a, b| a | b),
        Op::BitXor => bitwise(vm, |a, b| a ^ b),
        Op::ShiftLeft => {
            let (x, y) = pop2(vm);
            let a = y.as_bitwise_int()?;
            let b = x.as_bitwise_int()?;
            let shifted = u32::try_from(b).ok().and_then(|b| a.checked_shl(b)).unwrap_or(0);
            vm.stacks.push(Value::Int(shifted));
            Ok(Motion::Advance)
        }
        Op::ShiftRight => {
            let (x, y) = pop2(vm);
            let a = y.as_bitwise_int()?;
            let b = x.as_bitwise_int()?;
            let shifted = u32::try_from(b).ok().and_then(|b| a.checked_shr(b)).unwrap_or(0);
            vm.stacks.push(Value::Int(shifted));
            Ok(Motion::Advance)
        }

        Op::RangeDown => {
            let val = vm.stacks.pop();
            let n = val
                .as_i64()
                .filter(|n| *n != 0)
                .ok_or(CodeException::BadRange)?;
            // Sequence is `val, val - sign, ..., +-1` (first element = val);
            // pushed in reverse so the top of the stack is `val`.
            let seq = range_toward_zero(n);
            for v in seq.into_iter().rev() {
                vm.stacks.push(Value::Int(v));
            }
            Ok(Motion::Advance)
        }
        Op::RangeUp => {
            let val = vm.stacks.pop();
            let n = val
                .as_i64()
                .filter(|n| *n != 0)
                .ok_or(CodeException::BadRange)?;
            // Sequence is `+-1, ..., val` (first element = sign); pushed in
            // reverse so the top of the stack is `+-1`.
            let seq = range_away_from_zero(n);
            for v in seq.into_iter().rev() {
                vm.stacks.push(Value::Int(v));
            }
            Ok(Motion::Advance)
        }

        Op::OrderUp => {
            let (a, b) = pop2(vm);
            let (lo, hi) = order_pair(a, b)?;
            // top ends up the smaller value
            vm.stacks.push(hi);
            vm.stacks.push(lo);
            Ok(Motion::Advance)
        }
        Op::OrderDown => {
            let (a, b) = pop2(vm);
            let (lo, hi) = order_pair(a, b)?;
            // top ends up the larger value
            vm.stacks.push(lo);
            vm.stacks.push(hi);
            Ok(Motion::Advance)
        }

        Op::Shuffle => {
            vm.stacks.shuffle(|bound| host.random_index(bound));
            Ok(Motion::Advance)
        }
        Op::Sign => {
            let v = vm.stacks.pop();
            let f = v
                .as_f64()
                .ok_or_else(|| CodeException::TypeMismatch(format!("can't take sign of {v:?}")))?;
            let s = if f > 0.0 {
                1
            } else if f < 0.0 {
                -1
            } else {
                0
            };
            vm.stacks.push(Value::Int(s));
            Ok(Motion::Advance)
        }

        Op::MultiplyStack => {
            let n = vm.stacks.pop();
            let n = n.as_i64().unwrap_or(0).max(0) as usize;
            let stack = vm.stacks.current();
            let original = stack.clone();
            stack.clear();
            for _ in 0..n {
                stack.extend(original.iter().cloned());
            }
            Ok(Motion::Advance)
        }
        Op::Abs => {
            let v = vm.stacks.pop();
            let abs = match v {
                Value::Int(n) => match n.checked_abs() {
                    Some(a) => Value::Int(a),
                    None => Value::Float((n as f64).abs()),
                },
                Value::Float(f) => Value::Float(f.abs()),
                Value::Bool(b) => Value::Int(if b { 1 } else { 0 }),
                Value::Str(s) => return Err(CodeException::TypeMismatch(format!("can't take abs of {s:?}")).into()),
            };
            vm.stacks.push(abs);
            Ok(Motion::Advance)
        }
        Op::ExplodeString => {
            let v = vm.stacks.pop();
            let s = v
                .as_str()
                .ok_or_else(|| CodeException::TypeMismatch("expected string".into()))?;
            for c in s.chars().rev() {
                vm.stacks.push(Value::Str(c.to_string()));
            }
            Ok(Motion::Advance)
        }
        Op::ImplodeString => {
            let stack = vm.stacks.current();
            let joined: String = stack.iter().rev().map(Value::display_string).collect();
            stack.clear();
            stack.push(Value::Str(joined));
            Ok(Motion::Advance)
        }
    }
}

/// Shared body for the four direction opcodes: wraps to the orthogonal
/// neighbor and, for the uppercase form, rewrites the cell left behind to
/// the next letter in the `W -> N -> E -> S -> W` rotation.
fn direction(vm: &mut Interpreter, cmd: char, upper: char, next: char, dx: i64, dy: i64) -> Motion {
    if cmd == upper {
        vm.grid.set(vm.x, vm.y, next);
    }
    let (x, y) = vm.position();
    vm.goto_wrapped(x as i64 + dx, y as i64 + dy);
    Motion::Stay
}

fn mirror(vm: &mut Interpreter, target: fn(&Interpreter) -> (u64, u64)) -> Motion {
    let cond = vm.stacks.pop();
    if cond.is_truthy() {
        let dest = target(vm);
        vm.set_position(dest);
        Motion::Stay
    } else {
        Motion::Advance
    }
}

fn bitwise(vm: &mut Interpreter, f: impl FnOnce(i64, i64) -> i64) -> Result<Motion, StepError> {
    let (x, y) = pop2(vm);
    let a = y.as_bitwise_int()?;
    let b = x.as_bitwise_int()?;
    vm.stacks.push(Value::Int(f(a, b)));
    Ok(Motion::Advance)
}

fn cast_int(v: Value) -> Result<Value, CodeException> {
    match v {
        Value::Int(_) => Ok(v),
        Value::Bool(b) => Ok(Value::Int(if b { 1 } else { 0 })),
        Value::Float(f) => Ok(Value::Int(f as i64)),
        Value::Str(ref s) => s
            .trim()
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|_| CodeException::BadCast {
                value: s.clone(),
                target: "int",
            }),
    }
}

fn cast_float(v: Value) -> Value {
    match v {
        Value::Float(_) => v,
        Value::Int(n) => Value::Float(n as f64),
        Value::Bool(b) => Value::Float(if b { 1.0 } else { 0.0 }),
        Value::Str(ref s) => s.trim().parse::<f64>().map(Value::Float).unwrap_or(Value::Float(0.0)),
    }
}

/// `I`/`D`: increment/decrement the top by one; on a type failure, push
/// `Int(1)` (matching the specification's documented fallback). An `Int` at
/// the edge of `i64`'s range widens to `Float` instead of wrapping/panicking.
fn step_by_one(v: Value, delta: i64) -> Value {
    match v {
        Value::Int(n) => match n.checked_add(delta) {
            Some(r) => Value::Int(r),
            None => Value::Float(n as f64 + delta as f64),
        },
        Value::Float(f) => Value::Float(f + delta as f64),
        Value::Bool(b) => Value::Int(if b { 1 } else { 0 } + delta),
        Value::Str(_) => Value::Int(1),
    }
}

/// Orders two popped values, returning `(smaller, larger)`.
fn order_pair(a: Value, b: Value) -> Result<(Value, Value), CodeException> {
    if Value::compare(&a, &b)? == std::cmp::Ordering::Greater {
        Ok((b, a))
    } else {
        Ok((a, b))
    }
}

fn normalize_index(idx: i64, len: usize) -> Result<usize, CodeException> {
    let len = len as i64;
    let real = if idx < 0 { idx + len } else { idx };
    if real < 0 || real >= len {
        Err(CodeException::IndexOutOfRange)
    } else {
        Ok(real as usize)
    }
}

/// The `z` sequence: starts at `val` and walks toward (excluding) zero.
fn range_toward_zero(val: i64) -> Vec<i64> {
    let step = if val > 0 { -1 } else { 1 };
    let mut out = Vec::new();
    let mut v = val;
    while v != 0 {
        out.push(v);
        v += step;
    }
    out
}

/// The `Z` sequence: starts one away from zero and walks to `val`.
fn range_away_from_zero(val: i64) -> Vec<i64> {
    let step = if val > 0 { 1 } else { -1 };
    let mut out = Vec::new();
    let mut v = step;
    loop {
        out.push(v);
        if v == val {
            break;
        }
        v += step;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_toward_zero_positive() {
        assert_eq!(range_toward_zero(3), vec![3, 2, 1]);
    }

    #[test]
    fn range_toward_zero_negative() {
        assert_eq!(range_toward_zero(-3), vec![-3, -2, -1]);
    }

    #[test]
    fn range_away_from_zero_positive() {
        assert_eq!(range_away_from_zero(3), vec![1, 2, 3]);
    }

    #[test]
    fn range_away_from_zero_negative() {
        assert_eq!(range_away_from_zero(-3), vec![-1, -2, -3]);
    }

    #[test]
    fn increment_at_max_widens_to_float_instead_of_panicking() {
        let r = step_by_one(Value::Int(i64::MAX), 1);
        assert_eq!(r, Value::Float(i64::MAX as f64 + 1.0));
    }

    #[test]
    fn decrement_at_min_widens_to_float_instead_of_panicking() {
        let r = step_by_one(Value::Int(i64::MIN), -1);
        assert_eq!(r, Value::Float(i64::MIN as f64 - 1.0));
    }
}
