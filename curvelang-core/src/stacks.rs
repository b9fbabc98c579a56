//! The stack family: a sparse mapping from signed stack-id to a value
//! sequence, a sticky set, and a current-stack cursor.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::value::Value;

/// A family of named value stacks with sticky-peek behavior.
#[derive(Debug, Default)]
pub struct StackFamily {
    stacks: FxHashMap<i64, Vec<Value>>,
    sticky: FxHashSet<i64>,
    cur: i64,
}

impl StackFamily {
    pub fn new() -> Self {
        Self {
            stacks: FxHashMap::default(),
            sticky: FxHashSet::default(),
            cur: 0,
        }
    }

    pub fn current_id(&self) -> i64 {
        self.cur
    }

    pub fn next_stack(&mut self) {
        self.cur += 1;
    }

    pub fn prev_stack(&mut self) {
        self.cur -= 1;
    }

    fn get_mut(&mut self, sid: i64) -> &mut Vec<Value> {
        self.stacks.entry(sid).or_default()
    }

    pub fn current(&mut self) -> &mut Vec<Value> {
        self.get_mut(self.cur)
    }

    pub fn push(&mut self, v: Value) {
        self.push_to(self.cur, v);
    }

    pub fn push_to(&mut self, sid: i64, v: Value) {
        self.get_mut(sid).push(v);
    }

    /// Returns the top of the current stack; if the current stack is
    /// sticky, the value is peeked rather than removed. An empty stack
    /// yields `Value::Int(0)` rather than an error.
    pub fn pop(&mut self) -> Value {
        self.pop_from(self.cur)
    }

    pub fn pop_from(&mut self, sid: i64) -> Value {
        let sticky = self.sticky.contains(&sid);
        let stack = self.get_mut(sid);
        if sticky {
            stack.last().cloned().unwrap_or_default()
        } else {
            stack.pop().unwrap_or_default()
        }
    }

    pub fn set_sticky(&mut self, on: bool) {
        if on {
            self.sticky.insert(self.cur);
        } else {
            self.sticky.remove(&self.cur);
        }
    }

    pub fn is_sticky(&self, sid: i64) -> bool {
        self.sticky.contains(&sid)
    }

    /// Keeps only the top of the current stack.
    pub fn head(&mut self) {
        let top = self.pop();
        let stack = self.current();
        stack.clear();
        stack.push(top);
    }

    pub fn clear_current(&mut self) {
        self.current().clear();
    }

    pub fn reverse_current(&mut self) {
        self.current().reverse();
    }

    pub fn len_current(&mut self) -> i64 {
        self.current().len() as i64
    }

    /// Rotates the top of the current stack to the bottom.
    pub fn rotate_to_bottom(&mut self) {
        let v = self.pop();
        self.current().insert(0, v);
    }

    /// Rotates the bottom of the current stack to the top; an empty stack
    /// yields `Value::Int(0)`.
    pub fn rotate_to_top(&mut self) {
        let stack = self.current();
        let v = if stack.is_empty() {
            Value::default()
        } else {
            stack.remove(0)
        };
        self.current().push(v);
    }

    pub fn shuffle(&mut self, mut rand_index: impl FnMut(usize) -> usize) {
        let stack = self.current();
        let len = stack.len();
        for i in (1..len).rev() {
            let j = rand_index(i + 1);
            stack.swap(i, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pop_yields_zero_and_leaves_mapping_untouched() {
        let mut s = StackFamily::new();
        assert_eq!(s.pop(), Value::Int(0));
        assert!(!s.is_sticky(0));
    }

    #[test]
    fn sticky_pop_peeks() {
        let mut s = StackFamily::new();
        s.push(Value::Int(5));
        s.set_sticky(true);
        assert_eq!(s.pop(), Value::Int(5));
        assert_eq!(s.pop(), Value::Int(5));
        assert_eq!(s.len_current(), 1);
    }

    #[test]
    fn double_swap_is_identity() {
        let mut s = StackFamily::new();
        s.push(Value::Int(1));
        s.push(Value::Int(2));
        // d s s : duplicate top, then swap twice
        let top = s.pop();
        s.push(top.clone());
        s.push(top);
        for _ in 0..2 {
            let a = s.pop();
            let b = s.pop();
            s.push(a);
            s.push(b);
        }
        assert_eq!(s.current().clone(), vec![Value::Int(1), Value::Int(2), Value::Int(2)]);
    }

    #[test]
    fn rotate_to_top_on_empty_yields_zero() {
        let mut s = StackFamily::new();
        s.rotate_to_top();
        assert_eq!(s.pop(), Value::Int(0));
    }
}
