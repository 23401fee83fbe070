//! Activation frames.

use wasm_proto_types::ast::{Func, LocalIndex};
use wasm_proto_types::Value;

/// The state of one function activation (or of a top-level `eval`).
///
/// `labels` counts the `Label`/`Loop` constructs currently entered inside
/// this activation; a `Return` unwinds exactly that many.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    locals: Vec<Value>,
    labels: u32,
    in_func: bool,
}

impl Frame {
    /// The frame for a call: arguments followed by zeroed declared locals.
    pub fn for_call(func: &Func, args: Vec<Value>) -> Self {
        let mut locals = args;
        locals.extend(func.locals.iter().map(|&ty| Value::default_of(ty)));
        Self {
            locals,
            labels: 0,
            in_func: true,
        }
    }

    /// The empty frame used to evaluate a free-standing expression.
    pub fn top_level() -> Self {
        Self::default()
    }

    pub fn local(&self, index: LocalIndex) -> Option<Value> {
        self.locals.get(index as usize).copied()
    }

    /// Overwrite a local slot. Returns `false` if the slot does not exist.
    pub fn set_local(&mut self, index: LocalIndex, value: Value) -> bool {
        match self.locals.get_mut(index as usize) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn enter_label(&mut self) {
        self.labels += 1;
    }

    pub fn leave_label(&mut self) {
        self.labels = self.labels.saturating_sub(1);
    }

    /// Number of labels currently entered.
    pub fn labels(&self) -> u32 {
        self.labels
    }

    /// Whether this frame belongs to a function (so `Return` is meaningful).
    pub fn in_func(&self) -> bool {
        self.in_func
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_proto_types::build::{func_with_locals, nop};
    use wasm_proto_types::ValueType;

    #[test]
    fn call_frame_zeroes_declared_locals() {
        let f = func_with_locals(
            vec![ValueType::Int32],
            vec![],
            vec![ValueType::Float64, ValueType::Int64],
            nop(),
        );
        let frame = Frame::for_call(&f, vec![Value::Int32(7)]);
        assert_eq!(frame.local(0), Some(Value::Int32(7)));
        assert_eq!(frame.local(1), Some(Value::Float64(0.0)));
        assert_eq!(frame.local(2), Some(Value::Int64(0)));
        assert_eq!(frame.local(3), None);
        assert!(frame.in_func());
    }

    #[test]
    fn set_local_rejects_missing_slot() {
        let mut frame = Frame::top_level();
        assert!(!frame.set_local(0, Value::Int32(1)));
        assert!(!frame.in_func());
    }

    #[test]
    fn label_nesting_is_counted() {
        let mut frame = Frame::top_level();
        frame.enter_label();
        frame.enter_label();
        assert_eq!(frame.labels(), 2);
        frame.leave_label();
        assert_eq!(frame.labels(), 1);
    }
}
