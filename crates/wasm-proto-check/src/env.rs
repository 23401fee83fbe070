//! Per-function check context.
//!
//! [`CheckContext`] tracks what is in scope while a function body is walked:
//! the local slot types, the function's return types, and a stack of
//! enclosing break targets with the result types each one delivers.

use wasm_proto_types::ast::{Func, LocalIndex};
use wasm_proto_types::ValueType;

use crate::ty::ResultType;

// ══════════════════════════════════════════════════════════════════════════════
// Label Kind
// ══════════════════════════════════════════════════════════════════════════════

/// Which construct introduced a break target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    Label,
    Loop,
}

/// A single break target.
#[derive(Debug)]
struct LabelScope {
    kind: LabelKind,
    types: ResultType,
}

// ══════════════════════════════════════════════════════════════════════════════
// CheckContext
// ══════════════════════════════════════════════════════════════════════════════

/// The lexical context of the expression being checked.
///
/// A fresh context is seeded at every function boundary, so `Break` can
/// never resolve past the function and `Return` always has a target.
#[derive(Debug)]
pub struct CheckContext {
    locals: Vec<ValueType>,
    return_types: ResultType,
    labels: Vec<LabelScope>,
}

impl CheckContext {
    /// Create the context for the body of `func`.
    pub fn for_func(func: &Func) -> Self {
        let mut locals = func.params.clone();
        locals.extend_from_slice(&func.locals);
        Self {
            locals,
            return_types: func.results.clone(),
            labels: Vec::new(),
        }
    }

    /// Push a break target delivering `types`.
    pub fn push_label(&mut self, kind: LabelKind, types: ResultType) {
        self.labels.push(LabelScope { kind, types });
    }

    /// Pop the innermost break target.
    pub fn pop_label(&mut self) {
        debug_assert!(!self.labels.is_empty(), "label stack underflow");
        self.labels.pop();
    }

    /// Resolve `Break(depth)`: the `depth`-th enclosing target, 0 = innermost.
    pub fn label(&self, depth: u32) -> Option<(LabelKind, &[ValueType])> {
        let index = self.labels.len().checked_sub(depth as usize + 1)?;
        let scope = &self.labels[index];
        Some((scope.kind, &scope.types))
    }

    /// Number of enclosing break targets.
    pub fn depth(&self) -> usize {
        self.labels.len()
    }

    pub fn local(&self, index: LocalIndex) -> Option<ValueType> {
        self.locals.get(index as usize).copied()
    }

    pub fn return_types(&self) -> &[ValueType] {
        &self.return_types
    }
}
