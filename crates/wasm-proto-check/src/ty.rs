//! Result types and function signatures as seen by the validator.
//!
//! Expressions are typed by an ordered list of [`ValueType`]s: empty for
//! statements, one entry for ordinary values, several for multi-value calls,
//! breaks and returns.

use std::fmt;

use wasm_proto_types::ast::Func;
use wasm_proto_types::{format_types, ValueType};

/// An expression's (or context's) ordered result types.
pub type ResultType = Vec<ValueType>;

/// The expected-type relation: an empty expectation accepts any result
/// (the value is dropped), otherwise the lists must match exactly.
pub fn checks(actual: &[ValueType], expected: &[ValueType]) -> bool {
    expected.is_empty() || actual == expected
}

/// A function signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncType {
    pub params: ResultType,
    pub results: ResultType,
}

impl FuncType {
    pub fn of(func: &Func) -> Self {
        Self {
            params: func.params.clone(),
            results: func.results.clone(),
        }
    }
}

impl fmt::Display for FuncType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {}",
            format_types(&self.params),
            format_types(&self.results)
        )
    }
}
