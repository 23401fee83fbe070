use crate::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error category, determined by error code range.
///
/// Validation errors are raised before any evaluation and reject the whole
/// module. Runtime errors abort the current `invoke`/`eval` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Validation,
    Runtime,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Runtime => write!(f, "runtime"),
        }
    }
}

/// Numeric error code (E200–E299 static, E700–E799 dynamic).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ErrorCode(pub u16);

impl ErrorCode {
    // ── Validation errors (E200–E299) ──
    pub const TYPE_MISMATCH: Self = Self(200);
    pub const UNKNOWN_INDEX: Self = Self(201);
    pub const ARITY_MISMATCH: Self = Self(202);
    pub const DUPLICATE_SWITCH_VALUE: Self = Self(203);
    pub const BREAK_DEPTH_OUT_OF_RANGE: Self = Self(204);

    // ── Runtime errors (E700–E799) ──
    pub const DIVISION_BY_ZERO: Self = Self(700);
    pub const INVALID_CONVERSION: Self = Self(701);
    pub const MEMORY_OUT_OF_BOUNDS: Self = Self(702);
    pub const UNDEFINED_EXPORT: Self = Self(703);
    pub const ARGUMENT_MISMATCH: Self = Self(704);
    pub const UNDEFINED_ELEMENT: Self = Self(705);
    pub const RESULT_ARITY: Self = Self(706);
    pub const CALL_STACK_EXHAUSTED: Self = Self(707);
    pub const GAS_EXHAUSTED: Self = Self(708);
    /// A tree that never passed validation reached the evaluator.
    pub const MALFORMED: Self = Self(709);

    /// Get the category for this error code.
    pub fn category(self) -> ErrorCategory {
        match self.0 {
            700..=799 => ErrorCategory::Runtime,
            _ => ErrorCategory::Validation,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{}", self.0)
    }
}

/// A located validation or runtime error.
///
/// This is the only structured error information exposed outward; drivers
/// render it with `Display` or serialize it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{file}:{span}: {code} [{category}] {message}")]
pub struct Error {
    /// Source file name.
    pub file: String,
    /// Error code (e.g., E200).
    pub code: ErrorCode,
    /// Error category (derived from code).
    pub category: ErrorCategory,
    /// Human-readable error message.
    pub message: String,
    /// Source location.
    #[serde(flatten)]
    pub span: Span,
}

impl Error {
    /// Create a new error.
    pub fn new(
        file: impl Into<String>,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            file: file.into(),
            code,
            category: code.category(),
            message: message.into(),
            span,
        }
    }
}
