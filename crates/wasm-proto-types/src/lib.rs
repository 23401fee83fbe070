//! Shared types for wasm-proto.
//!
//! This crate defines the value and type model, the operator families, the
//! AST node types, source spans and the located error type used by both the
//! validator and the evaluator.

mod error;
mod span;
mod ty;
mod value;
pub mod ast;
pub mod build;
pub mod ops;

pub use error::{Error, ErrorCategory, ErrorCode};
pub use span::Span;
pub use ty::{format_types, Alignment, Distance, MemOp, MemoryType, ValueType};
pub use value::Value;

/// Result type used throughout wasm-proto.
pub type Result<T> = std::result::Result<T, Error>;
