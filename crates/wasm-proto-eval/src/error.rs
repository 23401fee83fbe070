//! Runtime error types for the evaluator.

use thiserror::Error;
use wasm_proto_types::{ErrorCode, MemoryType, Value};

/// Runtime trap raised by a primitive, before a location is attached.
///
/// The evaluator turns every trap into a located
/// [`wasm_proto_types::Error`] at the node that raised it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Trap {
    /// Integer `div`/`rem` with a zero divisor.
    #[error("integer divide by zero")]
    DivisionByZero,

    /// Float-to-integer truncation of NaN or an out-of-range value.
    #[error("invalid conversion of {0} to integer")]
    InvalidConversion(Value),

    /// Access outside the linear memory (or no memory at all).
    #[error("out of bounds {mem_type} access at address {addr} (memory is {len} bytes)")]
    MemoryOutOfBounds {
        addr: u32,
        mem_type: MemoryType,
        len: usize,
    },

    /// `invoke` of an export index that does not exist.
    #[error("undefined export {0}")]
    UndefinedExport(usize),

    /// `invoke` arguments disagree with the function's parameters.
    #[error("argument mismatch: {0}")]
    ArgumentMismatch(String),

    /// `Dispatch` index outside its table.
    #[error("undefined element {index} in table {table}")]
    UndefinedElement { table: u32, index: u32 },

    /// `eval` of an expression that does not produce exactly one value.
    #[error("expression produced {0} values, expected 1")]
    ResultArity(usize),

    #[error("call stack exhausted (limit {0})")]
    CallStackExhausted(u32),

    /// Expressions nested deeper than the evaluator allows.
    #[error("expression nesting exhausted (limit {0})")]
    NestingExhausted(u32),

    #[error("gas exhausted (limit {0})")]
    GasExhausted(u64),

    /// The tree never passed validation.
    #[error("malformed program: {0}")]
    Malformed(String),
}

impl Trap {
    /// The outward error code of this trap.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::DivisionByZero => ErrorCode::DIVISION_BY_ZERO,
            Self::InvalidConversion(_) => ErrorCode::INVALID_CONVERSION,
            Self::MemoryOutOfBounds { .. } => ErrorCode::MEMORY_OUT_OF_BOUNDS,
            Self::UndefinedExport(_) => ErrorCode::UNDEFINED_EXPORT,
            Self::ArgumentMismatch(_) => ErrorCode::ARGUMENT_MISMATCH,
            Self::UndefinedElement { .. } => ErrorCode::UNDEFINED_ELEMENT,
            Self::ResultArity(_) => ErrorCode::RESULT_ARITY,
            Self::CallStackExhausted(_) | Self::NestingExhausted(_) => {
                ErrorCode::CALL_STACK_EXHAUSTED
            }
            Self::GasExhausted(_) => ErrorCode::GAS_EXHAUSTED,
            Self::Malformed(_) => ErrorCode::MALFORMED,
        }
    }
}

/// Result alias for primitive operations.
pub type TrapResult<T> = Result<T, Trap>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trap_messages() {
        assert_eq!(Trap::DivisionByZero.to_string(), "integer divide by zero");
        assert_eq!(
            Trap::InvalidConversion(Value::Float64(f64::INFINITY)).to_string(),
            "invalid conversion of inf : f64 to integer"
        );
        assert_eq!(
            Trap::MemoryOutOfBounds {
                addr: 9,
                mem_type: MemoryType::Int16U,
                len: 16
            }
            .to_string(),
            "out of bounds u16 access at address 9 (memory is 16 bytes)"
        );
    }

    #[test]
    fn trap_codes_are_runtime() {
        for trap in [
            Trap::DivisionByZero,
            Trap::UndefinedExport(1),
            Trap::GasExhausted(10),
            Trap::Malformed("x".into()),
        ] {
            assert_eq!(
                trap.code().category(),
                wasm_proto_types::ErrorCategory::Runtime
            );
        }
    }
}
