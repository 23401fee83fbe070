//! Runtime values.

use crate::ValueType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A runtime value: one of the four scalar types with its concrete bits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Value {
    #[serde(rename = "i32")]
    Int32(i32),
    #[serde(rename = "i64")]
    Int64(i64),
    #[serde(rename = "f32")]
    Float32(f32),
    #[serde(rename = "f64")]
    Float64(f64),
}

impl Value {
    /// The type of this value, read off its tag.
    pub fn ty(&self) -> ValueType {
        match self {
            Self::Int32(_) => ValueType::Int32,
            Self::Int64(_) => ValueType::Int64,
            Self::Float32(_) => ValueType::Float32,
            Self::Float64(_) => ValueType::Float64,
        }
    }

    /// The zero value of a type, used for globals and declared locals.
    pub fn default_of(ty: ValueType) -> Self {
        match ty {
            ValueType::Int32 => Self::Int32(0),
            ValueType::Int64 => Self::Int64(0),
            ValueType::Float32 => Self::Float32(0.0),
            ValueType::Float64 => Self::Float64(0.0),
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::Int32(n) => Some(*n),
            _ => None,
        }
    }

    /// The raw bit pattern, zero-extended to 64 bits.
    pub fn bits(&self) -> u64 {
        match self {
            Self::Int32(n) => u64::from(*n as u32),
            Self::Int64(n) => *n as u64,
            Self::Float32(x) => u64::from(x.to_bits()),
            Self::Float64(x) => x.to_bits(),
        }
    }

    /// Equality on type tag and bit pattern. Unlike `==`, a NaN equals
    /// itself and `0.0` differs from `-0.0`.
    pub fn bit_eq(&self, other: &Value) -> bool {
        self.ty() == other.ty() && self.bits() == other.bits()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int32(n) => write!(f, "{n} : i32"),
            Self::Int64(n) => write!(f, "{n} : i64"),
            Self::Float32(x) => write!(f, "{x} : f32"),
            Self::Float64(x) => write!(f, "{x} : f64"),
        }
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int32(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int64(n)
    }
}

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Self::Float32(x)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float64(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_of_each_tag() {
        assert_eq!(Value::Int32(1).ty(), ValueType::Int32);
        assert_eq!(Value::Int64(1).ty(), ValueType::Int64);
        assert_eq!(Value::Float32(1.0).ty(), ValueType::Float32);
        assert_eq!(Value::Float64(1.0).ty(), ValueType::Float64);
    }

    #[test]
    fn default_values_are_zero() {
        assert_eq!(Value::default_of(ValueType::Int64), Value::Int64(0));
        assert_eq!(Value::default_of(ValueType::Float32), Value::Float32(0.0));
    }

    #[test]
    fn bit_equality_distinguishes_signed_zero_and_matches_nan() {
        assert!(Value::Float64(f64::NAN).bit_eq(&Value::Float64(f64::NAN)));
        assert!(!Value::Float32(0.0).bit_eq(&Value::Float32(-0.0)));
        assert!(!Value::Int32(0).bit_eq(&Value::Int64(0)));
    }

    #[test]
    fn display_includes_type() {
        assert_eq!(Value::Int32(-7).to_string(), "-7 : i32");
        assert_eq!(Value::Float64(1.5).to_string(), "1.5 : f64");
    }

    #[test]
    fn json_uses_short_type_names() {
        let json = serde_json::to_string(&Value::Int64(3)).unwrap();
        assert_eq!(json, r#"{"i64":3}"#);
    }
}
