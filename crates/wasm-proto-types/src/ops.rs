//! Type-indexed operator families.
//!
//! Each family is keyed by the **operand** type: the outer tag fixes the
//! type of the expressions feeding the operator and the inner tag selects the
//! operation. The validator checks operands against the outer tag once; the
//! evaluator dispatches on it without re-deriving types.

use crate::ValueType;
use std::fmt;

// ══════════════════════════════════════════════════════════════════════════════
// Per-type operations
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntUnOp {
    Clz,
    Ctz,
    Popcnt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatUnOp {
    Neg,
    Abs,
    Ceil,
    Floor,
    Trunc,
    Nearest,
    Sqrt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntBinOp {
    Add,
    Sub,
    Mul,
    DivS,
    DivU,
    RemS,
    RemU,
    And,
    Or,
    Xor,
    Shl,
    ShrS,
    ShrU,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatBinOp {
    Add,
    Sub,
    Mul,
    Div,
    Min,
    Max,
    CopySign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntRelOp {
    Eq,
    Ne,
    LtS,
    LtU,
    LeS,
    LeU,
    GtS,
    GtU,
    GeS,
    GeU,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatRelOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Conversions from an `i32` operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Int32CvtOp {
    ToInt64S,
    ToInt64U,
    ToFloat32S,
    ToFloat32U,
    ToFloat64S,
    ToFloat64U,
    /// Bit-preserving reinterpretation as `f32`.
    ReinterpretFloat,
}

/// Conversions from an `i64` operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Int64CvtOp {
    WrapToInt32,
    ToFloat32S,
    ToFloat32U,
    ToFloat64S,
    ToFloat64U,
    /// Bit-preserving reinterpretation as `f64`.
    ReinterpretFloat,
}

/// Conversions from an `f32` operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Float32CvtOp {
    ToInt32S,
    ToInt32U,
    ToInt64S,
    ToInt64U,
    PromoteToFloat64,
    /// Bit-preserving reinterpretation as `i32`.
    ReinterpretInt,
}

/// Conversions from an `f64` operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Float64CvtOp {
    ToInt32S,
    ToInt32U,
    ToInt64S,
    ToInt64U,
    DemoteToFloat32,
    /// Bit-preserving reinterpretation as `i64`.
    ReinterpretInt,
}

// ══════════════════════════════════════════════════════════════════════════════
// Families
// ══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnOp {
    Int32(IntUnOp),
    Int64(IntUnOp),
    Float32(FloatUnOp),
    Float64(FloatUnOp),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    Int32(IntBinOp),
    Int64(IntBinOp),
    Float32(FloatBinOp),
    Float64(FloatBinOp),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelOp {
    Int32(IntRelOp),
    Int64(IntRelOp),
    Float32(FloatRelOp),
    Float64(FloatRelOp),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CvtOp {
    Int32(Int32CvtOp),
    Int64(Int64CvtOp),
    Float32(Float32CvtOp),
    Float64(Float64CvtOp),
}

macro_rules! operand_type {
    ($family:ident) => {
        impl $family {
            /// The type every operand of this operator must have.
            pub fn operand_type(self) -> ValueType {
                match self {
                    Self::Int32(_) => ValueType::Int32,
                    Self::Int64(_) => ValueType::Int64,
                    Self::Float32(_) => ValueType::Float32,
                    Self::Float64(_) => ValueType::Float64,
                }
            }
        }
    };
}

operand_type!(UnOp);
operand_type!(BinOp);
operand_type!(RelOp);
operand_type!(CvtOp);

impl CvtOp {
    /// The type this conversion produces.
    pub fn result_type(self) -> ValueType {
        use ValueType::*;
        match self {
            Self::Int32(op) => match op {
                Int32CvtOp::ToInt64S | Int32CvtOp::ToInt64U => Int64,
                Int32CvtOp::ToFloat32S | Int32CvtOp::ToFloat32U | Int32CvtOp::ReinterpretFloat => {
                    Float32
                }
                Int32CvtOp::ToFloat64S | Int32CvtOp::ToFloat64U => Float64,
            },
            Self::Int64(op) => match op {
                Int64CvtOp::WrapToInt32 => Int32,
                Int64CvtOp::ToFloat32S | Int64CvtOp::ToFloat32U => Float32,
                Int64CvtOp::ToFloat64S | Int64CvtOp::ToFloat64U | Int64CvtOp::ReinterpretFloat => {
                    Float64
                }
            },
            Self::Float32(op) => match op {
                Float32CvtOp::ToInt32S | Float32CvtOp::ToInt32U | Float32CvtOp::ReinterpretInt => {
                    Int32
                }
                Float32CvtOp::ToInt64S | Float32CvtOp::ToInt64U => Int64,
                Float32CvtOp::PromoteToFloat64 => Float64,
            },
            Self::Float64(op) => match op {
                Float64CvtOp::ToInt32S | Float64CvtOp::ToInt32U => Int32,
                Float64CvtOp::ToInt64S | Float64CvtOp::ToInt64U | Float64CvtOp::ReinterpretInt => {
                    Int64
                }
                Float64CvtOp::DemoteToFloat32 => Float32,
            },
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Display (`add.i32`, `convert_s.f64/i32` style mnemonics)
// ══════════════════════════════════════════════════════════════════════════════

fn int_un_name(op: IntUnOp) -> &'static str {
    match op {
        IntUnOp::Clz => "clz",
        IntUnOp::Ctz => "ctz",
        IntUnOp::Popcnt => "popcnt",
    }
}

fn float_un_name(op: FloatUnOp) -> &'static str {
    match op {
        FloatUnOp::Neg => "neg",
        FloatUnOp::Abs => "abs",
        FloatUnOp::Ceil => "ceil",
        FloatUnOp::Floor => "floor",
        FloatUnOp::Trunc => "trunc",
        FloatUnOp::Nearest => "nearest",
        FloatUnOp::Sqrt => "sqrt",
    }
}

fn int_bin_name(op: IntBinOp) -> &'static str {
    match op {
        IntBinOp::Add => "add",
        IntBinOp::Sub => "sub",
        IntBinOp::Mul => "mul",
        IntBinOp::DivS => "divs",
        IntBinOp::DivU => "divu",
        IntBinOp::RemS => "rems",
        IntBinOp::RemU => "remu",
        IntBinOp::And => "and",
        IntBinOp::Or => "or",
        IntBinOp::Xor => "xor",
        IntBinOp::Shl => "shl",
        IntBinOp::ShrS => "shrs",
        IntBinOp::ShrU => "shru",
    }
}

fn float_bin_name(op: FloatBinOp) -> &'static str {
    match op {
        FloatBinOp::Add => "add",
        FloatBinOp::Sub => "sub",
        FloatBinOp::Mul => "mul",
        FloatBinOp::Div => "div",
        FloatBinOp::Min => "min",
        FloatBinOp::Max => "max",
        FloatBinOp::CopySign => "copysign",
    }
}

fn int_rel_name(op: IntRelOp) -> &'static str {
    match op {
        IntRelOp::Eq => "eq",
        IntRelOp::Ne => "neq",
        IntRelOp::LtS => "lts",
        IntRelOp::LtU => "ltu",
        IntRelOp::LeS => "les",
        IntRelOp::LeU => "leu",
        IntRelOp::GtS => "gts",
        IntRelOp::GtU => "gtu",
        IntRelOp::GeS => "ges",
        IntRelOp::GeU => "geu",
    }
}

fn float_rel_name(op: FloatRelOp) -> &'static str {
    match op {
        FloatRelOp::Eq => "eq",
        FloatRelOp::Ne => "neq",
        FloatRelOp::Lt => "lt",
        FloatRelOp::Le => "le",
        FloatRelOp::Gt => "gt",
        FloatRelOp::Ge => "ge",
    }
}

impl fmt::Display for UnOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Self::Int32(op) | Self::Int64(op) => int_un_name(op),
            Self::Float32(op) | Self::Float64(op) => float_un_name(op),
        };
        write!(f, "{name}.{}", self.operand_type())
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Self::Int32(op) | Self::Int64(op) => int_bin_name(op),
            Self::Float32(op) | Self::Float64(op) => float_bin_name(op),
        };
        write!(f, "{name}.{}", self.operand_type())
    }
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Self::Int32(op) | Self::Int64(op) => int_rel_name(op),
            Self::Float32(op) | Self::Float64(op) => float_rel_name(op),
        };
        write!(f, "{name}.{}", self.operand_type())
    }
}

impl fmt::Display for CvtOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Self::Int32(Int32CvtOp::ToInt64S) => "extend_s",
            Self::Int32(Int32CvtOp::ToInt64U) => "extend_u",
            Self::Int32(Int32CvtOp::ToFloat32S | Int32CvtOp::ToFloat64S)
            | Self::Int64(Int64CvtOp::ToFloat32S | Int64CvtOp::ToFloat64S) => "convert_s",
            Self::Int32(Int32CvtOp::ToFloat32U | Int32CvtOp::ToFloat64U)
            | Self::Int64(Int64CvtOp::ToFloat32U | Int64CvtOp::ToFloat64U) => "convert_u",
            Self::Int32(Int32CvtOp::ReinterpretFloat)
            | Self::Int64(Int64CvtOp::ReinterpretFloat)
            | Self::Float32(Float32CvtOp::ReinterpretInt)
            | Self::Float64(Float64CvtOp::ReinterpretInt) => "reinterpret",
            Self::Int64(Int64CvtOp::WrapToInt32) => "wrap",
            Self::Float32(Float32CvtOp::ToInt32S | Float32CvtOp::ToInt64S)
            | Self::Float64(Float64CvtOp::ToInt32S | Float64CvtOp::ToInt64S) => "trunc_s",
            Self::Float32(Float32CvtOp::ToInt32U | Float32CvtOp::ToInt64U)
            | Self::Float64(Float64CvtOp::ToInt32U | Float64CvtOp::ToInt64U) => "trunc_u",
            Self::Float32(Float32CvtOp::PromoteToFloat64) => "promote",
            Self::Float64(Float64CvtOp::DemoteToFloat32) => "demote",
        };
        write!(f, "{name}.{}/{}", self.result_type(), self.operand_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outer_tag_is_operand_type() {
        assert_eq!(BinOp::Int64(IntBinOp::Add).operand_type(), ValueType::Int64);
        assert_eq!(RelOp::Float32(FloatRelOp::Lt).operand_type(), ValueType::Float32);
        assert_eq!(
            CvtOp::Float64(Float64CvtOp::ToInt32S).operand_type(),
            ValueType::Float64
        );
    }

    #[test]
    fn conversion_result_types() {
        assert_eq!(CvtOp::Int32(Int32CvtOp::ToInt64S).result_type(), ValueType::Int64);
        assert_eq!(CvtOp::Int64(Int64CvtOp::WrapToInt32).result_type(), ValueType::Int32);
        assert_eq!(
            CvtOp::Int32(Int32CvtOp::ReinterpretFloat).result_type(),
            ValueType::Float32
        );
        assert_eq!(
            CvtOp::Float32(Float32CvtOp::PromoteToFloat64).result_type(),
            ValueType::Float64
        );
        assert_eq!(
            CvtOp::Float64(Float64CvtOp::ReinterpretInt).result_type(),
            ValueType::Int64
        );
    }

    #[test]
    fn mnemonics() {
        assert_eq!(BinOp::Int32(IntBinOp::DivS).to_string(), "divs.i32");
        assert_eq!(UnOp::Float64(FloatUnOp::Sqrt).to_string(), "sqrt.f64");
        assert_eq!(RelOp::Int64(IntRelOp::GeU).to_string(), "geu.i64");
        assert_eq!(
            CvtOp::Int32(Int32CvtOp::ToFloat64U).to_string(),
            "convert_u.f64/i32"
        );
    }
}
