//! Numeric primitives, dispatched on the operator's outer type tag.
//!
//! Integer arithmetic wraps (two's complement). Float arithmetic is IEEE-754
//! as provided by `f32`/`f64`. Integer division by zero and float-to-integer
//! truncation of NaN or out-of-range values trap.

use wasm_proto_types::ops::*;
use wasm_proto_types::Value;

use crate::error::{Trap, TrapResult};

// ══════════════════════════════════════════════════════════════════════════════
// Per-width implementations
// ══════════════════════════════════════════════════════════════════════════════

macro_rules! int_ops {
    ($un:ident, $bin:ident, $rel:ident, $s:ty, $u:ty) => {
        fn $un(op: IntUnOp, x: $s) -> $s {
            match op {
                IntUnOp::Clz => x.leading_zeros() as $s,
                IntUnOp::Ctz => x.trailing_zeros() as $s,
                IntUnOp::Popcnt => x.count_ones() as $s,
            }
        }

        fn $bin(op: IntBinOp, x: $s, y: $s) -> TrapResult<$s> {
            Ok(match op {
                IntBinOp::Add => x.wrapping_add(y),
                IntBinOp::Sub => x.wrapping_sub(y),
                IntBinOp::Mul => x.wrapping_mul(y),
                // MIN / -1 wraps back to MIN; MIN rem -1 is 0.
                IntBinOp::DivS => {
                    if y == 0 {
                        return Err(Trap::DivisionByZero);
                    }
                    x.wrapping_div(y)
                }
                IntBinOp::DivU => (x as $u)
                    .checked_div(y as $u)
                    .ok_or(Trap::DivisionByZero)? as $s,
                IntBinOp::RemS => {
                    if y == 0 {
                        return Err(Trap::DivisionByZero);
                    }
                    x.wrapping_rem(y)
                }
                IntBinOp::RemU => (x as $u)
                    .checked_rem(y as $u)
                    .ok_or(Trap::DivisionByZero)? as $s,
                IntBinOp::And => x & y,
                IntBinOp::Or => x | y,
                IntBinOp::Xor => x ^ y,
                // Shift counts are taken modulo the bit width.
                IntBinOp::Shl => x.wrapping_shl(y as u32),
                IntBinOp::ShrS => x.wrapping_shr(y as u32),
                IntBinOp::ShrU => (x as $u).wrapping_shr(y as u32) as $s,
            })
        }

        fn $rel(op: IntRelOp, x: $s, y: $s) -> bool {
            let (ux, uy) = (x as $u, y as $u);
            match op {
                IntRelOp::Eq => x == y,
                IntRelOp::Ne => x != y,
                IntRelOp::LtS => x < y,
                IntRelOp::LtU => ux < uy,
                IntRelOp::LeS => x <= y,
                IntRelOp::LeU => ux <= uy,
                IntRelOp::GtS => x > y,
                IntRelOp::GtU => ux > uy,
                IntRelOp::GeS => x >= y,
                IntRelOp::GeU => ux >= uy,
            }
        }
    };
}

int_ops!(i32_unop, i32_binop, i32_relop, i32, u32);
int_ops!(i64_unop, i64_binop, i64_relop, i64, u64);

macro_rules! float_ops {
    ($un:ident, $bin:ident, $rel:ident, $t:ty) => {
        fn $un(op: FloatUnOp, x: $t) -> $t {
            match op {
                FloatUnOp::Neg => -x,
                FloatUnOp::Abs => x.abs(),
                FloatUnOp::Ceil => x.ceil(),
                FloatUnOp::Floor => x.floor(),
                FloatUnOp::Trunc => x.trunc(),
                FloatUnOp::Nearest => x.round_ties_even(),
                FloatUnOp::Sqrt => x.sqrt(),
            }
        }

        fn $bin(op: FloatBinOp, x: $t, y: $t) -> $t {
            match op {
                FloatBinOp::Add => x + y,
                FloatBinOp::Sub => x - y,
                FloatBinOp::Mul => x * y,
                FloatBinOp::Div => x / y,
                // NaN wins; -0 orders below +0.
                FloatBinOp::Min => {
                    if x.is_nan() || y.is_nan() {
                        x + y
                    } else if x == y {
                        if x.is_sign_negative() { x } else { y }
                    } else {
                        x.min(y)
                    }
                }
                FloatBinOp::Max => {
                    if x.is_nan() || y.is_nan() {
                        x + y
                    } else if x == y {
                        if x.is_sign_positive() { x } else { y }
                    } else {
                        x.max(y)
                    }
                }
                FloatBinOp::CopySign => x.copysign(y),
            }
        }

        fn $rel(op: FloatRelOp, x: $t, y: $t) -> bool {
            match op {
                FloatRelOp::Eq => x == y,
                FloatRelOp::Ne => x != y,
                FloatRelOp::Lt => x < y,
                FloatRelOp::Le => x <= y,
                FloatRelOp::Gt => x > y,
                FloatRelOp::Ge => x >= y,
            }
        }
    };
}

float_ops!(f32_unop, f32_binop, f32_relop, f32);
float_ops!(f64_unop, f64_binop, f64_relop, f64);

// ══════════════════════════════════════════════════════════════════════════════
// Float → integer truncation
// ══════════════════════════════════════════════════════════════════════════════

// Bounds are powers of two, exact in f64; every f32 widens to f64 exactly.

fn trunc_i32(x: f64, original: Value) -> TrapResult<i32> {
    let t = x.trunc();
    if t >= -2_147_483_648.0 && t <= 2_147_483_647.0 {
        Ok(t as i32)
    } else {
        Err(Trap::InvalidConversion(original))
    }
}

fn trunc_u32(x: f64, original: Value) -> TrapResult<i32> {
    let t = x.trunc();
    if t >= 0.0 && t <= 4_294_967_295.0 {
        Ok(t as u32 as i32)
    } else {
        Err(Trap::InvalidConversion(original))
    }
}

fn trunc_i64(x: f64, original: Value) -> TrapResult<i64> {
    let t = x.trunc();
    if t >= -9_223_372_036_854_775_808.0 && t < 9_223_372_036_854_775_808.0 {
        Ok(t as i64)
    } else {
        Err(Trap::InvalidConversion(original))
    }
}

fn trunc_u64(x: f64, original: Value) -> TrapResult<i64> {
    let t = x.trunc();
    if t >= 0.0 && t < 18_446_744_073_709_551_616.0 {
        Ok(t as u64 as i64)
    } else {
        Err(Trap::InvalidConversion(original))
    }
}

// ══════════════════════════════════════════════════════════════════════════════
// Entry points
// ══════════════════════════════════════════════════════════════════════════════

fn operand_mismatch(op: impl std::fmt::Display, v: Value) -> Trap {
    Trap::Malformed(format!("operator {op} applied to {v}"))
}

/// Apply a unary operator.
pub fn unary(op: UnOp, v: Value) -> TrapResult<Value> {
    match (op, v) {
        (UnOp::Int32(o), Value::Int32(x)) => Ok(Value::Int32(i32_unop(o, x))),
        (UnOp::Int64(o), Value::Int64(x)) => Ok(Value::Int64(i64_unop(o, x))),
        (UnOp::Float32(o), Value::Float32(x)) => Ok(Value::Float32(f32_unop(o, x))),
        (UnOp::Float64(o), Value::Float64(x)) => Ok(Value::Float64(f64_unop(o, x))),
        _ => Err(operand_mismatch(op, v)),
    }
}

/// Apply a binary operator.
pub fn binary(op: BinOp, lhs: Value, rhs: Value) -> TrapResult<Value> {
    match (op, lhs, rhs) {
        (BinOp::Int32(o), Value::Int32(x), Value::Int32(y)) => i32_binop(o, x, y).map(Value::Int32),
        (BinOp::Int64(o), Value::Int64(x), Value::Int64(y)) => i64_binop(o, x, y).map(Value::Int64),
        (BinOp::Float32(o), Value::Float32(x), Value::Float32(y)) => {
            Ok(Value::Float32(f32_binop(o, x, y)))
        }
        (BinOp::Float64(o), Value::Float64(x), Value::Float64(y)) => {
            Ok(Value::Float64(f64_binop(o, x, y)))
        }
        _ if lhs.ty() != op.operand_type() => Err(operand_mismatch(op, lhs)),
        _ => Err(operand_mismatch(op, rhs)),
    }
}

/// Apply a comparison; the result is `1` or `0` as `i32`.
pub fn compare(op: RelOp, lhs: Value, rhs: Value) -> TrapResult<Value> {
    let holds = match (op, lhs, rhs) {
        (RelOp::Int32(o), Value::Int32(x), Value::Int32(y)) => i32_relop(o, x, y),
        (RelOp::Int64(o), Value::Int64(x), Value::Int64(y)) => i64_relop(o, x, y),
        (RelOp::Float32(o), Value::Float32(x), Value::Float32(y)) => f32_relop(o, x, y),
        (RelOp::Float64(o), Value::Float64(x), Value::Float64(y)) => f64_relop(o, x, y),
        _ if lhs.ty() != op.operand_type() => return Err(operand_mismatch(op, lhs)),
        _ => return Err(operand_mismatch(op, rhs)),
    };
    Ok(Value::Int32(i32::from(holds)))
}

/// Apply a conversion.
pub fn convert(op: CvtOp, v: Value) -> TrapResult<Value> {
    Ok(match (op, v) {
        (CvtOp::Int32(o), Value::Int32(x)) => match o {
            Int32CvtOp::ToInt64S => Value::Int64(i64::from(x)),
            Int32CvtOp::ToInt64U => Value::Int64(i64::from(x as u32)),
            Int32CvtOp::ToFloat32S => Value::Float32(x as f32),
            Int32CvtOp::ToFloat32U => Value::Float32(x as u32 as f32),
            Int32CvtOp::ToFloat64S => Value::Float64(f64::from(x)),
            Int32CvtOp::ToFloat64U => Value::Float64(f64::from(x as u32)),
            Int32CvtOp::ReinterpretFloat => Value::Float32(f32::from_bits(x as u32)),
        },
        (CvtOp::Int64(o), Value::Int64(x)) => match o {
            Int64CvtOp::WrapToInt32 => Value::Int32(x as i32),
            Int64CvtOp::ToFloat32S => Value::Float32(x as f32),
            Int64CvtOp::ToFloat32U => Value::Float32(x as u64 as f32),
            Int64CvtOp::ToFloat64S => Value::Float64(x as f64),
            Int64CvtOp::ToFloat64U => Value::Float64(x as u64 as f64),
            Int64CvtOp::ReinterpretFloat => Value::Float64(f64::from_bits(x as u64)),
        },
        (CvtOp::Float32(o), Value::Float32(x)) => match o {
            Float32CvtOp::ToInt32S => Value::Int32(trunc_i32(f64::from(x), v)?),
            Float32CvtOp::ToInt32U => Value::Int32(trunc_u32(f64::from(x), v)?),
            Float32CvtOp::ToInt64S => Value::Int64(trunc_i64(f64::from(x), v)?),
            Float32CvtOp::ToInt64U => Value::Int64(trunc_u64(f64::from(x), v)?),
            Float32CvtOp::PromoteToFloat64 => Value::Float64(f64::from(x)),
            Float32CvtOp::ReinterpretInt => Value::Int32(x.to_bits() as i32),
        },
        (CvtOp::Float64(o), Value::Float64(x)) => match o {
            Float64CvtOp::ToInt32S => Value::Int32(trunc_i32(x, v)?),
            Float64CvtOp::ToInt32U => Value::Int32(trunc_u32(x, v)?),
            Float64CvtOp::ToInt64S => Value::Int64(trunc_i64(x, v)?),
            Float64CvtOp::ToInt64U => Value::Int64(trunc_u64(x, v)?),
            Float64CvtOp::DemoteToFloat32 => Value::Float32(x as f32),
            Float64CvtOp::ReinterpretInt => Value::Int64(x.to_bits() as i64),
        },
        _ => return Err(operand_mismatch(op, v)),
    })
}
