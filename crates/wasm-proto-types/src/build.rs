//! Constructors for span-less AST nodes.
//!
//! The parser is not part of this workspace; embedders and tests assemble
//! modules with these helpers instead.

use crate::ast::*;
use crate::ops::*;
use crate::{MemOp, MemoryType, Span, Value, ValueType};

fn node(kind: ExprKind) -> Expr {
    Expr::new(kind, Span::default())
}

pub fn nop() -> Expr {
    node(ExprKind::Nop)
}

pub fn block(exprs: Vec<Expr>) -> Expr {
    node(ExprKind::Block(exprs))
}

pub fn if_(cond: Expr, then_branch: Expr, else_branch: Expr) -> Expr {
    node(ExprKind::If {
        cond: Box::new(cond),
        then_branch: Box::new(then_branch),
        else_branch: Box::new(else_branch),
    })
}

pub fn loop_(body: Expr) -> Expr {
    node(ExprKind::Loop(Box::new(body)))
}

pub fn label(body: Expr) -> Expr {
    node(ExprKind::Label(Box::new(body)))
}

pub fn br(depth: u32, args: Vec<Expr>) -> Expr {
    node(ExprKind::Break { depth, args })
}

pub fn switch(ty: ValueType, disc: Expr, arms: Vec<Arm>, default: Expr) -> Expr {
    node(ExprKind::Switch {
        ty,
        disc: Box::new(disc),
        arms,
        default: Box::new(default),
    })
}

pub fn arm(value: impl Into<Value>, expr: Expr, fallthru: bool) -> Arm {
    Arm {
        value: value.into(),
        expr,
        fallthru,
        span: Span::default(),
    }
}

pub fn call(func: FuncIndex, args: Vec<Expr>) -> Expr {
    node(ExprKind::Call { func, args })
}

pub fn dispatch(table: TableIndex, index: Expr, args: Vec<Expr>) -> Expr {
    node(ExprKind::Dispatch {
        table,
        index: Box::new(index),
        args,
    })
}

pub fn ret(args: Vec<Expr>) -> Expr {
    node(ExprKind::Return(args))
}

pub fn destruct(locals: Vec<LocalIndex>, expr: Expr) -> Expr {
    node(ExprKind::Destruct {
        locals,
        expr: Box::new(expr),
    })
}

pub fn get_local(index: LocalIndex) -> Expr {
    node(ExprKind::GetLocal(index))
}

pub fn set_local(index: LocalIndex, value: Expr) -> Expr {
    node(ExprKind::SetLocal(index, Box::new(value)))
}

pub fn get_global(index: GlobalIndex) -> Expr {
    node(ExprKind::GetGlobal(index))
}

pub fn set_global(index: GlobalIndex, value: Expr) -> Expr {
    node(ExprKind::SetGlobal(index, Box::new(value)))
}

pub fn load(mem_type: MemoryType, addr: Expr) -> Expr {
    node(ExprKind::GetMemory {
        memop: MemOp::new(mem_type),
        addr: Box::new(addr),
    })
}

pub fn store(mem_type: MemoryType, addr: Expr, value: Expr) -> Expr {
    node(ExprKind::SetMemory {
        memop: MemOp::new(mem_type),
        addr: Box::new(addr),
        value: Box::new(value),
    })
}

pub fn constant(value: impl Into<Value>) -> Expr {
    node(ExprKind::Const(value.into()))
}

pub fn i32_const(n: i32) -> Expr {
    constant(n)
}

pub fn i64_const(n: i64) -> Expr {
    constant(n)
}

pub fn f32_const(x: f32) -> Expr {
    constant(x)
}

pub fn f64_const(x: f64) -> Expr {
    constant(x)
}

pub fn unary(op: UnOp, operand: Expr) -> Expr {
    node(ExprKind::Unary(op, Box::new(operand)))
}

pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    node(ExprKind::Binary(op, Box::new(lhs), Box::new(rhs)))
}

pub fn compare(op: RelOp, lhs: Expr, rhs: Expr) -> Expr {
    node(ExprKind::Compare(op, Box::new(lhs), Box::new(rhs)))
}

pub fn convert(op: CvtOp, operand: Expr) -> Expr {
    node(ExprKind::Convert(op, Box::new(operand)))
}

/// `add.i32`
pub fn i32_add(lhs: Expr, rhs: Expr) -> Expr {
    binary(BinOp::Int32(IntBinOp::Add), lhs, rhs)
}

/// `sub.i32`
pub fn i32_sub(lhs: Expr, rhs: Expr) -> Expr {
    binary(BinOp::Int32(IntBinOp::Sub), lhs, rhs)
}

/// `mul.i32`
pub fn i32_mul(lhs: Expr, rhs: Expr) -> Expr {
    binary(BinOp::Int32(IntBinOp::Mul), lhs, rhs)
}

/// `eq.i32`
pub fn i32_eq(lhs: Expr, rhs: Expr) -> Expr {
    compare(RelOp::Int32(IntRelOp::Eq), lhs, rhs)
}

/// A function with no declared locals.
pub fn func(params: Vec<ValueType>, results: Vec<ValueType>, body: Expr) -> Func {
    func_with_locals(params, results, vec![], body)
}

pub fn func_with_locals(
    params: Vec<ValueType>,
    results: Vec<ValueType>,
    locals: Vec<ValueType>,
    body: Expr,
) -> Func {
    Func {
        params,
        results,
        locals,
        body,
        span: Span::default(),
    }
}

/// A module whose functions are all exported in declaration order.
pub fn module(funcs: Vec<Func>) -> Module {
    let mut m = Module::new("test.wast");
    m.exports = (0..funcs.len() as FuncIndex).collect();
    m.funcs = funcs;
    m
}

/// Attach a span to a node, for tests that assert on error locations.
pub fn at(mut expr: Expr, span: Span) -> Expr {
    expr.span = span;
    expr
}
