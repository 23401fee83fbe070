//! Type checker: walks a module and verifies every expression against the
//! result types its context expects.
//!
//! Entry point: [`TypeChecker::check`].
//!
//! Error codes emitted:
//! - E200: type mismatch (including heterogeneous tables)
//! - E201: unknown function/table/local/global index, missing memory
//! - E202: wrong number of call, break or return arguments
//! - E203: duplicate switch arm value
//! - E204: break past the outermost enclosing label

use std::collections::HashSet;

use wasm_proto_types::ast::*;
use wasm_proto_types::{format_types, Error, ErrorCode, Result, Span, ValueType};

use crate::env::{CheckContext, LabelKind};
use crate::ty::{checks, FuncType};

// ══════════════════════════════════════════════════════════════════════════════
// TypeChecker
// ══════════════════════════════════════════════════════════════════════════════

/// Validates a [`Module`]. The first error aborts checking.
pub struct TypeChecker<'a> {
    module: &'a Module,
    /// Shared signature of each table; `None` for an empty table.
    tables: Vec<Option<FuncType>>,
}

/// The fields of a `Switch` node, borrowed from the tree.
struct SwitchNode<'e> {
    ty: ValueType,
    disc: &'e Expr,
    arms: &'e [Arm],
    default: &'e Expr,
    span: Span,
}

impl<'a> TypeChecker<'a> {
    /// Create a new type checker.
    pub fn new(module: &'a Module) -> Self {
        Self {
            module,
            tables: Vec::new(),
        }
    }

    /// Type-check the whole module.
    pub fn check(&mut self) -> Result<()> {
        self.check_exports()?;
        self.check_tables()?;
        for (index, func) in self.module.funcs.iter().enumerate() {
            self.check_func(index, func)?;
        }
        Ok(())
    }

    // ══════════════════════════════════════════════════════════════════════
    // Module-level
    // ══════════════════════════════════════════════════════════════════════

    fn check_exports(&self) -> Result<()> {
        for (i, &func) in self.module.exports.iter().enumerate() {
            if self.module.func(func).is_none() {
                return Err(self.error(
                    ErrorCode::UNKNOWN_INDEX,
                    format!("export {i} refers to unknown function {func}"),
                    self.module.span,
                ));
            }
        }
        Ok(())
    }

    /// Every table element must exist and every table must be homogeneous,
    /// since a dispatch cannot be checked against one specific callee.
    fn check_tables(&mut self) -> Result<()> {
        let mut tables = Vec::with_capacity(self.module.tables.len());
        for (t, elems) in self.module.tables.iter().enumerate() {
            let mut shared: Option<FuncType> = None;
            for &func in elems {
                let sig = self
                    .module
                    .func(func)
                    .map(FuncType::of)
                    .ok_or_else(|| {
                        self.error(
                            ErrorCode::UNKNOWN_INDEX,
                            format!("table {t} refers to unknown function {func}"),
                            self.module.span,
                        )
                    })?;
                match &shared {
                    None => shared = Some(sig),
                    Some(first) if *first != sig => {
                        return Err(self.error(
                            ErrorCode::TYPE_MISMATCH,
                            format!(
                                "table {t} mixes signatures {first} and {sig} (function {func})"
                            ),
                            self.module.span,
                        ));
                    }
                    Some(_) => {}
                }
            }
            tables.push(shared);
        }
        self.tables = tables;
        Ok(())
    }

    fn check_func(&self, index: usize, func: &Func) -> Result<()> {
        let mut ctx = CheckContext::for_func(func);
        self.check_expr(&mut ctx, &func.body, &func.results)
            .map_err(|mut err| {
                err.message = format!("in function {index}: {}", err.message);
                err
            })
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expressions
    // ══════════════════════════════════════════════════════════════════════

    /// Check `expr` against the result types `expected` by its context.
    fn check_expr(
        &self,
        ctx: &mut CheckContext,
        expr: &Expr,
        expected: &[ValueType],
    ) -> Result<()> {
        let span = expr.span;
        match &expr.kind {
            ExprKind::Nop => self.check_result(&[], expected, span),

            ExprKind::Block(exprs) => match exprs.split_last() {
                None => self.check_result(&[], expected, span),
                Some((last, init)) => {
                    for e in init {
                        self.check_expr(ctx, e, &[])?;
                    }
                    self.check_expr(ctx, last, expected)
                }
            },

            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.check_expr(ctx, cond, &[ValueType::Int32])?;
                self.check_expr(ctx, then_branch, expected)?;
                self.check_expr(ctx, else_branch, expected)
            }

            // A loop is only ever left by a break, so its body's own value is
            // discarded on every iteration.
            ExprKind::Loop(body) => {
                ctx.push_label(LabelKind::Loop, expected.to_vec());
                let result = self.check_expr(ctx, body, &[]);
                ctx.pop_label();
                result
            }

            // Normal completion of the body is the label's value, so the body
            // must satisfy the same expectation a break to it does.
            ExprKind::Label(body) => {
                ctx.push_label(LabelKind::Label, expected.to_vec());
                let result = self.check_expr(ctx, body, expected);
                ctx.pop_label();
                result
            }

            ExprKind::Break { depth, args } => {
                let (kind, types) = ctx.label(*depth).ok_or_else(|| {
                    self.error(
                        ErrorCode::BREAK_DEPTH_OUT_OF_RANGE,
                        format!(
                            "break depth {depth} exceeds {} enclosing label(s)",
                            ctx.depth()
                        ),
                        span,
                    )
                })?;
                let types = types.to_vec();
                let what = match kind {
                    LabelKind::Label => "break to label",
                    LabelKind::Loop => "break to loop",
                };
                self.check_args(ctx, args, &types, what, span)
            }

            ExprKind::Switch {
                ty,
                disc,
                arms,
                default,
            } => {
                let node = SwitchNode {
                    ty: *ty,
                    disc,
                    arms,
                    default,
                    span,
                };
                self.check_switch(ctx, node, expected)
            }

            ExprKind::Call { func, args } => {
                let sig = self
                    .module
                    .func(*func)
                    .map(FuncType::of)
                    .ok_or_else(|| {
                        self.error(
                            ErrorCode::UNKNOWN_INDEX,
                            format!("unknown function {func}"),
                            span,
                        )
                    })?;
                self.check_args(ctx, args, &sig.params, "call", span)?;
                self.check_result(&sig.results, expected, span)
            }

            ExprKind::Dispatch { table, index, args } => {
                let sig = match self.tables.get(*table as usize) {
                    Some(Some(sig)) => sig,
                    Some(None) => {
                        return Err(self.error(
                            ErrorCode::UNKNOWN_INDEX,
                            format!("dispatch through empty table {table}"),
                            span,
                        ));
                    }
                    None => {
                        return Err(self.error(
                            ErrorCode::UNKNOWN_INDEX,
                            format!("unknown table {table}"),
                            span,
                        ));
                    }
                };
                self.check_expr(ctx, index, &[ValueType::Int32])?;
                self.check_args(ctx, args, &sig.params, "dispatch", span)?;
                self.check_result(&sig.results, expected, span)
            }

            ExprKind::Return(args) => {
                let types = ctx.return_types().to_vec();
                self.check_args(ctx, args, &types, "return", span)
            }

            ExprKind::Destruct { locals, expr: e } => {
                let types = locals
                    .iter()
                    .map(|&l| self.local(ctx, l, span))
                    .collect::<Result<Vec<_>>>()?;
                self.check_expr(ctx, e, &types)?;
                self.check_result(&[], expected, span)
            }

            ExprKind::GetLocal(l) => {
                let ty = self.local(ctx, *l, span)?;
                self.check_result(&[ty], expected, span)
            }

            ExprKind::SetLocal(l, value) => {
                let ty = self.local(ctx, *l, span)?;
                self.check_expr(ctx, value, &[ty])?;
                self.check_result(&[], expected, span)
            }

            ExprKind::GetGlobal(g) => {
                let ty = self.global(*g, span)?;
                self.check_result(&[ty], expected, span)
            }

            ExprKind::SetGlobal(g, value) => {
                let ty = self.global(*g, span)?;
                self.check_expr(ctx, value, &[ty])?;
                self.check_result(&[], expected, span)
            }

            ExprKind::GetMemory { memop, addr } => {
                self.require_memory(span)?;
                self.check_expr(ctx, addr, &[ValueType::Int32])?;
                self.check_result(&[memop.mem_type.value_type()], expected, span)
            }

            ExprKind::SetMemory {
                memop,
                addr,
                value,
            } => {
                self.require_memory(span)?;
                self.check_expr(ctx, addr, &[ValueType::Int32])?;
                self.check_expr(ctx, value, &[memop.mem_type.value_type()])?;
                self.check_result(&[], expected, span)
            }

            ExprKind::Const(v) => self.check_result(&[v.ty()], expected, span),

            ExprKind::Unary(op, operand) => {
                let ty = op.operand_type();
                self.check_expr(ctx, operand, &[ty])?;
                self.check_result(&[ty], expected, span)
            }

            ExprKind::Binary(op, lhs, rhs) => {
                let ty = op.operand_type();
                self.check_expr(ctx, lhs, &[ty])?;
                self.check_expr(ctx, rhs, &[ty])?;
                self.check_result(&[ty], expected, span)
            }

            ExprKind::Compare(op, lhs, rhs) => {
                let ty = op.operand_type();
                self.check_expr(ctx, lhs, &[ty])?;
                self.check_expr(ctx, rhs, &[ty])?;
                self.check_result(&[ValueType::Int32], expected, span)
            }

            ExprKind::Convert(op, operand) => {
                self.check_expr(ctx, operand, &[op.operand_type()])?;
                self.check_result(&[op.result_type()], expected, span)
            }
        }
    }

    // ── Switch ────────────────────────────────────────────────────────────

    fn check_switch(
        &self,
        ctx: &mut CheckContext,
        node: SwitchNode<'_>,
        expected: &[ValueType],
    ) -> Result<()> {
        let SwitchNode {
            ty,
            disc,
            arms,
            default,
            span,
        } = node;
        if !ty.is_int() {
            return Err(self.error(
                ErrorCode::TYPE_MISMATCH,
                format!("switch discriminant must be i32 or i64, found {ty}"),
                span,
            ));
        }
        self.check_expr(ctx, disc, &[ty])?;

        let mut seen = HashSet::new();
        for arm in arms {
            if arm.value.ty() != ty {
                return Err(self.error(
                    ErrorCode::TYPE_MISMATCH,
                    format!(
                        "switch case {} does not match discriminant type {ty}",
                        arm.value
                    ),
                    arm.span,
                ));
            }
            if !seen.insert(arm.value.bits()) {
                return Err(self.error(
                    ErrorCode::DUPLICATE_SWITCH_VALUE,
                    format!("duplicate switch case {}", arm.value),
                    arm.span,
                ));
            }
            // A fallthru arm's value never leaves the switch.
            let arm_expected = if arm.fallthru { &[][..] } else { expected };
            self.check_expr(ctx, &arm.expr, arm_expected)?;
        }
        self.check_expr(ctx, default, expected)
    }

    // ══════════════════════════════════════════════════════════════════════
    // Helpers
    // ══════════════════════════════════════════════════════════════════════

    fn check_result(&self, actual: &[ValueType], expected: &[ValueType], span: Span) -> Result<()> {
        if checks(actual, expected) {
            Ok(())
        } else {
            Err(self.error(
                ErrorCode::TYPE_MISMATCH,
                format!(
                    "type mismatch: expression has type {} but {} is expected",
                    format_types(actual),
                    format_types(expected)
                ),
                span,
            ))
        }
    }

    /// Check an argument list positionally against `types`.
    fn check_args(
        &self,
        ctx: &mut CheckContext,
        args: &[Expr],
        types: &[ValueType],
        what: &str,
        span: Span,
    ) -> Result<()> {
        if args.len() != types.len() {
            return Err(self.error(
                ErrorCode::ARITY_MISMATCH,
                format!(
                    "{what} expects {} argument(s) {}, found {}",
                    types.len(),
                    format_types(types),
                    args.len()
                ),
                span,
            ));
        }
        for (arg, &ty) in args.iter().zip(types) {
            self.check_expr(ctx, arg, &[ty])?;
        }
        Ok(())
    }

    fn local(&self, ctx: &CheckContext, index: LocalIndex, span: Span) -> Result<ValueType> {
        ctx.local(index).ok_or_else(|| {
            self.error(
                ErrorCode::UNKNOWN_INDEX,
                format!("unknown local {index}"),
                span,
            )
        })
    }

    fn global(&self, index: GlobalIndex, span: Span) -> Result<ValueType> {
        self.module
            .globals
            .get(index as usize)
            .copied()
            .ok_or_else(|| {
                self.error(
                    ErrorCode::UNKNOWN_INDEX,
                    format!("unknown global {index}"),
                    span,
                )
            })
    }

    fn require_memory(&self, span: Span) -> Result<()> {
        match self.module.memory {
            Some(_) => Ok(()),
            None => Err(self.error(
                ErrorCode::UNKNOWN_INDEX,
                "memory access in a module without memory",
                span,
            )),
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Error Reporting
    // ══════════════════════════════════════════════════════════════════════

    fn error(&self, code: ErrorCode, message: impl Into<String>, span: Span) -> Error {
        Error::new(&self.module.file, code, message, span)
    }
}
