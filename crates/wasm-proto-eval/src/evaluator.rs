//! Core expression evaluator.
//!
//! A recursive walk over the tree. Every step yields a [`Flow`]: either the
//! values the expression produced, or a transfer travelling outward to an
//! enclosing label (from `Break`) or to the function entry (from `Return`).
//! Errors travel separately on the `Err` side and pass through every frame.

use tracing::trace;
use wasm_proto_types::ast::*;
use wasm_proto_types::{Error, Result, Span, Value};

use crate::config::EvalConfig;
use crate::env::Frame;
use crate::error::Trap;
use crate::memory::Memory;
use crate::numeric;

/// Outcome of evaluating one expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// Completed normally with these values.
    Normal(Vec<Value>),
    /// Leaving `depth` more label frames; the frame reached at depth 0
    /// takes `values` as its result.
    Transfer { depth: u32, values: Vec<Value> },
}

impl Flow {
    /// Pass this flow out through one label frame.
    fn leave_label(self) -> Flow {
        match self {
            Flow::Transfer { depth: 0, values } => Flow::Normal(values),
            Flow::Transfer { depth, values } => Flow::Transfer {
                depth: depth - 1,
                values,
            },
            normal => normal,
        }
    }
}

/// Unwrap a normal completion, or return the transfer to the caller.
macro_rules! normal {
    ($flow:expr) => {
        match $flow {
            Flow::Normal(values) => values,
            transfer => return Ok(transfer),
        }
    };
}

/// Evaluate an operand expected to produce exactly one value.
macro_rules! value {
    ($self:ident, $frame:ident, $expr:expr) => {{
        let expr: &Expr = $expr;
        let values = normal!($self.eval_expr($frame, expr)?);
        $self.single(values, expr.span)?
    }};
}

/// Evaluates expressions against one module's globals and memory.
pub struct Evaluator<'a> {
    module: &'a Module,
    globals: &'a mut [Value],
    memory: Option<&'a mut Memory>,
    config: EvalConfig,
    /// Gas consumed since this evaluator was created.
    gas: u64,
    /// Current number of nested calls.
    depth: u32,
    /// Current number of expression nodes under evaluation.
    nesting: u32,
}

impl<'a> Evaluator<'a> {
    pub fn new(
        module: &'a Module,
        globals: &'a mut [Value],
        memory: Option<&'a mut Memory>,
        config: EvalConfig,
    ) -> Self {
        Self {
            module,
            globals,
            memory,
            config,
            gas: 0,
            depth: 0,
            nesting: 0,
        }
    }

    /// Evaluate a free-standing expression in an empty frame.
    pub fn eval_top(&mut self, expr: &Expr) -> Result<Vec<Value>> {
        let mut frame = Frame::top_level();
        match self.eval_expr(&mut frame, expr)? {
            Flow::Normal(values) => Ok(values),
            Flow::Transfer { .. } => Err(self.malformed("transfer escaped the top level", expr.span)),
        }
    }

    /// Call function `index` with already-evaluated arguments.
    pub fn call(&mut self, index: FuncIndex, args: Vec<Value>, span: Span) -> Result<Vec<Value>> {
        let module = self.module;
        let func = module
            .func(index)
            .ok_or_else(|| self.malformed(format!("unknown function {index}"), span))?;
        if args.len() != func.params.len() {
            return Err(self.malformed(
                format!(
                    "function {index} takes {} arguments, got {}",
                    func.params.len(),
                    args.len()
                ),
                span,
            ));
        }
        if self.depth >= self.config.max_call_depth {
            return Err(self.trap(Trap::CallStackExhausted(self.config.max_call_depth), span));
        }

        trace!(func = index, depth = self.depth, "call");
        self.depth += 1;
        let mut frame = Frame::for_call(func, args);
        let flow = self.eval_expr(&mut frame, &func.body);
        self.depth -= 1;

        let values = match flow? {
            Flow::Normal(values) | Flow::Transfer { depth: 0, values } => values,
            Flow::Transfer { .. } => {
                return Err(self.malformed("break escaped a function body", func.body.span))
            }
        };
        if func.results.is_empty() {
            return Ok(Vec::new());
        }
        if values.len() != func.results.len() {
            return Err(self.malformed(
                format!(
                    "function {index} returned {} values, declared {}",
                    values.len(),
                    func.results.len()
                ),
                func.body.span,
            ));
        }
        Ok(values)
    }

    // ══════════════════════════════════════════════════════════════════════
    // Expression evaluation
    // ══════════════════════════════════════════════════════════════════════

    /// Evaluate an expression in `frame`.
    pub fn eval_expr(&mut self, frame: &mut Frame, expr: &Expr) -> Result<Flow> {
        if self.nesting >= self.config.max_nesting {
            return Err(self.trap(Trap::NestingExhausted(self.config.max_nesting), expr.span));
        }
        self.nesting += 1;
        let flow = self.eval_node(frame, expr);
        self.nesting -= 1;
        flow
    }

    fn eval_node(&mut self, frame: &mut Frame, expr: &Expr) -> Result<Flow> {
        self.tick(expr.span)?;
        let span = expr.span;
        match &expr.kind {
            ExprKind::Nop => Ok(Flow::Normal(Vec::new())),

            ExprKind::Block(exprs) => {
                let mut values = Vec::new();
                for e in exprs {
                    values = normal!(self.eval_expr(frame, e)?);
                }
                Ok(Flow::Normal(values))
            }

            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let c = value!(self, frame, cond);
                if self.int32(c, cond.span)? != 0 {
                    self.eval_expr(frame, then_branch)
                } else {
                    self.eval_expr(frame, else_branch)
                }
            }

            ExprKind::Loop(body) => self.eval_loop(frame, body),

            ExprKind::Label(body) => {
                frame.enter_label();
                let flow = self.eval_expr(frame, body);
                frame.leave_label();
                Ok(flow?.leave_label())
            }

            ExprKind::Break { depth, args } => {
                if *depth >= frame.labels() {
                    return Err(self.malformed(
                        format!("break {depth} with {} enclosing labels", frame.labels()),
                        span,
                    ));
                }
                let values = normal!(self.eval_args(frame, args)?);
                Ok(Flow::Transfer {
                    depth: *depth,
                    values,
                })
            }

            ExprKind::Switch {
                ty,
                disc,
                arms,
                default,
            } => {
                let d = value!(self, frame, disc);
                if d.ty() != *ty {
                    return Err(self.malformed(
                        format!("switch on {d}, declared {ty}"),
                        disc.span,
                    ));
                }
                self.eval_switch(frame, d, arms, default)
            }

            ExprKind::Call { func, args } => {
                let values = normal!(self.eval_args(frame, args)?);
                Ok(Flow::Normal(self.call(*func, values, span)?))
            }

            ExprKind::Dispatch { table, index, args } => {
                let i = value!(self, frame, index);
                let i = self.int32(i, index.span)? as u32;
                let elems = self
                    .module
                    .tables
                    .get(*table as usize)
                    .ok_or_else(|| self.malformed(format!("unknown table {table}"), span))?;
                let &func = elems.get(i as usize).ok_or_else(|| {
                    self.trap(
                        Trap::UndefinedElement {
                            table: *table,
                            index: i,
                        },
                        index.span,
                    )
                })?;
                let values = normal!(self.eval_args(frame, args)?);
                Ok(Flow::Normal(self.call(func, values, span)?))
            }

            ExprKind::Return(args) => {
                if !frame.in_func() {
                    return Err(self.malformed("return outside of a function", span));
                }
                let values = normal!(self.eval_args(frame, args)?);
                Ok(Flow::Transfer {
                    depth: frame.labels(),
                    values,
                })
            }

            ExprKind::Destruct { locals, expr: e } => {
                let values = normal!(self.eval_expr(frame, e)?);
                if locals.is_empty() {
                    return Ok(Flow::Normal(Vec::new()));
                }
                if values.len() != locals.len() {
                    return Err(self.malformed(
                        format!(
                            "destructuring {} values into {} locals",
                            values.len(),
                            locals.len()
                        ),
                        span,
                    ));
                }
                for (&local, value) in locals.iter().zip(values) {
                    self.set_local(frame, local, value, span)?;
                }
                Ok(Flow::Normal(Vec::new()))
            }

            // ── Variables ────────────────────────────────────────────────
            ExprKind::GetLocal(index) => {
                let v = frame
                    .local(*index)
                    .ok_or_else(|| self.malformed(format!("unknown local {index}"), span))?;
                Ok(Flow::Normal(vec![v]))
            }
            ExprKind::SetLocal(index, e) => {
                let v = value!(self, frame, e);
                self.set_local(frame, *index, v, span)?;
                Ok(Flow::Normal(Vec::new()))
            }
            ExprKind::GetGlobal(index) => {
                let v = self
                    .globals
                    .get(*index as usize)
                    .copied()
                    .ok_or_else(|| self.malformed(format!("unknown global {index}"), span))?;
                Ok(Flow::Normal(vec![v]))
            }
            ExprKind::SetGlobal(index, e) => {
                let v = value!(self, frame, e);
                match self.globals.get_mut(*index as usize) {
                    Some(slot) => *slot = v,
                    None => return Err(self.malformed(format!("unknown global {index}"), span)),
                }
                Ok(Flow::Normal(Vec::new()))
            }

            // ── Memory ───────────────────────────────────────────────────
            ExprKind::GetMemory { memop, addr } => {
                let a = value!(self, frame, addr);
                let a = self.int32(a, addr.span)? as u32;
                let mem_type = memop.mem_type;
                let loaded = match self.memory.as_deref() {
                    Some(memory) => memory.load(a, mem_type),
                    None => Err(no_memory(a, mem_type)),
                };
                let v = loaded.map_err(|t| self.trap(t, span))?;
                Ok(Flow::Normal(vec![v]))
            }
            ExprKind::SetMemory {
                memop,
                addr,
                value,
            } => {
                let a = value!(self, frame, addr);
                let a = self.int32(a, addr.span)? as u32;
                let v = value!(self, frame, value);
                let mem_type = memop.mem_type;
                let stored = match self.memory.as_deref_mut() {
                    Some(memory) => memory.store(a, mem_type, v),
                    None => Err(no_memory(a, mem_type)),
                };
                stored.map_err(|t| self.trap(t, span))?;
                Ok(Flow::Normal(Vec::new()))
            }

            // ── Arithmetic ───────────────────────────────────────────────
            ExprKind::Const(v) => Ok(Flow::Normal(vec![*v])),
            ExprKind::Unary(op, e) => {
                let x = value!(self, frame, e);
                let r = numeric::unary(*op, x).map_err(|t| self.trap(t, span))?;
                Ok(Flow::Normal(vec![r]))
            }
            ExprKind::Binary(op, lhs, rhs) => {
                let x = value!(self, frame, lhs);
                let y = value!(self, frame, rhs);
                let r = numeric::binary(*op, x, y).map_err(|t| self.trap(t, span))?;
                Ok(Flow::Normal(vec![r]))
            }
            ExprKind::Compare(op, lhs, rhs) => {
                let x = value!(self, frame, lhs);
                let y = value!(self, frame, rhs);
                let r = numeric::compare(*op, x, y).map_err(|t| self.trap(t, span))?;
                Ok(Flow::Normal(vec![r]))
            }
            ExprKind::Convert(op, e) => {
                let x = value!(self, frame, e);
                let r = numeric::convert(*op, x).map_err(|t| self.trap(t, span))?;
                Ok(Flow::Normal(vec![r]))
            }
        }
    }

    // ── Control Flow ─────────────────────────────────────────────────────

    fn eval_loop(&mut self, frame: &mut Frame, body: &Expr) -> Result<Flow> {
        frame.enter_label();
        let flow = loop {
            match self.eval_expr(frame, body) {
                Ok(Flow::Normal(_)) => continue,
                other => break other,
            }
        };
        frame.leave_label();
        Ok(flow?.leave_label())
    }

    /// Run the first arm matching `disc` (or `default`), following
    /// fallthru arms in declaration order and into `default` after the last.
    fn eval_switch(
        &mut self,
        frame: &mut Frame,
        disc: Value,
        arms: &[Arm],
        default: &Expr,
    ) -> Result<Flow> {
        if let Some(start) = arms.iter().position(|arm| arm.value.bit_eq(&disc)) {
            for arm in &arms[start..] {
                let values = normal!(self.eval_expr(frame, &arm.expr)?);
                if !arm.fallthru {
                    return Ok(Flow::Normal(values));
                }
            }
        }
        self.eval_expr(frame, default)
    }

    /// Evaluate call or break arguments left to right, one value each.
    fn eval_args(&mut self, frame: &mut Frame, args: &[Expr]) -> Result<Flow> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(value!(self, frame, arg));
        }
        Ok(Flow::Normal(values))
    }

    // ── Helpers ──────────────────────────────────────────────────────────

    /// Consume one unit of gas.
    fn tick(&mut self, span: Span) -> Result<()> {
        self.gas = self.gas.saturating_add(1);
        if self.gas > self.config.gas_limit {
            Err(self.trap(Trap::GasExhausted(self.config.gas_limit), span))
        } else {
            Ok(())
        }
    }

    fn single(&self, values: Vec<Value>, span: Span) -> Result<Value> {
        match values.as_slice() {
            [v] => Ok(*v),
            _ => Err(self.malformed(
                format!("operand produced {} values, expected 1", values.len()),
                span,
            )),
        }
    }

    fn int32(&self, v: Value, span: Span) -> Result<i32> {
        v.as_i32()
            .ok_or_else(|| self.malformed(format!("expected an i32 operand, got {v}"), span))
    }

    fn set_local(&self, frame: &mut Frame, index: LocalIndex, v: Value, span: Span) -> Result<()> {
        if frame.set_local(index, v) {
            Ok(())
        } else {
            Err(self.malformed(format!("unknown local {index}"), span))
        }
    }

    /// Locate a trap at `span` in this module's file.
    pub fn trap(&self, trap: Trap, span: Span) -> Error {
        Error::new(self.module.file.clone(), trap.code(), trap.to_string(), span)
    }

    fn malformed(&self, message: impl Into<String>, span: Span) -> Error {
        self.trap(Trap::Malformed(message.into()), span)
    }
}

fn no_memory(addr: u32, mem_type: wasm_proto_types::MemoryType) -> Trap {
    Trap::MemoryOutOfBounds {
        addr,
        mem_type,
        len: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_proto_types::build::*;
    use wasm_proto_types::{ErrorCode, ValueType};

    fn eval_in(module: &Module, expr: &Expr) -> Result<Vec<Value>> {
        let mut globals: Vec<Value> = module.globals.iter().map(|&t| Value::default_of(t)).collect();
        let mut ev = Evaluator::new(module, &mut globals, None, EvalConfig::default());
        ev.eval_top(expr)
    }

    #[test]
    fn label_consumes_break_zero() {
        let m = module(vec![]);
        let e = label(block(vec![br(0, vec![i32_const(4)]), i32_const(9)]));
        assert_eq!(eval_in(&m, &e), Ok(vec![Value::Int32(4)]));
    }

    #[test]
    fn break_passes_through_inner_labels() {
        let m = module(vec![]);
        let e = label(block(vec![label(br(1, vec![i32_const(1)])), i32_const(2)]));
        assert_eq!(eval_in(&m, &e), Ok(vec![Value::Int32(1)]));
    }

    #[test]
    fn stray_break_is_malformed() {
        let m = module(vec![]);
        let err = eval_in(&m, &br(0, vec![])).unwrap_err();
        assert_eq!(err.code, ErrorCode::MALFORMED);
    }

    #[test]
    fn top_level_return_is_malformed() {
        let m = module(vec![]);
        let err = eval_in(&m, &ret(vec![])).unwrap_err();
        assert_eq!(err.code, ErrorCode::MALFORMED);
    }

    #[test]
    fn operands_are_evaluated_left_to_right() {
        let mut m = module(vec![]);
        m.globals = vec![ValueType::Int32];
        let e = i32_sub(
            block(vec![set_global(0, i32_const(10)), get_global(0)]),
            block(vec![set_global(0, i32_const(3)), get_global(0)]),
        );
        assert_eq!(eval_in(&m, &e), Ok(vec![Value::Int32(7)]));
    }

    #[test]
    fn gas_counts_every_node() {
        let m = module(vec![]);
        let e = i32_add(i32_const(1), i32_const(2));
        let run = |gas_limit| {
            let config = EvalConfig {
                gas_limit,
                ..EvalConfig::default()
            };
            Evaluator::new(&m, &mut [], None, config).eval_top(&e)
        };
        assert_eq!(run(3), Ok(vec![Value::Int32(3)]));
        assert_eq!(run(2).unwrap_err().code, ErrorCode::GAS_EXHAUSTED);
    }

    #[test]
    fn nesting_limit_counts_open_nodes() {
        let m = module(vec![]);
        let e = i32_add(i32_const(1), i32_add(i32_const(2), i32_const(3)));
        let run = |max_nesting| {
            let config = EvalConfig {
                max_nesting,
                ..EvalConfig::default()
            };
            Evaluator::new(&m, &mut [], None, config).eval_top(&e)
        };
        assert_eq!(run(3), Ok(vec![Value::Int32(6)]));
        let err = run(2).unwrap_err();
        assert_eq!(err.code, ErrorCode::CALL_STACK_EXHAUSTED);
        assert_eq!(err.message, "expression nesting exhausted (limit 2)");
    }

    #[test]
    fn access_without_memory_is_out_of_bounds() {
        let m = module(vec![]);
        let err = eval_in(&m, &load(wasm_proto_types::MemoryType::Int8U, i32_const(0))).unwrap_err();
        assert_eq!(err.code, ErrorCode::MEMORY_OUT_OF_BOUNDS);
        assert!(err.message.contains("memory is 0 bytes"), "{}", err.message);
    }
}
