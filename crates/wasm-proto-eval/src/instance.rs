//! ModuleInstance: runtime representation of a module.
//!
//! Owns the module's globals and linear memory and runs exported functions
//! and free-standing expressions against them. State is never rolled back:
//! writes made before a trap remain visible.
//!
//! Evaluation recurses on the host stack, so every `invoke` and `eval` runs
//! on a scoped thread whose stack is sized from [`EvalConfig::stack_size`].

use sha2::{Digest, Sha256};
use tracing::debug;
use wasm_proto_types::ast::{Expr, GlobalIndex, Module};
use wasm_proto_types::{Error, ErrorCode, Result, Span, Value, ValueType};

use crate::config::EvalConfig;
use crate::error::Trap;
use crate::evaluator::Evaluator;
use crate::memory::Memory;

/// A module plus its mutable state.
#[derive(Debug, Clone)]
pub struct ModuleInstance {
    module: Module,
    globals: Vec<Value>,
    memory: Option<Memory>,
    config: EvalConfig,
}

impl ModuleInstance {
    /// Instantiate with default limits: globals are zero of their type and
    /// memory, if declared, is zero-filled.
    pub fn new(module: Module) -> Self {
        Self::with_config(module, EvalConfig::default())
    }

    /// Instantiate with custom limits.
    pub fn with_config(module: Module, config: EvalConfig) -> Self {
        let globals: Vec<Value> = module.globals.iter().map(|&ty| Value::default_of(ty)).collect();
        let memory = module.memory.map(Memory::new);
        debug!(
            file = %module.file,
            funcs = module.funcs.len(),
            globals = globals.len(),
            memory_bytes = memory.as_ref().map_or(0, Memory::size),
            "module instantiated"
        );
        Self {
            module,
            globals,
            memory,
            config,
        }
    }

    pub fn globals(&self) -> &[Value] {
        &self.globals
    }

    pub fn global(&self, index: GlobalIndex) -> Option<Value> {
        self.globals.get(index as usize).copied()
    }

    /// The memory contents, or `None` if the module declares no memory.
    pub fn memory(&self) -> Option<&[u8]> {
        self.memory.as_ref().map(Memory::bytes)
    }

    // ══════════════════════════════════════════════════════════════════════
    // Execution
    // ══════════════════════════════════════════════════════════════════════

    /// Run export `export` with `args`.
    pub fn invoke(&mut self, export: usize, args: &[Value]) -> Result<Vec<Value>> {
        let span = self.module.span;
        let Some(&index) = self.module.exports.get(export) else {
            return Err(self.error(Trap::UndefinedExport(export), span));
        };
        let Some(func) = self.module.func(index) else {
            return Err(self.error(
                Trap::Malformed(format!("export {export} refers to unknown function {index}")),
                span,
            ));
        };

        if args.len() != func.params.len() {
            return Err(self.error(
                Trap::ArgumentMismatch(format!(
                    "export {export} takes {} arguments, got {}",
                    func.params.len(),
                    args.len()
                )),
                func.span,
            ));
        }
        if let Some((i, (arg, ty))) = args
            .iter()
            .zip(&func.params)
            .enumerate()
            .find(|(_, (arg, ty))| arg.ty() != **ty)
        {
            return Err(self.error(
                Trap::ArgumentMismatch(format!("argument {i} is {arg}, expected {ty}")),
                func.span,
            ));
        }

        let call_span = func.span;
        debug!(export, func = index, args = args.len(), "invoke");
        let args = args.to_vec();
        let result = self.run(move |ev| ev.call(index, args, call_span));
        match &result {
            Ok(values) => debug!(export, results = values.len(), "invoke returned"),
            Err(err) => debug!(export, code = %err.code, "invoke trapped"),
        }
        result
    }

    /// Evaluate `expr` to exactly one value.
    pub fn eval(&mut self, expr: &Expr) -> Result<Value> {
        let values = self.eval_multi(expr)?;
        match values.as_slice() {
            [v] => Ok(*v),
            _ => Err(self.error(Trap::ResultArity(values.len()), expr.span)),
        }
    }

    /// Evaluate `expr` in an empty frame, returning all its values.
    pub fn eval_multi(&mut self, expr: &Expr) -> Result<Vec<Value>> {
        self.run(|ev| ev.eval_top(expr))
    }

    /// SHA-256 over the globals (type and bits) and the memory contents.
    ///
    /// Two instances that ran the same calls on the same module agree on
    /// this digest.
    pub fn state_digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update((self.globals.len() as u64).to_le_bytes());
        for global in &self.globals {
            hasher.update([type_tag(global.ty())]);
            hasher.update(global.bits().to_le_bytes());
        }
        match &self.memory {
            Some(memory) => {
                hasher.update([1u8]);
                hasher.update((memory.size() as u64).to_le_bytes());
                hasher.update(memory.bytes());
            }
            None => hasher.update([0u8]),
        }
        hasher.finalize().into()
    }

    // ── Helpers ──────────────────────────────────────────────────────────

    /// Run `f` against a fresh evaluator on a thread with a sized stack.
    fn run<T, F>(&mut self, f: F) -> Result<T>
    where
        T: Send,
        F: FnOnce(&mut Evaluator<'_>) -> Result<T> + Send,
    {
        let stack_size = self.config.stack_size();
        let file = self.module.file.clone();
        let span = self.module.span;
        let mut evaluator = Evaluator::new(
            &self.module,
            &mut self.globals,
            self.memory.as_mut(),
            self.config,
        );
        std::thread::scope(|scope| {
            let spawned = std::thread::Builder::new()
                .name("wasm-proto-eval".into())
                .stack_size(stack_size)
                .spawn_scoped(scope, move || f(&mut evaluator));
            match spawned {
                Ok(handle) => handle
                    .join()
                    .unwrap_or_else(|payload| std::panic::resume_unwind(payload)),
                Err(err) => Err(Error::new(
                    file,
                    ErrorCode::CALL_STACK_EXHAUSTED,
                    format!("cannot reserve {stack_size} bytes of evaluation stack: {err}"),
                    span,
                )),
            }
        })
    }

    fn error(&self, trap: Trap, span: Span) -> Error {
        Error::new(self.module.file.clone(), trap.code(), trap.to_string(), span)
    }
}

fn type_tag(ty: ValueType) -> u8 {
    match ty {
        ValueType::Int32 => 0,
        ValueType::Int64 => 1,
        ValueType::Float32 => 2,
        ValueType::Float64 => 3,
    }
}
