//! wasm-proto validator.
//!
//! ```text
//! Module → check_module → Ok(()) | Err(located Error)
//! ```
//!
//! Checking is expected-type-driven: every expression is verified against
//! the result types its context requires, and the first mismatch rejects the
//! whole module. A module is never evaluated unless this pass succeeds.

pub mod checker;
pub mod env;
pub mod ty;

pub use checker::TypeChecker;
pub use ty::{checks, FuncType, ResultType};

use wasm_proto_types::ast::Module;
use wasm_proto_types::Result;

/// Validate a module.
pub fn check_module(module: &Module) -> Result<()> {
    let result = TypeChecker::new(module).check();
    match &result {
        Ok(()) => tracing::debug!(
            file = %module.file,
            funcs = module.funcs.len(),
            "module validated"
        ),
        Err(err) => tracing::debug!(
            file = %module.file,
            code = %err.code,
            "module rejected: {}",
            err.message
        ),
    }
    result
}
