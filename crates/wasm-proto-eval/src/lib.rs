//! wasm-proto tree-walking evaluator: reference semantics.
//!
//! Runs validated modules directly from the AST. A [`ModuleInstance`] owns a
//! module's globals and memory; [`Script`] sequences define/invoke commands.

pub mod config;
pub mod env;
pub mod error;
pub mod evaluator;
pub mod instance;
pub mod memory;
pub mod numeric;
pub mod script;

pub use config::EvalConfig;
pub use error::{Trap, TrapResult};
pub use evaluator::{Evaluator, Flow};
pub use instance::ModuleInstance;
pub use script::{Command, Outcome, Script};
