//! Script driver: runs a sequence of define/invoke commands.
//!
//! A `Define` validates its module and makes it the current instance; an
//! `Invoke` calls an export of the current instance. Each command succeeds
//! or fails on its own, so one failure does not stop later commands.

use tracing::debug;
use wasm_proto_types::ast::{Expr, Module};
use wasm_proto_types::{Error, ErrorCode, Result, Span, Value};

use crate::config::EvalConfig;
use crate::instance::ModuleInstance;

/// One script step.
#[derive(Debug, Clone)]
pub enum Command {
    /// Validate and instantiate a module, replacing the current one.
    Define(Module),
    /// Call export `export`; each argument is evaluated to a single value
    /// against the current instance first.
    Invoke { export: usize, args: Vec<Expr> },
}

/// The result of a successful command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Defined,
    Returned(Vec<Value>),
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Defined => write!(f, "defined"),
            Outcome::Returned(values) => {
                let parts: Vec<String> = values.iter().map(ToString::to_string).collect();
                write!(f, "[{}]", parts.join(", "))
            }
        }
    }
}

/// Holds the current module instance between commands.
#[derive(Debug, Default)]
pub struct Script {
    current: Option<ModuleInstance>,
    config: EvalConfig,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    /// A script whose instances use `config`.
    pub fn with_config(config: EvalConfig) -> Self {
        Self {
            current: None,
            config,
        }
    }

    /// The instance most recently defined successfully.
    pub fn current(&self) -> Option<&ModuleInstance> {
        self.current.as_ref()
    }

    /// Run one command.
    pub fn run(&mut self, command: &Command) -> Result<Outcome> {
        match command {
            Command::Define(module) => {
                debug!(file = %module.file, "define");
                if let Err(err) = wasm_proto_check::check_module(module) {
                    debug!(code = %err.code, "define rejected");
                    return Err(err);
                }
                self.current = Some(ModuleInstance::with_config(module.clone(), self.config));
                Ok(Outcome::Defined)
            }
            Command::Invoke { export, args } => {
                debug!(export, args = args.len(), "invoke command");
                let Some(instance) = self.current.as_mut() else {
                    return Err(Error::new(
                        "<script>",
                        ErrorCode::UNDEFINED_EXPORT,
                        "no module defined",
                        args.first().map_or_else(Span::default, |arg| arg.span),
                    ));
                };
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(instance.eval(arg)?);
                }
                instance.invoke(*export, &values).map(Outcome::Returned)
            }
        }
    }

    /// Run every command, collecting one result per command.
    pub fn run_all(&mut self, commands: &[Command]) -> Vec<Result<Outcome>> {
        commands.iter().map(|command| self.run(command)).collect()
    }
}
