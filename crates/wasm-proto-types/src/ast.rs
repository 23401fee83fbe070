//! AST node types: the desugared instruction tree.
//!
//! Every expression carries a [`Span`] for error reporting. Nodes own their
//! children exclusively; the only non-tree reference is `Break`'s static
//! label depth.

use crate::ops::{BinOp, CvtOp, RelOp, UnOp};
use crate::{MemOp, Span, Value, ValueType};

/// Index into `Module::funcs`.
pub type FuncIndex = u32;
/// Index into `Module::tables`.
pub type TableIndex = u32;
/// Index into a function's local slots (parameters first).
pub type LocalIndex = u32;
/// Index into `Module::globals`.
pub type GlobalIndex = u32;

// ══════════════════════════════════════════════════════════════════════════════
// Expressions
// ══════════════════════════════════════════════════════════════════════════════

/// An expression with its source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// One variant per instruction form.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Nop,
    /// Sequence; the last expression gives the block's result.
    Block(Vec<Expr>),
    If {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    /// Repeats its body until a `Break` leaves it.
    Loop(Box<Expr>),
    /// A break target around its body.
    Label(Box<Expr>),
    /// Leave the `depth`-th enclosing `Label`/`Loop` (0 = innermost),
    /// delivering `args` as its result.
    Break { depth: u32, args: Vec<Expr> },
    Switch {
        /// Declared discriminant type, `i32` or `i64`.
        ty: ValueType,
        disc: Box<Expr>,
        arms: Vec<Arm>,
        default: Box<Expr>,
    },
    Call { func: FuncIndex, args: Vec<Expr> },
    /// Indirect call through `tables[table][index]`.
    Dispatch {
        table: TableIndex,
        index: Box<Expr>,
        args: Vec<Expr>,
    },
    Return(Vec<Expr>),
    /// Bind a multi-value result positionally into locals.
    Destruct { locals: Vec<LocalIndex>, expr: Box<Expr> },
    GetLocal(LocalIndex),
    SetLocal(LocalIndex, Box<Expr>),
    GetGlobal(GlobalIndex),
    SetGlobal(GlobalIndex, Box<Expr>),
    GetMemory { memop: MemOp, addr: Box<Expr> },
    SetMemory {
        memop: MemOp,
        addr: Box<Expr>,
        value: Box<Expr>,
    },
    Const(Value),
    Unary(UnOp, Box<Expr>),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    Compare(RelOp, Box<Expr>, Box<Expr>),
    Convert(CvtOp, Box<Expr>),
}

/// One `switch` case.
#[derive(Debug, Clone, PartialEq)]
pub struct Arm {
    /// Must have the switch's discriminant type.
    pub value: Value,
    pub expr: Expr,
    /// On normal completion continue into the next arm instead of leaving.
    pub fallthru: bool,
    pub span: Span,
}

// ══════════════════════════════════════════════════════════════════════════════
// Declarations
// ══════════════════════════════════════════════════════════════════════════════

/// A function declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Func {
    pub params: Vec<ValueType>,
    pub results: Vec<ValueType>,
    /// Declared locals; they follow the parameters in the local index space.
    pub locals: Vec<ValueType>,
    pub body: Expr,
    pub span: Span,
}

impl Func {
    /// Type of local slot `index`, parameters first.
    pub fn local_type(&self, index: LocalIndex) -> Option<ValueType> {
        let index = index as usize;
        self.params
            .get(index)
            .or_else(|| self.locals.get(index.checked_sub(self.params.len())?))
            .copied()
    }

    /// Number of local slots, parameters included.
    pub fn local_count(&self) -> usize {
        self.params.len() + self.locals.len()
    }
}

/// A complete module.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    /// Name of the source the module came from, used to locate errors.
    pub file: String,
    pub funcs: Vec<Func>,
    pub globals: Vec<ValueType>,
    /// Export `i` exposes `funcs[exports[i]]`.
    pub exports: Vec<FuncIndex>,
    /// Function tables used by `Dispatch`.
    pub tables: Vec<Vec<FuncIndex>>,
    /// Linear memory size in bytes; `None` means no memory.
    pub memory: Option<u32>,
    pub span: Span,
}

impl Module {
    /// An empty module for the given source name.
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            funcs: Vec::new(),
            globals: Vec::new(),
            exports: Vec::new(),
            tables: Vec::new(),
            memory: None,
            span: Span::default(),
        }
    }

    pub fn func(&self, index: FuncIndex) -> Option<&Func> {
        self.funcs.get(index as usize)
    }

    /// The function behind export `index`.
    pub fn exported(&self, index: usize) -> Option<&Func> {
        self.exports.get(index).and_then(|&f| self.func(f))
    }
}
