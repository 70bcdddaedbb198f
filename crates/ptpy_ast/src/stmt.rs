//! Statement nodes

use crate::block::Block;
use crate::expr::{AttributeExpr, BinOp, Expr};
use crate::module::ScopeId;
use ptpy_tokens::spanned::{Span, Spanned};
use std::fmt::{Display, Formatter};

/// A statement
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// The source line this statement starts on
    pub fn line(&self) -> usize {
        self.span.line()
    }
}

impl Spanned for Stmt {
    fn span(&self) -> Span {
        self.span
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// An expression evaluated for its side effects
    Expr(Expr),
    Assign(AssignStmt),
    AugAssign(AugAssignStmt),
    If(IfStmt),
    While(WhileStmt),
    For(ForStmt),
    Break,
    Continue,
    Pass,
    Assert(AssertStmt),
    /// `global a, b`
    Global(Vec<String>),
    Exec(ExecStmt),
    ClosureBlock(ClosureBlock),
}

/// Something that can be assigned to
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Name(String),
    Attribute(AttributeExpr),
}

impl Target {
    /// Gets the bound name, if this target binds one in the current scope
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Target::Name(name) => Some(name),
            Target::Attribute(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub target: Target,
    pub value: Expr,
}

/// `target op= value`
#[derive(Debug, Clone, PartialEq)]
pub struct AugAssignStmt {
    pub target: Target,
    pub op: AugOp,
    pub value: Expr,
}

/// The operator of an augmented assignment
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AugOp {
    /// `op=` for a binary operator
    Bin(BinOp),
    /// `~=`, which has no binary counterpart
    Invert,
}

impl Display for AugOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AugOp::Bin(op) => write!(f, "{op}="),
            AugOp::Invert => write!(f, "~="),
        }
    }
}

/// An if statement with its `elif` branches folded into `branches`, in source order
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub branches: Vec<(Expr, Block)>,
    pub orelse: Option<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStmt {
    pub test: Expr,
    pub body: Block,
    pub orelse: Option<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub target: String,
    pub iter: Expr,
    pub body: Block,
    pub orelse: Option<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssertStmt {
    pub test: Expr,
    pub msg: Option<Expr>,
}

/// Runs the code value bound to `code` inside `namespace`
#[derive(Debug, Clone, PartialEq)]
pub struct ExecStmt {
    pub code: String,
    pub namespace: Expr,
}

/// Binds `name` to a value built from `body`.
///
/// A lazy block binds an unevaluated, deferred form of its body, an eager one binds the
/// value its body constructs. When a `wrapper` is present it is called with the name as a
/// string and the freshly bound value, and its result replaces the binding.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosureBlock {
    pub name: String,
    pub body: Block,
    pub wrapper: Option<Expr>,
    pub lazy: bool,
    /// Filled in by scope resolution
    pub scope: Option<ScopeId>,
    pub span: Span,
}

impl Spanned for ClosureBlock {
    fn span(&self) -> Span {
        self.span
    }
}
