//! The abstract syntax tree shared by the parser, the scope resolver and any backend.
//!
//! Nodes own their children exclusively and carry the [Span] they were parsed from.
//! After parsing the tree is only ever mutated to attach [ScopeId]s to [Module] and
//! [ClosureBlock] nodes.

pub use ptpy_tokens::spanned::{Span, Spanned};

pub mod block;
pub mod expr;
pub mod module;
pub mod stmt;
pub mod visitor;

pub use block::Block;
pub use expr::{
    AttributeExpr, BinOp, BinaryExpr, BoolExpr, BoolOp, CallExpr, CmpOp, CompareExpr, Constant,
    Expr, ExprKind, IfExpr, UnaryExpr, UnaryOp,
};
pub use module::{Module, ScopeId};
pub use stmt::{
    AssertStmt, AssignStmt, AugAssignStmt, AugOp, ClosureBlock, ExecStmt, ForStmt, IfStmt, Stmt,
    StmtKind, Target, WhileStmt,
};
