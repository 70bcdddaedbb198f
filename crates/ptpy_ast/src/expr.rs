//! Expression nodes

use itertools::Itertools;
use ptpy_tokens::spanned::{Span, Spanned};
use std::fmt::{Display, Formatter};
use strum::AsRefStr;

/// An expression
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// The source line this expression starts on
    pub fn line(&self) -> usize {
        self.span.line()
    }

    /// Gets the name if this expression is a bare name reference
    pub fn as_name(&self) -> Option<&str> {
        match &self.kind {
            ExprKind::Name(name) => Some(name),
            _ => None,
        }
    }
}

impl Spanned for Expr {
    fn span(&self) -> Span {
        self.span
    }
}

/// The kind of an [Expr]
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// A name reference
    Name(String),
    Constant(Constant),
    Attribute(AttributeExpr),
    Binary(BinaryExpr),
    Bool(BoolExpr),
    Unary(UnaryExpr),
    Compare(CompareExpr),
    Call(CallExpr),
    /// `body if test else orelse`
    IfExp(IfExpr),
    List(Vec<Expr>),
    Tuple(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
}

/// A literal value
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Integer(i64),
    Float(f64),
    String(String),
}

impl Display for Constant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Constant::Integer(i) => write!(f, "{i}"),
            Constant::Float(v) => write!(f, "{v:?}"),
            Constant::String(s) => write!(f, "{s:?}"),
        }
    }
}

/// Attribute access, `value.attr`
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeExpr {
    pub value: Box<Expr>,
    pub attr: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub op: BinOp,
    pub right: Box<Expr>,
}

/// Short-circuiting boolean operation
#[derive(Debug, Clone, PartialEq)]
pub struct BoolExpr {
    pub left: Box<Expr>,
    pub op: BoolOp,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Box<Expr>,
}

/// A single comparison. Comparisons never chain, so there is exactly one operator and
/// one right operand per node.
#[derive(Debug, Clone, PartialEq)]
pub struct CompareExpr {
    pub left: Box<Expr>,
    pub op: CmpOp,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfExpr {
    pub test: Box<Expr>,
    pub body: Box<Expr>,
    pub orelse: Box<Expr>,
}

/// A binary operator
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, AsRefStr)]
pub enum BinOp {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Sub,
    #[strum(serialize = "*")]
    Mul,
    #[strum(serialize = "/")]
    Div,
    #[strum(serialize = "%")]
    Mod,
    #[strum(serialize = "**")]
    Pow,
    #[strum(serialize = "<<")]
    LShift,
    #[strum(serialize = ">>")]
    RShift,
    #[strum(serialize = "|")]
    BitOr,
    #[strum(serialize = "^")]
    BitXor,
    #[strum(serialize = "&")]
    BitAnd,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum BoolOp {
    And,
    Or,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, AsRefStr)]
pub enum UnaryOp {
    #[strum(serialize = "+")]
    UAdd,
    #[strum(serialize = "-")]
    USub,
    #[strum(serialize = "~")]
    Invert,
    #[strum(serialize = "not")]
    Not,
}

/// A comparison operator. `is not` and `not in` are single operators.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, AsRefStr)]
pub enum CmpOp {
    #[strum(serialize = "==")]
    Eq,
    #[strum(serialize = "!=")]
    NotEq,
    #[strum(serialize = "<")]
    Lt,
    #[strum(serialize = "<=")]
    LtE,
    #[strum(serialize = ">")]
    Gt,
    #[strum(serialize = ">=")]
    GtE,
    #[strum(serialize = "is")]
    Is,
    #[strum(serialize = "is not")]
    IsNot,
    #[strum(serialize = "in")]
    In,
    #[strum(serialize = "not in")]
    NotIn,
}

macro_rules! display_as_ref {
    ($($ty:ty),*) => {
        $(
        impl Display for $ty {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_ref())
            }
        }
        )*
    };
}

display_as_ref!(BinOp, BoolOp, UnaryOp, CmpOp);

/// Renders an expression in a fully parenthesized form, mostly useful for tests and
/// diagnostics.
impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.kind {
            ExprKind::Name(name) => write!(f, "{name}"),
            ExprKind::Constant(c) => write!(f, "{c}"),
            ExprKind::Attribute(AttributeExpr { value, attr }) => write!(f, "{value}.{attr}"),
            ExprKind::Binary(BinaryExpr { left, op, right }) => {
                write!(f, "({left} {op} {right})")
            }
            ExprKind::Bool(BoolExpr { left, op, right }) => write!(f, "({left} {op} {right})"),
            ExprKind::Unary(UnaryExpr { op: UnaryOp::Not, operand }) => {
                write!(f, "(not {operand})")
            }
            ExprKind::Unary(UnaryExpr { op, operand }) => write!(f, "({op}{operand})"),
            ExprKind::Compare(CompareExpr { left, op, right }) => {
                write!(f, "({left} {op} {right})")
            }
            ExprKind::Call(CallExpr { callee, args }) => {
                write!(f, "{callee}({})", args.iter().join(", "))
            }
            ExprKind::IfExp(IfExpr { test, body, orelse }) => {
                write!(f, "({body} if {test} else {orelse})")
            }
            ExprKind::List(items) => write!(f, "[{}]", items.iter().join(", ")),
            ExprKind::Tuple(items) if items.len() == 1 => write!(f, "({},)", items[0]),
            ExprKind::Tuple(items) => write!(f, "({})", items.iter().join(", ")),
            ExprKind::Dict(items) => write!(
                f,
                "{{{}}}",
                items
                    .iter()
                    .map(|(key, value)| format!("{key}: {value}"))
                    .join(", ")
            ),
        }
    }
}
