use crate::block::Block;
use ptpy_tokens::spanned::{Span, Spanned};

/// The identifier of a resolved scope
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, derive_more::Display)]
#[display(fmt = "scope#{}", _0)]
pub struct ScopeId(pub usize);

/// A complete compilation unit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Module {
    pub body: Block,
    /// Filled in by scope resolution
    pub scope: Option<ScopeId>,
}

impl Module {
    pub fn new(body: Block) -> Self {
        Self { body, scope: None }
    }
}

impl Spanned for Module {
    fn span(&self) -> Span {
        self.body.span
    }
}
