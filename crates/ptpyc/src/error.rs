//! A ptpy front end error

use ptpy_ast_parsing::parser::SyntaxError;
use ptpy_tokens::spanned::Span;
use ptpy_tokens::SpannedError;
use thiserror::Error;

/// An error raised by strict name resolution
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("name {name:?} read in {scope} is never bound and is not a builtin")]
    UnresolvedName { name: String, scope: String },
}

/// The kind of error
#[derive(Debug, Error)]
pub enum PtpyCErrorKind {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("backend failed: {0}")]
    Backend(Box<dyn std::error::Error + Send + Sync>),
}

/// An error occurred while compiling a ptpy module
#[derive(Debug, Error)]
#[error(transparent)]
pub struct PtpyCError(#[from] SpannedError<PtpyCErrorKind, PtpyCError>);

impl PtpyCError {
    /// Creates a new [PtpyCError] using a quick constructor
    #[inline]
    pub fn new(
        error: impl Into<PtpyCErrorKind>,
        location: impl Into<Option<Span>>,
        caused_by: impl Into<Option<PtpyCError>>,
    ) -> Self {
        Self(SpannedError::new(error.into(), location.into(), caused_by.into()))
    }

    /// Gets the kind of this error
    pub fn kind(&self) -> &PtpyCErrorKind {
        self.0.error()
    }

    /// Gets where this error occurred, if known
    pub fn location(&self) -> Option<Span> {
        match self.kind() {
            PtpyCErrorKind::Syntax(syntax) => self.0.location().or(syntax.location()),
            _ => self.0.location(),
        }
    }
}

impl<T> From<T> for PtpyCError
where
    PtpyCErrorKind: From<T>,
{
    fn from(value: T) -> Self {
        Self(SpannedError::new(PtpyCErrorKind::from(value), None, None))
    }
}

/// A type alias for general results in ptpyc
pub type PtpyCResult<T> = Result<T, PtpyCError>;
