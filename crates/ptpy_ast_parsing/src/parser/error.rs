use crate::lexer::{IndentationError, LexingError, TokenizeError};
use ptpy_tokens::spanned::Span;
use ptpy_tokens::token::Token;
use ptpy_tokens::SpannedError;
use std::fmt::{Display, Formatter};

/// Represents an error occurring during parsing
#[derive(Debug, thiserror::Error)]
pub struct SyntaxError {
    pub kind: SpannedError<ErrorKind, SyntaxError>,
    /// The productions that were still being built when the error occurred, outermost
    /// first
    pub non_terminal_stack: Option<Vec<&'static str>>,
}

impl SyntaxError {
    /// Creates a new error
    pub fn new(
        kind: ErrorKind,
        location: impl Into<Option<Span>>,
        cause: impl Into<Option<Self>>,
        non_terminals: impl Into<Option<Vec<&'static str>>>,
    ) -> Self {
        Self {
            kind: SpannedError::new(kind, location, cause),
            non_terminal_stack: non_terminals.into(),
        }
    }

    /// Gets the kind of this error
    pub fn error_kind(&self) -> &ErrorKind {
        self.kind.error()
    }

    /// Gets where this error occurred, if known
    pub fn location(&self) -> Option<Span> {
        self.kind.location()
    }
}

impl Display for SyntaxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "syntax error: {}", self.kind)?;
        if let Some(non_terminals) = &self.non_terminal_stack {
            writeln!(f, "non terminal stack:")?;
            for (idx, non_terminal) in non_terminals.iter().enumerate() {
                writeln!(f, "  {}: {}", idx, non_terminal)?;
            }
        }

        Ok(())
    }
}

macro_rules! syntax_error_from {
    ($($ty:ty),*) => {
        $(
        impl From<$ty> for SyntaxError {
            fn from(value: $ty) -> Self {
                Self::new(ErrorKind::from(value), None, None, None)
            }
        }
        )*
    };
}

syntax_error_from!(ErrorKind, LexingError, IndentationError, TokenizeError);

/// [SyntaxError] kind
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("expected one of {}, got {}", .0.join(", "), found_to_string(.1))]
    ExpectedToken(Vec<String>, Option<Token>),
    #[error("unexpected token: {0}")]
    UnexpectedToken(Token),
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("cannot assign to {0}")]
    InvalidAssignmentTarget(&'static str),
    #[error("too deeply nested, at most {0} productions may be open")]
    TooDeeplyNested(usize),
    #[error("attempting to continue parsing but parser was poisoned")]
    ParserPoisoned,
    #[error(transparent)]
    Lex(#[from] LexingError),
    #[error(transparent)]
    Indent(#[from] IndentationError),
}

fn found_to_string(found: &Option<Token>) -> String {
    match found {
        None => "end of input".to_string(),
        Some(token) => token.to_string(),
    }
}

impl ErrorKind {
    pub fn expected_token(
        token_kinds: impl IntoIterator<Item = impl AsRef<str>>,
        found: impl Into<Option<Token>>,
    ) -> Self {
        Self::ExpectedToken(
            token_kinds
                .into_iter()
                .map(|s| s.as_ref().to_string())
                .collect(),
            found.into(),
        )
    }
}

impl From<TokenizeError> for ErrorKind {
    fn from(value: TokenizeError) -> Self {
        match value {
            TokenizeError::Lex(e) => ErrorKind::Lex(e),
            TokenizeError::Indent(e) => ErrorKind::Indent(e),
        }
    }
}

pub type SyntaxResult<T = ()> = Result<T, SyntaxError>;
