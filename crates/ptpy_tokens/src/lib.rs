//! Tokens, spans and located errors used throughout the ptpy front end

use crate::spanned::Span;
use std::fmt::{Display, Formatter};

pub mod keywords;
pub mod spanned;
pub mod token;

/// An error with a location
#[derive(Debug, thiserror::Error)]
pub struct SpannedError<E, C> {
    error: E,
    location: Option<Span>,
    cause: Option<Box<C>>,
}

impl<E, C> SpannedError<E, C> {
    pub fn new(error: E, location: impl Into<Option<Span>>, cause: impl Into<Option<C>>) -> Self {
        Self {
            error,
            location: location.into(),
            cause: cause.into().map(Box::new),
        }
    }

    /// Gets the error itself
    pub fn error(&self) -> &E {
        &self.error
    }

    /// Gets the location of the error, if known
    pub fn location(&self) -> Option<Span> {
        self.location
    }

    /// Gets the error that caused this one, if any
    pub fn cause(&self) -> Option<&C> {
        self.cause.as_deref()
    }

    /// Consumes this error, returning only the error kind
    pub fn into_error(self) -> E {
        self.error
    }
}

impl<E: Display, C: Display> Display for SpannedError<E, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.error)?;
        if let Some(location) = &self.location {
            writeln!(f, "  -> {}:{}", location.line(), location.column())?;
        }
        if let Some(cause) = &self.cause {
            write!(f, "caused by: ")?;
            cause.fmt(f)?;
        }
        Ok(())
    }
}
