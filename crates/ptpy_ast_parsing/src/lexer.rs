//! Responsible with converting source text into a token stream

use crate::lexer::token_parsing::{
    parse_comment, parse_insignificant, parse_lexeme, parse_line_breaks, parse_spaces, Lexeme,
};
use nom::Finish;
use ptpy_tokens::keywords::Dialect;
use ptpy_tokens::spanned::Span;
use ptpy_tokens::token::{Token, TokenKind};
use std::str::FromStr;
use thiserror::Error;
use tracing::trace;

pub mod indentation;
mod token_parsing;

pub use indentation::{IndentFilter, IndentTagger, IndentationError};

/// Converts source text into a lazy stream of tokens, terminated by exactly one
/// [TokenKind::EndMarker].
///
/// Line breaks and line-start whitespace are only emitted while no bracket is open.
#[derive(Debug)]
pub struct Lexer<'src> {
    src: &'src str,
    dialect: Dialect,
    offset: usize,
    line: usize,
    column: usize,
    paren_depth: usize,
    bracket_depth: usize,
    brace_depth: usize,
    at_line_start: bool,
    finished: bool,
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer using the native keyword table
    pub fn new(src: &'src str) -> Self {
        Self::with_dialect(src, Dialect::default())
    }

    /// Creates a new lexer using a given keyword table
    pub fn with_dialect(src: &'src str, dialect: Dialect) -> Self {
        Self {
            src,
            dialect,
            offset: 0,
            line: 1,
            column: 0,
            paren_depth: 0,
            bracket_depth: 0,
            brace_depth: 0,
            at_line_start: true,
            finished: false,
        }
    }

    /// Gets the dialect used to look up reserved words
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    fn nested(&self) -> bool {
        self.paren_depth > 0 || self.bracket_depth > 0 || self.brace_depth > 0
    }

    fn rest(&self) -> &'src str {
        &self.src[self.offset..]
    }

    /// Moves past `len` bytes, returning the span covered
    fn advance(&mut self, len: usize) -> Span {
        let span = Span::new(self.offset, len, self.line, self.column);
        for c in self.src[self.offset..self.offset + len].chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 0;
            } else {
                self.column += 1;
            }
        }
        self.offset += len;
        span
    }

    fn illegal_char(&self) -> LexingError {
        LexingError::IllegalChar {
            char: self.rest().chars().next().unwrap_or('\0'),
            line: self.line,
            column: self.column,
        }
    }

    /// The length of the input `recognizer` matches at the current offset, or zero when it
    /// does not match
    fn recognized_len<F>(&self, mut recognizer: F) -> usize
    where
        F: FnMut(&'src str) -> token_parsing::Result<'src, &'src str>,
    {
        recognizer(self.rest())
            .map(|(_, matched)| matched.len())
            .unwrap_or(0)
    }

    fn next_token(&mut self) -> LexResult<Option<Token>> {
        loop {
            if self.finished {
                return Ok(None);
            }

            if self.at_line_start && !self.nested() {
                let width = self.recognized_len(parse_spaces);
                if width > 0 {
                    let span = self.advance(width);
                    // comment only lines are blank lines
                    if self.recognized_len(parse_comment) == 0 {
                        self.at_line_start = false;
                        return Ok(Some(Token::new(span, TokenKind::Whitespace(width))));
                    }
                }
            }
            let skipped = self.recognized_len(parse_insignificant);
            self.advance(skipped);

            if self.rest().is_empty() {
                self.finished = true;
                let span = Span::new(self.offset, 0, self.line, self.column);
                return Ok(Some(Token::new(span, TokenKind::EndMarker)));
            }

            let breaks = self.recognized_len(parse_line_breaks);
            if breaks > 0 {
                let span = self.advance(breaks);
                if self.nested() {
                    continue;
                }
                self.at_line_start = true;
                return Ok(Some(Token::new(span, TokenKind::Newline)));
            }

            let (rest, lexeme) = parse_lexeme(self.rest())
                .finish()
                .map_err(|_| self.illegal_char())?;
            let len = self.rest().len() - rest.len();
            let (line, column) = (self.line, self.column);
            let kind = match lexeme {
                Lexeme::Word(word) => self
                    .dialect
                    .keyword(word)
                    .unwrap_or_else(|| TokenKind::Name(word.to_string())),
                Lexeme::Integer(digits) => TokenKind::Integer(
                    i64::from_str(digits).map_err(|_| LexingError::InvalidLiteral {
                        lexeme: digits.to_string(),
                        line,
                        column,
                    })?,
                ),
                Lexeme::Float(digits) => TokenKind::Float(f64::from_str(digits).map_err(|_| {
                    LexingError::InvalidLiteral {
                        lexeme: digits.to_string(),
                        line,
                        column,
                    }
                })?),
                Lexeme::String(s) => TokenKind::String(s),
                Lexeme::Fixed(kind) => kind,
            };
            self.track_nesting(&kind);
            let span = self.advance(len);
            self.at_line_start = false;
            return Ok(Some(Token::new(span, kind)));
        }
    }

    fn track_nesting(&mut self, kind: &TokenKind) {
        match kind {
            TokenKind::LParen => self.paren_depth += 1,
            TokenKind::RParen => self.paren_depth = self.paren_depth.saturating_sub(1),
            TokenKind::LBracket => self.bracket_depth += 1,
            TokenKind::RBracket => self.bracket_depth = self.bracket_depth.saturating_sub(1),
            TokenKind::LCurly => self.brace_depth += 1,
            TokenKind::RCurly => self.brace_depth = self.brace_depth.saturating_sub(1),
            _ => {}
        }
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Result<Token, LexingError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            Ok(option) => {
                if let Some(token) = &option {
                    trace!("lexed {token}");
                }
                option.map(Ok)
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

type LexResult<T> = Result<T, LexingError>;

/// An error occurred while lexing
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexingError {
    #[error("illegal character {char:?} at {line}:{column}")]
    IllegalChar {
        char: char,
        line: usize,
        column: usize,
    },
    #[error("invalid numeric literal {lexeme:?} at {line}:{column}")]
    InvalidLiteral {
        lexeme: String,
        line: usize,
        column: usize,
    },
}

impl LexingError {
    /// The position of the offending input as `(line, column)`
    pub fn position(&self) -> (usize, usize) {
        match self {
            LexingError::IllegalChar { line, column, .. }
            | LexingError::InvalidLiteral { line, column, .. } => (*line, *column),
        }
    }
}

/// Any error produced while turning source text into a filtered token stream
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TokenizeError {
    #[error(transparent)]
    Lex(#[from] LexingError),
    #[error(transparent)]
    Indent(#[from] IndentationError),
}

/// The fully filtered token stream the parser consumes
pub type TokenStream<'src> = IndentFilter<IndentTagger<Lexer<'src>>>;

/// Creates the fully filtered token stream for some source text
pub fn token_stream(src: &str, dialect: Dialect) -> TokenStream<'_> {
    IndentFilter::new(IndentTagger::new(Lexer::with_dialect(src, dialect)))
}
