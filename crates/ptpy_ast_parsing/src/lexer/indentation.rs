//! Turns leading whitespace into explicit block delimiters.
//!
//! This happens in two stages. The [IndentTagger] marks every token with whether it is
//! the first token of its line and whether it must open a new block. The [IndentFilter]
//! then keeps a stack of indentation widths and replaces whitespace with synthetic
//! [TokenKind::BlockStart] and [TokenKind::BlockEnd] tokens, so the grammar never has to
//! look at whitespace.

use crate::lexer::{LexingError, TokenizeError};
use ptpy_tokens::spanned::{Span, Spanned};
use ptpy_tokens::token::{Token, TokenKind};
use thiserror::Error;
use tracing::trace;

/// An error in the indentation structure of the source
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndentationError {
    #[error("expected an indented block at {line}:{column}")]
    ExpectedIndentedBlock { line: usize, column: usize },
    #[error("unexpected indent at {line}:{column}")]
    UnexpectedIndent { line: usize, column: usize },
    #[error("inconsistent indentation at {line}:{column}")]
    InconsistentIndentation { line: usize, column: usize },
}

impl IndentationError {
    /// The position of the offending token as `(line, column)`
    pub fn position(&self) -> (usize, usize) {
        match self {
            IndentationError::ExpectedIndentedBlock { line, column }
            | IndentationError::UnexpectedIndent { line, column }
            | IndentationError::InconsistentIndentation { line, column } => (*line, *column),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
enum IndentState {
    #[default]
    NoIndent,
    /// a colon was seen, the statement may continue inline
    MayIndent,
    /// a colon and then a line break were seen, the next line opens a block
    MustIndent,
}

/// Tags tokens with `at_line_start` and `must_indent`
#[derive(Debug)]
pub struct IndentTagger<I> {
    tokens: I,
    state: IndentState,
    at_line_start: bool,
}

impl<I> IndentTagger<I>
where
    I: Iterator<Item = Result<Token, LexingError>>,
{
    pub fn new(tokens: I) -> Self {
        Self {
            tokens,
            state: IndentState::NoIndent,
            at_line_start: true,
        }
    }

    fn tag(&mut self, token: &mut Token) {
        token.set_at_line_start(self.at_line_start);
        match token.kind() {
            TokenKind::Colon => {
                self.at_line_start = false;
                self.state = IndentState::MayIndent;
            }
            TokenKind::Newline => {
                self.at_line_start = true;
                if self.state == IndentState::MayIndent {
                    self.state = IndentState::MustIndent;
                }
            }
            TokenKind::Whitespace(_) => {
                self.at_line_start = true;
            }
            _ => {
                token.set_must_indent(self.state == IndentState::MustIndent);
                self.at_line_start = false;
                self.state = IndentState::NoIndent;
            }
        }
    }
}

impl<I> Iterator for IndentTagger<I>
where
    I: Iterator<Item = Result<Token, LexingError>>,
{
    type Item = Result<Token, LexingError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut token = match self.tokens.next()? {
            Ok(token) => token,
            Err(e) => return Some(Err(e)),
        };
        self.tag(&mut token);
        Some(Ok(token))
    }
}

/// Synthesizes block delimiters from tagged tokens.
///
/// Whitespace tokens are never forwarded and blank lines are dropped. The stream always
/// finishes with a line break (synthesized if the source lacks one), the block ends for
/// every still open block, then exactly one end marker.
#[derive(Debug)]
pub struct IndentFilter<I> {
    tokens: I,
    levels: Vec<usize>,
    depth: usize,
    prev_was_ws: bool,
    /// whether the last forwarded token was a real token that still needs a line break
    needs_newline: bool,
    /// a token held back while synthetic block ends are emitted ahead of it
    pending: Option<Token>,
    pending_block_ends: usize,
    finished: bool,
}

impl<I> IndentFilter<I>
where
    I: Iterator<Item = Result<Token, LexingError>>,
{
    pub fn new(tokens: I) -> Self {
        Self {
            tokens,
            levels: vec![0],
            depth: 0,
            prev_was_ws: false,
            needs_newline: false,
            pending: None,
            pending_block_ends: 0,
            finished: false,
        }
    }

    /// The current stack of indentation widths, outermost first
    pub fn levels(&self) -> &[usize] {
        &self.levels
    }

    fn fail(&mut self, error: impl Into<TokenizeError>) -> Option<Result<Token, TokenizeError>> {
        self.finished = true;
        self.pending = None;
        self.pending_block_ends = 0;
        Some(Err(error.into()))
    }

    fn forward(&mut self, token: Token) -> Option<Result<Token, TokenizeError>> {
        match token.kind() {
            TokenKind::Newline => self.needs_newline = false,
            kind if !kind.is_synthetic() && *kind != TokenKind::EndMarker => {
                self.needs_newline = true
            }
            _ => {}
        }
        trace!("forwarding {token}");
        Some(Ok(token))
    }

    fn synthetic(kind: TokenKind, at: &Token) -> Token {
        let span = at.span();
        Token::new(Span::new(span.offset(), 0, span.line(), span.column()), kind)
    }

    fn end_of_input(&mut self, end_marker: Token) -> Option<Result<Token, TokenizeError>> {
        if end_marker.must_indent() {
            return self.fail(IndentationError::ExpectedIndentedBlock {
                line: end_marker.line(),
                column: end_marker.column(),
            });
        }
        self.finished = true;
        self.pending_block_ends = self.levels.len() - 1;
        self.levels.truncate(1);
        let newline = Self::synthetic(TokenKind::Newline, &end_marker);
        self.pending = Some(end_marker);
        if self.needs_newline {
            self.forward(newline)
        } else {
            self.next()
        }
    }

    /// Checks the indentation of the first real token on a line
    fn check_line_start(&mut self, token: Token) -> Option<Result<Token, TokenizeError>> {
        let top = self.levels.last().copied().unwrap_or(0);
        if token.must_indent() {
            if self.depth <= top {
                return self.fail(IndentationError::ExpectedIndentedBlock {
                    line: token.line(),
                    column: token.column(),
                });
            }
            trace!("opening block at depth {}", self.depth);
            self.levels.push(self.depth);
            let block_start = Self::synthetic(TokenKind::BlockStart, &token);
            self.pending = Some(token);
            return self.forward(block_start);
        }
        if !token.at_line_start() || self.depth == top {
            return self.forward(token);
        }
        if self.depth > top {
            return self.fail(IndentationError::UnexpectedIndent {
                line: token.line(),
                column: token.column(),
            });
        }
        let Some(index) = self.levels.iter().position(|&level| level == self.depth) else {
            return self.fail(IndentationError::InconsistentIndentation {
                line: token.line(),
                column: token.column(),
            });
        };
        self.pending_block_ends = self.levels.len() - 1 - index;
        self.levels.truncate(index + 1);
        trace!(
            "closing {} block(s) back to depth {}",
            self.pending_block_ends,
            self.depth
        );
        self.pending = Some(token);
        self.next()
    }
}

impl<I> Iterator for IndentFilter<I>
where
    I: Iterator<Item = Result<Token, LexingError>>,
{
    type Item = Result<Token, TokenizeError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.pending_block_ends > 0 {
                self.pending_block_ends -= 1;
                let at = self.pending.as_ref()?;
                let block_end = Self::synthetic(TokenKind::BlockEnd, at);
                return self.forward(block_end);
            }
            if let Some(token) = self.pending.take() {
                return self.forward(token);
            }
            if self.finished {
                return None;
            }

            let token = match self.tokens.next() {
                Some(Ok(token)) => token,
                Some(Err(e)) => return self.fail(e),
                None => Token::new(Span::default(), TokenKind::EndMarker),
            };
            match token.kind() {
                TokenKind::Whitespace(width) => {
                    self.depth = *width;
                    self.prev_was_ws = true;
                }
                TokenKind::Newline => {
                    self.depth = 0;
                    let blank = self.prev_was_ws || token.at_line_start();
                    self.prev_was_ws = false;
                    if !blank {
                        return self.forward(token);
                    }
                }
                TokenKind::EndMarker => return self.end_of_input(token),
                _ => {
                    self.prev_was_ws = false;
                    return self.check_line_start(token);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{token_stream, Lexer};
    use ptpy_tokens::keywords::Dialect;
    use test_log::test;
    use TokenKind::*;

    fn filtered(src: &str) -> Result<Vec<TokenKind>, TokenizeError> {
        token_stream(src, Dialect::English)
            .map(|token| token.map(Token::into_kind))
            .collect()
    }

    fn name(n: &str) -> TokenKind {
        Name(n.to_string())
    }

    #[test]
    fn test_if_else_blocks() {
        let tokens = filtered("if a < b:\n    c = b\nelse:\n    c = d\n").unwrap();
        assert_eq!(
            tokens,
            [
                If,
                name("a"),
                Lt,
                name("b"),
                Colon,
                Newline,
                BlockStart,
                name("c"),
                Assign,
                name("b"),
                Newline,
                BlockEnd,
                Else,
                Colon,
                Newline,
                BlockStart,
                name("c"),
                Assign,
                name("d"),
                Newline,
                BlockEnd,
                EndMarker,
            ]
        );
    }

    #[test]
    fn test_tagging() {
        let tokens = IndentTagger::new(Lexer::with_dialect("if x:\n  y\nz", Dialect::English))
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        let y = tokens.iter().find(|t| t.kind() == &name("y")).unwrap();
        assert!(y.must_indent());
        assert!(y.at_line_start());
        let x = tokens.iter().find(|t| t.kind() == &name("x")).unwrap();
        assert!(!x.must_indent());
        assert!(!x.at_line_start());
        let z = tokens.iter().find(|t| t.kind() == &name("z")).unwrap();
        assert!(!z.must_indent());
        assert!(z.at_line_start());
    }

    #[test]
    fn test_inline_suite_does_not_indent() {
        let tokens = filtered("if x: y\nz\n").unwrap();
        assert!(!tokens.contains(&BlockStart));
    }

    #[test]
    fn test_blocks_balance() {
        let sources = [
            "if a:\n  if b:\n    c\n  d\ne\n",
            "while a:\n  while b:\n    while c:\n      d\n",
            "x\n\n   \n# comment\n",
            "def f:\n  def g:\n    pass\n\n  h = 1\n",
        ];
        for src in sources {
            let tokens = filtered(src).unwrap_or_else(|e| panic!("{src:?}: {e}"));
            let starts = tokens.iter().filter(|k| **k == BlockStart).count();
            let ends = tokens.iter().filter(|k| **k == BlockEnd).count();
            assert_eq!(starts, ends, "unbalanced blocks for {src:?}: {tokens:?}");
            assert_eq!(tokens.iter().filter(|k| **k == EndMarker).count(), 1);
            assert_eq!(tokens.last(), Some(&EndMarker));
        }
    }

    #[test]
    fn test_blank_lines_are_dropped() {
        let tokens = filtered("a\n\n    \n  # comment\nb\n").unwrap();
        assert_eq!(tokens, [name("a"), Newline, name("b"), Newline, EndMarker]);
    }

    #[test]
    fn test_missing_final_newline_is_synthesized() {
        let tokens = filtered("if a:\n  b").unwrap();
        assert_eq!(
            &tokens[tokens.len() - 4..],
            [name("b"), Newline, BlockEnd, EndMarker]
        );
        assert_eq!(filtered("1").unwrap(), [Integer(1), Newline, EndMarker]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(filtered("").unwrap(), [EndMarker]);
        assert_eq!(filtered("\n\n").unwrap(), [EndMarker]);
    }

    #[test]
    fn test_unexpected_indent() {
        let error = filtered("a\n  b\n").unwrap_err();
        assert_eq!(
            error,
            TokenizeError::Indent(IndentationError::UnexpectedIndent { line: 2, column: 2 })
        );
    }

    #[test]
    fn test_first_line_indented() {
        assert!(matches!(
            filtered("  a\n"),
            Err(TokenizeError::Indent(IndentationError::UnexpectedIndent { .. }))
        ));
    }

    #[test]
    fn test_inconsistent_dedent() {
        let error = filtered("if a:\n    b\n  c\n").unwrap_err();
        assert_eq!(
            error,
            TokenizeError::Indent(IndentationError::InconsistentIndentation { line: 3, column: 2 })
        );
    }

    #[test]
    fn test_expected_indented_block() {
        assert!(matches!(
            filtered("if a:\nb\n"),
            Err(TokenizeError::Indent(IndentationError::ExpectedIndentedBlock { line: 2, .. }))
        ));
    }

    #[test]
    fn test_expected_indented_block_at_end_of_input() {
        assert!(matches!(
            filtered("if a:\n"),
            Err(TokenizeError::Indent(IndentationError::ExpectedIndentedBlock { .. }))
        ));
    }

    #[test]
    fn test_dedent_several_levels() {
        let tokens = filtered("if a:\n  if b:\n    c\nd\n").unwrap();
        let d = tokens.iter().position(|k| *k == name("d")).unwrap();
        assert_eq!(&tokens[d - 2..d], [BlockEnd, BlockEnd]);
    }

    #[test]
    fn test_levels_track_open_blocks() {
        let mut stream = token_stream("if a:\n  if b:\n    c\n", Dialect::English);
        assert_eq!(stream.levels(), [0]);
        for token in stream.by_ref() {
            if token.unwrap().kind() == &name("c") {
                break;
            }
        }
        assert_eq!(stream.levels(), [0, 2, 4]);
        assert_eq!(stream.by_ref().filter(|t| t.as_ref().unwrap().kind() == &BlockEnd).count(), 2);
        assert_eq!(stream.levels(), [0]);
    }

    #[test]
    fn test_lex_errors_pass_through() {
        assert!(matches!(
            filtered("a = $"),
            Err(TokenizeError::Lex(LexingError::IllegalChar { char: '$', .. }))
        ));
    }

    #[test]
    fn test_brackets_span_lines() {
        let tokens = filtered("x = [1,\n  2,\n      3]\ny\n").unwrap();
        assert!(!tokens.contains(&BlockStart));
        assert_eq!(tokens.iter().filter(|k| **k == Newline).count(), 2);
    }
}
