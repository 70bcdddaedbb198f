//! The blocking parser driver

use crate::lexer::{token_stream, TokenStream, TokenizeError};
use crate::parser::traits::{CouldParse, Parsable};
use crate::parser::{ErrorKind, SyntaxError, SyntaxResult};
use ptpy_tokens::keywords::Dialect;
use ptpy_tokens::spanned::{Span, Spanned};
use ptpy_tokens::token::{Token, TokenKind};
use tracing::trace;

/// How many productions may be in progress at once before the input is rejected as too
/// deeply nested
pub const MAX_NESTING: usize = 100;

/// Anything the parser can pull filtered tokens from
pub trait TokenSource: Iterator<Item = Result<Token, TokenizeError>> {}

impl<I> TokenSource for I where I: Iterator<Item = Result<Token, TokenizeError>> {}

#[derive(Debug, Default)]
pub(in crate::parser) enum State {
    #[default]
    Uninit,
    Lookahead(Token),
    Eof,
    Poisoned,
}

/// Builds the syntax tree from a filtered token stream.
///
/// The parser only ever holds a single token of lookahead and stops at the first error.
///
/// # Examples
/// ```
/// # use ptpy_ast_parsing::parser::blocking::BlockingParser;
/// # use ptpy_ast::Module;
/// # use ptpy_tokens::keywords::Dialect;
/// let mut parser = BlockingParser::from_source("x = 1\n", Dialect::English);
/// let module = parser.parse::<Module>().unwrap();
/// assert_eq!(module.body.len(), 1);
/// ```
#[derive(Debug)]
pub struct BlockingParser<I> {
    tokens: I,
    pub(in crate::parser) state: State,
    last_span: Option<Span>,
    non_terminals: Vec<&'static str>,
}

impl<'src> BlockingParser<TokenStream<'src>> {
    /// Creates a parser over the filtered token stream of some source text
    pub fn from_source(src: &'src str, dialect: Dialect) -> Self {
        Self::new(token_stream(src, dialect))
    }
}

impl<I: TokenSource> BlockingParser<I> {
    /// Creates a new parser with a given token source
    pub fn new(tokens: I) -> Self {
        Self {
            tokens,
            state: State::default(),
            last_span: None,
            non_terminals: vec![],
        }
    }

    fn next_token(&mut self) -> SyntaxResult<()> {
        match self.tokens.next() {
            None => {
                self.state = State::Eof;
            }
            Some(Ok(token)) => {
                self.state = State::Lookahead(token);
            }
            Some(Err(e)) => {
                self.state = State::Poisoned;
                let (line, column) = match &e {
                    TokenizeError::Lex(e) => e.position(),
                    TokenizeError::Indent(e) => e.position(),
                };
                let offset = self.last_span.map(|s| s.end().offset()).unwrap_or(0);
                let span = Span::new(offset, 0, line, column);
                return Err(self.error_with_span(e, None, span));
            }
        }
        Ok(())
    }

    /// peek the current lookahead
    pub fn peek(&mut self) -> SyntaxResult<Option<&Token>> {
        if matches!(self.state, State::Uninit) {
            self.next_token()?;
        }
        match &self.state {
            State::Lookahead(tok) => Ok(Some(tok)),
            State::Uninit => {
                unreachable!("next_token() should init parser")
            }
            State::Eof => Ok(None),
            State::Poisoned => Err(self.error(ErrorKind::ParserPoisoned, None)),
        }
    }

    /// Checks whether the lookahead is of the given kind
    pub fn peek_is(&mut self, kind: &TokenKind) -> SyntaxResult<bool> {
        Ok(matches!(self.peek()?, Some(t) if t.kind() == kind))
    }

    /// Consumes the lookahead token
    pub fn consume(&mut self) -> SyntaxResult<Option<Token>> {
        if matches!(self.state, State::Uninit) {
            self.next_token()?;
        }
        let swapped = std::mem::replace(&mut self.state, State::Poisoned);
        let token = match swapped {
            State::Uninit => {
                unreachable!("next_token() should init parser")
            }
            State::Lookahead(token) => {
                self.last_span = Some(token.span());
                self.next_token()?;
                trace!("consumed {token:?}, state={:?}", self.state);
                Some(token)
            }
            State::Eof => {
                self.state = State::Eof;
                None
            }
            State::Poisoned => return Err(self.error(ErrorKind::ParserPoisoned, None)),
        };
        Ok(token)
    }

    /// consumes if predicate matches
    pub fn consume_if<F>(&mut self, predicate: F) -> SyntaxResult<Option<Token>>
    where
        F: FnOnce(&Token) -> bool,
    {
        let should_consume = match self.peek()? {
            Some(peek) => predicate(peek),
            None => false,
        };
        if should_consume {
            self.consume()
        } else {
            Ok(None)
        }
    }

    /// Consumes a token of exactly the given kind, failing otherwise
    pub fn expect(&mut self, kind: TokenKind, description: &str) -> SyntaxResult<Token> {
        match self.consume_if(|t| t.kind() == &kind)? {
            Some(token) => Ok(token),
            None => Err(self.expected([description])),
        }
    }

    /// Consumes a name token, failing otherwise
    pub fn expect_name(&mut self) -> SyntaxResult<(String, Span)> {
        match self.consume_if(|t| matches!(t.kind(), TokenKind::Name(_)))? {
            Some(token) => {
                let span = token.span();
                match token.into_kind() {
                    TokenKind::Name(name) => Ok((name, span)),
                    _ => unreachable!("only names are consumed"),
                }
            }
            None => Err(self.expected(["name"])),
        }
    }

    /// Creates an error for a lookahead that does not fit any of the `expected` tokens
    pub fn expected<S: AsRef<str>>(&mut self, expected: impl IntoIterator<Item = S>) -> SyntaxError {
        match self.peek() {
            Err(e) => e,
            Ok(None) => self.error(ErrorKind::UnexpectedEof, None),
            Ok(Some(t)) if t.kind() == &TokenKind::EndMarker => {
                self.error(ErrorKind::UnexpectedEof, None)
            }
            Ok(Some(t)) => {
                let kind = ErrorKind::expected_token(expected, t.clone());
                self.error(kind, None)
            }
        }
    }

    /// Creates an error for a lookahead that can not start or continue any production here
    pub fn unexpected(&mut self) -> SyntaxError {
        match self.peek() {
            Err(e) => e,
            Ok(None) => self.error(ErrorKind::UnexpectedEof, None),
            Ok(Some(t)) if t.kind() == &TokenKind::EndMarker => {
                self.error(ErrorKind::UnexpectedEof, None)
            }
            Ok(Some(t)) => {
                let kind = ErrorKind::UnexpectedToken(t.clone());
                self.error(kind, None)
            }
        }
    }

    /// Gets if this parser is at EOF
    pub fn eof(&self) -> bool {
        matches!(self.state, State::Eof)
    }

    /// The span of the most recently consumed token
    pub fn last_span(&self) -> Option<Span> {
        self.last_span
    }

    /// Joins `start` with the span of the most recently consumed token
    pub fn span_from(&self, start: Span) -> Span {
        self.last_span.map(|last| start.join(last)).unwrap_or(start)
    }

    /// Parses some [Parsable] item
    #[inline]
    pub fn parse<P: Parsable>(&mut self) -> SyntaxResult<P> {
        self.parse_with(P::NON_TERMINAL, P::parse)
    }

    /// Parses an item if the lookahead could start it
    pub fn parse_opt<P: CouldParse>(&mut self) -> SyntaxResult<Option<P>> {
        if P::could_parse(self)? {
            Ok(Some(self.parse::<P>()?))
        } else {
            Ok(None)
        }
    }

    /// Wrapper function for parsing a named production.
    ///
    /// The name stays on the non-terminal stack if the production fails, so errors report
    /// every production that was still under construction.
    pub fn parse_with<O, F>(&mut self, non_terminal: &'static str, parser: F) -> SyntaxResult<O>
    where
        F: FnOnce(&mut Self) -> SyntaxResult<O>,
    {
        if self.non_terminals.len() >= MAX_NESTING {
            return Err(self.error(ErrorKind::TooDeeplyNested(MAX_NESTING), None));
        }
        trace!("starting parsing {non_terminal}");
        self.non_terminals.push(non_terminal);
        let r = parser(self)?;
        trace!("finished parsing {non_terminal}");
        self.non_terminals.pop();
        Ok(r)
    }

    pub(in crate::parser) fn error<E1, E2>(&self, error: E1, cause: E2) -> SyntaxError
    where
        E1: Into<ErrorKind>,
        E2: Into<Option<SyntaxError>>,
    {
        let span = match &self.state {
            State::Lookahead(t) => Some(t.span()),
            _ => None,
        }
        .or(self.last_span.map(|s| s.end()));
        SyntaxError::new(error.into(), span, cause, self.non_terminals.clone())
    }

    pub(in crate::parser) fn error_with_span<E1, E2>(
        &self,
        error: E1,
        cause: E2,
        span: Span,
    ) -> SyntaxError
    where
        E1: Into<ErrorKind>,
        E2: Into<Option<SyntaxError>>,
    {
        SyntaxError::new(error.into(), span, cause, self.non_terminals.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tests::test_parser;
    use test_log::test;

    #[test]
    fn test_peek_does_not_consume() {
        test_parser("x = 1.0", |parser| {
            let token = parser.peek().unwrap().unwrap();
            assert_eq!(token.kind(), &TokenKind::Name("x".into()));
            assert_eq!(token.span(), Span::new(0, 1, 1, 0));
            let token = parser.peek().unwrap().unwrap();
            assert_eq!(token.kind(), &TokenKind::Name("x".into()));
        })
    }

    #[test]
    fn test_consume() {
        test_parser("x = 1.0", |parser| {
            let consumed_token = parser.consume().unwrap().unwrap();
            assert_eq!(consumed_token.kind(), &TokenKind::Name("x".into()));
            assert_eq!(parser.last_span(), Some(Span::new(0, 1, 1, 0)));
            let consumed_token = parser.consume().unwrap().unwrap();
            assert_eq!(consumed_token.kind(), &TokenKind::Assign);
        })
    }

    #[test]
    fn test_consume_until_eof() {
        test_parser("x", |parser| {
            let mut kinds = vec![];
            while let Some(token) = parser.consume().unwrap() {
                kinds.push(token.into_kind());
            }
            assert_eq!(
                kinds,
                [
                    TokenKind::Name("x".into()),
                    TokenKind::Newline,
                    TokenKind::EndMarker
                ]
            );
            assert!(parser.eof());
        })
    }

    #[test]
    fn test_expect_reports_found_token() {
        test_parser("x", |parser| {
            let error = parser.expect(TokenKind::Colon, "':'").unwrap_err();
            assert!(matches!(
                error.error_kind(),
                ErrorKind::ExpectedToken(expected, Some(found))
                    if expected == &["':'"] && found.kind() == &TokenKind::Name("x".into())
            ));
        })
    }

    #[test]
    fn test_tokenize_errors_poison_parser() {
        test_parser("x $", |parser| {
            // consuming `x` pulls the failing token into the lookahead
            let error = parser.consume().unwrap_err();
            assert!(matches!(error.error_kind(), ErrorKind::Lex(_)));
            let error = parser.peek().unwrap_err();
            assert!(matches!(error.error_kind(), ErrorKind::ParserPoisoned));
        })
    }
}
