use crate::parser::blocking::{BlockingParser, TokenSource};
use crate::parser::SyntaxResult;

/// Parse a syntax tree part
pub trait Parsable: Sized {
    /// The name of the production, reported in errors
    const NON_TERMINAL: &'static str;

    /// Attempt to parse some syntax tree part
    fn parse<I: TokenSource>(parser: &mut BlockingParser<I>) -> SyntaxResult<Self>;
}

/// A sub trait that determines if this type could be parsed without doing the parsing
pub trait CouldParse: Parsable {
    /// Checks whether the lookahead can start this syntax tree part
    fn could_parse<I: TokenSource>(parser: &mut BlockingParser<I>) -> SyntaxResult<bool>;
}
