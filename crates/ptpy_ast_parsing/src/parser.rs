//! The parser turns a filtered token stream into a [Module](ptpy_ast::Module).
//!
//! Every grammar production is either a [Parsable] implementation or a function over a
//! [BlockingParser]. The parser holds a single token of lookahead and fails on the first
//! error it finds.

pub use error::{ErrorKind, SyntaxError, SyntaxResult};
pub use traits::{CouldParse, Parsable};

pub mod blocking;
pub mod error;
mod expr;
mod module;
mod statement;
pub mod traits;

pub use expr::parse_testlist;

#[cfg(test)]
pub(crate) mod tests {
    use crate::lexer::TokenStream;
    use crate::parser::blocking::BlockingParser;
    use ptpy_tokens::keywords::Dialect;

    /// Runs `callback` with a parser over `src` using the English keyword table
    pub fn test_parser<F: FnOnce(&mut BlockingParser<TokenStream>)>(src: &str, callback: F) {
        let mut parser = BlockingParser::from_source(src, Dialect::English);
        callback(&mut parser)
    }
}
