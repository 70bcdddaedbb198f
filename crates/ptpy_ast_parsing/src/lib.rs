//! Tokenizing and parsing of ptpy source text.
//!
//! The pipeline is `Lexer -> IndentTagger -> IndentFilter -> BlockingParser`, each stage
//! pulling one token at a time from the one before it.

use crate::parser::blocking::BlockingParser;
use crate::parser::SyntaxResult;
use ptpy_ast::Module;
use ptpy_tokens::keywords::Dialect;

pub mod lexer;
pub mod parser;

/// Parses a whole module from source text
pub fn parse(src: &str, dialect: Dialect) -> SyntaxResult<Module> {
    let mut parser = BlockingParser::from_source(src, dialect);
    parser.parse::<Module>()
}
