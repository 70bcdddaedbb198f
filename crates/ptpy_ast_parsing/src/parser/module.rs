use crate::parser::blocking::{BlockingParser, TokenSource};
use crate::parser::statement::parse_statement;
use crate::parser::traits::Parsable;
use crate::parser::SyntaxResult;
use ptpy_ast::{Block, Module};
use ptpy_tokens::spanned::Span;
use ptpy_tokens::token::TokenKind;

/// `(NEWLINE | stmt)* ENDMARKER`
impl Parsable for Module {
    const NON_TERMINAL: &'static str = "file_input";

    fn parse<I: TokenSource>(parser: &mut BlockingParser<I>) -> SyntaxResult<Self> {
        let mut stmts = vec![];
        loop {
            if parser.consume_if(|t| t.kind() == &TokenKind::Newline)?.is_some() {
                continue;
            }
            if parser.peek_is(&TokenKind::EndMarker)? {
                break;
            }
            if parser.peek()?.is_none() {
                return Err(parser.unexpected());
            }
            stmts.extend(parse_statement(parser)?);
        }
        parser.expect(TokenKind::EndMarker, "end of input")?;
        let span = match (stmts.first(), stmts.last()) {
            (Some(first), Some(last)) => first.span.join(last.span),
            _ => Span::default(),
        };
        Ok(Module::new(Block::new(stmts, span)))
    }
}

#[cfg(test)]
mod tests {
    use crate::parse;
    use crate::parser::ErrorKind;
    use ptpy_ast::stmt::{IfStmt, StmtKind};
    use ptpy_tokens::keywords::Dialect;
    use test_log::test;

    #[test]
    fn test_empty_module() {
        let module = parse("", Dialect::English).unwrap();
        assert!(module.body.is_empty());
        let module = parse("\n\n# only a comment\n", Dialect::English).unwrap();
        assert!(module.body.is_empty());
    }

    #[test]
    fn test_module_statements() {
        let module = parse("x = 1\n\ny = x\nif y:\n    pass\nz = 2", Dialect::English).unwrap();
        assert_eq!(module.body.len(), 4);
        assert!(matches!(module.body.stmts[2].kind, StmtKind::If(_)));
        assert_eq!(module.body.stmts[3].line(), 6);
    }

    #[test]
    fn test_portuguese_module() {
        let module = parse(
            "se a:\n    x = 1\nsenao b:\n    x = 2\nelse:\n    passar\n",
            Dialect::Portuguese,
        )
        .unwrap();
        let StmtKind::If(IfStmt { branches, orelse }) = &module.body.stmts[0].kind else {
            panic!("expected if statement");
        };
        assert_eq!(branches.len(), 2);
        assert!(orelse.is_some());
    }

    #[test]
    fn test_error_at_end_of_input_reports_stack() {
        let error = parse("x = (1 +", Dialect::English).unwrap_err();
        let stack = error.non_terminal_stack.clone().unwrap_or_default();
        assert_eq!(stack.first(), Some(&"file_input"));
        assert!(stack.contains(&"simple_stmt"), "{stack:?}");
        assert!(stack.contains(&"atom"), "{stack:?}");
    }

    #[test]
    fn test_missing_block_is_indentation_error() {
        let error = parse("if x:\n", Dialect::English).unwrap_err();
        assert!(matches!(error.error_kind(), ErrorKind::Indent(_)), "{error}");
        assert_eq!(error.location().map(|span| span.line()), Some(2));
    }

    #[test]
    fn test_lexing_error_is_reported() {
        let error = parse("x = 1\ny = $\n", Dialect::English).unwrap_err();
        assert!(matches!(error.error_kind(), ErrorKind::Lex(_)), "{error}");
        assert_eq!(error.location().map(|span| span.line()), Some(2));
    }
}
