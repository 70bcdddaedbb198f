//! Expression grammar.
//!
//! From loosest to tightest binding: conditional expressions, `or`, `and`, `not`,
//! comparisons, the binary operator levels in [BINARY_LEVELS], unary `+ - ~`, and
//! finally `**`.

use crate::parser::blocking::{BlockingParser, TokenSource};
use crate::parser::traits::{CouldParse, Parsable};
use crate::parser::SyntaxResult;
use ptpy_ast::expr::{
    AttributeExpr, BinOp, BinaryExpr, BoolExpr, BoolOp, CallExpr, CmpOp, CompareExpr, Constant,
    Expr, ExprKind, IfExpr, UnaryExpr, UnaryOp,
};
use ptpy_tokens::spanned::{Span, Spanned};
use ptpy_tokens::token::TokenKind;

/// Left associative binary operator levels, loosest first
const BINARY_LEVELS: &[&[(TokenKind, BinOp)]] = &[
    &[(TokenKind::BitOr, BinOp::BitOr)],
    &[(TokenKind::Caret, BinOp::BitXor)],
    &[(TokenKind::BitAnd, BinOp::BitAnd)],
    &[
        (TokenKind::LShift, BinOp::LShift),
        (TokenKind::RShift, BinOp::RShift),
    ],
    &[(TokenKind::Plus, BinOp::Add), (TokenKind::Minus, BinOp::Sub)],
    &[
        (TokenKind::Star, BinOp::Mul),
        (TokenKind::Slash, BinOp::Div),
        (TokenKind::Percent, BinOp::Mod),
    ],
];

impl Parsable for Expr {
    const NON_TERMINAL: &'static str = "test";

    fn parse<I: TokenSource>(parser: &mut BlockingParser<I>) -> SyntaxResult<Self> {
        parse_test(parser)
    }
}

impl CouldParse for Expr {
    fn could_parse<I: TokenSource>(parser: &mut BlockingParser<I>) -> SyntaxResult<bool> {
        Ok(matches!(
            parser.peek()?,
            Some(t) if matches!(
                t.kind(),
                TokenKind::Name(_)
                    | TokenKind::Integer(_)
                    | TokenKind::Float(_)
                    | TokenKind::String(_)
                    | TokenKind::LParen
                    | TokenKind::LBracket
                    | TokenKind::LCurly
                    | TokenKind::Plus
                    | TokenKind::Minus
                    | TokenKind::Tilde
                    | TokenKind::Not
            )
        ))
    }
}

/// Parses `test (',' test)* [',']`.
///
/// A single test without a comma is returned unchanged, anything else becomes one flat
/// tuple.
pub fn parse_testlist<I: TokenSource>(parser: &mut BlockingParser<I>) -> SyntaxResult<Expr> {
    parser.parse_with("testlist", |parser| {
        let first = parser.parse::<Expr>()?;
        if !parser.peek_is(&TokenKind::Comma)? {
            return Ok(first);
        }
        let start = first.span;
        let mut items = vec![first];
        while parser.consume_if(|t| t.kind() == &TokenKind::Comma)?.is_some() {
            match parser.parse_opt::<Expr>()? {
                Some(item) => items.push(item),
                None => break,
            }
        }
        Ok(Expr::new(ExprKind::Tuple(items), parser.span_from(start)))
    })
}

/// `or_test ['if' or_test 'else' test]`
fn parse_test<I: TokenSource>(parser: &mut BlockingParser<I>) -> SyntaxResult<Expr> {
    let body = parse_or_test(parser)?;
    if parser.consume_if(|t| t.kind() == &TokenKind::If)?.is_none() {
        return Ok(body);
    }
    let test = parse_or_test(parser)?;
    parser.expect(TokenKind::Else, "else")?;
    let orelse = parse_test(parser)?;
    let span = body.span.join(orelse.span);
    Ok(Expr::new(
        ExprKind::IfExp(IfExpr {
            test: Box::new(test),
            body: Box::new(body),
            orelse: Box::new(orelse),
        }),
        span,
    ))
}

fn bool_expr(left: Expr, op: BoolOp, right: Expr) -> Expr {
    let span = left.span.join(right.span);
    Expr::new(
        ExprKind::Bool(BoolExpr {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }),
        span,
    )
}

fn parse_or_test<I: TokenSource>(parser: &mut BlockingParser<I>) -> SyntaxResult<Expr> {
    let mut l = parse_and_test(parser)?;
    while parser.consume_if(|t| t.kind() == &TokenKind::Or)?.is_some() {
        let r = parse_and_test(parser)?;
        l = bool_expr(l, BoolOp::Or, r);
    }
    Ok(l)
}

fn parse_and_test<I: TokenSource>(parser: &mut BlockingParser<I>) -> SyntaxResult<Expr> {
    let mut l = parse_not_test(parser)?;
    while parser.consume_if(|t| t.kind() == &TokenKind::And)?.is_some() {
        let r = parse_not_test(parser)?;
        l = bool_expr(l, BoolOp::And, r);
    }
    Ok(l)
}

fn parse_not_test<I: TokenSource>(parser: &mut BlockingParser<I>) -> SyntaxResult<Expr> {
    match parser.consume_if(|t| t.kind() == &TokenKind::Not)? {
        Some(not) => {
            let operand = parser.parse_with("not_test", parse_not_test)?;
            let span = not.span().join(operand.span);
            Ok(Expr::new(
                ExprKind::Unary(UnaryExpr {
                    op: UnaryOp::Not,
                    operand: Box::new(operand),
                }),
                span,
            ))
        }
        None => parse_comparison(parser),
    }
}

/// Consumes a comparison operator if one is next, joining `is not` and `not in`
fn parse_comparison_op<I: TokenSource>(
    parser: &mut BlockingParser<I>,
) -> SyntaxResult<Option<CmpOp>> {
    let op = match parser.peek()?.map(|t| t.kind()) {
        Some(TokenKind::Eq) => CmpOp::Eq,
        Some(TokenKind::Neq) => CmpOp::NotEq,
        Some(TokenKind::Lt) => CmpOp::Lt,
        Some(TokenKind::Lte) => CmpOp::LtE,
        Some(TokenKind::Gt) => CmpOp::Gt,
        Some(TokenKind::Gte) => CmpOp::GtE,
        Some(TokenKind::In) => CmpOp::In,
        Some(TokenKind::Is) => {
            parser.consume()?;
            return match parser.consume_if(|t| t.kind() == &TokenKind::Not)? {
                Some(_) => Ok(Some(CmpOp::IsNot)),
                None => Ok(Some(CmpOp::Is)),
            };
        }
        Some(TokenKind::Not) => {
            parser.consume()?;
            parser.expect(TokenKind::In, "in")?;
            return Ok(Some(CmpOp::NotIn));
        }
        _ => return Ok(None),
    };
    parser.consume()?;
    Ok(Some(op))
}

/// `expr [comp_op expr]`. A second comparison operator is left for the caller to reject.
fn parse_comparison<I: TokenSource>(parser: &mut BlockingParser<I>) -> SyntaxResult<Expr> {
    let left = parse_binary(parser, 0)?;
    let Some(op) = parse_comparison_op(parser)? else {
        return Ok(left);
    };
    let right = parse_binary(parser, 0)?;
    let span = left.span.join(right.span);
    Ok(Expr::new(
        ExprKind::Compare(CompareExpr {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }),
        span,
    ))
}

fn binary_expr(left: Expr, op: BinOp, right: Expr) -> Expr {
    let span = left.span.join(right.span);
    Expr::new(
        ExprKind::Binary(BinaryExpr {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }),
        span,
    )
}

fn binary_operator<I: TokenSource>(
    parser: &mut BlockingParser<I>,
    operators: &[(TokenKind, BinOp)],
) -> SyntaxResult<Option<BinOp>> {
    Ok(parser.peek()?.and_then(|t| {
        operators
            .iter()
            .find(|(kind, _)| kind == t.kind())
            .map(|(_, op)| *op)
    }))
}

/// Parses the binary operator level `level`, or a factor past the last level
pub(crate) fn parse_binary<I: TokenSource>(
    parser: &mut BlockingParser<I>,
    level: usize,
) -> SyntaxResult<Expr> {
    let Some(operators) = BINARY_LEVELS.get(level) else {
        return parse_factor(parser);
    };
    let mut l = parse_binary(parser, level + 1)?;
    while let Some(op) = binary_operator(parser, operators)? {
        parser.consume()?;
        let r = parse_binary(parser, level + 1)?;
        l = binary_expr(l, op, r);
    }
    Ok(l)
}

/// `('+' | '-' | '~') factor | power`
fn parse_factor<I: TokenSource>(parser: &mut BlockingParser<I>) -> SyntaxResult<Expr> {
    let op = match parser.peek()?.map(|t| t.kind()) {
        Some(TokenKind::Plus) => UnaryOp::UAdd,
        Some(TokenKind::Minus) => UnaryOp::USub,
        Some(TokenKind::Tilde) => UnaryOp::Invert,
        _ => return parse_power(parser),
    };
    let start = parser.consume()?.map(|t| t.span()).unwrap_or_default();
    let operand = parser.parse_with("factor", parse_factor)?;
    let span = start.join(operand.span);
    Ok(Expr::new(
        ExprKind::Unary(UnaryExpr {
            op,
            operand: Box::new(operand),
        }),
        span,
    ))
}

/// `atom trailer* ['**' factor]`, right associative
fn parse_power<I: TokenSource>(parser: &mut BlockingParser<I>) -> SyntaxResult<Expr> {
    let base = parse_atom_trailers(parser)?;
    if parser.consume_if(|t| t.kind() == &TokenKind::Pow)?.is_none() {
        return Ok(base);
    }
    let exponent = parse_factor(parser)?;
    Ok(binary_expr(base, BinOp::Pow, exponent))
}

fn parse_atom_trailers<I: TokenSource>(parser: &mut BlockingParser<I>) -> SyntaxResult<Expr> {
    let mut owner = parse_atom(parser)?;
    loop {
        if parser.consume_if(|t| t.kind() == &TokenKind::LParen)?.is_some() {
            let args = parse_comma_separated(parser, TokenKind::RParen, ")", parse_test)?;
            let span = parser.span_from(owner.span);
            owner = Expr::new(
                ExprKind::Call(CallExpr {
                    callee: Box::new(owner),
                    args,
                }),
                span,
            );
        } else if parser.consume_if(|t| t.kind() == &TokenKind::Dot)?.is_some() {
            let (attr, attr_span) = parser.expect_name()?;
            let span = owner.span.join(attr_span);
            owner = Expr::new(
                ExprKind::Attribute(AttributeExpr {
                    value: Box::new(owner),
                    attr,
                }),
                span,
            );
        } else {
            return Ok(owner);
        }
    }
}

/// Parses `item (',' item)* [',']` up to and including `close`. The opening bracket must
/// already be consumed.
fn parse_comma_separated<I, T, F>(
    parser: &mut BlockingParser<I>,
    close: TokenKind,
    close_description: &str,
    mut item: F,
) -> SyntaxResult<Vec<T>>
where
    I: TokenSource,
    F: FnMut(&mut BlockingParser<I>) -> SyntaxResult<T>,
{
    let mut items = vec![];
    while !parser.peek_is(&close)? {
        items.push(item(parser)?);
        if parser.consume_if(|t| t.kind() == &TokenKind::Comma)?.is_none() {
            break;
        }
    }
    parser.expect(close, close_description)?;
    Ok(items)
}

fn parse_dict_item<I: TokenSource>(parser: &mut BlockingParser<I>) -> SyntaxResult<(Expr, Expr)> {
    let key = parse_test(parser)?;
    parser.expect(TokenKind::Colon, ":")?;
    let value = parse_test(parser)?;
    Ok((key, value))
}

fn parse_atom<I: TokenSource>(parser: &mut BlockingParser<I>) -> SyntaxResult<Expr> {
    parser.parse_with("atom", |parser| {
        let is_atom = matches!(
            parser.peek()?,
            Some(t) if matches!(
                t.kind(),
                TokenKind::Name(_)
                    | TokenKind::Integer(_)
                    | TokenKind::Float(_)
                    | TokenKind::String(_)
                    | TokenKind::LParen
                    | TokenKind::LBracket
                    | TokenKind::LCurly
            )
        );
        if !is_atom {
            return Err(parser.expected(["name", "literal", "(", "[", "{"]));
        }
        let Some(token) = parser.consume()? else {
            return Err(parser.unexpected());
        };
        let start: Span = token.span();
        let kind = match token.into_kind() {
            TokenKind::Name(name) => ExprKind::Name(name),
            TokenKind::Integer(i) => ExprKind::Constant(Constant::Integer(i)),
            TokenKind::Float(f) => ExprKind::Constant(Constant::Float(f)),
            TokenKind::String(s) => ExprKind::Constant(Constant::String(s)),
            TokenKind::LParen => {
                if parser.consume_if(|t| t.kind() == &TokenKind::RParen)?.is_some() {
                    ExprKind::Tuple(vec![])
                } else {
                    let inner = parse_testlist(parser)?;
                    parser.expect(TokenKind::RParen, ")")?;
                    inner.kind
                }
            }
            TokenKind::LBracket => ExprKind::List(parse_comma_separated(
                parser,
                TokenKind::RBracket,
                "]",
                parse_test,
            )?),
            TokenKind::LCurly => ExprKind::Dict(parse_comma_separated(
                parser,
                TokenKind::RCurly,
                "}",
                parse_dict_item,
            )?),
            _ => unreachable!("only atom starts are consumed"),
        };
        Ok(Expr::new(kind, parser.span_from(start)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::tests::test_parser;
    use crate::parser::ErrorKind;
    use test_log::test;

    fn parse_expr(src: &str) -> Expr {
        let mut expr = None;
        test_parser(src, |parser| {
            expr = Some(
                parse_testlist(parser).unwrap_or_else(|e| panic!("could not parse {src:?}: {e}")),
            );
        });
        expr.unwrap()
    }

    fn assert_renders(src: &str, expected: &str) {
        assert_eq!(parse_expr(src).to_string(), expected, "for {src:?}");
    }

    #[test]
    fn test_arithmetic_precedence() {
        assert_renders("1 + 2 * 3", "(1 + (2 * 3))");
        assert_renders("a - b - c", "((a - b) - c)");
        assert_renders("a * b % c / d", "(((a * b) % c) / d)");
        assert_renders("(1 + 2) * 3", "((1 + 2) * 3)");
    }

    #[test]
    fn test_bitwise_precedence() {
        assert_renders(
            "a | b ^ c & d << 1 + 2",
            "(a | (b ^ (c & (d << (1 + 2)))))",
        );
        assert_renders("a >> 1 << 2", "((a >> 1) << 2)");
    }

    #[test]
    fn test_power_is_right_associative() {
        assert_renders("2 ** 3 ** 2", "(2 ** (3 ** 2))");
        assert_renders("-a ** 2", "(-(a ** 2))");
        assert_renders("a ** -b", "(a ** (-b))");
    }

    #[test]
    fn test_unary_operators() {
        assert_renders("~a", "(~a)");
        assert_renders("- - a", "(-(-a))");
        assert_renders("+a", "(+a)");
    }

    #[test]
    fn test_boolean_operators() {
        assert_renders("not a and b or c", "(((not a) and b) or c)");
        assert_renders("not not a", "(not (not a))");
        assert_renders("a or b and c", "(a or (b and c))");
    }

    #[test]
    fn test_comparisons() {
        assert_renders("a < b", "(a < b)");
        assert_renders("a is not b", "(a is not b)");
        assert_renders("a not in b", "(a not in b)");
        assert_renders("a in b", "(a in b)");
        assert_renders("a | b == c", "((a | b) == c)");
        assert_renders("not a == b", "(not (a == b))");
    }

    #[test]
    fn test_comparison_holds_one_pair() {
        let expr = parse_expr("a <= b");
        let ExprKind::Compare(CompareExpr { left, op, right }) = expr.kind else {
            panic!("expected comparison");
        };
        assert_eq!(op, CmpOp::LtE);
        assert_eq!(left.as_name(), Some("a"));
        assert_eq!(right.as_name(), Some("b"));
    }

    #[test]
    fn test_conditional_expression() {
        assert_renders("x if c else y", "(x if c else y)");
        assert_renders("x if c else y if d else z", "(x if c else (y if d else z))");
    }

    #[test]
    fn test_trailers() {
        assert_renders("f(a, b,)(c).d", "f(a, b)(c).d");
        assert_renders("f()", "f()");
        assert_renders("a.b.c(1 + 2)", "a.b.c((1 + 2))");
    }

    #[test]
    fn test_containers() {
        assert_renders("[1, 2,]", "[1, 2]");
        assert_renders("[]", "[]");
        assert_renders("{\"a\": 1, b: 2}", "{\"a\": 1, b: 2}");
        assert_renders("{}", "{}");
        assert_renders("()", "()");
        assert_renders("[(a, b)]", "[(a, b)]");
    }

    #[test]
    fn test_tuples() {
        let ExprKind::Tuple(items) = parse_expr("(a,)").kind else {
            panic!("expected tuple");
        };
        assert_eq!(items.len(), 1);
        let ExprKind::Tuple(items) = parse_expr("(a, b, c)").kind else {
            panic!("expected tuple");
        };
        assert_eq!(items.len(), 3);
        let ExprKind::Tuple(items) = parse_expr("a, b, c").kind else {
            panic!("expected tuple");
        };
        assert_eq!(items.len(), 3);
        assert!(items.iter().all(|item| item.as_name().is_some()));
        assert_eq!(parse_expr("(a)").as_name(), Some("a"));
    }

    #[test]
    fn test_literals() {
        assert_renders("1.5", "1.5");
        assert_renders("\"hi\\n\"", "\"hi\\n\"");
    }

    #[test]
    fn test_spans_cover_expression() {
        let expr = parse_expr("foo + bar(1)");
        assert_eq!(expr.span, Span::new(0, 12, 1, 0));
    }

    #[test]
    fn test_missing_operand() {
        test_parser("1 +", |parser| {
            let error = parser.parse::<Expr>().unwrap_err();
            assert!(
                matches!(error.error_kind(), ErrorKind::ExpectedToken(_, Some(_))),
                "{error}"
            );
        });
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        for src in [
            "(".repeat(5000),
            "not ".repeat(5000) + "x",
            "-".repeat(5000) + "x",
        ] {
            test_parser(&src, |parser| {
                let error = parser.parse::<Expr>().unwrap_err();
                assert!(
                    matches!(error.error_kind(), ErrorKind::TooDeeplyNested(_)),
                    "{error}"
                );
            });
        }
    }

    #[test]
    fn test_moderate_nesting_is_accepted() {
        let src = format!("{}x{}", "(".repeat(20), ")".repeat(20));
        assert_renders(&src, "x");
        assert_renders(&("-".repeat(20) + "x"), &("(-".repeat(20) + "x" + &")".repeat(20)));
    }

    #[test]
    fn test_unclosed_call() {
        test_parser("f(1, 2", |parser| {
            let error = parser.parse::<Expr>().unwrap_err();
            assert!(
                matches!(
                    error.error_kind(),
                    ErrorKind::ExpectedToken(expected, Some(found))
                        if expected == &[")"] && found.kind() == &TokenKind::Newline
                ),
                "{error}"
            );
            let stack = error.non_terminal_stack.unwrap();
            assert_eq!(stack.first(), Some(&"test"));
        });
    }
}
