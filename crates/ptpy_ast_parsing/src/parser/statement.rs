//! Statement grammar

use crate::parser::blocking::{BlockingParser, TokenSource};
use crate::parser::expr::{parse_binary, parse_testlist};
use crate::parser::traits::{CouldParse, Parsable};
use crate::parser::{ErrorKind, SyntaxResult};
use ptpy_ast::expr::{BinOp, Expr, ExprKind};
use ptpy_ast::stmt::{
    AssertStmt, AssignStmt, AugAssignStmt, AugOp, ClosureBlock, ExecStmt, ForStmt, IfStmt, Stmt,
    StmtKind, Target, WhileStmt,
};
use ptpy_ast::Block;
use ptpy_tokens::spanned::{Span, Spanned};
use ptpy_tokens::token::TokenKind;
use tracing::trace;

/// Parses a single statement line, which is either one compound statement or a list of
/// `;` separated simple statements.
pub(crate) fn parse_statement<I: TokenSource>(
    parser: &mut BlockingParser<I>,
) -> SyntaxResult<Vec<Stmt>> {
    let compound = matches!(
        parser.peek()?,
        Some(t) if matches!(
            t.kind(),
            TokenKind::If | TokenKind::While | TokenKind::For | TokenKind::Define | TokenKind::Class
        )
    );
    if compound {
        Ok(vec![parse_compound_statement(parser)?])
    } else {
        parse_simple_statement(parser)
    }
}

impl Parsable for Block {
    const NON_TERMINAL: &'static str = "suite";

    fn parse<I: TokenSource>(parser: &mut BlockingParser<I>) -> SyntaxResult<Self> {
        let stmts = if parser.consume_if(|t| t.kind() == &TokenKind::Newline)?.is_some() {
            parser.expect(TokenKind::BlockStart, "indented block")?;
            let mut stmts = vec![];
            while parser.consume_if(|t| t.kind() == &TokenKind::BlockEnd)?.is_none() {
                stmts.extend(parse_statement(parser)?);
            }
            stmts
        } else {
            parse_simple_statement(parser)?
        };
        let span = match (stmts.first(), stmts.last()) {
            (Some(first), Some(last)) => first.span.join(last.span),
            _ => Span::default(),
        };
        Ok(Block::new(stmts, span))
    }
}

fn parse_compound_statement<I: TokenSource>(
    parser: &mut BlockingParser<I>,
) -> SyntaxResult<Stmt> {
    let Some(keyword) = parser.consume()? else {
        return Err(parser.unexpected());
    };
    let start = keyword.span();
    match keyword.kind() {
        TokenKind::If => parser.parse_with("if_stmt", |parser| parse_if(parser, start)),
        TokenKind::While => parser.parse_with("while_stmt", |parser| parse_while(parser, start)),
        TokenKind::For => parser.parse_with("for_stmt", |parser| parse_for(parser, start)),
        TokenKind::Define => parser.parse_with("closure_block", |parser| {
            parse_closure_block(parser, start, true)
        }),
        TokenKind::Class => parser.parse_with("closure_block", |parser| {
            parse_closure_block(parser, start, false)
        }),
        _ => Err(parser.error_with_span(ErrorKind::UnexpectedToken(keyword), None, start)),
    }
}

/// `test ':' suite`
fn parse_guarded_suite<I: TokenSource>(
    parser: &mut BlockingParser<I>,
) -> SyntaxResult<(Expr, Block)> {
    let test = parser.parse::<Expr>()?;
    parser.expect(TokenKind::Colon, "':'")?;
    let body = parser.parse::<Block>()?;
    Ok((test, body))
}

/// `[else ':' suite]`
fn parse_else<I: TokenSource>(parser: &mut BlockingParser<I>) -> SyntaxResult<Option<Block>> {
    if parser.consume_if(|t| t.kind() == &TokenKind::Else)?.is_none() {
        return Ok(None);
    }
    parser.expect(TokenKind::Colon, "':'")?;
    Ok(Some(parser.parse::<Block>()?))
}

fn end_span(start: Span, body: &Block, orelse: Option<&Block>) -> Span {
    let last = orelse.unwrap_or(body);
    if last.is_empty() {
        start
    } else {
        start.join(last.span)
    }
}

fn parse_if<I: TokenSource>(parser: &mut BlockingParser<I>, start: Span) -> SyntaxResult<Stmt> {
    let mut branches = vec![parse_guarded_suite(parser)?];
    while parser.consume_if(|t| t.kind() == &TokenKind::Elif)?.is_some() {
        branches.push(parse_guarded_suite(parser)?);
    }
    let orelse = parse_else(parser)?;
    let span = match branches.last() {
        Some((_, body)) => end_span(start, body, orelse.as_ref()),
        None => start,
    };
    Ok(Stmt::new(StmtKind::If(IfStmt { branches, orelse }), span))
}

fn parse_while<I: TokenSource>(parser: &mut BlockingParser<I>, start: Span) -> SyntaxResult<Stmt> {
    let (test, body) = parse_guarded_suite(parser)?;
    let orelse = parse_else(parser)?;
    let span = end_span(start, &body, orelse.as_ref());
    Ok(Stmt::new(
        StmtKind::While(WhileStmt { test, body, orelse }),
        span,
    ))
}

fn parse_for<I: TokenSource>(parser: &mut BlockingParser<I>, start: Span) -> SyntaxResult<Stmt> {
    let (target, _) = parser.expect_name()?;
    parser.expect(TokenKind::In, "in")?;
    let (iter, body) = parse_guarded_suite(parser)?;
    let orelse = parse_else(parser)?;
    let span = end_span(start, &body, orelse.as_ref());
    Ok(Stmt::new(
        StmtKind::For(ForStmt {
            target,
            iter,
            body,
            orelse,
        }),
        span,
    ))
}

/// `KEYWORD [wrapper] NAME ':' suite`, with the keyword already consumed.
///
/// The wrapper is parsed at the bitwise-or level so that the bound name is never swallowed
/// by an operator.
fn parse_closure_block<I: TokenSource>(
    parser: &mut BlockingParser<I>,
    start: Span,
    lazy: bool,
) -> SyntaxResult<Stmt> {
    let head = parse_binary(parser, 0)?;
    let (name, wrapper) = if parser.peek_is(&TokenKind::Colon)? {
        match head.kind {
            ExprKind::Name(name) => (name, None),
            _ => return Err(parser.expected(["name"])),
        }
    } else {
        let (name, _) = parser.expect_name()?;
        (name, Some(head))
    };
    parser.expect(TokenKind::Colon, "':'")?;
    let body = parser.parse::<Block>()?;
    let span = end_span(start, &body, None);
    trace!("parsed closure block {name} (lazy={lazy})");
    Ok(Stmt::new(
        StmtKind::ClosureBlock(ClosureBlock {
            name,
            body,
            wrapper,
            lazy,
            scope: None,
            span,
        }),
        span,
    ))
}

/// `small_stmt (';' small_stmt)* [';'] NEWLINE`
fn parse_simple_statement<I: TokenSource>(
    parser: &mut BlockingParser<I>,
) -> SyntaxResult<Vec<Stmt>> {
    parser.parse_with("simple_stmt", |parser| {
        let mut stmts = vec![parse_small_statement(parser)?];
        while parser.consume_if(|t| t.kind() == &TokenKind::SemiColon)?.is_some() {
            if parser.peek_is(&TokenKind::Newline)? {
                break;
            }
            stmts.push(parse_small_statement(parser)?);
        }
        if parser.consume_if(|t| t.kind() == &TokenKind::Newline)?.is_none() {
            return Err(parser.expected(["';'", "newline"]));
        }
        Ok(stmts)
    })
}

fn parse_small_statement<I: TokenSource>(parser: &mut BlockingParser<I>) -> SyntaxResult<Stmt> {
    let (start, lookahead) = match parser.peek()? {
        Some(t) => (t.span(), t.kind().clone()),
        None => return Err(parser.unexpected()),
    };
    let kind = match lookahead {
        TokenKind::Pass => {
            parser.consume()?;
            StmtKind::Pass
        }
        TokenKind::Break => {
            parser.consume()?;
            StmtKind::Break
        }
        TokenKind::Continue => {
            parser.consume()?;
            StmtKind::Continue
        }
        TokenKind::Assert => {
            parser.consume()?;
            let test = parser.parse::<Expr>()?;
            let msg = match parser.consume_if(|t| t.kind() == &TokenKind::Comma)? {
                Some(_) => Some(parser.parse::<Expr>()?),
                None => None,
            };
            StmtKind::Assert(AssertStmt { test, msg })
        }
        TokenKind::Global => {
            parser.consume()?;
            let mut names = vec![parser.expect_name()?.0];
            while parser.consume_if(|t| t.kind() == &TokenKind::Comma)?.is_some() {
                names.push(parser.expect_name()?.0);
            }
            StmtKind::Global(names)
        }
        TokenKind::Exec => {
            parser.consume()?;
            let (code, _) = parser.expect_name()?;
            parser.expect(TokenKind::In, "in")?;
            let namespace = parser.parse::<Expr>()?;
            StmtKind::Exec(ExecStmt { code, namespace })
        }
        _ if Expr::could_parse(parser)? => {
            return parser.parse_with("expr_stmt", parse_expr_statement);
        }
        _ => return Err(parser.unexpected()),
    };
    Ok(Stmt::new(kind, parser.span_from(start)))
}

fn augmented_operator(kind: &TokenKind) -> Option<AugOp> {
    let op = match kind {
        TokenKind::TildeAssign => return Some(AugOp::Invert),
        TokenKind::PlusAssign => BinOp::Add,
        TokenKind::MinusAssign => BinOp::Sub,
        TokenKind::StarAssign => BinOp::Mul,
        TokenKind::SlashAssign => BinOp::Div,
        TokenKind::PercentAssign => BinOp::Mod,
        TokenKind::PowAssign => BinOp::Pow,
        TokenKind::LShiftAssign => BinOp::LShift,
        TokenKind::RShiftAssign => BinOp::RShift,
        TokenKind::BitAndAssign => BinOp::BitAnd,
        TokenKind::BitOrAssign => BinOp::BitOr,
        TokenKind::CaretAssign => BinOp::BitXor,
        _ => return None,
    };
    Some(AugOp::Bin(op))
}

/// Converts the left hand side of an assignment into a target, naming what was found
/// otherwise.
fn into_target(expr: Expr) -> Result<Target, (&'static str, Span)> {
    match expr.kind {
        ExprKind::Name(name) => Ok(Target::Name(name)),
        ExprKind::Attribute(attribute) => Ok(Target::Attribute(attribute)),
        ExprKind::Constant(_) | ExprKind::List(_) | ExprKind::Tuple(_) | ExprKind::Dict(_) => {
            Err(("literal", expr.span))
        }
        _ => Err(("expression", expr.span)),
    }
}

fn assignment_target<I: TokenSource>(
    parser: &mut BlockingParser<I>,
    expr: Expr,
) -> SyntaxResult<Target> {
    into_target(expr).map_err(|(found, span)| {
        parser.error_with_span(ErrorKind::InvalidAssignmentTarget(found), None, span)
    })
}

/// `testlist ['=' testlist | augassign testlist]`
fn parse_expr_statement<I: TokenSource>(parser: &mut BlockingParser<I>) -> SyntaxResult<Stmt> {
    let lhs = parse_testlist(parser)?;
    let start = lhs.span;
    if parser.consume_if(|t| t.kind() == &TokenKind::Assign)?.is_some() {
        let target = assignment_target(parser, lhs)?;
        let value = parse_testlist(parser)?;
        let span = start.join(value.span);
        return Ok(Stmt::new(StmtKind::Assign(AssignStmt { target, value }), span));
    }
    let op = parser.peek()?.and_then(|t| augmented_operator(t.kind()));
    match op {
        Some(op) => {
            parser.consume()?;
            let target = assignment_target(parser, lhs)?;
            let value = parse_testlist(parser)?;
            let span = start.join(value.span);
            Ok(Stmt::new(
                StmtKind::AugAssign(AugAssignStmt { target, op, value }),
                span,
            ))
        }
        None => Ok(Stmt::new(StmtKind::Expr(lhs), start)),
    }
}
