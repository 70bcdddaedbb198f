//! nom recognizers for single lexemes

use nom::branch::alt;
use nom::bytes::complete::{is_not, tag, take_till, take_while, take_while_m_n};
use nom::character::complete::{char, digit1, none_of, one_of};
use nom::combinator::{map, map_opt, map_res, opt, recognize, value, verify};
use nom::error::{context, VerboseError};
use nom::multi::fold_many0;
use nom::sequence::{delimited, pair, preceded, tuple};
use nom::{IResult, Parser};
use ptpy_common::nom_helpers::{recognize_identifier, recognize_line_breaks};
use ptpy_tokens::token::TokenKind;

pub(super) type Result<'a, O> = IResult<&'a str, O, VerboseError<&'a str>>;

/// A lexeme before words have been looked up in a keyword table and numbers have been
/// converted
#[derive(Debug, Clone, PartialEq)]
pub(super) enum Lexeme<'a> {
    Word(&'a str),
    Integer(&'a str),
    Float(&'a str),
    String(String),
    Fixed(TokenKind),
}

/// Parses one lexeme. Whitespace, comments and line breaks are recognized separately
/// since what they produce depends on the lexer's state.
pub(super) fn parse_lexeme(src: &str) -> Result<Lexeme> {
    context(
        "lexeme",
        alt((
            map(parse_word, Lexeme::Word),
            parse_number,
            map(parse_string_value, Lexeme::String),
            map(parse_operator, Lexeme::Fixed),
            map(parse_punctuation, Lexeme::Fixed),
        )),
    )(src)
}

/// A possibly empty run of spaces
pub(super) fn parse_spaces(src: &str) -> Result<&str> {
    context("spaces", take_while(|c: char| c == ' '))(src)
}

/// A `#` comment, up to but not including the line break
pub(super) fn parse_comment(src: &str) -> Result<&str> {
    context(
        "comment",
        recognize(preceded(char('#'), take_till(|c: char| c == '\n' || c == '\r'))),
    )(src)
}

/// Spaces followed by an optional comment
pub(super) fn parse_insignificant(src: &str) -> Result<&str> {
    context(
        "insignificant",
        recognize(pair(parse_spaces, opt(parse_comment))),
    )(src)
}

/// One or more line breaks, merged
pub(super) fn parse_line_breaks(src: &str) -> Result<&str> {
    context("line break", recognize_line_breaks)(src)
}

fn parse_word(src: &str) -> Result<&str> {
    context("word", recognize_identifier)(src)
}

fn parse_exponent(src: &str) -> Result<&str> {
    recognize(tuple((one_of("eE"), opt(one_of("+-")), digit1)))(src)
}

/// `digits.digits[exponent]` or `digits exponent`
fn parse_float(src: &str) -> Result<&str> {
    context(
        "float",
        recognize(alt((
            recognize(tuple((digit1, char('.'), digit1, opt(parse_exponent)))),
            recognize(pair(digit1, parse_exponent)),
        ))),
    )(src)
}

fn parse_number(src: &str) -> Result<Lexeme> {
    alt((
        map(parse_float, Lexeme::Float),
        map(context("integer", digit1), Lexeme::Integer),
    ))(src)
}

fn parse_operator(src: &str) -> Result<TokenKind> {
    context(
        "operator",
        alt((
            alt((
                value(TokenKind::PowAssign, tag("**=")),
                value(TokenKind::Pow, tag("**")),
                value(TokenKind::StarAssign, tag("*=")),
                value(TokenKind::Star, char('*')),
                value(TokenKind::LShiftAssign, tag("<<=")),
                value(TokenKind::LShift, tag("<<")),
                value(TokenKind::Lte, tag("<=")),
                value(TokenKind::Lt, char('<')),
                value(TokenKind::RShiftAssign, tag(">>=")),
                value(TokenKind::RShift, tag(">>")),
                value(TokenKind::Gte, tag(">=")),
                value(TokenKind::Gt, char('>')),
            )),
            alt((
                value(TokenKind::Eq, tag("==")),
                value(TokenKind::Assign, char('=')),
                value(TokenKind::Neq, tag("!=")),
                value(TokenKind::PlusAssign, tag("+=")),
                value(TokenKind::Plus, char('+')),
                value(TokenKind::MinusAssign, tag("-=")),
                value(TokenKind::Minus, char('-')),
                value(TokenKind::SlashAssign, tag("/=")),
                value(TokenKind::Slash, char('/')),
                value(TokenKind::PercentAssign, tag("%=")),
                value(TokenKind::Percent, char('%')),
            )),
            alt((
                value(TokenKind::BitAndAssign, tag("&=")),
                value(TokenKind::BitAnd, char('&')),
                value(TokenKind::BitOrAssign, tag("|=")),
                value(TokenKind::BitOr, char('|')),
                value(TokenKind::CaretAssign, tag("^=")),
                value(TokenKind::Caret, char('^')),
                value(TokenKind::TildeAssign, tag("~=")),
                value(TokenKind::Tilde, char('~')),
            )),
        )),
    )(src)
}

fn parse_punctuation(src: &str) -> Result<TokenKind> {
    context(
        "punctuation",
        alt((
            value(TokenKind::Colon, char(':')),
            value(TokenKind::Comma, char(',')),
            value(TokenKind::SemiColon, char(';')),
            value(TokenKind::Dot, char('.')),
            value(TokenKind::LParen, char('(')),
            value(TokenKind::RParen, char(')')),
            value(TokenKind::LBracket, char('[')),
            value(TokenKind::RBracket, char(']')),
            value(TokenKind::LCurly, char('{')),
            value(TokenKind::RCurly, char('}')),
        )),
    )(src)
}

#[derive(Debug, Clone)]
enum StringFragment<'a> {
    Literal(&'a str),
    EscapedChar(char),
    /// an escape with no meaning, kept verbatim including its backslash
    Unknown(char),
}

fn parse_literal_str(input: &str) -> Result<&str> {
    verify(is_not("\"\\\n"), |s: &str| !s.is_empty())(input)
}

/// `\xHH`
fn parse_hex_byte(input: &str) -> Result<char> {
    let parse_hex = preceded(
        char('x'),
        take_while_m_n(2, 2, |c: char| c.is_ascii_hexdigit()),
    );
    map_opt(map_res(parse_hex, |hex| u32::from_str_radix(hex, 16)), char::from_u32)(input)
}

/// `\u{H..}`, between 1 and 6 hex digits
fn parse_unicode(input: &str) -> Result<char> {
    let parse_hex = take_while_m_n(1, 6, |c: char| c.is_ascii_hexdigit());
    let parse_delimited_hex = preceded(char('u'), delimited(char('{'), parse_hex, char('}')));
    let parse_u32 = map_res(parse_delimited_hex, move |hex| u32::from_str_radix(hex, 16));
    map_opt(parse_u32, char::from_u32).parse(input)
}

fn parse_escape(input: &str) -> Result<StringFragment> {
    preceded(
        char('\\'),
        alt((
            map(
                alt((
                    parse_unicode,
                    parse_hex_byte,
                    value('\n', char('n')),
                    value('\r', char('r')),
                    value('\t', char('t')),
                    value('\\', char('\\')),
                    value('"', char('"')),
                    value('\'', char('\'')),
                    value('\0', char('0')),
                    value('\u{07}', char('a')),
                    value('\u{08}', char('b')),
                    value('\u{0C}', char('f')),
                    value('\u{0B}', char('v')),
                )),
                StringFragment::EscapedChar,
            ),
            map(none_of("\n"), StringFragment::Unknown),
        )),
    )(input)
}

fn parse_string_fragment(input: &str) -> Result<StringFragment> {
    alt((
        map(parse_literal_str, StringFragment::Literal),
        parse_escape,
    ))(input)
}

/// A double quoted, single line string with its escapes decoded
pub(super) fn parse_string_value(input: &str) -> Result<String> {
    let build_string = fold_many0(
        parse_string_fragment,
        String::new,
        |mut accum, next| {
            match next {
                StringFragment::Literal(l) => accum.push_str(l),
                StringFragment::EscapedChar(c) => accum.push(c),
                StringFragment::Unknown(c) => {
                    accum.push('\\');
                    accum.push(c);
                }
            }
            accum
        },
    );

    context("string", delimited(char('"'), build_string, char('"')))(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nom::combinator::all_consuming;
    use nom::Finish;
    use test_log::test;

    fn lex(src: &str) -> Lexeme {
        all_consuming(parse_lexeme)(src)
            .finish()
            .unwrap_or_else(|e| panic!("could not parse {src:?}: {e}"))
            .1
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(lex("123"), Lexeme::Integer("123"));
        assert_eq!(lex("1.5"), Lexeme::Float("1.5"));
        assert_eq!(lex("1.5e-3"), Lexeme::Float("1.5e-3"));
        assert_eq!(lex("2e10"), Lexeme::Float("2e10"));
    }

    #[test]
    fn test_integer_followed_by_dot() {
        let (rest, lexeme) = parse_lexeme("1.foo").unwrap();
        assert_eq!(lexeme, Lexeme::Integer("1"));
        assert_eq!(rest, ".foo");
    }

    #[test]
    fn test_longest_operator_wins() {
        assert_eq!(lex("**="), Lexeme::Fixed(TokenKind::PowAssign));
        assert_eq!(lex("**"), Lexeme::Fixed(TokenKind::Pow));
        assert_eq!(lex("<<="), Lexeme::Fixed(TokenKind::LShiftAssign));
        assert_eq!(lex("<="), Lexeme::Fixed(TokenKind::Lte));
        assert_eq!(lex("!="), Lexeme::Fixed(TokenKind::Neq));
        assert_eq!(lex("~="), Lexeme::Fixed(TokenKind::TildeAssign));
    }

    #[test]
    fn test_parse_string_escapes() {
        assert_eq!(
            lex(r#""a\tb\n\"q\" \x41\u{1F600} \q""#),
            Lexeme::String("a\tb\n\"q\" A\u{1F600} \\q".to_string())
        );
    }

    #[test]
    fn test_unterminated_string_fails() {
        assert!(parse_lexeme("\"abc\n\"").is_err());
        assert!(parse_lexeme("\"abc").is_err());
    }

    #[test]
    fn test_insignificant() {
        let (rest, skipped) = parse_insignificant("   # note\nx").unwrap();
        assert_eq!(skipped, "   # note");
        assert_eq!(rest, "\nx");
        let (rest, skipped) = parse_insignificant("x = 1").unwrap();
        assert_eq!(skipped, "");
        assert_eq!(rest, "x = 1");
    }

    #[test]
    fn test_comment_stops_before_carriage_return() {
        let (rest, comment) = parse_comment("# a\r\nb").unwrap();
        assert_eq!(comment, "# a");
        assert_eq!(rest, "\r\nb");
        assert!(parse_comment("a # b").is_err());
    }

    #[test]
    fn test_spaces_exclude_tabs() {
        let (rest, spaces) = parse_spaces("  \tx").unwrap();
        assert_eq!(spaces, "  ");
        assert_eq!(rest, "\tx");
    }

    #[test]
    fn test_line_breaks_merge() {
        let (rest, breaks) = parse_line_breaks("\n\r\n\n  x").unwrap();
        assert_eq!(breaks, "\n\r\n\n");
        assert_eq!(rest, "  x");
        assert!(parse_line_breaks("x\n").is_err());
    }

    #[test]
    fn test_bang_alone_is_not_a_lexeme() {
        assert!(parse_lexeme("!").is_err());
    }
}
