//! A lexical token from a source text

use crate::spanned::{Span, Spanned};
use std::fmt::{Debug, Display, Formatter};

/// A lexical token from a source text.
///
/// The `at_line_start` and `must_indent` tags are only meaningful after the token has
/// passed through the indentation tagger.
#[derive(Clone)]
pub struct Token {
    span: Span,
    kind: TokenKind,
    at_line_start: bool,
    must_indent: bool,
}

impl Token {
    /// Creates a new, untagged token
    pub fn new(span: Span, kind: TokenKind) -> Self {
        Self {
            span,
            kind,
            at_line_start: false,
            must_indent: false,
        }
    }

    /// Gets the kind for this token
    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    /// Consumes the token, returning its kind
    pub fn into_kind(self) -> TokenKind {
        self.kind
    }

    /// The line this token starts on
    pub fn line(&self) -> usize {
        self.span.line()
    }

    /// The column this token starts on
    pub fn column(&self) -> usize {
        self.span.column()
    }

    /// Whether this is the first significant token on its line
    pub fn at_line_start(&self) -> bool {
        self.at_line_start
    }

    /// Whether this token must open a new indented block
    pub fn must_indent(&self) -> bool {
        self.must_indent
    }

    pub fn set_at_line_start(&mut self, at_line_start: bool) {
        self.at_line_start = at_line_start;
    }

    pub fn set_must_indent(&mut self, must_indent: bool) {
        self.must_indent = must_indent;
    }
}

impl Debug for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.kind, f)
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}:{}", self.kind, self.line(), self.column())
    }
}

impl Spanned for Token {
    fn span(&self) -> Span {
        self.span
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

/// The kind for this token
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Name(String),

    // literals
    Integer(i64),
    Float(f64),
    String(String),

    // reserved words
    And,
    Assert,
    Break,
    Class,
    Continue,
    Define,
    Del,
    Elif,
    Else,
    Except,
    Exec,
    Finally,
    For,
    From,
    Global,
    If,
    Import,
    In,
    Is,
    Lambda,
    Not,
    Or,
    Pass,
    Print,
    Raise,
    Return,
    Try,
    While,

    /// +
    Plus,
    /// -
    Minus,
    /// *
    Star,
    /// /
    Slash,
    /// %
    Percent,
    /// **
    Pow,
    /// |
    BitOr,
    /// &
    BitAnd,
    /// ~
    Tilde,
    /// ^
    Caret,
    LShift,
    RShift,
    Lt,
    Lte,
    Gt,
    Gte,
    /// ==
    Eq,
    /// !=
    Neq,

    /// =
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,
    PercentAssign,
    PowAssign,
    LShiftAssign,
    RShiftAssign,
    BitAndAssign,
    BitOrAssign,
    TildeAssign,
    CaretAssign,

    Colon,
    Comma,
    SemiColon,
    Dot,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LCurly,
    RCurly,

    /// one or more line breaks
    Newline,
    /// leading whitespace of a logical line, with its width
    Whitespace(usize),
    /// synthesized when an indented block opens
    BlockStart,
    /// synthesized when an indented block closes
    BlockEnd,
    /// end of input, always the last token of a stream
    EndMarker,
}

impl TokenKind {
    /// Gets the fixed spelling of this token kind, if it has one.
    ///
    /// Reserved words are spelled by the active dialect, so they have none here.
    pub fn symbol(&self) -> Option<&'static str> {
        use TokenKind::*;
        let s = match self {
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Percent => "%",
            Pow => "**",
            BitOr => "|",
            BitAnd => "&",
            Tilde => "~",
            Caret => "^",
            LShift => "<<",
            RShift => ">>",
            Lt => "<",
            Lte => "<=",
            Gt => ">",
            Gte => ">=",
            Eq => "==",
            Neq => "!=",
            Assign => "=",
            PlusAssign => "+=",
            MinusAssign => "-=",
            StarAssign => "*=",
            SlashAssign => "/=",
            PercentAssign => "%=",
            PowAssign => "**=",
            LShiftAssign => "<<=",
            RShiftAssign => ">>=",
            BitAndAssign => "&=",
            BitOrAssign => "|=",
            TildeAssign => "~=",
            CaretAssign => "^=",
            Colon => ":",
            Comma => ",",
            SemiColon => ";",
            Dot => ".",
            LParen => "(",
            RParen => ")",
            LBracket => "[",
            RBracket => "]",
            LCurly => "{",
            RCurly => "}",
            _ => return None,
        };
        Some(s)
    }

    /// Whether this kind is one of the compound assignment operators
    pub fn is_augmented_assign(&self) -> bool {
        use TokenKind::*;
        matches!(
            self,
            PlusAssign
                | MinusAssign
                | StarAssign
                | SlashAssign
                | PercentAssign
                | PowAssign
                | LShiftAssign
                | RShiftAssign
                | BitAndAssign
                | BitOrAssign
                | TildeAssign
                | CaretAssign
        )
    }

    /// Whether this kind is synthesized by the indentation filter
    pub fn is_synthetic(&self) -> bool {
        matches!(self, TokenKind::BlockStart | TokenKind::BlockEnd)
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if let Some(symbol) = self.symbol() {
            return write!(f, "'{symbol}'");
        }
        match self {
            TokenKind::Name(name) => write!(f, "name '{name}'"),
            TokenKind::Integer(i) => write!(f, "integer {i}"),
            TokenKind::Float(v) => write!(f, "float {v}"),
            TokenKind::String(s) => write!(f, "string {s:?}"),
            TokenKind::Newline => write!(f, "newline"),
            TokenKind::Whitespace(width) => write!(f, "indentation of {width}"),
            TokenKind::BlockStart => write!(f, "block start"),
            TokenKind::BlockEnd => write!(f, "block end"),
            TokenKind::EndMarker => write!(f, "end of input"),
            keyword => write!(f, "keyword {}", format!("{keyword:?}").to_lowercase()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_compare_by_kind() {
        let a = Token::new(Span::new(0, 1, 1, 0), TokenKind::Integer(1));
        let b = Token::new(Span::new(7, 1, 2, 3), TokenKind::Integer(1));
        assert_eq!(a, b);
    }

    #[test]
    fn debug_token_is_its_kind() {
        let token = Token::new(Span::new(0, 1, 1, 0), TokenKind::Name("x".into()));
        assert_eq!(format!("{token:?}"), format!("{:?}", TokenKind::Name("x".into())));
        assert_eq!(token.to_string(), "name 'x' at 1:0");
    }

    #[test]
    fn display_token_kinds() {
        assert_eq!(TokenKind::PowAssign.to_string(), "'**='");
        assert_eq!(TokenKind::Name("x".into()).to_string(), "name 'x'");
        assert_eq!(TokenKind::While.to_string(), "keyword while");
        assert_eq!(TokenKind::EndMarker.to_string(), "end of input");
    }

    #[test]
    fn augmented_assignments() {
        assert!(TokenKind::CaretAssign.is_augmented_assign());
        assert!(!TokenKind::Assign.is_augmented_assign());
    }
}
