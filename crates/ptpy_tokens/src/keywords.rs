//! Reserved word tables.
//!
//! The language is keyword-for-keyword compatible between dialects: only the surface
//! spelling of reserved words changes, never the token kinds they produce.

use crate::token::TokenKind;
use strum::{AsRefStr, EnumIter, EnumString};

/// The surface spelling used for reserved words
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, AsRefStr, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Dialect {
    /// The native keyword table
    #[default]
    Portuguese,
    English,
}

const PORTUGUESE: &[(&str, TokenKind)] = &[
    ("e", TokenKind::And),
    ("garantir", TokenKind::Assert),
    ("interromper", TokenKind::Break),
    ("classe", TokenKind::Class),
    ("continuar", TokenKind::Continue),
    ("define", TokenKind::Define),
    ("apagar", TokenKind::Del),
    ("senao", TokenKind::Elif),
    ("else", TokenKind::Else),
    ("exceto", TokenKind::Except),
    ("executar", TokenKind::Exec),
    ("finalmente", TokenKind::Finally),
    ("para", TokenKind::For),
    ("de", TokenKind::From),
    ("global", TokenKind::Global),
    ("se", TokenKind::If),
    ("importar", TokenKind::Import),
    ("em", TokenKind::In),
    ("is", TokenKind::Is),
    ("lambda", TokenKind::Lambda),
    ("nao", TokenKind::Not),
    ("ou", TokenKind::Or),
    ("passar", TokenKind::Pass),
    ("exibir", TokenKind::Print),
    ("raise", TokenKind::Raise),
    ("retornar", TokenKind::Return),
    ("tentar", TokenKind::Try),
    ("enquanto", TokenKind::While),
];

const ENGLISH: &[(&str, TokenKind)] = &[
    ("and", TokenKind::And),
    ("assert", TokenKind::Assert),
    ("break", TokenKind::Break),
    ("class", TokenKind::Class),
    ("continue", TokenKind::Continue),
    ("def", TokenKind::Define),
    ("del", TokenKind::Del),
    ("elif", TokenKind::Elif),
    ("else", TokenKind::Else),
    ("except", TokenKind::Except),
    ("exec", TokenKind::Exec),
    ("finally", TokenKind::Finally),
    ("for", TokenKind::For),
    ("from", TokenKind::From),
    ("global", TokenKind::Global),
    ("if", TokenKind::If),
    ("import", TokenKind::Import),
    ("in", TokenKind::In),
    ("is", TokenKind::Is),
    ("lambda", TokenKind::Lambda),
    ("not", TokenKind::Not),
    ("or", TokenKind::Or),
    ("pass", TokenKind::Pass),
    ("print", TokenKind::Print),
    ("raise", TokenKind::Raise),
    ("return", TokenKind::Return),
    ("try", TokenKind::Try),
    ("while", TokenKind::While),
];

impl Dialect {
    fn table(&self) -> &'static [(&'static str, TokenKind)] {
        match self {
            Dialect::Portuguese => PORTUGUESE,
            Dialect::English => ENGLISH,
        }
    }

    /// Looks up a word in this dialect's reserved word table
    pub fn keyword(&self, word: &str) -> Option<TokenKind> {
        self.table()
            .iter()
            .find(|(spelling, _)| *spelling == word)
            .map(|(_, kind)| kind.clone())
    }

    /// Gets how a reserved word token is spelled in this dialect
    pub fn spelling(&self, kind: &TokenKind) -> Option<&'static str> {
        self.table()
            .iter()
            .find(|(_, k)| k == kind)
            .map(|(spelling, _)| *spelling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn native_table_is_default() {
        let dialect = Dialect::default();
        assert_eq!(dialect.keyword("enquanto"), Some(TokenKind::While));
        assert_eq!(dialect.keyword("senao"), Some(TokenKind::Elif));
        assert_eq!(dialect.keyword("while"), None);
    }

    #[test]
    fn dialects_cover_the_same_kinds() {
        for (_, kind) in PORTUGUESE {
            assert!(
                Dialect::English.spelling(kind).is_some(),
                "{kind:?} has no english spelling"
            );
        }
        assert_eq!(PORTUGUESE.len(), ENGLISH.len());
    }

    #[test]
    fn dialect_from_str() {
        assert_eq!(Dialect::from_str("english").unwrap(), Dialect::English);
        assert_eq!(Dialect::iter().count(), 2);
        assert_eq!(Dialect::Portuguese.as_ref(), "portuguese");
    }
}
