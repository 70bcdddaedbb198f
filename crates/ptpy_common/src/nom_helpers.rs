//! nom helpers

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{alpha1, alphanumeric1};
use nom::combinator::recognize;
use nom::error::ParseError;
use nom::multi::{many0_count, many1_count};
use nom::sequence::pair;
use nom::IResult;

/// Recognizes `[a-zA-Z_][a-zA-Z0-9_]*`
pub fn recognize_identifier<'a, E: ParseError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, &'a str, E> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_")))),
    ))(input)
}

/// Recognizes a run of one or more line breaks, either `\n` or `\r\n`
pub fn recognize_line_breaks<'a, E: ParseError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, &'a str, E> {
    recognize(many1_count(alt((tag("\n"), tag("\r\n")))))(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nom::Finish;

    #[test]
    fn test_one_letter_variable() {
        let (rest, parsed) = recognize_identifier::<nom::error::Error<_>>("i ")
            .finish()
            .unwrap();
        assert_eq!(parsed, "i");
        assert_eq!(rest, " ");
    }

    #[test]
    fn test_underscore_variable() {
        let (_, parsed) = recognize_identifier::<nom::error::Error<_>>("_a1_b+")
            .finish()
            .unwrap();
        assert_eq!(parsed, "_a1_b");
    }

    #[test]
    fn test_identifier_cannot_start_with_digit() {
        assert!(recognize_identifier::<nom::error::Error<_>>("1a").is_err());
    }

    #[test]
    fn test_line_breaks() {
        let (rest, parsed) = recognize_line_breaks::<nom::error::Error<_>>("\n\r\n\nx")
            .finish()
            .unwrap();
        assert_eq!(parsed, "\n\r\n\n");
        assert_eq!(rest, "x");
    }
}
