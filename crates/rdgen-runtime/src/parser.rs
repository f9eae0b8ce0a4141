//! Parse-time errors and the primitive actions shared by every back end.

use crate::{
    source::{describe, TokenSource},
    tree::StackError,
};
use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum ParseError<E: fmt::Display> {
    #[error("from token source: {0}")]
    Source(E),

    /// No alternative of the nonterminal accepts the next token, and the
    /// nonterminal cannot match the empty string.
    #[error("expected {nonterminal}, got {}", describe(.found))]
    Unexpected {
        nonterminal: String,
        found: Option<String>,
    },

    /// The next token is not the one a production requires at this point.
    #[error("expected {}, got {}", describe(.expected), describe(.found))]
    Mismatch {
        expected: Option<String>,
        found: Option<String>,
    },

    #[error("the token source returned no token for `{expected}'")]
    MissingToken { expected: String },

    #[error("no parsing procedure for nonterminal `{nonterminal}'")]
    UndefinedProcedure { nonterminal: String },

    #[error(transparent)]
    Stack(#[from] StackError),
}

/// Build the error reported when no alternative of `nonterminal` matches.
pub fn unexpected<E: fmt::Display>(nonterminal: &str, found: Option<&str>) -> ParseError<E> {
    ParseError::Unexpected {
        nonterminal: nonterminal.to_owned(),
        found: found.map(str::to_owned),
    }
}

/// Consume one token of the specified kind.
pub fn shift<S>(src: &mut S, kind: &str) -> Result<S::Token, ParseError<S::Error>>
where
    S: TokenSource + ?Sized,
{
    match src.peek().map_err(ParseError::Source)? {
        Some(found) if found == kind => {}
        found => {
            return Err(ParseError::Mismatch {
                expected: Some(kind.to_owned()),
                found: found.map(str::to_owned),
            })
        }
    }
    src.take(Some(kind))
        .map_err(ParseError::Source)?
        .ok_or_else(|| ParseError::MissingToken {
            expected: kind.to_owned(),
        })
}

/// Confirm that the whole input has been consumed.
pub fn expect_end<S>(src: &mut S) -> Result<(), ParseError<S::Error>>
where
    S: TokenSource + ?Sized,
{
    if let Some(found) = src.peek().map_err(ParseError::Source)? {
        return Err(ParseError::Mismatch {
            expected: None,
            found: Some(found.to_owned()),
        });
    }
    src.take(None).map_err(ParseError::Source)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::TokenStream;
    use std::convert::Infallible;

    fn stream<'a>(
        kinds: &'a [&'a str],
    ) -> TokenStream<impl Iterator<Item = Result<&'a str, Infallible>> + 'a, &'a str> {
        TokenStream::new(kinds.iter().copied().map(Ok))
    }

    #[test]
    fn shift_consumes_the_expected_token() {
        let mut src = stream(&["(", "NUM"]);
        assert_eq!(shift(&mut src, "(").unwrap(), "(");
        assert_eq!(shift(&mut src, "NUM").unwrap(), "NUM");
        expect_end(&mut src).unwrap();
    }

    #[test]
    fn shift_reports_mismatch() {
        let mut src = stream(&["+"]);
        let err = shift(&mut src, ")").unwrap_err();
        assert_eq!(err.to_string(), "expected `)', got `+'");

        let mut src = stream(&[]);
        let err = shift(&mut src, ")").unwrap_err();
        assert_eq!(err.to_string(), "expected `)', got end of input");
    }

    #[test]
    fn expect_end_rejects_trailing_tokens() {
        let mut src = stream(&["NUM"]);
        let err = expect_end(&mut src).unwrap_err();
        assert_eq!(err.to_string(), "expected end of input, got `NUM'");
    }

    #[test]
    fn unexpected_message() {
        let err: ParseError<Infallible> = unexpected("expr", None);
        assert_eq!(err.to_string(), "expected expr, got end of input");
        let err: ParseError<Infallible> = unexpected("expr", Some("+"));
        assert_eq!(err.to_string(), "expected expr, got `+'");
    }
}
