//! Token sources consumed by the generated parsers.

use std::fmt;

/// The stream of tokens that a predictive parser reads from.
///
/// Token kinds are plain strings that must match the terminal names used
/// in the grammar.
pub trait TokenSource {
    /// The token value stored in the leaves of the parse tree.
    type Token;

    /// The error reported by the underlying lexer.
    type Error: fmt::Display;

    /// Return the kind of the next token, or `None` at the end of input.
    ///
    /// Calling this method repeatedly without an intervening `take` must
    /// return the same value.
    fn peek(&mut self) -> Result<Option<&str>, Self::Error>;

    /// Consume the next token.
    ///
    /// When `expected` is `None`, this succeeds only if the input has been
    /// exhausted and returns `Ok(None)`. Otherwise it fails unless `peek`
    /// would currently return exactly `expected`.
    fn take(&mut self, expected: Option<&str>) -> Result<Option<Self::Token>, Self::Error>;
}

impl<S: ?Sized> TokenSource for &mut S
where
    S: TokenSource,
{
    type Token = S::Token;
    type Error = S::Error;

    fn peek(&mut self) -> Result<Option<&str>, Self::Error> {
        (**self).peek()
    }

    fn take(&mut self, expected: Option<&str>) -> Result<Option<Self::Token>, Self::Error> {
        (**self).take(expected)
    }
}

/// A trait for abstracting token values produced by a lexer.
pub trait Token {
    /// Return the kind of this token, as named in the grammar.
    fn kind(&self) -> &str;
}

impl Token for &str {
    fn kind(&self) -> &str {
        self
    }
}

impl Token for String {
    fn kind(&self) -> &str {
        self
    }
}

impl<K: AsRef<str>, V> Token for (K, V) {
    fn kind(&self) -> &str {
        self.0.as_ref()
    }
}

/// Adapts an iterator of lexer results into a `TokenSource`, buffering
/// one token of lookahead.
#[derive(Debug)]
pub struct TokenStream<I, T> {
    tokens: I,
    peeked: Option<Option<T>>,
}

impl<I, T, E> TokenStream<I, T>
where
    I: Iterator<Item = Result<T, E>>,
{
    pub fn new(tokens: I) -> Self {
        Self {
            tokens,
            peeked: None,
        }
    }
}

impl<I, T, E> TokenSource for TokenStream<I, T>
where
    I: Iterator<Item = Result<T, E>>,
    T: Token,
    E: fmt::Display,
{
    type Token = T;
    type Error = SourceError<E>;

    fn peek(&mut self) -> Result<Option<&str>, Self::Error> {
        if self.peeked.is_none() {
            let next = self.tokens.next().transpose().map_err(SourceError::Lexer)?;
            self.peeked = Some(next);
        }
        Ok(self
            .peeked
            .as_ref()
            .and_then(|peeked| peeked.as_ref())
            .map(|token| token.kind()))
    }

    fn take(&mut self, expected: Option<&str>) -> Result<Option<T>, Self::Error> {
        let found = self.peek()?;
        if found != expected {
            return Err(SourceError::Mismatch {
                expected: expected.map(str::to_owned),
                found: found.map(str::to_owned),
            });
        }
        match self.peeked.take() {
            Some(Some(token)) => Ok(Some(token)),
            end => {
                // keep the end-of-input marker so the iterator is not polled again.
                self.peeked = end;
                Ok(None)
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError<E: fmt::Display> {
    #[error("from lexer: {0}")]
    Lexer(E),

    #[error("cannot take {}: the next token is {}", describe(.expected), describe(.found))]
    Mismatch {
        expected: Option<String>,
        found: Option<String>,
    },
}

/// Render an optional token kind for diagnostics.
pub(crate) fn describe(kind: &Option<String>) -> String {
    match kind {
        Some(kind) => format!("`{}'", kind),
        None => "end of input".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    fn stream<'a>(
        kinds: &'a [&'a str],
    ) -> TokenStream<impl Iterator<Item = Result<&'a str, Infallible>> + 'a, &'a str> {
        TokenStream::new(kinds.iter().copied().map(Ok))
    }

    #[test]
    fn peek_is_idempotent() {
        let mut src = stream(&["NUM", "+"]);
        assert_eq!(src.peek().unwrap(), Some("NUM"));
        assert_eq!(src.peek().unwrap(), Some("NUM"));
        assert_eq!(src.take(Some("NUM")).unwrap(), Some("NUM"));
        assert_eq!(src.peek().unwrap(), Some("+"));
    }

    #[test]
    fn take_checks_the_expected_kind() {
        let mut src = stream(&["NUM"]);
        assert!(matches!(
            src.take(Some("+")),
            Err(SourceError::Mismatch { expected: Some(e), found: Some(f) }) if e == "+" && f == "NUM"
        ));
        assert!(matches!(src.take(None), Err(SourceError::Mismatch { expected: None, .. })));
        assert_eq!(src.take(Some("NUM")).unwrap(), Some("NUM"));
        assert_eq!(src.take(None).unwrap(), None);
        assert_eq!(src.take(None).unwrap(), None);
        assert_eq!(src.peek().unwrap(), None);
    }

    #[test]
    fn lexer_errors_are_forwarded() {
        let tokens = vec![Ok(("NUM", "1")), Err("bad character")];
        let mut src = TokenStream::new(tokens.into_iter());
        assert_eq!(src.take(Some("NUM")).unwrap(), Some(("NUM", "1")));
        let err = src.peek().unwrap_err();
        assert_eq!(err.to_string(), "from lexer: bad character");
    }
}
