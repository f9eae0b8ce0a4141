use logos::Logos;
use std::{fmt, ops::Range};

#[derive(Debug, Copy, Clone, Logos, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+|//[^\n]*")]
pub enum Kind {
    #[token("::=")]
    Define,

    #[token("|")]
    Bar,

    #[token(";")]
    Semicolon,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Name,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    String,
}

impl Kind {
    /// The terminal name of this kind in the grammar of grammar files.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Define => "::=",
            Self::Bar => "|",
            Self::Semicolon => ";",
            Self::Name => "NAME",
            Self::String => "STRING",
        }
    }
}

/// A token in a grammar file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme<'source> {
    pub kind: Kind,
    pub text: &'source str,
    pub span: Range<usize>,
}

impl rdgen_runtime::source::Token for Lexeme<'_> {
    fn kind(&self) -> &str {
        self.kind.as_str()
    }
}

impl fmt::Display for Lexeme<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized input `{text}' at {line}:{column}")]
pub struct LexError {
    pub text: String,
    pub line: usize,
    pub column: usize,
}

pub fn lexer(source: &str) -> impl Iterator<Item = Result<Lexeme<'_>, LexError>> {
    Kind::lexer(source).spanned().map(move |(kind, span)| match kind {
        Ok(kind) => Ok(Lexeme {
            kind,
            text: &source[span.clone()],
            span,
        }),
        Err(()) => {
            let (line, column) = position(source, span.start);
            Err(LexError {
                text: source[span].to_owned(),
                line,
                column,
            })
        }
    })
}

/// Return the 1-based line and column of a byte offset.
pub fn position(source: &str, offset: usize) -> (usize, usize) {
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let column = match before.rfind('\n') {
        Some(newline) => before[newline + 1..].chars().count() + 1,
        None => before.chars().count() + 1,
    };
    (line, column)
}
