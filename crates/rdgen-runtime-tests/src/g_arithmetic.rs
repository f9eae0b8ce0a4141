mod p {
    include!(concat!(env!("OUT_DIR"), "/arithmetic.rs"));
}
pub use p::*;

use rdgen_runtime::{
    parser::ParseError,
    source::{SourceError, TokenStream},
    tree::Tree,
};
use std::convert::Infallible;

#[allow(unused_macros)]
macro_rules! assert_matches {
    ($($t:tt)*) => { assert!(matches!($($t)*)) };
}

fn parse_words(input: &str) -> Result<Tree<&str>, ParseError<SourceError<Infallible>>> {
    let mut src = TokenStream::new(input.split_whitespace().map(Ok::<_, Infallible>));
    parse(&mut src)
}

#[test]
fn simple_expr() {
    let tree = parse_words("NUM + NUM * NUM").unwrap();
    assert_eq!(
        tree.to_string(),
        "(expr#1 (expr#0 (term#0 (prim#0 NUM))) + \
         (term#1 (term#0 (prim#0 NUM)) * (prim#0 NUM)))"
    );
}

#[test]
fn left_associative() {
    let tree = parse_words("VAR / NUM / NUM").unwrap();
    assert_eq!(
        tree.to_string(),
        "(expr#0 (term#2 (term#2 (term#0 (prim#1 VAR)) / (prim#0 NUM)) / (prim#0 NUM)))"
    );
}

#[test]
fn errors() {
    assert_matches!(
        parse_words("NUM *"),
        Err(ParseError::Unexpected { ref nonterminal, found: None }) if nonterminal == "prim"
    );
    assert_matches!(
        parse_words("( NUM"),
        Err(ParseError::Mismatch { expected: Some(ref expected), found: None }) if expected == ")"
    );
    assert_eq!(
        parse_words(") NUM").unwrap_err().to_string(),
        "expected expr, got `)'"
    );
}

// Tokens carrying values, evaluated by walking the tree.

type Token = (&'static str, i64);

fn eval(tree: &Tree<Token>) -> i64 {
    let children = tree.children();
    match tree.tag() {
        Some(("expr" | "term", 0)) => eval(&children[0]),
        Some(("expr", 1)) => eval(&children[0]) + eval(&children[2]),
        Some(("expr", 2)) => eval(&children[0]) - eval(&children[2]),
        Some(("term", 1)) => eval(&children[0]) * eval(&children[2]),
        Some(("term", 2)) => eval(&children[0]) / eval(&children[2]),
        Some(("prim", 0 | 1)) => eval(&children[0]),
        Some(("prim", 2)) => eval(&children[1]),
        _ => tree.leaf().map(|(_, value)| *value).unwrap(),
    }
}

#[test]
fn evaluate() {
    let tokens: Vec<Token> = vec![
        ("NUM", 20),
        ("-", 0),
        ("NUM", 6),
        ("-", 0),
        ("(", 0),
        ("NUM", 2),
        ("+", 0),
        ("VAR", 3),
        (")", 0),
        ("*", 0),
        ("NUM", 2),
    ];
    let mut src = TokenStream::new(tokens.into_iter().map(Ok::<_, Infallible>));
    let tree = parse(&mut src).unwrap();
    assert_eq!(eval(&tree), 20 - 6 - (2 + 3) * 2);
}
