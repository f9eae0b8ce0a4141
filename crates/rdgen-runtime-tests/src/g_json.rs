mod p {
    include!(concat!(env!("OUT_DIR"), "/json.rs"));
}
pub use p::*;

use rdgen_runtime::{source::TokenStream, tree::Tree};
use std::convert::Infallible;

/// A token whose kind is its text, except for the literal classes.
fn tokenize(input: &str) -> Vec<(&'static str, String)> {
    input
        .split_whitespace()
        .map(|word| {
            let kind = match word {
                "{" => "{",
                "}" => "}",
                "[" => "[",
                "]" => "]",
                "," => ",",
                ":" => ":",
                "true" => "true",
                "false" => "false",
                "null" => "null",
                _ if word.starts_with('"') => "STRING",
                _ => "NUMBER",
            };
            (kind, word.to_owned())
        })
        .collect()
}

fn parse_json(input: &str) -> Tree<(&'static str, String)> {
    let mut src = TokenStream::new(tokenize(input).into_iter().map(Ok::<_, Infallible>));
    parse(&mut src).unwrap()
}

/// Render the tree back into compact JSON text.
fn render(tree: &Tree<(&'static str, String)>, out: &mut String) {
    match tree {
        Tree::Leaf((_, text)) => out.push_str(text),
        Tree::Node { children, .. } => {
            for child in children {
                render(child, out);
            }
        }
    }
}

#[test]
fn round_trips_through_the_tree() {
    let input = r#"{ "a" : [ 1 , 2 , { } ] , "b" : null }"#;
    let tree = parse_json(input);
    let mut out = String::new();
    render(&tree, &mut out);
    assert_eq!(out, r#"{"a":[1,2,{}],"b":null}"#);
}

#[test]
fn members_keep_their_list_shape() {
    let tree = parse_json(r#"{ "a" : 1 , "b" : 2 , "c" : 3 }"#);
    let body = &tree.children()[0].children()[1];
    assert_eq!(body.tag(), Some(("object_body", 1)));

    let mut members = &body.children()[0];
    let mut count = 1;
    while members.tag() == Some(("members", 1)) {
        count += 1;
        members = &members.children()[0];
    }
    assert_eq!(members.tag(), Some(("members", 0)));
    assert_eq!(count, 3);
}

#[test]
fn long_arrays() {
    let n = 100_000;
    let tokens = std::iter::once("[")
        .chain(std::iter::once("1"))
        .chain((0..n).flat_map(|_| [",", "1"]))
        .chain(std::iter::once("]"))
        .map(|word| tokenize(word).remove(0));
    let mut src = TokenStream::new(tokens.map(Ok::<_, Infallible>));
    let tree = parse(&mut src).unwrap();

    let body = &tree.children()[0].children()[1];
    assert_eq!(body.tag(), Some(("array_body", 1)));
    let mut elements = &body.children()[0];
    let mut count = 1;
    while elements.tag() == Some(("elements", 1)) {
        count += 1;
        elements = &elements.children()[0];
    }
    assert_eq!(count, n + 1);
}

#[test]
fn trailing_comma_is_rejected() {
    let mut src = TokenStream::new(tokenize("[ 1 , ]").into_iter().map(Ok::<_, Infallible>));
    let err = parse(&mut src).unwrap_err();
    assert_eq!(err.to_string(), "expected value, got `]'");
}
