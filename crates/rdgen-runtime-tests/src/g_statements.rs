mod p {
    include!(concat!(env!("OUT_DIR"), "/statements.rs"));
}
pub use p::*;

use rdgen_runtime::source::TokenStream;
use std::convert::Infallible;

fn parse_words(input: &str) -> Result<String, String> {
    let mut src = TokenStream::new(input.split_whitespace().map(Ok::<_, Infallible>));
    parse(&mut src)
        .map(|tree| tree.to_string())
        .map_err(|err| err.to_string())
}

#[test]
fn statement_sequence() {
    assert_eq!(
        parse_words("print NUM ; IDENT = NUM + IDENT ;").unwrap(),
        "(program#1 (program#0 (stmt#1 print (expr#0 (atom#1 NUM)) ;)) \
         (stmt#2 IDENT = (expr#1 (expr#0 (atom#1 NUM)) + (atom#0 IDENT)) ;))"
    );
}

#[test]
fn nested_blocks() {
    assert_eq!(
        parse_words("if IDENT then print IDENT ; end").unwrap(),
        "(program#0 (stmt#0 if (expr#0 (atom#0 IDENT)) then \
         (program#0 (stmt#1 print (expr#0 (atom#0 IDENT)) ;)) end))"
    );
}

#[test]
fn unterminated_block() {
    assert_eq!(
        parse_words("if IDENT then print IDENT ;").unwrap_err(),
        "expected `end', got end of input"
    );
}
