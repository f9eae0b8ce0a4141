//! Grammar files.
//!
//! ```text
//! // comments run to the end of line
//! expr ::= term | expr "+" term ;
//! ```
//!
//! Bare names follow the naming convention of nonterminals and terminals,
//! while quoted strings always denote terminals.

pub mod lexer;

use self::lexer::{LexError, Lexeme};
use crate::{
    grammar::{Grammar, GrammarError, Production, Symbol},
    plan::ParsePlan,
};
use rdgen_runtime::{
    parser::ParseError,
    source::{SourceError, TokenStream},
    tree::Tree,
};
use std::{fs, io, path::Path, str::FromStr};

#[derive(Debug, thiserror::Error)]
pub enum SyntaxError {
    #[error("syntax error: {0}")]
    Parse(#[from] ParseError<SourceError<LexError>>),

    #[error("syntax error: invalid escape sequence in {literal}")]
    Escape { literal: String },

    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error("malformed syntax tree at `{tag}'")]
    Malformed { tag: String },

    #[error("failed to set up the grammar file parser: {0}")]
    Meta(#[from] Box<crate::Error>),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// The grammar of grammar files, parsed with the plan interpreter.
fn meta_grammar() -> Result<Grammar, GrammarError> {
    Grammar::define(|g| {
        g.rule("grammar", ["rule"])?;
        g.rule("grammar", ["grammar", "rule"])?;

        g.rule("rule", ["NAME", "::=", "alts", ";"])?;

        g.rule("alts", ["seq"])?;
        g.rule("alts", ["alts", "|", "seq"])?;

        g.rule("seq", ["item"])?;
        g.rule("seq", ["seq", "item"])?;

        g.rule("item", ["NAME"])?;
        g.rule("item", ["STRING"])?;
        Ok(())
    })
}

fn meta_plan() -> Result<ParsePlan, SyntaxError> {
    let grammar = meta_grammar()?;
    crate::plan::generate(&grammar, "grammar").map_err(|err| SyntaxError::Meta(Box::new(err)))
}

/// Parse the contents of a grammar file.
pub fn parse(source: &str) -> Result<Grammar, SyntaxError> {
    let plan = meta_plan()?;
    let mut tokens = TokenStream::new(lexer::lexer(source));
    let tree = plan.parse(&mut tokens)?;

    let mut rules: Vec<(&str, Production)> = vec![];
    for rule in flatten(&tree, "grammar")? {
        let (name, alts) = match rule.children() {
            [Tree::Leaf(name), _, alts, _] => (name.text, alts),
            _ => return Err(malformed("rule")),
        };
        for seq in flatten(alts, "alts")? {
            let production = flatten(seq, "seq")?
                .into_iter()
                .map(lower_item)
                .collect::<Result<_, _>>()?;
            rules.push((name, production));
        }
    }
    tracing::debug!(productions = rules.len(), "grammar file parsed");

    let grammar = Grammar::define(|g| {
        for (name, production) in rules {
            g.rule(name, production)?;
        }
        Ok(())
    })?;
    Ok(grammar)
}

pub fn parse_file(path: impl AsRef<Path>) -> Result<Grammar, SyntaxError> {
    let source = fs::read_to_string(path)?;
    parse(&source)
}

impl Grammar {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Grammar, SyntaxError> {
        parse_file(path)
    }
}

impl FromStr for Grammar {
    type Err = SyntaxError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        parse(source)
    }
}

fn malformed(tag: &str) -> SyntaxError {
    SyntaxError::Malformed { tag: tag.into() }
}

/// Collect the elements of a left-recursive list such as
/// `alts ::= seq | alts "|" seq`, in source order.
fn flatten<'t, T>(mut tree: &'t Tree<T>, tag: &str) -> Result<Vec<&'t Tree<T>>, SyntaxError> {
    let mut items = vec![];
    loop {
        match (tree.tag(), tree.children()) {
            (Some((t, 0)), [item]) if t == tag => {
                items.push(item);
                break;
            }
            (Some((t, 1)), [rest, .., item]) if t == tag => {
                items.push(item);
                tree = rest;
            }
            _ => return Err(malformed(tag)),
        }
    }
    items.reverse();
    Ok(items)
}

fn lower_item(item: &Tree<Lexeme<'_>>) -> Result<Symbol, SyntaxError> {
    match (item.tag(), item.children()) {
        (Some(("item", 0)), [Tree::Leaf(name)]) => Ok(Symbol::classify(name.text)),
        (Some(("item", 1)), [Tree::Leaf(literal)]) => Ok(Symbol::T(unescape(literal.text)?)),
        _ => Err(malformed("item")),
    }
}

fn unescape(literal: &str) -> Result<String, SyntaxError> {
    let invalid = || SyntaxError::Escape {
        literal: literal.to_owned(),
    };
    let body = literal
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(invalid)?;

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            _ => return Err(invalid()),
        }
    }
    Ok(out)
}
