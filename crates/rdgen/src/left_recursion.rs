//! Elimination of left recursion (Dragon Book, Algorithm 4.1).

use crate::{
    check::check,
    grammar::{Grammar, GrammarError, Production, Symbol, RESERVED_MARK},
    types::{Map, Set},
};
use std::{fmt, ops::Deref};

/// A grammar in which no production begins with its own nonterminal,
/// either directly or through a chain of leading nonterminals.
///
/// Values of this type can only be obtained from [`eliminate`].
#[derive(Debug, Clone, PartialEq)]
pub struct EliminatedGrammar {
    grammar: Grammar,
}

impl EliminatedGrammar {
    pub fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    pub fn into_grammar(self) -> Grammar {
        self.grammar
    }

    #[cfg(test)]
    pub(crate) fn new_unchecked(grammar: Grammar) -> Self {
        Self { grammar }
    }
}

impl Deref for EliminatedGrammar {
    type Target = Grammar;

    fn deref(&self) -> &Self::Target {
        &self.grammar
    }
}

impl fmt::Display for EliminatedGrammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.grammar, f)
    }
}

/// Rewrite the grammar so that it contains no left recursion.
///
/// The grammar is checked first. The result recognizes the same language,
/// but may contain synthesized nonterminals (named `<name>'<n>`) that match
/// the empty string.
pub fn eliminate(grammar: Grammar) -> Result<EliminatedGrammar, GrammarError> {
    check(&grammar)?;

    let order = quasi_sort(&grammar);
    tracing::debug!(?order, "processing order of nonterminals");

    let mut rules = grammar.into_rules();
    let mut gensym = Gensym::default();
    for (k, name) in order.iter().enumerate() {
        for earlier in &order[..k] {
            inline_left_calls(&mut rules, name, earlier);
        }
        eliminate_immediate(&mut rules, name, &mut gensym);
    }

    Ok(EliminatedGrammar {
        grammar: Grammar::from_rules(rules),
    })
}

/// Generates names for the synthesized nonterminals.
///
/// User defined names never contain the reserved mark, so the generated
/// names are unique without inspecting the grammar.
#[derive(Debug, Default)]
struct Gensym {
    next: usize,
}

impl Gensym {
    fn fresh(&mut self, base: &str) -> String {
        let name = format!("{}{}{}", base, RESERVED_MARK, self.next);
        self.next += 1;
        name
    }
}

fn head(production: &[Symbol]) -> Option<&str> {
    production.first().and_then(Symbol::as_nonterminal)
}

/// Order the nonterminals so that, where no cycle forces otherwise, a
/// nonterminal appears before the nonterminals it left-calls.
fn quasi_sort(grammar: &Grammar) -> Vec<String> {
    struct Sorter<'g> {
        grammar: &'g Grammar,
        out: Vec<&'g str>,
        done: Set<&'g str>,
        stack: Vec<&'g str>,
    }

    impl<'g> Sorter<'g> {
        fn visit(&mut self, name: &'g str) {
            if self.done.contains(name) {
                return;
            }
            self.stack.push(name);
            let grammar = self.grammar;
            for production in grammar.productions(name).unwrap_or_default() {
                if let Some(callee) = head(production) {
                    // the left call closing a cycle is left to the elimination.
                    if !self.stack.contains(&callee) {
                        self.visit(callee);
                    }
                }
            }
            self.done.insert(name);
            self.out.push(name);
            self.stack.pop();
        }
    }

    let mut sorter = Sorter {
        grammar,
        out: vec![],
        done: Set::default(),
        stack: vec![],
    };
    for name in grammar.nonterminals() {
        sorter.visit(name);
    }
    sorter.out.iter().rev().map(|name| name.to_string()).collect()
}

/// Rewrite the productions of `from` so that none starts with `to`, by
/// inlining every production of `to`.
///
/// ```text
/// from ::= to a0 | ... | b0 | ...
/// ==> from ::= c0 a0 | ... | b0 | ...     where to ::= c0 | ...
/// ```
fn inline_left_calls(rules: &mut Map<String, Vec<Production>>, from: &str, to: &str) {
    let Some(productions) = rules.get_mut(from) else {
        return;
    };
    if !productions.iter().any(|p| head(p) == Some(to)) {
        return;
    }
    let (calls, mut rest): (Vec<_>, Vec<_>) = std::mem::take(productions)
        .into_iter()
        .partition(|p| head(p) == Some(to));

    let inlined = rules.get(to).map(|c| &c[..]).unwrap_or_default();
    for c in inlined {
        for a in &calls {
            rest.push(c.iter().chain(&a[1..]).cloned().collect());
        }
    }
    tracing::trace!(from, to, productions = rest.len(), "inline left calls");

    if let Some(productions) = rules.get_mut(from) {
        *productions = rest;
    }
}

/// Rewrite the productions of `name` so that none starts with `name`.
///
/// ```text
/// nt ::= nt a0 | ... | b0 | ...
/// ==> nt ::= b0 nt' | ...
///     nt' ::= ε | a0 nt' | ...
/// ```
fn eliminate_immediate(rules: &mut Map<String, Vec<Production>>, name: &str, gensym: &mut Gensym) {
    let Some(productions) = rules.get_mut(name) else {
        return;
    };
    if !productions.iter().any(|p| head(p) == Some(name)) {
        return;
    }

    let epilogue = gensym.fresh(name);
    let (recursive, rest): (Vec<_>, Vec<_>) = std::mem::take(productions)
        .into_iter()
        .partition(|p| head(p) == Some(name));

    *productions = rest
        .into_iter()
        .map(|mut p| {
            p.push(Symbol::N(epilogue.clone()));
            p
        })
        .collect();

    let mut epilogue_productions = vec![vec![]];
    for p in recursive {
        let mut p: Production = p.into_iter().skip(1).collect();
        p.push(Symbol::N(epilogue.clone()));
        epilogue_productions.push(p);
    }
    tracing::debug!(%name, %epilogue, "eliminate immediate left recursion");
    rules.insert(epilogue, epilogue_productions);
}
