//! Well-formedness checks run before any transformation.

use crate::{
    grammar::{matching_symbols, Grammar, GrammarError, Symbol},
    sets::MAX_TERMINALS,
    types::{Map, Set},
};

/// Check that the grammar satisfies the following rules:
///
/// 1. every nonterminal referenced from a production is defined,
/// 2. no nonterminal derives itself through a chain of productions
///    consisting of a single nonterminal,
/// 3. no production matches the empty string.
///
/// Reduction markers are ignored. The number of distinct terminals is also
/// bounded by [`MAX_TERMINALS`].
pub fn check(grammar: &Grammar) -> Result<(), GrammarError> {
    let terminals: Set<&str> = grammar
        .rules()
        .values()
        .flatten()
        .flatten()
        .filter_map(|symbol| match symbol {
            Symbol::T(name) => Some(&name[..]),
            _ => None,
        })
        .collect();
    if terminals.len() > MAX_TERMINALS {
        return Err(GrammarError::TooManyTerminals {
            count: terminals.len(),
            max: MAX_TERMINALS,
        });
    }

    let mut checker = Checker {
        grammar,
        status: Map::default(),
    };
    for nonterminal in grammar.nonterminals() {
        checker.visit(nonterminal)?;
    }
    Ok(())
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Status {
    InProgress,
    Done,
}

struct Checker<'g> {
    grammar: &'g Grammar,
    status: Map<&'g str, Status>,
}

impl<'g> Checker<'g> {
    fn visit(&mut self, nonterminal: &'g str) -> Result<(), GrammarError> {
        match self.status.get(nonterminal) {
            Some(Status::Done) => return Ok(()),
            Some(Status::InProgress) => {
                return Err(GrammarError::Cycle {
                    nonterminal: nonterminal.to_owned(),
                })
            }
            None => (),
        }
        self.status.insert(nonterminal, Status::InProgress);

        let grammar = self.grammar;
        let productions = grammar
            .productions(nonterminal)
            .ok_or_else(|| GrammarError::Undefined {
                symbol: nonterminal.to_owned(),
            })?;
        for production in productions {
            for symbol in production {
                if let Symbol::N(n) = symbol {
                    if !grammar.contains(n) {
                        return Err(GrammarError::Undefined { symbol: n.clone() });
                    }
                }
            }

            let mut symbols = matching_symbols(production);
            match (symbols.next(), symbols.next()) {
                (None, _) => {
                    return Err(GrammarError::EmptyProduction {
                        nonterminal: nonterminal.to_owned(),
                    })
                }
                // Since no production is empty, only the productions consisting of
                // exactly one nonterminal can take part in a cycle.
                (Some(Symbol::N(n)), None) => self.visit(n)?,
                _ => (),
            }
        }

        self.status.insert(nonterminal, Status::Done);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Reduction;

    #[test]
    fn terminal_limit() {
        let define = |count: usize| {
            Grammar::define(|g| {
                for i in 0..count {
                    g.rule("a", [Symbol::terminal(format!("T{}", i))])?;
                }
                Ok(())
            })
            .unwrap()
        };
        assert_eq!(check(&define(MAX_TERMINALS)), Ok(()));
        assert_eq!(
            check(&define(MAX_TERMINALS + 1)),
            Err(GrammarError::TooManyTerminals {
                count: MAX_TERMINALS + 1,
                max: MAX_TERMINALS,
            })
        );
    }

    #[test]
    fn accepts_arithmetic() {
        let g = Grammar::define(|g| {
            g.rules("expr", [vec!["term"], vec!["expr", "+", "term"]])?;
            g.rules("term", [vec!["prim"], vec!["term", "*", "prim"]])?;
            g.rules("prim", [vec!["NUM"], vec!["(", "expr", ")"]])?;
            Ok(())
        })
        .unwrap();
        assert_eq!(check(&g), Ok(()));
    }

    #[test]
    fn self_cycle() {
        let g = Grammar::define(|g| g.rule("a", ["a"])).unwrap();
        assert_eq!(
            check(&g),
            Err(GrammarError::Cycle {
                nonterminal: "a".into()
            })
        );
    }

    #[test]
    fn indirect_cycle_through_reductions() {
        let g = Grammar::define(|g| {
            g.rule("a", [Symbol::from("b"), Reduction::new("a", 0, 1).into()])?;
            g.rule("a", ["X"])?;
            g.rule("b", ["a"])?;
            Ok(())
        })
        .unwrap();
        assert!(matches!(check(&g), Err(GrammarError::Cycle { .. })));
    }

    #[test]
    fn left_recursion_with_more_symbols_is_not_a_cycle() {
        let g = Grammar::define(|g| {
            g.rule("a", ["a", "X"])?;
            g.rule("a", ["X"])?;
            Ok(())
        })
        .unwrap();
        assert_eq!(check(&g), Ok(()));
    }

    #[test]
    fn undefined_nonterminal() {
        let g = Grammar::define(|g| g.rule("a", ["X", "b"])).unwrap();
        assert_eq!(
            check(&g),
            Err(GrammarError::Undefined { symbol: "b".into() })
        );
    }

    #[test]
    fn empty_production() {
        let g = Grammar::define(|g| {
            g.rule("a", ["X"])?;
            g.rule("a", [Symbol::R(Reduction::new("a", 1, 0))])?;
            Ok(())
        })
        .unwrap();
        assert_eq!(
            check(&g),
            Err(GrammarError::EmptyProduction {
                nonterminal: "a".into()
            })
        );
    }
}
