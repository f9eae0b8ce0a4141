//! LL(1) conflict detection.

use crate::{
    left_recursion::EliminatedGrammar,
    sets::{FirstSets, FollowSets, TerminalID, TerminalSet},
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmbiguityError {
    #[error("ambiguous grammar: multiple productions for `{nonterminal}' match the empty string")]
    MultipleEmpty { nonterminal: String },

    #[error(
        "unsupported grammar: multiple productions for `{nonterminal}' match strings that start with `{terminal}'"
    )]
    FirstConflict {
        nonterminal: String,
        terminal: String,
    },

    #[error(
        "unsupported grammar: the token `{terminal}' could start either a string matching `{nonterminal}' or something that follows it"
    )]
    FollowConflict {
        nonterminal: String,
        terminal: String,
    },
}

/// Confirm that the grammar can be parsed with one token of lookahead.
pub fn check_ambiguity(grammar: &EliminatedGrammar, goal: &str) -> Result<(), AmbiguityError> {
    let first = FirstSets::new(grammar);
    let follow = first.follow_sets(goal);
    check_sets(grammar, &first, &follow)
}

/// Same as `check_ambiguity`, with precomputed FIRST and FOLLOW sets.
pub fn check_sets(
    grammar: &EliminatedGrammar,
    first: &FirstSets<'_>,
    follow: &FollowSets<'_>,
) -> Result<(), AmbiguityError> {
    let terminals = first.terminals();
    let terminal_name = |id: TerminalID| terminals.name(id).unwrap_or("<unknown>").to_owned();

    for (nonterminal, productions) in grammar.rules() {
        let mut start = TerminalSet::new();
        for production in productions {
            let prod_start = first.seq_start(production);
            let conflicts = prod_start.intersection(&start);
            if !conflicts.is_empty() {
                return Err(match conflicts.first_terminal() {
                    None => AmbiguityError::MultipleEmpty {
                        nonterminal: nonterminal.clone(),
                    },
                    Some(id) => AmbiguityError::FirstConflict {
                        nonterminal: nonterminal.clone(),
                        terminal: terminal_name(id),
                    },
                });
            }
            start.union_with(&prod_start);
        }

        // A nonterminal matching the empty string must not be able to start
        // with a token that may follow it.
        if start.contains_empty() {
            if let Some(follow) = follow.get(nonterminal) {
                if let Some(id) = start.intersection(follow).first_terminal() {
                    return Err(AmbiguityError::FollowConflict {
                        nonterminal: nonterminal.clone(),
                        terminal: terminal_name(id),
                    });
                }
            }
        }
    }

    Ok(())
}
