//! A generator of predictive (LL(1)) recursive-descent parsers.
//!
//! The pipeline validates a grammar, eliminates its left recursion, checks
//! that the result can be parsed with one token of lookahead and produces a
//! [`ParsePlan`](plan::ParsePlan). The plan can be interpreted directly or
//! compiled into Rust source with [`Codegen`](codegen::Codegen). Either way,
//! the trees built while parsing follow the shape of the original grammar.

pub mod ambiguity;
pub mod build;
pub mod check;
pub mod codegen;
pub mod grammar;
pub mod left_recursion;
pub mod plan;
pub mod sets;
pub mod syntax;
pub mod types;
pub mod util;

mod digraph;
mod interp;

use crate::{
    ambiguity::AmbiguityError,
    grammar::{Grammar, GrammarError},
    left_recursion::EliminatedGrammar,
    plan::{ParsePlan, PlanError},
    sets::FirstSets,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    Ambiguity(#[from] AmbiguityError),

    #[error(transparent)]
    Plan(#[from] PlanError),
}

/// The result of compiling a grammar.
#[derive(Debug)]
pub struct Compiled {
    /// The grammar actually parsed by the plan, after augmentation and
    /// left-recursion elimination.
    pub grammar: EliminatedGrammar,
    pub plan: ParsePlan,
}

/// Compile a grammar into a parse plan for `goal`.
pub fn compile(grammar: &Grammar, goal: &str) -> Result<Compiled, Error> {
    let span = tracing::debug_span!("compile", goal);
    let _entered = span.enter();

    if !grammar.contains(goal) {
        return Err(GrammarError::UndefinedGoal { goal: goal.into() }.into());
    }

    let augmented = plan::augment(grammar);
    let eliminated = left_recursion::eliminate(augmented)?;
    tracing::debug!(
        nonterminals = eliminated.len(),
        synthesized = eliminated.len() - grammar.len(),
        "left recursion eliminated"
    );

    let plan = {
        let first = FirstSets::new(&eliminated);
        let follow = first.follow_sets(goal);
        ambiguity::check_sets(&eliminated, &first, &follow)?;
        plan::build(&eliminated, &first, goal)?
    };

    Ok(Compiled {
        grammar: eliminated,
        plan,
    })
}
