//! Parse plans: the predictive dispatch tables consumed by the back ends.

use crate::{
    grammar::{Grammar, Production, Reduction, Symbol},
    left_recursion::EliminatedGrammar,
    sets::{FirstSets, TerminalID, TerminalSet},
    types::{Map, Set},
    util::write_separated,
};
use std::fmt;

/// Append to every production a reduction marker naming its nonterminal and
/// its index, so that the trees built by the parser follow the shape of this
/// grammar whatever transformations are applied afterwards.
pub fn augment(grammar: &Grammar) -> Grammar {
    let rules = grammar
        .rules()
        .iter()
        .map(|(name, productions)| {
            let productions = productions
                .iter()
                .enumerate()
                .map(|(index, production)| {
                    let mut production = production.clone();
                    let arg_count = fragment_count(&production);
                    production.push(Symbol::R(Reduction::new(name.clone(), index, arg_count)));
                    production
                })
                .collect();
            (name.clone(), productions)
        })
        .collect();
    Grammar::from_rules(rules)
}

/// Count the tree fragments left on the stack after matching `production`.
fn fragment_count(production: &[Symbol]) -> usize {
    production.iter().fold(0, |n, symbol| match symbol {
        Symbol::T(..) | Symbol::N(..) => n + 1,
        Symbol::R(r) => (n + 1).saturating_sub(r.arg_count),
    })
}

/// Run the whole pipeline on `grammar` and return the parse plan for `goal`.
pub fn generate(grammar: &Grammar, goal: &str) -> Result<ParsePlan, crate::Error> {
    crate::compile(grammar, goal).map(|compiled| compiled.plan)
}

/// Build the parse plan of a grammar already known to be LL(1).
pub fn build(
    grammar: &EliminatedGrammar,
    first: &FirstSets<'_>,
    goal: &str,
) -> Result<ParsePlan, PlanError> {
    let terminals = first.terminals();
    let mut procedures = Map::default();

    for (nonterminal, productions) in grammar.rules() {
        let mut seen = TerminalSet::new();
        let mut procedure = Procedure::default();

        for production in productions {
            let mut start_set = first.seq_start(production);
            let overlap = start_set.intersection(&seen);
            if !overlap.is_empty() {
                return Err(match overlap.first_terminal() {
                    Some(id) => PlanError::OverlappingGuards {
                        nonterminal: nonterminal.clone(),
                        terminal: terminals.name(id).unwrap_or("<unknown>").to_owned(),
                    },
                    None => PlanError::MultipleFallbacks {
                        nonterminal: nonterminal.clone(),
                    },
                });
            }
            seen.union_with(&start_set);

            let actions = to_actions(production);
            if start_set.remove(TerminalID::EMPTY) {
                procedure.fallback = Some(actions.clone());
            }
            if !start_set.is_empty() {
                let guard = start_set
                    .iter()
                    .filter_map(|id| terminals.name(id))
                    .map(str::to_owned)
                    .collect();
                procedure.alternatives.push(Alternative { guard, actions });
            }
        }

        procedures.insert(nonterminal.clone(), procedure);
    }

    tracing::debug!(procedures = procedures.len(), "parse plan generated");

    Ok(ParsePlan {
        goal: goal.to_owned(),
        procedures,
    })
}

fn to_actions(production: &Production) -> Vec<Action> {
    production
        .iter()
        .map(|symbol| match symbol {
            Symbol::T(t) => Action::Shift(t.clone()),
            Symbol::N(n) => Action::Descend(n.clone()),
            Symbol::R(r) => Action::Reduce(r.clone()),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    #[error("invalid grammar: the alternatives of `{nonterminal}' overlap on token `{terminal}'")]
    OverlappingGuards {
        nonterminal: String,
        terminal: String,
    },

    #[error(
        "invalid grammar: more than one alternative of `{nonterminal}' matches the empty string"
    )]
    MultipleFallbacks { nonterminal: String },
}

/// The predictive parser derived from a grammar.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsePlan {
    goal: String,
    procedures: Map<String, Procedure>,
}

impl ParsePlan {
    /// Return the nonterminal parsed by the entry procedure.
    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn procedures(&self) -> &Map<String, Procedure> {
        &self.procedures
    }

    pub fn procedure(&self, nonterminal: &str) -> Option<&Procedure> {
        self.procedures.get(nonterminal)
    }
}

/// The parsing procedure for a nonterminal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Procedure {
    /// Alternatives chosen by the next token, in production order.
    pub alternatives: Vec<Alternative>,

    /// Actions run when no guard matches. Without it, the procedure fails.
    pub fallback: Option<Vec<Action>>,
}

impl Procedure {
    /// Select the actions to run for the next token.
    pub fn select(&self, token: Option<&str>) -> Option<&[Action]> {
        let chosen = token.and_then(|token| {
            self.alternatives
                .iter()
                .find(|alt| alt.guard.contains(token))
        });
        match chosen {
            Some(alt) => Some(&alt.actions[..]),
            None => self.fallback.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alternative {
    /// The tokens that can start this alternative.
    pub guard: Set<String>,
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Consume one token of the specified kind.
    Shift(String),
    /// Run the procedure of a nonterminal.
    Descend(String),
    Reduce(Reduction),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shift(t) => write!(f, "{:?}", t),
            Self::Descend(n) => f.write_str(n),
            Self::Reduce(r) => write!(f, "{}", r),
        }
    }
}

// expr'0:
//     {"+"} => "+" term <expr#1:3> expr'0
//     _ => ε
impl fmt::Display for ParsePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## goal: {}", self.goal)?;
        for (name, procedure) in &self.procedures {
            writeln!(f, "\n{}:", name)?;
            for alt in &procedure.alternatives {
                f.write_str("    {")?;
                write_separated(f, ", ", alt.guard.iter().map(|t| format!("{:?}", t)))?;
                f.write_str("} => ")?;
                write_actions(f, &alt.actions)?;
                writeln!(f)?;
            }
            f.write_str("    _ => ")?;
            match &procedure.fallback {
                Some(actions) => write_actions(f, actions)?,
                None => write!(f, "error(\"expected {}\")", name)?,
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn write_actions(f: &mut fmt::Formatter<'_>, actions: &[Action]) -> fmt::Result {
    if actions.is_empty() {
        return f.write_str("ε");
    }
    write_separated(f, " ", actions)
}
