//! Grammar types.

use crate::{
    types::Map,
    util::{display_fn, write_separated},
};
use std::fmt;

/// The character reserved for the names of synthesized nonterminals.
pub const RESERVED_MARK: char = '\'';

/// A symbol in the right-hand side of a production.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// A token kind matched against the input.
    T(String),
    /// A reference to a nonterminal of the grammar.
    N(String),
    /// A reduction marker. It consumes no input.
    R(Reduction),
}

impl Symbol {
    /// Classify a plain string by the naming convention: names starting with
    /// a lowercase letter are nonterminals, everything else is a terminal.
    pub fn classify(name: &str) -> Self {
        if is_nonterminal_name(name) {
            Self::N(name.to_owned())
        } else {
            Self::T(name.to_owned())
        }
    }

    pub fn terminal(name: impl Into<String>) -> Self {
        Self::T(name.into())
    }

    pub fn nonterminal(name: impl Into<String>) -> Self {
        Self::N(name.into())
    }

    pub fn as_nonterminal(&self) -> Option<&str> {
        match self {
            Self::N(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_reduction(&self) -> bool {
        matches!(self, Self::R(..))
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Self::classify(name)
    }
}

impl From<Reduction> for Symbol {
    fn from(reduction: Reduction) -> Self {
        Self::R(reduction)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::T(name) if is_nonterminal_name(name) => write!(f, "{:?}", name),
            Self::T(name) | Self::N(name) => f.write_str(name),
            Self::R(reduction) => fmt::Display::fmt(reduction, f),
        }
    }
}

/// Instructs the parser to replace the `arg_count` most recent tree fragments
/// with a node tagged `(tag, index)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reduction {
    pub tag: String,
    pub index: usize,
    pub arg_count: usize,
}

impl Reduction {
    pub fn new(tag: impl Into<String>, index: usize, arg_count: usize) -> Self {
        Self {
            tag: tag.into(),
            index,
            arg_count,
        }
    }
}

// `<expr#1:3>`
impl fmt::Display for Reduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}#{}:{}>", self.tag, self.index, self.arg_count)
    }
}

pub type Production = Vec<Symbol>;

/// Return an iterator over the symbols of a production that consume input or
/// descend into a nonterminal.
pub fn matching_symbols(production: &[Symbol]) -> impl Iterator<Item = &Symbol> {
    production.iter().filter(|symbol| !symbol.is_reduction())
}

/// A context-free grammar: an ordered mapping from nonterminal names to their
/// productions, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grammar {
    rules: Map<String, Vec<Production>>,
}

impl Grammar {
    /// Define a grammar using the specified function.
    pub fn define<F>(f: F) -> Result<Self, GrammarError>
    where
        F: FnOnce(&mut GrammarDef) -> Result<(), GrammarError>,
    {
        let mut def = GrammarDef {
            rules: Map::default(),
        };
        f(&mut def)?;
        Ok(Self { rules: def.rules })
    }

    /// Create a grammar from already verified rules.
    pub(crate) fn from_rules(rules: Map<String, Vec<Production>>) -> Self {
        Self { rules }
    }

    pub(crate) fn into_rules(self) -> Map<String, Vec<Production>> {
        self.rules
    }

    pub fn rules(&self) -> &Map<String, Vec<Production>> {
        &self.rules
    }

    pub fn productions(&self, nonterminal: &str) -> Option<&[Production]> {
        self.rules.get(nonterminal).map(|prods| &prods[..])
    }

    pub fn contains(&self, nonterminal: &str) -> bool {
        self.rules.contains_key(nonterminal)
    }

    pub fn nonterminals(&self) -> impl Iterator<Item = &str> + '_ {
        self.rules.keys().map(|name| &name[..])
    }

    /// Return the first nonterminal defined in this grammar.
    pub fn first_nonterminal(&self) -> Option<&str> {
        self.rules.keys().next().map(|name| &name[..])
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

// expr ::= term
//        | expr "+" term
//        ;
impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, productions) in &self.rules {
            let indent = name.len() + 1;
            for (i, production) in productions.iter().enumerate() {
                if i == 0 {
                    write!(f, "{} ::= ", name)?;
                } else {
                    write!(f, "{:indent$}| ", "", indent = indent)?;
                }
                writeln!(f, "{}", display_production(production))?;
            }
            writeln!(f, "{:indent$};", "", indent = indent)?;
        }
        Ok(())
    }
}

pub fn display_production(production: &[Symbol]) -> impl fmt::Display + '_ {
    display_fn(move |f| {
        if production.is_empty() {
            return f.write_str("ε");
        }
        write_separated(f, " ", production)
    })
}

/// The builder used in `Grammar::define`.
#[derive(Debug)]
pub struct GrammarDef {
    rules: Map<String, Vec<Production>>,
}

impl GrammarDef {
    /// Append a production to the nonterminal `name`.
    pub fn rule<I>(&mut self, name: &str, production: I) -> Result<(), GrammarError>
    where
        I: IntoIterator,
        I::Item: Into<Symbol>,
    {
        verify_nonterminal(name)?;
        let production: Production = production.into_iter().map(Into::into).collect();
        for symbol in &production {
            match symbol {
                Symbol::N(n) => verify_nonterminal(n)?,
                Symbol::T(t) if t.is_empty() => {
                    return Err(GrammarError::InvalidName { name: t.clone() })
                }
                Symbol::T(..) | Symbol::R(..) => (),
            }
        }
        self.rules
            .entry(name.to_owned())
            .or_default()
            .push(production);
        Ok(())
    }

    /// Append several productions to the nonterminal `name`.
    pub fn rules<I>(&mut self, name: &str, productions: I) -> Result<(), GrammarError>
    where
        I: IntoIterator,
        I::Item: IntoIterator,
        <I::Item as IntoIterator>::Item: Into<Symbol>,
    {
        for production in productions {
            self.rule(name, production)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    #[error("invalid grammar: nonterminal `{symbol}' is used but not defined")]
    Undefined { symbol: String },

    #[error("invalid grammar: nonterminal `{nonterminal}' can match the empty string")]
    EmptyProduction { nonterminal: String },

    #[error("invalid grammar: nonterminal `{nonterminal}' has a cycle")]
    Cycle { nonterminal: String },

    #[error("invalid grammar: `{name}' is not a valid nonterminal name")]
    InvalidName { name: String },

    #[error("invalid grammar: `{name}' contains the reserved character `'''")]
    ReservedName { name: String },

    #[error("invalid grammar: the goal `{goal}' is not defined")]
    UndefinedGoal { goal: String },

    #[error("invalid grammar: {count} distinct terminals exceed the limit of {max}")]
    TooManyTerminals { count: usize, max: usize },
}

pub fn is_nonterminal_name(name: &str) -> bool {
    name.chars().next().map_or(false, char::is_lowercase)
}

fn verify_nonterminal(name: &str) -> Result<(), GrammarError> {
    let unprintable = name.chars().any(|c| c.is_control() || c.is_whitespace());
    if !is_nonterminal_name(name) || unprintable {
        return Err(GrammarError::InvalidName { name: name.into() });
    }
    if name.contains(RESERVED_MARK) {
        return Err(GrammarError::ReservedName { name: name.into() });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_follow_the_naming_convention() {
        assert_eq!(Symbol::from("expr"), Symbol::N("expr".into()));
        assert_eq!(Symbol::from("NUM"), Symbol::T("NUM".into()));
        assert_eq!(Symbol::from("+"), Symbol::T("+".into()));
        assert_eq!(Symbol::from("(").as_nonterminal(), None);
    }

    #[test]
    fn productions_keep_declaration_order() {
        let g = Grammar::define(|g| {
            g.rule("expr", ["term"])?;
            g.rule("term", ["NUM"])?;
            g.rule("expr", ["expr", "+", "term"])?;
            Ok(())
        })
        .unwrap();
        assert_eq!(g.first_nonterminal(), Some("expr"));
        assert_eq!(g.nonterminals().collect::<Vec<_>>(), ["expr", "term"]);
        let prods = g.productions("expr").unwrap();
        assert_eq!(prods.len(), 2);
        assert_eq!(prods[1][1], Symbol::T("+".into()));
    }

    #[test]
    fn reserved_names_are_rejected() {
        let err = Grammar::define(|g| g.rule("expr'0", ["NUM"])).unwrap_err();
        assert_eq!(
            err,
            GrammarError::ReservedName {
                name: "expr'0".into()
            }
        );

        let err = Grammar::define(|g| g.rule("Expr", ["NUM"])).unwrap_err();
        assert_eq!(
            err,
            GrammarError::InvalidName {
                name: "Expr".into()
            }
        );
    }

    #[test]
    fn names_with_whitespace_are_rejected() {
        let name = "a\nfn main() {}";
        let err = Grammar::define(|g| g.rule(name, ["NUM"])).unwrap_err();
        assert_eq!(err, GrammarError::InvalidName { name: name.into() });

        let err = Grammar::define(|g| g.rule("a", [Symbol::nonterminal("b c")])).unwrap_err();
        assert_eq!(err, GrammarError::InvalidName { name: "b c".into() });
    }

    #[test]
    fn explicit_terminals_may_be_lowercase() {
        let g = Grammar::define(|g| {
            g.rule("stmt", [Symbol::terminal("if"), Symbol::nonterminal("expr")])?;
            g.rule("expr", ["NUM"])?;
            Ok(())
        })
        .unwrap();
        assert_eq!(
            g.to_string(),
            "stmt ::= \"if\" expr\n     ;\nexpr ::= NUM\n     ;\n"
        );
    }

    #[test]
    fn display_reductions_and_empty_productions() {
        let production = vec![
            Symbol::from("NUM"),
            Symbol::R(Reduction::new("prim", 0, 1)),
        ];
        assert_eq!(display_production(&production).to_string(), "NUM <prim#0:1>");
        assert_eq!(display_production(&[]).to_string(), "ε");
    }
}
