//! FIRST and FOLLOW sets.

use crate::{
    digraph::{self, digraph},
    grammar::{Grammar, Symbol},
    types::{Map, Set},
    util::display_fn,
};
use bit_set::BitSet;
use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TerminalID {
    raw: u16,
}
impl TerminalID {
    /// Reserved symbol meaning that a sequence can match the empty string.
    pub const EMPTY: Self = Self::new(0);

    /// Reserved symbol used as a terminal symbol that means the end of input.
    pub const END: Self = Self::new(1);

    const OFFSET: u16 = 2;

    #[inline]
    const fn new(raw: u16) -> Self {
        Self { raw }
    }

    #[inline]
    fn index(self) -> usize {
        self.raw as usize
    }

    pub fn is_sentinel(self) -> bool {
        self.raw < Self::OFFSET
    }
}

/// The number of distinct terminals a grammar may use.
pub const MAX_TERMINALS: usize = (u16::MAX - TerminalID::OFFSET) as usize + 1;

/// A set of terminals, optionally including the `EMPTY` and `END` sentinels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TerminalSet {
    bits: BitSet,
}

impl TerminalSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: TerminalID) -> bool {
        self.bits.insert(id.index())
    }

    pub fn remove(&mut self, id: TerminalID) -> bool {
        self.bits.remove(id.index())
    }

    pub fn contains(&self, id: TerminalID) -> bool {
        self.bits.contains(id.index())
    }

    pub fn contains_empty(&self) -> bool {
        self.contains(TerminalID::EMPTY)
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn union_with(&mut self, other: &Self) {
        self.bits.union_with(&other.bits);
    }

    pub fn is_superset(&self, other: &Self) -> bool {
        self.bits.is_superset(&other.bits)
    }

    pub fn intersection(&self, other: &Self) -> Self {
        Self {
            bits: self.bits.intersection(&other.bits).collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = TerminalID> + '_ {
        self.bits.iter().map(|raw| TerminalID::new(raw as u16))
    }

    /// Return the first member that is not a sentinel.
    pub fn first_terminal(&self) -> Option<TerminalID> {
        self.iter().find(|id| !id.is_sentinel())
    }
}

impl FromIterator<TerminalID> for TerminalSet {
    fn from_iter<I: IntoIterator<Item = TerminalID>>(iter: I) -> Self {
        let mut set = Self::new();
        for id in iter {
            set.insert(id);
        }
        set
    }
}

impl digraph::Set for TerminalSet {
    fn union_with(&mut self, other: &Self) {
        self.bits.union_with(&other.bits);
    }
}

/// The terminals appearing in a grammar, numbered in order of appearance.
#[derive(Debug, Default)]
pub struct Terminals {
    names: Set<String>,
}

impl Terminals {
    pub fn collect(grammar: &Grammar) -> Self {
        let mut names = Set::default();
        for productions in grammar.rules().values() {
            for symbol in productions.iter().flatten() {
                if let Symbol::T(name) = symbol {
                    names.insert(name.clone());
                }
            }
        }
        Self { names }
    }

    pub fn id(&self, name: &str) -> Option<TerminalID> {
        let index = u16::try_from(self.names.get_index_of(name)?).ok()?;
        index.checked_add(TerminalID::OFFSET).map(TerminalID::new)
    }

    pub fn name(&self, id: TerminalID) -> Option<&str> {
        let index = id.raw.checked_sub(TerminalID::OFFSET)?;
        self.names.get_index(index as usize).map(|name| &name[..])
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    // `{NUM, (, ε}`
    pub fn display_set<'a>(&'a self, set: &'a TerminalSet) -> impl fmt::Display + 'a {
        display_fn(move |f| {
            f.write_str("{")?;
            for (i, id) in set.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                match id {
                    TerminalID::EMPTY => f.write_str("ε")?,
                    TerminalID::END => f.write_str("$")?,
                    id => f.write_str(self.name(id).unwrap_or("<unknown>"))?,
                }
            }
            f.write_str("}")
        })
    }
}

/// FIRST sets of every nonterminal in a grammar.
///
/// The sets are computed once by iterating to a fixed point, so diamond
/// shaped grammars cost no more than any other.
#[derive(Debug)]
pub struct FirstSets<'g> {
    grammar: &'g Grammar,
    terminals: Terminals,
    nonterminals: Map<&'g str, TerminalSet>,
}

impl<'g> FirstSets<'g> {
    pub fn new(grammar: &'g Grammar) -> Self {
        let terminals = Terminals::collect(grammar);
        let mut nonterminals: Map<&'g str, TerminalSet> = grammar
            .nonterminals()
            .map(|name| (name, TerminalSet::new()))
            .collect();

        let mut iterations = 0;
        let mut changed = true;
        while changed {
            changed = false;
            iterations += 1;
            for (index, productions) in grammar.rules().values().enumerate() {
                for production in productions {
                    let added = seq_start(&terminals, &nonterminals, production);
                    let slot = &mut nonterminals[index];
                    if !slot.is_superset(&added) {
                        slot.union_with(&added);
                        changed = true;
                    }
                }
            }
        }
        tracing::debug!(
            terminals = terminals.len(),
            nonterminals = nonterminals.len(),
            iterations,
            "FIRST sets computed"
        );

        Self {
            grammar,
            terminals,
            nonterminals,
        }
    }

    pub fn terminals(&self) -> &Terminals {
        &self.terminals
    }

    /// Return the FIRST set of a nonterminal.
    pub fn nonterminal(&self, name: &str) -> Option<&TerminalSet> {
        self.nonterminals.get(name)
    }

    /// Return the FIRST set of a symbol.
    pub fn start(&self, symbol: &Symbol) -> TerminalSet {
        let mut set = TerminalSet::new();
        match symbol {
            Symbol::T(name) => {
                if let Some(id) = self.terminals.id(name) {
                    set.insert(id);
                }
            }
            Symbol::N(name) => {
                if let Some(first) = self.nonterminals.get(&name[..]) {
                    set.union_with(first);
                }
            }
            Symbol::R(..) => {
                set.insert(TerminalID::EMPTY);
            }
        }
        set
    }

    /// Return the FIRST set of a sequence of symbols.
    pub fn seq_start(&self, seq: &[Symbol]) -> TerminalSet {
        seq_start(&self.terminals, &self.nonterminals, seq)
    }

    /// Compute the FOLLOW sets of the nonterminals reachable from `goal`.
    pub fn follow_sets(&self, goal: &str) -> FollowSets<'g> {
        let mut visitor = FollowVisitor {
            first: self,
            visited: Set::default(),
            follow: Map::default(),
            subsumes: Map::default(),
        };
        if let Some((goal, _)) = self.grammar.rules().get_key_value(goal) {
            let mut end = TerminalSet::new();
            end.insert(TerminalID::END);
            visitor.follow.insert(&goal[..], end);
            visitor.visit(goal);
        }

        let FollowVisitor {
            mut follow,
            subsumes,
            ..
        } = visitor;
        digraph(&mut follow, &subsumes);
        tracing::debug!(reachable = follow.len(), "FOLLOW sets computed");

        FollowSets { sets: follow }
    }

    pub fn display(&self) -> impl fmt::Display + '_ {
        display_fn(move |f| {
            for (name, set) in &self.nonterminals {
                writeln!(f, "FIRST({}) = {}", name, self.terminals.display_set(set))?;
            }
            Ok(())
        })
    }
}

fn seq_start(
    terminals: &Terminals,
    first: &Map<&str, TerminalSet>,
    seq: &[Symbol],
) -> TerminalSet {
    let mut set = TerminalSet::new();
    set.insert(TerminalID::EMPTY);
    for symbol in seq {
        // the preceding symbols never match the empty string.
        if !set.remove(TerminalID::EMPTY) {
            break;
        }
        match symbol {
            Symbol::T(name) => {
                if let Some(id) = terminals.id(name) {
                    set.insert(id);
                }
            }
            Symbol::N(name) => {
                if let Some(first) = first.get(&name[..]) {
                    set.union_with(first);
                }
            }
            Symbol::R(..) => {
                set.insert(TerminalID::EMPTY);
            }
        }
    }
    set
}

struct FollowVisitor<'a, 'g> {
    first: &'a FirstSets<'g>,
    visited: Set<&'g str>,
    follow: Map<&'g str, TerminalSet>,
    // `x -> [y, ...]`: `x` may appear at the end of a production of `y`,
    // so FOLLOW(x) must include FOLLOW(y).
    subsumes: Map<&'g str, Vec<&'g str>>,
}

impl<'g> FollowVisitor<'_, 'g> {
    fn visit(&mut self, nonterminal: &'g str) {
        if !self.visited.insert(nonterminal) {
            return;
        }
        let grammar: &'g Grammar = self.first.grammar;
        let Some((nonterminal, productions)) = grammar.rules().get_key_value(nonterminal) else {
            return;
        };
        for production in productions {
            for (i, symbol) in production.iter().enumerate() {
                let Symbol::N(symbol) = symbol else {
                    continue;
                };
                self.visit(symbol);

                let mut after = self.first.seq_start(&production[i + 1..]);
                if after.remove(TerminalID::EMPTY) {
                    self.subsumes
                        .entry(&symbol[..])
                        .or_default()
                        .push(&nonterminal[..]);
                }
                self.follow
                    .entry(&symbol[..])
                    .or_default()
                    .union_with(&after);
            }
        }
    }
}

/// FOLLOW sets of the nonterminals reachable from a goal.
#[derive(Debug)]
pub struct FollowSets<'g> {
    sets: Map<&'g str, TerminalSet>,
}

impl FollowSets<'_> {
    /// Return the FOLLOW set of a nonterminal, or `None` if the nonterminal
    /// is unreachable from the goal (an empty FOLLOW set).
    pub fn get(&self, nonterminal: &str) -> Option<&TerminalSet> {
        self.sets.get(nonterminal)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TerminalSet)> + '_ {
        self.sets.iter().map(|(name, set)| (*name, set))
    }

    pub fn display<'a>(&'a self, terminals: &'a Terminals) -> impl fmt::Display + 'a {
        display_fn(move |f| {
            for (name, set) in &self.sets {
                writeln!(f, "FOLLOW({}) = {}", name, terminals.display_set(set))?;
            }
            Ok(())
        })
    }
}
