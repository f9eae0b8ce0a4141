//! Direct interpretation of parse plans.

use crate::plan::{Action, ParsePlan};
use rdgen_runtime::{
    parser::{expect_end, shift, unexpected, ParseError},
    source::TokenSource,
    tree::{Tree, TreeStack},
};

impl ParsePlan {
    /// Parse the whole token stream as the goal nonterminal.
    pub fn parse<S>(&self, src: &mut S) -> Result<Tree<S::Token>, ParseError<S::Error>>
    where
        S: TokenSource + ?Sized,
    {
        let mut stack = TreeStack::new();
        self.descend(self.goal(), src, &mut stack)?;
        expect_end(src)?;
        Ok(stack.finish()?)
    }

    fn descend<'p, S>(
        &'p self,
        mut nonterminal: &'p str,
        src: &mut S,
        stack: &mut TreeStack<S::Token>,
    ) -> Result<(), ParseError<S::Error>>
    where
        S: TokenSource + ?Sized,
    {
        loop {
            let procedure = self
                .procedure(nonterminal)
                .ok_or_else(|| ParseError::UndefinedProcedure {
                    nonterminal: nonterminal.to_owned(),
                })?;

            let token = src.peek().map_err(ParseError::Source)?;
            tracing::trace!(nonterminal, ?token, "select alternative");
            let actions = match procedure.select(token) {
                Some(actions) => actions,
                None => return Err(unexpected(nonterminal, token)),
            };

            // A trailing call reuses this frame.
            let (actions, tail) = match actions.split_last() {
                Some((Action::Descend(callee), init)) => (init, Some(callee)),
                _ => (actions, None),
            };
            for action in actions {
                match action {
                    Action::Shift(kind) => stack.push(shift(src, kind)?),
                    Action::Descend(callee) => self.descend(callee, src, stack)?,
                    Action::Reduce(r) => stack.reduce(r.tag.clone(), r.index, r.arg_count)?,
                }
            }

            match tail {
                Some(callee) => nonterminal = callee.as_str(),
                None => return Ok(()),
            }
        }
    }
}
