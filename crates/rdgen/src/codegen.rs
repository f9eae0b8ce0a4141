//! Emission of Rust source code implementing a parse plan.

use crate::plan::{Action, ParsePlan, Procedure};
use std::fmt;

/// Generates a Rust module with one parsing function per nonterminal.
///
/// The emitted code depends only on the `rdgen-runtime` crate.
#[derive(Debug)]
pub struct Codegen<'p> {
    plan: &'p ParsePlan,
    runtime: &'p str,
}

impl<'p> Codegen<'p> {
    pub fn new(plan: &'p ParsePlan) -> Self {
        Self {
            plan,
            runtime: "::rdgen_runtime",
        }
    }

    /// Change the path through which the runtime crate is referenced.
    pub fn runtime_path(mut self, path: &'p str) -> Self {
        self.runtime = path;
        self
    }

    fn procedure_name(&self, nonterminal: &str) -> Option<String> {
        self.plan
            .procedures()
            .get_index_of(nonterminal)
            .map(|index| format!("parse_{}", index))
    }

    fn write_procedure(
        &self,
        f: &mut fmt::Formatter<'_>,
        name: &str,
        procedure: &Procedure,
    ) -> fmt::Result {
        let fn_name = self.procedure_name(name).ok_or(fmt::Error)?;
        // Trailing calls to the procedure itself, as in the epilogues made by
        // left-recursion elimination, restart a loop instead of recursing.
        let looping = procedure
            .alternatives
            .iter()
            .map(|alt| &alt.actions[..])
            .chain(procedure.fallback.as_deref())
            .any(|actions| tail_callee(actions) == Some(name));
        let indent = if looping { "    " } else { "" };

        writeln!(f, "// {:?}", name)?;
        writeln!(f, "#[allow(unreachable_code)]")?;
        writeln!(
            f,
            "fn {}<S>(src: &mut S, stack: &mut TreeStack<S::Token>) -> Result<(), ParseError<S::Error>>",
            fn_name
        )?;
        writeln!(f, "where\n    S: TokenSource + ?Sized,\n{{")?;
        if looping {
            writeln!(f, "    loop {{")?;
        }
        writeln!(f, "{}    match src.peek().map_err(ParseError::Source)? {{", indent)?;
        for alt in &procedure.alternatives {
            write!(f, "{}        Some(", indent)?;
            for (i, token) in alt.guard.iter().enumerate() {
                if i > 0 {
                    f.write_str(" | ")?;
                }
                write!(f, "{:?}", token)?;
            }
            writeln!(f, ") => {{")?;
            self.write_actions(f, name, &alt.actions, looping)?;
            writeln!(f, "{}        }}", indent)?;
        }
        match &procedure.fallback {
            Some(actions) => {
                writeln!(f, "{}        _ => {{", indent)?;
                self.write_actions(f, name, actions, looping)?;
                writeln!(f, "{}        }}", indent)?;
            }
            None => {
                writeln!(
                    f,
                    "{}        token => return Err(unexpected({:?}, token)),",
                    indent, name
                )?;
            }
        }
        writeln!(f, "{}    }}", indent)?;
        if looping {
            writeln!(f, "        return Ok(());")?;
            writeln!(f, "    }}")?;
        } else {
            writeln!(f, "    Ok(())")?;
        }
        writeln!(f, "}}")?;
        Ok(())
    }

    fn write_actions(
        &self,
        f: &mut fmt::Formatter<'_>,
        name: &str,
        actions: &[Action],
        looping: bool,
    ) -> fmt::Result {
        let indent = if looping { "    " } else { "" };
        let (actions, restart) = match actions.split_last() {
            Some((Action::Descend(callee), init)) if looping && callee == name => (init, true),
            _ => (actions, false),
        };
        for action in actions {
            f.write_str(indent)?;
            match action {
                Action::Shift(kind) => {
                    writeln!(f, "            stack.push(shift(src, {:?})?);", kind)?;
                }
                Action::Descend(callee) => match self.procedure_name(callee) {
                    Some(callee) => writeln!(f, "            {}(src, stack)?;", callee)?,
                    None => writeln!(
                        f,
                        "            return Err(ParseError::UndefinedProcedure {{ nonterminal: {:?}.into() }});",
                        callee
                    )?,
                },
                Action::Reduce(r) => {
                    writeln!(
                        f,
                        "            stack.reduce({:?}, {}, {})?;",
                        r.tag, r.index, r.arg_count
                    )?;
                }
            }
        }
        if restart {
            writeln!(f, "{}            continue;", indent)?;
        }
        Ok(())
    }
}

/// Return the nonterminal called by the last action, if any.
fn tail_callee(actions: &[Action]) -> Option<&str> {
    match actions.last() {
        Some(Action::Descend(callee)) => Some(callee.as_str()),
        _ => None,
    }
}

impl fmt::Display for Codegen<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let goal = self.plan.goal();
        let entry = self.procedure_name(goal).ok_or(fmt::Error)?;

        writeln!(f, "// This file is automatically generated by rdgen. Do not edit.")?;
        writeln!(f)?;
        writeln!(f, "#[allow(unused_imports)]")?;
        writeln!(
            f,
            "use {}::_private::{{expect_end, shift, unexpected, ParseError, TokenSource, Tree, TreeStack}};",
            self.runtime
        )?;
        writeln!(f)?;
        writeln!(f, "/// Parse the whole token stream as {:?}.", goal)?;
        writeln!(
            f,
            "pub fn parse<S>(src: &mut S) -> Result<Tree<S::Token>, ParseError<S::Error>>"
        )?;
        writeln!(f, "where\n    S: TokenSource + ?Sized,\n{{")?;
        writeln!(f, "    let mut stack = TreeStack::new();")?;
        writeln!(f, "    {}(src, &mut stack)?;", entry)?;
        writeln!(f, "    expect_end(src)?;")?;
        writeln!(f, "    Ok(stack.finish()?)")?;
        writeln!(f, "}}")?;

        for (name, procedure) in self.plan.procedures() {
            writeln!(f)?;
            self.write_procedure(f, name, procedure)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        grammar::{Grammar, Symbol},
        plan::generate,
        types::Map,
    };

    fn list_plan() -> ParsePlan {
        let g = Grammar::define(|g| {
            g.rules("list", [vec!["list", ",", "ITEM"], vec!["ITEM"]])?;
            Ok(())
        })
        .unwrap();
        generate(&g, "list").unwrap()
    }

    #[test]
    fn emits_one_function_per_nonterminal() {
        let plan = list_plan();
        let code = Codegen::new(&plan).to_string();
        assert!(code.contains("pub fn parse<S>(src: &mut S)"));
        assert!(code.contains("    parse_0(src, &mut stack)?;"));
        assert!(code.contains("/// Parse the whole token stream as \"list\".\n"));
        assert!(code.contains("// \"list\"\n"));
        assert!(code.contains("// \"list'0\"\n"));
        assert!(code.contains("fn parse_1<S>"));
    }

    #[test]
    fn dispatch_arms() {
        let plan = list_plan();
        let code = Codegen::new(&plan).to_string();
        assert!(code.contains(
            "        Some(\"ITEM\") => {\n\
             \x20           stack.push(shift(src, \"ITEM\")?);\n\
             \x20           stack.reduce(\"list\", 1, 1)?;\n\
             \x20           parse_1(src, stack)?;\n\
             \x20       }\n\
             \x20       token => return Err(unexpected(\"list\", token)),\n"
        ));
        assert!(code.contains(
            "// \"list'0\"\n\
             #[allow(unreachable_code)]\n\
             fn parse_1<S>(src: &mut S, stack: &mut TreeStack<S::Token>) -> Result<(), ParseError<S::Error>>\n\
             where\n\
             \x20   S: TokenSource + ?Sized,\n\
             {\n\
             \x20   loop {\n\
             \x20       match src.peek().map_err(ParseError::Source)? {\n\
             \x20           Some(\",\") => {\n\
             \x20               stack.push(shift(src, \",\")?);\n\
             \x20               stack.push(shift(src, \"ITEM\")?);\n\
             \x20               stack.reduce(\"list\", 0, 3)?;\n\
             \x20               continue;\n\
             \x20           }\n\
             \x20           _ => {\n\
             \x20           }\n\
             \x20       }\n\
             \x20       return Ok(());\n\
             \x20   }\n\
             }\n"
        ));
    }

    #[test]
    fn only_self_calls_become_loops() {
        let plan = list_plan();
        let code = Codegen::new(&plan).to_string();
        assert_eq!(code.matches("    loop {").count(), 1);
        assert_eq!(code.matches("continue;").count(), 1);
        assert!(code.contains("    Ok(())\n}\n\n// \"list'0\"\n"));
    }

    #[test]
    fn names_are_escaped_in_comments() {
        let mut rules = Map::default();
        rules.insert("a\nfn b() {}".to_owned(), vec![vec![Symbol::from("X")]]);
        let plan = generate(&Grammar::from_rules(rules), "a\nfn b() {}").unwrap();
        let code = Codegen::new(&plan).to_string();
        assert!(code.contains("// \"a\\nfn b() {}\"\n"));
        assert!(!code.contains("\nfn b() {}"));
    }

    #[test]
    fn multiple_tokens_in_a_guard() {
        let g = Grammar::define(|g| g.rules("atom", [vec!["NUM"], vec!["-", "atom"]])).unwrap();
        let mut plan = generate(&g, "atom").unwrap();
        let code = Codegen::new(&plan).runtime_path("crate::rt").to_string();
        assert!(code.contains("use crate::rt::_private::"));
        assert!(code.contains("Some(\"NUM\") => {"));

        let g = Grammar::define(|g| {
            g.rules("value", [vec!["atom"], vec!["(", "value", ")"]])?;
            g.rules("atom", [vec!["NUM"], vec!["STR"]])?;
            Ok(())
        })
        .unwrap();
        plan = generate(&g, "value").unwrap();
        let code = Codegen::new(&plan).to_string();
        assert!(code.contains("Some(\"NUM\" | \"STR\") => {"));
    }
}
