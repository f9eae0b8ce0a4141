//! Tests for the parsers generated from the grammars in `rdgen/tests`.

#[cfg(test)]
mod g_arithmetic;
#[cfg(test)]
mod g_json;
#[cfg(test)]
mod g_statements;
