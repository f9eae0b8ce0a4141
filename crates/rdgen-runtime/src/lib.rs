//! Runtime implementation for `rdgen` parser generator.

pub mod parser;
pub mod source;
pub mod tree;

// internally used by codegen.
#[doc(hidden)]
pub mod _private {
    pub use crate::{
        parser::{expect_end, shift, unexpected, ParseError},
        source::TokenSource,
        tree::{Tree, TreeStack},
    };
}
