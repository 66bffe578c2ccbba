//! Token model shared by the converter and the evaluator
//!
//! The converter produces a [`PostfixSequence`] of [`Token`]s in
//! reverse-polish order; the evaluator consumes it. A sequence holding only
//! the [`SENTINEL`] token marks an expression that could not be converted.

pub mod token;

pub use token::{LiteralKind, PostfixSequence, Token, TokenClass, SENTINEL};
