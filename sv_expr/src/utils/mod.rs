//! Shared location types used by the converter, evaluator and logging layer.

pub mod span;

pub use span::{Position, Span};
