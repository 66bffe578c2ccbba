// Internal modules
pub mod config;
pub mod evaluation;
pub mod grammar;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod numeric;
pub mod parser;
pub mod symbols;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use evaluation::{EvalError, Evaluation};
pub use lexical::{to_postfix, ConversionError};
pub use parser::{
    base_for_expression, base_for_expression_with, is_array_expression, is_plain_value,
    parse_expression, parse_expression_with, try_parse_expression, ExpressionParser,
};
pub use symbols::{NoSymbols, SymbolError, SymbolResolver, SymbolTable};
pub use tokens::{PostfixSequence, Token, SENTINEL};
