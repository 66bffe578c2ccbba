//! Map-backed parameter table
//!
//! Identifiers map to expression text rather than values, so a parameter
//! may be defined in terms of others (`second = 2*first`). A lookup evaluates
//! the definition through a [`Scope`] that remembers the chain of symbols
//! being resolved; re-entering the chain is a cycle and growing it past the
//! configured depth is a recursion error. Both resolve to the sentinel and
//! are logged.
//!
//! Within one lookup every symbol is evaluated at most once: results are
//! kept in a [`ResolutionCache`] together with the definition depth they
//! needed, so shared sub-definitions cost nothing the second time.

use super::error::{SymbolError, SymbolResult};
use super::SymbolResolver;
use crate::config::compile_time::symbols::MAX_SYMBOL_IDENTIFIER_LENGTH;
use crate::config::runtime::SymbolPreferences;
use crate::evaluation::{EvalError, Evaluator};
use crate::grammar;
use crate::lexical;
use crate::logging::codes;
use crate::tokens::SENTINEL;
use crate::{log_debug, log_error, log_success, log_warning};
use serde::Deserialize;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    definitions: HashMap<String, String>,
    preferences: SymbolPreferences,
}

/// `[parameters]` document accepted by [`SymbolTable::from_toml_str`]
#[derive(Debug, Deserialize)]
struct TableDocument {
    #[serde(default)]
    parameters: BTreeMap<String, toml::Value>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::with_preferences(SymbolPreferences::default())
    }

    pub fn with_preferences(preferences: SymbolPreferences) -> Self {
        Self {
            definitions: HashMap::new(),
            preferences,
        }
    }

    /// Parse a table from TOML
    ///
    /// ```toml
    /// [parameters]
    /// first = "1"
    /// second = "2*first"
    /// width = 8
    /// ```
    pub fn from_toml_str(content: &str) -> SymbolResult<Self> {
        let document: TableDocument = toml::from_str(content)?;
        let mut table = Self::new();

        for (identifier, value) in document.parameters {
            let expression = match value {
                toml::Value::String(text) => text,
                toml::Value::Integer(number) => number.to_string(),
                toml::Value::Boolean(flag) => flag.to_string(),
                other => {
                    return Err(SymbolError::UnsupportedValue {
                        symbol: identifier,
                        kind: other.type_str().to_string(),
                    })
                }
            };
            table.define(&identifier, &expression)?;
        }

        log_success!(codes::success::SYMBOL_TABLE_LOADED, "Symbol table loaded",
            "symbols" => table.len()
        );

        Ok(table)
    }

    /// Load a `[parameters]` TOML file
    pub fn load(path: &Path) -> SymbolResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| SymbolError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Add or replace a definition
    pub fn define(&mut self, identifier: &str, expression: &str) -> SymbolResult<()> {
        let identifier = identifier.trim();
        validate_identifier(identifier)?;

        let expression = expression.trim();
        if let Some(previous) = self
            .definitions
            .insert(identifier.to_string(), expression.to_string())
        {
            log_warning!("Symbol redefined",
                "symbol" => identifier,
                "previous" => previous,
                "current" => expression
            );
        }
        Ok(())
    }

    pub fn remove(&mut self, identifier: &str) -> Option<String> {
        self.definitions.remove(identifier)
    }

    /// Definition text of a symbol
    pub fn definition(&self, identifier: &str) -> Option<&str> {
        self.definitions.get(identifier).map(String::as_str)
    }

    pub fn is_defined(&self, identifier: &str) -> bool {
        self.definitions.contains_key(identifier)
    }

    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn preferences(&self) -> &SymbolPreferences {
        &self.preferences
    }

    /// Value of a symbol, reporting why it has none
    pub fn try_resolve(&self, symbol: &str) -> SymbolResult<String> {
        let cache = ResolutionCache::default();
        Scope::root(self, &cache).try_resolve(symbol)
    }
}

impl SymbolResolver for SymbolTable {
    fn is_symbol(&self, token: &str) -> bool {
        let cache = ResolutionCache::default();
        Scope::root(self, &cache).is_symbol(token)
    }

    fn resolve(&self, token: &str) -> String {
        let cache = ResolutionCache::default();
        Scope::root(self, &cache).resolve(token)
    }

    fn base_for_symbol(&self, token: &str) -> u32 {
        let cache = ResolutionCache::default();
        Scope::root(self, &cache).base_for_symbol(token)
    }
}

fn validate_identifier(identifier: &str) -> SymbolResult<()> {
    // Boolean spellings always lex as literals and could never be looked up
    if identifier.len() > MAX_SYMBOL_IDENTIFIER_LENGTH
        || !grammar::is_identifier(identifier)
        || grammar::is_boolean_literal(identifier)
    {
        log_error!(codes::symbols::INVALID_IDENTIFIER, "Rejected symbol identifier",
            "identifier" => identifier,
            "max_length" => MAX_SYMBOL_IDENTIFIER_LENGTH
        );
        return Err(SymbolError::invalid_identifier(identifier));
    }
    Ok(())
}

// ============================================================================
// RESOLUTION SCOPE
// ============================================================================

/// Result computed during one lookup, with the number of nested definitions
/// it needed (the symbol's own included)
#[derive(Debug)]
struct Resolved<T> {
    value: T,
    height: usize,
}

/// Values and bases computed so far in one top-level lookup
///
/// Only results that are independent of where they were reached from are
/// kept: successful values, and bases whose whole definition tree was
/// entered. Failures depend on the chain and are recomputed.
#[derive(Debug, Default)]
struct ResolutionCache {
    values: RefCell<HashMap<String, Resolved<String>>>,
    bases: RefCell<HashMap<String, Resolved<u32>>>,
}

/// Resolver view of a table while `chain` is being resolved, outermost first
#[derive(Debug)]
struct Scope<'t> {
    table: &'t SymbolTable,
    cache: &'t ResolutionCache,
    chain: Vec<String>,
    /// Height of the tallest symbol resolved through this scope
    reach: Cell<usize>,
    /// False once some definition below this scope could not be entered
    complete: Cell<bool>,
}

impl<'t> Scope<'t> {
    fn root(table: &'t SymbolTable, cache: &'t ResolutionCache) -> Self {
        Self::with_chain(table, cache, Vec::new())
    }

    fn with_chain(table: &'t SymbolTable, cache: &'t ResolutionCache, chain: Vec<String>) -> Self {
        Self {
            table,
            cache,
            chain,
            reach: Cell::new(0),
            complete: Cell::new(true),
        }
    }

    /// Scope for evaluating the definition of `symbol`
    fn enter(&self, symbol: &str) -> SymbolResult<Scope<'t>> {
        if self.chain.iter().any(|pending| pending == symbol) {
            return Err(SymbolError::circular_reference(&self.chain, symbol));
        }

        let limit = self.table.preferences.effective_recursion_depth();
        if self.chain.len() >= limit {
            return Err(SymbolError::recursion_limit_exceeded(symbol, limit));
        }

        let mut chain = self.chain.clone();
        chain.push(symbol.to_string());
        Ok(Scope::with_chain(self.table, self.cache, chain))
    }

    /// Earlier result for `symbol`, if it still fits below the current chain
    fn cached<T: Clone>(
        &self,
        entries: &RefCell<HashMap<String, Resolved<T>>>,
        symbol: &str,
    ) -> Option<T> {
        let entries = entries.borrow();
        let hit = entries.get(symbol)?;
        if self.chain.len() + hit.height > self.table.preferences.effective_recursion_depth() {
            return None;
        }
        self.reach.set(self.reach.get().max(hit.height));
        Some(hit.value.clone())
    }

    /// Record the result of evaluating `symbol` in the child scope `inner`
    fn remember<T>(
        &self,
        entries: &RefCell<HashMap<String, Resolved<T>>>,
        symbol: &str,
        value: T,
        inner: &Scope<'_>,
    ) {
        let height = inner.reach.get() + 1;
        self.reach.set(self.reach.get().max(height));
        entries
            .borrow_mut()
            .insert(symbol.to_string(), Resolved { value, height });
    }

    fn try_resolve(&self, symbol: &str) -> SymbolResult<String> {
        if let Some(value) = self.cached(&self.cache.values, symbol) {
            return Ok(value);
        }

        let definition =
            self.table
                .definition(symbol)
                .ok_or_else(|| SymbolError::UndefinedSymbol {
                    symbol: symbol.to_string(),
                })?;
        let scope = self.enter(symbol)?;
        let invalid = |source: EvalError| SymbolError::InvalidDefinition {
            symbol: symbol.to_string(),
            source,
        };

        let postfix = lexical::convert(definition).map_err(|error| invalid(error.into()))?;
        let value = Evaluator::new(&scope).evaluate(&postfix).map_err(invalid)?;

        self.remember(&self.cache.values, symbol, value.clone(), &scope);
        Ok(value)
    }

    fn report(&self, symbol: &str, error: &SymbolError) {
        match error {
            SymbolError::CircularReference { cycle } => {
                log_error!(error.error_code(), "Circular symbol definition",
                    "symbol" => symbol,
                    "cycle_path" => cycle.join(" -> ")
                );
            }
            SymbolError::RecursionLimitExceeded { limit, .. } => {
                log_error!(error.error_code(), "Symbol definitions nest too deeply",
                    "symbol" => symbol,
                    "limit" => limit,
                    "chain" => self.chain.join(" -> ")
                );
            }
            _ => {
                log_debug!(code = error.error_code(), "Symbol has no valid value",
                    "symbol" => symbol,
                    "error" => error
                );
            }
        }
    }
}

impl SymbolResolver for Scope<'_> {
    fn is_symbol(&self, token: &str) -> bool {
        let defined = self.table.is_defined(token);
        if !defined && self.table.preferences.log_unresolved && grammar::is_identifier(token) {
            log_debug!("Identifier has no definition",
                "identifier" => token,
                "depth" => self.chain.len()
            );
        }
        defined
    }

    fn resolve(&self, token: &str) -> String {
        match self.try_resolve(token) {
            Ok(value) => value,
            Err(error) => {
                self.report(token, &error);
                SENTINEL.to_string()
            }
        }
    }

    /// Greatest base used by the symbol's own definition
    fn base_for_symbol(&self, token: &str) -> u32 {
        let Some(definition) = self.table.definition(token) else {
            return 0;
        };
        if let Some(base) = self.cached(&self.cache.bases, token) {
            return base;
        }

        match self.enter(token) {
            Ok(scope) => {
                let postfix = lexical::to_postfix(definition);
                let base = crate::parser::base_for_postfix(&postfix, &scope);
                if scope.complete.get() {
                    self.remember(&self.cache.bases, token, base, &scope);
                } else {
                    self.complete.set(false);
                }
                base
            }
            Err(error) => {
                self.complete.set(false);
                self.report(token, &error);
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::evaluate;
    use assert_matches::assert_matches;

    fn table(definitions: &[(&str, &str)]) -> SymbolTable {
        let mut table = SymbolTable::new();
        for (identifier, expression) in definitions {
            table.define(identifier, expression).unwrap();
        }
        table
    }

    fn eval(table: &SymbolTable, expression: &str) -> (String, bool) {
        let result = evaluate(&lexical::to_postfix(expression), table);
        (result.value, result.is_valid)
    }

    #[test]
    fn test_definitions_reference_each_other() {
        let table = table(&[("first", "1"), ("second", "2*first")]);

        assert_eq!(table.resolve("second"), "2");
        assert_eq!(eval(&table, "second**3"), ("8".to_string(), true));
        assert_eq!(eval(&table, "{first, second}"), ("{1,2}".to_string(), true));
    }

    #[test]
    fn test_cycles_resolve_to_sentinel() {
        let table = table(&[("first", "second"), ("second", "first + 1"), ("ok", "3")]);

        assert_eq!(table.resolve("first"), "x");
        assert_eq!(eval(&table, "first + ok"), ("x".to_string(), false));
        assert_eq!(eval(&table, "ok"), ("3".to_string(), true));

        let selfish = self::table(&[("loop", "loop")]);
        assert_matches!(
            selfish.try_resolve("loop"),
            Err(SymbolError::InvalidDefinition {
                source: crate::evaluation::EvalError::InvalidSymbolValue { .. },
                ..
            })
        );
        let cache = ResolutionCache::default();
        assert_matches!(
            Scope::root(&selfish, &cache).enter("loop").unwrap().enter("loop"),
            Err(SymbolError::CircularReference { .. })
        );
    }

    #[test]
    fn test_recursion_limit() {
        let mut table = SymbolTable::with_preferences(SymbolPreferences {
            max_recursion_depth: 2,
            log_unresolved: false,
        });
        table.define("a", "b").unwrap();
        table.define("b", "c").unwrap();
        table.define("c", "1").unwrap();

        assert_eq!(table.resolve("b"), "1");
        assert_eq!(table.resolve("a"), "x");
    }

    #[test]
    fn test_invalid_identifiers_rejected() {
        let mut table = SymbolTable::new();
        assert_matches!(
            table.define("1width", "8"),
            Err(SymbolError::InvalidIdentifier { .. })
        );
        assert_matches!(
            table.define("TRUE", "1"),
            Err(SymbolError::InvalidIdentifier { .. })
        );
        let long = "w".repeat(MAX_SYMBOL_IDENTIFIER_LENGTH + 1);
        assert_matches!(
            table.define(&long, "1"),
            Err(SymbolError::InvalidIdentifier { .. })
        );
        assert!(table.is_empty());
    }

    #[test]
    fn test_undefined_and_invalid_definitions() {
        let table = table(&[("ratio", "1/0")]);
        assert_matches!(
            table.try_resolve("missing"),
            Err(SymbolError::UndefinedSymbol { .. })
        );
        assert_matches!(
            table.try_resolve("ratio"),
            Err(SymbolError::InvalidDefinition { .. })
        );
        assert!(!table.is_symbol("missing"));
    }

    #[test]
    fn test_symbol_named_like_the_sentinel() {
        let table = table(&[("x", "5"), ("broken", "(1+2"), ("wide", "(8'hFF")]);

        assert_eq!(eval(&table, "x * 2"), ("10".to_string(), true));
        assert_matches!(
            table.try_resolve("broken"),
            Err(SymbolError::InvalidDefinition {
                source: EvalError::Conversion(lexical::ConversionError::UnbalancedBrackets { .. }),
                ..
            })
        );
        assert_eq!(table.resolve("broken"), "x");
        assert_eq!(eval(&table, "(1+2"), ("x".to_string(), false));
        assert_eq!(eval(&table, "broken * 2"), ("x".to_string(), false));
        assert_eq!(crate::parser::base_for_expression_with("(8'hFF", &table), 0);
        assert_eq!(table.base_for_symbol("wide"), 0);
    }

    #[test]
    fn test_shared_definitions_resolve_once_per_lookup() {
        // Every level doubles the references to the level below
        let mut definitions = vec![("a0".to_string(), "'h1".to_string())];
        for level in 1..=15 {
            definitions.push((
                format!("a{}", level),
                format!("a{prev} + a{prev}", prev = level - 1),
            ));
        }
        let mut table = SymbolTable::new();
        for (identifier, expression) in &definitions {
            table.define(identifier, expression).unwrap();
        }

        assert_eq!(table.resolve("a15"), "32768");
        assert_eq!(table.base_for_symbol("a15"), 16);
        assert_eq!(eval(&table, "a15 - a14"), ("16384".to_string(), true));
    }

    #[test]
    fn test_cached_results_respect_recursion_limit() {
        let mut table = SymbolTable::with_preferences(SymbolPreferences {
            max_recursion_depth: 3,
            log_unresolved: false,
        });
        table.define("leaf", "1").unwrap();
        table.define("mid", "leaf + 1").unwrap();
        table.define("top", "mid + mid").unwrap();
        // `mid` is first resolved with room to spare, then needed one level deeper
        table.define("outer", "mid + top").unwrap();

        assert_eq!(table.resolve("top"), "4");
        assert_eq!(table.resolve("outer"), "x");
        assert_eq!(table.base_for_symbol("top"), 10);
    }

    #[test]
    fn test_redefinition_replaces_expression() {
        let mut table = table(&[("width", "8")]);
        table.define("width", "16").unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.resolve("width"), "16");
    }

    #[test]
    fn test_symbol_base_follows_definition() {
        let table = table(&[("mask", "8'hFF"), ("derived", "mask + 1"), ("plain", "3")]);
        assert_eq!(table.base_for_symbol("mask"), 16);
        assert_eq!(table.base_for_symbol("derived"), 16);
        assert_eq!(table.base_for_symbol("plain"), 10);
        assert_eq!(table.base_for_symbol("missing"), 0);
    }

    #[test]
    fn test_from_toml() {
        let table = SymbolTable::from_toml_str(
            r#"
            [parameters]
            first = "1"
            second = "2*first"
            width = 8
            "#,
        )
        .unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.definition("width"), Some("8"));
        assert_eq!(table.resolve("second"), "2");

        assert_matches!(
            SymbolTable::from_toml_str("[parameters]\nratio = 1.5"),
            Err(SymbolError::UnsupportedValue { .. })
        );
        assert_matches!(
            SymbolTable::from_toml_str("[parameters"),
            Err(SymbolError::Toml(_))
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.toml");
        std::fs::write(&path, "[parameters]\nwidth = 8\nmask = \"2**width - 1\"\n").unwrap();

        let table = SymbolTable::load(&path).unwrap();
        assert_eq!(table.resolve("mask"), "255");

        assert_matches!(
            SymbolTable::load(&dir.path().join("missing.toml")),
            Err(SymbolError::Io { .. })
        );
    }
}
