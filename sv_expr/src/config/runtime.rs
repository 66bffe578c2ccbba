// RUNTIME PREFERENCES (User Experience)

use crate::config::compile_time::{expression, symbols};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Failure to load runtime preferences from a TOML document
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read configuration file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid runtime configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationPreferences {
    /// Whether failed evaluations are traced at debug level
    pub log_failures: bool,

    /// Whether the converter keeps a per-operator usage histogram
    pub track_operator_usage: bool,

    /// Longest accepted expression; never above the compile-time limit
    pub max_expression_length: usize,

    /// Whether completed evaluations emit performance events
    pub log_performance: bool,
}

impl Default for EvaluationPreferences {
    fn default() -> Self {
        Self {
            log_failures: env::var("SVEXPR_LOG_FAILURES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            track_operator_usage: env::var("SVEXPR_TRACK_OPERATORS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            max_expression_length: env::var("SVEXPR_MAX_EXPRESSION_LENGTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(expression::MAX_EXPRESSION_LENGTH),
            log_performance: env::var("SVEXPR_LOG_PERFORMANCE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

impl EvaluationPreferences {
    /// Length limit actually enforced (user preference within compile-time bounds)
    pub fn effective_max_expression_length(&self) -> usize {
        self.max_expression_length
            .min(expression::MAX_EXPRESSION_LENGTH)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolPreferences {
    /// How deep symbol definitions may reference other symbols
    pub max_recursion_depth: usize,

    /// Whether lookups of unknown identifiers are traced
    pub log_unresolved: bool,
}

impl Default for SymbolPreferences {
    fn default() -> Self {
        Self {
            max_recursion_depth: env::var("SVEXPR_SYMBOLS_MAX_RECURSION_DEPTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(symbols::MAX_RECURSION_DEPTH),
            log_unresolved: env::var("SVEXPR_SYMBOLS_LOG_UNRESOLVED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

impl SymbolPreferences {
    /// Recursion depth actually enforced (user preference within compile-time bounds)
    pub fn effective_recursion_depth(&self) -> usize {
        self.max_recursion_depth.min(symbols::MAX_RECURSION_DEPTH)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging (user preference)
    pub use_structured_logging: bool,

    /// Whether to enable console output (user preference)
    pub enable_console_logging: bool,

    /// User preferred minimum log level (within security constraints)
    pub min_log_level: LogLevel,

    /// Whether to include performance metrics in logs
    pub log_performance_events: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var("SVEXPR_LOGGING_USE_STRUCTURED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var("SVEXPR_LOGGING_ENABLE_CONSOLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            min_log_level: env::var("SVEXPR_LOGGING_MIN_LEVEL")
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Warning),
            log_performance_events: env::var("SVEXPR_LOGGING_LOG_PERFORMANCE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Convert to events::LogLevel for compatibility
    pub fn to_events_log_level(&self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

/// Parse log level from string (used for environment variables)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub evaluation: EvaluationPreferences,
    pub symbols: SymbolPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Parse preferences from a TOML document; missing sections keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load preferences from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // Evaluation
    pub const LOG_FAILURES: &str = "SVEXPR_LOG_FAILURES";
    pub const TRACK_OPERATORS: &str = "SVEXPR_TRACK_OPERATORS";
    pub const MAX_EXPRESSION_LENGTH: &str = "SVEXPR_MAX_EXPRESSION_LENGTH";
    pub const LOG_PERFORMANCE: &str = "SVEXPR_LOG_PERFORMANCE";

    // Symbols
    pub const SYMBOLS_MAX_RECURSION_DEPTH: &str = "SVEXPR_SYMBOLS_MAX_RECURSION_DEPTH";
    pub const SYMBOLS_LOG_UNRESOLVED: &str = "SVEXPR_SYMBOLS_LOG_UNRESOLVED";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "SVEXPR_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "SVEXPR_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "SVEXPR_LOGGING_MIN_LEVEL";
    pub const LOGGING_LOG_PERFORMANCE: &str = "SVEXPR_LOGGING_LOG_PERFORMANCE";
}
