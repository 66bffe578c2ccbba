//! Global logging module for the expression engine
//!
//! Provides thread-safe global logging with per-thread expression context
//! and a clean macro interface. Until `init_global_logging` is called every
//! macro is a no-op, so library consumers that never initialise logging pay
//! only for the level check.

pub mod codes;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::sync::{Arc, OnceLock};

// Re-export main types
pub use codes::Code;
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, Logger, LoggingService, MemoryLogger, StructuredLogger};

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

thread_local! {
    static EXPRESSION_CONTEXT: RefCell<Option<String>> = const { RefCell::new(None) };
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize global logging system
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    let logging_service = Arc::new(service::create_configured_service());

    GLOBAL_LOGGER
        .set(logging_service.clone())
        .map_err(|_| "Global logger already initialized")?;

    // Validate error code system
    let required_codes = [
        codes::system::INTERNAL_ERROR,
        codes::conversion::UNBALANCED_BRACKETS,
        codes::evaluation::MISSING_OPERAND,
        codes::symbols::CIRCULAR_REFERENCE,
    ];
    for code in required_codes {
        if codes::get_description(code.as_str()) == "Unknown error" {
            return Err(format!("Missing metadata for error code: {}", code));
        }
    }

    logging_service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));

    Ok(())
}

/// Initialize with custom service (primarily for testing)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())
}

/// Check if global logging is initialized
pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

/// Safe access to global logger
pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

/// Whether an event at `level` would reach a logger
pub fn is_enabled(level: LogLevel) -> bool {
    try_get_global_logger()
        .map(|logger| logger.should_log(level))
        .unwrap_or(false)
}

// ============================================================================
// EXPRESSION CONTEXT MANAGEMENT
// ============================================================================

/// Execute function with the expression under evaluation recorded for this thread
///
/// Contexts nest: the previous expression is restored when `f` returns, so a
/// symbol evaluated on behalf of an outer expression logs its own text.
pub fn with_expression_context<F, R>(expression: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    let previous =
        EXPRESSION_CONTEXT.with(|ctx| ctx.borrow_mut().replace(expression.to_string()));
    let result = f();
    EXPRESSION_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = previous;
    });
    result
}

/// Get current expression context (used by macros)
pub fn get_current_expression() -> Option<String> {
    EXPRESSION_CONTEXT.with(|ctx| ctx.borrow().clone())
}

fn attach_expression(event: LogEvent) -> LogEvent {
    match get_current_expression() {
        Some(expression) => event.with_context("expression", &expression),
        None => event,
    }
}

// ============================================================================
// MACRO SUPPORT FUNCTIONS
// ============================================================================

/// Log error with context (used by log_error! macro)
pub fn log_error_with_context(
    code: Code,
    message: &str,
    span: Option<crate::utils::Span>,
    context: Vec<(&str, &str)>,
) {
    let Some(logger) = try_get_global_logger() else {
        return;
    };

    let mut event = LogEvent::error(code, message);
    if let Some(s) = span {
        event = event.with_span(s);
    }
    for (key, value) in context {
        event = event.with_context(key, value);
    }

    logger.log_event(attach_expression(event));
}

/// Log success with context (used by log_success! macro)
pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    let Some(logger) = try_get_global_logger() else {
        return;
    };

    let mut event = LogEvent::success(code, message);
    for (key, value) in context {
        event = event.with_context(key, value);
    }

    logger.log_event(attach_expression(event));
}

/// Log info with context (used by log_info! macro)
pub fn log_info_with_context(message: &str, context: Vec<(&str, &str)>) {
    let Some(logger) = try_get_global_logger() else {
        return;
    };

    let mut event = LogEvent::info(message);
    for (key, value) in context {
        event = event.with_context(key, value);
    }

    logger.log_event(attach_expression(event));
}

/// Log warning with context (used by log_warning! macro)
pub fn log_warning_with_context(message: &str, context: Vec<(&str, &str)>) {
    let Some(logger) = try_get_global_logger() else {
        return;
    };

    let mut event = LogEvent::warning(message);
    for (key, value) in context {
        event = event.with_context(key, value);
    }

    logger.log_event(attach_expression(event));
}

/// Log debug with optional code, span and context (used by log_debug! macro)
pub fn log_debug_with_context(
    code: Option<Code>,
    message: &str,
    span: Option<crate::utils::Span>,
    context: Vec<(&str, &str)>,
) {
    let Some(logger) = try_get_global_logger() else {
        return;
    };

    let mut event = match code {
        Some(code) => LogEvent::debug_with_code(code, message),
        None => LogEvent::debug(message),
    };
    if let Some(s) = span {
        event = event.with_span(s);
    }
    for (key, value) in context {
        event = event.with_context(key, value);
    }

    logger.log_event(attach_expression(event));
}

// ============================================================================
// SAFE FALLBACK LOGGING
// ============================================================================

/// Safe error logging (won't panic if uninitialized)
pub fn safe_log_error(code: Code, message: &str) {
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(LogEvent::error(code, message));
    } else {
        eprintln!("[ERROR] FALLBACK: [{}] {}", code.as_str(), message);
    }
}

/// Get system diagnostics
pub fn get_system_diagnostics() -> String {
    let mut diagnostics = String::new();

    diagnostics.push_str("=== Logging System Diagnostics ===\n");
    diagnostics.push_str(&format!("Initialized: {}\n", is_initialized()));
    if let Some(logger) = try_get_global_logger() {
        diagnostics.push_str(&format!("Active level: {}\n", logger.min_level().as_str()));
    }
    diagnostics.push('\n');
    diagnostics.push_str(&config::get_config_summary());

    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expression_context_nests() {
        assert!(get_current_expression().is_none());

        let inner = with_expression_context("a + b", || {
            assert_eq!(get_current_expression().as_deref(), Some("a + b"));
            with_expression_context("2*a", || get_current_expression())
        });

        assert_eq!(inner.as_deref(), Some("2*a"));
        assert!(get_current_expression().is_none());
    }

    #[test]
    fn test_with_expression_context_returns_value() {
        let result = with_expression_context("1+1", || 42);
        assert_eq!(result, 42);
    }

    #[test]
    fn test_safe_logging() {
        // Must not panic whether or not global logging is initialized
        safe_log_error(codes::system::INTERNAL_ERROR, "Test error");
    }

    #[test]
    fn test_diagnostics() {
        let diagnostics = get_system_diagnostics();
        assert!(diagnostics.contains("Logging System Diagnostics"));
        assert!(diagnostics.contains("Initialized:"));
    }
}
