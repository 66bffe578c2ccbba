// build.rs - TOML-driven compile-time constant generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    expression: ExpressionLimits,
    symbols: SymbolLimits,
    logging: LoggingLimits,
}

#[derive(serde::Deserialize)]
struct ExpressionLimits {
    max_expression_length: usize,
    max_token_count: usize,
}

#[derive(serde::Deserialize)]
struct SymbolLimits {
    max_recursion_depth: usize,
    max_symbol_identifier_length: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    log_buffer_size: usize,
    max_log_message_length: usize,
    security_min_log_level: u8,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=SVEXPR_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=SVEXPR_CONFIG_DIR");

    let profile = env::var("SVEXPR_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("SVEXPR_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Find workspace root (parent of sv_expr directory)
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_EXPRESSION_LENGTH: usize = 1_048_576;
    const ABSOLUTE_MAX_RECURSION_DEPTH: usize = 256;

    if config.expression.max_expression_length > ABSOLUTE_MAX_EXPRESSION_LENGTH {
        panic!("LIMITS: max_expression_length exceeds absolute maximum");
    }

    if config.expression.max_expression_length == 0 || config.expression.max_token_count == 0 {
        panic!("LIMITS: expression limits must be non-zero");
    }

    if config.symbols.max_recursion_depth > ABSOLUTE_MAX_RECURSION_DEPTH {
        panic!("LIMITS: max_recursion_depth exceeds absolute maximum");
    }

    if config.logging.security_min_log_level > 2 {
        panic!("LIMITS: security_min_log_level too high (max: 2)");
    }

    if profile == "production" && config.expression.max_expression_length > 65_536 {
        panic!("PRODUCTION: max_expression_length too high for production");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod expression {{
        pub const MAX_EXPRESSION_LENGTH: usize = {};
        pub const MAX_TOKEN_COUNT: usize = {};
    }}

    pub mod symbols {{
        pub const MAX_RECURSION_DEPTH: usize = {};
        pub const MAX_SYMBOL_IDENTIFIER_LENGTH: usize = {};
    }}

    pub mod logging {{
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const SECURITY_MIN_LOG_LEVEL: u8 = {};
    }}
}}
"#,
        profile,
        config.expression.max_expression_length,
        config.expression.max_token_count,
        config.symbols.max_recursion_depth,
        config.symbols.max_symbol_identifier_length,
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
        config.logging.security_min_log_level,
    );

    fs::write(output_path, constants_code).unwrap();
}
