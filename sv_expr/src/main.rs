use serde_json::json;
use std::env;
use std::path::Path;
use sv_expr::config::runtime::RuntimeConfig;
use sv_expr::logging::codes;
use sv_expr::{lexical, log_info, log_success, logging, symbols, ExpressionParser, SymbolTable};

/// Parsed command line
#[derive(Debug, Default)]
struct CliOptions {
    show_postfix: bool,
    show_base: bool,
    show_stats: bool,
    json: bool,
    config_path: Option<String>,
    symbol_files: Vec<String>,
    definitions: Vec<(String, String)>,
    expressions: Vec<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let program_name = args.first().map(String::as_str).unwrap_or("sv_expr");

    if args.len() < 2 {
        eprintln!("Usage: {} [options] <expression>...", program_name);
        eprintln!("       {} --help", program_name);
        std::process::exit(1);
    }

    if wants_help(&args[1..]) {
        print_help(program_name);
        return Ok(());
    }

    let options = match parse_options(&args[1..]) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            std::process::exit(1);
        }
    };

    let config = match &options.config_path {
        Some(path) => RuntimeConfig::load(Path::new(path))?,
        None => RuntimeConfig::default(),
    };

    // Initialize global logging system
    logging::config::init_runtime_preferences(config.logging.clone())?;
    logging::init_global_logging()?;
    let module_checks =
        lexical::init_conversion_logging().and_then(|_| symbols::init_symbol_logging());
    if let Err(message) = module_checks {
        logging::safe_log_error(codes::system::INITIALIZATION_FAILURE, &message);
        return Err(message.into());
    }
    if let Some(path) = &options.config_path {
        log_info!("Runtime configuration loaded", "path" => path);
    }

    let mut table = SymbolTable::with_preferences(config.symbols.clone());
    for path in &options.symbol_files {
        let loaded = SymbolTable::load(Path::new(path))?;
        log_info!("Symbol file loaded", "path" => path, "symbols" => loaded.len());
        for identifier in loaded.identifiers() {
            if let Some(expression) = loaded.definition(identifier) {
                table.define(identifier, expression)?;
            }
        }
    }
    for (identifier, expression) in &options.definitions {
        table.define(identifier, expression)?;
    }

    let mut parser = ExpressionParser::with_preferences(&table, config.evaluation.clone());
    let mut all_valid = true;

    for expression in &options.expressions {
        let result = parser.parse(expression);
        all_valid &= result.is_valid;

        if options.json {
            let mut record = json!({
                "expression": expression,
                "value": result.value,
                "is_valid": result.is_valid,
            });
            if options.show_postfix {
                record["postfix"] = json!(parser.to_postfix(expression).to_string());
            }
            if options.show_base {
                record["base"] = json!(parser.base_for_expression(expression));
            }
            if options.show_stats {
                record["conversion"] = serde_json::to_value(parser.conversion_metrics())?;
                record["evaluation"] = serde_json::to_value(parser.evaluation_metrics())?;
            }
            println!("{}", record);
            continue;
        }

        let validity = if result.is_valid { "valid" } else { "invalid" };
        println!("{} => {} ({})", expression, result.value, validity);
        if options.show_postfix {
            println!("    postfix: {}", parser.to_postfix(expression));
        }
        if options.show_base {
            println!("    base: {}", parser.base_for_expression(expression));
        }
        if options.show_stats {
            print_stats(&parser);
        }
    }

    log_success!(codes::success::OPERATION_COMPLETED_SUCCESSFULLY, "Expressions evaluated",
        "count" => options.expressions.len(),
        "all_valid" => all_valid
    );

    if !all_valid {
        std::process::exit(1);
    }

    Ok(())
}

/// `--help` counts only before a bare `--`; after it, it is an expression
fn wants_help(args: &[String]) -> bool {
    args.iter()
        .take_while(|arg| *arg != "--")
        .any(|arg| arg == "--help")
}

fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--postfix" => options.show_postfix = true,
            "--base" => options.show_base = true,
            "--stats" => options.show_stats = true,
            "--json" => options.json = true,
            "--define" => {
                let assignment = args.get(i + 1).ok_or("--define requires NAME=EXPR")?;
                let (name, expression) = assignment.split_once('=').ok_or_else(|| {
                    format!("Invalid definition '{}', expected NAME=EXPR", assignment)
                })?;
                options
                    .definitions
                    .push((name.trim().to_string(), expression.to_string()));
                i += 1;
            }
            "--symbols" => {
                let path = args.get(i + 1).ok_or("--symbols requires a file path")?;
                options.symbol_files.push(path.clone());
                i += 1;
            }
            "--config" => {
                let path = args.get(i + 1).ok_or("--config requires a file path")?;
                options.config_path = Some(path.clone());
                i += 1;
            }
            // Everything after a bare `--` is an expression, even if it starts with '-'
            "--" => {
                options.expressions.extend(args[i + 1..].iter().cloned());
                break;
            }
            other if other.starts_with("--") => {
                eprintln!("Warning: Unknown option '{}'", other);
            }
            expression => options.expressions.push(expression.to_string()),
        }
        i += 1;
    }

    if options.expressions.is_empty() {
        return Err("No expressions given".to_string());
    }

    Ok(options)
}

fn print_stats<R: sv_expr::SymbolResolver + ?Sized>(parser: &ExpressionParser<'_, R>) {
    let conversion = parser.conversion_metrics();
    let evaluation = parser.evaluation_metrics();

    println!(
        "    tokens: {} (literals {}, operators {}, structural {}, symbols {}, unknown {})",
        conversion.total_tokens,
        conversion.literal_tokens,
        conversion.operator_tokens,
        conversion.structural_tokens,
        conversion.symbol_tokens,
        conversion.unknown_tokens
    );
    println!("    max bracket depth: {}", conversion.max_bracket_depth);
    if !conversion.operator_usage.is_empty() {
        let usage: Vec<String> = conversion
            .operator_usage
            .iter()
            .map(|(op, count)| format!("{}x{}", op, count))
            .collect();
        println!("    operator usage: {}", usage.join(", "));
    }
    println!(
        "    evaluation: {} operators, {} symbols, {} arrays, max stack depth {}",
        evaluation.operators_applied,
        evaluation.symbols_resolved,
        evaluation.arrays_built,
        evaluation.max_stack_depth
    );
}

fn print_help(program_name: &str) {
    println!("sv_expr v{}", env!("CARGO_PKG_VERSION"));
    println!("SystemVerilog parameter expression evaluator");
    println!();
    println!("USAGE:");
    println!("    {} [options] <expression>...", program_name);
    println!();
    println!("OPTIONS:");
    println!("    --help              Show this help message");
    println!("    --postfix           Print the postfix form of each expression");
    println!("    --base              Print the display base of each expression");
    println!("    --define NAME=EXPR  Define a symbol (repeatable)");
    println!("    --symbols FILE      Load symbols from a [parameters] TOML file");
    println!("    --config FILE       Load runtime preferences from a TOML file");
    println!("    --json              Print one JSON object per expression");
    println!("    --stats             Print conversion and evaluation metrics");
    println!("    --                  Treat all remaining arguments as expressions");
    println!();
    println!("EXIT STATUS:");
    println!("    0 when every expression is valid, 1 otherwise");
    println!();
    println!("EXAMPLES:");
    println!("    {} \"2+3*4\"", program_name);
    println!("    {} --postfix --base \"8'hFF + 1\"", program_name);
    println!(
        "    {} --define first=1 --define \"second=2*first\" \"second**3\"",
        program_name
    );
    println!("    {} --json -- \"-1-2\"", program_name);
    println!();
    println!("{}", sv_expr::config::build_info::source_info());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn test_help_flag_before_separator() {
        assert!(wants_help(&args(&["--help"])));
        assert!(wants_help(&args(&["--postfix", "--help", "1+1"])));
        assert!(!wants_help(&args(&["--", "--help"])));
        assert!(!wants_help(&args(&["--json", "--", "-1", "--help"])));
    }

    #[test]
    fn test_arguments_after_separator_are_expressions() {
        let options = parse_options(&args(&["--base", "--", "--help", "-1-2"])).unwrap();
        assert!(options.show_base);
        assert_eq!(options.expressions, vec!["--help", "-1-2"]);
    }

    #[test]
    fn test_define_requires_assignment() {
        assert!(parse_options(&args(&["--define", "width", "1"])).is_err());
        let options = parse_options(&args(&["--define", "width=8", "width*2"])).unwrap();
        assert_eq!(
            options.definitions,
            vec![("width".to_string(), "8".to_string())]
        );
    }
}
