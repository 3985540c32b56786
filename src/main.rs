//! discount-rules CLI - Command-line interface
//!
//! Commands:
//!   evaluate     - Evaluate one query against the rules
//!   interactive  - Prompt for queries on stdin
//!   rules        - List the active rules
//!   validate     - Check a knowledge base file
//!   init         - Write the built-in rules to a file
//!   schema       - Print JSON schema

mod cli;

use discount_rules::*;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let (flags, rest) = cli::util::split_global_flags(&args[1..]);

    let config = match cli::util::load_config(&flags) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(1);
        }
    };

    init_logging(&config);

    let Some(command) = rest.first() else {
        print_usage();
        return ExitCode::from(1);
    };
    let cmd_args = &rest[1..];

    let result = match command.as_str() {
        "evaluate" | "eval" => cli::cmd_evaluate(cmd_args, &config),
        "interactive" => cli::cmd_interactive(cmd_args, &config),
        "rules" => cli::cmd_rules(cmd_args, &config),
        "validate" => cli::cmd_validate(cmd_args),
        "init" => cli::cmd_init(cmd_args),
        "schema" => cli::cmd_schema(cmd_args),
        "version" | "--version" | "-v" => {
            println!("discount-rules {}", VERSION);
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            Err("Unknown command".into())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}

/// Logs go to stderr; stdout carries command output only.
fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.effective_log_filter()));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .with(filter)
        .init();
}

fn print_usage() {
    println!(
        r#"
discount-rules - First-match discount rules

USAGE:
    discount-rules [GLOBAL OPTIONS] <COMMAND> [OPTIONS]

COMMANDS:
    evaluate --monto <v> --frecuencia <v> --miembro <v>
                                     Evaluate one query (fields are trimmed and
                                     lowercased; miembro is true only for "true")
    evaluate --query <json>          Evaluate an untyped JSON query
    interactive                      Prompt for queries until a blank amount
    rules                            List active rules in precedence order
    validate <kb.yaml> [--strict]    Check a knowledge base for empty fields
                                     and shadowed rules
    init [path] [--force]            Write the built-in rules (default: knowledge_base.yaml)
    schema [knowledge_base|config]   Print JSON schema
    version                          Print version

GLOBAL OPTIONS:
    --rules <file>                   Knowledge base file (default: built-in rules)
    --db <file>                      Persist rules in SQLite (seeded when empty)
    --verbose                        Debug logging (RUST_LOG overrides)

OPTIONS:
    --json                           JSON output (evaluate, rules, validate)
    --output <file>                  Output file for schema (default: stdout)

CONFIG:
    discount_rules.yaml in the working directory may set rules, database,
    seed_when_empty and log_filter. Command-line options take precedence.

EXAMPLES:
    discount-rules evaluate --monto alto --frecuencia alta --miembro true
    discount-rules --db rules.db rules --json
    discount-rules init my_rules.yaml && discount-rules --rules my_rules.yaml interactive
"#
    );
}
