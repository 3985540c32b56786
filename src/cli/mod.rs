//! CLI command implementations
//!
//! This module contains all CLI command handlers, organized by category:
//! - `evaluate`: Query commands (evaluate, interactive)
//! - `rules`: Knowledge base commands (rules, validate, init, schema)
//! - `util`: Shared utility functions

pub mod evaluate;
pub mod rules;
pub mod util;

// Re-export all command functions for convenient access
pub use evaluate::{cmd_evaluate, cmd_interactive};
pub use rules::{cmd_init, cmd_rules, cmd_schema, cmd_validate};
