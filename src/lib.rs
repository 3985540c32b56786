// Production-quality lints
#![warn(
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
// Deny truly dangerous patterns
#![deny(clippy::mem_forget)]
// Allow common patterns in library code
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! # discount-rules — first-match discount rules
//!
//! A small expert system: an ordered list of rules maps three customer
//! features to a discount. A query is answered by the first rule whose
//! conditions all equal the query's features.
//!
//! ## Quick Start
//!
//! ```rust
//! use discount_rules::{Evaluator, KnowledgeBase, Query};
//!
//! let evaluator = Evaluator::from_knowledge_base(&KnowledgeBase::builtin())?;
//!
//! let discount = evaluator.evaluate(&Query::new("alto", "alta", true))?;
//! assert_eq!(discount.as_deref(), Some("20% de descuento"));
//!
//! let none = evaluator.evaluate(&Query::new("bajo", "alta", false))?;
//! assert_eq!(none, None);
//! # Ok::<(), discount_rules::Error>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! KnowledgeBase ──seed──► RuleStore (MemoryStore | SqliteStore)
//!                               │
//!                               ▼ fetch_all (insertion order)
//! FormInput ──to_query──► Evaluator::evaluate ──► Option<resultado>
//!                                                        │
//!                                      form::render ◄────┘
//! ```
//!
//! Rules are matched by exact equality on `monto_compra`, `frecuencia`
//! and `miembro`. There are no priorities, wildcards or ranges: earlier
//! rules shadow later ones with the same conditions.

pub mod config;
pub mod error;
pub mod evaluate;
pub mod form;
pub mod knowledge;
pub mod rule;
pub mod store;

// Re-exports
pub use config::{AppConfig, ConfigFlags};
pub use error::{Error, Result};
pub use evaluate::{Evaluator, Match};
pub use form::{render, FormInput};
pub use knowledge::{Finding, KnowledgeBase, Severity};
pub use rule::{Conditions, Query, Rule};
pub use store::{MemoryStore, RuleStore, SqliteStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
