//! Knowledge base — the ordered rule list used to seed a store
//!
//! Rules are kept in file order; that order becomes insertion order
//! when the knowledge base is seeded into a [`RuleStore`], and insertion
//! order decides which rule wins when several match.
//!
//! ## File format
//!
//! ```yaml
//! name: descuentos
//! rules:
//!   - conditions:
//!       monto_compra: alto
//!       frecuencia: alta
//!       miembro: true
//!     resultado: "20% de descuento"
//!   - conditions:
//!       monto_compra: bajo
//!       frecuencia: baja
//!       miembro: false
//!     resultado: "5% de descuento"
//! ```

use std::collections::HashMap;
use std::path::Path;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::rule::{Conditions, Rule};
use crate::store::RuleStore;

/// An ordered, serialisable set of rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(title = "Knowledge Base", description = "Ordered first-match discount rules")]
pub struct KnowledgeBase {
    /// Human-readable name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Rules, highest precedence first
    #[serde(default, alias = "reglas")]
    pub rules: Vec<Rule>,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::builtin()
    }
}

/// How serious a validation finding is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One problem found by [`KnowledgeBase::validate`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub severity: Severity,
    /// 1-based rule number, when the finding concerns a single rule
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<usize>,
    pub message: String,
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let level = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN",
        };
        match self.rule {
            Some(n) => write!(f, "[{}] rule {}: {}", level, n, self.message),
            None => write!(f, "[{}] {}", level, self.message),
        }
    }
}

impl KnowledgeBase {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            name: None,
            description: None,
            rules,
        }
    }

    /// The four discount rules shipped with the tool
    pub fn builtin() -> Self {
        let rule = |monto: &str, frecuencia: &str, miembro: bool, resultado: &str| {
            Rule::new(Conditions::new(monto, frecuencia, miembro), resultado)
        };

        Self {
            name: Some("descuentos".into()),
            description: Some("Descuentos por monto de compra, frecuencia y membresía".into()),
            rules: vec![
                rule("alto", "alta", true, "20% de descuento"),
                rule("alto", "baja", true, "15% de descuento"),
                rule("bajo", "alta", true, "10% de descuento"),
                rule("bajo", "baja", false, "5% de descuento"),
            ],
        }
    }

    /// Parse from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_norway::from_str(yaml).map_err(|e| Error::KnowledgeBase(e.to_string()))
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_norway::to_string(self).map_err(|e| Error::KnowledgeBase(e.to_string()))
    }

    /// Parse from JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::KnowledgeBase(e.to_string()))
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::KnowledgeBase(e.to_string()))
    }

    /// Load from a file; `.json` files are JSON, anything else YAML
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(Error::Io)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let kb = if is_json {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        };

        kb.map_err(|e| Error::KnowledgeBase(format!("{}: {}", path.display(), e)))
    }

    /// Append every rule to `store`, in order
    pub fn seed<S: RuleStore + ?Sized>(&self, store: &mut S) -> Result<usize> {
        for rule in &self.rules {
            store.insert(rule.clone())?;
        }
        debug!(count = self.rules.len(), "seeded rule store");
        Ok(self.rules.len())
    }

    /// Seed only when `store` holds no rules yet. Returns the number inserted.
    pub fn seed_if_empty<S: RuleStore + ?Sized>(&self, store: &mut S) -> Result<usize> {
        if store.is_empty()? {
            self.seed(store)
        } else {
            debug!("rule store already populated; skipping seed");
            Ok(0)
        }
    }

    /// Compute hash of the rule set for change detection
    pub fn hash(&self) -> String {
        use sha2::{Digest, Sha256};
        let content = self.to_yaml().unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        format!("sha256:{}", hex::encode(&hasher.finalize()[..8]))
    }

    /// Check for empty fields and rules that can never fire
    pub fn validate(&self) -> Vec<Finding> {
        let mut findings = Vec::new();

        if self.rules.is_empty() {
            findings.push(Finding {
                severity: Severity::Error,
                rule: None,
                message: "At least one rule is required".into(),
            });
        }

        let mut first_seen: HashMap<&Conditions, usize> = HashMap::new();

        for (i, rule) in self.rules.iter().enumerate() {
            let n = i + 1;
            let mut error = |message: String| {
                findings.push(Finding {
                    severity: Severity::Error,
                    rule: Some(n),
                    message,
                })
            };

            if rule.resultado.trim().is_empty() {
                error("resultado is empty".into());
            }
            if rule.conditions.monto_compra.trim().is_empty() {
                error("monto_compra is empty".into());
            }
            if rule.conditions.frecuencia.trim().is_empty() {
                error("frecuencia is empty".into());
            }

            match first_seen.get(&rule.conditions) {
                Some(&earlier) => {
                    let winner = &self.rules[earlier - 1];
                    let message = if winner.resultado == rule.resultado {
                        format!("duplicate conditions; shadowed by rule {}", earlier)
                    } else {
                        format!(
                            "contradicts rule {} (\"{}\" vs \"{}\"); shadowed by rule {}",
                            earlier, winner.resultado, rule.resultado, earlier
                        )
                    };
                    findings.push(Finding {
                        severity: Severity::Warning,
                        rule: Some(n),
                        message,
                    });
                }
                None => {
                    first_seen.insert(&rule.conditions, n);
                }
            }
        }

        findings
    }

    pub fn has_errors(findings: &[Finding]) -> bool {
        findings.iter().any(|f| f.severity == Severity::Error)
    }
}
