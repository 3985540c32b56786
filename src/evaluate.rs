//! First-match rule evaluation
//!
//! [`Evaluator`] owns a [`RuleStore`] and answers queries by scanning
//! every stored rule in insertion order. The first rule whose three
//! conditions all equal the query wins; later rules are never consulted.
//! The store is re-read on every call, so rules added through
//! [`Evaluator::add_rule`] take effect immediately.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::knowledge::KnowledgeBase;
use crate::rule::{Conditions, Query, Rule};
use crate::store::{MemoryStore, RuleStore, SqliteStore};

/// The rule that fired for a query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    /// 0-based insertion index of the rule
    pub position: usize,
    pub rule: Rule,
}

impl Match {
    pub fn resultado(&self) -> &str {
        &self.rule.resultado
    }
}

/// Scans a rule store for the first rule matching a query
pub struct Evaluator<S: RuleStore = MemoryStore> {
    store: S,
}

impl Evaluator<MemoryStore> {
    /// In-memory evaluator seeded from `kb`
    pub fn from_knowledge_base(kb: &KnowledgeBase) -> Result<Self> {
        let mut store = MemoryStore::new();
        kb.seed(&mut store)?;
        Ok(Self::new(store))
    }
}

impl Evaluator<Box<dyn RuleStore>> {
    /// Build the store described by `config` and seed it.
    ///
    /// With a database the knowledge base is inserted only when the
    /// database is empty (unless `seed_when_empty` is off, in which case
    /// it is appended on every open, as a plain table init would).
    ///
    /// A populated database must already hold the knowledge base as its
    /// leading rules. If it holds something else, an explicit rules file
    /// is an error; with the built-in rules the database wins.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let kb = match &config.rules {
            Some(path) => KnowledgeBase::load(path)?,
            None => KnowledgeBase::builtin(),
        };

        let mut store: Box<dyn RuleStore> = match &config.database {
            Some(path) => Box::new(SqliteStore::open(path)?),
            None => Box::new(MemoryStore::new()),
        };

        let Some(db_path) = &config.database else {
            let inserted = kb.seed(store.as_mut())?;
            debug!(inserted, hash = %rules_hash(&kb.rules), "rule store ready");
            return Ok(Self::new(store));
        };

        let stored = store.fetch_all()?;
        let consistent = stored.is_empty()
            || (stored.starts_with(&kb.rules)
                && (!config.seed_when_empty || stored.len() == kb.rules.len()));

        if !consistent {
            let stored_hash = rules_hash(&stored);
            let kb_hash = rules_hash(&kb.rules);

            if let Some(rules_path) = &config.rules {
                return Err(Error::Store(format!(
                    "{} holds {} rule(s) ({}) that differ from {} ({}); \
                     remove the database to load the new rules",
                    db_path.display(),
                    stored.len(),
                    stored_hash,
                    rules_path.display(),
                    kb_hash
                )));
            }

            warn!(
                database = %db_path.display(),
                active = %stored_hash,
                builtin = %kb_hash,
                "database rules differ from the built-in rules; using the database"
            );
            return Ok(Self::new(store));
        }

        let inserted = if config.seed_when_empty {
            kb.seed_if_empty(store.as_mut())?
        } else {
            kb.seed(store.as_mut())?
        };
        debug!(inserted, hash = %rules_hash(&kb.rules), "rule store ready");

        Ok(Self::new(store))
    }
}

/// Hash of a bare rule list, independent of knowledge base metadata
fn rules_hash(rules: &[Rule]) -> String {
    KnowledgeBase::new(rules.to_vec()).hash()
}

impl<S: RuleStore> Evaluator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Append a rule; it ranks below every rule already stored
    pub fn add_rule(&mut self, conditions: Conditions, resultado: impl Into<String>) -> Result<()> {
        self.store.insert(Rule::new(conditions, resultado))
    }

    /// All rules in insertion order
    pub fn all_rules(&self) -> Result<Vec<Rule>> {
        self.store.fetch_all()
    }

    /// `resultado` of the first matching rule, or `None`
    pub fn evaluate(&self, query: &Query) -> Result<Option<String>> {
        Ok(self
            .evaluate_detailed(query)?
            .map(|m| m.rule.resultado))
    }

    /// Like [`evaluate`](Self::evaluate), but reports which rule fired
    pub fn evaluate_detailed(&self, query: &Query) -> Result<Option<Match>> {
        let rules = self.store.fetch_all()?;
        debug!(rules = rules.len(), ?query, "evaluating query");

        let found = rules
            .into_iter()
            .enumerate()
            .find(|(_, rule)| rule.matches(query))
            .map(|(position, rule)| Match { position, rule });

        match &found {
            Some(m) => debug!(position = m.position, resultado = %m.rule.resultado, "rule matched"),
            None => debug!("no rule matched"),
        }

        Ok(found)
    }

    /// Evaluate an untyped query.
    ///
    /// Anything other than a JSON object is rejected with
    /// [`Error::InvalidQuery`]. Missing keys and values of the wrong type
    /// are mismatches, not errors.
    pub fn evaluate_value(&self, query: &Value) -> Result<Option<String>> {
        let map = query.as_object().ok_or_else(|| {
            Error::InvalidQuery(format!(
                "expected a mapping of features, got {}",
                value_kind(query)
            ))
        })?;

        let rules = self.store.fetch_all()?;
        debug!(rules = rules.len(), "evaluating untyped query");

        Ok(rules
            .into_iter()
            .find(|rule| rule.conditions.matches_map(map))
            .map(|rule| rule.resultado))
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn seeded() -> Evaluator {
        Evaluator::from_knowledge_base(&KnowledgeBase::builtin()).unwrap()
    }

    #[test]
    fn test_first_match_position() {
        let m = seeded()
            .evaluate_detailed(&Query::new("bajo", "alta", true))
            .unwrap()
            .unwrap();
        assert_eq!(m.position, 2);
        assert_eq!(m.resultado(), "10% de descuento");
    }

    #[test]
    fn test_no_match_is_none() {
        assert_eq!(
            seeded().evaluate(&Query::new("bajo", "alta", false)).unwrap(),
            None
        );
    }

    #[test]
    fn test_empty_store() {
        let ev = Evaluator::new(MemoryStore::new());
        assert_eq!(ev.evaluate(&Query::new("alto", "alta", true)).unwrap(), None);
        assert!(ev.all_rules().unwrap().is_empty());
    }

    #[test]
    fn test_add_rule_takes_effect_immediately() {
        let mut ev = seeded();
        let q = Query::new("medio", "alta", true);
        assert_eq!(ev.evaluate(&q).unwrap(), None);

        ev.add_rule(Conditions::new("medio", "alta", true), "12% de descuento")
            .unwrap();
        assert_eq!(ev.evaluate(&q).unwrap().as_deref(), Some("12% de descuento"));
        assert_eq!(ev.all_rules().unwrap().len(), 5);
    }

    #[test]
    fn test_added_duplicate_does_not_override() {
        let mut ev = seeded();
        ev.add_rule(Conditions::new("alto", "alta", true), "99% de descuento")
            .unwrap();
        assert_eq!(
            ev.evaluate(&Query::new("alto", "alta", true)).unwrap().as_deref(),
            Some("20% de descuento")
        );
    }

    #[test]
    fn test_evaluate_value_rejects_non_mapping() {
        let ev = seeded();
        for bad in [json!("not a dict"), json!(null), json!(3), json!([1, 2]), json!(true)] {
            let err = ev.evaluate_value(&bad).unwrap_err();
            assert!(matches!(err, Error::InvalidQuery(_)), "{:?}", bad);
        }
    }

    #[test]
    fn test_evaluate_value_error_message() {
        let err = seeded().evaluate_value(&json!("not a dict")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid query: expected a mapping of features, got a string"
        );
    }

    #[test]
    fn test_evaluate_value_match_and_mismatch() {
        let ev = seeded();
        let hit = json!({"monto_compra": "alto", "frecuencia": "baja", "miembro": true});
        assert_eq!(
            ev.evaluate_value(&hit).unwrap().as_deref(),
            Some("15% de descuento")
        );

        let missing = json!({"monto_compra": "alto", "frecuencia": "baja"});
        assert_eq!(ev.evaluate_value(&missing).unwrap(), None);

        let wrong_type = json!({"monto_compra": "alto", "frecuencia": "baja", "miembro": "True"});
        assert_eq!(ev.evaluate_value(&wrong_type).unwrap(), None);

        assert_eq!(ev.evaluate_value(&json!({})).unwrap(), None);
    }
}
