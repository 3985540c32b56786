//! Rule storage
//!
//! Stores are append-only and return rules in insertion order. Insertion
//! order is the only precedence the evaluator knows about, so every
//! implementation must preserve it.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::rule::{Conditions, Rule};

/// Append-only, ordered rule storage
pub trait RuleStore {
    /// Append a rule after every rule already stored
    fn insert(&mut self, rule: Rule) -> Result<()>;

    /// All rules, in insertion order
    fn fetch_all(&self) -> Result<Vec<Rule>>;

    fn len(&self) -> Result<usize> {
        Ok(self.fetch_all()?.len())
    }

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl<S: RuleStore + ?Sized> RuleStore for Box<S> {
    fn insert(&mut self, rule: Rule) -> Result<()> {
        (**self).insert(rule)
    }

    fn fetch_all(&self) -> Result<Vec<Rule>> {
        (**self).fetch_all()
    }

    fn len(&self) -> Result<usize> {
        (**self).len()
    }
}

/// In-process store backed by a `Vec`
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    rules: Vec<Rule>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RuleStore for MemoryStore {
    fn insert(&mut self, rule: Rule) -> Result<()> {
        self.rules.push(rule);
        Ok(())
    }

    fn fetch_all(&self) -> Result<Vec<Rule>> {
        Ok(self.rules.clone())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.rules.len())
    }
}

/// SQLite-backed store using a single `reglas` table
pub struct SqliteStore {
    conn: Connection,
    db_path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open (or create) a database file
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    Error::Store(format!("Failed to create store dir: {}", e))
                })?;
            }
        }

        let conn = Connection::open(&db_path)
            .map_err(|e| Error::Store(format!("Failed to open rule store: {}", e)))?;
        Self::init_schema(&conn)?;

        info!(path = %db_path.display(), "opened rule store");
        Ok(Self {
            conn,
            db_path: Some(db_path),
        })
    }

    /// Non-persistent database, mainly for tests
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::Store(format!("Failed to open in-memory store: {}", e)))?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn,
            db_path: None,
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS reglas (
                id INTEGER PRIMARY KEY,
                monto_compra TEXT NOT NULL,
                frecuencia TEXT NOT NULL,
                miembro BOOLEAN NOT NULL,
                resultado TEXT NOT NULL
            );
            ",
        )
        .map_err(|e| Error::Store(format!("Failed to init rule schema: {}", e)))?;

        Ok(())
    }
}

impl RuleStore for SqliteStore {
    fn insert(&mut self, rule: Rule) -> Result<()> {
        self.conn.execute(
            "INSERT INTO reglas (monto_compra, frecuencia, miembro, resultado)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                rule.conditions.monto_compra,
                rule.conditions.frecuencia,
                rule.conditions.miembro,
                rule.resultado,
            ],
        )?;
        debug!(id = self.conn.last_insert_rowid(), "inserted rule");
        Ok(())
    }

    fn fetch_all(&self) -> Result<Vec<Rule>> {
        let mut stmt = self.conn.prepare(
            "SELECT monto_compra, frecuencia, miembro, resultado FROM reglas ORDER BY id",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(Rule {
                conditions: Conditions {
                    monto_compra: row.get(0)?,
                    frecuencia: row.get(1)?,
                    miembro: row.get(2)?,
                },
                resultado: row.get(3)?,
            })
        })?;

        let rules = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rules)
    }

    fn len(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM reglas", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(resultado: &str) -> Rule {
        Rule::new(Conditions::new("alto", "alta", true), resultado)
    }

    #[test]
    fn test_memory_store_preserves_order() {
        let mut store = MemoryStore::new();
        assert!(store.is_empty().unwrap());

        store.insert(sample("a")).unwrap();
        store.insert(sample("b")).unwrap();

        let rules = store.fetch_all().unwrap();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].resultado, "a");
        assert_eq!(rules[1].resultado, "b");
    }

    #[test]
    fn test_sqlite_round_trip() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store
            .insert(Rule::new(Conditions::new("bajo", "baja", false), "5% de descuento"))
            .unwrap();
        store.insert(sample("20% de descuento")).unwrap();

        let rules = store.fetch_all().unwrap();
        assert_eq!(store.len().unwrap(), 2);
        assert_eq!(rules[0].conditions, Conditions::new("bajo", "baja", false));
        assert_eq!(rules[1].resultado, "20% de descuento");
        assert!(rules[1].conditions.miembro);
    }

    #[test]
    fn test_sqlite_allows_duplicates() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.insert(sample("first")).unwrap();
        store.insert(sample("second")).unwrap();
        assert_eq!(store.len().unwrap(), 2);
        assert!(store.path().is_none());
    }

    #[test]
    fn test_boxed_store_delegates() {
        let mut store: Box<dyn RuleStore> = Box::new(MemoryStore::new());
        store.insert(sample("x")).unwrap();
        assert_eq!(store.len().unwrap(), 1);
    }
}
