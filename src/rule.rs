//! Rule and query types — the core data model
//!
//! A [`Rule`] pairs three exact-match conditions with a `resultado`
//! string. A [`Query`] carries the same three fields supplied by the
//! caller. A rule matches a query only when all three fields are equal.
//!
//! ## Example
//!
//! ```yaml
//! conditions:
//!   monto_compra: alto
//!   frecuencia: alta
//!   miembro: true
//! resultado: "20% de descuento"
//! ```

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field name of the purchase amount condition
pub const MONTO_COMPRA: &str = "monto_compra";

/// Field name of the purchase frequency condition
pub const FRECUENCIA: &str = "frecuencia";

/// Field name of the membership condition
pub const MIEMBRO: &str = "miembro";

/// The condition half of a rule
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Conditions {
    /// Purchase amount bucket (e.g. "alto", "bajo")
    pub monto_compra: String,

    /// Purchase frequency bucket (e.g. "alta", "baja")
    pub frecuencia: String,

    /// Whether the customer is a member
    pub miembro: bool,
}

impl Conditions {
    pub fn new(monto_compra: impl Into<String>, frecuencia: impl Into<String>, miembro: bool) -> Self {
        Self {
            monto_compra: monto_compra.into(),
            frecuencia: frecuencia.into(),
            miembro,
        }
    }

    /// All three fields equal, no coercion.
    pub fn matches(&self, query: &Query) -> bool {
        self.monto_compra == query.monto_compra
            && self.frecuencia == query.frecuencia
            && self.miembro == query.miembro
    }

    /// Match against an untyped mapping.
    ///
    /// A missing key or a value of the wrong JSON type is a mismatch.
    /// Keys other than the three condition fields are ignored.
    pub fn matches_map(&self, query: &Map<String, Value>) -> bool {
        let str_eq = |key: &str, expected: &str| {
            matches!(query.get(key), Some(Value::String(s)) if s == expected)
        };

        str_eq(MONTO_COMPRA, &self.monto_compra)
            && str_eq(FRECUENCIA, &self.frecuencia)
            && matches!(query.get(MIEMBRO), Some(Value::Bool(b)) if *b == self.miembro)
    }
}

impl std::fmt::Display for Conditions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} == \"{}\" && {} == \"{}\" && {} == {}",
            MONTO_COMPRA, self.monto_compra, FRECUENCIA, self.frecuencia, MIEMBRO, self.miembro
        )
    }
}

/// A stored condition-to-result rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Rule {
    /// Conditions that must all hold
    #[serde(alias = "condiciones")]
    pub conditions: Conditions,

    /// Output returned when the conditions match
    pub resultado: String,
}

impl Rule {
    pub fn new(conditions: Conditions, resultado: impl Into<String>) -> Self {
        Self {
            conditions,
            resultado: resultado.into(),
        }
    }

    pub fn matches(&self, query: &Query) -> bool {
        self.conditions.matches(query)
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} => \"{}\"", self.conditions, self.resultado)
    }
}

/// Feature values supplied by the caller for one evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Query {
    pub monto_compra: String,
    pub frecuencia: String,
    pub miembro: bool,
}

impl Query {
    pub fn new(monto_compra: impl Into<String>, frecuencia: impl Into<String>, miembro: bool) -> Self {
        Self {
            monto_compra: monto_compra.into(),
            frecuencia: frecuencia.into(),
            miembro,
        }
    }
}

impl From<Conditions> for Query {
    fn from(c: Conditions) -> Self {
        Self {
            monto_compra: c.monto_compra,
            frecuencia: c.frecuencia,
            miembro: c.miembro,
        }
    }
}
