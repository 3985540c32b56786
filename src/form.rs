//! Form adapter: raw text fields in, display text out
//!
//! The presentation layer collects three free-text fields. They are
//! normalised here into a typed [`Query`], and an evaluation outcome is
//! turned back into a single display line. This is the boundary where
//! evaluation errors stop propagating and become text.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::rule::Query;

/// The three raw input fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormInput {
    pub monto_compra: String,
    pub frecuencia: String,
    pub miembro: String,
}

impl FormInput {
    pub fn new(
        monto_compra: impl Into<String>,
        frecuencia: impl Into<String>,
        miembro: impl Into<String>,
    ) -> Self {
        Self {
            monto_compra: monto_compra.into(),
            frecuencia: frecuencia.into(),
            miembro: miembro.into(),
        }
    }

    /// Trim and lowercase the text fields; `miembro` is true only for "true"
    pub fn to_query(&self) -> Query {
        Query {
            monto_compra: normalize(&self.monto_compra),
            frecuencia: normalize(&self.frecuencia),
            miembro: normalize(&self.miembro) == "true",
        }
    }
}

fn normalize(field: &str) -> String {
    field.trim().to_lowercase()
}

/// Render an evaluation outcome as the line shown to the user
pub fn render(outcome: &Result<Option<String>>) -> String {
    match outcome {
        Ok(Some(resultado)) => format!("Resultado: {}", resultado),
        Ok(None) => "Resultado: None".to_string(),
        Err(e) => format!("Error: {}", e),
    }
}
