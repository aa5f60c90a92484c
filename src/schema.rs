//! Schema metadata consumed by the synthesis engine.
//!
//! A [`SchemaColumn`] is the only thing the engine knows about a dataset:
//! a column (or document field) name plus its declared storage type. Where
//! that metadata comes from (a live table, a sampled document set) is the
//! caller's business; see [`crate::engine`] for the bundled collaborators.

use std::collections::HashMap;
use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// The two query paradigms quex can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Relational SQL text.
    Sql,
    /// Document aggregation pipelines and find filters.
    Document,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Sql => write!(f, "sql"),
            Dialect::Document => write!(f, "document"),
        }
    }
}

/// One column of a dataset's schema: name plus dialect-native type name.
///
/// Immutable per generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaColumn {
    pub name: String,
    pub declared_type: String,
}

impl SchemaColumn {
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_type: declared_type.into(),
        }
    }
}

/// Internal identifier fields excluded from document classification.
const EXCLUDED_FIELDS: &[&str] = &["_id"];

/// Infer a document-dialect schema from a bounded sample of documents.
///
/// Takes the union of fields over the whole sample; the runtime type is
/// taken from the first document that carries the field. This tolerates
/// heterogeneous collections where the first document alone would miss
/// fields. Internal identifiers (`_id`) are excluded.
pub fn fields_from_sample(sample: &[HashMap<String, serde_json::Value>]) -> Vec<SchemaColumn> {
    let mut seen: Vec<SchemaColumn> = Vec::new();
    for doc in sample {
        let mut names: Vec<&String> = doc.keys().collect();
        names.sort();
        for name in names {
            if EXCLUDED_FIELDS.contains(&name.as_str()) {
                continue;
            }
            if seen.iter().any(|c| &c.name == name) {
                continue;
            }
            seen.push(SchemaColumn::new(name, runtime_type_name(&doc[name])));
        }
    }
    seen
}

/// Runtime value type name for a sampled document field.
fn runtime_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(n) if n.is_f64() => "double",
        serde_json::Value::Number(_) => "int",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
