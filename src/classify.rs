//! Column classification.
//!
//! Maps raw schema metadata into the three sampling pools the binder draws
//! from: `quantitative` (numeric types), `categorical` (text types) and
//! `all` (every column). A column matching neither vocabulary still appears
//! in `all`, so it stays eligible for generic selection and ordering.

use crate::schema::{Dialect, SchemaColumn};

/// Relational numeric type families, lowercase, length suffixes stripped.
const SQL_NUMERIC: &[&str] = &[
    "int",
    "integer",
    "int2",
    "int4",
    "int8",
    "tinyint",
    "smallint",
    "mediumint",
    "bigint",
    "float",
    "float4",
    "float8",
    "real",
    "double",
    "double precision",
    "decimal",
    "numeric",
];

/// Relational text type families.
const SQL_TEXT: &[&str] = &[
    "char",
    "character",
    "nchar",
    "bpchar",
    "varchar",
    "nvarchar",
    "character varying",
    "text",
    "tinytext",
    "mediumtext",
    "longtext",
    "string",
];

/// Document runtime numeric types.
const DOC_NUMERIC: &[&str] = &["int", "long", "double"];

/// Document runtime text types.
const DOC_TEXT: &[&str] = &["string"];

/// Column names grouped by semantic role.
///
/// The pools are derived, non-persistent, and disjoint by priority:
/// a column is quantitative or categorical (or neither), and always in `all`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnClasses {
    pub quantitative: Vec<String>,
    pub categorical: Vec<String>,
    pub all: Vec<String>,
}

impl ColumnClasses {
    /// Pool for numeric placeholders. Falls back to `all` when no column
    /// matched the numeric vocabulary, so binding never fails on a schema
    /// that merely lacks numeric columns.
    pub fn quantitative_pool(&self) -> &[String] {
        if self.quantitative.is_empty() {
            &self.all
        } else {
            &self.quantitative
        }
    }

    /// Pool for text placeholders, with the same fallback to `all`.
    pub fn categorical_pool(&self) -> &[String] {
        if self.categorical.is_empty() {
            &self.all
        } else {
            &self.categorical
        }
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

/// Classify columns by declared type. Pure function of its input.
pub fn classify(dialect: Dialect, columns: &[SchemaColumn]) -> ColumnClasses {
    let (numeric, text) = match dialect {
        Dialect::Sql => (SQL_NUMERIC, SQL_TEXT),
        Dialect::Document => (DOC_NUMERIC, DOC_TEXT),
    };

    let mut classes = ColumnClasses {
        quantitative: vec![],
        categorical: vec![],
        all: vec![],
    };
    for column in columns {
        let ty = normalize_type(&column.declared_type);
        if numeric.contains(&ty.as_str()) {
            classes.quantitative.push(column.name.clone());
        } else if text.contains(&ty.as_str()) {
            classes.categorical.push(column.name.clone());
        }
        classes.all.push(column.name.clone());
    }
    classes
}

/// Lowercase a declared type and strip a length suffix like `varchar(255)`.
fn normalize_type(declared: &str) -> String {
    let lower = declared.trim().to_ascii_lowercase();
    match lower.find('(') {
        Some(idx) => lower[..idx].trim_end().to_string(),
        None => lower,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn columns() -> Vec<SchemaColumn> {
        vec![
            SchemaColumn::new("id", "int"),
            SchemaColumn::new("category", "varchar(255)"),
            SchemaColumn::new("amount", "float"),
            SchemaColumn::new("created_at", "timestamp"),
        ]
    }

    #[test]
    fn test_sql_classification() {
        let classes = classify(Dialect::Sql, &columns());
        assert_eq!(classes.quantitative, vec!["id", "amount"]);
        assert_eq!(classes.categorical, vec!["category"]);
        assert_eq!(classes.all, vec!["id", "category", "amount", "created_at"]);
    }

    #[test]
    fn test_unmatched_type_only_in_all() {
        let classes = classify(Dialect::Sql, &[SchemaColumn::new("created_at", "timestamp")]);
        assert!(classes.quantitative.is_empty());
        assert!(classes.categorical.is_empty());
        assert_eq!(classes.all, vec!["created_at"]);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let cols = columns();
        assert_eq!(classify(Dialect::Sql, &cols), classify(Dialect::Sql, &cols));
    }

    #[test]
    fn test_document_runtime_types() {
        let cols = vec![
            SchemaColumn::new("title", "string"),
            SchemaColumn::new("views", "int"),
            SchemaColumn::new("rating", "double"),
            SchemaColumn::new("tags", "array"),
        ];
        let classes = classify(Dialect::Document, &cols);
        assert_eq!(classes.quantitative, vec!["views", "rating"]);
        assert_eq!(classes.categorical, vec!["title"]);
        assert_eq!(classes.all.len(), 4);
    }

    #[test]
    fn test_fallback_pools_use_all() {
        let cols = vec![
            SchemaColumn::new("a", "timestamp"),
            SchemaColumn::new("b", "timestamp"),
        ];
        let classes = classify(Dialect::Sql, &cols);
        assert_eq!(classes.quantitative_pool(), classes.all.as_slice());
        assert_eq!(classes.categorical_pool(), classes.all.as_slice());
    }

    #[test]
    fn test_case_insensitive_types() {
        let classes = classify(Dialect::Sql, &[SchemaColumn::new("n", "BIGINT")]);
        assert_eq!(classes.quantitative, vec!["n"]);
    }
}
