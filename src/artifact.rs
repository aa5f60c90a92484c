//! Rendered query artifacts.
//!
//! The unit returned to the caller: a human-readable description plus either
//! a literal SQL string or a typed document query. Document queries are
//! tagged variants over stage kinds rather than loose maps, and project to
//! Mongo-shaped JSON on demand.

use std::fmt;

use serde_json::{Value, json};

/// A rendered example query, ready to display or hand to an executor.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedQuery {
    pub description: String,
    pub artifact: QueryArtifact,
}

impl GeneratedQuery {
    /// Machine-readable projection: `{description, query}`.
    pub fn to_json(&self) -> Value {
        json!({
            "description": self.description,
            "query": self.artifact.to_json(),
        })
    }
}

/// The dialect-specific executable form of a generated query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryArtifact {
    /// Literal SQL text.
    Sql(String),
    /// A structured document query.
    Document(DocumentQuery),
}

impl QueryArtifact {
    pub fn to_json(&self) -> Value {
        match self {
            QueryArtifact::Sql(sql) => Value::String(sql.clone()),
            QueryArtifact::Document(query) => query.to_json(),
        }
    }

    /// The SQL text, if this artifact is relational.
    pub fn as_sql(&self) -> Option<&str> {
        match self {
            QueryArtifact::Sql(sql) => Some(sql),
            QueryArtifact::Document(_) => None,
        }
    }
}

impl fmt::Display for QueryArtifact {
    /// Both kinds display as the text a user would paste into a shell.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryArtifact::Sql(sql) => write!(f, "{sql}"),
            QueryArtifact::Document(query) => write!(f, "{query}"),
        }
    }
}

/// A document-dialect query: a find with optional projection and limit, or
/// an aggregation pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentQuery {
    Find {
        collection: String,
        filter: Option<FieldFilter>,
        projection: Option<Vec<String>>,
        limit: Option<i64>,
    },
    Aggregate {
        collection: String,
        pipeline: Vec<Stage>,
    },
}

/// A single-field criterion inside a find filter or a `$match` stage.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub op: MatchOp,
}

/// Comparison operators the catalog's shapes use.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOp {
    Gt(i64),
    Gte(i64),
    Lt(i64),
    Regex(String),
}

impl MatchOp {
    fn to_json(&self) -> Value {
        match self {
            MatchOp::Gt(n) => json!({ "$gt": n }),
            MatchOp::Gte(n) => json!({ "$gte": n }),
            MatchOp::Lt(n) => json!({ "$lt": n }),
            MatchOp::Regex(pattern) => json!({ "$regex": pattern }),
        }
    }
}

impl FieldFilter {
    fn to_json(&self) -> Value {
        let mut spec = serde_json::Map::new();
        spec.insert(self.field.clone(), self.op.to_json());
        Value::Object(spec)
    }
}

/// Sort direction inside a `$sort` stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

impl SortDir {
    fn sign(&self) -> i64 {
        match self {
            SortDir::Asc => 1,
            SortDir::Desc => -1,
        }
    }
}

/// Accumulator expression inside a `$group` stage.
#[derive(Debug, Clone, PartialEq)]
pub enum Accumulator {
    /// `{$sum: 1}`
    CountAll,
    /// `{$sum: "$field"}`
    Sum(String),
    /// `{$avg: "$field"}`
    Avg(String),
}

impl Accumulator {
    fn to_json(&self) -> Value {
        match self {
            Accumulator::CountAll => json!({ "$sum": 1 }),
            Accumulator::Sum(field) => json!({ "$sum": field_ref(field) }),
            Accumulator::Avg(field) => json!({ "$avg": field_ref(field) }),
        }
    }
}

/// One aggregation pipeline stage, a tagged variant per stage kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    Match(FieldFilter),
    Group {
        key: String,
        output_name: String,
        output: Accumulator,
    },
    Sort {
        field: String,
        dir: SortDir,
    },
    Limit(i64),
}

impl Stage {
    pub fn to_json(&self) -> Value {
        match self {
            Stage::Match(filter) => json!({ "$match": filter.to_json() }),
            Stage::Group {
                key,
                output_name,
                output,
            } => {
                let mut spec = serde_json::Map::new();
                spec.insert("_id".into(), json!(field_ref(key)));
                spec.insert(output_name.clone(), output.to_json());
                json!({ "$group": Value::Object(spec) })
            }
            Stage::Sort { field, dir } => {
                let mut spec = serde_json::Map::new();
                spec.insert(field.clone(), json!(dir.sign()));
                json!({ "$sort": Value::Object(spec) })
            }
            Stage::Limit(n) => json!({ "$limit": n }),
        }
    }
}

/// Field-reference token: the bound column name behind the `$` sigil.
pub fn field_ref(field: &str) -> String {
    format!("${field}")
}

impl DocumentQuery {
    /// Mongo-shaped JSON projection of this query.
    pub fn to_json(&self) -> Value {
        match self {
            DocumentQuery::Find {
                collection,
                filter,
                projection,
                limit,
            } => {
                let mut spec = serde_json::Map::new();
                spec.insert("find".into(), json!(collection));
                spec.insert(
                    "filter".into(),
                    filter.as_ref().map(FieldFilter::to_json).unwrap_or(json!({})),
                );
                if let Some(fields) = projection {
                    let mut proj = serde_json::Map::new();
                    for field in fields {
                        proj.insert(field.clone(), json!(1));
                    }
                    proj.insert("_id".into(), json!(0));
                    spec.insert("projection".into(), Value::Object(proj));
                }
                if let Some(n) = limit {
                    spec.insert("limit".into(), json!(n));
                }
                Value::Object(spec)
            }
            DocumentQuery::Aggregate {
                collection,
                pipeline,
            } => json!({
                "aggregate": collection,
                "pipeline": pipeline.iter().map(Stage::to_json).collect::<Vec<_>>(),
            }),
        }
    }

    /// The target collection name.
    pub fn collection(&self) -> &str {
        match self {
            DocumentQuery::Find { collection, .. } => collection,
            DocumentQuery::Aggregate { collection, .. } => collection,
        }
    }
}

impl fmt::Display for DocumentQuery {
    /// Shell form: `db.coll.find({...})` or `db.coll.aggregate([...])`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentQuery::Find {
                collection,
                filter,
                projection,
                limit,
            } => {
                let filter_json = filter.as_ref().map(FieldFilter::to_json).unwrap_or(json!({}));
                write!(f, "db.{collection}.find({filter_json}")?;
                if let Some(fields) = projection {
                    let mut proj = serde_json::Map::new();
                    for field in fields {
                        proj.insert(field.clone(), json!(1));
                    }
                    proj.insert("_id".into(), json!(0));
                    write!(f, ", {}", Value::Object(proj))?;
                }
                write!(f, ")")?;
                if let Some(n) = limit {
                    write!(f, ".limit({n})")?;
                }
                Ok(())
            }
            DocumentQuery::Aggregate {
                collection,
                pipeline,
            } => {
                let stages: Vec<String> =
                    pipeline.iter().map(|s| s.to_json().to_string()).collect();
                write!(f, "db.{collection}.aggregate([{}])", stages.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_group_stage_json() {
        let stage = Stage::Group {
            key: "title".into(),
            output_name: "count".into(),
            output: Accumulator::CountAll,
        };
        assert_eq!(
            stage.to_json(),
            json!({ "$group": { "_id": "$title", "count": { "$sum": 1 } } })
        );
    }

    #[test]
    fn test_match_stage_json() {
        let stage = Stage::Match(FieldFilter {
            field: "views".into(),
            op: MatchOp::Gt(50),
        });
        assert_eq!(stage.to_json(), json!({ "$match": { "views": { "$gt": 50 } } }));
    }

    #[test]
    fn test_find_shell_display() {
        let query = DocumentQuery::Find {
            collection: "films".into(),
            filter: None,
            projection: None,
            limit: Some(5),
        };
        assert_eq!(query.to_string(), "db.films.find({}).limit(5)");
    }

    #[test]
    fn test_aggregate_shell_display() {
        let query = DocumentQuery::Aggregate {
            collection: "films".into(),
            pipeline: vec![Stage::Limit(3)],
        };
        assert_eq!(query.to_string(), "db.films.aggregate([{\"$limit\":3}])");
    }

    #[test]
    fn test_projection_excludes_internal_id() {
        let query = DocumentQuery::Find {
            collection: "films".into(),
            filter: None,
            projection: Some(vec!["title".into()]),
            limit: None,
        };
        let json = query.to_json();
        assert_eq!(json["projection"]["_id"], json!(0));
        assert_eq!(json["projection"]["title"], json!(1));
    }
}
