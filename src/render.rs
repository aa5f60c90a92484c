//! Query rendering.
//!
//! Substitutes a bound parameter set into a catalog pattern. SQL patterns
//! render to literal text with quoted identifiers and escaped literals;
//! document patterns expand into typed [`DocumentQuery`] values. Rendering
//! is pure and total for a well-formed binding; a surviving placeholder
//! marker is a catalog bug, not a runtime condition.

use crate::artifact::{
    Accumulator, DocumentQuery, FieldFilter, GeneratedQuery, MatchOp, QueryArtifact, SortDir,
    Stage,
};
use crate::binder::{Binding, BoundValue};
use crate::catalog::{DocShape, PatternShape, Placeholder, QueryPattern};

/// Render a pattern with its binding into a finished query.
pub fn render(pattern: &QueryPattern, binding: &Binding) -> GeneratedQuery {
    let artifact = match pattern.shape {
        PatternShape::Sql(template) => QueryArtifact::Sql(render_sql(template, binding)),
        PatternShape::Document(shape) => {
            QueryArtifact::Document(render_document(shape, binding))
        }
    };
    GeneratedQuery {
        description: render_description(pattern.description, binding),
        artifact,
    }
}

/// Double-quote an identifier, doubling embedded quotes.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Single-quote a text literal, doubling embedded quotes.
pub fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// SQL fragment for a bound value: identifiers quoted, integers inline,
/// text as an escaped literal.
fn sql_fragment(value: &BoundValue) -> String {
    match value {
        BoundValue::Ident(name) => quote_ident(name),
        BoundValue::Int(n) => n.to_string(),
        BoundValue::Text(text) => quote_literal(text),
    }
}

fn render_sql(template: &str, binding: &Binding) -> String {
    let mut sql = template.to_string();
    for (placeholder, value) in binding.iter() {
        sql = sql.replace(&marker(placeholder), &sql_fragment(value));
    }
    debug_assert!(
        !sql.contains('{'),
        "unresolved placeholder in rendered SQL: {sql}"
    );
    sql
}

fn render_description(template: &str, binding: &Binding) -> String {
    let mut text = template.to_string();
    for (placeholder, value) in binding.iter() {
        text = text.replace(&marker(placeholder), &value.to_string());
    }
    debug_assert!(
        !text.contains('{'),
        "unresolved placeholder in description: {text}"
    );
    text
}

fn marker(placeholder: Placeholder) -> String {
    format!("{{{}}}", placeholder.marker())
}

/// Expand a document shape into a typed query.
///
/// The binder guarantees every placeholder a shape consumes is present, so
/// missing values fall back to inert defaults rather than panicking.
fn render_document(shape: DocShape, binding: &Binding) -> DocumentQuery {
    let collection = ident(binding, Placeholder::Table);
    match shape {
        DocShape::FindAll => DocumentQuery::Find {
            collection,
            filter: None,
            projection: None,
            limit: Some(int(binding, Placeholder::Limit)),
        },
        DocShape::FindMatching => DocumentQuery::Find {
            collection,
            filter: Some(FieldFilter {
                field: ident(binding, Placeholder::TextCol),
                op: MatchOp::Regex(like_to_regex(&text(binding, Placeholder::Pattern))),
            }),
            projection: None,
            limit: None,
        },
        DocShape::CriteriaAbove => DocumentQuery::Find {
            collection,
            filter: Some(FieldFilter {
                field: ident(binding, Placeholder::NumericCol),
                op: MatchOp::Gt(int(binding, Placeholder::Threshold)),
            }),
            projection: None,
            limit: None,
        },
        DocShape::CriteriaBelow => DocumentQuery::Find {
            collection,
            filter: Some(FieldFilter {
                field: ident(binding, Placeholder::NumericCol),
                op: MatchOp::Lt(int(binding, Placeholder::Threshold)),
            }),
            projection: None,
            limit: Some(int(binding, Placeholder::Limit)),
        },
        DocShape::ProjectPair => {
            let first = ident(binding, Placeholder::OrdCol1);
            let second = ident(binding, Placeholder::OrdCol2);
            let mut include = vec![first];
            if !include.contains(&second) {
                include.push(second);
            }
            DocumentQuery::Find {
                collection,
                filter: None,
                projection: Some(include),
                limit: None,
            }
        }
        DocShape::ProjectMatching => DocumentQuery::Find {
            collection,
            filter: Some(FieldFilter {
                field: ident(binding, Placeholder::NumericCol),
                op: MatchOp::Gte(int(binding, Placeholder::Threshold)),
            }),
            projection: Some(vec![
                ident(binding, Placeholder::TextCol),
                ident(binding, Placeholder::NumericCol),
            ]),
            limit: None,
        },
        DocShape::TopValues => DocumentQuery::Aggregate {
            collection,
            pipeline: vec![
                Stage::Sort {
                    field: ident(binding, Placeholder::NumericCol),
                    dir: SortDir::Desc,
                },
                Stage::Limit(int(binding, Placeholder::Limit)),
            ],
        },
        DocShape::GroupTotalsRanked => DocumentQuery::Aggregate {
            collection,
            pipeline: vec![
                Stage::Group {
                    key: ident(binding, Placeholder::GroupCol),
                    output_name: "total".into(),
                    output: Accumulator::Sum(ident(binding, Placeholder::NumericCol)),
                },
                Stage::Sort {
                    field: "total".into(),
                    dir: SortDir::Desc,
                },
                Stage::Limit(int(binding, Placeholder::Limit)),
            ],
        },
        DocShape::GroupCount => DocumentQuery::Aggregate {
            collection,
            pipeline: vec![Stage::Group {
                key: ident(binding, Placeholder::GroupCol),
                output_name: "count".into(),
                output: Accumulator::CountAll,
            }],
        },
        DocShape::GroupSum => DocumentQuery::Aggregate {
            collection,
            pipeline: vec![Stage::Group {
                key: ident(binding, Placeholder::GroupCol),
                output_name: "total".into(),
                output: Accumulator::Sum(ident(binding, Placeholder::NumericCol)),
            }],
        },
        DocShape::GroupAvg => DocumentQuery::Aggregate {
            collection,
            pipeline: vec![Stage::Group {
                key: ident(binding, Placeholder::GroupCol),
                output_name: "average".into(),
                output: Accumulator::Avg(ident(binding, Placeholder::NumericCol)),
            }],
        },
        DocShape::MatchGroupSort => DocumentQuery::Aggregate {
            collection,
            pipeline: vec![
                Stage::Match(FieldFilter {
                    field: ident(binding, Placeholder::NumericCol),
                    op: MatchOp::Gt(int(binding, Placeholder::Threshold)),
                }),
                Stage::Group {
                    key: ident(binding, Placeholder::TextCol),
                    output_name: "count".into(),
                    output: Accumulator::CountAll,
                },
                Stage::Sort {
                    field: "count".into(),
                    dir: SortDir::Desc,
                },
            ],
        },
    }
}

fn ident(binding: &Binding, placeholder: Placeholder) -> String {
    binding
        .get(placeholder)
        .and_then(BoundValue::as_ident)
        .unwrap_or_default()
        .to_string()
}

fn int(binding: &Binding, placeholder: Placeholder) -> i64 {
    binding
        .get(placeholder)
        .and_then(BoundValue::as_int)
        .unwrap_or_default()
}

fn text(binding: &Binding, placeholder: Placeholder) -> String {
    match binding.get(placeholder) {
        Some(BoundValue::Text(text)) => text.clone(),
        _ => String::new(),
    }
}

/// Convert a LIKE wildcard literal to an anchored regular expression.
///
/// `a%` becomes `^a`, `%s` becomes `s$`, `%an%` becomes `an`.
fn like_to_regex(like: &str) -> String {
    let starts_open = like.starts_with('%');
    let ends_open = like.ends_with('%');
    let core = like.trim_matches('%');
    match (starts_open, ends_open) {
        (true, true) => core.to_string(),
        (true, false) => format!("{core}$"),
        (false, true) => format!("^{core}"),
        (false, false) => format!("^{core}$"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::bind;
    use crate::catalog::{Category, category_patterns};
    use crate::classify::classify;
    use crate::schema::{Dialect, SchemaColumn};
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn sql_classes() -> crate::classify::ColumnClasses {
        classify(
            Dialect::Sql,
            &[
                SchemaColumn::new("id", "int"),
                SchemaColumn::new("category", "varchar"),
                SchemaColumn::new("amount", "float"),
            ],
        )
    }

    fn find_pattern(dialect: Dialect, category: Category, id: &str) -> &'static QueryPattern {
        category_patterns(dialect, category)
            .unwrap()
            .into_iter()
            .find(|p| p.id == id)
            .unwrap()
    }

    #[test]
    fn test_sql_render_quotes_identifiers() {
        let pattern = find_pattern(Dialect::Sql, Category::GroupBy, "group_by_count");
        let mut rng = StdRng::seed_from_u64(1);
        let binding = bind(pattern, &sql_classes(), "sales", &mut rng).unwrap();
        let query = render(pattern, &binding);
        assert_eq!(
            query.artifact.as_sql().unwrap(),
            "SELECT \"category\", COUNT(*) FROM \"sales\" GROUP BY \"category\""
        );
        assert_eq!(query.description, "Count rows for each category");
    }

    #[test]
    fn test_no_unresolved_markers_in_any_sql_pattern() {
        let classes = sql_classes();
        let mut rng = StdRng::seed_from_u64(2);
        for pattern in crate::catalog::patterns(Dialect::Sql) {
            let binding = bind(pattern, &classes, "sales", &mut rng).unwrap();
            let query = render(pattern, &binding);
            let sql = query.artifact.as_sql().unwrap();
            assert!(!sql.contains('{'), "unresolved marker in {sql}");
            assert!(!query.description.contains('{'));
        }
    }

    #[test]
    fn test_like_literal_is_quoted() {
        let pattern = find_pattern(Dialect::Sql, Category::Where, "where_like");
        let classes = classify(Dialect::Sql, &[SchemaColumn::new("name", "text")]);
        let mut rng = StdRng::seed_from_u64(3);
        let binding = bind(pattern, &classes, "people", &mut rng).unwrap();
        let sql = render(pattern, &binding).artifact.as_sql().unwrap().to_string();
        assert!(sql.contains("LIKE '"), "missing quoted literal: {sql}");
        assert!(sql.ends_with('\''));
    }

    #[test]
    fn test_quote_escaping() {
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(quote_literal("it's"), "'it''s'");
    }

    #[test]
    fn test_match_pipeline_shape() {
        let pattern = find_pattern(Dialect::Document, Category::Match, "match_group_sort");
        let classes = classify(
            Dialect::Document,
            &[
                SchemaColumn::new("title", "string"),
                SchemaColumn::new("views", "int"),
            ],
        );
        let mut rng = StdRng::seed_from_u64(4);
        let binding = bind(pattern, &classes, "films", &mut rng).unwrap();
        let query = render(pattern, &binding);
        let QueryArtifact::Document(DocumentQuery::Aggregate { pipeline, .. }) = &query.artifact
        else {
            panic!("expected an aggregate artifact");
        };
        assert_eq!(pipeline.len(), 3);
        match &pipeline[0] {
            Stage::Match(filter) => {
                assert_eq!(filter.field, "views");
                match filter.op {
                    MatchOp::Gt(t) => assert!((10..=100).contains(&t)),
                    ref other => panic!("expected $gt, got {other:?}"),
                }
            }
            other => panic!("expected $match first, got {other:?}"),
        }
        match &pipeline[1] {
            Stage::Group {
                key,
                output_name,
                output,
            } => {
                assert_eq!(key, "title");
                assert_eq!(output_name, "count");
                assert_eq!(output, &Accumulator::CountAll);
            }
            other => panic!("expected $group second, got {other:?}"),
        }
        assert_eq!(
            pipeline[2],
            Stage::Sort {
                field: "count".into(),
                dir: SortDir::Desc
            }
        );
    }

    #[test]
    fn test_group_count_json_shape() {
        let pattern = find_pattern(Dialect::Document, Category::Group, "group_count");
        let classes = classify(
            Dialect::Document,
            &[
                SchemaColumn::new("genre", "string"),
                SchemaColumn::new("views", "int"),
            ],
        );
        let mut rng = StdRng::seed_from_u64(5);
        let binding = bind(pattern, &classes, "films", &mut rng).unwrap();
        let query = render(pattern, &binding);
        let json = query.artifact.to_json();
        assert_eq!(
            json["pipeline"][0],
            serde_json::json!({ "$group": { "_id": "$genre", "count": { "$sum": 1 } } })
        );
    }

    #[test]
    fn test_like_to_regex_forms() {
        assert_eq!(like_to_regex("a%"), "^a");
        assert_eq!(like_to_regex("%s"), "s$");
        assert_eq!(like_to_regex("%an%"), "an");
        assert_eq!(like_to_regex("an"), "^an$");
    }
}
