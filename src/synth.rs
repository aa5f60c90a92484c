//! The synthesis entry point.
//!
//! Wires the pipeline together: classify the schema, choose patterns from
//! the catalog, bind fresh parameters per query, render, then size the
//! output to the requested cardinality. Stateless across calls; the only
//! non-pure input is the injected random source.

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::artifact::GeneratedQuery;
use crate::binder::bind;
use crate::catalog::{Category, QueryPattern, category_patterns, patterns};
use crate::classify::classify;
use crate::error::{QuexError, QuexResult};
use crate::render::render;
use crate::schema::{Dialect, SchemaColumn};
use crate::sizer::size_to;

/// Default number of example queries per request.
pub const DEFAULT_COUNT: usize = 5;

/// Generate `count` example queries for a dataset schema.
///
/// With a category, every variant of that category is rendered once with
/// independently sampled parameters. Without one, a single randomly chosen
/// variant per category gives a diversified mix. Either way the result is
/// sized to exactly `count` items.
pub fn generate<R: Rng + ?Sized>(
    columns: &[SchemaColumn],
    dataset: &str,
    dialect: Dialect,
    category: Option<Category>,
    count: usize,
    rng: &mut R,
) -> QuexResult<Vec<GeneratedQuery>> {
    // Fail fast on an unknown category before touching the schema, so a bad
    // request never produces partial output.
    let pool: Vec<&'static QueryPattern> = match category {
        Some(category) => category_patterns(dialect, category)?,
        None => Category::all_for(dialect)
            .iter()
            .filter_map(|&category| {
                let variants: Vec<&QueryPattern> = patterns(dialect)
                    .filter(|p| p.category == category)
                    .collect();
                variants.choose(rng).copied()
            })
            .collect(),
    };

    let classes = classify(dialect, columns);
    if classes.is_empty() {
        return Err(QuexError::insufficient(dataset));
    }

    let mut rendered = Vec::with_capacity(pool.len());
    for pattern in pool {
        let binding = bind(pattern, &classes, dataset, rng)?;
        rendered.push(render(pattern, &binding));
    }
    Ok(size_to(rendered, count, rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::QueryArtifact;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn schema() -> Vec<SchemaColumn> {
        vec![
            SchemaColumn::new("id", "int"),
            SchemaColumn::new("category", "varchar"),
            SchemaColumn::new("amount", "float"),
        ]
    }

    #[test]
    fn test_exact_cardinality_for_any_count() {
        let schema = schema();
        let mut rng = StdRng::seed_from_u64(1);
        for count in [0, 1, 3, 5, 12, 40] {
            let queries =
                generate(&schema, "sales", Dialect::Sql, None, count, &mut rng).unwrap();
            assert_eq!(queries.len(), count);
        }
    }

    #[test]
    fn test_group_by_scenario_roles_are_stable() {
        let schema = schema();
        let mut rng = StdRng::seed_from_u64(2);
        let queries = generate(
            &schema,
            "sales",
            Dialect::Sql,
            Some(Category::GroupBy),
            3,
            &mut rng,
        )
        .unwrap();
        assert_eq!(queries.len(), 3);
        for query in &queries {
            let sql = query.artifact.as_sql().unwrap();
            assert!(
                sql.starts_with("SELECT \"category\", "),
                "group key must be the text column: {sql}"
            );
            assert!(sql.ends_with("GROUP BY \"category\""), "{sql}");
            // Aggregated column is never the grouping column.
            assert!(
                sql.contains("COUNT(*)")
                    || sql.contains("SUM(\"amount\")")
                    || sql.contains("AVG(\"amount\")")
                    || sql.contains("SUM(\"id\")")
                    || sql.contains("AVG(\"id\")"),
                "{sql}"
            );
        }
    }

    #[test]
    fn test_single_column_order_by_scenario() {
        let schema = vec![SchemaColumn::new("value", "int")];
        let mut rng = StdRng::seed_from_u64(3);
        let queries = generate(
            &schema,
            "numbers",
            Dialect::Sql,
            Some(Category::OrderBy),
            2,
            &mut rng,
        )
        .unwrap();
        assert_eq!(queries.len(), 2);
        for query in &queries {
            let sql = query.artifact.as_sql().unwrap();
            assert!(sql.contains("ORDER BY \"value\""), "{sql}");
            let limit: i64 = sql
                .rsplit_once("LIMIT ")
                .and_then(|(_, n)| n.parse().ok())
                .unwrap();
            assert!((5..=10).contains(&limit), "{sql}");
        }
    }

    #[test]
    fn test_unknown_category_fails_without_output() {
        let schema = schema();
        let mut rng = StdRng::seed_from_u64(4);
        let err = generate(
            &schema,
            "sales",
            Dialect::Document,
            Some(Category::GroupBy),
            3,
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, QuexError::UnknownCategory { .. }));
    }

    #[test]
    fn test_zero_column_schema_is_hard_error() {
        let mut rng = StdRng::seed_from_u64(5);
        let err = generate(&[], "void", Dialect::Sql, None, 5, &mut rng).unwrap_err();
        assert!(matches!(err, QuexError::InsufficientSchema { .. }));
    }

    #[test]
    fn test_mixed_mode_draws_across_categories() {
        let schema = schema();
        let mut rng = StdRng::seed_from_u64(6);
        // Eight SQL categories exist; asking for all eight without a
        // category must yield one pattern per category.
        let queries = generate(&schema, "sales", Dialect::Sql, None, 8, &mut rng).unwrap();
        let categories: std::collections::HashSet<String> = queries
            .iter()
            .map(|q| q.artifact.as_sql().unwrap().to_string())
            .collect();
        assert_eq!(categories.len(), 8, "expected eight distinct queries");
    }

    #[test]
    fn test_document_generation_produces_document_artifacts() {
        let schema = vec![
            SchemaColumn::new("title", "string"),
            SchemaColumn::new("views", "int"),
        ];
        let mut rng = StdRng::seed_from_u64(7);
        let queries =
            generate(&schema, "films", Dialect::Document, None, 6, &mut rng).unwrap();
        assert_eq!(queries.len(), 6);
        for query in &queries {
            assert!(matches!(query.artifact, QueryArtifact::Document(_)));
            assert!(!query.description.contains('{'));
        }
    }

    #[test]
    fn test_no_quantitative_columns_still_renders_numeric_patterns() {
        let schema = vec![
            SchemaColumn::new("name", "varchar"),
            SchemaColumn::new("city", "text"),
        ];
        let mut rng = StdRng::seed_from_u64(8);
        let queries = generate(
            &schema,
            "people",
            Dialect::Sql,
            Some(Category::Avg),
            2,
            &mut rng,
        )
        .unwrap();
        for query in &queries {
            let sql = query.artifact.as_sql().unwrap();
            assert!(sql.contains("AVG(\"name\")") || sql.contains("AVG(\"city\")"), "{sql}");
        }
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let schema = schema();
        let a = generate(
            &schema,
            "sales",
            Dialect::Sql,
            None,
            5,
            &mut StdRng::seed_from_u64(42),
        )
        .unwrap();
        let b = generate(
            &schema,
            "sales",
            Dialect::Sql,
            None,
            5,
            &mut StdRng::seed_from_u64(42),
        )
        .unwrap();
        assert_eq!(a, b);
    }
}
