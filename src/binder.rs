//! Parameter binding.
//!
//! Draws one concrete value per placeholder a pattern requires: column names
//! from the classified pools, integers from fixed ranges, wildcard literals
//! from a fixed set. Every rendered query gets its own fresh [`Binding`];
//! randomness comes from an injected [`Rng`] so tests can pin outcomes.

use std::collections::HashMap;
use std::fmt;
use std::ops::RangeInclusive;

use rand::Rng;
use rand::seq::IndexedRandom;

use crate::catalog::{Placeholder, QueryPattern};
use crate::classify::ColumnClasses;
use crate::error::{QuexError, QuexResult};

/// HAVING count threshold range. Tunable constant, not schema-derived.
pub const MIN_COUNT_RANGE: RangeInclusive<i64> = 2..=5;
/// Numeric comparison threshold range.
pub const THRESHOLD_RANGE: RangeInclusive<i64> = 10..=100;
/// Row limit range.
pub const LIMIT_RANGE: RangeInclusive<i64> = 5..=10;

/// Wildcard literal forms for text matching: prefix, suffix, contains.
pub const MATCH_FORMS: &[&str] = &["a%", "%s", "%an%"];

/// A concrete value bound to a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoundValue {
    /// A column or dataset identifier pulled from the schema.
    Ident(String),
    /// An integer literal.
    Int(i64),
    /// A free-text literal, quoted and escaped by the renderer.
    Text(String),
}

impl BoundValue {
    /// Identifier name, if this value is one.
    pub fn as_ident(&self) -> Option<&str> {
        match self {
            BoundValue::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// Integer value, if this value is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            BoundValue::Int(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for BoundValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundValue::Ident(name) => write!(f, "{name}"),
            BoundValue::Int(n) => write!(f, "{n}"),
            BoundValue::Text(text) => write!(f, "{text}"),
        }
    }
}

/// A concrete assignment of values to a pattern's placeholders, generated
/// fresh per rendered query and never reused.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Binding {
    values: HashMap<Placeholder, BoundValue>,
}

impl Binding {
    pub fn get(&self, placeholder: Placeholder) -> Option<&BoundValue> {
        self.values.get(&placeholder)
    }

    pub fn insert(&mut self, placeholder: Placeholder, value: BoundValue) {
        self.values.insert(placeholder, value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Placeholder, &BoundValue)> {
        self.values.iter().map(|(p, v)| (*p, v))
    }
}

/// Bind every placeholder the pattern requires.
///
/// Fails with `InsufficientSchema` only when the dataset has no columns at
/// all; the pool fallbacks in [`ColumnClasses`] cover every narrower gap.
pub fn bind<R: Rng + ?Sized>(
    pattern: &QueryPattern,
    classes: &ColumnClasses,
    dataset: &str,
    rng: &mut R,
) -> QuexResult<Binding> {
    if classes.is_empty() {
        return Err(QuexError::insufficient(dataset));
    }

    let mut binding = Binding::default();
    for &placeholder in pattern.placeholders {
        let value = match placeholder {
            Placeholder::Table => BoundValue::Ident(dataset.to_string()),
            Placeholder::GroupCol | Placeholder::TextCol => {
                BoundValue::Ident(pick(classes.categorical_pool(), dataset, rng)?)
            }
            Placeholder::NumericCol => {
                BoundValue::Ident(pick(classes.quantitative_pool(), dataset, rng)?)
            }
            Placeholder::Col | Placeholder::OrdCol1 => {
                BoundValue::Ident(pick(&classes.all, dataset, rng)?)
            }
            Placeholder::OrdCol2 => BoundValue::Ident(pick_secondary(&binding, classes, rng)),
            Placeholder::MinCount => BoundValue::Int(rng.random_range(MIN_COUNT_RANGE)),
            Placeholder::Threshold => BoundValue::Int(rng.random_range(THRESHOLD_RANGE)),
            Placeholder::Limit => BoundValue::Int(rng.random_range(LIMIT_RANGE)),
            Placeholder::Pattern => BoundValue::Text(
                MATCH_FORMS
                    .choose(rng)
                    .copied()
                    .unwrap_or(MATCH_FORMS[0])
                    .to_string(),
            ),
        };
        binding.insert(placeholder, value);
    }
    Ok(binding)
}

fn pick<R: Rng + ?Sized>(pool: &[String], dataset: &str, rng: &mut R) -> QuexResult<String> {
    pool.choose(rng)
        .cloned()
        .ok_or_else(|| QuexError::insufficient(dataset))
}

/// Secondary ordering column: drawn from `all` minus the primary, so the
/// two differ whenever the schema has at least two columns. A one-column
/// schema degenerates to a no-op secondary sort key.
fn pick_secondary<R: Rng + ?Sized>(
    binding: &Binding,
    classes: &ColumnClasses,
    rng: &mut R,
) -> String {
    // Catalog order guarantees ord_col1 is bound before ord_col2.
    let primary = binding
        .get(Placeholder::OrdCol1)
        .and_then(BoundValue::as_ident)
        .unwrap_or_default()
        .to_string();
    let others: Vec<&String> = classes.all.iter().filter(|c| **c != primary).collect();
    match others.choose(rng) {
        Some(other) => (*other).clone(),
        None => primary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Category, category_patterns};
    use crate::classify::classify;
    use crate::schema::{Dialect, SchemaColumn};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn classes(cols: &[(&str, &str)]) -> ColumnClasses {
        let columns: Vec<SchemaColumn> = cols
            .iter()
            .map(|(n, t)| SchemaColumn::new(*n, *t))
            .collect();
        classify(Dialect::Sql, &columns)
    }

    fn pattern(category: Category, id: &str) -> &'static QueryPattern {
        category_patterns(category.dialect(), category)
            .unwrap()
            .into_iter()
            .find(|p| p.id == id)
            .unwrap()
    }

    #[test]
    fn test_roles_never_swap() {
        let classes = classes(&[("id", "int"), ("category", "varchar"), ("amount", "float")]);
        let pattern = pattern(Category::GroupBy, "group_by_sum");
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let binding = bind(pattern, &classes, "sales", &mut rng).unwrap();
            assert_eq!(
                binding.get(Placeholder::GroupCol).unwrap().as_ident(),
                Some("category")
            );
            let numeric = binding.get(Placeholder::NumericCol).unwrap().as_ident();
            assert!(matches!(numeric, Some("id") | Some("amount")));
        }
    }

    #[test]
    fn test_integer_ranges() {
        let classes = classes(&[("category", "varchar"), ("amount", "float")]);
        let having = pattern(Category::Having, "having_count");
        let order = pattern(Category::OrderBy, "order_by_desc");
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let b = bind(having, &classes, "sales", &mut rng).unwrap();
            let min_count = b.get(Placeholder::MinCount).unwrap().as_int().unwrap();
            assert!(MIN_COUNT_RANGE.contains(&min_count));

            let b = bind(order, &classes, "sales", &mut rng).unwrap();
            let limit = b.get(Placeholder::Limit).unwrap().as_int().unwrap();
            assert!(LIMIT_RANGE.contains(&limit));
        }
    }

    #[test]
    fn test_ordering_columns_distinct_with_two_or_more() {
        let classes = classes(&[("a", "int"), ("b", "int"), ("c", "varchar")]);
        let order = pattern(Category::OrderBy, "order_by_desc");
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let b = bind(order, &classes, "t", &mut rng).unwrap();
            assert_ne!(
                b.get(Placeholder::OrdCol1).unwrap(),
                b.get(Placeholder::OrdCol2).unwrap()
            );
        }
    }

    #[test]
    fn test_single_column_degenerates_to_same_ordering_column() {
        let classes = classes(&[("value", "int")]);
        let order = pattern(Category::OrderBy, "order_by_desc");
        let mut rng = StdRng::seed_from_u64(3);
        let b = bind(order, &classes, "t", &mut rng).unwrap();
        assert_eq!(b.get(Placeholder::OrdCol1).unwrap().as_ident(), Some("value"));
        assert_eq!(b.get(Placeholder::OrdCol2).unwrap().as_ident(), Some("value"));
    }

    #[test]
    fn test_numeric_placeholder_falls_back_to_all() {
        // No numeric columns at all: the quantitative pool must fall back.
        let classes = classes(&[("name", "varchar"), ("city", "text")]);
        let sum = pattern(Category::Sum, "sum_total");
        let mut rng = StdRng::seed_from_u64(9);
        let b = bind(sum, &classes, "people", &mut rng).unwrap();
        let numeric = b.get(Placeholder::NumericCol).unwrap().as_ident().unwrap();
        assert!(["name", "city"].contains(&numeric));
    }

    #[test]
    fn test_zero_columns_is_insufficient_schema() {
        let classes = classes(&[]);
        let count = pattern(Category::Count, "count_all");
        let mut rng = StdRng::seed_from_u64(1);
        let err = bind(count, &classes, "void", &mut rng).unwrap_err();
        assert!(matches!(err, QuexError::InsufficientSchema { .. }));
    }

    #[test]
    fn test_match_form_is_from_fixed_set() {
        let classes = classes(&[("name", "varchar")]);
        let like = pattern(Category::Where, "where_like");
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..20 {
            let b = bind(like, &classes, "t", &mut rng).unwrap();
            match b.get(Placeholder::Pattern).unwrap() {
                BoundValue::Text(text) => assert!(MATCH_FORMS.contains(&text.as_str())),
                other => panic!("expected text literal, got {other:?}"),
            }
        }
    }
}
