//! The pattern catalog.
//!
//! A process-wide immutable registry of query shapes, keyed by dialect and
//! category. SQL patterns carry a template string with `{placeholder}`
//! markers; document patterns carry a [`DocShape`] tag that the renderer
//! expands into typed pipeline stages. Each pattern declares exactly the
//! placeholders its shape consumes, which is all the binder needs to know.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::schema::Dialect;

/// Semantic grouping of query shapes, per dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    // Relational
    GroupBy,
    Having,
    OrderBy,
    Where,
    Sum,
    Count,
    Avg,
    Aggregation,
    // Document
    Find,
    FindCriteria,
    Projection,
    Aggregate,
    Group,
    Match,
}

/// SQL categories in catalog order.
const SQL_CATEGORIES: &[Category] = &[
    Category::GroupBy,
    Category::Having,
    Category::OrderBy,
    Category::Where,
    Category::Sum,
    Category::Count,
    Category::Avg,
    Category::Aggregation,
];

/// Document categories in catalog order.
const DOCUMENT_CATEGORIES: &[Category] = &[
    Category::Find,
    Category::FindCriteria,
    Category::Projection,
    Category::Aggregate,
    Category::Group,
    Category::Match,
];

impl Category {
    /// The dialect this category belongs to.
    pub fn dialect(&self) -> Dialect {
        match self {
            Category::GroupBy
            | Category::Having
            | Category::OrderBy
            | Category::Where
            | Category::Sum
            | Category::Count
            | Category::Avg
            | Category::Aggregation => Dialect::Sql,
            Category::Find
            | Category::FindCriteria
            | Category::Projection
            | Category::Aggregate
            | Category::Group
            | Category::Match => Dialect::Document,
        }
    }

    /// Canonical lowercase name, as accepted on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Category::GroupBy => "group_by",
            Category::Having => "having",
            Category::OrderBy => "order_by",
            Category::Where => "where",
            Category::Sum => "sum",
            Category::Count => "count",
            Category::Avg => "avg",
            Category::Aggregation => "aggregation",
            Category::Find => "find",
            Category::FindCriteria => "find_criteria",
            Category::Projection => "projection",
            Category::Aggregate => "aggregate",
            Category::Group => "group",
            Category::Match => "match",
        }
    }

    /// All categories defined for a dialect, in catalog order.
    pub fn all_for(dialect: Dialect) -> &'static [Category] {
        match dialect {
            Dialect::Sql => SQL_CATEGORIES,
            Dialect::Document => DOCUMENT_CATEGORIES,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        SQL_CATEGORIES
            .iter()
            .chain(DOCUMENT_CATEGORIES)
            .find(|c| c.name() == normalized)
            .copied()
            .ok_or_else(|| format!("no such category: {s}"))
    }
}

/// A value slot a pattern needs filled before it can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// Dataset name, verbatim.
    Table,
    /// Grouping key, drawn from the categorical pool.
    GroupCol,
    /// Text column, drawn from the categorical pool.
    TextCol,
    /// Numeric column, drawn from the quantitative pool.
    NumericCol,
    /// Any column.
    Col,
    /// Primary ordering column, any column.
    OrdCol1,
    /// Secondary ordering column, distinct from the primary when possible.
    OrdCol2,
    /// HAVING count threshold, 2..=5.
    MinCount,
    /// Numeric comparison threshold, 10..=100.
    Threshold,
    /// Row limit, 5..=10.
    Limit,
    /// Text-match wildcard literal.
    Pattern,
}

impl Placeholder {
    /// The `{marker}` name used inside SQL and description templates.
    pub fn marker(&self) -> &'static str {
        match self {
            Placeholder::Table => "table",
            Placeholder::GroupCol => "group_col",
            Placeholder::TextCol => "text_col",
            Placeholder::NumericCol => "numeric_col",
            Placeholder::Col => "col",
            Placeholder::OrdCol1 => "ord_col1",
            Placeholder::OrdCol2 => "ord_col2",
            Placeholder::MinCount => "min_count",
            Placeholder::Threshold => "threshold",
            Placeholder::Limit => "limit",
            Placeholder::Pattern => "pattern",
        }
    }
}

/// Structural tag for a document-dialect pattern.
///
/// The renderer owns the expansion of each shape into typed stages; the
/// catalog only records which shape a pattern is and what it consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocShape {
    /// `find({})` with a row limit.
    FindAll,
    /// `find({text_col: {$regex: ...}})`.
    FindMatching,
    /// `find({numeric_col: {$gt: threshold}})`.
    CriteriaAbove,
    /// `find({numeric_col: {$lt: threshold}})` with a row limit.
    CriteriaBelow,
    /// `find({}, {ord_col1: 1, ord_col2: 1, _id: 0})`.
    ProjectPair,
    /// `find({numeric_col: {$gte: threshold}}, {text_col: 1, numeric_col: 1, _id: 0})`.
    ProjectMatching,
    /// `[{$sort: {numeric_col: -1}}, {$limit: n}]`.
    TopValues,
    /// `[{$group: ...$sum...}, {$sort: {total: -1}}, {$limit: n}]`.
    GroupTotalsRanked,
    /// `[{$group: {_id, count: {$sum: 1}}}]`.
    GroupCount,
    /// `[{$group: {_id, total: {$sum: "$col"}}}]`.
    GroupSum,
    /// `[{$group: {_id, average: {$avg: "$col"}}}]`.
    GroupAvg,
    /// `[{$match: {numeric > t}}, {$group: count}, {$sort: {count: -1}}]`.
    MatchGroupSort,
}

/// How a pattern renders: a SQL template or a document shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternShape {
    Sql(&'static str),
    Document(DocShape),
}

/// One static query pattern: template plus description template plus the
/// exact set of placeholders the templates consume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPattern {
    pub id: &'static str,
    pub category: Category,
    pub shape: PatternShape,
    pub description: &'static str,
    pub placeholders: &'static [Placeholder],
}

impl QueryPattern {
    pub fn dialect(&self) -> Dialect {
        self.category.dialect()
    }
}

use Placeholder::*;

const fn sql(
    id: &'static str,
    category: Category,
    template: &'static str,
    description: &'static str,
    placeholders: &'static [Placeholder],
) -> QueryPattern {
    QueryPattern {
        id,
        category,
        shape: PatternShape::Sql(template),
        description,
        placeholders,
    }
}

const fn doc(
    id: &'static str,
    category: Category,
    shape: DocShape,
    description: &'static str,
    placeholders: &'static [Placeholder],
) -> QueryPattern {
    QueryPattern {
        id,
        category,
        shape: PatternShape::Document(shape),
        description,
        placeholders,
    }
}

/// The full catalog, built once per process and never mutated.
static CATALOG: LazyLock<Vec<QueryPattern>> = LazyLock::new(|| {
    vec![
        // --- relational ---------------------------------------------------
        sql(
            "group_by_count",
            Category::GroupBy,
            "SELECT {group_col}, COUNT(*) FROM {table} GROUP BY {group_col}",
            "Count rows for each {group_col}",
            &[Table, GroupCol],
        ),
        sql(
            "group_by_sum",
            Category::GroupBy,
            "SELECT {group_col}, SUM({numeric_col}) FROM {table} GROUP BY {group_col}",
            "Sum of {numeric_col} grouped by {group_col}",
            &[Table, GroupCol, NumericCol],
        ),
        sql(
            "group_by_avg",
            Category::GroupBy,
            "SELECT {group_col}, AVG({numeric_col}) FROM {table} GROUP BY {group_col}",
            "Average {numeric_col} for each {group_col}",
            &[Table, GroupCol, NumericCol],
        ),
        sql(
            "having_count",
            Category::Having,
            "SELECT {group_col}, COUNT(*) FROM {table} GROUP BY {group_col} HAVING COUNT(*) > {min_count}",
            "Values of {group_col} appearing more than {min_count} times",
            &[Table, GroupCol, MinCount],
        ),
        sql(
            "having_sum",
            Category::Having,
            "SELECT {group_col}, SUM({numeric_col}) FROM {table} GROUP BY {group_col} HAVING SUM({numeric_col}) > {threshold}",
            "Groups of {group_col} whose total {numeric_col} exceeds {threshold}",
            &[Table, GroupCol, NumericCol, Threshold],
        ),
        sql(
            "order_by_desc",
            Category::OrderBy,
            "SELECT * FROM {table} ORDER BY {ord_col1} DESC, {ord_col2} ASC LIMIT {limit}",
            "Top {limit} rows ordered by {ord_col1} descending, then {ord_col2}",
            &[Table, OrdCol1, OrdCol2, Limit],
        ),
        sql(
            "order_by_asc",
            Category::OrderBy,
            "SELECT {ord_col1}, {ord_col2} FROM {table} ORDER BY {ord_col1} ASC, {ord_col2} DESC LIMIT {limit}",
            "First {limit} values of {ord_col1} ascending, with {ord_col2}",
            &[Table, OrdCol1, OrdCol2, Limit],
        ),
        sql(
            "where_threshold",
            Category::Where,
            "SELECT * FROM {table} WHERE {numeric_col} > {threshold}",
            "Rows where {numeric_col} exceeds {threshold}",
            &[Table, NumericCol, Threshold],
        ),
        sql(
            "where_like",
            Category::Where,
            "SELECT * FROM {table} WHERE {text_col} LIKE {pattern}",
            "Rows where {text_col} matches the pattern {pattern}",
            &[Table, TextCol, Pattern],
        ),
        sql(
            "sum_total",
            Category::Sum,
            "SELECT SUM({numeric_col}) FROM {table}",
            "Total of {numeric_col} across all rows",
            &[Table, NumericCol],
        ),
        sql(
            "sum_ranked",
            Category::Sum,
            "SELECT {group_col}, SUM({numeric_col}) FROM {table} GROUP BY {group_col} ORDER BY SUM({numeric_col}) DESC LIMIT {limit}",
            "Top {limit} values of {group_col} by total {numeric_col}",
            &[Table, GroupCol, NumericCol, Limit],
        ),
        sql(
            "count_all",
            Category::Count,
            "SELECT COUNT(*) FROM {table}",
            "Number of rows in {table}",
            &[Table],
        ),
        sql(
            "count_distinct",
            Category::Count,
            "SELECT COUNT(DISTINCT {col}) FROM {table}",
            "Number of distinct values of {col}",
            &[Table, Col],
        ),
        sql(
            "avg_total",
            Category::Avg,
            "SELECT AVG({numeric_col}) FROM {table}",
            "Average {numeric_col} across all rows",
            &[Table, NumericCol],
        ),
        sql(
            "avg_having",
            Category::Avg,
            "SELECT {group_col}, AVG({numeric_col}) FROM {table} GROUP BY {group_col} HAVING AVG({numeric_col}) > {threshold}",
            "Groups of {group_col} averaging more than {threshold} in {numeric_col}",
            &[Table, GroupCol, NumericCol, Threshold],
        ),
        sql(
            "aggregation_minmax",
            Category::Aggregation,
            "SELECT MIN({numeric_col}), MAX({numeric_col}) FROM {table}",
            "Smallest and largest {numeric_col}",
            &[Table, NumericCol],
        ),
        sql(
            "aggregation_max_by",
            Category::Aggregation,
            "SELECT {group_col}, MAX({numeric_col}) FROM {table} GROUP BY {group_col}",
            "Largest {numeric_col} for each {group_col}",
            &[Table, GroupCol, NumericCol],
        ),
        sql(
            "aggregation_profile",
            Category::Aggregation,
            "SELECT {group_col}, MIN({numeric_col}), MAX({numeric_col}), AVG({numeric_col}) FROM {table} GROUP BY {group_col}",
            "Min, max and average {numeric_col} for each {group_col}",
            &[Table, GroupCol, NumericCol],
        ),
        // --- document -----------------------------------------------------
        doc(
            "find_all",
            Category::Find,
            DocShape::FindAll,
            "First {limit} documents in {table}",
            &[Table, Limit],
        ),
        doc(
            "find_matching",
            Category::Find,
            DocShape::FindMatching,
            "Documents where {text_col} matches the pattern {pattern}",
            &[Table, TextCol, Pattern],
        ),
        doc(
            "criteria_above",
            Category::FindCriteria,
            DocShape::CriteriaAbove,
            "Documents where {numeric_col} exceeds {threshold}",
            &[Table, NumericCol, Threshold],
        ),
        doc(
            "criteria_below",
            Category::FindCriteria,
            DocShape::CriteriaBelow,
            "Up to {limit} documents where {numeric_col} is below {threshold}",
            &[Table, NumericCol, Threshold, Limit],
        ),
        doc(
            "project_pair",
            Category::Projection,
            DocShape::ProjectPair,
            "Only the {ord_col1} and {ord_col2} fields of each document",
            &[Table, OrdCol1, OrdCol2],
        ),
        doc(
            "project_matching",
            Category::Projection,
            DocShape::ProjectMatching,
            "The {text_col} and {numeric_col} fields where {numeric_col} is at least {threshold}",
            &[Table, TextCol, NumericCol, Threshold],
        ),
        doc(
            "top_values",
            Category::Aggregate,
            DocShape::TopValues,
            "Top {limit} documents by {numeric_col}",
            &[Table, NumericCol, Limit],
        ),
        doc(
            "group_totals_ranked",
            Category::Aggregate,
            DocShape::GroupTotalsRanked,
            "Top {limit} values of {group_col} by total {numeric_col}",
            &[Table, GroupCol, NumericCol, Limit],
        ),
        doc(
            "group_count",
            Category::Group,
            DocShape::GroupCount,
            "Count of documents by {group_col}",
            &[Table, GroupCol],
        ),
        doc(
            "group_sum",
            Category::Group,
            DocShape::GroupSum,
            "Sum of {numeric_col} grouped by {group_col}",
            &[Table, GroupCol, NumericCol],
        ),
        doc(
            "group_avg",
            Category::Group,
            DocShape::GroupAvg,
            "Average {numeric_col} for each {group_col}",
            &[Table, GroupCol, NumericCol],
        ),
        doc(
            "match_group_sort",
            Category::Match,
            DocShape::MatchGroupSort,
            "Count documents by {text_col} where {numeric_col} exceeds {threshold}, most frequent first",
            &[Table, TextCol, NumericCol, Threshold],
        ),
    ]
});

/// All patterns for a dialect, in catalog order.
pub fn patterns(dialect: Dialect) -> impl Iterator<Item = &'static QueryPattern> {
    CATALOG.iter().filter(move |p| p.dialect() == dialect)
}

/// All variants of one category, in catalog order.
///
/// Fails with `UnknownCategory` when the category does not belong to the
/// requested dialect.
pub fn category_patterns(
    dialect: Dialect,
    category: Category,
) -> crate::error::QuexResult<Vec<&'static QueryPattern>> {
    if category.dialect() != dialect {
        return Err(crate::error::QuexError::unknown_category(
            category.name(),
            dialect,
        ));
    }
    Ok(patterns(dialect)
        .filter(|p| p.category == category)
        .collect())
}
