//! # quex
//!
//! Example queries from schema alone: point at a dataset, get runnable
//! example queries back.
//!
//! quex inspects nothing but column names and types, classifies the columns
//! by role, and binds randomized-but-valid parameters into a catalog of
//! query patterns. Patterns render either as literal SQL or as a document
//! aggregation pipeline, and the result always has exactly as many queries
//! as asked.
//!
//! ## Quick Example
//!
//! ```rust
//! use quex::prelude::*;
//!
//! let schema = vec![
//!     SchemaColumn::new("category", "varchar"),
//!     SchemaColumn::new("amount", "float"),
//! ];
//!
//! let queries = quex::generate(&schema, "sales", Dialect::Sql, None, 5).unwrap();
//! assert_eq!(queries.len(), 5);
//! // => e.g. SELECT "category", SUM("amount") FROM "sales" GROUP BY "category"
//! ```
//!
//! ## Pipeline
//!
//! | Stage      | Module       | Job                                  |
//! |------------|--------------|--------------------------------------|
//! | classify   | [`classify`] | column name pools by semantic role   |
//! | catalog    | [`catalog`]  | static pattern registry per dialect  |
//! | bind       | [`binder`]   | fresh parameters per rendered query  |
//! | render     | [`render`]   | SQL text or typed pipeline stages    |
//! | size       | [`sizer`]    | exact requested output cardinality   |

pub mod artifact;
pub mod binder;
pub mod catalog;
pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod render;
pub mod schema;
pub mod sizer;
pub mod synth;

pub mod prelude {
    pub use crate::artifact::{DocumentQuery, GeneratedQuery, QueryArtifact, Stage};
    pub use crate::catalog::Category;
    pub use crate::engine::Db;
    pub use crate::error::{QuexError, QuexResult};
    pub use crate::schema::{Dialect, SchemaColumn};
    pub use crate::synth::DEFAULT_COUNT;
}

/// Generate example queries for a schema with a process-seeded random
/// source. Library callers needing reproducibility should use
/// [`synth::generate`] with their own [`rand::Rng`].
pub fn generate(
    columns: &[schema::SchemaColumn],
    dataset: &str,
    dialect: schema::Dialect,
    category: Option<catalog::Category>,
    count: usize,
) -> error::QuexResult<Vec<artifact::GeneratedQuery>> {
    let mut rng = rand::rng();
    synth::generate(columns, dataset, dialect, category, count, &mut rng)
}
