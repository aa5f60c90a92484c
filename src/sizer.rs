//! Output sizing.
//!
//! Guarantees the returned collection has exactly the requested length
//! regardless of how many distinct queries the catalog could produce.
//! Oversupply is trimmed by uniform sampling without replacement (original
//! order preserved); undersupply is padded by cyclically repeating the
//! rendered sequence from the start. Padding never re-invokes the binder.

use rand::Rng;
use rand::seq::index;

use crate::artifact::GeneratedQuery;

/// Resize `queries` to exactly `requested` elements.
pub fn size_to<R: Rng + ?Sized>(
    queries: Vec<GeneratedQuery>,
    requested: usize,
    rng: &mut R,
) -> Vec<GeneratedQuery> {
    if requested == 0 || queries.is_empty() {
        // Empty input only occurs when the catalog itself is empty, which
        // the synthesis entry point rules out before sizing.
        debug_assert!(requested == 0 || !queries.is_empty());
        return Vec::new();
    }

    if queries.len() > requested {
        let mut keep = index::sample(rng, queries.len(), requested).into_vec();
        keep.sort_unstable();
        let mut queries = queries;
        let mut picked = Vec::with_capacity(requested);
        // Drain from the back so earlier indices stay valid.
        for idx in keep.into_iter().rev() {
            picked.push(queries.swap_remove(idx));
        }
        picked.reverse();
        return picked;
    }

    let mut sized = Vec::with_capacity(requested);
    for i in 0..requested {
        sized.push(queries[i % queries.len()].clone());
    }
    sized
}
