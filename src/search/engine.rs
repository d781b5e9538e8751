//! Filter-and-rank implementation.

use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, warn};

use crate::geo::{haversine_km, Coordinate};

use super::{Hit, Located};

/// Errors raised before any candidate is examined.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SearchError {
    #[error("search radius must be a finite number of kilometers >= 0, got {0}")]
    InvalidRadius(f64),
}

/// Find all candidates within `radius_km` of `reference`, ranked by
/// ascending distance.
///
/// Candidates are consumed in one pass; only the retained set is
/// materialized before sorting. The boundary is inclusive
/// (`distance <= radius`), exact distance ties keep the input order, and an
/// entity id is never returned twice even when the caller's collection join
/// repeats it — the first retained occurrence wins. A candidate whose stored
/// coordinates fail validation is skipped with a warning rather than
/// aborting the search.
///
/// A negative or non-finite radius fails with [`SearchError::InvalidRadius`]
/// and no partial result. An empty input yields an empty result, not an
/// error.
pub fn search_nearby<T, I>(
    reference: Coordinate,
    radius_km: f64,
    candidates: I,
) -> Result<Vec<Hit<T>>, SearchError>
where
    T: Located,
    I: IntoIterator<Item = T>,
{
    if !radius_km.is_finite() || radius_km < 0.0 {
        return Err(SearchError::InvalidRadius(radius_km));
    }

    let mut seen = HashSet::new();
    let mut hits: Vec<Hit<T>> = Vec::new();
    let mut scanned = 0usize;

    for candidate in candidates {
        scanned += 1;

        let position = match Coordinate::new(candidate.latitude(), candidate.longitude()) {
            Ok(position) => position,
            Err(err) => {
                warn!("Skipping candidate {}: {}", candidate.id(), err);
                continue;
            }
        };

        // One distance value drives both the filter and the sort key.
        let distance_km = haversine_km(reference, position);
        if distance_km <= radius_km && seen.insert(candidate.id()) {
            hits.push(Hit {
                entity: candidate,
                distance_km,
            });
        }
    }

    // Vec::sort_by is stable, so equal distances preserve candidate order.
    hits.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

    debug!(
        "Proximity search around ({}, {}) within {} km: {} of {} candidates retained",
        reference.lat(),
        reference.lon(),
        radius_km,
        hits.len(),
        scanned
    );

    Ok(hits)
}
