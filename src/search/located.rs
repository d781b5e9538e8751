//! Candidate seam between the engine and the storage collaborator.

use serde::Serialize;

/// Anything with an identity and a raw position can be searched.
///
/// Coordinates are exposed as plain degrees rather than a validated
/// [`Coordinate`](crate::geo::Coordinate) because stored rows may carry
/// malformed values; the engine validates per candidate and skips the bad
/// ones instead of failing the query.
pub trait Located {
    /// Stable identity used for deduplication.
    fn id(&self) -> i64;

    /// Latitude in degrees, unvalidated.
    fn latitude(&self) -> f64;

    /// Longitude in degrees, unvalidated.
    fn longitude(&self) -> f64;
}

/// A retained candidate annotated with its distance from the reference point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hit<T> {
    pub entity: T,
    pub distance_km: f64,
}
