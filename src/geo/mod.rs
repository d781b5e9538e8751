//! Geographic primitives: validated coordinates and great-circle distance.

mod coordinate;
mod distance;

pub use coordinate::{Coordinate, CoordinateError};
pub use distance::{haversine_km, EARTH_RADIUS_KM};
