//! Proximity search over located entities.
//!
//! Takes a reference coordinate, a radius, and a candidate sequence, and
//! returns the subset within radius ranked by ascending distance.

mod engine;
mod located;

pub use engine::{search_nearby, SearchError};
pub use located::{Hit, Located};
