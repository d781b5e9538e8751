//! Bookswap - proximity search for a book-exchange service
//!
//! This library provides the distance engine and shared types for the server
//! and nearby binaries.

pub mod geo;
pub mod models;
pub mod search;
pub mod store;

pub use geo::{haversine_km, Coordinate, EARTH_RADIUS_KM};
pub use models::{Book, Category, User};
pub use search::{search_nearby, Hit, Located, SearchError};
pub use store::{Directory, DirectoryError, NewBook, NewUser, Shelf};
