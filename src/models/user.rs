//! Registered user with a home location.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::search::Located;

/// A user of the exchange, anchored to a home address.
///
/// The coordinates are stored as raw degrees; proximity search validates
/// them per candidate, so a row with a bad position degrades to a skipped
/// candidate instead of poisoning every query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    pub name: String,

    /// Unique across the directory.
    pub email: String,

    pub address: String,

    /// Home latitude in degrees.
    pub latitude: f64,

    /// Home longitude in degrees.
    pub longitude: f64,

    pub join_date: DateTime<Utc>,

    /// Categories the user is interested in.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub category_ids: Vec<i64>,
}

impl Located for User {
    fn id(&self) -> i64 {
        self.id
    }

    fn latitude(&self) -> f64 {
        self.latitude
    }

    fn longitude(&self) -> f64 {
        self.longitude
    }
}
