//! Book offered for exchange.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A book owned by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,

    /// Owning user.
    pub user_id: i64,

    pub name: String,

    pub author: String,

    pub description: String,

    pub publication_date: NaiveDate,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub category_ids: Vec<i64>,
}

impl Book {
    /// Whether the book is tagged with the given category.
    pub fn in_category(&self, category_id: i64) -> bool {
        self.category_ids.contains(&category_id)
    }
}
