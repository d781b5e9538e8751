//! Book category.

use serde::{Deserialize, Serialize};

/// A named category. Names are unique across the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}
