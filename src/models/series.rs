//! Series model

use serde::{Deserialize, Serialize};

/// Optional grouping of related publications
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    pub id: String,
    pub title: String,
}
