//! Author model
//!
//! Authors are reference data owned by author management. Publications embed a
//! snapshot of their author taken at query time.

use serde::{Deserialize, Serialize};

/// Author of publications
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Author {
    /// Stable slug identifier
    pub id: String,
    /// Display name
    pub name: String,
    pub email: String,
    pub role: String,
    /// Biography shown on the author page
    pub bio: String,
    /// Personal website URL
    #[serde(default)]
    pub website_url: Option<String>,
    /// Personal website title
    #[serde(default)]
    pub website_title: Option<String>,
}

impl Author {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            ..Self::default()
        }
    }
}
