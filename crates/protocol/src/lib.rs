//! Shared domain types for the stylefind workspace.
//!
//! Paths follow the collection convention `<GROUP>/<CATEGORY>/.../file.jpg`
//! (e.g. `WOMEN/Denim/id_00002359/03_3_back.jpg`); group and category are
//! derived from the path on demand and never persisted.

use serde::{Deserialize, Serialize};

/// One ranked search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageHit {
    pub image_id: String,
    pub path: String,
    pub url: String,
    pub similarity: f32,
}

/// Ranked hits plus wall-clock search time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<ImageHit>,
    pub search_time_ms: f64,
}

/// Optional discrete attribute filters.
///
/// Group comparison is case-insensitive; category comparison is exact.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Filters {
    pub group: Option<String>,
    pub category: Option<String>,
}

impl Filters {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.group.is_none() && self.category.is_none()
    }

    /// Whether a record at `path` passes both filters.
    ///
    /// A path that yields no attributes never matches a non-null filter.
    #[must_use]
    pub fn accepts(&self, path: &str) -> bool {
        let (group, category) = derive_attributes(path);
        if let Some(want) = &self.group {
            match group {
                Some(g) if g.eq_ignore_ascii_case(want) => {}
                _ => return false,
            }
        }
        if let Some(want) = &self.category {
            match category {
                Some(c) if c == *want => {}
                _ => return false,
            }
        }
        true
    }
}

/// Derive `(group, category)` from a `/`-delimited path.
///
/// The first segment is the group (upper-cased), the second the category.
/// Paths with fewer than two segments yield `(None, None)`.
#[must_use]
pub fn derive_attributes(path: &str) -> (Option<String>, Option<String>) {
    let mut parts = path.split('/');
    match (parts.next(), parts.next()) {
        (Some(group), Some(category)) if !group.is_empty() && !category.is_empty() => {
            (Some(group.to_uppercase()), Some(category.to_string()))
        }
        _ => (None, None),
    }
}
