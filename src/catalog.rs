//! # Catalog
//!
//! Item schema and catalog loading. The catalog is a read-only JSON array of
//! items; it is re-read on every scoring run so edits show up without a
//! restart. Bucket names are closed enums, so an unknown `weather` or `style`
//! value is rejected at the load boundary instead of surfacing later as a
//! failed table lookup.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::error::StylistError;

/// Weather bucket an item is cut for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    Cold,
    Cool,
    Mild,
    Warm,
}

/// Style bucket an item belongs to. Serialized as `casual`, `semi-formal`,
/// `formal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Style {
    Casual,
    SemiFormal,
    Formal,
}

/// One wardrobe item. Immutable during a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub weather: Weather,
    pub style: Style,
    /// Formality on the same 0..10 scale as the request context.
    pub formality: f64,
    pub color: String,
}

/// Load and validate the catalog file.
///
/// Missing or malformed files are fatal for the current run; duplicate ids
/// are rejected so every score map keys exactly one entry per item.
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Vec<Item>, StylistError> {
    let path = path.as_ref();
    let data = fs::read_to_string(path).map_err(|e| StylistError::CatalogRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let items: Vec<Item> =
        serde_json::from_str(&data).map_err(|e| StylistError::CatalogInvalid {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;

    validate_catalog(&items, path)?;
    Ok(items)
}

fn validate_catalog(items: &[Item], path: &Path) -> Result<(), StylistError> {
    let mut seen = BTreeSet::new();
    for item in items {
        if !seen.insert(item.id.as_str()) {
            return Err(StylistError::CatalogInvalid {
                path: path.to_path_buf(),
                detail: format!("duplicate item id `{}`", item.id),
            });
        }
        if !item.formality.is_finite() || !(0.0..=10.0).contains(&item.formality) {
            return Err(StylistError::CatalogInvalid {
                path: path.to_path_buf(),
                detail: format!(
                    "item `{}` has formality {} outside 0..10",
                    item.id, item.formality
                ),
            });
        }
    }
    Ok(())
}
