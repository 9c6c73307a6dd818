//! Static track catalog keyed by track id.
//!
//! The catalog is loaded from a JSON document of the form:
//!
//! ```text
//! { "tracks": { "barber": { "name": ..., "points": [...], ... }, ... } }
//! ```
//!
//! Sector ids are validated while decoding, so a catalog that loads can only
//! contain renderable outlines.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TrackViewError;
use crate::track_outline::TrackOutline;

/// All known track outlines, ordered by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackCatalog {
    tracks: BTreeMap<String, TrackOutline>,
}

impl TrackCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a catalog from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, TrackViewError> {
        let catalog: TrackCatalog = serde_json::from_str(json)?;
        for (id, outline) in &catalog.tracks {
            if outline.is_empty() {
                tracing::warn!("Track '{}' has no outline points", id);
            }
        }
        Ok(catalog)
    }

    /// Loads a catalog from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TrackViewError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&text)?;
        tracing::debug!("Loaded {} tracks from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Adds or replaces an outline.
    pub fn insert(&mut self, track_id: impl Into<String>, outline: TrackOutline) {
        self.tracks.insert(track_id.into(), outline);
    }

    /// Returns the outline for a track id.
    pub fn outline(&self, track_id: &str) -> Result<&TrackOutline, TrackViewError> {
        self.tracks.get(track_id).ok_or_else(|| {
            tracing::warn!("No outline for track '{}'", track_id);
            TrackViewError::missing(track_id)
        })
    }

    /// Returns all track ids in order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.tracks.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}
