//! Error types for the TrackView engine.

use thiserror::Error;

/// Errors that can occur while loading track data or configuration.
///
/// Rendering itself never fails: a degenerate projection is recovered
/// inside [`crate::projection::project`] and an empty outline renders
/// a background-only frame.
#[derive(Debug, Error)]
pub enum TrackViewError {
    /// The catalog has no outline for the requested track id
    #[error("No track outline for '{0}'")]
    MissingTrackOutline(String),

    /// A point carries a sector id outside {1, 2, 3}
    #[error("Invalid sector {0} (expected 1, 2 or 3)")]
    InvalidSector(u8),

    /// A configuration value is out of its allowed range
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// A rotation angle is NaN or infinite
    #[error("Invalid rotation: {0}")]
    InvalidRotation(String),

    /// Reading or writing a file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decoding or encoding failed
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl TrackViewError {
    /// Creates a not-found error for the given track id.
    pub fn missing(track_id: impl Into<String>) -> Self {
        Self::MissingTrackOutline(track_id.into())
    }

    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Returns true if this error means "no such track".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::MissingTrackOutline(_))
    }
}
