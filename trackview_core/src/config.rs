//! Viewer configuration.
//!
//! Every constant the projection and render passes depend on lives here so a
//! host can override it from a JSON file. Missing keys take the defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TrackViewError;
use crate::projection::Viewport;
use crate::render::Rgb;
use crate::view::RotationState;

/// Configuration for the projection, render and drag passes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Viewport width in pixels (default: 800)
    pub viewport_width: f64,

    /// Viewport height in pixels (default: 600)
    pub viewport_height: f64,

    /// Model-to-screen scale factor (default: 1.5)
    pub scale: f64,

    /// Perspective distance in model units (default: 500)
    pub perspective: f64,

    /// Background grid pitch in pixels (default: 40)
    pub grid_pitch: f64,

    /// Rotation per dragged pixel, in degrees (default: 0.5)
    pub drag_sensitivity: f64,

    /// Lower pitch clamp in degrees (default: -90)
    pub pitch_min: f64,

    /// Upper pitch clamp in degrees (default: 90)
    pub pitch_max: f64,

    /// Initial pitch when a track is selected (default: 45)
    pub initial_pitch: f64,

    /// Initial yaw when a track is selected (default: 0)
    pub initial_yaw: f64,

    /// Marker colors for sectors 1, 2 and 3
    pub sector_colors: [Rgb; 3],

    pub background_color: Rgb,
    pub grid_color: Rgb,
    pub track_color: Rgb,
    pub start_finish_color: Rgb,
    pub text_color: Rgb,

    /// Radius of per-point sector markers, in pixels
    pub marker_radius: f64,

    /// Radius of the start/finish marker, in pixels
    pub start_finish_radius: f64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            viewport_width: 800.0,
            viewport_height: 600.0,
            scale: 1.5,
            perspective: 500.0,
            grid_pitch: 40.0,
            drag_sensitivity: 0.5,
            pitch_min: -90.0,
            pitch_max: 90.0,
            initial_pitch: 45.0,
            initial_yaw: 0.0,
            sector_colors: [
                Rgb::new(239, 68, 68),  // Red
                Rgb::new(59, 130, 246), // Blue
                Rgb::new(234, 179, 8),  // Yellow
            ],
            background_color: Rgb::new(10, 10, 10),
            grid_color: Rgb::new(31, 31, 31),
            track_color: Rgb::new(255, 255, 255),
            start_finish_color: Rgb::new(34, 197, 94),
            text_color: Rgb::new(156, 163, 175),
            marker_radius: 4.0,
            start_finish_radius: 8.0,
        }
    }
}

impl ViewerConfig {
    /// Loads a configuration from a JSON file and validates it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TrackViewError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: ViewerConfig = serde_json::from_str(&text)?;
        config.validate()?;
        tracing::debug!("Loaded viewer config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Checks that every value is within its allowed range.
    pub fn validate(&self) -> Result<(), TrackViewError> {
        let positive = [
            ("viewport_width", self.viewport_width),
            ("viewport_height", self.viewport_height),
            ("scale", self.scale),
            ("perspective", self.perspective),
            ("grid_pitch", self.grid_pitch),
            ("marker_radius", self.marker_radius),
            ("start_finish_radius", self.start_finish_radius),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(TrackViewError::config(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }

        let finite = [
            ("drag_sensitivity", self.drag_sensitivity),
            ("pitch_min", self.pitch_min),
            ("pitch_max", self.pitch_max),
            ("initial_pitch", self.initial_pitch),
            ("initial_yaw", self.initial_yaw),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(TrackViewError::config(format!("{} must be finite", name)));
            }
        }

        if self.pitch_min > self.pitch_max {
            return Err(TrackViewError::config(format!(
                "pitch_min ({}) exceeds pitch_max ({})",
                self.pitch_min, self.pitch_max
            )));
        }

        if !(self.pitch_min..=self.pitch_max).contains(&self.initial_pitch) {
            return Err(TrackViewError::config(format!(
                "initial_pitch {} outside [{}, {}]",
                self.initial_pitch, self.pitch_min, self.pitch_max
            )));
        }

        Ok(())
    }

    /// Returns the viewport described by this config.
    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.viewport_width,
            height: self.viewport_height,
            scale: self.scale,
            perspective: self.perspective,
        }
    }

    /// Returns the rotation a freshly selected track starts with.
    pub fn initial_rotation(&self) -> RotationState {
        RotationState::new(self.initial_pitch, self.initial_yaw, self.pitch_min, self.pitch_max)
    }
}
