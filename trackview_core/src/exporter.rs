//! JSON exporter for rendered frames.
//!
//! Lets a host outside this process (a browser canvas, a test fixture)
//! replay exactly the instructions the engine produced.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TrackViewError;
use crate::projection::Viewport;
use crate::render::DrawInstruction;
use crate::view::TrackView;

/// One rendered frame and the state it was rendered from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameExport {
    /// Track id in the catalog
    pub track_id: String,

    /// Pitch in degrees
    pub pitch: f64,

    /// Yaw in degrees
    pub yaw: f64,

    pub viewport: Viewport,

    /// Instructions in execution order
    pub instructions: Vec<DrawInstruction>,
}

impl FrameExport {
    /// Captures the current frame of a view.
    pub fn capture(view: &TrackView) -> Self {
        let rotation = view.rotation();
        Self {
            track_id: view.track_id().to_string(),
            pitch: rotation.pitch(),
            yaw: rotation.yaw(),
            viewport: view.config().viewport(),
            instructions: view.frame().collect(),
        }
    }

    /// Serializes to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, TrackViewError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), TrackViewError> {
        let json = self.to_json()?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use crate::track_outline::tests::square_outline;

    #[test]
    fn test_capture_matches_view() {
        let mut view = TrackView::new("square", square_outline(), ViewerConfig::default());
        view.set_rotation(10.0, 20.0).unwrap();

        let export = FrameExport::capture(&view);
        assert_eq!(export.track_id, "square");
        assert_eq!(export.pitch, 10.0);
        assert_eq!(export.yaw, 20.0);
        assert_eq!(export.instructions, view.frame().collect::<Vec<_>>());
    }

    #[test]
    fn test_json_shape() {
        let view = TrackView::new("square", square_outline(), ViewerConfig::default());
        let json = FrameExport::capture(&view).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let instructions = value["instructions"].as_array().unwrap();
        assert_eq!(instructions[0]["kind"], "background");
        assert_eq!(instructions[0]["color"], "#0a0a0a");
        assert_eq!(instructions[1]["kind"], "grid_lines");
        assert_eq!(instructions[2]["kind"], "polyline");
        assert_eq!(instructions[3]["sector"], 1);

        let parsed: FrameExport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.instructions.len(), instructions.len());
    }

    #[test]
    fn test_write_to_file() {
        let view = TrackView::new("square", square_outline(), ViewerConfig::default());
        let path = std::env::temp_dir().join(format!("trackview_export_{}.json", std::process::id()));

        FrameExport::capture(&view).write_to_file(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"track_id\": \"square\""));
        let _ = std::fs::remove_file(&path);
    }
}
