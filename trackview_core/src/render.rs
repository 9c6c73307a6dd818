//! Frame rendering as declarative draw instructions.
//!
//! [`render_frame`] turns an outline plus a rotation into the ordered list of
//! primitives a host surface executes verbatim:
//!
//! 1. background fill
//! 2. background grid
//! 3. track polyline (two or more points)
//! 4. one sector-colored marker per point
//! 5. the enlarged "S/F" marker on the first point
//! 6. elevation and direction text overlays
//!
//! An outline without points renders steps 1 and 2 only.
//!
//! The result is a pure function of its inputs: the iterator is lazy, and
//! cloning it restarts the frame from the first instruction.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ViewerConfig;
use crate::error::TrackViewError;
use crate::projection::{project, ScreenPoint, Viewport};
use crate::track_outline::{Sector, TrackOutline};
use crate::view::RotationState;

/// Label drawn next to the start/finish marker.
pub const START_FINISH_LABEL: &str = "S/F";

/// Screen position of the first overlay line; later lines stack below it.
const OVERLAY_ORIGIN: (f64, f64) = (10.0, 20.0);
const OVERLAY_LINE_HEIGHT: f64 = 20.0;

/// An sRGB color, written as `#rrggbb` in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self(r, g, b)
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl FromStr for Rgb {
    type Err = TrackViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(TrackViewError::config(format!("Invalid color: {}", s)));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|_| TrackViewError::config(format!("Invalid color: {}", s)))
        };
        Ok(Self(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = TrackViewError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Rgb> for String {
    fn from(color: Rgb) -> String {
        color.to_hex()
    }
}

/// A straight screen-space segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// One drawing primitive, in screen pixels (y grows downward).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawInstruction {
    /// Fill the whole viewport
    Background { width: f64, height: f64, color: Rgb },

    /// Decorative grid spanning the viewport
    GridLines { pitch: f64, lines: Vec<Segment>, color: Rgb },

    /// Open polyline through the points in order
    Polyline { points: Vec<ScreenPoint>, color: Rgb },

    /// Filled circle; `sector` is set for per-point markers only
    CircleMarker {
        center: ScreenPoint,
        radius: f64,
        color: Rgb,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sector: Option<Sector>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    },

    /// Text anchored at a fixed screen position
    TextLabel { x: f64, y: f64, text: String, color: Rgb },
}

/// Renders one frame of the outline under the given rotation.
pub fn render_frame<'a>(
    outline: &'a TrackOutline,
    rotation: RotationState,
    config: &'a ViewerConfig,
) -> impl Iterator<Item = DrawInstruction> + Clone + 'a {
    let viewport = config.viewport();

    std::iter::once_with(move || DrawInstruction::Background {
        width: viewport.width,
        height: viewport.height,
        color: config.background_color,
    })
    .chain(std::iter::once_with(move || grid_lines(&viewport, config)))
    .chain(
        (outline.len() >= 2)
            .then_some(())
            .into_iter()
            .map(move |()| DrawInstruction::Polyline {
                points: outline
                    .points
                    .iter()
                    .map(|p| project(&p.position, &rotation, &viewport))
                    .collect(),
                color: config.track_color,
            }),
    )
    .chain(outline.points.iter().map(move |p| DrawInstruction::CircleMarker {
        center: project(&p.position, &rotation, &viewport),
        radius: config.marker_radius,
        color: config.sector_colors[p.sector.index()],
        sector: Some(p.sector),
        label: None,
    }))
    .chain(outline.start_finish().into_iter().map(move |p| DrawInstruction::CircleMarker {
        center: project(&p.position, &rotation, &viewport),
        radius: config.start_finish_radius,
        color: config.start_finish_color,
        sector: None,
        label: Some(START_FINISH_LABEL.to_string()),
    }))
    .chain(overlays(outline, config))
}

fn grid_lines(viewport: &Viewport, config: &ViewerConfig) -> DrawInstruction {
    let pitch = config.grid_pitch;
    let columns = (viewport.width / pitch).floor() as usize;
    let rows = (viewport.height / pitch).floor() as usize;

    let vertical = (0..=columns).map(|i| {
        let x = i as f64 * pitch;
        Segment { x1: x, y1: 0.0, x2: x, y2: viewport.height }
    });
    let horizontal = (0..=rows).map(|i| {
        let y = i as f64 * pitch;
        Segment { x1: 0.0, y1: y, x2: viewport.width, y2: y }
    });

    DrawInstruction::GridLines {
        pitch,
        lines: vertical.chain(horizontal).collect(),
        color: config.grid_color,
    }
}

fn overlays<'a>(
    outline: &'a TrackOutline,
    config: &'a ViewerConfig,
) -> impl Iterator<Item = DrawInstruction> + Clone + 'a {
    let lines = if outline.is_empty() { 0 } else { 3 };
    (0..lines).map(move |line: usize| {
        let text = match line {
            0 => format!(
                "Elevation: {:.1}m - {:.1}m",
                outline.elevation_range.min, outline.elevation_range.max
            ),
            1 => format!("Elevation change: {:.1}m", outline.elevation_change),
            _ => format!("Direction: {}", outline.direction),
        };
        DrawInstruction::TextLabel {
            x: OVERLAY_ORIGIN.0,
            y: OVERLAY_ORIGIN.1 + line as f64 * OVERLAY_LINE_HEIGHT,
            text,
            color: config.text_color,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track_outline::tests::square_outline;
    use crate::track_outline::{Direction, ElevationRange, TrackPoint};
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn rotation(pitch: f64, yaw: f64) -> RotationState {
        RotationState::new(pitch, yaw, -90.0, 90.0)
    }

    fn sf_markers(frame: &[DrawInstruction]) -> Vec<&DrawInstruction> {
        frame
            .iter()
            .filter(|i| {
                matches!(i, DrawInstruction::CircleMarker { label: Some(l), .. } if l == START_FINISH_LABEL)
            })
            .collect()
    }

    #[test]
    fn test_square_scenario() {
        let outline = square_outline();
        let config = ViewerConfig::default();
        let frame: Vec<_> = render_frame(&outline, rotation(45.0, 0.0), &config).collect();

        // background, grid, polyline, 4 markers, S/F, 3 overlays
        assert_eq!(frame.len(), 11);
        assert!(matches!(frame[0], DrawInstruction::Background { .. }));
        assert!(matches!(frame[1], DrawInstruction::GridLines { .. }));

        let DrawInstruction::Polyline { points, .. } = &frame[2] else {
            panic!("expected polyline, got {:?}", frame[2]);
        };
        assert_eq!(points.len(), 4);

        // z'' = y·sin(45°) since z' = 0 at yaw 0
        let s = 45.0_f64.to_radians().sin();
        assert_relative_eq!(points[0].depth, 0.0, epsilon = 1e-9);
        assert_relative_eq!(points[1].depth, 0.0, epsilon = 1e-9);
        assert_relative_eq!(points[2].depth, 10.0 * s, epsilon = 1e-9);
        assert_relative_eq!(points[3].depth, 10.0 * s, epsilon = 1e-9);
        assert!(points[1].depth < points[2].depth);

        let sector_markers = frame
            .iter()
            .filter(|i| matches!(i, DrawInstruction::CircleMarker { sector: Some(_), .. }))
            .count();
        assert_eq!(sector_markers, 4);

        let sf = sf_markers(&frame);
        assert_eq!(sf.len(), 1);
        let DrawInstruction::CircleMarker { center, radius, .. } = sf[0] else {
            unreachable!();
        };
        assert_eq!(*center, points[0]);
        assert!(*radius > config.marker_radius);

        let turns: Vec<_> = outline.turns().map(|t| t.label).collect();
        assert_eq!(turns, vec!["T1", "T2"]);
    }

    #[test]
    fn test_empty_outline_draws_background_and_grid_only() {
        let outline = TrackOutline {
            points: vec![],
            ..square_outline()
        };
        let config = ViewerConfig::default();
        let frame: Vec<_> = render_frame(&outline, rotation(45.0, 0.0), &config).collect();

        assert!(matches!(frame[0], DrawInstruction::Background { .. }));
        assert!(matches!(frame[1], DrawInstruction::GridLines { .. }));
        assert_eq!(frame.len(), 2);
    }

    #[test]
    fn test_single_point_has_marker_but_no_polyline() {
        let outline = TrackOutline {
            points: vec![TrackPoint::new(5.0, 0.0, 0.0, Sector::TWO)],
            ..square_outline()
        };
        let config = ViewerConfig::default();
        let frame: Vec<_> = render_frame(&outline, rotation(0.0, 0.0), &config).collect();

        assert!(!frame.iter().any(|i| matches!(i, DrawInstruction::Polyline { .. })));
        assert_eq!(sf_markers(&frame).len(), 1);
    }

    #[test]
    fn test_grid_spans_viewport() {
        let config = ViewerConfig::default();
        let DrawInstruction::GridLines { lines, pitch, .. } = grid_lines(&config.viewport(), &config) else {
            unreachable!();
        };

        assert_relative_eq!(pitch, 40.0);
        // 800 / 40 + 1 vertical, 600 / 40 + 1 horizontal
        assert_eq!(lines.len(), 21 + 16);
        assert!(lines.iter().all(|s| s.x1 <= 800.0 && s.y1 <= 600.0));
    }

    #[test]
    fn test_sector_colors_follow_table() {
        let outline = square_outline();
        let config = ViewerConfig::default();

        for instruction in render_frame(&outline, rotation(30.0, 60.0), &config) {
            if let DrawInstruction::CircleMarker { color, sector: Some(sector), .. } = instruction {
                assert_eq!(color, config.sector_colors[sector.index()]);
            }
        }
    }

    #[test]
    fn test_overlays() {
        let outline = TrackOutline {
            elevation_range: ElevationRange { min: 180.5, max: 240.0 },
            elevation_change: 59.5,
            direction: Direction::CounterClockwise,
            ..square_outline()
        };
        let config = ViewerConfig::default();
        let labels: Vec<_> = render_frame(&outline, rotation(0.0, 0.0), &config)
            .filter_map(|i| match i {
                DrawInstruction::TextLabel { text, x, y, .. } => Some((text, x, y)),
                _ => None,
            })
            .collect();

        assert_eq!(labels.len(), 3);
        assert_eq!(labels[0].0, "Elevation: 180.5m - 240.0m");
        assert_eq!(labels[1].0, "Elevation change: 59.5m");
        assert_eq!(labels[2].0, "Direction: Counter-clockwise");

        // Overlay positions do not depend on rotation
        let rotated: Vec<_> = render_frame(&outline, rotation(80.0, 200.0), &config)
            .filter_map(|i| match i {
                DrawInstruction::TextLabel { x, y, .. } => Some((x, y)),
                _ => None,
            })
            .collect();
        let fixed: Vec<_> = labels.iter().map(|(_, x, y)| (*x, *y)).collect();
        assert_eq!(rotated, fixed);
    }

    #[test]
    fn test_clone_restarts_frame() {
        let outline = square_outline();
        let config = ViewerConfig::default();
        let mut frame = render_frame(&outline, rotation(45.0, 0.0), &config);
        let restart = frame.clone();

        frame.next();
        frame.next();
        assert_eq!(restart.count(), 11);
        assert_eq!(frame.count(), 9);
    }

    #[test]
    fn test_rgb_hex() {
        assert_eq!(Rgb::new(239, 68, 68).to_hex(), "#ef4444");
        assert_eq!("#3B82F6".parse::<Rgb>().unwrap(), Rgb::new(59, 130, 246));
        assert!("#12345".parse::<Rgb>().is_err());
        assert!("#zzzzzz".parse::<Rgb>().is_err());
    }

    proptest! {
        #[test]
        fn prop_render_is_idempotent(pitch in -90.0f64..90.0, yaw in -720.0f64..720.0) {
            let outline = square_outline();
            let config = ViewerConfig::default();

            let first = serde_json::to_vec(&render_frame(&outline, rotation(pitch, yaw), &config).collect::<Vec<_>>()).unwrap();
            let second = serde_json::to_vec(&render_frame(&outline, rotation(pitch, yaw), &config).collect::<Vec<_>>()).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_coordinates_are_finite(pitch in -90.0f64..90.0, yaw in -720.0f64..720.0, z in -2000.0f64..2000.0) {
            let outline = TrackOutline {
                points: vec![
                    TrackPoint::new(10.0, 5.0, z, Sector::ONE),
                    TrackPoint::new(-10.0, -5.0, -z, Sector::TWO),
                ],
                ..square_outline()
            };
            let config = ViewerConfig::default();

            for instruction in render_frame(&outline, rotation(pitch, yaw), &config) {
                if let DrawInstruction::CircleMarker { center, .. } = instruction {
                    prop_assert!(center.x.is_finite() && center.y.is_finite());
                }
            }
        }
    }
}
