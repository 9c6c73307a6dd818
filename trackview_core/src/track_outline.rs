//! Track outline data model.
//!
//! A [`TrackOutline`] is the ordered list of 3D points describing a circuit,
//! each point tagged with its timing [`Sector`] and, for corners, a turn label.
//! Outlines are read-only once loaded: the engine never mutates them.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::error::TrackViewError;

/// Turn label marking the closing point of the lap.
///
/// The point is drawn like any other but is left out of turn listings.
pub const BACK_TO_START: &str = "Back to Start";

/// One of the three timing sectors a lap is divided into.
///
/// Only ids 1, 2 and 3 can be constructed, so every point that reaches the
/// renderer has a defined sector color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Sector(u8);

impl Sector {
    pub const ONE: Sector = Sector(1);
    pub const TWO: Sector = Sector(2);
    pub const THREE: Sector = Sector(3);

    /// Creates a sector from its 1-based id.
    pub fn new(id: u8) -> Result<Self, TrackViewError> {
        match id {
            1..=3 => Ok(Self(id)),
            _ => Err(TrackViewError::InvalidSector(id)),
        }
    }

    /// Returns the 0-based index into a 3-entry table.
    pub fn index(&self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl TryFrom<u8> for Sector {
    type Error = TrackViewError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Sector::new(id)
    }
}

impl From<Sector> for u8 {
    fn from(sector: Sector) -> u8 {
        sector.0
    }
}

impl std::fmt::Display for Sector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "S{}", self.0)
    }
}

/// Driving direction around the circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Clockwise => write!(f, "Clockwise"),
            Direction::CounterClockwise => write!(f, "Counter-clockwise"),
        }
    }
}

/// Lowest and highest elevation on the circuit, in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevationRange {
    pub min: f64,
    pub max: f64,
}

/// A single point on the track path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    /// Position in track-model coordinates [x, y, z] (y is vertical)
    pub position: Point3<f64>,

    /// Timing sector this point belongs to
    pub sector: Sector,

    /// Corner name, absent for plain path points
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn_label: Option<String>,
}

impl TrackPoint {
    /// Creates a plain path point.
    pub fn new(x: f64, y: f64, z: f64, sector: Sector) -> Self {
        Self {
            position: Point3::new(x, y, z),
            sector,
            turn_label: None,
        }
    }

    /// Attaches a corner name to this point.
    pub fn with_turn(mut self, label: impl Into<String>) -> Self {
        self.turn_label = Some(label.into());
        self
    }

    /// Returns true if this is the closing "Back to Start" point.
    pub fn is_back_to_start(&self) -> bool {
        self.turn_label.as_deref() == Some(BACK_TO_START)
    }
}

/// A named corner, as listed in turn views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Turn<'a> {
    /// Index of the point in [`TrackOutline::points`]
    pub index: usize,
    pub label: &'a str,
    pub sector: Sector,
}

/// The full outline of one circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackOutline {
    /// Display name (e.g. "Barber Motorsports Park")
    #[serde(default)]
    pub name: String,

    /// Path points in driving order; the last point leads back to the first
    pub points: Vec<TrackPoint>,

    pub elevation_range: ElevationRange,

    /// Total elevation change over a lap, in meters
    pub elevation_change: f64,

    pub direction: Direction,
}

impl TrackOutline {
    /// Returns the number of path points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the start/finish point (the first point), if any.
    pub fn start_finish(&self) -> Option<&TrackPoint> {
        self.points.first()
    }

    /// Lists named corners in path order, skipping the "Back to Start" marker.
    pub fn turns(&self) -> impl Iterator<Item = Turn<'_>> + '_ {
        self.points.iter().enumerate().filter_map(|(index, point)| {
            match point.turn_label.as_deref() {
                Some(label) if label != BACK_TO_START => Some(Turn {
                    index,
                    label,
                    sector: point.sector,
                }),
                _ => None,
            }
        })
    }

    /// Counts the points in each sector, indexed by [`Sector::index`].
    pub fn sector_counts(&self) -> [usize; 3] {
        let mut counts = [0usize; 3];
        for point in &self.points {
            counts[point.sector.index()] += 1;
        }
        counts
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// The four-point square used across the crate's tests.
    pub(crate) fn square_outline() -> TrackOutline {
        TrackOutline {
            name: "Square".to_string(),
            points: vec![
                TrackPoint::new(0.0, 0.0, 0.0, Sector::ONE).with_turn("T1"),
                TrackPoint::new(10.0, 0.0, 0.0, Sector::ONE),
                TrackPoint::new(10.0, 10.0, 0.0, Sector::TWO).with_turn("T2"),
                TrackPoint::new(0.0, 10.0, 0.0, Sector::THREE).with_turn(BACK_TO_START),
            ],
            elevation_range: ElevationRange { min: 0.0, max: 10.0 },
            elevation_change: 10.0,
            direction: Direction::Clockwise,
        }
    }

    #[test]
    fn test_sector_bounds() {
        assert!(Sector::new(0).is_err());
        assert!(Sector::new(4).is_err());
        assert_eq!(Sector::new(2).unwrap(), Sector::TWO);
        assert_eq!(Sector::THREE.index(), 2);
    }

    #[test]
    fn test_turns_skip_back_to_start() {
        let outline = square_outline();
        let turns: Vec<_> = outline.turns().collect();

        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].label, "T1");
        assert_eq!(turns[0].index, 0);
        assert_eq!(turns[1].label, "T2");
        assert_eq!(turns[1].sector, Sector::TWO);
        assert!(turns.iter().all(|t| t.index != 3));
        assert!(outline.points[3].is_back_to_start());
    }

    #[test]
    fn test_start_finish_is_first_point() {
        let outline = square_outline();
        assert_eq!(outline.start_finish(), Some(&outline.points[0]));

        let empty = TrackOutline {
            points: vec![],
            ..square_outline()
        };
        assert!(empty.start_finish().is_none());
        assert!(empty.is_empty());
    }

    #[test]
    fn test_sector_counts() {
        assert_eq!(square_outline().sector_counts(), [2, 1, 1]);
    }

    #[test]
    fn test_deserialize_rejects_bad_sector() {
        let json = r#"{
            "points": [{ "position": [0.0, 0.0, 0.0], "sector": 4 }],
            "elevation_range": { "min": 0.0, "max": 1.0 },
            "elevation_change": 1.0,
            "direction": "clockwise"
        }"#;
        let result: Result<TrackOutline, _> = serde_json::from_str(json);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Invalid sector 4"), "unexpected error: {}", err);
    }

    #[test]
    fn test_deserialize_outline() {
        let json = r#"{
            "name": "Test",
            "points": [
                { "position": [1.0, 2.0, 3.0], "sector": 1, "turn_label": "T1" },
                { "position": [4.0, 5.0, 6.0], "sector": 3 }
            ],
            "elevation_range": { "min": 2.0, "max": 5.0 },
            "elevation_change": 3.0,
            "direction": "counter-clockwise"
        }"#;
        let outline: TrackOutline = serde_json::from_str(json).unwrap();

        assert_eq!(outline.len(), 2);
        assert_eq!(outline.points[0].position, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(outline.points[0].turn_label.as_deref(), Some("T1"));
        assert_eq!(outline.points[1].sector, Sector::THREE);
        assert_eq!(outline.direction, Direction::CounterClockwise);
        assert_eq!(outline.direction.to_string(), "Counter-clockwise");
    }
}
