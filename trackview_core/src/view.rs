//! Interactive view state: rotation, pointer drag and redraw tracking.
//!
//! A [`TrackView`] exclusively owns the rotation and drag records for one
//! selected track. Pointer handlers mutate them only through
//! [`TrackView::begin_drag`], [`TrackView::update_drag`] and
//! [`TrackView::end_drag`]; rendering reads them.
//!
//! # Usage
//!
//! ```ignore
//! let mut view = TrackView::open(&catalog, "barber", &ViewerConfig::default())?;
//!
//! view.begin_drag(Point2::new(100.0, 100.0));
//! view.update_drag(Point2::new(120.0, 90.0));
//! view.end_drag();
//!
//! if view.take_redraw() {
//!     for instruction in view.frame() {
//!         surface.execute(instruction);
//!     }
//! }
//! ```

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::catalog::TrackCatalog;
use crate::config::ViewerConfig;
use crate::error::TrackViewError;
use crate::render::{render_frame, DrawInstruction};
use crate::track_outline::TrackOutline;

/// Viewer orientation in degrees.
///
/// Pitch is clamped on every update; yaw is unbounded and wraps through
/// the trigonometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationState {
    pitch: f64,
    yaw: f64,
}

impl RotationState {
    /// Creates a rotation, clamping pitch to `[pitch_min, pitch_max]`.
    ///
    /// A NaN pitch lands on `pitch_min`. Inverted bounds resolve to `pitch_max`
    /// instead of panicking.
    pub fn new(pitch: f64, yaw: f64, pitch_min: f64, pitch_max: f64) -> Self {
        Self {
            pitch: clamp_pitch(pitch, pitch_min, pitch_max),
            yaw,
        }
    }

    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    pub fn yaw(&self) -> f64 {
        self.yaw
    }

    /// Adds the deltas, then re-clamps pitch.
    pub fn rotate(&mut self, delta_pitch: f64, delta_yaw: f64, pitch_min: f64, pitch_max: f64) {
        self.pitch = clamp_pitch(self.pitch + delta_pitch, pitch_min, pitch_max);
        self.yaw += delta_yaw;
    }
}

fn clamp_pitch(pitch: f64, pitch_min: f64, pitch_max: f64) -> f64 {
    pitch.max(pitch_min).min(pitch_max)
}

impl Default for RotationState {
    fn default() -> Self {
        Self {
            pitch: 45.0,
            yaw: 0.0,
        }
    }
}

/// Pointer drag tracking.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    /// No pointer interaction in progress
    #[default]
    Idle,

    /// Pointer is down; `last` is the most recent pointer position in pixels
    Dragging { last: Point2<f64> },
}

impl DragState {
    pub fn is_active(&self) -> bool {
        matches!(self, DragState::Dragging { .. })
    }

    /// Returns the last pointer position while dragging.
    pub fn last_position(&self) -> Option<Point2<f64>> {
        match self {
            DragState::Idle => None,
            DragState::Dragging { last } => Some(*last),
        }
    }
}

/// The view of one selected track.
#[derive(Debug, Clone)]
pub struct TrackView {
    track_id: String,
    outline: TrackOutline,
    config: ViewerConfig,
    rotation: RotationState,
    drag: DragState,
    needs_redraw: bool,
}

impl TrackView {
    /// Creates a view with the configured initial rotation.
    pub fn new(track_id: impl Into<String>, outline: TrackOutline, config: ViewerConfig) -> Self {
        let rotation = config.initial_rotation();
        Self {
            track_id: track_id.into(),
            outline,
            config,
            rotation,
            drag: DragState::Idle,
            needs_redraw: true,
        }
    }

    /// Looks up a track in the catalog and opens a view on it.
    ///
    /// The config is validated first.
    pub fn open(
        catalog: &TrackCatalog,
        track_id: &str,
        config: &ViewerConfig,
    ) -> Result<Self, TrackViewError> {
        config.validate()?;
        let outline = catalog.outline(track_id)?;
        tracing::debug!("Opened view on '{}' ({} points)", track_id, outline.len());
        Ok(Self::new(track_id, outline.clone(), config.clone()))
    }

    pub fn track_id(&self) -> &str {
        &self.track_id
    }

    pub fn outline(&self) -> &TrackOutline {
        &self.outline
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn rotation(&self) -> RotationState {
        self.rotation
    }

    pub fn drag(&self) -> DragState {
        self.drag
    }

    /// Sets the rotation directly (pitch is clamped).
    ///
    /// Rejects NaN and infinite angles, leaving the rotation unchanged.
    pub fn set_rotation(&mut self, pitch: f64, yaw: f64) -> Result<(), TrackViewError> {
        if !pitch.is_finite() || !yaw.is_finite() {
            return Err(TrackViewError::InvalidRotation(format!(
                "pitch={} yaw={}",
                pitch, yaw
            )));
        }
        self.rotation = RotationState::new(pitch, yaw, self.config.pitch_min, self.config.pitch_max);
        self.needs_redraw = true;
        Ok(())
    }

    /// Restores the configured initial rotation.
    pub fn reset_rotation(&mut self) {
        self.rotation = self.config.initial_rotation();
        self.needs_redraw = true;
    }

    /// Starts a drag at the given pointer position.
    ///
    /// A non-finite position is ignored.
    pub fn begin_drag(&mut self, position: Point2<f64>) {
        if !position.x.is_finite() || !position.y.is_finite() {
            return;
        }
        self.drag = DragState::Dragging { last: position };
    }

    /// Rotates by the pointer movement since the last drag event.
    ///
    /// No-op while idle or when the movement is not finite. Returns true if
    /// the rotation changed.
    pub fn update_drag(&mut self, position: Point2<f64>) -> bool {
        let DragState::Dragging { last } = self.drag else {
            return false;
        };

        let delta = (position - last) * self.config.drag_sensitivity;
        if !delta.x.is_finite() || !delta.y.is_finite() {
            return false;
        }
        let before = self.rotation;

        self.rotation.rotate(delta.y, delta.x, self.config.pitch_min, self.config.pitch_max);
        self.drag = DragState::Dragging { last: position };

        let changed = self.rotation != before;
        self.needs_redraw |= changed;
        changed
    }

    /// Ends the drag. Safe to call at any time.
    pub fn end_drag(&mut self) {
        self.drag = DragState::Idle;
    }

    /// Returns whether a redraw is pending and clears the flag.
    ///
    /// Hosts call this once per frame, so any number of drag updates between
    /// two frames collapse into one redraw.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    /// Renders the current frame.
    pub fn frame(&self) -> impl Iterator<Item = DrawInstruction> + Clone + '_ {
        render_frame(&self.outline, self.rotation, &self.config)
    }
}
