//! TrackView Core - 3D Track Outline Projection Engine
//!
//! Turns a circuit's ordered 3D outline into 2D draw instructions:
//! 1. **Projection**: yaw/pitch rotation followed by a fixed perspective divide
//! 2. **View state**: pointer-drag rotation with a clamped pitch
//! 3. **Rendering**: a pure, restartable stream of [`DrawInstruction`]s that any
//!    host surface executes in order
//!
//! The interactive terminal host is available behind the `viewer` feature.

pub mod error;
pub mod track_outline;
pub mod projection;
pub mod view;
pub mod render;
pub mod catalog;
pub mod config;
pub mod exporter;

#[cfg(feature = "viewer")]
pub mod viewer;

// Re-export key types for convenience
pub use catalog::TrackCatalog;
pub use config::ViewerConfig;
pub use error::TrackViewError;
pub use exporter::FrameExport;
pub use projection::{project, ScreenPoint, Viewport};
pub use render::{render_frame, DrawInstruction, Rgb};
pub use track_outline::{Direction, Sector, TrackOutline, TrackPoint, BACK_TO_START};
pub use view::{DragState, RotationState, TrackView};
