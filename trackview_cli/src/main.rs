//! TrackView CLI
//!
//! Render a track outline from the catalog: list tracks and turns, dump the
//! draw instructions as JSON, or open the interactive terminal viewer.

use std::path::PathBuf;

use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use trackview_core::{DrawInstruction, FrameExport, TrackCatalog, TrackView, TrackViewError, ViewerConfig};

/// TrackView 3D track outline renderer
#[derive(Parser, Debug)]
#[command(name = "trackview")]
#[command(about = "Project and render 3D race track outlines", long_about = None)]
struct Args {
    /// Track catalog (JSON)
    #[arg(short, long, default_value = "data/tracks.json")]
    catalog: PathBuf,

    /// Viewer config (JSON); defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Track id to render
    #[arg(short, long)]
    track: Option<String>,

    /// List the track ids in the catalog
    #[arg(short, long)]
    list: bool,

    /// List the named turns of the selected track
    #[arg(long)]
    turns: bool,

    /// Initial pitch in degrees (clamped to the configured bounds)
    #[arg(long, allow_hyphen_values = true)]
    pitch: Option<f64>,

    /// Initial yaw in degrees
    #[arg(long, allow_hyphen_values = true)]
    yaw: Option<f64>,

    /// Print the frame's draw instructions as JSON
    #[arg(long)]
    json: bool,

    /// Export the frame to a JSON file
    #[arg(long)]
    export: Option<PathBuf>,

    /// Open the interactive terminal viewer (requires the `viewer` feature)
    #[arg(long)]
    view: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    // Initialize logging; RUST_LOG overrides --verbose
    let level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    if let Err(e) = run(&args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), TrackViewError> {
    for (name, value) in [("pitch", args.pitch), ("yaw", args.yaw)] {
        if let Some(angle) = value.filter(|a| !a.is_finite()) {
            return Err(TrackViewError::InvalidRotation(format!("{} must be finite, got {}", name, angle)));
        }
    }

    let config = match &args.config {
        Some(path) => ViewerConfig::from_file(path)?,
        None => ViewerConfig::default(),
    };
    let catalog = TrackCatalog::from_file(&args.catalog)?;
    debug!("Catalog {} has {} tracks", args.catalog.display(), catalog.len());

    if args.list {
        for id in catalog.ids() {
            let outline = catalog.outline(id)?;
            let [s1, s2, s3] = outline.sector_counts();
            println!(
                "{:<16} {:>4} points (S1 {} / S2 {} / S3 {})  {}",
                id,
                outline.len(),
                s1,
                s2,
                s3,
                outline.name
            );
        }
        return Ok(());
    }

    let track_id = match &args.track {
        Some(id) => id.clone(),
        None => catalog
            .ids()
            .next()
            .map(str::to_string)
            .ok_or_else(|| TrackViewError::missing("<empty catalog>"))?,
    };

    if args.view {
        return open_viewer(catalog, config, &track_id, args);
    }

    let mut view = TrackView::open(&catalog, &track_id, &config)?;
    if args.pitch.is_some() || args.yaw.is_some() {
        let rotation = view.rotation();
        view.set_rotation(
            args.pitch.unwrap_or(rotation.pitch()),
            args.yaw.unwrap_or(rotation.yaw()),
        )?;
    }

    if args.turns {
        for turn in view.outline().turns() {
            println!("{:<8} {}  point {}", turn.label, turn.sector, turn.index);
        }
    }

    let export = FrameExport::capture(&view);

    if let Some(path) = &args.export {
        export.write_to_file(path)?;
        info!("Exported {} instructions to {}", export.instructions.len(), path.display());
    }

    if args.json {
        println!("{}", export.to_json()?);
    } else if !args.turns {
        let markers = export
            .instructions
            .iter()
            .filter(|i| matches!(i, DrawInstruction::CircleMarker { .. }))
            .count();
        info!(
            "{} ({}): {} instructions, {} markers, pitch={:.1} yaw={:.1}",
            track_id,
            view.outline().name,
            export.instructions.len(),
            markers,
            export.pitch,
            export.yaw
        );
    }

    Ok(())
}

#[cfg(feature = "viewer")]
fn open_viewer(
    catalog: TrackCatalog,
    config: ViewerConfig,
    track_id: &str,
    args: &Args,
) -> Result<(), TrackViewError> {
    let initial = config.initial_rotation();
    let mut viewer = trackview_core::viewer::TrackViewer::new(catalog, config, track_id).with_rotation(
        args.pitch.unwrap_or(initial.pitch()),
        args.yaw.unwrap_or(initial.yaw()),
    );
    viewer.run()?;
    Ok(())
}

#[cfg(not(feature = "viewer"))]
fn open_viewer(
    _catalog: TrackCatalog,
    _config: ViewerConfig,
    _track_id: &str,
    _args: &Args,
) -> Result<(), TrackViewError> {
    Err(TrackViewError::config(
        "terminal viewer not available (compile with --features viewer)",
    ))
}
