/// Model Viewer - inspect an OBJ mesh with an arcball camera
///
/// Controls:
///   - Left drag: rotate, middle drag: zoom, right drag: pan
///   - O/P: orthographic/perspective
///   - A: flip the animation flag (no visible effect)
///   - C: choose background, R/G/B/W/S: set its colour
///   - H: toggle shadow, X/Y/Z: rotate a fixed step
///   - ESC: quit
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use meshview_core::{load_obj, ModelViewer, ViewerConfig};

#[derive(Parser, Debug)]
#[command(name = "meshview", version, about = "Interactive OBJ mesh viewer")]
struct Cli {
    /// OBJ file to display
    mesh: PathBuf,
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mesh = load_obj(&cli.mesh).with_context(|| format!("loading {}", cli.mesh.display()))?;
    let config = ViewerConfig::model_viewer();
    let viewer = ModelViewer::new(&mesh, config.width, config.height);
    meshview_window::run(&config, &mesh, viewer)
}

fn main() {
    meshview_window::init_logging();
    if let Err(e) = run(Cli::parse()) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
