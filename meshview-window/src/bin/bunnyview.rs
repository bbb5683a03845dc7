/// Bunny Viewer - a fixed camera on one mesh, turned with the keyboard
///
/// Controls:
///   - W/S: turn about X, A/D: turn about Y
///   - ESC: quit
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use meshview_core::{load_obj, BunnyViewer, ViewerConfig};

#[derive(Parser, Debug)]
#[command(name = "bunnyview", version, about = "Minimal OBJ viewer")]
struct Cli {
    /// OBJ file to display
    #[arg(default_value = "bunny.obj")]
    mesh: PathBuf,
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mesh = load_obj(&cli.mesh).with_context(|| format!("loading {}", cli.mesh.display()))?;
    let config = ViewerConfig::bunny_viewer();
    let viewer = BunnyViewer::new(&mesh, config.width, config.height);
    meshview_window::run(&config, &mesh, viewer)
}

fn main() {
    meshview_window::init_logging();
    if let Err(e) = run(Cli::parse()) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
