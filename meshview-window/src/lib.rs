/// Windowed front end for meshview: a winit event loop and a wgpu renderer
/// implementing [`meshview_core::RenderBackend`].
pub mod app;
pub mod renderer;

pub use app::run;
pub use renderer::GpuRenderer;

/// Default log filter: info for our crates, GPU stack internals silenced.
pub const DEFAULT_LOG_FILTER: &str = "info,wgpu_core=off,wgpu_hal=off,naga=off";

/// Install env_logger. `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER),
    )
    .format_timestamp_secs()
    .try_init();
}
