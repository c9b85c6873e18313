use tracing_subscriber::EnvFilter;

/// Default filter: keep wgpu's internal layers quiet unless asked for.
const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the default filter. Call once, from the host's
/// entry point, before creating a renderer.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .init();
}
