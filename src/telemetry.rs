use tracing_subscriber::{fmt::time::ChronoLocal, EnvFilter};

/// Installs the global `fmt` subscriber. `RUST_LOG` overrides the default `info` level.
/// Does nothing if a subscriber is already set.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .with_thread_ids(true)
        .with_timer(ChronoLocal::rfc_3339())
        .try_init();
}
