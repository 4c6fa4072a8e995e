//! Tracing initialization

use tracing_subscriber::EnvFilter;

/// Initialize tracing to stderr. `RUST_LOG` takes precedence; the
/// `--debug` flag widens the default filter.
pub fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "info,stagehand=debug"
    } else {
        "warn,stagehand=warn"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
}
