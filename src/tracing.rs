//! Tracing (logging)

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "sales_analytics=debug,tower_http=debug";

/// Returns the log filter from the `RUST_LOG` environment variable, or the default filter.
fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into())
}

/// Initialise tracing (logging)
///
/// Events are written to stdout with the fmt layer. Dataset loads and aggregations are recorded
/// in spans at debug level, and HTTP requests by tower_http.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
