//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Filter applied when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_LOG_FILTER: &str = "machine_status=info,tower_http=info";

/// Installs a formatting subscriber filtered by `RUST_LOG`.
///
/// Calling it twice keeps the first subscriber.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    if let Err(err) = tracing_subscriber::fmt().with_env_filter(filter).try_init() {
        tracing::debug!(error = %err, "tracing subscriber already installed");
    }
}
