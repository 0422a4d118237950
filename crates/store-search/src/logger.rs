use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer};

/// Initializes a logger writing to `stderr` for applications embedding a
/// search session.
///
/// `RUST_LOG` takes precedence over `default_directive`, e.g. `store_search=debug`.
/// Fails if a global subscriber is already installed.
pub fn init_logger(default_directive: &str) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter);
    tracing_subscriber::registry().with(stderr_layer).try_init()
}
