// Logging module for structured logging using the tracing crate

use std::error::Error;
use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

use crate::config::LogFormat;

/// Filter used when `RUST_LOG` is not set
const DEFAULT_FILTER: &str = "info";

/// Initialize the tracing subscriber for structured logging
///
/// The subscriber is configured with:
/// - Filtering from `RUST_LOG` (default: `info`)
/// - Human-readable or JSON output depending on `format`
/// - Output to stdout
///
/// Calling this more than once is not an error: the first subscriber
/// installed for the process stays in place.
///
/// # Examples
///
/// ```
/// use h2push::config::LogFormat;
/// use h2push::logging::init_subscriber;
///
/// init_subscriber(LogFormat::Text).expect("Failed to initialize logging");
/// tracing::info!("Application started");
/// ```
pub fn init_subscriber(format: LogFormat) -> Result<(), Box<dyn Error + Send + Sync>> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(DEFAULT_FILTER))?;

    let result = match format {
        LogFormat::Json => fmt().json().with_env_filter(filter).try_init(),
        LogFormat::Text => fmt().with_env_filter(filter).try_init(),
    };

    if result.is_err() {
        // A global subscriber is already set (tests, embedding hosts)
        tracing::debug!("tracing subscriber already installed, keeping it");
    }
    Ok(())
}
