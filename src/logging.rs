//! Logging configuration for healthreport.
//!
//! Report output owns stdout, so logs always go to stderr.

use tracing_subscriber::EnvFilter;

/// Returns the default filter directive for a `-v` count.
pub fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initializes stderr logging.
///
/// `RUST_LOG` takes precedence; otherwise the level follows `verbosity`.
pub fn init_logging(verbosity: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(level_for_verbosity(verbosity))),
        )
        .with_writer(std::io::stderr)
        .init();
}
