//! Logging configuration for athena-frame.
//!
//! Logs go to stderr so stdout carries only the rendered result.

use tracing_subscriber::EnvFilter;

/// Returns the filter used when `RUST_LOG` is not set.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "athena_frame=debug,warn"
    } else {
        "athena_frame=info,warn"
    }
}

/// Initializes logging to stderr.
///
/// `RUST_LOG` takes precedence over the built-in filter.
pub fn init_stderr_logging(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose))),
        )
        .with_writer(std::io::stderr)
        .init();
}
