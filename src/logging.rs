//! Logging setup
//!
//! Log lines go to stderr so they never interleave with the streamed reply
//! on stdout. `RUST_LOG` takes precedence over the computed default filter.

use crate::config::LoggingConfig;
use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directive for the given verbosity
///
/// # Examples
///
/// ```
/// use csvchat::logging::default_directive;
///
/// assert_eq!(default_directive(false), "csvchat=info");
/// assert_eq!(default_directive(true), "csvchat=debug");
/// ```
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "csvchat=debug"
    } else {
        "csvchat=info"
    }
}

/// Initialize the global tracing subscriber
///
/// # Arguments
///
/// * `verbose` - Raise the default level to debug
/// * `config` - Logging configuration (JSON or human-readable output)
///
/// # Errors
///
/// Returns error if the filter is invalid or a subscriber is already set
pub fn init_logging(verbose: bool, config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(verbose)))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.json {
        let layer = fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_writer(std::io::stderr);
        registry.with(layer).try_init()?;
    } else {
        let layer = fmt::layer()
            .with_target(false)
            .with_level(true)
            .with_writer(std::io::stderr);
        registry.with(layer).try_init()?;
    }

    Ok(())
}
