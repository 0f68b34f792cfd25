//! Structured logging via `tracing`.
//!
//! Log output goes to stderr so stdout stays clean for command output.
//! The filter comes from `WORKFLOW_EMIT_LOG`, then `RUST_LOG`, then a default
//! level chosen by `--verbose`.

use tracing_subscriber::EnvFilter;

/// Environment variable consulted first for the log filter.
pub const LOG_ENV: &str = "WORKFLOW_EMIT_LOG";

/// Default filter directive when no environment override is set.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "workflow_emit=debug,info"
    } else {
        "warn"
    }
}

/// Build the env filter, honoring environment overrides.
pub fn build_env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// Install the global subscriber. Later calls are no-ops.
pub fn init_logging(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_env_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
