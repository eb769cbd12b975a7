//! Diagnostic logging setup.
//!
//! Logs go to stderr so they never mix with command output. `FORTRESS_LOG`
//! takes any `EnvFilter` directive and wins over the flags.

use tracing_subscriber::EnvFilter;

use crate::constants::env;

/// Default filter directive for the given flags.
pub fn default_directive(verbose: bool, quiet: bool) -> &'static str {
    if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    }
}

pub fn init_logging(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_env(env::LOG)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    // A subscriber may already be installed (tests); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
