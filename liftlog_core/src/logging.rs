//! Tracing setup for the `liftlog` binary.
//!
//! Diagnostics go to stderr. Stdout carries only command output, so reports
//! and CSV can be piped elsewhere.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Targets that follow the verbosity flag; everything else stays at warn.
/// The binary crate is `liftlog`.
const OWN_TARGETS: &[&str] = &["liftlog_core", "liftlog"];

/// Level for a count of `-v` flags
pub fn level_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Filter directive raising our own crates to `level`
fn directive(level: &str) -> String {
    let mut directive = String::from("warn");
    for target in OWN_TARGETS {
        directive.push_str(&format!(",{}={}", target, level));
    }
    directive
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `verbose` picks the level for our
/// own crates.
pub fn init(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive(level_for_verbosity(verbose))));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

/// Initialize logging for testing (captures logs for test output)
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(EnvFilter::new(directive("debug")))
        .try_init();
}
