//! Tracing setup for the simulator binary and the test suites
//!
//! Both entry points read `RUST_LOG` and fall back to a crate-level default:
//! - `RUST_LOG=bandform=debug` - per-stage events from synthesis and analysis
//! - `RUST_LOG=bandform::synthesize=trace` - window offsets for one stage
//! - `RUST_LOG=bandform=debug,bandform::spectrum=trace` - mixed levels

use once_cell::sync::Lazy;
use tracing_subscriber::{fmt, EnvFilter};

const BINARY_DEFAULT: &str = "bandform=info";
const TEST_DEFAULT: &str = "bandform=warn";

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install a test-writer subscriber at most once per process
///
/// Safe to call from every test.
pub fn init_test_tracing() {
    static TRACING: Lazy<()> = Lazy::new(|| {
        // another harness may already own the global subscriber
        let _ = fmt()
            .with_env_filter(env_filter(TEST_DEFAULT))
            .with_target(true)
            .with_line_number(true)
            .with_test_writer()
            .try_init();
    });

    Lazy::force(&TRACING);
}

/// Install the stderr subscriber for `bandsim`; call once, early in `main`
pub fn init_tracing() {
    fmt()
        .with_env_filter(env_filter(BINARY_DEFAULT))
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
