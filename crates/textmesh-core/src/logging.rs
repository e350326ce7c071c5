//! `tracing` subscriber bootstrap.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info,textmesh_text=debug";

/// Install a global fmt subscriber.
///
/// `RUST_LOG` overrides [`DEFAULT_FILTER`]. Panics if a global subscriber is already set,
/// use [`try_init`] from tests.
pub fn init() {
    tracing_subscriber::fmt().with_env_filter(env_filter()).init();
}

/// Like [`init`], but returns `false` instead of panicking when a subscriber already exists.
pub fn try_init() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_test_writer()
        .try_init()
        .is_ok()
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
