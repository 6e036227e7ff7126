//! Tracing setup for embedding front ends.
//!
//! The client logs request flow at `debug` and the conflict-retry
//! fallback at `warn`. Front ends that expose a verbosity switch can
//! pass it through here instead of threading a flag into every call.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// `verbose` raises this crate's directive to `debug`, making each
/// request and retry visible. Anything named in `RUST_LOG` still wins.
pub fn init(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(directive(verbose).parse().unwrap()),
        )
        .init();
}

/// Default filter directive for this crate.
fn directive(verbose: bool) -> &'static str {
    if verbose {
        "pantheon_secrets=debug"
    } else {
        "pantheon_secrets=info"
    }
}
