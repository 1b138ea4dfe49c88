//! Shared plumbing for the chattune binaries

pub mod args;
pub mod loader;
pub mod settings;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the tracing subscriber. `RUST_LOG` wins over the default filter.
pub fn init_tracing(verbose: bool) {
    // Target prefix: covers the engine, this crate, and the binaries
    let default_filter = if verbose {
        "chattune=debug"
    } else {
        "chattune=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
