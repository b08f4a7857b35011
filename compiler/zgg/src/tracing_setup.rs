//! Tracing subscriber installation.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a hierarchical tracing subscriber.
///
/// Filter directives come from `ZGG_LOG`, falling back to `RUST_LOG`
/// (e.g. `ZGG_LOG=zgg_eval=debug`). Nothing is installed when neither is
/// set. Safe to call multiple times.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        let Ok(directives) = std::env::var("ZGG_LOG").or_else(|_| std::env::var("RUST_LOG"))
        else {
            return;
        };
        let installed = tracing_subscriber::registry()
            .with(EnvFilter::new(directives))
            .with(
                tracing_tree::HierarchicalLayer::new(2)
                    .with_targets(true)
                    .with_bracketed_fields(true),
            )
            .try_init();
        // The host may have installed its own subscriber first.
        if installed.is_err() {
            tracing::debug!("global tracing subscriber already set");
        }
    });
}
