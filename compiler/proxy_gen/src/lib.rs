//! Proxy generation orchestrator.
//!
//! Drives one generation pass per distinct request:
//!
//! 1. define the type-under-construction (name, base type, interfaces)
//! 2. declare the reserved fields every proxy carries
//! 3. run the collect phase of every contributor
//! 4. run `generate` on the extra contributors, then on the proxy instance
//!    contributor
//! 5. seal and validate the type
//!
//! A failed pass rolls the type pool back to where it was before the pass,
//! so nothing of the in-progress type survives. Successful passes are
//! memoized by [`ProxyGenerator`]; the lock that guards the cache also owns
//! the pool, so the same type is never synthesized twice concurrently.

use std::sync::Once;

mod config;
mod error;
mod generator;
mod request;

pub use config::GeneratorConfig;
pub use error::GenerationError;
pub use generator::ProxyGenerator;
pub use request::ProxyRequest;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber driven by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset. Safe to call more than once.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
