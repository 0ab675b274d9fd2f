pub mod config;
pub mod dom;
pub mod errors;
pub mod matching;
pub mod rules;
pub mod trigger;

#[cfg(all(target_arch = "wasm32", feature = "web"))]
pub mod web;

pub use crate::config::EngineConfig;
pub use crate::dom::traits::Document;
pub use crate::errors::{QuickSpaceError, QuickSpaceResult};
pub use crate::rules::store::RuleStore;
pub use crate::rules::types::{Rule, RuleKind, RuleList};
pub use crate::trigger::controller::{Dispatch, TriggerController};

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` wins over the configured filter. Calling this twice is harmless;
/// the second subscriber is rejected and a warning is logged through the first.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_tracing(logging: &config::LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.filter));
    if tracing_subscriber::fmt().with_env_filter(filter).try_init().is_err() {
        tracing::warn!("tracing subscriber already installed");
    }
}

/// Native start-up: loads `quickspace.toml` and installs logging from its
/// `[logging]` section.
#[cfg(not(target_arch = "wasm32"))]
pub fn init() -> QuickSpaceResult<EngineConfig> {
    let config = config::load_config()?;
    init_tracing(&config.logging);
    tracing::debug!(key = %config.trigger.key_code, "quickspace initialised");
    Ok(config)
}
