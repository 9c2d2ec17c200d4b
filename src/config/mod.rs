//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → InertiaConfig (validated, immutable)
//!     → http::InertiaState (ArcSwap snapshot per request)
//!
//! On change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → InertiaState::reload swaps the snapshot
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AppConfig, HistoryConfig, InertiaConfig, ListenerConfig, ObservabilityConfig, PagesConfig,
    SsrConfig, TimeoutConfig, VersionConfig,
};
pub use watcher::ConfigWatcher;
