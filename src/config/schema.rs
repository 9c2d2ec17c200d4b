//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct InertiaConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Application shell settings.
    pub app: AppConfig,

    /// Asset version source.
    pub version: VersionConfig,

    /// Browser history defaults.
    pub history: HistoryConfig,

    /// Page component lookup.
    pub pages: PagesConfig,

    /// Server-side rendering.
    pub ssr: SsrConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Application shell configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// Root template name handed to the view.
    pub root_view: String,

    /// Application root; relative paths elsewhere resolve against it.
    pub base_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            root_view: "app".to_string(),
            base_path: PathBuf::from("."),
        }
    }
}

/// Asset version source. `value` wins over `manifest`.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct VersionConfig {
    /// Explicit version string.
    pub value: Option<String>,

    /// Build manifest whose SHA-256 becomes the version.
    pub manifest: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HistoryConfig {
    /// Encrypt history state by default.
    pub encrypt: bool,
}

/// Page component lookup.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PagesConfig {
    /// Fail renders of components missing on disk.
    pub ensure_exist: bool,

    /// Directories searched for components.
    pub paths: Vec<PathBuf>,

    /// File extensions tried for each component.
    pub extensions: Vec<String>,
}

impl Default for PagesConfig {
    fn default() -> Self {
        Self {
            ensure_exist: false,
            paths: vec![PathBuf::from("resources/js/Pages")],
            extensions: ["js", "jsx", "svelte", "ts", "tsx", "vue"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

/// Server-side rendering configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SsrConfig {
    pub enabled: bool,

    /// Base URL of the render server.
    pub url: String,

    /// Skip rendering when no bundle is found on disk.
    pub ensure_bundle_exists: bool,

    /// Explicit bundle path.
    pub bundle: Option<PathBuf>,

    /// Render request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for SsrConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: "http://127.0.0.1:13714".to_string(),
            ensure_bundle_exists: true,
            bundle: None,
            timeout_secs: 10,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
