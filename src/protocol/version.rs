//! Asset version sources.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::config::VersionConfig;

/// Where the current asset version comes from.
#[derive(Clone, Default)]
pub enum AssetVersion {
    /// No versioning; the gate never reports a mismatch.
    #[default]
    None,
    Fixed(String),
    /// Evaluated on every request.
    Provider(Arc<dyn Fn() -> String + Send + Sync>),
}

impl AssetVersion {
    pub fn provider<F>(f: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        AssetVersion::Provider(Arc::new(f))
    }

    /// Version from configuration: the explicit value, else the manifest hash.
    /// Relative manifest paths resolve against `base_path`.
    pub fn from_config(config: &VersionConfig, base_path: &Path) -> std::io::Result<Self> {
        if let Some(value) = &config.value {
            return Ok(AssetVersion::Fixed(value.clone()));
        }
        match &config.manifest {
            Some(manifest) => {
                let hash = manifest_hash(&base_path.join(manifest))?;
                Ok(AssetVersion::Fixed(hash))
            }
            None => Ok(AssetVersion::None),
        }
    }

    pub fn current(&self) -> String {
        match self {
            AssetVersion::None => String::new(),
            AssetVersion::Fixed(version) => version.clone(),
            AssetVersion::Provider(f) => f(),
        }
    }
}

impl fmt::Debug for AssetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetVersion::None => f.write_str("None"),
            AssetVersion::Fixed(v) => f.debug_tuple("Fixed").field(v).finish(),
            AssetVersion::Provider(_) => f.write_str("Provider(..)"),
        }
    }
}

/// Hex SHA-256 of a build manifest.
pub fn manifest_hash(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}
