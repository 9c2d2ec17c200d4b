//! SSR bundle detection.

use std::path::{Path, PathBuf};

/// Conventional bundle locations, relative to the application root.
pub const DEFAULT_BUNDLE_CANDIDATES: [&str; 3] = [
    "bootstrap/ssr/ssr.mjs",
    "bootstrap/ssr/ssr.js",
    "public/js/ssr.js",
];

/// Finds the SSR bundle. A configured path must exist; the conventional
/// locations are only searched when none is configured.
#[derive(Debug, Clone)]
pub struct BundleDetector {
    explicit: Option<PathBuf>,
    base_path: PathBuf,
}

impl BundleDetector {
    pub fn new(explicit: Option<PathBuf>, base_path: impl Into<PathBuf>) -> Self {
        Self {
            explicit,
            base_path: base_path.into(),
        }
    }

    pub fn detect(&self) -> Option<PathBuf> {
        match &self.explicit {
            Some(path) => Some(self.base_path.join(path)).filter(|path| path.is_file()),
            None => DEFAULT_BUNDLE_CANDIDATES
                .iter()
                .map(|candidate| self.base_path.join(candidate))
                .find(|path| path.is_file()),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}
