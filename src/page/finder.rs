//! Page component existence check.

use std::path::{Component, Path, PathBuf};

use crate::config::PagesConfig;
use crate::error::{InertiaError, InertiaResult};

/// Looks for `{path}/{component}.{ext}` on disk.
#[derive(Debug, Clone)]
pub struct ComponentFinder {
    paths: Vec<PathBuf>,
    extensions: Vec<String>,
}

impl ComponentFinder {
    pub fn new(paths: Vec<PathBuf>, extensions: Vec<String>) -> Self {
        Self { paths, extensions }
    }

    /// Finder over the configured paths, relative ones resolved against `base_path`.
    pub fn from_config(config: &PagesConfig, base_path: &Path) -> Self {
        Self::new(
            config.paths.iter().map(|p| base_path.join(p)).collect(),
            config.extensions.clone(),
        )
    }

    /// First file implementing `component`, if any.
    pub fn find(&self, component: &str) -> Option<PathBuf> {
        let relative = Path::new(component);
        if component.is_empty()
            || !relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)))
        {
            return None;
        }

        self.paths.iter().find_map(|root| {
            self.extensions.iter().find_map(|ext| {
                let candidate = root.join(format!("{}.{}", component, ext));
                candidate.is_file().then_some(candidate)
            })
        })
    }

    pub fn ensure(&self, component: &str) -> InertiaResult<()> {
        match self.find(component) {
            Some(path) => {
                tracing::trace!(component = %component, path = ?path, "Component found");
                Ok(())
            }
            None => Err(InertiaError::ComponentNotFound(component.to_string())),
        }
    }
}
