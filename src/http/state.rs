//! Shared protocol state for the axum integration.
//!
//! # Responsibilities
//! - Hold the current configuration snapshot and what is derived from it
//!   (asset version, component finder, SSR gateway)
//! - Hold host hooks (root view, shared props, URL resolver)
//! - Swap the snapshot atomically on configuration reload
//!
//! # Design Decisions
//! - One `ArcSwap` load per request; handlers see a consistent snapshot
//! - Host overrides (version provider, gateway) survive reloads

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::InertiaConfig;
use crate::http::view::{RootView, ShellView};
use crate::page::{ComponentFinder, UrlResolver};
use crate::protocol::{AssetVersion, RequestInfo};
use crate::shared::SharedProps;
use crate::ssr::{Gateway, HttpGateway, SsrError};

/// Per-request hook seeding the shared props.
pub type ShareHook = Arc<dyn Fn(&RequestInfo, &mut SharedProps) + Send + Sync>;

/// Failure deriving runtime settings from configuration.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to read asset manifest: {0}")]
    Manifest(#[from] std::io::Error),
    #[error(transparent)]
    Ssr(#[from] SsrError),
}

/// Configuration snapshot plus what is derived from it.
pub struct Settings {
    pub config: InertiaConfig,
    pub version: AssetVersion,
    /// Present when `pages.ensure_exist` is on.
    pub finder: Option<ComponentFinder>,
    pub gateway: Arc<dyn Gateway>,
}

impl Settings {
    fn resolve(
        config: InertiaConfig,
        version: Option<&AssetVersion>,
        gateway: Option<&Arc<dyn Gateway>>,
    ) -> Result<Self, StateError> {
        let base_path = config.app.base_path.clone();

        let version = match version {
            Some(version) => version.clone(),
            None => AssetVersion::from_config(&config.version, &base_path)?,
        };
        let finder = config
            .pages
            .ensure_exist
            .then(|| ComponentFinder::from_config(&config.pages, &base_path));
        let gateway: Arc<dyn Gateway> = match gateway {
            Some(gateway) => gateway.clone(),
            None => Arc::new(HttpGateway::new(&config.ssr, &base_path)?),
        };

        Ok(Self {
            config,
            version,
            finder,
            gateway,
        })
    }
}

/// State handed to the middleware; cheap to clone.
#[derive(Clone)]
pub struct InertiaState {
    inner: Arc<Inner>,
}

struct Inner {
    settings: ArcSwap<Settings>,
    version: Option<AssetVersion>,
    gateway: Option<Arc<dyn Gateway>>,
    view: Arc<dyn RootView>,
    share: Option<ShareHook>,
    url_resolver: Option<UrlResolver>,
}

impl InertiaState {
    pub fn builder(config: InertiaConfig) -> InertiaStateBuilder {
        InertiaStateBuilder {
            config,
            version: None,
            gateway: None,
            view: Arc::new(ShellView::new()),
            share: None,
            url_resolver: None,
        }
    }

    /// State from configuration with every default.
    pub fn from_config(config: InertiaConfig) -> Result<Self, StateError> {
        Self::builder(config).build()
    }

    pub fn settings(&self) -> Arc<Settings> {
        self.inner.settings.load_full()
    }

    /// Replace the configuration snapshot. The old one stays in place on error.
    pub fn reload(&self, config: InertiaConfig) -> Result<(), StateError> {
        let settings = Settings::resolve(
            config,
            self.inner.version.as_ref(),
            self.inner.gateway.as_ref(),
        )?;
        self.inner.settings.store(Arc::new(settings));
        tracing::info!("Inertia settings reloaded");
        Ok(())
    }

    pub fn view(&self) -> Arc<dyn RootView> {
        self.inner.view.clone()
    }

    pub fn url_resolver(&self) -> Option<UrlResolver> {
        self.inner.url_resolver.clone()
    }

    /// Shared props for one request, seeded by the share hook.
    pub fn shared_for(&self, request: &RequestInfo) -> SharedProps {
        let mut shared = SharedProps::new();
        if let Some(hook) = &self.inner.share {
            hook(request, &mut shared);
        }
        shared
    }
}

pub struct InertiaStateBuilder {
    config: InertiaConfig,
    version: Option<AssetVersion>,
    gateway: Option<Arc<dyn Gateway>>,
    view: Arc<dyn RootView>,
    share: Option<ShareHook>,
    url_resolver: Option<UrlResolver>,
}

impl InertiaStateBuilder {
    /// Override the configured asset version source.
    pub fn version(mut self, version: AssetVersion) -> Self {
        self.version = Some(version);
        self
    }

    /// Override the configured SSR gateway.
    pub fn gateway(mut self, gateway: impl Gateway + 'static) -> Self {
        self.gateway = Some(Arc::new(gateway));
        self
    }

    pub fn view(mut self, view: impl RootView + 'static) -> Self {
        self.view = Arc::new(view);
        self
    }

    pub fn share<F>(mut self, hook: F) -> Self
    where
        F: Fn(&RequestInfo, &mut SharedProps) + Send + Sync + 'static,
    {
        self.share = Some(Arc::new(hook));
        self
    }

    pub fn url_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&RequestInfo) -> String + Send + Sync + 'static,
    {
        self.url_resolver = Some(Arc::new(resolver));
        self
    }

    pub fn build(self) -> Result<InertiaState, StateError> {
        let settings = Settings::resolve(self.config, self.version.as_ref(), self.gateway.as_ref())?;
        Ok(InertiaState {
            inner: Arc::new(Inner {
                settings: ArcSwap::from_pointee(settings),
                version: self.version,
                gateway: self.gateway,
                view: self.view,
                share: self.share,
                url_resolver: self.url_resolver,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ssr::NoSsr;
    use axum::http::{HeaderMap, Method};
    use serde_json::json;

    #[test]
    fn test_reload_swaps_snapshot() {
        let mut config = InertiaConfig::default();
        config.version.value = Some("v1".into());
        let state = InertiaState::from_config(config.clone()).unwrap();
        assert_eq!(state.settings().version.current(), "v1");

        config.version.value = Some("v2".into());
        config.history.encrypt = true;
        state.reload(config).unwrap();
        assert_eq!(state.settings().version.current(), "v2");
        assert!(state.settings().config.history.encrypt);
    }

    #[test]
    fn test_overrides_survive_reload() {
        let state = InertiaState::builder(InertiaConfig::default())
            .version(AssetVersion::Fixed("pinned".into()))
            .gateway(NoSsr)
            .build()
            .unwrap();

        let mut config = InertiaConfig::default();
        config.version.value = Some("from-config".into());
        state.reload(config).unwrap();
        assert_eq!(state.settings().version.current(), "pinned");
    }

    #[test]
    fn test_failed_reload_keeps_old_settings() {
        let mut config = InertiaConfig::default();
        config.version.value = Some("v1".into());
        let state = InertiaState::from_config(config).unwrap();

        let mut broken = InertiaConfig::default();
        broken.version.manifest = Some("/no/such/manifest.json".into());
        assert!(matches!(state.reload(broken), Err(StateError::Manifest(_))));
        assert_eq!(state.settings().version.current(), "v1");
    }

    #[test]
    fn test_share_hook_seeds_props() {
        let state = InertiaState::builder(InertiaConfig::default())
            .share(|req: &RequestInfo, shared: &mut SharedProps| {
                shared.share("path", json!(req.uri().path()));
            })
            .build()
            .unwrap();
        let request = RequestInfo::new(Method::GET, "/users".parse().unwrap(), HeaderMap::new());
        assert!(state.shared_for(&request).props().contains_key("path"));
    }

    #[test]
    fn test_finder_only_when_enabled() {
        let state = InertiaState::from_config(InertiaConfig::default()).unwrap();
        assert!(state.settings().finder.is_none());

        let mut config = InertiaConfig::default();
        config.pages.ensure_exist = true;
        state.reload(config).unwrap();
        assert!(state.settings().finder.is_some());
    }
}
