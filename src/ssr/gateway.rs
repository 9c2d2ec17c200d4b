//! HTTP gateway to an external render server.
//!
//! # Responsibilities
//! - POST the page to `{url}/render` and parse `{head, body}`
//! - Probe (`/health`) and stop (`/shutdown`) the render server
//!
//! # Design Decisions
//! - `dispatch` never fails: every error is logged and becomes `None`,
//!   letting the caller fall back to client-side rendering
//! - No retries; the request timeout bounds the whole attempt
//! - The bundle check runs before any network call

use std::path::Path;
use std::time::{Duration, Instant};

use futures_util::future::{BoxFuture, FutureExt};
use serde::Deserialize;
use url::Url;

use crate::config::SsrConfig;
use crate::observability::metrics;
use crate::page::Page;
use crate::ssr::bundle::BundleDetector;
use crate::ssr::{Gateway, SsrResponse};

/// Why a render attempt failed.
#[derive(Debug, thiserror::Error)]
pub enum SsrError {
    #[error("invalid SSR url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("SSR request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("SSR server answered {0}")]
    Status(reqwest::StatusCode),
}

#[derive(Debug, Deserialize)]
struct RenderBody {
    #[serde(default)]
    head: Vec<String>,
    body: String,
}

/// Gateway speaking the render server's HTTP protocol.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: reqwest::Client,
    base: Url,
    enabled: bool,
    ensure_bundle_exists: bool,
    bundle: BundleDetector,
}

impl HttpGateway {
    pub fn new(config: &SsrConfig, base_path: &Path) -> Result<Self, SsrError> {
        let mut base = Url::parse(&config.url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base,
            enabled: config.enabled,
            ensure_bundle_exists: config.ensure_bundle_exists,
            bundle: BundleDetector::new(config.bundle.clone(), base_path),
        })
    }

    fn endpoint(&self, name: &str) -> Result<Url, SsrError> {
        Ok(self.base.join(name)?)
    }

    /// Render without the enabled/bundle checks.
    pub async fn render(&self, page: &Page) -> Result<SsrResponse, SsrError> {
        let response = self
            .client
            .post(self.endpoint("render")?)
            .json(page)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SsrError::Status(status));
        }

        let body: RenderBody = response.json().await?;
        Ok(SsrResponse {
            head: body.head.join("\n"),
            body: body.body,
        })
    }

    /// True when the render server answers its health endpoint.
    pub async fn health(&self) -> bool {
        let url = match self.endpoint("health") {
            Ok(url) => url,
            Err(_) => return false,
        };
        match self.client.get(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, "SSR health check failed");
                false
            }
        }
    }

    /// Ask the render server to exit.
    pub async fn shutdown(&self) -> Result<(), SsrError> {
        let response = self.client.get(self.endpoint("shutdown")?).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(SsrError::Status(status))
        }
    }

    async fn dispatch_page(&self, page: &Page) -> Option<SsrResponse> {
        let started = Instant::now();

        if !self.enabled {
            metrics::record_ssr_render("disabled", started.elapsed());
            return None;
        }
        if self.ensure_bundle_exists && self.bundle.detect().is_none() {
            tracing::debug!(
                base_path = ?self.bundle.base_path(),
                "No SSR bundle found, skipping render"
            );
            metrics::record_ssr_render("no_bundle", started.elapsed());
            return None;
        }

        match self.render(page).await {
            Ok(rendered) => {
                metrics::record_ssr_render("ok", started.elapsed());
                tracing::debug!(
                    component = %page.component,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "SSR render complete"
                );
                Some(rendered)
            }
            Err(e) => {
                metrics::record_ssr_render("error", started.elapsed());
                tracing::warn!(
                    component = %page.component,
                    error = %e,
                    "SSR render failed, falling back to client rendering"
                );
                None
            }
        }
    }
}

impl Gateway for HttpGateway {
    fn dispatch<'a>(&'a self, page: &'a Page) -> BoxFuture<'a, Option<SsrResponse>> {
        self.dispatch_page(page).boxed()
    }
}
