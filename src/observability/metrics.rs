//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define protocol metrics (responses, version mismatches, SSR renders)
//! - Expose a Prometheus-compatible scrape endpoint
//!
//! # Metrics
//! - `inertia_responses_total` (counter): responses by kind (`json`, `html`, `conflict`, `redirect`)
//! - `inertia_version_mismatch_total` (counter): asset version conflicts
//! - `inertia_ssr_renders_total` (counter): SSR attempts by outcome
//! - `inertia_ssr_render_duration_seconds` (histogram): SSR round trip
//! - `inertia_prop_resolution_duration_seconds` (histogram): prop resolution per page
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed, so library users
//!   who never call [`init_metrics`] pay nothing

use std::net::SocketAddr;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, address = %addr, "Failed to install metrics recorder"),
    }
}

/// Kind of protocol response emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Json,
    Html,
    Conflict,
    Redirect,
}

impl ResponseKind {
    fn as_str(self) -> &'static str {
        match self {
            ResponseKind::Json => "json",
            ResponseKind::Html => "html",
            ResponseKind::Conflict => "conflict",
            ResponseKind::Redirect => "redirect",
        }
    }
}

pub fn record_response(kind: ResponseKind) {
    metrics::counter!("inertia_responses_total", "kind" => kind.as_str()).increment(1);
}

pub fn record_version_mismatch() {
    metrics::counter!("inertia_version_mismatch_total").increment(1);
}

/// Outcome is one of `ok`, `disabled`, `no_bundle`, `error`.
pub fn record_ssr_render(outcome: &'static str, elapsed: Duration) {
    metrics::counter!("inertia_ssr_renders_total", "outcome" => outcome).increment(1);
    metrics::histogram!("inertia_ssr_render_duration_seconds").record(elapsed.as_secs_f64());
}

pub fn record_prop_resolution(elapsed: Duration) {
    metrics::histogram!("inertia_prop_resolution_duration_seconds").record(elapsed.as_secs_f64());
}
