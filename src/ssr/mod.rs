//! Server-side rendering subsystem.
//!
//! # Data Flow
//! ```text
//! Page (full HTML visit)
//!     → Gateway::dispatch
//!         → bundle.rs (skip when no bundle on disk)
//!         → gateway.rs (POST {url}/render, timeout)
//!     → Some(SsrResponse { head, body }) | None (client-side rendering)
//! ```
//!
//! # Design Decisions
//! - The gateway is a trait so hosts and tests can substitute it
//! - Failures never reach the response path

pub mod bundle;
pub mod gateway;

use futures_util::future::{self, BoxFuture, FutureExt};

use crate::page::Page;

pub use bundle::BundleDetector;
pub use gateway::{HttpGateway, SsrError};

/// Markup produced by the render server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SsrResponse {
    /// Head elements joined with newlines.
    pub head: String,
    pub body: String,
}

/// Renders pages server-side, or declines with `None`.
pub trait Gateway: Send + Sync {
    fn dispatch<'a>(&'a self, page: &'a Page) -> BoxFuture<'a, Option<SsrResponse>>;
}

/// Gateway that never renders.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSsr;

impl Gateway for NoSsr {
    fn dispatch<'a>(&'a self, _page: &'a Page) -> BoxFuture<'a, Option<SsrResponse>> {
        future::ready(None).boxed()
    }
}
