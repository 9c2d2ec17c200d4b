//! Server side of the Inertia protocol for axum applications.

// Framework-agnostic core
pub mod error;
pub mod page;
pub mod props;
pub mod protocol;
pub mod shared;
pub mod ssr;

// Host integration
pub mod config;
pub mod demo;
pub mod http;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;

pub use config::InertiaConfig;
pub use error::{BoxError, InertiaError, InertiaResult};
pub use http::{with_inertia, HttpServer, Inertia, InertiaState};
pub use lifecycle::Shutdown;
pub use page::{Page, PageBuilder};
pub use props::{Prop, Props};
pub use shared::{SharedProps, ValidationErrors};
