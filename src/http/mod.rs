//! axum integration.
//!
//! # Data Flow
//! ```text
//! Request
//!     → request.rs (request ID)
//!     → middleware.rs (directive, version gate, shared props, context)
//!     → handler with extract.rs (Inertia extractor)
//!         → page::PageBuilder
//!         → response.rs (JSON | HTML via view.rs + SSR gateway)
//!     → middleware.rs (empty body redirect, 302 → 303, Vary)
//!     → Send to client
//! ```

pub mod extract;
pub mod middleware;
pub mod request;
pub mod response;
pub mod server;
pub mod state;
pub mod view;

pub use extract::Inertia;
pub use middleware::{inertia_middleware, with_inertia, InertiaContext};
pub use request::X_REQUEST_ID;
pub use server::HttpServer;
pub use state::{InertiaState, InertiaStateBuilder, Settings, ShareHook, StateError};
pub use view::{RootView, ShellView, ViewContext};
