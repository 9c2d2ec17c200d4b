//! Protocol subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request headers
//!     → headers.rs (protocol header names)
//!     → directive.rs (ReloadDirective: marker, partial lists, reset, once)
//!     → request.rs (RequestInfo: method, url, headers)
//!
//! Outgoing response
//!     → gate.rs (version check, empty body, 302 → 303, 409 + location)
//!
//! Asset version
//!     → version.rs (fixed string, provider callback, manifest hash)
//! ```
//!
//! # Design Decisions
//! - Header parsing is total: malformed input degrades to defaults
//! - Gate decisions are pure functions over method/status/version

pub mod directive;
pub mod gate;
pub mod headers;
pub mod request;
pub mod version;

pub use directive::{ReloadDirective, ScrollIntent};
pub use gate::VersionCheck;
pub use request::RequestInfo;
pub use version::AssetVersion;
