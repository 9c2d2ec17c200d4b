//! Props subsystem.
//!
//! # Data Flow
//! ```text
//! Host props bag (Props: key → Prop)
//!     → provider.rs (contributors expand into more props)
//!     → resolver.rs (partial reload filtering, once skipping)
//!     → resolver.rs (concurrent resolution of survivors)
//!     → Resolution (values + merge/deferred/once/scroll records)
//! ```
//!
//! # Design Decisions
//! - One prop type with composable flags instead of one type per behavior
//! - Static, sync and async sources resolve through the same async path
//! - Nested groups produce dot paths for merge and deferred metadata

pub mod prop;
pub mod provider;
pub mod resolver;
pub mod scroll;

pub use prop::{Deferral, MergeSpec, MergeStrategy, OnceSpec, Prop, Props, ScrollSpec};
pub use provider::{ProvideProps, RenderContext};
pub use resolver::{resolve, Resolution, MAX_PROP_DEPTH};
pub use scroll::{ScrollMetadata, ScrollPages};
