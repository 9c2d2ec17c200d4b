//! Page subsystem.
//!
//! # Data Flow
//! ```text
//! Handler (component + props)
//!     → finder.rs (optional component existence check)
//!     → builder.rs (shared props + resolution + metadata assembly)
//!     → descriptor.rs (Page, serialized as JSON or embedded in HTML)
//! ```

pub mod builder;
pub mod descriptor;
pub mod finder;

pub use builder::PageBuilder;
pub use descriptor::{OnceMetadata, Page, PageUrl, UrlResolver};
pub use finder::ComponentFinder;
