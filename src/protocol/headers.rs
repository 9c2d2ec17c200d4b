//! Protocol header names.
//!
//! Header names are lowercase so they can be used with
//! `HeaderName::from_static` and compared against `HeaderMap` keys directly.

use axum::http::HeaderName;

/// Marks a request (and the JSON response) as protocol-aware.
pub const INERTIA: &str = "x-inertia";

/// Client's last-known asset version.
pub const VERSION: &str = "x-inertia-version";

/// Component a partial reload targets.
pub const PARTIAL_COMPONENT: &str = "x-inertia-partial-component";

/// Comma-separated prop keys to include on a partial reload.
pub const PARTIAL_ONLY: &str = "x-inertia-partial-data";

/// Comma-separated prop keys to exclude on a partial reload.
pub const PARTIAL_EXCEPT: &str = "x-inertia-partial-except";

/// Named bucket for validation errors.
pub const ERROR_BAG: &str = "x-inertia-error-bag";

/// Comma-separated keys whose merge state the client resets, or `all`.
pub const RESET: &str = "x-inertia-reset";

/// Infinite scroll merge intent (`append` or `prepend`).
pub const SCROLL_MERGE_INTENT: &str = "x-inertia-infinite-scroll-merge-intent";

/// Once-prop keys the client already holds.
pub const EXCEPT_ONCE_PROPS: &str = "x-inertia-except-once-props";

/// Response header carrying the URL the client must hard-navigate to.
pub const LOCATION: &str = "x-inertia-location";

pub fn inertia() -> HeaderName {
    HeaderName::from_static(INERTIA)
}

pub fn location() -> HeaderName {
    HeaderName::from_static(LOCATION)
}
