//! Version gate and response coercion rules.
//!
//! # Responsibilities
//! - Compare the client's asset version with the current one
//! - Detect successful responses that carry no body
//! - Coerce `302 Found` to `303 See Other` after mutating requests
//! - Build the `409 Conflict` + `X-Inertia-Location` response
//!
//! # Design Decisions
//! - Only GET navigations are version-checked; submissions are never
//!   interrupted by a forced reload
//! - Both versions must be known for a mismatch; an unknown side is no check
//! - Decisions are pure functions; the middleware applies them

use axum::{
    body::Body,
    http::{header, HeaderValue, Method, StatusCode},
    response::Response,
};

use crate::protocol::headers;

/// Outcome of comparing the requested and current asset versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionCheck {
    /// The request is not eligible for a version check.
    NoCheck,
    Match,
    /// The client must reload the whole page to pick up new assets.
    Mismatch,
}

/// Evaluate the version gate for one request.
pub fn check_version(method: &Method, requested: Option<&str>, current: &str) -> VersionCheck {
    if method != Method::GET {
        return VersionCheck::NoCheck;
    }

    match requested {
        Some(requested) if !requested.is_empty() && !current.is_empty() => {
            if requested == current {
                VersionCheck::Match
            } else {
                VersionCheck::Mismatch
            }
        }
        _ => VersionCheck::NoCheck,
    }
}

/// True for a 2xx response whose body is known to be empty.
pub fn is_empty_success(status: StatusCode, body_len: Option<u64>) -> bool {
    status.is_success() && body_len == Some(0)
}

/// True when a `302` answer to a mutating request must become `303`.
///
/// Browsers replay the original verb on `302`; `303` forces a GET.
pub fn needs_see_other(method: &Method, status: StatusCode) -> bool {
    status == StatusCode::FOUND
        && matches!(*method, Method::PUT | Method::PATCH | Method::DELETE)
}

/// `409 Conflict` telling the client to hard-navigate to `url`.
pub fn location_conflict(url: &str) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::CONFLICT;
    match HeaderValue::from_str(url) {
        Ok(value) => {
            response.headers_mut().insert(headers::location(), value);
        }
        Err(_) => {
            tracing::warn!(url = %url, "Location is not a valid header value");
        }
    }
    response
}

/// Plain redirect with the given status.
pub fn redirect(status: StatusCode, url: &str) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    if let Ok(value) = HeaderValue::from_str(url) {
        response.headers_mut().insert(header::LOCATION, value);
    }
    response
}
