//! Read-only view of the request the core needs.

use axum::http::{header, HeaderMap, Method, Uri};

/// Method, URI and headers of the current request.
///
/// Built by the host integration and handed to the core, prop contributors
/// and URL resolvers. Never mutated after construction.
#[derive(Debug, Clone)]
pub struct RequestInfo {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
}

impl RequestInfo {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap) -> Self {
        Self { method, uri, headers }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Path plus query string, the URL recorded in page descriptors.
    pub fn path_and_query(&self) -> String {
        self.uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string())
    }

    /// Fully-qualified URL of the request.
    ///
    /// Absolute request URIs are used as-is; otherwise scheme and host come
    /// from the forwarding headers, then the `Host` header.
    pub fn full_url(&self) -> String {
        if self.uri.scheme().is_some() && self.uri.authority().is_some() {
            return self.uri.to_string();
        }

        let scheme = self
            .header("x-forwarded-proto")
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .unwrap_or("http");
        let host = self
            .header("x-forwarded-host")
            .or_else(|| self.header(header::HOST.as_str()))
            .unwrap_or("localhost");

        format!("{}://{}{}", scheme, host, self.path_and_query())
    }

    /// Value of the `Referer` header, if any.
    pub fn referer(&self) -> Option<&str> {
        self.header(header::REFERER.as_str())
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
    }
}
