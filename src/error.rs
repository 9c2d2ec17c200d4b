//! Error types for page rendering.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Boxed error returned by prop callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur while building or emitting a page.
#[derive(Debug, Error)]
pub enum InertiaError {
    /// Strict component checking is on and no page file exists.
    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    /// A prop callback failed.
    #[error("Failed to resolve prop '{key}': {source}")]
    Prop {
        key: String,
        #[source]
        source: BoxError,
    },

    /// Nested prop groups exceed the walk depth.
    #[error("Props nested deeper than {max} levels at '{path}'")]
    PropsTooDeep { path: String, max: usize },

    /// Page or prop value could not be serialized.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The root view failed to render the HTML shell.
    #[error("View error: {0}")]
    View(String),

    /// A handler asked for protocol context on a route without the middleware.
    #[error("Inertia middleware is not installed on this route")]
    MissingContext,
}

/// Result type for rendering operations.
pub type InertiaResult<T> = Result<T, InertiaError>;

impl InertiaError {
    pub fn status(&self) -> StatusCode {
        match self {
            InertiaError::ComponentNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for InertiaError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::error!(error = %self, status = %status, "Page render failed");
        (status, self.to_string()).into_response()
    }
}
