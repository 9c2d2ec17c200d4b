//! Response emission.
//!
//! # Responsibilities
//! - Protocol requests: page JSON with `X-Inertia: true`
//! - First visits: HTML document from the root view, SSR markup when available
//!
//! # Design Decisions
//! - `Vary: X-Inertia` is left to the middleware so every response gets it once
//! - SSR is only attempted for HTML responses

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};

use crate::error::{InertiaError, InertiaResult};
use crate::http::state::Settings;
use crate::http::view::{RootView, ViewContext};
use crate::observability::metrics::{self, ResponseKind};
use crate::page::Page;
use crate::protocol::headers;

/// Page JSON for a protocol request.
pub fn json_response(page: &Page) -> InertiaResult<Response> {
    let body = page.to_json()?;

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = StatusCode::OK;
    let response_headers = response.headers_mut();
    response_headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response_headers.insert(headers::inertia(), HeaderValue::from_static("true"));

    metrics::record_response(ResponseKind::Json);
    Ok(response)
}

/// Full HTML document for a first visit.
pub async fn html_response(
    page: &Page,
    settings: &Settings,
    view: &dyn RootView,
) -> InertiaResult<Response> {
    let ssr = settings.gateway.dispatch(page).await;
    let page_json = page.to_json()?;

    let html = view
        .render(&ViewContext {
            root_view: &settings.config.app.root_view,
            page,
            page_json: &page_json,
            ssr: ssr.as_ref(),
        })
        .map_err(|e| InertiaError::View(e.to_string()))?;

    tracing::debug!(
        component = %page.component,
        ssr = ssr.is_some(),
        "Rendered HTML shell"
    );
    metrics::record_response(ResponseKind::Html);
    Ok(Html(html).into_response())
}
