//! Protocol middleware.
//!
//! # Responsibilities
//! - Parse protocol headers into a [`ReloadDirective`]
//! - Reject stale clients with `409` before the handler runs
//! - Seed per-request shared props and the [`InertiaContext`] extension
//! - Post-process protocol responses (empty body, `302` → `303`, `Vary`)
//!
//! # Design Decisions
//! - The configuration snapshot is loaded once, before the handler
//! - Non-protocol responses are only touched to add `Vary`

use std::sync::Arc;

use axum::{
    body::HttpBody,
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::Response,
    Router,
};

use crate::http::state::{InertiaState, Settings};
use crate::observability::metrics::{self, ResponseKind};
use crate::protocol::gate::{self, VersionCheck};
use crate::protocol::{headers, ReloadDirective, RequestInfo};

/// Protocol view of one request, inserted into request extensions.
#[derive(Clone)]
pub struct InertiaContext {
    pub directive: ReloadDirective,
    pub request: RequestInfo,
    pub settings: Arc<Settings>,
    pub state: InertiaState,
}

/// Install the protocol middleware on a router.
pub fn with_inertia<S>(router: Router<S>, state: InertiaState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(state, inertia_middleware))
}

pub async fn inertia_middleware(
    State(state): State<InertiaState>,
    mut request: Request,
    next: Next,
) -> Response {
    let directive = ReloadDirective::from_headers(request.headers());
    let info = RequestInfo::new(
        request.method().clone(),
        request.uri().clone(),
        request.headers().clone(),
    );
    let settings = state.settings();
    let method = info.method().clone();
    let is_inertia = directive.is_inertia();

    if is_inertia {
        let current = settings.version.current();
        if gate::check_version(&method, directive.version(), &current) == VersionCheck::Mismatch {
            let url = info.full_url();
            tracing::warn!(
                requested = directive.version().unwrap_or_default(),
                current = %current,
                url = %url,
                "Asset version mismatch, forcing full reload"
            );
            metrics::record_version_mismatch();
            metrics::record_response(ResponseKind::Conflict);
            let mut response = gate::location_conflict(&url);
            add_vary(&mut response);
            return response;
        }
    }

    let back = info.referer().unwrap_or("/").to_string();
    request.extensions_mut().insert(state.shared_for(&info));
    request.extensions_mut().insert(InertiaContext {
        directive,
        request: info,
        settings,
        state,
    });

    let mut response = next.run(request).await;

    if is_inertia {
        if gate::is_empty_success(response.status(), response.body().size_hint().exact()) {
            tracing::debug!(location = %back, "Empty response, redirecting back");
            metrics::record_response(ResponseKind::Redirect);
            response = gate::redirect(StatusCode::FOUND, &back);
        }
        if gate::needs_see_other(&method, response.status()) {
            tracing::debug!(method = %method, "Coercing 302 to 303 after mutating request");
            *response.status_mut() = StatusCode::SEE_OTHER;
        }
    }

    add_vary(&mut response);
    response
}

fn add_vary(response: &mut Response) {
    let present = response.headers().get_all(header::VARY).iter().any(|value| {
        value.to_str().map_or(false, |v| {
            v.split(',')
                .any(|item| item.trim().eq_ignore_ascii_case(headers::INERTIA))
        })
    });
    if !present {
        response
            .headers_mut()
            .append(header::VARY, HeaderValue::from_static("X-Inertia"));
    }
}
