//! Handler-side entry point.

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::Response,
};

use crate::error::{InertiaError, InertiaResult};
use crate::http::middleware::InertiaContext;
use crate::http::response::{html_response, json_response};
use crate::observability::metrics::{self, ResponseKind};
use crate::page::PageBuilder;
use crate::props::{Prop, Props};
use crate::protocol::{gate, ReloadDirective, RequestInfo};
use crate::shared::{SharedProps, ValidationErrors};

/// Renders pages for the current request.
///
/// ```ignore
/// async fn index(inertia: Inertia) -> InertiaResult<Response> {
///     inertia
///         .render("Users/Index", Props::new().with("users", json!([])))
///         .await
/// }
/// ```
pub struct Inertia {
    ctx: InertiaContext,
    shared: SharedProps,
    clear_history: bool,
    encrypt_history: Option<bool>,
}

impl<S> FromRequestParts<S> for Inertia
where
    S: Send + Sync,
{
    type Rejection = InertiaError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let ctx = parts
            .extensions
            .get::<InertiaContext>()
            .cloned()
            .ok_or(InertiaError::MissingContext)?;
        let shared = parts
            .extensions
            .get::<SharedProps>()
            .cloned()
            .unwrap_or_default();

        Ok(Self {
            ctx,
            shared,
            clear_history: false,
            encrypt_history: None,
        })
    }
}

impl Inertia {
    pub fn directive(&self) -> &ReloadDirective {
        &self.ctx.directive
    }

    pub fn request(&self) -> &RequestInfo {
        &self.ctx.request
    }

    pub fn is_inertia(&self) -> bool {
        self.ctx.directive.is_inertia()
    }

    /// Share a prop with the page rendered by this handler.
    pub fn share(&mut self, key: impl Into<String>, prop: impl Into<Prop>) -> &mut Self {
        self.shared.share(key, prop);
        self
    }

    pub fn with_errors(mut self, errors: ValidationErrors) -> Self {
        self.shared.set_errors(errors);
        self
    }

    /// Ask the client to clear its history state.
    pub fn clear_history(mut self) -> Self {
        self.clear_history = true;
        self
    }

    /// Override the configured history encryption for this response.
    pub fn encrypt_history(mut self, encrypt: bool) -> Self {
        self.encrypt_history = Some(encrypt);
        self
    }

    /// A page builder preloaded with shared props, version and history flags.
    pub fn page(&self, component: impl Into<String>, props: Props) -> PageBuilder {
        let settings = &self.ctx.settings;
        let mut builder = PageBuilder::new(component, props)
            .shared(self.shared.clone())
            .version(settings.version.current())
            .clear_history(self.clear_history)
            .encrypt_history(
                self.encrypt_history
                    .unwrap_or(settings.config.history.encrypt),
            );
        if let Some(resolver) = self.ctx.state.url_resolver() {
            builder = builder.url_resolver(resolver);
        }
        builder
    }

    pub async fn render(self, component: impl Into<String>, props: Props) -> InertiaResult<Response> {
        let builder = self.page(component, props);
        self.respond(builder).await
    }

    /// Emit a page built with [`Inertia::page`].
    pub async fn respond(self, builder: PageBuilder) -> InertiaResult<Response> {
        let settings = &self.ctx.settings;
        if let Some(finder) = &settings.finder {
            finder.ensure(builder.component())?;
        }

        let page = builder.build(&self.ctx.request, &self.ctx.directive).await?;
        if self.ctx.directive.is_inertia() {
            json_response(&page)
        } else {
            let view = self.ctx.state.view();
            html_response(&page, settings, view.as_ref()).await
        }
    }

    /// Hard navigation to `url`, possibly outside the application.
    pub fn location(&self, url: &str) -> Response {
        if self.ctx.directive.is_inertia() {
            metrics::record_response(ResponseKind::Conflict);
            gate::location_conflict(url)
        } else {
            metrics::record_response(ResponseKind::Redirect);
            gate::redirect(StatusCode::FOUND, url)
        }
    }
}
