//! Prop contributors.
//!
//! A contributor is an object that expands into several props when a page is
//! rendered. It sees the component being rendered and the request, so it can
//! produce request-aware values (the current user, a locale, a breadcrumb).

use crate::props::prop::Props;
use crate::protocol::RequestInfo;

/// What a contributor can see while expanding.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub component: &'a str,
    pub request: &'a RequestInfo,
}

/// An object that contributes props at render time.
pub trait ProvideProps: Send + Sync {
    fn props(&self, ctx: &RenderContext<'_>) -> Props;
}

impl<F> ProvideProps for F
where
    F: Fn(&RenderContext<'_>) -> Props + Send + Sync,
{
    fn props(&self, ctx: &RenderContext<'_>) -> Props {
        self(ctx)
    }
}
