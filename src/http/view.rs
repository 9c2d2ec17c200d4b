//! HTML shell for first visits.

use crate::error::BoxError;
use crate::page::Page;
use crate::ssr::SsrResponse;

/// Everything a root view needs to produce the document.
#[derive(Debug, Clone, Copy)]
pub struct ViewContext<'a> {
    /// Configured root template name.
    pub root_view: &'a str,
    pub page: &'a Page,
    /// The page serialized as JSON, not yet escaped.
    pub page_json: &'a str,
    /// Server-rendered markup, when SSR succeeded.
    pub ssr: Option<&'a SsrResponse>,
}

/// Renders the HTML document around a page.
pub trait RootView: Send + Sync {
    fn render(&self, ctx: &ViewContext<'_>) -> Result<String, BoxError>;
}

impl<F> RootView for F
where
    F: Fn(&ViewContext<'_>) -> Result<String, BoxError> + Send + Sync,
{
    fn render(&self, ctx: &ViewContext<'_>) -> Result<String, BoxError> {
        self(ctx)
    }
}

/// Minimal document: SSR markup when present, otherwise the mount point.
#[derive(Debug, Clone, Default)]
pub struct ShellView {
    title: Option<String>,
    scripts: Vec<String>,
}

impl ShellView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Add a module script to the head.
    pub fn script(mut self, src: impl Into<String>) -> Self {
        self.scripts.push(src.into());
        self
    }
}

impl RootView for ShellView {
    fn render(&self, ctx: &ViewContext<'_>) -> Result<String, BoxError> {
        let mut head = String::from(
            "<meta charset=\"utf-8\">\n<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n",
        );
        if let Some(title) = &self.title {
            head.push_str(&format!("<title>{}</title>\n", escape_html(title)));
        }
        for src in &self.scripts {
            head.push_str(&format!(
                "<script type=\"module\" src=\"{}\"></script>\n",
                escape_html(src)
            ));
        }

        let body = match ctx.ssr {
            Some(ssr) => {
                head.push_str(&ssr.head);
                head.push('\n');
                ssr.body.clone()
            }
            None => mount_point(ctx.page_json),
        };

        Ok(format!(
            "<!DOCTYPE html>\n<html>\n<head>\n{}</head>\n<body>\n{}\n</body>\n</html>\n",
            head, body
        ))
    }
}

/// `<div id="app" data-page="…">` carrying the escaped page JSON.
pub fn mount_point(page_json: &str) -> String {
    format!(
        "<div id=\"app\" data-page=\"{}\"></div>",
        escape_html(page_json)
    )
}

/// Escape text for use inside HTML content or a quoted attribute.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
