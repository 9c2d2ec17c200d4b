//! Page assembly.
//!
//! # Responsibilities
//! - Merge shared props under the page's own props
//! - Run prop resolution for the request
//! - Turn resolution records into page metadata (merge, deferred, once, scroll)
//!
//! # Design Decisions
//! - Deferred metadata is only emitted on non-partial requests
//! - Reset keys are left out of every merge list
//! - Once metadata covers skipped props too so the client keeps its cache

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use serde_json::{Map, Value};

use crate::error::InertiaResult;
use crate::observability::metrics;
use crate::page::descriptor::{OnceMetadata, Page, PageUrl, UrlResolver};
use crate::props::resolver::{self, Resolution};
use crate::props::scroll::extract_pages;
use crate::props::{MergeStrategy, Props, RenderContext, ScrollMetadata};
use crate::protocol::{ReloadDirective, RequestInfo, ScrollIntent};
use crate::shared::SharedProps;

/// Builds one [`Page`] for one request.
pub struct PageBuilder {
    component: String,
    props: Props,
    shared: SharedProps,
    version: String,
    url_resolver: Option<UrlResolver>,
    clear_history: bool,
    encrypt_history: bool,
}

impl PageBuilder {
    pub fn new(component: impl Into<String>, props: Props) -> Self {
        Self {
            component: component.into(),
            props,
            shared: SharedProps::default(),
            version: String::new(),
            url_resolver: None,
            clear_history: false,
            encrypt_history: false,
        }
    }

    /// Shared props; the page's own props win on collision.
    pub fn shared(mut self, shared: SharedProps) -> Self {
        self.shared = shared;
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn url_resolver(mut self, resolver: UrlResolver) -> Self {
        self.url_resolver = Some(resolver);
        self
    }

    pub fn clear_history(mut self, clear: bool) -> Self {
        self.clear_history = clear;
        self
    }

    pub fn encrypt_history(mut self, encrypt: bool) -> Self {
        self.encrypt_history = encrypt;
        self
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub async fn build(
        self,
        request: &RequestInfo,
        directive: &ReloadDirective,
    ) -> InertiaResult<Page> {
        let mut props = self.shared.into_props(directive.error_bag());
        props.extend(self.props);

        let ctx = RenderContext {
            component: &self.component,
            request,
        };
        let started = Instant::now();
        let resolution = resolver::resolve(props, directive, &ctx).await?;
        metrics::record_prop_resolution(started.elapsed());

        let partial = directive.is_partial_for(&self.component);
        let url = match self.url_resolver {
            Some(resolver) => PageUrl::resolved_by(resolver, request.clone()),
            None => PageUrl::fixed(request.path_and_query()),
        };

        let Resolution {
            props,
            merges,
            deferred,
            once,
            scrolls,
        } = resolution;

        let mut page = Page::new(self.component, Map::new(), url);
        page.version = self.version;
        page.clear_history = self.clear_history;
        page.encrypt_history = self.encrypt_history;

        for record in merges {
            if (record.spec.only_on_partial && !partial) || directive.resets(&record.path) {
                continue;
            }
            let target = match &record.spec.path {
                Some(path) => format!("{}.{}", record.path, path),
                None => record.path.clone(),
            };
            let strategy = if record.scroll {
                match directive.scroll_intent() {
                    Some(ScrollIntent::Prepend) => MergeStrategy::Prepend,
                    _ => MergeStrategy::Append,
                }
            } else {
                record.spec.strategy
            };
            match strategy {
                MergeStrategy::Append => page.merge_props.push(target),
                MergeStrategy::Prepend => page.prepend_props.push(target),
                MergeStrategy::Deep => page.deep_merge_props.push(target),
            }
            page.match_props_on.extend(
                record
                    .spec
                    .match_on
                    .iter()
                    .map(|field| format!("{}.{}", record.path, field)),
            );
        }

        if !partial {
            for record in deferred {
                page.deferred_props
                    .entry(record.group)
                    .or_default()
                    .push(record.path);
            }
        }

        let now = now_millis();
        for record in once {
            let expires_at = record
                .ttl
                .map(|ttl| now.saturating_add(u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX)));
            page.once_props.insert(
                record.key,
                OnceMetadata {
                    prop: record.path,
                    expires_at,
                },
            );
        }

        for record in scrolls {
            let Some(value) = lookup(&props, &record.path) else {
                continue;
            };
            let pages = match &record.spec.extractor {
                Some(extract) => extract(value),
                None => extract_pages(value),
            };
            let reset = directive.resets(&record.path);
            page.scroll_props.insert(
                record.path,
                ScrollMetadata::new(record.spec.page_name, pages, reset),
            );
        }

        page.props = props;

        tracing::debug!(
            component = %page.component,
            partial,
            props = page.props.len(),
            deferred = page.deferred_props.len(),
            "Built page"
        );

        Ok(page)
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Follow a dot path through nested objects.
fn lookup<'a>(props: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = props.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}
