//! Pagination metadata for infinite scroll props.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub(crate) type ScrollExtractor = Arc<dyn Fn(&Value) -> ScrollPages + Send + Sync>;

/// Page cursors of one paginated value.
///
/// Numbers for offset pagination, strings for cursor pagination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScrollPages {
    pub previous: Option<Value>,
    pub next: Option<Value>,
    pub current: Option<Value>,
}

/// `scrollProps` entry sent to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollMetadata {
    pub page_name: String,
    pub previous_page: Option<Value>,
    pub next_page: Option<Value>,
    pub current_page: Option<Value>,
    pub reset: bool,
}

impl ScrollMetadata {
    pub fn new(page_name: impl Into<String>, pages: ScrollPages, reset: bool) -> Self {
        Self {
            page_name: page_name.into(),
            previous_page: pages.previous,
            next_page: pages.next,
            current_page: pages.current,
            reset,
        }
    }
}

/// Read page cursors from a serialized paginator.
///
/// Understands the length-aware shape (`current_page` / `last_page`), the
/// simple shape (`current_page` / `next_page_url`) and the cursor shape
/// (`next_cursor` / `prev_cursor`), either at the top level or under `meta`.
pub fn extract_pages(value: &Value) -> ScrollPages {
    let source = value
        .get("meta")
        .filter(|meta| meta.is_object())
        .unwrap_or(value);

    if let Some(current) = source.get("current_page").and_then(Value::as_u64) {
        let previous = (current > 1).then(|| Value::from(current - 1));
        let has_next = match source.get("last_page").and_then(Value::as_u64) {
            Some(last) => current < last,
            None => source.get("next_page_url").map_or(false, |url| !url.is_null()),
        };
        return ScrollPages {
            previous,
            next: has_next.then(|| Value::from(current + 1)),
            current: Some(Value::from(current)),
        };
    }

    let cursor = |key: &str| source.get(key).filter(|v| !v.is_null()).cloned();
    ScrollPages {
        previous: cursor("prev_cursor"),
        next: cursor("next_cursor"),
        current: cursor("cursor"),
    }
}
