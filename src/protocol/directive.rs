//! Reload directive parsing.
//!
//! # Responsibilities
//! - Turn raw protocol headers into a [`ReloadDirective`]
//! - Split comma-separated key lists (trimmed, empties dropped)
//! - Decide whether a request is a partial reload for a given component
//!
//! # Design Decisions
//! - Parsing never fails: missing or non UTF-8 headers become defaults
//! - The directive is built once per request and is read-only afterwards

use std::collections::BTreeSet;

use axum::http::HeaderMap;

use crate::protocol::headers;

/// Literal `reset` value meaning "reset every merge prop".
pub const RESET_ALL: &str = "all";

/// Where an infinite scroll page lands relative to the data the client has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollIntent {
    Append,
    Prepend,
}

impl ScrollIntent {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "append" => Some(Self::Append),
            "prepend" => Some(Self::Prepend),
            _ => None,
        }
    }
}

/// Immutable snapshot of the protocol headers of one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReloadDirective {
    is_inertia: bool,
    component: Option<String>,
    version: Option<String>,
    only: BTreeSet<String>,
    except: BTreeSet<String>,
    error_bag: Option<String>,
    reset: BTreeSet<String>,
    scroll_intent: Option<ScrollIntent>,
    except_once: BTreeSet<String>,
}

impl ReloadDirective {
    /// Parse the directive from request headers.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let is_inertia = header_str(headers, headers::INERTIA)
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            is_inertia,
            component: non_empty(headers, headers::PARTIAL_COMPONENT),
            version: non_empty(headers, headers::VERSION),
            only: split_list(headers, headers::PARTIAL_ONLY),
            except: split_list(headers, headers::PARTIAL_EXCEPT),
            error_bag: non_empty(headers, headers::ERROR_BAG),
            reset: parse_reset(headers),
            scroll_intent: header_str(headers, headers::SCROLL_MERGE_INTENT)
                .and_then(ScrollIntent::parse),
            except_once: split_list(headers, headers::EXCEPT_ONCE_PROPS),
        }
    }

    /// Whether the request carries the protocol marker.
    pub fn is_inertia(&self) -> bool {
        self.is_inertia
    }

    /// Component named by the partial reload header.
    pub fn component(&self) -> Option<&str> {
        self.component.as_deref()
    }

    /// Asset version the client last saw.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn only(&self) -> &BTreeSet<String> {
        &self.only
    }

    pub fn except(&self) -> &BTreeSet<String> {
        &self.except
    }

    pub fn error_bag(&self) -> Option<&str> {
        self.error_bag.as_deref()
    }

    pub fn reset(&self) -> &BTreeSet<String> {
        &self.reset
    }

    pub fn scroll_intent(&self) -> Option<ScrollIntent> {
        self.scroll_intent
    }

    pub fn except_once(&self) -> &BTreeSet<String> {
        &self.except_once
    }

    /// True when this is a protocol request reloading `component` partially.
    ///
    /// A partial reload aimed at another component is a full load for
    /// `component`, so its only/except lists must be ignored.
    pub fn is_partial_for(&self, component: &str) -> bool {
        self.is_inertia && self.component.as_deref() == Some(component)
    }

    /// Whether the client asked to reset the merge state of `key`.
    pub fn resets(&self, key: &str) -> bool {
        self.reset.contains(RESET_ALL) || self.reset.contains(key)
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn non_empty(headers: &HeaderMap, name: &str) -> Option<String> {
    header_str(headers, name)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn split_list(headers: &HeaderMap, name: &str) -> BTreeSet<String> {
    header_str(headers, name)
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn parse_reset(headers: &HeaderMap) -> BTreeSet<String> {
    let keys = split_list(headers, headers::RESET);
    if keys.iter().any(|k| k.eq_ignore_ascii_case(RESET_ALL)) {
        return BTreeSet::from([RESET_ALL.to_string()]);
    }
    keys
}
