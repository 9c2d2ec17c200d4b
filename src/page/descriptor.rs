//! The page descriptor sent to the client.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::InertiaResult;
use crate::props::ScrollMetadata;
use crate::protocol::RequestInfo;

/// Callback overriding the URL recorded in a page.
pub type UrlResolver = Arc<dyn Fn(&RequestInfo) -> String + Send + Sync>;

/// Page URL, resolved when the page is serialized.
///
/// A resolver reads whatever state it closes over at serialization time, so
/// a configuration change between building and emitting a page is honored.
#[derive(Clone)]
pub struct PageUrl {
    fixed: String,
    resolver: Option<(UrlResolver, Arc<RequestInfo>)>,
}

impl PageUrl {
    pub fn fixed(url: impl Into<String>) -> Self {
        Self {
            fixed: url.into(),
            resolver: None,
        }
    }

    pub(crate) fn resolved_by(resolver: UrlResolver, request: RequestInfo) -> Self {
        Self {
            fixed: request.path_and_query(),
            resolver: Some((resolver, Arc::new(request))),
        }
    }

    pub fn resolve(&self) -> String {
        match &self.resolver {
            Some((resolver, request)) => resolver(request),
            None => self.fixed.clone(),
        }
    }
}

impl fmt::Debug for PageUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PageUrl").field(&self.resolve()).finish()
    }
}

impl PartialEq for PageUrl {
    fn eq(&self, other: &Self) -> bool {
        self.resolve() == other.resolve()
    }
}

impl Serialize for PageUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.resolve())
    }
}

impl<'de> Deserialize<'de> for PageUrl {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(PageUrl::fixed)
    }
}

/// `onceProps` entry: which prop a cache key belongs to and when it expires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnceMetadata {
    pub prop: String,
    /// Unix timestamp in milliseconds; `None` never expires.
    pub expires_at: Option<u64>,
}

/// The page descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub component: String,
    pub props: Map<String, Value>,
    pub url: PageUrl,
    #[serde(default)]
    pub version: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub merge_props: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prepend_props: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deep_merge_props: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub match_props_on: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub deferred_props: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub scroll_props: BTreeMap<String, ScrollMetadata>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub once_props: BTreeMap<String, OnceMetadata>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub clear_history: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub encrypt_history: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Page {
    /// A page with props and nothing else.
    pub fn new(component: impl Into<String>, props: Map<String, Value>, url: PageUrl) -> Self {
        Self {
            component: component.into(),
            props,
            url,
            version: String::new(),
            merge_props: Vec::new(),
            prepend_props: Vec::new(),
            deep_merge_props: Vec::new(),
            match_props_on: Vec::new(),
            deferred_props: BTreeMap::new(),
            scroll_props: BTreeMap::new(),
            once_props: BTreeMap::new(),
            clear_history: false,
            encrypt_history: false,
        }
    }

    pub fn to_json(&self) -> InertiaResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
