//! Prop definitions.
//!
//! A [`Prop`] is one resolvable source plus orthogonal behavior flags. Flags
//! compose freely, so a deferred prop can also be merged, once-cached or
//! always included without a dedicated type for every combination.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::Serialize;
use serde_json::Value;

use crate::error::BoxError;
use crate::props::provider::ProvideProps;
use crate::props::scroll::{ScrollExtractor, ScrollPages};

/// Group name used by deferred props that do not name one.
pub const DEFAULT_DEFER_GROUP: &str = "default";

/// Wrapper key of paginated data inside a scroll prop.
pub const DEFAULT_SCROLL_WRAPPER: &str = "data";

/// Query parameter carrying the page number of a scroll prop.
pub const DEFAULT_PAGE_NAME: &str = "page";

pub(crate) type SyncFn = Arc<dyn Fn() -> Result<Value, BoxError> + Send + Sync>;
pub(crate) type AsyncFn = Arc<dyn Fn() -> BoxFuture<'static, Result<Value, BoxError>> + Send + Sync>;

/// Where a prop's value comes from.
#[derive(Clone)]
pub(crate) enum Source {
    Value(Value),
    Sync(SyncFn),
    Async(AsyncFn),
    Group(Props),
    Provider(Arc<dyn ProvideProps>),
}

/// Excluded from the first load; requested later by a partial reload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Deferral {
    /// Set for deferred props, which the client fetches on its own.
    /// `None` marks a plain optional prop that is only sent on request.
    pub group: Option<String>,
}

/// How the client combines a new value with the one it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    Append,
    Prepend,
    Deep,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSpec {
    pub strategy: MergeStrategy,
    /// Dot path inside the value that is merged, e.g. `data`.
    pub path: Option<String>,
    /// Fields used to match existing items instead of appending blindly.
    pub match_on: Vec<String>,
    /// Only advertise merging on partial reloads.
    pub only_on_partial: bool,
}

impl MergeSpec {
    fn new(strategy: MergeStrategy) -> Self {
        Self {
            strategy,
            path: None,
            match_on: Vec::new(),
            only_on_partial: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnceSpec {
    /// Cache key on the client; defaults to the prop path.
    pub key: Option<String>,
    /// Lifetime of the cached value; `None` lives until the page reloads.
    pub ttl: Option<Duration>,
    /// Resolve even if the client reports it already has the value.
    pub fresh: bool,
}

#[derive(Clone)]
pub struct ScrollSpec {
    pub wrapper: String,
    pub page_name: String,
    pub(crate) extractor: Option<ScrollExtractor>,
}

impl Default for ScrollSpec {
    fn default() -> Self {
        Self {
            wrapper: DEFAULT_SCROLL_WRAPPER.to_string(),
            page_name: DEFAULT_PAGE_NAME.to_string(),
            extractor: None,
        }
    }
}

impl ScrollSpec {
    pub fn wrapper(mut self, wrapper: impl Into<String>) -> Self {
        self.wrapper = wrapper.into();
        self
    }

    pub fn page_name(mut self, page_name: impl Into<String>) -> Self {
        self.page_name = page_name.into();
        self
    }

    /// Use a custom pagination metadata extractor.
    pub fn metadata<F>(mut self, extractor: F) -> Self
    where
        F: Fn(&Value) -> ScrollPages + Send + Sync + 'static,
    {
        self.extractor = Some(Arc::new(extractor));
        self
    }
}

impl fmt::Debug for ScrollSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollSpec")
            .field("wrapper", &self.wrapper)
            .field("page_name", &self.page_name)
            .field("custom_extractor", &self.extractor.is_some())
            .finish()
    }
}

/// A single page prop.
#[derive(Clone)]
pub struct Prop {
    pub(crate) source: Source,
    pub(crate) always: bool,
    pub(crate) deferral: Option<Deferral>,
    pub(crate) merge: Option<MergeSpec>,
    pub(crate) once: Option<OnceSpec>,
    pub(crate) scroll: Option<ScrollSpec>,
}

impl Prop {
    fn from_source(source: Source) -> Self {
        Self {
            source,
            always: false,
            deferral: None,
            merge: None,
            once: None,
            scroll: None,
        }
    }

    /// A value known up front.
    pub fn value(value: impl Into<Value>) -> Self {
        Self::from_source(Source::Value(value.into()))
    }

    /// Serialize `value` now and use the result as a static prop.
    pub fn serialize<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::value(serde_json::to_value(value)?))
    }

    /// A value computed by a synchronous callback, only if the prop survives
    /// filtering.
    pub fn lazy<F, T, E>(f: F) -> Self
    where
        F: Fn() -> Result<T, E> + Send + Sync + 'static,
        T: Serialize + 'static,
        E: Into<BoxError> + 'static,
    {
        Self::from_source(Source::Sync(Arc::new(move || {
            let value = f().map_err(Into::into)?;
            serde_json::to_value(value).map_err(BoxError::from)
        })))
    }

    /// A value computed by an asynchronous callback, resolved concurrently
    /// with the other async props of the page.
    pub fn future<F, Fut, T, E>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: Serialize + 'static,
        E: Into<BoxError> + 'static,
    {
        Self::from_source(Source::Async(Arc::new(move || {
            f().map(|result| {
                let value = result.map_err(Into::into)?;
                serde_json::to_value(value).map_err(BoxError::from)
            })
            .boxed()
        })))
    }

    /// A nested bag of props, resolved into an object.
    pub fn group(props: Props) -> Self {
        Self::from_source(Source::Group(props))
    }

    /// A contributor that expands into several props at render time.
    pub fn provider(provider: impl ProvideProps + 'static) -> Self {
        Self::from_source(Source::Provider(Arc::new(provider)))
    }

    /// Keep this prop regardless of partial reload filtering.
    pub fn always(mut self) -> Self {
        self.always = true;
        self
    }

    /// Leave this prop out unless a partial reload asks for it.
    pub fn optional(mut self) -> Self {
        self.deferral.get_or_insert_with(Deferral::default);
        self
    }

    /// Leave this prop out of the first load and let the client fetch it
    /// right after, in the default group.
    pub fn defer(self) -> Self {
        self.defer_in(DEFAULT_DEFER_GROUP)
    }

    /// Like [`Prop::defer`] with a named group; props in one group are
    /// fetched by a single follow-up request.
    pub fn defer_in(mut self, group: impl Into<String>) -> Self {
        self.deferral = Some(Deferral {
            group: Some(group.into()),
        });
        self
    }

    /// Append new items to the client's value.
    pub fn merge(self) -> Self {
        self.merge_with(MergeStrategy::Append)
    }

    /// Prepend new items to the client's value.
    pub fn prepend(self) -> Self {
        self.merge_with(MergeStrategy::Prepend)
    }

    /// Merge objects recursively on the client.
    pub fn deep_merge(self) -> Self {
        self.merge_with(MergeStrategy::Deep)
    }

    fn merge_with(mut self, strategy: MergeStrategy) -> Self {
        self.merge
            .get_or_insert_with(|| MergeSpec::new(strategy))
            .strategy = strategy;
        self
    }

    /// Merge at a dot path inside the value. Implies [`Prop::merge`] when no
    /// strategy was chosen yet.
    pub fn merge_path(mut self, path: impl Into<String>) -> Self {
        self.merge
            .get_or_insert_with(|| MergeSpec::new(MergeStrategy::Append))
            .path = Some(path.into());
        self
    }

    /// Match merged items on the given fields.
    pub fn match_on<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = self
            .merge
            .get_or_insert_with(|| MergeSpec::new(MergeStrategy::Append));
        spec.match_on.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Advertise merging only on partial reloads; full loads replace.
    pub fn only_on_partial(mut self) -> Self {
        self.merge
            .get_or_insert_with(|| MergeSpec::new(MergeStrategy::Append))
            .only_on_partial = true;
        self
    }

    /// Send this prop once and let the client reuse it on later visits.
    pub fn once(mut self) -> Self {
        self.once.get_or_insert_with(OnceSpec::default);
        self
    }

    /// Once-cached with an expiry.
    pub fn once_for(mut self, ttl: Duration) -> Self {
        self.once.get_or_insert_with(OnceSpec::default).ttl = Some(ttl);
        self
    }

    /// Once-cached under a custom key shared across pages.
    pub fn once_as(mut self, key: impl Into<String>) -> Self {
        self.once.get_or_insert_with(OnceSpec::default).key = Some(key.into());
        self
    }

    /// Resolve a once prop even if the client already has it.
    pub fn fresh(mut self) -> Self {
        self.once.get_or_insert_with(OnceSpec::default).fresh = true;
        self
    }

    /// Infinite scroll prop with the default wrapper and page name.
    pub fn scroll(self) -> Self {
        self.scroll_with(ScrollSpec::default())
    }

    /// Infinite scroll prop. Scroll props merge shallowly, at the wrapper
    /// path, and only on partial reloads.
    pub fn scroll_with(mut self, spec: ScrollSpec) -> Self {
        self.merge = Some(MergeSpec {
            strategy: MergeStrategy::Append,
            path: Some(spec.wrapper.clone()),
            match_on: self.merge.take().map(|m| m.match_on).unwrap_or_default(),
            only_on_partial: true,
        });
        self.scroll = Some(spec);
        self
    }

    pub fn is_always(&self) -> bool {
        self.always
    }

    pub fn deferral(&self) -> Option<&Deferral> {
        self.deferral.as_ref()
    }

    pub fn merge_spec(&self) -> Option<&MergeSpec> {
        self.merge.as_ref()
    }

    pub fn once_spec(&self) -> Option<&OnceSpec> {
        self.once.as_ref()
    }

    pub fn scroll_spec(&self) -> Option<&ScrollSpec> {
        self.scroll.as_ref()
    }

    /// Whether the client should merge this prop rather than replace it.
    pub fn should_merge(&self) -> bool {
        self.merge.is_some()
    }
}

impl fmt::Debug for Prop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match &self.source {
            Source::Value(v) => format!("Value({})", v),
            Source::Sync(_) => "Sync".to_string(),
            Source::Async(_) => "Async".to_string(),
            Source::Group(props) => format!("Group({:?})", props.keys().collect::<Vec<_>>()),
            Source::Provider(_) => "Provider".to_string(),
        };
        f.debug_struct("Prop")
            .field("source", &source)
            .field("always", &self.always)
            .field("deferral", &self.deferral)
            .field("merge", &self.merge)
            .field("once", &self.once)
            .field("scroll", &self.scroll)
            .finish()
    }
}

impl From<Value> for Prop {
    fn from(value: Value) -> Self {
        Prop::value(value)
    }
}

impl From<Props> for Prop {
    fn from(props: Props) -> Self {
        Prop::group(props)
    }
}

/// A bag of props keyed by name.
#[derive(Clone, Default, Debug)]
pub struct Props {
    entries: BTreeMap<String, Prop>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, prop: impl Into<Prop>) -> Self {
        self.insert(key, prop);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, prop: impl Into<Prop>) -> Option<Prop> {
        self.entries.insert(key.into(), prop.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Prop> {
        self.entries.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Prop> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add every entry of `other`; `other` wins on key collisions.
    pub fn extend(&mut self, other: Props) {
        self.entries.extend(other.entries);
    }
}

impl IntoIterator for Props {
    type Item = (String, Prop);
    type IntoIter = std::collections::btree_map::IntoIter<String, Prop>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<K, P> FromIterator<(K, P)> for Props
where
    K: Into<String>,
    P: Into<Prop>,
{
    fn from_iter<I: IntoIterator<Item = (K, P)>>(iter: I) -> Self {
        let mut props = Props::new();
        for (key, prop) in iter {
            props.insert(key, prop);
        }
        props
    }
}
