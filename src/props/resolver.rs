//! Prop resolution.
//!
//! # Responsibilities
//! - Expand contributors into plain props
//! - Decide which props survive partial reload filtering
//! - Resolve the survivors (static, sync, async, nested groups) into JSON
//! - Record merge / deferred / once / scroll metadata with dot paths
//!
//! # Design Decisions
//! - Filtering happens on the whole tree before any callback runs, so
//!   filtered-out callbacks never execute
//! - Sync and async sources share one async contract; async ones run
//!   concurrently and the first failure drops the rest
//! - The nested walk is bounded by [`MAX_PROP_DEPTH`]
//! - A filtered-out group is still walked for its always props

use std::collections::BTreeSet;
use std::time::Duration;

use futures_util::future::{self, BoxFuture, FutureExt, TryFutureExt};
use serde_json::{Map, Value};

use crate::error::{InertiaError, InertiaResult};
use crate::props::prop::{AsyncFn, MergeSpec, Prop, Props, ScrollSpec, Source, SyncFn};
use crate::props::provider::RenderContext;
use crate::protocol::ReloadDirective;

/// Deepest level of nested groups (and contributor expansion) walked.
pub const MAX_PROP_DEPTH: usize = 16;

/// A surviving prop the client should merge.
#[derive(Debug, Clone)]
pub struct MergeRecord {
    pub path: String,
    pub spec: MergeSpec,
    pub scroll: bool,
}

/// A deferred prop left out of this response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredRecord {
    pub group: String,
    pub path: String,
}

/// A once prop, resolved or skipped because the client holds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnceRecord {
    pub path: String,
    pub key: String,
    pub ttl: Option<Duration>,
    pub resolved: bool,
}

/// A surviving infinite scroll prop.
#[derive(Debug, Clone)]
pub struct ScrollRecord {
    pub path: String,
    pub spec: ScrollSpec,
}

/// Output of one resolution pass.
#[derive(Debug, Default)]
pub struct Resolution {
    pub props: Map<String, Value>,
    pub merges: Vec<MergeRecord>,
    pub deferred: Vec<DeferredRecord>,
    pub once: Vec<OnceRecord>,
    pub scrolls: Vec<ScrollRecord>,
}

/// Resolve `props` for the component in `ctx` under `directive`.
pub async fn resolve(
    props: Props,
    directive: &ReloadDirective,
    ctx: &RenderContext<'_>,
) -> InertiaResult<Resolution> {
    let filter = if directive.is_partial_for(ctx.component) {
        if !directive.only().is_empty() {
            Filter::Only(directive.only().clone())
        } else if !directive.except().is_empty() {
            Filter::Except(directive.except().clone())
        } else {
            Filter::Full
        }
    } else {
        Filter::Full
    };

    let mut planner = Planner {
        directive,
        ctx,
        resolution: Resolution::default(),
    };
    let planned = planner.plan(props, &filter, "", 0)?;
    let mut resolution = planner.resolution;

    tracing::debug!(
        component = %ctx.component,
        props = planned.len(),
        deferred = resolution.deferred.len(),
        "Resolving props"
    );

    resolution.props = resolve_all(planned).await?;
    Ok(resolution)
}

/// Which props of one level survive.
#[derive(Debug, Clone)]
enum Filter {
    /// Full load: drop first-load-ignored props.
    Full,
    /// Keep exactly these relative paths, plus always props.
    Only(BTreeSet<String>),
    /// Drop these relative paths, never always props.
    Except(BTreeSet<String>),
    /// Explicitly requested subtree: keep everything.
    All,
    /// Filtered-out group: keep only the always props inside it.
    AlwaysOnly,
}

struct Selection {
    child: Filter,
    explicit: bool,
    /// The group itself was filtered out; emit it only if children survive.
    prune: bool,
}

impl Filter {
    fn select(&self, key: &str, prop: &Prop) -> Option<Selection> {
        let keep = |child, explicit| {
            Some(Selection {
                child,
                explicit,
                prune: false,
            })
        };
        let descend = || match prop.source {
            Source::Group(_) => Some(Selection {
                child: Filter::AlwaysOnly,
                explicit: false,
                prune: true,
            }),
            _ => None,
        };

        match self {
            Filter::All => keep(Filter::All, false),
            Filter::AlwaysOnly => {
                if prop.always {
                    keep(Filter::All, false)
                } else {
                    descend()
                }
            }
            Filter::Full => {
                if prop.deferral.is_some() && !prop.always {
                    None
                } else {
                    keep(Filter::Full, false)
                }
            }
            Filter::Only(paths) => {
                if paths.contains(key) {
                    return keep(Filter::All, true);
                }
                let nested = strip_prefix(paths, key);
                if !nested.is_empty() {
                    match prop.source {
                        Source::Group(_) => keep(Filter::Only(nested), false),
                        _ => keep(Filter::All, true),
                    }
                } else if prop.always {
                    keep(Filter::All, false)
                } else {
                    descend()
                }
            }
            Filter::Except(paths) => {
                if paths.contains(key) {
                    return if prop.always {
                        keep(Filter::All, false)
                    } else {
                        descend()
                    };
                }
                let nested = strip_prefix(paths, key);
                if nested.is_empty() {
                    keep(Filter::All, false)
                } else {
                    keep(Filter::Except(nested), false)
                }
            }
        }
    }
}

/// Paths below `key`, relative to it (`auth.user` → `user` for `auth`).
fn strip_prefix(paths: &BTreeSet<String>, key: &str) -> BTreeSet<String> {
    paths
        .iter()
        .filter_map(|p| p.strip_prefix(key)?.strip_prefix('.'))
        .filter(|rest| !rest.is_empty())
        .map(str::to_string)
        .collect()
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

enum Leaf {
    Value(Value),
    Sync(SyncFn),
    Async(AsyncFn),
}

enum Node {
    Leaf(Leaf),
    Group(Vec<Planned>),
}

struct Planned {
    key: String,
    path: String,
    node: Node,
}

struct Planner<'a> {
    directive: &'a ReloadDirective,
    ctx: &'a RenderContext<'a>,
    resolution: Resolution,
}

impl Planner<'_> {
    fn plan(
        &mut self,
        props: Props,
        filter: &Filter,
        prefix: &str,
        depth: usize,
    ) -> InertiaResult<Vec<Planned>> {
        if depth > MAX_PROP_DEPTH {
            return Err(InertiaError::PropsTooDeep {
                path: prefix.to_string(),
                max: MAX_PROP_DEPTH,
            });
        }

        let props = self.expand(props, prefix, depth)?;
        let mut planned = Vec::with_capacity(props.len());

        for (key, prop) in props {
            let path = join(prefix, &key);

            let selection = match filter.select(&key, &prop) {
                Some(selection) => selection,
                None => {
                    if let (Filter::Full, Some(group)) = (
                        filter,
                        prop.deferral.as_ref().and_then(|d| d.group.clone()),
                    ) {
                        self.resolution.deferred.push(DeferredRecord { group, path });
                    }
                    continue;
                }
            };

            if selection.prune {
                if let Source::Group(children) = prop.source {
                    let kept = self.plan(children, &selection.child, &path, depth + 1)?;
                    if !kept.is_empty() {
                        planned.push(Planned {
                            key,
                            path,
                            node: Node::Group(kept),
                        });
                    }
                }
                continue;
            }

            if let Some(once) = &prop.once {
                let once_key = once.key.clone().unwrap_or_else(|| path.clone());
                let cached = self.directive.except_once().contains(&once_key)
                    && !selection.explicit
                    && !once.fresh;
                self.resolution.once.push(OnceRecord {
                    path: path.clone(),
                    key: once_key,
                    ttl: once.ttl,
                    resolved: !cached,
                });
                if cached {
                    continue;
                }
            }

            if let Some(spec) = &prop.merge {
                self.resolution.merges.push(MergeRecord {
                    path: path.clone(),
                    spec: spec.clone(),
                    scroll: prop.scroll.is_some(),
                });
            }
            if let Some(spec) = &prop.scroll {
                self.resolution.scrolls.push(ScrollRecord {
                    path: path.clone(),
                    spec: spec.clone(),
                });
            }

            let node = match prop.source {
                Source::Value(value) => Node::Leaf(Leaf::Value(value)),
                Source::Sync(f) => Node::Leaf(Leaf::Sync(f)),
                Source::Async(f) => Node::Leaf(Leaf::Async(f)),
                Source::Group(children) => {
                    Node::Group(self.plan(children, &selection.child, &path, depth + 1)?)
                }
                // `expand` removed every provider from this level.
                Source::Provider(_) => continue,
            };
            planned.push(Planned { key, path, node });
        }

        Ok(planned)
    }

    /// Replace contributors by the props they produce. Contributed props
    /// override existing keys; contributors may return contributors.
    fn expand(&self, props: Props, prefix: &str, depth: usize) -> InertiaResult<Props> {
        let mut plain = Props::new();
        let mut contributed = Props::new();
        let mut found = false;

        for (key, prop) in props {
            match &prop.source {
                Source::Provider(provider) => {
                    found = true;
                    contributed.extend(provider.props(self.ctx));
                }
                _ => {
                    plain.insert(key, prop);
                }
            }
        }

        if !found {
            return Ok(plain);
        }
        if depth >= MAX_PROP_DEPTH {
            return Err(InertiaError::PropsTooDeep {
                path: prefix.to_string(),
                max: MAX_PROP_DEPTH,
            });
        }

        plain.extend(self.expand(contributed, prefix, depth + 1)?);
        Ok(plain)
    }
}

async fn resolve_all(planned: Vec<Planned>) -> InertiaResult<Map<String, Value>> {
    let entries = future::try_join_all(planned.into_iter().map(|p| {
        let key = p.key;
        resolve_node(p.path, p.node).map_ok(move |value| (key, value))
    }))
    .await?;
    Ok(entries.into_iter().collect())
}

fn resolve_node(path: String, node: Node) -> BoxFuture<'static, InertiaResult<Value>> {
    match node {
        Node::Leaf(Leaf::Value(value)) => future::ready(Ok(value)).boxed(),
        Node::Leaf(Leaf::Sync(f)) => async move {
            f().map_err(|source| InertiaError::Prop { key: path, source })
        }
        .boxed(),
        Node::Leaf(Leaf::Async(f)) => {
            let fut = f();
            async move {
                fut.await
                    .map_err(|source| InertiaError::Prop { key: path, source })
            }
            .boxed()
        }
        Node::Group(children) => async move {
            let values = resolve_all(children).await?;
            Ok(Value::Object(values))
        }
        .boxed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::protocol::RequestInfo;
    use axum::http::{HeaderMap, HeaderValue, Method};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn request(headers: &[(&'static str, &str)]) -> (RequestInfo, ReloadDirective) {
        let mut map = HeaderMap::new();
        for (k, v) in headers {
            map.insert(*k, HeaderValue::from_str(v).unwrap());
        }
        let directive = ReloadDirective::from_headers(&map);
        (RequestInfo::new(Method::GET, "/users".parse().unwrap(), map), directive)
    }

    fn partial(component: &str, only: &str) -> (RequestInfo, ReloadDirective) {
        request(&[
            ("x-inertia", "true"),
            ("x-inertia-partial-component", component),
            ("x-inertia-partial-data", only),
        ])
    }

    async fn run(props: Props, req: &(RequestInfo, ReloadDirective)) -> Resolution {
        let ctx = RenderContext {
            component: "Users/Index",
            request: &req.0,
        };
        resolve(props, &req.1, &ctx).await.expect("resolution failed")
    }

    fn keys(resolution: &Resolution) -> Vec<&str> {
        resolution.props.keys().map(String::as_str).collect()
    }

    fn users_bag(calls: Arc<AtomicUsize>) -> Props {
        Props::new()
            .with("users", json!([{"id": 1}]))
            .with("filters", json!({"search": ""}))
            .with(
                "stats",
                Prop::lazy(move || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, BoxError>(json!({"total": 1}))
                })
                .optional(),
            )
    }

    #[tokio::test]
    async fn test_full_load_drops_optional_without_calling_it() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolution = run(users_bag(calls.clone()), &request(&[])).await;

        assert_eq!(keys(&resolution), vec!["filters", "users"]);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(resolution.deferred.is_empty());
    }

    #[tokio::test]
    async fn test_partial_only_keeps_listed_keys() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolution = run(users_bag(calls.clone()), &partial("Users/Index", "users")).await;
        assert_eq!(keys(&resolution), vec!["users"]);

        let resolution = run(users_bag(calls.clone()), &partial("Users/Index", "stats")).await;
        assert_eq!(keys(&resolution), vec!["stats"]);
        assert_eq!(resolution.props["stats"], json!({"total": 1}));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_partial_for_other_component_is_full_load() {
        let calls = Arc::new(AtomicUsize::new(0));
        let resolution = run(users_bag(calls), &partial("Users/Show", "users")).await;
        assert_eq!(keys(&resolution), vec!["filters", "users"]);
    }

    #[tokio::test]
    async fn test_partial_except_drops_listed_keys_and_keeps_optional() {
        let calls = Arc::new(AtomicUsize::new(0));
        let req = request(&[
            ("x-inertia", "true"),
            ("x-inertia-partial-component", "Users/Index"),
            ("x-inertia-partial-except", "filters"),
        ]);
        let resolution = run(users_bag(calls), &req).await;
        assert_eq!(keys(&resolution), vec!["stats", "users"]);
    }

    #[tokio::test]
    async fn test_always_survives_every_filter() {
        let bag = || {
            Props::new()
                .with("users", json!([]))
                .with("auth", Prop::value(json!({"id": 7})).always())
                .with("hint", Prop::value("later").optional().always())
        };

        let full = run(bag(), &request(&[])).await;
        assert_eq!(keys(&full), vec!["auth", "hint", "users"]);

        let only = run(bag(), &partial("Users/Index", "users")).await;
        assert_eq!(keys(&only), vec!["auth", "hint", "users"]);

        let req = request(&[
            ("x-inertia", "true"),
            ("x-inertia-partial-component", "Users/Index"),
            ("x-inertia-partial-except", "auth,hint,users"),
        ]);
        let except = run(bag(), &req).await;
        assert_eq!(keys(&except), vec!["auth", "hint"]);
    }

    #[tokio::test]
    async fn test_deferred_props_are_recorded_by_group() {
        let props = Props::new()
            .with("users", json!([]))
            .with("stats", Prop::lazy(|| Ok::<_, BoxError>(json!(1))).defer())
            .with("chart", Prop::lazy(|| Ok::<_, BoxError>(json!(2))).defer_in("charts"))
            .with("hint", Prop::value("x").optional());

        let resolution = run(props, &request(&[])).await;
        assert_eq!(keys(&resolution), vec!["users"]);
        assert_eq!(
            resolution.deferred,
            vec![
                DeferredRecord { group: "charts".into(), path: "chart".into() },
                DeferredRecord { group: "default".into(), path: "stats".into() },
            ]
        );
    }

    #[tokio::test]
    async fn test_async_props_resolve_concurrently() {
        // Each callback waits for the other, so a sequential resolve never finishes.
        let barrier = Arc::new(tokio::sync::Barrier::new(2));
        let waiting = |name: &'static str| {
            let barrier = barrier.clone();
            Prop::future(move || {
                let barrier = barrier.clone();
                async move {
                    barrier.wait().await;
                    Ok::<_, BoxError>(json!(name))
                }
            })
        };
        let props = Props::new()
            .with("first", waiting("first"))
            .with("second", waiting("second"));

        let resolution = tokio::time::timeout(Duration::from_secs(5), run(props, &request(&[])))
            .await
            .expect("props were not resolved concurrently");
        assert_eq!(resolution.props["first"], json!("first"));
        assert_eq!(resolution.props["second"], json!("second"));
    }

    #[tokio::test]
    async fn test_dropping_resolution_cancels_pending_callbacks() {
        let started = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicUsize::new(0));
        let release = Arc::new(tokio::sync::Notify::new());

        let props = {
            let started = started.clone();
            let finished = finished.clone();
            let release = release.clone();
            Props::new().with("fast", json!(1)).with(
                "slow",
                Prop::future(move || {
                    let started = started.clone();
                    let finished = finished.clone();
                    let release = release.clone();
                    async move {
                        started.fetch_add(1, Ordering::SeqCst);
                        release.notified().await;
                        finished.fetch_add(1, Ordering::SeqCst);
                        Ok::<_, BoxError>(json!("slow"))
                    }
                }),
            )
        };

        let req = request(&[]);
        let ctx = RenderContext {
            component: "Users/Index",
            request: &req.0,
        };
        assert!(resolve(props, &req.1, &ctx).now_or_never().is_none());
        assert_eq!(started.load(Ordering::SeqCst), 1);

        release.notify_waiters();
        tokio::task::yield_now().await;
        assert_eq!(finished.load(Ordering::SeqCst), 0);
        assert_eq!(Arc::strong_count(&release), 1);
    }

    #[tokio::test]
    async fn test_nested_always_survives_only_filter() {
        let bag = Props::new().with("users", json!([])).with(
            "auth",
            Props::new()
                .with("user", Prop::value(json!({"id": 1})).always())
                .with("token", json!("secret")),
        );

        let resolution = run(bag, &partial("Users/Index", "users")).await;
        assert_eq!(
            resolution.props,
            json!({"users": [], "auth": {"user": {"id": 1}}}).as_object().unwrap().clone()
        );
    }

    #[tokio::test]
    async fn test_nested_always_survives_except_filter() {
        let bag = || {
            Props::new()
                .with("users", json!([]))
                .with(
                    "auth",
                    Props::new()
                        .with("user", Prop::value(json!({"id": 1})).always())
                        .with("token", json!("secret")),
                )
                .with("meta", Props::new().with("title", json!("Users")))
        };
        let req = request(&[
            ("x-inertia", "true"),
            ("x-inertia-partial-component", "Users/Index"),
            ("x-inertia-partial-except", "auth,meta"),
        ]);

        let resolution = run(bag(), &req).await;
        assert_eq!(keys(&resolution), vec!["auth", "users"]);
        assert_eq!(resolution.props["auth"], json!({"user": {"id": 1}}));
    }

    #[tokio::test]
    async fn test_callback_error_propagates_with_path() {
        let props = Props::new().with(
            "nested",
            Props::new().with(
                "broken",
                Prop::future(|| async { Err::<Value, _>("boom") }),
            ),
        );
        let req = request(&[]);
        let ctx = RenderContext {
            component: "Users/Index",
            request: &req.0,
        };
        let err = resolve(props, &req.1, &ctx).await.unwrap_err();
        match err {
            InertiaError::Prop { key, source } => {
                assert_eq!(key, "nested.broken");
                assert_eq!(source.to_string(), "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_dot_paths_descend_into_groups() {
        let bag = || {
            Props::new().with("users", json!([])).with(
                "auth",
                Props::new()
                    .with("user", json!({"id": 1}))
                    .with("permissions", Prop::value(json!(["admin"])).optional()),
            )
        };

        let resolution = run(bag(), &partial("Users/Index", "auth.permissions")).await;
        assert_eq!(resolution.props, json!({"auth": {"permissions": ["admin"]}}).as_object().unwrap().clone());

        let full = run(bag(), &request(&[])).await;
        assert_eq!(full.props["auth"], json!({"user": {"id": 1}}));

        let req = request(&[
            ("x-inertia", "true"),
            ("x-inertia-partial-component", "Users/Index"),
            ("x-inertia-partial-except", "auth.user"),
        ]);
        let except = run(bag(), &req).await;
        assert_eq!(except.props["auth"], json!({"permissions": ["admin"]}));
        assert_eq!(except.props["users"], json!([]));
    }

    #[tokio::test]
    async fn test_nested_merge_paths() {
        let props = Props::new().with(
            "feed",
            Props::new()
                .with("posts", Prop::value(json!([])).merge())
                .with("meta", json!({})),
        );
        let resolution = run(props, &request(&[])).await;
        assert_eq!(resolution.merges.len(), 1);
        assert_eq!(resolution.merges[0].path, "feed.posts");
    }

    #[tokio::test]
    async fn test_once_prop_skipped_when_client_has_it() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let bag = move || {
            let counter = counter.clone();
            Props::new().with(
                "plans",
                Prop::lazy(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, BoxError>(json!(["basic"]))
                })
                .once(),
            )
        };

        let resolution = run(bag(), &request(&[("x-inertia", "true"), ("x-inertia-except-once-props", "plans")])).await;
        assert!(resolution.props.is_empty());
        assert_eq!(resolution.once.len(), 1);
        assert!(!resolution.once[0].resolved);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let resolution = run(bag(), &request(&[("x-inertia", "true")])).await;
        assert_eq!(resolution.props["plans"], json!(["basic"]));
        assert!(resolution.once[0].resolved);

        // An explicit partial request wins over the client's cache.
        let req = request(&[
            ("x-inertia", "true"),
            ("x-inertia-partial-component", "Users/Index"),
            ("x-inertia-partial-data", "plans"),
            ("x-inertia-except-once-props", "plans"),
        ]);
        let resolution = run(bag(), &req).await;
        assert_eq!(resolution.props["plans"], json!(["basic"]));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_once_custom_key_and_fresh() {
        let props = Props::new()
            .with("plans", Prop::value(json!(1)).once_as("billing.plans"))
            .with("countries", Prop::value(json!(2)).once().fresh());
        let req = request(&[
            ("x-inertia", "true"),
            ("x-inertia-except-once-props", "billing.plans,countries"),
        ]);
        let resolution = run(props, &req).await;
        assert_eq!(keys(&resolution), vec!["countries"]);
        let plans = resolution.once.iter().find(|o| o.path == "plans").unwrap();
        assert_eq!(plans.key, "billing.plans");
    }

    #[tokio::test]
    async fn test_contributor_expands_with_context() {
        let props = Props::new()
            .with("title", json!("old"))
            .with(
                "page_meta",
                Prop::provider(|ctx: &RenderContext<'_>| {
                    Props::new()
                        .with("title", json!(format!("{} page", ctx.component)))
                        .with("path", json!(ctx.request.path_and_query()))
                }),
            );
        let resolution = run(props, &request(&[])).await;
        assert_eq!(keys(&resolution), vec!["path", "title"]);
        assert_eq!(resolution.props["title"], json!("Users/Index page"));
        assert_eq!(resolution.props["path"], json!("/users"));
    }

    struct Recursive;

    impl crate::props::ProvideProps for Recursive {
        fn props(&self, _ctx: &RenderContext<'_>) -> Props {
            Props::new().with("again", Prop::provider(Recursive))
        }
    }

    #[tokio::test]
    async fn test_self_returning_contributor_is_bounded() {
        let props = Props::new().with("loop", Prop::provider(Recursive));
        let req = request(&[]);
        let ctx = RenderContext {
            component: "Users/Index",
            request: &req.0,
        };
        let err = resolve(props, &req.1, &ctx).await.unwrap_err();
        assert!(matches!(err, InertiaError::PropsTooDeep { max: MAX_PROP_DEPTH, .. }));
    }
}
