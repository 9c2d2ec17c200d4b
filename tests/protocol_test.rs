//! Protocol behavior through the axum middleware and extractor.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};

use inertia_server::error::BoxError;
use inertia_server::protocol::RequestInfo;
use inertia_server::ssr::NoSsr;
use inertia_server::{Inertia, InertiaResult, InertiaState, Prop, Props, SharedProps};

mod common;

fn users_routes(stats_calls: Arc<AtomicUsize>) -> Router {
    Router::new().route(
        "/users",
        get(move |inertia: Inertia| {
            let calls = stats_calls.clone();
            async move {
                let props = Props::new()
                    .with("users", json!([{"id": 1, "name": "Ada"}]))
                    .with("filters", json!({"search": ""}))
                    .with(
                        "stats",
                        Prop::lazy(move || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            Ok::<_, BoxError>(json!({"total": 1}))
                        })
                        .optional(),
                    );
                inertia.render("Users/Index", props).await
            }
        }),
    )
}

fn redirect_routes() -> Router {
    let found = || async { (StatusCode::FOUND, [(header::LOCATION, "/users")]).into_response() };
    Router::new()
        .route(
            "/users/1",
            post(found).put(found).patch(found).delete(found),
        )
        .route("/empty", post(|| async { StatusCode::OK }))
        .route(
            "/away",
            get(|inertia: Inertia| async move { inertia.location("https://example.com/docs") }),
        )
}

fn props_of(body: &str) -> Value {
    let page: Value = serde_json::from_str(body).unwrap();
    page["props"].clone()
}

#[tokio::test]
async fn test_version_mismatch_returns_409_with_location() {
    let calls = Arc::new(AtomicUsize::new(0));
    let app = common::app(users_routes(calls.clone()), common::state("v2"));

    let request = common::inertia_get("/users?page=2", "v1")
        .header(header::HOST, "example.com")
        .body(Body::empty())
        .unwrap();
    let (status, headers, body) = common::send(app, request).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        headers.get("x-inertia-location").unwrap(),
        "http://example.com/users?page=2"
    );
    assert_eq!(headers.get(header::VARY).unwrap(), "X-Inertia");
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_version_match_returns_page_json() {
    let calls = Arc::new(AtomicUsize::new(0));
    let app = common::app(users_routes(calls.clone()), common::state("v1"));

    let request = common::inertia_get("/users", "v1").body(Body::empty()).unwrap();
    let (status, headers, body) = common::send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get("x-inertia").unwrap(), "true");
    assert_eq!(headers.get(header::VARY).unwrap(), "X-Inertia");
    let page: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(page["component"], "Users/Index");
    assert_eq!(page["url"], "/users");
    assert_eq!(page["version"], "v1");
    assert_eq!(
        page["props"],
        json!({"errors": {}, "filters": {"search": ""}, "users": [{"id": 1, "name": "Ada"}]})
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_version_not_checked_on_post() {
    let app = common::app(redirect_routes(), common::state("v2"));
    let request = Request::builder()
        .method("POST")
        .uri("/empty")
        .header("x-inertia", "true")
        .header("x-inertia-version", "v1")
        .header(header::REFERER, "/users")
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = common::send(app, request).await;
    assert_ne!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_partial_reload_only_keeps_listed_props() {
    let calls = Arc::new(AtomicUsize::new(0));
    let app = common::app(users_routes(calls.clone()), common::state("v1"));

    let request = common::inertia_get("/users", "v1")
        .header("x-inertia-partial-component", "Users/Index")
        .header("x-inertia-partial-data", "users")
        .body(Body::empty())
        .unwrap();
    let (_, _, body) = common::send(app.clone(), request).await;
    assert_eq!(
        props_of(&body),
        json!({"errors": {}, "users": [{"id": 1, "name": "Ada"}]})
    );

    let request = common::inertia_get("/users", "v1")
        .header("x-inertia-partial-component", "Users/Index")
        .header("x-inertia-partial-data", "stats")
        .body(Body::empty())
        .unwrap();
    let (_, _, body) = common::send(app, request).await;
    assert_eq!(props_of(&body), json!({"errors": {}, "stats": {"total": 1}}));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_partial_reload_for_other_component_is_full_load() {
    let calls = Arc::new(AtomicUsize::new(0));
    let app = common::app(users_routes(calls.clone()), common::state("v1"));

    let request = common::inertia_get("/users", "v1")
        .header("x-inertia-partial-component", "Users/Show")
        .header("x-inertia-partial-data", "stats")
        .body(Body::empty())
        .unwrap();
    let (_, _, body) = common::send(app, request).await;
    let props = props_of(&body);
    assert!(props.get("users").is_some());
    assert!(props.get("filters").is_some());
    assert!(props.get("stats").is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_302_becomes_303_only_for_put_patch_delete() {
    let app = common::app(redirect_routes(), common::state("v1"));

    for (method, expected) in [
        ("PUT", StatusCode::SEE_OTHER),
        ("PATCH", StatusCode::SEE_OTHER),
        ("DELETE", StatusCode::SEE_OTHER),
        ("POST", StatusCode::FOUND),
    ] {
        let request = Request::builder()
            .method(method)
            .uri("/users/1")
            .header("x-inertia", "true")
            .body(Body::empty())
            .unwrap();
        let (status, headers, _) = common::send(app.clone(), request).await;
        assert_eq!(status, expected, "method {}", method);
        assert_eq!(headers.get(header::LOCATION).unwrap(), "/users");
    }
}

#[tokio::test]
async fn test_plain_requests_keep_302() {
    let app = common::app(redirect_routes(), common::state("v1"));
    let request = Request::builder()
        .method("PUT")
        .uri("/users/1")
        .body(Body::empty())
        .unwrap();
    let (status, headers, _) = common::send(app, request).await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(headers.get(header::VARY).unwrap(), "X-Inertia");
}

#[tokio::test]
async fn test_empty_response_redirects_back() {
    let app = common::app(redirect_routes(), common::state("v1"));

    let request = Request::builder()
        .method("POST")
        .uri("/empty")
        .header("x-inertia", "true")
        .header(header::REFERER, "/users?page=3")
        .body(Body::empty())
        .unwrap();
    let (status, headers, _) = common::send(app.clone(), request).await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(headers.get(header::LOCATION).unwrap(), "/users?page=3");

    let request = Request::builder()
        .method("POST")
        .uri("/empty")
        .header("x-inertia", "true")
        .body(Body::empty())
        .unwrap();
    let (_, headers, _) = common::send(app, request).await;
    assert_eq!(headers.get(header::LOCATION).unwrap(), "/");
}

#[tokio::test]
async fn test_first_visit_renders_html_shell() {
    let calls = Arc::new(AtomicUsize::new(0));
    let app = common::app(users_routes(calls), common::state("v1"));

    let request = Request::builder()
        .uri("/users")
        .body(Body::empty())
        .unwrap();
    let (status, headers, body) = common::send(app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    assert!(headers.get("x-inertia").is_none());
    assert!(body.contains(r#"<div id="app" data-page="{&quot;component&quot;:&quot;Users/Index&quot;"#));
}

#[tokio::test]
async fn test_location_conflict_or_redirect() {
    let app = common::app(redirect_routes(), common::state("v1"));

    let request = common::inertia_get("/away", "v1").body(Body::empty()).unwrap();
    let (status, headers, _) = common::send(app.clone(), request).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(headers.get("x-inertia-location").unwrap(), "https://example.com/docs");

    let request = Request::builder().uri("/away").body(Body::empty()).unwrap();
    let (status, headers, _) = common::send(app, request).await;
    assert_eq!(status, StatusCode::FOUND);
    assert_eq!(headers.get(header::LOCATION).unwrap(), "https://example.com/docs");
}

#[tokio::test]
async fn test_shared_props_and_error_bag() {
    let state = InertiaState::builder(common::config("v1"))
        .gateway(NoSsr)
        .share(|_: &RequestInfo, shared: &mut SharedProps| {
            shared.share("appName", json!("Demo"));
            shared.share("title", json!("shared"));
            shared.errors_mut().add("email", "Required.");
        })
        .build()
        .unwrap();
    let routes = Router::new().route(
        "/login",
        get(|inertia: Inertia| async move {
            inertia
                .render("Auth/Login", Props::new().with("title", json!("Login")))
                .await
        }),
    );
    let app = common::app(routes, state);

    let request = common::inertia_get("/login", "v1")
        .header("x-inertia-error-bag", "login")
        .body(Body::empty())
        .unwrap();
    let (_, _, body) = common::send(app, request).await;
    assert_eq!(
        props_of(&body),
        json!({
            "appName": "Demo",
            "errors": {"login": {"email": "Required."}},
            "title": "Login"
        })
    );
}

#[tokio::test]
async fn test_missing_component_is_404_when_checked() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("Pages")).unwrap();
    std::fs::write(dir.path().join("Pages/Home.vue"), "").unwrap();

    let mut config = common::config("v1");
    config.app.base_path = dir.path().to_path_buf();
    config.pages.ensure_exist = true;
    config.pages.paths = vec!["Pages".into()];
    let state = InertiaState::builder(config).gateway(NoSsr).build().unwrap();

    let routes = Router::new()
        .route(
            "/",
            get(|inertia: Inertia| async move { inertia.render("Home", Props::new()).await }),
        )
        .route(
            "/missing",
            get(|inertia: Inertia| async move { inertia.render("Nope", Props::new()).await }),
        );
    let app = common::app(routes, state);

    let request = common::inertia_get("/", "v1").body(Body::empty()).unwrap();
    let (status, _, _) = common::send(app.clone(), request).await;
    assert_eq!(status, StatusCode::OK);

    let request = common::inertia_get("/missing", "v1").body(Body::empty()).unwrap();
    let (status, _, body) = common::send(app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Component not found: Nope");
}

#[tokio::test]
async fn test_extractor_without_middleware_fails() {
    let routes: Router = Router::new().route(
        "/",
        get(|inertia: Inertia| async move {
            let response: InertiaResult<Response> = inertia.render("Home", Props::new()).await;
            response
        }),
    );
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let (status, _, _) = common::send(routes, request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_reload_changes_version_between_requests() {
    let calls = Arc::new(AtomicUsize::new(0));
    let state = common::state("v1");
    let app = common::app(users_routes(calls), state.clone());

    state.reload(common::config("v2")).unwrap();

    let request = common::inertia_get("/users", "v1").body(Body::empty()).unwrap();
    let (status, _, _) = common::send(app, request).await;
    assert_eq!(status, StatusCode::CONFLICT);
}
