//! Sample application served by the `inertia-server` binary.

use std::time::Duration;

use axum::{
    extract::{Form, Path, Query},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, put},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{BoxError, InertiaResult};
use crate::http::Inertia;
use crate::props::{Prop, Props};
use crate::shared::ValidationErrors;

const USERS: [(u64, &str); 3] = [(1, "Ada"), (2, "Grace"), (3, "Linus")];

pub fn routes() -> Router {
    Router::new()
        .route("/", get(home))
        .route("/users", get(users_index))
        .route("/users/{id}", put(users_update))
        .route("/session", delete(logout))
        .route("/docs", get(docs))
}

async fn home(inertia: Inertia) -> InertiaResult<Response> {
    inertia
        .render("Home", Props::new().with("greeting", json!("Hello")))
        .await
}

#[derive(Debug, Deserialize)]
struct UsersQuery {
    #[serde(default)]
    search: String,
    #[serde(default = "first_page")]
    page: u64,
}

fn first_page() -> u64 {
    1
}

async fn users_index(inertia: Inertia, Query(query): Query<UsersQuery>) -> InertiaResult<Response> {
    let search = query.search.to_lowercase();
    let users: Vec<Value> = USERS
        .iter()
        .filter(|(_, name)| name.to_lowercase().contains(&search))
        .map(|(id, name)| json!({"id": id, "name": name}))
        .collect();
    let total = users.len();
    let page = query.page;

    let props = Props::new()
        .with("users", Prop::value(json!(users)).merge().match_on(["id"]))
        .with("filters", json!({"search": query.search}))
        .with(
            "stats",
            Prop::future(move || async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok::<_, BoxError>(json!({"total": total}))
            })
            .defer(),
        )
        .with(
            "activity",
            Prop::lazy(move || {
                Ok::<_, BoxError>(json!({
                    "data": [{"page": page}],
                    "current_page": page,
                    "last_page": 5,
                }))
            })
            .scroll(),
        )
        .with(
            "roles",
            Prop::value(json!(["admin", "member"])).once_for(Duration::from_secs(3600)),
        );

    inertia.render("Users/Index", props).await
}

#[derive(Debug, Deserialize)]
struct UpdateUser {
    #[serde(default)]
    name: String,
}

async fn users_update(
    inertia: Inertia,
    Path(id): Path<u64>,
    Form(form): Form<UpdateUser>,
) -> InertiaResult<Response> {
    if form.name.trim().is_empty() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "The name field is required.");
        return inertia
            .with_errors(errors)
            .render("Users/Edit", Props::new().with("id", json!(id)))
            .await;
    }

    tracing::info!(user_id = id, name = %form.name, "User updated");
    Ok((StatusCode::FOUND, [(header::LOCATION, "/users")]).into_response())
}

async fn logout() -> StatusCode {
    StatusCode::OK
}

async fn docs(inertia: Inertia) -> Response {
    inertia.location("https://inertiajs.com")
}
