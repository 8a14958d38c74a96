//! HTTP surface for todu-server.
//!
//! Route shapes and response envelopes follow the client contract:
//! success bodies are `{"status":"success", "message"?, "data"?}` with
//! camelCase todo payloads; errors come from [`ApiError`]. The
//! `/api/todos` routes sit behind the bearer middleware, `/health` and
//! `/api/auth/*` do not.

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post, put},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::{self, AuthUser};
use crate::config::Config;
use crate::db::Database;
use crate::error::ApiError;
use crate::models::{CreateTodoRequest, ReorderRequest, StatusFilter, Todo, UpdateTodoRequest};

/// Application state shared across handlers
pub struct AppState {
    pub db: Database,
    pub config: Config,
}

impl AppState {
    pub fn new(db: Database, config: Config) -> Arc<Self> {
        Arc::new(Self { db, config })
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let todos = Router::new()
        .route("/api/todos", get(list_todos).post(create_todo))
        .route("/api/todos/{id}", put(update_todo).delete(soft_delete_todo))
        .route("/api/todos/{id}/restore", post(restore_todo))
        .route("/api/todos/{id}/complete", patch(toggle_complete_todo))
        .route("/api/todos/{id}/priority", patch(reorder_todo))
        .route("/api/todos/{id}/permanent", delete(permanent_delete_todo))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .route("/health", get(health))
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .merge(todos)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint (no auth required)
async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "todu-server",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

fn todo_response(status: StatusCode, message: &str, todo: &Todo) -> Response {
    (
        status,
        Json(json!({
            "status": "success",
            "message": message,
            "data": todo,
        })),
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    status: Option<String>,
}

/// `GET /api/todos?status=active|completed|deleted`
async fn list_todos(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> Result<Response, ApiError> {
    let filter = StatusFilter::from_param(query.status.as_deref())?;
    let todos = state.db.list_todos(&user_id, filter)?;

    Ok(Json(json!({
        "status": "success",
        "data": {
            "count": todos.len(),
            "todos": todos,
        },
    }))
    .into_response())
}

/// `POST /api/todos`
async fn create_todo(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Json(request): Json<CreateTodoRequest>,
) -> Result<Response, ApiError> {
    let (Some(title), Some(start_date), Some(end_date)) =
        (&request.title, &request.start_date, &request.end_date)
    else {
        return Err(ApiError::MissingFields("title, startDate, endDate"));
    };

    let todo = state.db.create_todo(&user_id, title, start_date, end_date)?;
    tracing::debug!(todo_id = %todo.id, priority = todo.priority, "todo created");

    Ok(todo_response(
        StatusCode::CREATED,
        "Todo created successfully",
        &todo,
    ))
}

/// `PUT /api/todos/{id}`
async fn update_todo(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(todo_id): Path<String>,
    Json(request): Json<UpdateTodoRequest>,
) -> Result<Response, ApiError> {
    let todo = state.db.update_todo(
        &user_id,
        &todo_id,
        request.title.as_deref(),
        request.start_date.as_deref(),
        request.end_date.as_deref(),
    )?;

    Ok(todo_response(
        StatusCode::OK,
        "Todo updated successfully",
        &todo,
    ))
}

/// `DELETE /api/todos/{id}`
async fn soft_delete_todo(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(todo_id): Path<String>,
) -> Result<Response, ApiError> {
    let todo = state.db.soft_delete_todo(&user_id, &todo_id)?;

    Ok(todo_response(
        StatusCode::OK,
        "Todo moved to trash successfully",
        &todo,
    ))
}

/// `POST /api/todos/{id}/restore`
async fn restore_todo(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(todo_id): Path<String>,
) -> Result<Response, ApiError> {
    let todo = state.db.restore_todo(&user_id, &todo_id)?;

    Ok(todo_response(
        StatusCode::OK,
        "Todo restored successfully",
        &todo,
    ))
}

/// `PATCH /api/todos/{id}/complete`
async fn toggle_complete_todo(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(todo_id): Path<String>,
) -> Result<Response, ApiError> {
    let todo = state.db.toggle_complete_todo(&user_id, &todo_id)?;
    let message = if todo.is_completed {
        "Todo completed successfully"
    } else {
        "Todo uncompleted successfully"
    };

    Ok(todo_response(StatusCode::OK, message, &todo))
}

/// `PATCH /api/todos/{id}/priority`
async fn reorder_todo(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(todo_id): Path<String>,
    Json(request): Json<ReorderRequest>,
) -> Result<Response, ApiError> {
    let value = request
        .priority
        .as_ref()
        .filter(|v| !v.is_null())
        .ok_or(ApiError::MissingFields("priority"))?;
    // Non-integer values (strings, fractions) are a range failure, not
    // a body rejection
    let priority = value.as_i64().ok_or(ApiError::InvalidPriority)?;

    let todo = state.db.reorder_todo(&user_id, &todo_id, priority)?;

    Ok(todo_response(
        StatusCode::OK,
        "Todo priority updated successfully",
        &todo,
    ))
}

/// `DELETE /api/todos/{id}/permanent`
async fn permanent_delete_todo(
    State(state): State<Arc<AppState>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(todo_id): Path<String>,
) -> Result<Response, ApiError> {
    state.db.permanent_delete_todo(&user_id, &todo_id)?;

    Ok(Json(json!({
        "status": "success",
        "message": "Todo permanently deleted",
    }))
    .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_app() -> Router {
        let db = Database::open(std::path::Path::new(":memory:")).unwrap();
        let mut config = Config::default();
        config.auth.secret = "test-secret".to_string();
        create_router(AppState::new(db, config))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn register(app: &Router, email: &str) -> String {
        let (status, _) = send(
            app,
            json_request(
                "POST",
                "/api/auth/signup",
                None,
                Some(json!({"email": email, "password": "Abcdef1!", "name": "Test User"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            app,
            json_request(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({"email": email, "password": "Abcdef1!"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["data"]["token"].as_str().unwrap().to_string()
    }

    async fn add_todo(app: &Router, token: &str, title: &str) -> Value {
        let (status, body) = send(
            app,
            json_request(
                "POST",
                "/api/todos",
                Some(token),
                Some(json!({"title": title, "startDate": "2025-01-01", "endDate": "2025-01-10"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body["data"].clone()
    }

    #[tokio::test]
    async fn health_needs_no_auth() {
        let app = test_app();
        let (status, body) = send(&app, json_request("GET", "/health", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "todu-server");
    }

    #[tokio::test]
    async fn bearer_errors_are_distinguished() {
        let app = test_app();

        let (status, body) = send(&app, json_request("GET", "/api/todos", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["errorCode"], "MISSING_AUTH_HEADER");

        let request = Request::builder()
            .method("GET")
            .uri("/api/todos")
            .header("authorization", "Token abc")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["errorCode"], "INVALID_AUTH_FORMAT");

        let (status, body) = send(
            &app,
            json_request("GET", "/api/todos", Some("not-a-real-token"), None),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["errorCode"], "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn signup_validates_and_rejects_duplicates() {
        let app = test_app();

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/auth/signup",
                None,
                Some(json!({"email": "a@example.com"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errorCode"], "MISSING_FIELDS");

        let (_, body) = send(
            &app,
            json_request(
                "POST",
                "/api/auth/signup",
                None,
                Some(json!({"email": "bad-email", "password": "Abcdef1!", "name": "Ok"})),
            ),
        )
        .await;
        assert_eq!(body["errorCode"], "INVALID_EMAIL");

        let (_, body) = send(
            &app,
            json_request(
                "POST",
                "/api/auth/signup",
                None,
                Some(json!({"email": "a@example.com", "password": "short", "name": "Ok"})),
            ),
        )
        .await;
        assert_eq!(body["errorCode"], "INVALID_PASSWORD");

        let (_, body) = send(
            &app,
            json_request(
                "POST",
                "/api/auth/signup",
                None,
                Some(json!({"email": "a@example.com", "password": "Abcdef1!", "name": "X"})),
            ),
        )
        .await;
        assert_eq!(body["errorCode"], "INVALID_NAME");

        register(&app, "a@example.com").await;
        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/auth/signup",
                None,
                Some(json!({"email": "a@example.com", "password": "Abcdef1!", "name": "Twin"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errorCode"], "EMAIL_ALREADY_EXISTS");
    }

    #[tokio::test]
    async fn login_rejects_bad_credentials() {
        let app = test_app();
        register(&app, "a@example.com").await;

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({"email": "a@example.com", "password": "Wrong1!pass"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["errorCode"], "INVALID_CREDENTIALS");
        assert_eq!(body["message"], "Invalid email or password");

        // Unknown email reports the same failure
        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({"email": "nobody@example.com", "password": "Abcdef1!"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["errorCode"], "INVALID_CREDENTIALS");

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({"email": "a@example.com"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errorCode"], "MISSING_FIELDS");
    }

    #[tokio::test]
    async fn created_todos_rank_in_creation_order() {
        let app = test_app();
        let token = register(&app, "a@example.com").await;

        for expected in 1..=3 {
            let (status, body) = send(
                &app,
                json_request(
                    "POST",
                    "/api/todos",
                    Some(&token),
                    Some(json!({"title": "A", "startDate": "2025-01-01", "endDate": "2025-01-10"})),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
            assert_eq!(body["message"], "Todo created successfully");
            assert_eq!(body["data"]["priority"], expected);
            assert_eq!(body["data"]["isCompleted"], false);
            assert_eq!(body["data"]["isDeleted"], false);
            assert_eq!(body["data"]["deletedAt"], Value::Null);
        }
    }

    #[tokio::test]
    async fn create_reports_missing_and_invalid_fields() {
        let app = test_app();
        let token = register(&app, "a@example.com").await;

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/todos",
                Some(&token),
                Some(json!({"title": "A", "startDate": "2025-01-01"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errorCode"], "MISSING_FIELDS");

        let (_, body) = send(
            &app,
            json_request(
                "POST",
                "/api/todos",
                Some(&token),
                Some(json!({"title": "A", "startDate": "01/01/2025", "endDate": "2025-01-10"})),
            ),
        )
        .await;
        assert_eq!(body["errorCode"], "INVALID_DATE");
        assert_eq!(body["message"], "Date must be in YYYY-MM-DD format");
    }

    #[tokio::test]
    async fn title_boundaries_are_inclusive() {
        let app = test_app();
        let token = register(&app, "a@example.com").await;

        let todo = add_todo(&app, &token, "x").await;
        assert_eq!(todo["title"], "x");
        let long = "x".repeat(500);
        let todo = add_todo(&app, &token, &long).await;
        assert_eq!(todo["title"].as_str().unwrap().len(), 500);

        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/todos",
                Some(&token),
                Some(json!({"title": "y".repeat(501), "startDate": "2025-01-01", "endDate": "2025-01-10"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errorCode"], "INVALID_TITLE");
    }

    #[tokio::test]
    async fn reorder_swaps_two_todos() {
        let app = test_app();
        let token = register(&app, "a@example.com").await;
        let t1 = add_todo(&app, &token, "T1").await;
        let t2 = add_todo(&app, &token, "T2").await;

        let (status, body) = send(
            &app,
            json_request(
                "PATCH",
                &format!("/api/todos/{}/priority", t2["todoId"].as_str().unwrap()),
                Some(&token),
                Some(json!({"priority": 1})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Todo priority updated successfully");
        assert_eq!(body["data"]["priority"], 1);

        let (_, body) = send(&app, json_request("GET", "/api/todos", Some(&token), None)).await;
        let todos = body["data"]["todos"].as_array().unwrap();
        assert_eq!(todos[0]["todoId"], t2["todoId"]);
        assert_eq!(todos[0]["priority"], 1);
        assert_eq!(todos[1]["todoId"], t1["todoId"]);
        assert_eq!(todos[1]["priority"], 2);
    }

    #[tokio::test]
    async fn reorder_rejects_missing_and_malformed_priorities() {
        let app = test_app();
        let token = register(&app, "a@example.com").await;
        let todo = add_todo(&app, &token, "A").await;
        let uri = format!("/api/todos/{}/priority", todo["todoId"].as_str().unwrap());

        let (status, body) = send(
            &app,
            json_request("PATCH", &uri, Some(&token), Some(json!({}))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errorCode"], "MISSING_FIELDS");

        for bad in [json!("2"), json!(1.5), json!(0), json!(1_000_000)] {
            let (status, body) = send(
                &app,
                json_request("PATCH", &uri, Some(&token), Some(json!({"priority": bad}))),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["errorCode"], "INVALID_PRIORITY");
        }
    }

    #[tokio::test]
    async fn update_rejects_inverted_date_range() {
        let app = test_app();
        let token = register(&app, "a@example.com").await;
        let todo = add_todo(&app, &token, "A").await;

        let (status, body) = send(
            &app,
            json_request(
                "PUT",
                &format!("/api/todos/{}", todo["todoId"].as_str().unwrap()),
                Some(&token),
                Some(json!({"startDate": "2025-12-31", "endDate": "2025-11-26"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errorCode"], "INVALID_DATE_RANGE");
    }

    #[tokio::test]
    async fn soft_delete_moves_between_listing_partitions() {
        let app = test_app();
        let token = register(&app, "a@example.com").await;
        let todo = add_todo(&app, &token, "A").await;
        let id = todo["todoId"].as_str().unwrap();

        let (status, body) = send(
            &app,
            json_request("DELETE", &format!("/api/todos/{id}"), Some(&token), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Todo moved to trash successfully");
        assert_eq!(body["data"]["isDeleted"], true);
        assert!(body["data"]["deletedAt"].is_string());

        let (_, body) = send(
            &app,
            json_request("GET", "/api/todos?status=active", Some(&token), None),
        )
        .await;
        assert_eq!(body["data"]["count"], 0);
        assert_eq!(body["data"]["todos"].as_array().unwrap().len(), 0);

        let (_, body) = send(
            &app,
            json_request("GET", "/api/todos?status=deleted", Some(&token), None),
        )
        .await;
        assert_eq!(body["data"]["count"], 1);
        assert_eq!(body["data"]["todos"][0]["todoId"], id);
    }

    #[tokio::test]
    async fn invalid_status_filter_is_rejected() {
        let app = test_app();
        let token = register(&app, "a@example.com").await;

        let (status, body) = send(
            &app,
            json_request("GET", "/api/todos?status=archived", Some(&token), None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errorCode"], "INVALID_STATUS");

        // Empty filter falls back to the default view
        let (status, _) = send(
            &app,
            json_request("GET", "/api/todos?status=", Some(&token), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn deleted_todos_cannot_be_modified() {
        let app = test_app();
        let token = register(&app, "a@example.com").await;
        let todo = add_todo(&app, &token, "A").await;
        let id = todo["todoId"].as_str().unwrap();

        send(
            &app,
            json_request("DELETE", &format!("/api/todos/{id}"), Some(&token), None),
        )
        .await;

        let (status, body) = send(
            &app,
            json_request(
                "PUT",
                &format!("/api/todos/{id}"),
                Some(&token),
                Some(json!({"title": "x"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errorCode"], "BAD_REQUEST");
        assert_eq!(body["message"], "Cannot modify a deleted todo");

        let (status, body) = send(
            &app,
            json_request(
                "PATCH",
                &format!("/api/todos/{id}/complete"),
                Some(&token),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Cannot complete a deleted todo");
    }

    #[tokio::test]
    async fn restore_and_toggle_report_resulting_state() {
        let app = test_app();
        let token = register(&app, "a@example.com").await;
        let todo = add_todo(&app, &token, "A").await;
        let id = todo["todoId"].as_str().unwrap();

        let (status, body) = send(
            &app,
            json_request(
                "PATCH",
                &format!("/api/todos/{id}/complete"),
                Some(&token),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Todo completed successfully");
        assert_eq!(body["data"]["isCompleted"], true);

        let (_, body) = send(
            &app,
            json_request(
                "PATCH",
                &format!("/api/todos/{id}/complete"),
                Some(&token),
                None,
            ),
        )
        .await;
        assert_eq!(body["message"], "Todo uncompleted successfully");
        assert_eq!(body["data"]["isCompleted"], false);

        // restore requires the trash
        let (status, body) = send(
            &app,
            json_request(
                "POST",
                &format!("/api/todos/{id}/restore"),
                Some(&token),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Cannot restore a non-deleted todo");

        send(
            &app,
            json_request("DELETE", &format!("/api/todos/{id}"), Some(&token), None),
        )
        .await;
        let (status, body) = send(
            &app,
            json_request(
                "POST",
                &format!("/api/todos/{id}/restore"),
                Some(&token),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Todo restored successfully");
        assert_eq!(body["data"]["isDeleted"], false);
        assert_eq!(body["data"]["deletedAt"], Value::Null);
    }

    #[tokio::test]
    async fn permanent_delete_is_terminal() {
        let app = test_app();
        let token = register(&app, "a@example.com").await;
        let todo = add_todo(&app, &token, "A").await;
        let id = todo["todoId"].as_str().unwrap();
        let uri = format!("/api/todos/{id}/permanent");

        let (status, body) = send(&app, json_request("DELETE", &uri, Some(&token), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Cannot permanently delete a non-deleted todo");

        send(
            &app,
            json_request("DELETE", &format!("/api/todos/{id}"), Some(&token), None),
        )
        .await;
        let (status, body) = send(&app, json_request("DELETE", &uri, Some(&token), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Todo permanently deleted");
        assert!(body.get("data").is_none());

        let (status, body) = send(&app, json_request("DELETE", &uri, Some(&token), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errorCode"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn owners_cannot_reach_each_others_todos() {
        let app = test_app();
        let alice = register(&app, "alice@example.com").await;
        let bob = register(&app, "bob@example.com").await;
        let todo = add_todo(&app, &alice, "alices").await;
        let id = todo["todoId"].as_str().unwrap();

        let attempts = [
            json_request(
                "PUT",
                &format!("/api/todos/{id}"),
                Some(&bob),
                Some(json!({"title": "stolen"})),
            ),
            json_request("DELETE", &format!("/api/todos/{id}"), Some(&bob), None),
            json_request(
                "PATCH",
                &format!("/api/todos/{id}/priority"),
                Some(&bob),
                Some(json!({"priority": 1})),
            ),
            json_request(
                "DELETE",
                &format!("/api/todos/{id}/permanent"),
                Some(&bob),
                None,
            ),
        ];
        for request in attempts {
            let (status, body) = send(&app, request).await;
            assert_eq!(status, StatusCode::FORBIDDEN);
            assert_eq!(body["errorCode"], "FORBIDDEN");
        }

        // Bob's listing never shows Alice's todo
        let (_, body) = send(&app, json_request("GET", "/api/todos", Some(&bob), None)).await;
        assert_eq!(body["data"]["count"], 0);
    }

    #[tokio::test]
    async fn reorder_on_own_deleted_todo_is_not_found() {
        let app = test_app();
        let token = register(&app, "a@example.com").await;
        let todo = add_todo(&app, &token, "A").await;
        let id = todo["todoId"].as_str().unwrap();

        send(
            &app,
            json_request("DELETE", &format!("/api/todos/{id}"), Some(&token), None),
        )
        .await;

        let (status, body) = send(
            &app,
            json_request(
                "PATCH",
                &format!("/api/todos/{id}/priority"),
                Some(&token),
                Some(json!({"priority": 1})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errorCode"], "NOT_FOUND");
    }
}
