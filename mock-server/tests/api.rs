use std::sync::Arc;

use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with_state, AppState, Todo};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

// --- list ---

#[tokio::test]
async fn list_todos_empty() {
    let resp = app().oneshot(empty_request("GET", "/todos")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let todos: Vec<Todo> = body_json(resp).await;
    assert!(todos.is_empty());
}

#[tokio::test]
async fn list_todos_filters_by_owner_in_insertion_order() {
    let db = Arc::new(AppState::default());
    db.seed(1, "first", false).await;
    db.seed(2, "someone else", false).await;
    db.seed(1, "second", true).await;

    let resp = app_with_state(db)
        .oneshot(empty_request("GET", "/todos?userId=1"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let todos: Vec<Todo> = body_json(resp).await;
    let titles: Vec<&str> = todos.iter().map(|todo| todo.title.as_str()).collect();
    assert_eq!(titles, vec!["first", "second"]);
}

#[tokio::test]
async fn list_failure_is_injectable() {
    let db = Arc::new(AppState::default());
    db.fail_list(true);
    let resp = app_with_state(db)
        .oneshot(empty_request("GET", "/todos?userId=1"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

// --- create ---

#[tokio::test]
async fn create_todo_returns_201_with_assigned_id() {
    let resp = app()
        .oneshot(json_request("POST", "/todos", r#"{"title":"Buy milk","userId":7}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let todo: Todo = body_json(resp).await;
    assert_eq!(todo.id, 1);
    assert_eq!(todo.user_id, 7);
    assert_eq!(todo.title, "Buy milk");
    assert!(!todo.completed);
}

#[tokio::test]
async fn create_todo_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/todos", r#"{"not_title":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn create_failure_is_injectable() {
    let db = Arc::new(AppState::default());
    db.fail_create(true);
    let resp = app_with_state(db.clone())
        .oneshot(json_request("POST", "/todos", r#"{"title":"x","userId":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(db.snapshot().await.is_empty());
}

// --- update ---

#[tokio::test]
async fn update_todo_not_found() {
    let resp = app()
        .oneshot(json_request("PATCH", "/todos/42", r#"{"title":"Nope"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_todo_bad_id_returns_400() {
    let resp = app()
        .oneshot(json_request("PATCH", "/todos/not-a-number", r#"{"title":"Nope"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn failing_id_rejects_mutations_but_keeps_item() {
    let db = Arc::new(AppState::default());
    let todo = db.seed(1, "stuck", false).await;
    db.fail_id(todo.id);

    let resp = app_with_state(db.clone())
        .oneshot(json_request("PATCH", &format!("/todos/{}", todo.id), r#"{"completed":true}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let resp = app_with_state(db.clone())
        .oneshot(empty_request("DELETE", &format!("/todos/{}", todo.id)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let remaining = db.snapshot().await;
    assert_eq!(remaining.len(), 1);
    assert!(!remaining[0].completed);
}

// --- delete ---

#[tokio::test]
async fn delete_todo_not_found() {
    let resp = app().oneshot(empty_request("DELETE", "/todos/42")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- full CRUD lifecycle ---

#[tokio::test]
async fn crud_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/todos", r#"{"title":"Walk dog","userId":3}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Todo = body_json(resp).await;
    assert_eq!(created.title, "Walk dog");
    assert!(!created.completed);
    let id = created.id;

    // list: should contain the one todo
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/todos?userId=3"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let todos: Vec<Todo> = body_json(resp).await;
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].id, id);

    // update, partial: only completed
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("PATCH", &format!("/todos/{id}"), r#"{"completed":true}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Todo = body_json(resp).await;
    assert_eq!(updated.title, "Walk dog");
    assert!(updated.completed);

    // update, partial: only title
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("PATCH", &format!("/todos/{id}"), r#"{"title":"Walk cat"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Todo = body_json(resp).await;
    assert_eq!(updated.title, "Walk cat");
    assert!(updated.completed);

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", &format!("/todos/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let body = body_bytes(resp).await;
    assert!(body.is_empty());

    // delete again: 404
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", &format!("/todos/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // list after delete: empty
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/todos?userId=3"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let todos: Vec<Todo> = body_json(resp).await;
    assert!(todos.is_empty());
}
