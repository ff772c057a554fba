use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex,
    },
};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: u64,
    pub user_id: u64,
    pub title: String,
    pub completed: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    pub title: String,
    pub user_id: u64,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Deserialize)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub user_id: Option<u64>,
}

/// Shared server state: the collection plus switches that make selected
/// requests fail with 500.
pub struct AppState {
    todos: RwLock<Vec<Todo>>,
    next_id: AtomicU64,
    fail_list: AtomicBool,
    fail_create: AtomicBool,
    failing_ids: Mutex<HashSet<u64>>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            todos: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            fail_list: AtomicBool::new(false),
            fail_create: AtomicBool::new(false),
            failing_ids: Mutex::new(HashSet::new()),
        }
    }
}

impl AppState {
    pub fn fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    /// Make every PATCH and DELETE for `id` fail.
    pub fn fail_id(&self, id: u64) {
        self.failing_ids.lock().unwrap_or_else(|e| e.into_inner()).insert(id);
    }

    pub async fn seed(&self, user_id: u64, title: &str, completed: bool) -> Todo {
        let todo = Todo {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            user_id,
            title: title.to_string(),
            completed,
        };
        self.todos.write().await.push(todo.clone());
        todo
    }

    pub async fn snapshot(&self) -> Vec<Todo> {
        self.todos.read().await.clone()
    }

    fn is_failing(&self, id: u64) -> bool {
        self.failing_ids.lock().unwrap_or_else(|e| e.into_inner()).contains(&id)
    }
}

pub type Db = Arc<AppState>;

pub fn app() -> Router {
    app_with_state(Db::default())
}

pub fn app_with_state(db: Db) -> Router {
    Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", patch(update_todo).delete(delete_todo))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_state(listener, Db::default()).await
}

pub async fn run_with_state(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(db)).await
}

async fn list_todos(
    State(db): State<Db>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Todo>>, StatusCode> {
    if db.fail_list.load(Ordering::SeqCst) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    let todos = db.todos.read().await;
    let owned = todos
        .iter()
        .filter(|todo| query.user_id.is_none_or(|user_id| todo.user_id == user_id))
        .cloned()
        .collect();
    Ok(Json(owned))
}

async fn create_todo(
    State(db): State<Db>,
    Json(input): Json<CreateTodo>,
) -> Result<(StatusCode, Json<Todo>), StatusCode> {
    if db.fail_create.load(Ordering::SeqCst) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    let todo = db.seed(input.user_id, &input.title, input.completed).await;
    tracing::debug!(id = todo.id, "created todo");
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn update_todo(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<UpdateTodo>,
) -> Result<Json<Todo>, StatusCode> {
    if db.is_failing(id) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    let mut todos = db.todos.write().await;
    let todo = todos
        .iter_mut()
        .find(|todo| todo.id == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    if let Some(title) = input.title {
        todo.title = title;
    }
    if let Some(completed) = input.completed {
        todo.completed = completed;
    }
    Ok(Json(todo.clone()))
}

async fn delete_todo(State(db): State<Db>, Path(id): Path<u64>) -> Result<StatusCode, StatusCode> {
    if db.is_failing(id) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    let mut todos = db.todos.write().await;
    let before = todos.len();
    todos.retain(|todo| todo.id != id);
    if todos.len() == before {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(StatusCode::NO_CONTENT)
}
