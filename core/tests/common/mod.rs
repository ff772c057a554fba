//! Shared harness for tests that drive a `TodoStore` over real HTTP.
//!
//! The harness plays the host's part: it executes `Command::Send` requests
//! with ureq and settles them, and records every other command so tests can
//! assert on timers and focus requests.

#![allow(dead_code)]

use std::sync::Arc;

use mock_server::{AppState, Db, Todo as ServerTodo};
use todo_store::{ApiError, Command, HttpMethod, HttpRequest, HttpResponse, TodoStore};

/// Start the mock server on a random port. Returns its base URL and state.
pub fn start_server() -> (String, Db) {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    let db: Db = Arc::new(AppState::default());
    let server_db = db.clone();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run_with_state(listener, server_db).await
        })
        .unwrap();
    });

    (format!("http://{addr}"), db)
}

/// Run an async server-state call from a synchronous test.
pub fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

pub fn seed(db: &Db, user_id: u64, title: &str, completed: bool) -> ServerTodo {
    block_on(db.seed(user_id, title, completed))
}

/// Execute an `HttpRequest` using ureq.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data, letting the core interpret the status.
pub fn execute(req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let body = req.body.unwrap_or_default();
    let result = match req.method {
        HttpMethod::Get => agent.get(&req.path).call(),
        HttpMethod::Delete => agent.delete(&req.path).call(),
        HttpMethod::Post => agent
            .post(&req.path)
            .content_type("application/json")
            .send(body.as_bytes()),
        HttpMethod::Patch => agent
            .patch(&req.path)
            .content_type("application/json")
            .send(body.as_bytes()),
    };
    let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();
    Ok(HttpResponse::new(status, body))
}

/// Perform queued commands until the store is idle. Requests run one at a
/// time in dispatch order. Returns every non-request command seen.
pub fn pump(store: &mut TodoStore) -> Vec<Command> {
    let mut observed = Vec::new();
    while let Some(command) = store.next_command() {
        match command {
            Command::Send { ticket, request } => {
                store.settle(ticket, execute(request)).unwrap();
            }
            other => observed.push(other),
        }
    }
    observed
}
