//! Domain DTOs for the todo collection.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Field names follow the remote API's camelCase (`userId`). Integration tests
//! catch any schema drift between the two crates.

use serde::{Deserialize, Serialize};

/// Identifier assigned by the remote store. `PLACEHOLDER_ID` is never
/// assigned to a persisted item.
pub type TodoId = u64;

/// Id carried by the locally synthesized item shown while a create is in
/// flight.
pub const PLACEHOLDER_ID: TodoId = 0;

/// A single todo item returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub user_id: u64,
    pub title: String,
    pub completed: bool,
}

impl Todo {
    /// The not-yet-persisted item rendered while its create request runs.
    pub fn placeholder(user_id: u64, title: String) -> Self {
        Self {
            id: PLACEHOLDER_ID,
            user_id,
            title,
            completed: false,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.id == PLACEHOLDER_ID
    }
}

/// Request payload for creating a new todo.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    pub title: String,
    pub user_id: u64,
    #[serde(default)]
    pub completed: bool,
}

/// Request payload for updating an existing todo. Only the fields present in
/// the JSON are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTodo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl UpdateTodo {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            completed: None,
        }
    }

    pub fn completed(completed: bool) -> Self {
        Self {
            title: None,
            completed: Some(completed),
        }
    }
}

/// Collapse whitespace runs to a single space and trim both ends.
pub fn normalize_title(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
