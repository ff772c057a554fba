//! Stateless HTTP request builder and response parser for the todo collection.
//!
//! # Design
//! `TodoClient` holds only a `base_url` and the owner id the collection is
//! keyed by. Each CRUD operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The caller executes the actual HTTP round-trip.
//!
//! Any 2xx status counts as success.

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateTodo, Todo, TodoId, UpdateTodo};

/// Synchronous, stateless client for one owner's todo collection.
#[derive(Debug, Clone)]
pub struct TodoClient {
    base_url: String,
    user_id: u64,
}

impl TodoClient {
    pub fn new(base_url: &str, user_id: u64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id,
        }
    }

    pub fn user_id(&self) -> u64 {
        self.user_id
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/todos?userId={}", self.base_url, self.user_id),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/todos", self.base_url),
            headers: json_headers(),
            body: Some(body),
        })
    }

    pub fn build_update_todo(&self, id: TodoId, input: &UpdateTodo) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Patch,
            path: format!("{}/todos/{id}", self.base_url),
            headers: json_headers(),
            body: Some(body),
        })
    }

    pub fn build_delete_todo(&self, id: TodoId) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: format!("{}/todos/{id}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        parse_json(response)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_json(response)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        parse_json(response)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }
}

fn json_headers() -> Vec<(String, String)> {
    vec![("content-type".to_string(), "application/json".to_string())]
}

fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::Http {
        status: response.status,
        body: response.body.clone(),
    })
}
