//! Todo list controller kept in sync with a remote collection.
//!
//! # Overview
//! `TodoStore` owns the canonical list of one owner's todos and keeps it
//! consistent with a remote CRUD endpoint across any number of concurrent
//! add/update/delete requests. It tracks which items have a request in
//! flight, exposes the placeholder for a create that has not been confirmed
//! yet, and holds a single auto-expiring error notice.
//!
//! # Design
//! - Host-does-IO: the store emits `Command`s (HTTP requests, timer
//!   arm/cancel, focus requests) and the host feeds outcomes back with
//!   `TodoStore::settle` / `TodoStore::expire_error`.
//! - `TodoClient` is stateless and split into `build_*` / `parse_*`, so the
//!   I/O boundary is explicit.
//! - Filtered views are derived on every read from the single list.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod filter;
pub mod http;
pub mod notice;
pub mod pending;
pub mod store;
pub mod types;

pub use client::TodoClient;
pub use config::StoreConfig;
pub use error::{ApiError, ConfigError, ErrorKind, StoreError};
pub use filter::Filter;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use notice::ErrorTimer;
pub use pending::PendingSet;
pub use store::{Command, EditState, Ticket, TodoStore};
pub use types::{normalize_title, CreateTodo, Todo, TodoId, UpdateTodo, PLACEHOLDER_ID};
