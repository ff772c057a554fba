//! C-ABI wrapper around `todo-store`.
//!
//! # Overview
//! Exposes the todo controller through `extern "C"` functions so any UI
//! written against a C FFI can drive it. The host owns the event loop: it
//! calls an intent, drains commands with `todo_store_next_command`, performs
//! the HTTP requests and timers they describe, and reports back with
//! `todo_store_settle` / `todo_store_expire_error`. Rendering reads a
//! `FfiSnapshot`.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Intents return an `FfiStatus`; remote failures are not statuses, they
//!   surface through the snapshot's error fields.
//! - The C caller owns all returned pointers and must call the matching
//!   `todo_free_*` function to release them.

pub mod types;

use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use todo_store::{ApiError, ErrorTimer, HttpResponse, StoreConfig, Ticket, TodoStore};

use types::*;

/// Run `f` against the store behind `store`, mapping null and panics to a status.
fn with_store(store: *mut FfiTodoStore, f: impl FnOnce(&mut TodoStore) -> FfiStatus) -> FfiStatus {
    if store.is_null() {
        return FfiStatus::NullArg;
    }
    catch_unwind(AssertUnwindSafe(|| {
        let store = unsafe { &mut *store };
        f(&mut store.inner)
    }))
    .unwrap_or(FfiStatus::Panic)
}

/// Run a text intent; `text` must be non-null UTF-8.
fn with_text(
    store: *mut FfiTodoStore,
    text: *const c_char,
    f: impl FnOnce(&mut TodoStore, &str),
) -> FfiStatus {
    if text.is_null() {
        return FfiStatus::NullArg;
    }
    with_store(store, |inner| match read_c_str(text) {
        Some(text) => {
            f(inner, text);
            FfiStatus::Ok
        }
        None => FfiStatus::InvalidArg,
    })
}

// ---------------------------------------------------------------------------
// Store lifecycle
// ---------------------------------------------------------------------------

/// Create a store that talks to `base_url` on behalf of `user_id`.
///
/// Returns null if `base_url` is null or not UTF-8.
/// The caller must free the returned pointer with `todo_store_free`.
#[unsafe(no_mangle)]
pub extern "C" fn todo_store_new(base_url: *const c_char, user_id: u64) -> *mut FfiTodoStore {
    catch_unwind(|| {
        let Some(url) = read_c_str(base_url) else {
            return std::ptr::null_mut();
        };
        let inner = TodoStore::new(&StoreConfig::new(url, user_id));
        Box::into_raw(Box::new(FfiTodoStore { inner }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Create a store configured from `TODO_API_URL`, `TODO_USER_ID` and
/// `TODO_ERROR_TIMEOUT_MS`.
///
/// Returns null if any of them is set to an unparsable value.
#[unsafe(no_mangle)]
pub extern "C" fn todo_store_from_env() -> *mut FfiTodoStore {
    catch_unwind(|| match StoreConfig::from_env() {
        Ok(config) => Box::into_raw(Box::new(FfiTodoStore {
            inner: TodoStore::new(&config),
        })),
        Err(_) => std::ptr::null_mut(),
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a store created by `todo_store_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn todo_store_free(store: *mut FfiTodoStore) {
    if !store.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(store) });
        });
    }
}

// ---------------------------------------------------------------------------
// Intents
// ---------------------------------------------------------------------------

#[unsafe(no_mangle)]
pub extern "C" fn todo_store_load(store: *mut FfiTodoStore) -> FfiStatus {
    with_store(store, |inner| {
        inner.load();
        FfiStatus::Ok
    })
}

/// Replace the new-todo draft with `text`.
#[unsafe(no_mangle)]
pub extern "C" fn todo_store_set_draft(store: *mut FfiTodoStore, text: *const c_char) -> FfiStatus {
    with_text(store, text, |inner, text| inner.set_draft(text))
}

#[unsafe(no_mangle)]
pub extern "C" fn todo_store_submit_draft(store: *mut FfiTodoStore) -> FfiStatus {
    with_store(store, |inner| {
        inner.submit_draft();
        FfiStatus::Ok
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn todo_store_toggle(store: *mut FfiTodoStore, id: u64, completed: bool) -> FfiStatus {
    with_store(store, |inner| {
        inner.toggle(id, completed);
        FfiStatus::Ok
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn todo_store_toggle_all(store: *mut FfiTodoStore) -> FfiStatus {
    with_store(store, |inner| {
        inner.toggle_all();
        FfiStatus::Ok
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn todo_store_start_edit(store: *mut FfiTodoStore, id: u64) -> FfiStatus {
    with_store(store, |inner| {
        inner.start_edit(id);
        FfiStatus::Ok
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn todo_store_set_edit_draft(
    store: *mut FfiTodoStore,
    text: *const c_char,
) -> FfiStatus {
    with_text(store, text, |inner, text| inner.set_edit_draft(text))
}

#[unsafe(no_mangle)]
pub extern "C" fn todo_store_cancel_edit(store: *mut FfiTodoStore) -> FfiStatus {
    with_store(store, |inner| {
        inner.cancel_edit();
        FfiStatus::Ok
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn todo_store_submit_edit(store: *mut FfiTodoStore) -> FfiStatus {
    with_store(store, |inner| {
        inner.submit_edit();
        FfiStatus::Ok
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn todo_store_delete(store: *mut FfiTodoStore, id: u64) -> FfiStatus {
    with_store(store, |inner| {
        inner.delete(id);
        FfiStatus::Ok
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn todo_store_clear_completed(store: *mut FfiTodoStore) -> FfiStatus {
    with_store(store, |inner| {
        inner.clear_completed();
        FfiStatus::Ok
    })
}

/// `filter`: 0 All, 1 Active, 2 Completed. Anything else is `InvalidArg`.
#[unsafe(no_mangle)]
pub extern "C" fn todo_store_set_filter(store: *mut FfiTodoStore, filter: u32) -> FfiStatus {
    with_store(store, |inner| match filter_from_raw(filter) {
        Some(filter) => {
            inner.set_filter(filter);
            FfiStatus::Ok
        }
        None => FfiStatus::InvalidArg,
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn todo_store_dismiss_error(store: *mut FfiTodoStore) -> FfiStatus {
    with_store(store, |inner| {
        inner.dismiss_error();
        FfiStatus::Ok
    })
}

// ---------------------------------------------------------------------------
// Host callbacks
// ---------------------------------------------------------------------------

/// Pop the next command, or null when there is nothing to do.
///
/// The caller must free the returned pointer with `todo_free_command`.
#[unsafe(no_mangle)]
pub extern "C" fn todo_store_next_command(store: *mut FfiTodoStore) -> *mut FfiCommand {
    if store.is_null() {
        return std::ptr::null_mut();
    }
    catch_unwind(AssertUnwindSafe(|| {
        let store = unsafe { &mut *store };
        match store.inner.next_command() {
            Some(command) => FfiCommand::from_core(command),
            None => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Report the response to the request carried by a `Send` command.
///
/// Any status is accepted here; non-2xx responses become user-facing errors.
/// A null `body` is treated as empty. A body that is not UTF-8 is rejected
/// with `InvalidArg` and the ticket stays in flight.
#[unsafe(no_mangle)]
pub extern "C" fn todo_store_settle(
    store: *mut FfiTodoStore,
    ticket: u64,
    response: *const FfiHttpResponse,
) -> FfiStatus {
    if response.is_null() {
        return FfiStatus::NullArg;
    }
    with_store(store, |inner| {
        let response = unsafe { &*response };
        let body = if response.body.is_null() {
            ""
        } else {
            match read_c_str(response.body) {
                Some(body) => body,
                None => return FfiStatus::InvalidArg,
            }
        };
        let outcome = Ok(HttpResponse::new(response.status, body));
        settle(inner, ticket, outcome)
    })
}

/// Report that the request for `ticket` never produced a response.
/// `message` may be null.
#[unsafe(no_mangle)]
pub extern "C" fn todo_store_settle_failed(
    store: *mut FfiTodoStore,
    ticket: u64,
    message: *const c_char,
) -> FfiStatus {
    with_store(store, |inner| {
        let message = read_c_str(message).unwrap_or("transport failure");
        settle(inner, ticket, Err(ApiError::Transport(message.to_string())))
    })
}

fn settle(
    inner: &mut TodoStore,
    ticket: u64,
    outcome: Result<HttpResponse, ApiError>,
) -> FfiStatus {
    match inner.settle(Ticket::from_raw(ticket), outcome) {
        Ok(()) => FfiStatus::Ok,
        Err(_) => FfiStatus::UnknownTicket,
    }
}

/// Fire the auto-clear timer `timer`. `cleared`, when non-null, receives
/// whether the notice was actually removed.
#[unsafe(no_mangle)]
pub extern "C" fn todo_store_expire_error(
    store: *mut FfiTodoStore,
    timer: u64,
    cleared: *mut bool,
) -> FfiStatus {
    with_store(store, |inner| {
        let removed = inner.expire_error(ErrorTimer::from_raw(timer));
        if !cleared.is_null() {
            unsafe { *cleared = removed };
        }
        FfiStatus::Ok
    })
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Capture everything needed to render the current state.
///
/// Returns null if `store` is null.
/// The caller must free the returned pointer with `todo_free_snapshot`.
#[unsafe(no_mangle)]
pub extern "C" fn todo_store_snapshot(store: *const FfiTodoStore) -> *mut FfiSnapshot {
    if store.is_null() {
        return std::ptr::null_mut();
    }
    catch_unwind(AssertUnwindSafe(|| {
        let store = unsafe { &*store };
        FfiSnapshot::capture(&store.inner)
    }))
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a command returned by `todo_store_next_command`, including its
/// request. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn todo_free_command(command: *mut FfiCommand) {
    if command.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let command = unsafe { Box::from_raw(command) };
        FfiHttpRequest::free(command.request);
    });
}

/// Free a snapshot returned by `todo_store_snapshot`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn todo_free_snapshot(snapshot: *mut FfiSnapshot) {
    if snapshot.is_null() {
        return;
    }
    let _ = catch_unwind(|| FfiSnapshot::free(snapshot));
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
