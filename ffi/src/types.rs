//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! tagged enums with explicit discriminants. Conversion functions live here
//! to keep `lib.rs` focused on the `extern "C"` surface.
//!
//! Values coming *from* C that select a variant (filters) are plain integers,
//! since an out-of-range discriminant in a Rust enum is undefined behaviour.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use todo_store::{Command, ErrorKind, Filter, HttpMethod, HttpRequest, Todo, TodoStore};

/// Opaque handle to a `TodoStore`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiTodoStore {
    pub(crate) inner: TodoStore,
}

/// Outcome of a store call.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiStatus {
    Ok = 0,
    NullArg = 1,
    InvalidArg = 2,
    UnknownTicket = 3,
    Panic = 4,
}

/// Allocate a C string. Interior NULs are dropped rather than failing.
pub(crate) fn to_c_string(s: impl Into<String>) -> *mut c_char {
    let mut s: String = s.into();
    s.retain(|c| c != '\0');
    CString::new(s).unwrap_or_default().into_raw()
}

/// Borrow a caller-owned C string. `None` for null or invalid UTF-8.
pub(crate) fn read_c_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

pub(crate) fn free_c_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(unsafe { CString::from_raw(ptr) });
    }
}

pub(crate) fn filter_from_raw(raw: u32) -> Option<Filter> {
    match raw {
        0 => Some(Filter::All),
        1 => Some(Filter::Active),
        2 => Some(Filter::Completed),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Patch = 2,
    Delete = 3,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Patch => FfiHttpMethod::Patch,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub path: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let path = to_c_string(req.path);
        let body = match req.body {
            Some(b) => to_c_string(b),
            None => std::ptr::null_mut(),
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: to_c_string(k),
                    value: to_c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            path,
            headers,
            headers_len,
            body,
        }))
    }

    /// Release a request built by `from_core`.
    pub(crate) fn free(req: *mut Self) {
        if req.is_null() {
            return;
        }
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.path);
        free_c_string(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing a request, then
/// passes a pointer to `todo_store_settle`. The FFI layer reads but does not
/// free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Tag that says which `FfiCommand` fields are meaningful.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiCommandTag {
    /// Execute `request`, then call `todo_store_settle(ticket, ..)`.
    Send = 0,
    /// Call `todo_store_expire_error(timer)` after `delay_ms`.
    ScheduleErrorClear = 1,
    /// `timer` is void.
    CancelErrorClear = 2,
    /// Focus the new-todo input.
    FocusInput = 3,
}

#[repr(C)]
pub struct FfiCommand {
    pub tag: FfiCommandTag,
    pub ticket: u64,
    /// Null unless `tag` is `Send`.
    pub request: *mut FfiHttpRequest,
    pub timer: u64,
    pub delay_ms: u64,
}

impl FfiCommand {
    pub(crate) fn from_core(command: Command) -> *mut Self {
        let mut ffi = FfiCommand {
            tag: FfiCommandTag::FocusInput,
            ticket: 0,
            request: std::ptr::null_mut(),
            timer: 0,
            delay_ms: 0,
        };
        match command {
            Command::Send { ticket, request } => {
                ffi.tag = FfiCommandTag::Send;
                ffi.ticket = ticket.raw();
                ffi.request = FfiHttpRequest::from_core(request);
            }
            Command::ScheduleErrorClear { timer, after } => {
                ffi.tag = FfiCommandTag::ScheduleErrorClear;
                ffi.timer = timer.raw();
                ffi.delay_ms = u64::try_from(after.as_millis()).unwrap_or(u64::MAX);
            }
            Command::CancelErrorClear { timer } => {
                ffi.tag = FfiCommandTag::CancelErrorClear;
                ffi.timer = timer.raw();
            }
            Command::FocusInput => {}
        }
        Box::into_raw(Box::new(ffi))
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// User-facing error classification; `None` when no notice is shown.
#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiErrorKind {
    None = 0,
    Load = 1,
    Add = 2,
    Update = 3,
    Delete = 4,
    EmptyTitle = 5,
}

impl From<Option<ErrorKind>> for FfiErrorKind {
    fn from(kind: Option<ErrorKind>) -> Self {
        match kind {
            None => FfiErrorKind::None,
            Some(ErrorKind::Load) => FfiErrorKind::Load,
            Some(ErrorKind::Add) => FfiErrorKind::Add,
            Some(ErrorKind::Update) => FfiErrorKind::Update,
            Some(ErrorKind::Delete) => FfiErrorKind::Delete,
            Some(ErrorKind::EmptyTitle) => FfiErrorKind::EmptyTitle,
        }
    }
}

/// A single todo item exposed to C.
#[repr(C)]
pub struct FfiTodo {
    pub id: u64,
    pub title: *mut c_char,
    pub completed: bool,
    /// A request for this item is in flight.
    pub pending: bool,
}

impl FfiTodo {
    fn new(todo: &Todo, pending: bool) -> Self {
        FfiTodo {
            id: todo.id,
            title: to_c_string(todo.title.as_str()),
            completed: todo.completed,
            pending,
        }
    }
}

/// A list of todo items exposed to C.
#[repr(C)]
pub struct FfiTodoList {
    pub items: *mut FfiTodo,
    pub len: u32,
}

/// Everything the presentation layer renders, captured at one moment.
///
/// `filter` is 0 All, 1 Active, 2 Completed. `editing_id` is 0 when no item
/// is being edited, in which case `edit_draft` is null.
#[repr(C)]
pub struct FfiSnapshot {
    pub visible: FfiTodoList,
    /// Null unless a create is in flight.
    pub placeholder: *mut FfiTodo,
    pub filter: u32,
    pub error_kind: FfiErrorKind,
    /// Null when `error_kind` is `None`.
    pub error_message: *mut c_char,
    pub total_count: u32,
    pub active_count: u32,
    pub completed_count: u32,
    pub all_completed: bool,
    pub can_submit: bool,
    pub draft: *mut c_char,
    pub editing_id: u64,
    pub edit_draft: *mut c_char,
}

impl FfiSnapshot {
    pub(crate) fn capture(store: &TodoStore) -> *mut Self {
        let visible: Box<[FfiTodo]> = store
            .visible()
            .into_iter()
            .map(|todo| FfiTodo::new(todo, store.is_pending(todo.id)))
            .collect();
        let len = visible.len() as u32;
        let items = if visible.is_empty() {
            std::ptr::null_mut()
        } else {
            Box::into_raw(visible) as *mut FfiTodo
        };

        let placeholder = match store.placeholder() {
            Some(todo) => Box::into_raw(Box::new(FfiTodo::new(todo, true))),
            None => std::ptr::null_mut(),
        };
        let error = store.error();
        let error_message = match error {
            Some(kind) => to_c_string(kind.to_string()),
            None => std::ptr::null_mut(),
        };
        let (editing_id, edit_draft) = match store.editing() {
            Some(edit) => (edit.id, to_c_string(edit.draft.as_str())),
            None => (0, std::ptr::null_mut()),
        };
        let filter = match store.filter() {
            Filter::All => 0,
            Filter::Active => 1,
            Filter::Completed => 2,
        };

        Box::into_raw(Box::new(FfiSnapshot {
            visible: FfiTodoList { items, len },
            placeholder,
            filter,
            error_kind: error.into(),
            error_message,
            total_count: store.todos().len() as u32,
            active_count: store.active_count() as u32,
            completed_count: store.completed_count() as u32,
            all_completed: store.all_completed(),
            can_submit: store.can_submit(),
            draft: to_c_string(store.draft()),
            editing_id,
            edit_draft,
        }))
    }

    pub(crate) fn free(snapshot: *mut Self) {
        if snapshot.is_null() {
            return;
        }
        let snapshot = unsafe { Box::from_raw(snapshot) };
        if !snapshot.visible.items.is_null() && snapshot.visible.len > 0 {
            let items = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    snapshot.visible.items,
                    snapshot.visible.len as usize,
                ))
            };
            for item in items.iter() {
                free_c_string(item.title);
            }
        }
        if !snapshot.placeholder.is_null() {
            let placeholder = unsafe { Box::from_raw(snapshot.placeholder) };
            free_c_string(placeholder.title);
        }
        free_c_string(snapshot.error_message);
        free_c_string(snapshot.draft);
        free_c_string(snapshot.edit_draft);
    }
}
