//! The todo list controller.
//!
//! # Design
//! `TodoStore` owns the canonical list and everything the presentation layer
//! reads from it. It performs no I/O: each remote call is queued as a
//! `Command::Send` tagged with a `Ticket`, and the host reports the outcome
//! through `settle`. Error auto-clear timers and focus requests travel
//! through the same queue. Every mutation takes `&mut self`, so completions
//! interleave in whatever order the host delivers them but never overlap.
//!
//! No local state is changed ahead of a server response. A failed request
//! leaves the list as it was and only surfaces an `ErrorKind`.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::time::Duration;

use tracing::{debug, warn};

use crate::client::TodoClient;
use crate::config::StoreConfig;
use crate::error::{ApiError, ErrorKind, StoreError};
use crate::filter::Filter;
use crate::http::{HttpRequest, HttpResponse};
use crate::notice::{ErrorSlot, ErrorTimer};
use crate::pending::PendingSet;
use crate::types::{normalize_title, CreateTodo, Todo, TodoId, UpdateTodo};

/// Correlates a dispatched request with its outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Work the host must perform on the store's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Execute `request` and report the outcome with `TodoStore::settle`.
    Send { ticket: Ticket, request: HttpRequest },
    /// Call `TodoStore::expire_error(timer)` once `after` has elapsed.
    ScheduleErrorClear { timer: ErrorTimer, after: Duration },
    /// `timer` can no longer clear anything and may be dropped.
    CancelErrorClear { timer: ErrorTimer },
    /// Move input focus to the new-todo field.
    FocusInput,
}

/// The item whose title is being edited, with the text typed so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditState {
    pub id: TodoId,
    pub draft: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct BatchId(u64);

#[derive(Debug, Clone, Copy)]
enum Operation {
    Load,
    Create,
    Toggle { id: TodoId },
    Rename { id: TodoId, session: u64 },
    Delete { id: TodoId, batch: Option<BatchId> },
}

impl Operation {
    fn name(&self) -> &'static str {
        match self {
            Operation::Load => "load",
            Operation::Create => "create",
            Operation::Toggle { .. } => "toggle",
            Operation::Rename { .. } => "rename",
            Operation::Delete { .. } => "delete",
        }
    }
}

#[derive(Debug)]
pub struct TodoStore {
    client: TodoClient,
    error_timeout: Duration,
    todos: Vec<Todo>,
    filter: Filter,
    draft: String,
    placeholder: Option<Todo>,
    editing: Option<EditState>,
    pending: PendingSet,
    error: ErrorSlot,
    in_flight: HashMap<Ticket, Operation>,
    // Clear-completed deletes still outstanding, per batch.
    batches: HashMap<BatchId, usize>,
    next_ticket: u64,
    next_batch: u64,
    // Bumped by every `start_edit`; a rename only closes the session it came from.
    edit_session: u64,
    outbox: VecDeque<Command>,
}

impl TodoStore {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            client: TodoClient::new(&config.base_url, config.user_id),
            error_timeout: config.error_timeout,
            todos: Vec::new(),
            filter: Filter::default(),
            draft: String::new(),
            placeholder: None,
            editing: None,
            pending: PendingSet::default(),
            error: ErrorSlot::default(),
            in_flight: HashMap::new(),
            batches: HashMap::new(),
            next_ticket: 1,
            next_batch: 1,
            edit_session: 0,
            outbox: VecDeque::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// The canonical list, in server order followed by local creations.
    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    /// The canonical list restricted by the current filter.
    pub fn visible(&self) -> Vec<&Todo> {
        self.filter.project(&self.todos)
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    /// The unsaved item shown while a create request is in flight.
    pub fn placeholder(&self) -> Option<&Todo> {
        self.placeholder.as_ref()
    }

    pub fn is_pending(&self, id: TodoId) -> bool {
        self.pending.contains(id)
    }

    pub fn pending(&self) -> &PendingSet {
        &self.pending
    }

    pub fn error(&self) -> Option<ErrorKind> {
        self.error.current()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn editing(&self) -> Option<&EditState> {
        self.editing.as_ref()
    }

    /// Whether a new title may be submitted. Only one create runs at a time.
    pub fn can_submit(&self) -> bool {
        self.placeholder.is_none()
    }

    pub fn active_count(&self) -> usize {
        self.todos.iter().filter(|todo| !todo.completed).count()
    }

    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|todo| todo.completed).count()
    }

    /// True when no item is still active. Vacuously true for an empty list.
    pub fn all_completed(&self) -> bool {
        self.todos.iter().all(|todo| todo.completed)
    }

    pub fn has_completed(&self) -> bool {
        self.todos.iter().any(|todo| todo.completed)
    }

    /// Number of requests dispatched but not yet settled.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    // -----------------------------------------------------------------------
    // Command queue
    // -----------------------------------------------------------------------

    pub fn next_command(&mut self) -> Option<Command> {
        self.outbox.pop_front()
    }

    pub fn take_commands(&mut self) -> Vec<Command> {
        self.outbox.drain(..).collect()
    }

    // -----------------------------------------------------------------------
    // Intents
    // -----------------------------------------------------------------------

    /// Fetch the owner's full list, replacing the local one on success.
    pub fn load(&mut self) {
        let request = self.client.build_list_todos();
        self.dispatch(Operation::Load, request);
    }

    pub fn set_draft(&mut self, text: &str) {
        self.draft = text.to_string();
    }

    /// Create a todo from the draft text.
    pub fn submit_draft(&mut self) {
        if self.placeholder.is_some() {
            debug!("create already in flight, submit ignored");
            return;
        }
        let title = normalize_title(&self.draft);
        if title.is_empty() {
            self.show_error(ErrorKind::EmptyTitle);
            return;
        }
        let input = CreateTodo {
            title,
            user_id: self.client.user_id(),
            completed: false,
        };
        match self.client.build_create_todo(&input) {
            Ok(request) => {
                self.placeholder = Some(Todo::placeholder(input.user_id, input.title));
                self.dispatch(Operation::Create, request);
            }
            Err(err) => self.fail(ErrorKind::Add, &err),
        }
    }

    /// Ask the server to set `completed` on one item.
    pub fn toggle(&mut self, id: TodoId, completed: bool) {
        if !self.contains(id) {
            debug!(id, "toggle of unknown todo ignored");
            return;
        }
        self.dispatch_update(Operation::Toggle { id }, id, &UpdateTodo::completed(completed));
    }

    /// Complete every active item, or reactivate everything if none is active.
    pub fn toggle_all(&mut self) {
        let target = !self.all_completed();
        let ids: Vec<TodoId> = self
            .todos
            .iter()
            .filter(|todo| todo.completed != target)
            .map(|todo| todo.id)
            .collect();
        for id in ids {
            self.toggle(id, target);
        }
    }

    pub fn start_edit(&mut self, id: TodoId) {
        match self.todos.iter().find(|todo| todo.id == id) {
            Some(todo) => {
                self.edit_session += 1;
                self.editing = Some(EditState {
                    id,
                    draft: todo.title.clone(),
                })
            }
            None => debug!(id, "edit of unknown todo ignored"),
        }
    }

    pub fn set_edit_draft(&mut self, text: &str) {
        if let Some(edit) = self.editing.as_mut() {
            edit.draft = text.to_string();
        }
    }

    /// Leave edit mode without touching the server.
    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Submit the edit draft. An unchanged title just leaves edit mode; an
    /// empty one deletes the item.
    pub fn submit_edit(&mut self) {
        let Some(edit) = &self.editing else {
            return;
        };
        let id = edit.id;
        if self.pending.contains(id) {
            debug!(id, "request for edited todo in flight, submit ignored");
            return;
        }
        let title = normalize_title(&edit.draft);
        let unchanged = match self.todos.iter().find(|todo| todo.id == id) {
            Some(todo) => todo.title == title,
            None => {
                self.editing = None;
                return;
            }
        };
        if unchanged {
            self.editing = None;
        } else if title.is_empty() {
            self.delete(id);
        } else {
            let session = self.edit_session;
            self.dispatch_update(Operation::Rename { id, session }, id, &UpdateTodo::title(title));
        }
    }

    pub fn delete(&mut self, id: TodoId) {
        if !self.contains(id) {
            debug!(id, "delete of unknown todo ignored");
            return;
        }
        self.dispatch_delete(id, None);
    }

    /// Delete every completed item concurrently. Focus is requested once all
    /// of them have settled.
    pub fn clear_completed(&mut self) {
        let ids: Vec<TodoId> = self
            .todos
            .iter()
            .filter(|todo| todo.completed)
            .map(|todo| todo.id)
            .collect();
        if ids.is_empty() {
            self.outbox.push_back(Command::FocusInput);
            return;
        }
        let batch = BatchId(self.next_batch);
        self.next_batch += 1;
        self.batches.insert(batch, ids.len());
        for id in ids {
            self.dispatch_delete(id, Some(batch));
        }
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    pub fn dismiss_error(&mut self) {
        if let Some(timer) = self.error.dismiss() {
            self.outbox.push_back(Command::CancelErrorClear { timer });
        }
    }

    /// Auto-clear callback. Returns whether the error was actually cleared.
    pub fn expire_error(&mut self, timer: ErrorTimer) -> bool {
        let cleared = self.error.expire(timer);
        if !cleared {
            debug!(%timer, "stale error timer ignored");
        }
        cleared
    }

    // -----------------------------------------------------------------------
    // Completions
    // -----------------------------------------------------------------------

    /// Apply the outcome of the request identified by `ticket`.
    ///
    /// Remote failures never escape: they are mapped onto an `ErrorKind` and
    /// shown. Only a ticket the store never issued (or already settled) is
    /// reported back to the host.
    pub fn settle(
        &mut self,
        ticket: Ticket,
        outcome: Result<HttpResponse, ApiError>,
    ) -> Result<(), StoreError> {
        let Some(operation) = self.in_flight.remove(&ticket) else {
            warn!(%ticket, "settle for unknown ticket");
            return Err(StoreError::UnknownTicket(ticket));
        };
        debug!(%ticket, operation = operation.name(), ok = outcome.is_ok(), "request settled");
        match operation {
            Operation::Load => self.settle_load(outcome),
            Operation::Create => self.settle_create(outcome),
            Operation::Toggle { id } => self.settle_toggle(id, outcome),
            Operation::Rename { id, session } => self.settle_rename(id, session, outcome),
            Operation::Delete { id, batch } => self.settle_delete(id, batch, outcome),
        }
        Ok(())
    }

    fn settle_load(&mut self, outcome: Result<HttpResponse, ApiError>) {
        let parsed = outcome.and_then(|response| self.client.parse_list_todos(response));
        match parsed {
            Ok(todos) => {
                self.todos = todos;
                self.outbox.push_back(Command::FocusInput);
            }
            Err(err) => self.fail(ErrorKind::Load, &err),
        }
    }

    fn settle_create(&mut self, outcome: Result<HttpResponse, ApiError>) {
        self.placeholder = None;
        let parsed = outcome
            .and_then(|response| self.client.parse_create_todo(response))
            .and_then(|todo| {
                if todo.is_placeholder() {
                    return Err(ApiError::Deserialization(
                        "server returned an unassigned id".to_string(),
                    ));
                }
                Ok(todo)
            });
        match parsed {
            Ok(todo) => {
                match self.todos.iter_mut().find(|existing| existing.id == todo.id) {
                    Some(existing) => *existing = todo,
                    None => self.todos.push(todo),
                }
                self.draft.clear();
            }
            Err(err) => self.fail(ErrorKind::Add, &err),
        }
        self.outbox.push_back(Command::FocusInput);
    }

    fn settle_toggle(&mut self, id: TodoId, outcome: Result<HttpResponse, ApiError>) {
        self.pending.release(id);
        let parsed = outcome.and_then(|response| self.client.parse_update_todo(response));
        match parsed {
            Ok(todo) => self.replace(id, todo),
            Err(err) => self.fail(ErrorKind::Update, &err),
        }
    }

    fn settle_rename(
        &mut self,
        id: TodoId,
        session: u64,
        outcome: Result<HttpResponse, ApiError>,
    ) {
        self.pending.release(id);
        let parsed = outcome.and_then(|response| self.client.parse_update_todo(response));
        match parsed {
            Ok(todo) => {
                self.replace(id, todo);
                if session == self.edit_session {
                    self.finish_edit(id);
                }
            }
            // Edit mode stays open so the typed text survives for a retry.
            Err(err) => self.fail(ErrorKind::Update, &err),
        }
    }

    fn settle_delete(
        &mut self,
        id: TodoId,
        batch: Option<BatchId>,
        outcome: Result<HttpResponse, ApiError>,
    ) {
        self.pending.release(id);
        let parsed = outcome.and_then(|response| self.client.parse_delete_todo(response));
        match parsed {
            Ok(()) => {
                self.todos.retain(|todo| todo.id != id);
                self.finish_edit(id);
            }
            Err(err) => self.fail(ErrorKind::Delete, &err),
        }
        match batch {
            Some(batch) => self.finish_batch_member(batch),
            None => self.outbox.push_back(Command::FocusInput),
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn contains(&self, id: TodoId) -> bool {
        self.todos.iter().any(|todo| todo.id == id)
    }

    fn replace(&mut self, id: TodoId, todo: Todo) {
        if let Some(slot) = self.todos.iter_mut().find(|existing| existing.id == id) {
            *slot = todo;
        }
    }

    fn finish_edit(&mut self, id: TodoId) {
        if self.editing.as_ref().is_some_and(|edit| edit.id == id) {
            self.editing = None;
        }
    }

    fn finish_batch_member(&mut self, batch: BatchId) {
        let Some(remaining) = self.batches.get_mut(&batch) else {
            return;
        };
        *remaining -= 1;
        if *remaining == 0 {
            self.batches.remove(&batch);
            self.outbox.push_back(Command::FocusInput);
        }
    }

    fn dispatch(&mut self, operation: Operation, request: HttpRequest) {
        let ticket = Ticket(self.next_ticket);
        self.next_ticket += 1;
        debug!(
            %ticket,
            operation = operation.name(),
            method = request.method.as_str(),
            path = %request.path,
            "dispatching request"
        );
        self.in_flight.insert(ticket, operation);
        self.outbox.push_back(Command::Send { ticket, request });
    }

    fn dispatch_update(&mut self, operation: Operation, id: TodoId, patch: &UpdateTodo) {
        match self.client.build_update_todo(id, patch) {
            Ok(request) => {
                self.pending.acquire(id);
                self.dispatch(operation, request);
            }
            Err(err) => self.fail(ErrorKind::Update, &err),
        }
    }

    fn dispatch_delete(&mut self, id: TodoId, batch: Option<BatchId>) {
        let request = self.client.build_delete_todo(id);
        self.pending.acquire(id);
        self.dispatch(Operation::Delete { id, batch }, request);
    }

    fn fail(&mut self, kind: ErrorKind, err: &ApiError) {
        warn!(error = %err, kind = ?kind, "todo operation failed");
        self.show_error(kind);
    }

    fn show_error(&mut self, kind: ErrorKind) {
        let (timer, voided) = self.error.show(kind);
        if let Some(voided) = voided {
            self.outbox.push_back(Command::CancelErrorClear { timer: voided });
        }
        self.outbox.push_back(Command::ScheduleErrorClear {
            timer,
            after: self.error_timeout,
        });
    }
}
