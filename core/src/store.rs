//! Local mirror of the server's todo collection.
//!
//! # Design
//! `TodoStore` owns a single `Vec<Todo>` and mutates it only after a service
//! call resolves, with one replace/insert/remove per operation. The lock is
//! taken for the merge step only and never held across an await, so every
//! merge runs to completion relative to the others while calls themselves
//! overlap freely.
//!
//! Failures never escape as faults: each one is logged, turned into a
//! destructive notification, and returned as a `StoreError` the caller may
//! ignore. A failed call leaves the collection exactly as it was.
//!
//! Two mutations of the same record racing each other are merged according
//! to `ReconcilePolicy`. The default keeps whichever response lands last.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::{Config, ReconcilePolicy};
use crate::error::{ApiError, StoreError, ValidationError};
use crate::notify::{Notification, NotificationSink};
use crate::service::{HttpTodoService, TodoService};
use crate::types::{CreateTodo, EditDraft, Filter, Summary, Todo, UpdateTodo};

const MSG_TITLE_REQUIRED: &str = "Todo title is required";
const MSG_FETCH_FAILED: &str = "Failed to fetch todos";
const MSG_CREATED: &str = "Todo created successfully";
const MSG_CREATE_FAILED: &str = "Failed to create todo";
const MSG_UPDATED: &str = "Todo updated successfully";
const MSG_COMPLETED: &str = "Todo completed!";
const MSG_REOPENED: &str = "Todo marked as incomplete";
const MSG_UPDATE_FAILED: &str = "Failed to update todo";
const MSG_DELETED: &str = "Todo deleted successfully";
const MSG_DELETE_FAILED: &str = "Failed to delete todo";

pub struct TodoStore {
    service: Arc<dyn TodoService>,
    sink: Arc<dyn NotificationSink>,
    policy: ReconcilePolicy,
    todos: Mutex<Vec<Todo>>,
    /// Sequence of the newest merged response per record, only used by
    /// `LatestIssuedWins`. Always locked after `todos`.
    merged: Mutex<HashMap<Uuid, u64>>,
    next_seq: AtomicU64,
    attached: AtomicBool,
}

impl TodoStore {
    pub fn new(service: Arc<dyn TodoService>, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            service,
            sink,
            policy: ReconcilePolicy::default(),
            todos: Mutex::new(Vec::new()),
            merged: Mutex::new(HashMap::new()),
            next_seq: AtomicU64::new(1),
            attached: AtomicBool::new(true),
        }
    }

    /// Store backed by the HTTP service described by `config`.
    pub fn from_config(config: &Config, sink: Arc<dyn NotificationSink>) -> Result<Self, ApiError> {
        let service = HttpTodoService::new(config)?;
        Ok(Self::new(Arc::new(service), sink).with_policy(config.reconcile))
    }

    pub fn with_policy(mut self, policy: ReconcilePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ReconcilePolicy {
        self.policy
    }

    // ---------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------

    pub fn todos(&self) -> Vec<Todo> {
        self.todos.lock().clone()
    }

    pub fn get(&self, id: Uuid) -> Option<Todo> {
        self.todos.lock().iter().find(|t| t.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.todos.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.lock().is_empty()
    }

    pub fn summary(&self) -> Summary {
        Summary::of(&self.todos.lock())
    }

    pub fn filtered(&self, filter: Filter) -> Vec<Todo> {
        self.todos
            .lock()
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect()
    }

    // ---------------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------------

    /// Stop merging. Calls still in flight resolve to `StoreError::Detached`
    /// without touching the collection or notifying.
    pub fn detach(&self) {
        debug!("store detached");
        self.attached.store(false, Ordering::Release);
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    // ---------------------------------------------------------------------
    // Operations
    // ---------------------------------------------------------------------

    /// Replace the local collection with the server's.
    pub async fn load(&self) -> Result<usize, StoreError> {
        debug!("loading todos");
        match self.service.list().await {
            Ok(todos) => {
                self.ensure_attached()?;
                let count = todos.len();
                *self.todos.lock() = todos;
                debug!(count, "todos loaded");
                Ok(count)
            }
            Err(err) => self.fail(MSG_FETCH_FAILED, err),
        }
    }

    /// Create a todo and put the server's record first in the list.
    ///
    /// Nothing is inserted until the server confirms, since the id is
    /// server-assigned.
    #[tracing::instrument(skip(self, description))]
    pub async fn create(&self, title: &str, description: &str) -> Result<Todo, StoreError> {
        let input = CreateTodo::new(title, description);
        self.validate(input.validate())?;

        match self.service.create(&input).await {
            Ok(todo) => {
                self.ensure_attached()?;
                self.todos.lock().insert(0, todo.clone());
                debug!(id = %todo.id, "todo created");
                self.sink.notify(Notification::success(MSG_CREATED));
                Ok(todo)
            }
            Err(err) => self.fail(MSG_CREATE_FAILED, err),
        }
    }

    /// Apply a partial update; the server's returned record replaces the
    /// local one wholesale.
    #[tracing::instrument(skip(self, changes))]
    pub async fn update(&self, id: Uuid, changes: UpdateTodo) -> Result<Todo, StoreError> {
        self.validate(changes.validate())?;
        let seq = self.issue(id);

        match self.service.update(id, &changes).await {
            Ok(todo) => {
                self.ensure_attached()?;
                if !self.merge(id, seq, todo.clone()) {
                    debug!(seq, "newer update already merged, dropping stale response");
                }
                let message = if !changes.is_toggle() {
                    MSG_UPDATED
                } else if todo.completed {
                    MSG_COMPLETED
                } else {
                    MSG_REOPENED
                };
                self.sink.notify(Notification::success(message));
                Ok(todo)
            }
            Err(err) => self.fail(MSG_UPDATE_FAILED, err),
        }
    }

    pub async fn toggle_complete(&self, todo: &Todo) -> Result<Todo, StoreError> {
        self.update(todo.id, UpdateTodo::toggle(!todo.completed)).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        match self.service.delete(id).await {
            Ok(()) => {
                self.ensure_attached()?;
                self.todos.lock().retain(|t| t.id != id);
                self.merged.lock().remove(&id);
                debug!("todo deleted");
                self.sink.notify(Notification::success(MSG_DELETED));
                Ok(())
            }
            Err(err) => self.fail(MSG_DELETE_FAILED, err),
        }
    }

    /// Detached copy of `todo` for editing. The live record is untouched.
    pub fn begin_edit(&self, todo: &Todo) -> EditDraft {
        EditDraft::from(todo)
    }

    pub async fn save_edit(&self, draft: EditDraft) -> Result<Todo, StoreError> {
        let id = draft.id;
        self.update(id, draft.into_update()).await
    }

    // ---------------------------------------------------------------------
    // Merge helpers
    // ---------------------------------------------------------------------

    /// Replace the record `id` with a successful update response.
    ///
    /// Under `LatestIssuedWins` the response is dropped when an update issued
    /// after it has already been merged. Failed updates never record a
    /// sequence, so they cannot shadow an older success. The check and the
    /// replace happen under the same `todos` lock.
    fn merge(&self, id: Uuid, seq: u64, todo: Todo) -> bool {
        let mut todos = self.todos.lock();
        if self.policy == ReconcilePolicy::LatestIssuedWins {
            let mut merged = self.merged.lock();
            let newest = merged.entry(id).or_insert(0);
            if seq <= *newest {
                return false;
            }
            *newest = seq;
        }
        match todos.iter_mut().find(|t| t.id == id) {
            Some(slot) => *slot = todo,
            None => debug!(%id, "updated todo no longer in collection"),
        }
        true
    }

    /// Sequence number for a newly issued update of `id`.
    fn issue(&self, id: Uuid) -> u64 {
        if self.policy == ReconcilePolicy::LastResponseWins {
            return 0;
        }
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        debug!(%id, seq, "update issued");
        seq
    }

    fn ensure_attached(&self) -> Result<(), StoreError> {
        if self.is_attached() {
            Ok(())
        } else {
            debug!("store detached, discarding response");
            Err(StoreError::Detached)
        }
    }

    fn validate(&self, result: Result<(), ValidationError>) -> Result<(), StoreError> {
        result.map_err(|err| {
            debug!(error = %err, "rejected before sending");
            self.sink.notify(Notification::error(MSG_TITLE_REQUIRED));
            StoreError::Validation(err)
        })
    }

    fn fail<T>(&self, message: &str, err: ApiError) -> Result<T, StoreError> {
        self.ensure_attached()?;
        warn!(error = %err, "{message}");
        self.sink.notify(Notification::error(message));
        Err(StoreError::Service(err))
    }

    pub(crate) fn notify(&self, notification: Notification) {
        self.sink.notify(notification);
    }
}

impl std::fmt::Debug for TodoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoStore")
            .field("policy", &self.policy)
            .field("len", &self.len())
            .field("attached", &self.is_attached())
            .finish_non_exhaustive()
    }
}
