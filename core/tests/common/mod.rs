//! In-process stand-in for the REST service.
//!
//! Holds server state in memory, counts calls, can be switched into a
//! failing mode, and can hold individual responses until a test releases
//! them so out-of-order resolution is reproducible.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use todo_core::{
    ApiError, CreateTodo, MemorySink, NotificationSink, ReconcilePolicy, Todo, TodoService,
    TodoStore, UpdateTodo,
};
use tokio::sync::oneshot;
use uuid::Uuid;

#[derive(Default)]
pub struct FakeService {
    todos: Mutex<Vec<Todo>>,
    calls: AtomicUsize,
    fail_status: AtomicU16,
    holds: Mutex<HashMap<String, oneshot::Receiver<()>>>,
}

impl FakeService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every call answers with `status` until `recover` is called.
    pub fn fail_with(&self, status: u16) {
        self.fail_status.store(status, Ordering::SeqCst);
    }

    pub fn recover(&self) {
        self.fail_status.store(0, Ordering::SeqCst);
    }

    pub fn server_todos(&self) -> Vec<Todo> {
        self.todos.lock().clone()
    }

    /// Seed a record directly on the server side.
    pub fn seed(&self, title: &str, completed: bool) -> Todo {
        let todo = Todo {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: String::new(),
            completed,
            created_at: Utc::now(),
        };
        self.todos.lock().push(todo.clone());
        todo
    }

    /// Hold the response of the next call tagged `key` until the returned
    /// sender fires. Creates and edits are tagged by title, deletes by id.
    pub fn hold(&self, key: impl Into<String>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.holds.lock().insert(key.into(), rx);
        tx
    }

    /// Spin until `n` calls have reached the service.
    pub async fn wait_for_calls(&self, n: usize) {
        while self.calls() < n {
            tokio::task::yield_now().await;
        }
    }

    fn enter(&self) -> Result<(), ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.fail_status.load(Ordering::SeqCst) {
            0 => Ok(()),
            status => Err(ApiError::HttpError {
                status,
                body: "boom".to_string(),
            }),
        }
    }

    async fn release(&self, key: &str) {
        let held = self.holds.lock().remove(key);
        if let Some(rx) = held {
            let _ = rx.await;
        }
    }
}

#[async_trait]
impl TodoService for FakeService {
    async fn list(&self) -> Result<Vec<Todo>, ApiError> {
        self.enter()?;
        Ok(self.server_todos())
    }

    async fn get(&self, id: Uuid) -> Result<Todo, ApiError> {
        self.enter()?;
        self.todos
            .lock()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    async fn create(&self, input: &CreateTodo) -> Result<Todo, ApiError> {
        self.enter()?;
        let todo = Todo {
            id: Uuid::new_v4(),
            title: input.title.clone(),
            description: input.description.clone(),
            completed: false,
            created_at: Utc::now(),
        };
        self.todos.lock().push(todo.clone());
        self.release(&input.title).await;
        Ok(todo)
    }

    /// Applied immediately; only the response is held.
    async fn update(&self, id: Uuid, input: &UpdateTodo) -> Result<Todo, ApiError> {
        self.enter()?;
        let updated = {
            let mut todos = self.todos.lock();
            let todo = todos
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or(ApiError::NotFound)?;
            if let Some(title) = &input.title {
                todo.title = title.clone();
            }
            if let Some(description) = &input.description {
                todo.description = description.clone();
            }
            if let Some(completed) = input.completed {
                todo.completed = completed;
            }
            todo.clone()
        };
        if let Some(title) = &input.title {
            self.release(title).await;
        }
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        self.enter()?;
        let removed = {
            let mut todos = self.todos.lock();
            let before = todos.len();
            todos.retain(|t| t.id != id);
            todos.len() != before
        };
        if !removed {
            return Err(ApiError::NotFound);
        }
        self.release(&id.to_string()).await;
        Ok(())
    }
}

pub struct Harness {
    pub service: Arc<FakeService>,
    pub sink: Arc<MemorySink>,
    pub store: Arc<TodoStore>,
}

pub fn harness() -> Harness {
    harness_with(ReconcilePolicy::LastResponseWins)
}

pub fn harness_with(policy: ReconcilePolicy) -> Harness {
    let service = FakeService::new();
    let sink = Arc::new(MemorySink::new());
    let store = TodoStore::new(service.clone(), sink.clone() as Arc<dyn NotificationSink>)
        .with_policy(policy);
    Harness {
        service,
        sink,
        store: Arc::new(store),
    }
}

impl Harness {
    pub fn descriptions(&self) -> Vec<String> {
        self.sink.drain().into_iter().map(|n| n.description).collect()
    }
}
