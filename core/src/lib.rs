//! Client-side state for a REST todo service.
//!
//! # Overview
//! `TodoStore` keeps a local mirror of the server's todo collection and
//! reconciles it after every mutation: one service call, then one
//! replace/insert/remove on the local list using the server's response.
//! Outcomes are reported through a `NotificationSink`; a presentation layer
//! renders `TodoStore`'s state and forwards user `Intent`s into it.
//!
//! # Design
//! - `TodoClient` is stateless and I/O free. It builds `HttpRequest` values
//!   and parses `HttpResponse` values; `HttpTodoService` executes them.
//! - `TodoService` is the seam the store depends on, so tests and other
//!   transports can stand in for HTTP.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod intent;
pub mod notify;
pub mod service;
pub mod store;
pub mod types;

pub use client::TodoClient;
pub use config::{Config, ReconcilePolicy};
pub use error::{ApiError, StoreError, ValidationError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use intent::{Intent, Outcome};
pub use notify::{ChannelSink, MemorySink, Notification, NotificationSink, TracingSink, Variant};
pub use service::{HttpTodoService, TodoService};
pub use store::TodoStore;
pub use types::{CreateTodo, EditDraft, Filter, Summary, Todo, UpdateTodo};
