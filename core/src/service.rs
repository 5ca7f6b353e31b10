//! The REST collaborator the store talks to.
//!
//! `TodoService` is the seam: the store only ever sees this trait.
//! `HttpTodoService` is the production implementation. It pairs the
//! stateless `TodoClient` with a reqwest client that executes each
//! `HttpRequest` and hands the raw `HttpResponse` back for parsing, so
//! status interpretation lives in one place.

use async_trait::async_trait;
use reqwest::Method;
use uuid::Uuid;

use crate::client::TodoClient;
use crate::config::Config;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateTodo, Todo, UpdateTodo};

#[async_trait]
pub trait TodoService: Send + Sync {
    async fn list(&self) -> Result<Vec<Todo>, ApiError>;
    async fn get(&self, id: Uuid) -> Result<Todo, ApiError>;
    async fn create(&self, input: &CreateTodo) -> Result<Todo, ApiError>;
    async fn update(&self, id: Uuid, input: &UpdateTodo) -> Result<Todo, ApiError>;
    async fn delete(&self, id: Uuid) -> Result<(), ApiError>;
}

#[derive(Debug, Clone)]
pub struct HttpTodoService {
    client: TodoClient,
    http: reqwest::Client,
}

impl HttpTodoService {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client: TodoClient::new(&config.api_base),
            http,
        })
    }

    pub fn client(&self) -> &TodoClient {
        &self.client
    }

    /// Execute `req`. Non-2xx statuses come back as data, not errors.
    async fn execute(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = match req.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
        };
        tracing::debug!(method = req.method.as_str(), url = %req.path, "sending request");

        let mut builder = self.http.request(method, &req.path);
        for (key, value) in &req.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = req.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(transport)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = response.text().await.map_err(transport)?;

        tracing::debug!(status, url = %req.path, "received response");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn transport(err: reqwest::Error) -> ApiError {
    ApiError::Transport(err.to_string())
}

#[async_trait]
impl TodoService for HttpTodoService {
    async fn list(&self) -> Result<Vec<Todo>, ApiError> {
        let response = self.execute(self.client.build_list_todos()).await?;
        self.client.parse_list_todos(response)
    }

    async fn get(&self, id: Uuid) -> Result<Todo, ApiError> {
        let response = self.execute(self.client.build_get_todo(id)).await?;
        self.client.parse_get_todo(response)
    }

    async fn create(&self, input: &CreateTodo) -> Result<Todo, ApiError> {
        let req = self.client.build_create_todo(input)?;
        let response = self.execute(req).await?;
        self.client.parse_create_todo(response)
    }

    async fn update(&self, id: Uuid, input: &UpdateTodo) -> Result<Todo, ApiError> {
        let req = self.client.build_update_todo(id, input)?;
        let response = self.execute(req).await?;
        self.client.parse_update_todo(response)
    }

    async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        let response = self.execute(self.client.build_delete_todo(id)).await?;
        self.client.parse_delete_todo(response)
    }
}
