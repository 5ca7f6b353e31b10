//! Stateless HTTP request builder and response parser for the todo API.
//!
//! # Design
//! `TodoClient` holds only the resolved API root (`{API_BASE}/api`) and
//! carries no mutable state between calls. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method that
//! consumes an `HttpResponse`. The caller executes the HTTP round-trip.
//!
//! Any 2xx status counts as success. Backends differ on 200 vs 201 for create
//! and 200 vs 204 for delete, and the contract only cares about the body.

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{CreateTodo, Todo, UpdateTodo};

/// Synchronous, stateless client for the todo API.
#[derive(Debug, Clone)]
pub struct TodoClient {
    api_url: String,
}

impl TodoClient {
    /// `api_base` is the endpoint root; the `/api` prefix is appended here.
    pub fn new(api_base: &str) -> Self {
        Self {
            api_url: format!("{}/api", api_base.trim_end_matches('/')),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn collection(&self) -> String {
        format!("{}/todos", self.api_url)
    }

    fn item(&self, id: Uuid) -> String {
        format!("{}/todos/{id}", self.api_url)
    }

    pub fn build_list_todos(&self) -> HttpRequest {
        HttpRequest::empty(HttpMethod::Get, self.collection())
    }

    pub fn build_get_todo(&self, id: Uuid) -> HttpRequest {
        HttpRequest::empty(HttpMethod::Get, self.item(id))
    }

    pub fn build_create_todo(&self, input: &CreateTodo) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest::json(HttpMethod::Post, self.collection(), to_body(input)?))
    }

    pub fn build_update_todo(&self, id: Uuid, input: &UpdateTodo) -> Result<HttpRequest, ApiError> {
        Ok(HttpRequest::json(HttpMethod::Put, self.item(id), to_body(input)?))
    }

    pub fn build_delete_todo(&self, id: Uuid) -> HttpRequest {
        HttpRequest::empty(HttpMethod::Delete, self.item(id))
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        check_status(&response)?;
        from_body(&response)
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response)?;
        from_body(&response)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response)?;
        from_body(&response)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response)?;
        from_body(&response)
    }

    /// The body is ignored; some backends answer with a confirmation message.
    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }
}

fn to_body<T: Serialize>(input: &T) -> Result<String, ApiError> {
    serde_json::to_string(input).map_err(|e| ApiError::SerializationError(e.to_string()))
}

fn from_body<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TODO_JSON: &str = r#"{"id":"00000000-0000-0000-0000-000000000001","title":"New","description":"","completed":false,"created_at":"2024-05-01T10:00:00Z"}"#;

    fn client() -> TodoClient {
        TodoClient::new("http://localhost:8000")
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn api_prefix_is_appended() {
        assert_eq!(client().api_url(), "http://localhost:8000/api");
        let req = client().build_list_todos();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:8000/api/todos");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = TodoClient::new("http://localhost:8000/");
        assert_eq!(client.build_list_todos().path, "http://localhost:8000/api/todos");
    }

    #[test]
    fn build_create_todo_sends_title_and_description() {
        let req = client()
            .build_create_todo(&CreateTodo::new("Buy milk", "2% please"))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"title": "Buy milk", "description": "2% please"}));
    }

    #[test]
    fn build_update_todo_sends_only_present_fields() {
        let req = client()
            .build_update_todo(Uuid::nil(), &UpdateTodo::toggle(true))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(
            req.path,
            "http://localhost:8000/api/todos/00000000-0000-0000-0000-000000000000"
        );
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body, serde_json::json!({"completed": true}));
    }

    #[test]
    fn build_delete_todo_has_no_body() {
        let req = client().build_delete_todo(Uuid::nil());
        assert_eq!(req.method, HttpMethod::Delete);
        assert!(req.body.is_none());
    }

    #[test]
    fn create_accepts_200_and_201() {
        assert_eq!(client().parse_create_todo(response(200, TODO_JSON)).unwrap().title, "New");
        assert_eq!(client().parse_create_todo(response(201, TODO_JSON)).unwrap().title, "New");
    }

    #[test]
    fn delete_accepts_message_body() {
        let ok = response(200, r#"{"message":"Todo deleted successfully"}"#);
        assert!(client().parse_delete_todo(ok).is_ok());
        assert!(client().parse_delete_todo(response(204, "")).is_ok());
    }

    #[test]
    fn not_found_maps_to_dedicated_variant() {
        let err = client().parse_delete_todo(response(404, "")).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
        let err = client().parse_update_todo(response(404, "")).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn server_error_keeps_status_and_body() {
        let err = client()
            .parse_create_todo(response(500, "internal error"))
            .unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 500, ref body } if body == "internal error"));
    }

    #[test]
    fn malformed_body_is_deserialization_error() {
        let err = client().parse_list_todos(response(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }
}
