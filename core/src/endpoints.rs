//! Request builders and response parsers for the auth and task endpoints.
//!
//! # Design
//! `Endpoints` holds only a `base_url` and carries no state between calls.
//! Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Nothing here touches the network, attaches credentials, or validates
//! input; `ApiClient` does the round-trip and the session handling.

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    AuthResponse, CreateTask, PageQuery, SignInRequest, SignUpRequest, Task, TaskList,
    UpdateTask, User,
};

/// Stateless builder/parser for every REST call the client makes.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base_url: String,
}

impl Endpoints {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // -- auth -------------------------------------------------------------

    pub fn build_sign_in(&self, input: &SignInRequest) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/auth/signin", input)
    }

    pub fn build_sign_up(&self, input: &SignUpRequest) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/auth/signup", input)
    }

    pub fn build_sign_out(&self) -> HttpRequest {
        self.request(HttpMethod::Post, "/auth/signout")
    }

    pub fn build_current_user(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/auth/me")
    }

    pub fn parse_sign_in(&self, response: HttpResponse) -> Result<AuthResponse, ApiError> {
        parse_json(response)
    }

    pub fn parse_sign_up(&self, response: HttpResponse) -> Result<AuthResponse, ApiError> {
        parse_json(response)
    }

    pub fn parse_sign_out(&self, response: HttpResponse) -> Result<(), ApiError> {
        expect_success(&response)
    }

    pub fn parse_current_user(&self, response: HttpResponse) -> Result<User, ApiError> {
        parse_json(response)
    }

    // -- tasks ------------------------------------------------------------

    pub fn build_list_tasks(&self, query: Option<PageQuery>) -> HttpRequest {
        let path = match query {
            None => "/tasks".to_string(),
            Some(PageQuery {
                page,
                page_size: None,
            }) => format!("/tasks?page={page}"),
            Some(PageQuery {
                page,
                page_size: Some(size),
            }) => format!("/tasks?page={page}&page_size={size}"),
        };
        self.request(HttpMethod::Get, &path)
    }

    pub fn build_get_task(&self, id: Uuid) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/tasks/{id}"))
    }

    pub fn build_create_task(&self, input: &CreateTask) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/tasks", input)
    }

    pub fn build_update_task(&self, id: Uuid, input: &UpdateTask) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Put, &format!("/tasks/{id}"), input)
    }

    pub fn build_delete_task(&self, id: Uuid) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/tasks/{id}"))
    }

    pub fn build_toggle_task(&self, id: Uuid) -> HttpRequest {
        self.request(HttpMethod::Put, &format!("/tasks/{id}/toggle"))
    }

    pub fn parse_list_tasks(&self, response: HttpResponse) -> Result<TaskList, ApiError> {
        parse_json(response)
    }

    pub fn parse_get_task(&self, response: HttpResponse) -> Result<Task, ApiError> {
        parse_json(response)
    }

    pub fn parse_create_task(&self, response: HttpResponse) -> Result<Task, ApiError> {
        parse_json(response)
    }

    pub fn parse_update_task(&self, response: HttpResponse) -> Result<Task, ApiError> {
        parse_json(response)
    }

    pub fn parse_delete_task(&self, response: HttpResponse) -> Result<(), ApiError> {
        expect_success(&response)
    }

    pub fn parse_toggle_task(&self, response: HttpResponse) -> Result<Task, ApiError> {
        parse_json(response)
    }

    fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    fn json_request<B: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        input: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let mut req = self.request(method, path);
        req.headers
            .push(("content-type".to_string(), "application/json".to_string()));
        req.body = Some(body);
        Ok(req)
    }
}

/// Map non-2xx responses to the matching `ApiError` variant.
fn expect_success(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        Ok(())
    } else {
        Err(ApiError::from_response(response))
    }
}

fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    expect_success(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}
