//! Client core for the task-management backend.
//!
//! # Overview
//! `Endpoints` builds `HttpRequest` values and parses `HttpResponse` values
//! for every auth and task call without touching the network. `ApiClient`
//! runs those requests through a `Transport`, attaching the bearer token
//! from an explicit `Session` and dropping the session on 401. `TaskStore`
//! keeps a confirmed-write cache of the task list on top of the client.
//! Form validators and the navigation `RouteGuard` are pure functions with
//! no I/O.
//!
//! # Design
//! - The session is a handle passed in at construction, never global state.
//! - The build/parse split keeps the wire format testable as plain data.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod guard;
pub mod http;
pub mod session;
pub mod store;
pub mod transport;
pub mod types;
pub mod validation;

pub use client::{ApiClient, Navigator, NoopNavigator, RecordingNavigator};
pub use config::ClientConfig;
pub use endpoints::Endpoints;
pub use error::ApiError;
pub use guard::{GuardDecision, NavigationRequest, RouteGuard};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use session::{AuthSession, Session};
pub use store::{TaskStore, Ticket};
pub use transport::{Transport, UreqTransport};
pub use types::{
    AuthResponse, CreateTask, PageQuery, Pagination, SignInRequest, SignUpRequest, Task,
    TaskList, UpdateTask, User,
};
pub use validation::{
    validate_credentials, validate_email, validate_password, validate_task_title, Validation,
};
