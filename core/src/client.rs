//! Session-aware API client.
//!
//! # Design
//! `ApiClient` wraps `Endpoints` with the two interceptors every call goes
//! through: a bearer token from the `Session` is attached on the way out,
//! and a 401 on the way back clears the session and redirects the host to
//! the sign-in view. The caller still receives the failure; the redirect is
//! a side effect delivered through the `Navigator`.

use std::sync::{Arc, Mutex};

use log::{debug, warn};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::endpoints::Endpoints;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::session::{AuthSession, Session};
use crate::transport::Transport;
use crate::types::{
    AuthResponse, CreateTask, PageQuery, SignInRequest, SignUpRequest, Task, TaskList,
    UpdateTask, User,
};

/// Where the host is sent after the session is dropped by a 401.
pub const SIGN_IN_PATH: &str = "/signin";

/// Receives navigation side effects from the client.
pub trait Navigator {
    fn redirect(&self, location: &str);
}

impl<N: Navigator + ?Sized> Navigator for Arc<N> {
    fn redirect(&self, location: &str) {
        (**self).redirect(location);
    }
}

/// Ignores redirects. Suitable for headless hosts.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn redirect(&self, _location: &str) {}
}

/// Remembers every redirect it was asked to perform.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    locations: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn last(&self) -> Option<String> {
        self.lock().last().cloned()
    }

    pub fn count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.locations.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Navigator for RecordingNavigator {
    fn redirect(&self, location: &str) {
        self.lock().push(location.to_string());
    }
}

/// Blocking client for the task backend.
pub struct ApiClient<T> {
    endpoints: Endpoints,
    session: Session,
    transport: T,
    navigator: Box<dyn Navigator + Send + Sync>,
}

impl<T: Transport> ApiClient<T> {
    pub fn new(base_url: &str, session: Session, transport: T) -> Self {
        Self {
            endpoints: Endpoints::new(base_url),
            session,
            transport,
            navigator: Box::new(NoopNavigator),
        }
    }

    pub fn from_config(config: &ClientConfig, session: Session, transport: T) -> Self {
        Self::new(&config.api_url, session, transport)
    }

    pub fn with_navigator(mut self, navigator: impl Navigator + Send + Sync + 'static) -> Self {
        self.navigator = Box::new(navigator);
        self
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run one request through both interceptors.
    ///
    /// The returned response may carry any status; a transport failure is
    /// the only error.
    pub fn send(&self, mut request: HttpRequest) -> Result<HttpResponse, ApiError> {
        if let Some(token) = self.session.token() {
            request.set_header("authorization", format!("Bearer {token}"));
        }
        if request.header("accept").is_none() {
            request.set_header("accept", "application/json");
        }

        let response = self.transport.execute(&request)?;

        if response.status == 401 {
            warn!(
                "{} {} returned 401, clearing session",
                request.method.as_str(),
                request.path
            );
            self.session.clear();
            self.navigator.redirect(SIGN_IN_PATH);
        }
        Ok(response)
    }

    // -- auth -------------------------------------------------------------

    /// Sign in and store the issued token in the session.
    pub fn sign_in(&self, input: &SignInRequest) -> Result<AuthResponse, ApiError> {
        let req = self.endpoints.build_sign_in(input)?;
        let auth = self.endpoints.parse_sign_in(self.send(req)?)?;
        self.store_session(&auth);
        Ok(auth)
    }

    /// Register and store the issued token in the session.
    pub fn sign_up(&self, input: &SignUpRequest) -> Result<AuthResponse, ApiError> {
        let req = self.endpoints.build_sign_up(input)?;
        let auth = self.endpoints.parse_sign_up(self.send(req)?)?;
        self.store_session(&auth);
        Ok(auth)
    }

    /// Tell the server to end the session. The local session is cleared
    /// whether or not the call succeeds.
    pub fn sign_out(&self) -> Result<(), ApiError> {
        let result = self
            .send(self.endpoints.build_sign_out())
            .and_then(|resp| self.endpoints.parse_sign_out(resp));
        self.session.clear();
        result
    }

    pub fn current_user(&self) -> Result<User, ApiError> {
        let resp = self.send(self.endpoints.build_current_user())?;
        self.endpoints.parse_current_user(resp)
    }

    // -- tasks ------------------------------------------------------------

    pub fn list_tasks(&self) -> Result<TaskList, ApiError> {
        let resp = self.send(self.endpoints.build_list_tasks(None))?;
        self.endpoints.parse_list_tasks(resp)
    }

    pub fn list_tasks_page(&self, query: PageQuery) -> Result<TaskList, ApiError> {
        let resp = self.send(self.endpoints.build_list_tasks(Some(query)))?;
        self.endpoints.parse_list_tasks(resp)
    }

    pub fn get_task(&self, id: Uuid) -> Result<Task, ApiError> {
        let resp = self.send(self.endpoints.build_get_task(id))?;
        self.endpoints.parse_get_task(resp)
    }

    pub fn create_task(&self, input: &CreateTask) -> Result<Task, ApiError> {
        let req = self.endpoints.build_create_task(input)?;
        self.endpoints.parse_create_task(self.send(req)?)
    }

    pub fn update_task(&self, id: Uuid, input: &UpdateTask) -> Result<Task, ApiError> {
        let req = self.endpoints.build_update_task(id, input)?;
        self.endpoints.parse_update_task(self.send(req)?)
    }

    pub fn delete_task(&self, id: Uuid) -> Result<(), ApiError> {
        let resp = self.send(self.endpoints.build_delete_task(id))?;
        self.endpoints.parse_delete_task(resp)
    }

    pub fn toggle_task(&self, id: Uuid) -> Result<Task, ApiError> {
        let resp = self.send(self.endpoints.build_toggle_task(id))?;
        self.endpoints.parse_toggle_task(resp)
    }

    fn store_session(&self, auth: &AuthResponse) {
        debug!("signed in as {}", auth.user.email);
        self.session.set(AuthSession {
            token: auth.access_token.clone(),
            user: Some(auth.user.clone()),
        });
    }
}
