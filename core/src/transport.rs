//! Executes `HttpRequest` values against the network.
//!
//! `Transport` is the seam between the deterministic core and real I/O.
//! `UreqTransport` is the blocking implementation used by default; hosts
//! with their own HTTP stack implement the trait instead.

use log::debug;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Performs one HTTP round-trip. Non-2xx statuses are returned as data;
/// only failures to obtain a response are errors.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by `ureq`.
///
/// Single attempt per call, no retries, and no timeout beyond ureq's
/// defaults.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        // Status codes are interpreted by `Endpoints`, not by ureq.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!("{} {}", request.method.as_str(), request.path);

        let result = match request.method {
            HttpMethod::Get => {
                let mut req = self.agent.get(&request.path);
                for (name, value) in &request.headers {
                    req = req.header(name, value);
                }
                req.call()
            }
            HttpMethod::Delete => {
                let mut req = self.agent.delete(&request.path);
                for (name, value) in &request.headers {
                    req = req.header(name, value);
                }
                req.call()
            }
            HttpMethod::Post | HttpMethod::Put => {
                let mut req = if request.method == HttpMethod::Post {
                    self.agent.post(&request.path)
                } else {
                    self.agent.put(&request.path)
                };
                for (name, value) in &request.headers {
                    req = req.header(name, value);
                }
                match &request.body {
                    Some(body) => req.send(body.as_bytes()),
                    None => req.send_empty(),
                }
            }
        };

        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        debug!("{} {} -> {status}", request.method.as_str(), request.path);
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
