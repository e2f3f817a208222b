//! Route guard evaluated on every navigation.
//!
//! The guard is stateless: each `NavigationRequest` is judged on its own
//! host, path and credentials. Rules are applied in order and the first
//! match wins:
//!
//! 1. host outside the allowlist → `Deny`
//! 2. protected path without a token → `RedirectToSignIn`
//! 3. sign-in/sign-up path with a token → `RedirectToLanding`
//! 4. anything else → `Allow`

use log::debug;

/// Cookie that carries the auth token for page navigations.
pub const AUTH_COOKIE: &str = "auth_token";

pub const SIGN_IN_PATH: &str = "/signin";
pub const LANDING_PATH: &str = "/tasks";

const PROTECTED_PREFIXES: &[&str] = &["/tasks", "/chat"];
const AUTH_PREFIXES: &[&str] = &["/signin", "/signup"];

/// What the guard sees of an incoming navigation.
#[derive(Debug, Clone, Default)]
pub struct NavigationRequest {
    pub host: String,
    pub path: String,
    /// Value of the `auth_token` cookie, if sent.
    pub cookie_token: Option<String>,
    /// Raw `Authorization` header, if sent.
    pub authorization: Option<String>,
}

impl NavigationRequest {
    pub fn new(host: &str, path: &str) -> Self {
        Self {
            host: host.to_string(),
            path: path.to_string(),
            ..Self::default()
        }
    }

    pub fn with_cookie(mut self, token: &str) -> Self {
        self.cookie_token = Some(token.to_string());
        self
    }

    /// Pick the `auth_token` cookie out of a raw `Cookie` header.
    pub fn with_cookie_header(mut self, header: &str) -> Self {
        self.cookie_token = header
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == AUTH_COOKIE)
            .map(|(_, value)| value.to_string());
        self
    }

    pub fn with_authorization(mut self, value: &str) -> Self {
        self.authorization = Some(value.to_string());
        self
    }

    /// The cookie token, else the bearer header with its prefix removed.
    /// Empty values count as absent.
    pub fn token(&self) -> Option<&str> {
        let cookie = self.cookie_token.as_deref().filter(|t| !t.is_empty());
        cookie.or_else(|| {
            self.authorization
                .as_deref()
                .map(|h| h.strip_prefix("Bearer ").unwrap_or(h))
                .filter(|t| !t.is_empty())
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectToSignIn,
    RedirectToLanding,
    Deny { host: String },
}

impl GuardDecision {
    /// Redirect target, for the two redirect outcomes.
    pub fn location(&self) -> Option<&'static str> {
        match self {
            GuardDecision::RedirectToSignIn => Some(SIGN_IN_PATH),
            GuardDecision::RedirectToLanding => Some(LANDING_PATH),
            _ => None,
        }
    }

    /// HTTP status a host server would answer with.
    pub fn status(&self) -> u16 {
        match self {
            GuardDecision::Allow => 200,
            GuardDecision::RedirectToSignIn | GuardDecision::RedirectToLanding => 307,
            GuardDecision::Deny { .. } => 403,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RouteGuard {
    /// `None` allows every host.
    allowed_domains: Option<Vec<String>>,
}

impl RouteGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_allowed_domains<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_domains: Some(domains.into_iter().map(Into::into).collect()),
        }
    }

    /// Whether the guard runs for `path` at all.
    pub fn is_guarded(path: &str) -> bool {
        let nested = |base: &str| path == base || path.starts_with(&format!("{base}/"));
        PROTECTED_PREFIXES.iter().any(|&p| nested(p)) || AUTH_PREFIXES.contains(&path)
    }

    pub fn evaluate(&self, request: &NavigationRequest) -> GuardDecision {
        if !self.is_allowed_domain(&request.host) {
            debug!("denying navigation from host {}", request.host);
            return GuardDecision::Deny {
                host: request.host.clone(),
            };
        }

        let has_token = request.token().is_some();
        let path = request.path.as_str();

        if !has_token && PROTECTED_PREFIXES.iter().any(|p| path.starts_with(p)) {
            return GuardDecision::RedirectToSignIn;
        }
        if has_token && AUTH_PREFIXES.iter().any(|p| path.starts_with(p)) {
            return GuardDecision::RedirectToLanding;
        }
        GuardDecision::Allow
    }

    fn is_allowed_domain(&self, host: &str) -> bool {
        let Some(domains) = &self.allowed_domains else {
            return true;
        };
        let hostname = host.split(':').next().unwrap_or(host);
        domains
            .iter()
            .any(|d| hostname == d || hostname.ends_with(&format!(".{d}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard() -> RouteGuard {
        RouteGuard::new()
    }

    #[test]
    fn protected_path_without_token_redirects_to_sign_in() {
        for path in ["/tasks", "/tasks/123", "/chat"] {
            let decision = guard().evaluate(&NavigationRequest::new("app.test", path));
            assert_eq!(decision, GuardDecision::RedirectToSignIn, "{path}");
            assert_eq!(decision.location(), Some("/signin"));
        }
    }

    #[test]
    fn protected_path_with_cookie_is_allowed() {
        let req = NavigationRequest::new("app.test", "/tasks").with_cookie("tok");
        assert_eq!(guard().evaluate(&req), GuardDecision::Allow);
    }

    #[test]
    fn cookie_header_is_parsed() {
        let req = NavigationRequest::new("app.test", "/tasks")
            .with_cookie_header("theme=dark; auth_token=abc; lang=en");
        assert_eq!(req.token(), Some("abc"));

        let req = NavigationRequest::new("app.test", "/tasks").with_cookie_header("theme=dark");
        assert_eq!(req.token(), None);
        assert_eq!(guard().evaluate(&req), GuardDecision::RedirectToSignIn);
    }

    #[test]
    fn bearer_header_counts_as_token() {
        let req = NavigationRequest::new("app.test", "/chat").with_authorization("Bearer tok");
        assert_eq!(guard().evaluate(&req), GuardDecision::Allow);

        let req = NavigationRequest::new("app.test", "/chat").with_authorization("Bearer ");
        assert_eq!(guard().evaluate(&req), GuardDecision::RedirectToSignIn);
    }

    #[test]
    fn auth_pages_with_token_redirect_to_landing() {
        for path in ["/signin", "/signup"] {
            let req = NavigationRequest::new("app.test", path).with_cookie("tok");
            let decision = guard().evaluate(&req);
            assert_eq!(decision, GuardDecision::RedirectToLanding);
            assert_eq!(decision.location(), Some("/tasks"));
            assert_eq!(decision.status(), 307);
        }
    }

    #[test]
    fn auth_pages_without_token_are_allowed() {
        let req = NavigationRequest::new("app.test", "/signin");
        assert_eq!(guard().evaluate(&req), GuardDecision::Allow);
    }

    #[test]
    fn unrelated_paths_pass_through() {
        let req = NavigationRequest::new("app.test", "/");
        assert_eq!(guard().evaluate(&req), GuardDecision::Allow);
        let req = NavigationRequest::new("app.test", "/about").with_cookie("tok");
        assert_eq!(guard().evaluate(&req), GuardDecision::Allow);
    }

    #[test]
    fn allowlist_denies_foreign_hosts_first() {
        let guard = RouteGuard::with_allowed_domains(["example.com"]);
        let req = NavigationRequest::new("evil.test", "/tasks");
        let decision = guard.evaluate(&req);
        assert_eq!(
            decision,
            GuardDecision::Deny {
                host: "evil.test".to_string()
            }
        );
        assert_eq!(decision.status(), 403);

        let req = NavigationRequest::new("app.example.com:3000", "/tasks");
        assert_eq!(guard.evaluate(&req), GuardDecision::RedirectToSignIn);
    }

    #[test]
    fn matcher_covers_guarded_routes() {
        assert!(RouteGuard::is_guarded("/tasks"));
        assert!(RouteGuard::is_guarded("/tasks/abc"));
        assert!(RouteGuard::is_guarded("/chat/1"));
        assert!(RouteGuard::is_guarded("/signin"));
        assert!(!RouteGuard::is_guarded("/signin/extra"));
        assert!(!RouteGuard::is_guarded("/"));
    }
}
