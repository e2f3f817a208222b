//! Client configuration loaded from the environment.
//!
//! `API_URL` selects the backend; a `.env` file in the working directory is
//! honoured when present.

use std::env;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Client settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Load `API_URL`, consulting a `.env` file first if one exists.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_url = lookup("API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self { api_url }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_localhost() {
        let config = ClientConfig::from_lookup(|_| None);
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.api_url, "http://localhost:8000");
    }

    #[test]
    fn reads_api_url() {
        let config = ClientConfig::from_lookup(|key| {
            (key == "API_URL").then(|| "https://api.example.com".to_string())
        });
        assert_eq!(config.api_url, "https://api.example.com");
    }

    #[test]
    fn blank_value_falls_back() {
        let config = ClientConfig::from_lookup(|_| Some("  ".to_string()));
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }
}
