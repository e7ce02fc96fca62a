//! HTTP client configuration and endpoint templates
//!
//! This module handles the configuration and construction of the HTTP client
//! and turns the configured URL templates into concrete request URLs.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants::{http, service};
use crate::errors::{TransportError, TransportResult};

/// Configuration for the HTTP client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Request timeout (None = no client-side timeout)
    pub request_timeout: Option<Duration>,
    /// Connect timeout (None = transport default)
    pub connect_timeout: Option<Duration>,
    /// Draw progress bars for transfers
    pub show_progress: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: None,
            connect_timeout: None,
            show_progress: true,
        }
    }
}

impl ClientConfig {
    /// Builds the HTTP client with the specified configuration
    pub fn build_http_client(&self) -> TransportResult<Client> {
        let mut client_builder = Client::builder()
            .cookie_store(true)
            .user_agent(http::USER_AGENT);

        if let Some(timeout) = self.request_timeout {
            client_builder = client_builder.timeout(timeout);
        }
        if let Some(timeout) = self.connect_timeout {
            client_builder = client_builder.connect_timeout(timeout);
        }

        client_builder.build().map_err(TransportError::Http)
    }
}

/// Remote service endpoints as URL templates joined to a base URL
///
/// Templates use `{name}` placeholders; a template starting with `/` replaces
/// the whole path of the base URL.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub base_url: Url,
    pub auth: String,
    pub get_exercise: String,
    pub exercise_info: String,
    pub put_assignment: String,
    pub log: String,
    pub list_exercises: String,
    pub pull: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::with_base(Url::parse(service::BASE_URL).expect("default base URL is valid"))
    }
}

impl Endpoints {
    /// Default templates on top of a custom base URL
    pub fn with_base(base_url: Url) -> Self {
        Self {
            base_url,
            auth: service::AUTH_PATH.to_string(),
            get_exercise: service::GET_EXERCISE_PATH.to_string(),
            exercise_info: service::EXERCISE_INFO_PATH.to_string(),
            put_assignment: service::PUT_ASSIGNMENT_PATH.to_string(),
            log: service::LOG_PATH.to_string(),
            list_exercises: service::LIST_EXERCISES_PATH.to_string(),
            pull: service::PULL_PATH.to_string(),
        }
    }

    fn render(&self, template: &str, params: &[(&str, &str)]) -> TransportResult<Url> {
        let path = params.iter().fold(template.to_string(), |path, (key, value)| {
            path.replace(&format!("{{{}}}", key), value)
        });
        self.base_url
            .join(&path)
            .map_err(|e| TransportError::InvalidUrl {
                url: path,
                error: e.to_string(),
            })
    }

    pub fn auth_url(&self, token: &str) -> TransportResult<Url> {
        self.render(&self.auth, &[("token", token)])
    }

    pub fn exercise_bundle_url(&self, slug: &str) -> TransportResult<Url> {
        self.render(&self.get_exercise, &[("exercise_slug", slug)])
    }

    pub fn exercise_info_url(&self, slug: &str) -> TransportResult<Url> {
        self.render(&self.exercise_info, &[("exercise_slug", slug)])
    }

    pub fn upload_url(&self, slug: &str) -> TransportResult<Url> {
        self.render(&self.put_assignment, &[("exercise_slug", slug)])
    }

    pub fn log_url(&self) -> TransportResult<Url> {
        self.render(&self.log, &[])
    }

    pub fn list_url(&self) -> TransportResult<Url> {
        self.render(&self.list_exercises, &[])
    }

    pub fn pull_url(&self, item_slug: &str) -> TransportResult<Url> {
        self.render(&self.pull, &[("item_slug", item_slug)])
    }
}
