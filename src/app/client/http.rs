//! Core HTTP operations
//!
//! Every request is sent exactly once: the client never retries on its own.
//! Error statuses are turned into `TransportError::ServerError` so callers can
//! report them and abort.

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::errors::{TransportError, TransportResult};

/// HTTP operations handler
#[derive(Debug, Clone)]
pub struct HttpHandler {
    client: Client,
}

impl HttpHandler {
    /// Creates a new HttpHandler with the given client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Sends a GET request and checks the response status
    pub async fn get(&self, url: &Url) -> TransportResult<Response> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url.as_str()).send().await?;
        Self::check_status(response)
    }

    /// Sends a form-encoded POST request and checks the response status
    pub async fn post_form(&self, url: &Url, form: &[(&str, &str)]) -> TransportResult<Response> {
        tracing::debug!("POST {}", url);
        let response = self.client.post(url.as_str()).form(form).send().await?;
        Self::check_status(response)
    }

    /// GET a JSON document
    pub async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> TransportResult<T> {
        let response = self.get(url).await?;
        Ok(response.json().await?)
    }

    /// POST a form and decode the JSON answer
    pub async fn post_form_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        form: &[(&str, &str)],
    ) -> TransportResult<T> {
        let response = self.post_form(url, form).await?;
        Ok(response.json().await?)
    }

    /// Map non-success statuses to `ServerError`
    pub fn check_status(response: Response) -> TransportResult<Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            tracing::debug!("Request to {} failed with {}", response.url(), status);
            Err(TransportError::ServerError {
                status: status.as_u16(),
                url: response.url().to_string(),
            })
        }
    }

    /// Get a reference to the underlying HTTP client
    pub fn client(&self) -> &Client {
        &self.client
    }
}
