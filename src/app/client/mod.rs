//! HTTP client for the pypas service
//!
//! This module is the transport adapter of the application. It knows the
//! service endpoints and payload shapes but nothing about workspaces.
//!
//! The module is organized into specialized components:
//! - `config`: HTTP client configuration and endpoint templates
//! - `http`: Core request operations with status checking
//! - `download`: Streaming bundle downloads into temp files
//! - `upload`: Multipart bundle uploads
//! - `progress`: Transfer progress bars

use std::path::{Path, PathBuf};

use crate::app::models::{
    ApiResponse, FrameListing, FrameLog, ListFilter, RemoteExerciseInfo,
};
use crate::constants::http as http_constants;
use crate::errors::TransportResult;

// Module declarations
pub mod config;
pub mod download;
pub mod http;
pub mod progress;
pub mod upload;

pub use config::{ClientConfig, Endpoints};

use download::DownloadHandler;
use http::HttpHandler;
use upload::UploadHandler;

/// HTTP client for the pypas service
#[derive(Debug, Clone)]
pub struct PypasClient {
    http_handler: HttpHandler,
    endpoints: Endpoints,
    show_progress: bool,
}

impl PypasClient {
    /// Creates a new client for the given endpoints
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if HTTP client creation fails
    pub fn new(config: ClientConfig, endpoints: Endpoints) -> TransportResult<Self> {
        let client = config.build_http_client()?;
        tracing::debug!("Created pypas client for {}", endpoints.base_url);

        Ok(Self {
            http_handler: HttpHandler::new(client),
            endpoints,
            show_progress: config.show_progress,
        })
    }

    /// Endpoint templates used by this client
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Validates an access token and returns the user's name
    pub async fn authenticate(&self, token: &str) -> TransportResult<String> {
        let url = self.endpoints.auth_url(token)?;
        tracing::debug!("Authenticating user at: {}", self.endpoints.auth);
        let response: ApiResponse = self.http_handler.get_json(&url).await?;
        response.into_result()
    }

    /// Downloads an exercise bundle into a temporary zip file
    pub async fn download_exercise(&self, slug: &str, token: &str) -> TransportResult<PathBuf> {
        let url = self.endpoints.exercise_bundle_url(slug)?;
        tracing::debug!("Getting exercise from: {}", url);
        DownloadHandler::new(&self.http_handler, self.show_progress)
            .download_to_temp(
                &url,
                &[(http_constants::TOKEN_FIELD, token)],
                &format!("{}.zip", slug),
            )
            .await
    }

    /// Downloads an arbitrary item (assignment or frame) into a temporary zip file
    pub async fn pull(&self, item_slug: &str, token: &str) -> TransportResult<PathBuf> {
        let url = self.endpoints.pull_url(item_slug)?;
        tracing::debug!("Pulling items from: {}", url);
        DownloadHandler::new(&self.http_handler, self.show_progress)
            .download_to_temp(
                &url,
                &[(http_constants::TOKEN_FIELD, token)],
                &format!("{}.zip", item_slug),
            )
            .await
    }

    /// Fetches the published version of an exercise
    pub async fn exercise_info(&self, slug: &str) -> TransportResult<RemoteExerciseInfo> {
        let url = self.endpoints.exercise_info_url(slug)?;
        tracing::debug!("Getting exercise info from: {}", url);
        self.http_handler.get_json(&url).await
    }

    /// Uploads an assignment bundle and returns the server message
    pub async fn upload_assignment(
        &self,
        slug: &str,
        token: &str,
        bundle: &Path,
    ) -> TransportResult<String> {
        let url = self.endpoints.upload_url(slug)?;
        tracing::debug!("Uploading exercise to: {}", url);
        let response = UploadHandler::new(&self.http_handler, self.show_progress)
            .upload_file(
                &url,
                &[(http_constants::TOKEN_FIELD, token)],
                bundle,
                &format!("{}.zip", slug),
            )
            .await?;
        let payload: serde_json::Value = response.into_result()?;
        Ok(crate::app::models::payload_message(&payload))
    }

    /// Fetches upload statistics for the active frames
    pub async fn assignment_log(
        &self,
        token: &str,
        frame: &str,
        verbose: bool,
    ) -> TransportResult<Vec<FrameLog>> {
        let url = self.endpoints.log_url()?;
        tracing::debug!("Getting log from: {}", url);
        let verbose = if verbose { "true" } else { "false" };
        let response: ApiResponse = self
            .http_handler
            .post_form_json(
                &url,
                &[
                    (http_constants::TOKEN_FIELD, token),
                    ("frame", frame),
                    ("verbose", verbose),
                ],
            )
            .await?;
        response.into_result()
    }

    /// Lists published exercises for the active frames
    pub async fn list_exercises(
        &self,
        token: &str,
        filter: &ListFilter,
    ) -> TransportResult<Vec<FrameListing>> {
        let url = self.endpoints.list_url()?;
        tracing::debug!("Getting exercise list from: {}", url);
        let response: ApiResponse = self
            .http_handler
            .post_form_json(
                &url,
                &[
                    (http_constants::TOKEN_FIELD, token),
                    ("frame", &filter.frame),
                    ("primary_topic", &filter.primary_topic),
                    ("secondary_topic", &filter.secondary_topic),
                ],
            )
            .await?;
        response.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::TransportError;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> PypasClient {
        let endpoints = Endpoints::with_base(Url::parse(&server.uri()).unwrap());
        let config = ClientConfig {
            show_progress: false,
            ..Default::default()
        };
        PypasClient::new(config, endpoints).unwrap()
    }

    #[tokio::test]
    async fn test_authenticate_returns_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/access/auth/good-token/"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"success": true, "payload": "Ana"})),
            )
            .mount(&server)
            .await;

        let name = client_for(&server).authenticate("good-token").await.unwrap();
        assert_eq!(name, "Ana");
    }

    #[tokio::test]
    async fn test_exercise_info_without_version() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/exercises/info/hello/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let info = client_for(&server).exercise_info("hello").await.unwrap();
        assert!(info.version.is_none());
    }

    #[tokio::test]
    async fn test_upload_rejected_by_service() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/assignments/put/hello/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"success": false, "payload": "Assignment upload is closed"}),
            ))
            .mount(&server)
            .await;

        let temp_dir = tempfile::TempDir::new().unwrap();
        let bundle = temp_dir.path().join("hello.zip");
        std::fs::write(&bundle, b"zip").unwrap();

        let result = client_for(&server)
            .upload_assignment("hello", "abc", &bundle)
            .await;
        match result {
            Err(TransportError::Rejected { message }) => {
                assert_eq!(message, "Assignment upload is closed")
            }
            other => panic!("Expected Rejected, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_exercises_sends_filters() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/exercises/list/"))
            .and(body_string_contains("primary_topic=loops"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "payload": [{
                    "name": "Unit 1",
                    "slug": "unit-1",
                    "exercises": [{"slug": "while-loop", "topic": "loops"}]
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let filter = ListFilter {
            primary_topic: "loops".to_string(),
            ..Default::default()
        };
        let frames = client_for(&server)
            .list_exercises("abc", &filter)
            .await
            .unwrap();

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].exercises[0].slug, "while-loop");
    }
}
