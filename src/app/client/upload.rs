//! Multipart bundle uploads with progress reporting
//!
//! The bundle is sent as a streamed multipart part; the progress bar advances
//! as reqwest pulls each chunk into the request body.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::Body;
use url::Url;

use crate::app::client::http::HttpHandler;
use crate::app::client::progress::{transfer_bar, Direction};
use crate::app::models::ApiResponse;
use crate::constants::http;
use crate::errors::TransportResult;

/// File upload operations handler
pub struct UploadHandler<'a> {
    http_handler: &'a HttpHandler,
    show_progress: bool,
}

impl<'a> UploadHandler<'a> {
    /// Creates a new UploadHandler with the given HTTP handler
    pub fn new(http_handler: &'a HttpHandler, show_progress: bool) -> Self {
        Self {
            http_handler,
            show_progress,
        }
    }

    /// Uploads `file_path` as the `file` part of a multipart form
    ///
    /// `fields` are sent as plain text parts. The server answers with the
    /// usual `{success, payload}` envelope, which is returned undecoded.
    pub async fn upload_file(
        &self,
        url: &Url,
        fields: &[(&str, &str)],
        file_path: &Path,
        filename: &str,
    ) -> TransportResult<ApiResponse> {
        let data = tokio::fs::read(file_path).await?;
        let length = data.len() as u64;

        let bar = transfer_bar(Direction::Upload, filename, length, self.show_progress);
        let progress = bar.clone();
        let chunks: Vec<Vec<u8>> = data
            .chunks(http::UPLOAD_CHUNK_SIZE)
            .map(|chunk| chunk.to_vec())
            .collect();
        let stream = futures::stream::iter(chunks.into_iter().map(move |chunk| {
            progress.inc(chunk.len() as u64);
            Ok::<_, std::io::Error>(chunk)
        }));

        let part = Part::stream_with_length(Body::wrap_stream(stream), length)
            .file_name(filename.to_string())
            .mime_str("application/zip")?;
        let form = fields
            .iter()
            .fold(Form::new(), |form, (name, value)| {
                form.text(name.to_string(), value.to_string())
            })
            .part(http::FILE_FIELD, part);

        tracing::debug!("POST {} ({} bytes)", url, length);
        let response = self
            .http_handler
            .client()
            .post(url.as_str())
            .multipart(form)
            .send()
            .await;
        bar.finish_and_clear();

        let response = HttpHandler::check_status(response?)?;
        Ok(response.json().await?)
    }
}
