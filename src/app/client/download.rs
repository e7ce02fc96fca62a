//! Bundle downloads streamed to a temporary file
//!
//! The response body is written chunk by chunk while the progress bar
//! advances. An interrupted transfer leaves the partial temp file behind; the
//! caller reports the error and the user re-runs the command.

use std::path::PathBuf;

use futures::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::app::client::http::HttpHandler;
use crate::app::client::progress::{transfer_bar, Direction};
use crate::constants::files;
use crate::errors::TransportResult;

/// File download operations handler
pub struct DownloadHandler<'a> {
    http_handler: &'a HttpHandler,
    show_progress: bool,
}

impl<'a> DownloadHandler<'a> {
    /// Creates a new DownloadHandler with the given HTTP handler
    pub fn new(http_handler: &'a HttpHandler, show_progress: bool) -> Self {
        Self {
            http_handler,
            show_progress,
        }
    }

    /// Downloads the body of a form POST into a fresh temporary `.zip` file
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to download from
    /// * `form` - Form fields sent with the request (typically the token)
    /// * `filename` - Name shown next to the progress bar
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the request fails, the server answers with
    /// an error status, or the temp file cannot be written.
    pub async fn download_to_temp(
        &self,
        url: &Url,
        form: &[(&str, &str)],
        filename: &str,
    ) -> TransportResult<PathBuf> {
        let response = self.http_handler.post_form(url, form).await?;
        let total = response.content_length().unwrap_or(0);

        let (std_file, temp_path) = tempfile::Builder::new()
            .prefix(files::TEMP_PREFIX)
            .suffix(&format!(".{}", files::BUNDLE_EXTENSION))
            .tempfile()?
            .keep()
            .map_err(|e| e.error)?;
        let mut file = File::from_std(std_file);

        let bar = transfer_bar(Direction::Download, filename, total, self.show_progress);
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            bar.inc(chunk.len() as u64);
        }
        file.flush().await?;
        bar.finish_and_clear();

        tracing::debug!(
            "Downloaded {} bytes into {}",
            bar.position(),
            temp_path.display()
        );
        Ok(temp_path)
    }
}
