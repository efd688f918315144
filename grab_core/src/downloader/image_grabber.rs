use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, StatusCode, Url};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::config::FetchConfig;
use crate::destination::{partial_path, DestinationPolicy};
use crate::downloader::item_handler::ItemHandler;
use crate::types::types::{FetchError, FetchOutcome};

/// Write buffer for the destination file.
const WRITE_BUFFER: usize = 64 * 1024;

/// Removes a partial file unless the write was committed.
struct PartialFile {
    path: PathBuf,
    committed: bool,
}

impl Drop for PartialFile {
    fn drop(&mut self) {
        if !self.committed {
            // Drop cannot await; one unlink is short enough to run inline.
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// Fetches `url` and saves the body to `destination`.
///
/// The status must be exactly 200. The body is streamed into a uniquely
/// named partial file next to `destination`, which is renamed over the
/// destination once complete. Failed, timed out or cancelled writes never
/// touch the destination. Returns the number of bytes written.
pub async fn fetch_and_save(
    client: &Client,
    url: &str,
    destination: &Path,
) -> Result<u64, FetchError> {
    let parsed = Url::parse(url).map_err(|e| FetchError::InvalidRequest {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    let response = client.get(parsed).send().await.map_err(|e| {
        if e.is_builder() {
            FetchError::InvalidRequest {
                url: url.to_string(),
                reason: e.to_string(),
            }
        } else {
            FetchError::Transport(e)
        }
    })?;

    let status = response.status();
    log::debug!(
        "[image_grabber] url={}: status={}, content_length={:?}",
        url,
        status,
        response.content_length()
    );
    if status != StatusCode::OK {
        return Err(FetchError::UnexpectedStatus(status.as_u16()));
    }

    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| FetchError::FileCreate {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    let mut partial = PartialFile {
        path: partial_path(destination, &Uuid::new_v4().simple().to_string()),
        committed: false,
    };
    let file = tokio::fs::File::create(&partial.path)
        .await
        .map_err(|source| FetchError::FileCreate {
            path: destination.to_path_buf(),
            source,
        })?;
    let mut writer = tokio::io::BufWriter::with_capacity(WRITE_BUFFER, file);

    let mut bytes_written: u64 = 0;
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Copy)?;
        writer.write_all(&chunk).await.map_err(FetchError::Write)?;
        bytes_written += chunk.len() as u64;
    }
    writer.flush().await.map_err(FetchError::Write)?;
    // Close the handle before the rename.
    drop(writer);

    tokio::fs::rename(&partial.path, destination)
        .await
        .map_err(FetchError::Write)?;
    partial.committed = true;

    Ok(bytes_written)
}

/// Handler that fetches each identifier over HTTP and saves it to the path
/// chosen by its [`DestinationPolicy`].
pub struct HttpSaveHandler {
    client: Client,
    destination: DestinationPolicy,
}

impl HttpSaveHandler {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        Ok(Self {
            client: config.build_client()?,
            destination: config.destination.clone(),
        })
    }

    pub fn with_client(client: Client, destination: DestinationPolicy) -> Self {
        Self { client, destination }
    }
}

#[async_trait]
impl ItemHandler for HttpSaveHandler {
    async fn handle(&self, index: usize, url: &str) -> FetchOutcome {
        let path = self.destination.resolve(index, url);
        match fetch_and_save(&self.client, url, &path).await {
            Ok(bytes) => {
                log::info!("[image_grabber] item={}: saved {} bytes to {:?}", index, bytes, path);
                FetchOutcome::Saved { path, bytes }
            }
            Err(e) => {
                log::warn!("[image_grabber] item={}: {} failed: {}", index, url, e);
                e.into()
            }
        }
    }
}
