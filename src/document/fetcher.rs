//! Document download with bounded retry
//!
//! Transport failures are retried immediately up to the configured number
//! of attempts. An explicit non-200 answer is final.

use crate::config::PipelineConfig;
use crate::error::{Error, FetchError, Result};
use crate::identifier::DocumentId;
use crate::sanitize::SafeName;
use reqwest::StatusCode;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// A downloaded document on disk
///
/// The file is deleted when this value is dropped, so every exit path of a
/// row cleans up after itself.
#[derive(Debug)]
pub struct RenderedFile {
    path: PathBuf,
    removed: bool,
}

impl RenderedFile {
    /// Take ownership of an existing file
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            removed: false,
        }
    }

    /// Location of the file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file now
    pub fn remove(mut self) -> std::io::Result<()> {
        self.removed = true;
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

impl Drop for RenderedFile {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove {}: {}", self.path.display(), e);
            }
        }
    }
}

/// Outcome of a single download attempt
enum AttemptError {
    Status(u16),
    Transport(reqwest::Error),
    Io(std::io::Error),
}

/// Downloads exported documents
pub struct DocumentFetcher {
    client: reqwest::Client,
    base: Url,
    max_retries: u32,
    timeout: Duration,
    work_dir: PathBuf,
}

impl DocumentFetcher {
    /// Create a fetcher from the run configuration
    pub fn new(config: &PipelineConfig) -> Result<Self> {
        let base = Url::parse(&config.export_base_url).map_err(|e| {
            Error::Config(format!("export base URL {:?}: {}", config.export_base_url, e))
        })?;
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            client,
            base,
            max_retries: config.max_retries,
            timeout: config.fetch_timeout,
            work_dir: config.work_dir.clone(),
        })
    }

    /// `<base>/document/d/{id}/export?format=pdf`
    pub fn export_url(&self, id: &DocumentId) -> std::result::Result<Url, FetchError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(["document", "d", id.as_str(), "export"]);
        url.query_pairs_mut().append_pair("format", "pdf");
        Ok(url)
    }

    /// Download the document to `<work_dir>/<name>.pdf`
    #[instrument(skip(self), fields(id = %id))]
    pub async fn fetch(
        &self,
        id: &DocumentId,
        name: &SafeName,
    ) -> std::result::Result<RenderedFile, FetchError> {
        let url = self.export_url(id)?;
        let path = self.work_dir.join(name.file_name("pdf"));

        tokio::fs::create_dir_all(&self.work_dir)
            .await
            .map_err(|source| FetchError::Io {
                path: self.work_dir.display().to_string(),
                source,
            })?;

        let attempts = self.max_retries.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            debug!("Export attempt {} of {}: {}", attempt, attempts, url);

            match self.download_once(&url, &path).await {
                Ok(bytes) => {
                    info!("Downloaded {} ({} bytes)", path.display(), bytes);
                    return Ok(RenderedFile::new(path));
                }
                Err(AttemptError::Status(status)) => {
                    warn!("Failed to download {}, status code: {}", name, status);
                    return Err(FetchError::Status { status });
                }
                Err(AttemptError::Io(source)) => {
                    discard_partial(&path).await;
                    return Err(FetchError::Io {
                        path: path.display().to_string(),
                        source,
                    });
                }
                Err(AttemptError::Transport(source)) => {
                    discard_partial(&path).await;
                    warn!("Export attempt {} failed: {}", attempt, source);
                    if attempt >= attempts {
                        return Err(FetchError::Exhausted {
                            attempts: attempt,
                            source,
                        });
                    }
                }
            }
        }
    }

    /// Perform a single streamed download, returning the byte count
    async fn download_once(
        &self,
        url: &Url,
        path: &Path,
    ) -> std::result::Result<u64, AttemptError> {
        let mut response = self
            .client
            .get(url.clone())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(AttemptError::Transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(AttemptError::Status(status.as_u16()));
        }

        let mut file = tokio::fs::File::create(path)
            .await
            .map_err(AttemptError::Io)?;
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await.map_err(AttemptError::Transport)? {
            file.write_all(&chunk).await.map_err(AttemptError::Io)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(AttemptError::Io)?;

        Ok(written)
    }
}

async fn discard_partial(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!("Failed to remove partial download {}: {}", path.display(), e);
        }
    }
}
