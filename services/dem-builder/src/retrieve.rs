//! Fetching externally hosted DEM files.
//!
//! The body is streamed into `<dest>.partial` and renamed over `dest` only
//! once the server answered with a success status and every chunk was
//! written. A failed fetch never leaves a file at `dest`, so the existence
//! check used for skipping stays meaningful.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument};

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RetrievalError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Downloads one URL to a local file.
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), RetrievalError>;
}

/// Path used while a download is in flight.
pub fn partial_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_owned();
    name.push(".partial");
    PathBuf::from(name)
}

/// [`Retriever`] over plain HTTP(S).
#[derive(Debug, Clone, Default)]
pub struct HttpRetriever {
    client: Client,
}

impl HttpRetriever {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    async fn stream_to(&self, url: &str, partial: &Path) -> Result<u64, RetrievalError> {
        let request_error = |source| RetrievalError::Request {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RetrievalError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let mut file = fs::File::create(partial)
            .await
            .map_err(|e| RetrievalError::io(partial, e))?;

        let mut stream = response.bytes_stream();
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(request_error)?;
            file.write_all(&chunk)
                .await
                .map_err(|e| RetrievalError::io(partial, e))?;
            written += chunk.len() as u64;
        }

        file.flush()
            .await
            .map_err(|e| RetrievalError::io(partial, e))?;
        Ok(written)
    }
}

#[async_trait]
impl Retriever for HttpRetriever {
    #[instrument(skip(self, dest), fields(dest = %dest.display()))]
    async fn fetch(&self, url: &str, dest: &Path) -> Result<(), RetrievalError> {
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| RetrievalError::io(parent, e))?;
        }

        let partial = partial_path(dest);
        debug!(url = %url, "Starting download");

        let bytes = match self.stream_to(url, &partial).await {
            Ok(bytes) => bytes,
            Err(e) => {
                fs::remove_file(&partial).await.ok();
                return Err(e);
            }
        };

        if let Err(e) = fs::rename(&partial, dest).await {
            fs::remove_file(&partial).await.ok();
            return Err(RetrievalError::io(dest, e));
        }

        info!(url = %url, bytes = bytes, "Download completed");
        Ok(())
    }
}
