//! Streaming artifact download.
//!
//! Artifacts are streamed straight into the install sink in fixed-size
//! chunks; the whole package is never buffered in memory.

use std::io;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::{Stream, TryStreamExt};
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_util::io::StreamReader;
use tracing::{debug, info};

use crate::config::UpdateConfig;
use crate::error::UpdateError;

/// Chunk size for copying the artifact into the install sink.
const COPY_CHUNK_SIZE: usize = 32 * 1024;

type BodyStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send>>;

/// Streams update artifacts from the remote endpoint.
///
/// Unlike the version check, artifact requests carry no timeout: packages
/// can be large and the transfer is paced by the network.
pub struct Downloader {
    client: reqwest::Client,
}

impl Downloader {
    /// Create a downloader from the update configuration.
    pub fn new(config: &UpdateConfig) -> Result<Self, UpdateError> {
        let client = reqwest::Client::builder()
            .user_agent(&config.network.user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Open a streaming download of the artifact at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError::DownloadFailed`] for a non-success HTTP
    /// status and [`UpdateError::Network`] for connection failures.
    pub async fn open(&self, url: &str) -> Result<ArtifactStream, UpdateError> {
        info!("downloading artifact from {}", url);

        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(UpdateError::DownloadFailed {
                status: response.status().as_u16(),
            });
        }

        let body = response
            .bytes_stream()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e));
        Ok(ArtifactStream {
            body: Box::pin(body),
        })
    }
}

/// An open artifact download, consumed by copying it into a sink.
pub struct ArtifactStream {
    body: BodyStream,
}

impl std::fmt::Debug for ArtifactStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactStream").finish_non_exhaustive()
    }
}

impl ArtifactStream {
    /// Copy the whole body into `sink` in fixed-size chunks.
    ///
    /// Returns the number of bytes copied. The sink is flushed before
    /// returning; any read or write error aborts the copy.
    pub async fn copy_into<W>(self, sink: &mut W) -> Result<u64, UpdateError>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let mut reader = StreamReader::new(self.body);
        let mut buf = vec![0u8; COPY_CHUNK_SIZE];
        let mut total = 0u64;

        loop {
            let n = reader.read(&mut buf).await?;
            if n == 0 {
                break;
            }
            sink.write_all(&buf[..n]).await?;
            total += n as u64;
        }
        sink.flush().await?;

        debug!("artifact copy complete: {} bytes", total);
        Ok(total)
    }
}
