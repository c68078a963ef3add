//! Presigned PUT upload of a finished tarball.
//!
//! The body is the complete archive. It is split into chunks only so the
//! progress bar can follow the transport as it pulls the body; the request
//! always declares the exact `Content-Length`. Nothing is retried.

use crate::archive::Tarball;
use crate::error::{Error, Result};
use crate::progress::{TransferProgress, UPLOAD_LABEL};
use agentfs_core::NetworkConfig;
use bytes::Bytes;
use futures_util::stream::{self, Stream, StreamExt};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::StatusCode;
use std::time::{Duration, Instant};
use url::Url;

/// Content type declared for the archive body.
pub const GZIP_CONTENT_TYPE: &str = "application/gzip";

/// Outcome of a successful upload.
#[derive(Debug, Clone)]
pub struct UploadResult {
    /// Body bytes handed to the transport
    pub bytes_sent: u64,

    /// HTTP status returned by the destination (always 200)
    pub status: u16,

    /// Wall time from request start to response headers
    pub elapsed: Duration,
}

/// Uploads tarballs to presigned URLs.
pub struct Uploader {
    client: reqwest::Client,
    chunk_size: usize,
    show_progress: bool,
}

impl Uploader {
    /// Creates an uploader using the network settings from runtime config.
    pub fn new(network: &NetworkConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(&network.user_agent);
        if let Some(secs) = network.upload_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = network.connect_timeout_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build().map_err(Error::Client)?,
            chunk_size: network.upload_chunk_size.max(1),
            show_progress: true,
        })
    }

    /// Enable or disable the upload progress bar
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// PUTs the tarball to `url`. Succeeds only on HTTP 200.
    pub async fn upload(&self, tarball: Tarball, url: &Url) -> Result<UploadResult> {
        let content_length = tarball.len() as u64;
        let progress = TransferProgress::new(UPLOAD_LABEL, content_length, self.show_progress);
        let result = self
            .upload_with_progress(tarball, url, &progress)
            .await;
        match &result {
            Ok(_) => progress.finish(),
            Err(_) => progress.abandon(),
        }
        result
    }

    /// Same as [`upload`](Self::upload), counting sent bytes on a caller-owned tap.
    pub async fn upload_with_progress(
        &self,
        tarball: Tarball,
        url: &Url,
        progress: &TransferProgress,
    ) -> Result<UploadResult> {
        let body = tarball.into_bytes();
        let content_length = body.len() as u64;

        tracing::debug!(
            "Uploading {} bytes to {}{}",
            content_length,
            url.origin().ascii_serialization(),
            url.path()
        );

        let start = Instant::now();
        let response = self
            .client
            .put(url.clone())
            .header(CONTENT_TYPE, GZIP_CONTENT_TYPE)
            .header(CONTENT_LENGTH, content_length)
            .body(reqwest::Body::wrap_stream(body_stream(
                body,
                self.chunk_size,
                progress.clone(),
            )))
            .send()
            .await
            .map_err(Error::transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("Upload rejected with status {}", status);
            return Err(Error::rejected(status.as_u16(), body));
        }

        let elapsed = start.elapsed();
        tracing::info!(
            "Uploaded {} bytes in {:.1}s",
            content_length,
            elapsed.as_secs_f64()
        );

        Ok(UploadResult {
            bytes_sent: content_length,
            status: status.as_u16(),
            elapsed,
        })
    }
}

/// Splits the archive into chunks and counts each one as the transport takes it.
fn body_stream(
    body: Bytes,
    chunk_size: usize,
    progress: TransferProgress,
) -> impl Stream<Item = std::io::Result<Bytes>> + Send + 'static {
    let chunks: Vec<Bytes> = (0..body.len())
        .step_by(chunk_size)
        .map(|start| body.slice(start..(start + chunk_size).min(body.len())))
        .collect();

    stream::iter(chunks).map(move |chunk| {
        progress.inc(chunk.len() as u64);
        Ok(chunk)
    })
}
