//! Package feed publishing.
//!
//! # Overview
//!
//! - **UploadConfig**: server URL, API key, workspace, feed and overwrite flag
//! - **FeedClient**: trait for whatever talks to the feed service
//! - **SystemLinkFeedClient**: the SystemLink REST implementation
//! - **FeedPublisher**: checks the artifact, uploads it and logs the outcome
//!
//! Publishing is synchronous. Timeouts are a property of the client.

mod config;
mod error;
mod systemlink;

pub use config::{CredentialPolicy, UploadConfig};
pub use error::{FeedError, FeedResult};
pub use systemlink::SystemLinkFeedClient;

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

/// What the feed service reports after accepting a package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Stored package file name.
    #[serde(default)]
    pub file_name: Option<String>,

    /// Package ID assigned by the server.
    #[serde(default)]
    pub id: Option<String>,

    /// ID of the feed the package landed in.
    #[serde(default)]
    pub feed_id: Option<String>,
}

/// Uploads packages to a feed service.
pub trait FeedClient {
    /// Upload the package at `package` as described by `config`.
    fn upload_package(&self, package: &Path, config: &UploadConfig) -> FeedResult<UploadResponse>;
}

impl<C: FeedClient + ?Sized> FeedClient for &C {
    fn upload_package(&self, package: &Path, config: &UploadConfig) -> FeedResult<UploadResponse> {
        (**self).upload_package(package, config)
    }
}

/// Publishes built packages through a [`FeedClient`].
#[derive(Debug)]
pub struct FeedPublisher<C: FeedClient> {
    client: C,
}

impl<C: FeedClient> FeedPublisher<C> {
    /// Create a publisher using `client`.
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// The underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Upload one package.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::ReadFailed`] if the artifact is missing, or
    /// whatever the client reports.
    pub fn publish(&self, artifact: &Path, config: &UploadConfig) -> FeedResult<UploadResponse> {
        let metadata = std::fs::metadata(artifact).map_err(|e| FeedError::ReadFailed {
            path: artifact.to_path_buf(),
            source: e,
        })?;
        debug!(
            "Uploading {} ({} bytes) to feed '{}'",
            artifact.display(),
            metadata.len(),
            config.feed_name()
        );

        let response = self.client.upload_package(artifact, config)?;

        let file_name = response.file_name.clone().unwrap_or_else(|| {
            artifact
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        });
        info!(
            "Package '{}' is uploaded to SystemLink feed '{}'.",
            file_name,
            config.feed_name()
        );
        Ok(response)
    }
}
