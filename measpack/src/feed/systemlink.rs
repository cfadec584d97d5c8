//! SystemLink package feed client.
//!
//! Uploading takes up to three requests:
//!
//! 1. `GET /niuser/v1/workspaces` to turn a workspace name into an ID
//!    (only when a workspace is configured)
//! 2. `GET /nifeed/v1/feeds?workspace=<id>` to find the feed ID by name
//! 3. `POST /nifeed/v1/feeds/<id>/packages?shouldOverwrite=<bool>` with the
//!    package as the multipart field `package`
//!
//! Every request carries the API key in the `x-ni-api-key` header.

use std::path::Path;
use std::time::Duration;

use reqwest::blocking::{multipart, Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::config::UploadConfig;
use super::error::{FeedError, FeedResult};
use super::{FeedClient, UploadResponse};

/// Default timeout for feed requests (5 minutes, packages can be large).
const DEFAULT_TIMEOUT_SECS: u64 = 300;

const API_KEY_HEADER: &str = "x-ni-api-key";

#[derive(Debug, Deserialize)]
struct NamedResource {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct WorkspaceList {
    #[serde(default)]
    workspaces: Vec<NamedResource>,
}

#[derive(Debug, Deserialize)]
struct FeedList {
    #[serde(default)]
    feeds: Vec<NamedResource>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// Feed client for the SystemLink REST API.
#[derive(Debug, Clone)]
pub struct SystemLinkFeedClient {
    client: Client,
    timeout: Duration,
}

impl SystemLinkFeedClient {
    /// Create a client with the default timeout.
    pub fn new() -> FeedResult<Self> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(timeout: Duration) -> FeedResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(format!("measpack/{}", crate::VERSION))
            .build()?;
        Ok(Self { client, timeout })
    }

    /// The request timeout in use.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn base_url(config: &UploadConfig) -> FeedResult<String> {
        config
            .api_url()
            .map(|url| url.trim_end_matches('/').to_string())
            .ok_or(FeedError::MissingConfigKey("api_url"))
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder, api_key: &str) -> FeedResult<T> {
        let response = request.header(API_KEY_HEADER, api_key).send()?;
        let response = check_status(response)?;
        let body = response.text()?;
        serde_json::from_str(&body).map_err(|e| FeedError::InvalidResponse(e.to_string()))
    }

    fn resolve_workspace(&self, base: &str, config: &UploadConfig) -> FeedResult<Option<String>> {
        let Some(name) = config.workspace() else {
            return Ok(None);
        };

        let list: WorkspaceList = self.send(
            self.client.get(format!("{}/niuser/v1/workspaces", base)),
            config.api_key(),
        )?;

        list.workspaces
            .into_iter()
            .find(|ws| ws.name == name)
            .map(|ws| Some(ws.id))
            .ok_or_else(|| FeedError::WorkspaceNotFound(name.to_string()))
    }

    fn resolve_feed(
        &self,
        base: &str,
        workspace_id: Option<&str>,
        config: &UploadConfig,
    ) -> FeedResult<String> {
        let mut request = self.client.get(format!("{}/nifeed/v1/feeds", base));
        if let Some(id) = workspace_id {
            request = request.query(&[("workspace", id)]);
        }

        let list: FeedList = self.send(request, config.api_key())?;
        list.feeds
            .into_iter()
            .find(|feed| feed.name == config.feed_name())
            .map(|feed| feed.id)
            .ok_or_else(|| FeedError::FeedNotFound(config.feed_name().to_string()))
    }
}

impl FeedClient for SystemLinkFeedClient {
    fn upload_package(&self, package: &Path, config: &UploadConfig) -> FeedResult<UploadResponse> {
        let base = Self::base_url(config)?;
        if config.api_key().trim().is_empty() {
            return Err(FeedError::MissingConfigKey("api_key"));
        }
        let workspace_id = self.resolve_workspace(&base, config)?;
        let feed_id = self.resolve_feed(&base, workspace_id.as_deref(), config)?;
        debug!(feed = %config.feed_name(), feed_id = %feed_id, "Resolved feed");

        let form = multipart::Form::new()
            .file("package", package)
            .map_err(|e| FeedError::ReadFailed {
                path: package.to_path_buf(),
                source: e,
            })?;

        let request = self
            .client
            .post(format!("{}/nifeed/v1/feeds/{}/packages", base, feed_id))
            .query(&[("shouldOverwrite", config.overwrite())])
            .multipart(form);

        self.send(request, config.api_key())
    }
}

/// Turn a non-success response into [`FeedError::Api`].
fn check_status(response: Response) -> FeedResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.error.message.or(b.error.name))
        .or_else(|| (!body.trim().is_empty()).then(|| body.trim().to_string()))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());

    Err(FeedError::Api {
        status: status.as_u16(),
        message,
    })
}
