//! Upload settings.

use std::fmt;
use std::str::FromStr;

/// How an interactive session treats credentials when the target feed
/// changes between cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialPolicy {
    /// Keep the API URL, key and workspace; only ask for the new feed.
    #[default]
    Retain,
    /// Ask for the API URL, key and workspace again along with the feed.
    Refresh,
}

impl CredentialPolicy {
    /// Name used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialPolicy::Retain => "retain",
            CredentialPolicy::Refresh => "refresh",
        }
    }
}

impl fmt::Display for CredentialPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CredentialPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "retain" => Ok(CredentialPolicy::Retain),
            "refresh" => Ok(CredentialPolicy::Refresh),
            other => Err(format!(
                "unknown credential policy '{}' (expected 'retain' or 'refresh')",
                other
            )),
        }
    }
}

/// Where and how to upload packages.
///
/// A value is fixed once built. Redirecting a session to another feed
/// produces a new value through [`with_feed`](Self::with_feed).
#[derive(Clone, PartialEq, Eq)]
pub struct UploadConfig {
    api_url: Option<String>,
    api_key: String,
    workspace: Option<String>,
    feed_name: String,
    overwrite: bool,
}

impl UploadConfig {
    /// Create an upload configuration for a feed.
    pub fn new(api_key: impl Into<String>, feed_name: impl Into<String>) -> Self {
        Self {
            api_url: None,
            api_key: api_key.into(),
            workspace: None,
            feed_name: feed_name.into(),
            overwrite: false,
        }
    }

    /// Set the server URL.
    pub fn with_api_url(mut self, api_url: Option<String>) -> Self {
        self.api_url = api_url.filter(|url| !url.trim().is_empty());
        self
    }

    /// Set the workspace name.
    pub fn with_workspace(mut self, workspace: Option<String>) -> Self {
        self.workspace = workspace.filter(|ws| !ws.trim().is_empty());
        self
    }

    /// Set whether existing packages are replaced.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Same connection, different target feed.
    pub fn with_feed(&self, feed_name: impl Into<String>, overwrite: bool) -> Self {
        Self {
            feed_name: feed_name.into(),
            overwrite,
            ..self.clone()
        }
    }

    pub fn api_url(&self) -> Option<&str> {
        self.api_url.as_deref()
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn workspace(&self) -> Option<&str> {
        self.workspace.as_deref()
    }

    pub fn feed_name(&self) -> &str {
        &self.feed_name
    }

    pub fn overwrite(&self) -> bool {
        self.overwrite
    }
}

impl fmt::Debug for UploadConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"<redacted>")
            .field("workspace", &self.workspace)
            .field("feed_name", &self.feed_name)
            .field("overwrite", &self.overwrite)
            .finish()
    }
}
