//! Interactive build session.
//!
//! The session is a small state machine driven by a [`Prompter`]:
//!
//! ```text
//! CollectUpload ─► Select ─► Build ─► AskContinue ─┬─► Select (uploads on: same or new feed)
//!       ▲            │                             ├─► CollectUpload (uploads off)
//!       │            │                             └─► Done
//!       │            └─ attempts exhausted ───────────► Done
//! ```
//!
//! When uploads are enabled, each continuation asks whether to stay on the
//! same feed; answering no collects a new feed name and overwrite flag
//! (and, under [`CredentialPolicy::Refresh`], the connection settings too).
//! When uploads were declined, the next cycle asks again.

use std::io;
use std::path::{Path, PathBuf};

use tracing::info;

use super::error::{BatchError, BatchResult};
use super::messages;
use super::orchestrator::{BatchOrchestrator, BatchReport};
use super::selection::{available_plugins, log_available, parse_index_selection};
use crate::builder::PackagingTool;
use crate::feed::{CredentialPolicy, FeedClient, UploadConfig};

/// Number of tries the user gets to enter a valid selection.
pub const MAX_SELECTION_ATTEMPTS: usize = 2;

/// Source of user answers.
pub trait Prompter {
    /// Ask for a line of text. Blank answers return `default` when given.
    fn input(&self, prompt: &str, default: Option<&str>) -> io::Result<String>;

    /// Ask for a secret without echoing it.
    fn secret(&self, prompt: &str) -> io::Result<String>;

    /// Ask a yes/no question.
    fn confirm(&self, prompt: &str) -> io::Result<bool>;
}

/// Connection values offered as prompt defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadDefaults {
    pub api_url: Option<String>,
    pub workspace: Option<String>,
}

enum SessionState {
    CollectUpload,
    Select(Option<UploadConfig>),
    Build(Option<UploadConfig>, Vec<PathBuf>),
    AskContinue(Option<UploadConfig>),
    Done,
}

/// One interactive session over a root directory.
pub struct InteractiveSession<'a, T: PackagingTool, C: FeedClient, P: Prompter> {
    orchestrator: &'a BatchOrchestrator<T, C>,
    prompter: &'a P,
    policy: CredentialPolicy,
    defaults: UploadDefaults,
}

impl<'a, T: PackagingTool, C: FeedClient, P: Prompter> InteractiveSession<'a, T, C, P> {
    pub fn new(orchestrator: &'a BatchOrchestrator<T, C>, prompter: &'a P) -> Self {
        Self {
            orchestrator,
            prompter,
            policy: CredentialPolicy::default(),
            defaults: UploadDefaults::default(),
        }
    }

    pub fn with_credential_policy(mut self, policy: CredentialPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_upload_defaults(mut self, defaults: UploadDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Run cycles until the user stops or selection attempts run out.
    ///
    /// # Errors
    ///
    /// Fails if the root holds no valid plug-ins, a required upload answer
    /// is blank, or the prompter fails.
    pub fn run(&self, root: &Path) -> BatchResult<Vec<BatchReport>> {
        let mut reports = Vec::new();
        let mut state = SessionState::CollectUpload;

        loop {
            state = match state {
                SessionState::CollectUpload => {
                    let upload = if self.prompter.confirm(messages::UPLOAD_PROMPT)? {
                        Some(self.collect_upload_config()?)
                    } else {
                        None
                    };
                    SessionState::Select(upload)
                }
                SessionState::Select(upload) => match self.select_plugins(root)? {
                    Some(plugins) => SessionState::Build(upload, plugins),
                    None => SessionState::Done,
                },
                SessionState::Build(upload, plugins) => {
                    reports.push(self.orchestrator.run_batch(&plugins, upload.as_ref()));
                    SessionState::AskContinue(upload)
                }
                SessionState::AskContinue(upload) => {
                    if !self.prompter.confirm(messages::CONTINUE_PROMPT)? {
                        SessionState::Done
                    } else {
                        match upload {
                            Some(current) => {
                                SessionState::Select(Some(self.next_upload_config(current)?))
                            }
                            None => SessionState::CollectUpload,
                        }
                    }
                }
                SessionState::Done => return Ok(reports),
            };
        }
    }

    /// List the plug-ins and read an index selection.
    ///
    /// Returns `None` once [`MAX_SELECTION_ATTEMPTS`] invalid answers
    /// have been given.
    fn select_plugins(&self, root: &Path) -> BatchResult<Option<Vec<PathBuf>>> {
        let plugins = available_plugins(root)?;
        log_available(&plugins);

        let prompt = messages::selection_prompt(plugins.len());
        for _ in 0..MAX_SELECTION_ATTEMPTS {
            let answer = self.prompter.input(&prompt, None)?;
            if let Some(selected) = parse_index_selection(&answer, &plugins) {
                return Ok(Some(selected));
            }
            info!("{}", messages::INVALID_INDEX);
        }
        Ok(None)
    }

    fn collect_upload_config(&self) -> BatchResult<UploadConfig> {
        let api_url = self
            .prompter
            .input(messages::API_URL_PROMPT, self.defaults.api_url.as_deref())?;
        let api_key = self.prompter.secret(messages::API_KEY_PROMPT)?;
        let workspace = self
            .prompter
            .input(messages::WORKSPACE_PROMPT, self.defaults.workspace.as_deref())?;

        if api_key.trim().is_empty() {
            return Err(BatchError::InvalidInput(messages::NO_API_KEY));
        }

        let (feed_name, overwrite) = self.collect_feed()?;
        Ok(UploadConfig::new(api_key.trim(), feed_name)
            .with_api_url(Some(api_url.trim().to_string()))
            .with_workspace(Some(workspace.trim().to_string()))
            .with_overwrite(overwrite))
    }

    fn collect_feed(&self) -> BatchResult<(String, bool)> {
        let feed_name = self.prompter.input(messages::FEED_PROMPT, None)?;
        if feed_name.trim().is_empty() {
            return Err(BatchError::InvalidInput(messages::NO_FEED_NAME));
        }
        let overwrite = self.prompter.confirm(messages::OVERWRITE_PROMPT)?;
        Ok((feed_name.trim().to_string(), overwrite))
    }

    fn next_upload_config(&self, current: UploadConfig) -> BatchResult<UploadConfig> {
        if self.prompter.confirm(messages::SAME_FEED_PROMPT)? {
            return Ok(current);
        }

        match self.policy {
            CredentialPolicy::Retain => {
                let (feed_name, overwrite) = self.collect_feed()?;
                Ok(current.with_feed(feed_name, overwrite))
            }
            CredentialPolicy::Refresh => self.collect_upload_config(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{BuildResult, PackageBuilder};
    use crate::feed::{FeedPublisher, FeedResult, UploadResponse};
    use crate::package::TemplateGenerator;
    use crate::plugin::test_support::write_valid_plugin;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::fs;
    use tempfile::TempDir;

    /// Answers prompts from a fixed script, recording each prompt.
    #[derive(Default)]
    struct ScriptedPrompter {
        answers: RefCell<VecDeque<&'static str>>,
        asked: RefCell<Vec<String>>,
    }

    impl ScriptedPrompter {
        fn new(answers: &[&'static str]) -> Self {
            Self {
                answers: RefCell::new(answers.iter().copied().collect()),
                asked: RefCell::default(),
            }
        }

        fn next(&self, prompt: &str) -> io::Result<String> {
            self.asked.borrow_mut().push(prompt.to_string());
            self.answers
                .borrow_mut()
                .pop_front()
                .map(str::to_string)
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
        }

        fn remaining(&self) -> usize {
            self.answers.borrow().len()
        }
    }

    impl Prompter for ScriptedPrompter {
        fn input(&self, prompt: &str, default: Option<&str>) -> io::Result<String> {
            let answer = self.next(prompt)?;
            match default {
                Some(value) if answer.is_empty() => Ok(value.to_string()),
                _ => Ok(answer),
            }
        }

        fn secret(&self, prompt: &str) -> io::Result<String> {
            self.next(prompt)
        }

        fn confirm(&self, prompt: &str) -> io::Result<bool> {
            Ok(self.next(prompt)? == "y")
        }
    }

    #[derive(Default)]
    struct Tool {
        packed: RefCell<Vec<String>>,
    }

    impl PackagingTool for Tool {
        fn pack(&self, template_dir: &Path, output_dir: &Path) -> BuildResult<()> {
            let name = template_dir.file_name().unwrap().to_string_lossy().into_owned();
            fs::write(output_dir.join(format!("{}_1.0.0.nipkg", name)), b"").unwrap();
            self.packed.borrow_mut().push(name);
            Ok(())
        }
    }

    #[derive(Default)]
    struct Client {
        feeds: RefCell<Vec<(String, bool, String)>>,
    }

    impl FeedClient for Client {
        fn upload_package(&self, _: &Path, config: &UploadConfig) -> FeedResult<UploadResponse> {
            self.feeds.borrow_mut().push((
                config.feed_name().to_string(),
                config.overwrite(),
                config.api_key().to_string(),
            ));
            Ok(UploadResponse::default())
        }
    }

    fn setup(names: &[&str]) -> (TempDir, BatchOrchestrator<Tool, Client>) {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("plugins");
        fs::create_dir(&root).unwrap();
        for name in names {
            write_valid_plugin(&root, name);
        }
        let builder = PackageBuilder::new(Tool::default(), TemplateGenerator::default())
            .with_output_root(temp.path().join("out"));
        (temp, BatchOrchestrator::new(builder, FeedPublisher::new(Client::default())))
    }

    #[test]
    fn test_upload_intent_asked_again_after_declining() {
        let (temp, orch) = setup(&["alpha"]);
        let prompter = ScriptedPrompter::new(&[
            "n", "1", "y", // no upload, build alpha, continue
            "y", "https://sl", "key", "", "feed", "n", "1", "n",
        ]);

        let reports = InteractiveSession::new(&orch, &prompter)
            .run(&temp.path().join("plugins"))
            .unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].published(), 0);
        assert_eq!(reports[1].published(), 1);
        assert_eq!(
            prompter.asked.borrow().iter().filter(|p| p.as_str() == messages::UPLOAD_PROMPT).count(),
            2
        );
    }

    #[test]
    fn test_build_without_upload_then_stop() {
        let (temp, orch) = setup(&["alpha", "beta"]);
        let prompter = ScriptedPrompter::new(&["n", "2", "n"]);

        let reports = InteractiveSession::new(&orch, &prompter)
            .run(&temp.path().join("plugins"))
            .unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(*orch.builder().tool().packed.borrow(), vec!["beta"]);
        assert_eq!(prompter.remaining(), 0);
    }

    #[test]
    fn test_invalid_selection_then_valid() {
        let (temp, orch) = setup(&["alpha", "beta"]);
        let prompter = ScriptedPrompter::new(&["n", "7", ".", "n"]);

        let reports = InteractiveSession::new(&orch, &prompter)
            .run(&temp.path().join("plugins"))
            .unwrap();

        assert_eq!(reports[0].built(), 2);
        assert_eq!(*orch.builder().tool().packed.borrow(), vec!["alpha", "beta"]);
    }

    #[test]
    fn test_selection_attempts_exhausted_ends_session() {
        let (temp, orch) = setup(&["alpha"]);
        let prompter = ScriptedPrompter::new(&["n", "x", "9"]);

        let reports = InteractiveSession::new(&orch, &prompter)
            .run(&temp.path().join("plugins"))
            .unwrap();

        assert!(reports.is_empty());
        assert!(orch.builder().tool().packed.borrow().is_empty());
    }

    #[test]
    fn test_upload_then_switch_feed() {
        let (temp, orch) = setup(&["alpha"]);
        let prompter = ScriptedPrompter::new(&[
            "y",              // upload?
            "https://sl",     // api url
            "key-1",          // api key
            "",               // workspace
            "feed-a",         // feed
            "y",              // overwrite
            "1",              // selection
            "y",              // continue
            "n",              // same feed?
            "feed-b",         // new feed
            "n",              // overwrite
            "1",              // selection
            "n",              // continue
        ]);

        let reports = InteractiveSession::new(&orch, &prompter)
            .run(&temp.path().join("plugins"))
            .unwrap();

        assert_eq!(reports.len(), 2);
        let feeds = orch.publisher().client().feeds.borrow();
        assert_eq!(
            *feeds,
            vec![
                ("feed-a".to_string(), true, "key-1".to_string()),
                ("feed-b".to_string(), false, "key-1".to_string()),
            ]
        );
    }

    #[test]
    fn test_refresh_policy_recollects_credentials() {
        let (temp, orch) = setup(&["alpha"]);
        let prompter = ScriptedPrompter::new(&[
            "y", "https://sl", "key-1", "", "feed-a", "n", "1", "y", "n",
            "https://sl", "key-2", "", "feed-b", "y", "1", "n",
        ]);

        InteractiveSession::new(&orch, &prompter)
            .with_credential_policy(CredentialPolicy::Refresh)
            .run(&temp.path().join("plugins"))
            .unwrap();

        let feeds = orch.publisher().client().feeds.borrow();
        assert_eq!(feeds[1], ("feed-b".to_string(), true, "key-2".to_string()));
    }

    #[test]
    fn test_same_feed_keeps_config() {
        let (temp, orch) = setup(&["alpha"]);
        let prompter = ScriptedPrompter::new(&[
            "y", "https://sl", "key", "", "feed-a", "n", "1", "y", "y", "1", "n",
        ]);

        InteractiveSession::new(&orch, &prompter)
            .run(&temp.path().join("plugins"))
            .unwrap();

        let feeds = orch.publisher().client().feeds.borrow();
        assert_eq!(feeds.len(), 2);
        assert_eq!(feeds[0], feeds[1]);
    }

    #[test]
    fn test_missing_api_key_aborts() {
        let (temp, orch) = setup(&["alpha"]);
        let prompter = ScriptedPrompter::new(&["y", "https://sl", "", "ws"]);

        let err = InteractiveSession::new(&orch, &prompter)
            .run(&temp.path().join("plugins"))
            .unwrap_err();

        assert!(matches!(err, BatchError::InvalidInput(msg) if msg == messages::NO_API_KEY));
        assert!(orch.builder().tool().packed.borrow().is_empty());
    }

    #[test]
    fn test_missing_feed_name_aborts() {
        let (temp, orch) = setup(&["alpha"]);
        let prompter = ScriptedPrompter::new(&["y", "https://sl", "key", "", "  "]);

        let err = InteractiveSession::new(&orch, &prompter)
            .run(&temp.path().join("plugins"))
            .unwrap_err();
        assert!(matches!(err, BatchError::InvalidInput(msg) if msg == messages::NO_FEED_NAME));
    }

    #[test]
    fn test_defaults_fill_blank_answers() {
        let (temp, orch) = setup(&["alpha"]);
        let prompter = ScriptedPrompter::new(&["y", "", "key", "", "feed", "n", "1", "n"]);

        InteractiveSession::new(&orch, &prompter)
            .with_upload_defaults(UploadDefaults {
                api_url: Some("https://configured".to_string()),
                workspace: None,
            })
            .run(&temp.path().join("plugins"))
            .unwrap();

        assert_eq!(orch.publisher().client().feeds.borrow().len(), 1);
        assert!(prompter.asked.borrow()[1].contains("API URL"));
    }

    #[test]
    fn test_root_without_plugins() {
        let (temp, orch) = setup(&[]);
        let prompter = ScriptedPrompter::new(&["n"]);

        let err = InteractiveSession::new(&orch, &prompter)
            .run(&temp.path().join("plugins"))
            .unwrap_err();
        assert!(matches!(err, BatchError::InvalidRootDirectory(_)));
    }
}
