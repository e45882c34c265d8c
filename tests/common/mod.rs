//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use git2::{Oid, Repository, Signature};

use smartcommit::backend::{Backend, GenerateRequest};
use smartcommit::error::BackendError;
use smartcommit::pipeline::Prompter;

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository with a local identity configured.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        {
            let mut config = repo.config().expect("Failed to open repo config");
            config.set_str("user.name", "Test User").expect("set user.name");
            config.set_str("user.email", "test@example.com").expect("set user.email");
            config.set_bool("commit.gpgsign", false).expect("set commit.gpgsign");
        }
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `content` to `name` and add it to the index.
    pub fn stage(&self, name: &str, content: &str) {
        std::fs::write(self.dir.path().join(name), content).expect("Failed to write file");
        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(name)).expect("Failed to add file");
        index.write().expect("Failed to write index");
    }

    /// Commit everything currently staged through git2. Returns the commit OID.
    pub fn commit_staged(&self, message: &str) -> Oid {
        let sig = Signature::now("Test User", "test@example.com").expect("signature");
        let mut index = self.repo.index().expect("Failed to get index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Full message of the HEAD commit, if any.
    pub fn head_message(&self) -> Option<String> {
        let commit = self.repo.head().ok()?.peel_to_commit().ok()?;
        commit.message().map(str::to_string)
    }
}

/// Backend returning a fixed reply and recording every request it receives.
pub struct RecordingBackend {
    reply: String,
    pub requests: Mutex<Vec<GenerateRequest>>,
}

impl RecordingBackend {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_diff(&self) -> Option<String> {
        self.requests.lock().unwrap().last().map(|r| r.diff.clone())
    }
}

#[async_trait]
impl Backend for RecordingBackend {
    fn destination(&self) -> String {
        "a recording test backend".to_string()
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String, BackendError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.reply.clone())
    }
}

/// Prompter answering from a fixed script; `false` once the script runs out.
pub struct ScriptedPrompter {
    answers: RefCell<VecDeque<bool>>,
    pub prompts: RefCell<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[bool]) -> Self {
        Self {
            answers: RefCell::new(answers.iter().copied().collect()),
            prompts: RefCell::new(Vec::new()),
        }
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, prompt: &str) -> Result<bool, dialoguer::Error> {
        self.prompts.borrow_mut().push(prompt.to_string());
        Ok(self.answers.borrow_mut().pop_front().unwrap_or(false))
    }
}
