//! The commit pipeline: staged diff in, commit (or preview) out.

pub mod consent;
pub mod prompt;

use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::backend::{Backend, GenerateRequest, generate_commit_message};
use crate::commit::{limit_header, override_scope, override_type, parse_commit_type};
use crate::config::Config;
use crate::error::PipelineError;
use crate::git;
use crate::redact::redact_with_report;

pub use consent::ConsentGate;
pub use prompt::{Prompter, TerminalPrompter, is_affirmative};

const SEPARATOR: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

/// Per-run options, usually from the command line.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Directory inside the repository to commit to.
    pub repo_path: PathBuf,
    /// Forced commit type. Falls back to the configured `default_type`.
    pub commit_type: Option<String>,
    pub scope: Option<String>,
    pub dry_run: bool,
    pub copy: bool,
}

/// How a run ended. Each variant carries the final message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    DryRun(String),
    Committed(String),
    Cancelled(String),
}

impl PipelineOutcome {
    pub fn message(&self) -> &str {
        match self {
            PipelineOutcome::DryRun(m)
            | PipelineOutcome::Committed(m)
            | PipelineOutcome::Cancelled(m) => m.as_str(),
        }
    }
}

/// Run the full pipeline once.
///
/// Nothing leaves the machine before the diff is redacted and consent is
/// confirmed. Any error aborts the run.
pub async fn run_pipeline<B, P>(
    config: &Config,
    backend: &B,
    prompter: &P,
    consent: &ConsentGate,
    options: &PipelineOptions,
) -> Result<PipelineOutcome, PipelineError>
where
    B: Backend + ?Sized,
    P: Prompter + ?Sized,
{
    // ── Stage 1: Repository and staged changes ──
    let (workdir, staged) = {
        let repo = git::open_repository(&options.repo_path)?;
        let staged = git::staged_diff(&repo)?;
        let workdir = repo
            .workdir()
            .map(PathBuf::from)
            .unwrap_or_else(|| options.repo_path.clone());
        (workdir, staged)
    };
    println!(
        "✓ Found staged changes ({} files, +{} -{})",
        staged.changed_files.len(),
        staged.additions,
        staged.deletions
    );

    // ── Stage 2: Redaction ──
    let (redacted, report) = redact_with_report(&staged.diff_text);
    if !report.is_empty() {
        println!("✓ Redacted {}", report.summary());
    }
    debug!(redactions = report.total(), "Diff redacted");

    // ── Stage 3: Consent ──
    consent.ensure(prompter, &backend.destination())?;

    // ── Stage 4: Generation ──
    let forced_type = options
        .commit_type
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .or(config.default_type())
        .map(parse_commit_type);
    let scope = options.scope.clone().filter(|s| !s.is_empty());

    let request = GenerateRequest {
        diff: redacted,
        commit_type: forced_type,
        scope: scope.clone(),
        style: config.style,
        max_length: Some(config.max_length),
    };

    println!("Generating commit message...");
    let generated = generate_commit_message(backend, &request).await?;

    // ── Stage 5: Overrides ──
    let mut message = generated;
    if let Some(commit_type) = forced_type {
        message = override_type(&message, commit_type.as_str());
    }
    if let Some(scope) = scope.as_deref() {
        message = override_scope(&message, scope);
    }
    message = limit_header(&message, config.max_length);

    // ── Stage 6: Presentation ──
    println!("\n{}", format_for_display(&message));

    if options.copy {
        match copy_to_clipboard(&message) {
            Ok(()) => println!("✓ Copied to clipboard"),
            Err(e) => {
                warn!("Clipboard copy failed: {e}");
                println!("Warning: could not copy to clipboard: {e}");
            }
        }
    }

    if options.dry_run {
        println!("Dry run: no commit created.");
        return Ok(PipelineOutcome::DryRun(message));
    }

    // ── Stage 7: Confirmation and commit ──
    let confirmed = prompter
        .confirm("Commit with this message? (y/n)")
        .map_err(PipelineError::Prompt)?;
    if !confirmed {
        println!("Commit cancelled.");
        return Ok(PipelineOutcome::Cancelled(message));
    }

    git::commit(&workdir, &message)?;
    info!("Committed to {}", workdir.display());
    println!("✓ Committed successfully");

    Ok(PipelineOutcome::Committed(message))
}

/// Render a message between separator bars, header first.
pub fn format_for_display(message: &str) -> String {
    let mut lines = message.lines();
    let header = lines.next().unwrap_or_default();
    let body: Vec<&str> = lines.collect();

    let mut out = format!("Generated commit message:\n{SEPARATOR}\n{header}\n");
    let body = body.join("\n");
    let body = body.trim_matches('\n');
    if !body.is_empty() {
        out.push('\n');
        out.push_str(body);
        out.push('\n');
    }
    out.push_str(SEPARATOR);
    out
}

fn copy_to_clipboard(text: &str) -> Result<(), arboard::Error> {
    let mut clipboard = arboard::Clipboard::new()?;
    clipboard.set_text(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MockBackend;
    use crate::commit::CommitType;
    use crate::error::BackendError;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::path::Path;
    use tempfile::TempDir;

    struct ScriptedPrompter {
        answers: RefCell<VecDeque<bool>>,
    }

    impl ScriptedPrompter {
        fn new(answers: &[bool]) -> Self {
            Self {
                answers: RefCell::new(answers.iter().copied().collect()),
            }
        }
    }

    impl Prompter for ScriptedPrompter {
        fn confirm(&self, _prompt: &str) -> Result<bool, dialoguer::Error> {
            Ok(self.answers.borrow_mut().pop_front().unwrap_or(false))
        }
    }

    fn init_repo(dir: &Path) -> git2::Repository {
        let repo = git2::Repository::init(dir).unwrap();
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@test.com").unwrap();
        config.set_bool("commit.gpgsign", false).unwrap();
        repo
    }

    fn stage(repo: &git2::Repository, name: &str, content: &str) {
        let workdir = repo.workdir().unwrap();
        std::fs::write(workdir.join(name), content).unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
    }

    struct Fixture {
        repo_dir: TempDir,
        home: TempDir,
        repo: git2::Repository,
    }

    impl Fixture {
        fn new() -> Self {
            let repo_dir = TempDir::new().unwrap();
            let repo = init_repo(repo_dir.path());
            Self {
                repo_dir,
                home: TempDir::new().unwrap(),
                repo,
            }
        }

        fn granted_consent(&self) -> ConsentGate {
            let gate = ConsentGate::new(self.home.path().join(consent::CONSENT_FILE_NAME));
            gate.record().unwrap();
            gate
        }

        fn options(&self) -> PipelineOptions {
            PipelineOptions {
                repo_path: self.repo_dir.path().to_path_buf(),
                ..PipelineOptions::default()
            }
        }
    }

    fn backend_returning(reply: &'static str) -> MockBackend {
        let mut backend = MockBackend::new();
        backend
            .expect_destination()
            .returning(|| "a test server".to_string());
        backend
            .expect_generate()
            .returning(move |_| Ok(reply.to_string()));
        backend
    }

    #[tokio::test]
    async fn test_backend_sees_only_redacted_diff() {
        let fx = Fixture::new();
        stage(
            &fx.repo,
            "settings.txt",
            "password=hunter2hunter2\ncontact: dev@example.com\n",
        );

        let mut backend = MockBackend::new();
        backend
            .expect_destination()
            .returning(|| "a test server".to_string());
        backend
            .expect_generate()
            .withf(|req: &GenerateRequest| {
                !req.diff.contains("hunter2hunter2")
                    && !req.diff.contains("dev@example.com")
                    && req.diff.contains("[REDACTED]")
                    && req.diff.contains("[EMAIL_REDACTED]")
            })
            .times(1)
            .returning(|_| Ok("chore: update settings".to_string()));

        let options = PipelineOptions {
            dry_run: true,
            ..fx.options()
        };
        let outcome = run_pipeline(
            &Config::default(),
            &backend,
            &ScriptedPrompter::new(&[]),
            &fx.granted_consent(),
            &options,
        )
        .await
        .unwrap();
        assert_eq!(outcome, PipelineOutcome::DryRun("chore: update settings".to_string()));
    }

    #[tokio::test]
    async fn test_overrides_and_request_hints() {
        let fx = Fixture::new();
        stage(&fx.repo, "api.rs", "fn handler() {}\n");

        let mut backend = MockBackend::new();
        backend
            .expect_destination()
            .returning(|| "a test server".to_string());
        backend
            .expect_generate()
            .withf(|req: &GenerateRequest| {
                req.commit_type == Some(CommitType::Fix) && req.scope.as_deref() == Some("api")
            })
            .returning(|_| Ok("feat(core): add handler\n\n- new endpoint".to_string()));

        let options = PipelineOptions {
            commit_type: Some("FIX".to_string()),
            scope: Some("api".to_string()),
            dry_run: true,
            ..fx.options()
        };
        let outcome = run_pipeline(
            &Config::default(),
            &backend,
            &ScriptedPrompter::new(&[]),
            &fx.granted_consent(),
            &options,
        )
        .await
        .unwrap();
        assert_eq!(outcome.message(), "fix(api): add handler\n\n- new endpoint");
    }

    #[tokio::test]
    async fn test_default_type_from_config() {
        let fx = Fixture::new();
        stage(&fx.repo, "README.md", "# docs\n");

        let config = Config {
            default_type: Some("docs".to_string()),
            ..Config::default()
        };
        let backend = backend_returning("feat: describe the project");
        let options = PipelineOptions {
            dry_run: true,
            ..fx.options()
        };
        let outcome = run_pipeline(
            &config,
            &backend,
            &ScriptedPrompter::new(&[]),
            &fx.granted_consent(),
            &options,
        )
        .await
        .unwrap();
        assert_eq!(outcome.message(), "docs: describe the project");
    }

    #[tokio::test]
    async fn test_backend_error_aborts() {
        let fx = Fixture::new();
        stage(&fx.repo, "a.txt", "hello\n");

        let mut backend = MockBackend::new();
        backend
            .expect_destination()
            .returning(|| "a test server".to_string());
        backend
            .expect_generate()
            .returning(|_| Err(BackendError::Timeout(30)));

        let result = run_pipeline(
            &Config::default(),
            &backend,
            &ScriptedPrompter::new(&[]),
            &fx.granted_consent(),
            &fx.options(),
        )
        .await;
        assert!(matches!(
            result,
            Err(PipelineError::Backend(BackendError::Timeout(30)))
        ));
    }

    #[test]
    fn test_format_for_display() {
        let out = format_for_display("feat: add x\n\n- one\n- two");
        assert_eq!(
            out,
            format!("Generated commit message:\n{SEPARATOR}\nfeat: add x\n\n- one\n- two\n{SEPARATOR}")
        );
    }

    #[test]
    fn test_format_for_display_header_only() {
        let out = format_for_display("fix: typo");
        assert_eq!(
            out,
            format!("Generated commit message:\n{SEPARATOR}\nfix: typo\n{SEPARATOR}")
        );
    }
}
