//! Project lifecycle workflows
//!
//! Each workflow is a short sequence of `git`, `make` and `pros` calls run
//! through an [`Executor`]. A workflow either prints its success line and
//! returns `Ok`, or returns the coded error for the first step that failed.
//!
//! # Module Structure
//!
//! - `git` - link, backup, pull, repository init
//! - `pros` - build, upload, project file and kernel install
//! - `repository` - clone and create from the template
//! - `remote` - hosting API for creating remote repositories

mod git;
mod pros;
pub mod remote;
mod repository;

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::config::Secrets;
use crate::error::{AssistError, Result};
use crate::process::{CommandOutput, Executor, Invocation, OutputMode};

pub use pros::write_project_file;
pub use remote::{BitbucketClient, CreateRepositoryRequest, RepositoryHost};
pub use repository::copy_template;

/// Marker file of a PROS project
pub const PROJECT_FILE: &str = "project.pros";

/// Branch every project pushes to
pub const DEFAULT_BRANCH: &str = "master";

/// Host of the team's repositories
pub const HOST: &str = "bitbucket.org";

static LABEL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9\-]+$").expect("Valid regex pattern"));

/// Upper-case project identifier
///
/// Only capital letters, digits and hyphens.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label(String);

impl Label {
    /// Validate `label`
    ///
    /// # Errors
    /// [`AssistError::InvalidLabel`] if the label is empty or has other characters.
    pub fn parse(label: &str) -> Result<Self> {
        if LABEL_PATTERN.is_match(label) {
            Ok(Self(label.to_string()))
        } else {
            Err(AssistError::InvalidLabel)
        }
    }

    /// Get the label as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// True when `root` holds a `project.pros` file
///
/// Does not check that the project is otherwise set up.
#[must_use]
pub fn is_pros_project(root: &Path) -> bool {
    root.join(PROJECT_FILE).exists()
}

/// Workflow context: the executor plus the settings it reads
pub struct Workflows<'a, E: Executor> {
    executor: &'a E,
    secrets: &'a Secrets,
    admin_dir: &'a Path,
}

impl<'a, E: Executor> Workflows<'a, E> {
    /// Bind workflows to an executor, the settings, and the admin directory
    pub fn new(executor: &'a E, secrets: &'a Secrets, admin_dir: &'a Path) -> Self {
        Self {
            executor,
            secrets,
            admin_dir,
        }
    }

    /// Directory name of a project: `repo-slug-prefix` + label
    #[must_use]
    pub fn project_dir_name(&self, label: &Label) -> String {
        format!("{}{}", self.secrets.get("repo-slug-prefix"), label)
    }

    /// Repository slug of a project: lower-cased directory name
    #[must_use]
    pub fn project_slug(&self, label: &Label) -> String {
        self.project_dir_name(label).to_lowercase()
    }

    /// Authenticated clone URL of `slug`
    #[must_use]
    pub fn repo_url(&self, slug: &str) -> String {
        format!(
            "https://{}:{}@{}/{}/{}.git",
            self.secrets.get("username"),
            self.secrets.get("password"),
            HOST,
            self.secrets.get("workspace"),
            slug
        )
    }

    /// Browser URL of `slug`, safe to print
    #[must_use]
    pub fn web_url(&self, slug: &str) -> String {
        format!("https://{}/{}/{}", HOST, self.secrets.get("workspace"), slug)
    }

    /// True when `root` is inside a git work tree
    pub async fn is_git_repo(&self, root: &Path) -> bool {
        self.succeeds(root, "git", &["rev-parse"]).await
    }

    // ------------------------------------------------------------------------
    // Executor shorthands
    // ------------------------------------------------------------------------

    async fn run(&self, dir: &Path, program: &str, args: &[&str], mode: OutputMode) -> CommandOutput {
        self.executor
            .run(Invocation::new(dir, program, args.iter().copied()).mode(mode))
            .await
    }

    /// Output shown on the console; true on exit code zero
    async fn succeeds(&self, dir: &Path, program: &str, args: &[&str]) -> bool {
        self.run(dir, program, args, OutputMode::Inherit).await.success()
    }

    /// Output captured silently
    async fn capture(&self, dir: &Path, program: &str, args: &[&str]) -> CommandOutput {
        self.run(dir, program, args, OutputMode::Capture).await
    }

    /// Output shown and captured
    async fn tee(&self, dir: &Path, program: &str, args: &[&str]) -> CommandOutput {
        self.run(dir, program, args, OutputMode::Tee).await
    }

    fn template_root(&self) -> PathBuf {
        self.admin_dir.join(self.template_slug())
    }

    fn template_slug(&self) -> String {
        self.secrets.get("template-repo").to_lowercase()
    }
}
