//! Git workflows: link, backup, pull

use std::path::Path;

use crate::console;
use crate::error::{AssistError, Result};
use crate::process::Executor;

use super::{DEFAULT_BRANCH, Workflows};

impl<E: Executor> Workflows<'_, E> {
    /// Point `origin` at the team repository `slug` and set the commit identity
    ///
    /// # Errors
    /// [`AssistError::NotGitRepo`], [`AssistError::LinkRemote`] or
    /// [`AssistError::GitConfig`].
    pub async fn link(&self, root: &Path, slug: &str) -> Result<()> {
        if !self.is_git_repo(root).await {
            return Err(AssistError::NotGitRepo);
        }

        let url = self.repo_url(slug);
        let current = self
            .capture(root, "git", &["remote", "get-url", "origin"])
            .await;

        let linked = if current.stdout.trim() == url {
            true
        } else if current.success() {
            self.succeeds(root, "git", &["remote", "set-url", "origin", &url])
                .await
        } else {
            self.succeeds(root, "git", &["remote", "add", "origin", &url])
                .await
        };

        if !linked {
            return Err(AssistError::LinkRemote);
        }

        self.configure_identity(root).await?;

        console::success(format!(
            "Linked '{}' -> '{}'.",
            root.display(),
            self.web_url(slug)
        ));
        Ok(())
    }

    /// Commit everything and push it to `origin`
    ///
    /// # Errors
    /// [`AssistError::NotGitRepo`], [`AssistError::BackupCommit`] or
    /// [`AssistError::BackupPush`].
    pub async fn backup(&self, root: &Path) -> Result<()> {
        if !self.is_git_repo(root).await {
            return Err(AssistError::NotGitRepo);
        }

        if !self.succeeds(root, "git", &["add", "-A"]).await
            || !self.succeeds(root, "git", &["commit", "-m", "Backup"]).await
        {
            return Err(AssistError::BackupCommit);
        }

        if !self
            .succeeds(root, "git", &["push", "-u", "origin", DEFAULT_BRANCH])
            .await
        {
            return Err(AssistError::BackupPush);
        }

        console::success("All changes have been backed up to the server.");
        Ok(())
    }

    /// Pull from the tracked remote branch
    ///
    /// # Errors
    /// [`AssistError::NotGitRepo`] or [`AssistError::Pull`].
    pub async fn pull(&self, root: &Path) -> Result<()> {
        if !self.is_git_repo(root).await {
            return Err(AssistError::NotGitRepo);
        }

        if !self.succeeds(root, "git", &["pull"]).await {
            return Err(AssistError::Pull);
        }

        console::success("All changes have been pulled from the server.");
        Ok(())
    }

    /// `git init` unless `root` already is a repository
    pub(super) async fn init_git_repo(&self, root: &Path) -> Result<()> {
        if self.is_git_repo(root).await {
            return Ok(());
        }

        let initial_branch = format!("--initial-branch={DEFAULT_BRANCH}");
        if !self.succeeds(root, "git", &["init", &initial_branch]).await {
            return Err(AssistError::GitInit);
        }
        Ok(())
    }

    pub(super) async fn disable_signing(&self, root: &Path) -> Result<()> {
        if self
            .succeeds(root, "git", &["config", "commit.gpgsign", "false"])
            .await
        {
            Ok(())
        } else {
            Err(AssistError::GitConfig)
        }
    }

    async fn configure_identity(&self, root: &Path) -> Result<()> {
        let name = self.secrets.get("computer-name");
        let email = self.secrets.get("email");

        if !self
            .succeeds(root, "git", &["config", "user.name", name])
            .await
            || !self
                .succeeds(root, "git", &["config", "user.email", email])
                .await
        {
            return Err(AssistError::GitConfig);
        }

        self.disable_signing(root).await
    }
}
