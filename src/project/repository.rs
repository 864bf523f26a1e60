//! Repository workflows: clone a team project, create one from the template

use std::fs;
use std::io;
use std::path::Path;

use walkdir::WalkDir;

use crate::console;
use crate::error::{AssistError, Result};
use crate::process::Executor;

use super::remote::{CreateRepositoryRequest, RepositoryHost};
use super::{DEFAULT_BRANCH, Label, Workflows};

impl<E: Executor> Workflows<'_, E> {
    /// Clone the team project `label` into `workspace_dir` and apply the kernel
    ///
    /// # Errors
    /// [`AssistError::CreateProjectDir`], [`AssistError::Clone`],
    /// [`AssistError::ResetLatest`], or a kernel install error.
    pub async fn clone_project(
        &self,
        label: &Label,
        workspace_dir: &Path,
        kernel: &str,
        no_pull: bool,
    ) -> Result<()> {
        let dir_name = self.project_dir_name(label);
        let slug = self.project_slug(label);
        let root = workspace_dir.join(&dir_name);

        fs::create_dir_all(&root).map_err(|e| {
            log::debug!("mkdir {}: {}", root.display(), e);
            AssistError::CreateProjectDir(root.clone())
        })?;

        let url = self.repo_url(&slug);
        if !self
            .succeeds(workspace_dir, "git", &["clone", &url, &dir_name])
            .await
        {
            return Err(AssistError::Clone);
        }

        self.apply_kernel(&root, kernel, no_pull).await?;

        if !self.succeeds(&root, "git", &["reset", "--hard"]).await {
            return Err(AssistError::ResetLatest);
        }

        console::success(format!(
            "Cloned '{}' -> '{}'.",
            self.web_url(&slug),
            root.display()
        ));
        Ok(())
    }

    /// Create project `label` from the template repository
    ///
    /// Refreshes the local template clone unless `no_pull`, copies it into
    /// `workspace_dir`, initializes the project, and unless `local` creates
    /// the remote repository through `host` and pushes to it.
    ///
    /// # Errors
    /// The coded error of the first failing step.
    pub async fn create_project<H: RepositoryHost>(
        &self,
        host: &H,
        label: &Label,
        workspace_dir: &Path,
        kernel: &str,
        no_pull: bool,
        local: bool,
    ) -> Result<()> {
        let template_root = self.template_root();

        if !no_pull {
            self.refresh_template(&template_root).await?;
        }

        if !self.is_git_repo(&template_root).await {
            return Err(AssistError::TemplateMissing(template_root));
        }

        let slug = self.project_slug(label);
        let root = workspace_dir.join(self.project_dir_name(label));

        if self.is_git_repo(&root).await {
            return Err(AssistError::RepositoryExists);
        }

        fs::create_dir_all(&root).map_err(|e| {
            log::debug!("mkdir {}: {}", root.display(), e);
            AssistError::CreateProjectDir(root.clone())
        })?;

        copy_template(&template_root, &root).map_err(|e| {
            log::warn!("Copying {} failed: {}", template_root.display(), e);
            AssistError::CopyTemplate
        })?;

        self.init_project(&root, kernel, true, no_pull).await?;

        if !local {
            let request = CreateRepositoryRequest {
                username: self.secrets.get("username").to_string(),
                password: self.secrets.get("password").to_string(),
                workspace: self.secrets.get("workspace").to_string(),
                slug: slug.clone(),
                project_key: self.secrets.get("project").to_string(),
                name: format!("{}{}", self.secrets.get("repo-name-prefix"), label),
            };
            host.create_repository(&request).await?;

            self.link(&root, &slug).await?;

            if !self
                .succeeds(&root, "git", &["push", "-u", "origin", DEFAULT_BRANCH])
                .await
            {
                return Err(AssistError::Push);
            }
        }

        console::success(format!("Created repository at '{}'.", root.display()));
        Ok(())
    }

    /// Clone the template, or relink and pull an existing clone
    async fn refresh_template(&self, template_root: &Path) -> Result<()> {
        let slug = self.template_slug();

        if !self.is_git_repo(template_root).await {
            let url = self.repo_url(&slug);
            if !self
                .succeeds(self.admin_dir, "git", &["clone", &url, &slug])
                .await
            {
                return Err(AssistError::CloneTemplate);
            }
            return Ok(());
        }

        if let Err(e) = self.link(template_root, &slug).await {
            log::debug!("Relinking template failed: {e}");
            return Err(AssistError::LinkTemplate);
        }

        // The template's default branch is not necessarily master
        if !self.tee(template_root, "git", &["pull"]).await.success() {
            return Err(AssistError::Pull);
        }
        Ok(())
    }
}

/// Copy the template tree into `dest`, skipping anything named `*.git`
///
/// # Errors
/// The first I/O error hit while walking or copying.
pub fn copy_template(src: &Path, dest: &Path) -> io::Result<()> {
    let walker = WalkDir::new(src)
        .min_depth(1)
        .into_iter()
        .filter_entry(|entry| !entry.file_name().to_string_lossy().ends_with(".git"));

    for entry in walker {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let target = dest.join(relative);

        let file_type = entry.file_type();
        if file_type.is_dir() {
            fs::create_dir_all(&target)?;
        } else if file_type.is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        } else {
            log::debug!("Skipping special file {}", entry.path().display());
        }
    }

    Ok(())
}
