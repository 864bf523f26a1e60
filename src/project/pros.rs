//! PROS workflows: build, upload, project initialization

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde_json::json;

use crate::console;
use crate::error::{AssistError, Result};
use crate::process::Executor;

use super::{PROJECT_FILE, Workflows, is_pros_project};

/// Upload attempts before giving up (one try plus five retries)
const UPLOAD_ATTEMPTS: u32 = 6;

/// Pause between brain detection polls
const DETECT_INTERVAL: Duration = Duration::from_millis(500);

const MAKE_BANNER: &str = "------------------ Make Project ------------------";

impl<E: Executor> Workflows<'_, E> {
    /// Compile the project
    ///
    /// # Errors
    /// [`AssistError::NotProsProject`] or [`AssistError::Make`].
    pub async fn build(&self, root: &Path) -> Result<()> {
        if !is_pros_project(root) {
            return Err(AssistError::NotProsProject);
        }

        if let Err(e) = self.make(root, false).await {
            console::beep_failure();
            return Err(e);
        }

        console::beep_success();
        Ok(())
    }

    /// Compile, wait for a V5 brain, and upload to `slot`
    ///
    /// With `all`, every source file is rebuilt. Waits indefinitely for the
    /// brain to show up; only a dead input stream ends the wait.
    ///
    /// # Errors
    /// [`AssistError::NotProsProject`], [`AssistError::Make`] or
    /// [`AssistError::Upload`].
    pub async fn compile(&self, root: &Path, all: bool, slot: u8) -> Result<()> {
        if !is_pros_project(root) {
            return Err(AssistError::NotProsProject);
        }

        if let Err(e) = self.make(root, all).await {
            console::beep_failure();
            return Err(e);
        }

        self.wait_for_brain(root).await;

        console::notice("Starting to upload");

        let slot = slot.to_string();
        for attempt in 0..UPLOAD_ATTEMPTS {
            if attempt != 0 {
                console::notice(format!(
                    "Upload failed, retrying... ({attempt}/{})",
                    UPLOAD_ATTEMPTS - 1
                ));
            }
            if self
                .succeeds(
                    root,
                    "pros",
                    &["upload", "--after", "screen", "--slot", &slot],
                )
                .await
            {
                console::beep_success();
                return Ok(());
            }
        }

        console::beep_failure();
        Err(AssistError::Upload)
    }

    /// Initialize git and the PROS project in `root`
    ///
    /// The working tree is committed before the kernel is applied and reset
    /// afterwards, so the kernel never overwrites existing files. The reset
    /// happens even when installing the kernel failed.
    ///
    /// # Errors
    /// [`AssistError::ProjectExists`] without `force`, or the first failing
    /// step's error.
    pub async fn init_project(
        &self,
        root: &Path,
        kernel: &str,
        force: bool,
        no_pull: bool,
    ) -> Result<()> {
        if is_pros_project(root) && !force {
            return Err(AssistError::ProjectExists);
        }

        self.init_git_repo(root).await?;
        self.disable_signing(root).await?;

        if !self.succeeds(root, "git", &["add", "-A"]).await
            || !self
                .succeeds(
                    root,
                    "git",
                    &["commit", "--allow-empty", "-m", "Apply PROS kernel"],
                )
                .await
        {
            return Err(AssistError::InitialCommit);
        }

        let applied = self.apply_kernel(root, kernel, no_pull).await;

        if !self.succeeds(root, "git", &["reset", "--hard"]).await {
            return Err(AssistError::ResetInitial);
        }
        applied?;

        console::success(format!("Initialized PROS project at '{}'.", root.display()));
        Ok(())
    }

    /// Write `project.pros` and install `kernel` into `root`
    pub(super) async fn apply_kernel(&self, root: &Path, kernel: &str, no_pull: bool) -> Result<()> {
        write_project_file(root)?;

        let kernel_spec = format!("kernel@{kernel}");
        let mut args = vec!["conductor", "install", kernel_spec.as_str(), "-force-system"];
        if no_pull {
            args.push("--no-download");
        }

        let output = self.tee(root, "pros", &args).await;
        if !output.success() || output.stdout.contains("ERROR") || output.stderr.contains("ERROR")
        {
            return Err(AssistError::InstallKernel);
        }

        Ok(())
    }

    async fn make(&self, root: &Path, all: bool) -> Result<()> {
        console::notice(MAKE_BANNER);

        let args: &[&str] = if all { &["all", "-j"] } else { &["-j"] };
        if self.succeeds(root, "make", args).await {
            Ok(())
        } else {
            Err(AssistError::Make)
        }
    }

    async fn wait_for_brain(&self, root: &Path) {
        loop {
            let info = self
                .capture(root, "pros", &["lsusb", "--target", "v5"])
                .await;
            if info.stdout.contains(" - ") {
                return;
            }
            console::notice("V5 product not found, retrying...");
            tokio::time::sleep(DETECT_INTERVAL).await;
        }
    }
}

/// Write a minimal V5 `project.pros` named after the directory
///
/// # Errors
/// [`AssistError::WriteProjectFile`] if the file cannot be written.
pub fn write_project_file(root: &Path) -> Result<()> {
    let project_name = root
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let contents = json!({
        "py/object": "pros.conductor.project.Project",
        "py/state": {
            "project_name": project_name,
            "target": "v5",
            "templates": {},
            "upload_options": {}
        }
    });

    let data = serde_json::to_vec_pretty(&contents)
        .map_err(|e| AssistError::WriteProjectFile(e.into()))?;
    fs::write(root.join(PROJECT_FILE), data).map_err(AssistError::WriteProjectFile)
}
