//! Command dispatch
//!
//! [`Assistant`] owns everything a command needs: the executor, the hosting
//! client, the resolved environment, and the settings.

use std::path::PathBuf;

use crate::config::{Environment, Secrets};
use crate::console;
use crate::error::Result;
use crate::process::Executor;
use crate::project::{RepositoryHost, Workflows};

use super::help::USAGE;
use super::parser::Command;

/// Session state shared by every command
pub struct Assistant<E: Executor, H: RepositoryHost> {
    executor: E,
    host: H,
    environment: Environment,
    secrets: Secrets,
}

impl<E: Executor, H: RepositoryHost> Assistant<E, H> {
    /// Assemble a session
    pub fn new(executor: E, host: H, environment: Environment, secrets: Secrets) -> Self {
        Self {
            executor,
            host,
            environment,
            secrets,
        }
    }

    /// Executor used for every external tool
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Current settings
    pub fn secrets(&self) -> &Secrets {
        &self.secrets
    }

    /// Resolved environment
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Run `command`
    ///
    /// Project commands act on the working directory captured at startup.
    ///
    /// # Errors
    /// The coded error of the failing workflow step.
    pub async fn execute(&mut self, command: Command) -> Result<()> {
        let root = self.environment.working_dir.clone();

        match command {
            Command::Compile { all, slot } => self.workflows().compile(&root, all, slot).await,
            Command::Build => self.workflows().build(&root).await,
            Command::Backup => self.workflows().backup(&root).await,
            Command::Init {
                kernel,
                force,
                no_pull,
            } => {
                self.workflows()
                    .init_project(&root, &kernel, force, no_pull)
                    .await
            }
            Command::Link { slug } => {
                let slug = slug.unwrap_or_else(|| {
                    root.file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default()
                });
                self.workflows().link(&root, &slug).await
            }
            Command::Pull => self.workflows().pull(&root).await,
            Command::Clone {
                label,
                workspace_dir,
                kernel,
                no_pull,
            } => {
                let workspace_dir = self.workspace_dir(workspace_dir);
                self.workflows()
                    .clone_project(&label, &workspace_dir, &kernel, no_pull)
                    .await
            }
            Command::Create {
                label,
                workspace_dir,
                kernel,
                no_pull,
                local,
            } => {
                let workspace_dir = self.workspace_dir(workspace_dir);
                self.workflows()
                    .create_project(&self.host, &label, &workspace_dir, &kernel, no_pull, local)
                    .await
            }
            Command::Help => {
                console::notice(USAGE);
                Ok(())
            }
            Command::ListSecrets => {
                console::notice("Listing secrets...");
                for (key, value) in self.secrets.iter() {
                    console::key_value(key, value);
                }
                Ok(())
            }
            Command::SetSecret { key, value } => self.secrets.set(&key, value),
        }
    }

    fn workflows(&self) -> Workflows<'_, E> {
        Workflows::new(&self.executor, &self.secrets, &self.environment.admin_dir)
    }

    fn workspace_dir(&self, requested: Option<PathBuf>) -> PathBuf {
        requested.unwrap_or_else(|| PathBuf::from(self.secrets.get("workspace-dir")))
    }
}
