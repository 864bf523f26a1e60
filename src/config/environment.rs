//! Startup environment checks
//!
//! Resolves the user, the administrator directory, and the working directory,
//! and verifies that the external tools the workflows depend on are present.

use std::env;
use std::fs;
use std::path::PathBuf;

use crate::error::{AssistError, Result};

use super::secret::SECRET_FILE_NAME;

/// Name of the administrator directory under the home directory
pub const ADMIN_DIR_NAME: &str = ".cmapi-cli";

/// Environment variable the PROS toolchain must define
pub const TOOLCHAIN_VAR: &str = "PROS_TOOLCHAIN";

/// Current user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    /// Login name
    pub name: String,
    /// Home directory
    pub home: PathBuf,
}

impl UserInfo {
    /// Look up the user running this process
    ///
    /// # Errors
    /// [`AssistError::UserInfo`] if the home directory cannot be determined.
    pub fn current() -> Result<Self> {
        let home = dirs::home_dir().ok_or(AssistError::UserInfo)?;
        Ok(Self {
            name: whoami::username(),
            home,
        })
    }
}

/// Resolved paths the assistant works with
#[derive(Debug, Clone)]
pub struct Environment {
    /// User running the assistant
    pub user: UserInfo,
    /// `<home>/.cmapi-cli`, holds the settings and the template clone
    pub admin_dir: PathBuf,
    /// Directory the project commands act on
    pub working_dir: PathBuf,
}

impl Environment {
    /// Build an environment from explicit parts
    #[must_use]
    pub fn new(user: UserInfo, admin_dir: PathBuf, working_dir: PathBuf) -> Self {
        Self {
            user,
            admin_dir,
            working_dir,
        }
    }

    /// Location of the settings file
    #[must_use]
    pub fn secret_file(&self) -> PathBuf {
        self.admin_dir.join(SECRET_FILE_NAME)
    }

    /// Resolve the environment and run every startup check
    ///
    /// Non-fatal failures are collected in the report rather than stopping
    /// the checks, so the user sees all of them at once.
    ///
    /// # Errors
    /// [`AssistError::UserInfo`] when the current user cannot be resolved;
    /// nothing else can be checked without it.
    pub fn setup() -> Result<SetupReport> {
        let user = UserInfo::current()?;
        let mut failures = Vec::new();

        if let Some(failure) = check_dialout_group(&user) {
            failures.push(failure);
        }
        failures.extend(check_tools());
        if env::var_os(TOOLCHAIN_VAR).is_none() {
            failures.push(AssistError::ToolchainUndefined);
        }

        let admin_dir = user.home.join(ADMIN_DIR_NAME);
        if let Err(e) = fs::create_dir_all(&admin_dir) {
            failures.push(AssistError::AdminDir(e));
        }

        let working_dir = match env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                failures.push(AssistError::WorkingDir(e));
                PathBuf::from(".")
            }
        };

        Ok(SetupReport {
            environment: Self::new(user, admin_dir, working_dir),
            failures,
        })
    }
}

/// Outcome of [`Environment::setup`]
#[derive(Debug)]
pub struct SetupReport {
    /// Resolved environment, usable even when some checks failed
    pub environment: Environment,
    /// Failed checks, in the order they ran
    pub failures: Vec<AssistError>,
}

impl SetupReport {
    /// True when every check passed
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Check that `git` and `pros` are on PATH
pub fn check_tools() -> Vec<AssistError> {
    let mut failures = Vec::new();
    if which::which("git").is_err() {
        failures.push(AssistError::GitNotFound);
    }
    if which::which("pros").is_err() {
        failures.push(AssistError::ProsNotFound);
    }
    failures
}

/// Serial ports on linux are owned by `dialout`
#[cfg(target_os = "linux")]
fn check_dialout_group(user: &UserInfo) -> Option<AssistError> {
    use nix::unistd::{Group, User};

    // No such group on this distribution
    let group = Group::from_name("dialout").ok().flatten()?;

    let listed = group.mem.iter().any(|member| member == &user.name);
    let primary = User::from_name(&user.name)
        .ok()
        .flatten()
        .is_some_and(|u| u.gid == group.gid);

    (!listed && !primary).then_some(AssistError::DialoutGroup)
}

#[cfg(not(target_os = "linux"))]
fn check_dialout_group(_user: &UserInfo) -> Option<AssistError> {
    None
}
