//! Error types for the robotics assistant
//!
//! Every user-facing failure carries a stable numeric code. The console prints
//! them as `Error <code>: <message>`, so the `Display` text of each variant is
//! exactly what the user reads.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the assistant
#[derive(Error, Debug)]
pub enum AssistError {
    /// `git` missing from PATH
    #[error("Git is not installed or not in the PATH.")]
    GitNotFound,

    /// `pros` missing from PATH
    #[error("PROS is not installed or not in the PATH.")]
    ProsNotFound,

    /// Directory is not inside a git work tree
    #[error("Not a git repository.")]
    NotGitRepo,

    /// Could not add or update the `origin` remote
    #[error("Failed to link remote repository.")]
    LinkRemote,

    /// A `git config` call failed
    #[error("Failed to set git config.")]
    GitConfig,

    /// `git add` / `git commit` failed during backup
    #[error("Failed to create the backup commit.")]
    BackupCommit,

    /// `git push` failed during backup
    #[error("Failed to push the backup commit.")]
    BackupPush,

    /// `make` failed
    #[error("Failed to make.")]
    Make,

    /// Every upload attempt failed
    #[error("Failed to upload.")]
    Upload,

    /// `project.pros` already exists and `--force` was not given
    #[error("PROS project already exists. Use --force to overwrite the project.pros file.")]
    ProjectExists,

    /// Initial commit before applying the kernel failed
    #[error("Failed to create the initial commit.")]
    InitialCommit,

    /// `git reset --hard` after applying the kernel failed
    #[error("Failed to reset to the initial commit.")]
    ResetInitial,

    /// `git pull` failed
    #[error("Failed to pull.")]
    Pull,

    /// Project directory could not be created
    #[error("Failed to create the project directory '{}'.", .0.display())]
    CreateProjectDir(PathBuf),

    /// `git clone` of a project failed
    #[error("Failed to clone.")]
    Clone,

    /// `git clone` of the template repository failed
    #[error("Failed to clone the template repository.")]
    CloneTemplate,

    /// Relinking the local template repository failed
    #[error("Failed to link the template repository.")]
    LinkTemplate,

    /// No template repository on disk
    #[error("No template repository found in the local machine at '{}'.", .0.display())]
    TemplateMissing(PathBuf),

    /// Target directory is already a repository
    #[error("Repository already exists.")]
    RepositoryExists,

    /// Copying the template tree failed
    #[error("Failed to copy the template repository.")]
    CopyTemplate,

    /// The remote API could not be reached
    #[error("Failed to create the remote repository.")]
    CreateRemote(#[source] reqwest::Error),

    /// The remote API answered with a non-success status
    #[error("Failed to create the remote repository with status {0}.")]
    RemoteStatus(String),

    /// Initial push of a freshly created repository failed
    #[error("Failed to push to the server.")]
    Push,

    /// `git init` failed
    #[error("Failed to initialize git repository.")]
    GitInit,

    /// `project.pros` could not be written
    #[error("Failed to write project.pros")]
    WriteProjectFile(#[source] io::Error),

    /// `pros conductor install` failed or reported `ERROR`
    #[error("Failed to install kernel.")]
    InstallKernel,

    /// Settings file could not be read or parsed
    #[error("Failed to read the secret file.")]
    SecretRead,

    /// Current user or home directory unavailable
    #[error("Failed to get user information.")]
    UserInfo,

    /// Administrator directory could not be created
    #[error("Failed to access the administrator directory.")]
    AdminDir(#[source] io::Error),

    /// Current working directory unavailable
    #[error("Failed to get working directory.")]
    WorkingDir(#[source] io::Error),

    /// `secret KEY VALUE` with a key that is not a known setting
    #[error("Secret key '{0}' does not exist.")]
    UnknownSecret(String),

    /// `git reset --hard` after cloning failed
    #[error("Failed to reset to the latest commit.")]
    ResetLatest,

    /// `PROS_TOOLCHAIN` is not set
    #[error("'PROS_TOOLCHAIN' environment variable is not defined.")]
    ToolchainUndefined,

    /// Serial access requires membership in `dialout`
    #[error("User should be in the 'dialout' group.")]
    DialoutGroup,

    /// No `project.pros` in the directory
    #[error("Not a PROS project, use command 'init' to initialize it.")]
    NotProsProject,

    /// Label does not match `^[A-Z0-9-]+$`
    #[error("Invalid label, only capital letters, digits and hyphens are accepted.")]
    InvalidLabel,

    /// The REPL line could not be split or parsed
    #[error("Failed to parse command line.")]
    ParseCommandLine(String),

    /// First word of the REPL line is not a command
    #[error("Unknown command '{0}'.")]
    UnknownCommand(String),
}

/// Result type alias for assistant operations
pub type Result<T> = std::result::Result<T, AssistError>;

impl AssistError {
    /// Numeric code shown to the user
    #[must_use]
    pub fn code(&self) -> u16 {
        match self {
            Self::GitNotFound => 100,
            Self::ProsNotFound => 101,
            Self::NotGitRepo => 102,
            Self::LinkRemote => 103,
            Self::GitConfig => 104,
            Self::BackupCommit => 105,
            Self::BackupPush => 106,
            Self::Make => 107,
            Self::Upload => 108,
            Self::ProjectExists => 109,
            Self::InitialCommit => 110,
            Self::ResetInitial => 111,
            Self::Pull => 112,
            Self::CreateProjectDir(_) => 113,
            Self::Clone => 114,
            Self::CloneTemplate => 115,
            Self::LinkTemplate => 116,
            Self::TemplateMissing(_) => 117,
            Self::RepositoryExists => 118,
            Self::CopyTemplate => 119,
            Self::CreateRemote(_) => 120,
            Self::RemoteStatus(_) => 121,
            Self::Push => 122,
            Self::GitInit => 123,
            Self::WriteProjectFile(_) => 124,
            Self::InstallKernel => 125,
            Self::SecretRead => 126,
            Self::UserInfo => 127,
            Self::AdminDir(_) => 128,
            Self::WorkingDir(_) => 129,
            Self::UnknownSecret(_) => 130,
            Self::ResetLatest => 131,
            Self::ToolchainUndefined => 132,
            Self::DialoutGroup => 133,
            Self::NotProsProject => 134,
            Self::InvalidLabel => 200,
            Self::ParseCommandLine(_) => 300,
            Self::UnknownCommand(_) => 301,
        }
    }

    /// Create a command line parse error
    pub fn parse(detail: impl Into<String>) -> Self {
        Self::ParseCommandLine(detail.into())
    }

    /// Create an unknown command error
    pub fn unknown_command(command: impl Into<String>) -> Self {
        Self::UnknownCommand(command.into())
    }

    /// Create an unknown secret key error
    pub fn unknown_secret(key: impl Into<String>) -> Self {
        Self::UnknownSecret(key.into())
    }

    /// Create a remote status error
    pub fn remote_status(status: impl Into<String>) -> Self {
        Self::RemoteStatus(status.into())
    }
}

// ============================================================================
// INPUT READER ERRORS
// ============================================================================

/// Terminal failure of the interactive input stream
///
/// Cloneable so the reader can hand the same recorded error to every read
/// attempt after the stream has failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct StreamError {
    kind: io::ErrorKind,
    message: String,
}

impl StreamError {
    /// End of stream
    #[must_use]
    pub fn closed() -> Self {
        Self {
            kind: io::ErrorKind::UnexpectedEof,
            message: "input stream closed".to_string(),
        }
    }

    /// I/O error kind behind the failure
    #[must_use]
    pub fn kind(&self) -> io::ErrorKind {
        self.kind
    }

    /// True when the stream simply reached its end
    #[must_use]
    pub fn is_eof(&self) -> bool {
        self.kind == io::ErrorKind::UnexpectedEof
    }
}

impl From<io::Error> for StreamError {
    fn from(err: io::Error) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Outcome of a read attempt that produced no line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadError {
    /// Nothing buffered right now; try again later
    #[error("no data")]
    NoData,

    /// The input stream failed; permanent
    #[error("input stream failed: {0}")]
    Stream(#[from] StreamError),
}

impl ReadError {
    /// True for the routine "nothing pending" outcome
    #[must_use]
    pub fn is_no_data(&self) -> bool {
        matches!(self, Self::NoData)
    }
}
