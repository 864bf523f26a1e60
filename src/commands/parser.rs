//! REPL line parsing
//!
//! A line is split with shell quoting rules, then parsed by clap. Options are
//! global: any option may follow any command and is ignored where it does
//! not apply.

use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{Args, Parser, Subcommand};

use crate::error::{AssistError, Result};
use crate::project::Label;

/// Kernel version installed when none is given
pub const DEFAULT_KERNEL: &str = "latest";

/// A fully parsed REPL command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `normal` / `all`: build and upload
    Compile {
        /// Rebuild every source file
        all: bool,
        /// Program slot on the brain, 1-8
        slot: u8,
    },
    /// `b`: build only
    Build,
    /// `backup`: commit and push
    Backup,
    /// `init`: initialize git and the PROS project in the working directory
    Init {
        /// Kernel version
        kernel: String,
        /// Overwrite an existing `project.pros`
        force: bool,
        /// Install the kernel from the local cache only
        no_pull: bool,
    },
    /// `link`: point `origin` at a team repository
    Link {
        /// Repository slug; the working directory name when absent
        slug: Option<String>,
    },
    /// `pull`
    Pull,
    /// `clone <LABEL>`
    Clone {
        /// Project label
        label: Label,
        /// Parent directory; the `workspace-dir` setting when absent
        workspace_dir: Option<PathBuf>,
        /// Kernel version
        kernel: String,
        /// Install the kernel from the local cache only
        no_pull: bool,
    },
    /// `create <LABEL>`
    Create {
        /// Project label
        label: Label,
        /// Parent directory; the `workspace-dir` setting when absent
        workspace_dir: Option<PathBuf>,
        /// Kernel version
        kernel: String,
        /// Skip refreshing the template and downloading the kernel
        no_pull: bool,
        /// Do not create a remote repository
        local: bool,
    },
    /// `help`
    Help,
    /// `secret` with anything but two arguments
    ListSecrets,
    /// `secret KEY VALUE`
    SetSecret {
        /// Setting name
        key: String,
        /// New value
        value: String,
    },
}

#[derive(Debug, Parser)]
#[command(
    name = "cmapi",
    no_binary_name = true,
    disable_help_flag = true,
    disable_help_subcommand = true,
    disable_version_flag = true
)]
struct CommandLine {
    #[command(subcommand)]
    command: CommandKind,

    #[command(flatten)]
    options: Options,
}

#[derive(Debug, Args)]
struct Options {
    #[arg(short = 'd', long = "directory", global = true)]
    directory: Option<PathBuf>,

    #[arg(short, long, global = true)]
    force: bool,

    #[arg(short, long, global = true, default_value = DEFAULT_KERNEL)]
    kernel: String,

    #[arg(short, long, global = true)]
    local: bool,

    #[arg(short = 'n', long = "no-pull", global = true)]
    no_pull: bool,

    #[arg(
        short,
        long,
        global = true,
        default_value_t = 1,
        value_parser = clap::value_parser!(u8).range(1..=8)
    )]
    slot: u8,
}

#[derive(Debug, Subcommand)]
enum CommandKind {
    All,
    #[command(name = "b")]
    Build,
    Backup,
    Init,
    Link {
        slug: Option<String>,
    },
    Normal,
    Pull,
    Clone {
        label: Option<String>,
    },
    Create {
        label: Option<String>,
    },
    Help,
    Secret {
        #[arg(num_args = 0..)]
        args: Vec<String>,
    },
}

/// Parse one REPL line
///
/// Returns `Ok(None)` for a line with no words.
///
/// # Errors
/// [`AssistError::ParseCommandLine`] for bad quoting or options,
/// [`AssistError::UnknownCommand`] for an unknown first word, and
/// [`AssistError::InvalidLabel`] for a missing or malformed label.
pub fn parse_command_line(line: &str) -> Result<Option<Command>> {
    let words = shell_words::split(line).map_err(|e| AssistError::parse(e.to_string()))?;
    let Some(first) = words.first().cloned() else {
        return Ok(None);
    };

    let words = words.into_iter().map(normalize_option);
    let parsed = CommandLine::try_parse_from(words).map_err(|e| match e.kind() {
        ErrorKind::InvalidSubcommand | ErrorKind::MissingSubcommand => {
            AssistError::unknown_command(first.clone())
        }
        _ => AssistError::parse(e.render().to_string()),
    })?;

    into_command(parsed).map(Some)
}

/// `-np` is a two-letter short option; clap only knows `--no-pull`
fn normalize_option(word: String) -> String {
    if word == "-np" {
        "--no-pull".to_string()
    } else {
        word
    }
}

fn into_command(parsed: CommandLine) -> Result<Command> {
    let Options {
        directory,
        force,
        kernel,
        local,
        no_pull,
        slot,
    } = parsed.options;

    let command = match parsed.command {
        CommandKind::All => Command::Compile { all: true, slot },
        CommandKind::Normal => Command::Compile { all: false, slot },
        CommandKind::Build => Command::Build,
        CommandKind::Backup => Command::Backup,
        CommandKind::Init => Command::Init {
            kernel,
            force,
            no_pull,
        },
        CommandKind::Link { slug } => Command::Link { slug },
        CommandKind::Pull => Command::Pull,
        CommandKind::Clone { label } => Command::Clone {
            label: Label::parse(label.as_deref().unwrap_or_default())?,
            workspace_dir: directory,
            kernel,
            no_pull,
        },
        CommandKind::Create { label } => Command::Create {
            label: Label::parse(label.as_deref().unwrap_or_default())?,
            workspace_dir: directory,
            kernel,
            no_pull,
            local,
        },
        CommandKind::Help => Command::Help,
        CommandKind::Secret { args } => match <[String; 2]>::try_from(args) {
            Ok([key, value]) => Command::SetSecret { key, value },
            Err(_) => Command::ListSecrets,
        },
    };

    Ok(command)
}
