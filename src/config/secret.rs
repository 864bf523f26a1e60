//! Settings ("secret") file
//!
//! A flat string map persisted as indented JSON. Keys are fixed by the
//! defaults: unknown keys can never be set, and keys missing from an older
//! file are filled in on load.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::console;
use crate::error::{AssistError, Result};

use super::environment::UserInfo;

/// File name of the settings file inside the administrator directory
pub const SECRET_FILE_NAME: &str = ".cmapi-cli-secret.json";

/// Directory under the home directory where projects are cloned by default
pub const DEFAULT_WORKSPACE_DIR: &str = "cmapi-projects";

/// Built-in setting keys and values
const DEFAULTS: &[(&str, &str)] = &[
    ("computer-name", "unknown"),
    ("email", "cmass-robotics-team-bot@proton.me"),
    ("username", "cmass-robotics-team-bot"),
    ("password", ""),
    ("workspace", "vex7984"),
    ("workspace-dir", ""),
    ("project", "CURRENT"),
    ("template-repo", "cmapi-build"),
    ("repo-slug-prefix", "7984-"),
    ("repo-name-prefix", "7984 - "),
];

/// Setting values keyed by name
pub type SecretMap = BTreeMap<String, String>;

/// Loaded settings bound to their file
#[derive(Debug, Clone)]
pub struct Secrets {
    path: PathBuf,
    values: SecretMap,
}

impl Secrets {
    /// Wrap `values` without touching the file system
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, values: SecretMap) -> Self {
        Self {
            path: path.into(),
            values,
        }
    }

    /// Default settings for `user`
    ///
    /// `computer-name` becomes the login name when it is not blank, and
    /// `workspace-dir` points at `<home>/cmapi-projects`.
    #[must_use]
    pub fn defaults(user: &UserInfo) -> SecretMap {
        let mut values: SecretMap = DEFAULTS
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();

        let name = user.name.trim();
        if !name.is_empty() {
            values.insert("computer-name".to_string(), name.to_string());
        }
        values.insert(
            "workspace-dir".to_string(),
            user.home.join(DEFAULT_WORKSPACE_DIR).to_string_lossy().into_owned(),
        );

        values
    }

    /// Load the settings file, creating or upgrading it as needed
    ///
    /// A missing file is written with `defaults`. Keys present in `defaults`
    /// but missing from the file are added and the file is rewritten.
    ///
    /// # Errors
    /// [`AssistError::SecretRead`] if the file cannot be read or parsed.
    pub fn load_or_init(path: impl Into<PathBuf>, defaults: SecretMap) -> Result<Self> {
        let path = path.into();

        if !path.exists() {
            log::info!("Creating settings file {}", path.display());
            if let Err(e) = write_json(&path, &defaults) {
                log::warn!("Failed to write {}: {}", path.display(), e);
            }
        }

        let mut values = read_json(&path).map_err(|e| {
            log::warn!("Failed to read {}: {}", path.display(), e);
            AssistError::SecretRead
        })?;

        if merge_missing(&defaults, &mut values) {
            if let Err(e) = write_json(&path, &values) {
                log::warn!("Failed to write {}: {}", path.display(), e);
            }
            console::notice("Secret file updated.");
        }

        Ok(Self { path, values })
    }

    /// Value of `key`, empty when unset
    #[must_use]
    pub fn get(&self, key: &str) -> &str {
        self.values.get(key).map_or("", String::as_str)
    }

    /// Change an existing setting and persist the file
    ///
    /// # Errors
    /// [`AssistError::UnknownSecret`] if `key` is not a known setting.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        let Some(slot) = self.values.get_mut(key) else {
            return Err(AssistError::unknown_secret(key));
        };
        *slot = value.into();

        if let Err(e) = write_json(&self.path, &self.values) {
            log::warn!("Failed to write {}: {}", self.path.display(), e);
        }
        Ok(())
    }

    /// All settings in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Location of the settings file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Copy keys from `defaults` that `values` lacks
///
/// Returns true when anything was added. Existing values are never changed.
pub fn merge_missing(defaults: &SecretMap, values: &mut SecretMap) -> bool {
    let mut outdated = false;
    for (key, value) in defaults {
        if !values.contains_key(key) {
            values.insert(key.clone(), value.clone());
            outdated = true;
        }
    }
    outdated
}

fn read_json(path: &Path) -> io::Result<SecretMap> {
    let data = fs::read(path)?;
    serde_json::from_slice(&data).map_err(io::Error::from)
}

fn write_json(path: &Path, values: &SecretMap) -> io::Result<()> {
    let mut data = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut data, formatter);
    values.serialize(&mut serializer).map_err(io::Error::from)?;

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(&data)?;
    file.flush()
}
