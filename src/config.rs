//! Run-control and per-user configuration.
//!
//! Two JSON files feed the tool: a run-control file naming the database
//! replicas (first entry is primary) and an optional per-user file holding
//! the default assignee. Relative database paths resolve against the
//! directory of the run-control file.

use std::io;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::Deserialize;
use thiserror::Error;

use crate::todo::{
    adapters::filesystem::FileSystemDocumentStore,
    domain::{DatabaseName, PersonId, TodoDomainError},
    services::{DEFAULT_PEOPLE_COLLECTION, TodoSettings},
};

/// Run-control file name looked up in the working directory.
pub const DEFAULT_RC_FILE: &str = "grouptodorc.json";

/// Per-user file path below `$HOME`.
pub const USER_CONFIG_RELATIVE_PATH: &str = ".config/grouptodo/user.json";

/// Log level used when neither the command line nor the file sets one.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Errors raised while loading configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// A configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// File path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: Arc<io::Error>,
    },

    /// A configuration file is not valid JSON of the expected shape.
    #[error("failed to parse {path}: {reason}")]
    Parse {
        /// File path, or a label for in-memory sources.
        path: Utf8PathBuf,
        /// Decoder message.
        reason: String,
    },

    /// The run-control file lists no databases.
    #[error("no databases configured; add at least one entry to `databases`")]
    NoDatabases,

    /// A configured value failed validation.
    #[error(transparent)]
    InvalidValue(#[from] TodoDomainError),
}

/// One configured replica.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatabaseEntry {
    /// Replica name.
    pub name: String,
    /// Directory holding the replica's collections.
    pub path: Utf8PathBuf,
}

#[derive(Debug, Deserialize)]
struct RunControlFile {
    #[serde(default)]
    databases: Vec<DatabaseEntry>,
    #[serde(default)]
    people_collection: Option<String>,
    #[serde(default)]
    log_level: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct UserFile {
    #[serde(default)]
    default_user_id: Option<String>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    databases: Vec<(DatabaseName, Utf8PathBuf)>,
    people_collection: String,
    log_level: String,
    default_user_id: Option<PersonId>,
}

impl AppConfig {
    /// Loads the run-control file and, when present, the user file.
    ///
    /// A missing user file is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a file cannot be read or parsed, or
    /// when no databases are configured.
    pub fn load(rc_path: &Utf8Path, user_path: Option<&Utf8Path>) -> Result<Self, ConfigError> {
        let rc_contents = read_file(rc_path)?.ok_or_else(|| ConfigError::Read {
            path: rc_path.to_owned(),
            source: Arc::new(io::Error::from(io::ErrorKind::NotFound)),
        })?;
        let user_contents = match user_path {
            Some(path) => read_file(path)?,
            None => None,
        };
        let base_dir = rc_path
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));
        Self::from_sources(&rc_contents, user_contents.as_deref(), base_dir)
    }

    /// Builds configuration from file contents.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when either source is malformed or no
    /// databases are configured.
    pub fn from_sources(
        rc_contents: &str,
        user_contents: Option<&str>,
        base_dir: &Utf8Path,
    ) -> Result<Self, ConfigError> {
        let rc: RunControlFile =
            serde_json::from_str(rc_contents).map_err(|err| ConfigError::Parse {
                path: Utf8PathBuf::from(DEFAULT_RC_FILE),
                reason: err.to_string(),
            })?;
        let user: UserFile = user_contents
            .map(serde_json::from_str)
            .transpose()
            .map_err(|err| ConfigError::Parse {
                path: Utf8PathBuf::from(USER_CONFIG_RELATIVE_PATH),
                reason: err.to_string(),
            })?
            .unwrap_or_default();

        if rc.databases.is_empty() {
            return Err(ConfigError::NoDatabases);
        }
        let databases = rc
            .databases
            .into_iter()
            .map(|entry| {
                let name = DatabaseName::new(entry.name)?;
                let path = if entry.path.is_absolute() {
                    entry.path
                } else {
                    base_dir.join(entry.path)
                };
                Ok((name, path))
            })
            .collect::<Result<Vec<_>, TodoDomainError>>()?;
        let default_user_id = user
            .default_user_id
            .filter(|id| !id.trim().is_empty())
            .map(PersonId::new)
            .transpose()?;

        Ok(Self {
            databases,
            people_collection: rc
                .people_collection
                .unwrap_or_else(|| DEFAULT_PEOPLE_COLLECTION.to_owned()),
            log_level: rc
                .log_level
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_owned()),
            default_user_id,
        })
    }

    /// Returns the replicas with their directories, primary first.
    #[must_use]
    pub fn databases(&self) -> &[(DatabaseName, Utf8PathBuf)] {
        &self.databases
    }

    /// Returns the configured log level.
    #[must_use]
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    /// Returns the default assignee, if configured.
    #[must_use]
    pub const fn default_user_id(&self) -> Option<&PersonId> {
        self.default_user_id.as_ref()
    }

    /// Builds service settings from this configuration.
    #[must_use]
    pub fn settings(&self) -> TodoSettings {
        let settings = TodoSettings::new(self.databases.iter().map(|(name, _)| name.clone()))
            .with_collection(self.people_collection.clone());
        match &self.default_user_id {
            Some(id) => settings.with_default_assignee(id.clone()),
            None => settings,
        }
    }

    /// Builds the filesystem store backing every replica.
    #[must_use]
    pub fn document_store(&self) -> FileSystemDocumentStore {
        FileSystemDocumentStore::new(self.databases.iter().cloned())
    }
}

/// Returns `$HOME/.config/grouptodo/user.json`, if `HOME` is set.
#[must_use]
pub fn default_user_config_path() -> Option<Utf8PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|home| Utf8PathBuf::from(home).join(USER_CONFIG_RELATIVE_PATH))
}

/// Reads a file through its parent directory capability; `None` when the
/// file does not exist.
fn read_file(path: &Utf8Path) -> Result<Option<String>, ConfigError> {
    let read_error = |source: io::Error| ConfigError::Read {
        path: path.to_owned(),
        source: Arc::new(source),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| read_error(io::Error::other("path must include a file name")))?;
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let dir = match Dir::open_ambient_dir(parent, ambient_authority()) {
        Ok(dir) => dir,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(read_error(err)),
    };
    match dir.read_to_string(file_name) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(read_error(err)),
    }
}
