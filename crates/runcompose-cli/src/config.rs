//! Locating and reading the `config.toml` that sets rendering defaults.
//!
//! A config file only carries a `[render]` table:
//!
//! ```toml
//! [render]
//! indent = 2
//! dialect = "v3x"
//! ```
//!
//! Missing keys keep their defaults (indent 4, dialect `latest`), and
//! `--indent`/`--dialect` on the command line win over the file.

use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use runcompose::{RunComposeError, config::AppConfig};

/// Config file looked up relative to the working directory.
const LOCAL_CONFIG: &str = "runcompose/config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Missing configuration file: {}", .0.display())]
    MissingFile(PathBuf),
}

impl From<ConfigError> for RunComposeError {
    fn from(err: ConfigError) -> Self {
        RunComposeError::Io(io::Error::other(err.to_string()))
    }
}

/// Where a config file candidate comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    /// `--config`. Must exist.
    Flag,
    Local,
    Platform,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Origin::Flag => "--config",
            Origin::Local => "working directory",
            Origin::Platform => "platform config directory",
        })
    }
}

/// Config file candidates in lookup order.
///
/// An explicit path replaces the search entirely.
fn candidates(explicit_path: Option<&Path>) -> Vec<(Origin, PathBuf)> {
    if let Some(path) = explicit_path {
        return vec![(Origin::Flag, path.to_path_buf())];
    }

    let mut candidates = vec![(Origin::Local, PathBuf::from(LOCAL_CONFIG))];
    match ProjectDirs::from("com", "runcompose", "runcompose") {
        Some(dirs) => candidates.push((Origin::Platform, dirs.config_dir().join("config.toml"))),
        None => debug!("No platform config directory on this system"),
    }
    candidates
}

/// Load the render settings for this run.
///
/// The first existing file among `--config`, `runcompose/config.toml` and
/// the platform config directory is used. Without one, defaults apply.
///
/// # Errors
///
/// Fails when the `--config` file does not exist, or when the chosen file
/// cannot be read or is not a valid config.
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, RunComposeError> {
    let explicit_path = explicit_path.as_ref().map(|path| path.as_ref());

    for (origin, path) in candidates(explicit_path) {
        if path.is_file() {
            info!(origin = origin.to_string(), path = path.display().to_string(); "Loading configuration");
            return read_config(&path);
        }
        if origin == Origin::Flag {
            return Err(ConfigError::MissingFile(path).into());
        }
        debug!(origin = origin.to_string(), path = path.display().to_string(); "No configuration file");
    }

    debug!("Using default configuration");
    Ok(AppConfig::default())
}

fn read_config(path: &Path) -> Result<AppConfig, RunComposeError> {
    let content = fs::read_to_string(path)?;
    let config = toml::from_str(&content).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    Ok(config)
}
