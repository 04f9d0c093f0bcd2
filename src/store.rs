// Local persistence for the two small JSON files the CLI depends on: the
// configured host and the token handed out by `db connect`.
//
// Reads are soft: a missing or unreadable file degrades to the default
// host / no credential and logs a warning. Writes are hard failures.

use crate::error::CliResult;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DEFAULT_HOST: &str = "http://localhost:2818";

const CONFIG_FILE: &str = ".chaindb-config.json";
const TOKEN_FILE: &str = ".chaindb-token.json";

/// The configured remote host.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    #[serde(default)]
    pub host: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            host: DEFAULT_HOST.to_string(),
        }
    }
}

/// Token bound to the database it was issued for. Only one is kept.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub database: String,
}

fn home_file(name: &str) -> PathBuf {
    let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    dir.join(name)
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Option<T>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&text).map(Some).map_err(|e| e.to_string())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    fs::write(path, text)?;
    debug!(path = %path.display(), "wrote store file");
    Ok(())
}

/// File-backed store for [`Configuration`].
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store at `~/.chaindb-config.json`.
    pub fn from_home() -> Self {
        Self::at(home_file(CONFIG_FILE))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        ConfigStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Never fails. Anything other than a readable file with a non-empty
    /// host yields the default configuration.
    pub fn load(&self) -> Configuration {
        match read_json::<Configuration>(&self.path) {
            Ok(Some(config)) if !config.host.is_empty() => config,
            Ok(_) => Configuration::default(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Could not load configuration file.");
                Configuration::default()
            }
        }
    }

    pub fn save(&self, config: &Configuration) -> CliResult<()> {
        write_json(&self.path, config)
    }
}

/// File-backed store for the single active [`Credential`].
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Store at `~/.chaindb-token.json`.
    pub fn from_home() -> Self {
        Self::at(home_file(TOKEN_FILE))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        CredentialStore { path: path.into() }
    }

    pub fn load(&self) -> Option<Credential> {
        match read_json::<Credential>(&self.path) {
            Ok(credential) => credential,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Could not load authentication token.");
                None
            }
        }
    }

    /// Replaces whatever credential was stored before.
    pub fn save(&self, credential: &Credential) -> CliResult<()> {
        write_json(&self.path, credential)
    }
}
