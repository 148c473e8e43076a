//! Persistence of the configuration document.

use crate::config::{ConfigError, Configuration};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, info};

/// Loads and saves the configuration document.
///
/// The aggregation code never touches storage directly; callers inject a store.
pub trait ConfigurationStore: Send + Sync {
    /// Returns the saved configuration, or `None` if nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a saved document exists but cannot be read or is invalid.
    fn load(&self) -> Result<Option<Configuration>, ConfigError>;

    /// Replaces the saved configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the document cannot be written.
    fn save(&self, config: &Configuration) -> Result<(), ConfigError>;
}

/// Stores the configuration as a JSON file.
#[derive(Debug, Clone)]
pub struct FileConfigurationStore {
    path: PathBuf,
}

impl FileConfigurationStore {
    /// Creates a store backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn path_str(&self) -> String {
        self.path.display().to_string()
    }
}

impl ConfigurationStore for FileConfigurationStore {
    fn load(&self) -> Result<Option<Configuration>, ConfigError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No configuration file");
            return Ok(None);
        }

        let json = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::IoError {
            path: self.path_str(),
            source: e,
        })?;

        Configuration::from_json(&json, &self.path_str()).map(Some)
    }

    fn save(&self, config: &Configuration) -> Result<(), ConfigError> {
        let json = config.to_json(&self.path_str())?;
        let io_error = |e: std::io::Error| ConfigError::IoError {
            path: self.path_str(),
            source: e,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(io_error)?;

        // Write next to the target so the rename stays on one filesystem.
        let mut temp = tempfile::NamedTempFile::new_in(&dir).map_err(io_error)?;
        temp.write_all(json.as_bytes()).map_err(io_error)?;
        temp.write_all(b"\n").map_err(io_error)?;
        temp.persist(&self.path).map_err(|e| io_error(e.error))?;

        info!(path = %self.path.display(), "Configuration saved");
        Ok(())
    }
}

/// Keeps the configuration in memory only.
#[derive(Debug, Default)]
pub struct MemoryConfigurationStore {
    config: RwLock<Option<Configuration>>,
}

impl MemoryConfigurationStore {
    /// Creates a store pre-populated with a configuration.
    pub fn with_config(config: Configuration) -> Self {
        Self {
            config: RwLock::new(Some(config)),
        }
    }
}

impl ConfigurationStore for MemoryConfigurationStore {
    fn load(&self) -> Result<Option<Configuration>, ConfigError> {
        Ok(self
            .config
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone())
    }

    fn save(&self, config: &Configuration) -> Result<(), ConfigError> {
        *self
            .config
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(config.clone());
        Ok(())
    }
}

/// Loads the configuration, treating absence as an error.
///
/// # Errors
///
/// Returns [`ConfigError::NotConfigured`] if the store is empty, or any load error.
pub fn require_configuration(
    store: &dyn ConfigurationStore,
    location: &str,
) -> Result<Configuration, ConfigError> {
    store.load()?.ok_or_else(|| ConfigError::NotConfigured {
        path: location.to_string(),
    })
}

/// Validates an uploaded document and saves it.
///
/// A malformed or invalid document is rejected before the store is touched,
/// so any previously saved configuration stays in place.
///
/// # Errors
///
/// Returns [`ConfigError`] if the document is invalid or cannot be saved.
pub fn import_configuration(
    store: &dyn ConfigurationStore,
    json: &str,
) -> Result<Configuration, ConfigError> {
    let config = Configuration::from_json(json, "<import>")?;
    store.save(&config)?;
    info!(
        repositories = config.repositories.len(),
        "Configuration imported"
    );
    Ok(config)
}
