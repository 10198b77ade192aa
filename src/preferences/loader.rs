// src/preferences/loader.rs
//! Preferences loader
//!
//! Reads the toggle document once, synchronously, during activation. The
//! document is a flat JSON object of preference keys to booleans:
//!
//! ```json
//! { "adb_enabled": true, "sys_usb_config": false }
//! ```
//!
//! Keys the catalog does not know and non-boolean values are ignored.

use crate::preferences::snapshot::ConfigurationSnapshot;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};

/// Preferences load failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// Resource missing or unreadable
    #[error("{0}")]
    NotFound(String),

    /// Resource readable but not a preferences document
    #[error("{0}")]
    Malformed(String),
}

/// Readable handle to the preferences blob
pub trait ConfigSource {
    /// Human-readable location, for logs
    fn describe(&self) -> String;

    fn open(&self) -> io::Result<Box<dyn Read + '_>>;
}

/// Preferences file inside the module's private directory
#[derive(Debug, Clone)]
pub struct ModuleDirSource {
    path: PathBuf,
}

impl ModuleDirSource {
    pub fn new(module_dir: impl Into<PathBuf>, file_name: &str) -> Self {
        Self {
            path: module_dir.into().join(file_name),
        }
    }
}

impl ConfigSource for ModuleDirSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(File::open(&self.path)?))
    }
}

/// In-memory blob, as handed over by hosts that read the file themselves
impl ConfigSource for Vec<u8> {
    fn describe(&self) -> String {
        format!("<memory: {} bytes>", self.len())
    }

    fn open(&self) -> io::Result<Box<dyn Read + '_>> {
        Ok(Box::new(self.as_slice()))
    }
}

/// Preferences loader
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    max_bytes: u64,
    absent_default: bool,
}

impl ConfigLoader {
    pub fn new(max_bytes: u64, absent_default: bool) -> Self {
        Self {
            max_bytes,
            absent_default,
        }
    }

    /// Read and parse one snapshot
    pub fn load(&self, source: &dyn ConfigSource) -> Result<ConfigurationSnapshot, LoadError> {
        let location = source.describe();
        debug!("Loading preferences from {}", location);

        let bytes = self.read_bounded(source).map_err(|err| match err {
            ReadFailure::Io(err) => LoadError::NotFound(format!("{}: {}", location, err)),
            ReadFailure::TooLarge => LoadError::Malformed(format!(
                "{} exceeds {} bytes",
                location, self.max_bytes
            )),
        })?;

        let snapshot = self.parse(&bytes)?;
        info!("Loaded {} preference flags from {}", snapshot.len(), location);
        Ok(snapshot)
    }

    /// Parse a preferences document
    pub fn parse(&self, bytes: &[u8]) -> Result<ConfigurationSnapshot, LoadError> {
        let document: serde_json::Value = serde_json::from_slice(bytes)
            .map_err(|err| LoadError::Malformed(err.to_string()))?;

        let object = document.as_object().ok_or_else(|| {
            LoadError::Malformed("preferences document must be a JSON object".to_string())
        })?;

        let mut flags = HashMap::with_capacity(object.len());
        for (key, value) in object {
            match value.as_bool() {
                Some(flag) => {
                    flags.insert(key.clone(), flag);
                }
                None => debug!("Ignoring non-boolean preference {}", key),
            }
        }

        Ok(ConfigurationSnapshot::new(flags, self.absent_default))
    }

    fn read_bounded(&self, source: &dyn ConfigSource) -> Result<Vec<u8>, ReadFailure> {
        let reader = source.open().map_err(ReadFailure::Io)?;

        let mut bytes = Vec::new();
        reader
            .take(self.max_bytes.saturating_add(1))
            .read_to_end(&mut bytes)
            .map_err(ReadFailure::Io)?;

        if bytes.len() as u64 > self.max_bytes {
            return Err(ReadFailure::TooLarge);
        }

        Ok(bytes)
    }
}

enum ReadFailure {
    Io(io::Error),
    TooLarge,
}
