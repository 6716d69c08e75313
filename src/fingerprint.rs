//! Fingerprint lists.
//!
//! A fingerprint list is plain text, one build fingerprint per line:
//!
//! ```text
//! google/husky/husky:15/AP41.250105.002/12731906:user/release-keys
//! ```
//!
//! Entries are keyed by device codename, taken from the third `/` segment
//! up to the `:`. Used to keep the flagship profile on a current build.

use std::{collections::HashMap, fs, path::Path};

use log::{debug, warn};

use crate::error::ConfigError;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FingerprintTable {
    entries: HashMap<String, String>,
}

impl FingerprintTable {
    pub fn parse(data: &str) -> Self {
        let mut entries = HashMap::new();
        for line in data.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match device_codename(line) {
                Some(device) => {
                    entries.insert(device.to_string(), line.to_string());
                }
                None => debug!("FP: skip malformed line {:?}", line),
            }
        }
        Self { entries }
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::parse(&data);
        if table.is_empty() {
            warn!("FP: {} has no usable fingerprints", path.display());
        }
        Ok(table)
    }

    pub fn get(&self, device: &str) -> Option<&str> {
        self.entries.get(device).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// `brand/product/device:release/id/incremental:type/tags` → `device`.
pub fn device_codename(fingerprint: &str) -> Option<&str> {
    let mut parts = fingerprint.splitn(4, '/');
    parts.next()?;
    parts.next()?;
    let device = parts.next()?.split(':').next()?;
    // a well-formed fingerprint has at least the release after the device
    parts.next()?;
    if device.is_empty() {
        None
    } else {
        Some(device)
    }
}
