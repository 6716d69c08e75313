use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use log::{info, warn};

use crate::{
    error::{ConfigError, FieldError},
    fingerprint::device_codename,
    identity::{Field, FieldValue},
    profiles::{builtin_profiles, DeviceProfile},
};

/// Overlay config shipped next to the module.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SpoofConfig {
    /// Fingerprint of a certified build, handed to the Play Store.
    /// Empty disables that rule.
    #[serde(default)]
    pub certified_fingerprint: String,

    /// Stock fingerprint of this device, handed to ARCore so it finds the
    /// device's calibration data. Empty disables that rule.
    #[serde(default)]
    pub stock_fingerprint: String,

    /// Packages that always keep the real identity.
    #[serde(default)]
    pub excluded_packages: Vec<String>,

    /// Optional fingerprint list used to refresh the flagship fingerprint.
    #[serde(default)]
    pub fingerprint_list: Option<PathBuf>,

    /// Per-profile field patches: profile name -> `Build` field name -> value.
    #[serde(default)]
    pub profile_overrides: BTreeMap<String, BTreeMap<String, Value>>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl SpoofConfig {
    pub fn validate_and_normalize(&mut self) -> Result<(), String> {
        self.certified_fingerprint = self.certified_fingerprint.trim().to_string();
        self.stock_fingerprint = self.stock_fingerprint.trim().to_string();

        for (key, fp) in [
            ("certified_fingerprint", &self.certified_fingerprint),
            ("stock_fingerprint", &self.stock_fingerprint),
        ] {
            if !fp.is_empty() && device_codename(fp).is_none() {
                return Err(format!("{} is not a build fingerprint: {:?}", key, fp));
            }
        }

        let mut pkgs: Vec<String> = self
            .excluded_packages
            .iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        pkgs.sort();
        pkgs.dedup();
        self.excluded_packages = pkgs;

        for name in self.unknown_profile_names() {
            warn!("CFG: profile_overrides names unknown profile {:?}; ignored", name);
        }

        Ok(())
    }

    /// Keys of `profile_overrides` that match no patchable built-in profile.
    pub fn unknown_profile_names(&self) -> Vec<&str> {
        let known = builtin_profiles();
        self.profile_overrides
            .keys()
            .map(String::as_str)
            .filter(|name| !known.iter().any(|p| p.name() == *name))
            .collect()
    }

    pub fn is_excluded(&self, package: &str) -> bool {
        self.excluded_packages.iter().any(|p| p == package)
    }

    /// `base` with any configured patches applied. Unknown field names and
    /// unusable values are logged and skipped.
    pub fn resolve_profile(&self, base: &DeviceProfile) -> DeviceProfile {
        let Some(patch) = self.profile_overrides.get(base.name()) else {
            return base.clone();
        };

        let mut profile = base.clone();
        for (name, raw) in patch {
            match patch_value(name, raw) {
                Ok((field, value)) => profile = profile.with_field(field, value),
                Err(e) => warn!("CFG: profile {:?}: {}", base.name(), e),
            }
        }
        info!("CFG: profile {:?} patched ({} keys)", base.name(), patch.len());
        profile
    }
}

fn patch_value(name: &str, raw: &Value) -> Result<(Field, FieldValue), FieldError> {
    let field = Field::from_name(name).ok_or_else(|| FieldError::NotFound(name.to_string()))?;
    let value = match raw {
        Value::String(s) => FieldValue::from(s.clone()),
        Value::Number(n) => match n.as_i64() {
            Some(v) => FieldValue::Long(v),
            None => return Err(rejected(field, raw, "not an integer")),
        },
        _ => return Err(rejected(field, raw, "unsupported value type")),
    };
    Ok((field, value))
}

fn rejected(field: Field, raw: &Value, reason: &str) -> FieldError {
    FieldError::WriteRejected {
        field,
        value: raw.to_string(),
        reason: reason.to_string(),
    }
}

pub fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Strict load: any failure is reported.
pub fn load(path: &Path) -> Result<SpoofConfig, ConfigError> {
    let s = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut cfg = serde_json::from_str::<SpoofConfig>(&s).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    cfg.validate_and_normalize().map_err(ConfigError::Invalid)?;
    Ok(cfg)
}

/// Load the config, falling back to defaults. A missing or unparsable file is
/// replaced with defaults on disk; a file that parses but fails validation is
/// left for the user to fix.
pub fn load_or_init(path: &Path) -> SpoofConfig {
    match load(path) {
        Ok(cfg) => cfg,
        Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            info!("CFG: {} missing, writing defaults", path.display());
            let def = SpoofConfig::default();
            if let Err(e) = write_config_atomic(path, &def) {
                warn!("CFG: cannot write defaults: {}", e);
            }
            def
        }
        Err(e @ ConfigError::Invalid(_)) => {
            warn!("CFG: {} ({}); using defaults, file kept", e, path.display());
            SpoofConfig::default()
        }
        Err(e) => {
            warn!("CFG: {} ({}); reset to default", e, path.display());
            let def = SpoofConfig::default();
            if let Err(e) = write_config_atomic(path, &def) {
                warn!("CFG: cannot write defaults: {}", e);
            }
            def
        }
    }
}

pub fn write_config_atomic(path: &Path, cfg: &SpoofConfig) -> io::Result<()> {
    ensure_parent_dir(path)?;
    let tmp = PathBuf::from(format!("{}.tmp", path.display()));
    let data = serde_json::to_string_pretty(cfg)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
    fs::write(&tmp, data.as_bytes())?;
    fs::rename(&tmp, path)?;
    Ok(())
}
