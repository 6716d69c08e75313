//! System property access.
//!
//! The spoofing knobs live in the system-wide key/value property store. Readers
//! go through [`PropertySource`] so the dispatcher can be driven from the real
//! store ([`SystemProps`], Android only) or an in-memory map.

use std::collections::BTreeMap;

use log::warn;

pub trait PropertySource {
    /// Raw value, `None` when unset. An empty value counts as unset.
    fn get(&self, name: &str) -> Option<String>;

    fn get_or(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or_else(|| default.to_string())
    }

    /// Boolean parsing follows `SystemProperties.getBoolean`: unknown spellings
    /// fall back to `default`.
    fn get_bool(&self, name: &str, default: bool) -> bool {
        match self.get(name).as_deref().map(str::trim) {
            Some("1" | "y" | "yes" | "on" | "true") => true,
            Some("0" | "n" | "no" | "off" | "false") => false,
            Some(other) => {
                warn!("PROPS: {} has non-boolean value {:?}", name, other);
                default
            }
            None => default,
        }
    }

    fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name)?.trim().parse::<i64>().ok()
    }
}

impl<T: PropertySource + ?Sized> PropertySource for &T {
    fn get(&self, name: &str) -> Option<String> {
        (**self).get(name)
    }
}

/// In-memory property store.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MapProps {
    values: BTreeMap<String, String>,
}

impl MapProps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: &str) {
        self.values.insert(name.to_string(), value.to_string());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl PropertySource for MapProps {
    fn get(&self, name: &str) -> Option<String> {
        self.values
            .get(name)
            .filter(|v| !v.is_empty())
            .cloned()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapProps {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// The device's property area.
#[cfg(target_os = "android")]
pub struct SystemProps {
    inner: android_system_properties::AndroidSystemProperties,
}

#[cfg(target_os = "android")]
impl SystemProps {
    pub fn new() -> Self {
        Self {
            inner: android_system_properties::AndroidSystemProperties::new(),
        }
    }
}

#[cfg(target_os = "android")]
impl Default for SystemProps {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_os = "android")]
impl PropertySource for SystemProps {
    fn get(&self, name: &str) -> Option<String> {
        self.inner.get(name).filter(|v| !v.is_empty())
    }
}
