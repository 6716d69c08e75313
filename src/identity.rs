//! Identity override store.
//!
//! [`BuildIdentity`] is the process's view of `android.os.Build` and
//! `android.os.Build.VERSION`. Overrides are written field by field; a field
//! that cannot be written is reported and skipped so the rest of a profile
//! still lands.

use std::{borrow::Cow, fmt};

use log::{debug, error};

use crate::{config::*, error::FieldError, profiles::DeviceProfile, props::PropertySource};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldGroup {
    /// `Build.*`
    General,
    /// `Build.VERSION.*`
    Version,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Str,
    Int,
    Long,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Brand,
    Manufacturer,
    Device,
    Product,
    Hardware,
    Model,
    Fingerprint,
    Id,
    Type,
    Tags,
    Time,
    SecurityPatch,
    DeviceInitialSdkInt,
    SdkInt,
    Incremental,
    Release,
}

impl Field {
    pub const ALL: [Field; 16] = [
        Field::Brand,
        Field::Manufacturer,
        Field::Device,
        Field::Product,
        Field::Hardware,
        Field::Model,
        Field::Fingerprint,
        Field::Id,
        Field::Type,
        Field::Tags,
        Field::Time,
        Field::SecurityPatch,
        Field::DeviceInitialSdkInt,
        Field::SdkInt,
        Field::Incremental,
        Field::Release,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Brand => "BRAND",
            Field::Manufacturer => "MANUFACTURER",
            Field::Device => "DEVICE",
            Field::Product => "PRODUCT",
            Field::Hardware => "HARDWARE",
            Field::Model => "MODEL",
            Field::Fingerprint => "FINGERPRINT",
            Field::Id => "ID",
            Field::Type => "TYPE",
            Field::Tags => "TAGS",
            Field::Time => "TIME",
            Field::SecurityPatch => "SECURITY_PATCH",
            Field::DeviceInitialSdkInt => "DEVICE_INITIAL_SDK_INT",
            Field::SdkInt => "SDK_INT",
            Field::Incremental => "INCREMENTAL",
            Field::Release => "RELEASE",
        }
    }

    pub fn group(self) -> FieldGroup {
        match self {
            Field::SecurityPatch
            | Field::DeviceInitialSdkInt
            | Field::SdkInt
            | Field::Incremental
            | Field::Release => FieldGroup::Version,
            _ => FieldGroup::General,
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            Field::Time => FieldKind::Long,
            Field::DeviceInitialSdkInt | Field::SdkInt => FieldKind::Int,
            _ => FieldKind::Str,
        }
    }

    /// Look a field up by its `Build` name, general group first.
    pub fn from_name(name: &str) -> Option<Field> {
        Self::lookup(FieldGroup::General, name).or_else(|| Self::lookup(FieldGroup::Version, name))
    }

    pub fn lookup(group: FieldGroup, name: &str) -> Option<Field> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.group() == group && f.name() == name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldValue {
    Str(Cow<'static, str>),
    Int(i32),
    Long(i64),
}

impl FieldValue {
    pub const fn text(s: &'static str) -> Self {
        FieldValue::Str(Cow::Borrowed(s))
    }
}

impl From<&'static str> for FieldValue {
    fn from(s: &'static str) -> Self {
        FieldValue::Str(Cow::Borrowed(s))
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(Cow::Owned(s))
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Long(v)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Str(s) => f.write_str(s),
            FieldValue::Int(v) => write!(f, "{}", v),
            FieldValue::Long(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VersionInfo {
    pub security_patch: String,
    /// Absent on runtimes that predate the field.
    pub device_initial_sdk_int: Option<i32>,
    pub sdk_int: i32,
    pub incremental: String,
    pub release: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildIdentity {
    pub brand: String,
    pub manufacturer: String,
    pub device: String,
    pub product: String,
    pub hardware: String,
    pub model: String,
    pub fingerprint: String,
    pub id: String,
    pub build_type: String,
    pub tags: String,
    pub time: i64,
    pub version: VersionInfo,
}

/// Outcome of applying one profile.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub applied: Vec<Field>,
    pub skipped: Vec<FieldError>,
}

impl ApplyReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

// Build.VERSION.DEVICE_INITIAL_SDK_INT appeared in Android 12.
const SDK_S: i32 = 31;

impl BuildIdentity {
    /// Capture the real identity from the read-only build properties.
    pub fn from_props(props: &impl PropertySource) -> Self {
        let sdk_int = props
            .get_i64(PROP_SDK_INT)
            .and_then(|v| i32::try_from(v).ok())
            .unwrap_or(0);
        let device_initial_sdk_int = if sdk_int >= SDK_S {
            Some(
                props
                    .get_i64(PROP_INITIAL_SDK_INT)
                    .and_then(|v| i32::try_from(v).ok())
                    .unwrap_or(sdk_int),
            )
        } else {
            None
        };

        Self {
            brand: props.get_or(PROP_BRAND, ""),
            manufacturer: props.get_or(PROP_MANUFACTURER, ""),
            device: props.get_or(PROP_DEVICE, ""),
            product: props.get_or(PROP_PRODUCT, ""),
            hardware: props.get_or(PROP_HARDWARE, ""),
            model: props.get_or(PROP_MODEL, ""),
            fingerprint: props.get_or(PROP_FINGERPRINT, ""),
            id: props.get_or(PROP_BUILD_ID, ""),
            build_type: props.get_or(PROP_BUILD_TYPE, ""),
            tags: props.get_or(PROP_BUILD_TAGS, ""),
            // ro.build.date.utc is seconds, Build.TIME is millis
            time: props
                .get_i64(PROP_BUILD_TIME)
                .and_then(|secs| secs.checked_mul(1000))
                .unwrap_or(0),
            version: VersionInfo {
                security_patch: props.get_or(PROP_SECURITY_PATCH, ""),
                device_initial_sdk_int,
                sdk_int,
                incremental: props.get_or(PROP_INCREMENTAL, ""),
                release: props.get_or(PROP_RELEASE, ""),
            },
        }
    }

    /// Current value, `None` when the field does not exist on this runtime.
    pub fn get(&self, field: Field) -> Option<FieldValue> {
        let s = |v: &String| Some(FieldValue::Str(Cow::Owned(v.clone())));
        match field {
            Field::Brand => s(&self.brand),
            Field::Manufacturer => s(&self.manufacturer),
            Field::Device => s(&self.device),
            Field::Product => s(&self.product),
            Field::Hardware => s(&self.hardware),
            Field::Model => s(&self.model),
            Field::Fingerprint => s(&self.fingerprint),
            Field::Id => s(&self.id),
            Field::Type => s(&self.build_type),
            Field::Tags => s(&self.tags),
            Field::Time => Some(FieldValue::Long(self.time)),
            Field::SecurityPatch => s(&self.version.security_patch),
            Field::DeviceInitialSdkInt => self.version.device_initial_sdk_int.map(FieldValue::Int),
            Field::SdkInt => Some(FieldValue::Int(self.version.sdk_int)),
            Field::Incremental => s(&self.version.incremental),
            Field::Release => s(&self.version.release),
        }
    }

    /// Name-based write across both field groups.
    pub fn set_field(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<(), FieldError> {
        let field = Field::from_name(name).ok_or_else(|| FieldError::NotFound(name.to_string()))?;
        self.set(field, value.into())
    }

    pub fn set(&mut self, field: Field, value: FieldValue) -> Result<(), FieldError> {
        match field {
            Field::Time => self.time = coerce_long(field, &value)?,
            Field::SdkInt => self.version.sdk_int = coerce_int(field, &value)?,
            Field::DeviceInitialSdkInt => {
                let v = coerce_int(field, &value)?;
                match self.version.device_initial_sdk_int.as_mut() {
                    Some(slot) => *slot = v,
                    None => return Err(FieldError::NotFound(field.name().to_string())),
                }
            }
            _ => match self.text_slot(field) {
                Some(slot) => *slot = value.to_string(),
                None => return Err(FieldError::NotFound(field.name().to_string())),
            },
        }
        Ok(())
    }

    fn text_slot(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::Brand => Some(&mut self.brand),
            Field::Manufacturer => Some(&mut self.manufacturer),
            Field::Device => Some(&mut self.device),
            Field::Product => Some(&mut self.product),
            Field::Hardware => Some(&mut self.hardware),
            Field::Model => Some(&mut self.model),
            Field::Fingerprint => Some(&mut self.fingerprint),
            Field::Id => Some(&mut self.id),
            Field::Type => Some(&mut self.build_type),
            Field::Tags => Some(&mut self.tags),
            Field::SecurityPatch => Some(&mut self.version.security_patch),
            Field::Incremental => Some(&mut self.version.incremental),
            Field::Release => Some(&mut self.version.release),
            Field::Time | Field::DeviceInitialSdkInt | Field::SdkInt => None,
        }
    }

    /// Apply every override of `profile`. Fields that fail are logged and
    /// skipped; the remaining overrides still apply.
    pub fn apply_profile(&mut self, profile: &DeviceProfile) -> ApplyReport {
        let mut report = ApplyReport::default();
        for (field, value) in profile.overrides() {
            debug!("FIELD: {}.{} = {}", profile.name(), field, value);
            match self.set(*field, value.clone()) {
                Ok(()) => report.applied.push(*field),
                Err(e) => {
                    error!("FIELD: failed to set {} for {}: {}", field, profile.name(), e);
                    report.skipped.push(e);
                }
            }
        }
        report
    }
}

fn rejected(field: Field, value: &FieldValue, reason: &str) -> FieldError {
    FieldError::WriteRejected {
        field,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn coerce_int(field: Field, value: &FieldValue) -> Result<i32, FieldError> {
    match value {
        FieldValue::Int(v) => Ok(*v),
        FieldValue::Long(v) => i32::try_from(*v).map_err(|_| rejected(field, value, "out of int range")),
        FieldValue::Str(s) => s
            .trim()
            .parse::<i32>()
            .map_err(|_| rejected(field, value, "not an int")),
    }
}

fn coerce_long(field: Field, value: &FieldValue) -> Result<i64, FieldError> {
    match value {
        FieldValue::Int(v) => Ok(i64::from(*v)),
        FieldValue::Long(v) => Ok(*v),
        FieldValue::Str(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| rejected(field, value, "not a long")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::props::MapProps;

    fn identity(sdk: &str) -> BuildIdentity {
        let props = MapProps::new()
            .with(PROP_BRAND, "samsung")
            .with(PROP_MODEL, "SM-S918B")
            .with(PROP_DEVICE, "dm3q")
            .with(PROP_SDK_INT, sdk)
            .with(PROP_INITIAL_SDK_INT, "33")
            .with(PROP_BUILD_TIME, "1700000000");
        BuildIdentity::from_props(&props)
    }

    #[test]
    fn from_props_reads_identity() {
        let id = identity("34");
        assert_eq!(id.brand, "samsung");
        assert_eq!(id.model, "SM-S918B");
        assert_eq!(id.time, 1_700_000_000_000);
        assert_eq!(id.version.sdk_int, 34);
        assert_eq!(id.version.device_initial_sdk_int, Some(33));

        let old = identity("30");
        assert_eq!(old.version.device_initial_sdk_int, None);
    }

    #[test]
    fn absurd_build_date_reads_as_zero() {
        let props = MapProps::new()
            .with(PROP_MODEL, "SM-S918B")
            .with(PROP_BUILD_TIME, "9223372036854776");
        let id = BuildIdentity::from_props(&props);

        assert_eq!(id.time, 0);
        assert_eq!(id.model, "SM-S918B");
    }

    #[test]
    fn name_lookup_spans_both_groups() {
        assert_eq!(Field::from_name("MODEL"), Some(Field::Model));
        assert_eq!(Field::from_name("SECURITY_PATCH"), Some(Field::SecurityPatch));
        assert_eq!(Field::lookup(FieldGroup::General, "SECURITY_PATCH"), None);
        assert_eq!(Field::from_name("model"), None);
    }

    #[test]
    fn set_field_coerces_by_declared_type() {
        let mut id = identity("34");
        id.set_field("MODEL", "Pixel 7 Pro").unwrap();
        id.set_field("DEVICE_INITIAL_SDK_INT", 25_i32).unwrap();
        id.set_field("SDK_INT", String::from("33")).unwrap();
        id.set_field("TIME", 42_i32).unwrap();
        id.set_field("INCREMENTAL", 1234_i64).unwrap();

        assert_eq!(id.model, "Pixel 7 Pro");
        assert_eq!(id.version.device_initial_sdk_int, Some(25));
        assert_eq!(id.version.sdk_int, 33);
        assert_eq!(id.time, 42);
        assert_eq!(id.version.incremental, "1234");
    }

    #[test]
    fn set_field_errors() {
        let mut id = identity("34");
        assert_eq!(
            id.set_field("SERIAL", "x"),
            Err(FieldError::NotFound("SERIAL".to_string()))
        );
        assert!(matches!(
            id.set_field("SDK_INT", "tiramisu"),
            Err(FieldError::WriteRejected { field: Field::SdkInt, .. })
        ));
        assert!(matches!(
            id.set_field("SDK_INT", i64::MAX),
            Err(FieldError::WriteRejected { .. })
        ));
        assert_eq!(id.version.sdk_int, 34);

        let mut old = identity("30");
        assert_eq!(
            old.set_field("DEVICE_INITIAL_SDK_INT", 25_i32),
            Err(FieldError::NotFound("DEVICE_INITIAL_SDK_INT".to_string()))
        );
    }

    #[test]
    fn missing_field_does_not_abort_profile() {
        let mut old = identity("30");
        let report = old.apply_profile(&crate::profiles::GMS_LEGACY);

        assert!(!report.is_complete());
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(old.model, "Pixel XL");
        assert_eq!(old.device, "marlin");
        assert!(old.fingerprint.starts_with("google/marlin/marlin:7.1.2"));
    }
}
