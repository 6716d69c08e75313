use crate::{config::*, props::PropertySource};

/// Spoofing switches, resolved once per process from the property store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeatureFlags {
    pub enabled: bool,
    pub gms: bool,
    pub gapps: bool,
    pub gphotos: bool,
    /// Photos gets the old Pixel XL instead of the flagship.
    pub gphotos_legacy: bool,
    pub games: bool,
    /// Netflix joins the Google apps on the flagship.
    pub netflix: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            enabled: true,
            gms: true,
            gapps: true,
            gphotos: false,
            gphotos_legacy: true,
            games: false,
            netflix: false,
        }
    }
}

impl FeatureFlags {
    pub fn from_props(props: &impl PropertySource) -> Self {
        let d = Self::default();
        Self {
            enabled: props.get_bool(PROP_ENABLE_ALL, d.enabled),
            gms: props.get_bool(PROP_SPOOF_GMS, d.gms),
            gapps: props.get_bool(PROP_SPOOF_GAPPS, d.gapps),
            gphotos: props.get_bool(PROP_SPOOF_GPHOTOS, d.gphotos),
            gphotos_legacy: props.get_bool(PROP_SPOOF_GPHOTOS_LEGACY, d.gphotos_legacy),
            games: props.get_bool(PROP_SPOOF_GAMES, d.games),
            netflix: props.get_bool(PROP_SPOOF_NETFLIX, d.netflix),
        }
    }

    /// Every category switch off; the global switch stays on.
    pub fn none() -> Self {
        Self {
            enabled: true,
            gms: false,
            gapps: false,
            gphotos: false,
            gphotos_legacy: false,
            games: false,
            netflix: false,
        }
    }
}
