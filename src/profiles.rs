use std::borrow::Cow;

use crate::{
    config::{PACKAGE_SETTINGS_INTELLIGENCE, SDK_N_MR1},
    identity::{Field, FieldValue},
};

/// Named, immutable bundle of identity overrides.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceProfile {
    name: Cow<'static, str>,
    overrides: Cow<'static, [(Field, FieldValue)]>,
}

impl DeviceProfile {
    pub const fn fixed(name: &'static str, overrides: &'static [(Field, FieldValue)]) -> Self {
        Self {
            name: Cow::Borrowed(name),
            overrides: Cow::Borrowed(overrides),
        }
    }

    /// Profile built at dispatch time (configured or fetched values).
    pub fn generated(name: impl Into<String>, overrides: Vec<(Field, FieldValue)>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            overrides: Cow::Owned(overrides),
        }
    }

    pub fn fingerprint_only(name: impl Into<String>, fingerprint: &str) -> Self {
        Self::generated(
            name,
            vec![(Field::Fingerprint, FieldValue::from(fingerprint.to_string()))],
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn overrides(&self) -> &[(Field, FieldValue)] {
        &self.overrides
    }

    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        self.overrides
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v)
    }

    /// Copy of this profile without any of `fields`.
    pub fn without(&self, fields: &[Field]) -> Self {
        if !self.overrides.iter().any(|(f, _)| fields.contains(f)) {
            return self.clone();
        }
        Self {
            name: self.name.clone(),
            overrides: Cow::Owned(
                self.overrides
                    .iter()
                    .filter(|(f, _)| !fields.contains(f))
                    .cloned()
                    .collect(),
            ),
        }
    }

    /// Copy of this profile with `field` replaced (or added).
    pub fn with_field(&self, field: Field, value: FieldValue) -> Self {
        let mut overrides = self.overrides.to_vec();
        match overrides.iter_mut().find(|(f, _)| *f == field) {
            Some(slot) => slot.1 = value,
            None => overrides.push((field, value)),
        }
        Self {
            name: self.name.clone(),
            overrides: Cow::Owned(overrides),
        }
    }
}

const fn s(v: &'static str) -> FieldValue {
    FieldValue::text(v)
}

const GMS_LEGACY_PROPS: &[(Field, FieldValue)] = &[
    (Field::Brand, s("google")),
    (Field::Manufacturer, s("Google")),
    (Field::Device, s("marlin")),
    (Field::Product, s("marlin")),
    (Field::Model, s("Pixel XL")),
    (Field::Fingerprint, s("google/marlin/marlin:7.1.2/NJH47F/4146041:user/release-keys")),
    (Field::Id, s("NJH47F")),
    (Field::SecurityPatch, s("2017-08-05")),
    (Field::DeviceInitialSdkInt, FieldValue::Int(SDK_N_MR1)),
];

const PIXEL_7_PRO_PROPS: &[(Field, FieldValue)] = &[
    (Field::Brand, s("google")),
    (Field::Manufacturer, s("Google")),
    (Field::Device, s("cheetah")),
    (Field::Product, s("cheetah")),
    (Field::Model, s("Pixel 7 Pro")),
    (Field::Fingerprint, s("google/cheetah/cheetah:13/TQ3A.230605.012/10204971:user/release-keys")),
];

const PIXEL_XL_PROPS: &[(Field, FieldValue)] = &[
    (Field::Brand, s("google")),
    (Field::Manufacturer, s("Google")),
    (Field::Device, s("marlin")),
    (Field::Product, s("marlin")),
    (Field::Model, s("Pixel XL")),
    (Field::Fingerprint, s("google/marlin/marlin:10/QP1A.191005.007.A3/5972272:user/release-keys")),
];

const GENERIC_BUILD_PROPS: &[(Field, FieldValue)] = &[
    (Field::Type, s("user")),
    (Field::Tags, s("release-keys")),
];

/// Release build markers, applied to every process while spoofing is on.
pub static GENERIC_BUILD: DeviceProfile = DeviceProfile::fixed("release build", GENERIC_BUILD_PROPS);

/// Old enough that the attestation backend falls back to basic integrity.
pub static GMS_LEGACY: DeviceProfile = DeviceProfile::fixed("Pixel XL (7.1.2)", GMS_LEGACY_PROPS);

/// Flagship identity for Google apps.
pub static PIXEL_7_PRO: DeviceProfile = DeviceProfile::fixed("Pixel 7 Pro", PIXEL_7_PRO_PROPS);

/// Unlimited original-quality backup in Photos.
pub static PIXEL_XL: DeviceProfile = DeviceProfile::fixed("Pixel XL", PIXEL_XL_PROPS);

/// Handsets games whitelist for high frame rate / graphics presets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameHandset {
    AsusRog1,
    AsusRog3,
    SonyXperia5,
    OnePlus8Pro,
    OnePlus9R,
    XiaomiMi11T,
    XiaomiF4,
}

const ROG1_PROPS: &[(Field, FieldValue)] = &[
    (Field::Brand, s("asus")),
    (Field::Manufacturer, s("Asus")),
    (Field::Model, s("ASUS_Z01QD")),
];
const ROG3_PROPS: &[(Field, FieldValue)] = &[
    (Field::Brand, s("asus")),
    (Field::Manufacturer, s("Asus")),
    (Field::Model, s("ASUS_I003D")),
];
const XPERIA5_PROPS: &[(Field, FieldValue)] = &[
    (Field::Brand, s("Sony")),
    (Field::Manufacturer, s("Sony")),
    (Field::Model, s("SO-52A")),
];
const OP8PRO_PROPS: &[(Field, FieldValue)] = &[
    (Field::Brand, s("OnePlus")),
    (Field::Manufacturer, s("OnePlus")),
    (Field::Model, s("IN2020")),
];
const OP9R_PROPS: &[(Field, FieldValue)] = &[
    (Field::Brand, s("OnePlus")),
    (Field::Manufacturer, s("OnePlus")),
    (Field::Model, s("LE2101")),
];
const MI11T_PROPS: &[(Field, FieldValue)] = &[
    (Field::Brand, s("Xiaomi")),
    (Field::Manufacturer, s("Xiaomi")),
    (Field::Model, s("21081111RG")),
];
const F4_PROPS: &[(Field, FieldValue)] = &[
    (Field::Brand, s("POCO")),
    (Field::Manufacturer, s("Xiaomi")),
    (Field::Model, s("22021211RG")),
];

static ROG1: DeviceProfile = DeviceProfile::fixed("Asus ROG Phone", ROG1_PROPS);
static ROG3: DeviceProfile = DeviceProfile::fixed("Asus ROG Phone 3", ROG3_PROPS);
static XPERIA5: DeviceProfile = DeviceProfile::fixed("Sony Xperia 5", XPERIA5_PROPS);
static OP8PRO: DeviceProfile = DeviceProfile::fixed("OnePlus 8 Pro", OP8PRO_PROPS);
static OP9R: DeviceProfile = DeviceProfile::fixed("OnePlus 9R", OP9R_PROPS);
static MI11T: DeviceProfile = DeviceProfile::fixed("Xiaomi Mi 11T", MI11T_PROPS);
static F4: DeviceProfile = DeviceProfile::fixed("Xiaomi F4", F4_PROPS);

/// Lookup order matches the table below; the first set containing the
/// package decides.
pub const GAME_TABLE: &[(GameHandset, &[&str])] = &[
    (GameHandset::AsusRog1, &["com.madfingergames.legends"]),
    (
        GameHandset::AsusRog3,
        &["com.pearlabyss.blackdesertm", "com.pearlabyss.blackdesertm.gl"],
    ),
    (
        GameHandset::SonyXperia5,
        &[
            "com.activision.callofduty.shooter",
            "com.garena.game.codm",
            "com.tencent.tmgp.kr.codm",
            "com.vng.codmvn",
        ],
    ),
    (
        GameHandset::OnePlus8Pro,
        &[
            "com.netease.lztgglobal",
            "com.pubg.imobile",
            "com.pubg.krmobile",
            "com.rekoo.pubgm",
            "com.riotgames.league.wildrift",
            "com.riotgames.league.wildrifttw",
            "com.riotgames.league.wildriftvn",
            "com.tencent.ig",
            "com.tencent.tmgp.pubgmhd",
            "com.vng.pubgmobile",
        ],
    ),
    (
        GameHandset::OnePlus9R,
        &["com.epicgames.fortnite", "com.epicgames.portal"],
    ),
    (
        GameHandset::XiaomiMi11T,
        &[
            "com.ea.gp.apexlegendsmobilefps",
            "com.levelinfinite.hotta.gp",
            "com.mobile.legends",
            "com.supercell.clashofclans",
            "com.tencent.tmgp.sgame",
            "com.vng.mlbbvn",
        ],
    ),
    (
        GameHandset::XiaomiF4,
        &["com.dts.freefiremax", "com.dts.freefireth"],
    ),
];

impl GameHandset {
    pub fn profile(self) -> &'static DeviceProfile {
        match self {
            GameHandset::AsusRog1 => &ROG1,
            GameHandset::AsusRog3 => &ROG3,
            GameHandset::SonyXperia5 => &XPERIA5,
            GameHandset::OnePlus8Pro => &OP8PRO,
            GameHandset::OnePlus9R => &OP9R,
            GameHandset::XiaomiMi11T => &MI11T,
            GameHandset::XiaomiF4 => &F4,
        }
    }

    pub fn for_package(package: &str) -> Option<GameHandset> {
        lookup_game(GAME_TABLE, package)
    }
}

pub fn lookup_game(table: &[(GameHandset, &[&str])], package: &str) -> Option<GameHandset> {
    table
        .iter()
        .find(|(_, pkgs)| pkgs.contains(&package))
        .map(|(h, _)| *h)
}

/// Profiles the overlay config may patch, by name.
pub fn builtin_profiles() -> [&'static DeviceProfile; 3] {
    [&GMS_LEGACY, &PIXEL_7_PRO, &PIXEL_XL]
}

const FIELDS_TO_KEEP: &[(&str, &[Field])] = &[(PACKAGE_SETTINGS_INTELLIGENCE, &[Field::Fingerprint])];

/// Fields `package` keeps from the real device whatever profile it gets.
pub fn kept_fields(package: &str) -> &'static [Field] {
    FIELDS_TO_KEEP
        .iter()
        .find(|(pkg, _)| *pkg == package)
        .map(|(_, fields)| *fields)
        .unwrap_or(&[])
}
