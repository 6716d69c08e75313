//! Rule table.
//!
//! Rules are tried in table order. A rule fires when its matcher accepts the
//! caller, its gate is open, and its target resolves to a profile; the first
//! rule that fires is the only one applied.

use log::debug;

use crate::{
    config::*,
    fingerprint::FingerprintTable,
    flags::FeatureFlags,
    identity::{BuildIdentity, Field, FieldValue},
    profiles::{lookup_game, DeviceProfile, GameHandset, GAME_TABLE, GMS_LEGACY, PIXEL_7_PRO, PIXEL_XL},
    user_config::SpoofConfig,
};

pub type GameTable = &'static [(GameHandset, &'static [&'static str])];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Matcher {
    /// Exact `(package, process)` pairs.
    Process(&'static [(&'static str, &'static str)]),
    Package(&'static str),
    AnyOf(&'static [&'static str]),
    /// Every caller; the target decides.
    Any,
}

impl Matcher {
    pub fn matches(&self, package: &str, process: &str) -> bool {
        match self {
            Matcher::Process(pairs) => pairs.iter().any(|(pkg, name)| *pkg == package && *name == process),
            Matcher::Package(pkg) => *pkg == package,
            Matcher::AnyOf(pkgs) => pkgs.contains(&package),
            Matcher::Any => true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gate {
    Always,
    Gms,
    Gapps,
    Gphotos,
    Games,
    /// Netflix needs its own switch on top of the gapps one.
    Netflix,
}

impl Gate {
    pub fn is_open(self, flags: &FeatureFlags) -> bool {
        match self {
            Gate::Always => true,
            Gate::Gms => flags.gms,
            Gate::Gapps => flags.gapps,
            Gate::Gphotos => flags.gphotos,
            Gate::Games => flags.games,
            Gate::Netflix => flags.gapps && flags.netflix,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    /// Legacy device for the attestation-sensitive process.
    Legacy,
    CertifiedFingerprint,
    StockFingerprint,
    /// Flagship, unless the device already is one.
    Flagship,
    /// Pixel XL or flagship depending on the legacy photos toggle.
    Photos,
    Game(GameTable),
}

/// Everything a rule may look at.
pub struct RuleContext<'a> {
    pub package: &'a str,
    pub process: &'a str,
    pub flags: &'a FeatureFlags,
    pub config: &'a SpoofConfig,
    /// Real identity of the device, not the overridden one.
    pub device: &'a BuildIdentity,
    pub fingerprints: Option<&'a FingerprintTable>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rule {
    pub name: &'static str,
    pub matcher: Matcher,
    pub gate: Gate,
    pub target: Target,
}

/// Rule that fired and the profile it selected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    pub rule: &'static str,
    pub profile: DeviceProfile,
    pub certifying: bool,
}

impl Rule {
    pub fn select(&self, ctx: &RuleContext<'_>) -> Option<Selection> {
        if !self.matcher.matches(ctx.package, ctx.process) || !self.gate.is_open(ctx.flags) {
            return None;
        }
        let profile = self.target.resolve(ctx)?;
        Some(Selection {
            rule: self.name,
            profile,
            certifying: self.target == Target::Legacy,
        })
    }

    /// Packages this rule can fire for, when that set is fixed.
    pub fn static_packages(&self) -> Vec<&'static str> {
        let mut out: Vec<&'static str> = match self.matcher {
            Matcher::Process(pairs) => pairs.iter().map(|(pkg, _)| *pkg).collect(),
            Matcher::Package(pkg) => vec![pkg],
            Matcher::AnyOf(pkgs) => pkgs.to_vec(),
            Matcher::Any => Vec::new(),
        };
        if let Target::Game(table) = self.target {
            out.extend(table.iter().flat_map(|(_, pkgs)| pkgs.iter().copied()));
        }
        out.sort_unstable();
        out.dedup();
        out
    }
}

impl Target {
    fn resolve(&self, ctx: &RuleContext<'_>) -> Option<DeviceProfile> {
        match self {
            Target::Legacy => Some(ctx.config.resolve_profile(&GMS_LEGACY)),
            Target::CertifiedFingerprint => {
                let fp = ctx.config.certified_fingerprint.as_str();
                (!fp.is_empty()).then(|| DeviceProfile::fingerprint_only("certified", fp))
            }
            Target::StockFingerprint => {
                let fp = ctx.config.stock_fingerprint.as_str();
                (!fp.is_empty()).then(|| DeviceProfile::fingerprint_only("stock", fp))
            }
            Target::Flagship => {
                let flagship = flagship_profile(ctx);
                if reports_as(ctx.device, &flagship) {
                    debug!("RULES: device already reports as {}", flagship.name());
                    return None;
                }
                Some(flagship)
            }
            Target::Photos => {
                if ctx.flags.gphotos_legacy {
                    Some(ctx.config.resolve_profile(&PIXEL_XL))
                } else {
                    Some(flagship_profile(ctx))
                }
            }
            Target::Game(table) => {
                let handset = lookup_game(table, ctx.package)?;
                Some(handset.profile().clone())
            }
        }
    }
}

/// Flagship profile with the freshest known fingerprint, then config patches.
fn flagship_profile(ctx: &RuleContext<'_>) -> DeviceProfile {
    let mut base = PIXEL_7_PRO.clone();
    let codename = match base.get(Field::Device) {
        Some(FieldValue::Str(d)) => Some(d.to_string()),
        _ => None,
    };
    if let (Some(table), Some(codename)) = (ctx.fingerprints, codename) {
        if let Some(fp) = table.get(&codename) {
            base = base.with_field(Field::Fingerprint, FieldValue::from(fp.to_string()));
        }
    }
    ctx.config.resolve_profile(&base)
}

fn field_is(profile: &DeviceProfile, field: Field, actual: &str) -> bool {
    matches!(profile.get(field), Some(FieldValue::Str(v)) if &**v == actual)
}

/// Same brand and either the same device codename or the same model.
fn reports_as(device: &BuildIdentity, profile: &DeviceProfile) -> bool {
    let same_brand = matches!(
        profile.get(Field::Brand),
        Some(FieldValue::Str(b)) if b.eq_ignore_ascii_case(&device.brand)
    );
    same_brand
        && (field_is(profile, Field::Device, &device.device) || field_is(profile, Field::Model, &device.model))
}

const CERTIFYING_PROCESSES: &[(&str, &str)] = &[
    (PACKAGE_GMS, PROCESS_GMS_UNSTABLE),
    (PACKAGE_GMS, PROCESS_GMS_INSTRUMENTATION),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl RuleTable {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn standard() -> Self {
        Self::new(vec![
            Rule {
                name: "gms-certifying",
                matcher: Matcher::Process(CERTIFYING_PROCESSES),
                gate: Gate::Gms,
                target: Target::Legacy,
            },
            Rule {
                name: "finsky-certified",
                matcher: Matcher::Package(PACKAGE_FINSKY),
                gate: Gate::Always,
                target: Target::CertifiedFingerprint,
            },
            Rule {
                name: "arcore-stock",
                matcher: Matcher::Package(PACKAGE_ARCORE),
                gate: Gate::Always,
                target: Target::StockFingerprint,
            },
            Rule {
                name: "google-apps",
                matcher: Matcher::AnyOf(GOOGLE_APP_PACKAGES),
                gate: Gate::Gapps,
                target: Target::Flagship,
            },
            Rule {
                name: "netflix",
                matcher: Matcher::Package(PACKAGE_NETFLIX),
                gate: Gate::Netflix,
                target: Target::Flagship,
            },
            Rule {
                name: "photos",
                matcher: Matcher::Package(PACKAGE_GPHOTOS),
                gate: Gate::Gphotos,
                target: Target::Photos,
            },
            Rule {
                name: "games",
                matcher: Matcher::Any,
                gate: Gate::Games,
                target: Target::Game(GAME_TABLE),
            },
        ])
    }

    /// First rule that fires, if any.
    pub fn evaluate(&self, ctx: &RuleContext<'_>) -> Option<Selection> {
        self.rules.iter().find_map(|r| r.select(ctx))
    }

    /// Packages named by more than one rule, with the rules naming them.
    pub fn overlaps(&self) -> Vec<(&'static str, Vec<&'static str>)> {
        let mut owners: std::collections::BTreeMap<&'static str, Vec<&'static str>> = Default::default();
        // process-scoped rules narrow a package-wide rule, they do not compete with it
        let package_rules = self
            .rules
            .iter()
            .filter(|r| !matches!(r.matcher, Matcher::Process(_)));
        for rule in package_rules {
            for pkg in rule.static_packages() {
                owners.entry(pkg).or_default().push(rule.name);
            }
        }
        owners.into_iter().filter(|(_, rules)| rules.len() > 1).collect()
    }
}
