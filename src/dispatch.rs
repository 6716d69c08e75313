use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info, warn};

use crate::{
    config::{KEEP_PREFIX_GCAM, PACKAGE_FINSKY, PACKAGE_GMS, PACKAGE_SETTINGS_INTELLIGENCE},
    error::DispatchError,
    fingerprint::FingerprintTable,
    flags::FeatureFlags,
    identity::{ApplyReport, BuildIdentity, Field, FieldValue},
    profiles::{kept_fields, GENERIC_BUILD},
    rules::{RuleContext, RuleTable},
    state::OverrideState,
    user_config::SpoofConfig,
};

/// Wall clock in milliseconds since the epoch.
pub type Clock = fn() -> i64;

fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|d| i64::try_from(d.as_millis()).ok())
        .unwrap_or(0)
}

/// Who the current process is, as reported by the runtime at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallerIdentity<'a> {
    pub package: &'a str,
    pub process: Option<&'a str>,
}

impl<'a> CallerIdentity<'a> {
    pub fn new(package: &'a str, process: Option<&'a str>) -> Self {
        Self { package, process }
    }

    fn resolve(&self) -> Result<(&'a str, &'a str), DispatchError> {
        match self.process {
            Some(process) if !self.package.is_empty() && !process.is_empty() => Ok((self.package, process)),
            _ => Err(DispatchError::MissingCallerIdentity),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppliedProfile {
    pub rule: &'static str,
    pub profile: String,
    pub report: ApplyReport,
}

/// Evaluates the rule table once per process and applies the winner.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    rules: RuleTable,
    flags: FeatureFlags,
    config: SpoofConfig,
    device: BuildIdentity,
    fingerprints: Option<FingerprintTable>,
    clock: Clock,
}

impl Dispatcher {
    /// `device` is the real identity, used to avoid overriding a device that
    /// already reports as the target.
    pub fn new(flags: FeatureFlags, config: SpoofConfig, device: BuildIdentity) -> Self {
        let fingerprints = config
            .fingerprint_list
            .as_deref()
            .and_then(|path| match FingerprintTable::load(path) {
                Ok(t) => Some(t),
                Err(e) => {
                    warn!("DISPATCH: fingerprint list unusable: {}", e);
                    None
                }
            });

        Self {
            rules: RuleTable::standard(),
            flags,
            config,
            device,
            fingerprints,
            clock: now_millis,
        }
    }

    pub fn with_rules(mut self, rules: RuleTable) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_fingerprints(mut self, table: FingerprintTable) -> Self {
        self.fingerprints = Some(table);
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    fn is_kept(&self, package: &str) -> bool {
        self.config.is_excluded(package) || package.starts_with(KEEP_PREFIX_GCAM)
    }

    /// Apply the first matching rule to `identity` and record the outcome in
    /// `state`. Returns `None` when no profile was applied; the release build
    /// markers and per-package fixups may still have been written.
    pub fn apply_identity_overrides(
        &self,
        caller: &CallerIdentity<'_>,
        identity: &mut BuildIdentity,
        state: &OverrideState,
    ) -> Option<AppliedProfile> {
        let (package, process) = match caller.resolve() {
            Ok(v) => v,
            Err(e) => {
                debug!("DISPATCH: skip ({}) package={:?}", e, caller.package);
                return None;
            }
        };

        if !self.flags.enabled {
            debug!("DISPATCH: spoofing disabled");
            return None;
        }

        if self.is_kept(package) {
            debug!("DISPATCH: {} keeps real identity", package);
            state.set_excluded(true);
            return None;
        }

        let generic = identity.apply_profile(&GENERIC_BUILD);
        if !generic.is_complete() {
            warn!("DISPATCH: release build markers applied partially");
        }

        state.set_finsky(package == PACKAGE_FINSKY);

        let ctx = RuleContext {
            package,
            process,
            flags: &self.flags,
            config: &self.config,
            device: &self.device,
            fingerprints: self.fingerprints.as_ref(),
        };
        let applied = self.rules.evaluate(&ctx).map(|selection| {
            info!(
                "DISPATCH: {} ({}) -> {} [{}]",
                package,
                process,
                selection.profile.name(),
                selection.rule
            );
            let profile = selection.profile.without(kept_fields(package));
            let report = identity.apply_profile(&profile);
            if !report.is_complete() {
                warn!(
                    "DISPATCH: {} applied partially ({} skipped)",
                    profile.name(),
                    report.skipped.len()
                );
            }

            if selection.certifying {
                state.set_certifying(true);
            }
            state.set_active_profile(Some(profile.name().to_string()));

            AppliedProfile {
                rule: selection.rule,
                profile: profile.name().to_string(),
                report,
            }
        });

        self.apply_package_fixups(package, identity);
        applied
    }

    /// Single-field writes some packages get on top of (or instead of) a
    /// profile.
    fn apply_package_fixups(&self, package: &str, identity: &mut BuildIdentity) {
        let fixup = match package {
            PACKAGE_GMS if self.flags.gms => (Field::Time, FieldValue::Long((self.clock)())),
            // search indexing keys on the build incremental
            PACKAGE_SETTINGS_INTELLIGENCE if self.flags.gapps => (
                Field::Fingerprint,
                FieldValue::from(self.device.version.incremental.clone()),
            ),
            _ => return,
        };
        debug!("DISPATCH: {} fixup {} = {}", package, fixup.0, fixup.1);
        if let Err(e) = identity.set(fixup.0, fixup.1) {
            warn!("DISPATCH: {} fixup failed: {}", package, e);
        }
    }
}
