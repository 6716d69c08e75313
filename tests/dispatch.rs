use std::collections::BTreeMap;

use prop_imitation::{
    config::*,
    profiles::{GAME_TABLE, PIXEL_7_PRO},
    rules::{Gate, Matcher, Target},
    AttestationContext, AttestationError, AttestationGuard, BuildIdentity, CallerIdentity, Dispatcher,
    FeatureFlags, Field, FieldError, FieldValue, GameHandset, MapProps, OverrideState, Rule, RuleTable,
    SpoofConfig,
};
use serde_json::json;

const CERTIFIED_FP: &str = "google/walleye/walleye:8.1.0/OPM1.171019.011/4448085:user/release-keys";
const STOCK_FP: &str = "OnePlus/OnePlus8Pro/OnePlus8Pro:13/RKQ1.211119.001/R.1191d2:user/release-keys";

fn real_device() -> BuildIdentity {
    let props = MapProps::new()
        .with(PROP_BRAND, "OnePlus")
        .with(PROP_MANUFACTURER, "OnePlus")
        .with(PROP_DEVICE, "OnePlus8Pro")
        .with(PROP_PRODUCT, "OnePlus8Pro")
        .with(PROP_MODEL, "IN2023")
        .with(PROP_FINGERPRINT, STOCK_FP)
        .with(PROP_BUILD_ID, "RKQ1.211119.001")
        .with(PROP_BUILD_TYPE, "user")
        .with(PROP_BUILD_TAGS, "release-keys")
        .with(PROP_BUILD_TIME, "1695000000")
        .with(PROP_SECURITY_PATCH, "2023-09-01")
        .with(PROP_SDK_INT, "33")
        .with(PROP_INITIAL_SDK_INT, "29");
    BuildIdentity::from_props(&props)
}

const NOW_MS: i64 = 1_720_000_000_000;

fn dispatcher(flags: FeatureFlags, config: SpoofConfig) -> Dispatcher {
    Dispatcher::new(flags, config, real_device()).with_clock(|| NOW_MS)
}

fn run(d: &Dispatcher, package: &str, process: &str) -> (BuildIdentity, OverrideState) {
    let state = OverrideState::new();
    let mut identity = real_device();
    d.apply_identity_overrides(&CallerIdentity::new(package, Some(process)), &mut identity, &state);
    (identity, state)
}

fn changed_fields(before: &BuildIdentity, after: &BuildIdentity) -> Vec<Field> {
    Field::ALL
        .iter()
        .copied()
        .filter(|f| before.get(*f) != after.get(*f))
        .collect()
}

#[test]
fn unknown_package_without_flags_is_untouched() {
    let d = dispatcher(FeatureFlags::none(), SpoofConfig::default());
    for pkg in ["com.example.notes", "org.fdroid.fdroid", "com.tencent.ig"] {
        let (identity, state) = run(&d, pkg, pkg);
        assert_eq!(identity, real_device(), "{}", pkg);
        assert!(state.is_unset(), "{}", pkg);
    }
}

#[test]
fn global_switch_off_leaves_debug_build_alone() {
    let debug_build = || {
        let mut id = real_device();
        id.build_type = "userdebug".to_string();
        id.tags = "test-keys".to_string();
        id
    };
    let flags = FeatureFlags {
        enabled: false,
        ..FeatureFlags::none()
    };
    let d = Dispatcher::new(flags, SpoofConfig::default(), debug_build());

    let state = OverrideState::new();
    let mut identity = debug_build();
    let caller = CallerIdentity::new("com.example.notes", Some("com.example.notes"));
    assert!(d.apply_identity_overrides(&caller, &mut identity, &state).is_none());
    assert_eq!(identity, debug_build());
    assert!(state.is_unset());

    let d = Dispatcher::new(FeatureFlags::none(), SpoofConfig::default(), debug_build());
    let mut identity = debug_build();
    d.apply_identity_overrides(&caller, &mut identity, &state);
    assert_eq!(
        changed_fields(&debug_build(), &identity),
        vec![Field::Type, Field::Tags]
    );
}

#[test]
fn certified_fingerprint_for_store_only_touches_fingerprint() {
    let config = SpoofConfig {
        certified_fingerprint: CERTIFIED_FP.to_string(),
        ..Default::default()
    };
    let d = dispatcher(FeatureFlags::default(), config);
    let (identity, state) = run(&d, PACKAGE_FINSKY, PACKAGE_FINSKY);

    assert_eq!(identity.fingerprint, CERTIFIED_FP);
    assert_eq!(changed_fields(&real_device(), &identity), vec![Field::Fingerprint]);
    assert!(state.is_finsky());
    assert!(!state.is_certifying());
}

#[test]
fn stock_fingerprint_for_arcore() {
    let config = SpoofConfig {
        stock_fingerprint: STOCK_FP.to_string(),
        ..Default::default()
    };
    let d = dispatcher(FeatureFlags::default(), config);
    let (identity, _) = run(&d, PACKAGE_ARCORE, PACKAGE_ARCORE);

    assert_eq!(identity.fingerprint, STOCK_FP);
    assert!(changed_fields(&real_device(), &identity).len() <= 1);
}

#[test]
fn every_game_gets_its_handset() {
    let flags = FeatureFlags {
        games: true,
        ..FeatureFlags::none()
    };
    let d = dispatcher(flags, SpoofConfig::default());

    for (handset, packages) in GAME_TABLE {
        let profile = handset.profile();
        for pkg in *packages {
            let (identity, _) = run(&d, pkg, pkg);
            assert_eq!(
                Some(FieldValue::from(identity.model.clone())),
                profile.get(Field::Model).cloned(),
                "{}",
                pkg
            );
            assert_eq!(
                Some(FieldValue::from(identity.brand.clone())),
                profile.get(Field::Brand).cloned(),
                "{}",
                pkg
            );
            assert_eq!(identity.fingerprint, real_device().fingerprint, "{}", pkg);
            assert_eq!(identity.device, real_device().device, "{}", pkg);
        }
    }
}

#[test]
fn games_need_their_flag() {
    let d = dispatcher(FeatureFlags::none(), SpoofConfig::default());
    let (identity, state) = run(&d, "com.epicgames.fortnite", "com.epicgames.fortnite");
    assert_eq!(identity, real_device());
    assert!(state.active_profile().is_none());
}

static CONTRIVED_GAMES: &[(GameHandset, &[&str])] = &[(GameHandset::AsusRog3, &[PACKAGE_TURBO])];

#[test]
fn earlier_rule_wins_over_overlapping_game_rule() {
    let table = RuleTable::new(vec![
        Rule {
            name: "google-apps",
            matcher: Matcher::AnyOf(GOOGLE_APP_PACKAGES),
            gate: Gate::Gapps,
            target: Target::Flagship,
        },
        Rule {
            name: "games",
            matcher: Matcher::Any,
            gate: Gate::Games,
            target: Target::Game(CONTRIVED_GAMES),
        },
    ]);
    assert_eq!(table.overlaps().len(), 1);

    let flags = FeatureFlags {
        gapps: true,
        games: true,
        ..FeatureFlags::none()
    };
    let d = dispatcher(flags, SpoofConfig::default()).with_rules(table);
    let state = OverrideState::new();
    let mut identity = real_device();
    let applied = d
        .apply_identity_overrides(
            &CallerIdentity::new(PACKAGE_TURBO, Some(PACKAGE_TURBO)),
            &mut identity,
            &state,
        )
        .unwrap();

    assert_eq!(applied.rule, "google-apps");
    assert_eq!(identity.model, "Pixel 7 Pro");
    assert_eq!(identity.manufacturer, "Google");
    assert_eq!(state.active_profile().as_deref(), Some(PIXEL_7_PRO.name()));
}

#[test]
fn guard_blocks_droidguard_after_legacy_profile() {
    let d = dispatcher(FeatureFlags::default(), SpoofConfig::default());
    let (identity, state) = run(&d, PACKAGE_GMS, PROCESS_GMS_UNSTABLE);
    assert_eq!(identity.model, "Pixel XL");
    assert_eq!(identity.version.device_initial_sdk_int, Some(SDK_N_MR1));

    let frames = [
        "android.security.keystore2.AndroidKeyStoreSpi.engineGetCertificateChain",
        "com.google.android.gms.droidguard.DroidGuardChimeraService.b",
    ];
    let guard = AttestationGuard::new(&state);
    assert_eq!(
        guard.on_attestation_requested(&AttestationContext::from_frames(frames)),
        Err(AttestationError::Blocked)
    );
    assert_eq!(
        guard.on_attestation_requested(&AttestationContext::from_frames(["com.example.Wallet.pay"])),
        Ok(())
    );
}

#[test]
fn gms_instrumentation_is_certifying_too() {
    let d = dispatcher(FeatureFlags::default(), SpoofConfig::default());
    let (identity, state) = run(&d, PACKAGE_GMS, PROCESS_GMS_INSTRUMENTATION);

    assert_eq!(identity.device, "marlin");
    assert_eq!(identity.time, NOW_MS);
    assert!(state.is_certifying());
    assert_eq!(
        AttestationGuard::new(&state)
            .on_attestation_requested(&AttestationContext::from_attestation_subsystem()),
        Err(AttestationError::Blocked)
    );
}

#[test]
fn gms_unstable_without_gms_switch_gets_flagship_and_no_guard() {
    let flags = FeatureFlags {
        gms: false,
        ..Default::default()
    };
    let d = dispatcher(flags, SpoofConfig::default());
    let (identity, state) = run(&d, PACKAGE_GMS, PROCESS_GMS_UNSTABLE);

    assert_eq!(identity.model, "Pixel 7 Pro");
    assert_eq!(identity.version.device_initial_sdk_int, Some(29));
    assert_eq!(identity.time, real_device().time);
    assert!(!state.is_certifying());

    let frames = ["com.google.android.gms.droidguard.DroidGuardChimeraService.b"];
    assert_eq!(
        AttestationGuard::new(&state).on_attestation_requested(&AttestationContext::from_frames(frames)),
        Ok(())
    );
}

#[test]
fn rejected_profile_patch_leaves_rest_of_profile() {
    let mut patch = BTreeMap::new();
    patch.insert("DEVICE_INITIAL_SDK_INT".to_string(), json!("abc"));
    patch.insert("ID".to_string(), json!("NJH47D"));
    let mut config = SpoofConfig::default();
    config
        .profile_overrides
        .insert(prop_imitation::profiles::GMS_LEGACY.name().to_string(), patch);

    let d = dispatcher(FeatureFlags::default(), config);
    let state = OverrideState::new();
    let mut identity = real_device();
    let applied = d
        .apply_identity_overrides(
            &CallerIdentity::new(PACKAGE_GMS, Some(PROCESS_GMS_UNSTABLE)),
            &mut identity,
            &state,
        )
        .unwrap();

    assert_eq!(applied.report.skipped.len(), 1);
    assert!(matches!(
        &applied.report.skipped[0],
        FieldError::WriteRejected {
            field: Field::DeviceInitialSdkInt,
            ..
        }
    ));
    assert_eq!(identity.version.device_initial_sdk_int, Some(29));
    assert_eq!(identity.id, "NJH47D");
    assert_eq!(identity.model, "Pixel XL");
    assert!(identity.fingerprint.starts_with("google/marlin/marlin:7.1.2"));
    assert!(state.is_certifying());
}

#[test]
fn netflix_only_with_its_switch() {
    let d = dispatcher(FeatureFlags::default(), SpoofConfig::default());
    let (identity, state) = run(&d, PACKAGE_NETFLIX, PACKAGE_NETFLIX);
    assert_eq!(identity, real_device());
    assert!(!state.is_impersonating());

    let flags = FeatureFlags {
        netflix: true,
        ..Default::default()
    };
    let d = dispatcher(flags, SpoofConfig::default());
    let (identity, _) = run(&d, PACKAGE_NETFLIX, PACKAGE_NETFLIX);
    assert_eq!(identity.model, "Pixel 7 Pro");
}

#[test]
fn guard_is_noop_for_unrelated_package() {
    let d = dispatcher(FeatureFlags::default(), SpoofConfig::default());
    let (identity, state) = run(&d, "com.example.bank", "com.example.bank");
    assert_eq!(identity, real_device());

    let guard = AttestationGuard::new(&state);
    assert_eq!(
        guard.on_attestation_requested(&AttestationContext::from_attestation_subsystem()),
        Ok(())
    );
}

#[test]
fn store_blocks_attestation_even_without_certified_fingerprint() {
    let d = dispatcher(FeatureFlags::default(), SpoofConfig::default());
    let (identity, state) = run(&d, PACKAGE_FINSKY, PACKAGE_FINSKY);
    assert_eq!(identity, real_device());

    let guard = AttestationGuard::new(&state);
    assert_eq!(
        guard.on_attestation_requested(&AttestationContext::direct()),
        Err(AttestationError::Blocked)
    );
}

#[test]
fn dispatching_twice_is_idempotent() {
    let config = SpoofConfig {
        certified_fingerprint: CERTIFIED_FP.to_string(),
        stock_fingerprint: STOCK_FP.to_string(),
        ..Default::default()
    };
    let flags = FeatureFlags {
        gphotos: true,
        games: true,
        ..Default::default()
    };
    let d = dispatcher(flags, config);
    let callers = [
        (PACKAGE_GMS, PROCESS_GMS_UNSTABLE),
        (PACKAGE_GMS, PACKAGE_GMS),
        (PACKAGE_FINSKY, PACKAGE_FINSKY),
        (PACKAGE_ARCORE, PACKAGE_ARCORE),
        (PACKAGE_VELVET, PACKAGE_VELVET),
        (PACKAGE_GPHOTOS, PACKAGE_GPHOTOS),
        ("com.mobile.legends", "com.mobile.legends"),
        ("com.example.notes", "com.example.notes"),
    ];

    for (pkg, process) in callers {
        let caller = CallerIdentity::new(pkg, Some(process));
        let state = OverrideState::new();
        let mut once = real_device();
        let first = d.apply_identity_overrides(&caller, &mut once, &state);

        let mut twice = once.clone();
        let second = d.apply_identity_overrides(&caller, &mut twice, &state);

        assert_eq!(once, twice, "{}", pkg);
        assert_eq!(
            first.map(|a| a.profile),
            second.map(|a| a.profile),
            "{}",
            pkg
        );
    }
}
