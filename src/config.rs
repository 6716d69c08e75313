pub const LOG_TAG: &str = "PropImitation";

pub const CONFIG_PATH: &str = "/data/adb/modules/prop_imitation/config/config.json";

// Feature switches (system properties)
pub const PROP_ENABLE_ALL: &str = "persist.sys.pixelprops.all";
pub const PROP_SPOOF_GMS: &str = "persist.sys.pixelprops.gms";
pub const PROP_SPOOF_GAPPS: &str = "persist.sys.pixelprops.gapps";
pub const PROP_SPOOF_GPHOTOS: &str = "persist.sys.pixelprops.gphotos";
pub const PROP_SPOOF_GPHOTOS_LEGACY: &str = "persist.sys.pixelprops.gphotos.legacy";
pub const PROP_SPOOF_GAMES: &str = "persist.sys.pixelprops.games";
pub const PROP_SPOOF_NETFLIX: &str = "persist.sys.pixelprops.netflix";

// Real device identity (read-only build properties)
pub const PROP_BRAND: &str = "ro.product.brand";
pub const PROP_MANUFACTURER: &str = "ro.product.manufacturer";
pub const PROP_DEVICE: &str = "ro.product.device";
pub const PROP_PRODUCT: &str = "ro.product.name";
pub const PROP_HARDWARE: &str = "ro.hardware";
pub const PROP_MODEL: &str = "ro.product.model";
pub const PROP_FINGERPRINT: &str = "ro.build.fingerprint";
pub const PROP_BUILD_ID: &str = "ro.build.id";
pub const PROP_BUILD_TYPE: &str = "ro.build.type";
pub const PROP_BUILD_TAGS: &str = "ro.build.tags";
pub const PROP_BUILD_TIME: &str = "ro.build.date.utc";
pub const PROP_SECURITY_PATCH: &str = "ro.build.version.security_patch";
pub const PROP_SDK_INT: &str = "ro.build.version.sdk";
pub const PROP_INITIAL_SDK_INT: &str = "ro.product.first_api_level";
pub const PROP_INCREMENTAL: &str = "ro.build.version.incremental";
pub const PROP_RELEASE: &str = "ro.build.version.release";

// Packages / processes
pub const PACKAGE_ARCORE: &str = "com.google.ar.core";
pub const PACKAGE_FINSKY: &str = "com.android.vending";
pub const PACKAGE_GMS: &str = "com.google.android.gms";
pub const PROCESS_GMS_UNSTABLE: &str = "com.google.android.gms.unstable";
pub const PROCESS_GMS_INSTRUMENTATION: &str = "com.google.android.gms.instrumentation";

pub const PACKAGE_GPHOTOS: &str = "com.google.android.apps.photos";
pub const PACKAGE_SUBSCRIPTION_RED: &str = "com.google.android.apps.subscriptions.red";
pub const PACKAGE_TURBO: &str = "com.google.android.apps.turbo";
pub const PACKAGE_VELVET: &str = "com.google.android.googlequicksearchbox";
pub const PACKAGE_GBOARD: &str = "com.google.android.inputmethod.latin";
pub const PACKAGE_SETUPWIZARD: &str = "com.google.android.setupwizard";
pub const PACKAGE_NETFLIX: &str = "com.netflix.mediaclient";
pub const PACKAGE_SETTINGS_INTELLIGENCE: &str = "com.google.android.settings.intelligence";

/// Packages that get the flagship profile when the gapps switch is on.
pub const GOOGLE_APP_PACKAGES: &[&str] = &[
    PACKAGE_SUBSCRIPTION_RED,
    PACKAGE_TURBO,
    PACKAGE_VELVET,
    PACKAGE_GBOARD,
    PACKAGE_SETUPWIZARD,
    PACKAGE_GMS,
];

/// Any package with this prefix keeps its real identity.
pub const KEEP_PREFIX_GCAM: &str = "com.google.android.GoogleCamera";

/// Call frames containing this (case-insensitive) belong to the attestation subsystem.
pub const ATTESTATION_FRAME_MARKER: &str = "droidguard";

// Android 7.1 (N_MR1)
pub const SDK_N_MR1: i32 = 25;
