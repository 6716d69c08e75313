use log::LevelFilter;

#[cfg(debug_assertions)]
pub const MAX_LOG_LEVEL: LevelFilter = LevelFilter::Debug;
#[cfg(not(debug_assertions))]
pub const MAX_LOG_LEVEL: LevelFilter = LevelFilter::Info;

/// Route `log` records to logcat under `tag`. Safe to call more than once.
#[cfg(target_os = "android")]
pub fn init(tag: &str) {
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(MAX_LOG_LEVEL)
            .with_tag(tag),
    );
}

/// Off-device the host owns the logger and its level.
#[cfg(not(target_os = "android"))]
pub fn init(_tag: &str) {}
