use std::{path::Path, sync::Arc};

use log::info;

use crate::{
    config::LOG_TAG,
    dispatch::{AppliedProfile, CallerIdentity, Dispatcher},
    flags::FeatureFlags,
    guard::AttestationGuard,
    identity::BuildIdentity,
    logging,
    props::PropertySource,
    state::OverrideState,
    user_config::load_or_init,
};

/// What the startup sequence owns after dispatch: the identity the process
/// exposes and the state the attestation path consults.
#[derive(Debug)]
pub struct ProcessContext {
    pub identity: BuildIdentity,
    pub state: Arc<OverrideState>,
    pub applied: Option<AppliedProfile>,
}

impl ProcessContext {
    /// Run once at application start: read the knobs, capture the real
    /// identity, dispatch.
    pub fn start(props: &impl PropertySource, config_path: &Path, caller: &CallerIdentity<'_>) -> Self {
        logging::init(LOG_TAG);

        let flags = FeatureFlags::from_props(props);
        let config = load_or_init(config_path);
        let device = BuildIdentity::from_props(props);
        let dispatcher = Dispatcher::new(flags, config, device.clone());

        Self::with_dispatcher(&dispatcher, device, caller)
    }

    /// [`start`](Self::start) against the device's property area and the
    /// module's config file.
    #[cfg(target_os = "android")]
    pub fn start_from_system(caller: &CallerIdentity<'_>) -> Self {
        let props = crate::props::SystemProps::new();
        Self::start(&props, Path::new(crate::config::CONFIG_PATH), caller)
    }

    pub fn with_dispatcher(dispatcher: &Dispatcher, device: BuildIdentity, caller: &CallerIdentity<'_>) -> Self {
        let mut identity = device;
        let state = Arc::new(OverrideState::new());
        let applied = dispatcher.apply_identity_overrides(caller, &mut identity, &state);
        if applied.is_none() {
            info!("PROC: no profile for {}", caller.package);
        }
        Self {
            identity,
            state,
            applied,
        }
    }

    pub fn guard(&self) -> AttestationGuard<'_> {
        AttestationGuard::new(&self.state)
    }
}
