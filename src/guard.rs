//! Attestation guard.
//!
//! Once identity fields are overridden, a hardware attestation chain would
//! contradict them. The keystore path calls [`AttestationGuard::on_attestation_requested`]
//! before producing a certificate chain; a refusal surfaces to the caller as
//! an unsupported operation and is never retried here.

use log::{debug, warn};

use crate::{config::ATTESTATION_FRAME_MARKER, error::AttestationError, state::OverrideState};

/// How the attestation request was reached.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttestationContext {
    via_attestation_subsystem: bool,
}

impl AttestationContext {
    /// Request from ordinary app code.
    pub fn direct() -> Self {
        Self {
            via_attestation_subsystem: false,
        }
    }

    /// Request made on behalf of the device-attestation subsystem.
    pub fn from_attestation_subsystem() -> Self {
        Self {
            via_attestation_subsystem: true,
        }
    }

    /// Infer the origin from call frame names, for callers that cannot pass
    /// it explicitly. Any frame naming the attestation subsystem counts.
    pub fn from_frames<I, S>(frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let via = frames
            .into_iter()
            .any(|f| f.as_ref().to_ascii_lowercase().contains(ATTESTATION_FRAME_MARKER));
        Self {
            via_attestation_subsystem: via,
        }
    }

    pub fn is_via_attestation_subsystem(&self) -> bool {
        self.via_attestation_subsystem
    }
}

#[derive(Clone, Copy, Debug)]
pub struct AttestationGuard<'a> {
    state: &'a OverrideState,
}

impl<'a> AttestationGuard<'a> {
    pub fn new(state: &'a OverrideState) -> Self {
        Self { state }
    }

    pub fn on_attestation_requested(&self, ctx: &AttestationContext) -> Result<(), AttestationError> {
        if self.state.is_excluded() {
            return Ok(());
        }

        let certifying = self.state.is_certifying();
        let finsky = self.state.is_finsky();
        if (certifying && ctx.is_via_attestation_subsystem()) || finsky {
            warn!(
                "GUARD: blocked key attestation certifying={} finsky={} profile={:?}",
                certifying,
                finsky,
                self.state.active_profile()
            );
            return Err(AttestationError::Blocked);
        }

        debug!("GUARD: attestation allowed");
        Ok(())
    }
}
