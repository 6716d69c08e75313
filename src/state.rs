use std::sync::{
    atomic::{AtomicBool, Ordering},
    RwLock,
};

/// Per-process override state.
///
/// Owned by the process startup sequence and shared by reference (or `Arc`)
/// with the attestation path. Written by the dispatcher before any reader
/// runs, then only read.
#[derive(Debug, Default)]
pub struct OverrideState {
    /// Attestation-sensitive process running under the legacy profile.
    certifying: AtomicBool,
    /// Process belongs to the package store / licensing client.
    finsky: AtomicBool,
    /// Package keeps its real identity; the guard stands down.
    excluded: AtomicBool,
    active_profile: RwLock<Option<String>>,
}

impl OverrideState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_certifying(&self) -> bool {
        self.certifying.load(Ordering::Acquire)
    }

    pub fn is_finsky(&self) -> bool {
        self.finsky.load(Ordering::Acquire)
    }

    pub fn is_excluded(&self) -> bool {
        self.excluded.load(Ordering::Acquire)
    }

    pub fn active_profile(&self) -> Option<String> {
        self.active_profile
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn is_impersonating(&self) -> bool {
        self.active_profile
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// True when nothing has been recorded yet.
    pub fn is_unset(&self) -> bool {
        !self.is_certifying() && !self.is_finsky() && !self.is_excluded() && !self.is_impersonating()
    }

    pub(crate) fn set_certifying(&self, v: bool) {
        self.certifying.store(v, Ordering::Release);
    }

    pub(crate) fn set_finsky(&self, v: bool) {
        self.finsky.store(v, Ordering::Release);
    }

    pub(crate) fn set_excluded(&self, v: bool) {
        self.excluded.store(v, Ordering::Release);
    }

    pub(crate) fn set_active_profile(&self, name: Option<String>) {
        *self
            .active_profile
            .write()
            .unwrap_or_else(|e| e.into_inner()) = name;
    }
}
