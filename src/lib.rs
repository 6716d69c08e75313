//! Per-process device identity overrides.
//!
//! At application start the [`Dispatcher`] matches the calling package and
//! process against a fixed rule table and rewrites the process's build
//! identity to the selected [`DeviceProfile`]. The resulting
//! [`OverrideState`] is later consulted by the [`AttestationGuard`], which
//! refuses hardware key attestation while an impersonation is active.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod fingerprint;
pub mod flags;
pub mod guard;
pub mod identity;
pub mod logging;
pub mod process;
pub mod profiles;
pub mod props;
pub mod rules;
pub mod state;
pub mod user_config;

pub use dispatch::{AppliedProfile, CallerIdentity, Dispatcher};
pub use error::{AttestationError, ConfigError, DispatchError, FieldError};
pub use flags::FeatureFlags;
pub use guard::{AttestationContext, AttestationGuard};
pub use identity::{BuildIdentity, Field, FieldValue};
pub use process::ProcessContext;
pub use profiles::{DeviceProfile, GameHandset};
pub use props::{MapProps, PropertySource};
#[cfg(target_os = "android")]
pub use props::SystemProps;
pub use rules::{Rule, RuleTable};
pub use state::OverrideState;
pub use user_config::SpoofConfig;
