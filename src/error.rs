use std::{io, path::PathBuf};

use thiserror::Error;

use crate::identity::Field;

/// Failure to write one identity field. Always recovered by skipping that field.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("No identity field named {0:?}")]
    NotFound(String),
    #[error("Cannot write {value:?} into {field:?}: {reason}")]
    WriteRejected {
        field: Field,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Caller package or process name unavailable")]
    MissingCallerIdentity,
}

/// Surfaced to the attestation subsystem as an unsupported operation.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AttestationError {
    #[error("Key attestation is not supported in this process")]
    Blocked,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid config: {0}")]
    Invalid(String),
}
