use serde::Serialize;
use strum::{Display, IntoStaticStr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unit table signature not found in scanned range")]
    SignatureNotFound,

    #[error("Failed to read {length} bytes at address {address:#x}")]
    ReadFailure { address: u64, length: usize },

    #[error("No player unit (type tag 0) in unit table")]
    NoPlayerUnit,

    #[error("No player unit has a non-zero act pointer")]
    NoValidActPointer,

    #[error("End hash {0:#010x} has no preimage under the profile's hash constants")]
    HashInversionExhausted(u32),

    #[error("Init hash XOR seed is zero (stale or corrupted read)")]
    ZeroCheckValue,

    #[error("Process not found: {0}")]
    ProcessNotFound(String),

    #[error("Failed to open process: {0}")]
    ProcessOpenFailed(String),

    #[error("Module not found: {0}")]
    ModuleNotFound(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Process access is only supported on Windows")]
    UnsupportedPlatform,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Stable, fieldless name for each error, used in machine-readable output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    SignatureNotFound,
    ReadFailure,
    NoPlayerUnit,
    NoValidActPointer,
    HashInversionExhausted,
    ZeroCheckValue,
    ProcessNotFound,
    ProcessOpenFailed,
    ModuleNotFound,
    InvalidPattern,
    InvalidProfile,
    UnsupportedPlatform,
    Io,
    Json,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::SignatureNotFound => ErrorKind::SignatureNotFound,
            Error::ReadFailure { .. } => ErrorKind::ReadFailure,
            Error::NoPlayerUnit => ErrorKind::NoPlayerUnit,
            Error::NoValidActPointer => ErrorKind::NoValidActPointer,
            Error::HashInversionExhausted(_) => ErrorKind::HashInversionExhausted,
            Error::ZeroCheckValue => ErrorKind::ZeroCheckValue,
            Error::ProcessNotFound(_) => ErrorKind::ProcessNotFound,
            Error::ProcessOpenFailed(_) => ErrorKind::ProcessOpenFailed,
            Error::ModuleNotFound(_) => ErrorKind::ModuleNotFound,
            Error::InvalidPattern(_) => ErrorKind::InvalidPattern,
            Error::InvalidProfile(_) => ErrorKind::InvalidProfile,
            Error::UnsupportedPlatform => ErrorKind::UnsupportedPlatform,
            Error::Io(_) => ErrorKind::Io,
            Error::Json(_) => ErrorKind::Json,
        }
    }

    /// Check if this error came out of the derivation itself rather than
    /// from opening the target or writing output.
    pub fn is_derivation_failure(&self) -> bool {
        matches!(
            self,
            Error::SignatureNotFound
                | Error::ReadFailure { .. }
                | Error::NoPlayerUnit
                | Error::NoValidActPointer
                | Error::HashInversionExhausted(_)
                | Error::ZeroCheckValue
        )
    }
}
