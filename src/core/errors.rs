//! Engine error types

use thiserror::Error;

/// Status codes shared by the device and resources boundaries.
///
/// Zero ("no error") is never represented here; successful calls return
/// `Ok`. `NotValidated` doubles as a protocol condition inside the
/// present-or-validate fast path, where it steers the fallback rather
/// than surfacing as a command error.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwcError {
    #[error("bad config")]
    BadConfig,

    #[error("bad display")]
    BadDisplay,

    #[error("bad layer")]
    BadLayer,

    #[error("bad parameter")]
    BadParameter,

    #[error("no resources")]
    NoResources,

    #[error("not validated")]
    NotValidated,

    #[error("unsupported")]
    Unsupported,

    #[error("seamless not allowed")]
    SeamlessNotAllowed,

    #[error("seamless not possible")]
    SeamlessNotPossible,
}

impl HwcError {
    /// Wire code reported to the client in error result payloads.
    pub fn code(self) -> i32 {
        match self {
            Self::BadConfig => 1,
            Self::BadDisplay => 2,
            Self::BadLayer => 3,
            Self::BadParameter => 4,
            Self::NoResources => 6,
            Self::NotValidated => 7,
            Self::Unsupported => 8,
            Self::SeamlessNotAllowed => 9,
            Self::SeamlessNotPossible => 10,
        }
    }
}

/// Result type for device and resource calls
pub type HalResult<T> = std::result::Result<T, HwcError>;

/// Fatal engine initialization errors.
///
/// Per-command failures are reported through result payloads and never
/// surface here; the only fatal condition is failing to set up result
/// accumulation before any command runs.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("failed to allocate result storage: {0}")]
    ResultStorage(#[from] std::collections::TryReserveError),
}
