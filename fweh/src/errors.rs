//! Error types for the firmware event engine
//!
//! Only registration, lifecycle and activation report errors to their
//! caller. Ingestion and dispatch never do: they log and drop, and the
//! reason for a drop is recorded as a [`DropReason`].

use fweh_common::EventCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FwehError {
    #[error("event code {code} already registered")]
    AlreadyRegistered { code: EventCode },

    #[error("event code {code} maps to firmware code {fw_code}, outside the {num_event_codes} supported codes")]
    InvalidEventCode {
        code: EventCode,
        fw_code: u32,
        num_event_codes: u32,
    },

    #[error("out of memory allocating {what}")]
    OutOfMemory { what: &'static str },

    #[error("set {iovar} error: {source}")]
    Transport {
        iovar: &'static str,
        source: FirmwareError,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("event engine is detached")]
    Detached,

    #[error("interface event maps to firmware code {if_fw_code}, outside the {num_event_codes} supported codes")]
    InvalidCodeSpace { if_fw_code: u32, num_event_codes: u32 },

    #[error("failed to start event worker: {source}")]
    WorkerSpawn { source: std::io::Error },
}

/// Failure reported by a registered event handler.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HandlerError {
    #[error("handler failed: {message}")]
    Failed { message: String },

    #[error("handler returned status {0}")]
    Status(i32),

    #[error("handler panicked: {message}")]
    Panicked { message: String },
}

/// Why a dequeued event did not complete in its handler.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("no interface object")]
    NoInterface,

    #[error("unhandled fwevt {fw_code} ignored")]
    Unhandled { fw_code: u32 },

    #[error(transparent)]
    Handler(#[from] HandlerError),
}

/// Failure reported by the interface host collaborator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("cannot create interface for bsscfg {bsscfgidx}: {reason}")]
    AddFailed { bsscfgidx: u8, reason: String },

    #[error("network attach failed for {ifname}: {reason}")]
    NetAttachFailed { ifname: String, reason: String },
}

/// Failure reported by the firmware command channel.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FirmwareError {
    #[error("operation not supported")]
    Unsupported,

    #[error("bus error {0}")]
    Bus(i32),

    #[error("firmware rejected request: {0}")]
    Rejected(String),
}

/// Why an event never reached a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DropReason {
    Truncated,
    EventTypeOutOfRange,
    NoHandler,
    PayloadTooLarge,
    PayloadOverrun,
    OutOfMemory,
    InvalidBsscfg,
    InvalidInterface,
    MissingInterface,
    Detached,
}

impl DropReason {
    pub fn all() -> Vec<DropReason> {
        vec![
            Self::Truncated,
            Self::EventTypeOutOfRange,
            Self::NoHandler,
            Self::PayloadTooLarge,
            Self::PayloadOverrun,
            Self::OutOfMemory,
            Self::InvalidBsscfg,
            Self::InvalidInterface,
            Self::MissingInterface,
            Self::Detached,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DropReason::Truncated => "truncated",
            DropReason::EventTypeOutOfRange => "event_type_out_of_range",
            DropReason::NoHandler => "no_handler",
            DropReason::PayloadTooLarge => "payload_too_large",
            DropReason::PayloadOverrun => "payload_overrun",
            DropReason::OutOfMemory => "out_of_memory",
            DropReason::InvalidBsscfg => "invalid_bsscfg",
            DropReason::InvalidInterface => "invalid_interface",
            DropReason::MissingInterface => "missing_interface",
            DropReason::Detached => "detached",
        }
    }

    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl std::fmt::Display for DropReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for DropReason {
    type Err = FwehError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        DropReason::all()
            .into_iter()
            .find(|reason| reason.as_str() == s)
            .ok_or_else(|| FwehError::ConfigError {
                message: format!("unknown drop reason: {s}"),
            })
    }
}

pub type Result<T> = std::result::Result<T, FwehError>;
