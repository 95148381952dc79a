//! Error module for streamrelay
//!
//! This module defines the crate-level error type and error codes, plus the
//! per-concern error enums surfaced by the store, the webhook pipeline and
//! the command front end.

use thiserror::Error;
use std::fmt;

/// Error code catalogue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Webhook errors (0x0001-0x0100)
    MalformedPayload = 0x0001,
    NotLive = 0x0002,
    MissingChallenge = 0x0003,

    // Store errors (0x0101-0x0200)
    StoreReadFailed = 0x0101,
    StoreWriteFailed = 0x0102,
    CorruptEntry = 0x0103,

    // Delivery errors (0x0201-0x0300)
    DeliveryFailed = 0x0201,
    DeliveryTimeout = 0x0202,

    // System errors (0x0301-0x0400)
    InternalServerError = 0x0301,
    ConfigInvalid = 0x0302,
    BindFailed = 0x0303,

    // Command errors (0x0401-0x0500)
    InvalidCommand = 0x0401,
}

impl ErrorCode {
    /// Get the error code as a u16
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Get the error code category
    pub fn category(&self) -> ErrorCategory {
        match self.as_u16() {
            0x0001..=0x0100 => ErrorCategory::Webhook,
            0x0101..=0x0200 => ErrorCategory::Store,
            0x0201..=0x0300 => ErrorCategory::Delivery,
            0x0301..=0x0400 => ErrorCategory::System,
            0x0401..=0x0500 => ErrorCategory::Command,
            _ => ErrorCategory::Unknown,
        }
    }

    /// Try to convert a u16 to an ErrorCode
    pub fn from_u16(code: u16) -> Option<Self> {
        match code {
            0x0001 => Some(Self::MalformedPayload),
            0x0002 => Some(Self::NotLive),
            0x0003 => Some(Self::MissingChallenge),
            0x0101 => Some(Self::StoreReadFailed),
            0x0102 => Some(Self::StoreWriteFailed),
            0x0103 => Some(Self::CorruptEntry),
            0x0201 => Some(Self::DeliveryFailed),
            0x0202 => Some(Self::DeliveryTimeout),
            0x0301 => Some(Self::InternalServerError),
            0x0302 => Some(Self::ConfigInvalid),
            0x0303 => Some(Self::BindFailed),
            0x0401 => Some(Self::InvalidCommand),
            _ => None,
        }
    }

    /// Get a human-readable description of the error code
    pub fn description(&self) -> &'static str {
        match self {
            Self::MalformedPayload => "Webhook payload could not be decoded",
            Self::NotLive => "Webhook event is not a live notification",
            Self::MissingChallenge => "Handshake request without a single challenge",
            Self::StoreReadFailed => "Failed to read from the subscriber store",
            Self::StoreWriteFailed => "Failed to write to the subscriber store",
            Self::CorruptEntry => "Stored subscriber entry could not be decoded",
            Self::DeliveryFailed => "Failed to deliver a notification",
            Self::DeliveryTimeout => "Notification delivery timed out",
            Self::InternalServerError => "Unexpected server error",
            Self::ConfigInvalid => "Invalid configuration",
            Self::BindFailed => "Failed to bind the webhook listener",
            Self::InvalidCommand => "Command could not be handled",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MalformedPayload => "MALFORMED_PAYLOAD",
            Self::NotLive => "NOT_LIVE",
            Self::MissingChallenge => "MISSING_CHALLENGE",
            Self::StoreReadFailed => "STORE_READ_FAILED",
            Self::StoreWriteFailed => "STORE_WRITE_FAILED",
            Self::CorruptEntry => "CORRUPT_ENTRY",
            Self::DeliveryFailed => "DELIVERY_FAILED",
            Self::DeliveryTimeout => "DELIVERY_TIMEOUT",
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
            Self::ConfigInvalid => "CONFIG_INVALID",
            Self::BindFailed => "BIND_FAILED",
            Self::InvalidCommand => "INVALID_COMMAND",
        };
        write!(f, "{} (0x{:04X})", name, self.as_u16())
    }
}

/// Error category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Webhook,
    Store,
    Delivery,
    System,
    Command,
    Unknown,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Webhook => write!(f, "Webhook"),
            Self::Store => write!(f, "Store"),
            Self::Delivery => write!(f, "Delivery"),
            Self::System => write!(f, "System"),
            Self::Command => write!(f, "Command"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Main error type for streamrelay
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("{code}: {message}")]
    Standard {
        code: ErrorCode,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl RelayError {
    /// Create a new standard error with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Standard {
            code,
            message: message.into(),
        }
    }

    /// Get the error code if one applies
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Standard { code, .. } => Some(*code),
            Self::Store(e) => Some(e.code()),
            _ => None,
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        match self {
            Self::Standard { message, .. } => message.clone(),
            _ => self.to_string(),
        }
    }
}

/// Result type alias for streamrelay operations
pub type Result<T> = std::result::Result<T, RelayError>;

/// Failures of the durable key/value layer
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read key {key}: {reason}")]
    Read { key: String, reason: String },

    #[error("failed to write key {key}: {reason}")]
    Write { key: String, reason: String },

    #[error("corrupt store document: {0}")]
    Corrupt(String),

    #[error("store lock poisoned")]
    Poisoned,
}

impl StoreError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Read { .. } => ErrorCode::StoreReadFailed,
            Self::Write { .. } | Self::Poisoned => ErrorCode::StoreWriteFailed,
            Self::Corrupt(_) => ErrorCode::CorruptEntry,
        }
    }
}

/// Handshake failures. Both variants answer with the same body.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("no hub.challenge parameter")]
    MissingChallenge,

    #[error("{0} hub.challenge parameters")]
    AmbiguousChallenge(usize),
}

impl VerificationError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::MissingChallenge
    }

    /// Response body sent back to the provider
    pub fn response_body(&self) -> &'static str {
        "no challenge"
    }
}

/// Webhook body decoding failures, one per pipeline stage
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("body is not a JSON object")]
    MalformedJson,

    #[error("`data` is not an array of objects")]
    MissingDataArray,

    #[error("event type {0:?} is not live")]
    NotLiveEvent(Option<String>),

    #[error("`user_name` or `title` missing")]
    MissingFields,
}

impl ParseError {
    /// Non-live pings are expected traffic and are dropped quietly
    pub fn is_ignorable(&self) -> bool {
        matches!(self, Self::NotLiveEvent(_))
    }

    /// Diagnostic body returned for this stage
    pub fn response_body(&self) -> &'static str {
        match self {
            Self::MalformedJson => "first string decode fail",
            Self::MissingDataArray => "second string decode fail",
            Self::NotLiveEvent(_) => "not live",
            Self::MissingFields => "no user name or title",
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NotLiveEvent(_) => ErrorCode::NotLive,
            _ => ErrorCode::MalformedPayload,
        }
    }
}

/// A single outbound send failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("recipient unreachable: {0}")]
    Unreachable(String),
}

/// Text-command failures, rendered as chat replies
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Please specify three parameters")]
    WrongArity(usize),

    #[error("Sorry I don't allow you to unsubscribe yet lol :)")]
    Unsupported,

    #[error("Unsupported parameter.")]
    UnsupportedParameter(String),

    #[error("Something went wrong saving your subscription, try again later")]
    Store(#[from] StoreError),

    #[error("{0}")]
    Rejected(&'static str),
}

impl CommandError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Store(e) => e.code(),
            _ => ErrorCode::InvalidCommand,
        }
    }

    /// Text sent back to whoever issued the command
    pub fn reply(&self) -> String {
        self.to_string()
    }
}
