//! Unified error types for the THNode firmware.
//!
//! One `Error` enum that every subsystem converts into, so the lifecycle
//! controller handles failures uniformly. All variants are `Copy` so they
//! can be passed into events and status output without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A required peripheral is missing at boot.
    Init(InitError),
    /// The network stack could not be started or joined.
    Join(JoinError),
    /// A sensor read failed or returned an unusable value.
    Sensor(SensorError),
    /// Configuration is invalid or could not be decoded.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init(e) => write!(f, "init: {e}"),
            Self::Join(e) => write!(f, "join: {e}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Boot-time peripheral failures (fatal, halt-and-display)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    /// The status display did not answer on the bus.
    DisplayNotFound,
    /// The temperature/humidity sensor did not answer on the bus.
    SensorNotFound,
    /// The button input could not be read.
    InputUnavailable,
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DisplayNotFound => write!(f, "display not found"),
            Self::SensorNotFound => write!(f, "sensor not found"),
            Self::InputUnavailable => write!(f, "button input unavailable"),
        }
    }
}

impl From<InitError> for Error {
    fn from(e: InitError) -> Self {
        Self::Init(e)
    }
}

// ---------------------------------------------------------------------------
// Network join failures (fatal, reboot after delay)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinError {
    /// The stack's start call itself failed.
    StartFailed,
    /// No connection within the configured maximum wait.
    Timeout { waited_ms: u32 },
}

impl fmt::Display for JoinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartFailed => write!(f, "network start failed"),
            Self::Timeout { waited_ms } => write!(f, "not connected after {waited_ms} ms"),
        }
    }
}

impl From<JoinError> for Error {
    fn from(e: JoinError) -> Self {
        Self::Join(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor errors (non-fatal, skip one report cycle)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The bus transaction was not acknowledged or aborted.
    Bus,
    /// A received word failed its checksum.
    Crc,
    /// The value is a sentinel or outside the physically plausible range.
    InvalidReading,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus => write!(f, "bus transaction failed"),
            Self::Crc => write!(f, "checksum mismatch"),
            Self::InvalidReading => write!(f, "invalid reading"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored blob could not be decoded.
    Corrupted,
    /// A field failed range validation; the message names the field.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
