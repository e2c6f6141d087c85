//! Port traits: the hexagonal boundary between the node core and its
//! collaborators.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ NodeService (domain)
//! ```
//!
//! The sensor driver, network stack, display and GPIO are all external
//! collaborators assumed to be correct.  Adapters implement these traits;
//! [`NodeService`](super::service::NodeService) consumes them via generics
//! so the core never touches hardware directly and runs unchanged in host
//! tests.

use chrono::NaiveDateTime;

use crate::config::{EndpointConfig, PowerSource};
use crate::error::{InitError, SensorError};

// ───────────────────────────────────────────────────────────────
// Sensor port
// ───────────────────────────────────────────────────────────────

/// One raw measurement as returned by the sensor collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

/// Sensor repeatability / measurement duration trade-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    Low,
    Medium,
    High,
}

/// On-chip heater setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaterMode {
    Off,
    /// Short low-power pulse, for condensation recovery.
    Low,
    High,
}

pub trait SensorPort {
    /// Probe the device; `Err` means it is absent and the node cannot run.
    fn init(&mut self) -> Result<(), InitError>;

    /// Fire-once configuration at boot.
    fn set_precision(&mut self, precision: Precision);

    /// Fire-once configuration at boot.
    fn set_heater(&mut self, mode: HeaterMode);

    fn read(&mut self) -> Result<Measurement, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Network endpoint port
// ───────────────────────────────────────────────────────────────

/// The logical endpoint exposing measurements and the time cluster.
pub trait EndpointPort {
    /// Apply the write-once endpoint description.  Called before the
    /// endpoint is added to the stack.
    fn register(&mut self, config: &EndpointConfig);

    /// Update the cached temperature attribute (°C).
    fn set_temperature(&mut self, celsius: f32);

    /// Update the cached relative humidity attribute (%).
    fn set_humidity(&mut self, percent: f32);

    /// Request an immediate report of the cached attributes.  Fire-and-forget.
    fn report(&mut self);

    /// UTC time served by the coordinator.
    fn utc_time(&mut self) -> NaiveDateTime;

    /// Coordinator timezone offset in seconds.
    fn timezone_offset(&mut self) -> i32;

    fn set_power_source(&mut self, source: PowerSource);
}

// ───────────────────────────────────────────────────────────────
// Network stack port
// ───────────────────────────────────────────────────────────────

pub trait NetworkStackPort {
    /// Add the registered endpoint to the stack.
    fn add_endpoint(&mut self);

    /// Start the stack in end-device mode.  `false` means the stack could
    /// not be brought up at all.
    fn begin(&mut self) -> bool;

    fn connected(&mut self) -> bool;

    /// Erase network-join credentials.  Irreversible.
    fn factory_reset(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Status output port
// ───────────────────────────────────────────────────────────────

/// Human-readable status mirrored to the console and the character display.
pub trait StatusPort {
    /// Bring up the display.  `Err` is fatal at boot.
    fn init(&mut self) -> Result<(), InitError>;

    /// Replace the displayed text.  No scrollback.
    fn show(&mut self, text: &str);
}

// ───────────────────────────────────────────────────────────────
// Digital input port
// ───────────────────────────────────────────────────────────────

/// Raw logic level of a digital pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    High,
    Low,
}

pub trait DigitalInputPort {
    /// Verify the pin (pull-up already configured) can be read.
    fn init(&mut self) -> Result<(), InitError>;

    fn read_level(&mut self) -> Level;
}

// ───────────────────────────────────────────────────────────────
// Platform port
// ───────────────────────────────────────────────────────────────

/// Monotonic clock, blocking delay and restart.  Injected so that every
/// wait in the node core can run without real time elapsing in tests.
pub trait PlatformPort {
    /// Milliseconds since boot (wrapping).
    fn now_ms(&self) -> u32;

    fn delay_ms(&mut self, ms: u32);

    /// Full device restart.  On hardware this does not return.
    fn restart(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Event sink port
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`NodeEvent`](super::events::NodeEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::NodeEvent);
}
