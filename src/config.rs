//! Node configuration parameters
//!
//! Timing for the tick loop, button gestures and network join, plus the
//! write-once endpoint description registered with the network stack.
//! Defaults reproduce the shipped node; a postcard-encoded override can be
//! stored in NVS and is validated before use.

use heapless::String;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Highest application endpoint number a Zigbee device may use.
const MAX_ENDPOINT: u8 = 240;

/// Core node configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    // --- Tick loop ---
    /// Main loop tick period (milliseconds)
    pub tick_ms: u32,

    // --- Button ---
    /// Bounces after a press edge are ignored for this long (milliseconds)
    pub debounce_ms: u32,
    /// Pin re-sample interval while the button is held (milliseconds)
    pub hold_sample_ms: u32,
    /// Continuous hold that triggers a factory reset (milliseconds)
    pub long_press_ms: u32,

    // --- Network join ---
    /// Interval between `connected()` polls while joining (milliseconds)
    pub join_poll_ms: u32,
    /// Maximum wait for a connection; `None` waits forever
    pub join_timeout_ms: Option<u32>,
    /// Delay between the join failure message and the restart (milliseconds)
    pub restart_delay_ms: u32,
    /// Pause after connecting before the time cluster is read (milliseconds)
    pub connect_settle_ms: u32,

    // --- Reporting ---
    /// Pause after a report so repeated presses don't flood the coordinator
    pub report_pacing_ms: u32,
    /// Automatic reporting; `None` keeps the node manual-trigger only
    pub reporting: Option<ReportingPolicy>,
    /// How often the sensor is sampled for the automatic policy (milliseconds)
    pub auto_sample_ms: u32,

    // --- Factory reset ---
    /// Pause between the reset message and the credential erase (milliseconds)
    pub factory_reset_delay_ms: u32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            tick_ms: 100,

            debounce_ms: 100,
            hold_sample_ms: 50,
            long_press_ms: 3000,

            join_poll_ms: 100,
            join_timeout_ms: None,
            restart_delay_ms: 2000,
            connect_settle_ms: 1000,

            report_pacing_ms: 1000,
            reporting: None,
            auto_sample_ms: 5000,

            factory_reset_delay_ms: 100,
        }
    }
}

impl NodeConfig {
    /// Reject values that would stall or confuse the tick loop.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::ValidationFailed("tick_ms must be non-zero"));
        }
        if self.hold_sample_ms == 0 {
            return Err(ConfigError::ValidationFailed("hold_sample_ms must be non-zero"));
        }
        if self.join_poll_ms == 0 {
            return Err(ConfigError::ValidationFailed("join_poll_ms must be non-zero"));
        }
        if self.debounce_ms >= self.long_press_ms {
            return Err(ConfigError::ValidationFailed(
                "debounce_ms must be shorter than long_press_ms",
            ));
        }
        if let Some(policy) = &self.reporting {
            policy.validate()?;
            if self.auto_sample_ms == 0 {
                return Err(ConfigError::ValidationFailed("auto_sample_ms must be non-zero"));
            }
        }
        Ok(())
    }

    /// Decode a postcard-encoded override and validate it.
    pub fn decode(bytes: &[u8]) -> Result<Self, ConfigError> {
        let cfg: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
        cfg.validate()?;
        Ok(cfg)
    }
}

/// When an automatic report is due.
///
/// A report is due once `max_interval_secs` has elapsed since the last one,
/// or once `min_interval_secs` has elapsed and the temperature has moved by
/// at least `delta_c` from the last reported value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportingPolicy {
    pub min_interval_secs: u16,
    pub max_interval_secs: u16,
    /// Temperature change (°C) that forces a report after the minimum interval.
    pub delta_c: f32,
}

impl Default for ReportingPolicy {
    /// Every 60 s, or on a 0.5 °C change.
    fn default() -> Self {
        Self {
            min_interval_secs: 0,
            max_interval_secs: 60,
            delta_c: 0.5,
        }
    }
}

impl ReportingPolicy {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_interval_secs > self.max_interval_secs {
            return Err(ConfigError::ValidationFailed(
                "reporting min_interval must not exceed max_interval",
            ));
        }
        if !(self.delta_c >= 0.0) {
            return Err(ConfigError::ValidationFailed("reporting delta must be non-negative"));
        }
        Ok(())
    }

    /// Pure due-check against the time since the last report.
    pub fn is_due(&self, elapsed_ms: u32, value: f32, last_reported: f32) -> bool {
        let min_ms = u32::from(self.min_interval_secs) * 1000;
        let max_ms = u32::from(self.max_interval_secs) * 1000;
        elapsed_ms >= max_ms
            || (elapsed_ms >= min_ms && (value - last_reported).abs() >= self.delta_c)
    }
}

// ---------------------------------------------------------------------------
// Endpoint description
// ---------------------------------------------------------------------------

/// How the node is powered, as advertised in the basic cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerSource {
    Mains,
    Battery { percent: u8, decivolts: u8 },
}

/// An inclusive measurement range with its reporting tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasuredRange {
    pub min: f32,
    pub max: f32,
    pub tolerance: f32,
}

impl MeasuredRange {
    pub const fn new(min: f32, max: f32, tolerance: f32) -> Self {
        Self { min, max, tolerance }
    }

    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        if !(self.min <= self.max) || !(self.tolerance >= 0.0) {
            return Err(ConfigError::ValidationFailed(field));
        }
        Ok(())
    }
}

/// Static endpoint configuration, fixed at boot and registered once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub endpoint: u8,
    pub manufacturer: String<32>,
    pub model: String<32>,
    /// Temperature measurement range (°C).
    pub temperature: MeasuredRange,
    /// Relative humidity range (%).
    pub humidity: MeasuredRange,
    /// Expose the time cluster so the coordinator can serve UTC + timezone.
    pub time_cluster: bool,
    pub power: PowerSource,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        let mut manufacturer = String::new();
        let _ = manufacturer.push_str("Espressif");
        let mut model = String::new();
        let _ = model.push_str("ZigbeeTempHumSensor");
        Self {
            endpoint: 10,
            manufacturer,
            model,
            temperature: MeasuredRange::new(0.0, 50.0, 1.0),
            humidity: MeasuredRange::new(0.0, 100.0, 1.0),
            time_cluster: true,
            power: PowerSource::Battery {
                percent: 100,
                decivolts: 35,
            },
        }
    }
}

impl EndpointConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint == 0 || self.endpoint > MAX_ENDPOINT {
            return Err(ConfigError::ValidationFailed("endpoint must be in 1..=240"));
        }
        if self.manufacturer.is_empty() || self.model.is_empty() {
            return Err(ConfigError::ValidationFailed("manufacturer and model are required"));
        }
        self.temperature
            .validate("temperature range must satisfy min <= max, tolerance >= 0")?;
        self.humidity
            .validate("humidity range must satisfy min <= max, tolerance >= 0")?;
        if let PowerSource::Battery { percent, .. } = self.power {
            if percent > 100 {
                return Err(ConfigError::ValidationFailed("battery percent must be <= 100"));
            }
        }
        Ok(())
    }
}
