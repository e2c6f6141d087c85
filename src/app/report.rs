//! Reporting pipeline.
//!
//! ```text
//!  SensorPort ──read──▶ validate ──▶ EndpointPort cache ──▶ report()
//!                           │                                  │
//!                           └── failure ──▶ StatusPort    status line
//! ```
//!
//! A report is triggered by a short press or, when a [`ReportingPolicy`] is
//! configured, by the automatic due-check on the tick loop.  A failed read
//! skips the cycle without touching the endpoint cache; the next trigger
//! retries naturally.

use core::fmt::Write as _;

use heapless::String;
use log::{info, warn};

use crate::config::{NodeConfig, ReportingPolicy};
use crate::error::SensorError;

use super::events::NodeEvent;
use super::ports::{EndpointPort, EventSink, Measurement, PlatformPort, SensorPort, StatusPort};

/// Plausible limits for a combined temperature/humidity sensor.  Anything
/// outside is a driver sentinel or garbage.
const TEMP_PLAUSIBLE_C: (f32, f32) = (-45.0, 130.0);
const HUMIDITY_PLAUSIBLE_PCT: (f32, f32) = (0.0, 100.0);

/// A validated measurement stamped with the monotonic time it was taken.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorReading {
    pub temperature: f32,
    pub relative_humidity: f32,
    pub timestamp_ms: u32,
}

/// What started a report cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportTrigger {
    Manual,
    Policy,
}

/// Reject non-finite or physically impossible values.
pub fn validate(m: Measurement) -> Result<Measurement, SensorError> {
    let t_ok = m.temperature_c.is_finite()
        && (TEMP_PLAUSIBLE_C.0..=TEMP_PLAUSIBLE_C.1).contains(&m.temperature_c);
    let h_ok = m.humidity_pct.is_finite()
        && (HUMIDITY_PLAUSIBLE_PCT.0..=HUMIDITY_PLAUSIBLE_PCT.1).contains(&m.humidity_pct);
    if t_ok && h_ok {
        Ok(m)
    } else {
        Err(SensorError::InvalidReading)
    }
}

/// Status line shown after a successful report.
pub fn format_reading(reading: &SensorReading) -> String<64> {
    let mut out = String::new();
    let _ = write!(
        out,
        "Temperature: {:.2}\u{00b0}C\nHumidity: {:.2}% rH",
        reading.temperature, reading.relative_humidity
    );
    out
}

pub struct ReportPipeline {
    pacing_ms: u32,
    policy: Option<ReportingPolicy>,
    auto_sample_ms: u32,
    /// Last successfully reported reading (drives the policy delta check).
    last: Option<SensorReading>,
    last_sample_ms: Option<u32>,
}

impl ReportPipeline {
    pub fn new(config: &NodeConfig) -> Self {
        Self {
            pacing_ms: config.report_pacing_ms,
            policy: config.reporting,
            auto_sample_ms: config.auto_sample_ms,
            last: None,
            last_sample_ms: None,
        }
    }

    pub fn last_reported(&self) -> Option<&SensorReading> {
        self.last.as_ref()
    }

    /// Read, validate, cache, report, then show the result.
    pub fn report_now(
        &mut self,
        sensor: &mut impl SensorPort,
        endpoint: &mut impl EndpointPort,
        status: &mut impl StatusPort,
        platform: &mut impl PlatformPort,
        sink: &mut impl EventSink,
    ) -> Result<SensorReading, SensorError> {
        let reading = match self.sample(sensor, &*platform) {
            Ok(r) => r,
            Err(e) => {
                self.skip(e, status, sink);
                return Err(e);
            }
        };
        self.publish(reading, ReportTrigger::Manual, endpoint, status, platform, sink);
        Ok(reading)
    }

    /// Automatic path.  Samples at most every `auto_sample_ms` and reports
    /// when the policy says so.  Returns the reading if a report was sent.
    pub fn poll_policy(
        &mut self,
        sensor: &mut impl SensorPort,
        endpoint: &mut impl EndpointPort,
        status: &mut impl StatusPort,
        platform: &mut impl PlatformPort,
        sink: &mut impl EventSink,
    ) -> Option<SensorReading> {
        let policy = self.policy?;
        let now = platform.now_ms();

        if let Some(at) = self.last_sample_ms {
            if now.wrapping_sub(at) < self.auto_sample_ms {
                return None;
            }
        }
        self.last_sample_ms = Some(now);

        let reading = match self.sample(sensor, &*platform) {
            Ok(r) => r,
            Err(e) => {
                self.skip(e, status, sink);
                return None;
            }
        };

        let due = match self.last {
            // Nothing reported since boot: the first sample always goes out.
            None => true,
            Some(last) => policy.is_due(
                reading.timestamp_ms.wrapping_sub(last.timestamp_ms),
                reading.temperature,
                last.temperature,
            ),
        };
        if !due {
            return None;
        }

        self.publish(reading, ReportTrigger::Policy, endpoint, status, platform, sink);
        Some(reading)
    }

    // ── Internal ──────────────────────────────────────────────

    fn sample(
        &self,
        sensor: &mut impl SensorPort,
        platform: &impl PlatformPort,
    ) -> Result<SensorReading, SensorError> {
        let m = validate(sensor.read()?)?;
        Ok(SensorReading {
            temperature: m.temperature_c,
            relative_humidity: m.humidity_pct,
            timestamp_ms: platform.now_ms(),
        })
    }

    fn skip(&self, e: SensorError, status: &mut impl StatusPort, sink: &mut impl EventSink) {
        warn!("Report skipped: {}", e);
        let mut text: String<64> = String::new();
        let _ = write!(text, "Sensor read failed:\n{e}");
        status.show(&text);
        sink.emit(&NodeEvent::ReportSkipped(e));
    }

    fn publish(
        &mut self,
        reading: SensorReading,
        trigger: ReportTrigger,
        endpoint: &mut impl EndpointPort,
        status: &mut impl StatusPort,
        platform: &mut impl PlatformPort,
        sink: &mut impl EventSink,
    ) {
        endpoint.set_temperature(reading.temperature);
        endpoint.set_humidity(reading.relative_humidity);
        endpoint.report();
        self.last = Some(reading);

        info!(
            "Report ({:?}): {:.2}\u{00b0}C {:.2}%",
            trigger, reading.temperature, reading.relative_humidity
        );
        status.show(&format_reading(&reading));
        sink.emit(&NodeEvent::Reported { reading, trigger });

        if trigger == ReportTrigger::Manual {
            platform.delay_ms(self.pacing_ms);
        }
    }
}
