//! Zigbee end-device adapter.
//!
//! Implements [`EndpointPort`] and [`NetworkStackPort`] for the
//! temperature/humidity endpoint.  Values are encoded the way the ZCL
//! clusters store them and kept in an [`AttributeCache`] mirroring what
//! the stack will serve on an unsolicited read.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: calls into the `zb_shim_*` C functions
//!   linked from the ESP-IDF project, which wrap the Zigbee stack.
//! - **all other targets**: an in-memory simulation for host-side tests.
//!
//! ## ZCL encodings
//!
//! | Attribute                    | Unit                          |
//! |------------------------------|-------------------------------|
//! | MeasuredValue (0x0402)       | int16, 0.01 °C                |
//! | MeasuredValue (0x0405)       | uint16, 0.01 %RH              |
//! | BatteryPercentageRemaining   | uint8, 0.5 %                  |
//! | BatteryVoltage               | uint8, 100 mV                 |
//! | Time (0x000A)                | uint32, s since 2000-01-01    |

use chrono::{DateTime, NaiveDateTime};
use log::{info, warn};

use crate::app::ports::{EndpointPort, NetworkStackPort};
use crate::config::{EndpointConfig, MeasuredRange, PowerSource};

/// Seconds between the Unix epoch and the ZCL epoch (2000-01-01T00:00:00Z).
pub const ZCL_EPOCH_UNIX_SECS: i64 = 946_684_800;

/// Basic cluster PowerSource values.
const POWER_SOURCE_MAINS: u8 = 0x01;
const POWER_SOURCE_BATTERY: u8 = 0x03;

// ───────────────────────────────────────────────────────────────
// Encoding
// ───────────────────────────────────────────────────────────────

/// °C to ZCL centi-degrees, clamped to the advertised range.
pub fn encode_temperature(celsius: f32, range: &MeasuredRange) -> i16 {
    let c = if celsius.is_nan() {
        range.min
    } else {
        celsius.clamp(range.min, range.max)
    };
    (c * 100.0).round() as i16
}

/// %RH to ZCL centi-percent, clamped to the advertised range.
pub fn encode_humidity(percent: f32, range: &MeasuredRange) -> u16 {
    let p = if percent.is_nan() {
        range.min
    } else {
        percent.clamp(range.min, range.max)
    };
    (p.max(0.0) * 100.0).round() as u16
}

/// Tolerance attributes share the measured value's unit.
pub fn encode_tolerance(tolerance: f32) -> u16 {
    (tolerance.max(0.0) * 100.0).round() as u16
}

/// `(PowerSource, BatteryPercentageRemaining, BatteryVoltage)`.
pub fn encode_power_source(source: PowerSource) -> (u8, u8, u8) {
    match source {
        PowerSource::Mains => (POWER_SOURCE_MAINS, 0, 0),
        PowerSource::Battery { percent, decivolts } => {
            (POWER_SOURCE_BATTERY, percent.min(100) * 2, decivolts)
        }
    }
}

/// ZCL UTCTime to calendar time.
pub fn decode_utc(zcl_secs: u32) -> NaiveDateTime {
    DateTime::from_timestamp(ZCL_EPOCH_UNIX_SECS + i64::from(zcl_secs), 0)
        .map(|dt| dt.naive_utc())
        .unwrap_or_default()
}

// ───────────────────────────────────────────────────────────────
// Attribute cache
// ───────────────────────────────────────────────────────────────

/// Encoded attribute values as last handed to the stack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttributeCache {
    pub temperature: i16,
    pub humidity: u16,
    pub power_source: u8,
    pub battery_half_percent: u8,
    pub battery_decivolts: u8,
}

// ───────────────────────────────────────────────────────────────
// Simulation
// ───────────────────────────────────────────────────────────────

/// Scripted network behaviour for host runs.
#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Clone)]
pub struct SimNetwork {
    pub begin_ok: bool,
    /// `connected()` turns true on this poll (0 = immediately).
    pub connect_after_polls: u32,
    /// Coordinator time, ZCL seconds.
    pub utc_zcl_secs: u32,
    pub timezone_offset: i32,
}

#[cfg(not(target_os = "espidf"))]
impl Default for SimNetwork {
    fn default() -> Self {
        Self {
            begin_ok: true,
            connect_after_polls: 0,
            utc_zcl_secs: 0,
            timezone_offset: 0,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Adapter
// ───────────────────────────────────────────────────────────────

pub struct ZigbeeEndpoint {
    endpoint: u8,
    temperature_range: MeasuredRange,
    humidity_range: MeasuredRange,
    cache: AttributeCache,
    reports_requested: u32,
    #[cfg(not(target_os = "espidf"))]
    sim: SimNetwork,
    #[cfg(not(target_os = "espidf"))]
    polls: u32,
    #[cfg(not(target_os = "espidf"))]
    joined: bool,
}

impl ZigbeeEndpoint {
    #[cfg(target_os = "espidf")]
    pub fn new() -> Self {
        let defaults = EndpointConfig::default();
        Self {
            endpoint: defaults.endpoint,
            temperature_range: defaults.temperature,
            humidity_range: defaults.humidity,
            cache: AttributeCache::default(),
            reports_requested: 0,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new(sim: SimNetwork) -> Self {
        let defaults = EndpointConfig::default();
        Self {
            endpoint: defaults.endpoint,
            temperature_range: defaults.temperature,
            humidity_range: defaults.humidity,
            cache: AttributeCache::default(),
            reports_requested: 0,
            sim,
            polls: 0,
            joined: false,
        }
    }

    pub fn cache(&self) -> &AttributeCache {
        &self.cache
    }

    pub fn reports_requested(&self) -> u32 {
        self.reports_requested
    }
}

impl EndpointPort for ZigbeeEndpoint {
    fn register(&mut self, config: &EndpointConfig) {
        self.endpoint = config.endpoint;
        self.temperature_range = config.temperature;
        self.humidity_range = config.humidity;
        info!(
            "Zigbee endpoint {}: {} / {}",
            config.endpoint, config.manufacturer, config.model
        );
        self.platform_register(config);
    }

    fn set_temperature(&mut self, celsius: f32) {
        self.cache.temperature = encode_temperature(celsius, &self.temperature_range);
        self.platform_set_temperature(self.cache.temperature);
    }

    fn set_humidity(&mut self, percent: f32) {
        self.cache.humidity = encode_humidity(percent, &self.humidity_range);
        self.platform_set_humidity(self.cache.humidity);
    }

    fn report(&mut self) {
        self.reports_requested += 1;
        self.platform_report();
    }

    fn utc_time(&mut self) -> NaiveDateTime {
        decode_utc(self.platform_utc())
    }

    fn timezone_offset(&mut self) -> i32 {
        self.platform_timezone()
    }

    fn set_power_source(&mut self, source: PowerSource) {
        let (kind, half_percent, decivolts) = encode_power_source(source);
        self.cache.power_source = kind;
        self.cache.battery_half_percent = half_percent;
        self.cache.battery_decivolts = decivolts;
        self.platform_set_power_source(kind, half_percent, decivolts);
    }
}

impl NetworkStackPort for ZigbeeEndpoint {
    fn add_endpoint(&mut self) {
        info!("Zigbee: adding endpoint {}", self.endpoint);
        self.platform_add_endpoint();
    }

    fn begin(&mut self) -> bool {
        let ok = self.platform_begin();
        if !ok {
            warn!("Zigbee: stack start failed");
        }
        ok
    }

    fn connected(&mut self) -> bool {
        self.platform_connected()
    }

    fn factory_reset(&mut self) {
        warn!("Zigbee: erasing network credentials");
        self.platform_factory_reset();
    }
}

// ── ESP-IDF backend ───────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod ffi {
    unsafe extern "C" {
        pub fn zb_shim_register_endpoint(
            endpoint: u8,
            manufacturer: *const u8,
            manufacturer_len: u8,
            model: *const u8,
            model_len: u8,
            temp_min: i16,
            temp_max: i16,
            temp_tolerance: u16,
            humidity_min: u16,
            humidity_max: u16,
            humidity_tolerance: u16,
            time_cluster: bool,
        );
        pub fn zb_shim_set_power_source(source: u8, battery_half_percent: u8, battery_decivolts: u8);
        pub fn zb_shim_add_endpoint();
        pub fn zb_shim_begin() -> bool;
        pub fn zb_shim_connected() -> bool;
        pub fn zb_shim_set_temperature(centi_celsius: i16);
        pub fn zb_shim_set_humidity(centi_percent: u16);
        pub fn zb_shim_report();
        pub fn zb_shim_get_utc() -> u32;
        pub fn zb_shim_get_timezone() -> i32;
        pub fn zb_shim_factory_reset();
    }
}

#[cfg(target_os = "espidf")]
impl ZigbeeEndpoint {
    fn platform_register(&mut self, config: &EndpointConfig) {
        let t = &config.temperature;
        let h = &config.humidity;
        // SAFETY: pointers and lengths come from live heapless strings of at
        // most 32 bytes; the shim copies them before returning.
        unsafe {
            ffi::zb_shim_register_endpoint(
                config.endpoint,
                config.manufacturer.as_ptr(),
                config.manufacturer.len() as u8,
                config.model.as_ptr(),
                config.model.len() as u8,
                encode_temperature(t.min, t),
                encode_temperature(t.max, t),
                encode_tolerance(t.tolerance),
                encode_humidity(h.min, h),
                encode_humidity(h.max, h),
                encode_tolerance(h.tolerance),
                config.time_cluster,
            );
        }
    }

    fn platform_set_temperature(&mut self, value: i16) {
        unsafe { ffi::zb_shim_set_temperature(value) }
    }

    fn platform_set_humidity(&mut self, value: u16) {
        unsafe { ffi::zb_shim_set_humidity(value) }
    }

    fn platform_report(&mut self) {
        unsafe { ffi::zb_shim_report() }
    }

    fn platform_utc(&mut self) -> u32 {
        unsafe { ffi::zb_shim_get_utc() }
    }

    fn platform_timezone(&mut self) -> i32 {
        unsafe { ffi::zb_shim_get_timezone() }
    }

    fn platform_set_power_source(&mut self, kind: u8, half_percent: u8, decivolts: u8) {
        unsafe { ffi::zb_shim_set_power_source(kind, half_percent, decivolts) }
    }

    fn platform_add_endpoint(&mut self) {
        unsafe { ffi::zb_shim_add_endpoint() }
    }

    fn platform_begin(&mut self) -> bool {
        unsafe { ffi::zb_shim_begin() }
    }

    fn platform_connected(&mut self) -> bool {
        unsafe { ffi::zb_shim_connected() }
    }

    fn platform_factory_reset(&mut self) {
        unsafe { ffi::zb_shim_factory_reset() }
    }
}

// ── Simulation backend ────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
impl ZigbeeEndpoint {
    fn platform_register(&mut self, _config: &EndpointConfig) {}

    fn platform_set_temperature(&mut self, _value: i16) {}

    fn platform_set_humidity(&mut self, _value: u16) {}

    fn platform_report(&mut self) {
        info!(
            "Zigbee (sim): report T={} RH={}",
            self.cache.temperature, self.cache.humidity
        );
    }

    fn platform_utc(&mut self) -> u32 {
        self.sim.utc_zcl_secs
    }

    fn platform_timezone(&mut self) -> i32 {
        self.sim.timezone_offset
    }

    fn platform_set_power_source(&mut self, _kind: u8, _half_percent: u8, _decivolts: u8) {}

    fn platform_add_endpoint(&mut self) {}

    fn platform_begin(&mut self) -> bool {
        self.sim.begin_ok
    }

    fn platform_connected(&mut self) -> bool {
        if !self.joined && self.polls >= self.sim.connect_after_polls {
            self.joined = true;
        }
        self.polls = self.polls.saturating_add(1);
        self.joined
    }

    fn platform_factory_reset(&mut self) {
        self.joined = false;
        self.polls = 0;
    }
}
