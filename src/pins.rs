//! GPIO / bus assignments for the ESP32-C6 sensor node.
//!
//! Single source of truth: every adapter references this module rather than
//! hard-coding pin numbers or bus addresses.

// ---------------------------------------------------------------------------
// I²C bus (shared by the display and the sensor)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 6;
pub const I2C_SCL_GPIO: i32 = 7;
/// Bus clock (standard mode).
pub const I2C_FREQ_HZ: u32 = 100_000;

/// SH1106 128×64 OLED.
pub const DISPLAY_I2C_ADDR: u8 = 0x3C;
/// SHT40 temperature/humidity sensor.
pub const SENSOR_I2C_ADDR: u8 = 0x44;

// ---------------------------------------------------------------------------
// User button (active-low, internal pull-up)
// ---------------------------------------------------------------------------

/// Momentary push-button: short press reports, long press factory-resets.
pub const BUTTON_GPIO: i32 = 4;
