//! Sensirion SHT4x temperature / relative-humidity sensor.
//!
//! Command-based I2C device: write a one-byte command, wait for the
//! conversion, read back two big-endian words each followed by a CRC-8
//! (poly 0x31, init 0xFF).
//!
//! Generic over `embedded-hal` 1.0 [`I2c`] and [`DelayNs`] so the same
//! driver runs on the shared ESP-IDF bus and against a fake bus in tests.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{debug, info};

use crate::app::ports::{HeaterMode, Measurement, Precision};
use crate::error::SensorError;

const CMD_MEASURE_HIGH: u8 = 0xFD;
const CMD_MEASURE_MEDIUM: u8 = 0xF6;
const CMD_MEASURE_LOW: u8 = 0xE0;
const CMD_HEATER_20MW_100MS: u8 = 0x15;
const CMD_HEATER_200MW_1S: u8 = 0x39;
const CMD_SERIAL_NUMBER: u8 = 0x89;
const CMD_SOFT_RESET: u8 = 0x94;

const CRC_POLY: u8 = 0x31;
const CRC_INIT: u8 = 0xFF;

/// Conversion times rounded up from the datasheet maxima (ms).
const DURATION_HIGH_MS: u32 = 10;
const DURATION_MEDIUM_MS: u32 = 5;
const DURATION_LOW_MS: u32 = 2;
const DURATION_HEATER_SHORT_MS: u32 = 110;
const DURATION_HEATER_LONG_MS: u32 = 1100;
const RESET_MS: u32 = 1;

pub struct Sht4x<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
    precision: Precision,
    heater: HeaterMode,
}

impl<I2C: I2c, D: DelayNs> Sht4x<I2C, D> {
    pub fn new(i2c: I2C, delay: D, address: u8) -> Self {
        Self {
            i2c,
            delay,
            address,
            precision: Precision::High,
            heater: HeaterMode::Off,
        }
    }

    /// Soft-reset the device and read its serial number.  Any bus or CRC
    /// failure means the sensor is not usable.
    pub fn probe(&mut self) -> Result<u32, SensorError> {
        self.write_cmd(CMD_SOFT_RESET)?;
        self.delay.delay_ms(RESET_MS);

        self.write_cmd(CMD_SERIAL_NUMBER)?;
        self.delay.delay_ms(RESET_MS);
        let [hi, lo] = self.read_words()?;
        let serial = (u32::from(hi) << 16) | u32::from(lo);
        info!("SHT4x at 0x{:02X}, serial {:08X}", self.address, serial);
        Ok(serial)
    }

    pub fn set_precision(&mut self, precision: Precision) {
        self.precision = precision;
    }

    /// Heater pulses run as part of the next measurement.  `Off` restores
    /// plain measurements at the configured precision.
    pub fn set_heater(&mut self, mode: HeaterMode) {
        self.heater = mode;
    }

    /// Trigger one measurement and convert it.
    pub fn measure(&mut self) -> Result<Measurement, SensorError> {
        let (cmd, wait_ms) = self.command();
        self.write_cmd(cmd)?;
        self.delay.delay_ms(wait_ms);
        let [raw_t, raw_rh] = self.read_words()?;
        let m = convert(raw_t, raw_rh);
        debug!(
            "SHT4x raw t=0x{:04X} rh=0x{:04X} -> {:.2}C {:.2}%",
            raw_t, raw_rh, m.temperature_c, m.humidity_pct
        );
        Ok(m)
    }

    /// Hand the bus and delay back.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    fn command(&self) -> (u8, u32) {
        match (self.heater, self.precision) {
            (HeaterMode::Low, _) => (CMD_HEATER_20MW_100MS, DURATION_HEATER_SHORT_MS),
            (HeaterMode::High, _) => (CMD_HEATER_200MW_1S, DURATION_HEATER_LONG_MS),
            (HeaterMode::Off, Precision::High) => (CMD_MEASURE_HIGH, DURATION_HIGH_MS),
            (HeaterMode::Off, Precision::Medium) => (CMD_MEASURE_MEDIUM, DURATION_MEDIUM_MS),
            (HeaterMode::Off, Precision::Low) => (CMD_MEASURE_LOW, DURATION_LOW_MS),
        }
    }

    fn write_cmd(&mut self, cmd: u8) -> Result<(), SensorError> {
        self.i2c
            .write(self.address, &[cmd])
            .map_err(|_| SensorError::Bus)
    }

    fn read_words(&mut self) -> Result<[u16; 2], SensorError> {
        let mut buf = [0u8; 6];
        self.i2c
            .read(self.address, &mut buf)
            .map_err(|_| SensorError::Bus)?;
        let mut words = [0u16; 2];
        for (word, chunk) in words.iter_mut().zip(buf.chunks_exact(3)) {
            if crc8(&chunk[..2]) != chunk[2] {
                return Err(SensorError::Crc);
            }
            *word = u16::from_be_bytes([chunk[0], chunk[1]]);
        }
        Ok(words)
    }
}

/// CRC-8 as used by Sensirion: poly 0x31, init 0xFF, no reflection.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = CRC_INIT;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ CRC_POLY
            } else {
                crc << 1
            };
        }
    }
    crc
}

/// Datasheet transfer functions.  Humidity is clipped to 0..100 %.
pub fn convert(raw_t: u16, raw_rh: u16) -> Measurement {
    let t = -45.0 + 175.0 * f32::from(raw_t) / 65535.0;
    let rh = -6.0 + 125.0 * f32::from(raw_rh) / 65535.0;
    Measurement {
        temperature_c: t,
        humidity_pct: rh.clamp(0.0, 100.0),
    }
}
