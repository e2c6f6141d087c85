//! Hardware adapter: bridges the SHT4x driver to [`SensorPort`].
//!
//! Bus-generic, so on the device it runs over the shared I2C handle and on
//! the host over any `embedded-hal` fake.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{info, warn};

use crate::app::ports::{HeaterMode, Measurement, Precision, SensorPort};
use crate::error::{InitError, SensorError};
use crate::sensors::sht4x::Sht4x;

pub struct Sht4xSensor<I2C, D> {
    driver: Sht4x<I2C, D>,
}

impl<I2C: I2c, D: DelayNs> Sht4xSensor<I2C, D> {
    pub fn new(i2c: I2C, delay: D, address: u8) -> Self {
        Self {
            driver: Sht4x::new(i2c, delay, address),
        }
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<I2C: I2c, D: DelayNs> SensorPort for Sht4xSensor<I2C, D> {
    fn init(&mut self) -> Result<(), InitError> {
        self.driver.probe().map(|_| ()).map_err(|e| {
            warn!("SHT4x probe failed: {}", e);
            InitError::SensorNotFound
        })
    }

    fn set_precision(&mut self, precision: Precision) {
        info!("SHT4x precision: {:?}", precision);
        self.driver.set_precision(precision);
    }

    fn set_heater(&mut self, mode: HeaterMode) {
        info!("SHT4x heater: {:?}", mode);
        self.driver.set_heater(mode);
    }

    fn read(&mut self) -> Result<Measurement, SensorError> {
        self.driver.measure()
    }
}
