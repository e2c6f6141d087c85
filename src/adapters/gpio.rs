//! Button input adapter over an `embedded-hal` [`InputPin`].
//!
//! The pin is expected to be configured with its pull-up by the caller
//! (active-low button).  A read error is treated as "released" so a
//! flaky pin can never fake a long press.

use embedded_hal::digital::InputPin;
use log::warn;

use crate::app::ports::{DigitalInputPort, Level};
use crate::error::InitError;

pub struct GpioButton<P> {
    pin: P,
}

impl<P: InputPin> GpioButton<P> {
    pub fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P: InputPin> DigitalInputPort for GpioButton<P> {
    fn init(&mut self) -> Result<(), InitError> {
        self.pin.is_high().map(|_| ()).map_err(|e| {
            warn!("Button pin unreadable: {:?}", e);
            InitError::InputUnavailable
        })
    }

    fn read_level(&mut self) -> Level {
        match self.pin.is_low() {
            Ok(true) => Level::Low,
            Ok(false) => Level::High,
            Err(e) => {
                warn!("Button read failed: {:?}", e);
                Level::High
            }
        }
    }
}
