//! Sensor drivers.
//!
//! Drivers are bus-generic and know nothing about the node core; the
//! hardware adapter wraps them in [`SensorPort`](crate::app::ports::SensorPort).

pub mod sht4x;
