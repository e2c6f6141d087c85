//! Peripheral drivers and input classification.

pub mod button;
pub mod sh1106;
