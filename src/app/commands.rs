//! Inbound commands to the node service.
//!
//! Button gestures are translated into these before dispatch, so the
//! reporting and reset paths can also be driven from other triggers.

use crate::drivers::button::ButtonEvent;

/// Commands that the steady-state loop can execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeCommand {
    /// Read the sensor and report immediately.
    ReportNow,

    /// Erase network credentials and restart.
    FactoryReset,
}

impl NodeCommand {
    /// Map a classified button gesture to the command it triggers.
    pub fn from_button(event: ButtonEvent) -> Option<Self> {
        match event {
            ButtonEvent::None => None,
            ButtonEvent::ShortPress => Some(Self::ReportNow),
            ButtonEvent::LongPress { .. } => Some(Self::FactoryReset),
        }
    }
}
