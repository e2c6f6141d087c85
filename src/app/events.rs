//! Outbound node events.
//!
//! The [`NodeService`](super::service::NodeService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other side
//! decide what to do with them (log to serial, record them in tests).

use crate::error::{Error, SensorError};
use crate::fsm::NodeState;

use super::clock::LocalTimeInfo;
use super::report::{ReportTrigger, SensorReading};

/// Structured events emitted by the node core.
#[derive(Debug, Clone)]
pub enum NodeEvent {
    /// The lifecycle moved forward.
    StateChanged { from: NodeState, to: NodeState },

    /// A reading was pushed to the endpoint and a report requested.
    Reported {
        reading: SensorReading,
        trigger: ReportTrigger,
    },

    /// A report cycle was skipped because the sensor read failed.
    ReportSkipped(SensorError),

    /// Local time derived from the coordinator.
    TimeSynced(LocalTimeInfo),

    /// Credentials erased; a restart follows.
    FactoryReset,

    /// Boot could not complete.
    Fatal(Error),
}
