//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured node events to the
//! logger (UART / USB-CDC on the device).

use log::{error, info, warn};

use crate::app::events::NodeEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`NodeEvent`] as one line.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &NodeEvent) {
        match event {
            NodeEvent::StateChanged { from, to } => {
                info!("STATE | {} -> {}", from.name(), to.name());
            }
            NodeEvent::Reported { reading, trigger } => {
                info!(
                    "REPORT | trigger={:?} | T={:.2}\u{00b0}C | RH={:.2}% | t={}ms",
                    trigger, reading.temperature, reading.relative_humidity, reading.timestamp_ms,
                );
            }
            NodeEvent::ReportSkipped(e) => {
                warn!("REPORT | skipped: {}", e);
            }
            NodeEvent::TimeSynced(t) => {
                info!(
                    "TIME | utc={} | offset={}s | local={}",
                    t.utc, t.timezone_offset, t.local
                );
            }
            NodeEvent::FactoryReset => {
                warn!("RESET | credentials erased, restarting");
            }
            NodeEvent::Fatal(e) => {
                error!("FATAL | {}", e);
            }
        }
    }
}
