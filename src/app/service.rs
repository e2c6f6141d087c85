//! Node lifecycle controller: the hexagonal core.
//!
//! [`NodeService`] owns the lifecycle state, the endpoint description, the
//! press detector and the reporting pipeline.  Every collaborator is reached
//! through the port traits bundled in [`Peripherals`], so the whole boot and
//! steady-state sequence runs against mocks on the host.
//!
//! ```text
//!  SensorPort ─────▶ ┌──────────────────────────┐ ──▶ EventSink
//!  DigitalInput ───▶ │       NodeService         │
//!  EndpointPort ◀──▶ │ Lifecycle · Detector ·    │ ──▶ StatusPort
//!  NetworkStack ◀──▶ │ ReportPipeline · Clock    │ ──▶ PlatformPort
//!                    └──────────────────────────┘
//! ```

use core::fmt::Write as _;

use heapless::String;
use log::{error, info, warn};

use crate::config::{EndpointConfig, NodeConfig};
use crate::drivers::button::{ButtonEvent, PressDetector};
use crate::error::{InitError, JoinError, SensorError};
use crate::fsm::{Lifecycle, NodeState};

use super::clock::{self, LocalTimeInfo};
use super::commands::NodeCommand;
use super::events::NodeEvent;
use super::ports::{
    DigitalInputPort, EndpointPort, EventSink, HeaterMode, NetworkStackPort, PlatformPort,
    Precision, SensorPort, StatusPort,
};
use super::report::{ReportPipeline, SensorReading};

// ───────────────────────────────────────────────────────────────
// Peripherals
// ───────────────────────────────────────────────────────────────

/// Every collaborator the node talks to, constructed once at boot and
/// handed to the service by reference.  `net` is both the endpoint and the
/// stack it lives on.
pub struct Peripherals<S, N, O, B, P> {
    pub sensor: S,
    pub net: N,
    pub status: O,
    pub button: B,
    pub platform: P,
}

/// How boot ended.  The caller decides what a halt looks like on its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootOutcome {
    /// Joined, time synced, steady-state loop may start.
    Ready,
    /// A required peripheral is missing.  The failure is already on the
    /// status output; the node must not continue.
    Halted(InitError),
    /// The network could not be brought up.  A restart has been requested.
    Restarting(JoinError),
}

// ───────────────────────────────────────────────────────────────
// NodeService
// ───────────────────────────────────────────────────────────────

pub struct NodeService {
    config: NodeConfig,
    endpoint: EndpointConfig,
    lifecycle: Lifecycle,
    detector: PressDetector,
    reporter: ReportPipeline,
    local_time: Option<LocalTimeInfo>,
}

impl NodeService {
    pub fn new(config: NodeConfig, endpoint: EndpointConfig) -> Self {
        let detector = PressDetector::new(&config);
        let reporter = ReportPipeline::new(&config);
        Self {
            config,
            endpoint,
            lifecycle: Lifecycle::new(),
            detector,
            reporter,
            local_time: None,
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> NodeState {
        self.lifecycle.current()
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn endpoint(&self) -> &EndpointConfig {
        &self.endpoint
    }

    /// Local time derived at boot, once the node has synced.
    pub fn local_time(&self) -> Option<&LocalTimeInfo> {
        self.local_time.as_ref()
    }

    pub fn last_reported(&self) -> Option<&SensorReading> {
        self.reporter.last_reported()
    }

    /// How long the caller should wait before the next [`tick`](Self::tick).
    pub fn next_delay_ms(&self) -> u32 {
        self.detector.next_poll_ms()
    }

    // ── Boot ──────────────────────────────────────────────────

    /// Run the full boot sequence: peripherals, join, time sync.
    pub fn boot<S, N, O, B, P>(
        &mut self,
        hw: &mut Peripherals<S, N, O, B, P>,
        sink: &mut impl EventSink,
    ) -> BootOutcome
    where
        S: SensorPort,
        N: EndpointPort + NetworkStackPort,
        O: StatusPort,
        B: DigitalInputPort,
        P: PlatformPort,
    {
        info!("Booting");

        if let Err(e) = Self::init_peripherals(hw) {
            error!("Boot halted: {}", e);
            sink.emit(&NodeEvent::Fatal(e.into()));
            return BootOutcome::Halted(e);
        }

        self.advance(sink);
        if let Err(e) = self.join(hw) {
            error!("Join failed: {}", e);
            sink.emit(&NodeEvent::Fatal(e.into()));
            hw.platform.delay_ms(self.config.restart_delay_ms);
            hw.platform.restart();
            return BootOutcome::Restarting(e);
        }

        self.advance(sink);
        let info = clock::sync_once(&mut hw.net);
        let mut text: String<128> = String::new();
        let _ = write!(text, "Local time:\n{}", info.formatted());
        hw.status.show(&text);
        sink.emit(&NodeEvent::TimeSynced(info));
        self.local_time = Some(info);

        self.advance(sink);
        BootOutcome::Ready
    }

    /// Status output first so every later failure can be shown.
    fn init_peripherals<S, N, O, B, P>(
        hw: &mut Peripherals<S, N, O, B, P>,
    ) -> Result<(), InitError>
    where
        S: SensorPort,
        O: StatusPort,
        B: DigitalInputPort,
    {
        if let Err(e) = hw.status.init() {
            // The console mirror still works without the panel.
            hw.status.show("SH1106 display not found");
            return Err(e);
        }

        if let Err(e) = hw.sensor.init() {
            hw.status.show("SHT4x sensor not found");
            return Err(e);
        }
        hw.sensor.set_precision(Precision::Low);
        hw.sensor.set_heater(HeaterMode::Off);

        if let Err(e) = hw.button.init() {
            hw.status.show("Button input unavailable");
            return Err(e);
        }
        Ok(())
    }

    /// Register the endpoint, start the stack and wait for a connection.
    fn join<S, N, O, B, P>(&self, hw: &mut Peripherals<S, N, O, B, P>) -> Result<(), JoinError>
    where
        N: EndpointPort + NetworkStackPort,
        O: StatusPort,
        P: PlatformPort,
    {
        hw.net.register(&self.endpoint);
        hw.net.set_power_source(self.endpoint.power);
        hw.net.add_endpoint();

        hw.status.show("Starting Zigbee...");
        if !hw.net.begin() {
            hw.status.show("Zigbee failed!\nRebooting...");
            return Err(JoinError::StartFailed);
        }
        hw.status.show("Zigbee started successfully!");

        hw.status.show("Connecting to network");
        let started = hw.platform.now_ms();
        while !hw.net.connected() {
            if let Some(limit) = self.config.join_timeout_ms {
                let waited_ms = hw.platform.now_ms().wrapping_sub(started);
                if waited_ms >= limit {
                    hw.status.show("Zigbee join timed out!\nRebooting...");
                    return Err(JoinError::Timeout { waited_ms });
                }
            }
            hw.platform.delay_ms(self.config.join_poll_ms);
        }

        hw.status.show("Connected!");
        info!(
            "Joined after {} ms",
            hw.platform.now_ms().wrapping_sub(started)
        );
        hw.platform.delay_ms(self.config.connect_settle_ms);
        Ok(())
    }

    // ── Steady state ──────────────────────────────────────────

    /// One pass of the steady-state loop: sample the button, dispatch the
    /// gesture, and give the reporting policy a chance when idle.
    pub fn tick<S, N, O, B, P>(
        &mut self,
        hw: &mut Peripherals<S, N, O, B, P>,
        sink: &mut impl EventSink,
    ) -> ButtonEvent
    where
        S: SensorPort,
        N: EndpointPort + NetworkStackPort,
        O: StatusPort,
        B: DigitalInputPort,
        P: PlatformPort,
    {
        if self.state() != NodeState::Ready {
            warn!("tick() ignored in {}", self.state().name());
            return ButtonEvent::None;
        }

        let level = hw.button.read_level();
        let event = self.detector.poll(level, hw.platform.now_ms());

        if let Some(cmd) = NodeCommand::from_button(event) {
            self.handle_command(cmd, hw, sink);
        } else if !self.detector.is_timing_press() {
            self.reporter.poll_policy(
                &mut hw.sensor,
                &mut hw.net,
                &mut hw.status,
                &mut hw.platform,
                sink,
            );
        }
        event
    }

    pub fn handle_command<S, N, O, B, P>(
        &mut self,
        cmd: NodeCommand,
        hw: &mut Peripherals<S, N, O, B, P>,
        sink: &mut impl EventSink,
    ) where
        S: SensorPort,
        N: EndpointPort + NetworkStackPort,
        O: StatusPort,
        P: PlatformPort,
    {
        info!("Command: {:?}", cmd);
        match cmd {
            NodeCommand::ReportNow => {
                let _ = self.report_now(hw, sink);
            }
            NodeCommand::FactoryReset => self.factory_reset(hw, sink),
        }
    }

    /// Manual report.  A sensor failure is already on the status output
    /// when this returns `Err`.
    pub fn report_now<S, N, O, B, P>(
        &mut self,
        hw: &mut Peripherals<S, N, O, B, P>,
        sink: &mut impl EventSink,
    ) -> Result<SensorReading, SensorError>
    where
        S: SensorPort,
        N: EndpointPort,
        O: StatusPort,
        P: PlatformPort,
    {
        self.reporter.report_now(
            &mut hw.sensor,
            &mut hw.net,
            &mut hw.status,
            &mut hw.platform,
            sink,
        )
    }

    /// Erase network credentials and restart.  No abort once started.
    pub fn factory_reset<S, N, O, B, P>(
        &mut self,
        hw: &mut Peripherals<S, N, O, B, P>,
        sink: &mut impl EventSink,
    ) where
        N: NetworkStackPort,
        O: StatusPort,
        P: PlatformPort,
    {
        warn!("Factory reset requested");
        hw.status.show("Factory Reset...");
        hw.platform.delay_ms(self.config.factory_reset_delay_ms);
        hw.net.factory_reset();
        sink.emit(&NodeEvent::FactoryReset);
        hw.platform.restart();
    }

    // ── Internal ──────────────────────────────────────────────

    fn advance(&mut self, sink: &mut impl EventSink) {
        if let Some((from, to)) = self.lifecycle.advance() {
            sink.emit(&NodeEvent::StateChanged { from, to });
        }
    }
}
