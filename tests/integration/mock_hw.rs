//! Mock collaborators for integration tests.
//!
//! Every mock appends to one shared [`Journal`] so tests can assert on the
//! full, ordered call history across sensor, network, status and platform.
//! Time only moves when the node asks the platform to delay, so every wait
//! in the core runs instantly and deterministically.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use chrono::{NaiveDate, NaiveDateTime};
use thnode::app::events::NodeEvent;
use thnode::app::ports::{
    DigitalInputPort, EndpointPort, EventSink, HeaterMode, Level, Measurement, NetworkStackPort,
    PlatformPort, Precision, SensorPort, StatusPort,
};
use thnode::app::service::{NodeService, Peripherals};
use thnode::config::{EndpointConfig, PowerSource};
use thnode::error::{InitError, SensorError};

// ── Call record ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    StatusInit,
    Show(String),
    SensorInit,
    SetPrecision(Precision),
    SetHeater(HeaterMode),
    SensorRead,
    ButtonInit,
    Register(u8),
    SetPowerSource(PowerSource),
    AddEndpoint,
    Begin,
    SetTemperature(f32),
    SetHumidity(f32),
    Report,
    FactoryReset,
    Delay(u32),
    Restart,
}

pub type Journal = Rc<RefCell<Vec<Call>>>;
pub type Clock = Rc<Cell<u32>>;

// ── Sensor ────────────────────────────────────────────────────

pub struct MockSensor {
    journal: Journal,
    pub present: bool,
    pub readings: VecDeque<Result<Measurement, SensorError>>,
    /// Returned once `readings` runs dry.
    pub steady: Result<Measurement, SensorError>,
}

impl SensorPort for MockSensor {
    fn init(&mut self) -> Result<(), InitError> {
        self.journal.borrow_mut().push(Call::SensorInit);
        if self.present {
            Ok(())
        } else {
            Err(InitError::SensorNotFound)
        }
    }

    fn set_precision(&mut self, precision: Precision) {
        self.journal.borrow_mut().push(Call::SetPrecision(precision));
    }

    fn set_heater(&mut self, mode: HeaterMode) {
        self.journal.borrow_mut().push(Call::SetHeater(mode));
    }

    fn read(&mut self) -> Result<Measurement, SensorError> {
        self.journal.borrow_mut().push(Call::SensorRead);
        self.readings.pop_front().unwrap_or(self.steady)
    }
}

// ── Network endpoint + stack ──────────────────────────────────

pub struct MockNet {
    journal: Journal,
    pub begin_ok: bool,
    /// `connected()` returns true from this poll on; `None` never connects.
    pub connect_after_polls: Option<u32>,
    pub polls: u32,
    pub utc: NaiveDateTime,
    pub timezone_offset: i32,
    /// Cached (temperature, humidity) as the stack would serve it.
    pub cache: (f32, f32),
    pub registered: Option<EndpointConfig>,
}

impl EndpointPort for MockNet {
    fn register(&mut self, config: &EndpointConfig) {
        self.journal.borrow_mut().push(Call::Register(config.endpoint));
        self.registered = Some(config.clone());
    }

    fn set_temperature(&mut self, celsius: f32) {
        self.journal.borrow_mut().push(Call::SetTemperature(celsius));
        self.cache.0 = celsius;
    }

    fn set_humidity(&mut self, percent: f32) {
        self.journal.borrow_mut().push(Call::SetHumidity(percent));
        self.cache.1 = percent;
    }

    fn report(&mut self) {
        self.journal.borrow_mut().push(Call::Report);
    }

    fn utc_time(&mut self) -> NaiveDateTime {
        self.utc
    }

    fn timezone_offset(&mut self) -> i32 {
        self.timezone_offset
    }

    fn set_power_source(&mut self, source: PowerSource) {
        self.journal.borrow_mut().push(Call::SetPowerSource(source));
    }
}

impl NetworkStackPort for MockNet {
    fn add_endpoint(&mut self) {
        self.journal.borrow_mut().push(Call::AddEndpoint);
    }

    fn begin(&mut self) -> bool {
        self.journal.borrow_mut().push(Call::Begin);
        self.begin_ok
    }

    fn connected(&mut self) -> bool {
        let joined = self
            .connect_after_polls
            .is_some_and(|after| self.polls >= after);
        self.polls += 1;
        joined
    }

    fn factory_reset(&mut self) {
        self.journal.borrow_mut().push(Call::FactoryReset);
    }
}

// ── Status output ─────────────────────────────────────────────

pub struct MockStatus {
    journal: Journal,
    pub present: bool,
}

impl StatusPort for MockStatus {
    fn init(&mut self) -> Result<(), InitError> {
        self.journal.borrow_mut().push(Call::StatusInit);
        if self.present {
            Ok(())
        } else {
            Err(InitError::DisplayNotFound)
        }
    }

    fn show(&mut self, text: &str) {
        self.journal.borrow_mut().push(Call::Show(text.to_owned()));
    }
}

// ── Button ────────────────────────────────────────────────────

/// Button driven by `[start, end)` press intervals on the shared clock, or
/// by an arbitrary level-over-time script (for contact bounce).
pub struct MockButton {
    journal: Journal,
    clock: Clock,
    pub presses: Vec<(u32, u32)>,
    pub raw_script: Option<Box<dyn Fn(u32) -> Level>>,
}

impl DigitalInputPort for MockButton {
    fn init(&mut self) -> Result<(), InitError> {
        self.journal.borrow_mut().push(Call::ButtonInit);
        Ok(())
    }

    fn read_level(&mut self) -> Level {
        let now = self.clock.get();
        if let Some(script) = &self.raw_script {
            return script(now);
        }
        if self
            .presses
            .iter()
            .any(|&(start, end)| (start..end).contains(&now))
        {
            Level::Low
        } else {
            Level::High
        }
    }
}

// ── Platform ──────────────────────────────────────────────────

pub struct MockPlatform {
    journal: Journal,
    clock: Clock,
}

impl PlatformPort for MockPlatform {
    fn now_ms(&self) -> u32 {
        self.clock.get()
    }

    fn delay_ms(&mut self, ms: u32) {
        self.journal.borrow_mut().push(Call::Delay(ms));
        self.clock.set(self.clock.get().wrapping_add(ms));
    }

    fn restart(&mut self) {
        self.journal.borrow_mut().push(Call::Restart);
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<NodeEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &NodeEvent) {
        self.events.push(event.clone());
    }
}

// ── Rig ───────────────────────────────────────────────────────

pub type MockPeripherals = Peripherals<MockSensor, MockNet, MockStatus, MockButton, MockPlatform>;

pub struct Rig {
    pub hw: MockPeripherals,
    pub sink: RecordingSink,
    pub journal: Journal,
    pub clock: Clock,
}

pub fn reading(temperature_c: f32, humidity_pct: f32) -> Measurement {
    Measurement {
        temperature_c,
        humidity_pct,
    }
}

pub fn datetime(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_hms_opt(h, mi, s)
        .unwrap()
}

#[allow(dead_code)]
impl Rig {
    /// Everything present, joins on the first poll, sensor reads 22.5 / 48.0.
    pub fn new() -> Self {
        let journal: Journal = Rc::default();
        let clock: Clock = Rc::new(Cell::new(0));
        let hw = Peripherals {
            sensor: MockSensor {
                journal: journal.clone(),
                present: true,
                readings: VecDeque::new(),
                steady: Ok(reading(22.5, 48.0)),
            },
            net: MockNet {
                journal: journal.clone(),
                begin_ok: true,
                connect_after_polls: Some(0),
                polls: 0,
                utc: datetime(2024, 12, 31, 23, 50, 0),
                timezone_offset: 900,
                cache: (0.0, 0.0),
                registered: None,
            },
            status: MockStatus {
                journal: journal.clone(),
                present: true,
            },
            button: MockButton {
                journal: journal.clone(),
                clock: clock.clone(),
                presses: Vec::new(),
                raw_script: None,
            },
            platform: MockPlatform {
                journal: journal.clone(),
                clock: clock.clone(),
            },
        };
        Self {
            hw,
            sink: RecordingSink::default(),
            journal,
            clock,
        }
    }

    pub fn now(&self) -> u32 {
        self.clock.get()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.journal.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.journal.borrow_mut().clear();
    }

    pub fn count(&self, call: &Call) -> usize {
        self.journal.borrow().iter().filter(|c| *c == call).count()
    }

    pub fn shown(&self) -> Vec<String> {
        self.journal
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Show(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    /// Drive the steady-state loop the way the firmware does until the
    /// clock reaches `until_ms`.
    pub fn run_until(&mut self, node: &mut NodeService, until_ms: u32) {
        while self.clock.get() < until_ms {
            node.tick(&mut self.hw, &mut self.sink);
            let wait = node.next_delay_ms();
            self.hw.platform.delay_ms(wait);
        }
    }
}
