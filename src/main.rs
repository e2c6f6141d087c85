//! THNode Firmware: Main Entry Point
//!
//! Zigbee temperature/humidity end device on an ESP32-C6.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  Sht4xSensor     DisplayStatus   GpioButton     EspPlatform    │
//! │  (SensorPort)    (StatusPort)    (DigitalInput) (Platform)     │
//! │  ZigbeeEndpoint                  LogEventSink   NvsConfigStore │
//! │  (Endpoint + NetworkStack)       (EventSink)    (NodeConfig)   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            NodeService (pure logic)                    │    │
//! │  │  Lifecycle · PressDetector · ReportPipeline · Clock    │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::Mutex;

use anyhow::{Result, anyhow};
use esp_idf_hal::delay::{Delay, FreeRtos};
use esp_idf_hal::gpio::{PinDriver, Pull};
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use embedded_hal_bus::i2c::MutexDevice;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::{error, info, warn};

use thnode::adapters::gpio::GpioButton;
use thnode::adapters::hardware::Sht4xSensor;
use thnode::adapters::log_sink::LogEventSink;
use thnode::adapters::nvs::NvsConfigStore;
use thnode::adapters::platform::EspPlatform;
use thnode::adapters::status::DisplayStatus;
use thnode::adapters::zigbee::ZigbeeEndpoint;
use thnode::app::ports::PlatformPort;
use thnode::app::service::{BootOutcome, NodeService, Peripherals as NodePeripherals};
use thnode::config::{EndpointConfig, NodeConfig};
use thnode::error::Error;
use thnode::pins;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  THNode v{}                          ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let peripherals = Peripherals::take()?;

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let config = match NvsConfigStore::new(EspDefaultNvsPartition::take()?) {
        Ok(store) => store.load(),
        Err(e) => {
            warn!("NVS open failed ({}), using defaults", e);
            NodeConfig::default()
        }
    };
    let endpoint = EndpointConfig::default();
    endpoint.validate().map_err(Error::from)?;

    // ── 3. Shared I2C bus (display + sensor) ──────────────────
    info!(
        "I2C: SDA=GPIO{} SCL=GPIO{} @ {} Hz",
        pins::I2C_SDA_GPIO,
        pins::I2C_SCL_GPIO,
        pins::I2C_FREQ_HZ
    );
    let i2c_config = I2cConfig::new().baudrate(Hertz(pins::I2C_FREQ_HZ));
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio6,
        peripherals.pins.gpio7,
        &i2c_config,
    )?;
    // The bus outlives every driver; firmware never exits.
    let i2c_bus: &'static Mutex<I2cDriver<'static>> = Box::leak(Box::new(Mutex::new(i2c)));

    // ── 4. Button (active-low, internal pull-up) ──────────────
    info!("Button: GPIO{}", pins::BUTTON_GPIO);
    let mut button_pin = PinDriver::input(peripherals.pins.gpio4)?;
    button_pin.set_pull(Pull::Up)?;

    // ── 5. Wire the node ──────────────────────────────────────
    let mut hw = NodePeripherals {
        sensor: Sht4xSensor::new(
            MutexDevice::new(i2c_bus),
            Delay::new_default(),
            pins::SENSOR_I2C_ADDR,
        ),
        net: ZigbeeEndpoint::new(),
        status: DisplayStatus::new(MutexDevice::new(i2c_bus), pins::DISPLAY_I2C_ADDR),
        button: GpioButton::new(button_pin),
        platform: EspPlatform::new(),
    };
    let mut sink = LogEventSink::new();
    let mut node = NodeService::new(config, endpoint);

    // ── 6. Boot ───────────────────────────────────────────────
    match node.boot(&mut hw, &mut sink) {
        BootOutcome::Ready => {
            let ep = node.endpoint();
            info!("Node ready: {} {} on endpoint {}", ep.manufacturer, ep.model, ep.endpoint);
            match node.config().reporting {
                Some(policy) => info!("Automatic reporting: {:?}", policy),
                None => info!("Reporting on button press only"),
            }
        }
        BootOutcome::Halted(e) => {
            error!("Halted: {}", e);
            loop {
                FreeRtos::delay_ms(1000);
            }
        }
        BootOutcome::Restarting(e) => {
            return Err(anyhow!("restart after {e} did not take effect"));
        }
    }

    // ── 7. Steady-state tick loop ─────────────────────────────
    loop {
        node.tick(&mut hw, &mut sink);
        hw.platform.delay_ms(node.next_delay_ms());
    }
}
