//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements         | Connects to                   |
//! |------------|--------------------|-------------------------------|
//! | `gpio`     | DigitalInputPort   | Button GPIO (pull-up)         |
//! | `hardware` | SensorPort         | SHT4x over I2C                |
//! | `log_sink` | EventSink          | Serial log output             |
//! | `nvs`      | NodeConfig loader  | NVS `node/config` blob        |
//! | `platform` | PlatformPort       | ESP timer, FreeRTOS, restart  |
//! | `status`   | StatusPort         | Console + SH1106 panel        |
//! | `zigbee`   | EndpointPort       | Zigbee stack (ZCL attributes) |
//! |            | NetworkStackPort   |                               |

pub mod gpio;
pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod platform;
pub mod status;
pub mod zigbee;
