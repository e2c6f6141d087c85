//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the node's business rules: the boot and join
//! sequence, gesture dispatch, the reporting pipeline and the one-shot clock
//! sync.  All interaction with hardware and the network stack happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod clock;
pub mod commands;
pub mod events;
pub mod ports;
pub mod report;
pub mod service;
