//! Clock synchronizer.
//!
//! Runs once, after the node has joined: pulls UTC and the timezone offset
//! from the coordinator's time cluster and derives local wall-clock time.
//! The coordinator is the time authority, so there is no periodic re-sync
//! and no drift correction.

use core::fmt::Write as _;

use chrono::{NaiveDateTime, TimeDelta};
use heapless::String;
use log::{info, warn};

use super::ports::EndpointPort;

/// Display format for the derived local time.
const LOCAL_TIME_FORMAT: &str = "%A, %B %d %Y %H:%M:%S";

/// UTC and local calendar time with the offset that links them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalTimeInfo {
    pub utc: NaiveDateTime,
    pub timezone_offset: i32,
    pub local: NaiveDateTime,
}

impl LocalTimeInfo {
    /// Derive local time as `utc + offset`.  Calendar normalisation (day,
    /// month and year rollover) is chrono's; `None` only if the result
    /// leaves chrono's representable range.
    pub fn derive(utc: NaiveDateTime, timezone_offset: i32) -> Option<Self> {
        let local = utc.checked_add_signed(TimeDelta::seconds(i64::from(timezone_offset)))?;
        Some(Self {
            utc,
            timezone_offset,
            local,
        })
    }

    /// Human-readable local time, e.g. `Wednesday, January 01 2025 00:05:00`.
    pub fn formatted(&self) -> String<64> {
        let mut out = String::new();
        // Longest weekday + month names fit well inside 64 bytes.
        let _ = write!(out, "{}", self.local.format(LOCAL_TIME_FORMAT));
        out
    }
}

/// Read the time cluster once and derive local time.
///
/// An offset that would push the result out of range is dropped and the
/// UTC time is used as local time.
pub fn sync_once(endpoint: &mut impl EndpointPort) -> LocalTimeInfo {
    let utc = endpoint.utc_time();
    let offset = endpoint.timezone_offset();

    match LocalTimeInfo::derive(utc, offset) {
        Some(info) => {
            info!("Clock: utc={} offset={}s local={}", utc, offset, info.local);
            info
        }
        None => {
            warn!("Clock: offset {}s out of range for {}, using UTC", offset, utc);
            LocalTimeInfo {
                utc,
                timezone_offset: 0,
                local: utc,
            }
        }
    }
}
