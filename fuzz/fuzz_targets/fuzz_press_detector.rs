//! Fuzz target: `PressDetector::poll`
//!
//! Each input byte is one sample: bit 0 is the pin level (1 = pressed),
//! bits 1..7 scale the gap to the next sample.  The first four bytes seed
//! the start time so u32 wraparound is exercised.
//!
//! Invariants checked:
//! - No panics under any sample stream
//! - Two classifications are never closer than the debounce window
//! - A long press is never followed by another long press without a
//!   release being sampled in between
//!
//! cargo fuzz run fuzz_press_detector

#![no_main]

use libfuzzer_sys::fuzz_target;
use thnode::app::ports::Level;
use thnode::config::NodeConfig;
use thnode::drivers::button::{ButtonEvent, PressDetector};

fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }
    let (seed, samples) = data.split_at(4);
    let mut now = u32::from_le_bytes([seed[0], seed[1], seed[2], seed[3]]);

    let cfg = NodeConfig::default();
    let mut detector = PressDetector::new(&cfg);

    let mut last_event_at: Option<u32> = None;
    let mut long_latched = false;

    for &byte in samples {
        let pressed = byte & 1 == 1;
        let level = if pressed { Level::Low } else { Level::High };

        let event = detector.poll(level, now);
        if event != ButtonEvent::None {
            if let Some(prev) = last_event_at {
                assert!(
                    now.wrapping_sub(prev) >= cfg.debounce_ms,
                    "events {} ms apart",
                    now.wrapping_sub(prev)
                );
            }
            last_event_at = Some(now);
        }

        if let ButtonEvent::LongPress { held_ms } = event {
            assert!(held_ms >= cfg.long_press_ms);
            assert!(!long_latched, "second long press without release");
            long_latched = true;
        }
        if !pressed {
            long_latched = false;
        }

        let gap = u32::from(byte >> 1) * 10;
        now = now.wrapping_add(gap.max(1));
    }
});
