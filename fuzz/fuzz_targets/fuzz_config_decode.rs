//! Fuzz target: `NodeConfig::decode`
//!
//! Feeds arbitrary bytes as a stored NVS blob.
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - Anything accepted also passes validation
//!
//! cargo fuzz run fuzz_config_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use thnode::config::NodeConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(cfg) = NodeConfig::decode(data) {
        assert!(cfg.validate().is_ok());
        assert!(cfg.debounce_ms < cfg.long_press_ms);
    }
});
