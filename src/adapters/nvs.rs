//! NVS-backed node configuration.
//!
//! A postcard-encoded [`NodeConfig`] override may be stored under
//! `node/config`.  A missing, undecodable or invalid blob falls back to the
//! defaults; the node must always boot.
//!
//! - **`target_os = "espidf"`**: default NVS partition via `esp_idf_svc::nvs`.
//! - **all other targets**: an in-memory blob for host-side tests.

use log::{info, warn};

use crate::config::NodeConfig;

const CONFIG_NAMESPACE: &str = "node";
const CONFIG_KEY: &str = "config";

/// Largest blob the loader will read.
const MAX_BLOB_SIZE: usize = 256;

/// Resolve a stored blob into a usable configuration.
pub fn config_from_blob(blob: Option<&[u8]>) -> NodeConfig {
    let Some(bytes) = blob else {
        info!("NVS: no {}/{} override, using defaults", CONFIG_NAMESPACE, CONFIG_KEY);
        return NodeConfig::default();
    };
    match NodeConfig::decode(bytes) {
        Ok(cfg) => {
            info!("NVS: config loaded ({} bytes)", bytes.len());
            cfg
        }
        Err(e) => {
            warn!("NVS: {}, using defaults", e);
            NodeConfig::default()
        }
    }
}

pub struct NvsConfigStore {
    #[cfg(target_os = "espidf")]
    nvs: esp_idf_svc::nvs::EspNvs<esp_idf_svc::nvs::NvsDefault>,
    #[cfg(not(target_os = "espidf"))]
    blob: Option<Vec<u8>>,
}

#[cfg(target_os = "espidf")]
impl NvsConfigStore {
    pub fn new(
        partition: esp_idf_svc::nvs::EspDefaultNvsPartition,
    ) -> Result<Self, esp_idf_svc::sys::EspError> {
        let nvs = esp_idf_svc::nvs::EspNvs::new(partition, CONFIG_NAMESPACE, true)?;
        Ok(Self { nvs })
    }

    pub fn load(&self) -> NodeConfig {
        let mut buf = [0u8; MAX_BLOB_SIZE];
        match self.nvs.get_raw(CONFIG_KEY, &mut buf) {
            Ok(blob) => config_from_blob(blob),
            Err(e) => {
                warn!("NVS: read failed ({}), using defaults", e);
                NodeConfig::default()
            }
        }
    }
}

#[cfg(not(target_os = "espidf"))]
impl NvsConfigStore {
    pub fn new(blob: Option<Vec<u8>>) -> Self {
        Self { blob }
    }

    pub fn load(&self) -> NodeConfig {
        match self.blob.as_deref() {
            Some(b) if b.len() > MAX_BLOB_SIZE => {
                warn!("NVS: blob of {} bytes too large, using defaults", b.len());
                NodeConfig::default()
            }
            blob => config_from_blob(blob),
        }
    }
}
