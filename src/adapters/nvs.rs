//! Persistent configuration storage.
//!
//! Config is stored as a postcard blob under a single NVS key. Both
//! directions validate: a blob that decodes but fails range validation
//! is treated the same as a corrupted one, and `save` refuses to
//! persist an invalid config.
//!
//! The host build keeps the blob in memory so provisioning flows can be
//! tested without flash.

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::DeviceConfig;

pub const NVS_NAMESPACE: &str = "nightglow";
pub const CONFIG_KEY: &str = "device_cfg";

/// Largest postcard encoding of a fully populated [`DeviceConfig`].
pub const CONFIG_BLOB_CAP: usize = 256;

fn encode(config: &DeviceConfig) -> Result<std::vec::Vec<u8>, ConfigError> {
    config
        .validate()
        .map_err(ConfigError::ValidationFailed)?;
    postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)
}

fn decode(blob: &[u8]) -> Result<DeviceConfig, ConfigError> {
    let config: DeviceConfig =
        postcard::from_bytes(blob).map_err(|_| ConfigError::Corrupted)?;
    config.validate().map_err(ConfigError::ValidationFailed)?;
    Ok(config)
}

// ── Host fallback ─────────────────────────────────────────────

/// In-memory config store for host builds and tests.
#[cfg(not(target_os = "espidf"))]
pub struct NvsConfigStore {
    blob: core::cell::RefCell<Option<std::vec::Vec<u8>>>,
}

#[cfg(not(target_os = "espidf"))]
impl NvsConfigStore {
    pub fn new() -> Self {
        Self {
            blob: core::cell::RefCell::new(None),
        }
    }

    /// Seed a raw blob, bypassing validation. Test hook for simulating
    /// corrupted flash contents.
    pub fn seed_raw(&self, blob: &[u8]) {
        *self.blob.borrow_mut() = Some(blob.to_vec());
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for NvsConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(not(target_os = "espidf"))]
impl ConfigPort for NvsConfigStore {
    fn load(&self) -> Result<DeviceConfig, ConfigError> {
        match self.blob.borrow().as_deref() {
            Some(blob) => decode(blob),
            None => Err(ConfigError::NotFound),
        }
    }

    fn save(&self, config: &DeviceConfig) -> Result<(), ConfigError> {
        let encoded = encode(config)?;
        if encoded.len() > CONFIG_BLOB_CAP {
            return Err(ConfigError::StorageFull);
        }
        *self.blob.borrow_mut() = Some(encoded);
        Ok(())
    }
}

// ── ESP-IDF NVS backend ───────────────────────────────────────

#[cfg(target_os = "espidf")]
pub use esp::NvsConfigStore;

#[cfg(target_os = "espidf")]
mod esp {
    use core::cell::RefCell;

    use esp_idf_svc::nvs::{EspNvs, EspNvsPartition, NvsDefault};

    use super::{decode, encode, CONFIG_BLOB_CAP, CONFIG_KEY, NVS_NAMESPACE};
    use crate::app::ports::{ConfigError, ConfigPort};
    use crate::config::DeviceConfig;

    /// Config store backed by the default NVS partition.
    pub struct NvsConfigStore {
        nvs: RefCell<EspNvs<NvsDefault>>,
    }

    impl NvsConfigStore {
        pub fn new(partition: EspNvsPartition<NvsDefault>) -> Result<Self, ConfigError> {
            let nvs = EspNvs::new(partition, NVS_NAMESPACE, true)
                .map_err(|_| ConfigError::IoError)?;
            Ok(Self {
                nvs: RefCell::new(nvs),
            })
        }
    }

    impl ConfigPort for NvsConfigStore {
        fn load(&self) -> Result<DeviceConfig, ConfigError> {
            let mut buf = [0u8; CONFIG_BLOB_CAP];
            let nvs = self.nvs.borrow();
            match nvs.get_blob(CONFIG_KEY, &mut buf) {
                Ok(Some(blob)) => decode(blob),
                Ok(None) => Err(ConfigError::NotFound),
                Err(_) => Err(ConfigError::IoError),
            }
        }

        fn save(&self, config: &DeviceConfig) -> Result<(), ConfigError> {
            let encoded = encode(config)?;
            if encoded.len() > CONFIG_BLOB_CAP {
                return Err(ConfigError::StorageFull);
            }
            self.nvs
                .borrow_mut()
                .set_blob(CONFIG_KEY, &encoded)
                .map_err(|_| ConfigError::IoError)
        }
    }
}
