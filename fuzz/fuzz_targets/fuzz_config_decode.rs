//! Fuzz the persisted-config decode path with arbitrary NVS blobs.
//!
//! A corrupted blob must come back as a `ConfigError`, never a panic,
//! and a blob that decodes must still pass range validation.

#![no_main]

use libfuzzer_sys::fuzz_target;

use nightglow::adapters::nvs::NvsConfigStore;
use nightglow::app::ports::ConfigPort;

fuzz_target!(|data: &[u8]| {
    let store = NvsConfigStore::new();
    store.seed_raw(data);
    if let Ok(config) = store.load() {
        assert!(config.validate().is_ok());
    }
});
