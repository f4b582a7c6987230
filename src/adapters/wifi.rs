//! WiFi bring-up (ESP-IDF only).
//!
//! Blocking station-mode connect using the credentials from
//! [`DeviceConfig`]. The weather fetch path tolerates network loss, so
//! a dropped connection after boot degrades to stale cache serving
//! rather than a crash.

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::modem::Modem;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi};
use log::info;

use crate::config::DeviceConfig;
use crate::error::Error;

/// Connect to the configured access point, blocking until an IP is
/// assigned. Returns the driver handle; dropping it tears the
/// connection down.
pub fn connect(
    modem: Modem,
    sysloop: EspSystemEventLoop,
    nvs: EspDefaultNvsPartition,
    config: &DeviceConfig,
) -> Result<BlockingWifi<EspWifi<'static>>, Error> {
    if config.ssid.is_empty() {
        return Err(Error::Config("ssid not provisioned"));
    }

    let wifi = EspWifi::new(modem, sysloop.clone(), Some(nvs))
        .map_err(|_| Error::Init("wifi driver"))?;
    let mut wifi = BlockingWifi::wrap(wifi, sysloop).map_err(|_| Error::Init("wifi wrap"))?;

    let auth_method = if config.password.is_empty() {
        AuthMethod::None
    } else {
        AuthMethod::WPA2Personal
    };

    wifi.set_configuration(&Configuration::Client(ClientConfiguration {
        ssid: config.ssid.clone(),
        password: config.password.clone(),
        auth_method,
        ..Default::default()
    }))
    .map_err(|_| Error::Init("wifi configuration"))?;

    wifi.start().map_err(|_| Error::Init("wifi start"))?;
    info!("wifi: connecting to '{}'", config.ssid);
    wifi.connect().map_err(|_| Error::Init("wifi connect"))?;
    wifi.wait_netif_up().map_err(|_| Error::Init("wifi netif"))?;

    info!("wifi: connected");
    Ok(wifi)
}
