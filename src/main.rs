//! Nightglow firmware — main entry point.
//!
//! Hexagonal architecture with event-driven execution.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                  │
//! │                                                          │
//! │  PirSampler     NeopixelStrip   DarkSkyClient            │
//! │  (PresencePort) (LedStripPort)  (WeatherPort)            │
//! │  NvsConfigStore LogEventSink    wifi / MonotonicClock    │
//! │                                                          │
//! │  ─────────────── Port Trait Boundary ──────────────      │
//! │                                                          │
//! │  ┌────────────────────────────────────────────────┐      │
//! │  │            AppService (pure logic)             │      │
//! │  │  MotionGate · WeatherCache · PatternPlayer     │      │
//! │  └────────────────────────────────────────────────┘      │
//! └──────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{info, warn};

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::gpio::{AnyIOPin, AnyOutputPin, Input, InterruptType, PinDriver, Pull};
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::rmt::config::TransmitConfig;
use esp_idf_svc::hal::rmt::TxRmtDriver;
use esp_idf_svc::nvs::EspDefaultNvsPartition;

use nightglow::adapters::darksky::DarkSkyClient;
use nightglow::adapters::log_sink::LogEventSink;
use nightglow::adapters::neopixel::NeopixelStrip;
use nightglow::adapters::nvs::NvsConfigStore;
use nightglow::adapters::pir::{self, PirSampler};
use nightglow::adapters::time::MonotonicClock;
use nightglow::adapters::wifi;
use nightglow::app::events::AppEvent;
use nightglow::app::ports::{ConfigPort, EventSink, LedStripPort, PresencePort, WeatherPort};
use nightglow::app::service::AppService;
use nightglow::config::DeviceConfig;
use nightglow::error::{FetchError, LedError};
use nightglow::events::{drain_events, push_event, Event};
use nightglow::patterns::Rgb;
use nightglow::weather::WeatherReading;

// ── Hardware aggregate ────────────────────────────────────────
//
// `AppService::tick` takes a single object satisfying all three hardware
// ports; this bundles the concrete adapters behind that seam.

type PirPin = PinDriver<'static, AnyIOPin, Input>;

struct Hardware {
    pir: PirSampler<PirPin>,
    strip: NeopixelStrip,
    weather: DarkSkyClient,
}

impl PresencePort for Hardware {
    fn motion_present(&mut self) -> bool {
        // A rising edge latched by the ISR since the last tick counts as
        // presence for this sample even if the line already dropped.
        let latched = pir::motion_latched();
        self.pir.motion_present() || latched
    }
}

impl LedStripPort for Hardware {
    fn write_frame(&mut self, frame: &[Rgb]) -> Result<(), LedError> {
        self.strip.write_frame(frame)
    }

    fn all_off(&mut self) -> Result<(), LedError> {
        self.strip.all_off()
    }

    fn led_count(&self) -> usize {
        self.strip.led_count()
    }
}

impl WeatherPort for Hardware {
    fn fetch(&mut self, location: &str, api_key: &str) -> Result<WeatherReading, FetchError> {
        self.weather.fetch(location, api_key)
    }
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("Nightglow v{}", env!("CARGO_PKG_VERSION"));

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let config_store = match NvsConfigStore::new(nvs_partition.clone()) {
        Ok(store) => Some(store),
        Err(e) => {
            warn!("NVS init failed ({e}), config will not persist this session");
            None
        }
    };
    let config = match config_store.as_ref().map(|s| s.load()) {
        Some(Ok(cfg)) => {
            info!("Config loaded from NVS");
            cfg
        }
        Some(Err(e)) => {
            warn!("Config load failed ({e}), using defaults");
            DeviceConfig::default()
        }
        None => DeviceConfig::default(),
    };

    // ── 3. WiFi ───────────────────────────────────────────────
    //
    // A failed connect is not fatal: the cache layer degrades to stale
    // readings (or the error pattern) until the next reboot.
    let _wifi = match wifi::connect(peripherals.modem, sysloop, nvs_partition, &config) {
        Ok(wifi) => Some(wifi),
        Err(e) => {
            warn!("WiFi unavailable ({e}), running offline");
            None
        }
    };

    // ── 4. Construct hardware adapters ────────────────────────
    let mut pir_pin = PinDriver::input(unsafe { AnyIOPin::new(config.pin_pir) })?;
    pir_pin.set_pull(Pull::Down)?;
    pir_pin.set_interrupt_type(InterruptType::PosEdge)?;
    unsafe {
        pir_pin.subscribe(|| {
            pir::latch_motion();
            push_event(Event::MotionEdge);
        })?;
    }
    pir_pin.enable_interrupt()?;

    let tx = TxRmtDriver::new(
        peripherals.rmt.channel0,
        unsafe { AnyOutputPin::new(config.pin_pixel) },
        &TransmitConfig::new().clock_divider(1),
    )?;
    let strip = NeopixelStrip::new(tx, config.led_count)
        .map_err(|e| anyhow::anyhow!("strip init: {e}"))?;

    let mut hw = Hardware {
        pir: PirSampler::new(pir_pin),
        strip,
        weather: DarkSkyClient::new(),
    };

    let clock = MonotonicClock::new();
    let mut sink = LogEventSink::new();

    // ── 5. Construct app service ──────────────────────────────
    let mut app = AppService::new(&config);
    app.start(&mut hw, &mut sink);

    info!("System ready. Entering event loop.");

    // ── 6. Event loop ─────────────────────────────────────────
    let tick_ms = u64::from(config.control_loop_interval_ms);
    let telemetry_every_ticks =
        (u64::from(config.telemetry_interval_secs) * 1000).div_ceil(tick_ms).max(1);
    let mut tick_counter: u64 = 0;

    loop {
        std::thread::sleep(std::time::Duration::from_millis(tick_ms));
        push_event(Event::ControlTick);

        tick_counter += 1;
        if tick_counter % telemetry_every_ticks == 0 {
            push_event(Event::TelemetryTick);
        }

        drain_events(|event| {
            let now_ms = clock.now_ms();
            match event {
                // A MotionEdge is handled like a control tick; the ISR
                // latch is what guarantees a pulse shorter than the sleep
                // interval is still seen by this sample.
                Event::ControlTick | Event::MotionEdge => {
                    app.tick(now_ms, &mut hw, &mut sink);
                }
                Event::TelemetryTick => {
                    sink.emit(&AppEvent::Telemetry(app.build_telemetry(now_ms)));
                }
            }
        });

        // The GPIO ISR auto-disarms after firing; re-arm for the next edge.
        if let Err(e) = hw.pir.pin_mut().enable_interrupt() {
            warn!("PIR interrupt re-arm failed: {e}");
        }
    }
}
