/// Vitrine Kiosk - RFID-activated video player
use clap::Parser;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vitrine_core::KioskConfig;
use vitrine_hardware::{BatteryMonitor, DisconnectedProbe, RfidReader};
use vitrine_kiosk::{KioskApp, LoggingUi, OsControl};
use vitrine_playback::MediaPipeline;

#[derive(Parser)]
#[command(name = "vitrine-kiosk")]
#[command(about = "RFID-activated video kiosk", long_about = None)]
struct Cli {
    /// Configuration file path (TOML or JSON)
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vitrine=info,vitrine_kiosk=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Configuration failure is fatal; everything after it degrades.
    let config = KioskConfig::load(&cli.config)?;

    tracing::info!("Starting Vitrine kiosk");
    tracing::info!(
        "Display: {}x{}, fullscreen: {}",
        config.display_settings.resolution.width,
        config.display_settings.resolution.height,
        config.display_settings.fullscreen
    );
    tracing::info!("Tag bindings: {}", config.rfid_tags.len());

    let (gpio_tx, gpio_rx) = mpsc::unbounded_channel();
    // The GUI layer owns the sending half once one is attached; headless
    // runs simply never send.
    let (_ui_tx, ui_rx) = mpsc::unbounded_channel();

    let battery = build_battery(&config);
    let rfid = build_rfid();
    let pipeline = build_pipeline()?;

    #[cfg(feature = "rpi")]
    let _button_source = match vitrine_hardware::rpi::GpioButtonSource::new(
        &config.gpio_pins,
        config.power_button_pin,
        gpio_tx,
    ) {
        Ok(source) => Some(source),
        Err(e) => {
            tracing::warn!(error = %e, "buttons unavailable, touch input only");
            None
        }
    };
    #[cfg(not(feature = "rpi"))]
    drop(gpio_tx);

    let app = KioskApp::new(
        config,
        battery,
        rfid,
        pipeline,
        Box::new(LoggingUi),
        Box::new(OsControl),
    );
    app.run(ui_rx, gpio_rx).await
}

/// Battery monitor, degrading to safe defaults when the probe is absent
fn build_battery(config: &KioskConfig) -> BatteryMonitor {
    let settings = config.battery_settings;

    #[cfg(feature = "rpi")]
    match vitrine_hardware::rpi::GpioBatteryProbe::new(
        settings.level_pin,
        settings.charging_pin,
        settings.raw_min,
        settings.raw_max,
    ) {
        Ok(probe) => {
            return BatteryMonitor::new(Box::new(probe), settings.raw_min, settings.raw_max)
        }
        Err(e) => {
            tracing::warn!(error = %e, "battery monitor unavailable, reporting safe defaults");
        }
    }

    BatteryMonitor::new(
        Box::new(DisconnectedProbe),
        settings.raw_min,
        settings.raw_max,
    )
}

/// RFID reader, degrading to a silent fallback when the scanner is absent
fn build_rfid() -> RfidReader {
    #[cfg(feature = "rpi")]
    match vitrine_hardware::rpi::SpiTagScanner::new() {
        Ok(scanner) => return RfidReader::new(Box::new(scanner)),
        Err(e) => {
            tracing::warn!(error = %e, "RFID reader unavailable, running without tag scanning");
        }
    }

    RfidReader::disconnected()
}

/// Media pipeline; a startup failure here is fatal
#[cfg(feature = "gst")]
fn build_pipeline() -> anyhow::Result<Box<dyn MediaPipeline>> {
    let pipeline = vitrine_pipeline_gst::GstPipeline::new()?;
    Ok(Box::new(pipeline))
}

/// Headless stand-in when built without the `gst` feature
#[cfg(not(feature = "gst"))]
fn build_pipeline() -> anyhow::Result<Box<dyn MediaPipeline>> {
    tracing::warn!("built without the gst feature, nothing will be rendered");
    Ok(Box::new(vitrine_kiosk::NullPipeline::new()))
}
