//! Raspberry Pi hardware backends
//!
//! Real implementations of the capability traits: GPIO-backed battery
//! sensing, interrupt-driven buttons forwarded over a channel, and an
//! MFRC522 RFID scanner on SPI0. Only compiled with the `rpi` feature.

use crate::buttons::GpioEvent;
use crate::error::{HardwareError, Result};
use crate::traits::{BatteryProbe, TagScanner};
use mfrc522::comm::blocking::spi::SpiInterface;
use mfrc522::{Initialized, Mfrc522};
use rppal::gpio::{Gpio, InputPin, Level, Trigger};
use rppal::spi::{Bus, Mode, SimpleHalSpiDevice, SlaveSelect, Spi};
use std::collections::BTreeMap;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Debounce applied at the pin level, before the software window
const HARDWARE_DEBOUNCE: Duration = Duration::from_millis(300);

/// Battery probe reading the UPS HAT's digital level and charge pins
///
/// The stock HAT only exposes a good/empty level signal, so raw readings
/// snap to the ends of the configured range; a board with a real ADC gets
/// its own `BatteryProbe` implementation instead.
pub struct GpioBatteryProbe {
    level_pin: InputPin,
    charging_pin: InputPin,
    raw_min: u16,
    raw_max: u16,
}

impl GpioBatteryProbe {
    /// Claim the battery pins
    pub fn new(level_pin: u8, charging_pin: u8, raw_min: u16, raw_max: u16) -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| HardwareError::init(e.to_string()))?;
        let level_pin = gpio
            .get(level_pin)
            .map_err(|e| HardwareError::gpio(e.to_string()))?
            .into_input();
        let charging_pin = gpio
            .get(charging_pin)
            .map_err(|e| HardwareError::gpio(e.to_string()))?
            .into_input();

        tracing::info!("battery monitor pins claimed");
        Ok(Self {
            level_pin,
            charging_pin,
            raw_min,
            raw_max,
        })
    }
}

impl BatteryProbe for GpioBatteryProbe {
    fn read_level_raw(&mut self) -> Result<u16> {
        Ok(match self.level_pin.read() {
            Level::High => self.raw_max,
            Level::Low => self.raw_min,
        })
    }

    fn read_charging(&mut self) -> Result<bool> {
        Ok(self.charging_pin.read() == Level::High)
    }
}

/// Interrupt-driven button pins
///
/// Each configured button gets a pull-up input with an async interrupt on
/// both edges; the power button watches the falling edge only. Edges are
/// forwarded over the channel because the interrupt callbacks run on their
/// own thread and must not touch session state directly. Dropping this
/// releases the pins and their interrupts.
pub struct GpioButtonSource {
    _pins: Vec<InputPin>,
}

impl GpioButtonSource {
    /// Claim the button pins and start forwarding edges
    pub fn new(
        gpio_pins: &BTreeMap<String, u8>,
        power_button_pin: u8,
        events: UnboundedSender<GpioEvent>,
    ) -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| HardwareError::init(e.to_string()))?;
        let mut pins = Vec::with_capacity(gpio_pins.len() + 1);

        for (name, &pin_number) in gpio_pins {
            let mut pin = gpio
                .get(pin_number)
                .map_err(|e| HardwareError::gpio(e.to_string()))?
                .into_input_pullup();

            let tx = events.clone();
            let button = name.clone();
            pin.set_async_interrupt(Trigger::Both, Some(HARDWARE_DEBOUNCE), move |event| {
                let released = event.trigger == Trigger::RisingEdge;
                let _ = tx.send(GpioEvent::ButtonEdge {
                    button: button.clone(),
                    released,
                });
            })
            .map_err(|e| HardwareError::gpio(e.to_string()))?;

            tracing::debug!(button = %name, pin = pin_number, "button interrupt armed");
            pins.push(pin);
        }

        let mut power = gpio
            .get(power_button_pin)
            .map_err(|e| HardwareError::gpio(e.to_string()))?
            .into_input_pullup();
        let tx = events;
        power
            .set_async_interrupt(Trigger::FallingEdge, Some(HARDWARE_DEBOUNCE), move |_| {
                let _ = tx.send(GpioEvent::PowerButton);
            })
            .map_err(|e| HardwareError::gpio(e.to_string()))?;
        pins.push(power);

        tracing::info!("buttons initialized");
        Ok(Self { _pins: pins })
    }
}

/// MFRC522 RFID scanner on SPI0
pub struct SpiTagScanner {
    mfrc522: Mfrc522<SpiInterface<SimpleHalSpiDevice<Spi>>, Initialized>,
}

impl SpiTagScanner {
    /// Open the reader on SPI0 / CE0
    pub fn new() -> Result<Self> {
        let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, 1_000_000, Mode::Mode0)
            .map_err(|e| HardwareError::init(e.to_string()))?;
        let device = SimpleHalSpiDevice::new(spi);
        let mfrc522 = Mfrc522::new(SpiInterface::new(device))
            .init()
            .map_err(|e| HardwareError::init(format!("MFRC522 init: {e:?}")))?;

        tracing::info!("RFID reader initialized");
        Ok(Self { mfrc522 })
    }
}

impl TagScanner for SpiTagScanner {
    fn poll_tag(&mut self) -> Result<Option<String>> {
        // REQA times out when the field is empty; that is the common case.
        let Ok(atqa) = self.mfrc522.reqa() else {
            return Ok(None);
        };

        match self.mfrc522.select(&atqa) {
            Ok(uid) => {
                let tag_id = uid
                    .as_bytes()
                    .iter()
                    .map(|byte| format!("{byte:02x}"))
                    .collect();
                Ok(Some(tag_id))
            }
            Err(e) => Err(HardwareError::read(format!("tag select: {e:?}"))),
        }
    }
}
