//! A platform agnostic driver for MAX7219/MAX7221 LED drivers in the style of LedControl
//!
//! The driver keeps a copy of every row register of up to 8 daisy-chained chips and
//! writes each change straight through to the hardware. It can drive LED matrices
//! (single LEDs, rows, columns) as well as 7-segment displays (hex digits, characters).
//!
//! This driver was built using [`embedded-hal`] traits.
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal/~1.0

#![deny(unsafe_code)]
#![cfg_attr(not(test), no_std)]

pub mod connectors;
mod error;
pub mod segments;

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;

pub use connectors::{Connector, PinConnector, SpiConnector};
pub use error::Error;
pub use segments::{CHAR_TABLE, DECIMAL_POINT};

/// Maximum number of displays connected in series supported by this lib.
pub const MAX_DISPLAYS: usize = 8;

/// Digits (or matrix rows) per display
pub const MAX_DIGITS: usize = 8;

/// Intensity set on every chip at start-up.
pub const DEFAULT_INTENSITY: u8 = 8;

/// Scan limit set on every chip at start-up: all 8 digits.
pub const DEFAULT_SCAN_LIMIT: u8 = 7;

/// Possible command register values on the display chip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Command
{
    Noop = 0x00,
    Digit0 = 0x01,
    Digit1 = 0x02,
    Digit2 = 0x03,
    Digit3 = 0x04,
    Digit4 = 0x05,
    Digit5 = 0x06,
    Digit6 = 0x07,
    Digit7 = 0x08,
    DecodeMode = 0x09,
    Intensity = 0x0A,
    ScanLimit = 0x0B,
    Power = 0x0C,
    DisplayTest = 0x0F
}

impl Command {
    /// Register of digit/row `n`, or `None` past the last row.
    pub const fn digit(n: usize) -> Option<Command> {
        match n {
            0 => Some(Command::Digit0),
            1 => Some(Command::Digit1),
            2 => Some(Command::Digit2),
            3 => Some(Command::Digit3),
            4 => Some(Command::Digit4),
            5 => Some(Command::Digit5),
            6 => Some(Command::Digit6),
            7 => Some(Command::Digit7),
            _ => None,
        }
    }
}

impl From<Command> for u8 {
    fn from(command: Command) -> u8 {
        command as u8
    }
}

///
/// Handles a chain of MAX7219 chips, keeping the state of every
/// LED so that single LEDs and columns can be changed without
/// reading back from the hardware.
///
pub struct LedControl<CONNECTOR>
{
    connector: CONNECTOR,
    devices: usize,
    status: [u8; MAX_DISPLAYS * MAX_DIGITS],
}

impl<DATA, CLK, CS> LedControl<PinConnector<DATA, CLK, CS>>
where DATA: OutputPin, CLK: OutputPin, CS: OutputPin,
{
    ///
    /// Returns a new handler driving the chain over three output pins.
    /// Each display starts blanked and shut down.
    ///
    /// # Arguments
    ///
    /// * `devices` - number of displays connected in series, clamped to `1..=8`
    /// * `data` - the DIN PIN previously set to Output mode
    /// * `clk` - the CLK PIN previously set to Output mode
    /// * `cs` - the LOAD/CS PIN previously set to Output mode
    ///
    /// # Errors
    ///
    /// * `Error` - returned in case there was an error setting a PIN on the device
    ///
    pub fn from_pins(devices: usize, data: DATA, clk: CLK, cs: CS) -> Result<Self, Error> {
        let connector = PinConnector::new(devices, data, clk, cs)?;
        Self::new(connector)
    }
}

impl<SPI> LedControl<SpiConnector<SPI>>
where SPI: SpiDevice,
{
    ///
    /// Returns a new handler driving the chain over a hardware SPI device.
    /// Each display starts blanked and shut down.
    ///
    /// # Errors
    ///
    /// * `Error` - returned in case the SPI device failed
    ///
    pub fn from_spi(devices: usize, spi: SPI) -> Result<Self, Error> {
        Self::new(SpiConnector::new(devices, spi))
    }
}

impl<CONNECTOR> LedControl<CONNECTOR>
where CONNECTOR: Connector,
{
    ///
    /// Returns a new handler on top of the given connector and runs
    /// the power-up sequence on every chip: shutdown, no decode,
    /// full scan limit, default intensity, blank rows, shutdown.
    ///
    /// # Errors
    ///
    /// * `Error` - returned in case there was an error driving the bus
    ///
    pub fn new(connector: CONNECTOR) -> Result<Self, Error> {
        let devices = connectors::clamp_devices(connector.devices());
        let mut control = LedControl {
            connector,
            devices,
            status: [0; MAX_DISPLAYS * MAX_DIGITS],
        };

        control.init()?;
        Ok(control)
    }

    /// Number of displays in the chain.
    pub fn device_count(&self) -> usize {
        self.devices
    }

    /// Gives the connector back.
    pub fn release(self) -> CONNECTOR {
        self.connector
    }

    /// Last value written to `row` of display `addr`.
    pub fn row(&self, addr: usize, row: usize) -> Option<u8> {
        if addr < self.devices && row < MAX_DIGITS {
            Some(self.status[addr * MAX_DIGITS + row])
        } else {
            None
        }
    }

    ///
    /// Sets the power-saving mode of a display. Data is kept while shut down.
    ///
    /// # Arguments
    ///
    /// * `addr` - display to address as connected in series
    /// * `status` - `true` shuts the display down, `false` resumes normal operation
    ///
    pub fn shutdown(&mut self, addr: usize, status: bool) -> Result<(), Error> {
        if !self.valid_addr(addr) {
            return Ok(());
        }

        let data = if status { 0x00 } else { 0x01 };
        self.connector.write_data(addr, Command::Power, data)
    }

    ///
    /// Sets how many digits (rows) the display multiplexes, `limit + 1` in total.
    /// The value is sent as given.
    ///
    pub fn set_scan_limit(&mut self, addr: usize, limit: u8) -> Result<(), Error> {
        if !self.valid_addr(addr) {
            return Ok(());
        }

        self.connector.write_data(addr, Command::ScanLimit, limit)
    }

    ///
    /// Sets the brightness of the display, `0x00` to `0x0F`.
    /// Higher bits are dropped.
    ///
    pub fn set_intensity(&mut self, addr: usize, intensity: u8) -> Result<(), Error> {
        if !self.valid_addr(addr) {
            return Ok(());
        }

        self.connector.write_data(addr, Command::Intensity, intensity & 0x0F)
    }

    /// Lights every LED of the display regardless of the row registers while `is_on`.
    pub fn set_display_test(&mut self, addr: usize, is_on: bool) -> Result<(), Error> {
        if !self.valid_addr(addr) {
            return Ok(());
        }

        self.connector.write_data(addr, Command::DisplayTest, u8::from(is_on))
    }

    /// Switches all LEDs of the display off.
    pub fn clear_display(&mut self, addr: usize) -> Result<(), Error> {
        if !self.valid_addr(addr) {
            return Ok(());
        }

        for row in 0..MAX_DIGITS {
            self.store(addr, row, 0)?;
        }

        Ok(())
    }

    ///
    /// Switches a single LED on or off
    ///
    /// # Arguments
    ///
    /// * `addr` - display to address as connected in series
    /// * `row` - row of the LED, `0..=7`
    /// * `col` - column of the LED, `0..=7`, column 0 being the highest bit
    /// * `state` - whether to switch the LED on
    ///
    pub fn set_led(&mut self, addr: usize, row: usize, col: usize, state: bool) -> Result<(), Error> {
        if !self.valid_addr(addr) || !valid_index("row", row) || !valid_index("column", col) {
            return Ok(());
        }

        let mask = 0b1000_0000 >> col;
        let current = self.status[addr * MAX_DIGITS + row];
        let value = if state { current | mask } else { current & !mask };

        self.store(addr, row, value)
    }

    /// Sets all 8 LEDs of a row, each set bit lighting one LED.
    pub fn set_row(&mut self, addr: usize, row: usize, value: u8) -> Result<(), Error> {
        if !self.valid_addr(addr) || !valid_index("row", row) {
            return Ok(());
        }

        self.store(addr, row, value)
    }

    ///
    /// Sets all 8 LEDs of a column. The highest bit of `value` goes to row 0.
    /// Every row is rewritten, one frame per row.
    ///
    pub fn set_column(&mut self, addr: usize, col: usize, value: u8) -> Result<(), Error> {
        if !self.valid_addr(addr) || !valid_index("column", col) {
            return Ok(());
        }

        for row in 0..MAX_DIGITS {
            let state = (value >> (7 - row)) & 0x01 == 1;
            self.set_led(addr, row, col, state)?;
        }

        Ok(())
    }

    ///
    /// Shows a hexadecimal digit on a 7-segment display
    ///
    /// # Arguments
    ///
    /// * `addr` - display to address as connected in series
    /// * `digit` - position of the digit, `0..=7`
    /// * `value` - the value to show, `0x00..=0x0F`. Higher bits are dropped.
    /// * `dp` - whether to light the decimal point
    ///
    pub fn set_digit(&mut self, addr: usize, digit: usize, value: u8, dp: bool) -> Result<(), Error> {
        if !self.valid_addr(addr) || !valid_index("digit", digit) {
            return Ok(());
        }

        self.store(addr, digit, segments::hex_byte(value, dp))
    }

    ///
    /// Shows a character on a 7-segment display. Only a few characters make sense:
    /// digits, `A b c d E F H L P`, `.`, `-`, `_` and space. Anything without a
    /// glyph is blank.
    ///
    pub fn set_char(&mut self, addr: usize, digit: usize, value: char, dp: bool) -> Result<(), Error> {
        if !self.valid_addr(addr) || !valid_index("digit", digit) {
            return Ok(());
        }

        self.store(addr, digit, segments::char_byte(value, dp))
    }

    fn init(&mut self) -> Result<(), Error> {
        for i in 0..self.devices {
            self.shutdown(i, true)?; // quiet while configuring
            self.connector.write_data(i, Command::DecodeMode, 0x00)?; // raw segments
            self.set_scan_limit(i, DEFAULT_SCAN_LIMIT)?;
            self.set_intensity(i, DEFAULT_INTENSITY)?;
            self.clear_display(i)?;
            self.shutdown(i, true)?;
        }

        Ok(())
    }

    fn valid_addr(&self, addr: usize) -> bool {
        if addr < self.devices {
            true
        } else {
            log::debug!("ignoring display {addr}, chain has {}", self.devices);
            false
        }
    }

    /// Updates the status of a row and writes it through.
    fn store(&mut self, addr: usize, row: usize, value: u8) -> Result<(), Error> {
        let Some(register) = Command::digit(row) else {
            return Ok(());
        };

        self.status[addr * MAX_DIGITS + row] = value;
        self.connector.write_data(addr, register, value)
    }
}

fn valid_index(what: &str, index: usize) -> bool {
    if index < MAX_DIGITS {
        true
    } else {
        log::debug!("ignoring {what} {index}, expected 0..{MAX_DIGITS}");
        false
    }
}
