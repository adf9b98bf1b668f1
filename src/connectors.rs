use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;

use crate::{Command, Error, MAX_DISPLAYS};

/// Describes the interface used to connect to the MAX7219 chain
pub trait Connector
{
    /// Number of chips connected in series.
    fn devices(&self) -> usize;

    ///
    /// Writes data to given register as described by command
    ///
    /// # Arguments
    ///
    /// * `addr` - display to address as connected in series
    /// * `command` - the command/register on the display to write to
    /// * `data` - the data byte value to write
    ///
    /// # Errors
    ///
    /// * `Error` - returned in case there was an error driving the bus
    ///
    fn write_data(&mut self, addr: usize, command: Command, data: u8) -> Result<(), Error> {
        self.write_raw(addr, command.into(), data)
    }

    ///
    /// Writes data to given register, sending no-op frames to every other chip
    /// in the chain. Addresses outside of the chain are ignored.
    ///
    /// # Arguments
    ///
    /// * `addr` - display to address as connected in series
    /// * `header` - the command/register on the display to write to as u8
    /// * `data` - the data byte value to write
    ///
    /// # Errors
    ///
    /// * `Error` - returned in case there was an error driving the bus
    ///
    fn write_raw(&mut self, addr: usize, header: u8, data: u8) -> Result<(), Error>;
}

pub(crate) fn clamp_devices(devices: usize) -> usize {
    devices.clamp(1, MAX_DISPLAYS)
}

/// Lays out one register write for the whole chain. The furthest chip's frame
/// comes first so that chip 0, nearest to the MCU, receives the last frame.
/// Returns the number of bytes to shift out, or `None` if `addr` is not in the chain.
fn load_frame(
    buffer: &mut [u8; MAX_DISPLAYS * 2],
    devices: usize,
    addr: usize,
    header: u8,
    data: u8,
) -> Option<usize> {
    if addr >= devices {
        log::debug!("no chip at address {addr} in a chain of {devices}");
        return None;
    }

    *buffer = [0; MAX_DISPLAYS * 2];
    let offset = (devices - 1 - addr) * 2;
    buffer[offset] = header;
    buffer[offset + 1] = data;
    log::trace!("chip {addr}: register {header:#04x} <- {data:#04x}");

    Some(devices * 2)
}

/// Bit-banged connection over data, clock and chip-select output pins.
pub struct PinConnector<DATA, CLK, CS>
where DATA: OutputPin, CLK: OutputPin, CS: OutputPin,
{
    devices: usize,
    buffer: [u8; MAX_DISPLAYS * 2],
    data: DATA,
    clk: CLK,
    cs: CS,
}

impl<DATA, CLK, CS> PinConnector<DATA, CLK, CS>
where DATA: OutputPin, CLK: OutputPin, CS: OutputPin,
{
    ///
    /// Takes over the pins and puts the bus in its idle state:
    /// chip-select high and clock low.
    ///
    /// # Arguments
    ///
    /// * `devices` - number of chips connected in series, clamped to `1..=8`
    /// * `data` - the DIN PIN previously set to Output mode
    /// * `clk` - the CLK PIN previously set to Output mode
    /// * `cs` - the LOAD/CS PIN previously set to Output mode
    ///
    /// # Errors
    ///
    /// * `Error` - returned in case there was an error setting a PIN on the device
    ///
    pub fn new(devices: usize, data: DATA, clk: CLK, cs: CS) -> Result<Self, Error> {
        let mut connector = PinConnector {
            devices: clamp_devices(devices),
            buffer: [0; MAX_DISPLAYS * 2],
            data,
            clk,
            cs,
        };

        connector.cs.set_high().map_err(Error::pin)?;
        connector.clk.set_low().map_err(Error::pin)?;

        Ok(connector)
    }

    /// Gives the pins back.
    pub fn release(self) -> (DATA, CLK, CS) {
        (self.data, self.clk, self.cs)
    }

    fn shift_out(&mut self, value: u8) -> Result<(), Error> {
        for i in 0..8 {
            if value & (1 << (7 - i)) > 0 {
                self.data.set_high().map_err(Error::pin)?;
            } else {
                self.data.set_low().map_err(Error::pin)?;
            }

            self.clk.set_high().map_err(Error::pin)?;
            self.clk.set_low().map_err(Error::pin)?;
        }

        Ok(())
    }
}

impl<DATA, CLK, CS> Connector for PinConnector<DATA, CLK, CS>
where DATA: OutputPin, CLK: OutputPin, CS: OutputPin,
{
    fn devices(&self) -> usize {
        self.devices
    }

    fn write_raw(&mut self, addr: usize, header: u8, data: u8) -> Result<(), Error> {
        let Some(max_bytes) = load_frame(&mut self.buffer, self.devices, addr, header, data) else {
            return Ok(());
        };

        self.cs.set_low().map_err(Error::pin)?;
        for b in 0..max_bytes {
            let value = self.buffer[b];
            self.shift_out(value)?;
        }
        self.cs.set_high().map_err(Error::pin)?;

        Ok(())
    }
}

/// Connection over a hardware SPI device, which drives chip-select itself.
pub struct SpiConnector<SPI>
where SPI: SpiDevice,
{
    devices: usize,
    buffer: [u8; MAX_DISPLAYS * 2],
    spi: SPI,
}

impl<SPI> SpiConnector<SPI>
where SPI: SpiDevice,
{
    /// `devices` is clamped to `1..=8`.
    pub fn new(devices: usize, spi: SPI) -> Self {
        SpiConnector {
            devices: clamp_devices(devices),
            buffer: [0; MAX_DISPLAYS * 2],
            spi,
        }
    }

    /// Gives the SPI device back.
    pub fn release(self) -> SPI {
        self.spi
    }
}

impl<SPI> Connector for SpiConnector<SPI>
where SPI: SpiDevice,
{
    fn devices(&self) -> usize {
        self.devices
    }

    fn write_raw(&mut self, addr: usize, header: u8, data: u8) -> Result<(), Error> {
        let Some(max_bytes) = load_frame(&mut self.buffer, self.devices, addr, header, data) else {
            return Ok(());
        };

        self.spi.write(&self.buffer[0..max_bytes]).map_err(Error::spi)
    }
}


#[cfg(test)]
mod tests {
    use super::wire::Wire;
    use super::*;
    use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction};

    #[test]
    fn new_idles_bus() {
        let (mut data, mut clk, mut cs) = Wire::idle().pins();
        let connector = PinConnector::new(1, data.clone(), clk.clone(), cs.clone()).unwrap();
        assert_eq!(connector.devices(), 1);

        data.done();
        clk.done();
        cs.done();
    }

    #[test]
    fn device_count_is_clamped() {
        let (mut data, mut clk, mut cs) = Wire::idle().pins();
        let connector = PinConnector::new(0, data.clone(), clk.clone(), cs.clone()).unwrap();
        assert_eq!(connector.devices(), 1);
        data.done();
        clk.done();
        cs.done();

        let mut spi = SpiMock::<u8>::new(&[]);
        assert_eq!(SpiConnector::new(12, spi.clone()).devices(), MAX_DISPLAYS);
        spi.done();
    }

    #[test]
    fn single_chip_frame_msb_first() {
        let mut wire = Wire::idle();
        wire.bytes(&[0x0A, 0b1010_0101]);
        let (mut data, mut clk, mut cs) = wire.pins();

        let mut connector = PinConnector::new(1, data.clone(), clk.clone(), cs.clone()).unwrap();
        connector.write_data(0, Command::Intensity, 0b1010_0101).unwrap();

        data.done();
        clk.done();
        cs.done();
    }

    #[test]
    fn chain_pads_with_noops_and_sends_furthest_chip_first() {
        let mut wire = Wire::idle();
        // chip 1 of 3: chip 2 frame, chip 1 frame, chip 0 frame
        wire.bytes(&[0x00, 0x00, 0x0C, 0x01, 0x00, 0x00]);
        wire.bytes(&[0x0B, 0x07, 0x00, 0x00, 0x00, 0x00]);
        let (mut data, mut clk, mut cs) = wire.pins();

        let mut connector = PinConnector::new(3, data.clone(), clk.clone(), cs.clone()).unwrap();
        connector.write_data(1, Command::Power, 0x01).unwrap();
        connector.write_data(2, Command::ScanLimit, 0x07).unwrap();

        data.done();
        clk.done();
        cs.done();
    }

    #[test]
    fn address_outside_chain_is_ignored() {
        let (mut data, mut clk, mut cs) = Wire::idle().pins();

        let mut connector = PinConnector::new(2, data.clone(), clk.clone(), cs.clone()).unwrap();
        connector.write_raw(2, 0x01, 0xFF).unwrap();

        data.done();
        clk.done();
        cs.done();
    }

    #[test]
    fn release_returns_pins() {
        let (mut data, mut clk, mut cs) = Wire::idle().pins();
        let connector = PinConnector::new(1, data.clone(), clk.clone(), cs.clone()).unwrap();
        let (_data, _clk, _cs) = connector.release();

        data.done();
        clk.done();
        cs.done();
    }

    #[test]
    fn spi_chain_frame() {
        let expected = [
            Transaction::transaction_start(),
            Transaction::write_vec(vec![0x00, 0x00, 0x03, 0b0001_1000]),
            Transaction::transaction_end(),
        ];
        let mut spi = SpiMock::new(&expected);

        let mut connector = SpiConnector::new(2, spi.clone());
        connector.write_data(0, Command::Digit2, 0b0001_1000).unwrap();
        connector.write_raw(5, 0x01, 0x01).unwrap();

        spi.done();
    }
}
