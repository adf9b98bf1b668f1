use core::fmt;

use embedded_hal::{digital, spi};

///
/// Error raised in case there was a PIN or bus interaction
/// error during communication with the MAX7219 chain.
///
/// Out-of-range addresses, rows and columns are not errors; the
/// driver ignores those calls.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Setting the data, clock or chip-select pin failed.
    Pin(digital::ErrorKind),
    /// The SPI device rejected the frame.
    Spi(spi::ErrorKind),
}

impl Error {
    pub(crate) fn pin<E: digital::Error>(err: E) -> Self {
        Error::Pin(err.kind())
    }

    pub(crate) fn spi<E: spi::Error>(err: E) -> Self {
        Error::Spi(err.kind())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Pin(kind) => write!(f, "pin error: {kind}"),
            Error::Spi(kind) => write!(f, "spi error: {kind}"),
        }
    }
}

impl core::error::Error for Error {}
