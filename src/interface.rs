//! Hardware interface abstraction
//!
//! This module provides the [`TconInterface`] trait and the [`Interface`]
//! struct for talking to a TC(M)-P timing controller over SPI.
//!
//! ## Hardware Requirements
//!
//! The controller sits directly on the SPI bus:
//! - SPI in mode 3 (CPOL=1, CPHA=1), MSB first, up to 3 MHz. 200 kHz is a
//!   safe default with long wiring.
//! - **BUSY**: busy status line (input, active **low** - the controller
//!   holds the line low while it cannot accept bus traffic).
//!
//! There is no data/command pin; commands and data travel in the same
//! framed transaction. Bus mode and speed are configured on the platform's
//! `SpiDevice`, not here.

use core::fmt::Debug;
use embedded_hal::digital::InputPin;
use embedded_hal::spi::SpiDevice;

/// Trait for the transport under the command protocol
///
/// This abstracts over different hardware implementations, allowing the
/// [`Tcmp`](crate::Tcmp) driver to work with any SPI + GPIO implementation
/// that satisfies embedded-hal traits. The driver issues a full frame with
/// a single [`write`](TconInterface::write), waits for the busy line via
/// [`is_busy`](TconInterface::is_busy), then collects the whole response
/// with a single [`read`](TconInterface::read); the controller loses the
/// response if it is read in more than one bus transaction.
pub trait TconInterface {
    /// Error type for transport operations
    type Error: Debug;

    /// Transmit one complete command frame
    fn write(&mut self, frame: &[u8]) -> Result<(), Self::Error>;

    /// Read exactly `buf.len()` response bytes in one transaction
    fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Sample the busy line; `true` means the controller cannot accept
    /// bus traffic yet
    fn is_busy(&mut self) -> Result<bool, Self::Error>;
}

/// Errors that can occur at the transport level
///
/// Generic over SPI and GPIO error types.
#[derive(Debug, PartialEq, Eq)]
pub enum InterfaceError<SpiErr, PinErr> {
    /// SPI communication error
    Spi(SpiErr),
    /// GPIO pin error
    Pin(PinErr),
}

impl<SpiErr: Debug, PinErr: Debug> core::fmt::Display for InterfaceError<SpiErr, PinErr> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            InterfaceError::Spi(e) => write!(f, "SPI error: {e:?}"),
            InterfaceError::Pin(e) => write!(f, "Pin error: {e:?}"),
        }
    }
}

impl<SpiErr: Debug, PinErr: Debug> core::error::Error for InterfaceError<SpiErr, PinErr> {}

/// Transport implementation for embedded-hal v1.0 SPI and GPIO
///
/// ## Type Parameters
///
/// * `SPI` - SPI device implementing [`SpiDevice`]
/// * `BUSY` - busy pin implementing [`InputPin`]
///
/// ## Example
///
/// ```rust,ignore
/// use tcmp::Interface;
///
/// // SPI must be configured for mode 3, MSB first.
/// let interface = Interface::new(spi_device, busy_pin);
/// ```
pub struct Interface<SPI, BUSY> {
    /// SPI device for communication
    spi: SPI,
    /// Busy pin (input, active low)
    busy: BUSY,
}

impl<SPI, BUSY> Interface<SPI, BUSY>
where
    SPI: SpiDevice,
    BUSY: InputPin,
{
    /// Create a new Interface from an SPI device and the busy pin
    pub fn new(spi: SPI, busy: BUSY) -> Self {
        Self { spi, busy }
    }

    /// Release the underlying SPI device and busy pin
    pub fn release(self) -> (SPI, BUSY) {
        (self.spi, self.busy)
    }
}

impl<SPI, BUSY> TconInterface for Interface<SPI, BUSY>
where
    SPI: SpiDevice,
    SPI::Error: Debug,
    BUSY: InputPin,
    BUSY::Error: Debug,
{
    type Error = InterfaceError<SPI::Error, BUSY::Error>;

    fn write(&mut self, frame: &[u8]) -> Result<(), Self::Error> {
        self.spi.write(frame).map_err(InterfaceError::Spi)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        self.spi.read(buf).map_err(InterfaceError::Spi)
    }

    fn is_busy(&mut self) -> Result<bool, Self::Error> {
        // Busy is active low
        self.busy.is_low().map_err(InterfaceError::Pin)
    }
}
