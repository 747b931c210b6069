//! Error types for the driver
//!
//! The main [`Error`] enum is generic over the transport error type so that
//! callers can match on the underlying SPI/GPIO failure. Response-shape
//! problems get their own [`ProtocolError`] so that a garbled string
//! response can be told apart from a controller that answered with a
//! non-success status code.

use core::fmt::Debug;

/// Frame or response shape violated the wire protocol
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProtocolError {
    /// No zero terminator found inside the string read window
    NoTerminator,
    /// The terminator sits so late in the window that the two status bytes
    /// fall outside of it
    Truncated,
    /// A string response contained bytes that are not valid text
    NotAscii,
}

impl core::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ProtocolError::NoTerminator => {
                write!(f, "no zero terminator in string response")
            }
            ProtocolError::Truncated => write!(f, "string response truncated"),
            ProtocolError::NotAscii => write!(f, "string response is not valid text"),
        }
    }
}

/// Errors that can occur when interacting with the controller
///
/// Generic over the transport error type `E` from the
/// [`TconInterface`](crate::interface::TconInterface) implementation.
#[derive(Debug, PartialEq, Eq)]
pub enum Error<E> {
    /// Transport error (SPI/GPIO)
    Interface(E),
    /// Caller violated a size or format precondition; nothing was sent on
    /// the wire
    InvalidArgument(&'static str),
    /// Response did not match the expected shape
    Protocol(ProtocolError),
    /// Controller answered with a non-success status code
    Device {
        /// The 16-bit status code from the end of the response
        code: u16,
        /// Human-readable meaning of the code
        description: &'static str,
    },
    /// Model or pixel format is known but intentionally not implemented
    Unsupported(&'static str),
    /// The device identity string did not match any registered model
    UnknownModel,
    /// Display operation attempted before a successful [`begin`](crate::Tcmp::begin)
    NotReady,
    /// Bitmap dimensions do not match the detected panel
    DimensionMismatch {
        /// Panel dimensions (width, height)
        expected: (u16, u16),
        /// Bitmap dimensions (width, height)
        actual: (u16, u16),
    },
    /// Bitmap is not one bit per pixel
    InvalidFormat {
        /// Declared bit depth of the rejected bitmap
        bit_depth: u8,
    },
    /// The backing buffer is smaller than the detected panel requires
    BufferTooSmall {
        /// Required buffer size in bytes
        required: usize,
        /// Provided buffer size in bytes
        provided: usize,
    },
    /// Busy line stayed asserted past the wait ceiling
    Timeout,
}

impl<E> From<ProtocolError> for Error<E> {
    fn from(e: ProtocolError) -> Self {
        Error::Protocol(e)
    }
}

impl<E: Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Interface(e) => write!(f, "Transport error: {e:?}"),
            Error::InvalidArgument(what) => write!(f, "Invalid argument: {what}"),
            Error::Protocol(e) => write!(f, "Protocol error: {e}"),
            Error::Device { code, description } => {
                write!(f, "Command returned failure code 0x{code:04X} - {description}")
            }
            Error::Unsupported(what) => write!(f, "Unsupported: {what}"),
            Error::UnknownModel => write!(f, "Device identity matches no known model"),
            Error::NotReady => write!(f, "Driver not initialised"),
            Error::DimensionMismatch { expected, actual } => write!(
                f,
                "Bitmap dimensions must match the display ({}x{}; bitmap was {}x{})",
                expected.0, expected.1, actual.0, actual.1
            ),
            Error::InvalidFormat { bit_depth } => {
                write!(f, "Bitmap must be one bit per pixel (was {bit_depth}-bit)")
            }
            Error::BufferTooSmall { required, provided } => write!(
                f,
                "Buffer too small: required {required} bytes, provided {provided}"
            ),
            Error::Timeout => write!(f, "Timeout waiting for busy line"),
        }
    }
}

impl<E: Debug> core::error::Error for Error<E> {}
