//! Command protocol engine
//!
//! Builds the framed request for a [`Command`], transmits it, waits for the
//! busy line to clear, reads back the negotiated number of bytes and checks
//! the trailing 16-bit status code.
//!
//! ## Wire format
//!
//! Request: `[instruction][p1][p2][data_length][data 0..250][expected_response_length 0..1]`
//!
//! Response: `[payload][status_hi][status_lo]`, where `0x9000` means
//! success.
//!
//! The engine owns the transport exclusively; interleaving frames from two
//! execution contexts would corrupt the protocol, so share a
//! [`Protocol`] (or the [`Tcmp`](crate::Tcmp) driver around it) under
//! mutual exclusion if it must be reached from more than one.

use embedded_hal::delay::DelayNs;
use log::{debug, warn};

use crate::command::{Command, ResponseKind, STATUS_OK, describe_status};
use crate::error::{Error, ProtocolError};
use crate::interface::TconInterface;

/// Protocol ceiling on the data field of one frame
pub const MAX_DATA_LEN: usize = 250;

/// Over-read window for string responses. The controller declares no length
/// for these, and the response is lost if it is collected in more than one
/// read, so a window guaranteed to contain the terminator is read in one go
/// and searched afterwards.
pub const STRING_WINDOW: usize = 100;

const MAX_FRAME_LEN: usize = 4 + MAX_DATA_LEN + 1;
// Largest fixed response (255) plus the status bytes; also covers the
// string window read of STRING_WINDOW + 2.
const MAX_RESPONSE_LEN: usize = 255 + 2;

/// Poll interval for the busy line
const BUSY_POLL_MS: u32 = 10;
/// Wait ceiling before giving up on a stuck busy line. A full panel refresh
/// takes a few seconds; anything near this long is a hang.
const BUSY_TIMEOUT_MS: u32 = 30_000;

/// Command protocol engine
///
/// Owns the transport and a response scratch buffer. All controller
/// traffic goes through [`execute`](Protocol::execute).
pub struct Protocol<I> {
    interface: I,
    response: [u8; MAX_RESPONSE_LEN],
}

impl<I> Protocol<I>
where
    I: TconInterface,
{
    /// Create a new engine owning the given transport
    pub fn new(interface: I) -> Self {
        Self {
            interface,
            response: [0; MAX_RESPONSE_LEN],
        }
    }

    /// Release the underlying transport
    pub fn release(self) -> I {
        self.interface
    }

    /// Send one command with optional data and return the response payload
    ///
    /// Blocks between transmit and read until the controller deasserts the
    /// busy line, polling every 10 ms. The returned slice borrows the
    /// engine's scratch buffer and is only valid until the next call.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `data` exceeds 250 bytes (nothing is
    ///   sent on the wire)
    /// - [`Error::Timeout`] if the busy line never clears
    /// - [`Error::Protocol`] if a string response has no terminator or the
    ///   status bytes fall outside the read window
    /// - [`Error::Device`] if the status code is not `0x9000`
    pub fn execute<D: DelayNs>(
        &mut self,
        command: &Command,
        data: &[u8],
        delay: &mut D,
    ) -> Result<&[u8], Error<I::Error>> {
        if data.len() > MAX_DATA_LEN {
            return Err(Error::InvalidArgument("command data exceeds 250 bytes"));
        }

        let mut frame = [0u8; MAX_FRAME_LEN];
        frame[0] = command.instruction;
        frame[1] = command.p1;
        frame[2] = command.p2;
        frame[3] = data.len() as u8;
        frame[4..4 + data.len()].copy_from_slice(data);
        let mut frame_len = 4 + data.len();

        let read_len = match command.response {
            ResponseKind::Status => 2,
            ResponseKind::Fixed(len) => {
                frame[frame_len] = len;
                frame_len += 1;
                len as usize + 2
            }
            ResponseKind::CString => {
                // Sent as a declared length of zero; the real read length
                // is the over-read window.
                frame[frame_len] = 0;
                frame_len += 1;
                STRING_WINDOW + 2
            }
        };

        debug!("SEND: {:02X?}", &frame[..frame_len]);
        self.interface
            .write(&frame[..frame_len])
            .map_err(Error::Interface)?;

        self.busy_wait(delay)?;

        let response = &mut self.response[..read_len];
        self.interface.read(response).map_err(Error::Interface)?;
        debug!("RCVD: {:02X?}", &response[..]);

        let (payload, status) = match command.response {
            ResponseKind::CString => {
                let terminator = response
                    .iter()
                    .position(|&b| b == 0)
                    .ok_or(ProtocolError::NoTerminator)?;
                if terminator + 2 >= read_len {
                    return Err(ProtocolError::Truncated.into());
                }
                let status =
                    u16::from(response[terminator + 1]) << 8 | u16::from(response[terminator + 2]);
                (&response[..terminator], status)
            }
            _ => {
                let (payload, status) = response.split_at(read_len - 2);
                (payload, u16::from(status[0]) << 8 | u16::from(status[1]))
            }
        };

        if status != STATUS_OK {
            let description = describe_status(status);
            warn!(
                "command 0x{:02X} returned failure code 0x{status:04X} - {description}",
                command.instruction
            );
            return Err(Error::Device {
                code: status,
                description,
            });
        }

        Ok(payload)
    }

    /// Block until the controller deasserts the busy line
    fn busy_wait<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), Error<I::Error>> {
        let mut waited_ms = 0u32;
        while self.interface.is_busy().map_err(Error::Interface)? {
            if waited_ms >= BUSY_TIMEOUT_MS {
                return Err(Error::Timeout);
            }
            delay.delay_ms(BUSY_POLL_MS);
            waited_ms += BUSY_POLL_MS;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{DISPLAY_UPDATE, GET_DEVICE_INFO, READ_TEMPERATURE, UPLOAD_IMAGE};
    use crate::mock::{MockInterface, NoDelay, string_response};

    use std::vec;

    #[test]
    fn fixed_response_frame_carries_length_byte() {
        let mut bus = MockInterface::new();
        bus.queue_response(&[0x00, 0x32, 0x90, 0x00]);
        let mut protocol = Protocol::new(bus);

        let payload = protocol
            .execute(&READ_TEMPERATURE, &[], &mut NoDelay)
            .unwrap();
        assert_eq!(payload, &[0x00, 0x32]);

        let bus = protocol.release();
        assert_eq!(bus.writes, vec![vec![0xE5, 0x01, 0x00, 0x00, 0x02]]);
    }

    #[test]
    fn status_only_frame_has_no_length_byte() {
        let mut bus = MockInterface::new();
        bus.queue_response(&[0x90, 0x00]);
        let mut protocol = Protocol::new(bus);

        let payload = protocol
            .execute(&UPLOAD_IMAGE, &[0xAA, 0xBB, 0xCC], &mut NoDelay)
            .unwrap();
        assert!(payload.is_empty());

        let bus = protocol.release();
        assert_eq!(
            bus.writes,
            vec![vec![0x20, 0x01, 0x00, 0x03, 0xAA, 0xBB, 0xCC]]
        );
    }

    #[test]
    fn oversized_data_is_rejected_before_transmit() {
        let mut protocol = Protocol::new(MockInterface::new());
        let data = [0u8; 251];

        let err = protocol
            .execute(&UPLOAD_IMAGE, &data, &mut NoDelay)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(protocol.release().writes.is_empty());
    }

    #[test]
    fn string_response_is_trimmed_at_terminator() {
        let mut bus = MockInterface::new();
        bus.queue_response(&string_response("MpicoSys TC-P441-230_v1.0"));
        let mut protocol = Protocol::new(bus);

        let payload = protocol
            .execute(&GET_DEVICE_INFO, &[], &mut NoDelay)
            .unwrap();
        assert_eq!(payload, b"MpicoSys TC-P441-230_v1.0");

        // String commands still put a zero expected-length byte on the wire.
        let bus = protocol.release();
        assert_eq!(bus.writes, vec![vec![0x30, 0x01, 0x01, 0x00, 0x00]]);
    }

    #[test]
    fn string_response_without_terminator_fails() {
        let mut bus = MockInterface::new();
        bus.queue_response(&[0xFF; STRING_WINDOW + 2]);
        let mut protocol = Protocol::new(bus);

        let err = protocol
            .execute(&GET_DEVICE_INFO, &[], &mut NoDelay)
            .unwrap_err();
        assert_eq!(err, Error::Protocol(ProtocolError::NoTerminator));
    }

    #[test]
    fn late_terminator_pushes_status_outside_window() {
        // Terminator in the second-to-last slot: only one byte follows, so
        // the status pair cannot fit.
        let mut window = [0xFFu8; STRING_WINDOW + 2];
        window[STRING_WINDOW] = 0;
        let mut bus = MockInterface::new();
        bus.queue_response(&window);
        let mut protocol = Protocol::new(bus);

        let err = protocol
            .execute(&GET_DEVICE_INFO, &[], &mut NoDelay)
            .unwrap_err();
        assert_eq!(err, Error::Protocol(ProtocolError::Truncated));
    }

    #[test]
    fn non_success_status_maps_to_device_error() {
        let mut bus = MockInterface::new();
        bus.queue_response(&[0x6A, 0x00]);
        let mut protocol = Protocol::new(bus);

        let err = protocol
            .execute(&DISPLAY_UPDATE, &[], &mut NoDelay)
            .unwrap_err();
        assert_eq!(
            err,
            Error::Device {
                code: 0x6A00,
                description: "Invalid P1 or P2 parameter",
            }
        );
    }

    #[test]
    fn unknown_status_gets_fallback_description() {
        let mut bus = MockInterface::new();
        bus.queue_response(&[0xDE, 0xAD]);
        let mut protocol = Protocol::new(bus);

        let err = protocol
            .execute(&DISPLAY_UPDATE, &[], &mut NoDelay)
            .unwrap_err();
        assert_eq!(
            err,
            Error::Device {
                code: 0xDEAD,
                description: "Unknown error",
            }
        );
    }

    #[test]
    fn read_waits_for_busy_line_to_clear() {
        let mut bus = MockInterface::new();
        bus.busy_polls = 5;
        bus.queue_response(&[0x90, 0x00]);
        let mut protocol = Protocol::new(bus);

        protocol
            .execute(&DISPLAY_UPDATE, &[], &mut NoDelay)
            .unwrap();
        assert_eq!(protocol.release().busy_polls, 0);
    }

    #[test]
    fn stuck_busy_line_times_out() {
        let mut bus = MockInterface::new();
        bus.busy_polls = u32::MAX;
        bus.queue_response(&[0x90, 0x00]);
        let mut protocol = Protocol::new(bus);

        let err = protocol
            .execute(&DISPLAY_UPDATE, &[], &mut NoDelay)
            .unwrap_err();
        assert_eq!(err, Error::Timeout);
    }
}
