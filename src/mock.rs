//! Scripted transport for engine and driver tests

use core::convert::Infallible;

use std::collections::VecDeque;
use std::vec::Vec;

use crate::interface::TconInterface;
use crate::protocol::STRING_WINDOW;

/// Transport double that records frames and serves queued responses
pub struct MockInterface {
    /// Every frame written, in order
    pub writes: Vec<Vec<u8>>,
    /// Queued responses; each read pops the front and must match the
    /// requested length exactly
    pub reads: VecDeque<Vec<u8>>,
    /// Number of busy polls to report as busy before the line clears
    pub busy_polls: u32,
}

impl MockInterface {
    pub fn new() -> Self {
        Self {
            writes: Vec::new(),
            reads: VecDeque::new(),
            busy_polls: 0,
        }
    }

    pub fn queue_response(&mut self, bytes: &[u8]) {
        self.reads.push_back(bytes.to_vec());
    }

    /// Queue a bare success status (commands with no payload)
    pub fn queue_ok(&mut self) {
        self.queue_response(&[0x90, 0x00]);
    }
}

impl TconInterface for MockInterface {
    type Error = Infallible;

    fn write(&mut self, frame: &[u8]) -> Result<(), Self::Error> {
        self.writes.push(frame.to_vec());
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error> {
        let response = self.reads.pop_front().expect("unexpected read");
        assert_eq!(response.len(), buf.len(), "read length mismatch");
        buf.copy_from_slice(&response);
        Ok(())
    }

    fn is_busy(&mut self) -> Result<bool, Self::Error> {
        if self.busy_polls > 0 {
            self.busy_polls -= 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// Delay double that returns immediately
pub struct NoDelay;

impl embedded_hal::delay::DelayNs for NoDelay {
    fn delay_ns(&mut self, _ns: u32) {}
}

/// Build a full string-response window: the text, a zero terminator, a
/// success status, then filler up to the over-read length
pub fn string_response(text: &str) -> Vec<u8> {
    let mut window = Vec::with_capacity(STRING_WINDOW + 2);
    window.extend_from_slice(text.as_bytes());
    window.push(0);
    window.extend_from_slice(&[0x90, 0x00]);
    window.resize(STRING_WINDOW + 2, 0xFF);
    window
}
