// TC(M)-P command definitions
//
// Every command is a fixed (instruction, p1, p2) triple plus a response
// contract. The contract decides whether the frame carries a trailing
// expected-response-length byte and how many bytes to read back.

/// How the controller answers a command
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseKind {
    /// No payload; read the two status bytes only. The frame carries no
    /// trailing length byte.
    Status,
    /// Fixed-length payload; the length goes on the wire as the trailing
    /// frame byte and `length + 2` bytes are read back.
    Fixed(u8),
    /// Zero-terminated string with no declared length. The trailing frame
    /// byte is sent as zero and a fixed over-read window is collected, then
    /// searched for the terminator.
    CString,
}

/// One supported controller operation
#[derive(Clone, Copy, Debug)]
pub struct Command {
    /// Instruction byte
    pub instruction: u8,
    /// First positional parameter
    pub p1: u8,
    /// Second positional parameter
    pub p2: u8,
    /// Response contract
    pub response: ResponseKind,
}

// Sensor info
pub const READ_TEMPERATURE: Command = Command {
    instruction: 0xE5,
    p1: 0x01,
    p2: 0x00,
    response: ResponseKind::Fixed(2),
};

// Hardware info
pub const GET_DEVICE_INFO: Command = Command {
    instruction: 0x30,
    p1: 0x01,
    p2: 0x01,
    response: ResponseKind::CString,
};
pub const GET_DEVICE_ID: Command = Command {
    instruction: 0x30,
    p1: 0x02,
    p2: 0x01,
    response: ResponseKind::Fixed(20),
};

// Firmware info
pub const GET_FIRMWARE_INFO: Command = Command {
    instruction: 0x31,
    p1: 0x01,
    p2: 0x01,
    response: ResponseKind::CString,
};
pub const GET_FIRMWARE_VERSION: Command = Command {
    instruction: 0x31,
    p1: 0x02,
    p2: 0x01,
    response: ResponseKind::Fixed(16),
};

// Image control
pub const UPLOAD_IMAGE: Command = Command {
    instruction: 0x20,
    p1: 0x01,
    p2: 0x00,
    response: ResponseKind::Status,
};
pub const RESET_POINTER: Command = Command {
    instruction: 0x20,
    p1: 0x0D,
    p2: 0x00,
    response: ResponseKind::Status,
};
pub const DISPLAY_UPDATE: Command = Command {
    instruction: 0x24,
    p1: 0x01,
    p2: 0x00,
    response: ResponseKind::Status,
};

/// Status code ending every successful response
pub const STATUS_OK: u16 = 0x9000;

/// Known non-success status codes
pub const STATUS_BAD_DATA_LENGTH: u16 = 0x6700;
pub const STATUS_BAD_REPLY_LENGTH: u16 = 0x6C00;
pub const STATUS_BAD_PARAMETER: u16 = 0x6A00;
pub const STATUS_UNSUPPORTED_COMMAND: u16 = 0x6D00;

/// Look up the meaning of a 16-bit status code
pub fn describe_status(code: u16) -> &'static str {
    match code {
        STATUS_OK => "Success",
        STATUS_BAD_DATA_LENGTH => "Incorrect value for data length",
        STATUS_BAD_REPLY_LENGTH => "Incorrect value for expected reply length",
        STATUS_BAD_PARAMETER => "Invalid P1 or P2 parameter",
        STATUS_UNSUPPORTED_COMMAND => "Unsupported command",
        _ => "Unknown error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_status_codes_have_descriptions() {
        assert_eq!(describe_status(0x9000), "Success");
        assert_eq!(describe_status(0x6700), "Incorrect value for data length");
        assert_eq!(
            describe_status(0x6C00),
            "Incorrect value for expected reply length"
        );
        assert_eq!(describe_status(0x6A00), "Invalid P1 or P2 parameter");
        assert_eq!(describe_status(0x6D00), "Unsupported command");
    }

    #[test]
    fn unknown_status_codes_fall_back() {
        assert_eq!(describe_status(0x1234), "Unknown error");
    }
}
