/// Vendor ID of the code scanner.
pub static SCANNER_VID: u16 = 0x05e0;

/// Product ID of the code scanner.
pub static SCANNER_PID: u16 = 0x0200;

/// Byte offset of the keycode inside a keyboard input report.
pub const KEYCODE_INDEX: usize = 2;

/// Large enough for any keyboard report the scanner emits.
pub const REPORT_BUFFER_SIZE: usize = 64;

/// Capacity of the MQTT client's own request channel.
pub const CLIENT_REQUEST_CAPACITY: usize = 16;

/// Failed enumerations in a row after which the hidapi context is rebuilt.
pub const ENUMERATION_FAILURES_BEFORE_RESET: u32 = 3;
