use std::ffi::CString;

use derive_more::Display;

/// Identifier of the scanner this application serves: a vendor ID (vid) and a product ID (pid).
#[derive(Debug, Display, Eq, PartialEq, Clone, Copy)]
#[display(fmt = "VidPid {{ vid: {:04x?}, pid: {:04x?} }}", vid, pid)]
pub struct ScannerIdentifier {
    pub vid: u16,
    pub pid: u16,
}

impl ScannerIdentifier {
    pub fn new(vid: u16, pid: u16) -> Self {
        ScannerIdentifier { vid, pid }
    }

    /// Exact vendor and product match.
    pub fn matches(&self, entry: &DeviceEntry) -> bool {
        entry.vendor_id == self.vid && entry.product_id == self.pid
    }
}

/// One enumerated HID device.
#[derive(Debug, Eq, PartialEq, Clone)]
pub struct DeviceEntry {
    pub vendor_id: u16,
    pub product_id: u16,
    pub path: CString,
}
