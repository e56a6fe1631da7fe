use std::time::Duration;

use crate::constants::{SCANNER_PID, SCANNER_VID};
use crate::devices::ScannerIdentifier;

/// Runtime settings. The defaults are the values the bridge is deployed with.
#[derive(Debug, Clone)]
pub struct Config {
    pub scanner: ScannerIdentifier,
    pub broker_host: String,
    pub broker_port: u16,
    /// Every completed scan is published here.
    pub topic: String,
    pub client_id: String,
    pub keep_alive: Duration,
    /// Delay between two enumerations while the scanner is absent.
    pub locate_retry_interval: Duration,
    /// How long a HID read may block before the read loop checks for a stop request.
    pub read_timeout_ms: i32,
    /// Pause before reconnecting to the broker. Zero reconnects immediately.
    pub reconnect_delay: Duration,
    /// How long the broker loop drives the network before looking at the scan queue again.
    pub poll_interval: Duration,
    /// Scans buffered while the broker is reconnecting.
    pub queue_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            scanner: ScannerIdentifier::new(SCANNER_VID, SCANNER_PID),
            broker_host: "atlas.hasi".to_string(),
            broker_port: 1883,
            topic: "hasi/code_scanner".to_string(),
            client_id: "code_scanner".to_string(),
            keep_alive: Duration::from_secs(120),
            locate_retry_interval: Duration::from_secs(1),
            read_timeout_ms: 500,
            reconnect_delay: Duration::ZERO,
            poll_interval: Duration::from_millis(50),
            queue_capacity: 64,
        }
    }
}
