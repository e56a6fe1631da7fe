use std::time::Duration;

use tracing::{debug, error, info, trace, warn};

use crate::assembler::ScanAssembler;
use crate::broker::Publisher;
use crate::config::Config;
use crate::constants::REPORT_BUFFER_SIZE;
use crate::devices::ScannerIdentifier;
use crate::error::DeviceError;
use crate::keycode::{keycode_of, translate};
use crate::locator::{locate, HidBackend, ReportSource};
use crate::supervisor::StopToken;

/// Reads scans from the code scanner and hands them to the broker session.
#[derive(Debug)]
pub struct ScannerServer {
    device_identifier: ScannerIdentifier,
    topic: String,
    retry_interval: Duration,
    read_timeout_ms: i32,
    publisher: Publisher,
    stop: StopToken,
}

impl ScannerServer {
    #[tracing::instrument(skip(config, publisher, stop))]
    pub fn new(config: &Config, publisher: Publisher, stop: StopToken) -> Self {
        info!(
            "Creating new code scanner server for device: {}",
            config.scanner
        );

        ScannerServer {
            device_identifier: config.scanner,
            topic: config.topic.clone(),
            retry_interval: config.locate_retry_interval,
            read_timeout_ms: config.read_timeout_ms,
            publisher,
            stop,
        }
    }

    /// Locates the scanner and reads from it until stopped. Every device error starts over with
    /// a fresh locate and an empty scan buffer.
    #[tracing::instrument(skip(self, backend))]
    pub fn start<B: HidBackend>(&self, backend: &mut B) {
        info!("Starting server.");

        while let Some(device) = locate(
            backend,
            self.device_identifier,
            self.retry_interval,
            &self.stop,
        ) {
            match self.serve(device) {
                Ok(()) => break,
                Err(e) => error!("{}. Relocating {}.", e, self.device_identifier),
            }
        }

        info!("Server stopped.");
    }

    fn serve<D: ReportSource>(&self, mut device: D) -> Result<(), DeviceError> {
        let mut assembler = ScanAssembler::new();
        let mut buf = [0u8; REPORT_BUFFER_SIZE];

        info!("Entering read loop.");

        while !self.stop.is_stopped() {
            let read_len = match device.read_report(&mut buf, self.read_timeout_ms) {
                Ok(read_len) => read_len,
                Err(e) => {
                    if !assembler.is_empty() {
                        debug!("Discarding partial scan {:?}.", assembler.pending());
                    }
                    return Err(e);
                }
            };

            if read_len == 0 {
                continue;
            }

            let report = &buf[..read_len];
            trace!("Received {} bytes: {:02x?}", report.len(), report);

            let code = match keycode_of(report) {
                Some(code) => code,
                None => continue,
            };

            if let Some(scan) = assembler.feed(translate(code)) {
                info!("Scanned {}", scan);

                if let Err(e) = self.publisher.publish(&self.topic, scan) {
                    warn!("Scan was not queued for publishing: {}", e);
                }
            }
        }

        Ok(())
    }
}
