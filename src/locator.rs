use std::thread::sleep;
use std::time::Duration;

use hidapi::{HidApi, HidDevice};
use tracing::{debug, error, info};

use crate::constants::ENUMERATION_FAILURES_BEFORE_RESET;
use crate::devices::{DeviceEntry, ScannerIdentifier};
use crate::error::DeviceError;
use crate::supervisor::StopToken;
use crate::tools::get_full_device_name;

/// An open device that yields raw input reports.
pub trait ReportSource {
    /// Reads one report into `buf`. Returns `Ok(0)` when nothing arrived within `timeout_ms`.
    fn read_report(&mut self, buf: &mut [u8], timeout_ms: i32) -> Result<usize, DeviceError>;
}

/// Access to the host's HID devices.
pub trait HidBackend {
    type Device: ReportSource;

    /// Lists the currently attached devices.
    fn enumerate(&mut self) -> Result<Vec<DeviceEntry>, DeviceError>;

    fn open(&mut self, entry: &DeviceEntry) -> Result<Self::Device, DeviceError>;

    /// Throws away cached host state after enumeration kept failing.
    fn reset(&mut self) {}
}

/// [`HidBackend`] on top of hidapi.
pub struct HidApiBackend {
    /// `None` after a reset, until the next enumeration initializes a fresh context.
    api: Option<HidApi>,
}

/// Initializes the hidapi.
/// Will also initialize the currently available device list.
#[tracing::instrument]
fn initialize_hidapi() -> Result<HidApi, DeviceError> {
    debug!("Initializing the hidapi.");
    HidApi::new().map_err(|e| DeviceError::Api(e.to_string()))
}

impl HidApiBackend {
    pub fn new() -> Result<Self, DeviceError> {
        Ok(HidApiBackend {
            api: Some(initialize_hidapi()?),
        })
    }

    fn api(&mut self) -> Result<&mut HidApi, DeviceError> {
        if self.api.is_none() {
            self.api = Some(initialize_hidapi()?);
        }
        self.api
            .as_mut()
            .ok_or_else(|| DeviceError::Api("hidapi is not initialized".to_string()))
    }

    /// Keeps trying to initialize the hidapi until it succeeds or `stop` is triggered.
    pub fn initialize(retry_interval: Duration, stop: &StopToken) -> Option<Self> {
        while !stop.is_stopped() {
            match Self::new() {
                Ok(backend) => return Some(backend),
                Err(e) => {
                    error!("Failed to initialize hidapi: {}. Retrying in {:?}.", e, retry_interval);
                    sleep(retry_interval);
                }
            }
        }
        None
    }
}

impl HidBackend for HidApiBackend {
    type Device = HidDevice;

    fn enumerate(&mut self) -> Result<Vec<DeviceEntry>, DeviceError> {
        let api = self.api()?;
        api.refresh_devices()
            .map_err(|e| DeviceError::Api(e.to_string()))?;

        Ok(api
            .device_list()
            .map(|info| DeviceEntry {
                vendor_id: info.vendor_id(),
                product_id: info.product_id(),
                path: info.path().to_owned(),
            })
            .collect())
    }

    fn open(&mut self, entry: &DeviceEntry) -> Result<HidDevice, DeviceError> {
        let device = self
            .api()?
            .open_path(&entry.path)
            .map_err(|e| DeviceError::OpenFailed(format!("{:?}: {}", entry.path, e)))?;

        info!("Device name: {}.", get_full_device_name(&device));

        Ok(device)
    }

    fn reset(&mut self) {
        // Dropped before the replacement is created.
        self.api = None;
    }
}

impl ReportSource for HidDevice {
    fn read_report(&mut self, buf: &mut [u8], timeout_ms: i32) -> Result<usize, DeviceError> {
        self.read_timeout(buf, timeout_ms)
            .map_err(|e| DeviceError::ReadFailed(e.to_string()))
    }
}

/// Blocks until a device matching `identifier` is attached and could be opened.
///
/// Enumeration is repeated every `retry_interval`. The first match in enumeration order wins.
/// The backend is reset after [`ENUMERATION_FAILURES_BEFORE_RESET`] failed enumerations in a row.
/// Returns `None` only once `stop` has been triggered.
#[tracing::instrument(skip(backend, stop))]
pub fn locate<B: HidBackend>(
    backend: &mut B,
    identifier: ScannerIdentifier,
    retry_interval: Duration,
    stop: &StopToken,
) -> Option<B::Device> {
    info!("Looking for {}...", identifier);

    let mut num_enumeration_errors = 0;

    while !stop.is_stopped() {
        match backend.enumerate() {
            Ok(entries) => {
                num_enumeration_errors = 0;

                match entries.iter().find(|entry| identifier.matches(entry)) {
                    Some(entry) => match backend.open(entry) {
                        Ok(device) => {
                            info!("Connected to {}", identifier);
                            return Some(device);
                        }
                        Err(e) => error!("Error connecting to device: {}", e),
                    },
                    None => debug!("Device {} not connected.", identifier),
                }
            }
            Err(e) => {
                error!("Failed to enumerate HID devices: {}", e);

                num_enumeration_errors += 1;

                if num_enumeration_errors >= ENUMERATION_FAILURES_BEFORE_RESET {
                    debug!(
                        "Failed to enumerate {} times in a row. Resetting the HID backend.",
                        num_enumeration_errors
                    );
                    backend.reset();
                    num_enumeration_errors = 0;
                }
            }
        }

        sleep(retry_interval);
    }

    None
}
