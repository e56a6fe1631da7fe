use hidapi::HidDevice;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initializes the global logging facility.
///
/// If `RUST_LOG` is not set, the global default logging level is `info`,
/// and for `scanner_mqtt` it is `debug`.
///
/// Log messages are formatted and printed to standard output by `tracing_subscriber::FmtSubscriber`.
///
/// # Panics
///
/// Panics if the initialization was unsuccessful, likely because a global subscriber was already
/// installed by another call to try_init.
pub fn initialize_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,scanner_mqtt=debug"));

    FmtSubscriber::builder().with_env_filter(filter).init();
}

/// Get a formatted string composed of manufacturer string and product string.
pub fn get_full_device_name(device: &HidDevice) -> String {
    format!(
        "{} {}",
        match device.get_manufacturer_string() {
            Ok(m) => m.unwrap_or_else(|| "NA".to_string()),
            Err(e) => format!("{:?}", e),
        },
        match device.get_product_string() {
            Ok(p) => p.unwrap_or_else(|| "NA".to_string()),
            Err(e) => format!("{:?}", e),
        },
    )
}
