use tracing::{error, info};

use scanner_mqtt::config::Config;
use scanner_mqtt::supervisor::Supervisor;
use scanner_mqtt::tools;

#[tracing::instrument]
fn main() {
    tools::initialize_logging();
    info!("Starting code scanner bridge.");

    let supervisor = Supervisor::new(Config::default());

    if let Err(e) = supervisor.run() {
        error!("Failed to start worker threads: {}", e);
        std::process::exit(1);
    }
}
