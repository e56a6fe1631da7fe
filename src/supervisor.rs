use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use tracing::{error, info};

use crate::broker::{publication_queue, BrokerConnector, BrokerSession, MqttConnector};
use crate::config::Config;
use crate::locator::{HidApiBackend, HidBackend};
use crate::server::ScannerServer;

/// Shared flag asking both sessions to wind down.
#[derive(Debug, Clone, Default)]
pub struct StopToken(Arc<AtomicBool>);

impl StopToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runs the scanner side and the broker side on their own threads.
///
/// The two sides only share the bounded scan queue, so a stalled broker never blocks the
/// scanner and an unplugged scanner never touches the broker connection.
#[derive(Debug)]
pub struct Supervisor {
    config: Config,
    stop: StopToken,
}

impl Supervisor {
    pub fn new(config: Config) -> Self {
        Supervisor {
            config,
            stop: StopToken::new(),
        }
    }

    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    /// Runs against the real HID devices and MQTT broker until stopped.
    pub fn run(&self) -> io::Result<()> {
        let retry_interval = self.config.locate_retry_interval;
        let stop = self.stop.clone();

        self.run_with(
            move || HidApiBackend::initialize(retry_interval, &stop),
            MqttConnector::new(&self.config),
        )
    }

    /// Runs with the given collaborators. `backend` is called on the scanner thread, so the HID
    /// backend itself does not have to be `Send`.
    #[tracing::instrument(skip_all)]
    pub fn run_with<B, F, C>(&self, backend: F, mut connector: C) -> io::Result<()>
    where
        B: HidBackend,
        F: FnOnce() -> Option<B> + Send + 'static,
        C: BrokerConnector + Send + 'static,
    {
        let (publisher, queue) = publication_queue(self.config.queue_capacity);

        let mut session = BrokerSession::new(&self.config, queue, self.stop.clone());
        let broker = thread::Builder::new()
            .name("broker".to_string())
            .spawn(move || session.run(&mut connector))?;

        let server = ScannerServer::new(&self.config, publisher, self.stop.clone());
        let scanner = thread::Builder::new()
            .name("scanner".to_string())
            .spawn(move || {
                if let Some(mut backend) = backend() {
                    server.start(&mut backend);
                }
            });

        let scanner = match scanner {
            Ok(handle) => handle,
            Err(e) => {
                self.stop.stop();
                let _ = broker.join();
                return Err(e);
            }
        };

        info!("Supervisor running.");

        if scanner.join().is_err() {
            error!("Scanner thread panicked.");
        }
        if broker.join().is_err() {
            error!("Broker thread panicked.");
        }

        Ok(())
    }
}
