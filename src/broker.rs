use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TryRecvError, TrySendError};
use std::thread::sleep;
use std::time::Duration;

use rumqttc::{
    Client, ClientError, Connection, Event, MqttOptions, Outgoing, Packet, QoS, RecvTimeoutError,
};
use tracing::{debug, error, info};

use crate::config::Config;
use crate::constants::CLIENT_REQUEST_CAPACITY;
use crate::error::BrokerError;
use crate::supervisor::StopToken;

/// A scan waiting to be sent.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Publication {
    pub topic: String,
    pub payload: String,
}

/// Sending half of the scan queue. Never blocks.
#[derive(Debug, Clone)]
pub struct Publisher {
    sender: SyncSender<Publication>,
}

impl Publisher {
    /// Queues `payload` for publishing on `topic`.
    ///
    /// Fails with [`BrokerError::QueueFull`] while the broker has been unreachable for long
    /// enough to fill the queue; the scan is dropped in that case.
    pub fn publish(&self, topic: &str, payload: String) -> Result<(), BrokerError> {
        let publication = Publication {
            topic: topic.to_string(),
            payload,
        };

        self.sender.try_send(publication).map_err(|e| match e {
            TrySendError::Full(_) => BrokerError::QueueFull,
            TrySendError::Disconnected(_) => BrokerError::SessionClosed,
        })
    }
}

/// Receiving half of the scan queue, owned by the [`BrokerSession`].
#[derive(Debug)]
pub struct PublicationQueue {
    receiver: Receiver<Publication>,
}

impl PublicationQueue {
    pub(crate) fn try_next(&self) -> Option<Publication> {
        match self.receiver.try_recv() {
            Ok(publication) => Some(publication),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

/// Creates a bounded scan queue holding at most `capacity` scans.
pub fn publication_queue(capacity: usize) -> (Publisher, PublicationQueue) {
    let (sender, receiver) = sync_channel(capacity);
    (Publisher { sender }, PublicationQueue { receiver })
}

/// One live broker connection.
pub trait BrokerLink {
    /// Hands a publication to the transport without waiting for it to go out.
    ///
    /// [`BrokerError::ClientBusy`] means the transport cannot take more until it has been polled.
    fn publish(&mut self, publication: &Publication) -> Result<(), BrokerError>;

    /// Drives the connection for at most `timeout`. An error means the connection is gone.
    fn poll(&mut self, timeout: Duration) -> Result<(), BrokerError>;
}

/// Opens broker connections.
pub trait BrokerConnector {
    type Link: BrokerLink;

    fn connect(&mut self, host: &str, port: u16) -> Result<Self::Link, BrokerError>;
}

/// [`BrokerConnector`] for MQTT brokers.
#[derive(Debug, Clone)]
pub struct MqttConnector {
    client_id: String,
    keep_alive: Duration,
}

impl MqttConnector {
    pub fn new(config: &Config) -> Self {
        MqttConnector {
            client_id: config.client_id.clone(),
            keep_alive: config.keep_alive,
        }
    }
}

impl BrokerConnector for MqttConnector {
    type Link = MqttLink;

    #[tracing::instrument(skip(self))]
    fn connect(&mut self, host: &str, port: u16) -> Result<MqttLink, BrokerError> {
        let mut options = MqttOptions::new(self.client_id.as_str(), host, port);
        options.set_keep_alive(self.keep_alive);

        let (client, mut connection) = Client::new(options, CLIENT_REQUEST_CAPACITY);

        loop {
            match connection.recv() {
                Ok(Ok(Event::Incoming(Packet::ConnAck(ack)))) => {
                    info!("Connected to the broker.");
                    debug!("{:?}", ack);
                    return Ok(MqttLink { client, connection });
                }
                Ok(Ok(event)) => debug!("Broker event while connecting: {:?}", event),
                Ok(Err(e)) => return Err(BrokerError::Connection(e.to_string())),
                Err(e) => return Err(BrokerError::Connection(format!("{:?}", e))),
            }
        }
    }
}

/// A connected MQTT client together with the event loop that drives it.
///
/// Dropping the link closes the network connection.
pub struct MqttLink {
    client: Client,
    connection: Connection,
}

impl BrokerLink for MqttLink {
    fn publish(&mut self, publication: &Publication) -> Result<(), BrokerError> {
        self.client
            .try_publish(
                publication.topic.as_str(),
                QoS::AtMostOnce,
                false,
                publication.payload.as_bytes().to_vec(),
            )
            .map_err(|e| match e {
                ClientError::TryRequest(_) => BrokerError::ClientBusy,
                e => BrokerError::Client(e.to_string()),
            })
    }

    fn poll(&mut self, timeout: Duration) -> Result<(), BrokerError> {
        match self.connection.recv_timeout(timeout) {
            Ok(Ok(Event::Outgoing(Outgoing::Publish(_)))) => {
                debug!("Scanned code published.");
                Ok(())
            }
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(BrokerError::Connection(e.to_string())),
            Err(RecvTimeoutError::Timeout) => Ok(()),
            Err(RecvTimeoutError::Disconnected) => {
                Err(BrokerError::Connection("event loop stopped".to_string()))
            }
        }
    }
}

/// Owns the broker connection and reconnects whenever it fails.
#[derive(Debug)]
pub struct BrokerSession {
    host: String,
    port: u16,
    reconnect_delay: Duration,
    poll_interval: Duration,
    queue: PublicationQueue,
    /// A publication the link refused. It goes out before anything else from the queue.
    pending: Option<Publication>,
    stop: StopToken,
}

impl BrokerSession {
    pub fn new(config: &Config, queue: PublicationQueue, stop: StopToken) -> Self {
        BrokerSession {
            host: config.broker_host.clone(),
            port: config.broker_port,
            reconnect_delay: config.reconnect_delay,
            poll_interval: config.poll_interval,
            queue,
            pending: None,
            stop,
        }
    }

    /// Connects and serves the scan queue until stopped, reconnecting after every error.
    #[tracing::instrument(skip_all, fields(host = %self.host, port = self.port))]
    pub fn run<C: BrokerConnector>(&mut self, connector: &mut C) {
        while !self.stop.is_stopped() {
            info!(
                "Connecting to MQTT broker {} on port {}.",
                self.host, self.port
            );

            let result = match connector.connect(&self.host, self.port) {
                Ok(mut link) => self.serve(&mut link),
                Err(e) => Err(e),
            };

            match result {
                Ok(()) => break,
                Err(e) => error!("{}. Reconnecting now...", e),
            }

            if !self.reconnect_delay.is_zero() {
                sleep(self.reconnect_delay);
            }
        }

        info!("Broker session stopped.");
    }

    fn serve<L: BrokerLink>(&mut self, link: &mut L) -> Result<(), BrokerError> {
        while !self.stop.is_stopped() {
            while let Some(publication) = self.pending.take().or_else(|| self.queue.try_next()) {
                match link.publish(&publication) {
                    Ok(()) => {
                        debug!("Publishing {:?} on {}.", publication.payload, publication.topic)
                    }
                    Err(BrokerError::ClientBusy) => {
                        self.pending = Some(publication);
                        break;
                    }
                    Err(e) => {
                        self.pending = Some(publication);
                        return Err(e);
                    }
                }
            }

            link.poll(self.poll_interval)?;
        }

        Ok(())
    }
}
