/// Errors on the scanner side. All of them end the current device session and trigger relocation.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("HID API error: {0}")]
    Api(String),

    #[error("Failed to open device: {0}")]
    OpenFailed(String),

    #[error("Failed to read from device: {0}")]
    ReadFailed(String),
}

/// Errors on the broker side.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("Broker connection error: {0}")]
    Connection(String),

    #[error("Broker client error: {0}")]
    Client(String),

    /// The client's request channel is full. Not a connection failure.
    #[error("Broker client is busy")]
    ClientBusy,

    #[error("Scan queue is full")]
    QueueFull,

    #[error("Broker session is gone")]
    SessionClosed,
}
