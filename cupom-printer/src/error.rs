//! Error types for the printer library

use thiserror::Error;

/// Transport error taxonomy
///
/// Every dispatch attempt resolves to exactly one of these; there is no
/// partial-success state. Retry decisions belong to the caller.
#[derive(Debug, Error)]
pub enum TransportError {
    /// TCP connection did not complete within the connect timeout
    #[error("Connect timeout: {0}")]
    ConnectTimeout(String),

    /// TCP write/flush did not complete within the write timeout
    #[error("Write timeout: {0}")]
    WriteTimeout(String),

    /// Any other socket-level failure
    #[error("Socket error: {0}")]
    SocketError(String),

    /// Spooler could not be opened or the document could not be started
    #[error("Spooler open failed: {0}")]
    SpoolerOpenFailed(String),

    /// Spooler accepted the document but the write failed or was short
    #[error("Spooler write failed: {0}")]
    SpoolerWriteFailed(String),

    /// The privileged spool helper could not be invoked
    #[error("Helper process error: {0}")]
    HelperProcessError(String),

    /// Serial device could not be opened or configured
    #[error("Port open failed: {0}")]
    PortOpenFailed(String),

    /// Serial write failed
    #[error("Serial write failed: {0}")]
    WriteFailed(String),

    /// OS-level drain did not confirm transmission
    #[error("Serial drain failed: {0}")]
    DrainFailed(String),

    /// No serial driver on this platform; never a silent success
    #[error("Serial driver unavailable on this platform")]
    DriverUnavailable,
}

/// Result type for printer operations
pub type PrintResult<T> = Result<T, TransportError>;
