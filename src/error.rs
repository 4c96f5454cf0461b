//! Gateway-wide error types.
//!
//! Codec and register-view accessors are total functions (see `codec`)
//! and never return an error; `GatewayError` covers everything above
//! that layer: transport framing, discovery/poll/write orchestration,
//! and host-facing command dispatch.

/// A boxed transport-level error from the underlying `RegisterIo`
/// implementation. The gateway does not know the concrete error type of
/// whatever serial backend a host collaborator plugs in.
pub type BoxTransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by the gateway, its transport, and its register I/O
/// boundary.
#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
    /// Null/invalid argument: index out of `[0, 64)`, a zero count, or a
    /// payload too large for the frame buffer.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The transport was used before it was initialised, or the
    /// exclusive lock could not be acquired within its bounded wait.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// The receive deadline expired before the expected frame length
    /// arrived.
    #[error("transport timeout waiting for {expected} bytes")]
    Timeout { expected: usize },

    /// Slave id, function code, byte count, or echoed address/count
    /// mismatch.
    #[error("bad frame: {0}")]
    BadFrame(String),

    /// CRC-16/MODBUS mismatch on a received frame.
    #[error("CRC mismatch: expected {expected:#06x}, got {actual:#06x}")]
    BadCrc { expected: u16, actual: u16 },

    /// The underlying UART write/read returned fewer bytes than
    /// requested.
    #[error("I/O failure: {0}")]
    IoFailure(String),

    /// The operation targeted a unit that is not currently present.
    #[error("unit {0} not present")]
    NotFound(u8),

    /// An error propagated up from the `RegisterIo` implementation
    /// (e.g. the concrete serial backend).
    #[error("transport error: {0}")]
    TransportError(#[source] BoxTransportError),
}

impl GatewayError {
    /// True for the kinds the host surface should map to a generic 5xx
    ///: transient/transport failures rather than caller
    /// mistakes.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GatewayError::BadFrame(_)
                | GatewayError::BadCrc { .. }
                | GatewayError::Timeout { .. }
                | GatewayError::IoFailure(_)
                | GatewayError::TransportError(_)
        )
    }
}

/// Lightweight message used in log events, where we want the error text
/// without pulling `GatewayError`'s `thiserror` source chain into a
/// `Clone` log record.
pub(crate) fn describe(err: &GatewayError) -> String {
    match std::error::Error::source(err) {
        Some(src) => format!("{err} (source: {src})"),
        None => err.to_string(),
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
