//! Modbus-RTU transport implementing [`RegisterIo`].
//!
//! Generic over a [`SerialPort`] (the byte-level UART boundary) and a
//! DE pin, with an optional RE pin for adapters whose receive-enable
//! line is independent of DE. The gateway (or, in tests, a bare
//! frame-level harness) is generic over `RegisterIo`, and
//! `RtuTransport` is one concrete implementation alongside the
//! in-memory simulator in `tests/common`.

use std::time::{Duration, Instant};

use embedded_hal::digital::OutputPin;

use super::frame::{
    build_read_request, build_write_request, expected_read_reply_len, expected_write_reply_len,
    parse_read_reply, parse_write_reply, FN_READ_HOLDING, FN_READ_INPUT,
};
use crate::config::RtuConfig;
use crate::error::{GatewayError, Result};
use crate::io::{RegisterIo, RegisterKind};

/// Byte-level serial port boundary. Implementations are expected to be
/// blocking for `write` (returns once the bytes are physically sent, or
/// the underlying driver's own timeout elapses) and non-blocking for
/// `read` (returns `0` when nothing is available yet rather than
/// parking the thread), so the transceive procedure can enforce its own
/// deadline across repeated polls.
pub trait SerialPort {
    type Error: std::error::Error + Send + Sync + 'static;

    fn write(&mut self, data: &[u8]) -> std::result::Result<(), Self::Error>;
    fn read(&mut self, buf: &mut [u8]) -> std::result::Result<usize, Self::Error>;
    fn flush_input(&mut self) -> std::result::Result<(), Self::Error>;
}

/// Modbus-RTU transport over a serial line with DE/RE direction
/// control.
///
/// `config` carries the full line settings (`§6`'s "configure RTU
/// parameters"): `slave_id` and `timeout_ms` are consumed directly by
/// `transceive`; `baud`/`data_bits`/`stop_bits`/`parity` are the settings
/// the host collaborator must already have applied when constructing
/// `serial` (this transport does not own the port, so it cannot
/// reconfigure it — it only carries those fields for `Gateway::configure`
/// round-tripping, see [`crate::gateway::Gateway::configure`]).
pub struct RtuTransport<S, DE, RE = DE> {
    serial: S,
    de: DE,
    re: Option<RE>,
    config: RtuConfig,
}

impl<S, DE, RE> RtuTransport<S, DE, RE>
where
    S: SerialPort,
    DE: OutputPin,
    RE: OutputPin,
{
    pub fn new(serial: S, de: DE, re: Option<RE>, config: RtuConfig) -> Self {
        Self {
            serial,
            de,
            re,
            config,
        }
    }

    fn set_transmit_mode(&mut self) -> Result<()> {
        self.de
            .set_high()
            .map_err(|_| GatewayError::IoFailure("failed to raise DE".into()))?;
        if let Some(re) = self.re.as_mut() {
            re.set_high()
                .map_err(|_| GatewayError::IoFailure("failed to raise RE".into()))?;
        }
        Ok(())
    }

    fn set_receive_mode(&mut self) -> Result<()> {
        self.de
            .set_low()
            .map_err(|_| GatewayError::IoFailure("failed to lower DE".into()))?;
        if let Some(re) = self.re.as_mut() {
            re.set_low()
                .map_err(|_| GatewayError::IoFailure("failed to lower RE".into()))?;
        }
        Ok(())
    }

    /// Run the transceive procedure: flush, raise
    /// DE/RE, write the request, lower DE/RE, then read until
    /// `expected_len` bytes arrive or a single deadline (from the start
    /// of receive) expires.
    fn transceive(&mut self, request: &[u8], expected_len: usize) -> Result<Vec<u8>> {
        self.serial
            .flush_input()
            .map_err(|e| GatewayError::TransportError(Box::new(e)))?;

        self.set_transmit_mode()?;
        self.serial
            .write(request)
            .map_err(|e| GatewayError::TransportError(Box::new(e)))?;
        self.set_receive_mode()?;

        let deadline = Instant::now() + Duration::from_millis(self.config.timeout_ms as u64);
        let mut buf = vec![0u8; expected_len];
        let mut filled = 0usize;
        while filled < expected_len && Instant::now() < deadline {
            let n = self
                .serial
                .read(&mut buf[filled..])
                .map_err(|e| GatewayError::TransportError(Box::new(e)))?;
            filled += n;
        }

        if filled < 5 || filled < expected_len {
            return Err(GatewayError::Timeout {
                expected: expected_len,
            });
        }
        Ok(buf)
    }
}

impl<S, DE, RE> RegisterIo for RtuTransport<S, DE, RE>
where
    S: SerialPort,
    DE: OutputPin,
    RE: OutputPin,
{
    fn read_registers(&mut self, kind: RegisterKind, addr: u16, count: u16) -> Result<Vec<u16>> {
        if count == 0 {
            return Err(GatewayError::InvalidArgument("count must be nonzero".into()));
        }
        let function = match kind {
            RegisterKind::Input => FN_READ_INPUT,
            RegisterKind::Holding => FN_READ_HOLDING,
        };
        let request = build_read_request(self.config.slave_id, function, addr, count);
        let reply = self.transceive(&request, expected_read_reply_len(count))?;
        parse_read_reply(&reply, self.config.slave_id, function, count)
    }

    fn write_registers(&mut self, addr: u16, words: &[u16]) -> Result<()> {
        if words.is_empty() {
            return Err(GatewayError::InvalidArgument("words must be nonempty".into()));
        }
        let count = words.len() as u16;
        let request = build_write_request(self.config.slave_id, addr, words);
        let reply = self.transceive(&request, expected_write_reply_len(count))?;
        parse_write_reply(&reply, self.config.slave_id, addr, count)
    }
}
