//! Structured logging.
//!
//! Replaces a shared callback ring buffer under a static mutex with an
//! owned sink: the gateway holds a `&dyn LogSink` (or any
//! `Send + Sync` implementor) and emits into it; it never reads the
//! sink back.

use crate::error::{describe, GatewayError};

/// One structured event emitted by the gateway: discover complete,
/// poll error, write complete, transport timeout.
#[derive(Debug, Clone)]
pub enum LogEvent {
    DiscoverComplete { present: usize },
    PollError { unit: u8, message: String },
    WriteComplete { unit: u8 },
    TransportTimeout { addr: u16 },
}

impl LogEvent {
    pub(crate) fn poll_error(unit: u8, err: &GatewayError) -> Self {
        Self::PollError {
            unit,
            message: describe(err),
        }
    }
}

/// A sink the gateway emits structured events into. Implementors decide
/// what to do with them (print, forward to a host's diagnostic stream,
/// drop); the gateway makes no assumption about durability or ordering
/// beyond "one `emit` call per event, in emission order".
pub trait LogSink: Send + Sync {
    fn emit(&self, event: LogEvent);
}

/// Default sink: maps each event onto the `log` crate facade at a level
/// matching its severity, the same way the pack's other register-bus
/// drivers log through `log::info!`/`log::warn!`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogCrateSink;

impl LogSink for LogCrateSink {
    fn emit(&self, event: LogEvent) {
        match event {
            LogEvent::DiscoverComplete { present } => {
                log::info!("discovery complete: {present} unit(s) present");
            }
            LogEvent::PollError { unit, message } => {
                log::warn!("poll error on unit {unit}: {message}");
            }
            LogEvent::WriteComplete { unit } => {
                log::info!("write complete on unit {unit}");
            }
            LogEvent::TransportTimeout { addr } => {
                log::error!("transport timeout at address {addr:#06x}");
            }
        }
    }
}

/// Sink that drops every event; useful as a default for callers who
/// don't care, and in tests that only assert on gateway state.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LogSink for NullSink {
    fn emit(&self, _event: LogEvent) {}
}
