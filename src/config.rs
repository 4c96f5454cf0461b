//! RTU line configuration.
//!
//! Shape only — persistence format is delegated to the host
//! collaborator, so this module only guarantees that
//! round-tripping a `RtuConfig` through any idempotent load/save is
//! lossless. Configuration changes take effect on restart.

use serde::{Deserialize, Serialize};

/// Serial parity setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Modbus-RTU line settings for the indoor-bus adapter link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RtuConfig {
    pub baud: u32,
    /// 7 or 8.
    pub data_bits: u8,
    /// 1 or 2.
    pub stop_bits: u8,
    pub parity: Parity,
    /// Modbus slave id addressed on the bus.
    pub slave_id: u8,
    /// Transceive deadline: TX-done wait and RX byte-gap deadline both
    /// use this value.
    pub timeout_ms: u32,
}

impl Default for RtuConfig {
    fn default() -> Self {
        Self {
            baud: 9600,
            data_bits: 8,
            stop_bits: 1,
            parity: Parity::None,
            slave_id: 1,
            timeout_ms: 200,
        }
    }
}

/// Gateway-level tuning independent of the wire format: poll cadence,
/// inter-operation throttle, and the post-write/error caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub poll_interval_s: u64,
    pub throttle_ms: u64,
    pub cache_write_s: u64,
    pub cache_error_s: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            poll_interval_s: 10,
            throttle_ms: 25,
            cache_write_s: 35,
            cache_error_s: 10,
        }
    }
}
