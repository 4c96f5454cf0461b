//! # d3net-gateway
//!
//! A gateway bridging a host control plane to a fleet of HVAC indoor
//! units attached to a proprietary indoor-bus adapter over Modbus-RTU.
//!
//! Owns the bitfield codec, the typed register views, the Modbus-RTU
//! transport, and the gateway state machine that orchestrates
//! discovery, periodic polling, and the prepare/commit write protocol
//! for power, mode, setpoint, fan speed, fan direction, and filter
//! reset. Wi-Fi provisioning, an HTTP/JSON surface, telnet diagnostics,
//! OTA, persistent configuration storage, mDNS, and UDP discovery are
//! external collaborators built on top of [`Gateway`]; they are not
//! part of this crate.

pub mod clock;
pub mod codec;
pub mod config;
pub mod error;
pub mod gateway;
pub mod io;
pub mod log_event;
pub mod registers;
pub mod transport;
pub mod units;

pub use error::{GatewayError, Result};
pub use gateway::{DiscoverReport, DiscoveredUnit, Gateway, UnitSnapshot};
pub use io::{RegisterIo, RegisterKind};
pub use units::{FanDirection, FanSpeed, OperatingMode, Unit, UnitId};
