//! Unit identity, enums, and the per-unit record the gateway maintains.

use std::fmt;

use crate::registers::{UnitCapabilityView, UnitErrorView, UnitHoldingView, UnitStatusView};

/// Commanded/current operating mode (status bits 16..19 / 24..27).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum OperatingMode {
    Fan = 0,
    Heat = 1,
    Cool = 2,
    Auto = 3,
    Vent = 4,
    #[default]
    Undefined = 5,
    Slave = 6,
    Dry = 7,
}

impl OperatingMode {
    /// Decode a raw 4-bit field. Out-of-range values (8..15) map to
    /// `Undefined` rather than failing — the field is observed hardware
    /// state, not validated input.
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => Self::Fan,
            1 => Self::Heat,
            2 => Self::Cool,
            3 => Self::Auto,
            4 => Self::Vent,
            6 => Self::Slave,
            7 => Self::Dry,
            _ => Self::Undefined,
        }
    }

    pub fn as_raw(self) -> u32 {
        self as u8 as u32
    }
}

/// Fan speed (status bits 12..14).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum FanSpeed {
    #[default]
    Auto = 0,
    Low = 1,
    LowMed = 2,
    Med = 3,
    HiMed = 4,
    High = 5,
}

impl FanSpeed {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            1 => Self::Low,
            2 => Self::LowMed,
            3 => Self::Med,
            4 => Self::HiMed,
            5 => Self::High,
            _ => Self::Auto,
        }
    }

    pub fn as_raw(self) -> u32 {
        self as u8 as u32
    }
}

/// Fan direction (status bits 8..10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum FanDirection {
    #[default]
    P0 = 0,
    P1 = 1,
    P2 = 2,
    P3 = 3,
    P4 = 4,
    Stop = 6,
    Swing = 7,
}

impl FanDirection {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            1 => Self::P1,
            2 => Self::P2,
            3 => Self::P3,
            4 => Self::P4,
            6 => Self::Stop,
            7 => Self::Swing,
            _ => Self::P0,
        }
    }

    pub fn as_raw(self) -> u32 {
        self as u8 as u32
    }
}

/// Unit index `0..64`, formatted as group/member id `"G-NN"`:
/// `G = index/16 + 1`, `NN = index % 16` zero-padded to two digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitId(u8);

impl UnitId {
    /// Highest valid unit index (64 units, 0-based).
    pub const MAX_INDEX: u8 = 63;

    #[inline]
    pub fn from_index(index: u8) -> Self {
        debug_assert!(index <= Self::MAX_INDEX);
        Self(index)
    }

    #[inline]
    pub fn index(self) -> u8 {
        self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let group = self.0 / 16 + 1;
        let member = self.0 % 16;
        write!(f, "{group}-{member:02}")
    }
}

/// Tracking for the holding-register shadow.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoldingShadow {
    pub view: UnitHoldingView,
    /// Set when the shadow carries a staged change not yet acknowledged
    /// by a successful write.
    pub dirty: bool,
    pub last_read_ms: Option<u64>,
    pub last_write_ms: Option<u64>,
}

impl HoldingShadow {
    #[inline]
    pub fn read_within(&self, now_ms: u64, window_s: u64) -> bool {
        matches!(self.last_read_ms, Some(t) if now_ms.saturating_sub(t) < window_s * 1000)
    }

    #[inline]
    pub fn write_within(&self, now_ms: u64, window_s: u64) -> bool {
        matches!(self.last_write_ms, Some(t) if now_ms.saturating_sub(t) < window_s * 1000)
    }
}

/// A single indoor HVAC terminal, addressed by its 6-bit index.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unit {
    pub present: bool,
    pub id: UnitId,
    pub capability: UnitCapabilityView,
    pub status: UnitStatusView,
    pub holding: HoldingShadow,
    pub error: UnitErrorView,
    pub last_error_read_ms: Option<u64>,
}

impl Default for UnitId {
    fn default() -> Self {
        UnitId(0)
    }
}

impl Unit {
    pub fn new(index: u8) -> Self {
        Self {
            present: false,
            id: UnitId::from_index(index),
            ..Default::default()
        }
    }

    #[inline]
    pub fn index(&self) -> u8 {
        self.id.index()
    }
}
