//! System Status — 9 words, read-only.

use crate::codec::bit_get;

/// Adapter-wide status: init flag, other-controller flag, and a
/// per-unit connected/error bitmap for all 64 units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemStatusView(pub [u16; 9]);

impl SystemStatusView {
    #[inline]
    pub fn adapter_initialised(&self) -> bool {
        bit_get(&self.0, 0)
    }

    #[inline]
    pub fn other_controller_present(&self) -> bool {
        bit_get(&self.0, 1)
    }

    /// `true` iff unit `index` (0..64) is connected to the indoor bus.
    #[inline]
    pub fn unit_connected(&self, index: u8) -> bool {
        bit_get(&self.0, 16 + index as u32)
    }

    /// `true` iff unit `index` (0..64) is currently flagged in error.
    #[inline]
    pub fn unit_error(&self, index: u8) -> bool {
        bit_get(&self.0, 80 + index as u32)
    }
}
