//! Unit Error — 2 words, per unit, read-only.

use crate::codec::{bit_get, uint_get};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitErrorView(pub [u16; 2]);

impl UnitErrorView {
    /// Two-character ASCII error code, e.g. `"A1"`.
    pub fn code(&self) -> [u8; 2] {
        [uint_get(&self.0, 0, 8) as u8, uint_get(&self.0, 8, 8) as u8]
    }

    #[inline]
    pub fn subcode(&self) -> u32 {
        uint_get(&self.0, 16, 6)
    }

    #[inline]
    pub fn error(&self) -> bool {
        bit_get(&self.0, 24)
    }

    #[inline]
    pub fn alarm(&self) -> bool {
        bit_get(&self.0, 25)
    }

    #[inline]
    pub fn warning(&self) -> bool {
        bit_get(&self.0, 26)
    }

    #[inline]
    pub fn unit_number(&self) -> u32 {
        uint_get(&self.0, 28, 4)
    }
}
