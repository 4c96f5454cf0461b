//! Unit Capability — 3 words, read-only, per unit.

use crate::codec::{bit_get, sint_get, uint_get};

/// What a single indoor unit is capable of: supported modes, fan
/// direction/speed step counts, and setpoint bounds in whole Celsius.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitCapabilityView(pub [u16; 3]);

impl UnitCapabilityView {
    #[inline]
    pub fn fan_mode_capable(&self) -> bool {
        bit_get(&self.0, 0)
    }
    #[inline]
    pub fn cool_capable(&self) -> bool {
        bit_get(&self.0, 1)
    }
    #[inline]
    pub fn heat_capable(&self) -> bool {
        bit_get(&self.0, 2)
    }
    #[inline]
    pub fn auto_capable(&self) -> bool {
        bit_get(&self.0, 3)
    }
    #[inline]
    pub fn dry_capable(&self) -> bool {
        bit_get(&self.0, 4)
    }

    #[inline]
    pub fn fan_direction_capable(&self) -> bool {
        bit_get(&self.0, 11)
    }
    #[inline]
    pub fn fan_speed_capable(&self) -> bool {
        bit_get(&self.0, 15)
    }

    #[inline]
    pub fn fan_direction_steps(&self) -> u32 {
        uint_get(&self.0, 8, 3)
    }
    #[inline]
    pub fn fan_speed_steps(&self) -> u32 {
        uint_get(&self.0, 12, 3)
    }

    /// Upper cool setpoint bound, whole degrees Celsius.
    #[inline]
    pub fn cool_setpoint_upper_c(&self) -> i32 {
        sint_get(&self.0, 16, 8)
    }
    /// Lower cool setpoint bound, whole degrees Celsius.
    #[inline]
    pub fn cool_setpoint_lower_c(&self) -> i32 {
        sint_get(&self.0, 24, 8)
    }
    /// Upper heat setpoint bound, whole degrees Celsius.
    #[inline]
    pub fn heat_setpoint_upper_c(&self) -> i32 {
        sint_get(&self.0, 32, 8)
    }
    /// Lower heat setpoint bound, whole degrees Celsius.
    #[inline]
    pub fn heat_setpoint_lower_c(&self) -> i32 {
        sint_get(&self.0, 40, 8)
    }
}
