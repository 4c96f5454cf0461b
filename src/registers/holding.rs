//! Unit Holding — 3 words, per unit, writeable shadow.
//!
//! Same layout as the first 3 words of [`super::UnitStatusView`] for
//! power/fan/mode, plus fan-control-enable (bits 4..7) and the
//! filter-reset command (bits 20..23). Every setter OR-sets the
//! caller-supplied `dirty` flag only when the underlying bits change
//!, so a write that reasserts the current value never
//! marks the shadow dirty.

use super::{celsius_to_scaled, scaled_to_celsius};
use crate::codec::{bit_get, bit_set, sint_get, sint_set, uint_get, uint_set};
use crate::units::{FanDirection, FanSpeed, OperatingMode};

/// Value that must be present in `fan_control_enable` for a fan-speed or
/// fan-direction write to take effect. The exact hardware semantics
/// beyond "required" are undocumented.
pub const FAN_CONTROL_ENABLE: u32 = 6;

/// Value that triggers a filter-reset pulse; cleared back to 0 once the
/// adapter has observed the 15 -> 0 transition.
pub const FILTER_RESET_TRIGGER: u32 = 15;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitHoldingView(pub [u16; 3]);

impl UnitHoldingView {
    #[inline]
    pub fn power(&self) -> bool {
        bit_get(&self.0, 0)
    }

    #[inline]
    pub fn set_power(&mut self, on: bool, dirty: &mut bool) {
        bit_set(&mut self.0, 0, on, dirty);
    }

    #[inline]
    pub fn fan_control_enable_raw(&self) -> u32 {
        uint_get(&self.0, 4, 4)
    }

    #[inline]
    pub fn set_fan_control_enable_raw(&mut self, value: u32, dirty: &mut bool) {
        uint_set(&mut self.0, 4, 4, value, dirty);
    }

    #[inline]
    pub fn fan_direction_raw(&self) -> u32 {
        uint_get(&self.0, 8, 3)
    }

    #[inline]
    pub fn fan_direction(&self) -> FanDirection {
        FanDirection::from_raw(self.fan_direction_raw())
    }

    /// Also asserts fan-control-enable (hardware requires it to commit
    /// the write). [`Self::set_fan_direction_raw`] writes the
    /// field alone — [`super::holding_sync_from_status`] uses that one,
    /// since reconciling the shadow from observed status must not touch
    /// fan-control-enable.
    #[inline]
    pub fn set_fan_direction(&mut self, dir: FanDirection, dirty: &mut bool) {
        self.set_fan_direction_raw(dir.as_raw(), dirty);
        self.set_fan_control_enable_raw(FAN_CONTROL_ENABLE, dirty);
    }

    #[inline]
    pub fn set_fan_direction_raw(&mut self, raw: u32, dirty: &mut bool) {
        uint_set(&mut self.0, 8, 3, raw, dirty);
    }

    #[inline]
    pub fn fan_speed_raw(&self) -> u32 {
        uint_get(&self.0, 12, 3)
    }

    #[inline]
    pub fn fan_speed(&self) -> FanSpeed {
        FanSpeed::from_raw(self.fan_speed_raw())
    }

    /// Also asserts fan-control-enable (hardware requires it to commit
    /// the write). See [`Self::set_fan_direction`] for why
    /// the `_raw` form omits the side effect.
    #[inline]
    pub fn set_fan_speed(&mut self, speed: FanSpeed, dirty: &mut bool) {
        self.set_fan_speed_raw(speed.as_raw(), dirty);
        self.set_fan_control_enable_raw(FAN_CONTROL_ENABLE, dirty);
    }

    #[inline]
    pub fn set_fan_speed_raw(&mut self, raw: u32, dirty: &mut bool) {
        uint_set(&mut self.0, 12, 3, raw, dirty);
    }

    #[inline]
    pub fn mode_raw(&self) -> u32 {
        uint_get(&self.0, 16, 4)
    }

    #[inline]
    pub fn mode(&self) -> OperatingMode {
        OperatingMode::from_raw(self.mode_raw())
    }

    #[inline]
    pub fn set_mode(&mut self, mode: OperatingMode, dirty: &mut bool) {
        self.set_mode_raw(mode.as_raw(), dirty);
    }

    #[inline]
    pub fn set_mode_raw(&mut self, raw: u32, dirty: &mut bool) {
        uint_set(&mut self.0, 16, 4, raw, dirty);
    }

    #[inline]
    pub fn filter_reset_raw(&self) -> u32 {
        uint_get(&self.0, 20, 4)
    }

    #[inline]
    pub fn filter_reset(&self) -> bool {
        self.filter_reset_raw() == FILTER_RESET_TRIGGER
    }

    /// `true` asserts the reset command (15); `false` writes 0, which is
    /// how the pulse-down half of the filter-reset protocol clears it
    ///.
    #[inline]
    pub fn set_filter_reset(&mut self, asserted: bool, dirty: &mut bool) {
        let value = if asserted { FILTER_RESET_TRIGGER } else { 0 };
        uint_set(&mut self.0, 20, 4, value, dirty);
    }

    #[inline]
    pub fn setpoint_celsius(&self) -> f32 {
        scaled_to_celsius(sint_get(&self.0, 32, 16))
    }

    #[inline]
    pub fn set_setpoint_celsius(&mut self, celsius: f32, dirty: &mut bool) {
        sint_set(&mut self.0, 32, 16, celsius_to_scaled(celsius), dirty);
    }
}
