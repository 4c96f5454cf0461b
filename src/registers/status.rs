//! Unit Status — 6 words, per unit.
//!
//! Primarily a read-only view of live state reported by the adapter.
//! The operator write protocol also mutates this view
//! in-place with the requested field, using it as the single source of
//! intent between `prepare_write` and `commit_write`; [`super::holding_sync_from_status`]
//! then folds that intent into the holding shadow just before the write.

use super::{celsius_to_scaled, scaled_to_celsius};
use crate::codec::{bit_get, bit_set, sint_get, sint_set, uint_get, uint_set};
use crate::units::{FanDirection, FanSpeed, OperatingMode};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitStatusView(pub [u16; 6]);

impl UnitStatusView {
    #[inline]
    pub fn power(&self) -> bool {
        bit_get(&self.0, 0)
    }

    #[inline]
    pub fn set_power(&mut self, on: bool) {
        let mut dirty = false;
        bit_set(&mut self.0, 0, on, &mut dirty);
    }

    #[inline]
    pub fn fan_direction_raw(&self) -> u32 {
        uint_get(&self.0, 8, 3)
    }

    #[inline]
    pub fn fan_direction(&self) -> FanDirection {
        FanDirection::from_raw(self.fan_direction_raw())
    }

    #[inline]
    pub fn set_fan_direction(&mut self, dir: FanDirection) {
        let mut dirty = false;
        uint_set(&mut self.0, 8, 3, dir.as_raw(), &mut dirty);
    }

    #[inline]
    pub fn fan_speed_raw(&self) -> u32 {
        uint_get(&self.0, 12, 3)
    }

    #[inline]
    pub fn fan_speed(&self) -> FanSpeed {
        FanSpeed::from_raw(self.fan_speed_raw())
    }

    #[inline]
    pub fn set_fan_speed(&mut self, speed: FanSpeed) {
        let mut dirty = false;
        uint_set(&mut self.0, 12, 3, speed.as_raw(), &mut dirty);
    }

    #[inline]
    pub fn commanded_mode_raw(&self) -> u32 {
        uint_get(&self.0, 16, 4)
    }

    #[inline]
    pub fn commanded_mode(&self) -> OperatingMode {
        OperatingMode::from_raw(self.commanded_mode_raw())
    }

    #[inline]
    pub fn set_mode(&mut self, mode: OperatingMode) {
        let mut dirty = false;
        uint_set(&mut self.0, 16, 4, mode.as_raw(), &mut dirty);
    }

    /// Filter-warning counter; non-zero means a warning is pending.
    #[inline]
    pub fn filter_warning_count(&self) -> u32 {
        uint_get(&self.0, 20, 4)
    }

    #[inline]
    pub fn filter_warning(&self) -> bool {
        self.filter_warning_count() != 0
    }

    /// Observed only — never written.
    #[inline]
    pub fn current_mode(&self) -> OperatingMode {
        OperatingMode::from_raw(uint_get(&self.0, 24, 4))
    }

    #[inline]
    pub fn setpoint_celsius(&self) -> f32 {
        scaled_to_celsius(sint_get(&self.0, 32, 16))
    }

    #[inline]
    pub fn set_setpoint_celsius(&mut self, celsius: f32) {
        let mut dirty = false;
        sint_set(&mut self.0, 32, 16, celsius_to_scaled(celsius), &mut dirty);
    }

    #[inline]
    pub fn current_temperature_celsius(&self) -> f32 {
        scaled_to_celsius(sint_get(&self.0, 64, 16))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_s2_power_mode_setpoint() {
        let mut words = [0u16; 6];
        let mut dirty = false;
        bit_set(&mut words, 0, true, &mut dirty);
        uint_set(&mut words, 16, 4, 2, &mut dirty); // COOL
        sint_set(&mut words, 32, 16, 235, &mut dirty);

        let view = UnitStatusView(words);
        assert!(view.power());
        assert_eq!(view.commanded_mode(), OperatingMode::Cool);
        assert_eq!(view.setpoint_celsius(), 23.5);
    }

    #[test]
    fn setters_mutate_in_place() {
        let mut view = UnitStatusView::default();
        view.set_power(true);
        view.set_mode(OperatingMode::Heat);
        view.set_fan_speed(FanSpeed::High);
        view.set_fan_direction(FanDirection::Swing);
        view.set_setpoint_celsius(21.0);

        assert!(view.power());
        assert_eq!(view.commanded_mode(), OperatingMode::Heat);
        assert_eq!(view.fan_speed(), FanSpeed::High);
        assert_eq!(view.fan_direction(), FanDirection::Swing);
        assert_eq!(view.setpoint_celsius(), 21.0);
    }
}
