//! Typed accessors over the fixed-layout register tables.
//!
//! Every getter here is total (see `codec`); every setter on a
//! writeable view OR-sets its own `dirty` out-parameter only when the
//! underlying bits actually change.
//!
//! Scaled-temperature fields convert between a signed, sign-magnitude,
//! ×10 fixed-point register value and a `f32` in Celsius, using
//! round-half-away-from-zero (`f32::round` already rounds this way).

mod capability;
mod holding;
mod status;
mod system_status;
mod unit_error;

pub use capability::UnitCapabilityView;
pub use holding::{UnitHoldingView, FAN_CONTROL_ENABLE, FILTER_RESET_TRIGGER};
pub use status::UnitStatusView;
pub use system_status::SystemStatusView;
pub use unit_error::UnitErrorView;

/// Convert a ×10 fixed-point value to Celsius.
#[inline]
pub(crate) fn scaled_to_celsius(raw: i32) -> f32 {
    raw as f32 / 10.0
}

/// Convert Celsius to a ×10 fixed-point value, rounding half away from
/// zero.
#[inline]
pub(crate) fn celsius_to_scaled(celsius: f32) -> i32 {
    (celsius * 10.0).round() as i32
}

/// Copy the live power/fan-direction/fan-speed/mode/setpoint fields from
/// a status view into a holding view. Does not touch filter-reset or
/// fan-control-enable. Returns true iff any field actually
/// changed (OR-ed into the caller's `dirty` flag the same way the codec
/// setters do).
pub fn holding_sync_from_status(
    holding: &mut UnitHoldingView,
    status: &UnitStatusView,
    dirty: &mut bool,
) {
    holding.set_power(status.power(), dirty);
    holding.set_fan_direction_raw(status.fan_direction_raw(), dirty);
    holding.set_fan_speed_raw(status.fan_speed_raw(), dirty);
    holding.set_mode_raw(status.commanded_mode_raw(), dirty);
    holding.set_setpoint_celsius(status.setpoint_celsius(), dirty);
}
