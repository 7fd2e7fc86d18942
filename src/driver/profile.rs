//! Parameters of the profile position mode

use super::{
    device::{BitLength, Device},
    gateway::Gateway,
    map,
    od::OdIndex,
    DriverError,
};

/// Motion profile used in profile position mode
///
/// Only the fields that are `Some` are written, the others keep whatever the
/// controller currently has. Units are user defined units as configured on the
/// controller (by default steps, steps/s and steps/s²).
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, Default)]
pub struct ProfilePositionParams {
    pub profile_velocity: Option<u32>,
    pub end_velocity: Option<u32>,
    pub profile_acceleration: Option<u32>,
    pub profile_deceleration: Option<u32>,
    pub quick_stop_deceleration: Option<u32>,
    /// 0 for a trapezoid ramp, 3 for jerk limited
    pub motion_profile_type: Option<i16>,
    pub max_acceleration: Option<u32>,
    pub max_deceleration: Option<u32>,
    pub position_window: Option<u32>,
    /// Milliseconds the position has to stay in the window to count as reached
    pub position_window_time: Option<u16>,
    pub following_error_window: Option<u32>,
    pub following_error_time_out: Option<u16>,
    pub home_offset: Option<i32>,
    /// Position values wrap around at the range limits
    pub min_position_range_limit: Option<i32>,
    pub max_position_range_limit: Option<i32>,
    pub min_position_limit: Option<i32>,
    pub max_position_limit: Option<i32>,
    /// Bit 7 reverses the direction in profile position mode
    pub polarity: Option<u8>,
}

impl ProfilePositionParams {
    // object, its length and the value to write for every field that is set
    fn entries(&self) -> Vec<(OdIndex, BitLength, i64)> {
        use BitLength::*;
        let fields = [
            (map::PROFILE_VELOCITY, Bits32, self.profile_velocity.map(i64::from)),
            (map::END_VELOCITY, Bits32, self.end_velocity.map(i64::from)),
            (map::PROFILE_ACCELERATION, Bits32, self.profile_acceleration.map(i64::from)),
            (map::PROFILE_DECELERATION, Bits32, self.profile_deceleration.map(i64::from)),
            (map::QUICK_STOP_DECELERATION, Bits32, self.quick_stop_deceleration.map(i64::from)),
            (map::MOTION_PROFILE_TYPE, Bits16, self.motion_profile_type.map(i64::from)),
            (map::MAX_ACCELERATION, Bits32, self.max_acceleration.map(i64::from)),
            (map::MAX_DECELERATION, Bits32, self.max_deceleration.map(i64::from)),
            (map::POSITION_WINDOW, Bits32, self.position_window.map(i64::from)),
            (map::POSITION_WINDOW_TIME, Bits16, self.position_window_time.map(i64::from)),
            (map::FOLLOWING_ERROR_WINDOW, Bits32, self.following_error_window.map(i64::from)),
            (map::FOLLOWING_ERROR_TIME_OUT, Bits16, self.following_error_time_out.map(i64::from)),
            (map::HOME_OFFSET, Bits32, self.home_offset.map(i64::from)),
            (map::MIN_POSITION_RANGE_LIMIT, Bits32, self.min_position_range_limit.map(i64::from)),
            (map::MAX_POSITION_RANGE_LIMIT, Bits32, self.max_position_range_limit.map(i64::from)),
            (map::MIN_POSITION_LIMIT, Bits32, self.min_position_limit.map(i64::from)),
            (map::MAX_POSITION_LIMIT, Bits32, self.max_position_limit.map(i64::from)),
            (map::POLARITY, Bits8, self.polarity.map(i64::from)),
        ];
        fields
            .into_iter()
            .filter_map(|(od, len, value)| value.map(|v| (od, len, v)))
            .collect()
    }

    /// Writes all set parameters to `device`, stopping at the first error
    pub fn apply<G: Gateway>(&self, device: &mut Device<G>) -> Result<(), DriverError> {
        for (od, len, value) in self.entries() {
            device.write_number(value, od, len)?;
        }
        Ok(())
    }

    /// Reads all set parameters back from `device` and compares them
    ///
    /// # Errors
    /// Returns [`DriverError::Verification`] for the first parameter that has
    /// a different value on the device. Only the bits of the object are
    /// compared, so negative values are handled correctly.
    pub fn verify<G: Gateway>(&self, device: &mut Device<G>) -> Result<(), DriverError> {
        for (od, len, expected) in self.entries() {
            let raw = device.read_number(od)?;
            if (raw & len.mask()) != (expected as u64 & len.mask()) {
                let actual = if expected < 0 {
                    len.sign_extend(raw)
                } else {
                    (raw & len.mask()) as i64
                };
                return Err(DriverError::Verification {
                    od_index: od,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }
}
