//! Object dictionary entries of the C5-E used by the driver

use super::od::OdIndex;

macro_rules! makeod {
    ($($name:ident, $index:literal, $subindex:literal),*) => {
        $(pub const $name: OdIndex = OdIndex::new($index, $subindex);)*
    };
}

// in the order they appear in the manual
#[rustfmt::skip]
makeod!(
    DEVICE_NAME, 0x1008, 0x00,
    HARDWARE_VERSION, 0x1009, 0x00,
    SOFTWARE_VERSION, 0x100A, 0x00,
    CONTROLWORD, 0x6040, 0x00,
    STATUSWORD, 0x6041, 0x00,
    MODES_OF_OPERATION, 0x6060, 0x00,
    MODES_OF_OPERATION_DISPLAY, 0x6061, 0x00,
    POSITION_ACTUAL_VALUE, 0x6064, 0x00,
    FOLLOWING_ERROR_WINDOW, 0x6065, 0x00,
    FOLLOWING_ERROR_TIME_OUT, 0x6066, 0x00,
    POSITION_WINDOW, 0x6067, 0x00,
    POSITION_WINDOW_TIME, 0x6068, 0x00,
    TARGET_POSITION, 0x607A, 0x00,
    MIN_POSITION_RANGE_LIMIT, 0x607B, 0x01,
    MAX_POSITION_RANGE_LIMIT, 0x607B, 0x02,
    HOME_OFFSET, 0x607C, 0x00,
    MIN_POSITION_LIMIT, 0x607D, 0x01,
    MAX_POSITION_LIMIT, 0x607D, 0x02,
    POLARITY, 0x607E, 0x00,
    PROFILE_VELOCITY, 0x6081, 0x00,
    END_VELOCITY, 0x6082, 0x00,
    PROFILE_ACCELERATION, 0x6083, 0x00,
    PROFILE_DECELERATION, 0x6084, 0x00,
    QUICK_STOP_DECELERATION, 0x6085, 0x00,
    MOTION_PROFILE_TYPE, 0x6086, 0x00,
    MAX_ACCELERATION, 0x60C5, 0x00,
    MAX_DECELERATION, 0x60C6, 0x00
);
