//! Bindings for the CiA 402 (DS402) drive profile, i.e. the statusword, the
//! controlword and the modes of operation of the C5-E.
//!
//! See also chapter 7 "Operating the motor controller" of the C5-E technical
//! manual, where the state machine is described.

#[cfg(test)]
mod tests;

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use std::fmt::{Binary, Display};

// unfortunately, due to rustfmt not having the blank_lines_upper_bound feature
// stable yet, we gotta put comments in between the different sections. otherwise
// its just too much

//

/// State of the DS402 state machine as reported by the statusword
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum DriveState {
    NotReadyToSwitchOn,
    SwitchOnDisabled,
    ReadyToSwitchOn,
    SwitchedOn,
    OperationEnabled,
    QuickStopActive,
    FaultReactionActive,
    Fault,
    /// The statusword didn't match any of the states above
    Unknown,
}

// low byte of the statusword for every state. the variants of the bits that
// don't matter for a state (4, 5 and 7) are listed explicitly
#[rustfmt::skip]
const STATE_TABLE: [(DriveState, &[u8]); 8] = [
    (DriveState::NotReadyToSwitchOn, &[0, 16, 32, 48, 128, 160, 144, 176]),
    (DriveState::SwitchOnDisabled, &[64, 80, 96, 112, 192, 208, 224, 240]),
    (DriveState::ReadyToSwitchOn, &[33, 49, 161, 177]),
    (DriveState::SwitchedOn, &[35, 51, 163, 179]),
    (DriveState::OperationEnabled, &[39, 55, 167, 183]),
    (DriveState::QuickStopActive, &[7, 23, 135, 151]),
    (DriveState::FaultReactionActive, &[15, 31, 47, 63, 143, 159, 175, 191]),
    (DriveState::Fault, &[8, 24, 40, 56, 136, 152, 168, 184]),
];

/// Returns the state encoded in `status_word`
///
/// Only the low byte is looked at, the high byte (which for example contains
/// "target reached") never changes the result. Values that don't encode a state
/// return [`DriveState::Unknown`].
///
/// # Examples
/// ```
/// # use nanotec_c5e_driver::{decode_status, DriveState};
/// assert_eq!(decode_status(0x0021), DriveState::ReadyToSwitchOn);
/// assert_eq!(decode_status(0x1F08), DriveState::Fault);
/// assert_eq!(decode_status(0x0001), DriveState::Unknown);
/// ```
pub fn decode_status(status_word: u16) -> DriveState {
    let low = (status_word & 0x00FF) as u8;
    STATE_TABLE
        .iter()
        .find(|(_, values)| values.contains(&low))
        .map_or(DriveState::Unknown, |(state, _)| *state)
}

impl Display for DriveState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use DriveState::*;
        let s = match self {
            NotReadyToSwitchOn => "Not ready to switch on",
            SwitchOnDisabled => "Switch on disabled",
            ReadyToSwitchOn => "Ready to switch on",
            SwitchedOn => "Switched on",
            OperationEnabled => "Operation enabled",
            QuickStopActive => "Quick stop active",
            FaultReactionActive => "Fault reaction active",
            Fault => "Fault",
            Unknown => "Cannot determine controller state",
        };
        f.write_str(s)
    }
}

//

/// Value of 6060:00 (modes of operation) and 6061:00 (modes of operation display)
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, FromPrimitive)]
#[repr(i8)]
pub enum OperatingMode {
    AutoSetup = -2,
    ClockDirection = -1,
    NoChange = 0,
    ProfilePosition = 1,
    Velocity = 2,
    ProfileVelocity = 3,
    ProfileTorque = 4,
    Reserved = 5,
    Homing = 6,
    /// Any code without a mode of its own. Can't be written to the controller.
    Unknown = i8::MIN,
}

/// Returns the mode that `mode` stands for, [`OperatingMode::Unknown`] if there
/// is none
///
/// # Examples
/// ```
/// # use nanotec_c5e_driver::{decode_mode, OperatingMode};
/// assert_eq!(decode_mode(1), OperatingMode::ProfilePosition);
/// assert_eq!(decode_mode(-2), OperatingMode::AutoSetup);
/// assert_eq!(decode_mode(42), OperatingMode::Unknown);
/// ```
pub fn decode_mode(mode: i8) -> OperatingMode {
    OperatingMode::from_i8(mode).unwrap_or(OperatingMode::Unknown)
}

impl OperatingMode {
    /// Interprets a value as read by the gateway, which doesn't know about
    /// signedness. Only the lowest byte is used.
    pub fn from_raw(raw: u64) -> Self {
        decode_mode(raw as u8 as i8)
    }

    pub fn code(self) -> i8 {
        self as i8
    }
}

impl Display for OperatingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use OperatingMode::*;
        let s = match self {
            AutoSetup => "Auto setup",
            ClockDirection => "Clock-direction mode",
            NoChange => "No mode change/no mode assigned",
            ProfilePosition => "Profile Position Mode",
            Velocity => "Velocity Mode",
            ProfileVelocity => "Profile Velocity Mode",
            ProfileTorque => "Profile Torque Mode",
            Reserved => "Reserved",
            Homing => "Homing Mode",
            Unknown => "Error not able to determine mode",
        };
        f.write_str(s)
    }
}

//

/// Content of 6041:00
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub struct StatusWord(pub u16);

impl StatusWord {
    /// Interprets a value as read by the gateway. Only the lowest 16 bits are used.
    pub fn from_raw(raw: u64) -> Self {
        StatusWord(raw as u16)
    }

    pub fn state(self) -> DriveState {
        decode_status(self.0)
    }

    fn bit(self, n: u8) -> bool {
        self.0 & (1 << n) != 0
    }

    pub fn ready_to_switch_on(self) -> bool {
        self.bit(0)
    }

    pub fn switched_on(self) -> bool {
        self.bit(1)
    }

    pub fn operation_enabled(self) -> bool {
        self.bit(2)
    }

    pub fn fault(self) -> bool {
        self.bit(3)
    }

    pub fn voltage_enabled(self) -> bool {
        self.bit(4)
    }

    /// Bit 5 is low active, this returns true while a quick stop is going on
    pub fn quick_stop(self) -> bool {
        !self.bit(5)
    }

    pub fn switch_on_disabled(self) -> bool {
        self.bit(6)
    }

    pub fn warning(self) -> bool {
        self.bit(7)
    }

    pub fn remote(self) -> bool {
        self.bit(9)
    }

    /// In profile position mode: the target position was reached
    pub fn target_reached(self) -> bool {
        self.bit(10)
    }

    pub fn internal_limit_active(self) -> bool {
        self.bit(11)
    }

    /// In profile position mode: the new set-point was taken over
    pub fn set_point_acknowledge(self) -> bool {
        self.bit(12)
    }

    /// In profile position mode: the following error window was exceeded
    pub fn following_error(self) -> bool {
        self.bit(13)
    }
}

impl Display for StatusWord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#06X} ({})", self.0, self.state())
    }
}

impl Binary for StatusWord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Binary::fmt(&self.0, f)
    }
}

//

/// Content of 6040:00
///
/// The constants are the commands of the state machine. Bits not belonging to
/// a command are left at 0.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub struct ControlWord(pub u16);

impl ControlWord {
    pub const DISABLE_VOLTAGE: ControlWord = ControlWord(0x00);
    pub const QUICK_STOP: ControlWord = ControlWord(0x02);
    pub const SHUTDOWN: ControlWord = ControlWord(0x06);
    pub const SWITCH_ON: ControlWord = ControlWord(0x07);
    pub const DISABLE_OPERATION: ControlWord = ControlWord(0x07);
    pub const ENABLE_OPERATION: ControlWord = ControlWord(0x0F);
    pub const FAULT_RESET: ControlWord = ControlWord(0x80);

    /// Bit 4, in profile position mode a rising edge starts a move to the
    /// target position
    pub const NEW_SET_POINT: u16 = 1 << 4;
    /// Bit 5, a new set-point replaces the running move instead of being
    /// queued after it
    pub const CHANGE_SET_IMMEDIATELY: u16 = 1 << 5;
    /// Bit 6, the target position is relative instead of absolute
    pub const RELATIVE: u16 = 1 << 6;
    /// Bit 7, only a rising edge resets a fault
    pub const RESET_FAULT: u16 = 1 << 7;
    /// Bit 9, a queued set-point is started without stopping at the previous
    /// target
    pub const CHANGE_ON_SET_POINT: u16 = 1 << 9;

    pub fn from_raw(raw: u64) -> Self {
        ControlWord(raw as u16)
    }

    pub fn with_new_set_point(self) -> Self {
        ControlWord(self.0 | Self::NEW_SET_POINT)
    }

    pub fn without_new_set_point(self) -> Self {
        ControlWord(self.0 & !Self::NEW_SET_POINT)
    }

    pub fn with_change_set_immediately(self) -> Self {
        ControlWord(self.0 | Self::CHANGE_SET_IMMEDIATELY)
    }

    pub fn with_relative(self) -> Self {
        ControlWord(self.0 | Self::RELATIVE)
    }

    pub fn with_change_on_set_point(self) -> Self {
        ControlWord(self.0 | Self::CHANGE_ON_SET_POINT)
    }

    pub fn fault_reset(self) -> bool {
        self.0 & Self::RESET_FAULT != 0
    }

    /// Returns the command that moves the drive from `current` one step closer
    /// to `desired`
    ///
    /// Returns `None` if the drive already is in `desired` or if there is no
    /// command that gets it out of `current`. That is the case for the
    /// transitions the drive takes on its own (out of
    /// [`NotReadyToSwitchOn`][DriveState::NotReadyToSwitchOn] and
    /// [`FaultReactionActive`][DriveState::FaultReactionActive]) and for
    /// [`Unknown`][DriveState::Unknown] on either side.
    ///
    /// # Examples
    /// ```
    /// # use nanotec_c5e_driver::{ControlWord, DriveState};
    /// assert_eq!(
    ///     ControlWord::next_toward(DriveState::SwitchOnDisabled, DriveState::OperationEnabled),
    ///     Some(ControlWord::SHUTDOWN)
    /// );
    /// assert_eq!(
    ///     ControlWord::next_toward(DriveState::Fault, DriveState::OperationEnabled),
    ///     Some(ControlWord::FAULT_RESET)
    /// );
    /// ```
    pub fn next_toward(current: DriveState, desired: DriveState) -> Option<ControlWord> {
        use DriveState::*;
        if current == desired {
            return None;
        }
        match (current, desired) {
            (NotReadyToSwitchOn | FaultReactionActive | Unknown, _) => None,
            (_, NotReadyToSwitchOn | FaultReactionActive | Fault | Unknown) => None,
            (Fault, _) => Some(Self::FAULT_RESET),
            (QuickStopActive, OperationEnabled) => Some(Self::ENABLE_OPERATION),
            (QuickStopActive, _) => Some(Self::DISABLE_VOLTAGE),
            (OperationEnabled, QuickStopActive) => Some(Self::QUICK_STOP),
            // a quick stop can only be triggered while the operation is enabled
            (_, QuickStopActive) => Self::next_toward(current, OperationEnabled),
            (_, SwitchOnDisabled) => Some(Self::DISABLE_VOLTAGE),
            (SwitchOnDisabled, _) => Some(Self::SHUTDOWN),
            (ReadyToSwitchOn, _) => Some(Self::SWITCH_ON),
            (SwitchedOn, ReadyToSwitchOn) => Some(Self::SHUTDOWN),
            (SwitchedOn, _) => Some(Self::ENABLE_OPERATION),
            (OperationEnabled, ReadyToSwitchOn) => Some(Self::SHUTDOWN),
            (OperationEnabled, _) => Some(Self::DISABLE_OPERATION),
        }
    }
}

impl Display for ControlWord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#06X}", self.0)
    }
}

impl Binary for ControlWord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Binary::fmt(&self.0, f)
    }
}
