use super::{decode_mode, decode_status, ControlWord, DriveState, OperatingMode, StatusWord};

#[rustfmt::skip]
const TABLE: [(DriveState, &[u16]); 8] = [
    (DriveState::NotReadyToSwitchOn, &[0, 16, 32, 48, 128, 160, 144, 176]),
    (DriveState::SwitchOnDisabled, &[64, 80, 96, 112, 192, 208, 224, 240]),
    (DriveState::ReadyToSwitchOn, &[33, 49, 161, 177]),
    (DriveState::SwitchedOn, &[35, 51, 163, 179]),
    (DriveState::OperationEnabled, &[39, 55, 167, 183]),
    (DriveState::QuickStopActive, &[7, 23, 135, 151]),
    (DriveState::FaultReactionActive, &[15, 31, 47, 63, 143, 159, 175, 191]),
    (DriveState::Fault, &[8, 24, 40, 56, 136, 152, 168, 184]),
];

#[test]
fn status_table() {
    for (state, values) in TABLE {
        for v in values {
            assert_eq!(decode_status(*v), state, "statusword {}", v);
        }
    }
}

#[test]
fn status_unknown() {
    let known: Vec<u16> = TABLE.iter().flat_map(|(_, v)| v.iter().copied()).collect();
    for v in (0..=255u16).filter(|v| !known.contains(v)) {
        assert_eq!(decode_status(v), DriveState::Unknown, "statusword {}", v);
    }
}

#[test]
fn status_ignores_high_byte() {
    for v in 0..=255u16 {
        assert_eq!(decode_status(v), decode_status(v | 0xFF00));
        assert_eq!(decode_status(v), decode_status(v | 0x0200));
    }
}

#[test]
fn status_examples() {
    assert_eq!(decode_status(0x0021), DriveState::ReadyToSwitchOn);
    assert_eq!(decode_status(0x1F08), DriveState::Fault);
    assert_eq!(decode_status(0x0027), DriveState::OperationEnabled);
    // what a C5-E reports right after power up
    assert_eq!(decode_status(0x0250), DriveState::SwitchOnDisabled);
}

#[test]
fn mode_codes() {
    use OperatingMode::*;
    let expected = [
        (-2, AutoSetup),
        (-1, ClockDirection),
        (0, NoChange),
        (1, ProfilePosition),
        (2, Velocity),
        (3, ProfileVelocity),
        (4, ProfileTorque),
        (5, Reserved),
        (6, Homing),
    ];
    for (code, mode) in expected {
        assert_eq!(decode_mode(code), mode);
        assert_eq!(mode.code(), code);
    }
}

#[test]
fn mode_unknown() {
    for code in (i8::MIN..=i8::MAX).filter(|c| !(-2..=6).contains(c)) {
        assert_eq!(decode_mode(code), OperatingMode::Unknown, "mode {}", code);
    }
}

#[test]
fn mode_from_raw() {
    // -2 as read by the gateway
    assert_eq!(OperatingMode::from_raw(0xFE), OperatingMode::AutoSetup);
    assert_eq!(OperatingMode::from_raw(1), OperatingMode::ProfilePosition);
    assert_eq!(OperatingMode::from_raw(42), OperatingMode::Unknown);
}

#[test]
fn fmt_state_and_mode() {
    assert_eq!(format!("{}", DriveState::OperationEnabled), "Operation enabled");
    assert_eq!(format!("{}", OperatingMode::ProfilePosition), "Profile Position Mode");
}

#[test]
fn statusword_bits() {
    let sw = StatusWord(0x1627);
    assert_eq!(sw.state(), DriveState::OperationEnabled);
    assert!(sw.ready_to_switch_on());
    assert!(sw.switched_on());
    assert!(sw.operation_enabled());
    assert!(!sw.fault());
    assert!(!sw.quick_stop());
    assert!(sw.remote());
    assert!(sw.target_reached());
    assert!(sw.set_point_acknowledge());
    assert!(!sw.following_error());
    assert_eq!(format!("{:b}", sw), "1011000100111");
}

#[test]
fn controlword_set_point() {
    let cw = ControlWord::ENABLE_OPERATION.with_new_set_point();
    assert_eq!(cw, ControlWord(0b11111));
    assert_eq!(cw.without_new_set_point(), ControlWord(0b1111));

    let relative = ControlWord::ENABLE_OPERATION
        .with_relative()
        .with_change_set_immediately()
        .with_new_set_point();
    assert_eq!(relative, ControlWord(0b111_1111));
    assert_eq!(relative.without_new_set_point(), ControlWord(0b110_1111));
    assert_eq!(
        ControlWord::ENABLE_OPERATION.with_change_on_set_point(),
        ControlWord(0b10_0000_1111)
    );
}

#[test]
fn controlword_fault_reset() {
    assert!(ControlWord::FAULT_RESET.fault_reset());
    assert!(ControlWord(0x8F).fault_reset());
    assert!(!ControlWord::ENABLE_OPERATION.fault_reset());
    assert!(!ControlWord::DISABLE_VOLTAGE.fault_reset());
}

#[test]
fn next_toward_enable() {
    use DriveState::*;
    let path = [
        (SwitchOnDisabled, ControlWord::SHUTDOWN),
        (ReadyToSwitchOn, ControlWord::SWITCH_ON),
        (SwitchedOn, ControlWord::ENABLE_OPERATION),
    ];
    for (state, cw) in path {
        assert_eq!(ControlWord::next_toward(state, OperationEnabled), Some(cw));
    }
    assert_eq!(ControlWord::next_toward(OperationEnabled, OperationEnabled), None);
}

#[test]
fn next_toward_disable() {
    use DriveState::*;
    assert_eq!(
        ControlWord::next_toward(OperationEnabled, SwitchedOn),
        Some(ControlWord::DISABLE_OPERATION)
    );
    assert_eq!(
        ControlWord::next_toward(OperationEnabled, ReadyToSwitchOn),
        Some(ControlWord::SHUTDOWN)
    );
    assert_eq!(
        ControlWord::next_toward(SwitchedOn, SwitchOnDisabled),
        Some(ControlWord::DISABLE_VOLTAGE)
    );
    assert_eq!(
        ControlWord::next_toward(QuickStopActive, SwitchOnDisabled),
        Some(ControlWord::DISABLE_VOLTAGE)
    );
}

#[test]
fn next_toward_quick_stop() {
    use DriveState::*;
    assert_eq!(
        ControlWord::next_toward(OperationEnabled, QuickStopActive),
        Some(ControlWord::QUICK_STOP)
    );
    assert_eq!(
        ControlWord::next_toward(SwitchOnDisabled, QuickStopActive),
        Some(ControlWord::SHUTDOWN)
    );
}

#[test]
fn next_toward_not_commandable() {
    use DriveState::*;
    assert_eq!(ControlWord::next_toward(NotReadyToSwitchOn, OperationEnabled), None);
    assert_eq!(ControlWord::next_toward(FaultReactionActive, SwitchOnDisabled), None);
    assert_eq!(ControlWord::next_toward(Unknown, OperationEnabled), None);
    assert_eq!(ControlWord::next_toward(OperationEnabled, Fault), None);
    assert_eq!(
        ControlWord::next_toward(Fault, SwitchOnDisabled),
        Some(ControlWord::FAULT_RESET)
    );
}
