use super::{
    Call, MockGateway, STATUS_FAULT, STATUS_OPERATION_ENABLED, STATUS_READY_TO_SWITCH_ON,
    STATUS_SWITCHED_ON, STATUS_SWITCH_ON_DISABLED,
};
use nanotec_c5e_driver::{map, BusHardwareOptions, DeviceHandle, Gateway, OdIndex, ScanEvent};

// opens the vcp and connects to the device, returns its handle
fn connected(gw: &mut MockGateway) -> DeviceHandle {
    let ids = gw.list_bus_hardware().unwrap();
    gw.open_bus(&ids[1], &BusHardwareOptions::new()).unwrap();
    let devices = gw.scan_devices(&ids[1], &mut |_| {}).unwrap();
    let handle = gw.add_device(&devices[0]).unwrap();
    gw.connect(handle).unwrap();
    handle
}

#[test]
fn open_close() {
    let mut gw = MockGateway::new();
    let ids = gw.list_bus_hardware().unwrap();
    gw.open_bus(&ids[0], &BusHardwareOptions::new()).unwrap();
    assert!(gw.is_open(&ids[0].name));
    assert!(gw.open_bus(&ids[0], &BusHardwareOptions::new()).is_err());
    gw.close_bus(&ids[0]).unwrap();
    assert!(!gw.is_open(&ids[0].name));
    assert!(gw.close_bus(&ids[0]).is_err());
}

#[test]
fn scan_closed_bus() {
    let mut gw = MockGateway::new();
    let ids = gw.list_bus_hardware().unwrap();
    assert!(gw.scan_devices(&ids[0], &mut |_| {}).is_err());
}

#[test]
fn scan_events() {
    let mut gw = MockGateway::new();
    let ids = gw.list_bus_hardware().unwrap();
    gw.open_bus(&ids[0], &BusHardwareOptions::new()).unwrap();
    let mut events = Vec::new();
    let devices = gw.scan_devices(&ids[0], &mut |e| events.push(e)).unwrap();
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].bus_hardware_id, ids[0]);
    assert_eq!(events.first(), Some(&ScanEvent::Start));
    assert_eq!(events.last(), Some(&ScanEvent::Finished));
}

#[test]
fn read_not_connected() {
    let mut gw = MockGateway::new();
    assert!(gw.read_number(DeviceHandle(0), map::STATUSWORD).is_err());
}

#[test]
fn enable_handshake() {
    let mut gw = MockGateway::new();
    let h = connected(&mut gw);
    assert_eq!(gw.read_number(h, map::STATUSWORD).unwrap(), STATUS_SWITCH_ON_DISABLED);
    gw.write_number(h, 6, map::CONTROLWORD, 16).unwrap();
    assert_eq!(gw.register(map::STATUSWORD), STATUS_READY_TO_SWITCH_ON);
    gw.write_number(h, 7, map::CONTROLWORD, 16).unwrap();
    assert_eq!(gw.register(map::STATUSWORD), STATUS_SWITCHED_ON);
    gw.write_number(h, 15, map::CONTROLWORD, 16).unwrap();
    assert_eq!(gw.register(map::STATUSWORD), STATUS_OPERATION_ENABLED);
}

#[test]
fn skipped_transition_is_ignored() {
    let mut gw = MockGateway::new();
    let h = connected(&mut gw);
    gw.write_number(h, 15, map::CONTROLWORD, 16).unwrap();
    assert_eq!(gw.register(map::STATUSWORD), STATUS_SWITCH_ON_DISABLED);
}

#[test]
fn fault_reset() {
    let mut gw = MockGateway::new();
    let h = connected(&mut gw);
    gw.set_register(map::STATUSWORD, STATUS_FAULT);
    gw.write_number(h, 6, map::CONTROLWORD, 16).unwrap();
    assert_eq!(gw.register(map::STATUSWORD), STATUS_FAULT);
    gw.write_number(h, 0x80, map::CONTROLWORD, 16).unwrap();
    assert_eq!(gw.register(map::STATUSWORD), STATUS_SWITCH_ON_DISABLED);
}

#[test]
fn profile_position_move() {
    let mut gw = MockGateway::new();
    let h = connected(&mut gw);
    gw.write_number(h, 1, map::MODES_OF_OPERATION, 8).unwrap();
    assert_eq!(gw.read_number(h, map::MODES_OF_OPERATION_DISPLAY).unwrap(), 1);
    for cw in [6, 7, 15] {
        gw.write_number(h, cw, map::CONTROLWORD, 16).unwrap();
    }
    gw.write_number(h, -500, map::TARGET_POSITION, 32).unwrap();
    assert_eq!(gw.register(map::POSITION_ACTUAL_VALUE), 0);
    gw.write_number(h, 0b11111, map::CONTROLWORD, 16).unwrap();
    assert_eq!(gw.register(map::POSITION_ACTUAL_VALUE) as u32 as i32, -500);
    assert_eq!(gw.register(map::STATUSWORD), STATUS_OPERATION_ENABLED | 0x1400);
    gw.write_number(h, 0b1111, map::CONTROLWORD, 16).unwrap();
    assert_eq!(gw.register(map::STATUSWORD), STATUS_OPERATION_ENABLED | 0x0400);
}

#[test]
fn signed_write_is_masked() {
    let mut gw = MockGateway::new();
    let h = connected(&mut gw);
    gw.write_number(h, -2, map::MODES_OF_OPERATION, 8).unwrap();
    assert_eq!(gw.register(map::MODES_OF_OPERATION_DISPLAY), 0xFE);
}

#[test]
fn number_array() {
    let mut gw = MockGateway::new();
    let h = connected(&mut gw);
    gw.set_register(OdIndex::new(0x607D, 2), 20);
    gw.set_register(OdIndex::new(0x607D, 1), 10);
    assert_eq!(
        gw.read_number_array(h, OdIndex::new(0x607D, 0)).unwrap(),
        vec![10, 20]
    );
}

#[test]
fn failure_injection() {
    let mut gw = MockGateway::new();
    let h = connected(&mut gw);
    gw.fail_write(map::CONTROLWORD, 7);
    gw.write_number(h, 6, map::CONTROLWORD, 16).unwrap();
    assert!(gw.write_number(h, 7, map::CONTROLWORD, 16).is_err());
    assert_eq!(gw.register(map::STATUSWORD), STATUS_READY_TO_SWITCH_ON);
    assert_eq!(
        gw.calls().last(),
        Some(&Call::WriteNumber(h, 7, map::CONTROLWORD, 16))
    );
    assert_eq!(gw.control_words(), vec![6, 7]);
}

#[test]
fn clones_share_state() {
    let mut gw = MockGateway::new();
    let other = gw.clone();
    let h = connected(&mut gw);
    assert_eq!(other.connected_devices(), 1);
    assert!(other.calls().contains(&Call::Connect(h)));
}
