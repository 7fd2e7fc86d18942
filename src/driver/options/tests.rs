use super::{
    super::{gateway::BusHardwareId, DriverError},
    build_bus_options, find_bus, names, Protocol, NANOTEC_VCP,
};

fn bus(name: &str, protocol: &str, bus_hardware: &str) -> BusHardwareId {
    BusHardwareId {
        name: name.to_string(),
        protocol: protocol.to_string(),
        bus_hardware: bus_hardware.to_string(),
        specifier: String::new(),
    }
}

#[test]
fn options_canopen() {
    let o = build_bus_options(&bus("PEAK", names::PROTOCOL_CANOPEN, "peak")).unwrap();
    assert_eq!(o.len(), 1);
    assert_eq!(o.get(names::CAN_BAUD_RATE), Some(names::CAN_BAUD_RATE_1000K));
}

#[test]
fn options_canopen_ixxat() {
    let o = build_bus_options(&bus(
        "IXXAT USB-to-CAN",
        names::PROTOCOL_CANOPEN,
        names::BUS_HARDWARE_IXXAT,
    ))
    .unwrap();
    assert_eq!(o.len(), 2);
    assert_eq!(o.get(names::CAN_BAUD_RATE), Some(names::CAN_BAUD_RATE_1000K));
    assert_eq!(
        o.get(names::IXXAT_ADAPTER_BUS_NUMBER),
        Some(names::IXXAT_BUS_NUMBER_0)
    );
}

#[test]
fn options_modbus_rtu() {
    let o = build_bus_options(&bus("COM3", names::PROTOCOL_MODBUS_RTU, "serial")).unwrap();
    let collected: Vec<_> = o.iter().collect();
    assert_eq!(
        collected,
        vec![
            (names::SERIAL_BAUD_RATE, names::SERIAL_BAUD_RATE_19200),
            (names::SERIAL_PARITY, names::SERIAL_PARITY_EVEN),
        ]
    );
}

#[test]
fn options_modbus_vcp_tcp() {
    let vcp = build_bus_options(&bus(NANOTEC_VCP, names::PROTOCOL_MODBUS_VCP, "vcp")).unwrap();
    let tcp = build_bus_options(&bus("eth0", names::PROTOCOL_MODBUS_TCP, "tcp")).unwrap();
    assert!(vcp.is_empty());
    assert!(tcp.is_empty());
}

#[test]
fn options_unknown_protocol() {
    let r = build_bus_options(&bus("Thing", "EtherCAT", "ecat"));
    assert!(matches!(r, Err(DriverError::UnknownProtocol(p)) if p == "EtherCAT"));
}

#[test]
fn protocol_tags() {
    for p in [
        Protocol::CanOpen,
        Protocol::ModbusRtu,
        Protocol::ModbusVcp,
        Protocol::ModbusTcp,
    ] {
        assert_eq!(Protocol::from_tag(p.tag()), Some(p));
    }
    assert_eq!(Protocol::from_tag("canopen"), None);
}

#[test]
fn find_bus_last_match() {
    let ids = vec![
        bus("Nanotec VCP (COM3)", names::PROTOCOL_MODBUS_VCP, "vcp"),
        bus("PEAK", names::PROTOCOL_CANOPEN, "peak"),
        bus("Nanotec VCP (COM4)", names::PROTOCOL_MODBUS_VCP, "vcp"),
    ];
    assert_eq!(find_bus(&ids, NANOTEC_VCP).unwrap(), 2);
    assert_eq!(find_bus(&ids, "PEAK").unwrap(), 1);
}

#[test]
fn find_bus_none() {
    let ids = vec![bus("PEAK", names::PROTOCOL_CANOPEN, "peak")];
    assert!(matches!(
        find_bus(&ids, NANOTEC_VCP),
        Err(DriverError::BusNotFound(_))
    ));
}
