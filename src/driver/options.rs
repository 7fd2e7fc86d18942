//! Options needed to open a bus, named the way the communication library
//! expects them

#[cfg(test)]
mod tests;

use super::{gateway::BusHardwareId, DriverError};
use std::{collections::BTreeMap, fmt::Display};

/// Option names and values understood by the communication library
pub mod names {
    macro_rules! makepl {
        ($($name:ident, $val:literal),*) => {
            $(pub const $name: &str = $val;)*
        };
    }

    #[rustfmt::skip]
    makepl!(
        PROTOCOL_CANOPEN, "CANopen",
        PROTOCOL_MODBUS_RTU, "MODBUS RTU",
        PROTOCOL_MODBUS_VCP, "MODBUS VCP",
        PROTOCOL_MODBUS_TCP, "MODBUS TCP",
        BUS_HARDWARE_IXXAT, "ixxat",
        CAN_BAUD_RATE, "can adapter baud rate",
        CAN_BAUD_RATE_1000K, "1000k",
        IXXAT_ADAPTER_BUS_NUMBER, "adapter bus number",
        IXXAT_BUS_NUMBER_0, "0",
        SERIAL_BAUD_RATE, "serial baud rate",
        SERIAL_BAUD_RATE_19200, "19200",
        SERIAL_PARITY, "serial parity",
        SERIAL_PARITY_EVEN, "even"
    );
}

/// Name of the adapter a C5-E shows up as when connected over USB
pub const NANOTEC_VCP: &str = "Nanotec VCP";

//

/// Protocols a bus can be opened with
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum Protocol {
    CanOpen,
    ModbusRtu,
    ModbusVcp,
    ModbusTcp,
}

impl Protocol {
    /// Returns the protocol belonging to the tag of a [`BusHardwareId`]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            names::PROTOCOL_CANOPEN => Some(Protocol::CanOpen),
            names::PROTOCOL_MODBUS_RTU => Some(Protocol::ModbusRtu),
            names::PROTOCOL_MODBUS_VCP => Some(Protocol::ModbusVcp),
            names::PROTOCOL_MODBUS_TCP => Some(Protocol::ModbusTcp),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Protocol::CanOpen => names::PROTOCOL_CANOPEN,
            Protocol::ModbusRtu => names::PROTOCOL_MODBUS_RTU,
            Protocol::ModbusVcp => names::PROTOCOL_MODBUS_VCP,
            Protocol::ModbusTcp => names::PROTOCOL_MODBUS_TCP,
        }
    }
}

impl Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

//

/// Key/value settings used to open a bus (baud rate, parity, ...)
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct BusHardwareOptions {
    options: BTreeMap<String, String>,
}

impl BusHardwareOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an option, replacing the value if the option was already set
    pub fn add_option(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.options.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

/// Builds the options needed to open the given bus
///
/// - CANopen: 1000 kBaud and, for IXXAT adapters, bus number 0
/// - Modbus RTU: 19200 Baud with even parity
/// - Modbus VCP and TCP: nothing
///
/// # Errors
/// Returns [`DriverError::UnknownProtocol`] if the protocol tag of `id` isn't
/// one of [`Protocol`].
pub fn build_bus_options(id: &BusHardwareId) -> Result<BusHardwareOptions, DriverError> {
    let protocol = Protocol::from_tag(&id.protocol)
        .ok_or_else(|| DriverError::UnknownProtocol(id.protocol.clone()))?;
    let mut options = BusHardwareOptions::new();
    match protocol {
        Protocol::CanOpen => {
            options.add_option(names::CAN_BAUD_RATE, names::CAN_BAUD_RATE_1000K);
            if id.bus_hardware == names::BUS_HARDWARE_IXXAT {
                options.add_option(names::IXXAT_ADAPTER_BUS_NUMBER, names::IXXAT_BUS_NUMBER_0);
            }
        }
        Protocol::ModbusRtu => {
            options.add_option(names::SERIAL_BAUD_RATE, names::SERIAL_BAUD_RATE_19200);
            options.add_option(names::SERIAL_PARITY, names::SERIAL_PARITY_EVEN);
        }
        Protocol::ModbusVcp | Protocol::ModbusTcp => {}
    }
    log::info!("Selected bus hardware is {}", id);
    Ok(options)
}

/// Returns the position of the bus whose name contains `name`. If there are
/// multiple, the last one is returned.
///
/// # Errors
/// Returns [`DriverError::BusNotFound`] if no name matched.
pub fn find_bus(ids: &[BusHardwareId], name: &str) -> Result<usize, DriverError> {
    ids.iter()
        .rposition(|id| id.name.contains(name))
        .ok_or_else(|| DriverError::BusNotFound(name.to_string()))
}
