#[cfg(test)]
mod tests;

use nanotec_c5e_driver::{
    decode_status, map, names, BusHardwareId, BusHardwareOptions, DeviceHandle, DeviceId,
    DriveState, Gateway, GatewayError, LogLevel, OdIndex, ScanEvent,
};
use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    fmt::Debug,
    rc::Rc,
};

// used to mock the communication library to test the driver
// every call is recorded and can be made to fail. the mock also behaves like
// a very simple DS402 drive: the statusword follows the controlword, the mode
// display follows the mode and in profile position mode the position jumps to
// the target as soon as a new set-point is given
//
// don't be alarmed if you think it's slow or inefficient or anything, it doesn't
// need to be fast nor pretty nor efficient, its just for testing. it needs to be
// easy

pub const STATUS_SWITCH_ON_DISABLED: u64 = 0x0250;
pub const STATUS_READY_TO_SWITCH_ON: u64 = 0x0231;
pub const STATUS_SWITCHED_ON: u64 = 0x0233;
pub const STATUS_OPERATION_ENABLED: u64 = 0x0237;
pub const STATUS_QUICK_STOP_ACTIVE: u64 = 0x0217;
pub const STATUS_FAULT: u64 = 0x0218;

const TARGET_REACHED: u64 = 1 << 10;
const SET_POINT_ACKNOWLEDGE: u64 = 1 << 12;

/// A call made to the gateway, with its arguments
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Call {
    SetLoggingLevel(LogLevel),
    ListBusHardware,
    OpenBus(String, BusHardwareOptions),
    CloseBus(String),
    ScanDevices(String),
    AddDevice(u32),
    RemoveDevice(DeviceHandle),
    Connect(DeviceHandle),
    Disconnect(DeviceHandle),
    ReadNumber(DeviceHandle, OdIndex),
    WriteNumber(DeviceHandle, i64, OdIndex, u8),
    ReadString(DeviceHandle, OdIndex),
    ReadNumberArray(DeviceHandle, OdIndex),
}

type Failure = Box<dyn Fn(&Call) -> bool>;

struct State {
    bus_hardware: Vec<BusHardwareId>,
    devices: Vec<(u32, String)>,
    open: HashSet<String>,
    added: HashMap<DeviceHandle, u32>,
    connected: HashSet<DeviceHandle>,
    next_handle: u32,
    registers: HashMap<OdIndex, u64>,
    strings: HashMap<OdIndex, String>,
    calls: Vec<Call>,
    failures: Vec<Failure>,
    log_level: LogLevel,
}

impl State {
    fn record(&mut self, call: Call) -> Result<(), GatewayError> {
        let fail = self.failures.iter().any(|f| f(&call));
        let msg = format!("simulated failure in {:?}", call);
        self.calls.push(call);
        if fail {
            Err(GatewayError::new(msg))
        } else {
            Ok(())
        }
    }

    fn ensure_connected(&self, handle: DeviceHandle) -> Result<(), GatewayError> {
        if self.connected.contains(&handle) {
            Ok(())
        } else {
            Err(GatewayError::new(format!("{} is not connected", handle)))
        }
    }

    fn register(&self, od: OdIndex) -> u64 {
        self.registers.get(&od).copied().unwrap_or(0)
    }

    fn write_control_word(&mut self, cw: u64) {
        let old_cw = self.register(map::CONTROLWORD);
        let sw = self.register(map::STATUSWORD);
        let state = decode_status(sw as u16);
        use DriveState::*;
        let next = if state == Fault {
            // only a rising edge of bit 7 gets the drive out of fault
            if cw & 0x80 != 0 && old_cw & 0x80 == 0 {
                Some(STATUS_SWITCH_ON_DISABLED)
            } else {
                None
            }
        } else if cw & 0x02 == 0 {
            // disable voltage
            match state {
                ReadyToSwitchOn | SwitchedOn | OperationEnabled | QuickStopActive => {
                    Some(STATUS_SWITCH_ON_DISABLED)
                }
                _ => None,
            }
        } else if cw & 0x04 == 0 {
            // quick stop
            match state {
                OperationEnabled => Some(STATUS_QUICK_STOP_ACTIVE),
                ReadyToSwitchOn | SwitchedOn => Some(STATUS_SWITCH_ON_DISABLED),
                _ => None,
            }
        } else if cw & 0x01 == 0 {
            // shutdown
            match state {
                SwitchOnDisabled | SwitchedOn | OperationEnabled => {
                    Some(STATUS_READY_TO_SWITCH_ON)
                }
                _ => None,
            }
        } else if cw & 0x08 == 0 {
            // switch on / disable operation
            match state {
                ReadyToSwitchOn | OperationEnabled => Some(STATUS_SWITCHED_ON),
                _ => None,
            }
        } else {
            // enable operation
            match state {
                SwitchedOn | QuickStopActive => Some(STATUS_OPERATION_ENABLED),
                _ => None,
            }
        };
        let mut sw = next.unwrap_or(sw);

        let profile_position = self.register(map::MODES_OF_OPERATION_DISPLAY) == 1;
        if decode_status(sw as u16) == OperationEnabled && profile_position {
            let rising = cw & 0x10 != 0 && old_cw & 0x10 == 0;
            let falling = cw & 0x10 == 0 && old_cw & 0x10 != 0;
            if rising {
                let target = self.register(map::TARGET_POSITION);
                self.registers.insert(map::POSITION_ACTUAL_VALUE, target);
                sw |= SET_POINT_ACKNOWLEDGE | TARGET_REACHED;
            } else if falling {
                sw &= !SET_POINT_ACKNOWLEDGE;
            }
        }

        self.registers.insert(map::STATUSWORD, sw);
        self.registers.insert(map::CONTROLWORD, cw);
    }
}

/// Gateway that doesn't need any hardware
///
/// Clones share their state, so a clone can be handed to the driver while the
/// test keeps one to look at the calls.
#[derive(Clone)]
pub struct MockGateway {
    state: Rc<RefCell<State>>,
}

impl Debug for MockGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        write!(
            f,
            "MockGateway {{ open: {:?}, connected: {:?}, registers: {:?}, calls: {} }}",
            state.open,
            state.connected,
            state.registers,
            state.calls.len()
        )
    }
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    /// Returns a gateway with an IXXAT CAN adapter and a Nanotec VCP (in that
    /// order) and one C5-E with node id 1 on every bus. The drive is switched
    /// on disabled.
    pub fn new() -> Self {
        let bus_hardware = vec![
            bus_hardware_id(
                "IXXAT USB-to-CAN V2",
                names::PROTOCOL_CANOPEN,
                names::BUS_HARDWARE_IXXAT,
            ),
            bus_hardware_id("Nanotec VCP", names::PROTOCOL_MODBUS_VCP, "nanotec vcp"),
        ];
        let mut registers = HashMap::new();
        registers.insert(map::STATUSWORD, STATUS_SWITCH_ON_DISABLED);
        let mut strings = HashMap::new();
        strings.insert(map::DEVICE_NAME, "C5-E-1-11".to_string());
        strings.insert(map::HARDWARE_VERSION, "W001".to_string());
        strings.insert(map::SOFTWARE_VERSION, "FIR-v2213-B1026058".to_string());
        MockGateway {
            state: Rc::new(RefCell::new(State {
                bus_hardware,
                devices: vec![(1, "C5-E-1-11".to_string())],
                open: HashSet::new(),
                added: HashMap::new(),
                connected: HashSet::new(),
                next_handle: 0,
                registers,
                strings,
                calls: Vec::new(),
                failures: Vec::new(),
                log_level: LogLevel::default(),
            })),
        }
    }

    pub fn set_bus_hardware(&mut self, ids: Vec<BusHardwareId>) {
        self.state.borrow_mut().bus_hardware = ids;
    }

    pub fn set_devices(&mut self, devices: &[(u32, &str)]) {
        self.state.borrow_mut().devices = devices
            .iter()
            .map(|(id, desc)| (*id, desc.to_string()))
            .collect();
    }

    pub fn set_register(&mut self, od: OdIndex, value: u64) {
        self.state.borrow_mut().registers.insert(od, value);
    }

    pub fn set_string(&mut self, od: OdIndex, s: &str) {
        self.state.borrow_mut().strings.insert(od, s.to_string());
    }

    /// Makes every call for which `pred` returns true fail. The call is still
    /// recorded.
    pub fn fail_when<F: Fn(&Call) -> bool + 'static>(&mut self, pred: F) {
        self.state.borrow_mut().failures.push(Box::new(pred));
    }

    /// Makes every write of `value` to `od` fail
    pub fn fail_write(&mut self, od: OdIndex, value: i64) {
        self.fail_when(move |c| matches!(c, Call::WriteNumber(_, v, o, _) if *v == value && *o == od));
    }

    pub fn register(&self, od: OdIndex) -> u64 {
        self.state.borrow().register(od)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    /// All writes in order, as (object, value)
    pub fn writes(&self) -> Vec<(OdIndex, i64)> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::WriteNumber(_, v, o, _) => Some((*o, *v)),
                _ => None,
            })
            .collect()
    }

    /// All values written to the controlword, in order
    pub fn control_words(&self) -> Vec<i64> {
        self.writes()
            .into_iter()
            .filter(|(o, _)| *o == map::CONTROLWORD)
            .map(|(_, v)| v)
            .collect()
    }

    pub fn is_open(&self, name: &str) -> bool {
        self.state.borrow().open.contains(name)
    }

    pub fn open_buses(&self) -> usize {
        self.state.borrow().open.len()
    }

    pub fn connected_devices(&self) -> usize {
        self.state.borrow().connected.len()
    }

    pub fn added_devices(&self) -> usize {
        self.state.borrow().added.len()
    }

    pub fn log_level(&self) -> LogLevel {
        self.state.borrow().log_level
    }
}

pub fn bus_hardware_id(name: &str, protocol: &str, bus_hardware: &str) -> BusHardwareId {
    BusHardwareId {
        name: name.to_string(),
        protocol: protocol.to_string(),
        bus_hardware: bus_hardware.to_string(),
        specifier: String::new(),
    }
}

impl Gateway for MockGateway {
    fn set_logging_level(&mut self, level: LogLevel) {
        let mut state = self.state.borrow_mut();
        // can't fail in the library either
        let _ = state.record(Call::SetLoggingLevel(level));
        state.log_level = level;
    }

    fn list_bus_hardware(&mut self) -> Result<Vec<BusHardwareId>, GatewayError> {
        let mut state = self.state.borrow_mut();
        state.record(Call::ListBusHardware)?;
        Ok(state.bus_hardware.clone())
    }

    fn open_bus(
        &mut self,
        id: &BusHardwareId,
        options: &BusHardwareOptions,
    ) -> Result<(), GatewayError> {
        let mut state = self.state.borrow_mut();
        state.record(Call::OpenBus(id.name.clone(), options.clone()))?;
        if !state.bus_hardware.contains(id) {
            return Err(GatewayError::new(format!("no such bus hardware: {}", id)));
        }
        if !state.open.insert(id.name.clone()) {
            return Err(GatewayError::new(format!("{} is already open", id)));
        }
        Ok(())
    }

    fn close_bus(&mut self, id: &BusHardwareId) -> Result<(), GatewayError> {
        let mut state = self.state.borrow_mut();
        state.record(Call::CloseBus(id.name.clone()))?;
        if state.open.remove(&id.name) {
            Ok(())
        } else {
            Err(GatewayError::new(format!("{} is not open", id)))
        }
    }

    fn scan_devices(
        &mut self,
        id: &BusHardwareId,
        callback: &mut dyn FnMut(ScanEvent),
    ) -> Result<Vec<DeviceId>, GatewayError> {
        let mut state = self.state.borrow_mut();
        state.record(Call::ScanDevices(id.name.clone()))?;
        if !state.open.contains(&id.name) {
            return Err(GatewayError::new(format!("{} is not open", id)));
        }
        callback(ScanEvent::Start);
        for n in 0..4 {
            callback(ScanEvent::Progress(n));
        }
        callback(ScanEvent::Finished);
        Ok(state
            .devices
            .iter()
            .map(|(device_id, description)| DeviceId {
                bus_hardware_id: id.clone(),
                device_id: *device_id,
                description: description.clone(),
            })
            .collect())
    }

    fn add_device(&mut self, id: &DeviceId) -> Result<DeviceHandle, GatewayError> {
        let mut state = self.state.borrow_mut();
        state.record(Call::AddDevice(id.device_id))?;
        let handle = DeviceHandle(state.next_handle);
        state.next_handle += 1;
        state.added.insert(handle, id.device_id);
        Ok(handle)
    }

    fn remove_device(&mut self, handle: DeviceHandle) -> Result<(), GatewayError> {
        let mut state = self.state.borrow_mut();
        state.record(Call::RemoveDevice(handle))?;
        state.connected.remove(&handle);
        match state.added.remove(&handle) {
            Some(_) => Ok(()),
            None => Err(GatewayError::new(format!("unknown {}", handle))),
        }
    }

    fn connect(&mut self, handle: DeviceHandle) -> Result<(), GatewayError> {
        let mut state = self.state.borrow_mut();
        state.record(Call::Connect(handle))?;
        if !state.added.contains_key(&handle) {
            return Err(GatewayError::new(format!("unknown {}", handle)));
        }
        state.connected.insert(handle);
        Ok(())
    }

    fn disconnect(&mut self, handle: DeviceHandle) -> Result<(), GatewayError> {
        let mut state = self.state.borrow_mut();
        state.record(Call::Disconnect(handle))?;
        if state.connected.remove(&handle) {
            Ok(())
        } else {
            Err(GatewayError::new(format!("{} is not connected", handle)))
        }
    }

    fn read_number(&mut self, handle: DeviceHandle, od: OdIndex) -> Result<u64, GatewayError> {
        let mut state = self.state.borrow_mut();
        state.record(Call::ReadNumber(handle, od))?;
        state.ensure_connected(handle)?;
        Ok(state.register(od))
    }

    fn write_number(
        &mut self,
        handle: DeviceHandle,
        value: i64,
        od: OdIndex,
        bit_length: u8,
    ) -> Result<(), GatewayError> {
        let mut state = self.state.borrow_mut();
        state.record(Call::WriteNumber(handle, value, od, bit_length))?;
        state.ensure_connected(handle)?;
        let mask = if bit_length >= 64 {
            u64::MAX
        } else {
            (1u64 << bit_length) - 1
        };
        let raw = value as u64 & mask;
        if od == map::CONTROLWORD {
            state.write_control_word(raw);
        } else {
            state.registers.insert(od, raw);
            if od == map::MODES_OF_OPERATION {
                state.registers.insert(map::MODES_OF_OPERATION_DISPLAY, raw);
            }
        }
        Ok(())
    }

    fn read_string(&mut self, handle: DeviceHandle, od: OdIndex) -> Result<String, GatewayError> {
        let mut state = self.state.borrow_mut();
        state.record(Call::ReadString(handle, od))?;
        state.ensure_connected(handle)?;
        state
            .strings
            .get(&od)
            .cloned()
            .ok_or_else(|| GatewayError::new(format!("{} is not a string", od)))
    }

    fn read_number_array(
        &mut self,
        handle: DeviceHandle,
        od: OdIndex,
    ) -> Result<Vec<u64>, GatewayError> {
        let mut state = self.state.borrow_mut();
        state.record(Call::ReadNumberArray(handle, od))?;
        state.ensure_connected(handle)?;
        let mut entries: Vec<_> = state
            .registers
            .iter()
            .filter(|(o, _)| o.index == od.index)
            .map(|(o, v)| (o.subindex, *v))
            .collect();
        entries.sort();
        Ok(entries.into_iter().map(|(_, v)| v).collect())
    }
}
