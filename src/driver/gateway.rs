//! The interface to the communication library that actually talks to the bus
//!
//! The driver doesn't implement any bus protocol itself. Everything from finding
//! adapters to reading a single object is delegated to an implementor of
//! [`Gateway`], usually a binding to Nanotec's NanoLib.

use super::{od::OdIndex, options::BusHardwareOptions};
use std::fmt::Display;
use thiserror::Error;

/// Error reported by a [`Gateway`]. It only carries the message of the library,
/// the context (which operation, which device) is added by the driver.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
#[error("{0}")]
pub struct GatewayError(pub String);

impl GatewayError {
    pub fn new(msg: impl Into<String>) -> Self {
        GatewayError(msg.into())
    }
}

//

/// Identifies a bus adapter, for example an USB connection or a CAN interface
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct BusHardwareId {
    /// Human readable name, e.g. `Nanotec VCP`
    pub name: String,
    /// Protocol tag, see [`Protocol`]
    pub protocol: String,
    /// Kind of adapter, e.g. `ixxat`
    pub bus_hardware: String,
    /// Adapter specific identifier like a port name
    pub specifier: String,
}

impl Display for BusHardwareId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} with protocol: {}", self.name, self.protocol)
    }
}

/// A device found by scanning a bus
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct DeviceId {
    pub bus_hardware_id: BusHardwareId,
    /// Node id or bus address of the device
    pub device_id: u32,
    pub description: String,
}

impl Display for DeviceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (id {}) on {}",
            self.description, self.device_id, self.bus_hardware_id.name
        )
    }
}

/// Handle the gateway gives out for an added device
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub struct DeviceHandle(pub u32);

impl Display for DeviceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "device handle {}", self.0)
    }
}

/// Reported through the callback of [`Gateway::scan_devices`]
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum ScanEvent {
    Start,
    /// Carries a counter that increases while scanning
    Progress(u32),
    Finished,
}

/// Logging levels of the communication library
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum LogLevel {
    Off,
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl From<log::LevelFilter> for LogLevel {
    fn from(level: log::LevelFilter) -> Self {
        match level {
            log::LevelFilter::Off => LogLevel::Off,
            log::LevelFilter::Error => LogLevel::Error,
            log::LevelFilter::Warn => LogLevel::Warn,
            log::LevelFilter::Info => LogLevel::Info,
            log::LevelFilter::Debug => LogLevel::Debug,
            log::LevelFilter::Trace => LogLevel::Trace,
        }
    }
}

//

/// Access to bus adapters and the devices connected to them
///
/// Every call blocks until the library returns. Implementors don't need to be
/// threadsafe, the driver only ever uses a gateway from one thread.
///
/// Values are passed the way the library passes them: numbers are read as
/// unsigned 64 bit values, interpreting them (e.g. as signed) is up to the
/// caller. Writes take the bit length of the object (8, 16, 32 or 64).
pub trait Gateway {
    fn set_logging_level(&mut self, level: LogLevel);

    fn list_bus_hardware(&mut self) -> Result<Vec<BusHardwareId>, GatewayError>;

    fn open_bus(
        &mut self,
        id: &BusHardwareId,
        options: &BusHardwareOptions,
    ) -> Result<(), GatewayError>;

    fn close_bus(&mut self, id: &BusHardwareId) -> Result<(), GatewayError>;

    /// Scans the opened bus for devices, reporting progress to `callback`
    fn scan_devices(
        &mut self,
        id: &BusHardwareId,
        callback: &mut dyn FnMut(ScanEvent),
    ) -> Result<Vec<DeviceId>, GatewayError>;

    fn add_device(&mut self, id: &DeviceId) -> Result<DeviceHandle, GatewayError>;

    fn remove_device(&mut self, handle: DeviceHandle) -> Result<(), GatewayError>;

    fn connect(&mut self, handle: DeviceHandle) -> Result<(), GatewayError>;

    fn disconnect(&mut self, handle: DeviceHandle) -> Result<(), GatewayError>;

    fn read_number(&mut self, handle: DeviceHandle, od: OdIndex) -> Result<u64, GatewayError>;

    fn write_number(
        &mut self,
        handle: DeviceHandle,
        value: i64,
        od: OdIndex,
        bit_length: u8,
    ) -> Result<(), GatewayError>;

    fn read_string(&mut self, handle: DeviceHandle, od: OdIndex) -> Result<String, GatewayError>;

    /// Reads all subindices of the object at `od.index`
    fn read_number_array(
        &mut self,
        handle: DeviceHandle,
        od: OdIndex,
    ) -> Result<Vec<u64>, GatewayError>;
}
