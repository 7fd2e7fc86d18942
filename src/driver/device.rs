use super::{
    ds402::{ControlWord, DriveState, OperatingMode, StatusWord},
    gateway::{DeviceHandle, DeviceId, Gateway},
    map,
    od::OdIndex,
    borrow_gateway, DriverError,
};
use crate::util::ensure;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use std::{cell::RefCell, rc::Rc};

/// Bit length of an object, needed when writing it
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone, FromPrimitive)]
pub enum BitLength {
    Bits8 = 8,
    Bits16 = 16,
    Bits32 = 32,
    Bits64 = 64,
}

impl BitLength {
    pub fn from_bits(bits: u8) -> Option<Self> {
        Self::from_u8(bits)
    }

    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Mask covering the bits of an object of this length
    pub fn mask(self) -> u64 {
        match self {
            BitLength::Bits64 => u64::MAX,
            b => (1 << b.bits()) - 1,
        }
    }

    /// Interprets the bits of an object of this length as signed number
    pub fn sign_extend(self, raw: u64) -> i64 {
        let shift = 64 - self.bits() as u32;
        ((raw << shift) as i64) >> shift
    }

    /// Whether `value` can be written to an object of this length, either as
    /// signed or as unsigned value
    pub fn fits(self, value: i64) -> bool {
        match self {
            BitLength::Bits64 => true,
            b => {
                let bits = b.bits() as u32;
                value >= -(1 << (bits - 1)) && value < (1 << bits)
            }
        }
    }
}

/// Identification strings of a device
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct DeviceInfo {
    pub name: String,
    pub hardware_version: String,
    pub software_version: String,
}

//

/// A connected device
///
/// Obtained by calling [`Bus::add_device`][super::bus::Bus::add_device].
/// Dropping it disconnects and removes the device, errors while doing that are
/// only logged. Use [`disconnect`][Device::disconnect] to get them.
///
/// Besides the raw access to the object dictionary there are functions for
/// the objects needed to operate the drive. Every function fails with a
/// [`DriverError::Access`] naming the operation and the object if the gateway
/// reports an error.
///
/// This type is not threadsafe.
#[derive(Debug)]
pub struct Device<G: Gateway> {
    gateway: Rc<RefCell<G>>,
    id: DeviceId,
    handle: DeviceHandle,
    connected: bool,
}

impl<G: Gateway> Device<G> {
    pub(super) fn new(gateway: Rc<RefCell<G>>, id: DeviceId, handle: DeviceHandle) -> Self {
        Device {
            gateway,
            id,
            handle,
            connected: true,
        }
    }

    pub fn id(&self) -> &DeviceId {
        &self.id
    }

    pub fn handle(&self) -> DeviceHandle {
        self.handle
    }

    /// Reads a number. Signed numbers are returned as unsigned, interpreting
    /// them is up to the caller.
    pub fn read_number(&mut self, od: OdIndex) -> Result<u64, DriverError> {
        let value = borrow_gateway(&self.gateway, "read_number")?
            .read_number(self.handle, od)
            .map_err(DriverError::access("read_number", self.handle, od))?;
        log::debug!("read {} from {} of {}", value, od, self.handle);
        Ok(value)
    }

    /// Writes `value` to the object `od`, which is `bit_length` long
    ///
    /// # Errors
    /// Returns [`DriverError::InvalidArgument`] if `value` doesn't fit into
    /// `bit_length` bits.
    pub fn write_number(
        &mut self,
        value: i64,
        od: OdIndex,
        bit_length: BitLength,
    ) -> Result<(), DriverError> {
        ensure!(bit_length.fits(value), DriverError::InvalidArgument);
        log::debug!("write {} to {} of {}", value, od, self.handle);
        borrow_gateway(&self.gateway, "write_number")?
            .write_number(self.handle, value, od, bit_length.bits())
            .map_err(DriverError::access("write_number", self.handle, od))
    }

    pub fn read_string(&mut self, od: OdIndex) -> Result<String, DriverError> {
        borrow_gateway(&self.gateway, "read_string")?
            .read_string(self.handle, od)
            .map_err(DriverError::access("read_string", self.handle, od))
    }

    /// Reads all subindices of `od.index`
    pub fn read_number_array(&mut self, od: OdIndex) -> Result<Vec<u64>, DriverError> {
        borrow_gateway(&self.gateway, "read_number_array")?
            .read_number_array(self.handle, od)
            .map_err(DriverError::access("read_number_array", self.handle, od))
    }

    pub fn status_word(&mut self) -> Result<StatusWord, DriverError> {
        self.read_number(map::STATUSWORD).map(StatusWord::from_raw)
    }

    /// Reads the statusword and returns the state of the drive
    pub fn state(&mut self) -> Result<DriveState, DriverError> {
        let state = self.status_word()?.state();
        log::info!("Current controller state: {}", state);
        Ok(state)
    }

    pub fn control_word(&mut self) -> Result<ControlWord, DriverError> {
        self.read_number(map::CONTROLWORD).map(ControlWord::from_raw)
    }

    pub fn set_control_word(&mut self, cw: ControlWord) -> Result<(), DriverError> {
        self.write_number(cw.0 as i64, map::CONTROLWORD, BitLength::Bits16)
    }

    /// Reads the mode the drive actually is in (modes of operation display)
    pub fn mode(&mut self) -> Result<OperatingMode, DriverError> {
        let mode = OperatingMode::from_raw(self.read_number(map::MODES_OF_OPERATION_DISPLAY)?);
        log::info!("Controller mode: {}", mode);
        Ok(mode)
    }

    /// Requests a mode (modes of operation). Whether the drive switched can be
    /// checked with [`mode`][Device::mode].
    ///
    /// # Errors
    /// Returns [`DriverError::InvalidArgument`] for [`OperatingMode::Unknown`].
    pub fn set_mode(&mut self, mode: OperatingMode) -> Result<(), DriverError> {
        ensure!(
            mode != OperatingMode::Unknown,
            DriverError::InvalidArgument
        );
        self.write_number(mode.code() as i64, map::MODES_OF_OPERATION, BitLength::Bits8)
    }

    pub fn set_target_position(&mut self, position: i32) -> Result<(), DriverError> {
        self.write_number(position as i64, map::TARGET_POSITION, BitLength::Bits32)
    }

    pub fn position_actual(&mut self) -> Result<i32, DriverError> {
        self.read_number(map::POSITION_ACTUAL_VALUE)
            .map(|raw| raw as u32 as i32)
    }

    /// Reads name, hardware and software version of the device
    pub fn info(&mut self) -> Result<DeviceInfo, DriverError> {
        Ok(DeviceInfo {
            name: self.read_string(map::DEVICE_NAME)?,
            hardware_version: self.read_string(map::HARDWARE_VERSION)?,
            software_version: self.read_string(map::SOFTWARE_VERSION)?,
        })
    }

    /// Disconnects and removes the device
    ///
    /// # Errors
    /// Returns [`DriverError::Gateway`] if either failed. The device won't be
    /// disconnected again when dropped.
    pub fn disconnect(mut self) -> Result<(), DriverError> {
        let mut gateway = borrow_gateway(&self.gateway, "disconnect")?;
        self.connected = false;
        let disconnected = gateway.disconnect(self.handle);
        let removed = gateway.remove_device(self.handle);
        drop(gateway);
        disconnected.map_err(DriverError::gateway("disconnect"))?;
        removed.map_err(DriverError::gateway("remove_device"))?;
        log::info!("Disconnected {}", self.id);
        Ok(())
    }
}

impl<G: Gateway> Drop for Device<G> {
    fn drop(&mut self) {
        if !self.connected {
            return;
        }
        // try_borrow so we don't panic while already unwinding from a panic
        // that happened while the gateway was borrowed
        match self.gateway.try_borrow_mut() {
            Ok(mut gateway) => {
                if let Err(e) = gateway.disconnect(self.handle) {
                    log::warn!("disconnect() - {} while dropping {}", e, self.handle);
                }
                if let Err(e) = gateway.remove_device(self.handle) {
                    log::warn!("remove_device() - {} while dropping {}", e, self.handle);
                }
            }
            Err(_) => log::warn!("gateway busy, couldn't disconnect {}", self.handle),
        }
    }
}
