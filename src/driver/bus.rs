use super::{
    device::Device,
    gateway::{BusHardwareId, DeviceId, Gateway, ScanEvent},
    borrow_gateway, DriverError,
};
use std::{cell::RefCell, rc::Rc};

/// Logs the progress of a scan, used by [`Bus::scan`]
pub fn log_scan_event(event: ScanEvent) {
    match event {
        ScanEvent::Start => log::info!("Scanning bus."),
        // the library reports progress way too often, every other is enough
        ScanEvent::Progress(n) if n & 1 == 0 => log::trace!("scan progress {}", n),
        ScanEvent::Progress(_) => {}
        ScanEvent::Finished => log::info!("Scan finished."),
    }
}

/// An opened bus
///
/// Obtained by calling [`Controller::open_bus`][super::Controller::open_bus].
/// Dropping it closes the bus, but errors while closing are only logged. Use
/// [`close`][Bus::close] to get them.
///
/// Devices added to the bus should be dropped before the bus, which happens
/// automatically when both live in the same scope.
///
/// This type is not threadsafe.
#[derive(Debug)]
pub struct Bus<G: Gateway> {
    gateway: Rc<RefCell<G>>,
    id: BusHardwareId,
    open: bool,
}

impl<G: Gateway> Bus<G> {
    pub(super) fn new(gateway: Rc<RefCell<G>>, id: BusHardwareId) -> Self {
        Bus {
            gateway,
            id,
            open: true,
        }
    }

    pub fn id(&self) -> &BusHardwareId {
        &self.id
    }

    /// Scans the bus for devices and logs the progress
    ///
    /// # Errors
    /// Returns [`DriverError::NoDevices`] if no device was found and
    /// [`DriverError::Gateway`] if the scan itself failed.
    pub fn scan(&mut self) -> Result<Vec<DeviceId>, DriverError> {
        self.scan_with(log_scan_event)
    }

    /// Same as [`scan`][Bus::scan] but reports the progress to `callback`
    /// instead of logging it
    ///
    /// The gateway is in use while `callback` runs. Anything the callback
    /// does with the controller, a bus or a device fails with
    /// [`DriverError::GatewayBusy`] (setting the logging level is skipped).
    pub fn scan_with<F: FnMut(ScanEvent)>(
        &mut self,
        mut callback: F,
    ) -> Result<Vec<DeviceId>, DriverError> {
        let devices = borrow_gateway(&self.gateway, "scan_devices")?
            .scan_devices(&self.id, &mut callback)
            .map_err(DriverError::gateway("scan_devices"))?;
        match devices.first() {
            Some(first) => log::info!("Found Device: {}", first),
            None => return Err(DriverError::NoDevices),
        }
        Ok(devices)
    }

    /// Adds the device and connects to it
    ///
    /// # Errors
    /// Returns [`DriverError::Gateway`] if the device couldn't be added or
    /// connected. In the latter case the device is removed again.
    pub fn add_device(&mut self, id: DeviceId) -> Result<Device<G>, DriverError> {
        let mut gateway = borrow_gateway(&self.gateway, "add_device")?;
        let handle = gateway
            .add_device(&id)
            .map_err(DriverError::gateway("add_device"))?;
        if let Err(e) = gateway.connect(handle) {
            if let Err(e) = gateway.remove_device(handle) {
                log::warn!("remove_device() - {} while cleaning up {}", e, handle);
            }
            return Err(DriverError::gateway("connect")(e));
        }
        log::info!("Now connected to {}", id);
        Ok(Device::new(Rc::clone(&self.gateway), id, handle))
    }

    /// Closes the bus
    ///
    /// # Errors
    /// Returns [`DriverError::Gateway`] if the gateway failed to close the bus.
    /// The bus won't be closed again when dropped.
    pub fn close(mut self) -> Result<(), DriverError> {
        let res = borrow_gateway(&self.gateway, "close_bus")?.close_bus(&self.id);
        self.open = false;
        res.map_err(DriverError::gateway("close_bus"))?;
        log::info!("Closed {}", self.id);
        Ok(())
    }
}

impl<G: Gateway> Drop for Bus<G> {
    fn drop(&mut self) {
        if !self.open {
            return;
        }
        // try_borrow so we don't panic while already unwinding from a panic
        // that happened while the gateway was borrowed
        match self.gateway.try_borrow_mut() {
            Ok(mut gateway) => {
                if let Err(e) = gateway.close_bus(&self.id) {
                    log::warn!("close_bus() - {} while dropping {}", e, self.id);
                }
            }
            Err(_) => log::warn!("gateway busy, couldn't close {}", self.id),
        }
    }
}
