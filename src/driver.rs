pub mod bus;
pub mod device;
pub mod ds402;
pub mod gateway;
pub mod map;
pub mod od;
pub mod options;
mod parse;
pub mod profile;
pub mod sequence;

use self::{
    bus::Bus,
    ds402::DriveState,
    gateway::{BusHardwareId, DeviceHandle, Gateway, GatewayError, LogLevel},
    od::OdIndex,
    options::BusHardwareOptions,
};
pub use self::parse::ParseError;
use std::{
    cell::{RefCell, RefMut},
    rc::Rc,
};
use thiserror::Error;

// unfortunately, due to rustfmt not having the blank_lines_upper_bound feature
// stable yet, we gotta put comments in between the different sections. otherwise
// its just too much

//

/// Errors returned by any part of the driver
#[derive(Error, Debug)]
pub enum DriverError {
    /// Thrown by [`Controller::bus_hardware`] if the gateway didn't find any
    /// adapter
    #[error("No bus hardware found.")]
    NoBusHardware,
    /// Thrown by [`find_bus`][options::find_bus] if no adapter had the
    /// requested name
    #[error("no bus hardware named {0:?} found")]
    BusNotFound(String),
    /// Thrown by [`Bus::scan`] if no device answered
    #[error("No devices found.")]
    NoDevices,
    /// Thrown by [`build_bus_options`][options::build_bus_options] if the
    /// adapter uses a protocol the driver doesn't know options for
    #[error("unknown protocol: {0}")]
    UnknownProtocol(String),
    /// Thrown if an argument is out of the range the controller accepts
    #[error("invalid value for command argument")]
    InvalidArgument,
    /// Thrown if a call to the gateway that isn't bound to an object, e.g.
    /// opening a bus, failed
    #[error("{operation}() - {source}")]
    Gateway {
        operation: &'static str,
        source: GatewayError,
    },
    /// Thrown if the gateway is called while it is already in use, e.g. from
    /// inside the callback of [`Bus::scan_with`]
    #[error("{0}() - gateway is busy")]
    GatewayBusy(&'static str),
    /// Thrown if reading or writing an object failed
    #[error("{operation}() failed for {handle} at {od_index}: {source}")]
    Access {
        operation: &'static str,
        handle: DeviceHandle,
        od_index: OdIndex,
        source: GatewayError,
    },
    /// Thrown by [`ProfilePositionParams::verify`][profile::ProfilePositionParams::verify]
    /// if a value read back differs from what was written. `actual` is
    /// signed the same way as `expected`.
    #[error("{od_index} should be {expected} but was {actual}")]
    Verification {
        od_index: OdIndex,
        expected: i64,
        actual: i64,
    },
    /// Thrown by [`transition_to`][sequence::transition_to] if there's no
    /// command that brings the drive closer to the requested state
    #[error("can't get from state \"{from}\" to \"{to}\"")]
    UnreachableState { from: DriveState, to: DriveState },
}

/// Borrows the shared gateway for `operation`, failing instead of panicking if
/// it's already borrowed
pub(crate) fn borrow_gateway<'a, G>(
    gateway: &'a Rc<RefCell<G>>,
    operation: &'static str,
) -> Result<RefMut<'a, G>, DriverError> {
    gateway
        .try_borrow_mut()
        .map_err(|_| DriverError::GatewayBusy(operation))
}

impl DriverError {
    pub(crate) fn gateway(operation: &'static str) -> impl FnOnce(GatewayError) -> Self {
        move |source| DriverError::Gateway { operation, source }
    }

    pub(crate) fn access(
        operation: &'static str,
        handle: DeviceHandle,
        od_index: OdIndex,
    ) -> impl FnOnce(GatewayError) -> Self {
        move |source| DriverError::Access {
            operation,
            handle,
            od_index,
            source,
        }
    }
}

//

/// Entry point of the driver, owns the [`Gateway`]
///
/// The controller itself only lists adapters and opens buses. Everything else
/// happens on the returned [`Bus`] and the [`Device`][device::Device]s added to
/// it. All of them share the gateway, which is dropped once the controller
/// and every bus and device are dropped.
///
/// This type is not threadsafe.
#[derive(Debug)]
pub struct Controller<G: Gateway> {
    gateway: Rc<RefCell<G>>,
}

impl<G: Gateway> Controller<G> {
    /// Returns a new controller using `gateway`
    ///
    /// # Examples
    /// ```
    /// # use nanotec_c5e_driver::Controller;
    /// use nanotec_c5e_driver_test::MockGateway;
    ///
    /// let controller = Controller::new(MockGateway::new());
    /// ```
    pub fn new(gateway: G) -> Self {
        Controller {
            gateway: Rc::new(RefCell::new(gateway)),
        }
    }

    /// Sets the logging level of the communication library
    ///
    /// Does nothing but log a warning if the gateway is busy.
    pub fn set_logging_level(&self, level: LogLevel) {
        match borrow_gateway(&self.gateway, "set_logging_level") {
            Ok(mut gateway) => gateway.set_logging_level(level),
            Err(e) => log::warn!("{}", e),
        }
    }

    /// Returns all bus adapters the gateway supports and found
    ///
    /// # Errors
    /// Returns [`DriverError::NoBusHardware`] if the list is empty and
    /// [`DriverError::Gateway`] if listing failed.
    pub fn bus_hardware(&self) -> Result<Vec<BusHardwareId>, DriverError> {
        let ids = borrow_gateway(&self.gateway, "list_bus_hardware")?
            .list_bus_hardware()
            .map_err(DriverError::gateway("list_bus_hardware"))?;
        if ids.is_empty() {
            return Err(DriverError::NoBusHardware);
        }
        log::info!("Available bus hardware:");
        for (n, id) in ids.iter().enumerate() {
            log::info!("{}. {}", n, id);
        }
        Ok(ids)
    }

    /// Opens the bus `id` with `options` (see also
    /// [`build_bus_options`][options::build_bus_options])
    ///
    /// The bus is closed again once the returned [`Bus`] is dropped or
    /// [`Bus::close`] is called.
    ///
    /// # Errors
    /// Returns [`DriverError::Gateway`] if the gateway couldn't open the bus.
    ///
    /// # Examples
    /// ```
    /// # use nanotec_c5e_driver::{build_bus_options, find_bus, Controller, NANOTEC_VCP};
    /// use nanotec_c5e_driver_test::MockGateway;
    ///
    /// let controller = Controller::new(MockGateway::new());
    /// let ids = controller.bus_hardware().unwrap();
    /// let id = &ids[find_bus(&ids, NANOTEC_VCP).unwrap()];
    /// let bus = controller.open_bus(id, &build_bus_options(id).unwrap()).unwrap();
    /// bus.close().unwrap();
    /// ```
    pub fn open_bus(
        &self,
        id: &BusHardwareId,
        options: &BusHardwareOptions,
    ) -> Result<Bus<G>, DriverError> {
        borrow_gateway(&self.gateway, "open_bus")?
            .open_bus(id, options)
            .map_err(DriverError::gateway("open_bus"))?;
        log::info!("Opened {}", id);
        Ok(Bus::new(Rc::clone(&self.gateway), id.clone()))
    }
}
