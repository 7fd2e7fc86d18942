//! Rust driver for the Nanotec C5-E motor controller (tested with the C5-E-1-11)
//! operated as a CiA 402 (DS402) drive.
//!
//! The driver doesn't talk to the bus itself. Finding adapters, opening buses
//! and reading or writing the object dictionary is done by a [`Gateway`], which
//! usually wraps Nanotec's NanoLib. What the driver adds on top is decoding
//! the statusword and the modes of operation, the state machine handshake
//! needed to get the drive moving, and making sure buses and devices are
//! released again, even if something failed in between.
//!
//! For more information see the [C5-E technical manual](https://en.nanotec.com/products/1704-c5-e-motor-controller-for-canopen)
//!
//! # Usage
//! A [`Controller`] owns the gateway. It lists the available adapters, of which
//! one is opened with [`Controller::open_bus`], returning a [`Bus`]. Scanning
//! the bus gives the ids of the connected devices, a [`Device`] is then obtained
//! with [`Bus::add_device`]. Dropping a device disconnects it, dropping a bus
//! closes it.
//!
//! Every function that talks to the controller returns a [`DriverError`] when
//! the gateway reports a failure, naming the operation and, for object access,
//! the device handle and object.
//!
//! # Examples
//! ```
//! # use nanotec_c5e_driver::{build_bus_options, find_bus, Controller, DriverError,
//! #     MoveSequence, OperatingMode, NANOTEC_VCP};
//! use nanotec_c5e_driver_test::MockGateway;
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), DriverError> {
//! let controller = Controller::new(MockGateway::new());
//! let ids = controller.bus_hardware()?;
//! let id = &ids[find_bus(&ids, NANOTEC_VCP)?];
//! let mut bus = controller.open_bus(id, &build_bus_options(id)?)?;
//! let devices = bus.scan()?;
//! let mut device = bus.add_device(devices[0].clone())?;
//!
//! println!("Current controller state: {}", device.state()?);
//! device.set_mode(OperatingMode::ProfilePosition)?;
//!
//! let sequence = MoveSequence {
//!     target_position: 1000,
//!     repetitions: 2,
//!     settle: Duration::ZERO,
//! };
//! let report = sequence.run(&mut device)?;
//! println!("moved {} times, drive is {}", report.moves, report.status_word.state());
//! # Ok(())
//! # }
//! ```
//!

mod driver;
pub(crate) mod util;

pub use driver::{
    bus::{log_scan_event, Bus},
    device::{BitLength, Device, DeviceInfo},
    ds402::{decode_mode, decode_status, ControlWord, DriveState, OperatingMode, StatusWord},
    gateway::{
        BusHardwareId, DeviceHandle, DeviceId, Gateway, GatewayError, LogLevel, ScanEvent,
    },
    map,
    od::OdIndex,
    options::{build_bus_options, find_bus, names, BusHardwareOptions, Protocol, NANOTEC_VCP},
    profile::ProfilePositionParams,
    sequence::{run_enable_and_move_sequence, transition_to, MoveSequence, SequenceReport},
    Controller, DriverError, ParseError,
};
