//! Bringing the drive into "operation enabled" and moving it in profile
//! position mode

use super::{
    device::Device,
    ds402::{ControlWord, DriveState, OperatingMode, StatusWord},
    gateway::Gateway,
    DriverError,
};
use chrono::{DateTime, Local};
use std::{thread, time::Duration};

/// The enable handshake followed by a number of back and forth moves
///
/// The steps are:
/// 1. read the state
/// 2. set the mode to [`OperatingMode::ProfilePosition`] and read it back
/// 3. send [`SHUTDOWN`][ControlWord::SHUTDOWN], wait `settle`
/// 4. send [`SWITCH_ON`][ControlWord::SWITCH_ON], wait `settle`
/// 5. send [`ENABLE_OPERATION`][ControlWord::ENABLE_OPERATION]
/// 6. read controlword and statusword
/// 7. `repetitions` times: move to `target_position` and back to 0, waiting
///    `settle` after each move. A move is started by setting the target and
///    then toggling the new set-point bit (`0b11111`, then `0b1111`).
///
/// Nothing is checked along the way, the states read are only logged and
/// reported. The first error aborts the sequence.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub struct MoveSequence {
    pub target_position: i32,
    pub repetitions: u32,
    pub settle: Duration,
}

impl Default for MoveSequence {
    fn default() -> Self {
        MoveSequence {
            target_position: 1000,
            repetitions: 4,
            settle: Duration::from_secs(2),
        }
    }
}

/// What was read while running a [`MoveSequence`]
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SequenceReport {
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    /// State before anything was written
    pub initial_state: DriveState,
    /// Mode read back after setting it
    pub mode: OperatingMode,
    /// Controlword read back after enabling
    pub control_word: ControlWord,
    /// Statusword read back after enabling
    pub status_word: StatusWord,
    /// Number of finished back and forth moves
    pub moves: u32,
}

fn settle(d: Duration) {
    if !d.is_zero() {
        thread::sleep(d);
    }
}

impl MoveSequence {
    /// Runs the sequence on `device`
    ///
    /// # Errors
    /// Returns the first error of the device, see [`Device`]. Nothing written
    /// up to that point is undone.
    pub fn run<G: Gateway>(&self, device: &mut Device<G>) -> Result<SequenceReport, DriverError> {
        let started_at = Local::now();
        let initial_state = device.state()?;

        device.set_mode(OperatingMode::ProfilePosition)?;
        let mode = device.mode()?;

        let (control_word, status_word) = self.enable(device)?;

        for n in 1..=self.repetitions {
            self.move_to(device, self.target_position)?;
            self.move_to(device, 0)?;
            log::info!("finished move {} of {}", n, self.repetitions);
        }

        Ok(SequenceReport {
            started_at,
            finished_at: Local::now(),
            initial_state,
            mode,
            control_word,
            status_word,
            moves: self.repetitions,
        })
    }

    fn enable<G: Gateway>(
        &self,
        device: &mut Device<G>,
    ) -> Result<(ControlWord, StatusWord), DriverError> {
        device.set_control_word(ControlWord::SHUTDOWN)?;
        settle(self.settle);
        device.set_control_word(ControlWord::SWITCH_ON)?;
        settle(self.settle);
        device.set_control_word(ControlWord::ENABLE_OPERATION)?;

        let cw = device.control_word()?;
        let sw = device.status_word()?;
        log::info!("controlword {:b}, statusword {:b}", cw, sw);
        log::info!("Current controller state: {}", sw.state());
        Ok((cw, sw))
    }

    fn move_to<G: Gateway>(&self, device: &mut Device<G>, position: i32) -> Result<(), DriverError> {
        device.set_target_position(position)?;
        device.set_control_word(ControlWord::ENABLE_OPERATION.with_new_set_point())?;
        device.set_control_word(ControlWord::ENABLE_OPERATION)?;
        settle(self.settle);
        Ok(())
    }
}

/// Runs the default [`MoveSequence`] with `repetitions` back and forth moves
///
/// With the default settle time of 2 s this takes at least 4 s before the
/// first move.
///
/// # Examples
/// ```no_run
/// # use nanotec_c5e_driver::{build_bus_options, run_enable_and_move_sequence, Controller,
/// #     DriveState};
/// use nanotec_c5e_driver_test::MockGateway;
///
/// let controller = Controller::new(MockGateway::new());
/// let ids = controller.bus_hardware().unwrap();
/// let mut bus = controller.open_bus(&ids[0], &build_bus_options(&ids[0]).unwrap()).unwrap();
/// let devices = bus.scan().unwrap();
/// let mut device = bus.add_device(devices[0].clone()).unwrap();
///
/// let report = run_enable_and_move_sequence(&mut device, 0).unwrap();
/// assert_eq!(report.status_word.state(), DriveState::OperationEnabled);
/// ```
pub fn run_enable_and_move_sequence<G: Gateway>(
    device: &mut Device<G>,
    repetitions: u32,
) -> Result<SequenceReport, DriverError> {
    MoveSequence {
        repetitions,
        ..MoveSequence::default()
    }
    .run(device)
}

/// Commands the drive into `desired`, one transition at a time
///
/// After each command the drive gets `settle` time before the state is read
/// again. This is the checked counterpart to the fixed handshake of
/// [`MoveSequence`].
///
/// A fault is only reset by a rising edge of bit 7. If the controlword still
/// has the bit set from an earlier reset, it is cleared first.
///
/// # Errors
/// Returns [`DriverError::UnreachableState`] if there is no command leading
/// from the current state toward `desired` (see [`ControlWord::next_toward`])
/// or if the drive still isn't in `desired` after 8 commands.
pub fn transition_to<G: Gateway>(
    device: &mut Device<G>,
    desired: DriveState,
    settle_time: Duration,
) -> Result<(), DriverError> {
    // longest path is fault -> switch on disabled -> ... -> quick stop active
    const MAX_STEPS: usize = 8;
    let mut current = device.state()?;
    for _ in 0..MAX_STEPS {
        if current == desired {
            return Ok(());
        }
        let cw = ControlWord::next_toward(current, desired).ok_or(
            DriverError::UnreachableState {
                from: current,
                to: desired,
            },
        )?;
        if cw.fault_reset() && device.control_word()?.fault_reset() {
            // bit 7 is still set from an earlier reset, the drive needs an edge
            log::debug!("clearing fault reset bit before resetting again");
            device.set_control_word(ControlWord::DISABLE_VOLTAGE)?;
        }
        log::debug!("{} -> {}: sending {}", current, desired, cw);
        device.set_control_word(cw)?;
        settle(settle_time);
        current = device.state()?;
    }
    if current == desired {
        Ok(())
    } else {
        Err(DriverError::UnreachableState {
            from: current,
            to: desired,
        })
    }
}
