/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

use crate::bus::SensorBus;
use crate::config::Config;
use crate::controls::{ControlId, ControlRange, ControlSet};
use crate::mode::{FrameFormat, FrameSizeRange, Mode, ModeTable};
use crate::power::{InputClock, PowerSequencer};
use crate::regs::{
    CHIP_ID, EXPECTED_CHIP_ID, MODE_SELECT, MODE_STANDBY, MODE_STREAMING,
};
use crate::Error;
use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::OutputPin;

#[cfg(feature = "rttdebug")]
use panic_rtt_core::rprintln;

/// Externally observable sensor lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    /// Clock stopped and held in reset; registers are lost
    Off,
    /// Powered and configurable, not streaming
    Standby,
    Streaming,
}

/// Main driver struct
pub struct Ov9282<I2C, RST, CLK, D> {
    bus: SensorBus<I2C>,
    power: PowerSequencer<RST, CLK, D>,
    config: Config,
    modes: ModeTable,
    controls: ControlSet,
    state: DeviceState,
    /// Whether the active mode's register program has been written
    /// since the last power on
    mode_programmed: bool,
}

impl<I2C, RST, CLK, D, CommE> Ov9282<I2C, RST, CLK, D>
where
    I2C: embedded_hal::blocking::i2c::Write<Error = CommE>
        + embedded_hal::blocking::i2c::WriteRead<Error = CommE>,
    RST: OutputPin,
    CLK: InputClock,
    D: DelayUs<u32>,
{
    /// Create a new, unpowered instance.
    /// May use `Config::default()` if in doubt.
    pub fn new(
        i2c: I2C,
        reset: RST,
        clock: CLK,
        delay: D,
        config: Config,
    ) -> Self {
        let modes = ModeTable::default();
        let controls = ControlSet::new(modes.active_mode());
        Self {
            bus: SensorBus::new(i2c, config.i2c_address),
            power: PowerSequencer::new(reset, clock, delay),
            config,
            modes,
            controls,
            state: DeviceState::Off,
            mode_programmed: false,
        }
    }

    pub fn default(i2c: I2C, reset: RST, clock: CLK, delay: D) -> Self {
        Self::new(i2c, reset, clock, delay, Config::default())
    }

    /// Replace the built-in mode list
    pub fn with_modes(mut self, modes: &'static [Mode]) -> Self {
        self.modes = ModeTable::new(modes);
        self.controls = ControlSet::new(self.modes.active_mode());
        self.mode_programmed = false;
        self
    }

    /// Give back the bus, reset pin, clock and delay
    pub fn release(self) -> (I2C, RST, CLK, D) {
        let (reset, clock, delay) = self.power.release();
        (self.bus.release(), reset, clock, delay)
    }

    pub fn state(&self) -> DeviceState {
        self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn active_mode(&self) -> &'static Mode {
        self.modes.active_mode()
    }

    /// Bring up the sensor: validate the board configuration, power on,
    /// check the chip identity and reset all controls to mode defaults.
    /// On an identity failure the sensor is powered back off.
    pub fn attach(&mut self) -> Result<(), Error<CommE>> {
        #[cfg(feature = "rttdebug")]
        rprintln!("ov9282-i2c attach start");

        self.config.validate()?;
        self.power_on()?;
        if let Err(err) = self.detect() {
            let _ = self.power_off();
            return Err(err);
        }
        self.controls = ControlSet::new(self.modes.active_mode());

        #[cfg(feature = "rttdebug")]
        rprintln!("ov9282-i2c attach done");
        Ok(())
    }

    /// Stop streaming if needed, then power off.
    /// The first failure is reported after both steps were attempted.
    pub fn detach(&mut self) -> Result<(), Error<CommE>> {
        let stopped = self.stop_streaming();
        let powered_off = self.power_off();
        stopped.and(powered_off)
    }

    /// Verify the chip id register
    pub fn detect(&mut self) -> Result<(), Error<CommE>> {
        let id = self.bus.read_reg(CHIP_ID)? as u16;
        if id != EXPECTED_CHIP_ID {
            log::error!(
                "chip id mismatch: expected {:#06x}, got {:#06x}",
                EXPECTED_CHIP_ID,
                id
            );
            return Err(Error::IdentityMismatch(id));
        }
        Ok(())
    }

    pub fn power_on(&mut self) -> Result<(), Error<CommE>> {
        if self.state != DeviceState::Off {
            return Ok(());
        }
        self.power.power_on()?;
        self.state = DeviceState::Standby;
        self.mode_programmed = false;
        log::debug!("sensor powered on");
        Ok(())
    }

    /// Stop the clock and hold the sensor in reset.
    /// Streaming registers are not touched; stop streaming first.
    pub fn power_off(&mut self) -> Result<(), Error<CommE>> {
        match self.state {
            DeviceState::Off => return Ok(()),
            DeviceState::Streaming => {
                log::warn!("powering off a streaming sensor")
            }
            DeviceState::Standby => {}
        }
        let result = self.power.power_off();
        self.state = DeviceState::Off;
        self.mode_programmed = false;
        log::debug!("sensor powered off");
        result.map_err(Error::from)
    }

    /// Start frame output, powering on and programming the active mode
    /// first if needed. On failure the sensor stays out of `Streaming`.
    pub fn start_streaming(&mut self) -> Result<(), Error<CommE>> {
        match self.state {
            DeviceState::Streaming => return Ok(()),
            DeviceState::Off => self.power_on()?,
            DeviceState::Standby => {}
        }
        if !self.mode_programmed {
            self.program_mode()?;
        }
        self.bus.write_reg(MODE_SELECT, MODE_STREAMING)?;
        self.state = DeviceState::Streaming;
        log::debug!("streaming started");
        Ok(())
    }

    /// Put the sensor in standby. The sensor is considered stopped even
    /// when the standby write fails; that failure is still reported.
    pub fn stop_streaming(&mut self) -> Result<(), Error<CommE>> {
        if self.state != DeviceState::Streaming {
            return Ok(());
        }
        let result = self.bus.write_reg(MODE_SELECT, MODE_STANDBY);
        self.state = DeviceState::Standby;
        if result.is_err() {
            log::warn!("standby write failed, sensor assumed stopped");
        } else {
            log::debug!("streaming stopped");
        }
        result
    }

    /// Write the mode's register program, then restore cached controls
    fn program_mode(&mut self) -> Result<(), Error<CommE>> {
        let mode = self.modes.active_mode();
        self.bus.write_table(mode.regs)?;
        self.bus.write_batch(&self.controls.all_writes(mode))?;
        self.mode_programmed = true;
        log::debug!("programmed {}x{} mode", mode.width, mode.height);
        Ok(())
    }

    /// Set a control, clamping out-of-range values.
    /// While powered off the value is only cached.
    pub fn set_control(
        &mut self,
        id: ControlId,
        value: i64,
    ) -> Result<(), Error<CommE>> {
        let mode = self.modes.active_mode();
        let batch = self
            .controls
            .set(mode, id, value)
            .ok_or(Error::ReadOnlyControl(id))?;
        log::debug!(
            "set {:?} to {} (requested {})",
            id,
            self.controls.get(mode, id),
            value
        );

        if self.state == DeviceState::Off {
            return Ok(());
        }
        self.bus.write_batch(&batch)
    }

    /// Last known value of a control; not re-read from the sensor
    pub fn get_control(&self, id: ControlId) -> i64 {
        self.controls.get(self.modes.active_mode(), id)
    }

    pub fn query_control(&self, id: ControlId) -> ControlRange {
        self.controls.range(self.modes.active_mode(), id)
    }

    /// Select the active mode. Re-selecting the current mode is a no-op;
    /// switching modes is refused while streaming.
    pub fn select_mode(&mut self, index: usize) -> Result<(), Error<CommE>> {
        if self.state == DeviceState::Streaming
            && index != self.modes.active_index()
        {
            return Err(Error::Busy);
        }
        if self.modes.select(index) {
            self.controls = ControlSet::new(self.modes.active_mode());
            self.mode_programmed = false;
        }
        Ok(())
    }

    pub fn format(&self) -> FrameFormat {
        self.modes.active_mode().format()
    }

    /// Switch to the mode nearest the requested size and report the
    /// format actually in effect
    pub fn set_format(
        &mut self,
        width: u32,
        height: u32,
    ) -> Result<FrameFormat, Error<CommE>> {
        let index = self.modes.nearest(width, height);
        self.select_mode(index)?;
        Ok(self.format())
    }

    pub fn enum_mbus_code(&self, index: usize) -> Option<u32> {
        self.modes.enum_mbus_code(index)
    }

    pub fn enum_frame_size(
        &self,
        code: u32,
        index: usize,
    ) -> Option<FrameSizeRange> {
        self.modes.enum_frame_size(code, index)
    }
}
