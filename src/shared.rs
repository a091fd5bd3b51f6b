/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Thread-safe access to one attached sensor.
//!
//! A control framework and a power-management callback may call into the
//! driver from different threads. Every operation on a [`Handle`] takes the
//! single driver lock for its full duration, so bus transactions never
//! interleave and the control cache always matches the order of requests.

use crate::controls::{ControlId, ControlRange};
use crate::mode::{FrameFormat, FrameSizeRange};
use crate::power::InputClock;
use crate::sensor::{DeviceState, Ov9282};
use crate::Error;
use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::OutputPin;
use parking_lot::Mutex;
use std::sync::Arc;

/// Shared, cloneable reference to an attached sensor
pub struct Handle<I2C, RST, CLK, D> {
    inner: Arc<Mutex<Ov9282<I2C, RST, CLK, D>>>,
}

impl<I2C, RST, CLK, D> Clone for Handle<I2C, RST, CLK, D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Power on and identify the sensor, then share it
pub fn attach<I2C, RST, CLK, D, CommE>(
    mut sensor: Ov9282<I2C, RST, CLK, D>,
) -> Result<Handle<I2C, RST, CLK, D>, Error<CommE>>
where
    I2C: embedded_hal::blocking::i2c::Write<Error = CommE>
        + embedded_hal::blocking::i2c::WriteRead<Error = CommE>,
    RST: OutputPin,
    CLK: InputClock,
    D: DelayUs<u32>,
{
    sensor.attach()?;
    log::info!("ov9282 attached at {:#04x}", sensor.config().i2c_address);
    Ok(Handle {
        inner: Arc::new(Mutex::new(sensor)),
    })
}

impl<I2C, RST, CLK, D, CommE> Handle<I2C, RST, CLK, D>
where
    I2C: embedded_hal::blocking::i2c::Write<Error = CommE>
        + embedded_hal::blocking::i2c::WriteRead<Error = CommE>,
    RST: OutputPin,
    CLK: InputClock,
    D: DelayUs<u32>,
{
    /// Stop streaming if needed and power the sensor off.
    /// Other clones of this handle observe the sensor as `Off`.
    pub fn detach(self) -> Result<(), Error<CommE>> {
        let result = self.inner.lock().detach();
        result
    }

    pub fn state(&self) -> DeviceState {
        self.inner.lock().state()
    }

    pub fn set_control(
        &self,
        id: ControlId,
        value: i64,
    ) -> Result<(), Error<CommE>> {
        self.inner.lock().set_control(id, value)
    }

    pub fn get_control(&self, id: ControlId) -> i64 {
        self.inner.lock().get_control(id)
    }

    pub fn query_control(&self, id: ControlId) -> ControlRange {
        self.inner.lock().query_control(id)
    }

    pub fn start_streaming(&self) -> Result<(), Error<CommE>> {
        self.inner.lock().start_streaming()
    }

    /// Always leaves a streaming sensor in `Standby`
    pub fn stop_streaming(&self) -> Result<(), Error<CommE>> {
        self.inner.lock().stop_streaming()
    }

    /// Power-management suspend: same sequence as detach,
    /// but the handle stays usable
    pub fn suspend(&self) -> Result<(), Error<CommE>> {
        self.inner.lock().detach()
    }

    /// Power-management resume. The mode is reprogrammed,
    /// with cached controls, on the next stream start.
    pub fn resume(&self) -> Result<(), Error<CommE>> {
        self.inner.lock().power_on()
    }

    pub fn format(&self) -> FrameFormat {
        self.inner.lock().format()
    }

    pub fn set_format(
        &self,
        width: u32,
        height: u32,
    ) -> Result<FrameFormat, Error<CommE>> {
        self.inner.lock().set_format(width, height)
    }

    pub fn enum_mbus_code(&self, index: usize) -> Option<u32> {
        self.inner.lock().enum_mbus_code(index)
    }

    pub fn enum_frame_size(
        &self,
        code: u32,
        index: usize,
    ) -> Option<FrameSizeRange> {
        self.inner.lock().enum_frame_size(code, index)
    }
}
