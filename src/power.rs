/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Reset and input clock sequencing around bus activity

use crate::error::PowerError;
use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::OutputPin;

/// Time for the bus and the input clock to settle, in microseconds
pub const SETTLE_DELAY_US: u32 = 400;

/// The sensor's INCLK source, typically a gated SoC clock output
pub trait InputClock {
    type Error;

    fn enable(&mut self) -> Result<(), Self::Error>;

    fn disable(&mut self);
}

/// Drives the active-low reset (XSHUTDOWN) line and the input clock
pub struct PowerSequencer<RST, CLK, D> {
    reset: RST,
    clock: CLK,
    delay: D,
}

impl<RST, CLK, D> PowerSequencer<RST, CLK, D>
where
    RST: OutputPin,
    CLK: InputClock,
    D: DelayUs<u32>,
{
    pub fn new(reset: RST, clock: CLK, delay: D) -> Self {
        Self {
            reset,
            clock,
            delay,
        }
    }

    pub fn release(self) -> (RST, CLK, D) {
        (self.reset, self.clock, self.delay)
    }

    /// Bring the sensor out of reset and start its clock.
    /// On clock failure the sensor is put back into reset.
    pub fn power_on(&mut self) -> Result<(), PowerError> {
        self.reset.set_high().map_err(|_| PowerError::ResetFailed)?;
        self.delay.delay_us(SETTLE_DELAY_US);

        if self.clock.enable().is_err() {
            log::error!("failed to enable sensor input clock");
            let _ = self.reset.set_low();
            return Err(PowerError::ClockEnableFailed);
        }
        self.delay.delay_us(SETTLE_DELAY_US);
        Ok(())
    }

    /// Stop the clock and hold the sensor in reset.
    /// Both steps are attempted regardless of streaming state.
    pub fn power_off(&mut self) -> Result<(), PowerError> {
        self.clock.disable();
        self.reset.set_low().map_err(|_| PowerError::ResetFailed)
    }
}
