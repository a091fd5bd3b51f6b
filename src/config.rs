/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

use crate::error::HwConfigError;
use crate::regs::{INCLK_RATE, LINK_FREQUENCIES, NUM_DATA_LANES};

/// Default 7-bit i2c address (SID pin low)
pub const DEFAULT_I2C_ADDRESS: u8 = 0x60;

/// Board wiring of the sensor, as described by firmware or a device tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub i2c_address: u8,
    /// Frequency of the clock fed to the sensor's INCLK pin
    pub inclk_rate: u32,
    /// Number of CSI-2 data lanes routed to the receiver
    pub data_lanes: u8,
    /// Link frequencies the receiver accepts
    pub link_frequencies: &'static [u64],
}

impl Default for Config {
    fn default() -> Self {
        Self {
            i2c_address: DEFAULT_I2C_ADDRESS,
            inclk_rate: INCLK_RATE,
            data_lanes: NUM_DATA_LANES,
            link_frequencies: &LINK_FREQUENCIES,
        }
    }
}

impl Config {
    pub fn with_address(mut self, i2c_address: u8) -> Self {
        self.i2c_address = i2c_address;
        self
    }

    /// Check that the sensor can run on this board
    pub fn validate(&self) -> Result<(), HwConfigError> {
        if self.inclk_rate != INCLK_RATE {
            return Err(HwConfigError::InputClockRate(self.inclk_rate));
        }
        if self.data_lanes != NUM_DATA_LANES {
            return Err(HwConfigError::DataLanes(self.data_lanes));
        }
        let supported = self
            .link_frequencies
            .iter()
            .any(|freq| LINK_FREQUENCIES.contains(freq));
        if !supported {
            return Err(HwConfigError::LinkFrequency);
        }
        Ok(())
    }
}
