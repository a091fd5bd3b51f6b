/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

use crate::controls::ControlId;
use thiserror::Error;

/// Errors in this crate
#[derive(Debug, Error)]
pub enum Error<CommE> {
    /// Sensor communication error
    #[error("sensor bus failure: {0:?}")]
    Comm(CommE),

    /// Reset or clock sequencing failed while changing power state
    #[error("power sequence failed: {0}")]
    Power(#[from] PowerError),

    /// The chip id register did not hold the OV9282 id
    #[error("unexpected chip id {0:#06x}")]
    IdentityMismatch(u16),

    /// Attempted to set a control that is fixed by the active mode
    #[error("control {0:?} is read-only")]
    ReadOnlyControl(ControlId),

    /// The board configuration cannot drive this sensor
    #[error("unsupported hardware configuration: {0}")]
    HwConfig(#[from] HwConfigError),

    /// Mode and format changes are refused while streaming
    #[error("sensor is streaming")]
    Busy,
}

/// Power sequencing failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PowerError {
    #[error("reset line could not be driven")]
    ResetFailed,
    #[error("input clock could not be enabled")]
    ClockEnableFailed,
}

/// Board configurations the sensor cannot run with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HwConfigError {
    #[error("input clock of {0} Hz, expected 24 MHz")]
    InputClockRate(u32),
    #[error("{0} data lanes, expected 2")]
    DataLanes(u8),
    #[error("no supported link frequency")]
    LinkFrequency,
}
