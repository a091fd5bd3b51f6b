/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/
#![cfg_attr(not(any(test, feature = "std")), no_std)]

//! Control driver for the OmniVision OV9282 global shutter image sensor
//! This imaging sensor has multiple interfaces:
//! - Two-wire i2c for configuration registers (i2c)
//! - MIPI CSI-2 pixel data out, two lanes
//! - Reset (XSHUTDOWN) and input clock (INCLK) lines
//! This driver owns the i2c interface and the reset/clock power sequencing.
//! It selects the sensor mode, programs its registers, and keeps exposure,
//! analog gain and frame timing consistent while idle or streaming.

mod bus;
pub mod config;
pub mod controls;
mod error;
pub mod mode;
pub mod power;
pub mod regs;
mod sensor;
#[cfg(feature = "std")]
pub mod shared;

#[cfg(test)]
mod mock;

pub use bus::{RegWrite, SensorBus};
pub use config::{Config, DEFAULT_I2C_ADDRESS};
pub use controls::{ControlId, ControlRange};
pub use error::{Error, HwConfigError, PowerError};
pub use mode::{FrameFormat, FrameSizeRange, Mode};
pub use power::InputClock;
pub use sensor::{DeviceState, Ov9282};
