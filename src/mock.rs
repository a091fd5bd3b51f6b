/*
Copyright (c) 2020 Todd Stellanova
LICENSE: BSD3 (see LICENSE file)
*/

//! Test doubles and scripted bus traffic for exercising the driver
//! without hardware.

use crate::config::DEFAULT_I2C_ADDRESS;
use crate::mode::{Mode, MODE_1280X720};
use crate::power::InputClock;
use crate::regs::{EXPECTED_CHIP_ID, EXPOSURE_OFFSET, EXPOSURE_SHIFT};
use crate::Ov9282;
use embedded_hal_mock::delay::MockNoop;
use embedded_hal_mock::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
use embedded_hal_mock::pin::{
    Mock as PinMock, State as PinState, Transaction as PinTransaction,
};
use embedded_hal_mock::MockError;
use std::io::ErrorKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const ADDR: u8 = DEFAULT_I2C_ADDRESS;

pub type TestSensor = Ov9282<I2cMock, PinMock, FakeClock, MockNoop>;

/// Reference mode plus a smaller second mode
pub static TEST_MODES: [Mode; 2] = [
    MODE_1280X720,
    Mode {
        width: 640,
        height: 400,
        vblank: 400,
        vblank_min: 100,
        vblank_max: 1000,
        ..MODE_1280X720
    },
];

/// Input clock that tracks its state and can refuse to start
#[derive(Clone, Default)]
pub struct FakeClock {
    enabled: Arc<AtomicBool>,
    fail: bool,
}

impl FakeClock {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }
}

impl InputClock for FakeClock {
    type Error = ();

    fn enable(&mut self) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.enabled.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn disable(&mut self) {
        self.enabled.store(false, Ordering::SeqCst);
    }
}

/// Handles on the mocks inside a [`TestSensor`]
pub struct Mocks {
    pub i2c: I2cMock,
    pub reset: PinMock,
    pub clock: FakeClock,
}

impl Mocks {
    /// Assert that all scripted traffic happened
    pub fn done(&mut self) {
        self.i2c.done();
        self.reset.done();
    }
}

/// An unpowered sensor expecting exactly this bus and reset pin traffic
pub fn expect(
    i2c: &[I2cTransaction],
    reset: &[PinTransaction],
) -> (TestSensor, Mocks) {
    let mocks = Mocks {
        i2c: I2cMock::new(i2c),
        reset: PinMock::new(reset),
        clock: FakeClock::default(),
    };
    let sensor = Ov9282::default(
        mocks.i2c.clone(),
        mocks.reset.clone(),
        mocks.clock.clone(),
        MockNoop::new(),
    );
    (sensor, mocks)
}

/// A sensor already through attach, expecting the given traffic afterwards
pub fn attached(
    i2c_after: &[I2cTransaction],
    reset_after: &[PinTransaction],
) -> (TestSensor, Mocks) {
    let mut i2c = vec![chip_id_read(EXPECTED_CHIP_ID)];
    i2c.extend_from_slice(i2c_after);
    let mut reset = vec![pin(PinState::High)];
    reset.extend_from_slice(reset_after);

    let (mut sensor, mocks) = expect(&i2c, &reset);
    sensor.attach().unwrap();
    (sensor, mocks)
}

pub fn pin(state: PinState) -> PinTransaction {
    PinTransaction::set(state)
}

pub fn write(bytes: &[u8]) -> I2cTransaction {
    I2cTransaction::write(ADDR, bytes.to_vec())
}

pub fn chip_id_read(id: u16) -> I2cTransaction {
    I2cTransaction::write_read(
        ADDR,
        vec![0x30, 0x0a],
        id.to_be_bytes().to_vec(),
    )
}

pub fn bus_error() -> MockError {
    MockError::Io(ErrorKind::Other)
}

/// Traffic of a first stream start: the mode's register program followed by
/// the cached controls inside one group hold
pub fn mode_program(
    mode: &Mode,
    vblank: u32,
    exposure: u32,
    gain: u8,
) -> Vec<I2cTransaction> {
    let mut traffic: Vec<I2cTransaction> = mode
        .regs
        .iter()
        .map(|&(address, value)| {
            let [hi, lo] = address.to_be_bytes();
            write(&[hi, lo, value])
        })
        .collect();

    let [lines_hi, lines_lo] = ((mode.height + vblank) as u16).to_be_bytes();
    let [_, exp_2, exp_1, exp_0] =
        ((exposure - EXPOSURE_OFFSET) << EXPOSURE_SHIFT).to_be_bytes();
    traffic.push(write(&[0x33, 0x08, 0x01]));
    traffic.push(write(&[0x38, 0x0e, lines_hi, lines_lo]));
    traffic.push(write(&[0x35, 0x00, exp_2, exp_1, exp_0]));
    traffic.push(write(&[0x35, 0x09, gain]));
    traffic.push(write(&[0x33, 0x08, 0x00]));
    traffic
}
